use std::{
    borrow::Cow,
    fmt,
    io::{self, BufRead},
    path::PathBuf,
};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::{ValidationContext, ValidationResult, Validator},
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};
use shell_words::split;

use crate::cli::core::{CliError, CliMode, CommandError, LoopControl, ShellContext};
use crate::cli::output::{self, OutputPreferences};

pub const SCRIPT_ENV: &str = "FORMVIEW_CLI_SCRIPT";

pub fn run_cli() -> Result<(), CliError> {
    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .ok_or_else(|| CliError::Usage("usage: formview_cli <form.json>".into()))?;

    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };
    if mode == CliMode::Script {
        output::set_preferences(OutputPreferences {
            plain_mode: true,
            quiet_mode: true,
        });
    }

    let mut context = ShellContext::from_path(mode, &path)?;

    match mode {
        CliMode::Interactive => {
            output::section(format!("FormView: {}", path.display()));
            output::hint("Type `help` to list commands, `fill` to walk every field.");
            run_interactive(&mut context)
        }
        CliMode::Script => run_script(&mut context),
    }
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<CommandHelper, DefaultHistory>::new()?;
    let fields = context
        .host
        .form()
        .descriptors()
        .iter()
        .map(|descriptor| descriptor.name.clone())
        .collect();
    let helper = CommandHelper::new(context.command_names(), fields);
    editor.set_helper(Some(helper));
    editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);

    loop {
        if !context.running {
            break;
        }
        let prompt = context.prompt();
        let line = editor.readline(&prompt);

        match line {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                editor.add_history_entry(trimmed).ok();

                match handle_line(context, trimmed) {
                    Ok(LoopControl::Continue) => {}
                    Ok(LoopControl::Exit) => break,
                    Err(err) => context.report_error(err)?,
                }
            }
            Err(ReadlineError::Interrupted) => {
                if context.confirm_exit()? {
                    break;
                }
            }
            Err(ReadlineError::Eof) => {
                output::info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        if !context.running {
            break;
        }
        let line = line?;
        match handle_line(context, &line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => context.report_error(err)?,
        }
    }
    Ok(())
}

fn handle_line(context: &mut ShellContext, line: &str) -> Result<LoopControl, CommandError> {
    let tokens = match parse_command_line(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            output::warning(&err.message);
            return Ok(LoopControl::Continue);
        }
    };

    if tokens.is_empty() {
        return Ok(LoopControl::Continue);
    }

    let raw = &tokens[0];
    let command = raw.to_lowercase();
    let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();

    match context.dispatch(&command, raw, &args) {
        Ok(LoopControl::Exit) => {
            context.running = false;
            Ok(LoopControl::Exit)
        }
        other => other,
    }
}

/// Completes command names, then field names for commands that take one.
struct CommandHelper {
    commands: Vec<String>,
    fields: Vec<String>,
}

const FIELD_COMMANDS: [&str; 3] = ["set", "focus", "press"];

impl CommandHelper {
    fn new(names: Vec<&'static str>, fields: Vec<String>) -> Self {
        let mut commands: Vec<String> = names
            .into_iter()
            .map(|name| name.to_ascii_lowercase())
            .collect();
        commands.sort();
        commands.dedup();
        Self { commands, fields }
    }

    fn candidates(&self, line: &str, pos: usize) -> (usize, Vec<&str>) {
        let prefix = &line[..pos];
        let start = prefix
            .rfind(char::is_whitespace)
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let needle = &prefix[start..];
        let words: Vec<&str> = prefix[..start].split_whitespace().collect();

        let pool: Vec<&str> = match words.as_slice() {
            [] => self.commands.iter().map(String::as_str).collect(),
            [command] if FIELD_COMMANDS.contains(&command.to_ascii_lowercase().as_str()) => {
                self.fields.iter().map(String::as_str).collect()
            }
            _ => Vec::new(),
        };
        let lowered = needle.to_ascii_lowercase();
        let matches = pool
            .into_iter()
            .filter(|name| name.to_ascii_lowercase().starts_with(&lowered))
            .collect();
        (start, matches)
    }
}

impl Helper for CommandHelper {}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, matches) = self.candidates(line, pos);
        let candidates = matches
            .into_iter()
            .map(|name| Pair {
                display: name.to_string(),
                replacement: name.to_string(),
            })
            .collect();
        Ok((start, candidates))
    }
}

impl Hinter for CommandHelper {
    type Hint = String;
}

impl Highlighter for CommandHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Borrowed(line)
    }
}

impl Validator for CommandHelper {
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        let _ = ctx;
        Ok(ValidationResult::Valid(None))
    }
}

pub(crate) fn parse_command_line(input: &str) -> Result<Vec<String>, ParseError> {
    split(input).map_err(|err| ParseError {
        message: err.to_string(),
    })
}

#[derive(Debug)]
pub(crate) struct ParseError {
    message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn helper() -> CommandHelper {
        CommandHelper::new(
            vec!["set", "submit", "focus", "next"],
            vec!["name".into(), "nickname".into(), "age".into()],
        )
    }

    #[test]
    fn completes_command_names_first() {
        let helper = helper();
        let (start, matches) = helper.candidates("su", 2);
        assert_eq!(start, 0);
        assert_eq!(matches, vec!["submit"]);
    }

    #[test]
    fn completes_field_names_after_field_commands() {
        let helper = helper();
        let (start, matches) = helper.candidates("set n", 5);
        assert_eq!(start, 4);
        assert_eq!(matches, vec!["name", "nickname"]);

        let (_, matches) = helper.candidates("next a", 6);
        assert!(matches.is_empty());
        let (_, matches) = helper.candidates("set name A", 10);
        assert!(matches.is_empty());
    }

    #[test]
    fn quoted_arguments_survive_parsing() {
        let tokens = parse_command_line("set name \"Ada Lovelace\"").unwrap();
        assert_eq!(tokens, vec!["set", "name", "Ada Lovelace"]);
        assert!(parse_command_line("set name \"open").is_err());
    }
}
