//! Shell context, dispatch, and the command error type.

use std::io;
use std::path::Path;

use dialoguer::theme::ColorfulTheme;
use strsim::levenshtein;

use crate::config::FormSpec;
use crate::errors::FormError;
use crate::form::{FocusState, TransformCatalog};

pub use crate::errors::CliError;

use super::commands;
use super::host::{InputError, TerminalHost, TerminalSurface};
use super::output;
use super::registry::{CommandEntry, CommandRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Input(String),
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<InputError> for CommandError {
    fn from(err: InputError) -> Self {
        CommandError::Input(err.message)
    }
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Form(inner) => CliError::Form(inner),
            CommandError::Io(inner) => CliError::Io(inner),
            CommandError::Dialoguer(inner) => CliError::Prompt(inner),
            other => CliError::Usage(other.to_string()),
        }
    }
}

pub struct ShellContext {
    pub(crate) mode: CliMode,
    pub(crate) registry: CommandRegistry,
    pub(crate) host: TerminalHost,
    pub(crate) theme: ColorfulTheme,
    pub(crate) running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode, spec: &FormSpec) -> Result<Self, CliError> {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let form = spec
            .build(&TransformCatalog::default())?
            .with_input_surface(TerminalSurface::default());
        let host = TerminalHost::mount(form);
        tracing::debug!(
            fields = host.form().descriptors().len(),
            mounted = host.form().registry().len(),
            "terminal host mounted"
        );

        Ok(Self {
            mode,
            registry,
            host,
            theme: ColorfulTheme::default(),
            running: true,
        })
    }

    /// Loads the form definition at `path` and mounts it.
    pub fn from_path(mode: CliMode, path: &Path) -> Result<Self, CliError> {
        let spec = FormSpec::load(path)?;
        Self::new(mode, &spec)
    }

    pub(crate) fn mode(&self) -> CliMode {
        self.mode
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn prompt(&self) -> String {
        match self.host.form().focus_state() {
            FocusState::ActiveAt(name) => format!("formview [{}]> ", name),
            FocusState::NoneActive => "formview> ".to_string(),
        }
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    #[cfg(test)]
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match crate::cli::shell::parse_command_line(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                output::warning(&err);
                return Ok(LoopControl::Continue);
            }
        };

        if tokens.is_empty() {
            return Ok(LoopControl::Continue);
        }

        let command = tokens[0].to_lowercase();
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();
        self.dispatch(&command, &tokens[0], &args)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));
        if let Some(best) = closest(input, self.registry.names()) {
            output::info(format!("Suggestion: `{}`?", best));
        }
    }

    /// Reports an unknown field, pointing at the closest declared name.
    pub(crate) fn unknown_field(&self, input: &str) -> CommandError {
        let names = self
            .host
            .form()
            .descriptors()
            .iter()
            .map(|descriptor| descriptor.name.as_str());
        match closest(input, names) {
            Some(best) => CommandError::InvalidArguments(format!(
                "Unknown field `{}`. Did you mean `{}`?",
                input, best
            )),
            None => CommandError::InvalidArguments(format!("Unknown field `{}`.", input)),
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(dialoguer::Confirm::with_theme(&self.theme)
            .with_prompt("Exit shell?")
            .default(true)
            .interact()?)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::Io(err) => Err(CliError::Io(err)),
            other => {
                output::error(other);
                Ok(())
            }
        }
    }
}

fn closest<'a>(input: &str, candidates: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    candidates
        .map(|candidate| (levenshtein(candidate, input), candidate))
        .filter(|(distance, _)| *distance <= 3)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate)
}

#[cfg(test)]
pub(crate) fn process_script(spec: &str, lines: &[&str]) -> Result<ShellContext, CliError> {
    let spec = FormSpec::from_json_str(spec)?;
    let mut context = ShellContext::new(CliMode::Script, &spec)?;
    for line in lines {
        match context.process_line(line)? {
            LoopControl::Continue => {}
            LoopControl::Exit => break,
        }
    }
    Ok(context)
}
