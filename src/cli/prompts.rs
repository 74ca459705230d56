//! Guided entry: walks every mounted field in order with `dialoguer` prompts.

use dialoguer::{theme::ColorfulTheme, Confirm, Input, Password, Select};
use serde_json::Value;

use crate::cli::core::{CliMode, CommandError, CommandResult, ShellContext};
use crate::cli::host::TerminalField;
use crate::cli::output;
use crate::form::WidgetKind;

pub(crate) fn cmd_fill(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if context.mode() == CliMode::Script {
        return Err(CommandError::InvalidArguments(
            "`fill` needs an interactive terminal; use `set <field> <value>` in scripts.".into(),
        ));
    }

    let fields: Vec<_> = context.host.fields().cloned().collect();
    for field in fields {
        let name = field.borrow().name().to_string();
        context.host.enter(&name)?;

        let answer = {
            let field = field.borrow();
            ask(&context.theme, &field)?
        };
        match answer {
            Some(Answer::Raw(raw)) => {
                if let Err(err) = field.borrow_mut().set_input(&raw) {
                    output::warning(format!("`{}` left unchanged: {}", name, err));
                }
            }
            Some(Answer::Value(value)) => field.borrow_mut().set_value(value),
            None => {}
        }
    }

    output::success("All fields visited. Use `submit` when ready.");
    Ok(())
}

enum Answer {
    Raw(String),
    Value(Value),
}

/// `None` keeps the current value.
fn ask(theme: &ColorfulTheme, field: &TerminalField) -> Result<Option<Answer>, CommandError> {
    let label = field.label();
    let answer = match field.widget() {
        WidgetKind::TextInput { secure: true } => Some(Answer::Raw(
            Password::with_theme(theme)
                .with_prompt(label)
                .allow_empty_password(true)
                .interact()?,
        )),
        WidgetKind::Switch => Some(Answer::Value(Value::Bool(
            Confirm::with_theme(theme)
                .with_prompt(label)
                .default(field.value().as_bool().unwrap_or(false))
                .interact()?,
        ))),
        WidgetKind::Radio | WidgetKind::Picker if !field.choices().is_empty() => {
            let labels: Vec<&str> = field.choices().iter().map(|c| c.label.as_str()).collect();
            let current = field
                .choices()
                .iter()
                .position(|choice| &choice.value == field.value())
                .unwrap_or(0);
            Select::with_theme(theme)
                .with_prompt(label)
                .items(&labels)
                .default(current)
                .interact_opt()?
                .and_then(|index| field.choices().get(index))
                .map(|choice| Answer::Value(choice.value.clone()))
        }
        WidgetKind::Button => None,
        _ => {
            let current = field.value().as_str().unwrap_or_default().to_string();
            Some(Answer::Raw(
                Input::<String>::with_theme(theme)
                    .with_prompt(label)
                    .with_initial_text(current)
                    .allow_empty(true)
                    .interact_text()?,
            ))
        }
    };
    Ok(answer)
}
