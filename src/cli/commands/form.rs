use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::host::PressOutcome;
use crate::cli::output;
use crate::cli::prompts;
use crate::cli::registry::CommandEntry;
use crate::form::{
    ClearOutcome, FocusAdvance, FocusState, ResolvedOutput, SubmitOutcome, WidgetKind,
};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("fields", "List fields and their state", "fields", cmd_fields)
            .with_aliases(&["ls"]),
        CommandEntry::new("set", "Enter a value into a field", "set <field> <value>", cmd_set),
        CommandEntry::new("focus", "Move input focus to a field", "focus <field>", cmd_focus),
        CommandEntry::new("next", "Press return on the active field", "next", cmd_next)
            .with_aliases(&["n"]),
        CommandEntry::new(
            "fill",
            "Prompt for every field in order",
            "fill",
            prompts::cmd_fill,
        ),
        CommandEntry::new("press", "Press a button field", "press <button>", cmd_press),
        CommandEntry::new("valid", "Check required fields", "valid", cmd_valid),
        CommandEntry::new("values", "Show the resolved values", "values", cmd_values),
        CommandEntry::new("submit", "Validate and submit the form", "submit", cmd_submit),
        CommandEntry::new("clear", "Reset every field", "clear", cmd_clear),
    ]
}

fn cmd_fields(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let form = context.host.form();
    let active = form.focus_state().active().map(str::to_string);
    let rows: Vec<Vec<String>> = form
        .bindings()
        .iter()
        .map(|binding| {
            let name = binding.descriptor.name.clone();
            let required = if binding.descriptor.required { "yes" } else { "" };
            let (value, state) = match context.host.field(&name) {
                Some(field) => {
                    let field = field.borrow();
                    let mut state = Vec::new();
                    if active.as_deref() == Some(name.as_str()) {
                        state.push("active");
                    }
                    if field.is_overlay_open() {
                        state.push("open");
                    }
                    if field.is_highlighted() {
                        state.push("invalid");
                    }
                    (field.display_value(), state.join(","))
                }
                None => (String::from("[button]"), String::new()),
            };
            vec![
                name,
                binding.descriptor.kind.to_string(),
                required.to_string(),
                value,
                state,
            ]
        })
        .collect();

    output::section("Fields");
    println!(
        "{}",
        output::render_table(&["Field", "Type", "Required", "Value", "State"], &rows)
    );
    Ok(())
}

fn cmd_set(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((name, rest)) = args.split_first() else {
        return Err(CommandError::InvalidArguments(
            "usage: set <field> <value>".into(),
        ));
    };
    if context.host.field(name).is_none() {
        return Err(context.unknown_field(name));
    }
    context.host.set(name, &rest.join(" "))?;
    output::success(format!("Updated `{}`.", name));
    Ok(())
}

fn cmd_focus(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [name] = args else {
        return Err(CommandError::InvalidArguments("usage: focus <field>".into()));
    };
    if context.host.field(name).is_none() {
        return Err(context.unknown_field(name));
    }
    context.host.enter(name)?;
    announce_editing(context, name);
    Ok(())
}

fn cmd_next(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if let FocusState::ActiveAt(name) = context.host.form().focus_state() {
        let collapses = context
            .host
            .form()
            .bindings()
            .iter()
            .any(|binding| &binding.descriptor.name == name && binding.blur_on_submit());
        if collapses {
            output::hint(format!("Return on `{}` closes the keyboard.", name));
        }
    }

    match context.host.next() {
        FocusAdvance::Focused(name) | FocusAdvance::Shown(name) => announce_editing(context, &name),
        FocusAdvance::Inert(name) => {
            output::info(format!("`{}` cannot take input focus.", name));
        }
        FocusAdvance::Dismissed => {}
    }
    Ok(())
}

fn announce_editing(context: &ShellContext, name: &str) {
    let Some(field) = context.host.field(name) else {
        return;
    };
    let field = field.borrow();
    output::info(format!("Editing `{}`.", field.label()));
    if matches!(field.widget(), WidgetKind::Radio | WidgetKind::Picker) && !field.choices().is_empty() {
        let listed: Vec<String> = field
            .choices()
            .iter()
            .enumerate()
            .map(|(index, choice)| format!("{}) {}", index + 1, choice.label))
            .collect();
        output::info(format!("Choices: {}", listed.join("  ")));
    }
}

fn cmd_press(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [name] = args else {
        return Err(CommandError::InvalidArguments("usage: press <button>".into()));
    };
    let is_button = context
        .host
        .form()
        .bindings()
        .iter()
        .any(|binding| binding.descriptor.name == *name && binding.widget == WidgetKind::Button);
    if !is_button {
        return Err(CommandError::InvalidArguments(format!(
            "`{}` is not a button.",
            name
        )));
    }

    match context.host.press(name)? {
        PressOutcome::Submitted(outcome) => report_submit(outcome),
        PressOutcome::Cleared(outcome) => {
            report_clear(outcome);
            Ok(())
        }
        PressOutcome::NoAction => {
            output::info(format!("`{}` has no form action.", name));
            Ok(())
        }
    }
}

fn cmd_valid(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let form = context.host.form();
    if form.is_valid() {
        output::success("All required fields are valid.");
    } else {
        let field = form.what_is_invalid()?;
        output::warning(format!("`{}` is required and not valid yet.", field.name));
    }
    Ok(())
}

fn cmd_values(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let values = context.host.form().resolve_values()?;
    print_values(&values)
}

fn cmd_submit(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let outcome = context.host.submit()?;
    report_submit(outcome)
}

fn cmd_clear(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let outcome = context.host.clear();
    report_clear(outcome);
    Ok(())
}

fn report_submit(outcome: SubmitOutcome) -> CommandResult {
    match outcome {
        SubmitOutcome::Accepted(values) => {
            output::success("Form submitted.");
            print_values(&values)
        }
        SubmitOutcome::Rejected(field) => {
            output::warning(format!(
                "Submission rejected: `{}` is required and not valid.",
                field.name
            ));
            Ok(())
        }
    }
}

fn report_clear(outcome: ClearOutcome) {
    output::success(format!("Cleared {} field(s).", outcome.cleared));
}

fn print_values(values: &ResolvedOutput) -> CommandResult {
    println!("{}", serde_json::to_string_pretty(values)?);
    Ok(())
}
