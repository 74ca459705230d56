//! Terminal rendering surface: one [`TerminalField`] controller per mounted
//! field, with focus and return events forwarded to the form.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

use crate::errors::FormError;
use crate::form::{
    ClearOutcome, FieldAction, FieldController, FocusAdvance, Form, InputSurface, Registration,
    SharedController, SubmitOutcome, Support, WidgetKind,
};

use super::output;

/// Selectable entry of a radio group or picker. Users may answer with the
/// label or with the 1-based position.
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub label: String,
    pub value: Value,
}

/// Reads `options` from the descriptor's passthrough options. Entries are
/// either plain strings or `{ "label": .., "value": .. }` objects.
fn choices_from(options: &serde_json::Map<String, Value>) -> Vec<Choice> {
    let Some(Value::Array(entries)) = options.get("options") else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| match entry {
            Value::String(label) => Some(Choice {
                label: label.clone(),
                value: entry.clone(),
            }),
            Value::Object(map) => {
                let value = map.get("value")?.clone();
                let label = map
                    .get("label")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| value.to_string());
                Some(Choice { label, value })
            }
            _ => None,
        })
        .collect()
}

/// Input rejected by a terminal field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct InputError {
    pub message: String,
}

impl InputError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug)]
pub struct TerminalField {
    name: String,
    label: String,
    widget: WidgetKind,
    choices: Vec<Choice>,
    initial: Value,
    value: Value,
    highlighted: bool,
    focused: bool,
    overlay_open: bool,
}

impl TerminalField {
    pub fn new(
        name: impl Into<String>,
        widget: WidgetKind,
        options: &serde_json::Map<String, Value>,
    ) -> Self {
        let name = name.into();
        let label = options
            .get("label")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| name.clone());
        let initial = match widget {
            WidgetKind::Switch => Value::Bool(false),
            WidgetKind::TextInput { .. } => Value::String(String::new()),
            _ => Value::Null,
        };
        let value = options.get("value").cloned().unwrap_or_else(|| initial.clone());
        Self {
            name,
            label,
            widget,
            choices: choices_from(options),
            initial,
            value,
            highlighted: false,
            focused: false,
            overlay_open: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn widget(&self) -> WidgetKind {
        self.widget
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_overlay_open(&self) -> bool {
        self.overlay_open
    }

    pub fn blur(&mut self) {
        self.focused = false;
        self.overlay_open = false;
    }

    /// Applies raw user input. Editing a field clears its invalid highlight.
    pub fn set_input(&mut self, raw: &str) -> Result<(), InputError> {
        self.value = match self.widget {
            WidgetKind::TextInput { .. } => Value::String(raw.to_string()),
            WidgetKind::Switch => match raw.trim().to_lowercase().as_str() {
                "y" | "yes" | "true" | "1" | "on" => Value::Bool(true),
                "n" | "no" | "false" | "0" | "off" => Value::Bool(false),
                _ => return Err(InputError::new("Enter yes/no, true/false, or on/off")),
            },
            WidgetKind::Radio | WidgetKind::Picker => self.pick(raw)?,
            WidgetKind::Button => {
                return Err(InputError::new(format!("`{}` does not take input", self.name)))
            }
        };
        self.highlighted = false;
        self.overlay_open = false;
        Ok(())
    }

    pub fn set_value(&mut self, value: Value) {
        self.value = value;
        self.highlighted = false;
    }

    fn pick(&self, raw: &str) -> Result<Value, InputError> {
        let trimmed = raw.trim();
        if self.choices.is_empty() {
            return Ok(Value::String(trimmed.to_string()));
        }
        let by_label = self
            .choices
            .iter()
            .find(|choice| choice.label.eq_ignore_ascii_case(trimmed));
        let by_index = || {
            trimmed
                .parse::<usize>()
                .ok()
                .and_then(|position| position.checked_sub(1))
                .and_then(|index| self.choices.get(index))
        };
        by_label
            .or_else(by_index)
            .map(|choice| choice.value.clone())
            .ok_or_else(|| {
                let labels: Vec<&str> = self.choices.iter().map(|c| c.label.as_str()).collect();
                InputError::new(format!(
                    "Select one of: {} (or its number)",
                    labels.join(", ")
                ))
            })
    }

    /// Human readable rendering of the current value.
    pub fn display_value(&self) -> String {
        match &self.value {
            Value::Null => "-".into(),
            Value::String(text) if text.is_empty() => "-".into(),
            Value::String(text) => match self.widget {
                WidgetKind::TextInput { secure: true } => "*".repeat(text.chars().count()),
                _ => text.clone(),
            },
            Value::Bool(flag) => String::from(if *flag { "yes" } else { "no" }),
            other => self
                .choices
                .iter()
                .find(|choice| &choice.value == other)
                .map(|choice| choice.label.clone())
                .unwrap_or_else(|| other.to_string()),
        }
    }
}

impl FieldController for TerminalField {
    fn get_value(&self) -> Option<Value> {
        Some(self.value.clone())
    }

    fn clear_value(&mut self) -> Support {
        self.value = self.initial.clone();
        self.highlighted = false;
        Support::Handled
    }

    fn is_valid(&self) -> Option<bool> {
        match self.widget {
            WidgetKind::TextInput { .. } => Some(
                self.value
                    .as_str()
                    .map(|text| !text.trim().is_empty())
                    .unwrap_or(false),
            ),
            WidgetKind::Radio | WidgetKind::Picker => Some(!self.value.is_null()),
            WidgetKind::Switch | WidgetKind::Button => None,
        }
    }

    fn highlight_invalid(&mut self) -> Support {
        self.highlighted = true;
        Support::Handled
    }

    fn focus(&mut self) -> Support {
        match self.widget {
            WidgetKind::TextInput { .. } => {
                self.focused = true;
                Support::Handled
            }
            _ => Support::Unsupported,
        }
    }

    fn show(&mut self) -> Support {
        match self.widget {
            WidgetKind::Picker => {
                self.overlay_open = true;
                Support::Handled
            }
            _ => Support::Unsupported,
        }
    }
}

/// Stand-in for the platform keyboard: reports when input is collapsed.
#[derive(Debug, Default)]
pub struct TerminalSurface {
    quiet: bool,
}

impl TerminalSurface {
    pub fn quiet() -> Self {
        Self { quiet: true }
    }
}

impl InputSurface for TerminalSurface {
    fn dismiss(&mut self) {
        if !self.quiet {
            output::info("Input closed; no further fields.");
        }
    }
}

/// Outcome of pressing a button field.
#[derive(Debug)]
pub enum PressOutcome {
    Submitted(SubmitOutcome),
    Cleared(ClearOutcome),
    NoAction,
}

struct MountedField {
    field: Rc<RefCell<TerminalField>>,
    _registration: Registration,
}

/// Mounts every registering field of a form and relays user events to it.
pub struct TerminalHost {
    form: Form,
    mounted: Vec<MountedField>,
    actions: HashMap<String, FieldAction>,
}

impl TerminalHost {
    pub fn mount(form: Form) -> Self {
        let mut to_mount = Vec::new();
        let mut actions = HashMap::new();
        for binding in form.bindings() {
            let name = binding.descriptor.name.clone();
            actions.insert(name.clone(), binding.action);
            if binding.registers() {
                to_mount.push(TerminalField::new(
                    name,
                    binding.widget,
                    &binding.descriptor.options,
                ));
            }
        }

        let mounted = to_mount
            .into_iter()
            .map(|field| {
                let name = field.name().to_string();
                let field = Rc::new(RefCell::new(field));
                let shared: SharedController = field.clone();
                let registration = form.register(&name, &shared);
                MountedField {
                    field,
                    _registration: registration,
                }
            })
            .collect();

        Self {
            form,
            mounted,
            actions,
        }
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut Form {
        &mut self.form
    }

    /// Mounted fields in mount order. Later duplicates shadow earlier ones in
    /// the form, but every mounted widget is listed here.
    pub fn fields(&self) -> impl Iterator<Item = &Rc<RefCell<TerminalField>>> {
        self.mounted.iter().map(|mounted| &mounted.field)
    }

    /// The field the form currently sees under `name`.
    pub fn field(&self, name: &str) -> Option<Rc<RefCell<TerminalField>>> {
        self.mounted
            .iter()
            .rev()
            .find(|mounted| mounted.field.borrow().name() == name)
            .map(|mounted| mounted.field.clone())
    }

    pub fn set(&mut self, name: &str, raw: &str) -> Result<(), InputError> {
        let field = self
            .field(name)
            .ok_or_else(|| InputError::new(format!("Unknown field `{}`", name)))?;
        let result = field.borrow_mut().set_input(raw);
        result
    }

    /// Focus gained on `name`, e.g. the user selected the field directly.
    pub fn enter(&mut self, name: &str) -> Result<(), InputError> {
        let field = self
            .field(name)
            .ok_or_else(|| InputError::new(format!("Unknown field `{}`", name)))?;
        self.blur_all();
        {
            let mut field = field.borrow_mut();
            if !field.focus().is_handled() {
                field.show();
            }
        }
        self.form.on_field_enter(name);
        Ok(())
    }

    /// Return pressed on the active field.
    pub fn next(&mut self) -> FocusAdvance {
        self.blur_all();
        let advance = self.form.advance();
        if let FocusAdvance::Focused(name) | FocusAdvance::Shown(name) = &advance {
            // The terminal reports the focus gain right away.
            self.form.on_field_enter(name);
        }
        advance
    }

    pub fn submit(&mut self) -> Result<SubmitOutcome, FormError> {
        self.form.submit()
    }

    pub fn clear(&mut self) -> ClearOutcome {
        self.form.clear()
    }

    /// Presses a button field, running its submit or clear action.
    pub fn press(&mut self, name: &str) -> Result<PressOutcome, FormError> {
        match self.actions.get(name) {
            Some(FieldAction::Submit) => Ok(PressOutcome::Submitted(self.submit()?)),
            Some(FieldAction::Clear) => Ok(PressOutcome::Cleared(self.clear())),
            _ => Ok(PressOutcome::NoAction),
        }
    }

    fn blur_all(&self) {
        for mounted in &self.mounted {
            mounted.field.borrow_mut().blur();
        }
    }
}
