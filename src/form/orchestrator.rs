//! The form façade. Hosts feed it focus, return, submit and clear events.

use std::collections::HashSet;
use std::fmt;

use crate::errors::FormError;

use super::binding::{bind_fields, FieldBinding, PresentationHints};
use super::controller::{InputSurface, NoopSurface, SharedController};
use super::descriptor::FieldDescriptor;
use super::navigator::{FocusAdvance, FocusNavigator, FocusState};
use super::registry::{ControllerRegistry, Registration};
use super::resolver::{resolve_values, ResolvedOutput};
use super::validity;

type SubmitCallback = dyn FnMut(&ResolvedOutput);
type InvalidCallback = dyn FnMut(&FieldDescriptor);
type ClearCallback = dyn FnMut();

/// Optional callback adapters for event-driven hosts. Outcomes are returned
/// from [`Form::submit`] and [`Form::clear`] either way.
#[derive(Default)]
pub struct FormCallbacks {
    on_submit: Option<Box<SubmitCallback>>,
    on_invalid: Option<Box<InvalidCallback>>,
    on_clear: Option<Box<ClearCallback>>,
}

impl FormCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_submit(mut self, callback: impl FnMut(&ResolvedOutput) + 'static) -> Self {
        self.on_submit = Some(Box::new(callback));
        self
    }

    /// When set, invalid submissions are reported here instead of
    /// highlighting the offending field.
    pub fn on_invalid(mut self, callback: impl FnMut(&FieldDescriptor) + 'static) -> Self {
        self.on_invalid = Some(Box::new(callback));
        self
    }

    pub fn on_clear(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_clear = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for FormCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormCallbacks")
            .field("on_submit", &self.on_submit.is_some())
            .field("on_invalid", &self.on_invalid.is_some())
            .field("on_clear", &self.on_clear.is_some())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    Accepted(ResolvedOutput),
    /// Submission aborted on the first invalid required field.
    Rejected(FieldDescriptor),
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearOutcome {
    /// Controllers that supported clearing.
    pub cleared: usize,
}

pub struct Form {
    descriptors: Vec<FieldDescriptor>,
    registry: ControllerRegistry,
    navigator: FocusNavigator,
    callbacks: FormCallbacks,
    hints: PresentationHints,
    surface: Box<dyn InputSurface>,
}

impl Form {
    pub fn new(descriptors: Vec<FieldDescriptor>) -> Self {
        warn_on_duplicates(&descriptors);
        let registry =
            ControllerRegistry::with_declaration_order(descriptors.iter().map(|d| d.name.clone()));
        Self {
            descriptors,
            registry,
            navigator: FocusNavigator::new(),
            callbacks: FormCallbacks::default(),
            hints: PresentationHints::default(),
            surface: Box::new(NoopSurface),
        }
    }

    pub fn with_callbacks(mut self, callbacks: FormCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub fn with_hints(mut self, hints: PresentationHints) -> Self {
        self.hints = hints;
        self
    }

    pub fn with_input_surface(mut self, surface: impl InputSurface + 'static) -> Self {
        self.surface = Box::new(surface);
        self
    }

    pub fn descriptors(&self) -> &[FieldDescriptor] {
        &self.descriptors
    }

    pub fn descriptor(&self, name: &str) -> Option<&FieldDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    /// Installs a new descriptor list, as a re-render with changed fields
    /// would. Mounted controllers stay registered until their hosts release
    /// them.
    pub fn set_descriptors(&mut self, descriptors: Vec<FieldDescriptor>) {
        warn_on_duplicates(&descriptors);
        self.registry
            .set_declaration_order(descriptors.iter().map(|d| d.name.clone()));
        self.descriptors = descriptors;
    }

    pub fn hints(&self) -> &PresentationHints {
        &self.hints
    }

    /// Wiring for every field in declaration order.
    pub fn bindings(&self) -> Vec<FieldBinding<'_>> {
        bind_fields(&self.descriptors, &self.hints)
    }

    pub fn registry(&self) -> &ControllerRegistry {
        &self.registry
    }

    /// Called by the host when a field's controller mounts.
    pub fn register(&self, name: &str, controller: &SharedController) -> Registration {
        self.registry.register(name, controller)
    }

    pub fn focus_state(&self) -> &FocusState {
        self.navigator.state()
    }

    pub fn is_valid(&self) -> bool {
        validity::is_valid(&self.descriptors, &self.registry)
    }

    pub fn what_is_invalid(&self) -> Result<&FieldDescriptor, FormError> {
        validity::what_is_invalid(&self.descriptors, &self.registry)
    }

    pub fn resolve_values(&self) -> Result<ResolvedOutput, FormError> {
        resolve_values(&self.descriptors, &self.registry)
    }

    /// Validates and, when every required field passes, resolves the output.
    ///
    /// A rejected submission goes to `on_invalid` when configured, otherwise
    /// the field's controller is asked to highlight itself. Only a failing
    /// transform produces an error.
    pub fn submit(&mut self) -> Result<SubmitOutcome, FormError> {
        if !self.is_valid() {
            let invalid = self.what_is_invalid()?.clone();
            tracing::debug!(field = %invalid.name, "submission rejected");

            if let Some(on_invalid) = self.callbacks.on_invalid.as_mut() {
                on_invalid(&invalid);
            } else if let Some(controller) = self.registry.get(&invalid.name) {
                controller.borrow_mut().highlight_invalid();
            }
            return Ok(SubmitOutcome::Rejected(invalid));
        }

        let output = self.resolve_values()?;
        tracing::info!(fields = output.len(), "form submitted");
        if let Some(on_submit) = self.callbacks.on_submit.as_mut() {
            on_submit(&output);
        }
        Ok(SubmitOutcome::Accepted(output))
    }

    /// Clears every field that supports it, then notifies `on_clear`.
    pub fn clear(&mut self) -> ClearOutcome {
        let mut cleared = 0;
        self.registry.for_each_in_order(|_, controller| {
            if controller.borrow_mut().clear_value().is_handled() {
                cleared += 1;
            }
        });
        tracing::info!(cleared, "form cleared");

        if let Some(on_clear) = self.callbacks.on_clear.as_mut() {
            on_clear();
        }
        ClearOutcome { cleared }
    }

    /// Host event: a field gained input focus.
    pub fn on_field_enter(&mut self, name: &str) {
        self.navigator.on_field_enter(name);
    }

    /// Host event: the active field was left with a return/next action.
    pub fn advance(&mut self) -> FocusAdvance {
        self.navigator.advance(&self.registry, self.surface.as_mut())
    }
}

impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("descriptors", &self.descriptors)
            .field("registry", &self.registry)
            .field("focus", self.navigator.state())
            .field("callbacks", &self.callbacks)
            .field("hints", &self.hints)
            .finish_non_exhaustive()
    }
}

fn warn_on_duplicates(descriptors: &[FieldDescriptor]) {
    let mut seen = HashSet::new();
    for descriptor in descriptors {
        if !seen.insert(descriptor.name.as_str()) {
            tracing::warn!(
                field = %descriptor.name,
                "duplicate field name; the later field shadows the earlier one"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::controller::{FieldController, Support};
    use crate::form::descriptor::FieldKind;
    use serde_json::{json, Value};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Default)]
    struct Input {
        value: String,
        highlighted: usize,
    }

    impl FieldController for Input {
        fn get_value(&self) -> Option<Value> {
            Some(Value::String(self.value.clone()))
        }

        fn clear_value(&mut self) -> Support {
            self.value.clear();
            Support::Handled
        }

        fn is_valid(&self) -> Option<bool> {
            Some(!self.value.trim().is_empty())
        }

        fn highlight_invalid(&mut self) -> Support {
            self.highlighted += 1;
            Support::Handled
        }
    }

    fn input(value: &str) -> Rc<RefCell<Input>> {
        Rc::new(RefCell::new(Input {
            value: value.into(),
            ..Input::default()
        }))
    }

    #[test]
    fn rejected_submission_prefers_on_invalid_over_highlight() {
        let reported = Rc::new(RefCell::new(Vec::new()));
        let sink = reported.clone();
        let mut form = Form::new(vec![FieldDescriptor::text("name").with_required()])
            .with_callbacks(
                FormCallbacks::new().on_invalid(move |field| sink.borrow_mut().push(field.name.clone())),
            );
        let name = input("");
        let shared: SharedController = name.clone();
        let _handle = form.register("name", &shared);

        let outcome = form.submit().unwrap();
        assert!(matches!(outcome, SubmitOutcome::Rejected(ref field) if field.name == "name"));
        assert_eq!(*reported.borrow(), vec!["name".to_string()]);
        assert_eq!(name.borrow().highlighted, 0);
    }

    #[test]
    fn accepted_submission_reaches_on_submit() {
        let submitted = Rc::new(Cell::new(0));
        let counter = submitted.clone();
        let mut form = Form::new(vec![
            FieldDescriptor::text("age").with_resolve(crate::form::transforms::to_number),
        ])
        .with_callbacks(FormCallbacks::new().on_submit(move |_| counter.set(counter.get() + 1)));
        let age: SharedController = input("30");
        let _handle = form.register("age", &age);

        match form.submit().unwrap() {
            SubmitOutcome::Accepted(output) => assert_eq!(output.get("age"), Some(&json!(30))),
            other => panic!("Unexpected outcome: {:?}", other),
        }
        assert_eq!(submitted.get(), 1);
    }

    #[test]
    fn set_descriptors_reorders_navigation() {
        let mut form = Form::new(vec![FieldDescriptor::text("a"), FieldDescriptor::text("b")]);
        let a: SharedController = input("x");
        let b: SharedController = input("y");
        let _handles = vec![form.register("a", &a), form.register("b", &b)];
        assert_eq!(form.registry().ordered_names(), vec!["a", "b"]);

        form.set_descriptors(vec![
            FieldDescriptor::text("b"),
            FieldDescriptor::new("a", FieldKind::Email),
        ]);
        assert_eq!(form.registry().ordered_names(), vec!["b", "a"]);
        assert!(form.bindings()[1].blur_on_submit());
    }
}
