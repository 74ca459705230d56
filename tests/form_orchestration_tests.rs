use std::cell::{Cell, RefCell};
use std::rc::Rc;

use formview_core::errors::FormError;
use formview_core::form::transforms::to_number;
use formview_core::form::{
    FieldController, FieldDescriptor, FieldKind, FocusAdvance, FocusState, Form, FormCallbacks,
    InputSurface, Registration, SharedController, SubmitOutcome, Support,
};
use serde_json::{json, Value};

/// Controller whose capabilities are switched on per test.
#[derive(Default)]
struct Stub {
    value: Option<Value>,
    valid: Option<bool>,
    clearable: bool,
    focusable: bool,
    showable: bool,
    cleared: usize,
    highlighted: usize,
}

impl FieldController for Stub {
    fn get_value(&self) -> Option<Value> {
        self.value.clone()
    }

    fn clear_value(&mut self) -> Support {
        if !self.clearable {
            return Support::Unsupported;
        }
        self.cleared += 1;
        self.value = Some(Value::Null);
        Support::Handled
    }

    fn is_valid(&self) -> Option<bool> {
        self.valid
    }

    fn highlight_invalid(&mut self) -> Support {
        self.highlighted += 1;
        Support::Handled
    }

    fn focus(&mut self) -> Support {
        if self.focusable {
            Support::Handled
        } else {
            Support::Unsupported
        }
    }

    fn show(&mut self) -> Support {
        if self.showable {
            Support::Handled
        } else {
            Support::Unsupported
        }
    }
}

#[derive(Clone, Default)]
struct CountingSurface {
    dismissed: Rc<Cell<usize>>,
}

impl InputSurface for CountingSurface {
    fn dismiss(&mut self) {
        self.dismissed.set(self.dismissed.get() + 1);
    }
}

struct Mounted {
    stubs: Vec<Rc<RefCell<Stub>>>,
    _handles: Vec<Registration>,
}

fn mount(form: &Form, stubs: Vec<(&str, Stub)>) -> Mounted {
    let mut mounted = Mounted {
        stubs: Vec::new(),
        _handles: Vec::new(),
    };
    for (name, stub) in stubs {
        let stub = Rc::new(RefCell::new(stub));
        let shared: SharedController = stub.clone();
        mounted._handles.push(form.register(name, &shared));
        mounted.stubs.push(stub);
    }
    mounted
}

fn valued(value: Value) -> Stub {
    Stub {
        value: Some(value),
        ..Stub::default()
    }
}

fn judged(valid: Option<bool>) -> Stub {
    Stub {
        valid,
        ..Stub::default()
    }
}

#[test]
fn validity_ignores_optional_fields_and_missing_capabilities() {
    let form = Form::new(vec![
        FieldDescriptor::text("a").with_required(),
        FieldDescriptor::text("b").with_required(),
        FieldDescriptor::text("c"),
        FieldDescriptor::text("d").with_required(),
    ]);
    let mounted = mount(
        &form,
        vec![
            ("a", judged(Some(true))),
            ("b", judged(None)),
            ("c", judged(Some(false))),
        ],
    );
    // `d` has no controller at all.
    assert!(form.is_valid());

    mounted.stubs[1].borrow_mut().valid = Some(false);
    assert!(!form.is_valid());
}

#[test]
fn what_is_invalid_reports_first_in_declaration_order() {
    let form = Form::new(vec![
        FieldDescriptor::text("a").with_required(),
        FieldDescriptor::text("b").with_required(),
    ]);
    // Registration order must not matter.
    let _mounted = mount(
        &form,
        vec![("b", judged(Some(false))), ("a", judged(Some(false)))],
    );
    assert_eq!(form.what_is_invalid().unwrap().name, "a");
}

#[test]
fn what_is_invalid_on_valid_form_is_an_error() {
    let form = Form::new(vec![FieldDescriptor::text("a").with_required()]);
    let _mounted = mount(&form, vec![("a", judged(Some(true)))]);
    assert!(matches!(form.what_is_invalid(), Err(FormError::NothingInvalid)));
}

#[test]
fn resolved_keys_use_alias_and_skip_fields_without_values() {
    let form = Form::new(vec![
        FieldDescriptor::text("dob").with_alias("birthDate"),
        FieldDescriptor::new("agree", FieldKind::Boolean),
        FieldDescriptor::new("send", FieldKind::Submit),
    ]);
    let _mounted = mount(
        &form,
        vec![("dob", valued(json!("2000-01-01"))), ("agree", Stub::default())],
    );

    let output = form.resolve_values().unwrap();
    assert_eq!(output.into_value(), json!({ "birthDate": "2000-01-01" }));
}

#[test]
fn transform_runs_before_insertion() {
    let form = Form::new(vec![FieldDescriptor::text("age").with_resolve(to_number)]);
    let _mounted = mount(&form, vec![("age", valued(json!("30")))]);

    let output = form.resolve_values().unwrap();
    assert_eq!(output.get("age"), Some(&json!(30)));
    assert!(output.get("age").unwrap().is_number());
}

#[test]
fn failing_transform_names_the_field() {
    let form = Form::new(vec![FieldDescriptor::text("age").with_resolve(to_number)]);
    let _mounted = mount(&form, vec![("age", valued(json!("thirty")))]);

    match form.resolve_values() {
        Err(FormError::Transform { field, .. }) => assert_eq!(field, "age"),
        other => panic!("Unexpected result: {:?}", other),
    }
}

#[test]
fn invalid_submit_highlights_once_and_skips_on_submit() {
    let submitted = Rc::new(Cell::new(0));
    let counter = submitted.clone();
    let mut form = Form::new(vec![
        FieldDescriptor::text("name").with_required(),
        FieldDescriptor::text("email").with_required(),
    ])
    .with_callbacks(FormCallbacks::new().on_submit(move |_| counter.set(counter.get() + 1)));
    let mounted = mount(
        &form,
        vec![("name", judged(Some(false))), ("email", judged(Some(false)))],
    );

    let outcome = form.submit().unwrap();
    assert!(matches!(outcome, SubmitOutcome::Rejected(ref field) if field.name == "name"));
    assert_eq!(mounted.stubs[0].borrow().highlighted, 1);
    assert_eq!(mounted.stubs[1].borrow().highlighted, 0);
    assert_eq!(submitted.get(), 0);
}

#[test]
fn clear_reaches_every_clearable_controller_then_notifies_once() {
    let notified = Rc::new(Cell::new(0));
    let counter = notified.clone();
    let mut form = Form::new(vec![
        FieldDescriptor::text("a"),
        FieldDescriptor::text("b"),
        FieldDescriptor::new("c", FieldKind::Boolean),
    ])
    .with_callbacks(FormCallbacks::new().on_clear(move || counter.set(counter.get() + 1)));
    let clearable = || Stub {
        clearable: true,
        value: Some(json!("x")),
        ..Stub::default()
    };
    let mounted = mount(
        &form,
        vec![("b", clearable()), ("a", clearable()), ("c", Stub::default())],
    );

    let outcome = form.clear();
    assert_eq!(outcome.cleared, 2);
    assert_eq!(mounted.stubs[0].borrow().cleared, 1);
    assert_eq!(mounted.stubs[1].borrow().cleared, 1);
    assert_eq!(notified.get(), 1);
}

#[test]
fn clear_on_empty_form_still_notifies() {
    let notified = Rc::new(Cell::new(0));
    let counter = notified.clone();
    let mut form = Form::new(Vec::new())
        .with_callbacks(FormCallbacks::new().on_clear(move || counter.set(counter.get() + 1)));

    assert_eq!(form.clear().cleared, 0);
    assert_eq!(notified.get(), 1);
}

#[test]
fn advancing_past_last_field_dismisses_once() {
    let surface = CountingSurface::default();
    let dismissed = surface.dismissed.clone();
    let mut form = Form::new(vec![FieldDescriptor::text("a"), FieldDescriptor::text("b")])
        .with_input_surface(surface);
    let _mounted = mount(&form, vec![("a", Stub::default()), ("b", Stub::default())]);

    form.on_field_enter("b");
    assert_eq!(form.advance(), FocusAdvance::Dismissed);
    assert_eq!(dismissed.get(), 1);
}

#[test]
fn advance_prefers_focus_then_show() {
    let surface = CountingSurface::default();
    let dismissed = surface.dismissed.clone();
    let mut form = Form::new(vec![
        FieldDescriptor::text("name"),
        FieldDescriptor::new("plan", FieldKind::Option),
        FieldDescriptor::new("news", FieldKind::Boolean),
    ])
    .with_input_surface(surface);
    let _mounted = mount(
        &form,
        vec![
            (
                "name",
                Stub {
                    focusable: true,
                    showable: true,
                    ..Stub::default()
                },
            ),
            (
                "plan",
                Stub {
                    showable: true,
                    ..Stub::default()
                },
            ),
            ("news", Stub::default()),
        ],
    );

    assert_eq!(form.focus_state(), &FocusState::NoneActive);
    assert_eq!(form.advance(), FocusAdvance::Focused("name".into()));
    form.on_field_enter("name");
    assert_eq!(form.advance(), FocusAdvance::Shown("plan".into()));
    form.on_field_enter("plan");
    assert_eq!(form.advance(), FocusAdvance::Inert("news".into()));
    assert_eq!(form.focus_state(), &FocusState::ActiveAt("plan".into()));
    assert_eq!(dismissed.get(), 0);
}

#[test]
fn resolve_values_is_idempotent_and_fresh() {
    let form = Form::new(vec![FieldDescriptor::text("name"), FieldDescriptor::text("age")]);
    let _mounted = mount(
        &form,
        vec![("name", valued(json!("Ada"))), ("age", valued(json!(36)))],
    );

    let mut first = form.resolve_values().unwrap().into_value();
    let second = form.resolve_values().unwrap().into_value();
    assert_eq!(first, second);

    first["name"] = json!("changed");
    assert_eq!(second["name"], json!("Ada"));
    assert_eq!(form.resolve_values().unwrap().get("name"), Some(&json!("Ada")));
}

#[test]
fn dropped_registration_leaves_the_form() {
    let form = Form::new(vec![FieldDescriptor::text("name").with_required()]);
    let mounted = mount(&form, vec![("name", judged(Some(false)))]);
    assert!(!form.is_valid());

    drop(mounted);
    assert!(form.is_valid());
    assert!(form.resolve_values().unwrap().is_empty());
}

#[test]
fn duplicate_names_resolve_to_the_latest_controller() {
    let mut form = Form::new(vec![
        FieldDescriptor::text("x").with_required(),
        FieldDescriptor::text("x").with_required(),
    ]);
    let older = Rc::new(RefCell::new(Stub {
        value: Some(json!("old")),
        valid: Some(false),
        ..Stub::default()
    }));
    let newer = Rc::new(RefCell::new(Stub {
        value: Some(json!("new")),
        valid: Some(true),
        ..Stub::default()
    }));
    let older_shared: SharedController = older.clone();
    let newer_shared: SharedController = newer.clone();
    let older_handle = form.register("x", &older_shared);
    let _newer_handle = form.register("x", &newer_shared);

    assert_eq!(form.resolve_values().unwrap().into_value(), json!({ "x": "new" }));
    assert!(form.is_valid());
    match form.submit().unwrap() {
        SubmitOutcome::Accepted(output) => assert_eq!(output.get("x"), Some(&json!("new"))),
        other => panic!("Unexpected outcome: {:?}", other),
    }

    // The shadowed handle must not evict its replacement.
    drop(older_handle);
    assert_eq!(form.registry().len(), 1);
    assert_eq!(form.resolve_values().unwrap().get("x"), Some(&json!("new")));

    newer.borrow_mut().valid = Some(false);
    assert!(matches!(form.submit().unwrap(), SubmitOutcome::Rejected(ref field) if field.name == "x"));
    assert_eq!(newer.borrow().highlighted, 1);
    assert_eq!(older.borrow().highlighted, 0);
}
