//! Required-field validity aggregation.

use crate::errors::FormError;

use super::descriptor::FieldDescriptor;
use super::registry::ControllerRegistry;

/// A required field fails only when its live controller reports `false`.
/// Missing controllers and controllers without a validity check pass.
fn field_fails(descriptor: &FieldDescriptor, registry: &ControllerRegistry) -> bool {
    if !descriptor.required {
        return false;
    }
    registry
        .get(&descriptor.name)
        .and_then(|controller| controller.borrow().is_valid())
        .map(|valid| !valid)
        .unwrap_or(false)
}

/// True when every required field is valid.
pub fn is_valid(descriptors: &[FieldDescriptor], registry: &ControllerRegistry) -> bool {
    !descriptors
        .iter()
        .any(|descriptor| field_fails(descriptor, registry))
}

/// First required field, in declaration order, whose controller reports
/// invalid. Fails with [`FormError::NothingInvalid`] when the form is valid.
pub fn what_is_invalid<'a>(
    descriptors: &'a [FieldDescriptor],
    registry: &ControllerRegistry,
) -> Result<&'a FieldDescriptor, FormError> {
    descriptors
        .iter()
        .find(|descriptor| field_fails(descriptor, registry))
        .ok_or(FormError::NothingInvalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::controller::{FieldController, SharedController};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Check(Option<bool>);

    impl FieldController for Check {
        fn is_valid(&self) -> Option<bool> {
            self.0
        }
    }

    fn check(valid: Option<bool>) -> SharedController {
        Rc::new(RefCell::new(Check(valid)))
    }

    #[test]
    fn optional_fields_never_fail() {
        let descriptors = vec![FieldDescriptor::text("note")];
        let registry = ControllerRegistry::new();
        let note = check(Some(false));
        let _handle = registry.register("note", &note);

        assert!(is_valid(&descriptors, &registry));
        assert!(matches!(
            what_is_invalid(&descriptors, &registry),
            Err(FormError::NothingInvalid)
        ));
    }

    #[test]
    fn required_fields_without_check_are_vacuously_valid() {
        let descriptors = vec![
            FieldDescriptor::text("a").with_required(),
            FieldDescriptor::text("unmounted").with_required(),
        ];
        let registry = ControllerRegistry::new();
        let a = check(None);
        let _handle = registry.register("a", &a);

        assert!(is_valid(&descriptors, &registry));
    }

    #[test]
    fn first_invalid_follows_declaration_order() {
        let descriptors = vec![
            FieldDescriptor::text("a").with_required(),
            FieldDescriptor::text("b").with_required(),
            FieldDescriptor::text("c").with_required(),
        ];
        let registry = ControllerRegistry::new();
        let a = check(Some(true));
        let b = check(Some(false));
        let c = check(Some(false));
        let _handles = vec![
            registry.register("c", &c),
            registry.register("b", &b),
            registry.register("a", &a),
        ];

        assert!(!is_valid(&descriptors, &registry));
        assert_eq!(what_is_invalid(&descriptors, &registry).unwrap().name, "b");
    }
}
