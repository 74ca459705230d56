//! Focus sequencing across fields in declaration order.

use super::controller::InputSurface;
use super::descriptor::FieldDescriptor;
use super::registry::ControllerRegistry;

/// Which field currently holds input focus.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FocusState {
    #[default]
    NoneActive,
    ActiveAt(String),
}

impl FocusState {
    pub fn active(&self) -> Option<&str> {
        match self {
            FocusState::NoneActive => None,
            FocusState::ActiveAt(name) => Some(name),
        }
    }
}

/// What a call to [`FocusNavigator::advance`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusAdvance {
    /// The next field accepted keyboard focus. The navigator becomes
    /// `ActiveAt` that field once the host reports the focus gain.
    Focused(String),
    /// The next field opened its overlay instead.
    Shown(String),
    /// The next field exists but can neither focus nor show.
    Inert(String),
    /// No field follows; the input surface was dismissed.
    Dismissed,
}

#[derive(Debug, Default)]
pub struct FocusNavigator {
    state: FocusState,
}

impl FocusNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FocusState {
        &self.state
    }

    pub fn on_field_enter(&mut self, name: &str) {
        tracing::debug!(field = name, "field focused");
        self.state = FocusState::ActiveAt(name.to_string());
    }

    /// Moves focus to the field registered right after the active one.
    ///
    /// With no active field, or one the registry does not know, the first
    /// registered field is the target.
    pub fn advance(
        &self,
        registry: &ControllerRegistry,
        surface: &mut dyn InputSurface,
    ) -> FocusAdvance {
        let entries = registry.ordered_entries();
        let next_index = self
            .state
            .active()
            .and_then(|active| entries.iter().position(|(name, _)| name == active))
            .map(|index| index + 1)
            .unwrap_or(0);

        let Some((name, controller)) = entries.get(next_index) else {
            tracing::debug!(active = ?self.state.active(), "no next field; dismissing input");
            surface.dismiss();
            return FocusAdvance::Dismissed;
        };

        let mut controller = controller.borrow_mut();
        if controller.focus().is_handled() {
            tracing::debug!(field = %name, "focus advanced");
            FocusAdvance::Focused(name.clone())
        } else if controller.show().is_handled() {
            tracing::debug!(field = %name, "overlay shown");
            FocusAdvance::Shown(name.clone())
        } else {
            FocusAdvance::Inert(name.clone())
        }
    }
}

/// Whether the field at `index` is the last keyboard-driven one, so returning
/// from it should collapse the input surface instead of advancing.
///
/// `index` is the field's position among all descriptors while the bound is
/// the number of text-like descriptors, which matches only when the
/// keyboard-driven fields come first. Computed on each call so descriptor
/// changes are always reflected.
pub fn blur_on_submit(descriptors: &[FieldDescriptor], index: usize) -> bool {
    let text_like = descriptors
        .iter()
        .filter(|descriptor| descriptor.kind.is_text_like())
        .count();
    text_like.checked_sub(1) == Some(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::controller::{FieldController, SharedController, Support};
    use crate::form::descriptor::FieldKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Probe {
        focusable: bool,
        showable: bool,
        focused: usize,
        shown: usize,
    }

    impl FieldController for Probe {
        fn focus(&mut self) -> Support {
            if !self.focusable {
                return Support::Unsupported;
            }
            self.focused += 1;
            Support::Handled
        }

        fn show(&mut self) -> Support {
            if !self.showable {
                return Support::Unsupported;
            }
            self.shown += 1;
            Support::Handled
        }
    }

    #[derive(Default)]
    struct CountingSurface {
        dismissed: usize,
    }

    impl InputSurface for CountingSurface {
        fn dismiss(&mut self) {
            self.dismissed += 1;
        }
    }

    fn probe(focusable: bool, showable: bool) -> Rc<RefCell<Probe>> {
        Rc::new(RefCell::new(Probe {
            focusable,
            showable,
            ..Probe::default()
        }))
    }

    #[test]
    fn advance_prefers_focus_then_show() {
        let registry = ControllerRegistry::with_declaration_order(["name", "state", "agree"]);
        let name = probe(true, false);
        let state = probe(false, true);
        let agree = probe(false, false);
        let (n, s, a): (SharedController, SharedController, SharedController) =
            (name.clone(), state.clone(), agree.clone());
        let _handles = vec![
            registry.register("name", &n),
            registry.register("state", &s),
            registry.register("agree", &a),
        ];
        let mut surface = CountingSurface::default();
        let mut navigator = FocusNavigator::new();

        assert_eq!(
            navigator.advance(&registry, &mut surface),
            FocusAdvance::Focused("name".into())
        );
        assert_eq!(navigator.state(), &FocusState::NoneActive);

        navigator.on_field_enter("name");
        assert_eq!(
            navigator.advance(&registry, &mut surface),
            FocusAdvance::Shown("state".into())
        );
        assert_eq!(state.borrow().shown, 1);

        navigator.on_field_enter("state");
        assert_eq!(
            navigator.advance(&registry, &mut surface),
            FocusAdvance::Inert("agree".into())
        );

        navigator.on_field_enter("agree");
        assert_eq!(
            navigator.advance(&registry, &mut surface),
            FocusAdvance::Dismissed
        );
        assert_eq!(surface.dismissed, 1);
        assert_eq!(name.borrow().focused, 1);
    }

    #[test]
    fn empty_registry_dismisses() {
        let registry = ControllerRegistry::new();
        let mut surface = CountingSurface::default();
        let navigator = FocusNavigator::new();
        assert_eq!(
            navigator.advance(&registry, &mut surface),
            FocusAdvance::Dismissed
        );
        assert_eq!(surface.dismissed, 1);
    }

    #[test]
    fn blur_on_submit_marks_last_text_field() {
        let descriptors = vec![
            FieldDescriptor::text("name"),
            FieldDescriptor::new("email", FieldKind::Email),
            FieldDescriptor::new("agree", FieldKind::Boolean),
            FieldDescriptor::new("send", FieldKind::Submit),
        ];
        assert!(!blur_on_submit(&descriptors, 0));
        assert!(blur_on_submit(&descriptors, 1));
        assert!(!blur_on_submit(&descriptors, 2));
    }

    #[test]
    fn blur_on_submit_without_text_fields_is_never_set() {
        let descriptors = vec![FieldDescriptor::new("agree", FieldKind::Boolean)];
        assert!(!blur_on_submit(&descriptors, 0));
    }
}
