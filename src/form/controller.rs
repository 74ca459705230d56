//! Capability contract between the form and the widgets that render fields.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde_json::Value;

/// Result of invoking an optional capability on a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Support {
    Handled,
    Unsupported,
}

impl Support {
    pub fn is_handled(self) -> bool {
        matches!(self, Support::Handled)
    }
}

/// Live object bound to one rendered field.
///
/// Every capability is optional. The default implementations report the
/// capability as absent, and the form skips absent capabilities silently.
pub trait FieldController {
    /// Current value, or `None` when the field does not expose one.
    fn get_value(&self) -> Option<Value> {
        None
    }

    fn clear_value(&mut self) -> Support {
        Support::Unsupported
    }

    /// Validity of the current value, or `None` when the field cannot judge it.
    fn is_valid(&self) -> Option<bool> {
        None
    }

    fn highlight_invalid(&mut self) -> Support {
        Support::Unsupported
    }

    /// Requests keyboard focus.
    fn focus(&mut self) -> Support {
        Support::Unsupported
    }

    /// Opens a non-keyboard overlay such as a picker.
    fn show(&mut self) -> Support {
        Support::Unsupported
    }
}

/// Controller handle owned by the rendering surface.
pub type SharedController = Rc<RefCell<dyn FieldController>>;

pub(crate) type WeakController = Weak<RefCell<dyn FieldController>>;

/// Host hook able to collapse the platform keyboard or input surface.
pub trait InputSurface {
    fn dismiss(&mut self);
}

/// Surface used when the host has nothing to dismiss.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSurface;

impl InputSurface for NoopSurface {
    fn dismiss(&mut self) {}
}
