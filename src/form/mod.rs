//! Form orchestration core.
//!
//! A [`Form`] is built from an ordered list of [`FieldDescriptor`]s. The host
//! renders each field, registers a [`FieldController`] for it, and forwards
//! its events: focus gains go to [`Form::on_field_enter`], returns go to
//! [`Form::advance`], and submit/clear actions go to [`Form::submit`] and
//! [`Form::clear`].

pub mod binding;
pub mod controller;
pub mod descriptor;
pub mod navigator;
pub mod orchestrator;
pub mod registry;
pub mod resolver;
pub mod transforms;
pub mod validity;

pub use binding::{FieldAction, FieldBinding, PresentationHints, WidgetKind};
pub use controller::{FieldController, InputSurface, NoopSurface, SharedController, Support};
pub use descriptor::{FieldDescriptor, FieldKind, SharedResolveCallback, TransformError};
pub use navigator::{blur_on_submit, FocusAdvance, FocusNavigator, FocusState};
pub use orchestrator::{ClearOutcome, Form, FormCallbacks, SubmitOutcome};
pub use registry::{ControllerId, ControllerRegistry, Registration};
pub use resolver::{resolve_values, ResolvedOutput};
pub use transforms::TransformCatalog;
