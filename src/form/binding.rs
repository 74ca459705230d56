//! Per-field wiring handed to the rendering surface.

use serde_json::Value;

use super::descriptor::{FieldDescriptor, FieldKind};
use super::navigator::blur_on_submit;

/// Widget family the host should render for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    Button,
    Radio,
    Switch,
    Picker,
    TextInput { secure: bool },
}

/// Event the rendered field forwards to the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldAction {
    /// Pressing the field submits the form.
    Submit,
    /// Pressing the field clears the form.
    Clear,
    /// The field reports focus gains and returns. `blur_on_submit` tells the
    /// host to collapse the keyboard on return instead of advancing.
    Navigate { blur_on_submit: bool },
}

/// Presentation hints applied to fields that bring none of their own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresentationHints {
    pub valid_style: Option<Value>,
    pub invalid_style: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct FieldBinding<'a> {
    pub descriptor: &'a FieldDescriptor,
    pub index: usize,
    pub widget: WidgetKind,
    pub action: FieldAction,
    pub valid_style: Option<&'a Value>,
    pub invalid_style: Option<&'a Value>,
}

impl FieldBinding<'_> {
    /// Buttons are stateless and never join the registry.
    pub fn registers(&self) -> bool {
        self.widget != WidgetKind::Button
    }

    pub fn blur_on_submit(&self) -> bool {
        matches!(
            self.action,
            FieldAction::Navigate {
                blur_on_submit: true
            }
        )
    }
}

pub fn widget_for(kind: &FieldKind) -> WidgetKind {
    match kind {
        FieldKind::Button | FieldKind::Submit | FieldKind::Clear => WidgetKind::Button,
        FieldKind::Radio => WidgetKind::Radio,
        FieldKind::Boolean => WidgetKind::Switch,
        FieldKind::Option => WidgetKind::Picker,
        FieldKind::Password => WidgetKind::TextInput { secure: true },
        _ => WidgetKind::TextInput { secure: false },
    }
}

/// Builds the binding of every descriptor, in declaration order.
pub fn bind_fields<'a>(
    descriptors: &'a [FieldDescriptor],
    hints: &'a PresentationHints,
) -> Vec<FieldBinding<'a>> {
    descriptors
        .iter()
        .enumerate()
        .map(|(index, descriptor)| {
            let action = match descriptor.kind {
                FieldKind::Submit => FieldAction::Submit,
                FieldKind::Clear => FieldAction::Clear,
                _ => FieldAction::Navigate {
                    blur_on_submit: blur_on_submit(descriptors, index),
                },
            };
            FieldBinding {
                descriptor,
                index,
                widget: widget_for(&descriptor.kind),
                action,
                valid_style: descriptor
                    .valid_style
                    .as_ref()
                    .or(hints.valid_style.as_ref()),
                invalid_style: descriptor
                    .invalid_style
                    .as_ref()
                    .or(hints.invalid_style.as_ref()),
            }
        })
        .collect()
}
