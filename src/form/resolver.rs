//! Assembles the submitted value object from the mounted controllers.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::FormError;

use super::descriptor::FieldDescriptor;
use super::registry::ControllerRegistry;

/// Output of a resolution pass, keyed by alias or field name.
///
/// Keys keep the declaration order of their fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResolvedOutput {
    values: Map<String, Value>,
}

impl ResolvedOutput {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.values)
    }
}

impl From<ResolvedOutput> for Value {
    fn from(output: ResolvedOutput) -> Self {
        output.into_value()
    }
}

/// Reads every mounted field and builds a fresh output object.
///
/// Fields without a live controller or without a value capability are left
/// out. A failing transform aborts the whole pass.
pub fn resolve_values(
    descriptors: &[FieldDescriptor],
    registry: &ControllerRegistry,
) -> Result<ResolvedOutput, FormError> {
    let mut values = Map::new();

    for descriptor in descriptors {
        let Some(controller) = registry.get(&descriptor.name) else {
            continue;
        };
        let Some(raw) = controller.borrow().get_value() else {
            continue;
        };

        let value = match &descriptor.resolve {
            Some(resolve) => resolve(raw).map_err(|source| FormError::Transform {
                field: descriptor.name.clone(),
                source,
            })?,
            None => raw,
        };

        values.insert(descriptor.output_key().to_string(), value);
    }

    Ok(ResolvedOutput { values })
}
