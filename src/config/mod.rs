//! JSON form definitions.
//!
//! A definition lists the fields of a form in declaration order. Transforms
//! are referenced by name and looked up in a [`TransformCatalog`] when the
//! form is built.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{fs, path::Path};

use crate::errors::ConfigError;
use crate::form::{FieldDescriptor, FieldKind, Form, PresentationHints, TransformCatalog};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default, rename = "as", skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Name of a transform in the catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolve: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_style: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_style: Option<Value>,
    /// Everything else is passed through to the host untouched.
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl FieldSpec {
    pub fn to_descriptor(&self, catalog: &TransformCatalog) -> Result<FieldDescriptor, ConfigError> {
        let mut descriptor = FieldDescriptor::new(self.name.clone(), self.kind.clone())
            .with_styles(self.valid_style.clone(), self.invalid_style.clone());
        descriptor.required = self.required;
        descriptor.alias = self.alias.clone();
        descriptor.options = self.options.clone();

        if let Some(transform) = &self.resolve {
            let callback =
                catalog
                    .get(transform)
                    .ok_or_else(|| ConfigError::UnknownTransform {
                        field: self.name.clone(),
                        transform: transform.clone(),
                    })?;
            descriptor = descriptor.with_shared_resolve(callback);
        }
        Ok(descriptor)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSpec {
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_style: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_style: Option<Value>,
}

impl FormSpec {
    pub fn from_json_str(data: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path)?;
        let spec = Self::from_json_str(&data)?;
        tracing::debug!(path = %path.display(), fields = spec.fields.len(), "form definition loaded");
        Ok(spec)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn descriptors(&self, catalog: &TransformCatalog) -> Result<Vec<FieldDescriptor>, ConfigError> {
        self.fields
            .iter()
            .map(|field| field.to_descriptor(catalog))
            .collect()
    }

    pub fn hints(&self) -> PresentationHints {
        PresentationHints {
            valid_style: self.valid_style.clone(),
            invalid_style: self.invalid_style.clone(),
        }
    }

    /// Builds a form with the definition's fields and presentation defaults.
    pub fn build(&self, catalog: &TransformCatalog) -> Result<Form, ConfigError> {
        Ok(Form::new(self.descriptors(catalog)?).with_hints(self.hints()))
    }
}
