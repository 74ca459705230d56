//! Static description of the fields that make up a form.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Failure raised by a field's resolve transform.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransformError {
    pub message: String,
}

impl TransformError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

type ResolveCallback = dyn Fn(Value) -> Result<Value, TransformError> + Send + Sync;
pub type SharedResolveCallback = Arc<ResolveCallback>;

/// Words that mark a field type as keyboard driven.
const TEXT_LIKE_TAGS: [&str; 6] = ["text", "password", "email", "phone", "cpf", "cnpj"];

/// Type tag of a field. Selects the widget the host renders and the
/// behavioral defaults applied by the form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldKind {
    #[default]
    Text,
    Password,
    Email,
    Phone,
    Cpf,
    Cnpj,
    Boolean,
    Radio,
    Option,
    Button,
    Submit,
    Clear,
    /// Any tag the form does not know. Rendered as a text input.
    Other(String),
}

impl FieldKind {
    pub fn as_str(&self) -> &str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Password => "password",
            FieldKind::Email => "email",
            FieldKind::Phone => "phone",
            FieldKind::Cpf => "cpf",
            FieldKind::Cnpj => "cnpj",
            FieldKind::Boolean => "boolean",
            FieldKind::Radio => "radio",
            FieldKind::Option => "option",
            FieldKind::Button => "button",
            FieldKind::Submit => "submit",
            FieldKind::Clear => "clear",
            FieldKind::Other(tag) => tag,
        }
    }

    /// Whether the field takes keyboard input. Unknown tags qualify when they
    /// mention one of the keyboard-driven type names.
    pub fn is_text_like(&self) -> bool {
        match self {
            FieldKind::Text
            | FieldKind::Password
            | FieldKind::Email
            | FieldKind::Phone
            | FieldKind::Cpf
            | FieldKind::Cnpj => true,
            FieldKind::Other(tag) => TEXT_LIKE_TAGS.iter().any(|word| tag.contains(word)),
            _ => false,
        }
    }
}

impl From<&str> for FieldKind {
    fn from(tag: &str) -> Self {
        match tag {
            "text" => FieldKind::Text,
            "password" => FieldKind::Password,
            "email" => FieldKind::Email,
            "phone" => FieldKind::Phone,
            "cpf" => FieldKind::Cpf,
            "cnpj" => FieldKind::Cnpj,
            "boolean" => FieldKind::Boolean,
            "radio" => FieldKind::Radio,
            "option" => FieldKind::Option,
            "button" => FieldKind::Button,
            "submit" => FieldKind::Submit,
            "clear" => FieldKind::Clear,
            other => FieldKind::Other(other.to_string()),
        }
    }
}

impl From<String> for FieldKind {
    fn from(tag: String) -> Self {
        FieldKind::from(tag.as_str())
    }
}

impl From<FieldKind> for String {
    fn from(kind: FieldKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declarative description of a single form field.
#[derive(Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub alias: Option<String>,
    pub resolve: Option<SharedResolveCallback>,
    pub valid_style: Option<Value>,
    pub invalid_style: Option<Value>,
    /// Type-specific presentation options passed through to the host.
    pub options: Map<String, Value>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            alias: None,
            resolve: None,
            valid_style: None,
            invalid_style: None,
            options: Map::new(),
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub fn with_required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_resolve<F>(mut self, resolve: F) -> Self
    where
        F: Fn(Value) -> Result<Value, TransformError> + Send + Sync + 'static,
    {
        self.resolve = Some(Arc::new(resolve));
        self
    }

    pub fn with_shared_resolve(mut self, resolve: SharedResolveCallback) -> Self {
        self.resolve = Some(resolve);
        self
    }

    pub fn with_styles(mut self, valid: Option<Value>, invalid: Option<Value>) -> Self {
        self.valid_style = valid;
        self.invalid_style = invalid;
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    /// Key under which the field's value lands in the resolved output.
    pub fn output_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("alias", &self.alias)
            .field("resolve", &self.resolve.as_ref().map(|_| "<fn>"))
            .field("valid_style", &self.valid_style)
            .field("invalid_style", &self.invalid_style)
            .field("options", &self.options)
            .finish()
    }
}
