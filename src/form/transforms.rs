//! Named resolve transforms, so form definitions loaded from disk can refer to
//! them by name.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Number, Value};

use super::descriptor::{SharedResolveCallback, TransformError};

pub struct TransformCatalog {
    entries: HashMap<String, SharedResolveCallback>,
}

impl TransformCatalog {
    /// Catalog without any transforms.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn register<F>(&mut self, name: impl Into<String>, transform: F)
    where
        F: Fn(Value) -> Result<Value, TransformError> + Send + Sync + 'static,
    {
        self.entries.insert(name.into(), Arc::new(transform));
    }

    pub fn get(&self, name: &str) -> Option<SharedResolveCallback> {
        self.entries.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for TransformCatalog {
    fn default() -> Self {
        let mut catalog = Self::empty();
        catalog.register("number", to_number);
        catalog.register("trim", trim);
        catalog.register("digits", digits);
        catalog.register("lowercase", lowercase);
        catalog.register("boolean", to_boolean);
        catalog
    }
}

/// Rewrites string values; anything else passes through untouched.
fn map_text(value: Value, rewrite: impl FnOnce(&str) -> String) -> Value {
    match value {
        Value::String(text) => Value::String(rewrite(&text)),
        other => other,
    }
}

/// Parses strings into JSON numbers. Numbers and null pass through.
pub fn to_number(value: Value) -> Result<Value, TransformError> {
    let raw = match &value {
        Value::Number(_) | Value::Null => None,
        Value::String(text) => Some(text.trim().to_string()),
        other => {
            return Err(TransformError::new(format!(
                "Cannot convert {} to a number",
                other
            )))
        }
    };
    let Some(raw) = raw else {
        return Ok(value);
    };
    if let Ok(integer) = raw.parse::<i64>() {
        return Ok(Value::Number(integer.into()));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| TransformError::new(format!("`{}` is not a number", raw)))
}

pub fn trim(value: Value) -> Result<Value, TransformError> {
    Ok(map_text(value, |text| text.trim().to_string()))
}

/// Keeps only ASCII digits; strips phone and document masks.
pub fn digits(value: Value) -> Result<Value, TransformError> {
    Ok(map_text(value, |text| {
        text.chars().filter(char::is_ascii_digit).collect()
    }))
}

pub fn lowercase(value: Value) -> Result<Value, TransformError> {
    Ok(map_text(value, str::to_lowercase))
}

pub fn to_boolean(value: Value) -> Result<Value, TransformError> {
    let raw = match &value {
        Value::Bool(flag) => return Ok(Value::Bool(*flag)),
        Value::String(text) => text.trim().to_lowercase(),
        Value::Number(number) => number.to_string(),
        other => {
            return Err(TransformError::new(format!(
                "Cannot convert {} to a boolean",
                other
            )))
        }
    };
    match raw.as_str() {
        "y" | "yes" | "true" | "1" => Ok(Value::Bool(true)),
        "n" | "no" | "false" | "0" => Ok(Value::Bool(false)),
        _ => Err(TransformError::new(format!(
            "`{}` is not a yes/no value",
            raw
        ))),
    }
}
