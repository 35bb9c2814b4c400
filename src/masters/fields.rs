//! Typed custom field schema for item masters
//!
//! Operators configure extra item attributes (hallmark number, stone colour,
//! design code, ...). Definitions live in [`crate::config::EngineConfig`] and
//! values are checked once when an item is created or updated.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::*;

/// Kind of a custom field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "options")]
pub enum FieldKind {
    Text,
    Number,
    Dropdown(Vec<String>),
    Color(Vec<String>),
}

/// One configured custom field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, kind: FieldKind, required: bool) -> Self {
        Self {
            name: name.into(),
            kind,
            required,
        }
    }

    fn check(&self, value: &FieldValue) -> EngineResult<()> {
        let field = format!("custom_fields.{}", self.name);
        match (&self.kind, value) {
            (FieldKind::Text, FieldValue::Text(_)) => Ok(()),
            (FieldKind::Number, FieldValue::Number(n)) if n.is_finite() => Ok(()),
            (FieldKind::Dropdown(options), FieldValue::Text(choice))
            | (FieldKind::Color(options), FieldValue::Text(choice)) => {
                if options.iter().any(|o| o == choice) {
                    Ok(())
                } else {
                    Err(EngineError::validation(
                        field,
                        format!("'{}' is not one of {:?}", choice, options),
                    ))
                }
            }
            (kind, _) => Err(EngineError::validation(
                field,
                format!("value does not match field type {:?}", kind),
            )),
        }
    }
}

/// Value of a custom field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

/// Validate item field values against the configured schema.
///
/// Rejects unknown fields, missing required fields and values of the wrong
/// kind.
pub fn validate_fields(
    schema: &[FieldDefinition],
    values: &BTreeMap<String, FieldValue>,
) -> EngineResult<()> {
    for name in values.keys() {
        if !schema.iter().any(|d| &d.name == name) {
            return Err(EngineError::validation(
                format!("custom_fields.{}", name),
                "unknown field",
            ));
        }
    }

    for definition in schema {
        match values.get(&definition.name) {
            Some(value) => definition.check(value)?,
            None if definition.required => {
                return Err(EngineError::validation(
                    format!("custom_fields.{}", definition.name),
                    "is required",
                ));
            }
            None => {}
        }
    }

    Ok(())
}
