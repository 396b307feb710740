//! Primitive field values

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::{FormError, Result};

/// Declared kind of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Free text (names, emails, phone numbers, passwords)
    Text,
    /// Checkbox
    Boolean,
    /// Calendar date without time
    Date,
    /// Numeric input (years, amounts)
    Number,
}

impl ValueKind {
    /// Name used in schema files and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Text => "text",
            ValueKind::Boolean => "boolean",
            ValueKind::Date => "date",
            ValueKind::Number => "number",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current value of a field.
///
/// Dates and numbers can be unset; an unset value counts as empty for the
/// `required` validator and is skipped by range rules.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Boolean(bool),
    Date(Option<NaiveDate>),
    Number(Option<f64>),
}

impl FieldValue {
    /// The empty value for a kind
    pub fn empty(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Text => FieldValue::Text(String::new()),
            ValueKind::Boolean => FieldValue::Boolean(false),
            ValueKind::Date => FieldValue::Date(None),
            ValueKind::Number => FieldValue::Number(None),
        }
    }

    /// Text value
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// Set numeric value
    pub fn number(value: f64) -> Self {
        FieldValue::Number(Some(value))
    }

    /// Set date value
    pub fn date(value: NaiveDate) -> Self {
        FieldValue::Date(Some(value))
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            FieldValue::Text(_) => ValueKind::Text,
            FieldValue::Boolean(_) => ValueKind::Boolean,
            FieldValue::Date(_) => ValueKind::Date,
            FieldValue::Number(_) => ValueKind::Number,
        }
    }

    /// Whether the value counts as "no input". Booleans are never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Boolean(_) => false,
            FieldValue::Date(d) => d.is_none(),
            FieldValue::Number(n) => n.is_none(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => *d,
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => *n,
            _ => None,
        }
    }

    /// Parse raw input text the way an HTML input of the given kind would
    /// deliver it. Empty input yields the empty value.
    pub fn parse(kind: ValueKind, input: &str) -> Result<Self> {
        let invalid = || FormError::InvalidValue {
            kind,
            input: input.to_string(),
        };
        let trimmed = input.trim();

        match kind {
            ValueKind::Text => Ok(FieldValue::Text(input.to_string())),
            ValueKind::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(FieldValue::Boolean(true)),
                "false" | "no" | "off" | "0" | "" => Ok(FieldValue::Boolean(false)),
                _ => Err(invalid()),
            },
            ValueKind::Date => {
                if trimmed.is_empty() {
                    return Ok(FieldValue::Date(None));
                }
                NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                    .map(|d| FieldValue::Date(Some(d)))
                    .map_err(|_| invalid())
            }
            ValueKind::Number => {
                if trimmed.is_empty() {
                    return Ok(FieldValue::Number(None));
                }
                match trimmed.parse::<f64>() {
                    Ok(n) if n.is_finite() => Ok(FieldValue::Number(Some(n))),
                    _ => Err(invalid()),
                }
            }
        }
    }

    /// Convert a JSON initial value from a schema file.
    ///
    /// `null` yields the empty value; strings go through [`FieldValue::parse`].
    pub fn from_json(kind: ValueKind, value: &Value) -> Result<Self> {
        match (kind, value) {
            (_, Value::Null) => Ok(FieldValue::empty(kind)),
            (_, Value::String(s)) => FieldValue::parse(kind, s),
            (ValueKind::Boolean, Value::Bool(b)) => Ok(FieldValue::Boolean(*b)),
            (ValueKind::Number, Value::Number(n)) => Ok(FieldValue::Number(n.as_f64())),
            _ => Err(FormError::InvalidValue {
                kind,
                input: value.to_string(),
            }),
        }
    }

    /// Plain JSON rendering used in snapshots
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Boolean(b) => Value::Bool(*b),
            FieldValue::Date(Some(d)) => Value::String(d.format("%Y-%m-%d").to_string()),
            FieldValue::Number(Some(n)) => {
                // Whole numbers (years) render without a fraction
                if n.fract() == 0.0 && n.abs() < 9.0e15 {
                    Value::from(*n as i64)
                } else {
                    serde_json::Number::from_f64(*n)
                        .map(Value::Number)
                        .unwrap_or(Value::Null)
                }
            }
            FieldValue::Date(None) | FieldValue::Number(None) => Value::Null,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(Some(value))
    }
}
