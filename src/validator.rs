//! Per-field validators and failure reasons
//!
//! Every validator is a pure predicate over a single [`FieldValue`]. Apart
//! from `required` and `requiredTrue`, validators skip empty input so that an
//! optional field only complains once something has been typed into it.

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{FormError, Result};
use crate::value::{FieldValue, ValueKind};

/// Local part, then dot-separated DNS labels. Length limits are checked separately.
const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+)*@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$";
const EMAIL_MAX_LEN: usize = 254;
const EMAIL_LOCAL_MAX_LEN: usize = 64;

/// Declarative validator as written in a schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ValidatorSpec {
    /// Value must not be empty
    Required,
    /// Checkbox must be ticked
    RequiredTrue,
    /// Whole text must match the regular expression
    Pattern { regex: String },
    /// Number must be at least `min`
    Min { min: f64 },
    /// Text must have at least `len` characters
    MinLength { len: usize },
    /// Text must look like an email address
    Email,
}

impl ValidatorSpec {
    /// Reason name reported when this validator fails
    pub fn name(&self) -> &'static str {
        match self {
            ValidatorSpec::Required => "required",
            ValidatorSpec::RequiredTrue => "requiredTrue",
            ValidatorSpec::Pattern { .. } => "pattern",
            ValidatorSpec::Min { .. } => "min",
            ValidatorSpec::MinLength { .. } => "minlength",
            ValidatorSpec::Email => "email",
        }
    }

    fn accepts(&self, kind: ValueKind) -> bool {
        match self {
            ValidatorSpec::Required => true,
            ValidatorSpec::RequiredTrue => kind == ValueKind::Boolean,
            ValidatorSpec::Pattern { .. } | ValidatorSpec::MinLength { .. } | ValidatorSpec::Email => {
                kind == ValueKind::Text
            }
            ValidatorSpec::Min { .. } => kind == ValueKind::Number,
        }
    }
}

/// A validator ready to run, with its regular expression compiled
#[derive(Debug, Clone)]
pub enum FieldValidator {
    Required,
    RequiredTrue,
    Pattern { regex: Regex, source: String },
    Min(f64),
    MinLength(usize),
    Email(Regex),
}

impl FieldValidator {
    /// Compile a validator for a field of the given kind
    pub fn compile(spec: &ValidatorSpec, kind: ValueKind) -> Result<Self> {
        if !spec.accepts(kind) {
            return Err(FormError::ValidatorKind {
                validator: spec.name(),
                kind,
            });
        }

        Ok(match spec {
            ValidatorSpec::Required => FieldValidator::Required,
            ValidatorSpec::RequiredTrue => FieldValidator::RequiredTrue,
            ValidatorSpec::Pattern { regex } => FieldValidator::Pattern {
                regex: compile_anchored(regex)?,
                source: regex.clone(),
            },
            ValidatorSpec::Min { min } => FieldValidator::Min(*min),
            ValidatorSpec::MinLength { len } => FieldValidator::MinLength(*len),
            ValidatorSpec::Email => FieldValidator::Email(compile_anchored(EMAIL_PATTERN)?),
        })
    }

    /// Run the validator. `None` means the value passes.
    pub fn check(&self, value: &FieldValue) -> Option<Failure> {
        match (self, value) {
            (FieldValidator::Required, value) => value.is_empty().then_some(Failure::Required),
            (FieldValidator::RequiredTrue, FieldValue::Boolean(checked)) => {
                (!*checked).then_some(Failure::RequiredTrue)
            }
            (FieldValidator::Pattern { regex, source }, FieldValue::Text(text)) if !text.is_empty() => {
                (!regex.is_match(text)).then(|| Failure::Pattern {
                    required_pattern: source.clone(),
                    actual: text.clone(),
                })
            }
            (FieldValidator::Min(min), FieldValue::Number(Some(actual))) => {
                (*actual < *min).then_some(Failure::Min {
                    min: *min,
                    actual: *actual,
                })
            }
            (FieldValidator::MinLength(len), FieldValue::Text(text)) if !text.is_empty() => {
                let actual_length = text.chars().count();
                (actual_length < *len).then_some(Failure::MinLength {
                    required_length: *len,
                    actual_length,
                })
            }
            (FieldValidator::Email(regex), FieldValue::Text(text)) if !text.is_empty() => {
                (!is_email(regex, text)).then_some(Failure::Email)
            }
            _ => None,
        }
    }
}

/// Patterns always match the whole value, whether or not they carry their own anchors
fn compile_anchored(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{})$", pattern)).map_err(|source| FormError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

fn is_email(regex: &Regex, text: &str) -> bool {
    let local_len = text.find('@').unwrap_or(text.len());
    text.len() <= EMAIL_MAX_LEN && local_len <= EMAIL_LOCAL_MAX_LEN && regex.is_match(text)
}

/// Why a field, group or collection is invalid
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum Failure {
    Required,
    RequiredTrue,
    Pattern { required_pattern: String, actual: String },
    Min { min: f64, actual: f64 },
    #[serde(rename = "minlength")]
    MinLength { required_length: usize, actual_length: usize },
    Email,
    /// Start year is not strictly before end year
    YearRange { start: f64, end: f64 },
    /// Start date is after end date
    DateRange { start: NaiveDate, end: NaiveDate },
    PasswordMismatch,
    /// Collection has no elements
    NoPhone,
}

impl Failure {
    /// Stable reason name, as shown to the presentation layer
    pub fn reason(&self) -> &'static str {
        match self {
            Failure::Required => "required",
            Failure::RequiredTrue => "requiredTrue",
            Failure::Pattern { .. } => "pattern",
            Failure::Min { .. } => "min",
            Failure::MinLength { .. } => "minlength",
            Failure::Email => "email",
            Failure::YearRange { .. } => "yearRange",
            Failure::DateRange { .. } => "dateRange",
            Failure::PasswordMismatch => "passwordMismatch",
            Failure::NoPhone => "noPhone",
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Required => write!(f, "This field is required"),
            Failure::RequiredTrue => write!(f, "This box must be checked"),
            Failure::Pattern { required_pattern, actual } => {
                write!(f, "'{}' does not match {}", actual, required_pattern)
            }
            Failure::Min { min, actual } => write!(f, "{} is below the minimum of {}", actual, min),
            Failure::MinLength { required_length, actual_length } => write!(
                f,
                "Must be at least {} characters (got {})",
                required_length, actual_length
            ),
            Failure::Email => write!(f, "Enter a valid email address"),
            Failure::YearRange { start, end } => {
                write!(f, "Start year {} must be before end year {}", start, end)
            }
            Failure::DateRange { start, end } => {
                write!(f, "Start date {} must not be after end date {}", start, end)
            }
            Failure::PasswordMismatch => write!(f, "Passwords do not match"),
            Failure::NoPhone => write!(f, "At least one entry is required"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(spec: ValidatorSpec, kind: ValueKind) -> FieldValidator {
        FieldValidator::compile(&spec, kind).unwrap()
    }

    #[test]
    fn test_required() {
        let required = compile(ValidatorSpec::Required, ValueKind::Text);
        assert_eq!(required.check(&FieldValue::text("")), Some(Failure::Required));
        assert_eq!(required.check(&FieldValue::text("Ada")), None);

        let required_date = compile(ValidatorSpec::Required, ValueKind::Date);
        assert_eq!(required_date.check(&FieldValue::Date(None)), Some(Failure::Required));
    }

    #[test]
    fn test_required_true() {
        let terms = compile(ValidatorSpec::RequiredTrue, ValueKind::Boolean);
        assert_eq!(terms.check(&FieldValue::Boolean(false)), Some(Failure::RequiredTrue));
        assert_eq!(terms.check(&FieldValue::Boolean(true)), None);
    }

    #[test]
    fn test_phone_pattern() {
        let phone = compile(
            ValidatorSpec::Pattern { regex: r"^\d{10}$".to_string() },
            ValueKind::Text,
        );
        assert_eq!(phone.check(&FieldValue::text("0123456789")), None);
        assert_eq!(phone.check(&FieldValue::text("")), None);
        let failure = phone.check(&FieldValue::text("12345")).unwrap();
        assert_eq!(failure.reason(), "pattern");
    }

    #[test]
    fn test_unanchored_pattern_matches_whole_value() {
        let digits = compile(
            ValidatorSpec::Pattern { regex: r"\d{3}".to_string() },
            ValueKind::Text,
        );
        assert_eq!(digits.check(&FieldValue::text("123")), None);
        assert!(digits.check(&FieldValue::text("a123b")).is_some());
    }

    #[test]
    fn test_min_is_inclusive() {
        let min = compile(ValidatorSpec::Min { min: 1900.0 }, ValueKind::Number);
        assert_eq!(min.check(&FieldValue::number(1900.0)), None);
        assert_eq!(
            min.check(&FieldValue::number(1899.0)),
            Some(Failure::Min { min: 1900.0, actual: 1899.0 })
        );
        assert_eq!(min.check(&FieldValue::Number(None)), None);
    }

    #[test]
    fn test_min_length() {
        let password = compile(ValidatorSpec::MinLength { len: 6 }, ValueKind::Text);
        assert_eq!(password.check(&FieldValue::text("secret")), None);
        assert_eq!(
            password.check(&FieldValue::text("abc")),
            Some(Failure::MinLength { required_length: 6, actual_length: 3 })
        );
    }

    #[test]
    fn test_email_shape() {
        let email = compile(ValidatorSpec::Email, ValueKind::Text);
        assert_eq!(email.check(&FieldValue::text("ada@example.com")), None);
        assert_eq!(email.check(&FieldValue::text("first.last+tag@mail.co")), None);
        assert_eq!(email.check(&FieldValue::text("not-an-email")), Some(Failure::Email));
        assert_eq!(email.check(&FieldValue::text("a@-bad.com")), Some(Failure::Email));

        let long_local = format!("{}@example.com", "a".repeat(65));
        assert_eq!(email.check(&FieldValue::text(long_local)), Some(Failure::Email));
    }

    #[test]
    fn test_kind_checks() {
        assert!(matches!(
            FieldValidator::compile(&ValidatorSpec::Min { min: 1.0 }, ValueKind::Text),
            Err(FormError::ValidatorKind { validator: "min", .. })
        ));
        assert!(matches!(
            FieldValidator::compile(&ValidatorSpec::Pattern { regex: "(".to_string() }, ValueKind::Text),
            Err(FormError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_spec_serde_names() {
        let spec: ValidatorSpec = serde_json::from_str(r#"{"type": "minLength", "len": 6}"#).unwrap();
        assert_eq!(spec, ValidatorSpec::MinLength { len: 6 });

        let failure = serde_json::to_value(Failure::PasswordMismatch).unwrap();
        assert_eq!(failure["reason"], "passwordMismatch");
    }
}
