//! Cross-field rules for groups and collections
//!
//! The predicates are plain functions over typed child values. A
//! [`GroupRule`] resolves the child names from its [`GroupRuleSpec`] to
//! positions when the form is built, so evaluation never looks names up.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{FormError, Result};
use crate::model::Child;
use crate::validator::Failure;
use crate::value::{FieldValue, ValueKind};

/// Years must be strictly increasing: `start == end` fails.
pub fn year_range(start: Option<f64>, end: Option<f64>) -> Option<Failure> {
    match (start, end) {
        (Some(start), Some(end)) if start >= end => Some(Failure::YearRange { start, end }),
        _ => None,
    }
}

/// Dates may be equal: only `start > end` fails.
pub fn date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<Failure> {
    match (start, end) {
        (Some(start), Some(end)) if start > end => Some(Failure::DateRange { start, end }),
        _ => None,
    }
}

/// Incomplete input (either side empty) never reports a mismatch.
pub fn password_match(password: &str, confirm: &str) -> Option<Failure> {
    if !password.is_empty() && !confirm.is_empty() && password != confirm {
        Some(Failure::PasswordMismatch)
    } else {
        None
    }
}

pub fn non_empty(len: usize) -> Option<Failure> {
    (len == 0).then_some(Failure::NoPhone)
}

/// Group rule as written in a schema, naming the children it reads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GroupRuleSpec {
    YearRange { start: String, end: String },
    DateRange { start: String, end: String },
    PasswordMatch { password: String, confirm: String },
}

impl GroupRuleSpec {
    pub fn year_range(start: impl Into<String>, end: impl Into<String>) -> Self {
        GroupRuleSpec::YearRange {
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn date_range(start: impl Into<String>, end: impl Into<String>) -> Self {
        GroupRuleSpec::DateRange {
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn password_match(password: impl Into<String>, confirm: impl Into<String>) -> Self {
        GroupRuleSpec::PasswordMatch {
            password: password.into(),
            confirm: confirm.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GroupRuleSpec::YearRange { .. } => "yearRange",
            GroupRuleSpec::DateRange { .. } => "dateRange",
            GroupRuleSpec::PasswordMatch { .. } => "passwordMatch",
        }
    }
}

/// Group rule bound to child positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupRule {
    YearRange { start: usize, end: usize },
    DateRange { start: usize, end: usize },
    PasswordMatch { password: usize, confirm: usize },
}

impl GroupRule {
    /// Bind a rule to the children of a group, checking names and kinds
    pub(crate) fn resolve(spec: &GroupRuleSpec, children: &[Child]) -> Result<Self> {
        let rule = spec.name();
        Ok(match spec {
            GroupRuleSpec::YearRange { start, end } => GroupRule::YearRange {
                start: locate(children, rule, start, ValueKind::Number)?,
                end: locate(children, rule, end, ValueKind::Number)?,
            },
            GroupRuleSpec::DateRange { start, end } => GroupRule::DateRange {
                start: locate(children, rule, start, ValueKind::Date)?,
                end: locate(children, rule, end, ValueKind::Date)?,
            },
            GroupRuleSpec::PasswordMatch { password, confirm } => GroupRule::PasswordMatch {
                password: locate(children, rule, password, ValueKind::Text)?,
                confirm: locate(children, rule, confirm, ValueKind::Text)?,
            },
        })
    }

    pub(crate) fn check(&self, children: &[Child]) -> Option<Failure> {
        match *self {
            GroupRule::YearRange { start, end } => year_range(
                value_at(children, start).and_then(FieldValue::as_number),
                value_at(children, end).and_then(FieldValue::as_number),
            ),
            GroupRule::DateRange { start, end } => date_range(
                value_at(children, start).and_then(FieldValue::as_date),
                value_at(children, end).and_then(FieldValue::as_date),
            ),
            GroupRule::PasswordMatch { password, confirm } => password_match(
                value_at(children, password).and_then(FieldValue::as_text).unwrap_or(""),
                value_at(children, confirm).and_then(FieldValue::as_text).unwrap_or(""),
            ),
        }
    }
}

fn locate(children: &[Child], rule: &'static str, name: &str, expected: ValueKind) -> Result<usize> {
    children
        .iter()
        .position(|child| {
            child.name() == name && child.node().as_field().map(|f| f.kind()) == Some(expected)
        })
        .ok_or_else(|| FormError::RuleTarget {
            rule,
            child: name.to_string(),
            expected,
        })
}

fn value_at(children: &[Child], index: usize) -> Option<&FieldValue> {
    children.get(index)?.node().as_field().map(|f| f.value())
}

/// Rule evaluated against a collection as a whole
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CollectionRule {
    /// At least one element must exist
    NonEmpty,
}

impl CollectionRule {
    pub(crate) fn check(&self, len: usize) -> Option<Failure> {
        match self {
            CollectionRule::NonEmpty => non_empty(len),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_year_range_boundaries() {
        assert_eq!(
            year_range(Some(2020.0), Some(2019.0)),
            Some(Failure::YearRange { start: 2020.0, end: 2019.0 })
        );
        assert_eq!(year_range(Some(2019.0), Some(2020.0)), None);
        // Equal years are rejected
        assert!(year_range(Some(2020.0), Some(2020.0)).is_some());
        assert_eq!(year_range(None, Some(2020.0)), None);
    }

    #[test]
    fn test_date_range_boundaries() {
        assert!(date_range(day(2024, 1, 2), day(2024, 1, 1)).is_some());
        // Equal dates are accepted
        assert_eq!(date_range(day(2024, 1, 1), day(2024, 1, 1)), None);
        assert_eq!(date_range(day(2024, 1, 1), day(2024, 6, 1)), None);
        assert_eq!(date_range(day(2024, 1, 2), None), None);
    }

    #[test]
    fn test_password_match() {
        assert_eq!(password_match("hunter22", "hunter22"), None);
        assert_eq!(password_match("hunter22", "hunter23"), Some(Failure::PasswordMismatch));
        assert_eq!(password_match("", "hunter23"), None);
        assert_eq!(password_match("hunter22", ""), None);
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(0), Some(Failure::NoPhone));
        assert_eq!(non_empty(1), None);
        assert_eq!(CollectionRule::NonEmpty.check(0), Some(Failure::NoPhone));
    }

    #[test]
    fn test_spec_serde() {
        let spec: GroupRuleSpec =
            serde_json::from_str(r#"{"type": "yearRange", "start": "startYear", "end": "endYear"}"#).unwrap();
        assert_eq!(spec, GroupRuleSpec::year_range("startYear", "endYear"));

        let rule: CollectionRule = serde_json::from_str(r#"{"type": "nonEmpty"}"#).unwrap();
        assert_eq!(rule, CollectionRule::NonEmpty);
    }
}
