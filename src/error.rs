//! Error types for form construction and mutation
//!
//! Validation failures are not errors: they live in the form tree as
//! [`Failure`](crate::validator::Failure) values. `FormError` covers schema
//! problems and API misuse (bad paths, wrong value kinds).

use thiserror::Error;

use crate::value::ValueKind;

/// Result type for form operations
pub type Result<T> = std::result::Result<T, FormError>;

/// Form builder and engine errors
#[derive(Error, Debug)]
pub enum FormError {
    #[error("Path not found: '{0}'")]
    PathNotFound(String),

    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Not a field: '{0}'")]
    NotAField(String),

    #[error("Not a collection: '{0}'")]
    NotACollection(String),

    #[error("Kind mismatch at '{path}': expected {expected}, got {actual}")]
    KindMismatch {
        path: String,
        expected: ValueKind,
        actual: ValueKind,
    },

    #[error("Invalid {kind} value: '{input}'")]
    InvalidValue { kind: ValueKind, input: String },

    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Validator '{validator}' cannot be attached to a {kind} field")]
    ValidatorKind {
        validator: &'static str,
        kind: ValueKind,
    },

    #[error("Rule '{rule}' needs a {expected} field named '{child}'")]
    RuleTarget {
        rule: &'static str,
        child: String,
        expected: ValueKind,
    },

    #[error("Duplicate child name in group: '{0}'")]
    DuplicateName(String),

    #[error("Child name '{0}' is all digits and would read as a collection index")]
    NumericName(String),

    #[error("Unknown form: {0}")]
    UnknownForm(String),

    #[error("Invalid schema file {path}: {reason}")]
    SchemaFile { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
