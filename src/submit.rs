//! Submission policy and sinks
//!
//! The default policy withholds submission of an invalid form. `Always`
//! emits the snapshot regardless and is only meant for debugging flows where
//! the caller wants to see what an invalid form would have sent.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::model::PathFailure;

/// When a submission reaches the sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubmitPolicy {
    /// Only a valid form is emitted
    #[default]
    WhenValid,
    /// The snapshot is emitted even when the form is invalid
    Always,
}

/// Which nodes a snapshot contains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueMode {
    /// Enabled nodes only
    #[default]
    Value,
    /// Every node, including disabled ones
    Raw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubmitOptions {
    #[serde(default)]
    pub policy: SubmitPolicy,
    #[serde(default)]
    pub value_mode: ValueMode,
}

/// Receives snapshots of submitted forms
pub trait SubmissionSink {
    fn receive(&mut self, form: &str, snapshot: &Value);
}

/// Writes each submitted snapshot to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl SubmissionSink for LogSink {
    fn receive(&mut self, form: &str, snapshot: &Value) {
        info!(form = %form, snapshot = %snapshot, "form submitted");
    }
}

/// Keeps submitted snapshots in memory
#[derive(Debug, Default, Clone)]
pub struct CollectSink {
    pub snapshots: Vec<Value>,
}

impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&Value> {
        self.snapshots.last()
    }
}

impl SubmissionSink for CollectSink {
    fn receive(&mut self, _form: &str, snapshot: &Value) {
        self.snapshots.push(snapshot.clone());
    }
}

/// Outcome of [`Form::submit`](crate::form::Form::submit)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Submission {
    /// The sink received `snapshot`. `valid` is false only under [`SubmitPolicy::Always`].
    Submitted {
        valid: bool,
        snapshot: Value,
        failures: Vec<PathFailure>,
    },
    /// The form was invalid and nothing was emitted
    Withheld { failures: Vec<PathFailure> },
}

impl Submission {
    pub fn is_submitted(&self) -> bool {
        matches!(self, Submission::Submitted { .. })
    }

    pub fn snapshot(&self) -> Option<&Value> {
        match self {
            Submission::Submitted { snapshot, .. } => Some(snapshot),
            Submission::Withheld { .. } => None,
        }
    }

    pub fn failures(&self) -> &[PathFailure] {
        match self {
            Submission::Submitted { failures, .. } | Submission::Withheld { failures } => failures,
        }
    }
}
