//! The form root and the operations a presentation layer drives
//!
//! Every mutation revalidates the whole tree before returning, so reads of
//! [`Form::status`] and [`Form::errors`] always reflect the current values.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{FormError, Result};
use crate::model::{Collection, Field, Group, Node, PathFailure, Status};
use crate::path::FormPath;
use crate::schema::FormSchema;
use crate::submit::{Submission, SubmissionSink, SubmitOptions, SubmitPolicy, ValueMode};
use crate::validator::Failure;
use crate::value::FieldValue;

/// A built form: an owned tree rooted at a group
#[derive(Debug, Clone)]
pub struct Form {
    name: String,
    root: Node,
    submit: SubmitOptions,
}

impl Form {
    /// Build the tree described by `schema` and run the first validation pass
    pub fn build(schema: &FormSchema) -> Result<Self> {
        let mut root = Node::Group(Group::build(&schema.root)?);
        let status = root.validate();
        debug!(form = %schema.name, ?status, "form built");

        Ok(Self {
            name: schema.name.clone(),
            root,
            submit: schema.submit,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn submit_options(&self) -> SubmitOptions {
        self.submit
    }

    pub fn set_submit_options(&mut self, options: SubmitOptions) {
        self.submit = options;
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Resolve a path to a node
    pub fn node(&self, path: &FormPath) -> Result<&Node> {
        let mut node = &self.root;
        for segment in path.segments() {
            node = node
                .child(segment)
                .ok_or_else(|| FormError::PathNotFound(path.to_string()))?;
        }
        Ok(node)
    }

    pub fn field(&self, path: &FormPath) -> Result<&Field> {
        self.node(path)?
            .as_field()
            .ok_or_else(|| FormError::NotAField(path.to_string()))
    }

    pub fn collection(&self, path: &FormPath) -> Result<&Collection> {
        self.node(path)?
            .as_collection()
            .ok_or_else(|| FormError::NotACollection(path.to_string()))
    }

    /// Current value of a leaf field
    pub fn field_value(&self, path: &FormPath) -> Result<&FieldValue> {
        Ok(self.field(path)?.value())
    }

    /// Current value of any node as plain JSON
    pub fn value_at(&self, path: &FormPath, mode: ValueMode) -> Result<Value> {
        Ok(self.node(path)?.snapshot(mode))
    }

    /// Snapshot of enabled nodes
    pub fn value(&self) -> Value {
        self.root.snapshot(ValueMode::Value)
    }

    /// Snapshot including disabled nodes
    pub fn raw_value(&self) -> Value {
        self.root.snapshot(ValueMode::Raw)
    }

    pub fn status(&self, path: &FormPath) -> Result<Status> {
        Ok(self.node(path)?.status())
    }

    pub fn is_valid(&self) -> bool {
        self.root.status() == Status::Valid
    }

    /// Failures reported by the node at `path` itself
    pub fn errors(&self, path: &FormPath) -> Result<&[Failure]> {
        Ok(self.node(path)?.errors())
    }

    /// Every failure in the form, with the path of the node reporting it
    pub fn failures(&self) -> Vec<PathFailure> {
        let mut failures = Vec::new();
        self.root.collect_failures(&FormPath::root(), &mut failures);
        failures
    }

    pub fn collection_len(&self, path: &FormPath) -> Result<usize> {
        Ok(self.collection(path)?.len())
    }

    /// Replace the value of a leaf field. The value kind must match the field.
    pub fn set_value(&mut self, path: &FormPath, value: FieldValue) -> Result<()> {
        let field = field_mut(&mut self.root, path)?;
        if field.kind() != value.kind() {
            return Err(FormError::KindMismatch {
                path: path.to_string(),
                expected: field.kind(),
                actual: value.kind(),
            });
        }
        field.set(value);

        let status = self.root.validate();
        debug!(form = %self.name, %path, ?status, "value changed");
        Ok(())
    }

    /// Set a field from raw input text, parsed according to the field's kind
    pub fn set_input(&mut self, path: &FormPath, input: &str) -> Result<()> {
        let kind = self.field(path)?.kind();
        let value = FieldValue::parse(kind, input)?;
        self.set_value(path, value)
    }

    /// Append a new element built from the collection's template; returns its index
    pub fn add_to_collection(&mut self, path: &FormPath) -> Result<usize> {
        let index = collection_mut(&mut self.root, path)?.push_new();

        self.root.validate();
        debug!(form = %self.name, %path, index, "collection element added");
        Ok(index)
    }

    /// Remove the element at `index`.
    ///
    /// Returns `Ok(false)` and leaves the form untouched when `index` is out
    /// of range. Remaining elements keep their relative order.
    pub fn remove_from_collection(&mut self, path: &FormPath, index: usize) -> Result<bool> {
        let collection = collection_mut(&mut self.root, path)?;
        let len = collection.len();
        if !collection.remove(index) {
            warn!(form = %self.name, %path, index, len, "remove ignored: index out of range");
            return Ok(false);
        }

        self.root.validate();
        debug!(form = %self.name, %path, index, "collection element removed");
        Ok(true)
    }

    pub fn disable(&mut self, path: &FormPath) -> Result<()> {
        self.set_disabled(path, true)
    }

    pub fn enable(&mut self, path: &FormPath) -> Result<()> {
        self.set_disabled(path, false)
    }

    fn set_disabled(&mut self, path: &FormPath, disabled: bool) -> Result<()> {
        node_mut(&mut self.root, path)?.set_disabled(disabled);
        self.root.validate();
        debug!(form = %self.name, %path, disabled, "node availability changed");
        Ok(())
    }

    /// Restore initial values and collection lengths
    pub fn reset(&mut self) {
        self.root.reset();
        self.root.validate();
        debug!(form = %self.name, "form reset");
    }

    /// Revalidate and hand the snapshot to `sink` according to the submit policy.
    ///
    /// Under [`SubmitPolicy::WhenValid`] an invalid form is withheld and the
    /// sink is not called.
    pub fn submit(&mut self, sink: &mut dyn SubmissionSink) -> Submission {
        let valid = self.root.validate() == Status::Valid;
        let failures = self.failures();

        if !valid && self.submit.policy == SubmitPolicy::WhenValid {
            warn!(form = %self.name, failures = failures.len(), "submission withheld: form is invalid");
            return Submission::Withheld { failures };
        }

        let snapshot = self.root.snapshot(self.submit.value_mode);
        info!(form = %self.name, valid, mode = ?self.submit.value_mode, "submitting form");
        sink.receive(&self.name, &snapshot);

        Submission::Submitted {
            valid,
            snapshot,
            failures,
        }
    }
}

fn node_mut<'a>(root: &'a mut Node, path: &FormPath) -> Result<&'a mut Node> {
    let mut node = root;
    for segment in path.segments() {
        node = node
            .child_mut(segment)
            .ok_or_else(|| FormError::PathNotFound(path.to_string()))?;
    }
    Ok(node)
}

fn field_mut<'a>(root: &'a mut Node, path: &FormPath) -> Result<&'a mut Field> {
    node_mut(root, path)?
        .as_field_mut()
        .ok_or_else(|| FormError::NotAField(path.to_string()))
}

fn collection_mut<'a>(root: &'a mut Node, path: &FormPath) -> Result<&'a mut Collection> {
    node_mut(root, path)?
        .as_collection_mut()
        .ok_or_else(|| FormError::NotACollection(path.to_string()))
}
