//! The form tree
//!
//! A form is a tree of [`Node`]s: leaf [`Field`]s, named [`Group`]s and
//! resizable [`Collection`]s. Nodes are built from their schema once;
//! collection elements are cloned from a template node that was built (and
//! therefore checked) together with the rest of the form, so every element
//! has the same shape.
//!
//! Each node caches its own failures and [`Status`]. [`Node::validate`]
//! recomputes them bottom-up for the whole subtree.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::error::{FormError, Result};
use crate::path::{is_index, FormPath, Segment};
use crate::rules::{CollectionRule, GroupRule};
use crate::schema::{CollectionSchema, FieldSchema, GroupSchema, NodeSchema};
use crate::submit::ValueMode;
use crate::validator::{Failure, FieldValidator};
use crate::value::{FieldValue, ValueKind};

/// Validation state of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Valid,
    Invalid,
    /// Excluded from validation and from value snapshots
    Disabled,
}

impl Status {
    fn from_checks(disabled: bool, valid: bool) -> Self {
        if disabled {
            Status::Disabled
        } else if valid {
            Status::Valid
        } else {
            Status::Invalid
        }
    }
}

/// A failure together with the node that reported it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathFailure {
    pub path: FormPath,
    #[serde(flatten)]
    pub failure: Failure,
}

/// A leaf input
#[derive(Debug, Clone)]
pub struct Field {
    kind: ValueKind,
    value: FieldValue,
    initial: FieldValue,
    validators: Vec<FieldValidator>,
    disabled: bool,
    errors: Vec<Failure>,
    status: Status,
}

impl Field {
    pub(crate) fn build(schema: &FieldSchema) -> Result<Self> {
        let initial = FieldValue::from_json(schema.kind, &schema.initial)?;
        let validators = schema
            .validators
            .iter()
            .map(|spec| FieldValidator::compile(spec, schema.kind))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            kind: schema.kind,
            value: initial.clone(),
            initial,
            validators,
            disabled: schema.disabled,
            errors: Vec::new(),
            status: Status::Valid,
        })
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    pub fn initial(&self) -> &FieldValue {
        &self.initial
    }

    pub(crate) fn set(&mut self, value: FieldValue) {
        self.value = value;
    }

    fn validate(&mut self) -> Status {
        self.errors = if self.disabled {
            Vec::new()
        } else {
            self.validators
                .iter()
                .filter_map(|validator| validator.check(&self.value))
                .collect()
        };
        self.status = Status::from_checks(self.disabled, self.errors.is_empty());
        self.status
    }
}

/// A named child of a group
#[derive(Debug, Clone)]
pub struct Child {
    name: String,
    node: Node,
}

impl Child {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node(&self) -> &Node {
        &self.node
    }
}

/// Ordered named children plus cross-field rules
#[derive(Debug, Clone)]
pub struct Group {
    children: Vec<Child>,
    rules: Vec<GroupRule>,
    disabled: bool,
    errors: Vec<Failure>,
    status: Status,
}

impl Group {
    pub(crate) fn build(schema: &GroupSchema) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut children = Vec::with_capacity(schema.children.len());
        for child in &schema.children {
            if is_index(&child.name) {
                return Err(FormError::NumericName(child.name.clone()));
            }
            if !seen.insert(child.name.as_str()) {
                return Err(FormError::DuplicateName(child.name.clone()));
            }
            children.push(Child {
                name: child.name.clone(),
                node: Node::build(&child.node)?,
            });
        }

        let rules = schema
            .rules
            .iter()
            .map(|spec| GroupRule::resolve(spec, &children))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            children,
            rules,
            disabled: false,
            errors: Vec::new(),
            status: Status::Valid,
        })
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    /// Look up a direct child by name
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name).map(|c| &c.node)
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.children
            .iter_mut()
            .find(|c| c.name == name)
            .map(|c| &mut c.node)
    }

    fn validate(&mut self) -> Status {
        let mut children_valid = true;
        for child in &mut self.children {
            if child.node.validate() == Status::Invalid {
                children_valid = false;
            }
        }
        self.errors = if self.disabled {
            Vec::new()
        } else {
            self.rules
                .iter()
                .filter_map(|rule| rule.check(&self.children))
                .collect()
        };
        self.status = Status::from_checks(self.disabled, children_valid && self.errors.is_empty());
        self.status
    }
}

/// A resizable list of elements cloned from one template
#[derive(Debug, Clone)]
pub struct Collection {
    template: Box<Node>,
    initial_len: usize,
    elements: Vec<Node>,
    rules: Vec<CollectionRule>,
    disabled: bool,
    errors: Vec<Failure>,
    status: Status,
}

impl Collection {
    pub(crate) fn build(schema: &CollectionSchema) -> Result<Self> {
        let template = Node::build(&schema.element)?;
        let elements = (0..schema.initial_len).map(|_| template.clone()).collect();

        Ok(Self {
            template: Box::new(template),
            initial_len: schema.initial_len,
            elements,
            rules: schema.rules.clone(),
            disabled: false,
            errors: Vec::new(),
            status: Status::Valid,
        })
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> &[Node] {
        &self.elements
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.elements.get(index)
    }

    /// Append a fresh element and return its index
    pub(crate) fn push_new(&mut self) -> usize {
        self.elements.push(self.template.as_ref().clone());
        self.elements.len() - 1
    }

    /// Remove the element at `index`. Out-of-range indices leave the collection untouched.
    pub(crate) fn remove(&mut self, index: usize) -> bool {
        if index >= self.elements.len() {
            return false;
        }
        self.elements.remove(index);
        true
    }

    fn validate(&mut self) -> Status {
        let mut elements_valid = true;
        for element in &mut self.elements {
            if element.validate() == Status::Invalid {
                elements_valid = false;
            }
        }
        let len = self.elements.len();
        self.errors = if self.disabled {
            Vec::new()
        } else {
            self.rules.iter().filter_map(|rule| rule.check(len)).collect()
        };
        self.status = Status::from_checks(self.disabled, elements_valid && self.errors.is_empty());
        self.status
    }
}

/// Any node of the form tree
#[derive(Debug, Clone)]
pub enum Node {
    Field(Field),
    Group(Group),
    Collection(Collection),
}

impl Node {
    pub(crate) fn build(schema: &NodeSchema) -> Result<Self> {
        Ok(match schema {
            NodeSchema::Field(field) => Node::Field(Field::build(field)?),
            NodeSchema::Group(group) => Node::Group(Group::build(group)?),
            NodeSchema::Collection(collection) => Node::Collection(Collection::build(collection)?),
        })
    }

    pub fn as_field(&self) -> Option<&Field> {
        match self {
            Node::Field(field) => Some(field),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Node::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            Node::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    pub(crate) fn as_field_mut(&mut self) -> Option<&mut Field> {
        match self {
            Node::Field(field) => Some(field),
            _ => None,
        }
    }

    pub(crate) fn as_collection_mut(&mut self) -> Option<&mut Collection> {
        match self {
            Node::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    /// Status as of the last validation pass
    pub fn status(&self) -> Status {
        match self {
            Node::Field(field) => field.status,
            Node::Group(group) => group.status,
            Node::Collection(collection) => collection.status,
        }
    }

    /// Failures reported by this node's own validators and rules. Always
    /// empty for a disabled node.
    pub fn errors(&self) -> &[Failure] {
        match self {
            Node::Field(field) => &field.errors,
            Node::Group(group) => &group.errors,
            Node::Collection(collection) => &collection.errors,
        }
    }

    pub fn is_disabled(&self) -> bool {
        match self {
            Node::Field(field) => field.disabled,
            Node::Group(group) => group.disabled,
            Node::Collection(collection) => collection.disabled,
        }
    }

    /// Disable or enable this node and everything below it, including the
    /// collection templates later elements are cloned from
    pub(crate) fn set_disabled(&mut self, disabled: bool) {
        match self {
            Node::Field(field) => field.disabled = disabled,
            Node::Group(group) => {
                group.disabled = disabled;
                for child in &mut group.children {
                    child.node.set_disabled(disabled);
                }
            }
            Node::Collection(collection) => {
                collection.disabled = disabled;
                collection.template.set_disabled(disabled);
                for element in &mut collection.elements {
                    element.set_disabled(disabled);
                }
            }
        }
    }

    /// Direct child addressed by one path segment
    pub fn child(&self, segment: &Segment) -> Option<&Node> {
        match (self, segment) {
            (Node::Group(group), Segment::Key(key)) => group.get(key),
            (Node::Collection(collection), Segment::Index(index)) => collection.get(*index),
            _ => None,
        }
    }

    pub(crate) fn child_mut(&mut self, segment: &Segment) -> Option<&mut Node> {
        match (self, segment) {
            (Node::Group(group), Segment::Key(key)) => group.get_mut(key),
            (Node::Collection(collection), Segment::Index(index)) => {
                collection.elements.get_mut(*index)
            }
            _ => None,
        }
    }

    /// Recompute failures and status for this subtree
    pub(crate) fn validate(&mut self) -> Status {
        match self {
            Node::Field(field) => field.validate(),
            Node::Group(group) => group.validate(),
            Node::Collection(collection) => collection.validate(),
        }
    }

    /// Restore initial values and collection lengths. Disabled flags are kept.
    pub(crate) fn reset(&mut self) {
        match self {
            Node::Field(field) => field.value = field.initial.clone(),
            Node::Group(group) => {
                for child in &mut group.children {
                    child.node.reset();
                }
            }
            Node::Collection(collection) => {
                let template = collection.template.as_ref();
                collection.elements = (0..collection.initial_len).map(|_| template.clone()).collect();
            }
        }
    }

    /// Plain nested value of this subtree
    pub fn snapshot(&self, mode: ValueMode) -> Value {
        let include = |node: &Node| mode == ValueMode::Raw || !node.is_disabled();

        match self {
            Node::Field(field) => field.value.to_json(),
            Node::Group(group) => {
                let mut map = Map::new();
                for child in group.children.iter().filter(|c| include(&c.node)) {
                    map.insert(child.name.clone(), child.node.snapshot(mode));
                }
                Value::Object(map)
            }
            Node::Collection(collection) => Value::Array(
                collection
                    .elements
                    .iter()
                    .filter(|e| include(*e))
                    .map(|e| e.snapshot(mode))
                    .collect(),
            ),
        }
    }

    /// Gather failures of every enabled node below and including this one
    pub(crate) fn collect_failures(&self, path: &FormPath, out: &mut Vec<PathFailure>) {
        if self.is_disabled() {
            return;
        }
        out.extend(self.errors().iter().map(|failure| PathFailure {
            path: path.clone(),
            failure: failure.clone(),
        }));

        match self {
            Node::Field(_) => {}
            Node::Group(group) => {
                for child in &group.children {
                    child.node.collect_failures(&path.child_key(&child.name), out);
                }
            }
            Node::Collection(collection) => {
                for (index, element) in collection.elements.iter().enumerate() {
                    element.collect_failures(&path.child_index(index), out);
                }
            }
        }
    }
}
