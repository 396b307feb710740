//! Declarative form schemas
//!
//! A [`FormSchema`] describes the shape of a form: fields with initial values
//! and validators, nested groups with cross-field rules, and collections
//! with an element template. Schemas can be written in Rust with the builder
//! methods below or loaded from JSON.
//!
//! ## Example schema file
//! ```json
//! {
//!   "name": "contact",
//!   "root": {
//!     "children": [
//!       { "name": "email", "node": "field", "kind": "text",
//!         "validators": [{ "type": "required" }, { "type": "email" }] },
//!       { "name": "phones", "node": "collection", "initial_len": 1,
//!         "rules": [{ "type": "nonEmpty" }],
//!         "element": { "node": "field", "kind": "text",
//!                      "validators": [{ "type": "pattern", "regex": "^\\d{10}$" }] } }
//!     ]
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::rules::{CollectionRule, GroupRuleSpec};
use crate::submit::SubmitOptions;
use crate::validator::ValidatorSpec;
use crate::value::ValueKind;

/// A complete form definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    /// Unique name of the form (e.g. "job-application")
    pub name: String,
    /// Human readable title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Submission behaviour for this form
    #[serde(default)]
    pub submit: SubmitOptions,
    /// The root group
    pub root: GroupSchema,
}

impl FormSchema {
    pub fn new(name: impl Into<String>, root: GroupSchema) -> Self {
        Self {
            name: name.into(),
            title: None,
            description: None,
            submit: SubmitOptions::default(),
            root,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_submit(mut self, submit: SubmitOptions) -> Self {
        self.submit = submit;
        self
    }
}

/// Any node of a form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum NodeSchema {
    Field(FieldSchema),
    Group(GroupSchema),
    Collection(CollectionSchema),
}

impl From<FieldSchema> for NodeSchema {
    fn from(schema: FieldSchema) -> Self {
        NodeSchema::Field(schema)
    }
}

impl From<GroupSchema> for NodeSchema {
    fn from(schema: GroupSchema) -> Self {
        NodeSchema::Group(schema)
    }
}

impl From<CollectionSchema> for NodeSchema {
    fn from(schema: CollectionSchema) -> Self {
        NodeSchema::Collection(schema)
    }
}

/// A leaf input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub kind: ValueKind,
    /// Initial value; `null` means the empty value for `kind`
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub initial: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<ValidatorSpec>,
    /// Disabled fields are skipped by validation and only appear in raw snapshots
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl FieldSchema {
    pub fn of(kind: ValueKind) -> Self {
        Self {
            kind,
            initial: Value::Null,
            validators: Vec::new(),
            disabled: false,
        }
    }

    pub fn text() -> Self {
        Self::of(ValueKind::Text)
    }

    pub fn boolean() -> Self {
        Self::of(ValueKind::Boolean)
    }

    pub fn date() -> Self {
        Self::of(ValueKind::Date)
    }

    pub fn number() -> Self {
        Self::of(ValueKind::Number)
    }

    pub fn initial(mut self, value: impl Into<Value>) -> Self {
        self.initial = value.into();
        self
    }

    pub fn validator(mut self, spec: ValidatorSpec) -> Self {
        self.validators.push(spec);
        self
    }

    pub fn required(self) -> Self {
        self.validator(ValidatorSpec::Required)
    }

    pub fn required_true(self) -> Self {
        self.validator(ValidatorSpec::RequiredTrue)
    }

    pub fn pattern(self, regex: impl Into<String>) -> Self {
        self.validator(ValidatorSpec::Pattern { regex: regex.into() })
    }

    pub fn min(self, min: f64) -> Self {
        self.validator(ValidatorSpec::Min { min })
    }

    pub fn min_length(self, len: usize) -> Self {
        self.validator(ValidatorSpec::MinLength { len })
    }

    pub fn email(self) -> Self {
        self.validator(ValidatorSpec::Email)
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

/// A named child inside a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildSchema {
    pub name: String,
    #[serde(flatten)]
    pub node: NodeSchema,
}

/// An ordered set of named children plus cross-field rules
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupSchema {
    #[serde(default)]
    pub children: Vec<ChildSchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<GroupRuleSpec>,
}

impl GroupSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a child of any node type
    pub fn child(mut self, name: impl Into<String>, node: impl Into<NodeSchema>) -> Self {
        self.children.push(ChildSchema {
            name: name.into(),
            node: node.into(),
        });
        self
    }

    pub fn field(self, name: impl Into<String>, field: FieldSchema) -> Self {
        self.child(name, field)
    }

    pub fn group(self, name: impl Into<String>, group: GroupSchema) -> Self {
        self.child(name, group)
    }

    pub fn collection(self, name: impl Into<String>, collection: CollectionSchema) -> Self {
        self.child(name, collection)
    }

    pub fn rule(mut self, rule: GroupRuleSpec) -> Self {
        self.rules.push(rule);
        self
    }
}

/// A resizable list of uniformly shaped elements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSchema {
    /// Template every element is created from
    pub element: Box<NodeSchema>,
    /// Number of elements present when the form is built or reset
    #[serde(default)]
    pub initial_len: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<CollectionRule>,
}

impl CollectionSchema {
    /// An initially empty collection of `element`
    pub fn of(element: impl Into<NodeSchema>) -> Self {
        Self {
            element: Box::new(element.into()),
            initial_len: 0,
            rules: Vec::new(),
        }
    }

    pub fn initial_len(mut self, len: usize) -> Self {
        self.initial_len = len;
        self
    }

    pub fn non_empty(mut self) -> Self {
        self.rules.push(CollectionRule::NonEmpty);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn contact() -> FormSchema {
        FormSchema::new(
            "contact",
            GroupSchema::new()
                .field("email", FieldSchema::text().required().email())
                .group(
                    "password",
                    GroupSchema::new()
                        .field("password", FieldSchema::text().required().min_length(6))
                        .field("confirm", FieldSchema::text())
                        .rule(GroupRuleSpec::password_match("password", "confirm")),
                )
                .collection(
                    "phones",
                    CollectionSchema::of(FieldSchema::text().pattern(r"^\d{10}$"))
                        .initial_len(1)
                        .non_empty(),
                ),
        )
    }

    #[test]
    fn test_json_round_trip() {
        let schema = contact();
        let json = serde_json::to_string_pretty(&schema).unwrap();
        let parsed: FormSchema = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, schema);
    }

    #[test]
    fn test_json_layout() {
        let value = serde_json::to_value(contact()).unwrap();
        let children = &value["root"]["children"];
        assert_eq!(children[0]["name"], "email");
        assert_eq!(children[0]["node"], "field");
        assert_eq!(children[0]["validators"], json!([{ "type": "required" }, { "type": "email" }]));
        assert_eq!(children[2]["node"], "collection");
        assert_eq!(children[2]["element"]["kind"], "text");
        assert_eq!(children[2]["rules"], json!([{ "type": "nonEmpty" }]));
    }

    #[test]
    fn test_defaults_when_parsing() {
        let schema: FormSchema = serde_json::from_value(json!({
            "name": "minimal",
            "root": {
                "children": [
                    { "name": "agree", "node": "field", "kind": "boolean", "initial": true }
                ]
            }
        }))
        .unwrap();

        assert_eq!(schema.submit, SubmitOptions::default());
        match &schema.root.children[0].node {
            NodeSchema::Field(field) => {
                assert_eq!(field.initial, json!(true));
                assert!(field.validators.is_empty());
                assert!(!field.disabled);
            }
            other => panic!("Expected field, got {:?}", other),
        }
    }
}
