//! Reactive Forms
//!
//! A form model builder and validation engine for nested, dynamically sized
//! forms: grouped fields, resizable collections (education entries, phone
//! numbers, responsibilities), per-field and cross-field validation, and a
//! submit operation that hands the aggregated value to a sink.
//!
//! ## Features
//!
//! - **Declarative Schemas**: Forms are described by a [`FormSchema`], written in Rust or loaded from JSON
//! - **Typed Paths**: Nodes are addressed by parsed [`FormPath`]s; rule targets are resolved at build time
//! - **Synchronous Validation**: Every mutation revalidates the tree before returning
//! - **Explicit Submit Policy**: Invalid forms are withheld unless [`SubmitPolicy::Always`] is chosen
//! - **Built-in Presets**: The user and job application forms ship in the [`FormCatalog`]
//!
//! ## Architecture
//!
//! ```text
//! FormSchema ──build──▶ Form
//!                        └─ Node::Group (root)
//!                            ├─ Node::Field        value + validators
//!                            ├─ Node::Group        children + group rules
//!                            └─ Node::Collection   template + elements + collection rules
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod form;
pub mod model;
pub mod path;
pub mod rules;
pub mod schema;
pub mod submit;
pub mod validator;
pub mod value;

pub use catalog::{FormCatalog, SearchResult};
pub use config::FormsConfig;
pub use error::{FormError, Result};
pub use form::Form;
pub use model::{Node, PathFailure, Status};
pub use path::{FormPath, Segment};
pub use rules::{CollectionRule, GroupRuleSpec};
pub use schema::{CollectionSchema, FieldSchema, FormSchema, GroupSchema, NodeSchema};
pub use submit::{CollectSink, LogSink, Submission, SubmissionSink, SubmitOptions, SubmitPolicy, ValueMode};
pub use validator::{Failure, ValidatorSpec};
pub use value::{FieldValue, ValueKind};
