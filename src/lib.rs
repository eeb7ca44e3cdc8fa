//! # Jsonsift
//!
//! A typed schema model for JSON values, and a validation/extraction engine
//! that checks arbitrary JSON input (or flat key→value lookups, as produced
//! by HTTP form parameters) against a schema, yielding either a verdict
//! with a precise dotted error path, or a filtered value tree containing
//! only schema-declared fields.
//!
//! ## Overview
//!
//! A schema is built bottom-up from [`SchemaNode`] factories, resolved once
//! through [`SchemaTree::resolve`] (which wires parent links and freezes
//! the shape), then shared across any number of validation calls.
//! Validation is fail-fast: the first violation aborts and is the only
//! error surfaced, carrying the offending node's dotted path.
//!
//! ## Core types
//!
//! - [`SchemaNode`] / [`SchemaKind`]: the declarative schema tree
//! - [`SchemaTree`]: parent-wired, path-addressable resolved form
//! - [`Validator`]: the recursive validate-and-extract engine
//! - [`SchemaError`] / [`ConstructionError`]: runtime and build-time errors
//! - [`ValueRule`] / [`UnknownFieldPolicy`]: the two pluggable hook points
//!
//! ## Example
//!
//! ```rust
//! use jsonsift::{SchemaNode, SchemaTree, Validator};
//! use serde_json::json;
//!
//! let root = SchemaNode::object("goods", vec![
//!     SchemaNode::string("name").min(1).max(32),
//!     SchemaNode::number("price").min(0),
//!     SchemaNode::array("skus", Some(SchemaNode::object("", vec![
//!         SchemaNode::number("id"),
//!         SchemaNode::string("color").in_enum(["RED", "GREEN", "BLUE"]),
//!     ]).unwrap())).unwrap(),
//! ]).unwrap();
//! let tree = SchemaTree::resolve(root).unwrap();
//!
//! let input = json!({
//!     "name": "IPhone7",
//!     "price": 99.98,
//!     "skus": [{"id": 100, "color": "RED", "undeclared": true}],
//! });
//!
//! let v = Validator::new();
//! v.validate(&tree, &input).unwrap();
//!
//! // Extraction drops the undeclared field.
//! let out = v.extract(&tree, input).unwrap();
//! assert_eq!(out["skus"][0], json!({"id": 100, "color": "RED"}));
//!
//! // Errors carry the dotted path, skipping the anonymous element wrapper.
//! let err = v.validate(&tree, &json!({
//!     "name": "IPhone7", "price": 1, "skus": [{"color": "RED"}],
//! })).unwrap_err();
//! assert_eq!(err.path(), "goods.skus.id");
//! ```

pub mod engine;
pub mod error;
pub mod gen;
pub mod infer;
pub mod node;
pub mod persist;
pub mod policy;
pub mod rules;
pub mod tree;

pub use engine::{ParamSource, Validator};
pub use error::{ConstructionError, SchemaError};
pub use gen::{builder_source, example_json, GenOptions};
pub use infer::{infer, infer_named, Requiredness};
pub use node::{Bound, PrimitiveKind, SchemaKind, SchemaNode};
pub use persist::{schema_from_json, schema_to_json};
pub use policy::{DropUnknown, ExtensionEnvelope, UnknownFieldPolicy};
pub use rules::{EnumRule, ValueRule, ValueSetRule};
pub use tree::{NodeId, NodeView, SchemaTree};
