//! Error types for schema construction and validation.
//!
//! Two separate taxonomies: [`ConstructionError`] for problems raised while
//! building a schema tree, and [`SchemaError`] for runtime validation
//! failures. Every runtime variant carries the resolved dotted path of the
//! offending node so callers can report exactly where the input went wrong.

use thiserror::Error;

/// A runtime validation failure.
///
/// Validation is fail-fast: the first violation aborts the current
/// `validate`/`extract` call and is the only error surfaced. Each variant
/// carries the dotted path of the schema node that rejected the input
/// (e.g., `goods.skus.id`).
///
/// # Example
///
/// ```rust
/// use jsonsift::{SchemaNode, SchemaTree, Validator};
/// use serde_json::json;
///
/// let root = SchemaNode::object("user", vec![SchemaNode::string("name")]).unwrap();
/// let tree = SchemaTree::resolve(root).unwrap();
///
/// let err = Validator::new().validate(&tree, &json!({})).unwrap_err();
/// assert_eq!(err.path(), "user.name");
/// ```
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SchemaError {
    /// A required field is absent or null.
    #[error("required field `{path}` is missing")]
    MissingRequiredField {
        /// Dotted path of the missing field.
        path: String,
    },

    /// The value's JSON kind does not match the schema kind.
    #[error("`{path}` expected {expected}, got {got}")]
    TypeMismatch {
        /// Dotted path of the mismatched node.
        path: String,
        /// The JSON kind the schema declares.
        expected: &'static str,
        /// The JSON kind found in the input.
        got: String,
    },

    /// A numeric value or string length lies outside the declared bounds.
    #[error("`{path}` {message}")]
    RangeViolation {
        /// Dotted path of the out-of-range node.
        path: String,
        /// Bounds-specific message (numeric vs. character-size, one- or two-sided).
        message: String,
    },

    /// A literal is not lexically valid for the schema kind
    /// (non-numeric number, boolean outside `true`/`false`/`1`/`0`,
    /// unparsable embedded JSON in a flat parameter).
    #[error("`{path}` {message}")]
    FormatViolation {
        /// Dotted path of the malformed node.
        path: String,
        /// What the literal failed to be.
        message: String,
    },

    /// The node's attached custom rule returned false.
    #[error("`{path}` rejected by validation rule")]
    CustomRuleViolation {
        /// Dotted path of the rejected node.
        path: String,
    },
}

impl SchemaError {
    /// Returns the dotted path of the node that produced this error.
    pub fn path(&self) -> &str {
        match self {
            SchemaError::MissingRequiredField { path }
            | SchemaError::TypeMismatch { path, .. }
            | SchemaError::RangeViolation { path, .. }
            | SchemaError::FormatViolation { path, .. }
            | SchemaError::CustomRuleViolation { path } => path,
        }
    }
}

/// An error raised while building a schema tree.
///
/// Construction errors are raised immediately at build time (factory
/// constructors, [`crate::SchemaTree::resolve`], or definition loading) and
/// never deferred to validation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConstructionError {
    /// An array's element schema carried a name without being an object.
    /// Array elements are positional; a named non-object element would be
    /// ambiguous between "the element type" and "a field under the array".
    #[error("array `{array}` element `{element}` must be unnamed unless it is an object")]
    NamedArrayElement {
        /// Name of the array node being constructed.
        array: String,
        /// The offending element name.
        element: String,
    },

    /// An object was given an unnamed object as a direct field, which would
    /// leave the field without an identity.
    #[error("object `{object}` has an anonymous object field")]
    AnonymousField {
        /// Name of the object node being constructed.
        object: String,
    },

    /// `min` is greater than `max` on the same node.
    #[error("node `{name}` declares min {min} greater than max {max}")]
    InvertedBounds {
        /// Name of the node with inverted bounds.
        name: String,
        /// Literal text of the min bound.
        min: String,
        /// Literal text of the max bound.
        max: String,
    },

    /// A bound's literal text is not numeric.
    #[error("node `{name}` has non-numeric bound `{bound}`")]
    MalformedBound {
        /// Name of the node carrying the bound.
        name: String,
        /// The offending literal.
        bound: String,
    },

    /// A persisted definition names a `dataType` this model does not know.
    #[error("unknown dataType `{0}` in schema definition")]
    UnknownDataType(String),

    /// A persisted definition does not have the expected document shape.
    #[error("malformed schema definition: {0}")]
    MalformedDefinition(String),
}
