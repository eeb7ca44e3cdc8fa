//! Schema inference from a sample JSON document.
//!
//! [`infer`] mirrors a document's shape into a [`SchemaNode`] tree: objects
//! become named children in document order, an array's first element stands
//! in for every element, and each primitive records the sample's textual
//! form as its example value so a generated example document round-trips
//! the sample. The caller decides requiredness through a [`Requiredness`]
//! policy, then resolves the result into a [`crate::SchemaTree`] before use.

use std::sync::Arc;

use serde_json::Value;

use crate::error::ConstructionError;
use crate::node::{SchemaKind, SchemaNode};

/// Default-requiredness policy applied to every inferred node.
#[derive(Clone)]
pub enum Requiredness {
    /// Every inferred node is required.
    Required,
    /// Every inferred node is optional.
    Optional,
    /// Programmable: the predicate receives the field name (empty for
    /// array elements and the root) and the inferred kind.
    With(Arc<dyn Fn(&str, SchemaKind) -> bool + Send + Sync>),
}

impl Requiredness {
    fn decide(&self, name: &str, kind: SchemaKind) -> bool {
        match self {
            Requiredness::Required => true,
            Requiredness::Optional => false,
            Requiredness::With(predicate) => predicate(name, kind),
        }
    }
}

impl std::fmt::Debug for Requiredness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Requiredness::Required => f.write_str("Required"),
            Requiredness::Optional => f.write_str("Optional"),
            Requiredness::With(_) => f.write_str("With(..)"),
        }
    }
}

/// Infers an unnamed root schema mirroring `sample`.
///
/// # Example
///
/// ```rust
/// use jsonsift::{infer, Requiredness, SchemaTree, Validator};
/// use serde_json::json;
///
/// let sample = json!({"name": "IPhone7", "price": 99.98});
/// let root = infer(&sample, &Requiredness::Required).unwrap();
/// let tree = SchemaTree::resolve(root).unwrap();
///
/// Validator::new()
///     .validate(&tree, &json!({"name": "Pixel", "price": 49.5}))
///     .unwrap();
/// ```
pub fn infer(sample: &Value, requiredness: &Requiredness) -> Result<SchemaNode, ConstructionError> {
    infer_named("", sample, requiredness)
}

/// Infers a schema for `sample` rooted at the given name.
pub fn infer_named(
    name: &str,
    sample: &Value,
    requiredness: &Requiredness,
) -> Result<SchemaNode, ConstructionError> {
    let node = match sample {
        Value::Object(fields) => {
            let mut children = Vec::with_capacity(fields.len());
            for (field, value) in fields {
                children.push(infer_named(field, value, requiredness)?);
            }
            SchemaNode::object(name, children)?
        }
        Value::Array(items) => {
            // The first element's shape stands in for every element; an
            // empty array yields a childless (opaque) array schema.
            let element = items
                .first()
                .map(|item| infer_named("", item, requiredness))
                .transpose()?;
            SchemaNode::array(name, element)?
        }
        Value::String(s) => SchemaNode::string(name).example(s.clone()),
        Value::Number(n) => SchemaNode::number(name).example(n.to_string()),
        Value::Bool(b) => SchemaNode::boolean(name).example(b.to_string()),
        Value::Null => SchemaNode::any(name),
    };
    let required = requiredness.decide(node.name(), node.kind());
    Ok(if required { node.required() } else { node.optional() })
}
