//! Policies for input fields not declared in the schema.
//!
//! Before the engine descends into an object's declared children during
//! extraction, every input field name absent from the schema is put to the
//! configured [`UnknownFieldPolicy`]. The default drops unconditionally;
//! [`ExtensionEnvelope`] tolerates recognized extension fields when both the
//! name and the value shape match. Filtering mutates the value's field set
//! in place and runs once per object node.

use serde_json::{Map, Value};

/// Decides the fate of one input field not present in the schema.
///
/// `keep` receives the unknown field's name and the surrounding object, so
/// a policy can match on name and value shape together. Returning `false`
/// removes the field from the extracted result. Policies must not touch the
/// schema tree; they only influence the value being filtered.
pub trait UnknownFieldPolicy: Send + Sync {
    /// True to keep the field in the extracted result.
    fn keep(&self, name: &str, parent: &Map<String, Value>) -> bool;
}

/// The default policy: every undeclared field is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct DropUnknown;

impl UnknownFieldPolicy for DropUnknown {
    fn keep(&self, _name: &str, _parent: &Map<String, Value>) -> bool {
        false
    }
}

/// Tolerates recognized extension-envelope fields, drops everything else.
///
/// A field survives when its name is one of the registered envelope names
/// AND its value is either a free-form object or a string no longer than
/// the configured limit. Shape matters: a registered name carrying, say, an
/// array is still dropped.
///
/// # Example
///
/// ```rust
/// use jsonsift::{ExtensionEnvelope, SchemaNode, SchemaTree, Validator};
/// use serde_json::json;
///
/// let root = SchemaNode::object("goods", vec![SchemaNode::string("name")]).unwrap();
/// let tree = SchemaTree::resolve(root).unwrap();
///
/// let v = Validator::new().with_unknown_policy(ExtensionEnvelope::named(["ext"]));
/// let out = v
///     .extract(&tree, json!({"name": "x", "ext": {"a": 1}, "junk": 2}))
///     .unwrap();
/// assert_eq!(out, json!({"name": "x", "ext": {"a": 1}}));
/// ```
#[derive(Debug, Clone)]
pub struct ExtensionEnvelope {
    names: Vec<String>,
    max_text_len: usize,
}

impl ExtensionEnvelope {
    /// Creates a policy recognizing the given envelope names, with the
    /// default string-length limit of 1024 characters.
    pub fn named<I, T>(names: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        ExtensionEnvelope {
            names: names.into_iter().map(Into::into).collect(),
            max_text_len: 1024,
        }
    }

    /// Sets the maximum character count for string-typed envelopes.
    pub fn max_text_len(mut self, max: usize) -> Self {
        self.max_text_len = max;
        self
    }
}

impl UnknownFieldPolicy for ExtensionEnvelope {
    fn keep(&self, name: &str, parent: &Map<String, Value>) -> bool {
        if !self.names.iter().any(|n| n == name) {
            return false;
        }
        match parent.get(name) {
            Some(Value::Object(_)) => true,
            Some(Value::String(s)) => s.chars().count() <= self.max_text_len,
            _ => false,
        }
    }
}
