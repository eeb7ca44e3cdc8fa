//! Schema node model.
//!
//! This module provides [`SchemaNode`], the declarative unit of a validation
//! tree, together with [`SchemaKind`], [`PrimitiveKind`], and [`Bound`].
//! Nodes are built bottom-up through factory constructors that enforce the
//! structural invariants at construction time, then handed to
//! [`crate::SchemaTree::resolve`] for parent wiring before use.

use std::fmt;
use std::sync::Arc;

use crate::error::ConstructionError;
use crate::rules::{EnumRule, ValueRule, ValueSetRule};

/// The JSON kind a primitive schema node validates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// A text value; `min`/`max` bound the character count.
    String,
    /// A numeric value; `min`/`max` bound the numeric value, decimal-aware.
    Number,
    /// A boolean; accepted literal forms are exactly `true`, `false`, `1`, `0`.
    Boolean,
}

/// The kind of a schema node.
///
/// A closed sum type: engine dispatch is an exhaustive match, so there is no
/// unchecked-cast failure mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    /// Named fields in insertion order.
    Object,
    /// Homogeneous elements described by at most one element schema.
    Array,
    /// A single scalar value.
    Primitive(PrimitiveKind),
    /// Anything; string values are still subject to length bounds.
    Any,
}

impl SchemaKind {
    /// Returns true for `SchemaKind::Object`.
    pub fn is_object(&self) -> bool {
        matches!(self, SchemaKind::Object)
    }

    /// Returns true for `SchemaKind::Array`.
    pub fn is_array(&self) -> bool {
        matches!(self, SchemaKind::Array)
    }

    /// Returns true for any `SchemaKind::Primitive`.
    pub fn is_primitive(&self) -> bool {
        matches!(self, SchemaKind::Primitive(_))
    }

    /// Returns true for `SchemaKind::Any`.
    pub fn is_any(&self) -> bool {
        matches!(self, SchemaKind::Any)
    }

    /// The `dataType` tag used in persisted definitions and generated code.
    pub fn data_type(&self) -> &'static str {
        match self {
            SchemaKind::Object => "object",
            SchemaKind::Array => "array",
            SchemaKind::Primitive(PrimitiveKind::String) => "string",
            SchemaKind::Primitive(PrimitiveKind::Number) => "number",
            SchemaKind::Primitive(PrimitiveKind::Boolean) => "boolean",
            SchemaKind::Any => "any",
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.data_type())
    }
}

/// A numeric bound that remembers its literal text.
///
/// The textual form matters: a bound written `20.0` selects float-domain
/// comparison while `20` selects integer-domain comparison, so the literal
/// must survive construction and serialization unchanged.
///
/// # Example
///
/// ```rust
/// use jsonsift::Bound;
///
/// assert!(!Bound::from(20).is_decimal());
/// assert!(Bound::from(7.18).is_decimal());
/// assert!(Bound::from("20.0").is_decimal());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    raw: String,
}

impl Bound {
    /// Returns the literal text of this bound.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// True when the literal text contains a decimal point, which selects
    /// float-domain comparison for this bound.
    pub fn is_decimal(&self) -> bool {
        self.raw.contains('.')
    }

    /// The bound as a float, if the literal is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        self.raw.parse().ok()
    }

    /// The bound as an integer, if the literal is a plain integer.
    pub fn as_i64(&self) -> Option<i64> {
        self.raw.parse().ok()
    }

    /// The bound as a character count, for string-length checks.
    pub fn as_len(&self) -> Option<usize> {
        self.raw.parse().ok()
    }
}

impl From<i64> for Bound {
    fn from(v: i64) -> Self {
        Bound { raw: v.to_string() }
    }
}

impl From<f64> for Bound {
    fn from(v: f64) -> Self {
        // {:?} keeps the decimal point on whole floats (20.0, not 20)
        Bound {
            raw: format!("{:?}", v),
        }
    }
}

impl From<&str> for Bound {
    fn from(v: &str) -> Self {
        Bound { raw: v.to_string() }
    }
}

impl From<String> for Bound {
    fn from(raw: String) -> Self {
        Bound { raw }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// One declarative unit of a validation tree.
///
/// A node is an Object, Array, Primitive, or Any, with a name (empty for
/// array-element and root wrapper nodes), a required flag (on by default),
/// optional bounds, documentation fields, and an optional custom rule.
///
/// Nodes are immutable in shape once [`crate::SchemaTree::resolve`] has run;
/// until then they are built fluently:
///
/// ```rust
/// use jsonsift::SchemaNode;
///
/// let goods = SchemaNode::object("goods", vec![
///     SchemaNode::string("name").min(1).max(32),
///     SchemaNode::number("price").min(0).optional(),
///     SchemaNode::array("skus", Some(SchemaNode::object("", vec![
///         SchemaNode::number("id"),
///     ]).unwrap())).unwrap(),
/// ]).unwrap();
/// ```
pub struct SchemaNode {
    pub(crate) kind: SchemaKind,
    pub(crate) name: String,
    pub(crate) required: bool,
    pub(crate) description: Option<String>,
    pub(crate) example: Option<String>,
    pub(crate) min: Option<Bound>,
    pub(crate) max: Option<Bound>,
    pub(crate) children: Vec<SchemaNode>,
    pub(crate) rule: Option<Arc<dyn ValueRule>>,
}

impl SchemaNode {
    fn leaf(kind: SchemaKind, name: impl Into<String>) -> Self {
        SchemaNode {
            kind,
            name: name.into(),
            required: true,
            description: None,
            example: None,
            min: None,
            max: None,
            children: Vec::new(),
            rule: None,
        }
    }

    /// Creates a string primitive node.
    pub fn string(name: impl Into<String>) -> Self {
        Self::leaf(SchemaKind::Primitive(PrimitiveKind::String), name)
    }

    /// Creates a number primitive node.
    pub fn number(name: impl Into<String>) -> Self {
        Self::leaf(SchemaKind::Primitive(PrimitiveKind::Number), name)
    }

    /// Creates a boolean primitive node.
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::leaf(SchemaKind::Primitive(PrimitiveKind::Boolean), name)
    }

    /// Creates a primitive node of the given kind.
    pub fn primitive(name: impl Into<String>, kind: PrimitiveKind) -> Self {
        Self::leaf(SchemaKind::Primitive(kind), name)
    }

    /// Creates an any node (no kind constraint; string values are still
    /// subject to length bounds).
    pub fn any(name: impl Into<String>) -> Self {
        Self::leaf(SchemaKind::Any, name)
    }

    /// Creates an object node with the given named fields, preserving their
    /// order.
    ///
    /// Rejects a field that is an unnamed object: such a field would have no
    /// identity of its own.
    pub fn object(
        name: impl Into<String>,
        children: Vec<SchemaNode>,
    ) -> Result<Self, ConstructionError> {
        let name = name.into();
        for child in &children {
            if child.kind.is_object() && child.name.is_empty() {
                return Err(ConstructionError::AnonymousField {
                    object: name.clone(),
                });
            }
        }
        let mut node = Self::leaf(SchemaKind::Object, name);
        node.children = children;
        Ok(node)
    }

    /// Creates an array node with an optional element schema.
    ///
    /// `None` declares an opaque array (contents pass through untouched).
    /// An element carrying a non-blank name is rejected unless it is an
    /// object: elements are positional, and a named non-object element would
    /// be ambiguous between the element type and a field under the array.
    pub fn array(
        name: impl Into<String>,
        element: Option<SchemaNode>,
    ) -> Result<Self, ConstructionError> {
        let name = name.into();
        if let Some(element) = &element {
            if !element.name.is_empty() && !element.kind.is_object() {
                return Err(ConstructionError::NamedArrayElement {
                    array: name.clone(),
                    element: element.name.clone(),
                });
            }
        }
        let mut node = Self::leaf(SchemaKind::Array, name);
        node.children = element.into_iter().collect();
        Ok(node)
    }

    /// Marks this node optional; a missing or null value at its position is
    /// then tolerated (the custom rule still runs once with null).
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Marks this node required (the default).
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Attaches a human description, used by generation only.
    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Attaches a string-encoded sample value, used by generation only;
    /// never participates in validation.
    pub fn example(mut self, text: impl Into<String>) -> Self {
        self.example = Some(text.into());
        self
    }

    /// Sets the lower bound: character count for String/Any, numeric value
    /// for Number. Inverted bounds are caught when the tree is resolved.
    pub fn min(mut self, bound: impl Into<Bound>) -> Self {
        self.min = Some(bound.into());
        self
    }

    /// Sets the upper bound: character count for String/Any, numeric value
    /// for Number.
    pub fn max(mut self, bound: impl Into<Bound>) -> Self {
        self.max = Some(bound.into());
        self
    }

    /// Attaches a custom validation rule, consulted last in validation order.
    pub fn with_rule(mut self, rule: impl ValueRule + 'static) -> Self {
        self.rule = Some(Arc::new(rule));
        self
    }

    /// Attaches a shared custom validation rule.
    pub fn with_shared_rule(mut self, rule: Arc<dyn ValueRule>) -> Self {
        self.rule = Some(rule);
        self
    }

    /// Attaches an enum-membership rule: the value must equal one of the
    /// given literals, case-exact.
    pub fn in_enum<I, T>(self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        self.with_rule(EnumRule::new(values))
    }

    /// Adds "must be one of" values, growing the node's value-set rule.
    pub fn within_values<I, T>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        let set = self.take_value_set().within(values);
        self.rule = Some(Arc::new(set));
        self
    }

    /// Adds "must not be one of" values, growing the node's value-set rule.
    pub fn exclude_values<I, T>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        let set = self.take_value_set().exclude(values);
        self.rule = Some(Arc::new(set));
        self
    }

    // Detaches the current rule when it is a ValueSetRule so within/exclude
    // calls can be chained; any other rule kind is replaced.
    fn take_value_set(&mut self) -> ValueSetRule {
        self.rule
            .take()
            .as_deref()
            .and_then(|r| r.as_value_set())
            .cloned()
            .unwrap_or_default()
    }

    /// The node's kind.
    pub fn kind(&self) -> SchemaKind {
        self.kind
    }

    /// The node's name; empty for array-element and root wrapper nodes.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a missing or null value at this position is a hard error.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// The node's description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The node's string-encoded example, if any.
    pub fn example_value(&self) -> Option<&str> {
        self.example.as_deref()
    }

    /// The node's lower bound, if any.
    pub fn min_bound(&self) -> Option<&Bound> {
        self.min.as_ref()
    }

    /// The node's upper bound, if any.
    pub fn max_bound(&self) -> Option<&Bound> {
        self.max.as_ref()
    }

    /// The node's children: named fields for an object, at most the element
    /// schema for an array.
    pub fn child_nodes(&self) -> &[SchemaNode] {
        &self.children
    }
}

impl fmt::Debug for SchemaNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaNode")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("required", &self.required)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("children", &self.children)
            .field("rule", &self.rule.is_some())
            .finish()
    }
}
