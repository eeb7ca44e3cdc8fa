//! Custom per-node validation rules.
//!
//! A [`ValueRule`] is a pluggable predicate attached to a single schema node
//! and consulted last in validation order, after the required/null and
//! built-in type/range checks. When a field is legitimately absent and
//! optional, the rule still runs once with `Value::Null` so nullable-aware
//! logic gets its say.
//!
//! Two built-ins cover the common cases: [`EnumRule`] for case-exact
//! membership in a fixed literal set, and [`ValueSetRule`] for independently
//! growable inclusion and exclusion sets.

use serde_json::Value;

use crate::tree::NodeView;

/// A predicate run against a schema node and the actual input value.
///
/// Returning `false` raises a `CustomRuleViolation` at the node's resolved
/// path; returning `true` is silent success. Rules must not mutate the
/// schema tree; they receive it by shared reference only.
///
/// # Example
///
/// ```rust
/// use jsonsift::{NodeView, SchemaNode, SchemaTree, ValueRule, Validator};
/// use serde_json::{json, Value};
///
/// struct NonZero;
///
/// impl ValueRule for NonZero {
///     fn check(&self, _node: NodeView<'_>, value: &Value) -> bool {
///         value.as_i64() != Some(0)
///     }
/// }
///
/// let root = SchemaNode::object("order", vec![
///     SchemaNode::number("qty").with_rule(NonZero),
/// ]).unwrap();
/// let tree = SchemaTree::resolve(root).unwrap();
///
/// let err = Validator::new().validate(&tree, &json!({"qty": 0})).unwrap_err();
/// assert_eq!(err.path(), "order.qty");
/// ```
pub trait ValueRule: Send + Sync {
    /// Checks the value at the given node. `value` is `Value::Null` when an
    /// optional field is absent.
    fn check(&self, node: NodeView<'_>, value: &Value) -> bool;

    /// The rule as a [`ValueSetRule`], when it is one. Lets the node builder
    /// grow an already-attached value set instead of replacing it.
    fn as_value_set(&self) -> Option<&ValueSetRule> {
        None
    }
}

/// Textual form of a scalar value, used for mode-agnostic comparisons
/// (flat parameter sources deliver every value as text).
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Case-exact membership in a fixed literal set.
///
/// The input's textual form must equal one of the configured literals, so a
/// JSON `20` and a form-parameter `"20"` are treated alike. Null passes:
/// absence is the required flag's concern, not the enum's.
///
/// # Example
///
/// ```rust
/// use jsonsift::{SchemaNode, SchemaTree, Validator};
/// use serde_json::json;
///
/// let root = SchemaNode::object("item", vec![
///     SchemaNode::string("color").in_enum(["RED", "GREEN", "BLUE"]),
/// ]).unwrap();
/// let tree = SchemaTree::resolve(root).unwrap();
///
/// let v = Validator::new();
/// assert!(v.validate(&tree, &json!({"color": "RED"})).is_ok());
/// assert!(v.validate(&tree, &json!({"color": "red"})).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct EnumRule {
    literals: Vec<String>,
}

impl EnumRule {
    /// Creates an enum rule over the given literals.
    pub fn new<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        EnumRule {
            literals: values.into_iter().map(|v| v.to_string()).collect(),
        }
    }

    /// The accepted literals.
    pub fn literals(&self) -> &[String] {
        &self.literals
    }
}

impl ValueRule for EnumRule {
    fn check(&self, _node: NodeView<'_>, value: &Value) -> bool {
        if value.is_null() {
            return true;
        }
        match scalar_text(value) {
            Some(text) => self.literals.iter().any(|l| *l == text),
            None => false,
        }
    }
}

/// Two independently growable sets: "must be one of" and "must not be one of".
///
/// Both are checked when non-empty; an empty set of either kind is no
/// constraint of that kind. Null passes for the same reason as [`EnumRule`].
///
/// # Example
///
/// ```rust
/// use jsonsift::{SchemaNode, SchemaTree, Validator, ValueSetRule};
/// use serde_json::json;
///
/// let root = SchemaNode::object("order", vec![
///     SchemaNode::number("status").with_rule(
///         ValueSetRule::new().within([10, 20, 30]).exclude([20]),
///     ),
/// ]).unwrap();
/// let tree = SchemaTree::resolve(root).unwrap();
///
/// let v = Validator::new();
/// assert!(v.validate(&tree, &json!({"status": 10})).is_ok());
/// assert!(v.validate(&tree, &json!({"status": 15})).is_err());
/// assert!(v.validate(&tree, &json!({"status": 20})).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ValueSetRule {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl ValueSetRule {
    /// Creates an empty value-set rule (no constraint of either kind).
    pub fn new() -> Self {
        Self::default()
    }

    /// Grows the "must be one of" set.
    pub fn within<I, T>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        self.include.extend(values.into_iter().map(|v| v.to_string()));
        self
    }

    /// Grows the "must not be one of" set.
    pub fn exclude<I, T>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        self.exclude.extend(values.into_iter().map(|v| v.to_string()));
        self
    }

    /// The "must be one of" literals.
    pub fn included(&self) -> &[String] {
        &self.include
    }

    /// The "must not be one of" literals.
    pub fn excluded(&self) -> &[String] {
        &self.exclude
    }
}

impl ValueRule for ValueSetRule {
    fn as_value_set(&self) -> Option<&ValueSetRule> {
        Some(self)
    }

    fn check(&self, _node: NodeView<'_>, value: &Value) -> bool {
        if value.is_null() {
            return true;
        }
        let text = match scalar_text(value) {
            Some(text) => text,
            None => return false,
        };
        if !self.include.is_empty() && !self.include.iter().any(|l| *l == text) {
            return false;
        }
        if self.exclude.iter().any(|l| *l == text) {
            return false;
        }
        true
    }
}

/// Closures over `(NodeView, &Value)` are rules too, for one-off checks.
impl<F> ValueRule for F
where
    F: Fn(NodeView<'_>, &Value) -> bool + Send + Sync,
{
    fn check(&self, node: NodeView<'_>, value: &Value) -> bool {
        self(node, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::SchemaNode;
    use crate::tree::SchemaTree;
    use serde_json::json;

    fn view_fixture() -> SchemaTree {
        let root = SchemaNode::object("root", vec![SchemaNode::number("n")]).unwrap();
        SchemaTree::resolve(root).unwrap()
    }

    fn check(rule: &dyn ValueRule, value: &Value) -> bool {
        let tree = view_fixture();
        rule.check(tree.view(tree.root()), value)
    }

    #[test]
    fn test_enum_rule_case_exact() {
        let rule = EnumRule::new(["RED", "GREEN"]);
        assert!(check(&rule, &json!("RED")));
        assert!(!check(&rule, &json!("red")));
        assert!(!check(&rule, &json!("BLUE")));
    }

    #[test]
    fn test_enum_rule_matches_numeric_text() {
        let rule = EnumRule::new([10, 20]);
        assert!(check(&rule, &json!(20)));
        assert!(check(&rule, &json!("20")));
        assert!(!check(&rule, &json!(15)));
    }

    #[test]
    fn test_enum_rule_passes_null() {
        let rule = EnumRule::new(["RED"]);
        assert!(check(&rule, &Value::Null));
    }

    #[test]
    fn test_value_set_include_only() {
        let rule = ValueSetRule::new().within([10, 20, 30]);
        assert!(check(&rule, &json!(20)));
        assert!(!check(&rule, &json!(15)));
    }

    #[test]
    fn test_value_set_exclude_only() {
        let rule = ValueSetRule::new().exclude([9]);
        assert!(check(&rule, &json!(10)));
        assert!(!check(&rule, &json!(9)));
    }

    #[test]
    fn test_value_set_both_checked() {
        let rule = ValueSetRule::new().within([10, 20]).exclude([20]);
        assert!(check(&rule, &json!(10)));
        assert!(!check(&rule, &json!(20)));
        assert!(!check(&rule, &json!(30)));
    }

    #[test]
    fn test_empty_sets_are_no_constraint() {
        let rule = ValueSetRule::new();
        assert!(check(&rule, &json!(12345)));
        assert!(check(&rule, &json!("anything")));
    }

    #[test]
    fn test_value_set_recoverable_through_trait_object() {
        let rule = ValueSetRule::new().within([10]);
        let erased: &dyn ValueRule = &rule;
        let recovered = erased.as_value_set().unwrap();
        assert_eq!(recovered.included(), ["10"]);

        let other: &dyn ValueRule = &EnumRule::new(["RED"]);
        assert!(other.as_value_set().is_none());
    }

    #[test]
    fn test_value_set_grows() {
        let rule = ValueSetRule::new().within([10]).within([20]);
        assert_eq!(rule.included(), ["10", "20"]);
    }

    #[test]
    fn test_closure_rule() {
        let rule = |_: NodeView<'_>, value: &Value| value.as_i64().unwrap_or(0) % 2 == 0;
        assert!(check(&rule, &json!(4)));
        assert!(!check(&rule, &json!(3)));
    }
}
