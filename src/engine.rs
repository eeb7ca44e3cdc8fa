//! The validation and extraction engine.
//!
//! [`Validator`] walks a resolved schema tree together with an input value
//! (or a flat [`ParamSource`] of string parameters) and either fails fast on
//! the first violation or produces a filtered copy containing only
//! schema-declared data. Children are visited in declared order; the first
//! error aborts the call and is the only one surfaced.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde_json::{Map, Number, Value};

use crate::error::SchemaError;
use crate::node::{Bound, PrimitiveKind, SchemaKind};
use crate::policy::{DropUnknown, UnknownFieldPolicy};
use crate::rules::scalar_text;
use crate::tree::{NodeId, SchemaTree};

/// A flat key→value supplier, as produced by HTTP form parameters.
///
/// Missing keys and empty strings both count as absent.
pub trait ParamSource {
    /// Fetches the single string value for a top-level schema entry.
    fn get(&self, name: &str) -> Option<String>;
}

impl ParamSource for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).cloned()
    }
}

impl ParamSource for BTreeMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        BTreeMap::get(self, name).cloned()
    }
}

/// The recursive validate-and-extract engine.
///
/// A `Validator` is cheap to construct and holds only the unknown-field
/// policy; the schema tree is passed per call so one validator can serve
/// many schemas.
///
/// # Example
///
/// ```rust
/// use jsonsift::{SchemaNode, SchemaTree, Validator};
/// use serde_json::json;
///
/// let root = SchemaNode::object("goods", vec![
///     SchemaNode::string("name").min(1).max(32),
///     SchemaNode::number("price").min(0),
/// ]).unwrap();
/// let tree = SchemaTree::resolve(root).unwrap();
///
/// let v = Validator::new();
/// v.validate(&tree, &json!({"name": "IPhone7", "price": 99.98})).unwrap();
///
/// let out = v.extract(&tree, json!({"name": "IPhone7", "price": 99.98, "junk": 1})).unwrap();
/// assert_eq!(out, json!({"name": "IPhone7", "price": 99.98}));
/// ```
pub struct Validator {
    policy: Arc<dyn UnknownFieldPolicy>,
}

impl Validator {
    /// Creates a validator with the default drop-unknown-fields policy.
    pub fn new() -> Self {
        Validator {
            policy: Arc::new(DropUnknown),
        }
    }

    /// Replaces the unknown-field policy, builder style.
    pub fn with_unknown_policy(mut self, policy: impl UnknownFieldPolicy + 'static) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    /// Replaces the unknown-field policy in place.
    pub fn set_unknown_policy(&mut self, policy: impl UnknownFieldPolicy + 'static) {
        self.policy = Arc::new(policy);
    }

    /// Checks `value` against the schema, failing fast on the first
    /// violation. The input is not modified.
    pub fn validate(&self, tree: &SchemaTree, value: &Value) -> Result<(), SchemaError> {
        self.check_node(tree, tree.root(), value)
    }

    /// Checks `value` against the schema and returns a filtered copy
    /// containing exactly the schema-declared structure: undeclared object
    /// fields are removed per the unknown-field policy, everything else is
    /// preserved. Re-extracting the result is a no-op.
    pub fn extract(&self, tree: &SchemaTree, mut value: Value) -> Result<Value, SchemaError> {
        self.filter_node(tree, tree.root(), &mut value)?;
        Ok(value)
    }

    /// Flat-key extraction: for each top-level schema entry, fetches a
    /// single string by name from `params`. Primitive entries validate and
    /// coerce that string; Object/Array entries treat it as embedded JSON
    /// text and recurse with the tree rules. A string that fails to parse
    /// as JSON is reported as a field-level error at that entry's path.
    pub fn extract_params(
        &self,
        tree: &SchemaTree,
        params: &impl ParamSource,
    ) -> Result<Value, SchemaError> {
        let root = tree.root();
        if !tree.kind(root).is_object() {
            return Err(SchemaError::TypeMismatch {
                path: tree.path(root),
                expected: "object",
                got: tree.kind(root).to_string(),
            });
        }

        let mut out = Map::new();
        for &child in tree.children(root) {
            let name = tree.name(child);
            let text = params.get(name).filter(|t| !t.is_empty());

            let text = match text {
                Some(text) => text,
                None => {
                    if tree.is_required(child) {
                        return Err(SchemaError::MissingRequiredField {
                            path: tree.path(child),
                        });
                    }
                    self.run_rule(tree, child, &Value::Null)?;
                    continue;
                }
            };

            match tree.kind(child) {
                SchemaKind::Primitive(kind) => {
                    let raw = Value::String(text.clone());
                    self.check_primitive(tree, child, kind, &raw)?;
                    out.insert(name.to_string(), coerce_param(kind, &text));
                }
                SchemaKind::Any => {
                    let raw = Value::String(text.clone());
                    self.check_any(tree, child, &raw)?;
                    out.insert(name.to_string(), raw);
                }
                SchemaKind::Object | SchemaKind::Array => {
                    let mut parsed: Value = serde_json::from_str(&text).map_err(|_| {
                        SchemaError::FormatViolation {
                            path: tree.path(child),
                            message: "is not valid JSON".to_string(),
                        }
                    })?;
                    self.filter_node(tree, child, &mut parsed)?;
                    out.insert(name.to_string(), parsed);
                }
            }
        }
        Ok(Value::Object(out))
    }

    // ---- validation walk (read-only) ----

    fn check_node(&self, tree: &SchemaTree, id: NodeId, value: &Value) -> Result<(), SchemaError> {
        match tree.kind(id) {
            SchemaKind::Primitive(kind) => self.check_primitive(tree, id, kind, value),
            SchemaKind::Any => self.check_any(tree, id, value),
            SchemaKind::Array => self.check_array(tree, id, value),
            SchemaKind::Object => self.check_object(tree, id, value),
        }
    }

    fn check_object(
        &self,
        tree: &SchemaTree,
        id: NodeId,
        value: &Value,
    ) -> Result<(), SchemaError> {
        let obj = match value {
            Value::Null => return self.absent(tree, id),
            Value::Object(obj) => obj,
            other => {
                return Err(SchemaError::TypeMismatch {
                    path: tree.path(id),
                    expected: "object",
                    got: json_kind(other).to_string(),
                })
            }
        };
        self.run_rule(tree, id, value)?;

        // No declared children: opaque object, everything passes through.
        for &child in tree.children(id) {
            match obj.get(tree.name(child)) {
                None | Some(Value::Null) => self.absent(tree, child)?,
                Some(field) => self.check_node(tree, child, field)?,
            }
        }
        Ok(())
    }

    fn check_array(&self, tree: &SchemaTree, id: NodeId, value: &Value) -> Result<(), SchemaError> {
        let items = match value {
            Value::Null => return self.absent(tree, id),
            Value::Array(items) => items,
            other => {
                return Err(SchemaError::TypeMismatch {
                    path: tree.path(id),
                    expected: "array",
                    got: json_kind(other).to_string(),
                })
            }
        };

        let element = match tree.children(id).first() {
            // Opaque array: the rule sees the whole array, contents pass.
            None => return self.run_rule(tree, id, value),
            Some(&element) => element,
        };

        if tree.is_required(id) && items.is_empty() {
            return Err(SchemaError::MissingRequiredField {
                path: tree.path(id),
            });
        }
        self.run_rule(tree, id, value)?;

        for item in items {
            match tree.kind(element) {
                SchemaKind::Object => self.check_object(tree, element, item)?,
                SchemaKind::Primitive(kind) => self.check_primitive(tree, element, kind, item)?,
                other => {
                    return Err(SchemaError::TypeMismatch {
                        path: tree.path(id),
                        expected: "object or primitive element schema",
                        got: other.to_string(),
                    })
                }
            }
        }
        Ok(())
    }

    fn check_primitive(
        &self,
        tree: &SchemaTree,
        id: NodeId,
        kind: PrimitiveKind,
        value: &Value,
    ) -> Result<(), SchemaError> {
        if value.is_null() {
            return self.absent(tree, id);
        }
        let text = scalar_text(value).ok_or_else(|| SchemaError::TypeMismatch {
            path: tree.path(id),
            expected: kind_name(kind),
            got: json_kind(value).to_string(),
        })?;
        match kind {
            PrimitiveKind::String => check_length(tree, id, &text)?,
            PrimitiveKind::Number => check_number(tree, id, &text)?,
            PrimitiveKind::Boolean => {
                if !matches!(text.as_str(), "true" | "false" | "1" | "0") {
                    return Err(SchemaError::FormatViolation {
                        path: tree.path(id),
                        message: format!("is not a boolean literal: `{}`", text),
                    });
                }
            }
        }
        self.run_rule(tree, id, value)
    }

    fn check_any(&self, tree: &SchemaTree, id: NodeId, value: &Value) -> Result<(), SchemaError> {
        if value.is_null() {
            return self.absent(tree, id);
        }
        // Any accepts every kind, but string values still honor length bounds.
        if value.is_string() {
            if let Some(text) = value.as_str() {
                check_length(tree, id, text)?;
            }
        }
        self.run_rule(tree, id, value)
    }

    // ---- extraction walk (filters in place) ----

    fn filter_node(
        &self,
        tree: &SchemaTree,
        id: NodeId,
        value: &mut Value,
    ) -> Result<(), SchemaError> {
        match tree.kind(id) {
            SchemaKind::Primitive(kind) => self.check_primitive(tree, id, kind, value),
            SchemaKind::Any => self.check_any(tree, id, value),
            SchemaKind::Array => self.filter_array(tree, id, value),
            SchemaKind::Object => self.filter_object(tree, id, value),
        }
    }

    fn filter_object(
        &self,
        tree: &SchemaTree,
        id: NodeId,
        value: &mut Value,
    ) -> Result<(), SchemaError> {
        match &*value {
            Value::Null => return self.absent(tree, id),
            Value::Object(_) => {}
            other => {
                return Err(SchemaError::TypeMismatch {
                    path: tree.path(id),
                    expected: "object",
                    got: json_kind(other).to_string(),
                })
            }
        }
        self.run_rule(tree, id, value)?;

        if tree.children(id).is_empty() {
            // Opaque object: all existing fields are preserved.
            return Ok(());
        }
        let Value::Object(obj) = value else {
            return Ok(());
        };

        // Unknown-field pass runs once, before descending into children.
        let dropped: Vec<String> = obj
            .iter()
            .filter(|(name, _)| {
                tree.child_named(id, name).is_none() && !self.policy.keep(name, obj)
            })
            .map(|(name, _)| name.clone())
            .collect();
        for name in &dropped {
            obj.shift_remove(name);
        }

        for &child in tree.children(id) {
            match obj.get_mut(tree.name(child)) {
                None | Some(Value::Null) => self.absent(tree, child)?,
                Some(field) => self.filter_node(tree, child, field)?,
            }
        }
        Ok(())
    }

    fn filter_array(
        &self,
        tree: &SchemaTree,
        id: NodeId,
        value: &mut Value,
    ) -> Result<(), SchemaError> {
        match &*value {
            Value::Null => return self.absent(tree, id),
            Value::Array(_) => {}
            other => {
                return Err(SchemaError::TypeMismatch {
                    path: tree.path(id),
                    expected: "array",
                    got: json_kind(other).to_string(),
                })
            }
        }

        let element = match tree.children(id).first() {
            None => return self.run_rule(tree, id, value),
            Some(&element) => element,
        };

        if tree.is_required(id) && value.as_array().is_some_and(|items| items.is_empty()) {
            return Err(SchemaError::MissingRequiredField {
                path: tree.path(id),
            });
        }
        self.run_rule(tree, id, value)?;

        let Value::Array(items) = value else {
            return Ok(());
        };
        for item in items {
            match tree.kind(element) {
                SchemaKind::Object => self.filter_object(tree, element, item)?,
                SchemaKind::Primitive(kind) => self.check_primitive(tree, element, kind, item)?,
                other => {
                    return Err(SchemaError::TypeMismatch {
                        path: tree.path(id),
                        expected: "object or primitive element schema",
                        got: other.to_string(),
                    })
                }
            }
        }
        Ok(())
    }

    // ---- shared pieces ----

    /// Missing or null value at a node: hard error when required, otherwise
    /// the custom rule still runs once with null.
    fn absent(&self, tree: &SchemaTree, id: NodeId) -> Result<(), SchemaError> {
        if tree.is_required(id) {
            return Err(SchemaError::MissingRequiredField {
                path: tree.path(id),
            });
        }
        self.run_rule(tree, id, &Value::Null)
    }

    fn run_rule(&self, tree: &SchemaTree, id: NodeId, value: &Value) -> Result<(), SchemaError> {
        if let Some(rule) = tree.rule(id) {
            if !rule.check(tree.view(id), value) {
                return Err(SchemaError::CustomRuleViolation {
                    path: tree.path(id),
                });
            }
        }
        Ok(())
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

/// Length check for String and Any nodes, counted in characters.
fn check_length(tree: &SchemaTree, id: NodeId, text: &str) -> Result<(), SchemaError> {
    let count = text.chars().count();
    let min = tree.min(id).and_then(Bound::as_len);
    let max = tree.max(id).and_then(Bound::as_len);
    let ok = min.map_or(true, |min| count >= min) && max.map_or(true, |max| count <= max);
    if ok {
        return Ok(());
    }
    // at least one bound is present here, or ok would have held
    let message = match (min, max) {
        (Some(min), Some(max)) => format!("must be between {} and {} characters", min, max),
        (Some(min), None) => format!("must be at least {} characters", min),
        (None, max) => format!("must be at most {} characters", max.unwrap_or(0)),
    };
    Err(SchemaError::RangeViolation {
        path: tree.path(id),
        message,
    })
}

/// Decimal-aware numeric check.
///
/// The literal (a JSON number's text or a string's content) is compared
/// against each bound in the bound's own domain: float when either the
/// bound's or the value's text contains a decimal point, integer otherwise.
/// A malformed literal is a generic format error with no bounds declared,
/// or carries the applicable bounds message when bounds are declared.
fn check_number(tree: &SchemaTree, id: NodeId, text: &str) -> Result<(), SchemaError> {
    let min = tree.min(id);
    let max = tree.max(id);
    let path = number_path(tree, id);

    if min.is_none() && max.is_none() {
        if text.parse::<i64>().is_err() && text.parse::<f64>().is_err() {
            return Err(SchemaError::FormatViolation {
                path,
                message: format!("is not a number: `{}`", text),
            });
        }
        return Ok(());
    }

    let range_error = || SchemaError::RangeViolation {
        path: path.clone(),
        message: numeric_bounds_message(min, max),
    };

    if let Some(min) = min {
        if !bound_holds(text, min, Side::Lower) {
            return Err(range_error());
        }
    }
    if let Some(max) = max {
        if !bound_holds(text, max, Side::Upper) {
            return Err(range_error());
        }
    }
    Ok(())
}

enum Side {
    Lower,
    Upper,
}

/// Checks the literal against one bound in the applicable numeric domain.
/// Returns false when the literal does not parse in that domain.
fn bound_holds(text: &str, bound: &Bound, side: Side) -> bool {
    if bound.is_decimal() || text.contains('.') {
        match (text.parse::<f64>(), bound.as_f64()) {
            (Ok(v), Some(b)) => match side {
                Side::Lower => v >= b,
                Side::Upper => v <= b,
            },
            _ => false,
        }
    } else {
        match (text.parse::<i64>(), bound.as_i64()) {
            (Ok(v), Some(b)) => match side {
                Side::Lower => v >= b,
                Side::Upper => v <= b,
            },
            _ => false,
        }
    }
}

fn numeric_bounds_message(min: Option<&Bound>, max: Option<&Bound>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("must be between {} and {}", min, max),
        (Some(min), None) => format!("must be at least {}", min),
        (None, Some(max)) => format!("must be at most {}", max),
        (None, None) => String::new(),
    }
}

/// Error path for numeric failures: an array-element primitive reports the
/// array's path with `[]` appended, distinguishing the element type from a
/// named field under the array.
fn number_path(tree: &SchemaTree, id: NodeId) -> String {
    let path = tree.path(id);
    let is_element = tree.name(id).is_empty()
        && tree.parent(id).is_some_and(|p| tree.kind(p).is_array());
    if is_element {
        format!("{}[]", path)
    } else {
        path
    }
}

fn kind_name(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::String => "string",
        PrimitiveKind::Number => "number",
        PrimitiveKind::Boolean => "boolean",
    }
}

/// The JSON kind name of a value, for type-mismatch messages.
fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Coerces a validated flat parameter into its typed JSON value.
fn coerce_param(kind: PrimitiveKind, text: &str) -> Value {
    match kind {
        PrimitiveKind::String => Value::String(text.to_string()),
        PrimitiveKind::Number => {
            if !text.contains('.') {
                if let Ok(n) = text.parse::<i64>() {
                    return Value::Number(n.into());
                }
            }
            match text.parse::<f64>().ok().and_then(Number::from_f64) {
                Some(n) => Value::Number(n),
                None => Value::String(text.to_string()),
            }
        }
        PrimitiveKind::Boolean => Value::Bool(matches!(text, "true" | "1")),
    }
}
