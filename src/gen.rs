//! Source and example generation from a resolved schema tree.
//!
//! [`builder_source`] renders source text that reconstructs an equivalent
//! tree through the crate's own factory calls; [`example_json`] renders a
//! document populated from each primitive's example value. Generation
//! options travel as an explicit [`GenOptions`] parameter: pure
//! configuration, threaded through every call rather than held in ambient
//! state.

use serde_json::{Map, Number, Value};

use crate::node::{PrimitiveKind, SchemaKind};
use crate::tree::{NodeId, SchemaTree};

/// Toggles for [`builder_source`] emission.
#[derive(Debug, Clone, Copy)]
pub struct GenOptions {
    /// Emit `.describe(..)` calls for nodes carrying a description.
    pub descriptions: bool,
    /// Emit `.example(..)` calls for nodes carrying an example value.
    pub examples: bool,
}

impl Default for GenOptions {
    fn default() -> Self {
        GenOptions {
            descriptions: true,
            examples: true,
        }
    }
}

/// Renders source text that rebuilds an equivalent tree via the factory
/// constructors. The snippet assumes a `Result`-returning context: the
/// fallible `object`/`array` factories are emitted with `?`.
///
/// # Example
///
/// ```rust
/// use jsonsift::{builder_source, GenOptions, SchemaNode, SchemaTree};
///
/// let tree = SchemaTree::resolve(
///     SchemaNode::object("goods", vec![SchemaNode::string("name").min(1)]).unwrap(),
/// )
/// .unwrap();
///
/// let source = builder_source(&tree, &GenOptions::default());
/// assert!(source.contains(r#"SchemaNode::object("goods", vec!["#));
/// assert!(source.contains(r#"SchemaNode::string("name").min(1)"#));
/// ```
pub fn builder_source(tree: &SchemaTree, options: &GenOptions) -> String {
    let mut out = String::new();
    emit_node(tree, tree.root(), options, 0, &mut out);
    out
}

fn emit_node(tree: &SchemaTree, id: NodeId, options: &GenOptions, depth: usize, out: &mut String) {
    let pad = "    ".repeat(depth);
    let name = format!("{:?}", tree.name(id));

    match tree.kind(id) {
        SchemaKind::Object => {
            out.push_str(&format!("{}SchemaNode::object({}, vec![\n", pad, name));
            for &child in tree.children(id) {
                emit_node(tree, child, options, depth + 1, out);
                out.push_str(",\n");
            }
            out.push_str(&format!("{}])?", pad));
        }
        SchemaKind::Array => match tree.children(id).first() {
            Some(&element) => {
                out.push_str(&format!("{}SchemaNode::array({}, Some(\n", pad, name));
                emit_node(tree, element, options, depth + 1, out);
                out.push_str(&format!(",\n{}))?", pad));
            }
            None => {
                out.push_str(&format!("{}SchemaNode::array({}, None)?", pad, name));
            }
        },
        SchemaKind::Primitive(PrimitiveKind::String) => {
            out.push_str(&format!("{}SchemaNode::string({})", pad, name));
        }
        SchemaKind::Primitive(PrimitiveKind::Number) => {
            out.push_str(&format!("{}SchemaNode::number({})", pad, name));
        }
        SchemaKind::Primitive(PrimitiveKind::Boolean) => {
            out.push_str(&format!("{}SchemaNode::boolean({})", pad, name));
        }
        SchemaKind::Any => {
            out.push_str(&format!("{}SchemaNode::any({})", pad, name));
        }
    }

    if !tree.is_required(id) {
        out.push_str(".optional()");
    }
    if let Some(min) = tree.min(id) {
        out.push_str(&format!(".min({})", bound_literal(min.raw())));
    }
    if let Some(max) = tree.max(id) {
        out.push_str(&format!(".max({})", bound_literal(max.raw())));
    }
    if options.descriptions {
        if let Some(description) = tree.description(id) {
            out.push_str(&format!(".describe({:?})", description));
        }
    }
    if options.examples {
        if let Some(example) = tree.example(id) {
            out.push_str(&format!(".example({:?})", example));
        }
    }
}

// Plain integers are emitted bare; everything else goes through the string
// form so the literal text (and its decimal point) is preserved exactly.
fn bound_literal(raw: &str) -> String {
    if raw.parse::<i64>().is_ok() {
        raw.to_string()
    } else {
        format!("{:?}", raw)
    }
}

/// Renders a document populated from each primitive's example value, null
/// when absent. Arrays emit a single element from the element schema;
/// opaque arrays emit empty.
///
/// # Example
///
/// ```rust
/// use jsonsift::{example_json, infer, Requiredness, SchemaTree};
/// use serde_json::json;
///
/// let sample = json!({"name": "IPhone7", "price": 99.98, "skus": [{"id": 100}]});
/// let tree = SchemaTree::resolve(infer(&sample, &Requiredness::Required).unwrap()).unwrap();
/// assert_eq!(example_json(&tree), sample);
/// ```
pub fn example_json(tree: &SchemaTree) -> Value {
    example_of(tree, tree.root())
}

fn example_of(tree: &SchemaTree, id: NodeId) -> Value {
    match tree.kind(id) {
        SchemaKind::Object => {
            let mut doc = Map::new();
            for &child in tree.children(id) {
                doc.insert(tree.name(child).to_string(), example_of(tree, child));
            }
            Value::Object(doc)
        }
        SchemaKind::Array => match tree.children(id).first() {
            Some(&element) => Value::Array(vec![example_of(tree, element)]),
            None => Value::Array(Vec::new()),
        },
        SchemaKind::Primitive(kind) => match tree.example(id) {
            None => Value::Null,
            Some(text) => primitive_example(kind, text),
        },
        SchemaKind::Any => Value::Null,
    }
}

fn primitive_example(kind: PrimitiveKind, text: &str) -> Value {
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
