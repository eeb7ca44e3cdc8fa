//! Persisted schema definitions.
//!
//! A schema tree serializes to a JSON document whose shape mirrors the node
//! fields (`name`, `required`, `dataType`, `description`, `min`, `max`,
//! `exampleValue`, `children`). Loading goes back through the factory
//! constructors, so every construction invariant is re-checked, and through
//! [`SchemaTree::resolve`], so parent links are re-wired before use.
//! Custom rules are runtime attachments and are not serialized.
//!
//! `min`/`max` are written as strings of the bound's literal text so the
//! decimal-point distinction (`"20"` vs `"20.0"`) survives the round trip;
//! plain numbers are accepted on read for hand-written definitions.

use serde_json::{Map, Value};

use crate::error::ConstructionError;
use crate::node::{Bound, SchemaNode};
use crate::tree::{NodeId, SchemaTree};

/// Serializes a resolved tree into its persisted definition document.
pub fn schema_to_json(tree: &SchemaTree) -> Value {
    node_to_json(tree, tree.root())
}

fn node_to_json(tree: &SchemaTree, id: NodeId) -> Value {
    let mut doc = Map::new();
    doc.insert("name".to_string(), Value::String(tree.name(id).to_string()));
    doc.insert("required".to_string(), Value::Bool(tree.is_required(id)));
    doc.insert(
        "dataType".to_string(),
        Value::String(tree.kind(id).data_type().to_string()),
    );
    if let Some(description) = tree.description(id) {
        doc.insert(
            "description".to_string(),
            Value::String(description.to_string()),
        );
    }
    if let Some(min) = tree.min(id) {
        doc.insert("min".to_string(), Value::String(min.raw().to_string()));
    }
    if let Some(max) = tree.max(id) {
        doc.insert("max".to_string(), Value::String(max.raw().to_string()));
    }
    if let Some(example) = tree.example(id) {
        doc.insert(
            "exampleValue".to_string(),
            Value::String(example.to_string()),
        );
    }
    if !tree.children(id).is_empty() {
        let children: Vec<Value> = tree
            .children(id)
            .iter()
            .map(|&child| node_to_json(tree, child))
            .collect();
        doc.insert("children".to_string(), Value::Array(children));
    }
    Value::Object(doc)
}

/// Loads a persisted definition, re-normalizing every generic node into its
/// concrete variant and re-running the parent/path resolver.
pub fn schema_from_json(doc: &Value) -> Result<SchemaTree, ConstructionError> {
    SchemaTree::resolve(node_from_json(doc)?)
}

fn node_from_json(doc: &Value) -> Result<SchemaNode, ConstructionError> {
    let doc = doc.as_object().ok_or_else(|| {
        ConstructionError::MalformedDefinition("node is not an object".to_string())
    })?;

    let name = match doc.get("name") {
        None => "",
        Some(Value::String(name)) => name.as_str(),
        Some(_) => {
            return Err(ConstructionError::MalformedDefinition(
                "`name` is not a string".to_string(),
            ))
        }
    };
    let data_type = doc
        .get("dataType")
        .and_then(Value::as_str)
        .ok_or_else(|| ConstructionError::MalformedDefinition("missing `dataType`".to_string()))?;

    let mut node = match data_type {
        "string" => SchemaNode::string(name),
        "number" => SchemaNode::number(name),
        "boolean" => SchemaNode::boolean(name),
        "any" => SchemaNode::any(name),
        "object" => {
            let children = children_from_json(doc)?;
            SchemaNode::object(name, children)?
        }
        "array" => {
            let mut children = children_from_json(doc)?;
            if children.len() > 1 {
                return Err(ConstructionError::MalformedDefinition(format!(
                    "array `{}` declares {} element schemas",
                    name,
                    children.len()
                )));
            }
            SchemaNode::array(name, children.pop())?
        }
        other => return Err(ConstructionError::UnknownDataType(other.to_string())),
    };

    if let Some(required) = doc.get("required").and_then(Value::as_bool) {
        node = if required {
            node.required()
        } else {
            node.optional()
        };
    }
    if let Some(description) = doc.get("description").and_then(Value::as_str) {
        node = node.describe(description);
    }
    if let Some(example) = doc.get("exampleValue").and_then(Value::as_str) {
        node = node.example(example);
    }
    if let Some(min) = bound_from_json(doc.get("min"))? {
        node = node.min(min);
    }
    if let Some(max) = bound_from_json(doc.get("max"))? {
        node = node.max(max);
    }
    Ok(node)
}

fn children_from_json(doc: &Map<String, Value>) -> Result<Vec<SchemaNode>, ConstructionError> {
    match doc.get("children") {
        None => Ok(Vec::new()),
        Some(Value::Array(children)) => children.iter().map(node_from_json).collect(),
        Some(_) => Err(ConstructionError::MalformedDefinition(
            "`children` is not an array".to_string(),
        )),
    }
}

fn bound_from_json(value: Option<&Value>) -> Result<Option<Bound>, ConstructionError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) => Ok(Some(Bound::from(raw.clone()))),
        Some(Value::Number(n)) => Ok(Some(Bound::from(n.to_string()))),
        Some(other) => Err(ConstructionError::MalformedDefinition(format!(
            "bound `{}` is neither string nor number",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::SchemaKind;
    use serde_json::json;

    fn goods_tree() -> SchemaTree {
        let root = SchemaNode::object(
            "goods",
            vec![
                SchemaNode::string("name")
                    .min(1)
                    .max(32)
                    .describe("display name")
                    .example("IPhone7"),
                SchemaNode::number("price").min("0").max("20.0").optional(),
                SchemaNode::array(
                    "skus",
                    Some(SchemaNode::object("", vec![SchemaNode::number("id")]).unwrap()),
                )
                .unwrap(),
            ],
        )
        .unwrap();
        SchemaTree::resolve(root).unwrap()
    }

    #[test]
    fn test_serialized_shape() {
        let doc = schema_to_json(&goods_tree());
        assert_eq!(doc["name"], json!("goods"));
        assert_eq!(doc["dataType"], json!("object"));
        assert_eq!(doc["children"][0]["name"], json!("name"));
        assert_eq!(doc["children"][0]["min"], json!("1"));
        assert_eq!(doc["children"][0]["exampleValue"], json!("IPhone7"));
        assert_eq!(doc["children"][1]["required"], json!(false));
        assert_eq!(doc["children"][1]["max"], json!("20.0"));
        assert_eq!(doc["children"][2]["children"][0]["dataType"], json!("object"));
    }

    #[test]
    fn test_round_trip_preserves_everything() {
        let tree = goods_tree();
        let doc = schema_to_json(&tree);
        let loaded = schema_from_json(&doc).unwrap();
        assert_eq!(schema_to_json(&loaded), doc);

        // decimal-point form survives
        let price = loaded.child_named(loaded.root(), "price").unwrap();
        assert!(loaded.max(price).unwrap().is_decimal());
        assert!(!loaded.min(price).unwrap().is_decimal());
    }

    #[test]
    fn test_load_accepts_numeric_bounds() {
        let doc = json!({
            "name": "n", "dataType": "number", "min": 1, "max": 10
        });
        let tree = schema_from_json(&doc).unwrap();
        assert_eq!(tree.min(tree.root()).unwrap().raw(), "1");
    }

    #[test]
    fn test_load_rejects_unknown_data_type() {
        let doc = json!({"name": "n", "dataType": "decimal"});
        let err = schema_from_json(&doc).unwrap_err();
        assert!(matches!(err, ConstructionError::UnknownDataType(t) if t == "decimal"));
    }

    #[test]
    fn test_load_reruns_construction_checks() {
        // named non-object array element is rejected on load
        let doc = json!({
            "name": "ids", "dataType": "array",
            "children": [{"name": "id", "dataType": "number"}]
        });
        let err = schema_from_json(&doc).unwrap_err();
        assert!(matches!(err, ConstructionError::NamedArrayElement { .. }));

        // inverted bounds are rejected on load
        let doc = json!({"name": "n", "dataType": "number", "min": "10", "max": "5"});
        let err = schema_from_json(&doc).unwrap_err();
        assert!(matches!(err, ConstructionError::InvertedBounds { .. }));
    }

    #[test]
    fn test_loaded_tree_is_rewired() {
        let doc = schema_to_json(&goods_tree());
        let tree = schema_from_json(&doc).unwrap();
        let skus = tree.child_named(tree.root(), "skus").unwrap();
        let element = tree.children(skus)[0];
        let id = tree.child_named(element, "id").unwrap();
        assert_eq!(tree.path(id), "goods.skus.id");
        assert_eq!(tree.kind(tree.root()), SchemaKind::Object);
    }
}
