//! Parent wiring and path resolution for schema trees.
//!
//! Schemas are built bottom-up (or loaded from a persisted definition), so
//! parent links cannot exist until the whole tree does.
//! [`SchemaTree::resolve`] flattens an owned [`SchemaNode`] tree into an
//! arena of slots addressed by [`NodeId`], assigning each descendant's
//! parent exactly once as a non-owning index. True ownership stays strictly
//! parent→child; the back-links cannot form a reference cycle.
//!
//! A node's dotted path is a computed projection over the parent chain, not
//! a stored field: walking from the node to the root collects the named
//! segments and skips structurally-anonymous wrappers (array-element and
//! unnamed root nodes), so the same logical position always reports the
//! same path.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::ConstructionError;
use crate::node::{Bound, SchemaKind, SchemaNode};
use crate::rules::ValueRule;

/// Index of a node inside a [`SchemaTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

struct Slot {
    kind: SchemaKind,
    name: String,
    required: bool,
    description: Option<String>,
    example: Option<String>,
    min: Option<Bound>,
    max: Option<Bound>,
    rule: Option<Arc<dyn ValueRule>>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    // named-child lookup for objects, in declaration order
    by_name: IndexMap<String, NodeId>,
}

/// A resolved schema tree: parent-wired, path-addressable, shape-frozen.
///
/// The arena exposes no structural mutation, so children, names, kinds, and
/// parent links are fixed once `resolve` returns. Tunable fields (bounds,
/// description, example, rule) may still be updated through the `set_*`
/// methods; callers doing so concurrently with in-flight validation must
/// serialize writers against readers themselves.
///
/// # Example
///
/// ```rust
/// use jsonsift::{SchemaNode, SchemaTree};
///
/// let root = SchemaNode::object("goods", vec![
///     SchemaNode::array("skus", Some(SchemaNode::object("", vec![
///         SchemaNode::number("id"),
///     ]).unwrap())).unwrap(),
/// ]).unwrap();
///
/// let tree = SchemaTree::resolve(root).unwrap();
/// let skus = tree.child_named(tree.root(), "skus").unwrap();
/// let element = tree.children(skus)[0];
/// let id = tree.child_named(element, "id").unwrap();
///
/// // The anonymous element wrapper contributes no path segment.
/// assert_eq!(tree.path(id), "goods.skus.id");
/// ```
pub struct SchemaTree {
    slots: Vec<Slot>,
    root: NodeId,
}

impl SchemaTree {
    /// Consumes an owned node tree, wires every descendant's parent link,
    /// and runs the deferred construction checks (bound literals must be
    /// numeric, `min` must not exceed `max`).
    pub fn resolve(root: SchemaNode) -> Result<SchemaTree, ConstructionError> {
        let mut tree = SchemaTree {
            slots: Vec::new(),
            root: NodeId(0),
        };
        let root = tree.insert(root, None)?;
        tree.root = root;
        Ok(tree)
    }

    fn insert(
        &mut self,
        node: SchemaNode,
        parent: Option<NodeId>,
    ) -> Result<NodeId, ConstructionError> {
        check_bounds(&node.name, node.min.as_ref(), node.max.as_ref())?;

        let id = NodeId(self.slots.len());
        self.slots.push(Slot {
            kind: node.kind,
            name: node.name,
            required: node.required,
            description: node.description,
            example: node.example,
            min: node.min,
            max: node.max,
            rule: node.rule,
            parent,
            children: Vec::new(),
            by_name: IndexMap::new(),
        });

        for child in node.children {
            let child_name = child.name.clone();
            let child_id = self.insert(child, Some(id))?;
            self.slots[id.0].children.push(child_id);
            if !child_name.is_empty() {
                self.slots[id.0].by_name.insert(child_name, child_id);
            }
        }
        Ok(id)
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when the tree holds no nodes (never, after `resolve`).
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// True when `id` is the root node.
    pub fn is_root(&self, id: NodeId) -> bool {
        self.slots[id.0].parent.is_none()
    }

    /// The node's parent, or `None` for the root.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots[id.0].parent
    }

    /// The node's children in declaration order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.slots[id.0].children
    }

    /// Looks up an object's named child.
    pub fn child_named(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.slots[id.0].by_name.get(name).copied()
    }

    /// The node's kind.
    pub fn kind(&self, id: NodeId) -> SchemaKind {
        self.slots[id.0].kind
    }

    /// The node's name; empty for anonymous wrappers.
    pub fn name(&self, id: NodeId) -> &str {
        &self.slots[id.0].name
    }

    /// Whether a missing or null value at this node is a hard error.
    pub fn is_required(&self, id: NodeId) -> bool {
        self.slots[id.0].required
    }

    /// The node's description, if any.
    pub fn description(&self, id: NodeId) -> Option<&str> {
        self.slots[id.0].description.as_deref()
    }

    /// The node's string-encoded example value, if any.
    pub fn example(&self, id: NodeId) -> Option<&str> {
        self.slots[id.0].example.as_deref()
    }

    /// The node's lower bound, if any.
    pub fn min(&self, id: NodeId) -> Option<&Bound> {
        self.slots[id.0].min.as_ref()
    }

    /// The node's upper bound, if any.
    pub fn max(&self, id: NodeId) -> Option<&Bound> {
        self.slots[id.0].max.as_ref()
    }

    /// The node's custom rule, if any.
    pub fn rule(&self, id: NodeId) -> Option<&Arc<dyn ValueRule>> {
        self.slots[id.0].rule.as_ref()
    }

    /// The node's dotted path from the root.
    ///
    /// Named segments are joined with `.`; unnamed wrappers contribute
    /// nothing. The walk stops at the root explicitly, so an empty-named
    /// root yields paths that start at its first named descendants.
    pub fn path(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        let mut cursor = Some(id);
        while let Some(at) = cursor {
            let slot = &self.slots[at.0];
            if !slot.name.is_empty() {
                segments.push(slot.name.as_str());
            }
            cursor = slot.parent;
        }
        segments.reverse();
        segments.join(".")
    }

    /// A borrowed handle for rule callbacks and introspection.
    pub fn view(&self, id: NodeId) -> NodeView<'_> {
        NodeView { tree: self, id }
    }

    /// Updates the lower bound of a node; shape stays frozen. Re-checks the
    /// bound invariants against the current upper bound.
    pub fn set_min(&mut self, id: NodeId, min: Option<Bound>) -> Result<(), ConstructionError> {
        check_bounds(&self.slots[id.0].name, min.as_ref(), self.slots[id.0].max.as_ref())?;
        self.slots[id.0].min = min;
        Ok(())
    }

    /// Updates the upper bound of a node; shape stays frozen.
    pub fn set_max(&mut self, id: NodeId, max: Option<Bound>) -> Result<(), ConstructionError> {
        check_bounds(&self.slots[id.0].name, self.slots[id.0].min.as_ref(), max.as_ref())?;
        self.slots[id.0].max = max;
        Ok(())
    }

    /// Updates a node's description.
    pub fn set_description(&mut self, id: NodeId, description: Option<String>) {
        self.slots[id.0].description = description;
    }

    /// Updates a node's example value.
    pub fn set_example(&mut self, id: NodeId, example: Option<String>) {
        self.slots[id.0].example = example;
    }

    /// Attaches or detaches a node's custom rule.
    pub fn set_rule(&mut self, id: NodeId, rule: Option<Arc<dyn ValueRule>>) {
        self.slots[id.0].rule = rule;
    }
}

impl fmt::Debug for SchemaTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut nodes = f.debug_list();
        for index in 0..self.slots.len() {
            let id = NodeId(index);
            nodes.entry(&(self.path(id), self.kind(id)));
        }
        nodes.finish()
    }
}

fn check_bounds(
    name: &str,
    min: Option<&Bound>,
    max: Option<&Bound>,
) -> Result<(), ConstructionError> {
    let numeric = |bound: &Bound| -> Result<f64, ConstructionError> {
        bound.as_f64().ok_or_else(|| ConstructionError::MalformedBound {
            name: name.to_string(),
            bound: bound.raw().to_string(),
        })
    };
    let lo = min.map(&numeric).transpose()?;
    let hi = max.map(&numeric).transpose()?;
    if let (Some(lo), Some(hi)) = (lo, hi) {
        if lo > hi {
            return Err(ConstructionError::InvertedBounds {
                name: name.to_string(),
                min: min.map(Bound::raw).unwrap_or_default().to_string(),
                max: max.map(Bound::raw).unwrap_or_default().to_string(),
            });
        }
    }
    Ok(())
}

/// A borrowed handle to one resolved node, handed to [`ValueRule`] callbacks.
#[derive(Clone, Copy)]
pub struct NodeView<'a> {
    tree: &'a SchemaTree,
    id: NodeId,
}

impl<'a> NodeView<'a> {
    /// The node's name.
    pub fn name(&self) -> &'a str {
        self.tree.name(self.id)
    }

    /// The node's dotted path.
    pub fn path(&self) -> String {
        self.tree.path(self.id)
    }

    /// The node's kind.
    pub fn kind(&self) -> SchemaKind {
        self.tree.kind(self.id)
    }

    /// Whether the node is required.
    pub fn is_required(&self) -> bool {
        self.tree.is_required(self.id)
    }

    /// The node's description, if any.
    pub fn description(&self) -> Option<&'a str> {
        self.tree.description(self.id)
    }

    /// The node's lower bound, if any.
    pub fn min(&self) -> Option<&'a Bound> {
        self.tree.min(self.id)
    }

    /// The node's upper bound, if any.
    pub fn max(&self) -> Option<&'a Bound> {
        self.tree.max(self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::PrimitiveKind;

    fn goods_tree() -> SchemaTree {
        let root = SchemaNode::object(
            "goods",
            vec![
                SchemaNode::string("name"),
                SchemaNode::array(
                    "skus",
                    Some(
                        SchemaNode::object(
                            "",
                            vec![SchemaNode::number("id"), SchemaNode::string("color")],
                        )
                        .unwrap(),
                    ),
                )
                .unwrap(),
            ],
        )
        .unwrap();
        SchemaTree::resolve(root).unwrap()
    }

    #[test]
    fn test_parent_wiring() {
        let tree = goods_tree();
        let root = tree.root();
        assert!(tree.is_root(root));
        assert!(tree.parent(root).is_none());

        let skus = tree.child_named(root, "skus").unwrap();
        assert_eq!(tree.parent(skus), Some(root));

        let element = tree.children(skus)[0];
        assert_eq!(tree.parent(element), Some(skus));
        let id = tree.child_named(element, "id").unwrap();
        assert_eq!(tree.parent(id), Some(element));
    }

    #[test]
    fn test_path_skips_anonymous_wrappers() {
        let tree = goods_tree();
        let skus = tree.child_named(tree.root(), "skus").unwrap();
        let element = tree.children(skus)[0];
        let id = tree.child_named(element, "id").unwrap();

        assert_eq!(tree.path(tree.root()), "goods");
        assert_eq!(tree.path(skus), "goods.skus");
        assert_eq!(tree.path(element), "goods.skus");
        assert_eq!(tree.path(id), "goods.skus.id");
    }

    #[test]
    fn test_path_is_stable() {
        let tree = goods_tree();
        let name = tree.child_named(tree.root(), "name").unwrap();
        assert_eq!(tree.path(name), tree.path(name));
    }

    #[test]
    fn test_empty_named_root_seeds_nothing() {
        let root =
            SchemaNode::object("", vec![SchemaNode::string("name")]).unwrap();
        let tree = SchemaTree::resolve(root).unwrap();
        let name = tree.child_named(tree.root(), "name").unwrap();
        assert_eq!(tree.path(tree.root()), "");
        assert_eq!(tree.path(name), "name");
    }

    #[test]
    fn test_children_in_declaration_order() {
        let tree = goods_tree();
        let names: Vec<_> = tree
            .children(tree.root())
            .iter()
            .map(|&id| tree.name(id))
            .collect();
        assert_eq!(names, ["name", "skus"]);
    }

    #[test]
    fn test_resolve_rejects_inverted_bounds() {
        let root =
            SchemaNode::object("goods", vec![SchemaNode::number("price").min(10).max(5)])
                .unwrap();
        let err = SchemaTree::resolve(root).unwrap_err();
        assert!(matches!(err, ConstructionError::InvertedBounds { .. }));
    }

    #[test]
    fn test_resolve_accepts_decimal_bounds() {
        let root =
            SchemaNode::object("goods", vec![SchemaNode::number("price").min(7.18).max(20)])
                .unwrap();
        assert!(SchemaTree::resolve(root).is_ok());
    }

    #[test]
    fn test_resolve_rejects_malformed_bound() {
        let root =
            SchemaNode::object("goods", vec![SchemaNode::number("price").min("abc")]).unwrap();
        let err = SchemaTree::resolve(root).unwrap_err();
        assert!(matches!(err, ConstructionError::MalformedBound { .. }));
    }

    #[test]
    fn test_tuning_after_resolve() {
        let mut tree = goods_tree();
        let name = tree.child_named(tree.root(), "name").unwrap();
        tree.set_min(name, Some(Bound::from(1))).unwrap();
        tree.set_max(name, Some(Bound::from(32))).unwrap();
        assert_eq!(tree.min(name).unwrap().raw(), "1");

        let err = tree.set_max(name, Some(Bound::from(0))).unwrap_err();
        assert!(matches!(err, ConstructionError::InvertedBounds { .. }));
    }

    #[test]
    fn test_debug_lists_resolved_paths() {
        let tree = goods_tree();
        let text = format!("{:?}", tree);
        assert!(text.contains("goods.skus.id"));
        assert!(text.contains("goods.name"));
    }

    #[test]
    fn test_view_exposes_node_metadata() {
        let tree = goods_tree();
        let name = tree.child_named(tree.root(), "name").unwrap();
        let view = tree.view(name);
        assert_eq!(view.name(), "name");
        assert_eq!(view.path(), "goods.name");
        assert_eq!(view.kind(), SchemaKind::Primitive(PrimitiveKind::String));
        assert!(view.is_required());
    }
}
