//! Query tree nodes: conditions and groups.
//!
//! Nodes are immutable once built. Children are held in `Arc` so that an
//! edit can share every untouched subtree with the previous tree.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::catalog::{Combinator, FieldCatalog, Operator};

/// Opaque node identifier, unique within a tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading characters, enough to tell nodes apart on screen.
    pub fn short(&self) -> &str {
        let end = self.0.char_indices().nth(8).map_or(self.0.len(), |(i, _)| i);
        &self.0[..end]
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// Leaf node: one field/operator/value test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Condition {
    pub id: NodeId,
    /// Key into the field catalog
    pub field: String,
    pub operator: Operator,
    /// Free text, not checked against the field's kind
    pub value: String,
}

impl Condition {
    /// New condition with a fresh id.
    pub fn new(field: &str, operator: Operator, value: &str) -> Self {
        Self {
            id: NodeId::generate(),
            field: field.to_string(),
            operator,
            value: value.to_string(),
        }
    }

    /// Shallow merge: every attribute set in `patch` replaces ours, the id
    /// is kept.
    pub fn patched(&self, patch: &ConditionPatch) -> Self {
        Self {
            id: self.id.clone(),
            field: patch.field.clone().unwrap_or_else(|| self.field.clone()),
            operator: patch.operator.unwrap_or(self.operator),
            value: patch.value.clone().unwrap_or_else(|| self.value.clone()),
        }
    }
}

/// Partial update for a condition; `None` leaves the attribute as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionPatch {
    pub field: Option<String>,
    pub operator: Option<Operator>,
    pub value: Option<String>,
}

impl ConditionPatch {
    pub fn field(key: &str) -> Self {
        Self {
            field: Some(key.to_string()),
            ..Self::default()
        }
    }

    pub fn operator(operator: Operator) -> Self {
        Self {
            operator: Some(operator),
            ..Self::default()
        }
    }

    pub fn value(value: &str) -> Self {
        Self {
            value: Some(value.to_string()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.field.is_none() && self.operator.is_none() && self.value.is_none()
    }
}

/// Interior node: children combined with one combinator.
#[derive(Debug, Clone, Serialize)]
pub struct Group {
    pub id: NodeId,
    pub combinator: Combinator,
    /// Order is kept across edits; may be empty
    pub children: Vec<Node>,
}

/// A child of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Condition(Arc<Condition>),
    Group(Arc<Group>),
}

impl Node {
    pub fn id(&self) -> &NodeId {
        match self {
            Node::Condition(c) => &c.id,
            Node::Group(g) => &g.id,
        }
    }

    pub fn as_condition(&self) -> Option<&Arc<Condition>> {
        match self {
            Node::Condition(c) => Some(c),
            Node::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&Arc<Group>> {
        match self {
            Node::Group(g) => Some(g),
            Node::Condition(_) => None,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Node::Group(_))
    }

    /// True when both point at the same allocation.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Condition(a), Node::Condition(b)) => Arc::ptr_eq(a, b),
            (Node::Group(a), Node::Group(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<Condition> for Node {
    fn from(condition: Condition) -> Self {
        Node::Condition(Arc::new(condition))
    }
}

impl From<Group> for Node {
    fn from(group: Group) -> Self {
        Node::Group(Arc::new(group))
    }
}

/// Default condition: first catalog field, first operator, empty value.
pub fn make_condition(catalog: &FieldCatalog) -> Condition {
    Condition::new(&catalog.first().key, Operator::default(), "")
}

/// Default group: `AND` with one default condition.
pub fn make_group(catalog: &FieldCatalog) -> Group {
    Group::new(Combinator::And, vec![make_condition(catalog).into()])
}

impl Group {
    /// New group with a fresh id.
    pub fn new(combinator: Combinator, children: Vec<Node>) -> Self {
        Self {
            id: NodeId::generate(),
            combinator,
            children,
        }
    }

    /// Same id and combinator, different children.
    pub fn with_children(&self, children: Vec<Node>) -> Self {
        Self {
            id: self.id.clone(),
            combinator: self.combinator,
            children,
        }
    }

    /// Same id and children (shared), different combinator.
    pub fn with_combinator(&self, combinator: Combinator) -> Self {
        Self {
            id: self.id.clone(),
            combinator,
            children: self.children.clone(),
        }
    }

    /// Preorder traversal starting with this group, children left to right.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: vec![Visit {
                depth: 0,
                parent: None,
                node: NodeRef::Group(self),
            }],
        }
    }

    /// Ids of this group and all descendants, in preorder.
    pub fn ids(&self) -> Vec<&NodeId> {
        self.walk().map(|v| v.node.id()).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.walk().any(|v| v.node.id() == id)
    }

    pub fn find_group(&self, id: &str) -> Option<&Group> {
        self.walk().find_map(|v| match v.node {
            NodeRef::Group(g) if g.id == *id => Some(g),
            _ => None,
        })
    }

    pub fn find_condition(&self, id: &str) -> Option<&Condition> {
        self.walk().find_map(|v| match v.node {
            NodeRef::Condition(c) if c.id == *id => Some(c),
            _ => None,
        })
    }

    /// Group that directly holds the node with `id`; `None` for the root
    /// itself or an unknown id.
    pub fn parent_of(&self, id: &str) -> Option<&Group> {
        self.walk()
            .find(|v| v.node.id() == id)
            .and_then(|v| v.parent)
    }

    /// Number of group levels; a root without nested groups has depth 1.
    pub fn depth(&self) -> usize {
        self.walk()
            .filter(|v| matches!(v.node, NodeRef::Group(_)))
            .map(|v| v.depth + 1)
            .max()
            .unwrap_or(1)
    }

    pub fn condition_count(&self) -> usize {
        self.walk()
            .filter(|v| matches!(v.node, NodeRef::Condition(_)))
            .count()
    }
}

// Deep equality, pairwise over an explicit stack. Shared subtrees are equal
// without being visited.
impl PartialEq for Group {
    fn eq(&self, other: &Self) -> bool {
        let mut pending: Vec<(&Group, &Group)> = vec![(self, other)];
        while let Some((left, right)) = pending.pop() {
            if std::ptr::eq(left, right) {
                continue;
            }
            if left.id != right.id
                || left.combinator != right.combinator
                || left.children.len() != right.children.len()
            {
                return false;
            }
            for pair in left.children.iter().zip(&right.children) {
                match pair {
                    (Node::Condition(a), Node::Condition(b)) => {
                        if !Arc::ptr_eq(a, b) && a != b {
                            return false;
                        }
                    }
                    (Node::Group(a), Node::Group(b)) => pending.push((a.as_ref(), b.as_ref())),
                    _ => return false,
                }
            }
        }
        true
    }
}

impl Eq for Group {}

// Dropping a deeply nested tree recursively would exhaust the stack, so
// uniquely owned descendants are flattened onto a heap-allocated worklist.
impl Drop for Group {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(node) = pending.pop() {
            if let Node::Group(group) = node {
                if let Some(mut inner) = Arc::into_inner(group) {
                    pending.append(&mut inner.children);
                }
            }
        }
    }
}

/// Borrowed view of either node kind; the root is reachable this way too.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Condition(&'a Condition),
    Group(&'a Group),
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> &'a NodeId {
        match *self {
            NodeRef::Condition(c) => &c.id,
            NodeRef::Group(g) => &g.id,
        }
    }
}

/// One step of a [`Walk`].
#[derive(Debug, Clone, Copy)]
pub struct Visit<'a> {
    /// 0 for the starting group
    pub depth: usize,
    pub parent: Option<&'a Group>,
    pub node: NodeRef<'a>,
}

pub struct Walk<'a> {
    stack: Vec<Visit<'a>>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = Visit<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let visit = self.stack.pop()?;
        if let NodeRef::Group(group) = visit.node {
            // reversed so the leftmost child comes out first
            for child in group.children.iter().rev() {
                let node = match child {
                    Node::Condition(c) => NodeRef::Condition(c.as_ref()),
                    Node::Group(g) => NodeRef::Group(g.as_ref()),
                };
                self.stack.push(Visit {
                    depth: visit.depth + 1,
                    parent: Some(group),
                    node,
                });
            }
        }
        Some(visit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_compares_nested_conditions() {
        let leaf = Condition::new("city", Operator::Equals, "Kirkland");
        let inner = Group::new(Combinator::Or, vec![leaf.clone().into()]);
        let root = Group::new(Combinator::And, vec![inner.clone().into()]);

        let rebuilt_inner = inner.with_children(vec![leaf.clone().into()]);
        let rebuilt = root.with_children(vec![rebuilt_inner.into()]);
        let changed = Condition {
            value: "Seattle".into(),
            ..leaf
        };
        let diverged_inner = inner.with_children(vec![changed.into()]);
        let diverged = root.with_children(vec![diverged_inner.into()]);

        assert!(root == rebuilt);
        assert!(root != diverged);
    }

    #[test]
    fn equality_tells_condition_from_group_with_same_id() {
        let group = Group::new(Combinator::And, Vec::new());
        let as_condition = Condition {
            id: group.id.clone(),
            field: "city".into(),
            operator: Operator::Equals,
            value: String::new(),
        };
        let root = Group::new(Combinator::And, vec![group.into()]);
        let other = root.with_children(vec![as_condition.into()]);

        assert!(root != other);
    }

    #[test]
    fn short_id_is_prefix() {
        let id = NodeId::generate();
        assert_eq!(id.short().len(), 8);
        assert!(id.as_str().starts_with(id.short()));
    }

    #[test]
    fn patch_keeps_id_and_unset_attributes() {
        let condition = Condition::new("title", Operator::Contains, "Sales");
        let patched = condition.patched(&ConditionPatch::operator(Operator::Equals));
        assert_eq!(patched.id, condition.id);
        assert_eq!(patched.field, "title");
        assert_eq!(patched.operator, Operator::Equals);
        assert_eq!(patched.value, "Sales");
    }

    #[test]
    fn walk_is_preorder_left_to_right() {
        let catalog = FieldCatalog::default();
        let first = make_condition(&catalog);
        let nested = make_group(&catalog);
        let last = make_condition(&catalog);
        let expected = vec![
            first.id.clone(),
            nested.id.clone(),
            nested.children[0].id().clone(),
            last.id.clone(),
        ];
        let root = Group::new(
            Combinator::Or,
            vec![first.into(), nested.into(), last.into()],
        );

        let ids: Vec<NodeId> = root.walk().skip(1).map(|v| v.node.id().clone()).collect();

        assert_eq!(ids, expected);
    }
}
