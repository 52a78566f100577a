//! Tree editor: targeted, copy-on-write edits keyed by group id.
//!
//! Every edit names a group, rebuilds that group's children and then the
//! chain of ancestors back to the root. Everything off that path is shared
//! with the input tree, so `Arc::ptr_eq` tells a caller which subtrees an
//! edit touched. An id that matches no group, or a child id the group does
//! not hold, leaves the tree as it is: the input root comes back.

use std::sync::Arc;

use crate::domain::catalog::{Combinator, FieldCatalog};
use crate::domain::node::{make_condition, make_group, ConditionPatch, Group, Node, NodeId};

/// Replace the group `target` with `transformer(group)` and rebuild its
/// ancestors. Conditions are never targets.
///
/// When no group has the id, the returned root is the input `Arc`.
/// Locating and rebuilding both run without recursion, so depth is bounded
/// only by memory.
pub fn apply_to_group<F>(root: &Arc<Group>, target: &str, transformer: F) -> Arc<Group>
where
    F: FnOnce(&Group) -> Group,
{
    rebuild_group(root, target, |group| Some(transformer(group)))
}

/// Like [`apply_to_group`], but a `None` from `transformer` means the group
/// needs no change and the input root is returned as is.
fn rebuild_group<F>(root: &Arc<Group>, target: &str, transformer: F) -> Arc<Group>
where
    F: FnOnce(&Group) -> Option<Group>,
{
    let Some(mut path) = locate(root, target) else {
        return Arc::clone(root);
    };
    let Some((found, _)) = path.pop() else {
        return Arc::clone(root);
    };
    let Some(replacement) = transformer(found) else {
        return Arc::clone(root);
    };

    let mut rebuilt = Arc::new(replacement);
    while let Some((ancestor, index)) = path.pop() {
        let mut children = ancestor.children.clone();
        children[index] = Node::Group(rebuilt);
        rebuilt = Arc::new(ancestor.with_children(children));
    }
    rebuilt
}

/// Path from the root to the group `target`. Each entry is a group and the
/// index of the child leading onwards; the last entry is the target itself.
fn locate<'a>(root: &'a Group, target: &str) -> Option<Vec<(&'a Group, usize)>> {
    let mut path: Vec<(&'a Group, usize)> = vec![(root, 0)];
    if root.id == *target {
        return Some(path);
    }

    while let Some(&(group, cursor)) = path.last() {
        let Some(child) = group.children.get(cursor) else {
            // exhausted: back up and move the parent's cursor past us
            path.pop();
            if let Some(parent) = path.last_mut() {
                parent.1 += 1;
            }
            continue;
        };
        match child {
            Node::Group(child) => {
                path.push((child.as_ref(), 0));
                if child.id == *target {
                    return Some(path);
                }
            }
            Node::Condition(_) => {
                if let Some(frame) = path.last_mut() {
                    frame.1 += 1;
                }
            }
        }
    }
    None
}

pub fn set_combinator(root: &Arc<Group>, group_id: &str, combinator: Combinator) -> Arc<Group> {
    apply_to_group(root, group_id, |group| group.with_combinator(combinator))
}

/// Append a default condition to the group.
pub fn add_condition(root: &Arc<Group>, group_id: &str, catalog: &FieldCatalog) -> Arc<Group> {
    add_condition_with_id(root, group_id, catalog).0
}

/// Like [`add_condition`], also returning the id of the new condition, or
/// `None` when the group was not found.
pub fn add_condition_with_id(
    root: &Arc<Group>,
    group_id: &str,
    catalog: &FieldCatalog,
) -> (Arc<Group>, Option<NodeId>) {
    append_child(root, group_id, make_condition(catalog).into())
}

/// Append a default group (holding one default condition) to the group.
pub fn add_group(root: &Arc<Group>, group_id: &str, catalog: &FieldCatalog) -> Arc<Group> {
    add_group_with_id(root, group_id, catalog).0
}

pub fn add_group_with_id(
    root: &Arc<Group>,
    group_id: &str,
    catalog: &FieldCatalog,
) -> (Arc<Group>, Option<NodeId>) {
    append_child(root, group_id, make_group(catalog).into())
}

fn append_child(root: &Arc<Group>, group_id: &str, child: Node) -> (Arc<Group>, Option<NodeId>) {
    let mut created = None;
    let new_root = apply_to_group(root, group_id, |group| {
        created = Some(child.id().clone());
        let mut children = Vec::with_capacity(group.children.len() + 1);
        children.extend(group.children.iter().cloned());
        children.push(child);
        group.with_children(children)
    });
    (new_root, created)
}

/// Shallow-merge `patch` into the condition `condition_id`, a direct child
/// of `group_id`. An empty patch changes nothing.
pub fn update_condition(
    root: &Arc<Group>,
    group_id: &str,
    condition_id: &str,
    patch: &ConditionPatch,
) -> Arc<Group> {
    if patch.is_empty() {
        return Arc::clone(root);
    }
    rebuild_group(root, group_id, |group| {
        let (index, condition) =
            group
                .children
                .iter()
                .enumerate()
                .find_map(|(index, child)| match child {
                    Node::Condition(c) if c.id == *condition_id => Some((index, c)),
                    _ => None,
                })?;
        let mut children = group.children.clone();
        children[index] = Node::Condition(Arc::new(condition.patched(patch)));
        Some(group.with_children(children))
    })
}

/// Drop the condition `condition_id` from the direct children of `group_id`.
pub fn remove_condition(root: &Arc<Group>, group_id: &str, condition_id: &str) -> Arc<Group> {
    rebuild_group(root, group_id, |group| {
        retain_children(group, |child| {
            !matches!(child, Node::Condition(c) if c.id == *condition_id)
        })
    })
}

/// Drop the group `child_group_id` from the direct children of
/// `parent_group_id`. Removing the root is not expressible.
pub fn remove_group(root: &Arc<Group>, parent_group_id: &str, child_group_id: &str) -> Arc<Group> {
    rebuild_group(root, parent_group_id, |group| {
        retain_children(group, |child| {
            !matches!(child, Node::Group(g) if g.id == *child_group_id)
        })
    })
}

/// `None` when every child is kept.
fn retain_children(group: &Group, keep: impl Fn(&Node) -> bool) -> Option<Group> {
    let children: Vec<Node> = group.children.iter().filter(|&c| keep(c)).cloned().collect();
    if children.len() == group.children.len() {
        return None;
    }
    Some(group.with_children(children))
}
