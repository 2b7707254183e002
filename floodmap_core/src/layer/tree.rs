// Copyright 2026 the Floodmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pure, path-copying operations on layer tree snapshots.
//!
//! Every mutation here takes an `Arc<LayerNode>` snapshot and returns a new
//! root. The path from the root to the changed node is reconstructed;
//! untouched siblings are shared by reference. Operations addressing an id
//! that does not exist in the snapshot return the input `Arc` unchanged
//! (never an error), because the UI may race ids that a search filter has
//! since hidden.
//!
//! Derived group visibility is recomputed bottom-up on every rebuilt path,
//! so trees produced by these functions always satisfy: a group's `visible`
//! flag equals the logical OR of its descendant leaves' flags
//! (checkable with [`visibility_is_derived`]).

use alloc::collections::BTreeSet;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use super::node::{GroupNode, LayerNode};

/// Finds the node with the given id, depth-first.
#[must_use]
pub fn find_node<'a>(tree: &'a Arc<LayerNode>, id: &str) -> Option<&'a LayerNode> {
    if tree.id() == id {
        return Some(tree);
    }
    if let LayerNode::Group(g) = &**tree {
        for child in &g.children {
            if let Some(found) = find_node(child, id) {
                return Some(found);
            }
        }
    }
    None
}

/// Applies `transform` to the node with the matching id, path-copying the
/// route to it.
///
/// Ancestors on the path are reconstructed with their other fields (including
/// the derived `visible` flag) untouched, so `transform` must not change a
/// leaf's visibility; use [`set_visibility`] for that. Unknown ids are a
/// no-op returning the input snapshot.
#[must_use]
pub fn update_node<F>(tree: &Arc<LayerNode>, id: &str, transform: F) -> Arc<LayerNode>
where
    F: Fn(&LayerNode) -> LayerNode,
{
    update_rec(tree, id, &transform)
}

fn update_rec(
    node: &Arc<LayerNode>,
    id: &str,
    transform: &dyn Fn(&LayerNode) -> LayerNode,
) -> Arc<LayerNode> {
    if node.id() == id {
        return Arc::new(transform(node));
    }
    match &**node {
        LayerNode::Leaf(_) => node.clone(),
        LayerNode::Group(g) => {
            let mut changed = false;
            let mut children = Vec::with_capacity(g.children.len());
            for child in &g.children {
                let new_child = if changed {
                    // The id is unique; once hit, siblings are shared as-is.
                    child.clone()
                } else {
                    update_rec(child, id, transform)
                };
                if !Arc::ptr_eq(&new_child, child) {
                    changed = true;
                }
                children.push(new_child);
            }
            if !changed {
                return node.clone();
            }
            Arc::new(LayerNode::Group(GroupNode {
                id: g.id.clone(),
                name: g.name.clone(),
                visible: g.visible,
                expanded: g.expanded,
                children,
            }))
        }
    }
}

/// Sets the visibility of the node with the given id.
///
/// A leaf id sets that leaf's flag directly. A group id is a request to set
/// *every descendant leaf* to `visible`; the group's own flag is never
/// written independently. Every ancestor group on the rebuilt path has its
/// derived flag recomputed as the OR over its subtree. Unknown ids return
/// the input snapshot.
#[must_use]
pub fn set_visibility(tree: &Arc<LayerNode>, id: &str, visible: bool) -> Arc<LayerNode> {
    set_vis_rec(tree, id, visible).0
}

fn set_vis_rec(node: &Arc<LayerNode>, id: &str, visible: bool) -> (Arc<LayerNode>, bool) {
    if node.id() == id {
        return (apply_subtree_visibility(node, visible), true);
    }
    match &**node {
        LayerNode::Leaf(_) => (node.clone(), false),
        LayerNode::Group(g) => {
            let mut found = false;
            let mut changed = false;
            let mut children = Vec::with_capacity(g.children.len());
            for child in &g.children {
                let new_child = if found {
                    child.clone()
                } else {
                    let (new_child, hit) = set_vis_rec(child, id, visible);
                    found |= hit;
                    new_child
                };
                if !Arc::ptr_eq(&new_child, child) {
                    changed = true;
                }
                children.push(new_child);
            }
            if !found {
                return (node.clone(), false);
            }
            let derived = children.iter().any(|c| c.visible());
            if !changed && derived == g.visible {
                return (node.clone(), true);
            }
            (
                Arc::new(LayerNode::Group(GroupNode {
                    id: g.id.clone(),
                    name: g.name.clone(),
                    visible: derived,
                    expanded: g.expanded,
                    children,
                })),
                true,
            )
        }
    }
}

/// Sets every descendant leaf of `node` to `visible` and recomputes derived
/// group flags. A group with no leaf descendants stays invisible.
fn apply_subtree_visibility(node: &Arc<LayerNode>, visible: bool) -> Arc<LayerNode> {
    match &**node {
        LayerNode::Leaf(l) => {
            if l.visible == visible {
                return node.clone();
            }
            let mut leaf = l.clone();
            leaf.visible = visible;
            Arc::new(LayerNode::Leaf(leaf))
        }
        LayerNode::Group(g) => {
            let mut changed = false;
            let mut children = Vec::with_capacity(g.children.len());
            for child in &g.children {
                let new_child = apply_subtree_visibility(child, visible);
                if !Arc::ptr_eq(&new_child, child) {
                    changed = true;
                }
                children.push(new_child);
            }
            let derived = children.iter().any(|c| c.visible());
            if !changed && derived == g.visible {
                return node.clone();
            }
            Arc::new(LayerNode::Group(GroupNode {
                id: g.id.clone(),
                name: g.name.clone(),
                visible: derived,
                expanded: g.expanded,
                children,
            }))
        }
    }
}

/// Sets a leaf's opacity, clamped to `[0, 1]`.
///
/// Opacity is defined only on leaves: if the id resolves to a group (or to
/// nothing) this is an explicit no-op returning the input snapshot. The
/// value is never coerced onto a group.
#[must_use]
pub fn set_leaf_opacity(tree: &Arc<LayerNode>, id: &str, opacity: f32) -> Arc<LayerNode> {
    let opacity = opacity.clamp(0.0, 1.0);
    match find_node(tree, id) {
        Some(LayerNode::Leaf(_)) => update_node(tree, id, |node| match node {
            LayerNode::Leaf(l) => {
                let mut leaf = l.clone();
                leaf.opacity = opacity;
                LayerNode::Leaf(leaf)
            }
            LayerNode::Group(g) => LayerNode::Group(g.clone()),
        }),
        _ => tree.clone(),
    }
}

/// Flattens a subtree to its leaf ids, preserving tree (display) order.
#[must_use]
pub fn collect_leaf_ids(node: &LayerNode) -> Vec<String> {
    let mut out = Vec::new();
    collect_rec(node, &mut out);
    out
}

fn collect_rec(node: &LayerNode, out: &mut Vec<String>) {
    match node {
        LayerNode::Leaf(l) => out.push(l.id.clone()),
        LayerNode::Group(g) => {
            for child in &g.children {
                collect_rec(child, out);
            }
        }
    }
}

/// Expands every group in the tree.
#[must_use]
pub fn expand_all(tree: &Arc<LayerNode>) -> Arc<LayerNode> {
    set_expanded_rec(tree, true)
}

/// Collapses every group in the tree except the root, which is always kept
/// expanded.
#[must_use]
pub fn collapse_all(tree: &Arc<LayerNode>) -> Arc<LayerNode> {
    match &**tree {
        LayerNode::Leaf(_) => tree.clone(),
        LayerNode::Group(g) => {
            let mut changed = false;
            let mut children = Vec::with_capacity(g.children.len());
            for child in &g.children {
                let new_child = set_expanded_rec(child, false);
                if !Arc::ptr_eq(&new_child, child) {
                    changed = true;
                }
                children.push(new_child);
            }
            if !changed && g.expanded {
                return tree.clone();
            }
            Arc::new(LayerNode::Group(GroupNode {
                id: g.id.clone(),
                name: g.name.clone(),
                visible: g.visible,
                expanded: true,
                children,
            }))
        }
    }
}

fn set_expanded_rec(node: &Arc<LayerNode>, expanded: bool) -> Arc<LayerNode> {
    match &**node {
        LayerNode::Leaf(_) => node.clone(),
        LayerNode::Group(g) => {
            let mut changed = false;
            let mut children = Vec::with_capacity(g.children.len());
            for child in &g.children {
                let new_child = set_expanded_rec(child, expanded);
                if !Arc::ptr_eq(&new_child, child) {
                    changed = true;
                }
                children.push(new_child);
            }
            if !changed && g.expanded == expanded {
                return node.clone();
            }
            Arc::new(LayerNode::Group(GroupNode {
                id: g.id.clone(),
                name: g.name.clone(),
                visible: g.visible,
                expanded,
                children,
            }))
        }
    }
}

/// Case-insensitive substring match against node names.
///
/// A group matches if its own name matches or any descendant (recursively)
/// matches, so filtering keeps the ancestor chain of a deep hit visible.
/// The empty query matches everything.
#[must_use]
pub fn matches_query(node: &LayerNode, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let query = query.to_lowercase();
    matches_rec(node, &query)
}

fn matches_rec(node: &LayerNode, lowered: &str) -> bool {
    if node.name().to_lowercase().contains(lowered) {
        return true;
    }
    match node {
        LayerNode::Leaf(_) => false,
        LayerNode::Group(g) => g.children.iter().any(|c| matches_rec(c, lowered)),
    }
}

/// Recomputes every node's visibility from a visible-id set.
///
/// Leaves become visible iff their id is in `visible_ids`; groups get the
/// derived OR, bottom-up. Idempotent, and subtrees whose flags already match
/// are shared by reference, so projecting an unchanged set returns a root
/// `Arc::ptr_eq` to the input.
#[must_use]
pub fn project(tree: &Arc<LayerNode>, visible_ids: &BTreeSet<String>) -> Arc<LayerNode> {
    match &**tree {
        LayerNode::Leaf(l) => {
            let visible = visible_ids.contains(l.id.as_str());
            if l.visible == visible {
                return tree.clone();
            }
            let mut leaf = l.clone();
            leaf.visible = visible;
            Arc::new(LayerNode::Leaf(leaf))
        }
        LayerNode::Group(g) => {
            let mut changed = false;
            let mut children = Vec::with_capacity(g.children.len());
            for child in &g.children {
                let new_child = project(child, visible_ids);
                if !Arc::ptr_eq(&new_child, child) {
                    changed = true;
                }
                children.push(new_child);
            }
            let derived = children.iter().any(|c| c.visible());
            if !changed && derived == g.visible {
                return tree.clone();
            }
            Arc::new(LayerNode::Group(GroupNode {
                id: g.id.clone(),
                name: g.name.clone(),
                visible: derived,
                expanded: g.expanded,
                children,
            }))
        }
    }
}

/// Returns whether every group's `visible` flag equals the OR over its
/// descendant leaves. Test aid; trees produced by this module always pass.
#[must_use]
pub fn visibility_is_derived(node: &LayerNode) -> bool {
    derived_rec(node).1
}

/// Returns `(any descendant leaf visible, flags consistent)`.
fn derived_rec(node: &LayerNode) -> (bool, bool) {
    match node {
        LayerNode::Leaf(l) => (l.visible, true),
        LayerNode::Group(g) => {
            let mut any = false;
            let mut ok = true;
            for child in &g.children {
                let (child_any, child_ok) = derived_rec(child);
                any |= child_any;
                ok &= child_ok;
            }
            (any, ok && g.visible == any)
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use alloc::vec;

    use super::*;
    use crate::layer::node::{LayerKind, LeafNode};

    fn leaf(id: &str, visible: bool) -> Arc<LayerNode> {
        Arc::new(LayerNode::Leaf(LeafNode {
            id: id.to_string(),
            name: id.to_string(),
            visible,
            opacity: 0.8,
            kind: LayerKind::Raster,
            source_ref: id.to_string(),
        }))
    }

    fn named_leaf(id: &str, name: &str) -> Arc<LayerNode> {
        Arc::new(LayerNode::Leaf(LeafNode {
            id: id.to_string(),
            name: name.to_string(),
            visible: false,
            opacity: 0.8,
            kind: LayerKind::Raster,
            source_ref: id.to_string(),
        }))
    }

    fn group(id: &str, children: Vec<Arc<LayerNode>>) -> Arc<LayerNode> {
        let visible = children.iter().any(|c| c.visible());
        Arc::new(LayerNode::Group(GroupNode {
            id: id.to_string(),
            name: id.to_string(),
            visible,
            expanded: true,
            children,
        }))
    }

    /// root -> [a -> [a1, a2], b -> [b1]]
    fn sample_tree() -> Arc<LayerNode> {
        group(
            "root",
            vec![
                group("a", vec![leaf("a1", true), leaf("a2", false)]),
                group("b", vec![leaf("b1", false)]),
            ],
        )
    }

    #[test]
    fn find_node_is_depth_first() {
        let tree = sample_tree();
        assert_eq!(find_node(&tree, "a2").map(LayerNode::id), Some("a2"));
        assert_eq!(find_node(&tree, "b").map(LayerNode::id), Some("b"));
        assert!(find_node(&tree, "nope").is_none());
    }

    #[test]
    fn update_node_shares_untouched_siblings() {
        let tree = sample_tree();
        let updated = update_node(&tree, "a1", |node| {
            let mut l = node.as_leaf().unwrap().clone();
            l.name = "renamed".to_string();
            LayerNode::Leaf(l)
        });

        assert!(!Arc::ptr_eq(&tree, &updated));
        assert_eq!(find_node(&updated, "a1").unwrap().name(), "renamed");

        // Sibling subtree is shared, not copied.
        let old_g = tree.as_group().unwrap();
        let new_g = updated.as_group().unwrap();
        assert!(Arc::ptr_eq(&old_g.children[1], &new_g.children[1]));
        assert!(!Arc::ptr_eq(&old_g.children[0], &new_g.children[0]));
    }

    #[test]
    fn update_node_unknown_id_returns_input() {
        let tree = sample_tree();
        let updated = update_node(&tree, "ghost", |n| n.clone());
        assert!(Arc::ptr_eq(&tree, &updated));
    }

    #[test]
    fn set_visibility_on_leaf_updates_ancestors() {
        let tree = sample_tree();
        let updated = set_visibility(&tree, "b1", true);
        assert!(find_node(&updated, "b1").unwrap().visible());
        assert!(find_node(&updated, "b").unwrap().visible());
        assert!(updated.visible());
        assert!(visibility_is_derived(&updated));
    }

    #[test]
    fn set_visibility_on_group_sets_all_descendant_leaves() {
        let tree = sample_tree();
        let updated = set_visibility(&tree, "a", false);
        assert!(!find_node(&updated, "a1").unwrap().visible());
        assert!(!find_node(&updated, "a2").unwrap().visible());
        assert!(!find_node(&updated, "a").unwrap().visible());
        // Root loses visibility too: no leaf is visible anywhere.
        assert!(!updated.visible());
        assert!(visibility_is_derived(&updated));
    }

    #[test]
    fn set_visibility_shares_unaffected_subtrees() {
        let tree = sample_tree();
        let updated = set_visibility(&tree, "a2", true);
        let old_g = tree.as_group().unwrap();
        let new_g = updated.as_group().unwrap();
        assert!(Arc::ptr_eq(&old_g.children[1], &new_g.children[1]));
    }

    #[test]
    fn set_visibility_unknown_id_is_noop() {
        let tree = sample_tree();
        let updated = set_visibility(&tree, "ghost", true);
        assert!(Arc::ptr_eq(&tree, &updated));
    }

    #[test]
    fn set_leaf_opacity_rejects_groups() {
        let tree = sample_tree();
        let updated = set_leaf_opacity(&tree, "a", 0.5);
        assert!(Arc::ptr_eq(&tree, &updated));

        let updated = set_leaf_opacity(&tree, "a1", 0.5);
        let l = find_node(&updated, "a1").unwrap().as_leaf().unwrap();
        assert!((l.opacity - 0.5).abs() < 1e-6);
    }

    #[test]
    fn set_leaf_opacity_clamps() {
        let tree = sample_tree();
        let updated = set_leaf_opacity(&tree, "a1", 1.5);
        let l = find_node(&updated, "a1").unwrap().as_leaf().unwrap();
        assert!((l.opacity - 1.0).abs() < 1e-6);
    }

    #[test]
    fn collect_leaf_ids_preserves_tree_order() {
        let tree = sample_tree();
        assert_eq!(collect_leaf_ids(&tree), vec!["a1", "a2", "b1"]);
        let sub = find_node(&tree, "a").unwrap();
        assert_eq!(collect_leaf_ids(sub), vec!["a1", "a2"]);
    }

    #[test]
    fn collapse_all_keeps_root_expanded() {
        let tree = sample_tree();
        let collapsed = collapse_all(&tree);
        assert!(collapsed.as_group().unwrap().expanded);
        assert!(!find_node(&collapsed, "a").unwrap().as_group().unwrap().expanded);
        assert!(!find_node(&collapsed, "b").unwrap().as_group().unwrap().expanded);

        let expanded = expand_all(&collapsed);
        assert!(find_node(&expanded, "a").unwrap().as_group().unwrap().expanded);
    }

    #[test]
    fn matches_query_reports_ancestors_of_deep_hits() {
        let deep = group(
            "top",
            vec![group(
                "mid",
                vec![group("low", vec![named_leaf("x", "Max depth (50 yr)")])],
            )],
        );
        // Leaf three levels down matches; all three ancestor groups match
        // even though their own names do not contain the query.
        assert!(matches_query(&deep, "50 yr"));
        assert!(matches_query(find_node(&deep, "mid").unwrap(), "50 yr"));
        assert!(matches_query(find_node(&deep, "low").unwrap(), "50 yr"));
        assert!(!matches_query(find_node(&deep, "mid").unwrap(), "75 yr"));
    }

    #[test]
    fn matches_query_is_case_insensitive_and_empty_matches() {
        let tree = sample_tree();
        assert!(matches_query(&tree, "A1"));
        assert!(matches_query(&tree, ""));
        assert!(!matches_query(&tree, "zz"));
    }

    #[test]
    fn project_is_idempotent() {
        let tree = sample_tree();
        let ids: BTreeSet<String> = ["a2".to_string(), "b1".to_string()].into_iter().collect();
        let once = project(&tree, &ids);
        let twice = project(&once, &ids);
        assert!(Arc::ptr_eq(&once, &twice));
        assert!(visibility_is_derived(&once));
        assert!(!find_node(&once, "a1").unwrap().visible());
        assert!(find_node(&once, "a2").unwrap().visible());
        assert!(find_node(&once, "b1").unwrap().visible());
    }

    #[test]
    fn project_matching_state_returns_input_root() {
        let tree = sample_tree();
        let ids: BTreeSet<String> = ["a1".to_string()].into_iter().collect();
        let projected = project(&tree, &ids);
        // a1 is the only visible leaf already.
        assert!(Arc::ptr_eq(&tree, &projected));
    }

    #[test]
    fn empty_group_stays_invisible_under_group_toggle() {
        let tree = group("root", vec![group("empty", vec![]), leaf("l", false)]);
        let updated = set_visibility(&tree, "empty", true);
        assert!(!find_node(&updated, "empty").unwrap().visible());
        assert!(visibility_is_derived(&updated));
    }
}
