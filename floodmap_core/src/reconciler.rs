// Copyright 2026 the Floodmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canonical visible-id set and its synchronization with the working tree.
//!
//! The set of visible leaf ids is the single source of truth for what the
//! renderer shows; the tree's per-node `visible` flags are a cached
//! projection of it. [`Reconciler`] owns both and keeps them consistent in
//! two directions:
//!
//! - **External → tree** ([`Reconciler::sync_external`]): a replacement set
//!   is compared by content (not reference) and, when equal to the current
//!   one, skipped entirely so no tree reconstruction or downstream render
//!   churn happens.
//! - **Tree → external** ([`Reconciler::toggle_node`],
//!   [`Reconciler::apply_batch`]): an interaction toggling a node first
//!   updates the canonical set, then notifies the listener with the complete
//!   list of affected leaves, and only then applies the local projection.
//!   The working tree never shows a state the render path has not been told
//!   about.
//!
//! At any quiescent point, `project(tree, visible_ids)` returns the tree
//! itself.

use alloc::collections::BTreeSet;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::layer::{
    LayerNode, collapse_all, collect_leaf_ids, expand_all, find_node, project, set_leaf_opacity,
    update_node,
};

/// One leaf's new visibility, as delivered to a [`VisibilityListener`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeafToggle {
    /// Leaf id.
    pub id: String,
    /// New visibility.
    pub visible: bool,
}

impl LeafToggle {
    /// Convenience constructor.
    #[must_use]
    pub fn new(id: impl Into<String>, visible: bool) -> Self {
        Self {
            id: id.into(),
            visible,
        }
    }
}

/// Receives the affected-leaf batch of a toggle before the tree is updated.
pub trait VisibilityListener {
    /// Called once per interaction with every affected leaf and its new
    /// visibility. The canonical set already reflects the batch; the working
    /// tree does not yet.
    fn on_visibility(&mut self, toggles: &[LeafToggle]);
}

/// A [`VisibilityListener`] that ignores all notifications.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopListener;

impl VisibilityListener for NoopListener {
    fn on_visibility(&mut self, _toggles: &[LeafToggle]) {}
}

/// Owns the canonical visible-id set and a working tree projected from it.
#[derive(Clone, Debug)]
pub struct Reconciler {
    visible: BTreeSet<String>,
    tree: Arc<LayerNode>,
}

impl Reconciler {
    /// Creates a reconciler seeded from a catalog tree.
    ///
    /// The initial set is taken from the leaves visible in the catalog, so
    /// the starting state is quiescent by construction.
    #[must_use]
    pub fn new(catalog: Arc<LayerNode>) -> Self {
        let mut visible = BTreeSet::new();
        visible_leaves(&catalog, &mut visible);
        let tree = project(&catalog, &visible);
        Self { visible, tree }
    }

    /// The current working tree snapshot.
    #[must_use]
    pub fn tree(&self) -> &Arc<LayerNode> {
        &self.tree
    }

    /// The canonical visible-id set.
    #[must_use]
    pub fn visible_ids(&self) -> &BTreeSet<String> {
        &self.visible
    }

    /// Replaces the canonical set from outside and re-projects the tree.
    ///
    /// Returns `false` without touching the tree when `ids` is content-equal
    /// to the current set; the working tree stays reference-identical, which
    /// keeps the render path quiet. Idempotent.
    pub fn sync_external(&mut self, ids: &BTreeSet<String>) -> bool {
        if *ids == self.visible {
            return false;
        }
        self.visible = ids.clone();
        self.tree = project(&self.tree, &self.visible);
        true
    }

    /// Flips the visibility of a node (leaf or group) and returns the number
    /// of affected leaves.
    ///
    /// A visible group (any descendant leaf on) turns fully off; an
    /// invisible one turns fully on. The listener is notified with the
    /// complete affected-leaf batch before the local tree update is applied.
    /// Unknown ids are a silent no-op returning 0.
    pub fn toggle_node(&mut self, id: &str, listener: &mut dyn VisibilityListener) -> usize {
        let target = match find_node(&self.tree, id) {
            Some(node) => !node.visible(),
            None => return 0,
        };
        self.set_node_visibility(id, target, listener)
    }

    /// Sets the visibility of a node (leaf or group) to an explicit value.
    ///
    /// Same contract as [`toggle_node`](Self::toggle_node); the batch always
    /// covers every leaf of the addressed subtree, even leaves already in
    /// the requested state, so downstream consumers can apply it
    /// idempotently.
    pub fn set_node_visibility(
        &mut self,
        id: &str,
        visible: bool,
        listener: &mut dyn VisibilityListener,
    ) -> usize {
        let Some(node) = find_node(&self.tree, id) else {
            return 0;
        };
        let toggles: Vec<LeafToggle> = collect_leaf_ids(node)
            .into_iter()
            .map(|leaf_id| LeafToggle::new(leaf_id, visible))
            .collect();
        self.commit(&toggles, listener);
        toggles.len()
    }

    /// Applies a bulk toggle batch (from the scenario matrix).
    ///
    /// Ids that do not resolve to a leaf in the working tree are skipped
    /// silently. Returns the number of applied toggles. One listener
    /// notification covers the whole batch.
    pub fn apply_batch(
        &mut self,
        toggles: &[LeafToggle],
        listener: &mut dyn VisibilityListener,
    ) -> usize {
        let applied: Vec<LeafToggle> = toggles
            .iter()
            .filter(|t| find_node(&self.tree, &t.id).is_some_and(LayerNode::is_leaf))
            .cloned()
            .collect();
        if applied.is_empty() {
            return 0;
        }
        self.commit(&applied, listener);
        applied.len()
    }

    /// Updates the canonical set, notifies, then projects. Notify before
    /// apply: the listener is the path that feeds the renderer, and the tree
    /// must never be ahead of it.
    fn commit(&mut self, toggles: &[LeafToggle], listener: &mut dyn VisibilityListener) {
        for t in toggles {
            if t.visible {
                self.visible.insert(t.id.clone());
            } else {
                self.visible.remove(&t.id);
            }
        }
        listener.on_visibility(toggles);
        self.tree = project(&self.tree, &self.visible);
    }

    /// Sets a group's disclosure flag. UI-only; the set is untouched and no
    /// listener fires.
    pub fn set_expanded(&mut self, id: &str, expanded: bool) {
        self.tree = update_node(&self.tree, id, |node| match node {
            LayerNode::Group(g) => {
                let mut g = g.clone();
                g.expanded = expanded;
                LayerNode::Group(g)
            }
            LayerNode::Leaf(l) => LayerNode::Leaf(l.clone()),
        });
    }

    /// Expands every group.
    pub fn expand_all(&mut self) {
        self.tree = expand_all(&self.tree);
    }

    /// Collapses every group except the root.
    pub fn collapse_all(&mut self) {
        self.tree = collapse_all(&self.tree);
    }

    /// Sets a leaf's catalog opacity in the working tree. No-op for group or
    /// unknown ids.
    pub fn set_opacity(&mut self, id: &str, opacity: f32) {
        self.tree = set_leaf_opacity(&self.tree, id, opacity);
    }

    /// Ids of nodes (groups and leaves) whose subtree matches the query, in
    /// display order. Used by the UI to prune the tree while filtering.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<String> {
        let mut out = Vec::new();
        search_rec(&self.tree, query, &mut out);
        out
    }
}

fn visible_leaves(node: &LayerNode, out: &mut BTreeSet<String>) {
    match node {
        LayerNode::Leaf(l) => {
            if l.visible {
                out.insert(l.id.clone());
            }
        }
        LayerNode::Group(g) => {
            for child in &g.children {
                visible_leaves(child, out);
            }
        }
    }
}

fn search_rec(node: &Arc<LayerNode>, query: &str, out: &mut Vec<String>) {
    if !crate::layer::matches_query(node, query) {
        return;
    }
    out.push(node.id().to_string());
    if let LayerNode::Group(g) = &**node {
        for child in &g.children {
            search_rec(child, query, out);
        }
    }
}
