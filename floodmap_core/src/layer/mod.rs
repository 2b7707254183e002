// Copyright 2026 the Floodmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer tree data model and pure mutation operations.
//!
//! A *layer node* is either a [`GroupNode`] aggregating children or a
//! [`LeafNode`] representing one renderable map layer. Every node carries:
//!
//! - An identity — a string id, globally unique across the whole tree
//!   (groups and leaves share one namespace) and stable for the session.
//! - A `visible` flag. On leaves it is authoritative; on groups it is a
//!   *derived* quantity, true iff at least one descendant leaf is visible.
//!   Writing a group's visibility is a request to set all descendant leaves,
//!   never a flag write.
//! - Groups additionally carry `expanded`, a UI-only flag that never gates
//!   visibility logic, and an ordered child list (order is display order).
//! - Leaves additionally carry `opacity` (defined only on leaves), a
//!   [`LayerKind`] that drives render stacking, and an opaque `source_ref`
//!   resolved by the render backend.
//!
//! # Immutability
//!
//! The tree is a persistent data structure: every operation in [`tree`]
//! takes an `Arc<LayerNode>` snapshot and returns a new root, path-copying
//! the route to the changed node while sharing untouched subtrees by
//! reference. Operations addressing an unknown id return the input snapshot
//! itself, so callers detect no-ops with `Arc::ptr_eq`.

mod node;
mod tree;

pub use node::{GroupNode, LayerKind, LayerNode, LeafNode};
pub use tree::{
    collapse_all, collect_leaf_ids, expand_all, find_node, matches_query, project,
    set_leaf_opacity, set_visibility, update_node, visibility_is_derived,
};
