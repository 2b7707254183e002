// Copyright 2026 the Floodmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render collaborator contract and incremental reconciliation.
//!
//! The actual map library (tile loading, WMS mechanics, projection math) is
//! an external collaborator reached through the [`MapRenderer`] trait. Both
//! the DOM-backed web renderer and test doubles implement it, enabling
//! generic interaction loops.
//!
//! [`RenderReconciler`] makes the renderer's live layer collection match a
//! desired visible-leaf list with minimal destructive change: remove stale
//! ids, add missing ones, and mutate surviving ones in place. A layer's
//! render handle is keyed by its leaf id, never by list position, so adding
//! or removing unrelated leaves can never destroy and recreate a surviving
//! handle.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::layer::{LayerKind, LayerNode};

/// Opacity changes smaller than this are not forwarded to the renderer,
/// avoiding redraw signaling for imperceptible slider jitter.
pub const OPACITY_EPSILON: f32 = 1e-3;

/// Everything the renderer needs to materialize one visible leaf.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerSpec {
    /// Leaf id; the render handle is keyed by this.
    pub id: String,
    /// Opaque source reference, resolved by the backend into a fetchable
    /// resource (for WMS backends, the server-side layer name).
    pub source_ref: String,
    /// Geometry class.
    pub kind: LayerKind,
    /// Final opacity: any session override atop the catalog default.
    pub opacity: f32,
    /// Draw-order band, derived solely from `kind`.
    pub stacking: u16,
}

/// External renderer contract.
///
/// All methods are assumed idempotent and side-effect-free when called with
/// unchanged values. A fetch failure inside the renderer degrades visually
/// (hide the broken resource) and never surfaces into core state.
pub trait MapRenderer {
    /// Creates a live layer for `spec`. Called at most once per id until a
    /// matching `remove`.
    fn add(&mut self, spec: &LayerSpec);
    /// Destroys the live layer for `id`.
    fn remove(&mut self, id: &str);
    /// Updates a live layer's opacity.
    fn set_opacity(&mut self, id: &str, opacity: f32);
    /// Updates a live layer's draw-order band.
    fn set_stacking(&mut self, id: &str, stacking: u16);
}

/// Counts of one [`RenderReconciler::apply`] pass, for instrumentation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ApplyStats {
    /// Layers newly added.
    pub added: usize,
    /// Layers removed.
    pub removed: usize,
    /// Surviving layers whose opacity was pushed.
    pub opacity_updates: usize,
    /// Surviving layers kept alive (with or without property updates).
    pub retained: usize,
}

/// Resolves the currently visible leaves to render specs, in tree order.
///
/// The per-leaf opacity is the session override when present, else the
/// catalog default. Leaves not in `visible_ids` are skipped.
#[must_use]
pub fn resolve_visible(
    tree: &LayerNode,
    visible_ids: &BTreeSet<String>,
    overrides: &BTreeMap<String, f32>,
) -> Vec<LayerSpec> {
    let mut out = Vec::new();
    resolve_rec(tree, visible_ids, overrides, &mut out);
    out
}

fn resolve_rec(
    node: &LayerNode,
    visible_ids: &BTreeSet<String>,
    overrides: &BTreeMap<String, f32>,
    out: &mut Vec<LayerSpec>,
) {
    match node {
        LayerNode::Leaf(l) => {
            if visible_ids.contains(l.id.as_str()) {
                let opacity = overrides.get(l.id.as_str()).copied().unwrap_or(l.opacity);
                out.push(LayerSpec {
                    id: l.id.clone(),
                    source_ref: l.source_ref.clone(),
                    kind: l.kind,
                    opacity: opacity.clamp(0.0, 1.0),
                    stacking: l.kind.stacking(),
                });
            }
        }
        LayerNode::Group(g) => {
            for child in &g.children {
                resolve_rec(child, visible_ids, overrides, out);
            }
        }
    }
}

/// Last-applied properties of one live layer.
#[derive(Clone, Copy, Debug)]
struct AppliedLayer {
    opacity: f32,
    stacking: u16,
}

/// Incrementally reconciles a renderer's live layers against a desired list.
#[derive(Debug, Default)]
pub struct RenderReconciler {
    applied: BTreeMap<String, AppliedLayer>,
}

impl RenderReconciler {
    /// Creates a reconciler with no live layers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids of the layers currently alive in the renderer.
    #[must_use]
    pub fn live_ids(&self) -> Vec<String> {
        self.applied.keys().cloned().collect()
    }

    /// Brings `renderer` in sync with `specs`.
    ///
    /// Stale layers are removed first, then missing ones added, then
    /// surviving ones updated in place: opacity only when it moved by more
    /// than [`OPACITY_EPSILON`], stacking unconditionally (cheap and
    /// idempotent). Handle identity is keyed by id, so unrelated additions
    /// and removals never recreate a surviving layer.
    pub fn apply(&mut self, specs: &[LayerSpec], renderer: &mut dyn MapRenderer) -> ApplyStats {
        let mut stats = ApplyStats::default();

        let desired: BTreeSet<&str> = specs.iter().map(|s| s.id.as_str()).collect();
        let stale: Vec<String> = self
            .applied
            .keys()
            .filter(|id| !desired.contains(id.as_str()))
            .cloned()
            .collect();
        for id in stale {
            renderer.remove(&id);
            self.applied.remove(&id);
            stats.removed += 1;
        }

        for spec in specs {
            match self.applied.get_mut(&spec.id) {
                None => {
                    renderer.add(spec);
                    self.applied.insert(
                        spec.id.to_string(),
                        AppliedLayer {
                            opacity: spec.opacity,
                            stacking: spec.stacking,
                        },
                    );
                    stats.added += 1;
                }
                Some(applied) => {
                    if (spec.opacity - applied.opacity).abs() > OPACITY_EPSILON {
                        renderer.set_opacity(&spec.id, spec.opacity);
                        applied.opacity = spec.opacity;
                        stats.opacity_updates += 1;
                    }
                    renderer.set_stacking(&spec.id, spec.stacking);
                    applied.stacking = spec.stacking;
                    stats.retained += 1;
                }
            }
        }

        stats
    }
}
