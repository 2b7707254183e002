// Copyright 2026 the Floodmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless viewer session for tests and demos.
//!
//! [`ViewerSession`] wires the whole state model together over any
//! [`MapRenderer`]: catalog, reconciler, scenario matrix, opacity
//! debouncing, and incremental render reconciliation. [`RecordingRenderer`]
//! is the renderer double used by the end-to-end tests here and by demo
//! harnesses that want to inspect what a real backend would have been told.

#![no_std]

extern crate alloc;

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;

use floodmap_core::catalog::{self, Climate, Maintenance, Parameter};
use floodmap_core::debounce::Debounce;
use floodmap_core::layer::LayerNode;
use floodmap_core::matrix::{MatrixMode, ScenarioMatrix};
use floodmap_core::reconciler::{LeafToggle, NoopListener, Reconciler};
use floodmap_core::render::{LayerSpec, MapRenderer, RenderReconciler, resolve_visible};
use floodmap_core::time::HostTime;
use floodmap_core::trace::{
    DebounceFireEvent, MatrixEvent, RenderApplyEvent, SyncEvent, ToggleEvent, Tracer,
};

// ---------------------------------------------------------------------------
// RecordingRenderer
// ---------------------------------------------------------------------------

/// One renderer call, as recorded.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderOp {
    /// A layer was created.
    Add {
        /// Leaf id.
        id: String,
        /// Handle generation assigned at creation.
        generation: u64,
        /// Initial opacity.
        opacity: f32,
        /// Initial stacking band.
        stacking: u16,
    },
    /// A layer was destroyed.
    Remove {
        /// Leaf id.
        id: String,
    },
    /// A live layer's opacity was pushed.
    SetOpacity {
        /// Leaf id.
        id: String,
        /// New opacity.
        opacity: f32,
    },
    /// A live layer's stacking band was pushed.
    SetStacking {
        /// Leaf id.
        id: String,
        /// New stacking band.
        stacking: u16,
    },
}

/// A [`MapRenderer`] double that logs every call and tracks handle identity.
///
/// Each `add` assigns the layer a fresh generation number. A surviving layer
/// keeps its generation across reconciliation passes, so a generation change
/// proves the handle was destroyed and recreated.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    /// Every call, in order.
    pub ops: Vec<RenderOp>,
    live: BTreeMap<String, u64>,
    next_generation: u64,
}

impl RecordingRenderer {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The generation of a live layer, if present.
    #[must_use]
    pub fn generation(&self, id: &str) -> Option<u64> {
        self.live.get(id).copied()
    }

    /// Ids of the layers currently alive, sorted.
    #[must_use]
    pub fn live_ids(&self) -> Vec<String> {
        self.live.keys().cloned().collect()
    }

    /// Forgets recorded ops; live layers and generations are kept.
    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }
}

impl MapRenderer for RecordingRenderer {
    fn add(&mut self, spec: &LayerSpec) {
        let generation = self.next_generation;
        self.next_generation += 1;
        self.live.insert(spec.id.clone(), generation);
        self.ops.push(RenderOp::Add {
            id: spec.id.clone(),
            generation,
            opacity: spec.opacity,
            stacking: spec.stacking,
        });
    }

    fn remove(&mut self, id: &str) {
        self.live.remove(id);
        self.ops.push(RenderOp::Remove { id: id.to_string() });
    }

    fn set_opacity(&mut self, id: &str, opacity: f32) {
        self.ops.push(RenderOp::SetOpacity {
            id: id.to_string(),
            opacity,
        });
    }

    fn set_stacking(&mut self, id: &str, stacking: u16) {
        self.ops.push(RenderOp::SetStacking {
            id: id.to_string(),
            stacking,
        });
    }
}

// ---------------------------------------------------------------------------
// ViewerSession
// ---------------------------------------------------------------------------

/// The full interaction loop over a generic renderer.
///
/// Every mutating method ends by reconciling the renderer against the
/// current visible set, except opacity drags, which coalesce through the
/// debouncer until [`tick`](Self::tick) observes a quiet window.
#[derive(Debug)]
pub struct ViewerSession<R: MapRenderer> {
    reconciler: Reconciler,
    matrix: ScenarioMatrix,
    overrides: BTreeMap<String, f32>,
    pending_opacity: Debounce<(String, f32)>,
    render: RenderReconciler,
    renderer: R,
}

impl<R: MapRenderer> ViewerSession<R> {
    /// Creates a session over the built-in catalog and renders the initial
    /// visible layers.
    pub fn new(renderer: R, tracer: &mut Tracer<'_>) -> Self {
        let mut session = Self {
            reconciler: Reconciler::new(catalog::build_catalog()),
            matrix: ScenarioMatrix::new(),
            overrides: BTreeMap::new(),
            pending_opacity: Debounce::default(),
            render: RenderReconciler::new(),
            renderer,
        };
        session.render_now(tracer);
        session
    }

    /// The working tree snapshot.
    #[must_use]
    pub fn tree(&self) -> &Arc<LayerNode> {
        self.reconciler.tree()
    }

    /// The canonical visible-id set.
    #[must_use]
    pub fn visible_ids(&self) -> &BTreeSet<String> {
        self.reconciler.visible_ids()
    }

    /// The scenario matrix state.
    #[must_use]
    pub fn matrix(&self) -> &ScenarioMatrix {
        &self.matrix
    }

    /// The underlying renderer.
    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Flips a node (leaf or group) from the layer panel.
    pub fn toggle_layer(&mut self, id: &str, tracer: &mut Tracer<'_>) {
        let toggles = self.reconciler.toggle_node(id, &mut NoopListener);
        if toggles == 0 {
            return;
        }
        tracer.toggle(&ToggleEvent {
            toggles,
            visible_len: self.reconciler.visible_ids().len(),
        });
        self.render_now(tracer);
    }

    /// Absorbs an externally supplied visible-id set.
    pub fn sync_visible(&mut self, ids: &BTreeSet<String>, tracer: &mut Tracer<'_>) {
        let changed = self.reconciler.sync_external(ids);
        tracer.sync(&SyncEvent {
            incoming_len: ids.len(),
            changed,
        });
        if changed {
            self.render_now(tracer);
        }
    }

    /// Toggles one matrix cell.
    pub fn matrix_toggle_cell(
        &mut self,
        return_period: u16,
        maintenance: Maintenance,
        tracer: &mut Tracer<'_>,
    ) {
        let batch = self
            .matrix
            .toggle_cell(return_period, maintenance, self.reconciler.visible_ids());
        self.apply_matrix_batch(&batch, tracer);
    }

    /// Toggles a whole matrix row (one return period).
    pub fn matrix_toggle_row(&mut self, return_period: u16, tracer: &mut Tracer<'_>) {
        let batch = self
            .matrix
            .toggle_row(return_period, self.reconciler.visible_ids());
        self.apply_matrix_batch(&batch, tracer);
    }

    /// Toggles a whole matrix column (one maintenance level).
    pub fn matrix_toggle_column(&mut self, maintenance: Maintenance, tracer: &mut Tracer<'_>) {
        let batch = self
            .matrix
            .toggle_column(maintenance, self.reconciler.visible_ids());
        self.apply_matrix_batch(&batch, tracer);
    }

    fn apply_matrix_batch(&mut self, batch: &[LeafToggle], tracer: &mut Tracer<'_>) {
        let applied = self.reconciler.apply_batch(batch, &mut NoopListener);
        tracer.matrix(&MatrixEvent { toggles: applied });
        if applied > 0 {
            self.render_now(tracer);
        }
    }

    /// Switches the comparison mode. Reshapes the selection only; visible
    /// layers change through subsequent explicit toggles.
    pub fn set_matrix_mode(&mut self, mode: MatrixMode) {
        self.matrix.set_mode(mode);
    }

    /// Toggles one maintenance level in the compare-all selection.
    ///
    /// Selection changes are forward-looking only; visible layers change
    /// through subsequent cell and row toggles.
    pub fn toggle_maintenance(&mut self, maintenance: Maintenance) {
        self.matrix.toggle_maintenance(maintenance);
    }

    /// Switches the climate axis for subsequent toggles.
    pub fn set_climate(&mut self, climate: Climate) {
        self.matrix.set_climate(climate);
    }

    /// Switches the parameter axis for subsequent toggles.
    pub fn set_parameter(&mut self, parameter: Parameter) {
        self.matrix.set_parameter(parameter);
    }

    /// Records one opacity-slider sample at `now`.
    ///
    /// The commit (override map, working tree, renderer) waits for a quiet
    /// window; call [`tick`](Self::tick) to drive it.
    pub fn drag_opacity(&mut self, id: &str, opacity: f32, now: HostTime) {
        self.pending_opacity.submit((id.to_string(), opacity), now);
    }

    /// The instant the pending opacity commit becomes due, if any.
    #[must_use]
    pub fn opacity_deadline(&self) -> Option<HostTime> {
        self.pending_opacity.deadline()
    }

    /// Commits the pending opacity change if its quiet window has elapsed.
    pub fn tick(&mut self, now: HostTime, tracer: &mut Tracer<'_>) {
        let Some((id, opacity)) = self.pending_opacity.fire(now) else {
            return;
        };
        tracer.debounce_fire(&DebounceFireEvent { fired_at: now });
        self.overrides.insert(id.clone(), opacity);
        self.reconciler.set_opacity(&id, opacity);
        self.render_now(tracer);
    }

    /// Ids whose subtree matches the query, in display order.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<String> {
        self.reconciler.search(query)
    }

    /// Expands every group. UI-only; no render pass.
    pub fn expand_all(&mut self) {
        self.reconciler.expand_all();
    }

    /// Collapses every group except the root. UI-only; no render pass.
    pub fn collapse_all(&mut self) {
        self.reconciler.collapse_all();
    }

    fn render_now(&mut self, tracer: &mut Tracer<'_>) {
        let specs = resolve_visible(
            self.reconciler.tree(),
            self.reconciler.visible_ids(),
            &self.overrides,
        );
        let stats = self.render.apply(&specs, &mut self.renderer);
        tracer.render_apply(&RenderApplyEvent {
            added: stats.added,
            removed: stats.removed,
            opacity_updates: stats.opacity_updates,
            retained: stats.retained,
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
