// Copyright 2026 the Floodmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer-tree state model for a flood-scenario map viewer.
//!
//! `floodmap_core` owns the presentation state of a map viewer that shows
//! pre-computed flood-simulation layers served by an external map server. It
//! is `no_std` compatible (with `alloc`) and has no platform dependencies;
//! browser glue lives in `floodmap_backend_web`.
//!
//! # Architecture
//!
//! The crate is organized around a single canonical piece of state, the
//! visible-layer-id set, and a chain of pure derivations from it:
//!
//! ```text
//!   catalog::build_catalog() ──► immutable LayerNode tree
//!                                      │
//!        user interaction              ▼
//!   ───────────────────────► Reconciler (canonical visible-id set,
//!                                      │  working tree = projection)
//!            ScenarioMatrix ──toggles──┤
//!                                      ▼
//!   render::resolve_visible() ──► [LayerSpec] ──► RenderReconciler::apply()
//!                                                      │
//!                                                      ▼
//!                                              dyn MapRenderer
//!                                        (web backend, test doubles)
//! ```
//!
//! **[`catalog`]** — Immutable declarative description of every available
//! layer and group, plus the `t3_{rp}yrs_{climate}_{maintenance}_{parameter}`
//! naming convention shared with the scenario matrix.
//!
//! **[`layer`]** — The `LayerNode` tree and pure path-copying operations on
//! it: lookup, update, visibility propagation, expand/collapse, search, and
//! projection from a visible-id set. Untouched subtrees are shared by
//! reference, so no-op detection is a pointer comparison.
//!
//! **[`reconciler`]** — Owns the canonical visible-id set and keeps the
//! working tree synchronized with it in both directions without feedback
//! loops. Listeners are notified of affected leaves *before* the local tree
//! is updated.
//!
//! **[`matrix`]** — Derived controller over the climate × maintenance ×
//! parameter × return-period grid; computes bulk toggle batches for the
//! reconciler and enforces single-mode exclusivity.
//!
//! **[`render`]** — The [`MapRenderer`](render::MapRenderer) collaborator
//! trait and an incremental reconciler that adds, removes, or mutates live
//! render layers in place, keyed by leaf id.
//!
//! **[`debounce`]** — Quiescence-window coalescing for rapid continuous
//! input such as opacity slider drags.
//!
//! **[`time`]** — Monotonic microsecond tick types used by the debouncer.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types for
//! interaction-loop instrumentation, with zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Error policy
//!
//! This is presentation state: no operation fails loudly for normal input.
//! Operations addressing an unknown node id return their input unchanged,
//! since the UI may race ids that a search filter has since hidden. Invalid
//! operations (opacity on a group id) are explicit no-ops.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one
//!   branch per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod catalog;
pub mod debounce;
pub mod layer;
pub mod matrix;
pub mod reconciler;
pub mod render;
pub mod time;
pub mod trace;
