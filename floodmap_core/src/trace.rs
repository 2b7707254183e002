// Copyright 2026 the Floodmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the interaction loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! session instrumentation calls as state changes flow through. All method
//! bodies default to no-ops, so implementing only the events you care about
//! is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace`
//! feature is **off**, every `Tracer` method compiles to nothing (zero
//! overhead). When **on**, each method performs a single `Option` branch
//! before dispatching.
//!
//! # Crate features
//!
//! - `trace` — enables the `Tracer` method bodies (one branch per call).

use crate::time::HostTime;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted after an external visible-id set is absorbed.
#[derive(Clone, Copy, Debug)]
pub struct SyncEvent {
    /// Number of ids in the incoming set.
    pub incoming_len: usize,
    /// Whether the set actually differed from local state.
    pub changed: bool,
}

/// Emitted after a tree-originated visibility change commits.
#[derive(Clone, Copy, Debug)]
pub struct ToggleEvent {
    /// Number of leaf toggles in the committed batch.
    pub toggles: usize,
    /// Visible-set size after the commit.
    pub visible_len: usize,
}

/// Emitted after a scenario-matrix gesture produces its toggle batch.
#[derive(Clone, Copy, Debug)]
pub struct MatrixEvent {
    /// Number of leaf toggles the gesture produced.
    pub toggles: usize,
}

/// Emitted when a debounced value commits after its quiet window.
#[derive(Clone, Copy, Debug)]
pub struct DebounceFireEvent {
    /// Host time at which the commit fired.
    pub fired_at: HostTime,
}

/// Emitted after each render reconciliation pass.
#[derive(Clone, Copy, Debug)]
pub struct RenderApplyEvent {
    /// Layers newly added.
    pub added: usize,
    /// Layers removed.
    pub removed: usize,
    /// Surviving layers whose opacity was pushed.
    pub opacity_updates: usize,
    /// Surviving layers kept alive.
    pub retained: usize,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the interaction loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called after an external set synchronization.
    fn on_sync(&mut self, e: &SyncEvent) {
        _ = e;
    }

    /// Called after a tree-originated visibility commit.
    fn on_toggle(&mut self, e: &ToggleEvent) {
        _ = e;
    }

    /// Called after a matrix gesture resolves to a toggle batch.
    fn on_matrix(&mut self, e: &MatrixEvent) {
        _ = e;
    }

    /// Called when a debounced commit fires.
    fn on_debounce_fire(&mut self, e: &DebounceFireEvent) {
        _ = e;
    }

    /// Called after a render reconciliation pass.
    fn on_render_apply(&mut self, e: &RenderApplyEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing.
/// When **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`SyncEvent`].
    #[inline]
    pub fn sync(&mut self, e: &SyncEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_sync(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ToggleEvent`].
    #[inline]
    pub fn toggle(&mut self, e: &ToggleEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_toggle(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`MatrixEvent`].
    #[inline]
    pub fn matrix(&mut self, e: &MatrixEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_matrix(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`DebounceFireEvent`].
    #[inline]
    pub fn debounce_fire(&mut self, e: &DebounceFireEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_debounce_fire(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`RenderApplyEvent`].
    #[inline]
    pub fn render_apply(&mut self, e: &RenderApplyEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_render_apply(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_sync(&SyncEvent {
            incoming_len: 3,
            changed: true,
        });
        sink.on_toggle(&ToggleEvent {
            toggles: 1,
            visible_len: 4,
        });
        sink.on_render_apply(&RenderApplyEvent {
            added: 1,
            removed: 0,
            opacity_updates: 0,
            retained: 3,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.matrix(&MatrixEvent { toggles: 2 });
        tracer.debounce_fire(&DebounceFireEvent {
            fired_at: HostTime(50_000),
        });
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            toggles: Vec<usize>,
        }
        impl TraceSink for RecordingSink {
            fn on_toggle(&mut self, e: &ToggleEvent) {
                self.toggles.push(e.toggles);
            }
        }

        let mut sink = RecordingSink { toggles: Vec::new() };
        let mut tracer = Tracer::new(&mut sink);
        tracer.toggle(&ToggleEvent {
            toggles: 3,
            visible_len: 7,
        });
        drop(tracer);
        assert_eq!(sink.toggles, &[3]);
    }
}
