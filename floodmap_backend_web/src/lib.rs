// Copyright 2026 the Floodmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for floodmap.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`wms`]: WMS `GetMap` URL construction (pure, testable off-browser)
//! - [`DomRenderer`]: positioned `<img>` elements as map layers
//! - [`OneShotTimer`]: `setTimeout`-backed debounce deadlines

#![no_std]

extern crate alloc;

mod renderer;
mod timer;
pub mod wms;

pub use floodmap_core::render::MapRenderer;
pub use renderer::{DomRenderer, Viewport};
pub use timer::OneShotTimer;

use floodmap_core::time::HostTime;

/// Returns the current host time from `performance.now()`.
///
/// The returned [`HostTime`] is in microsecond ticks.
#[must_use]
pub fn now() -> HostTime {
    let ms = timer::performance_now();
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "performance.now() returns small positive f64; µs fits in u64"
    )]
    let us = (ms * 1000.0) as u64;
    HostTime(us)
}
