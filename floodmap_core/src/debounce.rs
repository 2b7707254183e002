// Copyright 2026 the Floodmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Quiescence-window coalescing for high-frequency inputs.
//!
//! An opacity slider can emit dozens of values per second. Each one updates
//! local state immediately (the preview stays live), but the expensive
//! downstream commit only fires once the input has been quiet for a full
//! window. Every submission cancels the pending commit and arms a new one.
//!
//! The debouncer holds no timer of its own; the host drives it with
//! [`HostTime`] ticks, which keeps the logic deterministic under test. On
//! the web backend the host arms a one-shot timer for
//! [`Debounce::deadline`] and calls [`Debounce::fire`] when it lands.

use crate::time::{Duration, HostTime};

/// Default quiescence window.
pub const DEFAULT_QUIESCENCE: Duration = Duration::from_millis(50);

/// Coalesces a stream of `T` values into one commit per quiet period.
#[derive(Debug)]
pub struct Debounce<T> {
    window: Duration,
    pending: Option<(T, HostTime)>,
}

impl<T> Default for Debounce<T> {
    fn default() -> Self {
        Self::new(DEFAULT_QUIESCENCE)
    }
}

impl<T> Debounce<T> {
    /// Creates a debouncer with the given quiescence window.
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self { window, pending: None }
    }

    /// Records a new value at `now`, replacing any pending one and pushing
    /// the deadline out by one full window.
    pub fn submit(&mut self, value: T, now: HostTime) {
        let deadline = now.checked_add(self.window).unwrap_or(HostTime(u64::MAX));
        self.pending = Some((value, deadline));
    }

    /// The instant the pending value becomes committable, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<HostTime> {
        self.pending.as_ref().map(|(_, d)| *d)
    }

    /// Whether a value is waiting to commit.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Takes the pending value if its window has elapsed by `now`.
    ///
    /// Returns `None` (and leaves the value pending) when called early, so a
    /// stale timer callback racing a fresh submission commits nothing.
    pub fn fire(&mut self, now: HostTime) -> Option<T> {
        if self.pending.as_ref().is_some_and(|(_, deadline)| now >= *deadline) {
            return self.pending.take().map(|(value, _)| value);
        }
        None
    }

    /// Drops any pending value without committing it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commits_after_quiet_window() {
        let mut d = Debounce::new(Duration::from_millis(50));
        d.submit(0.5_f32, HostTime(0));
        assert!(d.fire(HostTime(49_999)).is_none());
        assert_eq!(d.fire(HostTime(50_000)), Some(0.5));
        assert!(!d.is_armed());
    }

    #[test]
    fn resubmission_replaces_value_and_resets_window() {
        let mut d = Debounce::new(Duration::from_millis(50));
        d.submit(0.2_f32, HostTime(0));
        d.submit(0.7_f32, HostTime(30_000));
        // The first deadline has passed but the window was re-armed.
        assert!(d.fire(HostTime(50_000)).is_none());
        assert_eq!(d.fire(HostTime(80_000)), Some(0.7));
    }

    #[test]
    fn stale_timer_callback_commits_nothing() {
        let mut d = Debounce::new(Duration::from_millis(50));
        d.submit(1_u32, HostTime(0));
        d.submit(2_u32, HostTime(40_000));
        // Callback armed for the first submission lands; window not quiet.
        assert!(d.fire(HostTime(50_000)).is_none());
        assert!(d.is_armed());
    }

    #[test]
    fn cancel_discards_pending() {
        let mut d = Debounce::new(Duration::from_millis(50));
        d.submit(3_u8, HostTime(0));
        d.cancel();
        assert!(d.fire(HostTime(100_000)).is_none());
    }

    #[test]
    fn deadline_tracks_latest_submission() {
        let mut d = Debounce::<u8>::new(Duration::from_millis(50));
        assert!(d.deadline().is_none());
        d.submit(1, HostTime(10_000));
        assert_eq!(d.deadline(), Some(HostTime(60_000)));
        d.submit(2, HostTime(20_000));
        assert_eq!(d.deadline(), Some(HostTime(70_000)));
    }
}
