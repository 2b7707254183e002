// Copyright 2026 the Floodmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `setTimeout` one-shot timer.
//!
//! [`OneShotTimer`] fires a callback once after a delay, with arm-replaces-
//! pending semantics matching the core debouncer: arming while a timeout is
//! outstanding cancels it first, so at most one callback is ever scheduled.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use floodmap_core::time::Duration;

// Direct global bindings instead of `web_sys::Window` methods — avoids
// fetching (and unwrapping) the Window object on every call.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    pub(crate) fn performance_now() -> f64;

    #[wasm_bindgen(js_name = "setTimeout")]
    fn set_timeout(callback: &JsValue, delay_ms: f64) -> i32;

    #[wasm_bindgen(js_name = "clearTimeout")]
    fn clear_timeout(id: i32);
}

type TimerClosure = Closure<dyn FnMut()>;

struct TimerInner {
    /// The user-supplied callback invoked when the timeout lands.
    callback: RefCell<Box<dyn FnMut()>>,

    /// The JS closure currently registered with `setTimeout`, if armed.
    closure: RefCell<Option<TimerClosure>>,

    /// The ID of the outstanding timeout, used by `clearTimeout`.
    timeout_id: Cell<i32>,

    /// Whether a timeout is outstanding.
    armed: Cell<bool>,
}

/// A cancel-and-rearm one-shot timer over `setTimeout`.
pub struct OneShotTimer {
    inner: Rc<TimerInner>,
}

impl OneShotTimer {
    /// Creates a timer that is **not yet armed**.
    ///
    /// `callback` runs once per [`arm`](Self::arm) that is not superseded
    /// before its delay elapses.
    pub fn new(callback: impl FnMut() + 'static) -> Self {
        Self {
            inner: Rc::new(TimerInner {
                callback: RefCell::new(Box::new(callback)),
                closure: RefCell::new(None),
                timeout_id: Cell::new(0),
                armed: Cell::new(false),
            }),
        }
    }

    /// Schedules the callback after `delay`, cancelling any pending timeout.
    pub fn arm(&self, delay: Duration) {
        self.cancel();
        self.inner.armed.set(true);

        let inner = Rc::clone(&self.inner);
        let closure = Closure::wrap(Box::new(move || {
            if !inner.armed.get() {
                return;
            }
            inner.armed.set(false);
            inner.callback.borrow_mut()();
        }) as Box<dyn FnMut()>);

        #[expect(
            clippy::cast_precision_loss,
            reason = "delays are tens of milliseconds; µs fits in f64 exactly"
        )]
        let delay_ms = delay.ticks() as f64 / 1000.0;
        let id = set_timeout(closure.as_ref().unchecked_ref(), delay_ms);
        self.inner.timeout_id.set(id);
        *self.inner.closure.borrow_mut() = Some(closure);
    }

    /// Cancels the pending timeout, if any.
    pub fn cancel(&self) {
        if !self.inner.armed.get() {
            return;
        }
        self.inner.armed.set(false);
        clear_timeout(self.inner.timeout_id.get());
        self.inner.closure.borrow_mut().take();
    }

    /// Returns `true` if a timeout is outstanding.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.inner.armed.get()
    }
}

impl Drop for OneShotTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl core::fmt::Debug for OneShotTimer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OneShotTimer")
            .field("armed", &self.inner.armed.get())
            .finish()
    }
}
