//! Backpressure handling for result streams.
//!
//! When the output transport cannot keep up (a slow serial console, a
//! saturated pipe), the host raises a [`BackpressureSignal`]. A stream
//! wrapped in [`RateLimited`] reacts by dropping results: each signal
//! doubles an adaptive modulo and from then on only every Nth item passes,
//! so pressure is relieved progressively rather than reset. Commands that
//! implement no backpressure handling of their own are aborted with
//! [`CommandError::should_throttle`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::warn;

use crate::error::CommandError;

/// A shared flag the output transport raises when it falls behind.
#[derive(Debug, Clone, Default)]
pub struct BackpressureSignal {
    raised: Arc<AtomicBool>,
}

impl BackpressureSignal {
    /// Creates a signal in the relaxed state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the signal. The next item pulled through a [`RateLimited`]
    /// wrapper tightens its rate limit.
    pub fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }

    /// Takes the signal, resetting it to relaxed.
    fn take(&self) -> bool {
        self.raised.swap(false, Ordering::SeqCst)
    }

    /// Returns an error instructing the producing command to reduce its
    /// output rate. For hosts that abort instead of rate-limiting.
    pub fn as_error(&self) -> CommandError {
        CommandError::should_throttle()
    }
}

/// An iterator adapter that drops items under backpressure.
///
/// Until the first signal every item passes. Each signal doubles the
/// modulo; afterwards only items whose index is divisible by it pass. The
/// modulo never shrinks back, so a transport that keeps signalling keeps
/// receiving progressively fewer items.
pub struct RateLimited<I> {
    inner: I,
    signal: BackpressureSignal,
    index: u64,
    modulo: u64,
}

impl<I> RateLimited<I> {
    /// Wraps a stream, watching the given signal.
    pub fn new(inner: I, signal: BackpressureSignal) -> Self {
        Self {
            inner,
            signal,
            index: 0,
            modulo: 1,
        }
    }

    /// Returns the current rate limit: 1 means every item passes.
    pub fn current_modulo(&self) -> u64 {
        self.modulo
    }
}

impl<I: Iterator> Iterator for RateLimited<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let item = self.inner.next()?;
            if self.signal.take() {
                self.modulo = self.modulo.saturating_mul(2);
                warn!(modulo = self.modulo, "backpressure signalled, tightening rate limit");
            }
            let index = self.index;
            self.index += 1;
            if index % self.modulo == 0 {
                return Some(item);
            }
        }
    }
}
