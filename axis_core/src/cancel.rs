//! Cancellable wait used as the control loop's suspension point
//!
//! A [`CancelToken`] is shared between the thread running a move and any
//! thread that may want to abort it. Cancelling wakes a pending
//! [`CancelToken::sleep`] immediately instead of letting it run out the
//! loop period.

use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Default)]
struct Inner {
    cancelled: Mutex<bool>,
    wake: Condvar,
}

/// Shared cancellation flag with an interruptible sleep
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation and wake any sleeper
    pub fn cancel(&self) {
        let mut cancelled = self.inner.cancelled.lock();
        *cancelled = true;
        self.inner.wake.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.cancelled.lock()
    }

    /// Clear a previous cancellation so the token can guard another move
    pub fn reset(&self) {
        *self.inner.cancelled.lock() = false;
    }

    /// Block for `period` or until cancelled, whichever comes first.
    ///
    /// Returns `true` if the token is cancelled when the wait ends.
    pub fn sleep(&self, period: Duration) -> bool {
        let mut cancelled = self.inner.cancelled.lock();
        if period.is_zero() {
            return *cancelled;
        }

        let deadline = Instant::now() + period;
        while !*cancelled {
            if self.inner.wake.wait_until(&mut cancelled, deadline).timed_out() {
                break;
            }
        }
        *cancelled
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
