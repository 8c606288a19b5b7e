//! Countdown latch used by the coordinator to learn when every task of a
//! batch has finished.
//!
//! Each task holds a [`CompletionGuard`]; dropping it counts one completion.
//! Because the decrement lives in `Drop`, it runs on every exit path of the
//! task, including early returns, panics and aborts.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;

struct Inner {
    remaining: AtomicUsize,
    notify: Notify,
}

/// Tracks how many of N tasks are still outstanding.
#[derive(Clone)]
pub struct CompletionSignal {
    inner: Arc<Inner>,
}

impl CompletionSignal {
    /// Latch expecting `expected` completions
    pub fn new(expected: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                remaining: AtomicUsize::new(expected),
                notify: Notify::new(),
            }),
        }
    }

    /// Hand out one completion token.
    ///
    /// Callers create exactly as many guards as the latch expects; extra
    /// guards are harmless because the count saturates at zero.
    pub fn guard(&self) -> CompletionGuard {
        CompletionGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Completions still outstanding
    pub fn remaining(&self) -> usize {
        self.inner.remaining.load(Ordering::Acquire)
    }

    /// Whether every expected completion has been observed
    pub fn is_complete(&self) -> bool {
        self.remaining() == 0
    }

    /// Suspend until the count reaches zero. Returns immediately if it
    /// already has.
    pub async fn wait(&self) {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            // Register before checking so a completion between the check and
            // the await is not missed.
            notified.as_mut().enable();

            if self.is_complete() {
                return;
            }
            notified.await;
        }
    }
}

impl std::fmt::Debug for CompletionSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionSignal")
            .field("remaining", &self.remaining())
            .finish()
    }
}

/// Counts one completion when dropped.
#[must_use = "dropping the guard immediately counts the task as finished"]
pub struct CompletionGuard {
    inner: Arc<Inner>,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        let previous = self
            .inner
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));

        if previous == Ok(1) {
            self.inner.notify.notify_waiters();
        }
    }
}
