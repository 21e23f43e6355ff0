//! Completion barrier for the recursive crawl
//!
//! Every unit of work holds a [`WorkGuard`] obtained from
//! [`CompletionBarrier::register`]. Dropping the guard marks the unit finished,
//! so a task that returns early, errors, or panics still signals exactly once.
//! [`CompletionBarrier::wait`] resolves once the outstanding count is zero.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Counts units of work that have been registered but not yet finished
#[derive(Debug, Default)]
pub struct CompletionBarrier {
    outstanding: AtomicUsize,
    notify: Notify,
}

/// Registration of one unit of outstanding work
///
/// Must be created before the work is launched; released on drop.
#[derive(Debug)]
#[must_use = "dropping a WorkGuard immediately marks the work as finished"]
pub struct WorkGuard {
    barrier: Arc<CompletionBarrier>,
}

impl CompletionBarrier {
    /// Creates a barrier with nothing outstanding
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers one unit of outstanding work
    pub fn register(self: &Arc<Self>) -> WorkGuard {
        self.outstanding.fetch_add(1, Ordering::AcqRel);
        WorkGuard {
            barrier: Arc::clone(self),
        }
    }

    /// Returns the number of units not yet finished
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    /// Waits until every registered unit has finished
    ///
    /// Returns immediately if nothing is outstanding.
    pub async fn wait(&self) {
        loop {
            // Created before the check so a release racing with it is not lost
            let notified = self.notify.notified();
            if self.outstanding() == 0 {
                return;
            }
            notified.await;
        }
    }

    fn release(&self) {
        if self.outstanding.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.notify.notify_waiters();
        }
    }
}

impl Drop for WorkGuard {
    fn drop(&mut self) {
        self.barrier.release();
    }
}
