//! Outstanding-work counter for crawl termination.
//!
//! Every page task holds a [`TaskGuard`] for its whole lifetime. The guard is
//! created before the task is spawned and decrements the counter when it is
//! dropped, so early returns, fetch errors and panics all release it. When the
//! count reaches zero the coordinator waiting in [`Outstanding::wait_idle`] is
//! woken.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Shared count of page tasks that have been issued but not yet finished.
#[derive(Debug, Default)]
pub struct Outstanding {
    count: AtomicUsize,
    idle: Notify,
}

impl Outstanding {
    /// Creates a new, atomically reference-counted counter at zero.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers one more task and returns the guard that will release it.
    pub fn begin(self: &Arc<Self>) -> TaskGuard {
        self.count.fetch_add(1, Ordering::SeqCst);
        TaskGuard {
            outstanding: Arc::clone(self),
        }
    }

    /// Number of tasks currently outstanding.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Checks if no task is outstanding.
    pub fn is_idle(&self) -> bool {
        self.count() == 0
    }

    /// Waits until the outstanding count drops to zero.
    ///
    /// Once the count has reached zero it can only grow again from the
    /// caller, because new tasks are only issued by running tasks.
    pub async fn wait_idle(&self) {
        while !self.is_idle() {
            self.idle.notified().await;
        }
    }

    fn finish(&self) {
        if self.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            // notify_one stores a permit if the waiter has not parked yet
            self.idle.notify_one();
        }
    }
}

/// RAII handle for one outstanding task.
#[derive(Debug)]
pub struct TaskGuard {
    outstanding: Arc<Outstanding>,
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.outstanding.finish();
    }
}
