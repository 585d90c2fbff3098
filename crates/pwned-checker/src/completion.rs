//! Outstanding work counter

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;

/// Counts items between dispatch and the end of processing
///
/// `add` is called before an item is handed to the queue, `done` once a
/// worker has finished with it. `wait` returns when the count is zero.
#[derive(Debug, Default)]
pub struct CompletionCounter {
    pending: AtomicUsize,
    idle: Notify,
}

impl CompletionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, n: usize) {
        self.pending.fetch_add(n, Ordering::SeqCst);
    }

    pub fn done(&self) {
        let previous = self.pending.fetch_sub(1, Ordering::SeqCst);
        debug_assert!(previous > 0, "completion counter underflow");
        if previous == 1 {
            self.idle.notify_waiters();
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Wait until every added item has been marked done
    pub async fn wait(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            // Register before checking so a concurrent `done` is not missed.
            notified.as_mut().enable();
            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }
}
