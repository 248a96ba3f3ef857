//! Outstanding remote operation counter

use std::sync::Arc;
use tokio::sync::watch;

/// Counts fetches and updates that have not settled
///
/// Each operation holds an [`InFlightGuard`] from [`begin`](Self::begin) until
/// it settles. Dropping the guard decrements the count exactly once, so the
/// counter returns to zero even when the awaiting future is dropped.
#[derive(Debug, Clone)]
pub struct InFlightCounter {
    count: Arc<watch::Sender<usize>>,
}

impl InFlightCounter {
    /// Create counter at zero
    #[must_use]
    pub fn new() -> Self {
        let (count, _) = watch::channel(0);
        Self {
            count: Arc::new(count),
        }
    }

    /// Mark one operation outstanding
    #[must_use = "the operation settles when the guard is dropped"]
    pub fn begin(&self) -> InFlightGuard {
        self.count.send_modify(|count| *count += 1);
        tracing::trace!(in_flight = *self.count.borrow(), "operation started");
        InFlightGuard {
            count: Arc::clone(&self.count),
        }
    }

    /// Outstanding operations now
    #[inline]
    #[must_use]
    pub fn current(&self) -> usize {
        *self.count.borrow()
    }

    /// Receive every count change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.count.subscribe()
    }

    /// Wait until no operation is outstanding
    pub async fn settled(&self) {
        let mut receiver = self.count.subscribe();
        // the sender lives in self, so the channel cannot close here
        let _ = receiver.wait_for(|count| *count == 0).await;
    }
}

impl Default for InFlightCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// One outstanding operation
#[derive(Debug)]
pub struct InFlightGuard {
    count: Arc<watch::Sender<usize>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.count
            .send_modify(|count| *count = count.saturating_sub(1));
        tracing::trace!(in_flight = *self.count.borrow(), "operation settled");
    }
}
