// Debounced search
//
// Each call takes a ticket. A request is sent only if no newer call arrived
// during the delay, and its response is delivered only if no newer call
// arrived while it was in flight.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    generation: Arc<AtomicU64>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }

    /// Wait out the delay, then run `fetch` unless superseded.
    /// Returns `None` when a newer call took over before or during the request.
    pub async fn run<F, Fut, T>(&self, fetch: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        tokio::time::sleep(self.delay).await;
        if !self.is_current(ticket) {
            debug!(ticket, "Search superseded before request");
            return None;
        }

        let result = fetch().await;
        if !self.is_current(ticket) {
            debug!(ticket, "Discarding stale search response");
            return None;
        }
        Some(result)
    }

    /// Invalidate every pending or in-flight call
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test(start_paused = true)]
    async fn test_rapid_calls_send_one_request() {
        let debouncer = Debouncer::new(Duration::from_millis(500));
        let calls = Arc::new(AtomicUsize::new(0));

        let fetch = |term: &'static str| {
            let calls = calls.clone();
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                term
            }
        };

        let first = debouncer.run(fetch("a"));
        let second = async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            debouncer.run(fetch("ab")).await
        };
        let (first, second) = tokio::join!(first, second);

        assert_eq!(first, None);
        assert_eq!(second, Some("ab"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_in_flight_response_is_dropped() {
        let debouncer = Debouncer::new(Duration::from_millis(500));
        let calls = Arc::new(AtomicUsize::new(0));

        let slow = {
            let calls = calls.clone();
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(2)).await;
                "old"
            }
        };
        let fast = {
            let calls = calls.clone();
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                "new"
            }
        };

        let first = debouncer.run(slow);
        let second = async {
            // past the first delay, while its request is in flight
            tokio::time::sleep(Duration::from_millis(700)).await;
            debouncer.run(fast).await
        };
        let (first, second) = tokio::join!(first, second);

        assert_eq!(first, None);
        assert_eq!(second, Some("new"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_call() {
        let debouncer = Debouncer::default();
        let pending = debouncer.run(|| async { 1 });
        let cancel = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            debouncer.cancel();
        };
        let (result, _) = tokio::join!(pending, cancel);
        assert_eq!(result, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_call_delivers() {
        let debouncer = Debouncer::new(Duration::from_millis(50));
        assert_eq!(debouncer.run(|| async { 7 }).await, Some(7));
    }
}
