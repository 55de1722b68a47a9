//! Polling helpers for asserting on work that happens in spawned tasks.

use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};

pub struct TestEnv;

impl TestEnv {
    /// Poll `condition` until it holds or `timeout` elapses.
    pub async fn wait_for<F, Fut>(mut condition: F, timeout: Duration) -> bool
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = bool>,
    {
        Self::wait_for_with_interval(&mut condition, timeout, Duration::from_millis(10)).await
    }

    pub async fn wait_for_with_interval<F, Fut>(
        mut condition: F,
        timeout: Duration,
        poll_interval: Duration,
    ) -> bool
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = bool>,
    {
        let deadline = Instant::now() + timeout;

        loop {
            if condition().await {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            sleep(poll_interval).await;
        }
    }

    /// Synchronous variant for flags and counters.
    pub async fn wait_until<F>(mut condition: F, timeout: Duration) -> bool
    where
        F: FnMut() -> bool,
    {
        Self::wait_for(move || std::future::ready(condition()), timeout).await
    }
}

/// Wait until `current` reports `expected`, e.g. a widget finishing the
/// initialization the factory spawned.
pub async fn wait_for_state<S, F>(mut current: F, expected: S, timeout: Duration) -> bool
where
    S: PartialEq,
    F: FnMut() -> S,
{
    TestEnv::wait_until(move || current() == expected, timeout).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_wait_until_sees_spawned_update() {
        let counter = Arc::new(AtomicUsize::new(0));
        let writer = counter.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(20)).await;
            writer.store(3, Ordering::SeqCst);
        });

        let reached = TestEnv::wait_until(
            || counter.load(Ordering::SeqCst) == 3,
            Duration::from_secs(1),
        )
        .await;
        assert!(reached);
    }

    #[tokio::test]
    async fn test_wait_until_times_out() {
        let reached = TestEnv::wait_until(|| false, Duration::from_millis(30)).await;
        assert!(!reached);
    }
}
