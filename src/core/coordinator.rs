//! Delivery countdown coordination
//!
//! A counting wait primitive for publish-then-wait-for-consume flows:
//! initialize with the expected number of deliveries, have each consumer
//! signal as it processes one, and suspend until the count drains or a
//! timeout elapses. No polling is involved. Useful for tests and for
//! warm-up gating in application startup.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::Notify;

/// Counting wait primitive over an expected number of deliveries.
///
/// `signal()` decrements the count, saturating at zero; signals beyond the
/// expected count are ignored. `wait()` suspends the caller until the count
/// reaches zero, and `wait_for()` bounds that suspension with a timeout.
///
/// # Example
///
/// ```rust,no_run
/// use relaymq::core::coordinator::DeliveryCoordinator;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # async fn example() {
/// let coordinator = Arc::new(DeliveryCoordinator::new(1));
///
/// let waiter = coordinator.clone();
/// let handle = tokio::spawn(async move {
///     waiter.wait_for(Duration::from_secs(10)).await
/// });
///
/// coordinator.signal();
/// assert!(handle.await.unwrap());
/// # }
/// ```
#[derive(Debug)]
pub struct DeliveryCoordinator {
    remaining: AtomicUsize,
    drained: Notify,
}

impl DeliveryCoordinator {
    /// Create a coordinator expecting `expected` deliveries.
    ///
    /// With `expected == 0` every wait returns immediately.
    pub fn new(expected: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(expected),
            drained: Notify::new(),
        }
    }

    /// Number of signals still outstanding.
    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }

    /// Record one delivery. Never blocks; never goes below zero.
    pub fn signal(&self) {
        let previous =
            self.remaining
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                    if current == 0 {
                        None
                    } else {
                        Some(current - 1)
                    }
                });

        // Only the signal that drains the count wakes the waiters.
        if previous == Ok(1) {
            self.drained.notify_waiters();
        }
    }

    /// Suspend until the count reaches zero.
    pub async fn wait(&self) {
        loop {
            // Register for notification before checking the count, so a
            // signal racing between the check and the await is not lost.
            let drained = self.drained.notified();
            tokio::pin!(drained);
            drained.as_mut().enable();
            if self.remaining.load(Ordering::Acquire) == 0 {
                return;
            }
            drained.await;
        }
    }

    /// Suspend until the count reaches zero or the timeout elapses.
    ///
    /// Returns `true` when the count drained, `false` on timeout.
    pub async fn wait_for(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.wait()).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::time::{timeout, Duration};

    #[tokio::test]
    async fn test_signal_unblocks_concurrent_wait() {
        let coordinator = Arc::new(DeliveryCoordinator::new(1));

        let waiter = coordinator.clone();
        let handle =
            tokio::spawn(async move { waiter.wait_for(Duration::from_secs(5)).await });

        // Give the waiter a chance to park before signalling
        tokio::task::yield_now().await;
        coordinator.signal();

        let drained = timeout(Duration::from_secs(1), handle)
            .await
            .expect("waiter did not finish")
            .expect("waiter task panicked");
        assert!(drained);
    }

    #[tokio::test]
    async fn test_wait_for_times_out_without_signal() {
        let coordinator = DeliveryCoordinator::new(1);

        let drained = coordinator.wait_for(Duration::from_millis(50)).await;

        assert!(!drained);
        assert_eq!(coordinator.remaining(), 1);
    }

    #[tokio::test]
    async fn test_extra_signals_are_ignored() {
        let coordinator = DeliveryCoordinator::new(2);

        coordinator.signal();
        coordinator.signal();
        coordinator.signal(); // beyond the expected count

        assert_eq!(coordinator.remaining(), 0);
        assert!(coordinator.wait_for(Duration::from_millis(10)).await);
    }

    #[tokio::test]
    async fn test_zero_expected_waits_return_immediately() {
        let coordinator = DeliveryCoordinator::new(0);

        assert!(coordinator.wait_for(Duration::from_millis(10)).await);
        assert_eq!(coordinator.remaining(), 0);
    }

    #[tokio::test]
    async fn test_signal_before_wait_is_not_lost() {
        let coordinator = DeliveryCoordinator::new(1);

        coordinator.signal();

        // The count already drained, so the wait must not park
        assert!(coordinator.wait_for(Duration::from_millis(10)).await);
    }

    #[tokio::test]
    async fn test_multiple_waiters_all_wake() {
        let coordinator = Arc::new(DeliveryCoordinator::new(1));

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let waiter = coordinator.clone();
                tokio::spawn(async move { waiter.wait_for(Duration::from_secs(5)).await })
            })
            .collect();

        tokio::task::yield_now().await;
        coordinator.signal();

        for handle in handles {
            let drained = timeout(Duration::from_secs(1), handle)
                .await
                .expect("waiter did not finish")
                .expect("waiter task panicked");
            assert!(drained);
        }
    }
}
