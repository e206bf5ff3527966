//! Bounded-concurrency request limiter.
//!
//! Wraps a counting semaphore for gateways with licensed concurrency caps.
//! Acquisition waits up to a bounded interval and then reports a throttled
//! outcome instead of queuing indefinitely.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error::Error;

/// Usage statistics snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottleStats {
    pub total_requests: u64,
    pub throttled_requests: u64,
    pub peak_concurrent: u64,
    pub max_concurrent: usize,
}

#[derive(Debug, Default)]
struct Counters {
    total: AtomicU64,
    throttled: AtomicU64,
    in_flight: AtomicU64,
    peak: AtomicU64,
}

/// Counting-semaphore limiter with a bounded acquire wait.
#[derive(Clone)]
pub struct RequestLimiter {
    semaphore: Arc<Semaphore>,
    max_concurrent: usize,
    max_wait: Duration,
    counters: Arc<Counters>,
}

impl RequestLimiter {
    pub fn new(max_concurrent: usize, max_wait: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
            max_wait,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Acquire a request slot, waiting at most the configured bound.
    ///
    /// Returns [`Error::Throttled`] when no slot frees up in time; the
    /// caller reports that outcome instead of blocking further.
    pub async fn acquire(&self) -> Result<RequestPermit, Error> {
        let permit = match tokio::time::timeout(
            self.max_wait,
            self.semaphore.clone().acquire_owned(),
        )
        .await
        {
            Ok(Ok(permit)) => permit,
            // Elapsed, or semaphore closed (never happens here).
            _ => {
                self.counters.throttled.fetch_add(1, Ordering::Relaxed);
                return Err(Error::Throttled);
            }
        };

        self.counters.total.fetch_add(1, Ordering::Relaxed);
        let current = self.counters.in_flight.fetch_add(1, Ordering::Relaxed) + 1;
        self.counters.peak.fetch_max(current, Ordering::Relaxed);

        Ok(RequestPermit {
            _permit: permit,
            counters: self.counters.clone(),
        })
    }

    pub fn stats(&self) -> ThrottleStats {
        ThrottleStats {
            total_requests: self.counters.total.load(Ordering::Relaxed),
            throttled_requests: self.counters.throttled.load(Ordering::Relaxed),
            peak_concurrent: self.counters.peak.load(Ordering::Relaxed),
            max_concurrent: self.max_concurrent,
        }
    }
}

/// Held for the duration of one limited request.
#[derive(Debug)]
pub struct RequestPermit {
    _permit: OwnedSemaphorePermit,
    counters: Arc<Counters>,
}

impl Drop for RequestPermit {
    fn drop(&mut self) {
        self.counters.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn acquire_and_release_tracks_stats() {
        let limiter = RequestLimiter::new(2, Duration::from_millis(10));

        let a = limiter.acquire().await.unwrap();
        let b = limiter.acquire().await.unwrap();
        drop(a);
        drop(b);

        let stats = limiter.stats();
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.throttled_requests, 0);
        assert_eq!(stats.peak_concurrent, 2);
        assert_eq!(stats.max_concurrent, 2);
    }

    #[tokio::test]
    async fn saturated_limiter_reports_throttled() {
        let limiter = RequestLimiter::new(1, Duration::from_millis(10));

        let _held = limiter.acquire().await.unwrap();
        let err = limiter.acquire().await.unwrap_err();
        assert!(matches!(err, Error::Throttled));
        assert_eq!(limiter.stats().throttled_requests, 1);
    }

    #[tokio::test]
    async fn slot_frees_after_permit_drop() {
        let limiter = RequestLimiter::new(1, Duration::from_millis(10));

        let held = limiter.acquire().await.unwrap();
        drop(held);
        assert!(limiter.acquire().await.is_ok());
    }
}
