//! Request-rate governor
//!
//! Bounds throughput with a fixed 60-second quota window and, independently,
//! caps how many tasks run at once. Quota exhaustion fails immediately with
//! the wait until the next window; excess concurrency queues in submission
//! order instead of failing.

use std::future::Future;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

use crate::error::SearchError;
use crate::types::RateLimiterStatus;

/// Fixed quota window length
pub const WINDOW_DURATION: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct Window {
    started: Instant,
    count: u32,
}

/// Quota window plus in-flight concurrency gate
///
/// The window counter is updated synchronously at dispatch, before any
/// suspension point, so concurrent callers cannot race past the quota.
#[derive(Debug)]
pub struct RateLimiter {
    window: Mutex<Window>,
    window_duration: Duration,
    max_requests: u32,
    inflight: Semaphore,
}

impl RateLimiter {
    #[must_use]
    pub fn new(max_requests: u32, max_concurrent: usize) -> Self {
        Self::with_window(max_requests, max_concurrent, WINDOW_DURATION)
    }

    /// Construct with a custom window length (shorter windows keep tests fast)
    #[must_use]
    pub fn with_window(max_requests: u32, max_concurrent: usize, window_duration: Duration) -> Self {
        Self {
            window: Mutex::new(Window {
                started: Instant::now(),
                count: 0,
            }),
            window_duration,
            max_requests,
            inflight: Semaphore::new(max_concurrent),
        }
    }

    /// Run `task` if the current window has remaining quota
    ///
    /// The counter is incremented before the task is awaited; if the
    /// concurrency cap is saturated the caller queues (FIFO) for a slot
    /// with its quota already consumed.
    ///
    /// # Errors
    ///
    /// `SearchError::RateLimitExceeded` carrying the wait until the next
    /// window when the quota is exhausted. Never retried internally.
    pub async fn execute<F, Fut, T>(&self, task: F) -> Result<T, SearchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.reserve()?;
        let _permit = self
            .inflight
            .acquire()
            .await
            .expect("rate limiter semaphore closed");
        Ok(task().await)
    }

    /// Consume one slot of window quota, rolling the window first when
    /// it has elapsed
    fn reserve(&self) -> Result<(), SearchError> {
        let mut window = self.window.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();

        if now.duration_since(window.started) >= self.window_duration {
            window.started = now;
            window.count = 0;
        }

        if window.count >= self.max_requests {
            let retry_after = self
                .window_duration
                .saturating_sub(now.duration_since(window.started));
            return Err(SearchError::RateLimitExceeded { retry_after });
        }

        window.count += 1;
        Ok(())
    }

    /// Snapshot of the current window; pure read, no mutation
    ///
    /// An elapsed-but-not-yet-rolled window reports as fresh, matching
    /// what the next `execute` call would observe.
    #[must_use]
    pub fn status(&self) -> RateLimiterStatus {
        let window = self.window.lock().unwrap_or_else(|e| e.into_inner());
        let elapsed = window.started.elapsed();

        if elapsed >= self.window_duration {
            return RateLimiterStatus {
                request_count: 0,
                max_requests: self.max_requests,
                reset_in: self.window_duration,
            };
        }

        RateLimiterStatus {
            request_count: window.count,
            max_requests: self.max_requests,
            reset_in: self.window_duration - elapsed,
        }
    }
}
