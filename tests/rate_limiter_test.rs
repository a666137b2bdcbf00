// Window quota and concurrency-cap behavior of the rate limiter
use scour::SearchError;
use scour::rate_limiter::RateLimiter;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[tokio::test]
async fn quota_exhaustion_fails_immediately_with_wait_time() {
    let limiter = RateLimiter::new(3, 5);

    for _ in 0..3 {
        let outcome = limiter.execute(|| async { 1 }).await;
        assert!(outcome.is_ok());
    }

    let denied = limiter.execute(|| async { 1 }).await;
    match denied {
        Err(SearchError::RateLimitExceeded { retry_after }) => {
            assert!(retry_after <= Duration::from_secs(60));
            assert!(retry_after > Duration::ZERO);
        }
        other => panic!("expected RateLimitExceeded, got {other:?}"),
    }
}

#[tokio::test]
async fn window_rollover_restores_quota() {
    let limiter = RateLimiter::with_window(1, 5, Duration::from_millis(50));

    assert!(limiter.execute(|| async { () }).await.is_ok());
    assert!(matches!(
        limiter.execute(|| async { () }).await,
        Err(SearchError::RateLimitExceeded { .. })
    ));

    tokio::time::sleep(Duration::from_millis(60)).await;

    assert!(limiter.execute(|| async { () }).await.is_ok());
}

#[tokio::test]
async fn concurrency_cap_bounds_in_flight_tasks() {
    let limiter = Arc::new(RateLimiter::new(100, 2));
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..6 {
        let limiter = Arc::clone(&limiter);
        let running = Arc::clone(&running);
        let peak = Arc::clone(&peak);
        handles.push(tokio::spawn(async move {
            limiter
                .execute(|| async {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(30)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                })
                .await
        }));
    }

    for handle in handles {
        assert!(handle.await.expect("task panicked").is_ok());
    }

    assert!(peak.load(Ordering::SeqCst) <= 2);
}

#[tokio::test]
async fn counter_increments_before_task_runs() {
    // The quota is consumed at dispatch, even while the task is queued
    // behind the concurrency cap, so racers cannot slip past it.
    let limiter = Arc::new(RateLimiter::new(2, 1));

    let slow = {
        let limiter = Arc::clone(&limiter);
        tokio::spawn(async move {
            limiter
                .execute(|| async {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                })
                .await
        })
    };

    // Give the first task time to occupy the single concurrency slot.
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(limiter.status().request_count, 1);

    let queued = {
        let limiter = Arc::clone(&limiter);
        tokio::spawn(async move { limiter.execute(|| async {}).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    // Second dispatch is queued, not running, yet already counted.
    assert_eq!(limiter.status().request_count, 2);

    // Third dispatch exceeds the quota although nothing has finished.
    assert!(matches!(
        limiter.execute(|| async {}).await,
        Err(SearchError::RateLimitExceeded { .. })
    ));

    assert!(slow.await.expect("task panicked").is_ok());
    assert!(queued.await.expect("task panicked").is_ok());
}

#[tokio::test]
async fn status_reads_without_mutating() {
    let limiter = RateLimiter::new(10, 5);

    limiter.execute(|| async {}).await.expect("within quota");
    limiter.execute(|| async {}).await.expect("within quota");

    let first = limiter.status();
    let second = limiter.status();

    assert_eq!(first.request_count, 2);
    assert_eq!(second.request_count, 2);
    assert_eq!(first.max_requests, 10);
    assert!(first.reset_in <= Duration::from_secs(60));
}
