// Browser pool lifecycle. Most of this needs a real Chrome, so the
// process-level tests are manual smoke checks; the mapping and
// empty-pool paths run everywhere.
use scour::{BrowserPool, EngineFamily, EngineKind, SearchConfig};
use std::sync::Arc;

#[test]
fn every_engine_maps_to_its_own_family() {
    assert_eq!(EngineFamily::from(EngineKind::Bing), EngineFamily::Bing);
    assert_eq!(
        EngineFamily::from(EngineKind::DuckDuckGo),
        EngineFamily::DuckDuckGo
    );
    assert_eq!(EngineFamily::from(EngineKind::Brave), EngineFamily::Brave);
}

#[tokio::test]
async fn release_all_on_an_empty_pool_is_a_no_op() {
    let pool = BrowserPool::new(Arc::new(SearchConfig::default()));
    pool.release_all().await;
    assert_eq!(pool.cached_families().await, 0);
}

#[tokio::test]
async fn invalidate_on_a_missing_family_is_a_no_op() {
    let pool = BrowserPool::new(Arc::new(SearchConfig::default()));
    pool.invalidate(EngineFamily::Bing).await;
    assert_eq!(pool.cached_families().await, 0);
}

#[tokio::test]
#[ignore] // requires an installed browser
async fn acquiring_the_same_family_twice_reuses_the_instance() {
    let pool = BrowserPool::new(Arc::new(SearchConfig::default()));

    let first = pool.acquire(EngineFamily::Bing).await.expect("launch");
    let second = pool.acquire(EngineFamily::Bing).await.expect("reuse");

    // Same underlying process, never launched twice needlessly.
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(pool.cached_families().await, 1);

    pool.release_all().await;
    assert_eq!(pool.cached_families().await, 0);
}

#[tokio::test]
#[ignore] // requires an installed browser
async fn oldest_family_is_evicted_past_the_cap() {
    let config = Arc::new(
        SearchConfig::builder()
            .max_browser_families(2)
            .build()
            .expect("valid config"),
    );
    let pool = BrowserPool::new(config);

    pool.acquire(EngineFamily::Bing).await.expect("launch");
    pool.acquire(EngineFamily::DuckDuckGo).await.expect("launch");
    pool.acquire(EngineFamily::Extractor).await.expect("launch");

    // Bing was inserted first, so it is the one that went.
    assert_eq!(pool.cached_families().await, 2);

    pool.release_all().await;
}
