// Configuration defaults and builder validation
use scour::{EngineKind, SearchConfig};
use std::time::Duration;

#[test]
fn defaults_match_the_tuned_constants() {
    let config = SearchConfig::default();

    assert_eq!(
        config.engines(),
        &[EngineKind::Bing, EngineKind::DuckDuckGo, EngineKind::Brave]
    );
    assert_eq!(config.acceptance_threshold(), 0.3);
    assert_eq!(config.excellent_threshold(), 0.8);
    assert!(config.scoring_enabled());
    assert!(!config.force_multi_engine());
    assert_eq!(config.max_requests_per_minute(), 30);
    assert_eq!(config.max_concurrent_requests(), 5);
    assert_eq!(config.attempt_timeout_cap(), Duration::from_secs(10));
    assert!(config.headless());
    assert_eq!(config.max_browser_families(), 3);
}

#[test]
fn builder_overrides_stick() {
    let config = SearchConfig::builder()
        .engines(vec![EngineKind::Brave])
        .acceptance_threshold(0.4)
        .max_requests_per_minute(10)
        .headless(false)
        .max_content_length(2000)
        .build()
        .expect("valid config");

    assert_eq!(config.engines(), &[EngineKind::Brave]);
    assert_eq!(config.acceptance_threshold(), 0.4);
    assert_eq!(config.max_requests_per_minute(), 10);
    assert!(!config.headless());
    assert_eq!(config.max_content_length(), 2000);
}

#[test]
fn out_of_range_thresholds_are_rejected() {
    assert!(SearchConfig::builder().acceptance_threshold(1.5).build().is_err());
    assert!(SearchConfig::builder().excellent_threshold(-0.1).build().is_err());
}

#[test]
fn zero_quotas_are_rejected() {
    assert!(SearchConfig::builder().max_requests_per_minute(0).build().is_err());
    assert!(SearchConfig::builder().max_concurrent_requests(0).build().is_err());
    assert!(SearchConfig::builder().max_browser_families(0).build().is_err());
    assert!(SearchConfig::builder().engines(Vec::new()).build().is_err());
}
