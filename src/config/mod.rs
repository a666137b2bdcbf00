//! Process-wide configuration
//!
//! One immutable `SearchConfig` is built at startup and passed by
//! reference into the orchestrator, pool, and extractor constructors;
//! no component reads ambient global state.

pub mod builder;

pub use builder::SearchConfigBuilder;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::engines::EngineKind;

/// Chrome user agent presented by both HTTP fetches and pooled browsers
///
/// Updated 2026-01 to Chrome 143 (current stable).
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/143.0.0.0 Safari/537.36";

/// Immutable configuration for the whole search/extraction pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub(crate) engines: Vec<EngineKind>,
    pub(crate) max_results_cap: usize,
    pub(crate) search_timeout: Duration,
    pub(crate) attempt_timeout_cap: Duration,
    pub(crate) acceptance_threshold: f64,
    pub(crate) excellent_threshold: f64,
    pub(crate) scoring_enabled: bool,
    pub(crate) force_multi_engine: bool,
    pub(crate) max_query_length: usize,
    pub(crate) max_requests_per_minute: u32,
    pub(crate) max_concurrent_requests: usize,
    pub(crate) headless: bool,
    pub(crate) browser_executable: Option<PathBuf>,
    pub(crate) max_browser_families: usize,
    pub(crate) browser_retry_backoff: Duration,
    pub(crate) user_agent: String,
    pub(crate) extract_timeout: Duration,
    pub(crate) max_content_length: usize,
    pub(crate) min_content_length: usize,
    pub(crate) extract_concurrency: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfigBuilder::default()
            .build()
            .unwrap_or_else(|_| unreachable!("builder defaults are valid"))
    }
}

impl SearchConfig {
    #[must_use]
    pub fn builder() -> SearchConfigBuilder {
        SearchConfigBuilder::default()
    }

    /// Engine fallback chain in priority order
    #[must_use]
    pub fn engines(&self) -> &[EngineKind] {
        &self.engines
    }

    #[must_use]
    pub fn max_results_cap(&self) -> usize {
        self.max_results_cap
    }

    #[must_use]
    pub fn search_timeout(&self) -> Duration {
        self.search_timeout
    }

    /// Hard cap on a single engine attempt, regardless of overall budget
    #[must_use]
    pub fn attempt_timeout_cap(&self) -> Duration {
        self.attempt_timeout_cap
    }

    /// Minimum set score a non-first engine needs to end the fallback early
    #[must_use]
    pub fn acceptance_threshold(&self) -> f64 {
        self.acceptance_threshold
    }

    /// Set score at which any engine's results are returned immediately
    #[must_use]
    pub fn excellent_threshold(&self) -> f64 {
        self.excellent_threshold
    }

    #[must_use]
    pub fn scoring_enabled(&self) -> bool {
        self.scoring_enabled
    }

    /// When set, even an excellent first result does not short-circuit
    /// the remaining engines
    #[must_use]
    pub fn force_multi_engine(&self) -> bool {
        self.force_multi_engine
    }

    #[must_use]
    pub fn max_query_length(&self) -> usize {
        self.max_query_length
    }

    #[must_use]
    pub fn max_requests_per_minute(&self) -> u32 {
        self.max_requests_per_minute
    }

    #[must_use]
    pub fn max_concurrent_requests(&self) -> usize {
        self.max_concurrent_requests
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    /// Explicit browser binary; when unset, platform paths are searched
    #[must_use]
    pub fn browser_executable(&self) -> Option<&PathBuf> {
        self.browser_executable.as_ref()
    }

    /// Distinct browser families cached before FIFO eviction kicks in
    #[must_use]
    pub fn max_browser_families(&self) -> usize {
        self.max_browser_families
    }

    #[must_use]
    pub fn browser_retry_backoff(&self) -> Duration {
        self.browser_retry_backoff
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    #[must_use]
    pub fn extract_timeout(&self) -> Duration {
        self.extract_timeout
    }

    #[must_use]
    pub fn max_content_length(&self) -> usize {
        self.max_content_length
    }

    /// Below this many characters of cleaned text, a lightweight fetch is
    /// judged low-quality and escalated to browser rendering
    #[must_use]
    pub fn min_content_length(&self) -> usize {
        self.min_content_length
    }

    #[must_use]
    pub fn extract_concurrency(&self) -> usize {
        self.extract_concurrency
    }
}
