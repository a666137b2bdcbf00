//! Fluent builder for `SearchConfig`
//!
//! Every field has a usable default; `build()` validates the numeric
//! ranges and freezes the result.

use anyhow::{Result, bail};
use std::path::PathBuf;
use std::time::Duration;

use super::{DEFAULT_USER_AGENT, SearchConfig};
use crate::engines::EngineKind;

pub struct SearchConfigBuilder {
    engines: Vec<EngineKind>,
    max_results_cap: usize,
    search_timeout: Duration,
    attempt_timeout_cap: Duration,
    acceptance_threshold: f64,
    excellent_threshold: f64,
    scoring_enabled: bool,
    force_multi_engine: bool,
    max_query_length: usize,
    max_requests_per_minute: u32,
    max_concurrent_requests: usize,
    headless: bool,
    browser_executable: Option<PathBuf>,
    max_browser_families: usize,
    browser_retry_backoff: Duration,
    user_agent: String,
    extract_timeout: Duration,
    max_content_length: usize,
    min_content_length: usize,
    extract_concurrency: usize,
}

impl Default for SearchConfigBuilder {
    fn default() -> Self {
        Self {
            engines: EngineKind::fallback_chain(),
            max_results_cap: 10,
            search_timeout: Duration::from_secs(30),
            attempt_timeout_cap: Duration::from_secs(10),
            acceptance_threshold: 0.3,
            excellent_threshold: 0.8,
            scoring_enabled: true,
            force_multi_engine: false,
            max_query_length: 256,
            max_requests_per_minute: 30,
            max_concurrent_requests: 5,
            headless: true,
            browser_executable: None,
            max_browser_families: 3,
            browser_retry_backoff: Duration::from_millis(500),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            extract_timeout: Duration::from_secs(15),
            max_content_length: 8000,
            min_content_length: 200,
            extract_concurrency: 3,
        }
    }
}

impl SearchConfigBuilder {
    /// Replace the engine fallback chain; order is priority order
    #[must_use]
    pub fn engines(mut self, engines: Vec<EngineKind>) -> Self {
        self.engines = engines;
        self
    }

    #[must_use]
    pub fn max_results_cap(mut self, cap: usize) -> Self {
        self.max_results_cap = cap;
        self
    }

    #[must_use]
    pub fn search_timeout(mut self, timeout: Duration) -> Self {
        self.search_timeout = timeout;
        self
    }

    #[must_use]
    pub fn attempt_timeout_cap(mut self, cap: Duration) -> Self {
        self.attempt_timeout_cap = cap;
        self
    }

    #[must_use]
    pub fn acceptance_threshold(mut self, threshold: f64) -> Self {
        self.acceptance_threshold = threshold;
        self
    }

    #[must_use]
    pub fn excellent_threshold(mut self, threshold: f64) -> Self {
        self.excellent_threshold = threshold;
        self
    }

    #[must_use]
    pub fn scoring_enabled(mut self, enabled: bool) -> Self {
        self.scoring_enabled = enabled;
        self
    }

    #[must_use]
    pub fn force_multi_engine(mut self, force: bool) -> Self {
        self.force_multi_engine = force;
        self
    }

    #[must_use]
    pub fn max_query_length(mut self, length: usize) -> Self {
        self.max_query_length = length;
        self
    }

    #[must_use]
    pub fn max_requests_per_minute(mut self, max: u32) -> Self {
        self.max_requests_per_minute = max;
        self
    }

    #[must_use]
    pub fn max_concurrent_requests(mut self, max: usize) -> Self {
        self.max_concurrent_requests = max;
        self
    }

    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    #[must_use]
    pub fn browser_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.browser_executable = Some(path.into());
        self
    }

    #[must_use]
    pub fn max_browser_families(mut self, max: usize) -> Self {
        self.max_browser_families = max;
        self
    }

    #[must_use]
    pub fn browser_retry_backoff(mut self, backoff: Duration) -> Self {
        self.browser_retry_backoff = backoff;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn extract_timeout(mut self, timeout: Duration) -> Self {
        self.extract_timeout = timeout;
        self
    }

    #[must_use]
    pub fn max_content_length(mut self, length: usize) -> Self {
        self.max_content_length = length;
        self
    }

    #[must_use]
    pub fn min_content_length(mut self, length: usize) -> Self {
        self.min_content_length = length;
        self
    }

    #[must_use]
    pub fn extract_concurrency(mut self, concurrency: usize) -> Self {
        self.extract_concurrency = concurrency;
        self
    }

    /// Validate and freeze the configuration
    ///
    /// # Errors
    ///
    /// Returns an error when a threshold falls outside `[0, 1]`, the
    /// engine list is empty, or a quota is zero.
    pub fn build(self) -> Result<SearchConfig> {
        if self.engines.is_empty() {
            bail!("engine fallback chain cannot be empty");
        }
        for (name, value) in [
            ("acceptance_threshold", self.acceptance_threshold),
            ("excellent_threshold", self.excellent_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("{name} must be within [0, 1], got {value}");
            }
        }
        if self.max_requests_per_minute == 0 {
            bail!("max_requests_per_minute must be nonzero");
        }
        if self.max_concurrent_requests == 0 {
            bail!("max_concurrent_requests must be nonzero");
        }
        if self.max_browser_families == 0 {
            bail!("max_browser_families must be nonzero");
        }
        if self.max_results_cap == 0 {
            bail!("max_results_cap must be nonzero");
        }

        Ok(SearchConfig {
            engines: self.engines,
            max_results_cap: self.max_results_cap,
            search_timeout: self.search_timeout,
            attempt_timeout_cap: self.attempt_timeout_cap,
            acceptance_threshold: self.acceptance_threshold,
            excellent_threshold: self.excellent_threshold,
            scoring_enabled: self.scoring_enabled,
            force_multi_engine: self.force_multi_engine,
            max_query_length: self.max_query_length,
            max_requests_per_minute: self.max_requests_per_minute,
            max_concurrent_requests: self.max_concurrent_requests,
            headless: self.headless,
            browser_executable: self.browser_executable,
            max_browser_families: self.max_browser_families,
            browser_retry_backoff: self.browser_retry_backoff,
            user_agent: self.user_agent,
            extract_timeout: self.extract_timeout,
            max_content_length: self.max_content_length,
            min_content_length: self.min_content_length,
            extract_concurrency: self.extract_concurrency,
        })
    }
}
