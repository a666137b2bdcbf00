//! Multi-engine search orchestration
//!
//! Sequences engine attempts in priority order, applies per-attempt
//! timeouts, scores each result set, and decides between early return
//! and continued fallback. A single engine's failure is never fatal to
//! the overall search.

use anyhow::{Context, Result as AnyResult, anyhow};
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::browser::{BrowserPool, EngineFamily, PageGuard, apply_fingerprint};
use crate::config::SearchConfig;
use crate::engines::{self, EngineKind};
use crate::error::{SearchError, is_session_closed};
use crate::rate_limiter::RateLimiter;
use crate::scorer;
use crate::types::{SearchOptions, SearchResponse, SearchResult};

/// Tries per browser-based attempt, each with a fresh browser instance
const BROWSER_TRIES: u32 = 2;

/// How long to poll a rendered results page before giving up
const RESULTS_WAIT_MAX: Duration = Duration::from_secs(5);

const RESULTS_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Decision for one scored engine attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptVerdict {
    /// Good enough, stop the fallback chain here
    ReturnNow,
    /// Keep this set as a candidate and try the next engine
    Continue,
}

/// Sequences engine attempts and owns the search-side HTTP client
pub struct SearchOrchestrator {
    config: Arc<SearchConfig>,
    limiter: Arc<RateLimiter>,
    pool: Arc<BrowserPool>,
    client: Client,
}

impl SearchOrchestrator {
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be constructed.
    pub fn new(
        config: Arc<SearchConfig>,
        limiter: Arc<RateLimiter>,
        pool: Arc<BrowserPool>,
    ) -> Result<Self, SearchError> {
        let client = Client::builder()
            .user_agent(config.user_agent())
            .timeout(config.attempt_timeout_cap())
            .gzip(true)
            .build()?;

        Ok(Self {
            config,
            limiter,
            pool,
            client,
        })
    }

    /// Run the fallback chain for one query
    ///
    /// Always returns a response: a degraded-quality result set is data,
    /// not failure, and an exhausted chain yields the empty set tagged
    /// with engine "None".
    ///
    /// # Errors
    ///
    /// Only failures of the orchestration itself; individual engine
    /// failures are contained and logged.
    pub async fn search(&self, options: &SearchOptions) -> Result<SearchResponse, SearchError> {
        let query = sanitize_query(&options.query, self.config.max_query_length());
        if query.is_empty() {
            warn!("empty query after sanitization, returning no results");
            return Ok(SearchResponse::empty());
        }

        let num_results = options
            .num_results
            .clamp(1, self.config.max_results_cap());
        let attempt_timeout =
            compute_attempt_timeout(options.timeout, self.config.attempt_timeout_cap());
        let started = Instant::now();

        let mut best: Option<(EngineKind, Vec<SearchResult>, f64)> = None;
        let mut pool_torn_down = false;

        let chain = self.config.engines().to_vec();
        for (index, engine) in chain.iter().copied().enumerate() {
            if started.elapsed() >= options.timeout {
                warn!("overall search budget exhausted before {} attempt", engine);
                break;
            }

            info!(engine = engine.name(), "attempting engine");
            let outcome = timeout(attempt_timeout, self.attempt_engine(engine, &query, num_results)).await;

            let results = match outcome {
                Err(_) => {
                    warn!(
                        engine = engine.name(),
                        "attempt timed out after {attempt_timeout:?}"
                    );
                    continue;
                }
                Ok(Err(source)) => {
                    let session_closed = is_session_closed(&source);
                    let failure = SearchError::EngineAttemptFailed {
                        engine: engine.name(),
                        source,
                    };
                    warn!("{failure}");
                    if session_closed && !pool_torn_down {
                        warn!("closed browser session detected, releasing pooled browsers");
                        self.pool.release_all().await;
                        pool_torn_down = true;
                    }
                    continue;
                }
                Ok(Ok(results)) if results.is_empty() => {
                    debug!(engine = engine.name(), "attempt returned no results");
                    continue;
                }
                Ok(Ok(results)) => results,
            };

            if !self.config.scoring_enabled() {
                info!(engine = engine.name(), "scoring disabled, returning first non-empty set");
                return Ok(SearchResponse {
                    results,
                    engine_used: engine.name().to_string(),
                });
            }

            let score = scorer::score(&results, &query);
            debug!(engine = engine.name(), score, "scored result set");

            match evaluate_attempt(score, index == 0, &self.config) {
                AttemptVerdict::ReturnNow => {
                    info!(engine = engine.name(), score, "accepting result set");
                    return Ok(SearchResponse {
                        results,
                        engine_used: engine.name().to_string(),
                    });
                }
                AttemptVerdict::Continue => {
                    if best.as_ref().is_none_or(|(_, _, s)| score > *s) {
                        best = Some((engine, results, score));
                    }
                }
            }
        }

        match best {
            Some((engine, results, score)) => {
                if score < self.config.acceptance_threshold() {
                    warn!(
                        engine = engine.name(),
                        score, "returning degraded-quality results"
                    );
                } else {
                    info!(engine = engine.name(), score, "returning best result set");
                }
                Ok(SearchResponse {
                    results,
                    engine_used: engine.name().to_string(),
                })
            }
            None => {
                warn!("{}", SearchError::AllEnginesFailed);
                Ok(SearchResponse::empty())
            }
        }
    }

    /// Release all pooled browser processes; call on graceful shutdown
    pub async fn close_all(&self) {
        self.pool.release_all().await;
    }

    async fn attempt_engine(
        &self,
        engine: EngineKind,
        query: &str,
        num_results: usize,
    ) -> AnyResult<Vec<SearchResult>> {
        if engine.uses_browser() {
            self.browser_attempt(engine, query, num_results).await
        } else {
            self.http_attempt(engine, query, num_results).await
        }
    }

    /// Fetch a results page over plain HTTP and parse it
    async fn http_attempt(
        &self,
        engine: EngineKind,
        query: &str,
        num_results: usize,
    ) -> AnyResult<Vec<SearchResult>> {
        let url = engine.search_url(query, num_results);
        debug!(%url, "fetching results page");

        let html = self
            .limiter
            .execute(|| async {
                let response = self
                    .client
                    .get(&url)
                    .header(
                        "Accept",
                        "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
                    )
                    .header("Accept-Language", "en-US,en;q=0.5")
                    .header("Upgrade-Insecure-Requests", "1")
                    .header("Sec-Fetch-Dest", "document")
                    .header("Sec-Fetch-Mode", "navigate")
                    .header("Sec-Fetch-Site", "none")
                    .header("Sec-Fetch-User", "?1")
                    .send()
                    .await
                    .context("results page request failed")?
                    .error_for_status()
                    .context("results page returned an error status")?;

                response
                    .text()
                    .await
                    .context("failed to read results page body")
            })
            .await??;

        Ok(engines::parse_results(engine, &html, num_results))
    }

    /// Render a results page in a pooled browser
    ///
    /// Up to two tries, each with a fresh browser instance (a browser
    /// that just failed is never reused), short fixed backoff between
    /// tries, final error re-raised to the attempt handler.
    async fn browser_attempt(
        &self,
        engine: EngineKind,
        query: &str,
        num_results: usize,
    ) -> AnyResult<Vec<SearchResult>> {
        let family = EngineFamily::from(engine);
        let mut last_error: Option<anyhow::Error> = None;

        for attempt in 0..BROWSER_TRIES {
            if attempt > 0 {
                self.pool.invalidate(family).await;
                tokio::time::sleep(self.config.browser_retry_backoff()).await;
            }

            match self.render_serp(family, engine, query, num_results).await {
                Ok(results) => return Ok(results),
                Err(e) => {
                    warn!(
                        engine = engine.name(),
                        attempt, "browser try failed: {e:#}"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow!("browser attempt failed without detail")))
    }

    async fn render_serp(
        &self,
        family: EngineFamily,
        engine: EngineKind,
        query: &str,
        num_results: usize,
    ) -> AnyResult<Vec<SearchResult>> {
        let browser = self.pool.acquire(family).await?;
        let page = PageGuard::new(
            browser
                .new_page("about:blank")
                .await
                .context("failed to open page")?,
        );

        if let Err(e) = apply_fingerprint(&page, self.config.user_agent()).await {
            warn!("fingerprint application failed: {e}");
        }

        let url = engine.search_url(query, num_results);
        self.limiter
            .execute(|| async {
                page.goto(url.as_str())
                    .await
                    .context("failed to navigate to results page")?;
                page.wait_for_navigation()
                    .await
                    .context("failed waiting for initial page load")?;
                Ok::<_, anyhow::Error>(())
            })
            .await??;

        self.wait_for_rendered_results(&page, engine).await?;

        let html = page
            .content()
            .await
            .context("failed to read rendered page")?;
        Ok(engines::parse_results(engine, &html, num_results))
    }

    /// Poll until a result card appears in the DOM
    ///
    /// Client-side rendering continues well after navigation settles, so
    /// the DOM has to be checked for actual result elements. A bot wall
    /// is reported distinctly from a plain render timeout.
    async fn wait_for_rendered_results(&self, page: &PageGuard, engine: EngineKind) -> AnyResult<()> {
        let dialect = engine.dialect();
        let started = Instant::now();

        loop {
            for selector in dialect.result_selectors {
                if page.find_element(*selector).await.is_ok() {
                    debug!(
                        engine = engine.name(),
                        "results rendered after {:.2}s",
                        started.elapsed().as_secs_f64()
                    );
                    return Ok(());
                }
            }

            if started.elapsed() >= RESULTS_WAIT_MAX {
                let current = page.url().await.ok().flatten().unwrap_or_default();
                if current.contains("captcha") || current.contains("/sorry") {
                    return Err(anyhow!(
                        "{} presented a bot-detection page instead of results",
                        engine.name()
                    ));
                }
                return Err(anyhow!(
                    "timed out waiting for {} results to render",
                    engine.name()
                ));
            }

            tokio::time::sleep(RESULTS_POLL_INTERVAL).await;
        }
    }
}

/// Per-attempt budget: a third of the overall budget, hard-capped so no
/// single slow engine consumes the whole search
#[must_use]
pub fn compute_attempt_timeout(overall: Duration, cap: Duration) -> Duration {
    (overall / 3).min(cap)
}

/// Decide whether a scored attempt ends the fallback chain
///
/// An excellent set returns immediately unless multi-engine forcing is
/// on; an acceptable set returns immediately only when it did not come
/// from the first-priority engine.
#[must_use]
pub fn evaluate_attempt(score: f64, first_engine: bool, config: &SearchConfig) -> AttemptVerdict {
    if score >= config.excellent_threshold() && !config.force_multi_engine() {
        return AttemptVerdict::ReturnNow;
    }
    if score >= config.acceptance_threshold() && !first_engine {
        return AttemptVerdict::ReturnNow;
    }
    AttemptVerdict::Continue
}

/// Trim and length-cap a raw query before any engine sees it
#[must_use]
pub fn sanitize_query(query: &str, max_length: usize) -> String {
    let trimmed = query.trim();
    if trimmed.len() <= max_length {
        return trimmed.to_string();
    }

    let mut end = max_length;
    while end > 0 && !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    trimmed[..end].trim_end().to_string()
}
