//! Multi-engine web search aggregation with content extraction
//!
//! Aggregates results from public web search engines behind a
//! priority-ordered fallback chain, arbitrated by a relevance score, and
//! enriches them with extracted page content. Expensive headless-browser
//! instances are pooled per engine family; request throughput is bounded
//! by a windowed rate limiter.
//!
//! The crate owns no network listener or wire protocol: a hosting façade
//! calls [`SearchOrchestrator::search`] and
//! [`ContentExtractor::extract_content_for_results`] and forwards their
//! outputs verbatim.
//!
//! ```no_run
//! use scour::{BrowserPool, ContentExtractor, RateLimiter, SearchConfig, SearchOptions, SearchOrchestrator};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Arc::new(SearchConfig::default());
//!     let limiter = Arc::new(RateLimiter::new(
//!         config.max_requests_per_minute(),
//!         config.max_concurrent_requests(),
//!     ));
//!     let pool = Arc::new(BrowserPool::new(Arc::clone(&config)));
//!
//!     let orchestrator =
//!         SearchOrchestrator::new(Arc::clone(&config), limiter, Arc::clone(&pool))?;
//!     let extractor = ContentExtractor::new(Arc::clone(&config), pool)?;
//!
//!     let mut response = orchestrator
//!         .search(&SearchOptions::new("rust async runtime"))
//!         .await?;
//!     extractor
//!         .extract_content_for_results(&mut response.results, 3)
//!         .await;
//!
//!     orchestrator.close_all().await;
//!     Ok(())
//! }
//! ```

pub mod browser;
pub mod config;
pub mod engines;
pub mod error;
pub mod extractor;
pub mod orchestrator;
pub mod rate_limiter;
pub mod scorer;
pub mod types;

pub use browser::{BrowserPool, EngineFamily};
pub use config::{SearchConfig, SearchConfigBuilder};
pub use engines::EngineKind;
pub use error::{ExtractError, SearchError};
pub use extractor::ContentExtractor;
pub use orchestrator::SearchOrchestrator;
pub use rate_limiter::RateLimiter;
pub use types::{FetchStatus, SearchOptions, SearchResponse, SearchResult};
