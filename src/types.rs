//! Data structures shared across the search and extraction pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// =============================================================================
// Constants
// =============================================================================

/// Default number of results returned per search
pub const DEFAULT_NUM_RESULTS: usize = 5;

/// Default budget for a whole search across all engine attempts
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(30);

// =============================================================================
// Data Structures
// =============================================================================

/// Outcome of the content-extraction step for one result
///
/// `Pending` is the state a result carries from parse time until the
/// extractor writes one of the three terminal states, exactly once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    #[default]
    Pending,
    Success,
    Error,
    Timeout,
}

/// A single search result
///
/// `url` is always a decoded, absolute, scheme-qualified address; the
/// engine parsers resolve redirect wrappers before a result is created.
/// `full_content` and `word_count` stay empty until the extractor fills
/// them in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Page title
    pub title: String,

    /// Absolute destination URL
    pub url: String,

    /// Description snippet from the results page
    pub description: String,

    /// Extracted page body, empty until extraction runs
    pub full_content: String,

    /// Whitespace-split token count of `full_content`
    pub word_count: usize,

    /// When this result was parsed
    pub timestamp: DateTime<Utc>,

    /// Extraction outcome for this result
    pub fetch_status: FetchStatus,

    /// Extraction failure detail, if any
    pub error: Option<String>,
}

impl SearchResult {
    /// Create a freshly parsed result with extraction fields unset
    #[must_use]
    pub fn new(title: impl Into<String>, url: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            description: description.into(),
            full_content: String::new(),
            word_count: 0,
            timestamp: Utc::now(),
            fetch_status: FetchStatus::Pending,
            error: None,
        }
    }
}

/// Caller-facing knobs for one search
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Raw query; sanitized (trimmed, length-capped) by the orchestrator
    pub query: String,

    /// Requested result count, capped by the configured maximum
    pub num_results: usize,

    /// Budget for the whole search across all engine attempts
    pub timeout: Duration,
}

impl SearchOptions {
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            num_results: DEFAULT_NUM_RESULTS,
            timeout: DEFAULT_SEARCH_TIMEOUT,
        }
    }

    #[must_use]
    pub fn num_results(mut self, num_results: usize) -> Self {
        self.num_results = num_results;
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// What a search hands back to the caller
///
/// An exhausted search (every engine failed or returned nothing) is the
/// empty set with `engine_used == "None"`, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Ranked results from the winning engine
    pub results: Vec<SearchResult>,

    /// Name of the engine that produced `results`, or "None"
    pub engine_used: String,
}

impl SearchResponse {
    /// The terminal empty response used when every engine came up dry
    #[must_use]
    pub fn empty() -> Self {
        Self {
            results: Vec::new(),
            engine_used: "None".to_string(),
        }
    }
}

/// Snapshot of the rate limiter's current window, for observability
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RateLimiterStatus {
    /// Requests dispatched in the current window
    pub request_count: u32,

    /// Window quota
    pub max_requests: u32,

    /// Time until the window resets
    pub reset_in: Duration,
}
