//! Error types for search orchestration and content extraction
//!
//! Failures internal to one engine or one URL are contained at that
//! granularity; only orchestration-level failures surface to callers.

use std::time::Duration;
use thiserror::Error;

use crate::types::FetchStatus;

/// Errors raised by the search side of the pipeline
#[derive(Debug, Error)]
pub enum SearchError {
    /// Quota window exhausted. Never retried internally; the caller
    /// should wait out `retry_after`.
    #[error("rate limit exceeded, retry in {retry_after:?}")]
    RateLimitExceeded { retry_after: Duration },

    /// Browser launch or health check failed
    #[error("browser unavailable: {0}")]
    BrowserUnavailable(String),

    /// One engine's attempt failed; orchestration continues to the next
    #[error("engine '{engine}' attempt failed: {source}")]
    EngineAttemptFailed {
        engine: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// Every engine attempt failed or returned nothing. Converted to an
    /// empty response at the `search` boundary, never surfaced as Err.
    #[error("every engine attempt failed or returned no results")]
    AllEnginesFailed,

    /// HTTP client construction or transport failure outside any
    /// single engine attempt
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Per-URL content extraction failures, classified by cause
///
/// In batch mode these are recorded on the individual result and never
/// abort sibling extractions.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("content fetch timed out")]
    Timeout,

    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("unsupported content type: {0}")]
    UnsupportedContent(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("browser rendering failed: {0}")]
    Browser(String),
}

impl ExtractError {
    /// The terminal `FetchStatus` this failure maps to on a result
    #[must_use]
    pub fn status(&self) -> FetchStatus {
        match self {
            ExtractError::Timeout => FetchStatus::Timeout,
            _ => FetchStatus::Error,
        }
    }
}

impl From<reqwest::Error> for ExtractError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ExtractError::Timeout
        } else {
            ExtractError::Network(error.to_string())
        }
    }
}

/// Classify whether an engine attempt died because its browser session
/// is gone
///
/// A stale pool entry would fail every subsequent browser-based attempt
/// the same way, so the orchestrator tears the pool down when it sees
/// one of these signatures.
#[must_use]
pub fn is_session_closed(error: &anyhow::Error) -> bool {
    let message = error.to_string().to_lowercase();

    message.contains("browser closed")
        || message.contains("browser disconnected")
        || message.contains("page closed")
        || message.contains("target closed")
        || message.contains("session not found")
        || message.contains("session closed")
        || message.contains("no response from the chromium instance")
        || message.contains("websocket")
        || message.contains("channel closed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn session_closed_signatures() {
        assert!(is_session_closed(&anyhow!("Session closed: target crashed")));
        assert!(is_session_closed(&anyhow!("WebSocket connection lost")));
        assert!(!is_session_closed(&anyhow!("timeout waiting for results")));
    }

    #[test]
    fn extract_error_status_mapping() {
        assert_eq!(ExtractError::Timeout.status(), FetchStatus::Timeout);
        assert_eq!(
            ExtractError::AccessDenied("403".into()).status(),
            FetchStatus::Error
        );
    }
}
