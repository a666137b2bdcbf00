//! Content extraction pipeline
//!
//! Fills in page bodies for search results. The default path is a
//! lightweight HTTP fetch plus markup cleanup; pages that come back
//! script-shaped or hollow escalate to a full browser render through the
//! pool. Batch extraction runs with bounded concurrency and stops as
//! soon as enough results have succeeded.

use ego_tree::NodeRef;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use scraper::{Html, Node, Selector};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::browser::{BrowserPool, EngineFamily, PageGuard, apply_fingerprint};
use crate::config::SearchConfig;
use crate::error::ExtractError;
use crate::types::{FetchStatus, SearchResult};

/// Hosts that only produce content with script execution; fetched HTML
/// from these is an empty shell
const SCRIPT_REQUIRED_HOSTS: &[&str] = &[
    "twitter.com",
    "x.com",
    "instagram.com",
    "facebook.com",
    "linkedin.com",
];

/// Tags whose text is never page content
const DENY_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "nav", "header", "footer", "aside", "form",
    "iframe", "svg", "button", "select", "option",
];

/// Class/id fragments marking navigation and ad boilerplate
const DENY_NAME_FRAGMENTS: &[&str] = &[
    "navbar",
    "menu",
    "sidebar",
    "breadcrumb",
    "banner",
    "advert",
    "promo",
    "cookie",
    "popup",
    "subscribe",
    "newsletter",
    "social-share",
    "comment",
];

/// How long to poll a rendered page for readiness before capturing it
const RENDER_WAIT_MAX: Duration = Duration::from_secs(5);

const RENDER_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Converts raw markup from an HTTP fetch or a rendered page into clean text
pub struct ContentExtractor {
    config: Arc<SearchConfig>,
    pool: Arc<BrowserPool>,
    client: Client,
}

impl ContentExtractor {
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be constructed.
    pub fn new(config: Arc<SearchConfig>, pool: Arc<BrowserPool>) -> Result<Self, ExtractError> {
        let client = Client::builder()
            .user_agent(config.user_agent())
            .timeout(config.extract_timeout())
            .gzip(true)
            .build()
            .map_err(ExtractError::from)?;

        Ok(Self {
            config,
            pool,
            client,
        })
    }

    /// Fetch or render one URL and return its cleaned body text
    ///
    /// PDFs are skipped outright; they are not renderable markup.
    ///
    /// # Errors
    ///
    /// `ExtractError` classified by cause: timeout, access denied,
    /// unsupported content type, or network failure.
    pub async fn extract_content(
        &self,
        url: &str,
        budget: Duration,
        max_length: usize,
    ) -> Result<String, ExtractError> {
        if is_pdf(url) {
            debug!(%url, "skipping pdf document");
            return Err(ExtractError::UnsupportedContent("pdf document".to_string()));
        }

        timeout(budget, self.extract_inner(url, max_length))
            .await
            .map_err(|_| ExtractError::Timeout)?
    }

    async fn extract_inner(&self, url: &str, max_length: usize) -> Result<String, ExtractError> {
        if is_script_required_host(url) {
            debug!(%url, "host requires script execution, rendering directly");
            return self.render_content(url, max_length).await;
        }

        let html = self.fetch_html(url).await?;
        let text = clean_document_text(&html);

        if needs_render(text.len(), html.len(), self.config.min_content_length()) {
            debug!(
                %url,
                chars = text.len(),
                "lightweight fetch looked low-quality, escalating to browser render"
            );
            match self.render_content(url, max_length).await {
                Ok(rendered) => return Ok(rendered),
                Err(e) => {
                    warn!(%url, "browser escalation failed, keeping fetched text: {e}");
                }
            }
        }

        Ok(truncate(&text, max_length))
    }

    async fn fetch_html(&self, url: &str) -> Result<String, ExtractError> {
        let response = self
            .client
            .get(url)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.5")
            .send()
            .await?;

        let status = response.status();
        if matches!(status.as_u16(), 401 | 403 | 429) {
            return Err(ExtractError::AccessDenied(format!("http status {status}")));
        }
        if !status.is_success() {
            return Err(ExtractError::Network(format!("http status {status}")));
        }

        if let Some(content_type) = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            let mime = content_type.to_ascii_lowercase();
            if !mime.contains("html") && !mime.contains("text/plain") {
                return Err(ExtractError::UnsupportedContent(mime));
            }
        }

        Ok(response.text().await?)
    }

    /// Render the page in the pooled extractor browser and capture its DOM
    async fn render_content(&self, url: &str, max_length: usize) -> Result<String, ExtractError> {
        let browser = self
            .pool
            .acquire(EngineFamily::Extractor)
            .await
            .map_err(|e| ExtractError::Browser(e.to_string()))?;

        let page = PageGuard::new(
            browser
                .new_page("about:blank")
                .await
                .map_err(|e| ExtractError::Browser(e.to_string()))?,
        );

        if let Err(e) = apply_fingerprint(&page, self.config.user_agent()).await {
            debug!("fingerprint application failed: {e}");
        }

        page.goto(url)
            .await
            .map_err(|e| ExtractError::Browser(format!("navigation failed: {e}")))?;
        page.wait_for_navigation()
            .await
            .map_err(|e| ExtractError::Browser(format!("page load failed: {e}")))?;

        wait_for_ready(&page).await;

        let html = page
            .content()
            .await
            .map_err(|e| ExtractError::Browser(format!("failed to read page: {e}")))?;

        Ok(truncate(&clean_document_text(&html), max_length))
    }

    /// Fill in page bodies across a result set with bounded concurrency
    ///
    /// Results are written back in place, so output order matches input
    /// order. Processing stops once `target_count` results carry a
    /// `Success` status or the input is exhausted; a failure is recorded
    /// on its own result and never aborts sibling extractions.
    pub async fn extract_content_for_results(
        &self,
        results: &mut [SearchResult],
        target_count: usize,
    ) {
        let concurrency = self.config.extract_concurrency().max(1);
        let budget = self.config.extract_timeout();
        let max_length = self.config.max_content_length();

        let mut successes = results
            .iter()
            .filter(|r| r.fetch_status == FetchStatus::Success)
            .count();
        let mut next = 0;

        while successes < target_count && next < results.len() {
            let wave_end = (next + concurrency).min(results.len());
            let wave: Vec<(usize, String)> = (next..wave_end)
                .map(|i| (i, results[i].url.clone()))
                .collect();

            let outcomes = stream::iter(wave)
                .map(|(index, url)| async move {
                    (index, self.extract_content(&url, budget, max_length).await)
                })
                .buffer_unordered(concurrency)
                .collect::<Vec<_>>()
                .await;

            for (index, outcome) in outcomes {
                let result = &mut results[index];
                match outcome {
                    Ok(text) => {
                        result.word_count = text.split_whitespace().count();
                        result.full_content = text;
                        result.fetch_status = FetchStatus::Success;
                        result.error = None;
                        successes += 1;
                    }
                    Err(e) => {
                        debug!(url = %result.url, "extraction failed: {e}");
                        result.fetch_status = e.status();
                        result.error = Some(e.to_string());
                    }
                }
            }

            next = wave_end;
        }

        info!(
            successes,
            processed = next,
            total = results.len(),
            "content extraction finished"
        );
    }
}

/// Poll the document until it reports ready or the wait expires
///
/// Navigation settling only means the HTTP response arrived; script
/// execution keeps building the DOM afterwards, so readiness has to be
/// checked in the page itself.
async fn wait_for_ready(page: &PageGuard) {
    const READY_SCRIPT: &str = r#"
        (function() {
            return {
                readyState: document.readyState,
                bodyExists: document.body !== null
            };
        })()
    "#;

    let started = Instant::now();
    while started.elapsed() < RENDER_WAIT_MAX {
        if let Ok(result) = page.evaluate(READY_SCRIPT).await {
            if let Ok(value) = result.into_value::<serde_json::Value>() {
                let ready = value.get("readyState").and_then(|v| v.as_str()) == Some("complete");
                let body = value.get("bodyExists").and_then(|v| v.as_bool()).unwrap_or(false);
                if ready && body {
                    return;
                }
            }
        }
        tokio::time::sleep(RENDER_POLL_INTERVAL).await;
    }
    debug!("render readiness wait expired, capturing page as-is");
}

/// Whether the URL points at a PDF document
#[must_use]
pub fn is_pdf(url: &str) -> bool {
    let path = url::Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| {
            url.split(['?', '#'])
                .next()
                .unwrap_or(url)
                .to_string()
        });
    path.to_ascii_lowercase().ends_with(".pdf")
}

/// Whether the host is known to require script execution for content
#[must_use]
pub fn is_script_required_host(url: &str) -> bool {
    let Ok(parsed) = url::Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    SCRIPT_REQUIRED_HOSTS
        .iter()
        .any(|known| host == *known || host.ends_with(&format!(".{known}")))
}

/// Judge whether a lightweight fetch produced usable text
///
/// Too little cleaned text, or text dwarfed by the markup that carried
/// it, marks the page as script-rendered.
#[must_use]
pub fn needs_render(cleaned_len: usize, html_len: usize, min_content_length: usize) -> bool {
    if cleaned_len < min_content_length {
        return true;
    }
    html_len > 0 && (cleaned_len as f64 / html_len as f64) < 0.01
}

/// Strip boilerplate and collect the visible body text of a document
#[must_use]
pub fn clean_document_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let Ok(body_selector) = Selector::parse("body") else {
        return String::new();
    };
    let Some(body) = document.select(&body_selector).next() else {
        return String::new();
    };

    let mut collected = String::new();
    collect_visible_text(*body, &mut collected);

    collected.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_visible_text(node: NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(text);
                out.push(' ');
            }
            Node::Element(element) => {
                if !is_boilerplate_element(element) {
                    collect_visible_text(child, out);
                }
            }
            _ => {}
        }
    }
}

fn is_boilerplate_element(element: &scraper::node::Element) -> bool {
    if DENY_TAGS.contains(&element.name()) {
        return true;
    }

    if element.classes().any(|class| {
        let class = class.to_ascii_lowercase();
        DENY_NAME_FRAGMENTS
            .iter()
            .any(|fragment| class.contains(fragment))
    }) {
        return true;
    }

    if let Some(id) = element.id() {
        let id = id.to_ascii_lowercase();
        if DENY_NAME_FRAGMENTS
            .iter()
            .any(|fragment| id.contains(fragment))
        {
            return true;
        }
    }

    false
}

fn truncate(text: &str, max_length: usize) -> String {
    if text.len() <= max_length {
        return text.to_string();
    }
    let mut end = max_length;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].trim_end().to_string()
}
