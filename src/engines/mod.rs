//! Engine dialects and result-page parsing
//!
//! Each engine is a tagged variant carrying an ordered table of structural
//! selectors, per-field selector lists, and a pure URL normalizer for that
//! engine's link-wrapping convention. A shared driver walks the tables with
//! first-match-wins semantics; these markup dialects shift without notice,
//! so the driver ends with a deliberately permissive final-resort pass.

pub mod bing;
pub mod brave;
pub mod duckduckgo;

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::types::SearchResult;

/// One external web search provider
///
/// Declaration order is the fallback priority: the most structurally
/// stable, least bot-detected engine first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    Bing,
    DuckDuckGo,
    Brave,
}

impl EngineKind {
    /// All engines in fallback priority order
    #[must_use]
    pub fn fallback_chain() -> Vec<EngineKind> {
        vec![EngineKind::Bing, EngineKind::DuckDuckGo, EngineKind::Brave]
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            EngineKind::Bing => "bing",
            EngineKind::DuckDuckGo => "duckduckgo",
            EngineKind::Brave => "brave",
        }
    }

    /// Whether this engine's results page must be rendered in a browser
    /// rather than fetched over plain HTTP
    #[must_use]
    pub fn uses_browser(self) -> bool {
        matches!(self, EngineKind::DuckDuckGo)
    }

    /// Build the results-page URL for a query
    #[must_use]
    pub fn search_url(self, query: &str, num_results: usize) -> String {
        match self {
            EngineKind::Bing => bing::search_url(query, num_results),
            EngineKind::DuckDuckGo => duckduckgo::search_url(query),
            EngineKind::Brave => brave::search_url(query),
        }
    }

    #[must_use]
    pub fn dialect(self) -> &'static Dialect {
        match self {
            EngineKind::Bing => &bing::DIALECT,
            EngineKind::DuckDuckGo => &duckduckgo::DIALECT,
            EngineKind::Brave => &brave::DIALECT,
        }
    }

    /// Resolve this engine's link-wrapping convention to an absolute URL
    #[must_use]
    pub fn normalize_url(self, raw: &str) -> String {
        (self.dialect().normalize_url)(raw)
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parsing tables for one engine's markup dialect
///
/// Selector lists are tried in order; the first result-card family that
/// yields at least one accepted result wins, and within a card the first
/// non-empty title/snippet match is taken.
pub struct Dialect {
    pub result_selectors: &'static [&'static str],
    pub title_selectors: &'static [&'static str],
    pub snippet_selectors: &'static [&'static str],
    pub link_selectors: &'static [&'static str],
    pub normalize_url: fn(&str) -> String,
    pub accept_url: fn(&str) -> bool,
}

/// Parse a results page into normalized records
///
/// Rejected candidates (missing title, unacceptable URL) are skipped
/// without aborting the scan. Duplicate destinations are dropped.
#[must_use]
pub fn parse_results(engine: EngineKind, html: &str, max_results: usize) -> Vec<SearchResult> {
    let dialect = engine.dialect();
    let document = Html::parse_document(html);

    let results = structured_pass(&document, dialect, max_results);
    if !results.is_empty() {
        return results;
    }

    tracing::debug!(
        engine = engine.name(),
        "structured selectors yielded nothing, trying final-resort pass"
    );
    final_resort_pass(&document, dialect, max_results)
}

fn structured_pass(document: &Html, dialect: &Dialect, max_results: usize) -> Vec<SearchResult> {
    for selector_str in dialect.result_selectors {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };

        let mut results = Vec::new();
        let mut seen = HashSet::new();
        for card in document.select(&selector) {
            if results.len() >= max_results {
                break;
            }
            if let Some(result) = extract_card(&card, dialect) {
                if seen.insert(result.url.clone()) {
                    results.push(result);
                }
            }
        }

        if !results.is_empty() {
            return results;
        }
    }

    Vec::new()
}

/// Pull one result out of a candidate card
///
/// The URL is required and must pass the dialect's validity predicate;
/// the title is required; the snippet degrades to empty.
fn extract_card(card: &ElementRef<'_>, dialect: &Dialect) -> Option<SearchResult> {
    let href = first_attr(card, dialect.link_selectors, "href")?;
    let url = (dialect.normalize_url)(&href);
    if !(dialect.accept_url)(&url) {
        return None;
    }

    let title = first_text(card, dialect.title_selectors)?;
    let description = first_text(card, dialect.snippet_selectors).unwrap_or_default();

    Some(SearchResult::new(title, url, description))
}

/// Last-ditch scan for heading-like elements anchored inside hyperlinks,
/// ignoring semantic selectors entirely
fn final_resort_pass(document: &Html, dialect: &Dialect, max_results: usize) -> Vec<SearchResult> {
    let Ok(anchor_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    let Ok(heading_selector) = Selector::parse("h1, h2, h3, h4") else {
        return Vec::new();
    };

    let mut results = Vec::new();
    let mut seen = HashSet::new();
    for anchor in document.select(&anchor_selector) {
        if results.len() >= max_results {
            break;
        }
        let Some(heading) = anchor.select(&heading_selector).next() else {
            continue;
        };
        let title = element_text(&heading);
        if title.is_empty() {
            continue;
        }
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let url = (dialect.normalize_url)(href);
        if !(dialect.accept_url)(&url) {
            continue;
        }
        if seen.insert(url.clone()) {
            results.push(SearchResult::new(title, url, String::new()));
        }
    }

    results
}

fn first_text(card: &ElementRef<'_>, selectors: &[&str]) -> Option<String> {
    for selector_str in selectors {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        if let Some(element) = card.select(&selector).next() {
            let text = element_text(&element);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

fn first_attr(card: &ElementRef<'_>, selectors: &[&str], attr: &str) -> Option<String> {
    for selector_str in selectors {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        if let Some(element) = card.select(&selector).next() {
            if let Some(value) = element.value().attr(attr) {
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Shared validity floor: absolute, scheme-qualified, not a javascript:
/// or fragment pseudo-link
pub(crate) fn is_http_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}
