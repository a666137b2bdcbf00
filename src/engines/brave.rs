//! Brave Search results dialect
//!
//! Brave mostly links destinations directly; the exception is its
//! redirect endpoint, which carries the target in a `q=` or `url=`
//! query parameter.

use url::Url;

use super::{Dialect, is_http_url};

pub(super) static DIALECT: Dialect = Dialect {
    result_selectors: &[
        "div.snippet[data-type='web']",
        "#results .snippet",
        ".snippet",
    ],
    title_selectors: &[".title", "a .title", ".snippet-title", ".heading-serpresult"],
    snippet_selectors: &[".snippet-description", ".snippet-content", ".desc"],
    link_selectors: &["a.heading-serpresult", "a.h", "a[href]"],
    normalize_url,
    accept_url,
};

const SEARCH_URL: &str = "https://search.brave.com/search";

#[must_use]
pub fn search_url(query: &str) -> String {
    format!("{SEARCH_URL}?q={}&source=web", urlencoding::encode(query))
}

/// Extract the redirect target from Brave's `q=`/`url=` parameters,
/// falling back to the wrapped URL when neither decodes
#[must_use]
pub fn normalize_url(raw: &str) -> String {
    let href = if raw.starts_with("//") {
        format!("https:{raw}")
    } else if raw.starts_with('/') {
        format!("https://search.brave.com{raw}")
    } else {
        raw.to_string()
    };

    // Gate on the engine's own host so already-normalized URLs carrying
    // their own query parameters are left alone.
    if href.contains("search.brave.com") {
        if let Some(target) = decode_redirect(&href) {
            return target;
        }
    }

    href
}

fn decode_redirect(wrapped: &str) -> Option<String> {
    let parsed = Url::parse(wrapped).ok()?;
    let target = parsed
        .query_pairs()
        .find(|(key, _)| key == "url" || key == "q")
        .map(|(_, value)| value.into_owned())?;
    is_http_url(&target).then_some(target)
}

#[must_use]
pub fn accept_url(url: &str) -> bool {
    is_http_url(url) && !url.contains("search.brave.com")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_url_parameter_redirect() {
        let wrapped = "https://search.brave.com/a/redirect?url=https%3A%2F%2Fexample.net%2Fdocs";
        assert_eq!(normalize_url(wrapped), "https://example.net/docs");
    }

    #[test]
    fn decodes_path_relative_q_redirect() {
        let wrapped = "/redirect?q=https%3A%2F%2Fexample.net%2F";
        assert_eq!(normalize_url(wrapped), "https://example.net/");
    }

    #[test]
    fn leaves_query_parameters_on_external_urls() {
        let direct = "https://example.net/search?q=https://other.example";
        assert_eq!(normalize_url(direct), direct);
    }

    #[test]
    fn falls_back_when_target_is_not_a_url() {
        let wrapped = "https://search.brave.com/search?q=rust+async";
        assert_eq!(normalize_url(wrapped), wrapped);
    }

    #[test]
    fn rejects_engine_internal_urls() {
        assert!(!accept_url("https://search.brave.com/search?q=next"));
        assert!(accept_url("https://example.net/docs"));
    }
}
