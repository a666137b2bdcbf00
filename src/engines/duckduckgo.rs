//! DuckDuckGo results dialect
//!
//! DuckDuckGo renders results client-side, so its page arrives through a
//! pooled browser rather than a plain fetch. Outbound links come in two
//! shapes: direct hrefs on the result title, and protocol-relative
//! `//duckduckgo.com/l/?uddg=<target>` redirect wrappers with the target
//! percent-encoded in the `uddg` parameter.

use url::Url;

use super::{Dialect, is_http_url};

pub(super) static DIALECT: Dialect = Dialect {
    result_selectors: &[
        "article[data-testid='result']",
        ".result",
        ".web-result",
        ".results_links",
    ],
    title_selectors: &[
        "h2 a",
        "a[data-testid='result-title-a']",
        ".result__title a",
        "h2",
    ],
    snippet_selectors: &[
        "div[data-result='snippet']",
        "[data-testid='result-snippet']",
        ".result__snippet",
    ],
    link_selectors: &[
        "h2 a",
        "a[data-testid='result-title-a']",
        ".result__title a",
        "a.result__a",
    ],
    normalize_url,
    accept_url,
};

const SEARCH_URL: &str = "https://duckduckgo.com/";

#[must_use]
pub fn search_url(query: &str) -> String {
    format!("{SEARCH_URL}?q={}&ia=web", urlencoding::encode(query))
}

/// Resolve protocol-relative prefixes and the `uddg` redirect parameter,
/// falling back to the wrapped URL when decoding fails
#[must_use]
pub fn normalize_url(raw: &str) -> String {
    let href = if raw.starts_with("//") {
        format!("https:{raw}")
    } else if raw.starts_with('/') {
        format!("https://duckduckgo.com{raw}")
    } else {
        raw.to_string()
    };

    if href.contains("duckduckgo.com/l/") {
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
        .find(|(key, _)| key == "uddg")
        .map(|(_, value)| value.into_owned())?;
    is_http_url(&target).then_some(target)
}

#[must_use]
pub fn accept_url(url: &str) -> bool {
    is_http_url(url) && !url.contains("duckduckgo.com")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_protocol_relative_redirect() {
        let wrapped = "//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.org%2Fpage&rut=abc123";
        assert_eq!(normalize_url(wrapped), "https://example.org/page");
    }

    #[test]
    fn decodes_path_relative_redirect() {
        let wrapped = "/l/?uddg=https%3A%2F%2Fexample.org%2F";
        assert_eq!(normalize_url(wrapped), "https://example.org/");
    }

    #[test]
    fn falls_back_when_target_missing() {
        let wrapped = "//duckduckgo.com/l/?rut=abc123";
        assert_eq!(normalize_url(wrapped), format!("https:{wrapped}"));
    }

    #[test]
    fn direct_links_pass_through() {
        assert_eq!(
            normalize_url("https://example.org/page"),
            "https://example.org/page"
        );
    }

    #[test]
    fn rejects_engine_internal_urls() {
        assert!(!accept_url("https://duckduckgo.com/y.js?ad_domain=x"));
        assert!(accept_url("https://example.org/page"));
    }
}
