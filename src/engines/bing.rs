//! Bing results dialect
//!
//! Bing wraps outbound links as `bing.com/ck/a?...&u=a1<payload>` where the
//! payload is the destination URL, base64url-encoded after an `a1` version
//! marker. The encoded segment is not always a multiple-of-4 length, so
//! padding is repaired before decoding.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE;
use url::Url;

use super::{Dialect, is_http_url};

pub(super) static DIALECT: Dialect = Dialect {
    result_selectors: &["li.b_algo", "#b_results > li", "ol#b_results li"],
    title_selectors: &["h2 a", "h2", ".b_title a"],
    snippet_selectors: &[".b_caption p", "p.b_lineclamp2", ".b_caption", "p"],
    link_selectors: &["h2 a", "a.tilk", "a[href]"],
    normalize_url,
    accept_url,
};

const SEARCH_URL: &str = "https://www.bing.com/search";

#[must_use]
pub fn search_url(query: &str, num_results: usize) -> String {
    format!(
        "{SEARCH_URL}?q={}&count={num_results}",
        urlencoding::encode(query)
    )
}

/// Unwrap Bing's click-tracking redirect, falling back to the original
/// URL when the payload does not decode
#[must_use]
pub fn normalize_url(raw: &str) -> String {
    let href = if raw.starts_with("//") {
        format!("https:{raw}")
    } else {
        raw.to_string()
    };

    if href.contains("bing.com/ck/a") {
        if let Some(target) = decode_redirect(&href) {
            return target;
        }
    }

    href
}

fn decode_redirect(wrapped: &str) -> Option<String> {
    let parsed = Url::parse(wrapped).ok()?;
    let payload = parsed
        .query_pairs()
        .find(|(key, _)| key == "u")
        .map(|(_, value)| value.into_owned())?;

    // "a1" version marker precedes the encoded target
    let encoded = payload.strip_prefix("a1").unwrap_or(&payload);

    let mut padded = encoded.to_string();
    while padded.len() % 4 != 0 {
        padded.push('=');
    }

    let bytes = URL_SAFE.decode(padded.as_bytes()).ok()?;
    let target = String::from_utf8(bytes).ok()?;
    is_http_url(&target).then_some(target)
}

#[must_use]
pub fn accept_url(url: &str) -> bool {
    is_http_url(url)
        && !url.contains("bing.com/ck/a")
        && !url.contains("bing.com/search")
        && !url.contains("bing.com/images")
        && !url.contains("go.microsoft.com")
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    fn wrap(target: &str) -> String {
        format!(
            "https://www.bing.com/ck/a?!&&p=deadbeef&u=a1{}&ntb=1",
            URL_SAFE_NO_PAD.encode(target)
        )
    }

    #[test]
    fn decodes_wrapped_redirect() {
        let wrapped = wrap("https://example.com/doc");
        assert_eq!(normalize_url(&wrapped), "https://example.com/doc");
    }

    #[test]
    fn repairs_missing_padding() {
        // 23-byte target encodes to 31 base64 chars, not a multiple of 4
        let target = "https://example.com/doc";
        assert_eq!(URL_SAFE_NO_PAD.encode(target).len() % 4, 3);
        assert_eq!(normalize_url(&wrap(target)), target);
    }

    #[test]
    fn falls_back_on_undecodable_payload() {
        let wrapped = "https://www.bing.com/ck/a?u=a1%%%garbage";
        assert_eq!(normalize_url(wrapped), wrapped);
    }

    #[test]
    fn direct_links_pass_through() {
        assert_eq!(
            normalize_url("https://example.com/page"),
            "https://example.com/page"
        );
    }

    #[test]
    fn rejects_engine_internal_urls() {
        assert!(!accept_url("https://www.bing.com/search?q=next"));
        assert!(!accept_url("javascript:void(0)"));
        assert!(accept_url("https://example.com/"));
    }
}
