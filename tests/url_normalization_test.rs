// URL de-redirection across all three engine wrapping schemes.
//
// The key property: normalization is idempotent, so a URL that already
// went through a parser never changes again.
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use proptest::prelude::*;
use scour::EngineKind;

fn engines() -> [EngineKind; 3] {
    [EngineKind::Bing, EngineKind::DuckDuckGo, EngineKind::Brave]
}

#[test]
fn bing_base64_wrapper_round_trip() {
    let target = "https://www.rust-lang.org/learn";
    let wrapped = format!(
        "https://www.bing.com/ck/a?!&&p=0123abcd&u=a1{}&ntb=1",
        URL_SAFE_NO_PAD.encode(target)
    );
    assert_eq!(EngineKind::Bing.normalize_url(&wrapped), target);
}

#[test]
fn duckduckgo_uddg_wrapper_round_trip() {
    let wrapped = "//duckduckgo.com/l/?uddg=https%3A%2F%2Ftokio.rs%2Ftokio%2Ftutorial&rut=9f8e";
    assert_eq!(
        EngineKind::DuckDuckGo.normalize_url(wrapped),
        "https://tokio.rs/tokio/tutorial"
    );
}

#[test]
fn brave_redirect_parameter_round_trip() {
    let wrapped = "https://search.brave.com/a/redirect?url=https%3A%2F%2Fcrates.io%2Fcrates%2Fscraper";
    assert_eq!(
        EngineKind::Brave.normalize_url(wrapped),
        "https://crates.io/crates/scraper"
    );
}

#[test]
fn wrapped_forms_normalize_idempotently() {
    let cases = [
        (
            EngineKind::Bing,
            format!(
                "https://www.bing.com/ck/a?u=a1{}",
                URL_SAFE_NO_PAD.encode("https://example.com/a?b=c&d=e")
            ),
        ),
        (
            EngineKind::DuckDuckGo,
            "//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fpath%3Fq%3D1".to_string(),
        ),
        (
            EngineKind::Brave,
            "/redirect?q=https%3A%2F%2Fexample.com%2F".to_string(),
        ),
    ];

    for (engine, wrapped) in cases {
        let once = engine.normalize_url(&wrapped);
        let twice = engine.normalize_url(&once);
        assert_eq!(once, twice, "{engine} normalization not idempotent");
    }
}

#[test]
fn decode_failures_fall_back_to_the_wrapped_url() {
    let broken = "https://www.bing.com/ck/a?u=a1!!!not-base64!!!";
    assert_eq!(EngineKind::Bing.normalize_url(broken), broken);

    let missing = "//duckduckgo.com/l/?other=param";
    assert_eq!(
        EngineKind::DuckDuckGo.normalize_url(missing),
        format!("https:{missing}")
    );
}

proptest! {
    #[test]
    fn normalization_is_idempotent_for_plain_urls(
        host in "[a-z][a-z0-9]{2,12}",
        tld in "(com|org|net|io|dev)",
        path in "[a-z0-9/_-]{0,24}",
    ) {
        let url = format!("https://{host}.{tld}/{path}");
        for engine in engines() {
            let once = engine.normalize_url(&url);
            let twice = engine.normalize_url(&once);
            prop_assert_eq!(&once, &twice, "{} not idempotent for {}", engine, url);
        }
    }

    #[test]
    fn bing_padding_repair_handles_every_payload_length(
        target in "https://[a-z]{3,10}\\.com/[a-z0-9]{0,17}",
    ) {
        // Unpadded payloads cycle through all residues mod 4 as the
        // target length varies.
        let wrapped = format!(
            "https://www.bing.com/ck/a?u=a1{}",
            URL_SAFE_NO_PAD.encode(&target)
        );
        prop_assert_eq!(EngineKind::Bing.normalize_url(&wrapped), target);
    }
}
