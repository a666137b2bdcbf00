// Fixture-driven parsing of each engine's markup dialect
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use scour::EngineKind;
use scour::engines::parse_results;

fn bing_wrap(target: &str) -> String {
    format!(
        "https://www.bing.com/ck/a?!&&p=cafe&u=a1{}&ntb=1",
        URL_SAFE_NO_PAD.encode(target)
    )
}

#[test]
fn bing_structured_results_parse() {
    let html = format!(
        r#"
        <html><body><ol id="b_results">
            <li class="b_algo">
                <h2><a href="{}">Rust Programming Language</a></h2>
                <div class="b_caption"><p>A language empowering everyone.</p></div>
            </li>
            <li class="b_algo">
                <h2><a href="https://doc.rust-lang.org/book/">The Rust Book</a></h2>
                <div class="b_caption"><p>Learn Rust from first principles.</p></div>
            </li>
        </ol></body></html>
        "#,
        bing_wrap("https://www.rust-lang.org/")
    );

    let results = parse_results(EngineKind::Bing, &html, 10);
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].title, "Rust Programming Language");
    assert_eq!(results[0].url, "https://www.rust-lang.org/");
    assert_eq!(results[0].description, "A language empowering everyone.");
    assert_eq!(results[1].url, "https://doc.rust-lang.org/book/");
}

#[test]
fn bing_respects_max_results() {
    let cards: String = (0..8)
        .map(|i| {
            format!(
                r#"<li class="b_algo"><h2><a href="https://example.com/{i}">Result {i}</a></h2><div class="b_caption"><p>Snippet {i}</p></div></li>"#
            )
        })
        .collect();
    let html = format!(r#"<html><body><ol id="b_results">{cards}</ol></body></html>"#);

    let results = parse_results(EngineKind::Bing, &html, 3);
    assert_eq!(results.len(), 3);
}

#[test]
fn rejected_cards_do_not_abort_the_scan() {
    // First card links back into the engine, second is fine.
    let html = r#"
        <html><body><ol id="b_results">
            <li class="b_algo">
                <h2><a href="https://www.bing.com/search?q=related">Related searches</a></h2>
            </li>
            <li class="b_algo">
                <h2><a href="https://example.com/real">Real result</a></h2>
                <div class="b_caption"><p>The one that counts.</p></div>
            </li>
        </ol></body></html>
    "#;

    let results = parse_results(EngineKind::Bing, html, 10);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].url, "https://example.com/real");
}

#[test]
fn duplicate_destinations_are_dropped() {
    let html = r#"
        <html><body><ol id="b_results">
            <li class="b_algo"><h2><a href="https://example.com/page">First</a></h2></li>
            <li class="b_algo"><h2><a href="https://example.com/page">Second</a></h2></li>
        </ol></body></html>
    "#;

    let results = parse_results(EngineKind::Bing, html, 10);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "First");
}

#[test]
fn duckduckgo_structured_results_parse() {
    let html = r#"
        <html><body>
            <article data-testid="result">
                <h2><a href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.org%2Fasync&rut=xyz">Async in Depth</a></h2>
                <div data-result="snippet">Understanding async runtimes.</div>
            </article>
            <article data-testid="result">
                <h2><a href="https://example.org/direct">Direct Link</a></h2>
                <div data-result="snippet">No wrapper here.</div>
            </article>
        </body></html>
    "#;

    let results = parse_results(EngineKind::DuckDuckGo, html, 10);
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].url, "https://example.org/async");
    assert_eq!(results[0].description, "Understanding async runtimes.");
    assert_eq!(results[1].url, "https://example.org/direct");
}

#[test]
fn duckduckgo_legacy_markup_parses_via_fallback_selector_family() {
    // The html.duckduckgo.com dialect: .result cards instead of articles.
    let html = r#"
        <html><body>
            <div class="result">
                <h2 class="result__title"><a class="result__a" href="https://example.org/page">Legacy Card</a></h2>
                <a class="result__snippet">Older markup shape.</a>
            </div>
        </body></html>
    "#;

    let results = parse_results(EngineKind::DuckDuckGo, html, 10);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Legacy Card");
    assert_eq!(results[0].url, "https://example.org/page");
}

#[test]
fn brave_structured_results_parse() {
    let html = r#"
        <html><body><div id="results">
            <div class="snippet" data-type="web">
                <a class="heading-serpresult" href="https://example.net/tokio">
                    <div class="title">Tokio - Asynchronous Rust</div>
                </a>
                <div class="snippet-description">Build reliable network applications.</div>
            </div>
        </div></body></html>
    "#;

    let results = parse_results(EngineKind::Brave, html, 10);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Tokio - Asynchronous Rust");
    assert_eq!(results[0].url, "https://example.net/tokio");
    assert_eq!(
        results[0].description,
        "Build reliable network applications."
    );
}

#[test]
fn final_resort_pass_finds_headings_inside_anchors() {
    // No structural selector matches, but a heading sits inside a link.
    let html = r#"
        <html><body>
            <div class="totally-unknown-wrapper">
                <a href="https://example.com/fallback"><h3>Fallback Title</h3></a>
                <a href="/relative/skip"><h3>Relative Link</h3></a>
            </div>
        </body></html>
    "#;

    let results = parse_results(EngineKind::Bing, html, 10);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Fallback Title");
    assert_eq!(results[0].url, "https://example.com/fallback");
    assert!(results[0].description.is_empty());
}

#[test]
fn empty_page_yields_no_results() {
    let results = parse_results(EngineKind::Brave, "<html><body></body></html>", 10);
    assert!(results.is_empty());
}

#[test]
fn parsed_results_start_with_extraction_fields_unset() {
    let html = r#"
        <html><body><ol id="b_results">
            <li class="b_algo"><h2><a href="https://example.com/">Title</a></h2></li>
        </ol></body></html>
    "#;
    let results = parse_results(EngineKind::Bing, html, 10);
    assert_eq!(results[0].fetch_status, scour::FetchStatus::Pending);
    assert!(results[0].full_content.is_empty());
    assert_eq!(results[0].word_count, 0);
}
