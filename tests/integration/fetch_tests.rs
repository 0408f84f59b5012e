use crate::{create_test_engine, mount_html};
use sumi_scribe::config::Config;
use sumi_scribe::fetcher::UnavailableFetcher;
use sumi_scribe::{CacheMode, DegradationTier, Engine};
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ARTICLE: &str = r#"
<html>
<head><title>Building Effective Agents</title></head>
<body>
    <h1>Building effective agents</h1>
    <p>The most successful implementations use simple, composable patterns.</p>
    <script>trackVisit();</script>
    <a href="/engineering">Engineering</a>
    <a href="/engineering#top">Engineering again</a>
    <a href="https://other.org/paper">Paper</a>
    <a href="mailto:team@example.com">Mail</a>
    <img src="/diagram.png" alt="Agent diagram">
</body>
</html>
"#;

#[tokio::test]
async fn test_fetch_page_renders_markdown() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/agents", ARTICLE).await;

    let engine = create_test_engine(None);
    let url = format!("{}/agents", mock_server.uri());
    let envelope = engine.fetch_page(&url, false, CacheMode::Default).await;

    assert!(envelope.success);
    assert_eq!(envelope.tier, DegradationTier::Primary);
    assert_eq!(envelope.payload.title, "Building Effective Agents");
    assert!(envelope
        .payload
        .markdown
        .contains("simple, composable patterns"));
    assert!(!envelope.payload.markdown.contains("trackVisit"));
    assert_eq!(
        envelope.payload.word_count,
        envelope.payload.markdown.split_whitespace().count()
    );
    assert!(envelope.payload.images.is_none());

    let json = serde_json::to_value(&envelope).unwrap();
    assert!(json.get("note").is_none());
    assert!(json.get("error_details").is_none());
}

#[tokio::test]
async fn test_fetch_page_classifies_and_dedups_links() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/agents", ARTICLE).await;

    let engine = create_test_engine(None);
    let url = format!("{}/agents", mock_server.uri());
    let envelope = engine.fetch_page(&url, true, CacheMode::Default).await;

    let links = &envelope.payload.links;
    assert_eq!(links.internal.len(), 1, "fragment variant is a duplicate");
    assert_eq!(
        links.internal[0].href,
        format!("{}/engineering", mock_server.uri())
    );
    assert_eq!(links.external.len(), 1);
    assert_eq!(links.external[0].href, "https://other.org/paper");

    let images = envelope.payload.images.unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].alt, "Agent diagram");
}

#[tokio::test]
async fn test_fetch_page_bypass_sends_no_cache() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fresh"))
        .and(header("cache-control", "no-cache"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<title>Fresh</title>", "text/html"))
        .mount(&mock_server)
        .await;

    let engine = create_test_engine(None);
    let url = format!("{}/fresh", mock_server.uri());
    let envelope = engine.fetch_page(&url, false, CacheMode::Bypass).await;

    assert_eq!(envelope.tier, DegradationTier::Primary);
    assert_eq!(envelope.payload.title, "Fresh");
}

#[tokio::test]
async fn test_fetch_page_force_sends_no_cache() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forced"))
        .and(header("pragma", "no-cache"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<title>Forced</title>", "text/html"))
        .mount(&mock_server)
        .await;

    let engine = create_test_engine(None);
    let url = format!("{}/forced", mock_server.uri());
    let envelope = engine.fetch_page(&url, false, CacheMode::Force).await;

    assert_eq!(envelope.tier, DegradationTier::Primary);
    assert_eq!(envelope.payload.title, "Forced");
}

#[tokio::test]
async fn test_fetch_page_404_becomes_placeholder() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let engine = create_test_engine(None);
    let url = format!("{}/gone", mock_server.uri());
    let envelope = engine.fetch_page(&url, false, CacheMode::Default).await;

    assert!(envelope.success);
    assert_eq!(envelope.tier, DegradationTier::Placeholder);
    assert!(envelope.error_details.as_deref().unwrap().contains("404"));
    assert_eq!(envelope.payload.url, url);
}

#[tokio::test]
async fn test_fetch_page_non_html_becomes_placeholder() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(r#"{"a":1}"#, "application/json"))
        .mount(&mock_server)
        .await;

    let engine = create_test_engine(None);
    let url = format!("{}/data.json", mock_server.uri());
    let envelope = engine.fetch_page(&url, false, CacheMode::Default).await;

    assert!(envelope.success);
    assert!(envelope
        .error_details
        .as_deref()
        .unwrap()
        .contains("Expected HTML"));
}

#[tokio::test]
async fn test_fetch_page_follows_redirects() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("location", format!("{}/new", mock_server.uri()).as_str()),
        )
        .mount(&mock_server)
        .await;
    mount_html(&mock_server, "/new", "<title>Moved Here</title>").await;

    let engine = create_test_engine(None);
    let url = format!("{}/old", mock_server.uri());
    let envelope = engine.fetch_page(&url, false, CacheMode::Default).await;

    assert_eq!(envelope.tier, DegradationTier::Primary);
    assert_eq!(envelope.payload.title, "Moved Here");
}

#[tokio::test]
async fn test_fetch_page_degrades_when_backend_unavailable() {
    let engine = Engine::with_fetcher(
        Config::default(),
        Arc::new(UnavailableFetcher::new("browser engine not installed")),
    );

    let envelope = engine
        .fetch_page("https://example.com/", false, CacheMode::Default)
        .await;

    assert!(envelope.success);
    assert_eq!(envelope.tier, DegradationTier::Degraded);
    let note = envelope.note.as_deref().unwrap();
    assert!(note.contains("placeholder"));
    assert!(note.contains("browser engine not installed"));

    let json = serde_json::to_value(&envelope).unwrap();
    for field in ["url", "markdown", "title", "word_count", "links"] {
        assert!(json.get(field).is_some(), "missing {}", field);
    }
}
