use crate::{create_test_engine, mount_html};
use sumi_scribe::DegradationTier;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE: &str = r#"
<html>
<head><title>Release Notes</title></head>
<body>
    <h1>Release 1.0</h1>
    <p>First stable release.</p>
    <ul><li>Faster crawls</li><li>Better markdown</li></ul>
</body>
</html>
"#;

#[tokio::test]
async fn test_save_appends_md_extension() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/release", PAGE).await;
    let dir = TempDir::new().unwrap();

    let engine = create_test_engine(Some(dir.path()));
    let url = format!("{}/release", mock_server.uri());
    let envelope = engine.save_as_markdown(&url, "out", false).await;

    assert!(envelope.success);
    assert_eq!(envelope.tier, DegradationTier::Primary);
    assert!(envelope.payload.filename.ends_with("out.md"));
    assert!(!envelope.payload.include_images);

    let written = std::fs::read_to_string(dir.path().join("out.md")).unwrap();
    assert!(written.contains("Release 1.0"));
    assert!(written.contains("First stable release."));
}

#[tokio::test]
async fn test_save_matches_fetched_markdown() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/release", PAGE).await;
    let dir = TempDir::new().unwrap();

    let engine = create_test_engine(Some(dir.path()));
    let url = format!("{}/release", mock_server.uri());
    let fetched = engine
        .fetch_page(&url, false, sumi_scribe::CacheMode::Default)
        .await;
    let saved = engine.save_as_markdown(&url, "notes/release.MD", false).await;

    let written = std::fs::read_to_string(dir.path().join("notes/release.MD")).unwrap();
    assert_eq!(written, fetched.payload.markdown);
    assert_eq!(saved.payload.word_count, fetched.payload.word_count);
}

#[tokio::test]
async fn test_save_writes_placeholder_on_http_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;
    let dir = TempDir::new().unwrap();

    let engine = create_test_engine(Some(dir.path()));
    let url = format!("{}/down", mock_server.uri());
    let envelope = engine.save_as_markdown(&url, "down", true).await;

    assert!(envelope.success);
    assert_eq!(envelope.tier, DegradationTier::Placeholder);
    assert!(envelope.error_details.as_deref().unwrap().contains("502"));
    assert!(envelope.note.is_some());

    let written = std::fs::read_to_string(dir.path().join("down.md")).unwrap();
    assert!(written.contains("placeholder"));
    assert!(written.contains("502"));
}

#[tokio::test]
async fn test_save_reports_failure_when_nothing_can_be_written() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/release", PAGE).await;
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("occupied.md")).unwrap();

    let engine = create_test_engine(Some(dir.path()));
    let url = format!("{}/release", mock_server.uri());
    let envelope = engine.save_as_markdown(&url, "occupied", false).await;

    assert!(!envelope.success);
    let json = serde_json::to_value(&envelope).unwrap();
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("occupied.md"));
}
