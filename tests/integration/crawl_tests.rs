use crate::{create_test_engine, mount_html};
use std::collections::HashSet;
use sumi_scribe::DegradationTier;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mounts a small site:
///
/// ```text
/// /        -> /about, /blog, https://external.test/
/// /about   -> /, /team
/// /blog    -> /blog/post-1, /about
/// /team, /blog/post-1 -> (leaves)
/// ```
async fn mount_site(server: &MockServer) {
    mount_html(
        server,
        "/",
        r#"<html><head><title>Home</title></head><body>
            <a href="/about">About</a>
            <a href="/blog">Blog</a>
            <a href="https://external.test/">External</a>
        </body></html>"#,
    )
    .await;
    mount_html(
        server,
        "/about",
        r#"<title>About</title><a href="/">Home</a><a href="/team">Team</a>"#,
    )
    .await;
    mount_html(
        server,
        "/blog",
        r#"<title>Blog</title><a href="/blog/post-1">Post</a><a href="/about">About</a>"#,
    )
    .await;
    mount_html(server, "/team", "<title>Team</title><p>People</p>").await;
    mount_html(server, "/blog/post-1", "<title>Post 1</title><p>Hello</p>").await;
}

#[tokio::test]
async fn test_crawl_respects_page_budget() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let engine = create_test_engine(None);
    let envelope = engine.crawl_site(&mock_server.uri(), 1, 2, false).await;

    assert!(envelope.success);
    assert_eq!(envelope.tier, DegradationTier::Primary);
    assert!(envelope.payload.pages_crawled <= 2);
    assert_eq!(envelope.payload.pages_crawled, envelope.payload.pages.len());
    assert!(envelope.payload.pages.iter().all(|p| p.depth <= 1));
}

#[tokio::test]
async fn test_crawl_full_site_breadth_first() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let engine = create_test_engine(None);
    let envelope = engine.crawl_site(&mock_server.uri(), 5, 50, false).await;

    let titles: Vec<&str> = envelope
        .payload
        .pages
        .iter()
        .map(|p| p.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Home", "About", "Blog", "Team", "Post 1"]);
    assert_eq!(envelope.payload.max_depth_reached, 2);

    let unique: HashSet<&str> = envelope
        .payload
        .pages
        .iter()
        .map(|p| p.url.as_str())
        .collect();
    assert_eq!(unique.len(), envelope.payload.pages.len());

    // No request ever left the mock server, and nothing was fetched twice
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 5);
}

#[tokio::test]
async fn test_crawl_depth_zero_is_seed_only() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let engine = create_test_engine(None);
    let envelope = engine.crawl_site(&mock_server.uri(), 0, 10, false).await;

    assert_eq!(envelope.payload.pages_crawled, 1);
    assert_eq!(envelope.payload.pages[0].title, "Home");
    assert_eq!(envelope.payload.max_depth_reached, 0);
}

#[tokio::test]
async fn test_crawl_skips_failed_pages() {
    let mock_server = MockServer::start().await;
    mount_html(
        &mock_server,
        "/",
        r#"<title>Home</title><a href="/broken">Broken</a><a href="/fine">Fine</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    mount_html(&mock_server, "/fine", "<title>Fine</title>").await;

    let engine = create_test_engine(None);
    let envelope = engine.crawl_site(&mock_server.uri(), 1, 10, false).await;

    assert_eq!(envelope.tier, DegradationTier::Primary);
    let titles: Vec<&str> = envelope
        .payload
        .pages
        .iter()
        .map(|p| p.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Home", "Fine"]);
}

#[tokio::test]
async fn test_crawl_unreachable_seed_is_placeholder() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let engine = create_test_engine(None);
    let envelope = engine.crawl_site(&mock_server.uri(), 2, 5, true).await;

    assert!(envelope.success);
    assert_eq!(envelope.tier, DegradationTier::Placeholder);
    assert!(envelope.error_details.as_deref().unwrap().contains("503"));
    assert_eq!(envelope.payload.pages_crawled, 1);
    assert_eq!(envelope.payload.pages[0].media, Some(vec![]));
}
