//! Integration tests for the engine
//!
//! These tests use wiremock to stand up mock HTTP servers and drive the
//! public operations end-to-end through the real HTTP fetcher.

mod crawl_tests;
mod extract_tests;
mod fetch_tests;
mod save_tests;

use sumi_scribe::config::{Config, FetcherConfig, OutputConfig};
use sumi_scribe::Engine;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates an engine with short timeouts, writing files under `output_dir`
pub fn create_test_engine(output_dir: Option<&std::path::Path>) -> Engine {
    let config = Config {
        fetcher: FetcherConfig {
            user_agent: "SumiScribeTest/1.0".to_string(),
            timeout_secs: 5,
            connect_timeout_secs: 2,
        },
        output: OutputConfig {
            directory: output_dir.map(|d| d.display().to_string()),
        },
        ..Config::default()
    };
    Engine::new(config)
}

/// Serves `body` as HTML at `route`
pub async fn mount_html(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html"))
        .mount(server)
        .await;
}
