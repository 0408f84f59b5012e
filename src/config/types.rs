use serde::Deserialize;

/// Main configuration structure for Sumi-Scribe
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// HTTP fetcher configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: format!(
                "SumiScribe/{} (+https://github.com/SiliconLion/sumi)",
                env!("CARGO_PKG_VERSION")
            ),
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Default traversal budget used when a caller does not supply one
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Maximum link depth from the seed page (0 = seed only)
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of pages rendered per traversal
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Whether crawled pages carry their image references
    #[serde(rename = "include-images")]
    pub include_images: bool,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            max_pages: 10,
            include_images: false,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory that relative save filenames are resolved against.
    /// Unset means the current working directory.
    pub directory: Option<String>,
}
