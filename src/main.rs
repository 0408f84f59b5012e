//! Sumi-Scribe main entry point
//!
//! Command-line front end for the content acquisition engine. Each
//! subcommand runs one engine operation and prints its JSON envelope to
//! stdout; logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use sumi_scribe::config::{load_config_with_hash, Config};
use sumi_scribe::{CacheMode, Engine, FieldSchema, ResponseEnvelope};
use tracing_subscriber::EnvFilter;

/// Sumi-Scribe: a resilient web content acquisition engine
///
/// Fetches pages as markdown, crawls sites under depth and page budgets,
/// extracts schema-driven records and saves pages to disk. Every command
/// prints a JSON envelope, degrading to placeholder content instead of
/// failing when the network or a page misbehaves.
#[derive(Parser, Debug)]
#[command(name = "sumi-scribe")]
#[command(version)]
#[command(about = "A resilient web content acquisition engine", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch one page and render it to markdown
    Fetch {
        url: String,

        /// Include image references in the result
        #[arg(long)]
        include_images: bool,

        /// Ask caches on the path for a fresh copy
        #[arg(long, conflicts_with = "cache_mode")]
        bypass_cache: bool,

        /// Cache directive: default, bypass or force
        #[arg(long, value_name = "MODE")]
        cache_mode: Option<CacheMode>,
    },

    /// Crawl a site breadth-first from a seed URL
    Crawl {
        url: String,

        /// Maximum link depth from the seed (defaults to config)
        #[arg(long)]
        max_depth: Option<u32>,

        /// Maximum number of pages to render (defaults to config)
        #[arg(long)]
        max_pages: Option<u32>,

        /// Include image references on every page (defaults to config;
        /// `--include-images false` overrides a config value of true)
        #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
        include_images: Option<bool>,
    },

    /// Extract a structured record from a page
    Extract {
        url: String,

        /// JSON file holding the field schema
        #[arg(long, value_name = "FILE")]
        schema: Option<PathBuf>,

        /// CSS selector confining the extraction
        #[arg(long, default_value = "")]
        selector: String,
    },

    /// Render a page and save it as a markdown file
    Save {
        url: String,

        /// Target file; `.md` is appended when missing
        filename: String,

        /// Include image references when rendering
        #[arg(long)]
        include_images: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => load(path)?,
        None => {
            tracing::debug!("No configuration file given, using defaults");
            Config::default()
        }
    };

    let engine = Engine::new(config);

    let success = match cli.command {
        Command::Fetch {
            url,
            include_images,
            bypass_cache,
            cache_mode,
        } => {
            let cache_mode = cache_mode.unwrap_or(CacheMode::from_bypass(bypass_cache));
            let envelope = engine.fetch_page(&url, include_images, cache_mode).await;
            print_envelope(&envelope)?
        }
        Command::Crawl {
            url,
            max_depth,
            max_pages,
            include_images,
        } => {
            let defaults = &engine.config().crawl;
            let envelope = engine
                .crawl_site(
                    &url,
                    max_depth.unwrap_or(defaults.max_depth),
                    max_pages.unwrap_or(defaults.max_pages),
                    include_images.unwrap_or(defaults.include_images),
                )
                .await;
            print_envelope(&envelope)?
        }
        Command::Extract {
            url,
            schema,
            selector,
        } => {
            let schema = schema.as_deref().map(load_schema).transpose()?;
            let envelope = engine
                .extract_structured(&url, schema.as_ref(), &selector)
                .await;
            print_envelope(&envelope)?
        }
        Command::Save {
            url,
            filename,
            include_images,
        } => {
            let envelope = engine
                .save_as_markdown(&url, &filename, include_images)
                .await;
            print_envelope(&envelope)?
        }
    };

    if !success {
        std::process::exit(1);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_scribe=info,warn"),
            1 => EnvFilter::new("sumi_scribe=debug,info"),
            2 => EnvFilter::new("sumi_scribe=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn load(path: &Path) -> Result<Config> {
    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}

fn load_schema(path: &Path) -> Result<FieldSchema> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read schema {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("schema {} is not valid JSON", path.display()))?;
    Ok(FieldSchema::from_json(value)?)
}

/// Prints the envelope and returns its success flag
fn print_envelope<T: Serialize>(envelope: &ResponseEnvelope<T>) -> Result<bool> {
    println!("{}", serde_json::to_string_pretty(envelope)?);
    Ok(envelope.success)
}
