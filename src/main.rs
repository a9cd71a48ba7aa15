//! # Motomap CLI
//!
//! Command-line interface for the motomap library.
//! Builds the road graph for a place and prints a coverage summary.

use anyhow::Context;
use clap::Parser;
use log::error;
use motomap::Config;

mod cli;

/// Environment variable holding the process-wide Google Elevation API key
const API_KEY_ENV: &str = "GOOGLE_MAPS_API_KEY";

/// Command-line interface for motomap
#[derive(Parser, Debug)]
#[command(name = "motomap")]
#[command(about = "Builds routable OpenStreetMap road graphs with elevation and grades")]
#[command(long_about = "Downloads the drivable road network of a place and enriches it:
  motomap \"Moda, Kadikoy, Istanbul, Turkey\"
  motomap \"Moda, Kadikoy, Istanbul, Turkey\" --api-key <KEY>

Elevation:
  With a Google Elevation API key (--api-key, or GOOGLE_MAPS_API_KEY in the
  environment or a .env file) elevations come from Google. Without a key, or
  when the key is rejected, the free Open Topo Data service is used instead.")]
#[command(version)]
struct Cli {
    /// Place to build the graph for, e.g. "Kadikoy, Istanbul, Turkey"
    place: String,

    /// Google Elevation API key, takes precedence over GOOGLE_MAPS_API_KEY
    #[arg(long)]
    api_key: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("❌ Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Pick up GOOGLE_MAPS_API_KEY from a local .env file when present
    dotenv::dotenv().ok();

    // Initialize logging to stderr
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();

    if cli.verbose {
        eprintln!("🏍️ Motomap v{} starting...", env!("CARGO_PKG_VERSION"));
    }

    let config = Config::default().with_default_credential(std::env::var(API_KEY_ENV).ok());
    if cli.verbose {
        eprintln!("⛰️ Elevation source: {}", elevation_source(&cli, &config));
    }

    let progress_manager =
        cli::ProgressManager::new(0, &format!("🌐 Building road graph for {}", cli.place));

    let graph = motomap::build_with_progress(
        &cli.place,
        cli.api_key.as_deref(),
        &config,
        progress_manager.callback(),
    )
    .await
    .with_context(|| format!("failed to build road graph for '{}'", cli.place))?;

    progress_manager.pb.finish_and_clear();

    println!("Place: {}", cli.place);
    println!("{}", cli::GraphReport::new(&graph));

    Ok(())
}

/// Human-readable name of the elevation service tried first
fn elevation_source(cli: &Cli, config: &Config) -> &'static str {
    let credential = cli
        .api_key
        .as_deref()
        .or(config.default_credential.as_deref());
    match credential {
        Some(key) if !key.is_empty() => "Google Elevation API (Open Topo Data fallback)",
        _ => "Open Topo Data",
    }
}
