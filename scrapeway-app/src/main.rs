use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scrapeway_api::AppState;
use scrapeway_common::observability::init_logging;
use scrapeway_config::{ScrapewayConfig, ScrapewayConfigLoader};
use std::net::SocketAddr;
use std::path::PathBuf;
use wiring::{build_orchestrator, log_config};
mod wiring;

/// Search-result scraper with article extraction
#[derive(Parser, Debug)]
#[command(name = "scrapeway", version, about, long_about = None)]
struct Cli {
    /// Config file (YAML, TOML or JSON). Defaults to ./scrapeway.yaml if present.
    #[arg(long, global = true, env = "SCRAPEWAY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Listen address, overrides server.bind
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Scrape once and print the items as JSON
    Scrape {
        query: String,
        #[arg(short = 'n', long, default_value_t = 5)]
        num_results: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Load config (env wins over file)
    let loader = match &cli.config {
        Some(path) => ScrapewayConfigLoader::new().with_file(path),
        None => ScrapewayConfigLoader::new().with_optional_file("scrapeway.yaml"),
    };
    let cfg: ScrapewayConfig = loader.load().context("loading configuration")?;

    let log_path = init_logging(log_config(&cfg.logging))?;
    tracing::debug!(log_path = %log_path.display(), "logging initialised");

    let orchestrator = build_orchestrator(&cfg);

    match cli.command {
        Command::Serve { bind } => {
            let addr = match bind {
                Some(addr) => addr,
                None => cfg
                    .server
                    .bind
                    .parse()
                    .with_context(|| format!("invalid server.bind: {}", cfg.server.bind))?,
            };
            let state = AppState::new(orchestrator, cfg.api.secret_key.as_str());
            scrapeway_api::serve(addr, state).await?;
        }
        Command::Scrape { query, num_results } => {
            let items = orchestrator.run(&query, num_results).await?;
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
    }

    Ok(())
}
