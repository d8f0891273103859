use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use tripsense::api::AppState;
use tripsense::cache::PersistentCache;
use tripsense::config::TripSenseConfig;
use tripsense::orchestrator::TravelOrchestrator;
use tripsense::router::{self, Intent};
use tripsense::{telemetry, web};

#[derive(Parser)]
#[command(
    name = "tripsense",
    version,
    about = "Weather and points of interest for any destination, from a plain-English prompt",
    long_about = "Ask about a destination in plain English and get the current weather,\n\
                  the most notable places nearby, a packing tip and a map link.\n\n\
                  Examples:\n  \
                    tripsense ask \"What's the weather in Mysore?\"\n  \
                    tripsense ask \"Plan my trip to Goa\" --json\n  \
                    tripsense extract \"plan a kerala escape\"\n  \
                    tripsense serve --port 8080"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (default: config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP API
    Serve {
        /// Port to listen on (overrides the configuration)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Answer a single travel prompt
    Ask {
        prompt: String,

        /// Force the intent instead of detecting it (weather, places, both)
        #[arg(long)]
        intent: Option<Intent>,

        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the detected location and intent without calling any service
    Extract { prompt: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = TripSenseConfig::load_from_path(cli.config.clone())
        .context("Failed to load configuration")?;
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    telemetry::init(&config.logging);

    match cli.command {
        Command::Extract { prompt } => {
            let extraction = router::extract(&prompt);
            println!("{}", serde_json::to_string_pretty(&extraction)?);
        }
        Command::Ask {
            prompt,
            intent,
            json,
        } => {
            let orchestrator = build_orchestrator(&config)?;
            let response = orchestrator
                .run(&prompt, intent)
                .await
                .context("Travel request failed")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!("{}", response.message);
                if let Some(tip) = &response.vibe_tip {
                    println!("{tip}");
                }
                if let Some(map_url) = &response.map_url {
                    println!("Map: {map_url}");
                }
            }
        }
        Command::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            let orchestrator = build_orchestrator(&config)?;
            web::run(&config.server, AppState::new(Arc::new(orchestrator))).await?;
        }
    }

    Ok(())
}

fn build_orchestrator(config: &TripSenseConfig) -> Result<TravelOrchestrator> {
    let cache = if config.cache.enabled {
        match PersistentCache::open(&config.cache.location) {
            Ok(cache) => {
                info!("Geocode cache at {}", config.cache.location);
                Some(Arc::new(cache))
            }
            Err(e) => {
                warn!("Continuing without cache: {}", e);
                None
            }
        }
    } else {
        None
    };

    TravelOrchestrator::from_config(config, cache).context("Failed to set up travel services")
}
