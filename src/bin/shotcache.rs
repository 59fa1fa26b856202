//! shotcache: query a record service through the read-through cache.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::info;

use shotcache::config::{Config, Secrets};
use shotcache::{ConnectionMode, Fingerprint, Query};

/// Read-through cache for Shotgun-style record queries
#[derive(Parser)]
#[command(name = "shotcache")]
#[command(version)]
#[command(about = "Read-through cache for record queries")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long, env = "SHOTCACHE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a find query and print the records as JSON
    Find {
        /// Positional arguments as a JSON array, e.g. '["Shot", [["id","is",5]]]'
        args: String,
        /// Named options as a JSON object, e.g. '{"fields": ["code"]}'
        #[arg(short, long)]
        options: Option<String>,
        /// Cache TTL for this query, in seconds
        #[arg(long)]
        ttl: Option<f64>,
        /// Override the configured connection mode
        #[arg(short, long)]
        mode: Option<ConnectionMode>,
    },

    /// Print the store key a query maps to
    Key {
        /// Positional arguments as a JSON array
        args: String,
        /// Named options as a JSON object
        #[arg(short, long)]
        options: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so stdout stays valid JSON (default: warn; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    match args.command {
        Command::Key { args: raw, options } => {
            let query = parse_query(&raw, options.as_deref())?;
            let (query, _) = query.split_ttl()?;
            println!("{}", Fingerprint::of(&query).store_key());
        }

        Command::Find {
            args: raw,
            options,
            ttl,
            mode,
        } => {
            let mut query = parse_query(&raw, options.as_deref())?;
            if let Some(secs) = ttl {
                let ttl = Duration::try_from_secs_f64(secs)
                    .map_err(|e| format!("--ttl must be a non-negative number of seconds: {e}"))?;
                query = query.ttl(ttl);
            }

            let config = Config::load(args.config.as_deref())?;
            let secrets = Secrets::load()?;
            let mut builder = config.builder(secrets.api_key())?;
            if let Some(mode) = mode {
                builder = builder.mode(mode);
            }
            let coordinator = builder.build()?;
            info!(mode = %coordinator.mode(), "running find");

            let records = coordinator.find(&query).await?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }

    Ok(())
}

/// Build a query from a JSON array of arguments and an optional JSON object of options.
fn parse_query(args: &str, options: Option<&str>) -> Result<Query, Box<dyn std::error::Error>> {
    let args: Vec<Value> = serde_json::from_str(args)
        .map_err(|e| format!("arguments must be a JSON array: {e}"))?;
    let mut query = Query::new(args);
    if let Some(options) = options {
        let options: serde_json::Map<String, Value> = serde_json::from_str(options)
            .map_err(|e| format!("options must be a JSON object: {e}"))?;
        for (name, value) in options {
            query = query.option(name, value);
        }
    }
    Ok(query)
}
