//! sitm-insights - song metadata reconciliation and batch insights
//!
//! Reads provider fragments or canonical records as JSON, writes the
//! assembled records and derived insights as JSON to stdout. Logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sitm_common::config::{ConfigResolver, TomlConfig};
use sitm_insights::boundary::BatchReport;
use sitm_insights::{aggregate, CanonicalSongRecord, RecordAssembler, SongFragments};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "sitm-insights")]
#[command(about = "Reconcile song metadata across providers and derive batch insights")]
#[command(version)]
struct Args {
    /// Config file (overrides SITM_CONFIG and the platform config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assemble canonical records from collected provider fragments
    Assemble {
        /// JSON file holding one fragment set or an array of them
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Aggregate insights over an array of canonical records
    Aggregate {
        /// JSON file holding an array of canonical records
        #[arg(short, long)]
        input: PathBuf,

        /// Aggregate even when the batch is below the configured minimum
        #[arg(long)]
        force: bool,
    },
}

/// Accepts either a single object or an array of them
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config before tracing: the configured level seeds the filter
    let config = ConfigResolver::new(args.config.clone())
        .load()
        .context("Failed to load configuration")?;

    init_tracing(&config);

    info!(
        "Starting sitm-insights v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let min_batch = config.insights.min_batch;

    let output = match args.command {
        Command::Assemble { input } => {
            let sets: Vec<SongFragments> = read_json::<OneOrMany<SongFragments>>(&input)
                .await?
                .into_vec();
            info!("Assembling {} songs from {}", sets.len(), input.display());

            let assembler = RecordAssembler::new(config.priority);
            let songs: Vec<CanonicalSongRecord> =
                sets.iter().map(|f| assembler.assemble(f)).collect();

            serde_json::to_string_pretty(&BatchReport::from_records(songs, min_batch))?
        }

        Command::Aggregate { input, force } => {
            let records: Vec<CanonicalSongRecord> = read_json(&input).await?;
            info!("Aggregating {} records from {}", records.len(), input.display());

            if force {
                debug!("Minimum batch size ignored (--force)");
                serde_json::to_string_pretty(&aggregate(&records))?
            } else {
                let report = BatchReport::from_records(records, min_batch);
                serde_json::to_string_pretty(&report.derived_insights)?
            }
        }
    };

    println!("{}", output);
    Ok(())
}

fn init_tracing(config: &TomlConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}
