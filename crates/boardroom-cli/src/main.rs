//! `boardroom` batch driver.
//!
//! Reads `boardroom.toml` (or the path given with `--config`), opens the
//! SQLite registry and runs one batch step.
//!
//! # Usage
//!
//! ```
//! boardroom ingest announcements.json
//! boardroom import-historical directors.json
//! boardroom reconcile
//! boardroom split-title "Tan Sri Dato' Ahmad bin Ali"
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use boardroom_core::{
  change::HistoricalDirectorRecord,
  ingest::ingest_batch,
  name::split_title,
  parse::{FieldParser, RawAnnouncement},
  reconcile::GapReconciler,
};
use boardroom_store_sqlite::SqliteStore;
use clap::{Parser, Subcommand};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(author, version, about = "Boardroom change registry batch driver")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "boardroom.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Parse and ingest a JSON array of announcements.
  Ingest {
    #[arg(value_name = "FILE")]
    file: PathBuf,
  },
  /// Load a JSON array of historical director records.
  ImportHistorical {
    #[arg(value_name = "FILE")]
    file: PathBuf,
  },
  /// Backfill change events missing from the historical dataset.
  Reconcile,
  /// Print the title and bare name of NAME.
  SplitTitle { name: String },
}

// ─── Config ───────────────────────────────────────────────────────────────────

/// Settings read from the config file and `BOARDROOM_*` variables.
#[derive(Debug, Deserialize)]
struct BatchConfig {
  #[serde(default = "default_store_path")]
  store_path: PathBuf,
}

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/boardroom/registry.db") }

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Needs no store.
  if let Command::SplitTitle { name } = &cli.command {
    let split = split_title(name);
    println!("title: {}", split.title.as_deref().unwrap_or("-"));
    println!("name:  {}", split.name);
    return Ok(());
  }

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("BOARDROOM"))
    .build()
    .context("failed to read config file")?;

  let batch_cfg: BatchConfig = settings
    .try_deserialize()
    .context("failed to deserialise BatchConfig")?;

  let store_path = expand_tilde(&batch_cfg.store_path);
  if let Some(parent) = store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    tokio::fs::create_dir_all(parent)
      .await
      .with_context(|| format!("failed to create {parent:?}"))?;
  }

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  match cli.command {
    Command::Ingest { file } => {
      let raws: Vec<RawAnnouncement> = read_json(&file).await?;
      let report = ingest_batch(&store, &FieldParser, &raws)
        .await
        .context("ingest stopped on a store failure")?;
      info!(ingested = report.ingested, skipped = report.skipped, "ingest finished");
    }
    Command::ImportHistorical { file } => {
      let records: Vec<HistoricalDirectorRecord> = read_json(&file).await?;
      let written = store
        .import_historical(records)
        .await
        .context("failed to import historical records")?;
      info!(written, "historical import finished");
    }
    Command::Reconcile => {
      let report = GapReconciler::new(&store)
        .run()
        .await
        .context("reconciliation could not load its inputs")?;
      println!(
        "examined {}, unresolved {}, appointments {}, resignations {}, failed {}",
        report.examined,
        report.unresolved,
        report.appointments_inserted,
        report.resignations_inserted,
        report.failed,
      );
    }
    Command::SplitTitle { .. } => {}
  }

  Ok(())
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
  let text = tokio::fs::read_to_string(path)
    .await
    .with_context(|| format!("failed to read {path:?}"))?;
  serde_json::from_str(&text).with_context(|| format!("failed to parse {path:?}"))
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
