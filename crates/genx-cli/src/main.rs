//! `genx` — replay recorded extractions into GEDCOM X.
//!
//! # Usage
//!
//! ```text
//! genx replay recording.json
//! genx replay recording.json --id ancestry --events --compact
//! ```
//!
//! Settings are read from `genx.toml` (or `--config`) and `GENX_*`
//! environment variables; flags override both.

mod config;
mod replay;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use genx_combinator::CombinatorOptions;
use serde::Serialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::ReplayConfig;

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "genx", version, about = "Genealogy extraction tools")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "genx.toml", global = true)]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Combine a recorded event list into a GEDCOM X document.
  Replay {
    /// JSON array of `{id, type, data}` events.
    file: PathBuf,

    /// Extraction to combine (default: the first event's).
    #[arg(long)]
    id: Option<String>,

    /// Seconds allowed after START; zero or negative waits forever.
    #[arg(long, allow_negative_numbers = true)]
    timeout_secs: Option<i64>,

    /// Print the recorded events next to the document.
    #[arg(long)]
    events: bool,

    /// Print compact instead of pretty JSON.
    #[arg(long)]
    compact: bool,
  },
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let settings = ReplayConfig::load(&cli.config)?;

  match cli.command {
    Command::Replay { file, id, timeout_secs, events, compact } => {
      let options = match timeout_secs {
        Some(secs) => CombinatorOptions::from_secs(secs),
        None => settings.options(),
      };

      let raw = std::fs::read_to_string(&file)
        .with_context(|| format!("reading {}", file.display()))?;
      let stream = replay::parse_events(&raw)?;
      let recording =
        replay::replay(&stream, id.map(Into::into), options).await?;

      if events {
        print_json(&recording, compact)?;
      } else {
        print_json(&recording.data, compact)?;
      }
    }
  }

  Ok(())
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> anyhow::Result<()> {
  let json = if compact {
    serde_json::to_string(value)
  } else {
    serde_json::to_string_pretty(value)
  }
  .context("failed to serialise output")?;
  println!("{json}");
  Ok(())
}
