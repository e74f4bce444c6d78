//! Layered settings for the `genx` binary.

use std::path::Path;

use anyhow::Context as _;
use genx_combinator::CombinatorOptions;
use serde::Deserialize;

/// Settings read from `genx.toml` and `GENX_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReplayConfig {
  /// Seconds an extraction may run after START. Zero or negative disables
  /// the timeout.
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: i64,
}

fn default_timeout_secs() -> i64 { 10 }

impl Default for ReplayConfig {
  fn default() -> Self { Self { timeout_secs: default_timeout_secs() } }
}

impl ReplayConfig {
  /// Read `path` (if it exists), then the environment on top of it.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    ::config::Config::builder()
      .add_source(::config::File::from(path).required(false))
      .add_source(::config::Environment::with_prefix("GENX"))
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise ReplayConfig")
  }

  pub fn options(&self) -> CombinatorOptions {
    CombinatorOptions::from_secs(self.timeout_secs)
  }
}
