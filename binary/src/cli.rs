//! Command-line arguments and discovery configuration loading.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pattern_mining::DiscoveryConfig;

/// Discover a process model from a trace file by iterative pattern abstraction.
///
/// The trace file contains one trace per line; every letter is one action.
#[derive(Debug, Parser)]
#[command(name = "pattern-mining", version, about, long_about = None)]
pub struct Cli {
    /// Trace file (`.gz` files are decompressed).
    pub input: PathBuf,

    /// Enable verbose (debug) logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// JSON file with discovery parameters.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write the full discovery result as JSON to this path.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Maximum number of bootstrap (sequence-only) rounds.
    #[arg(long)]
    pub bootstrap_rounds: Option<usize>,

    /// Maximum number of classification rounds.
    #[arg(long)]
    pub classify_rounds: Option<usize>,

    /// Code of the first synthetic action.
    #[arg(long)]
    pub first_code: Option<u32>,
}

impl Cli {
    /// Discovery parameters: the config file (if any) with command-line overrides applied.
    pub fn discovery_config(&self) -> Result<DiscoveryConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                DiscoveryConfig::from_json(&json)
                    .with_context(|| format!("invalid config {}", path.display()))?
            }
            None => DiscoveryConfig::default(),
        };
        if let Some(cap) = self.bootstrap_rounds {
            config.bootstrap_round_cap = Some(cap);
        }
        if let Some(cap) = self.classify_rounds {
            config.classify_round_cap = Some(cap);
        }
        if let Some(code) = self.first_code {
            config.first_synthetic_code = code;
        }
        config.validate()?;
        Ok(config)
    }
}
