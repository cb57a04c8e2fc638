use std::{fs::File, io::BufWriter, time::Instant};

use anyhow::{Context, Result};
use clap::Parser;
use pattern_mining::{discover_patterns, import_traces_from_path};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = cli.discovery_config()?;
    tracing::debug!(?config, "loaded configuration");

    let now = Instant::now();
    let log = import_traces_from_path(&cli.input)
        .with_context(|| format!("failed to load traces from {}", cli.input.display()))?;
    tracing::info!(
        traces = log.traces.len(),
        elapsed = ?now.elapsed(),
        "imported traces"
    );

    let now = Instant::now();
    let result = discover_patterns(log, config).context("discovery failed")?;
    tracing::info!(
        rounds = result.records.len(),
        elapsed = ?now.elapsed(),
        "discovery done"
    );

    print!("{result}");

    if let Some(output_path) = &cli.output {
        let writer = BufWriter::new(
            File::create(output_path)
                .with_context(|| format!("failed to create {}", output_path.display()))?,
        );
        serde_json::to_writer(writer, &result).context("failed to write JSON result")?;
        tracing::info!(path = %output_path.display(), "wrote discovery result");
    }
    Ok(())
}
