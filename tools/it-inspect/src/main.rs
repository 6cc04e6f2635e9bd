//! IT Inspect
//!
//! Command-line viewer for Impulse Tracker modules: header summary, pattern
//! dumps and format detection.

mod cli;
mod config;
mod report;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Parser;
use nether_itfile::{ItFile, ReadOptions, read_it_with, sniff};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use config::InspectConfig;
use report::{Summary, render_pattern};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output stays clean
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = InspectConfig::load(cli.config.as_deref())?;
    debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Info { file, json } => {
            let module = load_module(&file, &config.read)?;
            let summary = Summary::from_file(&module);
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&summary).context("Failed to encode summary")?
                );
            } else {
                println!("{}", summary.to_text());
            }
        }
        Commands::Pattern { file, index } => {
            let module = load_module(&file, &config.read)?;
            let Some(pattern) = module.patterns.get(index) else {
                bail!(
                    "Pattern {} out of range ({} patterns)",
                    index,
                    module.patterns.len()
                );
            };
            info!(index, rows = pattern.rows, "unpacking pattern");
            for line in render_pattern(pattern, module.header.pattern_channels()) {
                println!("{line}");
            }
        }
        Commands::Sniff { file } => {
            let data = std::fs::read(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            match sniff(&data) {
                Some(format) => println!("{format}"),
                None => bail!("Unrecognized module format: {}", file.display()),
            }
        }
    }

    Ok(())
}

fn load_module(path: &Path, options: &ReadOptions) -> Result<ItFile> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let module = read_it_with(BufReader::new(file), options)
        .with_context(|| format!("Failed to decode {}", path.display()))?;
    info!(name = %module.header.name, "loaded {}", path.display());
    Ok(module)
}
