//! CLI command definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "it-inspect")]
#[command(about = "Inspect Impulse Tracker modules")]
pub struct Cli {
    /// TOML file with decoder options
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print a summary of an IT file
    Info {
        /// Path to the IT file
        file: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Unpack one pattern and print its rows
    Pattern {
        /// Path to the IT file
        file: PathBuf,

        /// Pattern index (pointer-table order)
        index: usize,
    },
    /// Detect the tracker format of a file
    Sniff {
        /// Path to the module file
        file: PathBuf,
    },
}
