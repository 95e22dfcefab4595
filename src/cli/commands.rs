//! CLI commands and argument parsing

use crate::types::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Ad account extraction CLI
#[derive(Parser, Debug)]
#[command(name = "ads-extract")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run extraction jobs and write their output files
    Run {
        /// Jobs to run (comma-separated, empty = all)
        #[arg(long, value_delimiter = ',')]
        jobs: Vec<String>,

        /// Output file format
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Reporting window in days
        #[arg(long)]
        lookback_days: Option<u32>,

        /// Write the run report as JSON to this file
        #[arg(long)]
        report_json: Option<PathBuf>,
    },

    /// List configured jobs
    Jobs,

    /// Validate configuration and test access to the ad account
    Check {
        /// Only validate configuration, without contacting the API
        #[arg(long)]
        offline: bool,
    },
}
