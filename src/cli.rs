use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Drive a progressive gallery loader from the terminal
#[derive(Parser)]
#[command(name = "gallery")]
#[command(about = "Run a \"load more\" gallery against a mock or recorded data source", long_about = None)]
pub struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load pages from the simulated API
    Demo {
        /// Override the configured page limit
        #[arg(long)]
        max_pages: Option<u32>,
        /// Override the simulated latency
        #[arg(long)]
        latency_ms: Option<u64>,
        /// Number of button presses (defaults to enough to exhaust the gallery)
        #[arg(long)]
        clicks: Option<usize>,
        /// Make the fetch for this page fail
        #[arg(long)]
        fail_page: Option<u32>,
    },
    /// Load pages from a JSON file of recorded batches
    Replay {
        file: PathBuf,
        #[arg(long)]
        max_pages: Option<u32>,
        #[arg(long)]
        clicks: Option<usize>,
    },
    /// Print the effective configuration
    Config,
}
