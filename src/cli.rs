//! Uses clap to define the CLI interface declaratively.
use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// TOML settings; defaults apply when the file doesn't exist
    #[arg(short, default_value = "readyset.toml", long, value_name = "FILE")]
    pub config: PathBuf,

    /// Log level (error, warn, info, debug, trace), overrides the config
    #[arg(short, long)]
    pub level: Option<String>,

    /// Milliseconds to wait for readiness; 0 polls, negative blocks
    #[arg(short, long, allow_negative_numbers = true)]
    pub timeout: Option<i32>,

    /// Largest batch of events taken per wait
    #[arg(short, long)]
    pub max_events: Option<usize>,

    /// Register interest level-triggered instead of edge-triggered
    #[arg(long)]
    pub level_triggered: bool,

    /// Files or FIFOs to watch; stdin when none are given
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,
}
