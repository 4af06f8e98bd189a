use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Simple, file-backed farm shift scheduler CLI.
/// Storage defaults to ~/.farmhand/farm_tasks.json or a path passed via --db.
#[derive(Parser)]
#[command(name = "fh", version, about = "Farm work-shift scheduling CLI")]
pub struct Cli {
    /// Path to the JSON database file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
