//! Campus Daemon
//!
//! Loads the anchor catalog and runs the embedding codec.
//!
//! # Usage
//!
//! ```bash
//! campus-daemon anchors check [--dir DIR]
//! campus-daemon anchors list [--ghosts]
//! campus-daemon anchors show <SLUG> [--ghost] [--include-reduced] [--include-html]
//! campus-daemon anchors watch [--interval-secs N]
//! campus-daemon vector encode --values 0.6,0.8
//! campus-daemon vector decode --data 76,102
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/campus-backend/config.toml)
//! 3. Environment variables (CAMPUS_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use campus_daemon::{handle_anchors, handle_vector, init_logging, load_settings, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(cli.config.as_deref(), cli.log_level.as_deref())?;
    init_logging(&settings)?;

    match cli.command {
        Commands::Anchors { dir, command } => {
            handle_anchors(&settings, dir.as_deref(), command).await?;
        }
        Commands::Vector { command } => {
            handle_vector(&settings, command)?;
        }
    }

    Ok(())
}
