//! Campus daemon library exports.
//!
//! This crate provides the CLI binary for the campus backend core.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (anchors, vector)

pub mod cli;
pub mod commands;

pub use cli::{AnchorCommands, Cli, Commands, VectorCommands};
pub use commands::{
    build_catalog, handle_anchors, handle_vector, init_logging, load_settings, watch_anchors,
};
