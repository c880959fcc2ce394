//! CLI argument parsing for the campus daemon.
//!
//! CLI flags override all other config sources.

use clap::{Parser, Subcommand};

/// Campus backend daemon
///
/// Loads the anchor catalog and exposes the vector codec from the command line.
#[derive(Parser, Debug)]
#[command(name = "campus-daemon")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/campus-backend/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Anchor catalog commands
    Anchors {
        /// Anchor directory (default from config)
        #[arg(long, global = true)]
        dir: Option<String>,

        #[command(subcommand)]
        command: AnchorCommands,
    },

    /// Vector codec commands
    Vector {
        #[command(subcommand)]
        command: VectorCommands,
    },
}

/// Anchor subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum AnchorCommands {
    /// Load and validate all anchor documents
    Check,

    /// List anchors as JSON
    List {
        /// List ghost anchors instead of normal anchors
        #[arg(long)]
        ghosts: bool,
    },

    /// Show one anchor as JSON
    Show {
        /// Anchor slug
        slug: String,

        /// Look the slug up among ghost anchors
        #[arg(long)]
        ghost: bool,

        /// Include reduced vector floats
        #[arg(long)]
        include_reduced: bool,

        /// Inline instructions HTML if available
        #[arg(long)]
        include_html: bool,
    },

    /// Load, then reload periodically until interrupted
    Watch {
        /// Seconds between reloads (default from config)
        #[arg(long)]
        interval_secs: Option<u64>,
    },
}

/// Vector subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum VectorCommands {
    /// Encode floats into signed 8-bit components
    Encode {
        /// Comma-separated floats
        #[arg(long, allow_hyphen_values = true, conflicts_with = "file")]
        values: Option<String>,

        /// JSON file containing an array of floats
        #[arg(long)]
        file: Option<String>,
    },

    /// Decode signed 8-bit components back to floats
    Decode {
        /// Comma-separated components in [-127, 127]
        #[arg(long, allow_hyphen_values = true)]
        data: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_anchor_show() {
        let cli = Cli::try_parse_from([
            "campus-daemon",
            "anchors",
            "--dir",
            "/srv/anchors",
            "show",
            "study-buddy",
            "--ghost",
            "--include-html",
        ])
        .unwrap();

        match cli.command {
            Commands::Anchors { dir, command } => {
                assert_eq!(dir.as_deref(), Some("/srv/anchors"));
                match command {
                    AnchorCommands::Show {
                        slug,
                        ghost,
                        include_reduced,
                        include_html,
                    } => {
                        assert_eq!(slug, "study-buddy");
                        assert!(ghost);
                        assert!(!include_reduced);
                        assert!(include_html);
                    }
                    other => panic!("unexpected command {:?}", other),
                }
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_vector_encode_negative_values() {
        let cli = Cli::try_parse_from([
            "campus-daemon",
            "--log-level",
            "warn",
            "vector",
            "encode",
            "--values",
            "-0.6,0.8",
        ])
        .unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("warn"));
        match cli.command {
            Commands::Vector {
                command: VectorCommands::Encode { values, file },
            } => {
                assert_eq!(values.as_deref(), Some("-0.6,0.8"));
                assert!(file.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_encode_sources_conflict() {
        let result = Cli::try_parse_from([
            "campus-daemon",
            "vector",
            "encode",
            "--values",
            "1,0",
            "--file",
            "v.json",
        ]);
        assert!(result.is_err());
    }
}
