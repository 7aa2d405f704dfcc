//! Command-line argument definitions
//!
//! This module defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Hue-preserving dark mode for already-rendered pages
#[derive(Parser, Debug)]
#[command(name = "blab")]
#[command(author = "Vihaan Reddy M")]
#[command(version = "1.0.0")]
#[command(about = "Because Light Attracts Bugs: recolor rendered pages into dark mode", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level: error, warn, info, debug, trace (overrides config)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Remap a color toward the dark bands (background treatment)
    Darken {
        /// Color as #rrggbb or rgb(r, g, b)
        color: String,
    },

    /// Remap a color toward the light bands (text treatment)
    Lighten {
        /// Color as #rrggbb or rgb(r, g, b)
        color: String,
    },

    /// Show how a color is parsed and what both remaps produce
    Inspect {
        /// Color as #rrggbb, rgb(r, g, b), rgba(r, g, b, a) or transparent
        color: String,
    },

    /// Activate dark mode on a page snapshot and print the result
    ///
    /// The snapshot is a JSON description of the page: the element tree with
    /// each element's resolved colors, the root custom properties, and any
    /// subtrees inserted after activation.
    Apply {
        /// Page snapshot (JSON)
        page: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Also remap borders on the snapshot's inserted elements (overrides config)
        #[arg(long)]
        incremental_borders: Option<bool>,
    },

    /// Run a built-in page scenario (or `all`)
    Scenario {
        /// Scenario name, see `list-scenarios`
        name: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List built-in page scenarios
    ListScenarios {
        /// Filter by tag
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// Show current configuration
    ShowConfig,

    /// Generate a configuration file at a specific location
    GenerateConfig {
        /// Output path for the config file (defaults to standard location)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_apply() {
        let args = Args::parse_from(["blab", "apply", "page.json", "--json", "-l", "debug"]);
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        match args.command {
            Commands::Apply { page, json, .. } => {
                assert_eq!(page, PathBuf::from("page.json"));
                assert!(json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_color_with_spaces() {
        let args = Args::parse_from(["blab", "darken", "rgb(255, 255, 255)"]);
        assert!(matches!(args.command, Commands::Darken { color } if color == "rgb(255, 255, 255)"));
    }
}
