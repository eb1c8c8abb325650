//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// nextrace - The next race of every category
#[derive(Debug, Parser)]
#[command(name = "nextrace")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "NEXTRACE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the next race of every category (default)
    Races {
        /// Print the flat event feed as JSON
        #[arg(long)]
        feed: bool,
    },

    /// Export races as an iCalendar document
    Calendar {
        /// Export a single category instead of the whole set
        #[arg(long)]
        category: Option<String>,

        /// Write to this file (or directory) instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// List the configured categories
    Categories,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}
