//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// report-notifier: post a chat message for every newly reported post
#[derive(Parser, Debug)]
#[command(name = "report-notifier")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch reports once, notify new ones, and save the seen-set
    Run(RunArgs),

    /// Inspect or initialize the persisted seen-set
    State(StateArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Validate configuration and show status
    Doctor(DoctorArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Log messages instead of sending them and skip saving state
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct StateArgs {
    #[command(subcommand)]
    pub command: StateCommands,
}

#[derive(Subcommand, Debug)]
pub enum StateCommands {
    /// Print the persisted seen-set
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write an empty seen-set blob
    Init {
        /// Overwrite an existing blob
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Init {
        /// Path to write config file
        #[arg(long, default_value = "./config.toml")]
        path: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
