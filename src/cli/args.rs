//! CLI argument definitions using clap
//!
//! Commands:
//! - multirange run --config <path>
//! - multirange check --config <path>
//!
//! `--log-level` applies to every command.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::observability::Severity;

/// multirange - multi-criteria range counting over positioned records
#[derive(Parser, Debug)]
#[command(name = "multirange")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Lowest severity written to the log
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Command,
}

/// Log threshold accepted on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Info,
    Warn,
    Error,
    Fatal,
}

impl From<LogLevel> for Severity {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Severity::Trace,
            LogLevel::Info => Severity::Info,
            LogLevel::Warn => Severity::Warn,
            LogLevel::Error => Severity::Error,
            LogLevel::Fatal => Severity::Fatal,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Index the input file and write one answer column per (index, range)
    Run {
        /// Path to configuration file
        #[arg(long, default_value = "./multirange.json")]
        config: PathBuf,
    },

    /// Load and validate the configuration, then exit
    Check {
        /// Path to configuration file
        #[arg(long, default_value = "./multirange.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
