//! CLI module for multirange
//!
//! Provides command-line interface for:
//! - run: Index a delimited file and write per-row answer columns
//! - check: Validate a run configuration

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, LogLevel};
pub use commands::{
    build_catalog, check, run, run_batch, run_command, IndexEntry, RangeEntry, RecordCatalog,
    RunConfig, RunSummary,
};
pub use errors::{CliError, CliResult};
pub use io::{render_columns, write_columns, write_response, CsvReader, CsvTable, Record, NOT_APPLICABLE_CELL};
