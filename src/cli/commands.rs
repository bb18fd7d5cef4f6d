//! CLI command implementations
//!
//! `run` follows a fixed sequence:
//! 1. Load and validate the configuration
//! 2. Define one index per configured entry
//! 3. Ingest every input row at its position
//! 4. Evaluate the configured cross products for every row
//! 5. Write the answer columns, then print the metrics summary

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::index::{Catalog, CatalogConfig, QueryRange};
use crate::observability::{
    log_event_with_fields, Event, Logger, MetricsSnapshot, ObservationScope,
};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{write_columns, write_response, CsvReader, CsvTable, Record};

/// Catalog over input rows, keyed by cell text, positioned by integers
pub type RecordCatalog = Catalog<Record, String, i64>;

/// Batch run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Input file (required); relative paths resolve against the config file
    pub input: String,

    /// Input field delimiter (optional, default ',')
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Column holding each row's position (optional, default "pos")
    #[serde(default = "default_position_column")]
    pub position_column: String,

    /// Output file (optional, default "output.tsv")
    #[serde(default = "default_output")]
    pub output: String,

    /// Output field delimiter (optional, default tab)
    #[serde(default = "default_output_delimiter")]
    pub output_delimiter: String,

    /// Disable parallel ingestion and evaluation (optional, default false)
    #[serde(default)]
    pub sequential: bool,

    /// Indices to define (required, non-empty)
    pub indices: Vec<IndexEntry>,

    /// Position ranges every selected index is evaluated over
    #[serde(default)]
    pub ranges: Vec<RangeEntry>,

    /// Ids evaluated with exact queries
    #[serde(default)]
    pub query: Vec<String>,

    /// Ids evaluated with prefix counts
    #[serde(default)]
    pub count: Vec<String>,
}

/// One configured index: an id and its ordered criterion columns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: String,
    pub criteria: Vec<String>,
}

/// One configured position range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeEntry {
    #[serde(default)]
    pub name: Option<String>,
    pub start: i64,
    pub end: i64,
}

impl RangeEntry {
    pub fn to_range(&self) -> QueryRange<i64> {
        match &self.name {
            Some(name) => QueryRange::named(name.clone(), self.start, self.end),
            None => QueryRange::new(self.start, self.end),
        }
    }
}

fn default_delimiter() -> char {
    ','
}
fn default_position_column() -> String {
    "pos".to_string()
}
fn default_output() -> String {
    "output.tsv".to_string()
}
fn default_output_delimiter() -> String {
    "\t".to_string()
}

impl RunConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        let config: RunConfig = serde_json::from_str(&content).map_err(CliError::ConfigParse)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> CliResult<()> {
        if self.input.is_empty() {
            return Err(CliError::invalid("input must not be empty"));
        }
        if !self.delimiter.is_ascii() || matches!(self.delimiter, '"' | '\n' | '\r') {
            return Err(CliError::invalid(format!(
                "Invalid delimiter: {:?}",
                self.delimiter
            )));
        }
        if self.position_column.is_empty() {
            return Err(CliError::invalid("position_column must not be empty"));
        }
        if self.output_delimiter.is_empty() {
            return Err(CliError::invalid("output_delimiter must not be empty"));
        }

        // Indices
        if self.indices.is_empty() {
            return Err(CliError::invalid("at least one index is required"));
        }
        let mut ids = HashSet::new();
        for index in &self.indices {
            if index.id.is_empty() {
                return Err(CliError::invalid("index id must not be empty"));
            }
            if !ids.insert(index.id.as_str()) {
                return Err(CliError::invalid(format!("duplicate index id '{}'", index.id)));
            }
            if index.criteria.is_empty() || index.criteria.iter().any(String::is_empty) {
                return Err(CliError::invalid(format!(
                    "index '{}' needs at least one non-empty criterion column",
                    index.id
                )));
            }
        }

        // Selections
        for id in self.query.iter().chain(&self.count) {
            if !ids.contains(id.as_str()) {
                return Err(CliError::invalid(format!("unknown index id '{}'", id)));
            }
        }

        // Ranges
        if self.ranges.is_empty() && !(self.query.is_empty() && self.count.is_empty()) {
            return Err(CliError::invalid("at least one range is required"));
        }
        let mut names = HashSet::new();
        for range in self.query_ranges() {
            if !names.insert(range.name().to_string()) {
                return Err(CliError::invalid(format!(
                    "duplicate range name '{}'",
                    range.name()
                )));
            }
        }

        Ok(())
    }

    /// Configured ranges
    pub fn query_ranges(&self) -> Vec<QueryRange<i64>> {
        self.ranges.iter().map(RangeEntry::to_range).collect()
    }

    /// Catalog configuration for this run
    pub fn catalog_config(&self) -> CatalogConfig {
        if self.sequential {
            CatalogConfig::sequential()
        } else {
            CatalogConfig::parallel()
        }
    }

    /// Input path, resolved against `base`
    pub fn input_path(&self, base: &Path) -> PathBuf {
        base.join(&self.input)
    }

    /// Output path, resolved against `base`
    pub fn output_path(&self, base: &Path) -> PathBuf {
        base.join(&self.output)
    }

    fn check_columns(&self, table: &CsvTable) -> CliResult<()> {
        let required = self
            .indices
            .iter()
            .flat_map(|index| &index.criteria)
            .chain(std::iter::once(&self.position_column));
        for column in required {
            if !table.has_column(column) {
                return Err(CliError::invalid(format!(
                    "input has no column '{}'",
                    column
                )));
            }
        }
        Ok(())
    }
}

/// Outcome of a batch run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub output: PathBuf,
    pub rows: usize,
    pub columns: usize,
    pub metrics: MetricsSnapshot,
}

/// Main entry point for CLI
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    Logger::set_min_severity(cli.log_level.into());
    run_command(cli.command).map_err(|e| {
        log_event_with_fields(
            Event::RunFailed,
            &[("code", e.code()), ("reason", &e.to_string())],
        );
        e
    })
}

/// Dispatch a parsed command
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Run { config } => {
            let summary = run_batch(&config)?;
            write_response(serde_json::to_value(&summary)?)
        }
        Command::Check { config } => {
            let config = check(&config)?;
            write_response(json!({
                "indices": config.indices.len(),
                "ranges": config.ranges.len(),
                "query": config.query,
                "count": config.count,
            }))
        }
    }
}

/// Load and validate a configuration without running it
pub fn check(config_path: &Path) -> CliResult<RunConfig> {
    let config = RunConfig::load(config_path)?;
    log_event_with_fields(
        Event::ConfigLoaded,
        &[("path", &config_path.display().to_string())],
    );
    Ok(config)
}

/// Execute a batch run described by the configuration file
pub fn run_batch(config_path: &Path) -> CliResult<RunSummary> {
    let config = check(config_path)?;
    let base = config_path.parent().unwrap_or_else(|| Path::new("."));

    let table = CsvReader::new(config.delimiter).read_path(&config.input_path(base))?;
    config.check_columns(&table)?;

    let catalog = build_catalog(&config)?;
    ingest(&config, &catalog, &table.records)?;

    let columns = evaluate(&config, &catalog, &table.records)?;

    let output = config.output_path(base);
    write_columns(&output, &columns, &config.output_delimiter)?;
    log_event_with_fields(
        Event::OutputWritten,
        &[
            ("columns", &columns.len().to_string()),
            ("path", &output.display().to_string()),
            ("rows", &table.records.len().to_string()),
        ],
    );

    Ok(RunSummary {
        output,
        rows: table.records.len(),
        columns: columns.len(),
        metrics: catalog.metrics().snapshot(),
    })
}

/// Define one index per configured entry, keyed by its criterion columns
pub fn build_catalog(config: &RunConfig) -> CliResult<RecordCatalog> {
    let catalog = RecordCatalog::with_config(config.catalog_config());
    for index in &config.indices {
        let criteria = index.criteria.clone();
        catalog.define(index.id.clone(), move |record: &Record| record.keys(&criteria))?;
    }
    Ok(catalog)
}

fn position_of(record: &Record, column: &str) -> CliResult<i64> {
    let cell = record
        .get(column)
        .ok_or_else(|| CliError::csv(record.line(), format!("missing position in '{}'", column)))?;
    cell.trim().parse().map_err(|_| {
        CliError::csv(record.line(), format!("invalid position '{}'", cell))
    })
}

fn ingest(config: &RunConfig, catalog: &RecordCatalog, records: &[Record]) -> CliResult<()> {
    let scope = ObservationScope::with_fields("INGEST", &[("rows", &records.len().to_string())]);

    let positions = match records
        .iter()
        .map(|record| position_of(record, &config.position_column))
        .collect::<CliResult<Vec<i64>>>()
    {
        Ok(positions) => positions,
        Err(e) => {
            scope.fail(&e.to_string());
            return Err(e);
        }
    };

    let landed: usize = if config.sequential {
        records
            .iter()
            .zip(&positions)
            .map(|(record, &position)| catalog.add(record, position))
            .sum()
    } else {
        records
            .par_iter()
            .zip(positions.par_iter())
            .map(|(record, &position)| catalog.add(record, position))
            .sum()
    };

    scope.complete_with_fields(&[("observations", &landed.to_string())]);
    Ok(())
}

fn evaluate(
    config: &RunConfig,
    catalog: &RecordCatalog,
    records: &[Record],
) -> CliResult<BTreeMap<String, Vec<i64>>> {
    let scope = ObservationScope::with_fields("EVALUATE", &[("rows", &records.len().to_string())]);
    let ranges = config.query_ranges();

    let row_answers = |record: &Record| -> CliResult<BTreeMap<String, i64>> {
        let mut answers = catalog
            .query_many(record, &config.query, &ranges)?
            .to_flat_map();
        answers.extend(catalog.count_many(record, &config.count, &ranges)?.to_flat_map());
        Ok(answers)
    };

    let rows = if config.sequential {
        records.iter().map(row_answers).collect::<CliResult<Vec<_>>>()
    } else {
        records.par_iter().map(row_answers).collect::<CliResult<Vec<_>>>()
    };
    let rows = match rows {
        Ok(rows) => rows,
        Err(e) => {
            scope.fail(&e.to_string());
            return Err(e);
        }
    };

    let mut columns: BTreeMap<String, Vec<i64>> = BTreeMap::new();
    for answers in rows {
        for (label, value) in answers {
            columns.entry(label).or_default().push(value);
        }
    }

    scope.complete_with_fields(&[("columns", &columns.len().to_string())]);
    Ok(columns)
}
