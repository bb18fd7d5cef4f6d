//! File I/O for the batch runner
//!
//! - Input: delimited text with a header row, RFC 4180 quoting (csv crate)
//! - Output: one column per answer label, `NA` for not-applicable cells
//! - Summary: single JSON object on stdout
//! - UTF-8 only

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;

use csv::{ReaderBuilder, StringRecord};
use serde_json::Value;

use crate::index::{KeySequence, NOT_APPLICABLE};

use super::errors::{CliError, CliResult};

/// Cell text for a not-applicable answer
pub const NOT_APPLICABLE_CELL: &str = "NA";

/// One data row, addressable by header column.
#[derive(Debug, Clone)]
pub struct Record {
    columns: Arc<HashMap<String, usize>>,
    values: StringRecord,
    line: usize,
}

impl Record {
    /// Cell of `column`; `None` if the column is unknown or the cell is empty
    pub fn get(&self, column: &str) -> Option<&str> {
        let index = *self.columns.get(column)?;
        self.values.get(index).filter(|value| !value.is_empty())
    }

    /// Criterion values of `columns`, in order; empty cells are missing
    pub fn keys(&self, columns: &[String]) -> KeySequence<String> {
        columns
            .iter()
            .map(|column| self.get(column).map(str::to_owned))
            .collect()
    }

    /// 1-based line the row starts on
    pub fn line(&self) -> usize {
        self.line
    }
}

/// Parsed input: header plus data rows
#[derive(Debug, Clone)]
pub struct CsvTable {
    pub header: Vec<String>,
    pub records: Vec<Record>,
}

impl CsvTable {
    /// Whether the header declares `column`
    pub fn has_column(&self, column: &str) -> bool {
        self.header.iter().any(|c| c == column)
    }
}

/// Reader for delimited files with a header row
#[derive(Debug, Clone, Copy)]
pub struct CsvReader {
    delimiter: char,
}

impl Default for CsvReader {
    fn default() -> Self {
        Self::new(',')
    }
}

impl CsvReader {
    pub fn new(delimiter: char) -> Self {
        Self { delimiter }
    }

    /// Read and parse a whole file
    pub fn read_path(&self, path: &Path) -> CliResult<CsvTable> {
        let file = File::open(path)?;
        self.read_from(file)
    }

    /// Parse delimited text; the first row is the header
    pub fn read_str(&self, text: &str) -> CliResult<CsvTable> {
        self.read_from(text.as_bytes())
    }

    fn read_from<R: Read>(&self, source: R) -> CliResult<CsvTable> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter_byte()?)
            .has_headers(true)
            .from_reader(source);

        let header: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();
        if header.is_empty() {
            return Err(CliError::csv(1, "missing header row"));
        }

        let mut columns = HashMap::with_capacity(header.len());
        for (index, column) in header.iter().enumerate() {
            if columns.insert(column.clone(), index).is_some() {
                return Err(CliError::csv(1, format!("duplicate column '{}'", column)));
            }
        }
        let columns = Arc::new(columns);

        let mut records = Vec::new();
        for row in reader.records() {
            let values = row?;
            let line = values.position().map_or(0, |pos| pos.line() as usize);
            records.push(Record {
                columns: Arc::clone(&columns),
                values,
                line,
            });
        }

        Ok(CsvTable { header, records })
    }

    fn delimiter_byte(&self) -> CliResult<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                CliError::invalid(format!("delimiter {:?} is not ASCII", self.delimiter))
            })
    }
}

/// Write labelled columns as delimited text: a header of labels in sorted
/// order, then one line per row. Not-applicable cells are written as `NA`.
pub fn write_columns(
    path: &Path,
    columns: &BTreeMap<String, Vec<i64>>,
    delimiter: &str,
) -> CliResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    render_columns(&mut writer, columns, delimiter)?;
    writer.flush()?;
    Ok(())
}

/// Render labelled columns to any writer.
pub fn render_columns<W: Write>(
    writer: &mut W,
    columns: &BTreeMap<String, Vec<i64>>,
    delimiter: &str,
) -> CliResult<()> {
    let rows = columns.values().next().map_or(0, Vec::len);
    if let Some((label, _)) = columns.iter().find(|(_, cells)| cells.len() != rows) {
        return Err(CliError::Io(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("column '{}' has a different length", label),
        )));
    }

    let header: Vec<&str> = columns.keys().map(String::as_str).collect();
    writeln!(writer, "{}", header.join(delimiter))?;

    for row in 0..rows {
        let cells: Vec<String> = columns
            .values()
            .map(|cells| match cells[row] {
                NOT_APPLICABLE => NOT_APPLICABLE_CELL.to_string(),
                value => value.to_string(),
            })
            .collect();
        writeln!(writer, "{}", cells.join(delimiter))?;
    }

    Ok(())
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });

    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}
