//! Column-oriented report table rendered as a pipe-delimited (Markdown) table.
//!
//! Rows are appended in bulk while a run progresses; derived views are
//! computed afterwards:
//!
//! - `count_summary` / `set_summary_cell` fill an optional summary row that
//!   renders between the separator and the first data row
//! - `transform_column` produces a new table with one column rewritten,
//!   leaving the raw values of the receiver intact
//!
//! ### Output format
//! ```text
//! |Model|valid-sbml|
//! |---|---|
//! |n=2|n_fail=1|
//! |BIOMD1|pass|
//! |BIOMD2|FAIL|
//! ```
//! Cell text is written verbatim; values that may contain `|` or line breaks
//! must be normalized first (see [`crate::classify::normalize`]).

pub mod cell;
pub mod row;

pub use cell::Cell;
pub use row::RowSource;

use std::collections::HashSet;
use std::fmt::Write as _;

use crate::Error;

const DELIMITER: char = '|';
const SEPARATOR_CELL: &str = "---";

/// Report table with fixed, declared columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTable {
    labels: Vec<String>,
    keys: Vec<String>,
    /// One vector per column, indexed like `keys`.
    columns: Vec<Vec<Cell>>,
    summary: Option<Vec<String>>,
}

impl ReportTable {
    /// Declare a table from parallel label and key sequences.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTable` if the sequences differ in length, are
    /// empty, or if a key is repeated.
    pub fn new<L, K>(labels: L, keys: K) -> Result<Self, Error>
    where
        L: IntoIterator,
        L::Item: Into<String>,
        K: IntoIterator,
        K::Item: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();

        if labels.len() != keys.len() {
            return Err(Error::InvalidTable(format!("{} labels but {} keys", labels.len(), keys.len())));
        }
        if keys.is_empty() {
            return Err(Error::InvalidTable("at least one column is required".into()));
        }

        let mut seen = HashSet::with_capacity(keys.len());
        for key in &keys {
            if !seen.insert(key.as_str()) {
                return Err(Error::InvalidTable(format!("duplicate column key '{key}'")));
            }
        }

        let columns = vec![Vec::new(); keys.len()];
        Ok(Self { labels, keys, columns, summary: None })
    }

    /// Declare a table from delimited strings, e.g. `"Model |SBML"` and `"model_desc|sbml_file"`.
    ///
    /// Each part is trimmed, so labels may be padded for readability.
    ///
    /// # Errors
    ///
    /// Same as [`ReportTable::new`].
    pub fn parse(labels: &str, keys: &str) -> Result<Self, Error> {
        Self::new(labels.split(DELIMITER).map(str::trim), keys.split(DELIMITER).map(str::trim))
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn n_cols(&self) -> usize {
        self.keys.len()
    }

    fn index_of(&self, key: &str) -> Result<usize, Error> {
        self.keys
            .iter()
            .position(|k| k == key)
            .ok_or_else(|| Error::UnknownColumn(key.to_string()))
    }

    /// Append one row. Keys the table does not declare are ignored.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingColumn` for the first declared key the row
    /// cannot supply; the table is unchanged.
    pub fn append_row<R: RowSource + ?Sized>(&mut self, row: &R) -> Result<(), Error> {
        let cells = self
            .keys
            .iter()
            .map(|key| row.cell(key).ok_or_else(|| Error::MissingColumn(key.clone())))
            .collect::<Result<Vec<_>, _>>()?;

        for (column, cell) in self.columns.iter_mut().zip(cells) {
            column.push(cell);
        }
        Ok(())
    }

    /// Cells of one column in row order.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownColumn` if the key is not declared.
    pub fn column(&self, key: &str) -> Result<&[Cell], Error> {
        let idx = self.index_of(key)?;
        Ok(&self.columns[idx])
    }

    /// Return a copy of the table with every cell of `key` replaced by `f(cell)`.
    ///
    /// The summary row is carried over unchanged. Compute summaries that
    /// depend on raw values on the receiver before discarding it.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownColumn` if the key is not declared.
    pub fn transform_column<F>(&self, key: &str, f: F) -> Result<Self, Error>
    where
        F: FnMut(&Cell) -> Cell,
    {
        let idx = self.index_of(key)?;
        let mut next = self.clone();
        next.columns[idx] = self.columns[idx].iter().map(f).collect();
        Ok(next)
    }

    /// Summary row cells, if any summary has been set.
    pub fn summary(&self) -> Option<&[String]> {
        self.summary.as_deref()
    }

    /// Set one summary cell, creating a blank summary row on first use.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownColumn` if the key is not declared.
    pub fn set_summary_cell(&mut self, key: &str, text: impl Into<String>) -> Result<(), Error> {
        let idx = self.index_of(key)?;
        let n_cols = self.n_cols();
        let summary = self.summary.get_or_insert_with(|| vec![String::new(); n_cols]);
        summary[idx] = text.into();
        Ok(())
    }

    /// Count cells of `key` satisfying `predicate` and write `format` with
    /// `{count}` substituted into that column's summary cell.
    ///
    /// Returns the count.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownColumn` if the key is not declared.
    pub fn count_summary<P>(&mut self, key: &str, predicate: P, format: &str) -> Result<usize, Error>
    where
        P: Fn(&Cell) -> bool,
    {
        let count = self.column(key)?.iter().filter(|cell| predicate(cell)).count();
        self.set_summary_cell(key, format.replace("{count}", &count.to_string()))?;
        Ok(count)
    }

    /// Render the table as delimited text, one line per row, each line
    /// terminated by `\n`.
    pub fn render(&self) -> String {
        let mut out = String::new();

        push_line(&mut out, self.labels.iter().map(String::as_str));
        push_line(&mut out, self.keys.iter().map(|_| SEPARATOR_CELL));

        if let Some(summary) = &self.summary {
            push_line(&mut out, summary.iter().map(String::as_str));
        }

        for row in 0..self.n_rows() {
            out.push(DELIMITER);
            for column in &self.columns {
                let _ = write!(out, "{}{DELIMITER}", column[row]);
            }
            out.push('\n');
        }

        out
    }
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    out.push(DELIMITER);
    for cell in cells {
        out.push_str(cell);
        out.push(DELIMITER);
    }
    out.push('\n');
}
