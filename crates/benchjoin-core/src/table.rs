//! In-memory tables and their CSV representation.
//!
//! Every input file is read into a [`Table`] of typed [`Cell`]s and the final
//! summary is written back out from one. Cells are typed once on read so that
//! grouping can compare numeric keys by value (`4` and `4.0` are the same
//! configuration) and reduction can pull numbers without re-parsing.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::{JoinError, Result};

/// A single typed CSV field.
#[derive(Debug, Clone)]
pub enum Cell {
    /// Empty field
    Missing,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    /// Type a raw CSV field: empty, then integer, then float, else text.
    ///
    /// # Examples
    ///
    /// ```
    /// use benchjoin_core::table::Cell;
    ///
    /// assert_eq!(Cell::parse("8"), Cell::Int(8));
    /// assert_eq!(Cell::parse("0.25"), Cell::Float(0.25));
    /// assert_eq!(Cell::parse("static"), Cell::Text("static".to_string()));
    /// assert!(Cell::parse("  ").is_missing());
    /// ```
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Missing;
        }
        if let Ok(value) = trimmed.parse::<i64>() {
            return Cell::Int(value);
        }
        if let Ok(value) = trimmed.parse::<f64>() {
            return Cell::Float(value);
        }
        Cell::Text(trimmed.to_string())
    }

    /// Numeric value of the cell, if it holds one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(value) => Some(*value as f64),
            Cell::Float(value) => Some(*value),
            Cell::Missing | Cell::Text(_) => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    // Numbers sort first, then text, then missing.
    fn rank(&self) -> u8 {
        match self {
            Cell::Int(_) | Cell::Float(_) => 0,
            Cell::Text(_) => 1,
            Cell::Missing => 2,
        }
    }
}

impl Ord for Cell {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Cell::Int(a), Cell::Int(b)) => a.cmp(b),
            (Cell::Float(a), Cell::Float(b)) => compare_floats(*a, *b),
            (Cell::Int(a), Cell::Float(b)) => compare_int_float(*a, *b),
            (Cell::Float(a), Cell::Int(b)) => compare_int_float(*b, *a).reverse(),
            (Cell::Text(a), Cell::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

// -0.0 and 0.0 are equal; NaN falls back to the total order (sign decides).
fn compare_floats(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or_else(|| a.total_cmp(&b))
}

// Exact comparison without rounding the integer through f64.
fn compare_int_float(int: i64, float: f64) -> Ordering {
    const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;

    if float.is_nan() {
        return if float.is_sign_negative() {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    if float >= TWO_POW_63 {
        return Ordering::Less;
    }
    if float < -TWO_POW_63 {
        return Ordering::Greater;
    }

    let whole = float.trunc();
    match int.cmp(&(whole as i64)) {
        Ordering::Equal => whole.partial_cmp(&float).unwrap_or(Ordering::Equal),
        ordering => ordering,
    }
}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Cell {}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Missing => Ok(()),
            Cell::Int(value) => write!(f, "{}", value),
            Cell::Float(value) => f.write_str(&format_float(*value)),
            Cell::Text(value) => f.write_str(value),
        }
    }
}

/// Render a float the way the summary tables expect it.
///
/// Whole numbers keep one decimal (`1.0`), undefined results print as `NaN`.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "inf" } else { "-inf" }.to_string()
    } else if value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Column-named rows of typed cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Append a row. The row must have one cell per column.
    pub fn push_row(&mut self, row: Vec<Cell>) {
        debug_assert_eq!(row.len(), self.columns.len(), "row width mismatch");
        self.rows.push(row);
    }

    /// Insert a column holding the same value in every row.
    pub fn insert_column(&mut self, index: usize, name: impl Into<String>, value: Cell) {
        let index = index.min(self.columns.len());
        self.columns.insert(index, name.into());
        for row in &mut self.rows {
            row.insert(index, value.clone());
        }
    }

    /// Append all rows of `other`, matching columns by name.
    ///
    /// Both tables must carry the same set of columns; the column order of
    /// `self` is kept. An empty `self` with no columns adopts `other`'s.
    pub fn extend_from(&mut self, other: Table, origin: &Path) -> Result<()> {
        if self.columns.is_empty() && self.rows.is_empty() {
            *self = other;
            return Ok(());
        }

        let mine: HashSet<&str> = self.columns.iter().map(String::as_str).collect();
        let theirs: HashSet<&str> = other.columns.iter().map(String::as_str).collect();
        if mine != theirs {
            let mut missing: Vec<&str> = mine.difference(&theirs).copied().collect();
            let mut extra: Vec<&str> = theirs.difference(&mine).copied().collect();
            missing.sort_unstable();
            extra.sort_unstable();
            return Err(JoinError::shape(
                origin,
                format!(
                    "column set differs from earlier sources (missing: {:?}, unexpected: {:?})",
                    missing, extra
                ),
            ));
        }

        let mapping: Vec<usize> = self
            .columns
            .iter()
            .filter_map(|name| other.column_index(name))
            .collect();
        for row in other.rows {
            self.rows
                .push(mapping.iter().map(|&index| row[index].clone()).collect());
        }
        Ok(())
    }

    /// Read a CSV file with a header row.
    pub fn read_csv(path: &Path) -> Result<Table> {
        let file = File::open(path).map_err(|e| JoinError::io(path, e))?;
        Self::from_reader(file, path)
    }

    /// Read CSV data with a header row; `origin` names the source in errors.
    pub fn from_reader<R: Read>(reader: R, origin: &Path) -> Result<Table> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| JoinError::csv(origin, e))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut seen = HashSet::new();
        if let Some(duplicate) = columns.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(JoinError::shape(
                origin,
                format!("duplicate column '{}'", duplicate),
            ));
        }

        let mut table = Table::new(columns);
        for record in reader.records() {
            let record = record.map_err(|e| JoinError::csv(origin, e))?;
            table.push_row(record.iter().map(Cell::parse).collect());
        }
        Ok(table)
    }

    /// Serialize as CSV with a header row.
    pub fn write_csv<W: Write>(&self, writer: W) -> csv::Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(|cell| cell.to_string()))?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)
            .map_err(|e| JoinError::csv("<memory>", e))?;
        String::from_utf8(buffer).map_err(|e| {
            JoinError::io("<memory>", std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })
    }
}
