//! Reading roster files into an in-memory [`Table`].
//!
//! Spreadsheets (`.xlsx`, `.xlsm`, `.xls`, `.ods`) go through calamine and
//! only the first sheet is read. `.csv` goes through the csv crate. Both
//! produce the same header row plus typed cells, so the reconciler never
//! cares where a row came from.

use std::path::Path;

use calamine::{open_workbook_auto, Data, DataType, Reader};
use chrono::NaiveDate;

use super::ImportError;

/// Roster file formats, detected by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    /// .xlsx, .xlsm, .xls, .ods
    Spreadsheet,
    /// .csv
    Csv,
}

/// Detect the roster format from the file extension.
pub fn detect_format(path: &Path) -> Result<SheetFormat, ImportError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "ods" => Ok(SheetFormat::Spreadsheet),
        "csv" => Ok(SheetFormat::Csv),
        _ => Err(ImportError::UnsupportedFormat(if ext.is_empty() {
            "(none)".to_string()
        } else {
            ext
        })),
    }
}

/// A single cell, typed as far as the source format allows.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Bool(bool),
}

impl Cell {
    /// Empty cells and whitespace-only text count as blank.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Render as trimmed text. Integral numbers drop the trailing `.0` so a
    /// numeric system id reads back as typed.
    pub fn as_text(&self) -> Option<String> {
        let text = match self {
            Cell::Empty => return None,
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Cell::Number(n) => n.to_string(),
            Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
            Cell::Bool(b) => b.to_string(),
        };
        (!text.is_empty()).then_some(text)
    }
}

/// Header row plus data rows. Rows may be shorter than the header; missing
/// trailing cells read as [`Cell::Empty`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&Cell::Empty)
    }

    /// First column whose trimmed header equals `name`.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }
}

/// Read a roster file from disk.
pub fn read_table(path: &Path) -> Result<Table, ImportError> {
    match detect_format(path)? {
        SheetFormat::Spreadsheet => read_spreadsheet(path),
        SheetFormat::Csv => {
            let file = std::fs::File::open(path).map_err(|e| ImportError::Read(e.to_string()))?;
            read_csv(file)
        }
    }
}

fn read_spreadsheet(path: &Path) -> Result<Table, ImportError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| ImportError::Read(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ImportError::Read("workbook has no sheets".to_string()))?
        .map_err(|e| ImportError::Read(e.to_string()))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Table::default());
    };
    let headers = header
        .iter()
        .map(|c| cell_from_data(c).as_text().unwrap_or_default())
        .collect();
    let rows = rows
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();

    Ok(Table { headers, rows })
}

/// Read CSV data with a header row. Ragged rows are accepted.
pub fn read_csv<R: std::io::Read>(reader: R) -> Result<Table, ImportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::None)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| ImportError::Read(e.to_string()))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| ImportError::Read(e.to_string()))?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.trim().is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(Table { headers, rows })
}

fn cell_from_data(cell: &Data) -> Cell {
    match cell {
        Data::Empty => Cell::Empty,
        Data::String(s) => {
            if s.trim().is_empty() {
                Cell::Empty
            } else {
                Cell::Text(s.clone())
            }
        }
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_date() {
            Some(d) => Cell::Date(d),
            None => Cell::Text(cell.to_string()),
        },
        Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(_) => Cell::Empty,
    }
}
