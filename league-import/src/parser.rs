//! Delimited-text parsing into header-keyed raw rows.
//!
//! Quoting follows RFC 4180 via the `csv` crate. The reader runs in flexible
//! mode so rows with the wrong number of cells reach us instead of aborting
//! the whole file; what happens to them depends on [`ParseMode`].

use league_core::Delimiter;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

const BOM: char = '\u{feff}';

/// How rows whose cell count differs from the header are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Drop mismatched rows.
    Lenient,
    /// Keep mismatched rows, flagged as malformed.
    Strict,
}

/// Cell count of a row that does not match its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellCountMismatch {
    pub expected: usize,
    pub found: usize,
}

/// One data row, keyed by header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    /// 1-based source line; the header is line 1.
    pub line: usize,
    /// `(header, raw cell)` pairs in column order.
    pub cells: Vec<(String, String)>,
    pub malformed: Option<CellCountMismatch>,
}

impl RawRow {
    /// Raw cell under `header`. The first column wins if headers repeat.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }
}

/// A parsed file: trimmed headers plus data rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// Parse `text` into headers and rows.
pub fn parse_table(
    text: &str,
    delimiter: Delimiter,
    mode: ParseMode,
) -> Result<ParsedTable, ParseError> {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter.as_byte())
        .from_reader(text.as_bytes());

    let mut records = reader.records();
    let headers: Vec<String> = match records.next() {
        None => return Err(ParseError::Empty),
        Some(record) => record?.iter().map(|h| h.trim().to_string()).collect(),
    };
    if headers.iter().all(|h| h.is_empty()) {
        return Err(ParseError::NoHeaders);
    }

    let mut rows = Vec::new();
    let mut dropped = 0usize;
    for record in records {
        let record = record?;
        if is_blank(&record) {
            continue;
        }
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        let malformed = (record.len() != headers.len()).then_some(CellCountMismatch {
            expected: headers.len(),
            found: record.len(),
        });
        if malformed.is_some() && mode == ParseMode::Lenient {
            dropped += 1;
            continue;
        }
        let cells = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.clone(), v.to_string()))
            .collect();
        rows.push(RawRow {
            line,
            cells,
            malformed,
        });
    }

    if dropped > 0 {
        log::debug!("Dropped {dropped} row(s) with the wrong number of cells");
    }

    Ok(ParsedTable { headers, rows })
}

/// Read just the header row.
pub fn read_headers(text: &str, delimiter: Delimiter) -> Result<Vec<String>, ParseError> {
    parse_table(text, delimiter, ParseMode::Lenient).map(|t| t.headers)
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.iter().all(|cell| cell.trim().is_empty())
}
