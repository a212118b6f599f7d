//! Preview rows and their classification.

use std::fmt;

use league_core::ImportKind;
use serde::{Deserialize, Serialize};

use crate::availability::AvailabilityColumn;
use crate::diff::reconcile_row;
use crate::error::RowIssue;
use crate::mapping::ColumnMapping;
use crate::parser::ParsedTable;
use crate::rows::ImportRow;
use crate::state::LeagueState;

/// What committing a row would do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Add,
    Update,
    Duplicate,
    Error,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Update => "update",
            Self::Duplicate => "duplicate",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field an update would change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub old: String,
    pub new: String,
}

impl FieldChange {
    pub fn new(field: impl Into<String>, old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            old: old.into(),
            new: new.into(),
        }
    }
}

/// A classified source row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewRow {
    pub line: usize,
    /// Mapped `(field, raw cell)` pairs, kept for reporting.
    pub source: Vec<(String, String)>,
    /// The normalized row; absent for error rows.
    pub row: Option<ImportRow>,
    pub classification: Classification,
    /// Present exactly when `classification` is `Error`.
    pub error: Option<RowIssue>,
    pub changes: Vec<FieldChange>,
    pub notes: Vec<String>,
}

impl PreviewRow {
    pub fn is_error(&self) -> bool {
        self.classification == Classification::Error
    }

    /// Short description of the row for listings.
    pub fn describe(&self) -> String {
        match &self.row {
            Some(row) => row.describe(),
            None => self
                .source
                .iter()
                .map(|(_, v)| v.trim())
                .filter(|v| !v.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Classification counts for a preview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewSummary {
    pub add: usize,
    pub update: usize,
    pub duplicate: usize,
    pub error: usize,
}

impl PreviewSummary {
    pub fn total(&self) -> usize {
        self.add + self.update + self.duplicate + self.error
    }
}

pub fn summarize(rows: &[PreviewRow]) -> PreviewSummary {
    let mut summary = PreviewSummary::default();
    for row in rows {
        match row.classification {
            Classification::Add => summary.add += 1,
            Classification::Update => summary.update += 1,
            Classification::Duplicate => summary.duplicate += 1,
            Classification::Error => summary.error += 1,
        }
    }
    summary
}

/// Classify every row of `table`, in file order.
///
/// `state` receives the changes of each non-error row as it goes.
pub fn build_preview(
    kind: ImportKind,
    table: &ParsedTable,
    mapping: &ColumnMapping,
    columns: &[AvailabilityColumn],
    state: &mut LeagueState,
) -> Vec<PreviewRow> {
    let rows: Vec<PreviewRow> = table
        .rows
        .iter()
        .map(|raw| {
            let source = mapping
                .entries(kind)
                .into_iter()
                .filter_map(|(field, header)| {
                    let header = header?;
                    Some((field.to_string(), raw.get(header).unwrap_or("").to_string()))
                })
                .collect();
            match reconcile_row(kind, raw, mapping, columns, state) {
                Ok(r) => PreviewRow {
                    line: raw.line,
                    source,
                    row: Some(r.row),
                    classification: r.classification,
                    error: None,
                    changes: r.changes,
                    notes: r.notes,
                },
                Err(issue) => {
                    log::debug!("Line {}: {issue}", raw.line);
                    PreviewRow {
                        line: raw.line,
                        source,
                        row: None,
                        classification: Classification::Error,
                        error: Some(issue),
                        changes: Vec::new(),
                        notes: Vec::new(),
                    }
                }
            }
        })
        .collect();

    let summary = summarize(&rows);
    log::info!(
        "Preview: {} add, {} update, {} duplicate, {} error",
        summary.add,
        summary.update,
        summary.duplicate,
        summary.error
    );
    rows
}
