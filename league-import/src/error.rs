//! Error types for the import pipeline.
//!
//! Row-level problems ([`RowIssue`]) never abort a preview; they classify the
//! row as an error. Everything else stops the current workflow step and tells
//! the operator which step to return to.

use std::path::PathBuf;

use league_db::OperationError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::Stage;

/// The uploaded file could not be read as a table.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("File is empty")]
    Empty,
    #[error("Header row has no column names")]
    NoHeaders,
    #[error("File is {size} bytes, larger than the {limit}-byte upload limit")]
    TooLarge { size: u64, limit: u64 },
    #[error("File is not valid UTF-8 text")]
    Encoding,
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// The column mapping cannot be used for this import kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("Required field '{field}' is not mapped to a column")]
    Unmapped { field: String },
    #[error("Field '{field}' is mapped to '{header}', which is not a column of this file")]
    UnknownHeader { field: String, header: String },
    #[error("'{field}' is not a field of {kind} imports")]
    UnknownField { field: String, kind: String },
    #[error("Column '{header}' is mapped to both '{first}' and '{second}'")]
    HeaderReused {
        header: String,
        first: String,
        second: String,
    },
    #[error("No availability columns found; expected headers like 'Availability [Monday January 6, 2025 - 7:00 PM]'")]
    NoAvailabilityColumns,
    #[error("Expected FIELD=HEADER, got '{0}'")]
    BadAssignment(String),
}

/// Why a single row cannot be imported.
///
/// Checks run in a fixed order, so a row reports only its first problem:
/// malformed shape, then required presence, then references, then formats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum RowIssue {
    #[error("row has {found} cells but the header has {expected}")]
    Malformed { expected: usize, found: usize },
    #[error("required field '{field}' is empty")]
    Missing { field: String },
    #[error("{entity} '{name}' not found")]
    Reference { entity: String, name: String },
    #[error("team '{name}' exists in more than one division; map a division column to choose")]
    Ambiguous { name: String },
    #[error("invalid {field} '{value}': {reason}")]
    Normalization {
        field: String,
        value: String,
        reason: String,
    },
    #[error("{reason}")]
    Invalid { reason: String },
}

impl RowIssue {
    pub fn missing(field: &str) -> Self {
        Self::Missing {
            field: field.to_string(),
        }
    }

    pub fn reference(entity: &str, name: &str) -> Self {
        Self::Reference {
            entity: entity.to_string(),
            name: name.to_string(),
        }
    }

    /// Short category label for reports.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Malformed { .. } => "malformed",
            Self::Missing { .. } => "missing",
            Self::Reference { .. } | Self::Ambiguous { .. } => "reference",
            Self::Normalization { .. } => "format",
            Self::Invalid { .. } => "invalid",
        }
    }
}

/// A committed row could not be written.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Db(#[from] OperationError),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("{entity} '{key}' no longer exists")]
    Vanished { entity: String, key: String },
    #[error("row was not classified for writing")]
    NotWritable,
}

/// Session storage failed.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Db(#[from] OperationError),
    #[error("Corrupt session payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// A workflow step that cannot proceed.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("{0}")]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Mapping(#[from] MappingError),
    #[error("No import session '{id}'")]
    SessionNotFound { id: String },
    #[error("Session '{id}' is {found}; this step needs it to be {expected}")]
    WrongStage {
        id: String,
        expected: Stage,
        found: Stage,
    },
    #[error("Uploaded file {path} is gone; upload it again")]
    MissingUpload { path: PathBuf },
    #[error("Commit not confirmed")]
    NotConfirmed,
    #[error("{count} row(s) have errors; fix the file and upload it again")]
    BlockingErrors { count: usize },
    #[error("Session store error: {0}")]
    Store(#[from] StoreError),
    #[error("Database error: {0}")]
    Db(#[from] OperationError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkflowError {
    /// The stage the operator should go back to after this error.
    ///
    /// [`Stage::Uploaded`] means fixing the mapping, or starting over when
    /// [`needs_new_upload`](Self::needs_new_upload) is also true.
    pub fn return_to(&self) -> Stage {
        match self {
            Self::Mapping(_) => Stage::Uploaded,
            Self::WrongStage { found, .. } => *found,
            Self::NotConfirmed => Stage::Previewed,
            Self::Parse(_)
            | Self::SessionNotFound { .. }
            | Self::MissingUpload { .. }
            | Self::BlockingErrors { .. }
            | Self::Store(_)
            | Self::Db(_)
            | Self::Io(_) => Stage::Uploaded,
        }
    }

    /// Whether the current session is lost and the upload must be repeated.
    pub fn needs_new_upload(&self) -> bool {
        matches!(
            self,
            Self::Parse(_)
                | Self::SessionNotFound { .. }
                | Self::MissingUpload { .. }
                | Self::BlockingErrors { .. }
        )
    }
}
