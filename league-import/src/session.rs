//! Import sessions and where they are kept between workflow steps.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use league_core::{Delimiter, ImportKind, UnknownVariant};
use league_db::{
    Connection, SessionRow, delete_session_row, list_session_rows, list_session_rows_before,
    load_session_row, save_session_row,
};
use serde::{Deserialize, Serialize};

use crate::availability::AvailabilityColumn;
use crate::error::StoreError;
use crate::mapping::ColumnMapping;
use crate::preview::PreviewRow;

/// Workflow position of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Uploaded,
    Mapped,
    Previewed,
    Committed,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uploaded => "uploaded",
            Self::Mapped => "mapped",
            Self::Previewed => "previewed",
            Self::Committed => "committed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uploaded" => Ok(Self::Uploaded),
            "mapped" => Ok(Self::Mapped),
            "previewed" => Ok(Self::Previewed),
            "committed" => Ok(Self::Committed),
            other => Err(UnknownVariant {
                what: "stage",
                value: other.to_string(),
                expected: "uploaded, mapped, previewed, committed".to_string(),
            }),
        }
    }
}

/// One operator's import in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSession {
    pub id: String,
    pub owner: String,
    pub kind: ImportKind,
    pub stage: Stage,
    /// Original file name, for logs and reports.
    pub source_name: String,
    /// Buffered copy of the upload.
    pub file_path: PathBuf,
    pub delimiter: Delimiter,
    pub headers: Vec<String>,
    pub mapping: ColumnMapping,
    #[serde(default)]
    pub availability_columns: Vec<AvailabilityColumn>,
    #[serde(default)]
    pub preview: Vec<PreviewRow>,
    pub created_at: DateTime<Utc>,
}

/// Keeps sessions between workflow steps.
pub trait SessionStore {
    fn load(&self, id: &str) -> Result<Option<ImportSession>, StoreError>;

    /// Insert or replace by id.
    fn save(&self, session: &ImportSession) -> Result<(), StoreError>;

    /// Returns `true` if a session was removed.
    fn delete(&self, id: &str) -> Result<bool, StoreError>;

    /// Sessions owned by `owner`, newest first.
    fn list(&self, owner: &str) -> Result<Vec<ImportSession>, StoreError>;

    /// Sessions of any owner created before `cutoff`.
    fn list_created_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<ImportSession>, StoreError>;
}

/// Session store for tests and one-shot runs.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RefCell<HashMap<String, ImportSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.borrow().is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, id: &str) -> Result<Option<ImportSession>, StoreError> {
        Ok(self.sessions.borrow().get(id).cloned())
    }

    fn save(&self, session: &ImportSession) -> Result<(), StoreError> {
        self.sessions
            .borrow_mut()
            .insert(session.id.clone(), session.clone());
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.sessions.borrow_mut().remove(id).is_some())
    }

    fn list(&self, owner: &str) -> Result<Vec<ImportSession>, StoreError> {
        let mut sessions: Vec<_> = self
            .sessions
            .borrow()
            .values()
            .filter(|s| s.owner == owner)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }

    fn list_created_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<ImportSession>, StoreError> {
        Ok(self
            .sessions
            .borrow()
            .values()
            .filter(|s| s.created_at < cutoff)
            .cloned()
            .collect())
    }
}

/// Session store backed by the `import_sessions` table.
pub struct SqliteSessionStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteSessionStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

/// Fixed-width RFC 3339 so stored timestamps compare correctly as text.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, false)
}

fn to_row(session: &ImportSession) -> Result<SessionRow, StoreError> {
    Ok(SessionRow {
        id: session.id.clone(),
        owner: session.owner.clone(),
        kind: session.kind.as_str().to_string(),
        stage: session.stage.as_str().to_string(),
        payload: serde_json::to_string(session)?,
        created_at: timestamp(session.created_at),
        updated_at: String::new(),
    })
}

fn from_row(row: SessionRow) -> Result<ImportSession, StoreError> {
    Ok(serde_json::from_str(&row.payload)?)
}

impl SessionStore for SqliteSessionStore<'_> {
    fn load(&self, id: &str) -> Result<Option<ImportSession>, StoreError> {
        load_session_row(self.conn, id)?.map(from_row).transpose()
    }

    fn save(&self, session: &ImportSession) -> Result<(), StoreError> {
        save_session_row(self.conn, &to_row(session)?)?;
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<bool, StoreError> {
        Ok(delete_session_row(self.conn, id)?)
    }

    fn list(&self, owner: &str) -> Result<Vec<ImportSession>, StoreError> {
        list_session_rows(self.conn, owner)?
            .into_iter()
            .map(from_row)
            .collect()
    }

    fn list_created_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<ImportSession>, StoreError> {
        list_session_rows_before(self.conn, &timestamp(cutoff))?
            .into_iter()
            .map(from_row)
            .collect()
    }
}
