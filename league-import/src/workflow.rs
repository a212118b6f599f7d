//! The four-step import workflow: upload, map, preview, commit.
//!
//! Every step loads the session by id, checks it belongs to the operator and
//! sits at the right stage, does its work, and stores the new session value.
//! Errors are recoverable and name the stage to return to.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use league_core::{Delimiter, ImportKind};
use league_db::Connection;
use uuid::Uuid;

use crate::audit::AuditTrail;
use crate::availability::detect_availability_columns;
use crate::commit::{CommitResult, execute_commit};
use crate::error::{MappingError, ParseError, WorkflowError};
use crate::mapping::auto_map;
use crate::parser::{ParseMode, ParsedTable, parse_table, read_headers};
use crate::preview::{build_preview, summarize};
use crate::progress::CommitProgress;
use crate::session::{ImportSession, SessionStore, Stage};
use crate::state::LeagueState;

/// Uploads larger than this are rejected unless configured otherwise.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Workflow settings.
#[derive(Debug, Clone)]
pub struct WorkflowOptions {
    /// Directory holding buffered uploads.
    pub upload_dir: PathBuf,
    pub max_upload_bytes: u64,
}

impl WorkflowOptions {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Operator edits to a column mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingEdit {
    /// `(field, header)` assignments.
    pub set: Vec<(String, String)>,
    /// Fields to leave unmapped.
    pub unset: Vec<String>,
}

impl MappingEdit {
    /// Parse a `field=Header` assignment.
    pub fn parse_assignment(text: &str) -> Result<(String, String), MappingError> {
        let (field, header) = text
            .split_once('=')
            .ok_or_else(|| MappingError::BadAssignment(text.to_string()))?;
        let (field, header) = (field.trim(), header.trim());
        if field.is_empty() || header.is_empty() {
            return Err(MappingError::BadAssignment(text.to_string()));
        }
        Ok((field.to_string(), header.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.unset.is_empty()
    }
}

/// Drives import sessions for one database and session store.
pub struct ImportWorkflow<'c, S: SessionStore> {
    conn: &'c Connection,
    store: S,
    options: WorkflowOptions,
}

impl<'c, S: SessionStore> ImportWorkflow<'c, S> {
    pub fn new(conn: &'c Connection, store: S, options: WorkflowOptions) -> Self {
        Self {
            conn,
            store,
            options,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Buffer `source` and open a session with a suggested mapping.
    pub fn upload(
        &self,
        operator: &str,
        kind: ImportKind,
        source: &Path,
        delimiter: Delimiter,
    ) -> Result<ImportSession, WorkflowError> {
        let io_err = |e| ParseError::Io {
            path: source.to_path_buf(),
            source: e,
        };
        let size = fs::metadata(source).map_err(io_err)?.len();
        if size > self.options.max_upload_bytes {
            return Err(ParseError::TooLarge {
                size,
                limit: self.options.max_upload_bytes,
            }
            .into());
        }
        let bytes = fs::read(source).map_err(io_err)?;
        let text = String::from_utf8(bytes).map_err(|_| ParseError::Encoding)?;
        let headers = read_headers(&text, delimiter)?;

        let id = Uuid::new_v4().to_string();
        fs::create_dir_all(&self.options.upload_dir)?;
        let file_path = self.options.upload_dir.join(format!("{id}.csv"));
        fs::write(&file_path, &text)?;

        let availability_columns = match kind {
            ImportKind::TeamAvailability => detect_availability_columns(&headers),
            _ => Vec::new(),
        };
        let session = ImportSession {
            id,
            owner: operator.to_string(),
            kind,
            stage: Stage::Uploaded,
            source_name: source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| source.display().to_string()),
            file_path,
            delimiter,
            mapping: auto_map(kind, &headers),
            headers,
            availability_columns,
            preview: Vec::new(),
            created_at: Utc::now(),
        };
        if let Err(e) = self.store.save(&session) {
            if let Err(rm) = fs::remove_file(&session.file_path) {
                log::warn!("Could not remove {}: {rm}", session.file_path.display());
            }
            return Err(e.into());
        }
        log::info!(
            "Uploaded {} as {} import session {}",
            session.source_name,
            kind,
            session.id
        );
        Ok(session)
    }

    /// Apply mapping edits and validate the result.
    ///
    /// Allowed from any stage before commit. Re-mapping discards a preview.
    pub fn map(
        &self,
        operator: &str,
        id: &str,
        edit: &MappingEdit,
    ) -> Result<ImportSession, WorkflowError> {
        let mut session = self.load(operator, id)?;
        if session.stage == Stage::Committed {
            return Err(wrong_stage(&session, Stage::Previewed));
        }
        if session.headers.iter().all(|h| h.is_empty()) {
            return Err(ParseError::NoHeaders.into());
        }

        let mut mapping = session.mapping.clone();
        for field in &edit.unset {
            mapping.unset(session.kind, field)?;
        }
        for (field, header) in &edit.set {
            mapping.set(session.kind, field, header)?;
        }
        mapping.validate(session.kind, &session.headers)?;
        if session.kind == ImportKind::TeamAvailability
            && session.availability_columns.is_empty()
        {
            return Err(MappingError::NoAvailabilityColumns.into());
        }

        if session.stage > Stage::Mapped {
            log::info!("Re-mapping session {id}; the previous preview is discarded");
        }
        session.mapping = mapping;
        session.preview = Vec::new();
        session.stage = Stage::Mapped;
        self.store.save(&session)?;
        Ok(session)
    }

    /// Classify every row against the current league.
    pub fn preview(&self, operator: &str, id: &str) -> Result<ImportSession, WorkflowError> {
        let mut session = self.load(operator, id)?;
        if !matches!(session.stage, Stage::Mapped | Stage::Previewed) {
            return Err(wrong_stage(&session, Stage::Mapped));
        }
        session.mapping.validate(session.kind, &session.headers)?;

        let table = self.read_upload(&session)?;
        let mut state = LeagueState::load(self.conn)?;
        session.preview = build_preview(
            session.kind,
            &table,
            &session.mapping,
            &session.availability_columns,
            &mut state,
        );
        session.stage = Stage::Previewed;
        self.store.save(&session)?;
        Ok(session)
    }

    /// Write the previewed rows. Requires an error-free preview and explicit
    /// confirmation. The session and its buffered file are removed afterwards.
    pub fn commit(
        &self,
        operator: &str,
        id: &str,
        confirmed: bool,
        progress: Option<&dyn CommitProgress>,
    ) -> Result<CommitResult, WorkflowError> {
        let mut session = self.load(operator, id)?;
        if session.stage != Stage::Previewed {
            return Err(wrong_stage(&session, Stage::Previewed));
        }
        let summary = summarize(&session.preview);
        if summary.error > 0 {
            return Err(WorkflowError::BlockingErrors {
                count: summary.error,
            });
        }
        if !confirmed {
            return Err(WorkflowError::NotConfirmed);
        }

        let audit = AuditTrail::new(self.conn, &session.id, &session.owner);
        let result = execute_commit(self.conn, &session.preview, &audit, progress);
        session.stage = Stage::Committed;

        if let Err(e) = self.discard(&session) {
            log::warn!("Committed session {} could not be removed: {e}", session.id);
        }
        audit.record_import(session.kind, &session.source_name, &result);
        log::info!(
            "Committed {} ({}): {} added, {} updated, {} skipped, {} failed",
            session.source_name,
            session.kind,
            result.added,
            result.updated,
            result.skipped,
            result.errored
        );
        Ok(result)
    }

    /// Abandon a session and its buffered file.
    pub fn cancel(&self, operator: &str, id: &str) -> Result<(), WorkflowError> {
        let session = self.load(operator, id)?;
        self.discard(&session)?;
        log::info!("Cancelled import session {id}");
        Ok(())
    }

    /// The operator's open sessions, newest first.
    pub fn sessions(&self, operator: &str) -> Result<Vec<ImportSession>, WorkflowError> {
        Ok(self.store.list(operator)?)
    }

    /// Remove every session older than `max_age`, of any owner.
    pub fn purge_older_than(&self, max_age: Duration) -> Result<usize, WorkflowError> {
        let cutoff = Utc::now() - max_age;
        let stale = self.store.list_created_before(cutoff)?;
        for session in &stale {
            self.discard(session)?;
            log::debug!("Purged session {} ({})", session.id, session.owner);
        }
        Ok(stale.len())
    }

    /// Load a session, hiding those owned by someone else.
    fn load(&self, operator: &str, id: &str) -> Result<ImportSession, WorkflowError> {
        match self.store.load(id)? {
            Some(session) if session.owner == operator => Ok(session),
            _ => Err(WorkflowError::SessionNotFound { id: id.to_string() }),
        }
    }

    fn read_upload(&self, session: &ImportSession) -> Result<ParsedTable, WorkflowError> {
        if !session.file_path.exists() {
            return Err(WorkflowError::MissingUpload {
                path: session.file_path.clone(),
            });
        }
        let text = fs::read_to_string(&session.file_path).map_err(|e| ParseError::Io {
            path: session.file_path.clone(),
            source: e,
        })?;
        Ok(parse_table(&text, session.delimiter, ParseMode::Strict)?)
    }

    fn discard(&self, session: &ImportSession) -> Result<(), WorkflowError> {
        match fs::remove_file(&session.file_path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Could not remove {}: {e}", session.file_path.display()),
        }
        self.store.delete(&session.id)?;
        Ok(())
    }
}

fn wrong_stage(session: &ImportSession, expected: Stage) -> WorkflowError {
    WorkflowError::WrongStage {
        id: session.id.clone(),
        expected,
        found: session.stage,
    }
}
