//! Best-effort audit trail and import log.
//!
//! Nothing here may fail a commit: every write runs in its own boundary and
//! errors are logged at `warn` and dropped.

use chrono::{SecondsFormat, Utc};
use league_core::{AuditEntry, ImportKind, ImportLog};
use league_db::{Connection, insert_audit_entry, insert_import_log};

use crate::commit::CommitResult;

/// Run `write`, logging and discarding any error.
fn best_effort<T, E: std::fmt::Display>(
    what: &str,
    write: impl FnOnce() -> Result<T, E>,
) -> Option<T> {
    match write() {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Could not write {what}: {e}");
            None
        }
    }
}

/// Audit writer bound to one session.
pub struct AuditTrail<'c> {
    conn: &'c Connection,
    session_id: String,
    operator: String,
}

impl<'c> AuditTrail<'c> {
    pub fn new(conn: &'c Connection, session_id: &str, operator: &str) -> Self {
        Self {
            conn,
            session_id: session_id.to_string(),
            operator: operator.to_string(),
        }
    }

    /// Record one applied mutation.
    pub fn record(&self, entity_type: &str, entity_key: &str, action: &str, line: usize) {
        let entry = AuditEntry {
            session_id: self.session_id.clone(),
            operator: self.operator.clone(),
            entity_type: entity_type.to_string(),
            entity_key: entity_key.to_string(),
            action: action.to_string(),
            source_line: line as i64,
        };
        best_effort("audit entry", || insert_audit_entry(self.conn, &entry));
    }

    /// Record the finished import. Returns the log id if it was written.
    pub fn record_import(
        &self,
        kind: ImportKind,
        source_name: &str,
        result: &CommitResult,
    ) -> Option<i64> {
        let entry = ImportLog {
            id: 0,
            kind: kind.as_str().to_string(),
            source_name: source_name.to_string(),
            operator: self.operator.clone(),
            imported_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false),
            records_created: result.added as i64,
            records_updated: result.updated as i64,
            records_unchanged: result.skipped as i64,
            records_failed: result.errored as i64,
        };
        best_effort("import log", || insert_import_log(self.conn, &entry))
    }
}
