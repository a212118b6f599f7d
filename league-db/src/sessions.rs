//! Storage for in-progress import sessions.
//!
//! The database treats the session payload as opaque JSON; the import
//! pipeline owns its shape. `owner`, `kind` and `stage` are duplicated into
//! columns so sessions can be listed without decoding the payload.

use rusqlite::{Connection, OptionalExtension, params};

use crate::operations::OperationError;

/// One stored import session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRow {
    pub id: String,
    pub owner: String,
    pub kind: String,
    pub stage: String,
    pub payload: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Insert or replace a session row. `updated_at` is set by the database.
pub fn save_session_row(conn: &Connection, row: &SessionRow) -> Result<(), OperationError> {
    conn.execute(
        "INSERT INTO import_sessions (id, owner, kind, stage, payload, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(id) DO UPDATE SET
             owner = excluded.owner,
             kind = excluded.kind,
             stage = excluded.stage,
             payload = excluded.payload,
             updated_at = datetime('now')",
        params![row.id, row.owner, row.kind, row.stage, row.payload, row.created_at],
    )?;
    Ok(())
}

/// Load a session row by ID.
pub fn load_session_row(conn: &Connection, id: &str) -> Result<Option<SessionRow>, OperationError> {
    conn.query_row(
        "SELECT id, owner, kind, stage, payload, created_at, updated_at
         FROM import_sessions WHERE id = ?1",
        params![id],
        row_to_session,
    )
    .optional()
    .map_err(Into::into)
}

/// Delete a session row. Returns `true` if a row was removed.
pub fn delete_session_row(conn: &Connection, id: &str) -> Result<bool, OperationError> {
    let changed = conn.execute("DELETE FROM import_sessions WHERE id = ?1", params![id])?;
    Ok(changed > 0)
}

/// List the sessions owned by `owner`, newest first.
pub fn list_session_rows(conn: &Connection, owner: &str) -> Result<Vec<SessionRow>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT id, owner, kind, stage, payload, created_at, updated_at
         FROM import_sessions WHERE owner = ?1 ORDER BY created_at DESC",
    )?;
    let rows = stmt.query_map(params![owner], row_to_session)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// List sessions of any owner created before `cutoff` (RFC 3339).
pub fn list_session_rows_before(
    conn: &Connection,
    cutoff: &str,
) -> Result<Vec<SessionRow>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT id, owner, kind, stage, payload, created_at, updated_at
         FROM import_sessions WHERE created_at < ?1 ORDER BY created_at",
    )?;
    let rows = stmt.query_map(params![cutoff], row_to_session)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

fn row_to_session(row: &rusqlite::Row<'_>) -> rusqlite::Result<SessionRow> {
    Ok(SessionRow {
        id: row.get(0)?,
        owner: row.get(1)?,
        kind: row.get(2)?,
        stage: row.get(3)?,
        payload: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}
