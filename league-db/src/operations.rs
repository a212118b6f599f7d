//! CRUD operations for all league entity types.
//!
//! Name lookups are case-insensitive (the name columns use `COLLATE NOCASE`).

use chrono::NaiveDate;
use league_core::types::*;
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Entity not found: {entity_type} with id '{id}'")]
    NotFound { entity_type: String, id: String },
}

impl OperationError {
    fn not_found(entity_type: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }
}

// ── Division Operations ─────────────────────────────────────────────────────

/// Insert a division. Returns the generated ID.
pub fn insert_division(conn: &Connection, name: &str) -> Result<i64, OperationError> {
    conn.execute("INSERT INTO divisions (name) VALUES (?1)", params![name])?;
    Ok(conn.last_insert_rowid())
}

/// Find a division by name.
pub fn find_division_by_name(
    conn: &Connection,
    name: &str,
) -> Result<Option<Division>, OperationError> {
    conn.query_row(
        "SELECT id, name FROM divisions WHERE name = ?1",
        params![name],
        |row| {
            Ok(Division {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        },
    )
    .optional()
    .map_err(Into::into)
}

/// Delete a division. Fails if teams still reference it.
pub fn delete_division(conn: &Connection, id: i64) -> Result<(), OperationError> {
    let changed = conn.execute("DELETE FROM divisions WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(OperationError::not_found("division", id));
    }
    Ok(())
}

// ── Location Operations ─────────────────────────────────────────────────────

/// Insert a location. Returns the generated ID.
pub fn insert_location(
    conn: &Connection,
    name: &str,
    description: &str,
) -> Result<i64, OperationError> {
    conn.execute(
        "INSERT INTO locations (name, description) VALUES (?1, ?2)",
        params![name, description],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Find a location by name.
pub fn find_location_by_name(
    conn: &Connection,
    name: &str,
) -> Result<Option<Location>, OperationError> {
    conn.query_row(
        "SELECT id, name, description FROM locations WHERE name = ?1",
        params![name],
        row_to_location,
    )
    .optional()
    .map_err(Into::into)
}

/// Replace a location's description.
pub fn update_location_description(
    conn: &Connection,
    id: i64,
    description: &str,
) -> Result<(), OperationError> {
    let changed = conn.execute(
        "UPDATE locations SET description = ?2 WHERE id = ?1",
        params![id, description],
    )?;
    if changed == 0 {
        return Err(OperationError::not_found("location", id));
    }
    Ok(())
}

/// Delete a location and its availability links.
pub fn delete_location(conn: &Connection, id: i64) -> Result<(), OperationError> {
    let changed = conn.execute("DELETE FROM locations WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(OperationError::not_found("location", id));
    }
    Ok(())
}

// ── Team Operations ─────────────────────────────────────────────────────────

/// Insert a team. Returns the generated ID.
pub fn insert_team(conn: &Connection, team: &NewTeam) -> Result<i64, OperationError> {
    conn.execute(
        "INSERT INTO teams (division_id, name, description, previous_year_ranking, preferred_location_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            team.division_id,
            team.name,
            team.description,
            team.previous_year_ranking,
            team.preferred_location_id,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Find a team by division and name.
pub fn find_team(
    conn: &Connection,
    division_id: i64,
    name: &str,
) -> Result<Option<Team>, OperationError> {
    conn.query_row(
        "SELECT id, division_id, name, description, previous_year_ranking, preferred_location_id
         FROM teams WHERE division_id = ?1 AND name = ?2",
        params![division_id, name],
        row_to_team,
    )
    .optional()
    .map_err(Into::into)
}

/// Find all teams with the given name across divisions.
pub fn find_teams_by_name(conn: &Connection, name: &str) -> Result<Vec<Team>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT id, division_id, name, description, previous_year_ranking, preferred_location_id
         FROM teams WHERE name = ?1 ORDER BY division_id",
    )?;
    let rows = stmt.query_map(params![name], row_to_team)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Apply a partial update to a team. Fields left as `None` are untouched.
pub fn update_team(conn: &Connection, id: i64, patch: &TeamPatch) -> Result<(), OperationError> {
    let changed = conn.execute(
        "UPDATE teams SET
             description = COALESCE(?2, description),
             previous_year_ranking = COALESCE(?3, previous_year_ranking),
             preferred_location_id = COALESCE(?4, preferred_location_id)
         WHERE id = ?1",
        params![
            id,
            patch.description,
            patch.previous_year_ranking,
            patch.preferred_location_id,
        ],
    )?;
    if changed == 0 {
        return Err(OperationError::not_found("team", id));
    }
    Ok(())
}

/// Delete a team and its availability links.
pub fn delete_team(conn: &Connection, id: i64) -> Result<(), OperationError> {
    let changed = conn.execute("DELETE FROM teams WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(OperationError::not_found("team", id));
    }
    Ok(())
}

// ── Time Slot Operations ────────────────────────────────────────────────────

/// Find a time slot by date and exact modifier.
pub fn find_timeslot(
    conn: &Connection,
    date: NaiveDate,
    modifier: &str,
) -> Result<Option<TimeSlot>, OperationError> {
    conn.query_row(
        "SELECT id, date, modifier FROM timeslots WHERE date = ?1 AND modifier = ?2",
        params![date, modifier],
        row_to_timeslot,
    )
    .optional()
    .map_err(Into::into)
}

/// Return the ID of the `(date, modifier)` slot, creating it when missing.
///
/// The boolean is `true` when a new slot was inserted.
pub fn find_or_insert_timeslot(
    conn: &Connection,
    date: NaiveDate,
    modifier: &str,
) -> Result<(i64, bool), OperationError> {
    if let Some(slot) = find_timeslot(conn, date, modifier)? {
        return Ok((slot.id, false));
    }
    conn.execute(
        "INSERT INTO timeslots (date, modifier) VALUES (?1, ?2)",
        params![date, modifier],
    )?;
    Ok((conn.last_insert_rowid(), true))
}

/// List the time slots on one date.
pub fn timeslots_on(conn: &Connection, date: NaiveDate) -> Result<Vec<TimeSlot>, OperationError> {
    let mut stmt =
        conn.prepare("SELECT id, date, modifier FROM timeslots WHERE date = ?1 ORDER BY id")?;
    let rows = stmt.query_map(params![date], row_to_timeslot)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Availability Operations ─────────────────────────────────────────────────

/// Mark a location as available for a time slot.
pub fn insert_location_availability(
    conn: &Connection,
    location_id: i64,
    timeslot_id: i64,
) -> Result<(), OperationError> {
    conn.execute(
        "INSERT INTO location_availability (location_id, timeslot_id) VALUES (?1, ?2)",
        params![location_id, timeslot_id],
    )?;
    Ok(())
}

/// Mark a team as available for a time slot. Already-present links are kept.
///
/// Returns `true` if a new link was inserted.
pub fn insert_team_availability(
    conn: &Connection,
    team_id: i64,
    timeslot_id: i64,
) -> Result<bool, OperationError> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO team_availability (team_id, timeslot_id) VALUES (?1, ?2)",
        params![team_id, timeslot_id],
    )?;
    Ok(changed > 0)
}

/// Remove a team's availability for a time slot.
///
/// Returns `true` if a link was deleted.
pub fn delete_team_availability(
    conn: &Connection,
    team_id: i64,
    timeslot_id: i64,
) -> Result<bool, OperationError> {
    let changed = conn.execute(
        "DELETE FROM team_availability WHERE team_id = ?1 AND timeslot_id = ?2",
        params![team_id, timeslot_id],
    )?;
    Ok(changed > 0)
}

// ── Previous Game Operations ────────────────────────────────────────────────

/// Insert a game result. Returns the generated ID.
pub fn insert_previous_game(
    conn: &Connection,
    date: NaiveDate,
    team_1_id: i64,
    team_2_id: i64,
    team_1_score: Option<u32>,
    team_2_score: Option<u32>,
) -> Result<i64, OperationError> {
    conn.execute(
        "INSERT INTO previous_games (date, team_1_id, team_2_id, team_1_score, team_2_score)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![date, team_1_id, team_2_id, team_1_score, team_2_score],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Find a game on `date` between two teams, in either order.
pub fn find_game_between(
    conn: &Connection,
    date: NaiveDate,
    team_a: i64,
    team_b: i64,
) -> Result<Option<PreviousGame>, OperationError> {
    conn.query_row(
        "SELECT id, date, team_1_id, team_2_id, team_1_score, team_2_score
         FROM previous_games
         WHERE date = ?1
           AND ((team_1_id = ?2 AND team_2_id = ?3) OR (team_1_id = ?3 AND team_2_id = ?2))
         ORDER BY id LIMIT 1",
        params![date, team_a, team_b],
        row_to_game,
    )
    .optional()
    .map_err(Into::into)
}

/// Set game scores, in stored team order. `None` leaves a score untouched.
pub fn update_game_scores(
    conn: &Connection,
    id: i64,
    team_1_score: Option<u32>,
    team_2_score: Option<u32>,
) -> Result<(), OperationError> {
    let changed = conn.execute(
        "UPDATE previous_games SET
             team_1_score = COALESCE(?2, team_1_score),
             team_2_score = COALESCE(?3, team_2_score)
         WHERE id = ?1",
        params![id, team_1_score, team_2_score],
    )?;
    if changed == 0 {
        return Err(OperationError::not_found("previous game", id));
    }
    Ok(())
}

// ── Import Log Operations ───────────────────────────────────────────────────

/// Insert an import log entry. Returns the generated ID.
pub fn insert_import_log(conn: &Connection, log: &ImportLog) -> Result<i64, OperationError> {
    conn.execute(
        "INSERT INTO import_log (kind, source_name, operator, imported_at,
             records_created, records_updated, records_unchanged, records_failed)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            log.kind,
            log.source_name,
            log.operator,
            log.imported_at,
            log.records_created,
            log.records_updated,
            log.records_unchanged,
            log.records_failed,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Insert an audit entry for one applied mutation.
pub fn insert_audit_entry(conn: &Connection, entry: &AuditEntry) -> Result<i64, OperationError> {
    conn.execute(
        "INSERT INTO audit_log (session_id, operator, entity_type, entity_key, action, source_line)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            entry.session_id,
            entry.operator,
            entry.entity_type,
            entry.entity_key,
            entry.action,
            entry.source_line,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

// ── Row Mapping Helpers ─────────────────────────────────────────────────────

pub(crate) fn row_to_location(row: &rusqlite::Row<'_>) -> rusqlite::Result<Location> {
    Ok(Location {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
    })
}

pub(crate) fn row_to_team(row: &rusqlite::Row<'_>) -> rusqlite::Result<Team> {
    Ok(Team {
        id: row.get(0)?,
        division_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        previous_year_ranking: row.get(4)?,
        preferred_location_id: row.get(5)?,
    })
}

pub(crate) fn row_to_timeslot(row: &rusqlite::Row<'_>) -> rusqlite::Result<TimeSlot> {
    Ok(TimeSlot {
        id: row.get(0)?,
        date: row.get(1)?,
        modifier: row.get(2)?,
    })
}

pub(crate) fn row_to_game(row: &rusqlite::Row<'_>) -> rusqlite::Result<PreviousGame> {
    Ok(PreviousGame {
        id: row.get(0)?,
        date: row.get(1)?,
        team_1_id: row.get(2)?,
        team_2_id: row.get(3)?,
        team_1_score: row.get(4)?,
        team_2_score: row.get(5)?,
    })
}
