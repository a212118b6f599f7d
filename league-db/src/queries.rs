//! Read queries for the league database.
//!
//! Provides full-table listings (used to build the in-memory state the
//! import pipeline reconciles against), statistics, import history, and the
//! dataset snapshot handed to the external scheduler.

use chrono::NaiveDate;
use league_core::types::*;
use rusqlite::{Connection, params};
use serde::Serialize;

use crate::operations::{OperationError, row_to_game, row_to_location, row_to_team, row_to_timeslot};

// ── Listings ────────────────────────────────────────────────────────────────

/// List all divisions ordered by name.
pub fn list_divisions(conn: &Connection) -> Result<Vec<Division>, OperationError> {
    let mut stmt = conn.prepare("SELECT id, name FROM divisions ORDER BY name")?;
    let rows = stmt.query_map([], |row| {
        Ok(Division {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// List all teams ordered by division, then name.
pub fn list_teams(conn: &Connection) -> Result<Vec<Team>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT id, division_id, name, description, previous_year_ranking, preferred_location_id
         FROM teams ORDER BY division_id, name",
    )?;
    let rows = stmt.query_map([], row_to_team)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// List all locations ordered by name.
pub fn list_locations(conn: &Connection) -> Result<Vec<Location>, OperationError> {
    let mut stmt = conn.prepare("SELECT id, name, description FROM locations ORDER BY name")?;
    let rows = stmt.query_map([], row_to_location)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// List time slots, optionally restricted to an inclusive date range.
pub fn list_timeslots(
    conn: &Connection,
    range: Option<(NaiveDate, NaiveDate)>,
) -> Result<Vec<TimeSlot>, OperationError> {
    match range {
        Some((start, end)) => {
            let mut stmt = conn.prepare(
                "SELECT id, date, modifier FROM timeslots
                 WHERE date BETWEEN ?1 AND ?2 ORDER BY date, modifier",
            )?;
            let rows = stmt.query_map(params![start, end], row_to_timeslot)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
        }
        None => {
            let mut stmt =
                conn.prepare("SELECT id, date, modifier FROM timeslots ORDER BY date, modifier")?;
            let rows = stmt.query_map([], row_to_timeslot)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
        }
    }
}

/// List location availability, optionally restricted to slots in a date range.
pub fn list_location_availability(
    conn: &Connection,
    range: Option<(NaiveDate, NaiveDate)>,
) -> Result<Vec<LocationAvailability>, OperationError> {
    let (start, end) = range_bounds(range);
    let mut stmt = conn.prepare(
        "SELECT la.location_id, la.timeslot_id
         FROM location_availability la
         INNER JOIN timeslots ts ON ts.id = la.timeslot_id
         WHERE ts.date BETWEEN ?1 AND ?2
         ORDER BY la.location_id, la.timeslot_id",
    )?;
    let rows = stmt.query_map(params![start, end], |row| {
        Ok(LocationAvailability {
            location_id: row.get(0)?,
            timeslot_id: row.get(1)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// List team availability, optionally restricted to slots in a date range.
pub fn list_team_availability(
    conn: &Connection,
    range: Option<(NaiveDate, NaiveDate)>,
) -> Result<Vec<TeamAvailability>, OperationError> {
    let (start, end) = range_bounds(range);
    let mut stmt = conn.prepare(
        "SELECT ta.team_id, ta.timeslot_id
         FROM team_availability ta
         INNER JOIN timeslots ts ON ts.id = ta.timeslot_id
         WHERE ts.date BETWEEN ?1 AND ?2
         ORDER BY ta.team_id, ta.timeslot_id",
    )?;
    let rows = stmt.query_map(params![start, end], |row| {
        Ok(TeamAvailability {
            team_id: row.get(0)?,
            timeslot_id: row.get(1)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// List all previous games, most recent first.
pub fn list_previous_games(conn: &Connection) -> Result<Vec<PreviousGame>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT id, date, team_1_id, team_2_id, team_1_score, team_2_score
         FROM previous_games ORDER BY date DESC, id",
    )?;
    let rows = stmt.query_map([], row_to_game)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Text dates compare lexically, so the widest ISO range covers everything.
fn range_bounds(range: Option<(NaiveDate, NaiveDate)>) -> (String, String) {
    match range {
        Some((start, end)) => (
            start.format("%Y-%m-%d").to_string(),
            end.format("%Y-%m-%d").to_string(),
        ),
        None => ("0000-01-01".to_string(), "9999-12-31".to_string()),
    }
}

// ── Statistics ──────────────────────────────────────────────────────────────

/// Row counts for every league table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LeagueStats {
    pub divisions: i64,
    pub teams: i64,
    pub locations: i64,
    pub timeslots: i64,
    pub location_availability: i64,
    pub team_availability: i64,
    pub previous_games: i64,
    pub open_sessions: i64,
}

/// Count the rows of every league table.
pub fn league_stats(conn: &Connection) -> Result<LeagueStats, OperationError> {
    let count = |table: &str| -> Result<i64, OperationError> {
        let n = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(n)
    };
    Ok(LeagueStats {
        divisions: count("divisions")?,
        teams: count("teams")?,
        locations: count("locations")?,
        timeslots: count("timeslots")?,
        location_availability: count("location_availability")?,
        team_availability: count("team_availability")?,
        previous_games: count("previous_games")?,
        open_sessions: count("import_sessions")?,
    })
}

// ── Import History ──────────────────────────────────────────────────────────

/// List recent import logs.
pub fn list_import_logs(
    conn: &Connection,
    limit: Option<u32>,
) -> Result<Vec<ImportLog>, OperationError> {
    let limit = limit.unwrap_or(20);
    let mut stmt = conn.prepare(&format!(
        "SELECT id, kind, source_name, operator, imported_at,
                records_created, records_updated, records_unchanged, records_failed
         FROM import_log ORDER BY imported_at DESC, id DESC LIMIT {limit}"
    ))?;
    let rows = stmt.query_map([], |row| {
        Ok(ImportLog {
            id: row.get(0)?,
            kind: row.get(1)?,
            source_name: row.get(2)?,
            operator: row.get(3)?,
            imported_at: row.get(4)?,
            records_created: row.get(5)?,
            records_updated: row.get(6)?,
            records_unchanged: row.get(7)?,
            records_failed: row.get(8)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// List the audit entries written for one import session, in insertion order.
pub fn audit_entries_for_session(
    conn: &Connection,
    session_id: &str,
) -> Result<Vec<AuditEntry>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT session_id, operator, entity_type, entity_key, action, source_line
         FROM audit_log WHERE session_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![session_id], |row| {
        Ok(AuditEntry {
            session_id: row.get(0)?,
            operator: row.get(1)?,
            entity_type: row.get(2)?,
            entity_key: row.get(3)?,
            action: row.get(4)?,
            source_line: row.get(5)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Scheduling Dataset ──────────────────────────────────────────────────────

/// Everything the external scheduler needs for one date range.
///
/// Time slots and availability are limited to the range; teams, divisions,
/// locations, and the full game history are always included.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleDataset {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub teams: Vec<Team>,
    pub divisions: Vec<Division>,
    pub timeslots: Vec<TimeSlot>,
    pub locations: Vec<Location>,
    pub location_availability: Vec<LocationAvailability>,
    pub team_availability: Vec<TeamAvailability>,
    pub previous_games: Vec<PreviousGame>,
}

/// Fetch the scheduling dataset for `[start, end]`.
pub fn schedule_dataset(
    conn: &Connection,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<ScheduleDataset, OperationError> {
    let range = Some((start, end));
    Ok(ScheduleDataset {
        start_date: start,
        end_date: end,
        teams: list_teams(conn)?,
        divisions: list_divisions(conn)?,
        timeslots: list_timeslots(conn, range)?,
        locations: list_locations(conn)?,
        location_availability: list_location_availability(conn, range)?,
        team_availability: list_team_availability(conn, range)?,
        previous_games: list_previous_games(conn)?,
    })
}
