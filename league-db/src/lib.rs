//! SQLite persistence layer for the league.
//!
//! Provides schema creation, CRUD operations, read queries, and import
//! session storage backed by SQLite (via rusqlite with the bundled feature).

pub mod operations;
pub mod queries;
pub mod schema;
pub mod sessions;

pub use operations::{
    OperationError, delete_division, delete_location, delete_team, delete_team_availability,
    find_division_by_name, find_game_between, find_location_by_name, find_or_insert_timeslot,
    find_team, find_teams_by_name, find_timeslot, insert_audit_entry, insert_division,
    insert_import_log, insert_location, insert_location_availability, insert_previous_game,
    insert_team, insert_team_availability, timeslots_on, update_game_scores,
    update_location_description, update_team,
};
pub use queries::{
    LeagueStats, ScheduleDataset, audit_entries_for_session, league_stats, list_divisions,
    list_import_logs, list_location_availability, list_locations, list_previous_games,
    list_team_availability, list_teams, list_timeslots, schedule_dataset,
};
pub use rusqlite::Connection;
pub use schema::{SchemaError, open_database, open_memory};
pub use sessions::{
    SessionRow, delete_session_row, list_session_rows, list_session_rows_before,
    load_session_row, save_session_row,
};
