use std::collections::HashMap;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;
use crate::cli_types::RecordTable;
use crate::settings::Config;

use super::{open_db, truncate_str};

fn db_err(what: &str) -> impl FnOnce(league_db::OperationError) -> CliError + '_ {
    move |e| CliError::database(format!("Failed to {what}: {e}"))
}

fn show_count(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Print up to `limit` rows of one table.
pub(crate) fn run_list(config: &Config, table: RecordTable, limit: usize) -> Result<(), CliError> {
    let conn = open_db(config)?;

    let lines: Vec<String> = match table {
        RecordTable::Divisions => league_db::list_divisions(&conn)
            .map_err(db_err("list divisions"))?
            .iter()
            .map(|d| format!("{:>5}  {}", d.id, d.name))
            .collect(),

        RecordTable::Teams => {
            let divisions: HashMap<i64, String> = league_db::list_divisions(&conn)
                .map_err(db_err("list divisions"))?
                .into_iter()
                .map(|d| (d.id, d.name))
                .collect();
            let locations: HashMap<i64, String> = league_db::list_locations(&conn)
                .map_err(db_err("list locations"))?
                .into_iter()
                .map(|l| (l.id, l.name))
                .collect();
            league_db::list_teams(&conn)
                .map_err(db_err("list teams"))?
                .iter()
                .map(|t| {
                    format!(
                        "{:>5}  {:<24} {:<12} rank {:<4} {}",
                        t.id,
                        truncate_str(&t.name, 24),
                        divisions.get(&t.division_id).map(String::as_str).unwrap_or("?"),
                        show_count(t.previous_year_ranking),
                        t.preferred_location_id
                            .and_then(|id| locations.get(&id))
                            .map(String::as_str)
                            .unwrap_or(""),
                    )
                })
                .collect()
        }

        RecordTable::Locations => league_db::list_locations(&conn)
            .map_err(db_err("list locations"))?
            .iter()
            .map(|l| {
                format!(
                    "{:>5}  {:<24} {}",
                    l.id,
                    truncate_str(&l.name, 24),
                    truncate_str(&l.description, 40)
                )
            })
            .collect(),

        RecordTable::Timeslots => league_db::list_timeslots(&conn, None)
            .map_err(db_err("list time slots"))?
            .iter()
            .map(|s| format!("{:>5}  {}  {}", s.id, s.date, s.modifier))
            .collect(),

        RecordTable::Games => {
            let teams: HashMap<i64, String> = league_db::list_teams(&conn)
                .map_err(db_err("list teams"))?
                .into_iter()
                .map(|t| (t.id, t.name))
                .collect();
            let name = |id: i64| teams.get(&id).cloned().unwrap_or_else(|| format!("#{id}"));
            league_db::list_previous_games(&conn)
                .map_err(db_err("list games"))?
                .iter()
                .map(|g| {
                    format!(
                        "{:>5}  {}  {} {} - {} {}",
                        g.id,
                        g.date,
                        name(g.team_1_id),
                        show_count(g.team_1_score),
                        show_count(g.team_2_score),
                        name(g.team_2_id),
                    )
                })
                .collect()
        }

        RecordTable::Imports => {
            let cap = u32::try_from(limit).unwrap_or(u32::MAX);
            league_db::list_import_logs(&conn, Some(cap))
                .map_err(db_err("list imports"))?
                .iter()
                .map(|l| {
                    format!(
                        "{:>5}  {}  {:<21} {:<12} +{} ~{} ={} !{}  {}",
                        l.id,
                        l.imported_at,
                        l.kind,
                        truncate_str(&l.operator, 12),
                        l.records_created,
                        l.records_updated,
                        l.records_unchanged,
                        l.records_failed,
                        l.source_name,
                    )
                })
                .collect()
        }
    };

    if lines.is_empty() {
        log::info!("No {table:?} found.");
        return Ok(());
    }
    let total = lines.len();
    for line in lines.into_iter().take(limit) {
        log::info!("{}", line);
    }
    if total > limit {
        log::info!(
            "{}",
            format!("... {} more (raise --limit to see them)", total - limit)
                .if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    Ok(())
}

/// Create a division.
pub(crate) fn run_add_division(config: &Config, name: &str) -> Result<(), CliError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CliError::other("Division name cannot be empty"));
    }
    let conn = open_db(config)?;
    if let Some(existing) =
        league_db::find_division_by_name(&conn, name).map_err(db_err("look up division"))?
    {
        log::info!("Division '{}' already exists (id {})", existing.name, existing.id);
        return Ok(());
    }
    let id = league_db::insert_division(&conn, name).map_err(db_err("create division"))?;
    log::info!(
        "  {} Created division '{}' (id {})",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        name,
        id,
    );
    Ok(())
}

/// Show row counts for every table.
pub(crate) fn run_stats(config: &Config) -> Result<(), CliError> {
    let conn = open_db(config)?;
    let stats = league_db::league_stats(&conn).map_err(db_err("query statistics"))?;

    log::info!(
        "{}",
        "League Database Statistics".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("  Database: {}", config.db_path.value.display());
    crate::log_blank();
    log::info!("  Divisions:          {:>8}", stats.divisions);
    log::info!("  Teams:              {:>8}", stats.teams);
    log::info!("  Locations:          {:>8}", stats.locations);
    log::info!("  Time slots:         {:>8}", stats.timeslots);
    log::info!("  Location slots:     {:>8}", stats.location_availability);
    log::info!("  Team availability:  {:>8}", stats.team_availability);
    log::info!("  Previous games:     {:>8}", stats.previous_games);
    log::info!("  Open sessions:      {:>8}", stats.open_sessions);
    Ok(())
}
