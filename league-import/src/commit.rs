//! Apply a previewed import to the database.
//!
//! Rows are applied in file order, each in its own transaction, so one bad
//! row never rolls back the others. Records are looked up again by natural
//! key at write time: a row may depend on one added earlier in the batch.

use league_core::TeamPatch;
use league_db::{
    Connection, delete_team_availability, find_game_between, find_location_by_name, find_team,
    find_or_insert_timeslot, insert_location, insert_location_availability, insert_previous_game,
    insert_team, insert_team_availability, update_game_scores, update_location_description,
    update_team,
};
use serde::Serialize;

use crate::audit::AuditTrail;
use crate::error::PersistenceError;
use crate::preview::{Classification, PreviewRow};
use crate::progress::CommitProgress;
use crate::rows::*;

/// What happened to one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RowStatus {
    Succeeded,
    Skipped,
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowOutcome {
    pub line: usize,
    pub classification: Classification,
    pub description: String,
    pub status: RowStatus,
}

/// Outcome of a whole commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommitResult {
    pub outcomes: Vec<RowOutcome>,
    pub added: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errored: usize,
}

impl CommitResult {
    /// Rows that could not be written.
    pub fn failures(&self) -> impl Iterator<Item = &RowOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, RowStatus::Failed { .. }))
    }
}

/// One write made for a row, for the audit trail.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Mutation {
    entity: &'static str,
    key: String,
    action: &'static str,
}

impl Mutation {
    fn new(entity: &'static str, key: impl Into<String>, action: &'static str) -> Self {
        Self {
            entity,
            key: key.into(),
            action,
        }
    }
}

/// Apply every non-error preview row.
///
/// Duplicates are skipped without touching the database. Failures are
/// captured per row and the batch continues.
pub fn execute_commit(
    conn: &Connection,
    rows: &[PreviewRow],
    audit: &AuditTrail<'_>,
    progress: Option<&dyn CommitProgress>,
) -> CommitResult {
    let pending: Vec<&PreviewRow> = rows.iter().filter(|r| !r.is_error()).collect();
    let total = pending.len();
    if let Some(p) = progress {
        p.on_phase(&format!("Committing {total} row(s)"));
    }

    let mut outcomes = Vec::with_capacity(total);
    for (i, preview) in pending.into_iter().enumerate() {
        let description = preview.describe();
        let status = match (&preview.row, preview.classification) {
            (_, Classification::Duplicate) => RowStatus::Skipped,
            (Some(row), _) => match apply_in_transaction(conn, row, preview) {
                Ok(mutations) => {
                    for m in &mutations {
                        audit.record(m.entity, &m.key, m.action, preview.line);
                    }
                    RowStatus::Succeeded
                }
                Err(e) => {
                    log::warn!("Line {}: {e}", preview.line);
                    RowStatus::Failed {
                        message: e.to_string(),
                    }
                }
            },
            (None, _) => RowStatus::Failed {
                message: PersistenceError::NotWritable.to_string(),
            },
        };
        outcomes.push(RowOutcome {
            line: preview.line,
            classification: preview.classification,
            description,
            status,
        });
        if let Some(p) = progress {
            p.on_row(i + 1, total, &outcomes[i].description);
        }
    }

    let mut result = CommitResult {
        outcomes,
        ..Default::default()
    };
    for outcome in &result.outcomes {
        match (&outcome.status, outcome.classification) {
            (RowStatus::Failed { .. }, _) => result.errored += 1,
            (RowStatus::Skipped, _) => result.skipped += 1,
            (RowStatus::Succeeded, Classification::Add) => result.added += 1,
            (RowStatus::Succeeded, _) => result.updated += 1,
        }
    }

    if let Some(p) = progress {
        p.on_complete(&format!(
            "Committed: {} added, {} updated, {} skipped, {} failed",
            result.added, result.updated, result.skipped, result.errored
        ));
    }
    result
}

fn apply_in_transaction(
    conn: &Connection,
    row: &ImportRow,
    preview: &PreviewRow,
) -> Result<Vec<Mutation>, PersistenceError> {
    let tx = conn.unchecked_transaction()?;
    let mutations = apply_row(&tx, row, preview)?;
    tx.commit()?;
    Ok(mutations)
}

fn changed(preview: &PreviewRow, field: &str) -> bool {
    preview.changes.iter().any(|c| c.field == field)
}

fn vanished(entity: &str, key: &str) -> PersistenceError {
    PersistenceError::Vanished {
        entity: entity.to_string(),
        key: key.to_string(),
    }
}

fn location_id(conn: &Connection, name: &str) -> Result<i64, PersistenceError> {
    find_location_by_name(conn, name)?
        .map(|l| l.id)
        .ok_or_else(|| vanished("location", name))
}

fn apply_row(
    conn: &Connection,
    row: &ImportRow,
    preview: &PreviewRow,
) -> Result<Vec<Mutation>, PersistenceError> {
    let adding = preview.classification == Classification::Add;
    match row {
        ImportRow::Location(r) => {
            if adding {
                insert_location(conn, &r.name, r.description.as_deref().unwrap_or(""))?;
                return Ok(vec![Mutation::new("location", &r.name, "create")]);
            }
            let id = location_id(conn, &r.name)?;
            if let Some(description) = &r.description {
                update_location_description(conn, id, description)?;
            }
            Ok(vec![Mutation::new("location", &r.name, "update")])
        }

        ImportRow::Team(r) => {
            let preferred = match &r.preferred_location {
                Some(name) => Some(location_id(conn, name)?),
                None => None,
            };
            let key = row.describe();
            if adding {
                insert_team(
                    conn,
                    &league_core::NewTeam {
                        division_id: r.division_id,
                        name: r.name.clone(),
                        description: r.description.clone().unwrap_or_default(),
                        previous_year_ranking: r.ranking,
                        preferred_location_id: preferred,
                    },
                )?;
                return Ok(vec![Mutation::new("team", key, "create")]);
            }
            let team = find_team(conn, r.division_id, &r.name)?
                .ok_or_else(|| vanished("team", &key))?;
            let patch = TeamPatch {
                description: r
                    .description
                    .clone()
                    .filter(|_| changed(preview, "description")),
                previous_year_ranking: r.ranking.filter(|_| changed(preview, "ranking")),
                preferred_location_id: preferred
                    .filter(|_| changed(preview, "preferred_location")),
            };
            if !patch.is_empty() {
                update_team(conn, team.id, &patch)?;
            }
            Ok(vec![Mutation::new("team", key, "update")])
        }

        ImportRow::LocationSlot(r) => {
            let location = location_id(conn, &r.location)?;
            let (timeslot, created) = find_or_insert_timeslot(conn, r.date, &r.modifier)?;
            insert_location_availability(conn, location, timeslot)?;
            let mut mutations = Vec::new();
            if created {
                mutations.push(Mutation::new(
                    "timeslot",
                    format!("{} {}", r.date, r.modifier),
                    "create",
                ));
            }
            mutations.push(Mutation::new("location-availability", row.describe(), "create"));
            Ok(mutations)
        }

        ImportRow::Availability(r) => {
            let mut mutations = Vec::new();
            for change in &r.changes {
                let key = format!("{} @ {} {}", r.team, change.date, change.modifier);
                if change.available {
                    insert_team_availability(conn, r.team_id, change.timeslot_id)?;
                    mutations.push(Mutation::new("team-availability", key, "create"));
                } else {
                    delete_team_availability(conn, r.team_id, change.timeslot_id)?;
                    mutations.push(Mutation::new("team-availability", key, "delete"));
                }
            }
            Ok(mutations)
        }

        ImportRow::Game(r) => {
            let key = row.describe();
            if adding {
                insert_previous_game(
                    conn,
                    r.date,
                    r.team_1_id,
                    r.team_2_id,
                    r.team_1_score,
                    r.team_2_score,
                )?;
                return Ok(vec![Mutation::new("previous-game", key, "create")]);
            }
            let game = find_game_between(conn, r.date, r.team_1_id, r.team_2_id)?
                .ok_or_else(|| vanished("previous game", &key))?;
            let (score_1, score_2) = r.scores_for(game.team_1_id);
            update_game_scores(
                conn,
                game.id,
                score_1.filter(|s| Some(*s) != game.team_1_score),
                score_2.filter(|s| Some(*s) != game.team_2_score),
            )?;
            Ok(vec![Mutation::new("previous-game", key, "update")])
        }

        ImportRow::Ranking(r) => {
            update_team(
                conn,
                r.team_id,
                &TeamPatch {
                    previous_year_ranking: Some(r.ranking),
                    ..Default::default()
                },
            )?;
            Ok(vec![Mutation::new("team", &r.team, "ranking")])
        }
    }
}
