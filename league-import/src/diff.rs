//! Row reconciliation: classify one raw row against the league state.
//!
//! Each kind checks, in order: malformed shape, required presence, references,
//! then value formats. The first failure becomes the row's error. Rows that
//! pass are compared with the record sharing their natural key and their
//! changes are staged into the state.

use std::collections::BTreeMap;

use league_core::ImportKind;

use crate::availability::AvailabilityColumn;
use crate::error::RowIssue;
use crate::mapping::ColumnMapping;
use crate::normalize::{
    NormalizationError, normalize_count, normalize_date, normalize_modifier, normalize_text,
    parse_availability_cell,
};
use crate::parser::RawRow;
use crate::preview::{Classification, FieldChange};
use crate::rows::*;
use crate::slots::match_slots;
use crate::state::{GameState, LeagueState, LocationState, TeamState, key};

/// A row that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub row: ImportRow,
    pub classification: Classification,
    pub changes: Vec<FieldChange>,
    pub notes: Vec<String>,
}

impl Reconciled {
    fn new(row: ImportRow, classification: Classification) -> Self {
        Self {
            row,
            classification,
            changes: Vec::new(),
            notes: Vec::new(),
        }
    }

    fn with_changes(row: ImportRow, changes: Vec<FieldChange>) -> Self {
        let classification = if changes.is_empty() {
            Classification::Duplicate
        } else {
            Classification::Update
        };
        Self {
            row,
            classification,
            changes,
            notes: Vec::new(),
        }
    }
}

/// Classify `raw` as a row of `kind`, staging its effect into `state`.
pub fn reconcile_row(
    kind: ImportKind,
    raw: &RawRow,
    mapping: &ColumnMapping,
    columns: &[AvailabilityColumn],
    state: &mut LeagueState,
) -> Result<Reconciled, RowIssue> {
    if let Some(m) = raw.malformed {
        return Err(RowIssue::Malformed {
            expected: m.expected,
            found: m.found,
        });
    }
    let cells = Cells { raw, mapping };
    match kind {
        ImportKind::Location => reconcile_location(&cells, state),
        ImportKind::Team => reconcile_team(&cells, state),
        ImportKind::LocationAvailability => reconcile_location_slot(&cells, state),
        ImportKind::TeamAvailability => reconcile_availability(&cells, columns, state),
        ImportKind::PreviousGame => reconcile_game(&cells, state),
        ImportKind::Ranking => reconcile_ranking(&cells, state),
    }
}

/// Mapped access to one raw row.
struct Cells<'a> {
    raw: &'a RawRow,
    mapping: &'a ColumnMapping,
}

impl<'a> Cells<'a> {
    /// Raw cell for `field`; `None` when the field is unmapped.
    fn mapped(&self, field: &str) -> Option<&'a str> {
        let header = self.mapping.header_for(field)?;
        Some(self.raw.get(header).unwrap_or(""))
    }

    /// Trimmed, non-empty text of a required field.
    fn required(&self, field: &str) -> Result<String, RowIssue> {
        let value = self.mapped(field).map(normalize_text).unwrap_or_default();
        if value.is_empty() {
            return Err(RowIssue::missing(field));
        }
        Ok(value)
    }

    /// Text of an optional field; `None` when unmapped.
    fn text(&self, field: &str) -> Option<String> {
        self.mapped(field).map(normalize_text)
    }

    /// Text of an optional reference field; empty counts as absent.
    fn reference(&self, field: &str) -> Option<String> {
        self.text(field).filter(|v| !v.is_empty())
    }

    /// A nullable count; `None` when unmapped or empty.
    fn count(&self, field: &str) -> Result<Option<u32>, RowIssue> {
        match self.mapped(field) {
            None => Ok(None),
            Some(raw) => normalize_count(raw, true).map_err(|e| format_issue(field, raw, e)),
        }
    }
}

fn format_issue(field: &str, raw: &str, err: NormalizationError) -> RowIssue {
    RowIssue::Normalization {
        field: field.to_string(),
        value: raw.trim().to_string(),
        reason: err.to_string(),
    }
}

fn show(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn availability_word(available: bool) -> &'static str {
    if available { "available" } else { "not available" }
}

// ── Locations ───────────────────────────────────────────────────────────────

fn reconcile_location(cells: &Cells<'_>, state: &mut LeagueState) -> Result<Reconciled, RowIssue> {
    let name = cells.required("name")?;
    let description = cells.text("description");
    let row = LocationRow { name, description };

    let Some(existing) = state.location(&row.name).cloned() else {
        state.stage_location(LocationState {
            id: None,
            name: row.name.clone(),
            description: row.description.clone().unwrap_or_default(),
        });
        return Ok(Reconciled::new(ImportRow::Location(row), Classification::Add));
    };

    let mut changes = Vec::new();
    if let Some(description) = &row.description
        && *description != existing.description
    {
        changes.push(FieldChange::new(
            "description",
            existing.description.clone(),
            description.clone(),
        ));
        state.stage_location(LocationState {
            description: description.clone(),
            ..existing
        });
    }
    Ok(Reconciled::with_changes(ImportRow::Location(row), changes))
}

// ── Teams ───────────────────────────────────────────────────────────────────

fn reconcile_team(cells: &Cells<'_>, state: &mut LeagueState) -> Result<Reconciled, RowIssue> {
    let name = cells.required("name")?;
    let division = cells.required("division")?;

    let division_id = state
        .division(&division)
        .map(|d| d.id)
        .ok_or_else(|| RowIssue::reference("division", &division))?;
    let preferred_location = match cells.reference("preferred_location") {
        Some(loc) => Some(
            state
                .location(&loc)
                .map(|l| l.name.clone())
                .ok_or_else(|| RowIssue::reference("location", &loc))?,
        ),
        None => None,
    };

    let ranking = cells.count("ranking")?;
    let row = TeamRow {
        name,
        division,
        division_id,
        description: cells.text("description"),
        ranking,
        preferred_location,
    };

    let Some(existing) = state.team_in(division_id, &row.name).cloned() else {
        state.stage_team(TeamState {
            id: None,
            division_id,
            name: row.name.clone(),
            description: row.description.clone().unwrap_or_default(),
            ranking: row.ranking,
            preferred_location: row.preferred_location.as_deref().map(key),
        });
        return Ok(Reconciled::new(ImportRow::Team(row), Classification::Add));
    };

    let mut changes = Vec::new();
    let mut updated = existing.clone();
    if let Some(description) = &row.description
        && *description != existing.description
    {
        changes.push(FieldChange::new(
            "description",
            existing.description.clone(),
            description.clone(),
        ));
        updated.description = description.clone();
    }
    if row.ranking.is_some() && row.ranking != existing.ranking {
        changes.push(FieldChange::new(
            "ranking",
            show(existing.ranking),
            show(row.ranking),
        ));
        updated.ranking = row.ranking;
    }
    if let Some(location) = &row.preferred_location {
        let wanted = key(location);
        if existing.preferred_location.as_deref() != Some(wanted.as_str()) {
            changes.push(FieldChange::new(
                "preferred_location",
                existing.preferred_location.clone().unwrap_or_default(),
                location.clone(),
            ));
            updated.preferred_location = Some(wanted);
        }
    }
    if !changes.is_empty() {
        state.stage_team(updated);
    }
    Ok(Reconciled::with_changes(ImportRow::Team(row), changes))
}

// ── Location Availability ───────────────────────────────────────────────────

fn reconcile_location_slot(
    cells: &Cells<'_>,
    state: &mut LeagueState,
) -> Result<Reconciled, RowIssue> {
    let location = cells.required("location")?;
    let date_raw = cells.required("date")?;
    let modifier_raw = cells.required("modifier")?;

    let location = state
        .location(&location)
        .map(|l| l.name.clone())
        .ok_or_else(|| RowIssue::reference("location", &location))?;

    let date = normalize_date(&date_raw).map_err(|e| format_issue("date", &date_raw, e))?;
    let modifier = normalize_modifier(&modifier_raw);
    let row = LocationSlotRow {
        location,
        date,
        modifier,
    };

    if state.has_location_slot(&row.location, row.date, &row.modifier) {
        return Ok(Reconciled::new(
            ImportRow::LocationSlot(row),
            Classification::Duplicate,
        ));
    }

    let mut notes = Vec::new();
    if state.timeslot(row.date, &row.modifier).is_none() {
        notes.push(format!(
            "new time slot {} {} will be created",
            row.date, row.modifier
        ));
    }
    state.stage_location_slot(&row.location, row.date, &row.modifier);
    Ok(Reconciled {
        notes,
        ..Reconciled::new(ImportRow::LocationSlot(row), Classification::Add)
    })
}

// ── Team Availability ───────────────────────────────────────────────────────

fn reconcile_availability(
    cells: &Cells<'_>,
    columns: &[AvailabilityColumn],
    state: &mut LeagueState,
) -> Result<Reconciled, RowIssue> {
    let team = cells.required("team")?;
    let division = cells.reference("division");

    let team_id = state
        .resolve_team(&team, division.as_deref())?
        .id
        .ok_or_else(|| RowIssue::reference("team", &team))?;

    // Later columns win when two resolve to the same slot.
    let mut wanted: BTreeMap<i64, SlotChange> = BTreeMap::new();
    let mut notes = Vec::new();
    for column in columns {
        let Some(available) = cells.raw.get(&column.header).and_then(parse_availability_cell)
        else {
            continue;
        };
        let matched = match_slots(column.date, &column.modifier, state.slots_on(column.date));
        if matched.is_empty() {
            notes.push(format!(
                "no time slot on {} matches '{}'",
                column.date, column.modifier
            ));
            continue;
        }
        for slot in matched {
            wanted.insert(
                slot.id,
                SlotChange {
                    timeslot_id: slot.id,
                    date: slot.date,
                    modifier: slot.modifier.clone(),
                    available,
                },
            );
        }
    }

    let slot_changes: Vec<SlotChange> = wanted
        .into_values()
        .filter(|c| state.team_available(team_id, c.timeslot_id) != c.available)
        .collect();

    let classification = if slot_changes.is_empty() {
        Classification::Duplicate
    } else if slot_changes.iter().all(|c| c.available) {
        Classification::Add
    } else {
        Classification::Update
    };
    let changes = slot_changes
        .iter()
        .map(|c| {
            FieldChange::new(
                format!("{} {}", c.date, c.modifier),
                availability_word(!c.available),
                availability_word(c.available),
            )
        })
        .collect();
    for c in &slot_changes {
        state.stage_team_slot(team_id, c.timeslot_id, c.available);
    }

    let row = AvailabilityRow {
        team,
        team_id,
        division,
        changes: slot_changes,
    };
    Ok(Reconciled {
        row: ImportRow::Availability(row),
        classification,
        changes,
        notes,
    })
}

// ── Previous Games ──────────────────────────────────────────────────────────

fn reconcile_game(cells: &Cells<'_>, state: &mut LeagueState) -> Result<Reconciled, RowIssue> {
    let date_raw = cells.required("date")?;
    let team_1 = cells.required("team_1")?;
    let team_2 = cells.required("team_2")?;
    let division = cells.reference("division");

    let team_1_id = state
        .resolve_team(&team_1, division.as_deref())?
        .id
        .ok_or_else(|| RowIssue::reference("team", &team_1))?;
    let team_2_id = state
        .resolve_team(&team_2, division.as_deref())?
        .id
        .ok_or_else(|| RowIssue::reference("team", &team_2))?;
    if team_1_id == team_2_id {
        return Err(RowIssue::Invalid {
            reason: format!("'{team_1}' and '{team_2}' are the same team"),
        });
    }

    let date = normalize_date(&date_raw).map_err(|e| format_issue("date", &date_raw, e))?;
    let row = GameRow {
        date,
        team_1,
        team_2,
        team_1_id,
        team_2_id,
        team_1_score: cells.count("team_1_score")?,
        team_2_score: cells.count("team_2_score")?,
    };

    let Some(existing) = state.game_between(date, team_1_id, team_2_id).cloned() else {
        state.stage_game(GameState {
            id: None,
            date,
            team_1_id,
            team_2_id,
            team_1_score: row.team_1_score,
            team_2_score: row.team_2_score,
        });
        return Ok(Reconciled::new(ImportRow::Game(row), Classification::Add));
    };

    let (score_1, score_2) = row.scores_for(existing.team_1_id);
    let mut changes = Vec::new();
    let mut updated = existing.clone();
    if score_1.is_some() && score_1 != existing.team_1_score {
        changes.push(FieldChange::new(
            "team_1_score",
            show(existing.team_1_score),
            show(score_1),
        ));
        updated.team_1_score = score_1;
    }
    if score_2.is_some() && score_2 != existing.team_2_score {
        changes.push(FieldChange::new(
            "team_2_score",
            show(existing.team_2_score),
            show(score_2),
        ));
        updated.team_2_score = score_2;
    }
    if !changes.is_empty() {
        state.stage_game(updated);
    }
    Ok(Reconciled::with_changes(ImportRow::Game(row), changes))
}

// ── Rankings ────────────────────────────────────────────────────────────────

fn reconcile_ranking(cells: &Cells<'_>, state: &mut LeagueState) -> Result<Reconciled, RowIssue> {
    let team = cells.required("team")?;
    let ranking_raw = cells.required("ranking")?;
    let division = cells.reference("division");

    let existing = state.resolve_team(&team, division.as_deref())?.clone();
    let team_id = existing
        .id
        .ok_or_else(|| RowIssue::reference("team", &team))?;

    let ranking = normalize_count(&ranking_raw, false)
        .map_err(|e| format_issue("ranking", &ranking_raw, e))?
        .ok_or_else(|| RowIssue::missing("ranking"))?;

    let will_change = existing.ranking != Some(ranking);
    let mut changes = Vec::new();
    if will_change {
        changes.push(FieldChange::new(
            "ranking",
            show(existing.ranking),
            ranking.to_string(),
        ));
        state.stage_ranking(existing.division_id, &existing.name, ranking);
    }
    let row = RankingRow {
        team,
        team_id,
        division_id: existing.division_id,
        ranking,
        will_change,
    };
    Ok(Reconciled::with_changes(ImportRow::Ranking(row), changes))
}
