//! In-memory snapshot of the league that previews reconcile against.
//!
//! The snapshot is loaded once per preview. As rows are classified, the
//! changes they would make are staged here too, so later rows in the same
//! file see earlier ones: a repeated row is a duplicate of its first
//! occurrence rather than a second add.
//!
//! Names are keyed by their trimmed, ASCII-lowercased form, which matches
//! SQLite's `NOCASE` collation used by the database.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use league_core::{Division, TimeSlot};
use league_db::{
    Connection, OperationError, list_divisions, list_location_availability, list_locations,
    list_previous_games, list_team_availability, list_teams, list_timeslots,
};

use crate::error::RowIssue;

/// A location, persisted (`id` set) or staged by an earlier row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationState {
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
}

/// A team, persisted (`id` set) or staged by an earlier row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamState {
    pub id: Option<i64>,
    pub division_id: i64,
    pub name: String,
    pub description: String,
    pub ranking: Option<u32>,
    /// Preferred location by key, so staged locations can be referenced.
    pub preferred_location: Option<String>,
}

/// A previous game, persisted or staged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub id: Option<i64>,
    pub date: NaiveDate,
    pub team_1_id: i64,
    pub team_2_id: i64,
    pub team_1_score: Option<u32>,
    pub team_2_score: Option<u32>,
}

/// Everything the diff engine compares rows against.
#[derive(Debug, Default)]
pub struct LeagueState {
    divisions: HashMap<String, Division>,
    locations: HashMap<String, LocationState>,
    location_ids: HashMap<i64, String>,
    teams: Vec<TeamState>,
    timeslots: Vec<TimeSlot>,
    /// `(location key, date, modifier)` links, persisted and staged.
    location_slots: HashSet<(String, NaiveDate, String)>,
    team_slots: HashSet<(i64, i64)>,
    games: Vec<GameState>,
}

pub(crate) fn key(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

impl LeagueState {
    /// Load the current league from the database.
    pub fn load(conn: &Connection) -> Result<Self, OperationError> {
        let mut state = Self::default();
        for division in list_divisions(conn)? {
            state.divisions.insert(key(&division.name), division);
        }
        for location in list_locations(conn)? {
            state.location_ids.insert(location.id, key(&location.name));
            state.locations.insert(
                key(&location.name),
                LocationState {
                    id: Some(location.id),
                    name: location.name,
                    description: location.description,
                },
            );
        }
        for team in list_teams(conn)? {
            let preferred_location = team
                .preferred_location_id
                .and_then(|id| state.location_ids.get(&id).cloned());
            state.teams.push(TeamState {
                id: Some(team.id),
                division_id: team.division_id,
                name: team.name,
                description: team.description,
                ranking: team.previous_year_ranking,
                preferred_location,
            });
        }
        state.timeslots = list_timeslots(conn, None)?;

        let slots_by_id: HashMap<i64, &TimeSlot> =
            state.timeslots.iter().map(|s| (s.id, s)).collect();
        let mut location_slots = HashSet::new();
        for link in list_location_availability(conn, None)? {
            if let (Some(loc), Some(slot)) = (
                state.location_ids.get(&link.location_id),
                slots_by_id.get(&link.timeslot_id),
            ) {
                location_slots.insert((loc.clone(), slot.date, slot.modifier.clone()));
            }
        }
        state.location_slots = location_slots;

        state.team_slots = list_team_availability(conn, None)?
            .into_iter()
            .map(|a| (a.team_id, a.timeslot_id))
            .collect();

        state.games = list_previous_games(conn)?
            .into_iter()
            .map(|g| GameState {
                id: Some(g.id),
                date: g.date,
                team_1_id: g.team_1_id,
                team_2_id: g.team_2_id,
                team_1_score: g.team_1_score,
                team_2_score: g.team_2_score,
            })
            .collect();

        log::debug!(
            "Loaded league state: {} divisions, {} teams, {} locations, {} time slots, {} games",
            state.divisions.len(),
            state.teams.len(),
            state.locations.len(),
            state.timeslots.len(),
            state.games.len()
        );
        Ok(state)
    }

    // ── Lookups ────────────────────────────────────────────────────────────

    pub fn division(&self, name: &str) -> Option<&Division> {
        self.divisions.get(&key(name))
    }

    pub fn location(&self, name: &str) -> Option<&LocationState> {
        self.locations.get(&key(name))
    }

    /// The team named `name` in division `division_id`.
    pub fn team_in(&self, division_id: i64, name: &str) -> Option<&TeamState> {
        let k = key(name);
        self.teams
            .iter()
            .find(|t| t.division_id == division_id && key(&t.name) == k)
    }

    /// Resolve a team reference, optionally qualified by division name.
    ///
    /// Without a division, a name shared by teams in several divisions is
    /// ambiguous.
    pub fn resolve_team(&self, name: &str, division: Option<&str>) -> Result<&TeamState, RowIssue> {
        if let Some(division) = division.filter(|d| !d.trim().is_empty()) {
            let div = self
                .division(division)
                .ok_or_else(|| RowIssue::reference("division", division.trim()))?;
            return self
                .team_in(div.id, name)
                .ok_or_else(|| RowIssue::reference("team", name.trim()));
        }
        let k = key(name);
        let mut matches = self.teams.iter().filter(|t| key(&t.name) == k);
        match (matches.next(), matches.next()) {
            (Some(team), None) => Ok(team),
            (Some(_), Some(_)) => Err(RowIssue::Ambiguous {
                name: name.trim().to_string(),
            }),
            (None, _) => Err(RowIssue::reference("team", name.trim())),
        }
    }

    /// Persisted time slots on `date`.
    pub fn slots_on(&self, date: NaiveDate) -> impl Iterator<Item = &TimeSlot> {
        self.timeslots.iter().filter(move |s| s.date == date)
    }

    /// The persisted slot with exactly this date and modifier.
    pub fn timeslot(&self, date: NaiveDate, modifier: &str) -> Option<&TimeSlot> {
        self.timeslots
            .iter()
            .find(|s| s.date == date && s.modifier == modifier)
    }

    pub fn has_location_slot(&self, location: &str, date: NaiveDate, modifier: &str) -> bool {
        self.location_slots
            .contains(&(key(location), date, modifier.to_string()))
    }

    pub fn team_available(&self, team_id: i64, timeslot_id: i64) -> bool {
        self.team_slots.contains(&(team_id, timeslot_id))
    }

    /// The game on `date` between two teams, in either order.
    pub fn game_between(&self, date: NaiveDate, a: i64, b: i64) -> Option<&GameState> {
        self.games.iter().find(|g| {
            g.date == date
                && ((g.team_1_id == a && g.team_2_id == b) || (g.team_1_id == b && g.team_2_id == a))
        })
    }

    // ── Staging ────────────────────────────────────────────────────────────

    /// Insert or replace a location.
    pub fn stage_location(&mut self, location: LocationState) {
        self.locations.insert(key(&location.name), location);
    }

    /// Insert or replace a team (matched on division and name).
    pub fn stage_team(&mut self, team: TeamState) {
        let k = key(&team.name);
        match self
            .teams
            .iter_mut()
            .find(|t| t.division_id == team.division_id && key(&t.name) == k)
        {
            Some(existing) => *existing = team,
            None => self.teams.push(team),
        }
    }

    pub fn stage_location_slot(&mut self, location: &str, date: NaiveDate, modifier: &str) {
        self.location_slots
            .insert((key(location), date, modifier.to_string()));
    }

    pub fn stage_team_slot(&mut self, team_id: i64, timeslot_id: i64, available: bool) {
        if available {
            self.team_slots.insert((team_id, timeslot_id));
        } else {
            self.team_slots.remove(&(team_id, timeslot_id));
        }
    }

    /// Insert or replace a game (matched on date and unordered team pair).
    pub fn stage_game(&mut self, game: GameState) {
        let existing = self.games.iter_mut().find(|g| {
            g.date == game.date
                && ((g.team_1_id == game.team_1_id && g.team_2_id == game.team_2_id)
                    || (g.team_1_id == game.team_2_id && g.team_2_id == game.team_1_id))
        });
        match existing {
            Some(existing) => *existing = game,
            None => self.games.push(game),
        }
    }

    /// Set a team's ranking.
    pub fn stage_ranking(&mut self, division_id: i64, name: &str, ranking: u32) {
        let k = key(name);
        if let Some(team) = self
            .teams
            .iter_mut()
            .find(|t| t.division_id == division_id && key(&t.name) == k)
        {
            team.ranking = Some(ranking);
        }
    }
}
