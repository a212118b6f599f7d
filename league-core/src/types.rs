//! Data model types for the league database.
//!
//! These mirror the persistent schema: divisions, teams, locations, time
//! slots, availability links, previous games, and import tracking.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Division ────────────────────────────────────────────────────────────────

/// A competitive grouping of teams. Games are only scheduled within one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Division {
    pub id: i64,
    pub name: String,
}

// ── Team ────────────────────────────────────────────────────────────────────

/// A team registered in a division.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub division_id: i64,
    pub name: String,
    pub description: String,
    /// Final standing from the previous season, used for seeding.
    pub previous_year_ranking: Option<u32>,
    pub preferred_location_id: Option<i64>,
}

/// Fields for creating a team. The id is assigned by the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTeam {
    pub division_id: i64,
    pub name: String,
    pub description: String,
    pub previous_year_ranking: Option<u32>,
    pub preferred_location_id: Option<i64>,
}

/// A partial team update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamPatch {
    pub description: Option<String>,
    pub previous_year_ranking: Option<u32>,
    pub preferred_location_id: Option<i64>,
}

impl TeamPatch {
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.previous_year_ranking.is_none()
            && self.preferred_location_id.is_none()
    }
}

// ── Location ────────────────────────────────────────────────────────────────

/// A venue (field, court, rink) where games are played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub description: String,
}

// ── Time Slot ───────────────────────────────────────────────────────────────

/// A playable time on a specific date.
///
/// `modifier` is a free-text label: usually a clock time such as `"7:00 PM"`,
/// sometimes a coarse label such as `"AM"` or an arbitrary name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: i64,
    pub date: NaiveDate,
    pub modifier: String,
}

/// Location `location_id` can host a game during `timeslot_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationAvailability {
    pub location_id: i64,
    pub timeslot_id: i64,
}

/// Team `team_id` can play during `timeslot_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamAvailability {
    pub team_id: i64,
    pub timeslot_id: i64,
}

// ── Previous Game ───────────────────────────────────────────────────────────

/// A historical game result. Scores are `None` until known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviousGame {
    pub id: i64,
    pub date: NaiveDate,
    pub team_1_id: i64,
    pub team_2_id: i64,
    pub team_1_score: Option<u32>,
    pub team_2_score: Option<u32>,
}

impl PreviousGame {
    /// Whether this game was played between the two teams, in either order.
    pub fn involves_pair(&self, a: i64, b: i64) -> bool {
        (self.team_1_id == a && self.team_2_id == b) || (self.team_1_id == b && self.team_2_id == a)
    }
}

// ── Import Tracking ─────────────────────────────────────────────────────────

/// Log entry for a committed import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportLog {
    pub id: i64,
    pub kind: String,
    pub source_name: String,
    pub operator: String,
    pub imported_at: String,
    pub records_created: i64,
    pub records_updated: i64,
    pub records_unchanged: i64,
    pub records_failed: i64,
}

/// One applied mutation, recorded for later inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub session_id: String,
    pub operator: String,
    pub entity_type: String,
    pub entity_key: String,
    pub action: String,
    pub source_line: i64,
}
