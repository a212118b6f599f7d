//! Normalized rows, one variant per import kind.
//!
//! Optional fields are `None` when their column is unmapped (or, for
//! nullable numbers, when the cell is empty). `None` never overwrites a
//! stored value.

use chrono::NaiveDate;
use league_core::ImportKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRow {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRow {
    pub name: String,
    pub division: String,
    pub division_id: i64,
    pub description: Option<String>,
    pub ranking: Option<u32>,
    pub preferred_location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSlotRow {
    pub location: String,
    pub date: NaiveDate,
    pub modifier: String,
}

/// One availability flip for a matched time slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotChange {
    pub timeslot_id: i64,
    pub date: NaiveDate,
    pub modifier: String,
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRow {
    pub team: String,
    pub team_id: i64,
    pub division: Option<String>,
    /// Only the slots whose availability differs from the current state.
    pub changes: Vec<SlotChange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRow {
    pub date: NaiveDate,
    pub team_1: String,
    pub team_2: String,
    pub team_1_id: i64,
    pub team_2_id: i64,
    pub team_1_score: Option<u32>,
    pub team_2_score: Option<u32>,
}

impl GameRow {
    /// Scores in the order `(stored_team_1, stored_team_2)`.
    pub fn scores_for(&self, stored_team_1_id: i64) -> (Option<u32>, Option<u32>) {
        if stored_team_1_id == self.team_1_id {
            (self.team_1_score, self.team_2_score)
        } else {
            (self.team_2_score, self.team_1_score)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingRow {
    pub team: String,
    pub team_id: i64,
    pub division_id: i64,
    pub ranking: u32,
    pub will_change: bool,
}

/// A normalized row of any kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ImportRow {
    Location(LocationRow),
    Team(TeamRow),
    LocationSlot(LocationSlotRow),
    Availability(AvailabilityRow),
    Game(GameRow),
    Ranking(RankingRow),
}

impl ImportRow {
    pub fn kind(&self) -> ImportKind {
        match self {
            Self::Location(_) => ImportKind::Location,
            Self::Team(_) => ImportKind::Team,
            Self::LocationSlot(_) => ImportKind::LocationAvailability,
            Self::Availability(_) => ImportKind::TeamAvailability,
            Self::Game(_) => ImportKind::PreviousGame,
            Self::Ranking(_) => ImportKind::Ranking,
        }
    }

    /// Human-readable natural key, used in reports and the audit trail.
    pub fn describe(&self) -> String {
        match self {
            Self::Location(r) => r.name.clone(),
            Self::Team(r) => format!("{} ({})", r.name, r.division),
            Self::LocationSlot(r) => format!("{} @ {} {}", r.location, r.date, r.modifier),
            Self::Availability(r) => r.team.clone(),
            Self::Game(r) => format!("{} {} vs {}", r.date, r.team_1, r.team_2),
            Self::Ranking(r) => r.team.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> GameRow {
        GameRow {
            date: NaiveDate::from_ymd_opt(2024, 11, 2).unwrap(),
            team_1: "Hawks".to_string(),
            team_2: "Owls".to_string(),
            team_1_id: 1,
            team_2_id: 2,
            team_1_score: Some(3),
            team_2_score: None,
        }
    }

    #[test]
    fn test_scores_follow_stored_order() {
        let g = game();
        assert_eq!(g.scores_for(1), (Some(3), None));
        assert_eq!(g.scores_for(2), (None, Some(3)));
    }

    #[test]
    fn test_row_kind_and_tag() {
        let row = ImportRow::Game(game());
        assert_eq!(row.kind(), ImportKind::PreviousGame);
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["kind"], "game");
        assert_eq!(json["date"], "2024-11-02");
    }
}
