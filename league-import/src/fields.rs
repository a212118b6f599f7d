//! Canonical field tables for each import kind.
//!
//! Each table is the ordered rule list the auto-mapper walks: fields earlier
//! in the table get the first pick of headers during the pattern pass, so
//! specific fields (e.g. `team_1_score`) come before the general ones they
//! would otherwise lose columns to (e.g. `team_1`).

use league_core::ImportKind;

/// One canonical field of an import kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub required: bool,
    /// Header spellings accepted in the exact pass (already normalized).
    pub synonyms: &'static [&'static str],
    /// Case-insensitive regular expressions tried in the pattern pass.
    pub patterns: &'static [&'static str],
}

const fn field(
    name: &'static str,
    label: &'static str,
    required: bool,
    synonyms: &'static [&'static str],
    patterns: &'static [&'static str],
) -> FieldSpec {
    FieldSpec {
        name,
        label,
        required,
        synonyms,
        patterns,
    }
}

const DIVISION: FieldSpec = field(
    "division",
    "Division",
    false,
    &["league", "group", "div", "division name"],
    &[r"\bdiv", r"league", r"\bgroup"],
);

static LOCATION_FIELDS: &[FieldSpec] = &[
    field(
        "description",
        "Description",
        false,
        &["desc", "details", "notes", "location description"],
        &[r"desc", r"\bnotes?\b", r"detail"],
    ),
    field(
        "name",
        "Name",
        true,
        &["location", "location name", "venue", "field", "court", "site"],
        &[r"name", r"location", r"venue", r"court", r"field"],
    ),
];

static TEAM_FIELDS: &[FieldSpec] = &[
    field(
        "ranking",
        "Previous-year ranking",
        false,
        &[
            "rank",
            "previous year ranking",
            "previous ranking",
            "last year rank",
            "seed",
        ],
        &[r"rank", r"seed", r"standing"],
    ),
    field(
        "preferred_location",
        "Preferred location",
        false,
        &[
            "preferred location",
            "home field",
            "home location",
            "home court",
            "location",
        ],
        &[r"prefer", r"home\s*(field|court|location)", r"location|venue"],
    ),
    field(
        "description",
        "Description",
        false,
        &["desc", "details", "notes", "team description"],
        &[r"desc", r"\bnotes?\b"],
    ),
    DIVISION,
    field(
        "name",
        "Team name",
        true,
        &["team", "team name"],
        &[r"team", r"name"],
    ),
];

static LOCATION_SLOT_FIELDS: &[FieldSpec] = &[
    field(
        "location",
        "Location",
        true,
        &["location name", "venue", "field", "court", "site"],
        &[r"location", r"venue", r"court", r"field"],
    ),
    field(
        "date",
        "Date",
        true,
        &["day", "game date", "slot date"],
        &[r"date", r"\bday\b"],
    ),
    field(
        "modifier",
        "Time / slot",
        true,
        &["time", "slot", "time slot", "timeslot", "start time", "start"],
        &[r"time", r"slot", r"modifier"],
    ),
];

static TEAM_AVAILABILITY_FIELDS: &[FieldSpec] = &[
    DIVISION,
    field(
        "team",
        "Team",
        true,
        &["team name", "name"],
        &[r"team", r"name"],
    ),
];

static PREVIOUS_GAME_FIELDS: &[FieldSpec] = &[
    field(
        "team_1_score",
        "Team 1 score",
        false,
        &["home score", "score 1", "team a score", "home team score"],
        &[r"(home|team\s*(1|a)\b).*score", r"score.*\b(1|a|home)\b"],
    ),
    field(
        "team_2_score",
        "Team 2 score",
        false,
        &[
            "away score",
            "visitor score",
            "score 2",
            "team b score",
            "away team score",
        ],
        &[
            r"(away|visit\w*|team\s*(2|b)\b).*score",
            r"score.*\b(2|b|away)\b",
        ],
    ),
    field(
        "date",
        "Date",
        true,
        &["game date", "played", "played on", "day"],
        &[r"date", r"played"],
    ),
    field(
        "team_1",
        "Team 1",
        true,
        &["home", "team 1", "team a", "home team", "team1"],
        &[r"home", r"team\s*(1|a)\b"],
    ),
    field(
        "team_2",
        "Team 2",
        true,
        &[
            "away",
            "visitor",
            "team 2",
            "team b",
            "away team",
            "visiting team",
            "team2",
        ],
        &[r"away", r"visit", r"team\s*(2|b)\b"],
    ),
    DIVISION,
];

static RANKING_FIELDS: &[FieldSpec] = &[
    field(
        "ranking",
        "Ranking",
        true,
        &[
            "rank",
            "previous year ranking",
            "previous ranking",
            "standing",
            "place",
            "final position",
        ],
        &[r"rank", r"standing", r"\bplace", r"position"],
    ),
    DIVISION,
    field(
        "team",
        "Team",
        true,
        &["team name", "name"],
        &[r"team", r"name"],
    ),
];

/// The rule table for `kind`, in auto-mapping priority order.
pub fn field_specs(kind: ImportKind) -> &'static [FieldSpec] {
    match kind {
        ImportKind::Location => LOCATION_FIELDS,
        ImportKind::Team => TEAM_FIELDS,
        ImportKind::LocationAvailability => LOCATION_SLOT_FIELDS,
        ImportKind::TeamAvailability => TEAM_AVAILABILITY_FIELDS,
        ImportKind::PreviousGame => PREVIOUS_GAME_FIELDS,
        ImportKind::Ranking => RANKING_FIELDS,
    }
}

/// Look up one field of `kind`.
pub fn field_spec(kind: ImportKind, name: &str) -> Option<&'static FieldSpec> {
    field_specs(kind).iter().find(|f| f.name == name)
}

/// Names of the required fields of `kind`.
pub fn required_fields(kind: ImportKind) -> impl Iterator<Item = &'static str> {
    field_specs(kind)
        .iter()
        .filter(|f| f.required)
        .map(|f| f.name)
}

/// Normalize a header or field name for exact comparison: lowercase,
/// `_` and `-` become spaces, runs of whitespace collapse to one space.
pub fn normalize_header(header: &str) -> String {
    header
        .to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_required_fields() {
        for kind in ImportKind::ALL {
            assert!(required_fields(kind).count() > 0, "{kind} has no required fields");
        }
    }

    #[test]
    fn test_required_fields_per_kind() {
        let team: Vec<_> = required_fields(ImportKind::Team).collect();
        assert_eq!(team, vec!["division", "name"]);
        let games: Vec<_> = required_fields(ImportKind::PreviousGame).collect();
        assert_eq!(games, vec!["date", "team_1", "team_2"]);
    }

    #[test]
    fn test_synonyms_are_normalized() {
        for kind in ImportKind::ALL {
            for spec in field_specs(kind) {
                for syn in spec.synonyms {
                    assert_eq!(*syn, normalize_header(syn), "{kind}.{}", spec.name);
                }
            }
        }
    }

    #[test]
    fn test_patterns_compile() {
        for kind in ImportKind::ALL {
            for spec in field_specs(kind) {
                for pattern in spec.patterns {
                    assert!(regex::Regex::new(pattern).is_ok(), "{pattern}");
                }
            }
        }
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("Team_1  Score"), "team 1 score");
        assert_eq!(normalize_header(" previous-year_ranking "), "previous year ranking");
    }
}
