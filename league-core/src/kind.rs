//! Import kinds and source file delimiters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when a string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {what} '{value}' (expected one of: {expected})")]
pub struct UnknownVariant {
    pub what: &'static str,
    pub value: String,
    pub expected: String,
}

/// The kind of data an import session loads. Each kind has a fixed field set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportKind {
    Location,
    Team,
    LocationAvailability,
    TeamAvailability,
    PreviousGame,
    Ranking,
}

impl ImportKind {
    pub const ALL: [ImportKind; 6] = [
        ImportKind::Location,
        ImportKind::Team,
        ImportKind::LocationAvailability,
        ImportKind::TeamAvailability,
        ImportKind::PreviousGame,
        ImportKind::Ranking,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Team => "team",
            Self::LocationAvailability => "location-availability",
            Self::TeamAvailability => "team-availability",
            Self::PreviousGame => "previous-game",
            Self::Ranking => "ranking",
        }
    }

    /// Human-readable label for summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Location => "Locations",
            Self::Team => "Teams",
            Self::LocationAvailability => "Location time slots",
            Self::TeamAvailability => "Team availability",
            Self::PreviousGame => "Previous games",
            Self::Ranking => "Rankings",
        }
    }
}

impl fmt::Display for ImportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        let kind = match normalized.as_str() {
            "location" | "locations" => Self::Location,
            "team" | "teams" => Self::Team,
            "location-availability" | "location-slots" | "location-timeslots" => {
                Self::LocationAvailability
            }
            "team-availability" | "availability" => Self::TeamAvailability,
            "previous-game" | "previous-games" | "games" => Self::PreviousGame,
            "ranking" | "rankings" => Self::Ranking,
            _ => {
                return Err(UnknownVariant {
                    what: "import kind",
                    value: s.to_string(),
                    expected: Self::ALL
                        .iter()
                        .map(|k| k.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                });
            }
        };
        Ok(kind)
    }
}

/// Cell separator of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    #[default]
    Comma,
    Semicolon,
    Tab,
    Pipe,
}

impl Delimiter {
    pub fn as_byte(&self) -> u8 {
        match self {
            Self::Comma => b',',
            Self::Semicolon => b';',
            Self::Tab => b'\t',
            Self::Pipe => b'|',
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Comma => "comma",
            Self::Semicolon => "semicolon",
            Self::Tab => "tab",
            Self::Pipe => "pipe",
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Delimiter {
    type Err = UnknownVariant;

    /// Accepts the delimiter's name or the character itself.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "," => return Ok(Self::Comma),
            ";" => return Ok(Self::Semicolon),
            "\t" | "\\t" => return Ok(Self::Tab),
            "|" => return Ok(Self::Pipe),
            _ => {}
        }
        match s.trim().to_ascii_lowercase().as_str() {
            "comma" | "csv" => Ok(Self::Comma),
            "semicolon" => Ok(Self::Semicolon),
            "tab" | "tsv" => Ok(Self::Tab),
            "pipe" => Ok(Self::Pipe),
            _ => Err(UnknownVariant {
                what: "delimiter",
                value: s.to_string(),
                expected: "comma, semicolon, tab, pipe".to_string(),
            }),
        }
    }
}
