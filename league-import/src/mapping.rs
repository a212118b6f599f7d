//! Column mappings and header auto-detection.

use std::collections::{BTreeMap, HashSet};

use league_core::ImportKind;
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};

use crate::availability::parse_availability_header;
use crate::error::MappingError;
use crate::fields::{field_spec, field_specs, normalize_header};

/// Canonical field name → source header. A field present with `None` was
/// explicitly left unmapped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    entries: BTreeMap<String, Option<String>>,
}

impl ColumnMapping {
    /// A mapping with every field of `kind` unmapped.
    pub fn empty(kind: ImportKind) -> Self {
        Self {
            entries: field_specs(kind)
                .iter()
                .map(|f| (f.name.to_string(), None))
                .collect(),
        }
    }

    /// The header `field` reads from, if mapped.
    pub fn header_for(&self, field: &str) -> Option<&str> {
        self.entries.get(field).and_then(|h| h.as_deref())
    }

    pub fn is_mapped(&self, field: &str) -> bool {
        self.header_for(field).is_some()
    }

    /// Map `field` to `header`, checking the field belongs to `kind`.
    pub fn set(&mut self, kind: ImportKind, field: &str, header: &str) -> Result<(), MappingError> {
        let spec = field_spec(kind, field).ok_or_else(|| MappingError::UnknownField {
            field: field.to_string(),
            kind: kind.to_string(),
        })?;
        self.entries
            .insert(spec.name.to_string(), Some(header.trim().to_string()));
        Ok(())
    }

    /// Explicitly unmap `field`.
    pub fn unset(&mut self, kind: ImportKind, field: &str) -> Result<(), MappingError> {
        let spec = field_spec(kind, field).ok_or_else(|| MappingError::UnknownField {
            field: field.to_string(),
            kind: kind.to_string(),
        })?;
        self.entries.insert(spec.name.to_string(), None);
        Ok(())
    }

    /// `(field, header)` pairs in the kind's field order.
    pub fn entries(&self, kind: ImportKind) -> Vec<(&'static str, Option<&str>)> {
        field_specs(kind)
            .iter()
            .map(|f| (f.name, self.header_for(f.name)))
            .collect()
    }

    /// Check the mapping can drive a preview of a file with `headers`.
    ///
    /// Every required field must be mapped, every mapped header must exist,
    /// and no header may feed two fields.
    pub fn validate(&self, kind: ImportKind, headers: &[String]) -> Result<(), MappingError> {
        let mut used: BTreeMap<&str, &str> = BTreeMap::new();
        for spec in field_specs(kind) {
            match self.header_for(spec.name) {
                None if spec.required => {
                    return Err(MappingError::Unmapped {
                        field: spec.name.to_string(),
                    });
                }
                None => {}
                Some(header) => {
                    if !headers.iter().any(|h| h == header) {
                        return Err(MappingError::UnknownHeader {
                            field: spec.name.to_string(),
                            header: header.to_string(),
                        });
                    }
                    if let Some(first) = used.insert(header, spec.name) {
                        return Err(MappingError::HeaderReused {
                            header: header.to_string(),
                            first: first.to_string(),
                            second: spec.name.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

/// Propose a mapping for `headers`.
///
/// The exact pass matches normalized headers against each field's name and
/// synonyms; the pattern pass then tries each field's regular expressions
/// against the headers still unclaimed. Fields are visited in rule-table
/// order and take the first header that fits. Availability columns are never
/// candidates.
pub fn auto_map(kind: ImportKind, headers: &[String]) -> ColumnMapping {
    let mut mapping = ColumnMapping::empty(kind);
    let candidates: Vec<(&str, String)> = headers
        .iter()
        .filter(|h| !h.is_empty())
        .filter(|h| parse_availability_header(h).is_none())
        .map(|h| (h.as_str(), normalize_header(h)))
        .collect();
    let mut claimed: HashSet<&str> = HashSet::new();
    let specs = field_specs(kind);

    for spec in specs {
        let canonical = normalize_header(spec.name);
        let hit = candidates.iter().find(|(header, norm)| {
            !claimed.contains(header)
                && (*norm == canonical || spec.synonyms.iter().any(|s| norm.as_str() == *s))
        });
        if let Some((header, _)) = hit {
            log::debug!("Mapped '{header}' to {} (exact)", spec.name);
            claimed.insert(*header);
            mapping
                .entries
                .insert(spec.name.to_string(), Some(header.to_string()));
        }
    }

    for spec in specs {
        if mapping.is_mapped(spec.name) {
            continue;
        }
        'patterns: for pattern in spec.patterns {
            let re = match RegexBuilder::new(pattern).case_insensitive(true).build() {
                Ok(re) => re,
                Err(e) => {
                    log::warn!("Skipping bad header pattern '{pattern}': {e}");
                    continue;
                }
            };
            for (header, _) in &candidates {
                if !claimed.contains(header) && re.is_match(header) {
                    log::debug!("Mapped '{header}' to {} (pattern '{pattern}')", spec.name);
                    claimed.insert(*header);
                    mapping
                        .entries
                        .insert(spec.name.to_string(), Some(header.to_string()));
                    break 'patterns;
                }
            }
        }
    }

    mapping
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_exact_match_beats_pattern() {
        let h = headers(&["Team Name", "League", "Notes"]);
        let m = auto_map(ImportKind::Team, &h);
        assert_eq!(m.header_for("name"), Some("Team Name"));
        assert_eq!(m.header_for("division"), Some("League"));
        assert_eq!(m.header_for("description"), Some("Notes"));
        assert_eq!(m.header_for("ranking"), None);
    }

    #[test]
    fn test_game_headers_with_scores() {
        let h = headers(&["Date", "Home", "Away", "Home Score", "Away Score"]);
        let m = auto_map(ImportKind::PreviousGame, &h);
        assert_eq!(m.header_for("date"), Some("Date"));
        assert_eq!(m.header_for("team_1"), Some("Home"));
        assert_eq!(m.header_for("team_2"), Some("Away"));
        assert_eq!(m.header_for("team_1_score"), Some("Home Score"));
        assert_eq!(m.header_for("team_2_score"), Some("Away Score"));
    }

    #[test]
    fn test_underscored_headers() {
        let h = headers(&["team_1", "TEAM_2", "game-date", "team_1_score"]);
        let m = auto_map(ImportKind::PreviousGame, &h);
        assert_eq!(m.header_for("team_1"), Some("team_1"));
        assert_eq!(m.header_for("team_2"), Some("TEAM_2"));
        assert_eq!(m.header_for("date"), Some("game-date"));
        assert_eq!(m.header_for("team_1_score"), Some("team_1_score"));
    }

    #[test]
    fn test_pattern_pass_claims_each_header_once() {
        let h = headers(&["Venue Name", "Venue Notes"]);
        let m = auto_map(ImportKind::Location, &h);
        assert_eq!(m.header_for("description"), Some("Venue Notes"));
        assert_eq!(m.header_for("name"), Some("Venue Name"));
    }

    #[test]
    fn test_availability_columns_are_not_mapped() {
        let h = headers(&[
            "Availability [Monday January 6, 2025 - 7:00 PM]",
            "Team",
        ]);
        let m = auto_map(ImportKind::TeamAvailability, &h);
        assert_eq!(m.header_for("team"), Some("Team"));
        assert_eq!(m.header_for("division"), None);
    }

    #[test]
    fn test_validate() {
        let h = headers(&["Location", "Date", "Time"]);
        let mut m = auto_map(ImportKind::LocationAvailability, &h);
        assert_eq!(m.validate(ImportKind::LocationAvailability, &h), Ok(()));

        m.unset(ImportKind::LocationAvailability, "modifier").unwrap();
        assert_eq!(
            m.validate(ImportKind::LocationAvailability, &h),
            Err(MappingError::Unmapped {
                field: "modifier".to_string()
            })
        );

        m.set(ImportKind::LocationAvailability, "modifier", "Slot").unwrap();
        assert!(matches!(
            m.validate(ImportKind::LocationAvailability, &h),
            Err(MappingError::UnknownHeader { .. })
        ));

        m.set(ImportKind::LocationAvailability, "modifier", "Date").unwrap();
        assert!(matches!(
            m.validate(ImportKind::LocationAvailability, &h),
            Err(MappingError::HeaderReused { .. })
        ));
    }

    #[test]
    fn test_set_rejects_unknown_field() {
        let mut m = ColumnMapping::empty(ImportKind::Location);
        assert!(matches!(
            m.set(ImportKind::Location, "ranking", "Rank"),
            Err(MappingError::UnknownField { .. })
        ));
    }
}
