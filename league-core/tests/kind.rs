use league_core::*;

#[test]
fn import_kind_round_trips_through_str() {
    for kind in ImportKind::ALL {
        let parsed: ImportKind = kind.as_str().parse().unwrap();
        assert_eq!(parsed, kind);
    }
}

#[test]
fn import_kind_accepts_aliases() {
    assert_eq!("Teams".parse::<ImportKind>().unwrap(), ImportKind::Team);
    assert_eq!(
        "previous_games".parse::<ImportKind>().unwrap(),
        ImportKind::PreviousGame
    );
    assert_eq!(
        "availability".parse::<ImportKind>().unwrap(),
        ImportKind::TeamAvailability
    );
}

#[test]
fn unknown_import_kind_lists_choices() {
    let err = "players".parse::<ImportKind>().unwrap_err();
    assert_eq!(err.value, "players");
    assert!(err.to_string().contains("team-availability"));
}

#[test]
fn import_kind_serializes_kebab_case() {
    let json = serde_json::to_string(&ImportKind::LocationAvailability).unwrap();
    assert_eq!(json, "\"location-availability\"");
}

#[test]
fn delimiter_from_name_or_char() {
    assert_eq!(",".parse::<Delimiter>().unwrap(), Delimiter::Comma);
    assert_eq!("\t".parse::<Delimiter>().unwrap(), Delimiter::Tab);
    assert_eq!("Semicolon".parse::<Delimiter>().unwrap(), Delimiter::Semicolon);
    assert_eq!("pipe".parse::<Delimiter>().unwrap(), Delimiter::Pipe);
    assert!("colon".parse::<Delimiter>().is_err());
    assert_eq!(Delimiter::Pipe.as_byte(), b'|');
}

#[test]
fn previous_game_pair_is_symmetric() {
    let game = PreviousGame {
        id: 1,
        date: chrono::NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        team_1_id: 3,
        team_2_id: 7,
        team_1_score: Some(2),
        team_2_score: None,
    };
    assert!(game.involves_pair(3, 7));
    assert!(game.involves_pair(7, 3));
    assert!(!game.involves_pair(3, 8));
}

#[test]
fn empty_team_patch() {
    assert!(TeamPatch::default().is_empty());
    let patch = TeamPatch {
        previous_year_ranking: Some(2),
        ..Default::default()
    };
    assert!(!patch.is_empty());
}
