use chrono::NaiveDate;
use league_core::{Delimiter, ImportKind, NewTeam};
use league_db::*;
use league_import::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn seed_team(conn: &Connection, division: &str, name: &str) -> i64 {
    let division_id = match find_division_by_name(conn, division).unwrap() {
        Some(d) => d.id,
        None => insert_division(conn, division).unwrap(),
    };
    insert_team(
        conn,
        &NewTeam {
            division_id,
            name: name.to_string(),
            description: String::new(),
            previous_year_ranking: None,
            preferred_location_id: None,
        },
    )
    .unwrap()
}

/// Parse, auto-map, and classify `csv` against the database.
fn preview(conn: &Connection, kind: ImportKind, csv: &str) -> Vec<PreviewRow> {
    let table = parse_table(csv, Delimiter::Comma, ParseMode::Strict).unwrap();
    let mapping = auto_map(kind, &table.headers);
    mapping.validate(kind, &table.headers).unwrap();
    let columns = detect_availability_columns(&table.headers);
    let mut state = LeagueState::load(conn).unwrap();
    build_preview(kind, &table, &mapping, &columns, &mut state)
}

fn classes(rows: &[PreviewRow]) -> Vec<Classification> {
    rows.iter().map(|r| r.classification).collect()
}

// ── Locations ───────────────────────────────────────────────────────────────

#[test]
fn repeated_location_in_one_file_is_add_then_duplicate() {
    let conn = open_memory().unwrap();
    let rows = preview(
        &conn,
        ImportKind::Location,
        "name,description\nCourt A,Main court\nCourt A,Main court\n",
    );
    assert_eq!(classes(&rows), vec![Classification::Add, Classification::Duplicate]);
    assert_eq!(rows[0].line, 2);
    assert_eq!(rows[1].line, 3);
}

#[test]
fn location_description_change_is_update() {
    let conn = open_memory().unwrap();
    insert_location(&conn, "Court A", "Old").unwrap();

    let rows = preview(
        &conn,
        ImportKind::Location,
        "Location,Notes\ncourt a,New\nCourt B,\nCourt B,Side\n",
    );
    assert_eq!(
        classes(&rows),
        vec![
            Classification::Update,
            Classification::Add,
            Classification::Update
        ]
    );
    assert_eq!(rows[0].changes, vec![FieldChange::new("description", "Old", "New")]);
    assert_eq!(rows[2].changes, vec![FieldChange::new("description", "", "Side")]);
}

#[test]
fn unmapped_description_never_clobbers() {
    let conn = open_memory().unwrap();
    insert_location(&conn, "Court A", "Main court").unwrap();
    let rows = preview(&conn, ImportKind::Location, "name\nCourt A\n");
    assert_eq!(classes(&rows), vec![Classification::Duplicate]);
}

#[test]
fn malformed_and_blank_name_rows_are_errors() {
    let conn = open_memory().unwrap();
    let rows = preview(
        &conn,
        ImportKind::Location,
        "name,description\nCourt A\n  ,Nameless\n",
    );
    assert_eq!(
        rows[0].error,
        Some(RowIssue::Malformed {
            expected: 2,
            found: 1
        })
    );
    assert_eq!(
        rows[1].error,
        Some(RowIssue::Missing {
            field: "name".to_string()
        })
    );
    assert!(rows.iter().all(|r| r.row.is_none()));
}

// ── Teams ───────────────────────────────────────────────────────────────────

#[test]
fn unknown_division_is_an_error_naming_it() {
    let conn = open_memory().unwrap();
    insert_division(&conn, "Open").unwrap();

    let rows = preview(
        &conn,
        ImportKind::Team,
        "Team,Division\nHawks,Open\nOwls,U99\n",
    );
    assert_eq!(classes(&rows), vec![Classification::Add, Classification::Error]);
    let issue = rows[1].error.clone().unwrap();
    assert_eq!(issue, RowIssue::reference("division", "U99"));
    assert!(issue.to_string().contains("U99"));

    let summary = summarize(&rows);
    assert_eq!(summary.add, 1);
    assert_eq!(summary.error, 1);
    assert_eq!(summary.update + summary.duplicate, 0);
}

#[test]
fn checks_run_presence_then_references_then_formats() {
    let conn = open_memory().unwrap();
    let rows = preview(
        &conn,
        ImportKind::Team,
        "Team,Division,Ranking\n,U99,abc\nHawks,U99,abc\n",
    );
    assert_eq!(rows[0].error.as_ref().map(|e| e.category()), Some("missing"));
    assert_eq!(rows[1].error.as_ref().map(|e| e.category()), Some("reference"));

    insert_division(&conn, "U99").unwrap();
    let rows = preview(&conn, ImportKind::Team, "Team,Division,Ranking\nHawks,U99,abc\n");
    assert!(matches!(
        rows[0].error,
        Some(RowIssue::Normalization { ref field, .. }) if field == "ranking"
    ));
}

#[test]
fn team_fields_compare_only_when_provided() {
    let conn = open_memory().unwrap();
    let hawks = seed_team(&conn, "Open", "Hawks");
    insert_location(&conn, "Field 1", "").unwrap();
    update_team(
        &conn,
        hawks,
        &league_core::TeamPatch {
            previous_year_ranking: Some(4),
            ..Default::default()
        },
    )
    .unwrap();

    let rows = preview(
        &conn,
        ImportKind::Team,
        "Team,Division,Rank,Preferred Location\nHawks,Open,,\nHawks,open,2,Field 1\nHawks,Open,2,Nowhere\n",
    );
    assert_eq!(
        classes(&rows),
        vec![
            Classification::Duplicate,
            Classification::Update,
            Classification::Error
        ]
    );
    let fields: Vec<_> = rows[1].changes.iter().map(|c| c.field.as_str()).collect();
    assert_eq!(fields, vec!["ranking", "preferred_location"]);
    assert_eq!(rows[2].error, Some(RowIssue::reference("location", "Nowhere")));
}

// ── Location Availability ───────────────────────────────────────────────────

#[test]
fn location_slots_add_then_duplicate() {
    let conn = open_memory().unwrap();
    insert_location(&conn, "Court A", "").unwrap();

    let rows = preview(
        &conn,
        ImportKind::LocationAvailability,
        "Location,Date,Time\nCourt A,01/06/2025,7pm\nCourt A,2025-01-06,7:00 PM\nCourt Z,2025-01-06,7:00 PM\nCourt A,someday,7:00 PM\n",
    );
    assert_eq!(
        classes(&rows),
        vec![
            Classification::Add,
            Classification::Duplicate,
            Classification::Error,
            Classification::Error
        ]
    );
    match &rows[0].row {
        Some(ImportRow::LocationSlot(r)) => {
            assert_eq!(r.date, date(2025, 1, 6));
            assert_eq!(r.modifier, "7:00 PM");
        }
        other => panic!("unexpected row {other:?}"),
    }
    assert_eq!(rows[0].notes.len(), 1);
    assert_eq!(rows[2].error, Some(RowIssue::reference("location", "Court Z")));
    assert_eq!(rows[3].error.as_ref().map(|e| e.category()), Some("format"));
}

// ── Team Availability ───────────────────────────────────────────────────────

#[test]
fn availability_columns_add_remove_and_note() {
    let conn = open_memory().unwrap();
    let hawks = seed_team(&conn, "Open", "Hawks");
    let mut slots = Vec::new();
    for modifier in ["7:00 PM", "7:30 PM", "8:00 PM"] {
        slots.push(find_or_insert_timeslot(&conn, date(2025, 1, 6), modifier).unwrap().0);
    }
    insert_team_availability(&conn, hawks, slots[2]).unwrap();

    let csv = "Team,\
\"Availability [Monday January 6, 2025 - 7:00 PM]\",\
\"Availability [Monday January 6, 2025 - 8:00 PM]\",\
\"Availability [Tuesday January 7, 2025 - 7:00 PM]\"\n\
Hawks,available,available,available\n\
Hawks,,Not Available,\n\
Hawks,Available,maybe,\n";
    let rows = preview(&conn, ImportKind::TeamAvailability, csv);
    assert_eq!(
        classes(&rows),
        vec![
            Classification::Add,
            Classification::Update,
            Classification::Duplicate
        ]
    );

    match &rows[0].row {
        Some(ImportRow::Availability(r)) => {
            let ids: Vec<_> = r.changes.iter().map(|c| c.timeslot_id).collect();
            assert_eq!(ids, vec![slots[0], slots[1]]);
            assert!(r.changes.iter().all(|c| c.available));
        }
        other => panic!("unexpected row {other:?}"),
    }
    assert_eq!(rows[0].notes.len(), 1);
    assert!(rows[0].notes[0].contains("2025-01-07"));
    assert_eq!(
        rows[1].changes,
        vec![FieldChange::new(
            "2025-01-06 8:00 PM",
            "available",
            "not available"
        )]
    );
}

#[test]
fn shared_team_name_needs_a_division() {
    let conn = open_memory().unwrap();
    seed_team(&conn, "U10", "Tigers");
    seed_team(&conn, "U12", "Tigers");

    let rows = preview(&conn, ImportKind::Ranking, "Team,Ranking\nTigers,1\n");
    assert_eq!(
        rows[0].error,
        Some(RowIssue::Ambiguous {
            name: "Tigers".to_string()
        })
    );

    let rows = preview(
        &conn,
        ImportKind::Ranking,
        "Team,Ranking,Division\nTigers,1,U12\n",
    );
    assert_eq!(classes(&rows), vec![Classification::Update]);
    let u12 = find_division_by_name(&conn, "U12").unwrap().unwrap();
    match &rows[0].row {
        Some(ImportRow::Ranking(r)) => {
            assert_eq!(r.division_id, u12.id);
            assert!(r.will_change);
        }
        other => panic!("unexpected row {other:?}"),
    }
}

// ── Rankings ────────────────────────────────────────────────────────────────

#[test]
fn rankings_are_never_added() {
    let conn = open_memory().unwrap();
    let hawks = seed_team(&conn, "Open", "Hawks");
    update_team(
        &conn,
        hawks,
        &league_core::TeamPatch {
            previous_year_ranking: Some(1),
            ..Default::default()
        },
    )
    .unwrap();

    let rows = preview(
        &conn,
        ImportKind::Ranking,
        "Team,Ranking\nHawks,1\nGhosts,2\nHawks,-3\n",
    );
    assert_eq!(
        classes(&rows),
        vec![
            Classification::Duplicate,
            Classification::Error,
            Classification::Error
        ]
    );
    match &rows[0].row {
        Some(ImportRow::Ranking(r)) => assert!(!r.will_change),
        other => panic!("unexpected row {other:?}"),
    }
}

// ── Previous Games ──────────────────────────────────────────────────────────

#[test]
fn game_detection_ignores_team_order() {
    let conn = open_memory().unwrap();
    let hawks = seed_team(&conn, "Open", "Hawks");
    let owls = seed_team(&conn, "Open", "Owls");
    insert_previous_game(&conn, date(2024, 11, 2), hawks, owls, Some(2), Some(1)).unwrap();

    let rows = preview(
        &conn,
        ImportKind::PreviousGame,
        "Date,Home,Away,Home Score,Away Score\n\
2024-11-02,Owls,Hawks,1,2\n\
11/02/2024,Owls,Hawks,1,3\n\
2024-11-09,Owls,Hawks,,\n\
2024-11-09,Hawks,Owls,,\n\
2024-11-16,Hawks,hawks,,\n",
    );
    assert_eq!(
        classes(&rows),
        vec![
            Classification::Duplicate,
            Classification::Update,
            Classification::Add,
            Classification::Duplicate,
            Classification::Error
        ]
    );
    // Stored order is Hawks first, so the Hawks score is team_1_score.
    assert_eq!(rows[1].changes, vec![FieldChange::new("team_1_score", "2", "3")]);
    assert!(matches!(rows[4].error, Some(RowIssue::Invalid { .. })));
}
