use chrono::NaiveDate;
use league_core::types::*;
use league_db::*;

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

#[test]
fn division_lookup_is_case_insensitive() {
    let conn = open_memory().unwrap();
    let id = insert_division(&conn, "U12 Boys").unwrap();

    let found = find_division_by_name(&conn, "u12 boys").unwrap();
    assert_eq!(found.map(|d| d.id), Some(id));
    assert!(find_division_by_name(&conn, "U14").unwrap().is_none());
}

#[test]
fn duplicate_division_name_is_rejected() {
    let conn = open_memory().unwrap();
    insert_division(&conn, "Open").unwrap();
    assert!(insert_division(&conn, "OPEN").is_err());
}

#[test]
fn location_crud() {
    let conn = open_memory().unwrap();
    let id = insert_location(&conn, "Court A", "Main court").unwrap();

    update_location_description(&conn, id, "Renovated").unwrap();
    let loc = find_location_by_name(&conn, "court a").unwrap().unwrap();
    assert_eq!(loc.description, "Renovated");

    delete_location(&conn, id).unwrap();
    assert!(find_location_by_name(&conn, "Court A").unwrap().is_none());
    assert!(matches!(
        delete_location(&conn, id),
        Err(OperationError::NotFound { .. })
    ));
}

#[test]
fn team_patch_leaves_unset_fields() {
    let conn = open_memory().unwrap();
    let loc = insert_location(&conn, "Field 1", "").unwrap();
    let team_id = seed_team(&conn, "Open", "Hawks");

    update_team(
        &conn,
        team_id,
        &TeamPatch {
            previous_year_ranking: Some(3),
            preferred_location_id: Some(loc),
            ..Default::default()
        },
    )
    .unwrap();
    update_team(
        &conn,
        team_id,
        &TeamPatch {
            description: Some("Returning champions".to_string()),
            ..Default::default()
        },
    )
    .unwrap();

    let teams = find_teams_by_name(&conn, "hawks").unwrap();
    assert_eq!(teams.len(), 1);
    assert_eq!(teams[0].description, "Returning champions");
    assert_eq!(teams[0].previous_year_ranking, Some(3));
    assert_eq!(teams[0].preferred_location_id, Some(loc));
}

#[test]
fn same_team_name_in_two_divisions() {
    let conn = open_memory().unwrap();
    seed_team(&conn, "U10", "Tigers");
    seed_team(&conn, "U12", "Tigers");

    assert_eq!(find_teams_by_name(&conn, "Tigers").unwrap().len(), 2);
    let u12 = find_division_by_name(&conn, "U12").unwrap().unwrap();
    let team = find_team(&conn, u12.id, "tigers").unwrap().unwrap();
    assert_eq!(team.division_id, u12.id);
}

#[test]
fn find_or_insert_timeslot_reuses_existing() {
    let conn = open_memory().unwrap();
    let (first, created) = find_or_insert_timeslot(&conn, date(2025, 1, 6), "7:00 PM").unwrap();
    assert!(created);
    let (second, created) = find_or_insert_timeslot(&conn, date(2025, 1, 6), "7:00 PM").unwrap();
    assert!(!created);
    assert_eq!(first, second);

    find_or_insert_timeslot(&conn, date(2025, 1, 6), "8:00 PM").unwrap();
    find_or_insert_timeslot(&conn, date(2025, 1, 7), "7:00 PM").unwrap();
    assert_eq!(timeslots_on(&conn, date(2025, 1, 6)).unwrap().len(), 2);
}

#[test]
fn location_availability_rejects_duplicates() {
    let conn = open_memory().unwrap();
    let loc = insert_location(&conn, "Court A", "").unwrap();
    let (slot, _) = find_or_insert_timeslot(&conn, date(2025, 1, 6), "7:00 PM").unwrap();

    insert_location_availability(&conn, loc, slot).unwrap();
    assert!(insert_location_availability(&conn, loc, slot).is_err());
}

#[test]
fn team_availability_insert_and_delete() {
    let conn = open_memory().unwrap();
    let team = seed_team(&conn, "Open", "Hawks");
    let (slot, _) = find_or_insert_timeslot(&conn, date(2025, 1, 6), "7:00 PM").unwrap();

    assert!(insert_team_availability(&conn, team, slot).unwrap());
    assert!(!insert_team_availability(&conn, team, slot).unwrap());
    assert!(delete_team_availability(&conn, team, slot).unwrap());
    assert!(!delete_team_availability(&conn, team, slot).unwrap());
}

#[test]
fn game_lookup_is_symmetric() {
    let conn = open_memory().unwrap();
    let a = seed_team(&conn, "Open", "Hawks");
    let b = seed_team(&conn, "Open", "Owls");
    let id = insert_previous_game(&conn, date(2025, 1, 15), a, b, Some(3), None).unwrap();

    let found = find_game_between(&conn, date(2025, 1, 15), b, a).unwrap().unwrap();
    assert_eq!(found.id, id);
    assert!(find_game_between(&conn, date(2025, 1, 16), a, b).unwrap().is_none());

    update_game_scores(&conn, id, None, Some(1)).unwrap();
    let found = find_game_between(&conn, date(2025, 1, 15), a, b).unwrap().unwrap();
    assert_eq!(found.team_1_score, Some(3));
    assert_eq!(found.team_2_score, Some(1));
}

#[test]
fn game_against_itself_is_rejected() {
    let conn = open_memory().unwrap();
    let a = seed_team(&conn, "Open", "Hawks");
    assert!(insert_previous_game(&conn, date(2025, 1, 15), a, a, None, None).is_err());
}

#[test]
fn import_log_and_audit_round_trip() {
    let conn = open_memory().unwrap();
    insert_import_log(
        &conn,
        &ImportLog {
            id: 0,
            kind: "location".to_string(),
            source_name: "courts.csv".to_string(),
            operator: "alex".to_string(),
            imported_at: "2025-01-01T00:00:00Z".to_string(),
            records_created: 2,
            records_updated: 1,
            records_unchanged: 0,
            records_failed: 0,
        },
    )
    .unwrap();
    insert_audit_entry(
        &conn,
        &AuditEntry {
            session_id: "s1".to_string(),
            operator: "alex".to_string(),
            entity_type: "location".to_string(),
            entity_key: "Court A".to_string(),
            action: "create".to_string(),
            source_line: 2,
        },
    )
    .unwrap();

    let logs = list_import_logs(&conn, None).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].records_created, 2);

    let audit = audit_entries_for_session(&conn, "s1").unwrap();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].entity_key, "Court A");
}

#[test]
fn session_rows_are_scoped_by_owner() {
    let conn = open_memory().unwrap();
    let row = SessionRow {
        id: "abc".to_string(),
        owner: "alex".to_string(),
        kind: "team".to_string(),
        stage: "uploaded".to_string(),
        payload: "{}".to_string(),
        created_at: "2025-01-01T00:00:00+00:00".to_string(),
        updated_at: String::new(),
    };
    save_session_row(&conn, &row).unwrap();
    save_session_row(
        &conn,
        &SessionRow {
            stage: "mapped".to_string(),
            ..row.clone()
        },
    )
    .unwrap();

    let loaded = load_session_row(&conn, "abc").unwrap().unwrap();
    assert_eq!(loaded.stage, "mapped");
    assert_eq!(list_session_rows(&conn, "alex").unwrap().len(), 1);
    assert!(list_session_rows(&conn, "sam").unwrap().is_empty());
    assert_eq!(
        list_session_rows_before(&conn, "2025-06-01T00:00:00+00:00")
            .unwrap()
            .len(),
        1
    );

    assert!(delete_session_row(&conn, "abc").unwrap());
    assert!(load_session_row(&conn, "abc").unwrap().is_none());
}
