use chrono::NaiveDate;
use league_core::types::NewTeam;
use league_db::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Two teams, one location, slots on three dates, some availability and a game.
fn seeded() -> Connection {
    let conn = open_memory().unwrap();
    let div = insert_division(&conn, "Open").unwrap();
    let mut team_ids = Vec::new();
    for name in ["Hawks", "Owls"] {
        team_ids.push(
            insert_team(
                &conn,
                &NewTeam {
                    division_id: div,
                    name: name.to_string(),
                    description: String::new(),
                    previous_year_ranking: None,
                    preferred_location_id: None,
                },
            )
            .unwrap(),
        );
    }
    let loc = insert_location(&conn, "Court A", "Main court").unwrap();
    for day in [5, 12, 19] {
        let (slot, _) = find_or_insert_timeslot(&conn, date(2025, 1, day), "7:00 PM").unwrap();
        insert_location_availability(&conn, loc, slot).unwrap();
        insert_team_availability(&conn, team_ids[0], slot).unwrap();
    }
    insert_previous_game(&conn, date(2024, 11, 2), team_ids[0], team_ids[1], Some(2), Some(1))
        .unwrap();
    conn
}

#[test]
fn listings_return_everything() {
    let conn = seeded();
    assert_eq!(list_divisions(&conn).unwrap().len(), 1);
    assert_eq!(list_teams(&conn).unwrap().len(), 2);
    assert_eq!(list_locations(&conn).unwrap().len(), 1);
    assert_eq!(list_timeslots(&conn, None).unwrap().len(), 3);
    assert_eq!(list_location_availability(&conn, None).unwrap().len(), 3);
    assert_eq!(list_team_availability(&conn, None).unwrap().len(), 3);
    assert_eq!(list_previous_games(&conn).unwrap().len(), 1);
}

#[test]
fn timeslot_range_is_inclusive() {
    let conn = seeded();
    let slots = list_timeslots(&conn, Some((date(2025, 1, 5), date(2025, 1, 12)))).unwrap();
    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0].date, date(2025, 1, 5));
}

#[test]
fn schedule_dataset_filters_slots_by_range() {
    let conn = seeded();
    let dataset = schedule_dataset(&conn, date(2025, 1, 10), date(2025, 1, 31)).unwrap();
    assert_eq!(dataset.timeslots.len(), 2);
    assert_eq!(dataset.location_availability.len(), 2);
    assert_eq!(dataset.team_availability.len(), 2);
    // History and rosters are never filtered.
    assert_eq!(dataset.previous_games.len(), 1);
    assert_eq!(dataset.teams.len(), 2);

    let json = serde_json::to_value(&dataset).unwrap();
    assert_eq!(json["start_date"], "2025-01-10");
    assert_eq!(json["timeslots"][0]["modifier"], "7:00 PM");
}

#[test]
fn stats_count_rows() {
    let conn = seeded();
    let stats = league_stats(&conn).unwrap();
    assert_eq!(stats.teams, 2);
    assert_eq!(stats.timeslots, 3);
    assert_eq!(stats.previous_games, 1);
    assert_eq!(stats.open_sessions, 0);
}

#[test]
fn deleting_location_cascades_availability() {
    let conn = seeded();
    let loc = find_location_by_name(&conn, "Court A").unwrap().unwrap();
    delete_location(&conn, loc.id).unwrap();
    assert!(list_location_availability(&conn, None).unwrap().is_empty());
}
