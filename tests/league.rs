use std::fs;
use std::path::PathBuf;

use epl_terminal::model::TeamRecord;
use epl_terminal::schema::{parse_fixtures_json, parse_standings_json};
use epl_terminal::standings::{Outcome, form_guide, rank_standings, weekly_positions};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn goals_scored_breaks_a_points_and_difference_tie() {
    let records = vec![
        TeamRecord {
            name: "A".to_string(),
            points: 10,
            goals_for: 5,
            goals_against: 2,
            ..TeamRecord::default()
        },
        TeamRecord {
            name: "B".to_string(),
            points: 10,
            goals_for: 7,
            goals_against: 4,
            ..TeamRecord::default()
        },
    ];
    let table = rank_standings(&records);
    assert_eq!(table[0].record.name, "B");
    assert_eq!(table[0].rank, 1);
    assert_eq!(table[1].record.name, "A");
    assert_eq!(table[1].rank, 2);
}

#[test]
fn fixture_table_ranks_end_to_end() {
    let parsed = parse_standings_json(&read_fixture("standings.json")).expect("parse");
    let table = rank_standings(&parsed.rows);
    let order: Vec<&str> = table.iter().map(|t| t.record.name.as_str()).collect();
    assert_eq!(order, vec!["Liverpool", "Arsenal", "Everton", "Chelsea"]);
    let ranks: Vec<u32> = table.iter().map(|t| t.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3, 4]);
}

#[test]
fn weekly_positions_replay_results_in_kickoff_order() {
    let parsed = parse_fixtures_json(&read_fixture("recents.json")).expect("parse");
    let series = weekly_positions(&parsed.rows);
    let by_team: Vec<(&str, Vec<u32>)> = series
        .iter()
        .map(|s| (s.team.as_str(), s.positions.clone()))
        .collect();
    assert_eq!(
        by_team,
        vec![
            ("Arsenal", vec![1, 1]),
            ("Chelsea", vec![2, 4]),
            ("Everton", vec![4, 2]),
            ("Liverpool", vec![3, 3]),
        ]
    );
}

#[test]
fn form_guide_lists_oldest_first() {
    let parsed = parse_fixtures_json(&read_fixture("recents.json")).expect("parse");
    let form = form_guide("Liverpool", &parsed.rows, 5);
    let letters: String = form.iter().map(|f| f.outcome.letter()).collect();
    assert_eq!(letters, "DL");
    assert_eq!(form[1].opponent, "Everton");
    assert!(!form[1].home);

    let last_one = form_guide("Arsenal", &parsed.rows, 1);
    assert_eq!(last_one.len(), 1);
    assert_eq!(last_one[0].outcome, Outcome::Win);
    assert_eq!(last_one[0].fixture_id, "22003");
}

#[test]
fn unfinished_fixtures_do_not_move_the_table() {
    let parsed = parse_fixtures_json(&read_fixture("upcoming.json")).expect("parse");
    assert!(weekly_positions(&parsed.rows).is_empty());
    assert!(form_guide("Arsenal", &parsed.rows, 5).is_empty());
}
