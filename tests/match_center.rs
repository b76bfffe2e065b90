use std::fs;
use std::path::PathBuf;

use epl_terminal::match_center::{MatchCenter, roster_by_side, stat_lines};
use epl_terminal::model::TeamSide;
use epl_terminal::schema::{parse_match_info_json, parse_roster_json, parse_shots_json};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn center(with_info: bool) -> MatchCenter {
    let info = if with_info {
        parse_match_info_json(&read_fixture("match_info.json")).expect("parse")
    } else {
        None
    };
    let shots = parse_shots_json(&read_fixture("shots.json")).expect("parse");
    let roster = parse_roster_json(&read_fixture("roster.json")).expect("parse");
    MatchCenter::build(info, shots.rows, roster.rows)
}

#[test]
fn own_goal_counts_for_the_other_side() {
    let center = center(false);
    assert_eq!(center.goals.len(), 2);
    let og = &center.goals[1];
    assert!(og.own_goal);
    assert_eq!(og.side, TeamSide::Home);
    assert_eq!(og.scorer, "James Tarkowski");
    assert_eq!(center.score(), (2, 0));
    assert_eq!(center.team(TeamSide::Away), "Everton");
}

#[test]
fn timeline_accumulates_xg_by_minute() {
    let center = center(true);
    let minutes: Vec<u32> = center.timeline.iter().map(|p| p.minute).collect();
    assert_eq!(minutes, vec![0, 12, 30, 70]);
    let last = center.timeline.last().expect("points");
    assert!((last.home - 0.65).abs() < 1e-9);
    assert!((last.away - 0.1).abs() < 1e-9);
    assert!(
        center
            .timeline
            .windows(2)
            .all(|w| w[1].home >= w[0].home && w[1].away >= w[0].away)
    );
}

#[test]
fn info_row_drives_score_and_stat_lines() {
    let center = center(true);
    assert_eq!(center.score(), (2, 0));
    assert_eq!(center.team(TeamSide::Home), "Arsenal");

    let info = center.info.as_ref().expect("info present");
    let lines = stat_lines(info);
    assert_eq!(lines[0].name, "Goals");
    assert_eq!((lines[0].home.as_str(), lines[0].away.as_str()), ("2", "0"));
    let xg = lines.iter().find(|l| l.name == "xG").expect("xG line");
    assert_eq!(xg.home, "0.65");
    assert_eq!(xg.away, "0.10");
}

#[test]
fn rosters_split_by_side_in_position_order() {
    let center = center(true);
    let (home, away) = roster_by_side(&center.roster);
    let home_names: Vec<&str> = home.iter().map(|p| p.player.as_str()).collect();
    assert_eq!(home_names, vec!["David Raya", "Bukayo Saka"]);
    assert_eq!(away.len(), 1);
    assert_eq!(away[0].player, "James Tarkowski");
}
