use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use epl_terminal::compare::{TeamDetail, TeamMetric, build_scatter, team_metric};
use epl_terminal::heatmap::{DEFAULT_COLS, DEFAULT_ROWS, HalfConvention, HeatmapGrid, INTENSITY_CEILING};
use epl_terminal::model::Situation;
use epl_terminal::schema::{
    parse_formations_json, parse_shots_json, parse_situations_json, parse_standings_json,
};
use epl_terminal::situations::{
    SplitMetric, merge_formations, merge_situations, mirrored_series, set_piece_xg_share,
};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn arsenal_detail() -> TeamDetail {
    let created = parse_situations_json(&read_fixture("chances_created.json")).expect("parse");
    let conceded = parse_situations_json(&read_fixture("chances_conceded.json")).expect("parse");
    TeamDetail {
        situations: merge_situations(&created.rows, &conceded.rows),
    }
}

#[test]
fn situations_merge_in_canonical_order() {
    let detail = arsenal_detail();
    let order: Vec<&Situation> = detail.situations.iter().map(|s| &s.situation).collect();
    assert_eq!(
        order,
        vec![
            &Situation::OpenPlay,
            &Situation::FromCorner,
            &Situation::SetPiece,
            &Situation::Penalty
        ]
    );

    let set_piece = &detail.situations[2];
    assert_eq!(set_piece.for_side.shots, 0.0);
    assert_eq!(set_piece.against.shots, 10.0);
}

#[test]
fn mirrored_bars_put_conceded_below_the_axis() {
    let detail = arsenal_detail();
    let bars = mirrored_series(&detail.situations, SplitMetric::Xg);
    assert_eq!(bars[0].label, "Open play");
    assert!((bars[0].for_value - 11.2).abs() < 1e-9);
    assert!((bars[0].against_value + 6.1).abs() < 1e-9);
    assert!(bars.iter().all(|b| b.for_value >= 0.0 && b.against_value <= 0.0));

    let shots = mirrored_series(&detail.situations, SplitMetric::Shots);
    assert_eq!(shots[1].for_value, 20.0);
    assert!((shots[0].for_xg_per_shot - 11.2 / 120.0).abs() < 1e-9);
}

#[test]
fn set_piece_share_counts_corners_and_free_kicks() {
    let detail = arsenal_detail();
    let share = set_piece_xg_share(&detail.situations);
    assert!((share - 1.8 / 14.52).abs() < 1e-9);
}

#[test]
fn formations_merge_created_and_conceded() {
    let created = parse_formations_json(&read_fixture("formations.json")).expect("parse");
    let conceded = parse_formations_json(&read_fixture("formations_conceded.json")).expect("parse");
    let merged = merge_formations(&created.rows, &conceded.rows);
    let names: Vec<&str> = merged.iter().map(|f| f.formation.as_str()).collect();
    assert_eq!(names, vec!["4-3-3", "4-2-3-1", "3-4-3"]);
    assert_eq!(merged[0].for_side.goals, 6.0);
    assert!((merged[0].against.xg - 2.4).abs() < 1e-9);
    assert_eq!(merged[2].for_side.shots, 0.0);
}

#[test]
fn fixture_shots_fold_into_one_half() {
    let shots = parse_shots_json(&read_fixture("shots.json")).expect("parse");
    let grid = HeatmapGrid::bin(&shots.rows, DEFAULT_COLS, DEFAULT_ROWS, HalfConvention::Attacked);

    assert!((grid.value(4, 8) - 0.45).abs() < 1e-9);
    assert!((grid.value(7, 9) - 0.1).abs() < 1e-9);
    assert!((grid.value(9, 6) - 0.2).abs() < 1e-9);
    assert_eq!(grid.intensity(4, 8), INTENSITY_CEILING);
    assert!((grid.intensity(9, 6) - 0.2 / 0.45).abs() < 1e-9);

    let total: f64 = (0..grid.rows)
        .flat_map(|r| (0..grid.cols).map(move |c| (c, r)))
        .map(|(c, r)| grid.value(c, r))
        .sum();
    assert!((total - 0.75).abs() < 1e-9);
}

#[test]
fn empty_shot_list_gives_an_empty_grid() {
    let grid = HeatmapGrid::bin(&[], DEFAULT_COLS, DEFAULT_ROWS, HalfConvention::Defended);
    assert!(grid.is_empty());
    assert_eq!(grid.intensity(0, 0), 0.0);
}

#[test]
fn scatter_of_standings_metrics_correlates() {
    let parsed = parse_standings_json(&read_fixture("standings.json")).expect("parse");
    let scatter = build_scatter(
        &parsed.rows,
        &HashMap::new(),
        TeamMetric::XgPerMatch,
        TeamMetric::PointsPerMatch,
    );
    assert_eq!(scatter.points.len(), 4);
    assert!(scatter.correlation > 0.9);
    assert!(scatter.trend.slope > 0.0);
    let (lo, hi) = scatter.x_bounds();
    assert!(lo < 0.0 && hi > 2.0125);
}

#[test]
fn detail_metrics_skip_teams_without_detail() {
    let parsed = parse_standings_json(&read_fixture("standings.json")).expect("parse");
    let mut details = HashMap::new();
    details.insert("Arsenal".to_string(), arsenal_detail());

    let scatter = build_scatter(
        &parsed.rows,
        &details,
        TeamMetric::SetPieceXgShare,
        TeamMetric::PointsPerMatch,
    );
    assert_eq!(scatter.points.len(), 1);
    assert_eq!(scatter.points[0].team, "Arsenal");
    assert_eq!(scatter.correlation, 0.0);

    let arsenal = &parsed.rows[0];
    let open_play = team_metric(arsenal, details.get("Arsenal"), TeamMetric::OpenPlayXgPerMatch)
        .expect("detail present");
    assert!((open_play - 11.2 / 4.0).abs() < 1e-9);
    assert_eq!(team_metric(arsenal, None, TeamMetric::SetPieceXgShare), None);
}
