use std::collections::HashMap;

use crate::model::{Situation, TeamRecord};
use crate::situations::{SituationSplit, set_piece_xg_share};
use crate::stats::{Regression, linear_regression, pearson, safe_div};

/// Per-team situational breakdown gathered by the league-wide fan-out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamDetail {
    pub situations: Vec<SituationSplit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TeamMetric {
    PointsPerMatch,
    GoalsPerMatch,
    XgPerMatch,
    XgaPerMatch,
    NpxgPerMatch,
    Ppda,
    Oppda,
    DeepPerMatch,
    XptsDelta,
    SetPieceXgShare,
    OpenPlayXgPerMatch,
}

impl TeamMetric {
    pub const ALL: [TeamMetric; 11] = [
        TeamMetric::PointsPerMatch,
        TeamMetric::GoalsPerMatch,
        TeamMetric::XgPerMatch,
        TeamMetric::XgaPerMatch,
        TeamMetric::NpxgPerMatch,
        TeamMetric::Ppda,
        TeamMetric::Oppda,
        TeamMetric::DeepPerMatch,
        TeamMetric::XptsDelta,
        TeamMetric::SetPieceXgShare,
        TeamMetric::OpenPlayXgPerMatch,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TeamMetric::PointsPerMatch => "Pts/match",
            TeamMetric::GoalsPerMatch => "Goals/match",
            TeamMetric::XgPerMatch => "xG/match",
            TeamMetric::XgaPerMatch => "xGA/match",
            TeamMetric::NpxgPerMatch => "npxG/match",
            TeamMetric::Ppda => "PPDA",
            TeamMetric::Oppda => "OPPDA",
            TeamMetric::DeepPerMatch => "Deep/match",
            TeamMetric::XptsDelta => "Pts - xPts",
            TeamMetric::SetPieceXgShare => "Set-piece xG %",
            TeamMetric::OpenPlayXgPerMatch => "Open-play xG/match",
        }
    }

    /// Needs the situation fan-out rather than the standings row alone.
    pub fn needs_detail(self) -> bool {
        matches!(
            self,
            TeamMetric::SetPieceXgShare | TeamMetric::OpenPlayXgPerMatch
        )
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

pub fn team_metric(record: &TeamRecord, detail: Option<&TeamDetail>, metric: TeamMetric) -> Option<f64> {
    let games = record.matches as f64;
    let value = match metric {
        TeamMetric::PointsPerMatch => record.points_per_match(),
        TeamMetric::GoalsPerMatch => record.goals_per_match(),
        TeamMetric::XgPerMatch => safe_div(record.xg, games),
        TeamMetric::XgaPerMatch => safe_div(record.xga, games),
        TeamMetric::NpxgPerMatch => safe_div(record.npxg, games),
        TeamMetric::Ppda => record.ppda,
        TeamMetric::Oppda => record.oppda,
        TeamMetric::DeepPerMatch => safe_div(record.deep, games),
        TeamMetric::XptsDelta => record.points as f64 - record.xpts,
        TeamMetric::SetPieceXgShare => set_piece_xg_share(&detail?.situations) * 100.0,
        TeamMetric::OpenPlayXgPerMatch => {
            let open_play = detail?
                .situations
                .iter()
                .find(|s| s.situation == Situation::OpenPlay)
                .map(|s| s.for_side.xg)
                .unwrap_or(0.0);
            safe_div(open_play, games)
        }
    };
    Some(value)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub team: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scatter {
    pub x_metric: TeamMetric,
    pub y_metric: TeamMetric,
    pub points: Vec<ScatterPoint>,
    pub correlation: f64,
    pub trend: Regression,
}

impl Scatter {
    pub fn x_bounds(&self) -> (f64, f64) {
        bounds(self.points.iter().map(|p| p.x))
    }

    pub fn y_bounds(&self) -> (f64, f64) {
        bounds(self.points.iter().map(|p| p.y))
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if (hi - lo).abs() < f64::EPSILON {
        return (lo - 0.5, hi + 0.5);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

/// One point per team that has both metrics; teams missing detail data are left out.
pub fn build_scatter(
    teams: &[TeamRecord],
    details: &HashMap<String, TeamDetail>,
    x_metric: TeamMetric,
    y_metric: TeamMetric,
) -> Scatter {
    let points: Vec<ScatterPoint> = teams
        .iter()
        .filter_map(|team| {
            let detail = details.get(&team.name);
            Some(ScatterPoint {
                team: team.name.clone(),
                x: team_metric(team, detail, x_metric)?,
                y: team_metric(team, detail, y_metric)?,
            })
        })
        .collect();

    let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
    let pairs: Vec<(f64, f64)> = points.iter().map(|p| (p.x, p.y)).collect();

    Scatter {
        x_metric,
        y_metric,
        correlation: pearson(&xs, &ys),
        trend: linear_regression(&pairs),
        points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::situations::SideTotals;

    fn team(name: &str, matches: u32, points: u32, xg: f64) -> TeamRecord {
        TeamRecord {
            name: name.to_string(),
            matches,
            points,
            xg,
            ..TeamRecord::default()
        }
    }

    #[test]
    fn scatter_on_linear_data() {
        let teams = vec![
            team("A", 10, 10, 10.0),
            team("B", 10, 20, 20.0),
            team("C", 10, 30, 30.0),
            team("D", 10, 5, 5.0),
        ];
        let scatter = build_scatter(
            &teams,
            &HashMap::new(),
            TeamMetric::XgPerMatch,
            TeamMetric::PointsPerMatch,
        );
        assert_eq!(scatter.points.len(), 4);
        assert!((scatter.correlation - 1.0).abs() < 1e-9);
        assert!((scatter.trend.slope - 1.0).abs() < 1e-9);
        assert!(scatter.trend.intercept.abs() < 1e-9);
    }

    #[test]
    fn detail_metrics_skip_teams_without_detail() {
        let teams = vec![team("A", 2, 4, 3.0), team("B", 2, 1, 1.0)];
        let mut details = HashMap::new();
        details.insert(
            "A".to_string(),
            TeamDetail {
                situations: vec![SituationSplit {
                    situation: Situation::OpenPlay,
                    for_side: SideTotals {
                        shots: 20.0,
                        goals: 3.0,
                        xg: 2.4,
                    },
                    against: SideTotals::default(),
                }],
            },
        );
        let scatter = build_scatter(
            &teams,
            &details,
            TeamMetric::OpenPlayXgPerMatch,
            TeamMetric::PointsPerMatch,
        );
        assert_eq!(scatter.points.len(), 1);
        assert!((scatter.points[0].x - 1.2).abs() < 1e-9);
        assert_eq!(scatter.correlation, 0.0);
    }

    #[test]
    fn zero_matches_do_not_divide_by_zero() {
        let fresh = team("Sunderland", 0, 0, 0.0);
        assert_eq!(
            team_metric(&fresh, None, TeamMetric::XgPerMatch),
            Some(0.0)
        );
        assert_eq!(team_metric(&fresh, None, TeamMetric::SetPieceXgShare), None);
    }
}
