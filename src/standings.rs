use std::cmp::Ordering;
use std::collections::HashMap;

use crate::dates::parse_utc_naive;
use crate::model::{Fixture, TeamRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct RankedTeam {
    pub rank: u32,
    pub record: TeamRecord,
}

/// Points, then goal difference, then goals scored, all descending; name breaks what is left.
fn table_order(a: (u32, i64, u32, &str), b: (u32, i64, u32, &str)) -> Ordering {
    b.0.cmp(&a.0)
        .then_with(|| b.1.cmp(&a.1))
        .then_with(|| b.2.cmp(&a.2))
        .then_with(|| a.3.cmp(b.3))
}

fn record_key(record: &TeamRecord) -> (u32, i64, u32, &str) {
    (
        record.points,
        record.goal_difference(),
        record.goals_for,
        record.name.as_str(),
    )
}

pub fn rank_standings(records: &[TeamRecord]) -> Vec<RankedTeam> {
    let mut sorted: Vec<&TeamRecord> = records.iter().collect();
    sorted.sort_by(|a, b| table_order(record_key(a), record_key(b)));
    sorted
        .into_iter()
        .enumerate()
        .map(|(idx, record)| RankedTeam {
            rank: idx as u32 + 1,
            record: record.clone(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionSeries {
    pub team: String,
    /// League position after each round, starting at round 1.
    pub positions: Vec<u32>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Running {
    points: u32,
    goal_diff: i64,
    goals_for: u32,
}

fn finished_in_kickoff_order(results: &[Fixture]) -> Vec<&Fixture> {
    let mut finished: Vec<&Fixture> = results.iter().filter(|f| f.is_result).collect();
    finished.sort_by(|a, b| {
        parse_utc_naive(&a.kickoff)
            .cmp(&parse_utc_naive(&b.kickoff))
            .then_with(|| a.id.cmp(&b.id))
    });
    finished
}

/// Replays finished fixtures and ranks every team after each round. Rounds stop at the
/// smallest number of games any team has played so every snapshot compares like with like.
pub fn weekly_positions(results: &[Fixture]) -> Vec<PositionSeries> {
    let mut history: HashMap<&str, Vec<Running>> = HashMap::new();
    for fixture in finished_in_kickoff_order(results) {
        let (hg, ag) = (fixture.home_goals, fixture.away_goals);
        let (home_pts, away_pts) = match hg.cmp(&ag) {
            Ordering::Greater => (3, 0),
            Ordering::Less => (0, 3),
            Ordering::Equal => (1, 1),
        };
        for (team, pts, scored, conceded) in [
            (fixture.home.as_str(), home_pts, hg, ag),
            (fixture.away.as_str(), away_pts, ag, hg),
        ] {
            let games = history.entry(team).or_default();
            let prev = games.last().copied().unwrap_or_default();
            games.push(Running {
                points: prev.points + pts,
                goal_diff: prev.goal_diff + scored as i64 - conceded as i64,
                goals_for: prev.goals_for + scored,
            });
        }
    }

    let rounds = history.values().map(Vec::len).min().unwrap_or(0);
    let mut teams: Vec<&str> = history.keys().copied().collect();
    teams.sort_unstable();
    let mut series: Vec<PositionSeries> = teams
        .iter()
        .map(|team| PositionSeries {
            team: team.to_string(),
            positions: Vec::with_capacity(rounds),
        })
        .collect();

    for round in 0..rounds {
        let mut order: Vec<usize> = (0..teams.len()).collect();
        let key = |idx: usize| {
            let snap = history[teams[idx]][round];
            (snap.points, snap.goal_diff, snap.goals_for, teams[idx])
        };
        order.sort_by(|a, b| table_order(key(*a), key(*b)));
        for (pos, idx) in order.into_iter().enumerate() {
            series[idx].positions.push(pos as u32 + 1);
        }
    }
    series
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Draw,
    Loss,
}

impl Outcome {
    pub fn letter(self) -> char {
        match self {
            Outcome::Win => 'W',
            Outcome::Draw => 'D',
            Outcome::Loss => 'L',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormEntry {
    pub fixture_id: String,
    pub opponent: String,
    pub home: bool,
    pub goals_for: u32,
    pub goals_against: u32,
    pub outcome: Outcome,
}

/// Last `n` finished games for `team`, oldest first.
pub fn form_guide(team: &str, results: &[Fixture], n: usize) -> Vec<FormEntry> {
    let played: Vec<FormEntry> = finished_in_kickoff_order(results)
        .into_iter()
        .filter(|f| f.involves(team))
        .map(|f| {
            let home = f.home == team;
            let (goals_for, goals_against, opponent) = if home {
                (f.home_goals, f.away_goals, &f.away)
            } else {
                (f.away_goals, f.home_goals, &f.home)
            };
            let outcome = match goals_for.cmp(&goals_against) {
                Ordering::Greater => Outcome::Win,
                Ordering::Less => Outcome::Loss,
                Ordering::Equal => Outcome::Draw,
            };
            FormEntry {
                fixture_id: f.id.clone(),
                opponent: opponent.clone(),
                home,
                goals_for,
                goals_against,
                outcome,
            }
        })
        .collect();
    let skip = played.len().saturating_sub(n);
    played.into_iter().skip(skip).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: &str, when: &str, home: &str, away: &str, hg: u32, ag: u32) -> Fixture {
        Fixture {
            id: id.to_string(),
            home: home.to_string(),
            away: away.to_string(),
            kickoff: when.to_string(),
            venue: String::new(),
            is_result: true,
            home_goals: hg,
            away_goals: ag,
            home_xg: 0.0,
            away_xg: 0.0,
        }
    }

    #[test]
    fn name_breaks_full_ties() {
        let records = vec![
            TeamRecord {
                name: "Wolves".into(),
                points: 4,
                ..TeamRecord::default()
            },
            TeamRecord {
                name: "Brentford".into(),
                points: 4,
                ..TeamRecord::default()
            },
        ];
        let ranked = rank_standings(&records);
        assert_eq!(ranked[0].record.name, "Brentford");
        assert_eq!(ranked[1].rank, 2);
    }

    #[test]
    fn weekly_positions_follow_results() {
        let results = vec![
            result("1", "2025-08-16 14:00:00", "A", "B", 2, 0),
            result("2", "2025-08-16 14:00:00", "C", "D", 1, 1),
            result("3", "2025-08-23 14:00:00", "B", "C", 3, 0),
            result("4", "2025-08-23 14:00:00", "D", "A", 0, 0),
        ];
        let series = weekly_positions(&results);
        let by_team: HashMap<_, _> = series
            .iter()
            .map(|s| (s.team.as_str(), s.positions.clone()))
            .collect();
        // Round 1: A 3pts, C/D 1pt (C before D by name), B 0.
        assert_eq!(by_team["A"], vec![1, 1]);
        assert_eq!(by_team["C"][0], 2);
        assert_eq!(by_team["D"][0], 3);
        assert_eq!(by_team["B"][0], 4);
        // Round 2: A 4, B 3 (+1 gd), D 2, C 1.
        assert_eq!(by_team["B"][1], 2);
        assert_eq!(by_team["D"][1], 3);
        assert_eq!(by_team["C"][1], 4);
    }

    #[test]
    fn unplayed_fixtures_are_ignored() {
        let mut pending = result("9", "2025-09-01 14:00:00", "A", "B", 0, 0);
        pending.is_result = false;
        assert!(weekly_positions(&[pending.clone()]).is_empty());
        assert!(form_guide("A", &[pending], 5).is_empty());
    }

    #[test]
    fn form_guide_keeps_latest_games_oldest_first() {
        let results = vec![
            result("3", "2025-08-30 14:00:00", "C", "A", 2, 1),
            result("1", "2025-08-16 14:00:00", "A", "B", 2, 0),
            result("2", "2025-08-23 14:00:00", "A", "D", 1, 1),
        ];
        let form = form_guide("A", &results, 2);
        let letters: String = form.iter().map(|f| f.outcome.letter()).collect();
        assert_eq!(letters, "DL");
        assert_eq!(form[1].opponent, "C");
        assert!(!form[1].home);
    }
}
