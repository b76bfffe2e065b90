use crate::model::{PlayerRow, PositionBucket};
use crate::stats::percentile_rank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerMetric {
    Minutes,
    Goals,
    Assists,
    Xg,
    Xa,
    Npxg,
    Shots,
    KeyPasses,
    GoalsPer90,
    AssistsPer90,
    XgPer90,
    XaPer90,
    NpxgPer90,
    ShotsPer90,
    KeyPassesPer90,
    XgChainPer90,
    XgBuildupPer90,
    XgPerShot,
}

impl PlayerMetric {
    pub const ALL: [PlayerMetric; 18] = [
        PlayerMetric::Minutes,
        PlayerMetric::Goals,
        PlayerMetric::Assists,
        PlayerMetric::Xg,
        PlayerMetric::Xa,
        PlayerMetric::Npxg,
        PlayerMetric::Shots,
        PlayerMetric::KeyPasses,
        PlayerMetric::GoalsPer90,
        PlayerMetric::AssistsPer90,
        PlayerMetric::XgPer90,
        PlayerMetric::XaPer90,
        PlayerMetric::NpxgPer90,
        PlayerMetric::ShotsPer90,
        PlayerMetric::KeyPassesPer90,
        PlayerMetric::XgChainPer90,
        PlayerMetric::XgBuildupPer90,
        PlayerMetric::XgPerShot,
    ];

    /// Rates shown on the percentile profile.
    pub const PROFILE: [PlayerMetric; 9] = [
        PlayerMetric::GoalsPer90,
        PlayerMetric::NpxgPer90,
        PlayerMetric::XgPerShot,
        PlayerMetric::ShotsPer90,
        PlayerMetric::AssistsPer90,
        PlayerMetric::XaPer90,
        PlayerMetric::KeyPassesPer90,
        PlayerMetric::XgChainPer90,
        PlayerMetric::XgBuildupPer90,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PlayerMetric::Minutes => "Minutes",
            PlayerMetric::Goals => "Goals",
            PlayerMetric::Assists => "Assists",
            PlayerMetric::Xg => "xG",
            PlayerMetric::Xa => "xA",
            PlayerMetric::Npxg => "npxG",
            PlayerMetric::Shots => "Shots",
            PlayerMetric::KeyPasses => "Key passes",
            PlayerMetric::GoalsPer90 => "Goals/90",
            PlayerMetric::AssistsPer90 => "Assists/90",
            PlayerMetric::XgPer90 => "xG/90",
            PlayerMetric::XaPer90 => "xA/90",
            PlayerMetric::NpxgPer90 => "npxG/90",
            PlayerMetric::ShotsPer90 => "Shots/90",
            PlayerMetric::KeyPassesPer90 => "KP/90",
            PlayerMetric::XgChainPer90 => "xGChain/90",
            PlayerMetric::XgBuildupPer90 => "xGBuildup/90",
            PlayerMetric::XgPerShot => "xG/shot",
        }
    }

    /// Slug understood by the `leaders/{stat}` endpoint, where one exists.
    pub fn leaders_slug(self) -> Option<&'static str> {
        match self {
            PlayerMetric::Goals => Some("goals"),
            PlayerMetric::Assists => Some("assists"),
            PlayerMetric::Xg => Some("xG"),
            PlayerMetric::Xa => Some("xA"),
            PlayerMetric::Npxg => Some("npxG"),
            PlayerMetric::Shots => Some("shots"),
            PlayerMetric::KeyPasses => Some("key_passes"),
            _ => None,
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

pub fn metric_value(row: &PlayerRow, metric: PlayerMetric) -> f64 {
    match metric {
        PlayerMetric::Minutes => row.minutes,
        PlayerMetric::Goals => row.goals,
        PlayerMetric::Assists => row.assists,
        PlayerMetric::Xg => row.xg,
        PlayerMetric::Xa => row.xa,
        PlayerMetric::Npxg => row.npxg,
        PlayerMetric::Shots => row.shots,
        PlayerMetric::KeyPasses => row.key_passes,
        PlayerMetric::GoalsPer90 => row.goals_per90(),
        PlayerMetric::AssistsPer90 => row.assists_per90(),
        PlayerMetric::XgPer90 => row.xg_per90(),
        PlayerMetric::XaPer90 => row.xa_per90(),
        PlayerMetric::NpxgPer90 => row.npxg_per90(),
        PlayerMetric::ShotsPer90 => row.shots_per90(),
        PlayerMetric::KeyPassesPer90 => row.key_passes_per90(),
        PlayerMetric::XgChainPer90 => row.xg_chain_per90(),
        PlayerMetric::XgBuildupPer90 => row.xg_buildup_per90(),
        PlayerMetric::XgPerShot => row.xg_per_shot(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerGroup {
    Position(PositionBucket),
    League,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PercentileEntry {
    pub metric: PlayerMetric,
    pub value: f64,
    pub percentile: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PercentileProfile {
    pub peers: PeerGroup,
    pub peer_count: usize,
    pub entries: Vec<PercentileEntry>,
}

/// Ranks `player` against same-position peers who cleared `min_minutes`. An empty
/// peer group widens to the whole league.
pub fn percentile_profile(
    player: &PlayerRow,
    population: &[PlayerRow],
    metrics: &[PlayerMetric],
    min_minutes: f64,
) -> PercentileProfile {
    let qualified: Vec<&PlayerRow> = population
        .iter()
        .filter(|p| p.minutes >= min_minutes)
        .collect();

    let bucket = player.bucket();
    let same_bucket: Vec<&PlayerRow> = match bucket {
        Some(bucket) => qualified
            .iter()
            .copied()
            .filter(|p| p.bucket() == Some(bucket))
            .collect(),
        None => Vec::new(),
    };

    let (peers, group) = match bucket {
        Some(bucket) if !same_bucket.is_empty() => (same_bucket, PeerGroup::Position(bucket)),
        _ if !qualified.is_empty() => (qualified, PeerGroup::League),
        _ => (population.iter().collect(), PeerGroup::League),
    };

    let entries = metrics
        .iter()
        .map(|metric| {
            let values: Vec<f64> = peers.iter().map(|p| metric_value(p, *metric)).collect();
            let value = metric_value(player, *metric);
            PercentileEntry {
                metric: *metric,
                value,
                percentile: percentile_rank(value, &values),
            }
        })
        .collect();

    PercentileProfile {
        peers: group,
        peer_count: peers.len(),
        entries,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerFilter {
    pub bucket: Option<PositionBucket>,
    pub search: String,
    pub min_minutes: f64,
}

impl PlayerFilter {
    pub fn matches(&self, row: &PlayerRow) -> bool {
        if row.minutes < self.min_minutes {
            return false;
        }
        if let Some(bucket) = self.bucket
            && row.bucket() != Some(bucket)
        {
            return false;
        }
        let needle = self.search.trim().to_lowercase();
        needle.is_empty()
            || row.name.to_lowercase().contains(&needle)
            || row.team.to_lowercase().contains(&needle)
    }
}

/// Filtered rows sorted by `metric` descending, name ascending on ties.
pub fn explore<'a>(
    rows: &'a [PlayerRow],
    filter: &PlayerFilter,
    metric: PlayerMetric,
) -> Vec<&'a PlayerRow> {
    let mut out: Vec<&PlayerRow> = rows.iter().filter(|row| filter.matches(row)).collect();
    sort_by_metric(&mut out, metric);
    out
}

pub fn sort_by_metric(rows: &mut [&PlayerRow], metric: PlayerMetric) {
    rows.sort_by(|a, b| {
        metric_value(b, metric)
            .total_cmp(&metric_value(a, metric))
            .then_with(|| a.name.cmp(&b.name))
    });
}

pub fn league_leaders(rows: &[PlayerRow], metric: PlayerMetric, n: usize) -> Vec<&PlayerRow> {
    let mut sorted: Vec<&PlayerRow> = rows.iter().collect();
    sort_by_metric(&mut sorted, metric);
    sorted.truncate(n);
    sorted
}

pub fn next_bucket(current: Option<PositionBucket>) -> Option<PositionBucket> {
    match current {
        None => Some(PositionBucket::Goalkeeper),
        Some(PositionBucket::Goalkeeper) => Some(PositionBucket::Defender),
        Some(PositionBucket::Defender) => Some(PositionBucket::Midfielder),
        Some(PositionBucket::Midfielder) => Some(PositionBucket::Forward),
        Some(PositionBucket::Forward) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(name: &str, position: &str, minutes: f64, goals: f64) -> PlayerRow {
        PlayerRow {
            name: name.to_string(),
            team: "Brighton".to_string(),
            position: position.to_string(),
            minutes,
            goals,
            ..PlayerRow::default()
        }
    }

    #[test]
    fn bucket_skips_substitute_marker() {
        assert_eq!(
            PositionBucket::from_position("S M"),
            Some(PositionBucket::Midfielder)
        );
        assert_eq!(
            PositionBucket::from_position("F M S"),
            Some(PositionBucket::Forward)
        );
        assert_eq!(PositionBucket::from_position("S"), None);
    }

    #[test]
    fn profile_uses_position_peers() {
        let population = vec![
            player("Striker A", "F", 900.0, 10.0),
            player("Striker B", "F S", 900.0, 5.0),
            player("Keeper", "GK", 900.0, 0.0),
            player("Bench", "F", 100.0, 4.0),
        ];
        let profile = percentile_profile(
            &population[1],
            &population,
            &[PlayerMetric::GoalsPer90],
            450.0,
        );
        assert_eq!(profile.peers, PeerGroup::Position(PositionBucket::Forward));
        assert_eq!(profile.peer_count, 2);
        assert!((profile.entries[0].percentile - 0.5).abs() < 1e-9);
    }

    #[test]
    fn profile_falls_back_to_league() {
        let population = vec![
            player("Winger", "M", 900.0, 3.0),
            player("Back", "D", 900.0, 1.0),
        ];
        let keeper = player("Keeper", "GK", 900.0, 0.0);
        let profile = percentile_profile(&keeper, &population, &[PlayerMetric::Goals], 450.0);
        assert_eq!(profile.peers, PeerGroup::League);
        assert_eq!(profile.peer_count, 2);
        assert_eq!(profile.entries[0].percentile, 0.0);
    }

    #[test]
    fn explorer_filters_and_sorts() {
        let rows = vec![
            player("Welbeck", "F", 1500.0, 6.0),
            player("Mitoma", "M", 1400.0, 7.0),
            player("Joao Pedro", "F", 1600.0, 9.0),
        ];
        let filter = PlayerFilter {
            bucket: Some(PositionBucket::Forward),
            ..PlayerFilter::default()
        };
        let names: Vec<&str> = explore(&rows, &filter, PlayerMetric::Goals)
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["Joao Pedro", "Welbeck"]);

        let filter = PlayerFilter {
            search: "MITO".to_string(),
            ..PlayerFilter::default()
        };
        assert_eq!(explore(&rows, &filter, PlayerMetric::Goals).len(), 1);

        let top = league_leaders(&rows, PlayerMetric::Goals, 2);
        assert_eq!(top[0].name, "Joao Pedro");
        assert_eq!(top[1].name, "Mitoma");
    }
}
