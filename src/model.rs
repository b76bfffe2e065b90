use serde::{Deserialize, Serialize};

use crate::stats::{per90, safe_div};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamSide {
    Home,
    Away,
}

impl TeamSide {
    pub fn from_tag(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "h" | "home" => Some(TeamSide::Home),
            "a" | "away" => Some(TeamSide::Away),
            _ => None,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            TeamSide::Home => TeamSide::Away,
            TeamSide::Away => TeamSide::Home,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub name: String,
    pub matches: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub points: u32,
    pub xg: f64,
    pub xga: f64,
    pub npxg: f64,
    pub npxga: f64,
    pub ppda: f64,
    pub oppda: f64,
    pub deep: f64,
    pub deep_allowed: f64,
    pub xpts: f64,
}

impl TeamRecord {
    pub fn goal_difference(&self) -> i64 {
        self.goals_for as i64 - self.goals_against as i64
    }

    pub fn points_per_match(&self) -> f64 {
        safe_div(self.points as f64, self.matches as f64)
    }

    pub fn goals_per_match(&self) -> f64 {
        safe_div(self.goals_for as f64, self.matches as f64)
    }

    pub fn xg_difference(&self) -> f64 {
        self.xg - self.xga
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: String,
    pub home: String,
    pub away: String,
    pub kickoff: String,
    pub venue: String,
    pub is_result: bool,
    pub home_goals: u32,
    pub away_goals: u32,
    pub home_xg: f64,
    pub away_xg: f64,
}

impl Fixture {
    pub fn involves(&self, team: &str) -> bool {
        self.home == team || self.away == team
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShotResult {
    Goal,
    OwnGoal,
    Shot(String),
}

impl ShotResult {
    pub fn from_tag(raw: &str) -> Self {
        match raw.trim() {
            "Goal" => ShotResult::Goal,
            "OwnGoal" => ShotResult::OwnGoal,
            other => ShotResult::Shot(other.to_string()),
        }
    }

    pub fn is_goal(&self) -> bool {
        matches!(self, ShotResult::Goal)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Situation {
    OpenPlay,
    FromCorner,
    SetPiece,
    DirectFreekick,
    Penalty,
    Other(String),
}

impl Situation {
    pub const KNOWN: [Situation; 5] = [
        Situation::OpenPlay,
        Situation::FromCorner,
        Situation::SetPiece,
        Situation::DirectFreekick,
        Situation::Penalty,
    ];

    pub fn from_tag(raw: &str) -> Self {
        match raw.trim() {
            "OpenPlay" => Situation::OpenPlay,
            "FromCorner" => Situation::FromCorner,
            "SetPiece" => Situation::SetPiece,
            "DirectFreekick" => Situation::DirectFreekick,
            "Penalty" => Situation::Penalty,
            other => Situation::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Situation::OpenPlay => "Open play",
            Situation::FromCorner => "Corner",
            Situation::SetPiece => "Set piece",
            Situation::DirectFreekick => "Direct FK",
            Situation::Penalty => "Penalty",
            Situation::Other(raw) => raw,
        }
    }

    pub fn is_set_piece(&self) -> bool {
        matches!(
            self,
            Situation::FromCorner | Situation::SetPiece | Situation::DirectFreekick
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotEvent {
    pub id: String,
    pub match_id: String,
    pub minute: u32,
    pub x: f64,
    pub y: f64,
    pub xg: f64,
    pub result: ShotResult,
    pub situation: Situation,
    pub player: String,
    pub side: TeamSide,
    pub home_team: String,
    pub away_team: String,
    pub date: String,
}

impl ShotEvent {
    pub fn shooting_team(&self) -> &str {
        match self.side {
            TeamSide::Home => &self.home_team,
            TeamSide::Away => &self.away_team,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamMatchStats {
    pub goals: u32,
    pub xg: f64,
    pub shots: u32,
    pub shots_on_target: u32,
    pub ppda: f64,
    pub deep: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchInfo {
    pub match_id: String,
    pub date: String,
    pub home_team: String,
    pub away_team: String,
    pub home: TeamMatchStats,
    pub away: TeamMatchStats,
    pub home_win_prob: f64,
    pub draw_prob: f64,
    pub away_win_prob: f64,
}

impl MatchInfo {
    pub fn side(&self, side: TeamSide) -> &TeamMatchStats {
        match side {
            TeamSide::Home => &self.home,
            TeamSide::Away => &self.away,
        }
    }

    pub fn team(&self, side: TeamSide) -> &str {
        match side {
            TeamSide::Home => &self.home_team,
            TeamSide::Away => &self.away_team,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub player: String,
    pub side: TeamSide,
    pub position: String,
    pub position_order: u32,
    pub minutes: u32,
    pub goals: u32,
    pub own_goals: u32,
    pub shots: u32,
    pub xg: f64,
    pub key_passes: u32,
    pub assists: u32,
    pub xa: f64,
    pub yellow_cards: u32,
    pub red_cards: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionBucket {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl PositionBucket {
    /// First recognised token wins; `S` marks substitute appearances and is skipped.
    pub fn from_position(raw: &str) -> Option<Self> {
        raw.split(|c: char| c.is_whitespace() || c == ',' || c == '/')
            .filter(|token| !token.is_empty())
            .find_map(|token| match token.to_ascii_uppercase().as_str() {
                "GK" => Some(PositionBucket::Goalkeeper),
                "D" | "DF" | "DC" | "DL" | "DR" => Some(PositionBucket::Defender),
                "M" | "MF" | "DM" | "AM" | "MC" | "ML" | "MR" => Some(PositionBucket::Midfielder),
                "F" | "FW" | "FWD" | "ST" => Some(PositionBucket::Forward),
                _ => None,
            })
    }

    pub fn short(self) -> &'static str {
        match self {
            PositionBucket::Goalkeeper => "GK",
            PositionBucket::Defender => "D",
            PositionBucket::Midfielder => "M",
            PositionBucket::Forward => "F",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerRow {
    pub id: String,
    pub name: String,
    pub team: String,
    pub position: String,
    pub games: u32,
    pub minutes: f64,
    pub goals: f64,
    pub assists: f64,
    pub shots: f64,
    pub key_passes: f64,
    pub xg: f64,
    pub xa: f64,
    pub npg: f64,
    pub npxg: f64,
    pub xg_chain: f64,
    pub xg_buildup: f64,
    pub yellow_cards: u32,
    pub red_cards: u32,
}

impl PlayerRow {
    pub fn bucket(&self) -> Option<PositionBucket> {
        PositionBucket::from_position(&self.position)
    }

    pub fn goals_per90(&self) -> f64 {
        per90(self.goals, self.minutes)
    }

    pub fn assists_per90(&self) -> f64 {
        per90(self.assists, self.minutes)
    }

    pub fn xg_per90(&self) -> f64 {
        per90(self.xg, self.minutes)
    }

    pub fn xa_per90(&self) -> f64 {
        per90(self.xa, self.minutes)
    }

    pub fn npxg_per90(&self) -> f64 {
        per90(self.npxg, self.minutes)
    }

    pub fn shots_per90(&self) -> f64 {
        per90(self.shots, self.minutes)
    }

    pub fn key_passes_per90(&self) -> f64 {
        per90(self.key_passes, self.minutes)
    }

    pub fn xg_chain_per90(&self) -> f64 {
        per90(self.xg_chain, self.minutes)
    }

    pub fn xg_buildup_per90(&self) -> f64 {
        per90(self.xg_buildup, self.minutes)
    }

    pub fn xg_per_shot(&self) -> f64 {
        safe_div(self.xg, self.shots)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SituationRow {
    pub situation: String,
    pub shots: f64,
    pub goals: f64,
    pub xg: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormationRow {
    pub formation: String,
    pub minutes: f64,
    pub shots: f64,
    pub goals: f64,
    pub xg: f64,
}

/// Flattened numeric leaves of a style payload, sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleMetrics {
    pub subject: String,
    pub values: Vec<(String, f64)>,
}

impl StyleMetrics {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values
            .binary_search_by(|(k, _)| k.as_str().cmp(name))
            .ok()
            .map(|idx| self.values[idx].1)
    }
}
