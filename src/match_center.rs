use crate::model::{MatchInfo, RosterEntry, ShotEvent, ShotResult, TeamSide};

#[derive(Debug, Clone, PartialEq)]
pub struct GoalEvent {
    pub minute: u32,
    /// Side the goal counts for. Own goals count for the opponent of the player's side.
    pub side: TeamSide,
    pub scorer: String,
    pub own_goal: bool,
    pub xg: f64,
}

/// Goals reconstructed from the shot list, in minute order.
pub fn goal_events(shots: &[ShotEvent]) -> Vec<GoalEvent> {
    let mut events: Vec<GoalEvent> = shots
        .iter()
        .filter_map(|shot| {
            let (side, own_goal) = match shot.result {
                ShotResult::Goal => (shot.side, false),
                ShotResult::OwnGoal => (shot.side.opposite(), true),
                ShotResult::Shot(_) => return None,
            };
            Some(GoalEvent {
                minute: shot.minute,
                side,
                scorer: shot.player.clone(),
                own_goal,
                xg: shot.xg,
            })
        })
        .collect();
    events.sort_by_key(|event| event.minute);
    events
}

pub fn score_from_goals(events: &[GoalEvent]) -> (u32, u32) {
    events.iter().fold((0, 0), |(home, away), event| match event.side {
        TeamSide::Home => (home + 1, away),
        TeamSide::Away => (home, away + 1),
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XgPoint {
    pub minute: u32,
    pub home: f64,
    pub away: f64,
}

/// Cumulative xG per side, one point per shot plus a zero point at kick-off.
/// Own goals carry no xG and are skipped.
pub fn xg_timeline(shots: &[ShotEvent]) -> Vec<XgPoint> {
    let mut ordered: Vec<&ShotEvent> = shots
        .iter()
        .filter(|shot| shot.result != ShotResult::OwnGoal)
        .collect();
    ordered.sort_by_key(|shot| shot.minute);

    let mut points = Vec::with_capacity(ordered.len() + 1);
    let mut current = XgPoint {
        minute: 0,
        home: 0.0,
        away: 0.0,
    };
    points.push(current);
    for shot in ordered {
        current.minute = shot.minute;
        match shot.side {
            TeamSide::Home => current.home += shot.xg,
            TeamSide::Away => current.away += shot.xg,
        }
        points.push(current);
    }
    points
}

pub fn roster_by_side(roster: &[RosterEntry]) -> (Vec<&RosterEntry>, Vec<&RosterEntry>) {
    let mut home: Vec<&RosterEntry> = Vec::new();
    let mut away: Vec<&RosterEntry> = Vec::new();
    for entry in roster {
        match entry.side {
            TeamSide::Home => home.push(entry),
            TeamSide::Away => away.push(entry),
        }
    }
    let order = |a: &&RosterEntry, b: &&RosterEntry| {
        a.position_order
            .cmp(&b.position_order)
            .then_with(|| b.minutes.cmp(&a.minutes))
            .then_with(|| a.player.cmp(&b.player))
    };
    home.sort_by(order);
    away.sort_by(order);
    (home, away)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatLine {
    pub name: &'static str,
    pub home: String,
    pub away: String,
}

pub fn stat_lines(info: &MatchInfo) -> Vec<StatLine> {
    let (h, a) = (&info.home, &info.away);
    vec![
        StatLine {
            name: "Goals",
            home: h.goals.to_string(),
            away: a.goals.to_string(),
        },
        StatLine {
            name: "xG",
            home: format!("{:.2}", h.xg),
            away: format!("{:.2}", a.xg),
        },
        StatLine {
            name: "Shots",
            home: h.shots.to_string(),
            away: a.shots.to_string(),
        },
        StatLine {
            name: "On target",
            home: h.shots_on_target.to_string(),
            away: a.shots_on_target.to_string(),
        },
        StatLine {
            name: "PPDA",
            home: format!("{:.1}", h.ppda),
            away: format!("{:.1}", a.ppda),
        },
        StatLine {
            name: "Deep",
            home: h.deep.to_string(),
            away: a.deep.to_string(),
        },
    ]
}

/// Everything the match screen draws, assembled from the three match endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCenter {
    pub info: Option<MatchInfo>,
    pub shots: Vec<ShotEvent>,
    pub roster: Vec<RosterEntry>,
    pub goals: Vec<GoalEvent>,
    pub timeline: Vec<XgPoint>,
}

impl MatchCenter {
    pub fn build(info: Option<MatchInfo>, shots: Vec<ShotEvent>, roster: Vec<RosterEntry>) -> Self {
        let goals = goal_events(&shots);
        let timeline = xg_timeline(&shots);
        Self {
            info,
            shots,
            roster,
            goals,
            timeline,
        }
    }

    /// Score from the info row when present, otherwise rebuilt from goals.
    pub fn score(&self) -> (u32, u32) {
        match &self.info {
            Some(info) => (info.home.goals, info.away.goals),
            None => score_from_goals(&self.goals),
        }
    }

    pub fn team(&self, side: TeamSide) -> &str {
        if let Some(info) = &self.info {
            return info.team(side);
        }
        self.shots
            .first()
            .map(|shot| match side {
                TeamSide::Home => shot.home_team.as_str(),
                TeamSide::Away => shot.away_team.as_str(),
            })
            .unwrap_or("")
    }
}
