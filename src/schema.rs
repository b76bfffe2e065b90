use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::model::{
    Fixture, FormationRow, MatchInfo, PlayerRow, RosterEntry, ShotEvent, ShotResult, Situation,
    SituationRow, StyleMetrics, TeamMatchStats, TeamRecord, TeamSide,
};
use crate::stats::{to_count, to_number};

/// Rows that passed validation plus a count of rows that were dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    pub rows: Vec<T>,
    pub rejected: usize,
}

impl<T> Default for Parsed<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            rejected: 0,
        }
    }
}

impl<T> Parsed<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Parsed<U> {
        Parsed {
            rows: self.rows.into_iter().map(f).collect(),
            rejected: self.rejected,
        }
    }
}

fn parse_array(raw: &str, what: &str) -> Result<Vec<Value>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let root: Value =
        serde_json::from_str(trimmed).with_context(|| format!("invalid {what} json"))?;
    match root {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        other => Err(anyhow!("{what}: expected an array, got {}", kind(&other))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn collect_rows<T>(
    items: Vec<Value>,
    build: impl Fn(&Map<String, Value>) -> Option<T>,
) -> Parsed<T> {
    let mut out = Parsed::default();
    for item in &items {
        match item.as_object().and_then(&build) {
            Some(row) => out.rows.push(row),
            None => out.rejected += 1,
        }
    }
    out
}

fn field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| obj.get(*key).filter(|v| !v.is_null()))
}

fn num(obj: &Map<String, Value>, keys: &[&str]) -> f64 {
    to_number(field(obj, keys))
}

fn count(obj: &Map<String, Value>, keys: &[&str]) -> u32 {
    to_count(field(obj, keys))
}

fn text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    let rendered = match field(obj, keys)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if rendered.is_empty() {
        None
    } else {
        Some(rendered)
    }
}

fn strict_number(obj: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    let parsed = match field(obj, keys)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

pub fn parse_standings_json(raw: &str) -> Result<Parsed<TeamRecord>> {
    let items = parse_array(raw, "standings")?;
    Ok(collect_rows(items, |obj| {
        let name = text(obj, &["Team", "team", "team_name", "title"])?;
        Some(TeamRecord {
            name,
            matches: count(obj, &["M", "matches", "played"]),
            wins: count(obj, &["W", "wins"]),
            draws: count(obj, &["D", "draws"]),
            losses: count(obj, &["L", "losses"]),
            goals_for: count(obj, &["G", "GF", "goals_for"]),
            goals_against: count(obj, &["GA", "goals_against"]),
            points: count(obj, &["PTS", "pts", "points"]),
            xg: num(obj, &["xG", "xg"]),
            xga: num(obj, &["xGA", "xga"]),
            npxg: num(obj, &["NPxG", "npxG", "npxg"]),
            npxga: num(obj, &["NPxGA", "npxGA", "npxga"]),
            ppda: num(obj, &["PPDA", "ppda"]),
            oppda: num(obj, &["OPPDA", "oppda"]),
            deep: num(obj, &["DC", "deep"]),
            deep_allowed: num(obj, &["ODC", "deep_allowed"]),
            xpts: num(obj, &["xPTS", "xpts"]),
        })
    }))
}

pub fn parse_team_names_json(raw: &str) -> Result<Vec<String>> {
    let items = parse_array(raw, "team names")?;
    let mut names: Vec<String> = items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Object(obj) => text(obj, &["team_name", "name", "title"]),
            _ => None,
        })
        .filter(|name| !name.is_empty())
        .collect();
    names.sort();
    names.dedup();
    Ok(names)
}

#[derive(Debug, Deserialize)]
struct FixtureRaw {
    #[serde(default, deserialize_with = "string_or_default")]
    id: String,
    #[serde(default, alias = "h_team", deserialize_with = "string_or_default")]
    home_team: String,
    #[serde(default, alias = "a_team", deserialize_with = "string_or_default")]
    away_team: String,
    #[serde(default, alias = "date_utc", deserialize_with = "string_or_default")]
    datetime: String,
    #[serde(default, deserialize_with = "string_or_default")]
    venue: String,
    #[serde(default, rename = "isResult", deserialize_with = "bool_or_false")]
    is_result: bool,
    #[serde(default, deserialize_with = "number_or_zero")]
    home_goals: f64,
    #[serde(default, deserialize_with = "number_or_zero")]
    away_goals: f64,
    #[serde(default, deserialize_with = "number_or_zero")]
    home_xg: f64,
    #[serde(default, deserialize_with = "number_or_zero")]
    away_xg: f64,
}

pub fn parse_fixtures_json(raw: &str) -> Result<Parsed<Fixture>> {
    let items = parse_array(raw, "fixtures")?;
    let mut out = Parsed::default();
    for item in items {
        let Ok(row) = serde_json::from_value::<FixtureRaw>(item) else {
            out.rejected += 1;
            continue;
        };
        if row.id.is_empty() || row.home_team.is_empty() || row.away_team.is_empty() {
            out.rejected += 1;
            continue;
        }
        out.rows.push(Fixture {
            id: row.id,
            home: row.home_team,
            away: row.away_team,
            kickoff: row.datetime,
            venue: row.venue,
            is_result: row.is_result,
            home_goals: clamp_count(row.home_goals),
            away_goals: clamp_count(row.away_goals),
            home_xg: row.home_xg,
            away_xg: row.away_xg,
        });
    }
    Ok(out)
}

fn clamp_count(value: f64) -> u32 {
    if value <= 0.0 { 0 } else { value.round() as u32 }
}

pub fn parse_shots_json(raw: &str) -> Result<Parsed<ShotEvent>> {
    let items = parse_array(raw, "shots")?;
    Ok(collect_rows(items, |obj| {
        let x = strict_number(obj, &["X", "x"])?;
        let y = strict_number(obj, &["Y", "y"])?;
        let side = text(obj, &["team_side", "h_a"]).and_then(|s| TeamSide::from_tag(&s))?;
        Some(ShotEvent {
            id: text(obj, &["shot_id", "id"]).unwrap_or_default(),
            match_id: text(obj, &["match_id"]).unwrap_or_default(),
            minute: count(obj, &["minute"]),
            x: x.clamp(0.0, 1.0),
            y: y.clamp(0.0, 1.0),
            xg: num(obj, &["xG", "xg"]).max(0.0),
            result: ShotResult::from_tag(&text(obj, &["result"]).unwrap_or_default()),
            situation: Situation::from_tag(&text(obj, &["situation"]).unwrap_or_default()),
            player: text(obj, &["player"]).unwrap_or_else(|| "Unknown".to_string()),
            side,
            home_team: text(obj, &["home_team", "h_team"]).unwrap_or_default(),
            away_team: text(obj, &["away_team", "a_team"]).unwrap_or_default(),
            date: text(obj, &["date_utc", "date"]).unwrap_or_default(),
        })
    }))
}

/// The info endpoint returns a one-row array; anything after the first row is ignored.
pub fn parse_match_info_json(raw: &str) -> Result<Option<MatchInfo>> {
    let items = parse_array(raw, "match info")?;
    let Some(first) = items.first() else {
        return Ok(None);
    };
    let obj = first
        .as_object()
        .ok_or_else(|| anyhow!("match info: expected an object row"))?;
    let match_id = text(obj, &["match_id", "id"]).ok_or_else(|| anyhow!("match info: no id"))?;
    Ok(Some(MatchInfo {
        match_id,
        date: text(obj, &["date_utc", "date"]).unwrap_or_default(),
        home_team: text(obj, &["team_h", "home_team"]).unwrap_or_default(),
        away_team: text(obj, &["team_a", "away_team"]).unwrap_or_default(),
        home: TeamMatchStats {
            goals: count(obj, &["home_goals", "h_goals"]),
            xg: num(obj, &["home_xg", "h_xg"]),
            shots: count(obj, &["home_shots", "h_shot"]),
            shots_on_target: count(obj, &["home_shots_on_target", "h_shotOnTarget"]),
            ppda: num(obj, &["home_ppda", "h_ppda"]),
            deep: count(obj, &["home_deep", "h_deep"]),
        },
        away: TeamMatchStats {
            goals: count(obj, &["away_goals", "a_goals"]),
            xg: num(obj, &["away_xg", "a_xg"]),
            shots: count(obj, &["away_shots", "a_shot"]),
            shots_on_target: count(obj, &["away_shots_on_target", "a_shotOnTarget"]),
            ppda: num(obj, &["away_ppda", "a_ppda"]),
            deep: count(obj, &["away_deep", "a_deep"]),
        },
        home_win_prob: num(obj, &["home_win_prob", "h_w"]),
        draw_prob: num(obj, &["home_draw_prob", "h_d"]),
        away_win_prob: num(obj, &["home_lose_prob", "h_l"]),
    }))
}

pub fn parse_roster_json(raw: &str) -> Result<Parsed<RosterEntry>> {
    let items = parse_array(raw, "roster")?;
    Ok(collect_rows(items, |obj| {
        let player = text(obj, &["player", "player_name"])?;
        let side = text(obj, &["team_side", "h_a"]).and_then(|s| TeamSide::from_tag(&s))?;
        Some(RosterEntry {
            player,
            side,
            position: text(obj, &["position"]).unwrap_or_default(),
            position_order: count(obj, &["position_order"]),
            minutes: count(obj, &["time_played", "time"]),
            goals: count(obj, &["goals"]),
            own_goals: count(obj, &["own_goals"]),
            shots: count(obj, &["shots"]),
            xg: num(obj, &["xG", "xg"]),
            key_passes: count(obj, &["key_passes"]),
            assists: count(obj, &["assists"]),
            xa: num(obj, &["xA", "xa"]),
            yellow_cards: count(obj, &["yellow_card", "yellow_cards"]),
            red_cards: count(obj, &["red_card", "red_cards"]),
        })
    }))
}

pub fn parse_players_json(raw: &str) -> Result<Parsed<PlayerRow>> {
    let items = parse_array(raw, "players")?;
    Ok(collect_rows(items, |obj| {
        let name = text(obj, &["player_name", "player", "name"])?;
        Some(PlayerRow {
            id: text(obj, &["id", "player_id"]).unwrap_or_default(),
            name,
            team: text(obj, &["team_title", "team_name", "team"]).unwrap_or_default(),
            position: text(obj, &["position"]).unwrap_or_default(),
            games: count(obj, &["games", "apps"]),
            minutes: num(obj, &["time", "minutes"]),
            goals: num(obj, &["goals"]),
            assists: num(obj, &["assists"]),
            shots: num(obj, &["shots"]),
            key_passes: num(obj, &["key_passes"]),
            xg: num(obj, &["xG", "xg"]),
            xa: num(obj, &["xA", "xa"]),
            npg: num(obj, &["npg"]),
            npxg: num(obj, &["npxG", "npxg"]),
            xg_chain: num(obj, &["xGChain", "xg_chain"]),
            xg_buildup: num(obj, &["xGBuildup", "xg_buildup"]),
            yellow_cards: count(obj, &["yellow_cards", "yellow_card"]),
            red_cards: count(obj, &["red_cards", "red_card"]),
        })
    }))
}

pub fn parse_situations_json(raw: &str) -> Result<Parsed<SituationRow>> {
    let items = parse_array(raw, "situations")?;
    Ok(collect_rows(items, |obj| {
        Some(SituationRow {
            situation: text(obj, &["situation"])?,
            shots: num(obj, &["shots"]),
            goals: num(obj, &["goals"]),
            xg: num(obj, &["xG", "xg"]),
        })
    }))
}

pub fn parse_formations_json(raw: &str) -> Result<Parsed<FormationRow>> {
    let items = parse_array(raw, "formations")?;
    Ok(collect_rows(items, |obj| {
        Some(FormationRow {
            formation: text(obj, &["formation"])?,
            minutes: num(obj, &["time", "minutes"]),
            shots: num(obj, &["shots"]),
            goals: num(obj, &["goals"]),
            xg: num(obj, &["xG", "xg"]),
        })
    }))
}

/// Style payloads come back wrapped by the database function that produced them
/// (`[[{..}]]` or `[{"get_fbref_team": {..}}]`); unwrap to the first object and keep
/// every numeric leaf under a dotted path.
pub fn parse_style_json(raw: &str) -> Result<StyleMetrics> {
    let items = parse_array(raw, "style")?;
    let Some(root) = items.first().and_then(unwrap_style_root) else {
        return Ok(StyleMetrics::default());
    };

    let subject = text(root, &["team", "team_name", "player", "player_name", "squad"])
        .unwrap_or_default();
    let mut values = Vec::new();
    for (key, value) in root {
        flatten_numeric(key, value, 0, &mut values);
    }
    values.sort_by(|a, b| a.0.cmp(&b.0));
    values.dedup_by(|a, b| a.0 == b.0);
    Ok(StyleMetrics { subject, values })
}

fn unwrap_style_root(value: &Value) -> Option<&Map<String, Value>> {
    match value {
        Value::Array(items) => items.first().and_then(unwrap_style_root),
        Value::Object(obj) if obj.len() == 1 => {
            let inner = obj.values().next()?;
            match inner {
                Value::Object(_) | Value::Array(_) => unwrap_style_root(inner),
                _ => Some(obj),
            }
        }
        Value::Object(obj) => Some(obj),
        _ => None,
    }
}

fn flatten_numeric(path: &str, value: &Value, depth: usize, out: &mut Vec<(String, f64)>) {
    const MAX_DEPTH: usize = 4;
    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_f64().filter(|v| v.is_finite()) {
                out.push((path.to_string(), v));
            }
        }
        Value::String(s) => {
            if let Ok(v) = s.trim().parse::<f64>()
                && v.is_finite()
            {
                out.push((path.to_string(), v));
            }
        }
        Value::Object(obj) if depth < MAX_DEPTH => {
            for (key, inner) in obj {
                flatten_numeric(&format!("{path}.{key}"), inner, depth + 1, out);
            }
        }
        _ => {}
    }
}

fn string_or_default<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let rendered = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    };
    Ok(rendered)
}

fn number_or_zero<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(to_number(Some(&value)))
}

fn bool_or_false<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let flag = match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"),
        _ => false,
    };
    Ok(flag)
}
