use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::api::{CancelToken, FetchError};
use crate::carousel::{Carousel, CarouselTiming};
use crate::compare::{TeamDetail, TeamMetric};
use crate::config::AppConfig;
use crate::heatmap::{DEFAULT_COLS, DEFAULT_ROWS, HalfConvention, HeatmapGrid};
use crate::match_center::MatchCenter;
use crate::model::{Fixture, PlayerRow, ShotEvent, StyleMetrics, TeamRecord};
use crate::players::{PlayerFilter, PlayerMetric, explore};
use crate::situations::{FormationSplit, SituationSplit, SplitMetric};
use crate::standings::{PositionSeries, RankedTeam, rank_standings, weekly_positions};

/// Width of one fixture card in terminal cells; the carousel offset is measured in these.
pub const CARD_STEP: f64 = 24.0;
pub const FORM_LENGTH: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    League,
    Team,
    Match,
    Players,
    Compare,
}

impl Screen {
    pub const ALL: [Screen; 5] = [
        Screen::League,
        Screen::Team,
        Screen::Match,
        Screen::Players,
        Screen::Compare,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Screen::League => "League",
            Screen::Team => "Team",
            Screen::Match => "Match",
            Screen::Players => "Players",
            Screen::Compare => "Compare",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

/// Load state of one panel. Panels never share one of these, so a failure stays local.
#[derive(Debug, Clone, PartialEq)]
pub enum Loadable<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Loadable<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Loadable::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Loadable::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Loadable::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Loadable::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    fn set_status(&mut self, status: Status) {
        *self = match status {
            Status::Idle => Loadable::Idle,
            Status::Loading => Loadable::Loading,
            Status::Failed(msg) => Loadable::Failed(msg),
        };
    }
}

#[derive(Debug, Clone)]
enum Status {
    Idle,
    Loading,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    Standings,
    TeamNames,
    Leaders,
    Upcoming,
    Recents,
    TeamUpcoming,
    TeamResults,
    TeamSituations,
    TeamFormations,
    TeamShots,
    TeamStyle,
    Match,
    PlayerPool,
    PlayerStyle,
    CompareDetail,
}

impl Panel {
    pub fn label(self) -> &'static str {
        match self {
            Panel::Standings => "standings",
            Panel::TeamNames => "team names",
            Panel::Leaders => "leaders",
            Panel::Upcoming => "upcoming fixtures",
            Panel::Recents => "recent results",
            Panel::TeamUpcoming => "team fixtures",
            Panel::TeamResults => "team results",
            Panel::TeamSituations => "situations",
            Panel::TeamFormations => "formations",
            Panel::TeamShots => "shot map",
            Panel::TeamStyle => "team style",
            Panel::Match => "match center",
            Panel::PlayerPool => "player pool",
            Panel::PlayerStyle => "player style",
            Panel::CompareDetail => "team detail",
        }
    }

    const TEAM: [Panel; 6] = [
        Panel::TeamUpcoming,
        Panel::TeamResults,
        Panel::TeamSituations,
        Panel::TeamFormations,
        Panel::TeamShots,
        Panel::TeamStyle,
    ];
}

/// What a worker should fetch. The variant fixes the panel the result lands in.
#[derive(Debug, Clone, PartialEq)]
pub enum Job {
    Standings,
    TeamNames,
    Leaders(PlayerMetric),
    Upcoming,
    Recents,
    TeamUpcoming(String),
    TeamResults(String),
    TeamSituations(String),
    TeamFormations(String),
    TeamShots(String),
    TeamStyle(String),
    Match(String),
    PlayerPool(Vec<String>),
    PlayerStyle(String),
    CompareDetail(Vec<String>),
}

impl Job {
    pub fn panel(&self) -> Panel {
        match self {
            Job::Standings => Panel::Standings,
            Job::TeamNames => Panel::TeamNames,
            Job::Leaders(_) => Panel::Leaders,
            Job::Upcoming => Panel::Upcoming,
            Job::Recents => Panel::Recents,
            Job::TeamUpcoming(_) => Panel::TeamUpcoming,
            Job::TeamResults(_) => Panel::TeamResults,
            Job::TeamSituations(_) => Panel::TeamSituations,
            Job::TeamFormations(_) => Panel::TeamFormations,
            Job::TeamShots(_) => Panel::TeamShots,
            Job::TeamStyle(_) => Panel::TeamStyle,
            Job::Match(_) => Panel::Match,
            Job::PlayerPool(_) => Panel::PlayerPool,
            Job::PlayerStyle(_) => Panel::PlayerStyle,
            Job::CompareDetail(_) => Panel::CompareDetail,
        }
    }

    /// Identifier the panel's data belongs to (team, match id, player, stat).
    pub fn key(&self) -> String {
        match self {
            Job::Standings | Job::TeamNames | Job::Upcoming | Job::Recents => String::new(),
            Job::Leaders(metric) => metric.label().to_string(),
            Job::TeamUpcoming(team)
            | Job::TeamResults(team)
            | Job::TeamSituations(team)
            | Job::TeamFormations(team)
            | Job::TeamShots(team)
            | Job::TeamStyle(team) => team.clone(),
            Job::Match(id) => id.clone(),
            Job::PlayerStyle(name) => name.clone(),
            Job::PlayerPool(teams) | Job::CompareDetail(teams) => format!("{} teams", teams.len()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId {
    pub panel: Panel,
    pub key: String,
    pub seq: u64,
}

#[derive(Debug, Clone)]
pub struct Request {
    pub id: RequestId,
    pub cancel: CancelToken,
    pub job: Job,
}

/// The request a panel is currently waiting on.
#[derive(Debug, Clone)]
pub struct RequestSlot {
    pub active: RequestId,
    pub cancel: CancelToken,
}

#[derive(Debug, Clone)]
pub enum PanelData {
    Standings(Vec<TeamRecord>),
    TeamNames(Vec<String>),
    Leaders(Vec<PlayerRow>),
    Upcoming(Vec<Fixture>),
    Recents(Vec<Fixture>),
    TeamUpcoming(Vec<Fixture>),
    TeamResults(Vec<Fixture>),
    TeamSituations(Vec<SituationSplit>),
    TeamFormations(Vec<FormationSplit>),
    TeamShots(Vec<ShotEvent>),
    TeamStyle(StyleMetrics),
    Match(Box<MatchCenter>),
    PlayerPool(Vec<PlayerRow>),
    PlayerStyle(StyleMetrics),
    CompareDetail(HashMap<String, TeamDetail>),
}

#[derive(Debug, Clone)]
pub enum Delta {
    Loaded {
        request: RequestId,
        data: PanelData,
        rejected: usize,
    },
    Failed {
        request: RequestId,
        error: FetchError,
    },
    Progress {
        request: RequestId,
        current: usize,
        total: usize,
        message: String,
    },
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    Fetch(Request),
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamFocus {
    Overview,
    Situations,
    Heatmap,
    Style,
}

impl TeamFocus {
    pub fn next(self) -> Self {
        match self {
            TeamFocus::Overview => TeamFocus::Situations,
            TeamFocus::Situations => TeamFocus::Heatmap,
            TeamFocus::Heatmap => TeamFocus::Style,
            TeamFocus::Style => TeamFocus::Overview,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub theme: Theme,
    pub help_overlay: bool,
    pub logs: VecDeque<String>,
    pub utc_offset_hours: i32,
    pub min_minutes: f64,

    pub team_names: Loadable<Vec<String>>,
    pub selected_team: Option<String>,
    pub team_picker: Option<usize>,

    pub standings: Loadable<Vec<RankedTeam>>,
    pub standings_selected: usize,
    pub leaders: Loadable<Vec<PlayerRow>>,
    pub leaders_metric: PlayerMetric,
    pub upcoming: Loadable<Vec<Fixture>>,
    pub recents: Loadable<Vec<Fixture>>,
    pub weekly: Vec<PositionSeries>,
    pub upcoming_carousel: Carousel,
    pub recents_carousel: Carousel,

    pub team_upcoming: Loadable<Vec<Fixture>>,
    pub team_results: Loadable<Vec<Fixture>>,
    pub team_situations: Loadable<Vec<SituationSplit>>,
    pub team_formations: Loadable<Vec<FormationSplit>>,
    pub team_shots: Loadable<Vec<ShotEvent>>,
    pub team_style: Loadable<StyleMetrics>,
    pub team_focus: TeamFocus,
    pub team_results_selected: usize,
    pub split_metric: SplitMetric,
    pub heatmap_convention: HalfConvention,
    pub heatmap: Option<HeatmapGrid>,

    pub match_id: Option<String>,
    pub match_center: Loadable<MatchCenter>,
    pub match_back: Screen,

    pub player_pool: Loadable<Vec<PlayerRow>>,
    pub player_pool_progress: Option<Progress>,
    pub player_filter: PlayerFilter,
    pub player_metric: PlayerMetric,
    pub player_selected: usize,
    pub player_search_active: bool,
    pub player_detail_open: bool,
    pub player_style: Loadable<StyleMetrics>,

    pub compare_detail: Loadable<HashMap<String, TeamDetail>>,
    pub compare_progress: Option<Progress>,
    pub compare_x: TeamMetric,
    pub compare_y: TeamMetric,

    slots: HashMap<Panel, RequestSlot>,
    next_seq: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&AppConfig::default(), Instant::now())
    }
}

impl AppState {
    pub fn new(config: &AppConfig, now: Instant) -> Self {
        let timing = CarouselTiming::from_config(config);
        Self {
            screen: Screen::League,
            theme: Theme::Dark,
            help_overlay: false,
            logs: VecDeque::new(),
            utc_offset_hours: config.utc_offset_hours,
            min_minutes: config.player_min_minutes,
            team_names: Loadable::Idle,
            selected_team: None,
            team_picker: None,
            standings: Loadable::Idle,
            standings_selected: 0,
            leaders: Loadable::Idle,
            leaders_metric: PlayerMetric::Goals,
            upcoming: Loadable::Idle,
            recents: Loadable::Idle,
            weekly: Vec::new(),
            upcoming_carousel: Carousel::new(0, CARD_STEP, timing, now),
            recents_carousel: Carousel::new(0, CARD_STEP, timing, now),
            team_upcoming: Loadable::Idle,
            team_results: Loadable::Idle,
            team_situations: Loadable::Idle,
            team_formations: Loadable::Idle,
            team_shots: Loadable::Idle,
            team_style: Loadable::Idle,
            team_focus: TeamFocus::Overview,
            team_results_selected: 0,
            split_metric: SplitMetric::Xg,
            heatmap_convention: HalfConvention::Attacked,
            heatmap: None,
            match_id: None,
            match_center: Loadable::Idle,
            match_back: Screen::League,
            player_pool: Loadable::Idle,
            player_pool_progress: None,
            player_filter: PlayerFilter {
                min_minutes: 0.0,
                ..PlayerFilter::default()
            },
            player_metric: PlayerMetric::XgPer90,
            player_selected: 0,
            player_search_active: false,
            player_detail_open: false,
            player_style: Loadable::Idle,
            compare_detail: Loadable::Idle,
            compare_progress: None,
            compare_x: TeamMetric::XgPerMatch,
            compare_y: TeamMetric::PointsPerMatch,
            slots: HashMap::new(),
            next_seq: 0,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    /// Starts a request for the job's panel. Whatever that panel was waiting on is
    /// cancelled first, so at most one request per panel is ever live.
    pub fn begin_request(&mut self, job: Job) -> Request {
        let panel = job.panel();
        self.cancel_panel(panel);
        self.next_seq += 1;
        let id = RequestId {
            panel,
            key: job.key(),
            seq: self.next_seq,
        };
        let cancel = CancelToken::new();
        self.slots.insert(
            panel,
            RequestSlot {
                active: id.clone(),
                cancel: cancel.clone(),
            },
        );
        self.set_status(panel, Status::Loading);
        Request { id, cancel, job }
    }

    pub fn cancel_panel(&mut self, panel: Panel) {
        if let Some(slot) = self.slots.remove(&panel) {
            slot.cancel.cancel();
        }
    }

    pub fn slot(&self, panel: Panel) -> Option<&RequestSlot> {
        self.slots.get(&panel)
    }

    pub fn is_current(&self, request: &RequestId) -> bool {
        self.slots
            .get(&request.panel)
            .is_some_and(|slot| slot.active == *request)
    }

    fn set_status(&mut self, panel: Panel, status: Status) {
        match panel {
            Panel::Standings => self.standings.set_status(status),
            Panel::TeamNames => self.team_names.set_status(status),
            Panel::Leaders => self.leaders.set_status(status),
            Panel::Upcoming => self.upcoming.set_status(status),
            Panel::Recents => self.recents.set_status(status),
            Panel::TeamUpcoming => self.team_upcoming.set_status(status),
            Panel::TeamResults => self.team_results.set_status(status),
            Panel::TeamSituations => self.team_situations.set_status(status),
            Panel::TeamFormations => self.team_formations.set_status(status),
            Panel::TeamShots => self.team_shots.set_status(status),
            Panel::TeamStyle => self.team_style.set_status(status),
            Panel::Match => self.match_center.set_status(status),
            Panel::PlayerPool => self.player_pool.set_status(status),
            Panel::PlayerStyle => self.player_style.set_status(status),
            Panel::CompareDetail => self.compare_detail.set_status(status),
        }
        if panel == Panel::TeamShots {
            self.heatmap = None;
        }
    }

    fn is_idle(&self, panel: Panel) -> bool {
        match panel {
            Panel::Standings => self.standings.is_idle(),
            Panel::TeamNames => self.team_names.is_idle(),
            Panel::Leaders => self.leaders.is_idle(),
            Panel::Upcoming => self.upcoming.is_idle(),
            Panel::Recents => self.recents.is_idle(),
            Panel::TeamUpcoming => self.team_upcoming.is_idle(),
            Panel::TeamResults => self.team_results.is_idle(),
            Panel::TeamSituations => self.team_situations.is_idle(),
            Panel::TeamFormations => self.team_formations.is_idle(),
            Panel::TeamShots => self.team_shots.is_idle(),
            Panel::TeamStyle => self.team_style.is_idle(),
            Panel::Match => self.match_center.is_idle(),
            Panel::PlayerPool => self.player_pool.is_idle(),
            Panel::PlayerStyle => self.player_style.is_idle(),
            Panel::CompareDetail => self.compare_detail.is_idle(),
        }
    }

    /// Drops a panel back to idle so the next `wanted_jobs` call refetches it.
    pub fn reset_panel(&mut self, panel: Panel) {
        self.cancel_panel(panel);
        self.set_status(panel, Status::Idle);
        match panel {
            Panel::PlayerPool => self.player_pool_progress = None,
            Panel::CompareDetail => self.compare_progress = None,
            _ => {}
        }
    }

    fn screen_panels(&self) -> Vec<Panel> {
        let mut panels = vec![Panel::Standings, Panel::TeamNames];
        match self.screen {
            Screen::League => {
                panels.extend([Panel::Leaders, Panel::Upcoming, Panel::Recents]);
            }
            Screen::Team => panels.extend(Panel::TEAM),
            Screen::Match => panels.push(Panel::Match),
            Screen::Players => panels.extend([Panel::PlayerPool, Panel::PlayerStyle]),
            Screen::Compare => panels.push(Panel::CompareDetail),
        }
        panels
    }

    /// Failed panels on the current screen go back to idle. Nothing retries on its own.
    pub fn refresh_screen(&mut self) {
        for panel in self.screen_panels() {
            self.reset_panel(panel);
        }
        self.push_log(format!("[INFO] Refreshing {}", self.screen.title()));
    }

    /// Jobs for every idle panel the current screen shows whose inputs are known.
    pub fn wanted_jobs(&self) -> Vec<Job> {
        let mut jobs = Vec::new();
        for panel in self.screen_panels() {
            if !self.is_idle(panel) {
                continue;
            }
            if let Some(job) = self.job_for(panel) {
                jobs.push(job);
            }
        }
        jobs
    }

    fn job_for(&self, panel: Panel) -> Option<Job> {
        let team = self.selected_team.clone();
        let names = || self.team_names.ready().filter(|n| !n.is_empty()).cloned();
        match panel {
            Panel::Standings => Some(Job::Standings),
            Panel::TeamNames => Some(Job::TeamNames),
            Panel::Leaders => Some(Job::Leaders(self.leaders_metric)),
            Panel::Upcoming => Some(Job::Upcoming),
            Panel::Recents => Some(Job::Recents),
            Panel::TeamUpcoming => team.map(Job::TeamUpcoming),
            Panel::TeamResults => team.map(Job::TeamResults),
            Panel::TeamSituations => team.map(Job::TeamSituations),
            Panel::TeamFormations => team.map(Job::TeamFormations),
            Panel::TeamShots => team.map(Job::TeamShots),
            Panel::TeamStyle => team.map(Job::TeamStyle),
            Panel::Match => self.match_id.clone().map(Job::Match),
            Panel::PlayerPool => names().map(Job::PlayerPool),
            Panel::PlayerStyle => {
                if !self.player_detail_open {
                    return None;
                }
                self.selected_player().map(|p| Job::PlayerStyle(p.name.clone()))
            }
            Panel::CompareDetail => {
                if !(self.compare_x.needs_detail() || self.compare_y.needs_detail()) {
                    return None;
                }
                names().map(Job::CompareDetail)
            }
        }
    }

    pub fn set_screen(&mut self, screen: Screen) {
        if self.screen == screen {
            return;
        }
        self.screen = screen;
        self.team_picker = None;
        self.player_search_active = false;
    }

    pub fn next_screen(&mut self) {
        let idx = Screen::ALL.iter().position(|s| *s == self.screen).unwrap_or(0);
        self.set_screen(Screen::ALL[(idx + 1) % Screen::ALL.len()]);
    }

    pub fn prev_screen(&mut self) {
        let idx = Screen::ALL.iter().position(|s| *s == self.screen).unwrap_or(0);
        self.set_screen(Screen::ALL[(idx + Screen::ALL.len() - 1) % Screen::ALL.len()]);
    }

    /// Switching team cancels everything still loading for the old one.
    pub fn select_team(&mut self, team: &str) {
        if self.selected_team.as_deref() == Some(team) {
            return;
        }
        self.selected_team = Some(team.to_string());
        for panel in Panel::TEAM {
            self.reset_panel(panel);
        }
        self.team_results_selected = 0;
        self.push_log(format!("[INFO] Team: {team}"));
    }

    pub fn open_match(&mut self, match_id: &str) {
        if self.screen != Screen::Match {
            self.match_back = self.screen;
        }
        if self.match_id.as_deref() != Some(match_id) {
            self.match_id = Some(match_id.to_string());
            self.reset_panel(Panel::Match);
        }
        self.set_screen(Screen::Match);
    }

    pub fn close_match(&mut self) {
        self.set_screen(self.match_back);
    }

    pub fn set_leaders_metric(&mut self, metric: PlayerMetric) {
        if metric.leaders_slug().is_none() || metric == self.leaders_metric {
            return;
        }
        self.leaders_metric = metric;
        self.reset_panel(Panel::Leaders);
    }

    pub fn cycle_leaders_metric(&mut self) {
        let mut next = self.leaders_metric.next();
        while next.leaders_slug().is_none() {
            next = next.next();
        }
        self.set_leaders_metric(next);
    }

    pub fn toggle_heatmap_convention(&mut self) {
        self.heatmap_convention = match self.heatmap_convention {
            HalfConvention::Attacked => HalfConvention::Defended,
            HalfConvention::Defended => HalfConvention::Attacked,
        };
        self.rebuild_heatmap();
    }

    fn rebuild_heatmap(&mut self) {
        self.heatmap = self.team_shots.ready().map(|shots| {
            HeatmapGrid::bin(shots, DEFAULT_COLS, DEFAULT_ROWS, self.heatmap_convention)
        });
    }

    pub fn tick(&mut self, now: Instant) -> bool {
        let a = self.upcoming_carousel.tick(now);
        let b = self.recents_carousel.tick(now);
        a || b
    }

    pub fn toggle_carousels(&mut self, now: Instant) {
        self.upcoming_carousel.toggle_pause(now);
        self.recents_carousel.toggle_pause(now);
    }

    pub fn explorer_rows(&self) -> Vec<&PlayerRow> {
        match self.player_pool.ready() {
            Some(rows) => explore(rows, &self.player_filter, self.player_metric),
            None => Vec::new(),
        }
    }

    pub fn selected_player(&self) -> Option<&PlayerRow> {
        self.explorer_rows().get(self.player_selected).copied()
    }

    pub fn open_player_detail(&mut self) {
        if self.selected_player().is_none() {
            return;
        }
        self.player_detail_open = true;
        self.reset_panel(Panel::PlayerStyle);
    }

    pub fn close_player_detail(&mut self) {
        self.player_detail_open = false;
        self.reset_panel(Panel::PlayerStyle);
    }

    pub fn set_compare_metrics(&mut self, x: TeamMetric, y: TeamMetric) {
        self.compare_x = x;
        self.compare_y = y;
    }

    pub fn selected_standing(&self) -> Option<&RankedTeam> {
        self.standings.ready()?.get(self.standings_selected)
    }

    pub fn select_next(&mut self) {
        match self.screen {
            Screen::League => {
                let len = self.standings.ready().map_or(0, Vec::len);
                step_down(&mut self.standings_selected, len);
            }
            Screen::Team => {
                let len = self.team_results.ready().map_or(0, Vec::len);
                step_down(&mut self.team_results_selected, len);
            }
            Screen::Players => {
                let len = self.explorer_rows().len();
                step_down(&mut self.player_selected, len);
            }
            Screen::Match | Screen::Compare => {}
        }
    }

    pub fn select_prev(&mut self) {
        match self.screen {
            Screen::League => self.standings_selected = self.standings_selected.saturating_sub(1),
            Screen::Team => {
                self.team_results_selected = self.team_results_selected.saturating_sub(1)
            }
            Screen::Players => self.player_selected = self.player_selected.saturating_sub(1),
            Screen::Match | Screen::Compare => {}
        }
    }

    pub fn clamp_selection(&mut self) {
        let standings = self.standings.ready().map_or(0, Vec::len);
        self.standings_selected = self.standings_selected.min(standings.saturating_sub(1));
        let results = self.team_results.ready().map_or(0, Vec::len);
        self.team_results_selected = self.team_results_selected.min(results.saturating_sub(1));
        let players = self.explorer_rows().len();
        self.player_selected = self.player_selected.min(players.saturating_sub(1));
    }
}

fn step_down(selected: &mut usize, len: usize) {
    if len > 0 && *selected + 1 < len {
        *selected += 1;
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::Loaded {
            request,
            data,
            rejected,
        } => {
            if !state.is_current(&request) {
                return;
            }
            state.slots.remove(&request.panel);
            if rejected > 0 {
                state.push_log(format!(
                    "[WARN] {}: {rejected} malformed rows skipped",
                    request.panel.label()
                ));
            }
            store(state, data);
            state.clamp_selection();
        }
        Delta::Failed { request, error } => {
            if !state.is_current(&request) {
                return;
            }
            state.slots.remove(&request.panel);
            if error.is_aborted() {
                state.set_status(request.panel, Status::Idle);
                return;
            }
            let label = request.panel.label();
            if request.key.is_empty() {
                state.push_log(format!("[WARN] {label} fetch failed: {error}"));
            } else {
                state.push_log(format!("[WARN] {label} ({}) fetch failed: {error}", request.key));
            }
            state.set_status(request.panel, Status::Failed(error.to_string()));
        }
        Delta::Progress {
            request,
            current,
            total,
            message,
        } => {
            if !state.is_current(&request) {
                return;
            }
            let progress = Some(Progress {
                current,
                total,
                message,
            });
            match request.panel {
                Panel::PlayerPool => state.player_pool_progress = progress,
                Panel::CompareDetail => state.compare_progress = progress,
                _ => {}
            }
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}

fn store(state: &mut AppState, data: PanelData) {
    let now = Instant::now();
    match data {
        PanelData::Standings(records) => {
            state.standings = Loadable::Ready(rank_standings(&records));
        }
        PanelData::TeamNames(names) => {
            if state.selected_team.is_none()
                && let Some(first) = names.first()
            {
                let first = first.clone();
                state.select_team(&first);
            }
            state.team_names = Loadable::Ready(names);
        }
        PanelData::Leaders(rows) => state.leaders = Loadable::Ready(rows),
        PanelData::Upcoming(fixtures) => {
            state.upcoming_carousel.reset(fixtures.len(), now);
            state.upcoming = Loadable::Ready(fixtures);
        }
        PanelData::Recents(fixtures) => {
            state.weekly = weekly_positions(&fixtures);
            state.recents_carousel.reset(fixtures.len(), now);
            state.recents = Loadable::Ready(fixtures);
        }
        PanelData::TeamUpcoming(fixtures) => state.team_upcoming = Loadable::Ready(fixtures),
        PanelData::TeamResults(fixtures) => state.team_results = Loadable::Ready(fixtures),
        PanelData::TeamSituations(splits) => state.team_situations = Loadable::Ready(splits),
        PanelData::TeamFormations(splits) => state.team_formations = Loadable::Ready(splits),
        PanelData::TeamShots(shots) => {
            state.team_shots = Loadable::Ready(shots);
            state.rebuild_heatmap();
        }
        PanelData::TeamStyle(style) => state.team_style = Loadable::Ready(style),
        PanelData::Match(center) => state.match_center = Loadable::Ready(*center),
        PanelData::PlayerPool(rows) => {
            state.player_pool_progress = None;
            state.push_log(format!("[INFO] Player pool: {} players", rows.len()));
            state.player_pool = Loadable::Ready(rows);
        }
        PanelData::PlayerStyle(style) => state.player_style = Loadable::Ready(style),
        PanelData::CompareDetail(details) => {
            state.compare_progress = None;
            state.compare_detail = Loadable::Ready(details);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screens_cycle_both_ways() {
        let mut state = AppState::default();
        state.prev_screen();
        assert_eq!(state.screen, Screen::Compare);
        state.next_screen();
        state.next_screen();
        assert_eq!(state.screen, Screen::Team);
    }

    #[test]
    fn match_screen_returns_where_it_came_from() {
        let mut state = AppState::default();
        state.set_screen(Screen::Team);
        state.open_match("22001");
        assert_eq!(state.screen, Screen::Match);
        assert_eq!(state.wanted_jobs().last(), Some(&Job::Match("22001".to_string())));
        state.close_match();
        assert_eq!(state.screen, Screen::Team);
    }

    #[test]
    fn leaders_cycle_skips_metrics_without_a_table() {
        let mut state = AppState::default();
        for _ in 0..PlayerMetric::ALL.len() {
            state.cycle_leaders_metric();
            assert!(state.leaders_metric.leaders_slug().is_some());
        }
    }

    #[test]
    fn compare_only_fans_out_for_detail_metrics() {
        let mut state = AppState::default();
        state.team_names = Loadable::Ready(vec!["Arsenal".to_string()]);
        state.set_screen(Screen::Compare);
        assert!(state.wanted_jobs().iter().all(|j| j.panel() != Panel::CompareDetail));

        state.set_compare_metrics(TeamMetric::SetPieceXgShare, TeamMetric::PointsPerMatch);
        assert!(
            state
                .wanted_jobs()
                .contains(&Job::CompareDetail(vec!["Arsenal".to_string()]))
        );
    }

    #[test]
    fn log_is_capped() {
        let mut state = AppState::default();
        for i in 0..250 {
            state.push_log(format!("[INFO] {i}"));
        }
        assert_eq!(state.logs.len(), 200);
        assert_eq!(state.logs.front().map(String::as_str), Some("[INFO] 50"));
    }
}
