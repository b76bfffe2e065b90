use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use reqwest::Url;
use reqwest::blocking::Client;
use thiserror::Error;

use crate::config::AppConfig;
use crate::http_client::build_http_client;
use crate::model::{
    Fixture, FormationRow, MatchInfo, PlayerRow, RosterEntry, ShotEvent, SituationRow,
    StyleMetrics, TeamRecord,
};
use crate::schema::{self, Parsed};

/// Server-side default page size for list routes.
pub const PAGE_LIMIT: usize = 200;
const MAX_PAGES: usize = 50;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("request failed: {0}")]
    Network(String),
    #[error("request aborted")]
    Aborted,
    #[error("invalid payload: {0}")]
    Decode(String),
    #[error("invalid url: {0}")]
    Url(String),
}

impl FetchError {
    pub fn is_aborted(&self) -> bool {
        matches!(self, FetchError::Aborted)
    }
}

/// Shared cancellation flag. Cloning hands out another handle to the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Standings,
    TeamStanding(String),
    TeamNames,
    Fixtures,
    UpcomingFixtures,
    TeamUpcomingFixtures(String),
    TeamFixtures(String),
    Recents,
    TeamRecents(String),
    Squad(String),
    Players(String),
    Formations(String),
    FormationsConceded(String),
    ChancesCreated(String),
    ChancesConceded(String),
    TeamShots(String),
    MatchShots(String),
    MatchInfo(String),
    MatchRoster(String),
    Leaders(String),
    TeamStyle(String),
    PlayerStyle(String),
}

impl Endpoint {
    pub fn segments(&self) -> Vec<&str> {
        match self {
            Endpoint::Standings => vec!["standings"],
            Endpoint::TeamStanding(team) => vec!["standings", team],
            Endpoint::TeamNames => vec!["teams", "names"],
            Endpoint::Fixtures => vec!["fixtures"],
            Endpoint::UpcomingFixtures => vec!["fixtures", "upcoming"],
            Endpoint::TeamUpcomingFixtures(team) => vec!["fixtures", "upcoming", team],
            Endpoint::TeamFixtures(team) => vec!["fixtures", team],
            Endpoint::Recents => vec!["recents"],
            Endpoint::TeamRecents(team) => vec!["recents", team],
            Endpoint::Squad(team) => vec![team, "squad"],
            Endpoint::Players(team) => vec!["players", team],
            Endpoint::Formations(team) => vec!["formation", team],
            Endpoint::FormationsConceded(team) => vec!["formations", "conceded", team],
            Endpoint::ChancesCreated(team) => vec!["chances_created", team],
            Endpoint::ChancesConceded(team) => vec!["chances_conceded", team],
            Endpoint::TeamShots(team) => vec!["shots", team],
            Endpoint::MatchShots(id) => vec!["match", "shots", id],
            Endpoint::MatchInfo(id) => vec!["match", "info", id],
            Endpoint::MatchRoster(id) => vec!["match", "roster", id],
            Endpoint::Leaders(stat) => vec!["leaders", stat],
            Endpoint::TeamStyle(team) => vec!["fbref", "team", team],
            Endpoint::PlayerStyle(player) => vec!["fbref", "player", player],
        }
    }

    /// Joins the endpoint onto `base`, percent-encoding every segment.
    pub fn url(&self, base: &str) -> Result<Url, FetchError> {
        let mut url = Url::parse(base).map_err(|err| FetchError::Url(format!("{base}: {err}")))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| FetchError::Url(format!("{base}: cannot be a base")))?;
            path.pop_if_empty();
            path.extend(self.segments());
        }
        Ok(url)
    }

    pub fn page_url(&self, base: &str, page: Page) -> Result<Url, FetchError> {
        let mut url = self.url(base)?;
        url.query_pairs_mut()
            .append_pair("limit", &page.limit.to_string())
            .append_pair("offset", &page.offset.to_string());
        Ok(url)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: usize,
    pub offset: usize,
}

/// Walks `limit`/`offset` pages in order until the server hands back a short page.
pub fn collect_pages<T>(
    limit: usize,
    mut fetch: impl FnMut(Page) -> Result<Parsed<T>, FetchError>,
) -> Result<Parsed<T>, FetchError> {
    let limit = limit.max(1);
    let mut out = Parsed::default();
    for n in 0..MAX_PAGES {
        let parsed = fetch(Page {
            limit,
            offset: n * limit,
        })?;
        let returned = parsed.rows.len() + parsed.rejected;
        out.rows.extend(parsed.rows);
        out.rejected += parsed.rejected;
        if returned < limit {
            break;
        }
    }
    Ok(out)
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base: String,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config)?,
            base: config.api_base.clone(),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Single GET. Cancellation is checked before sending and again once the body is read;
    /// a request cancelled in flight resolves to `Aborted` and its body is dropped.
    pub fn fetch_text(
        &self,
        endpoint: &Endpoint,
        cancel: Option<&CancelToken>,
    ) -> Result<String, FetchError> {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(FetchError::Aborted);
        }
        self.get(endpoint.url(&self.base)?, cancel)
    }

    pub fn fetch_page_text(
        &self,
        endpoint: &Endpoint,
        page: Page,
        cancel: Option<&CancelToken>,
    ) -> Result<String, FetchError> {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(FetchError::Aborted);
        }
        self.get(endpoint.page_url(&self.base, page)?, cancel)
    }

    fn get(&self, url: Url, cancel: Option<&CancelToken>) -> Result<String, FetchError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|err| FetchError::Network(err.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            // The status is the error; an unreadable body only loses the detail.
            let body = resp.text().unwrap_or_default();
            if cancel.is_some_and(CancelToken::is_cancelled) {
                return Err(FetchError::Aborted);
            }
            return Err(FetchError::Http {
                status: status.as_u16(),
                body,
            });
        }
        let body = resp
            .text()
            .map_err(|err| FetchError::Network(err.to_string()))?;
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(FetchError::Aborted);
        }
        Ok(body)
    }

    fn fetch_parsed<T>(
        &self,
        endpoint: &Endpoint,
        cancel: Option<&CancelToken>,
        parse: fn(&str) -> Result<T>,
    ) -> Result<T, FetchError> {
        let body = self.fetch_text(endpoint, cancel)?;
        parse(&body).map_err(|err| FetchError::Decode(format!("{err:#}")))
    }

    pub fn standings(&self, cancel: Option<&CancelToken>) -> Result<Parsed<TeamRecord>, FetchError> {
        self.fetch_parsed(&Endpoint::Standings, cancel, schema::parse_standings_json)
    }

    pub fn team_names(&self, cancel: Option<&CancelToken>) -> Result<Vec<String>, FetchError> {
        self.fetch_parsed(&Endpoint::TeamNames, cancel, schema::parse_team_names_json)
    }

    pub fn fixtures(
        &self,
        endpoint: &Endpoint,
        cancel: Option<&CancelToken>,
    ) -> Result<Parsed<Fixture>, FetchError> {
        self.fetch_parsed(endpoint, cancel, schema::parse_fixtures_json)
    }

    /// Every row of a paged fixture listing, in the order the server returns them.
    pub fn all_fixtures(
        &self,
        endpoint: &Endpoint,
        cancel: Option<&CancelToken>,
    ) -> Result<Parsed<Fixture>, FetchError> {
        collect_pages(PAGE_LIMIT, |page| {
            let body = self.fetch_page_text(endpoint, page, cancel)?;
            schema::parse_fixtures_json(&body).map_err(|err| FetchError::Decode(format!("{err:#}")))
        })
    }

    pub fn players(
        &self,
        team: &str,
        cancel: Option<&CancelToken>,
    ) -> Result<Parsed<PlayerRow>, FetchError> {
        self.fetch_parsed(
            &Endpoint::Players(team.to_string()),
            cancel,
            schema::parse_players_json,
        )
    }

    pub fn leaders(
        &self,
        stat: &str,
        cancel: Option<&CancelToken>,
    ) -> Result<Parsed<PlayerRow>, FetchError> {
        self.fetch_parsed(
            &Endpoint::Leaders(stat.to_string()),
            cancel,
            schema::parse_players_json,
        )
    }

    pub fn situations(
        &self,
        endpoint: &Endpoint,
        cancel: Option<&CancelToken>,
    ) -> Result<Parsed<SituationRow>, FetchError> {
        self.fetch_parsed(endpoint, cancel, schema::parse_situations_json)
    }

    pub fn formations(
        &self,
        endpoint: &Endpoint,
        cancel: Option<&CancelToken>,
    ) -> Result<Parsed<FormationRow>, FetchError> {
        self.fetch_parsed(endpoint, cancel, schema::parse_formations_json)
    }

    pub fn shots(
        &self,
        endpoint: &Endpoint,
        cancel: Option<&CancelToken>,
    ) -> Result<Parsed<ShotEvent>, FetchError> {
        self.fetch_parsed(endpoint, cancel, schema::parse_shots_json)
    }

    pub fn match_info(
        &self,
        match_id: &str,
        cancel: Option<&CancelToken>,
    ) -> Result<Option<MatchInfo>, FetchError> {
        self.fetch_parsed(
            &Endpoint::MatchInfo(match_id.to_string()),
            cancel,
            schema::parse_match_info_json,
        )
    }

    pub fn match_roster(
        &self,
        match_id: &str,
        cancel: Option<&CancelToken>,
    ) -> Result<Parsed<RosterEntry>, FetchError> {
        self.fetch_parsed(
            &Endpoint::MatchRoster(match_id.to_string()),
            cancel,
            schema::parse_roster_json,
        )
    }

    pub fn style(
        &self,
        endpoint: &Endpoint,
        cancel: Option<&CancelToken>,
    ) -> Result<StyleMetrics, FetchError> {
        self.fetch_parsed(endpoint, cancel, schema::parse_style_json)
    }
}
