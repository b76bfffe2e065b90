use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::api::{ApiClient, CancelToken, Endpoint, FetchError};
use crate::compare::TeamDetail;
use crate::fetch_pool::fan_out;
use crate::match_center::MatchCenter;
use crate::schema::Parsed;
use crate::situations::{merge_formations, merge_situations};
use crate::state::{Delta, Job, PanelData, ProviderCommand, Request, RequestId};

/// Dispatcher thread. Every request gets its own worker so panels load side by side
/// and report back in whatever order they finish.
pub fn spawn_provider(
    client: ApiClient,
    fetch_parallelism: usize,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let _ = tx.send(Delta::Log(format!(
            "[INFO] Provider ready ({})",
            client.base()
        )));
        for cmd in cmd_rx {
            match cmd {
                ProviderCommand::Fetch(request) => {
                    let client = client.clone();
                    let tx = tx.clone();
                    thread::spawn(move || run_request(&client, fetch_parallelism, request, &tx));
                }
                ProviderCommand::Shutdown => break,
            }
        }
    })
}

pub fn run_request(client: &ApiClient, parallelism: usize, request: Request, tx: &Sender<Delta>) {
    let Request { id, cancel, job } = request;
    let outcome = fetch_job(client, parallelism, &id, &cancel, job, tx);
    let delta = match outcome {
        Ok((data, rejected)) => Delta::Loaded {
            request: id,
            data,
            rejected,
        },
        Err(error) => Delta::Failed { request: id, error },
    };
    let _ = tx.send(delta);
}

fn fetch_job(
    client: &ApiClient,
    parallelism: usize,
    id: &RequestId,
    cancel: &CancelToken,
    job: Job,
    tx: &Sender<Delta>,
) -> Result<(PanelData, usize), FetchError> {
    let c = Some(cancel);
    let out = match job {
        Job::Standings => {
            let parsed = client.standings(c)?;
            (PanelData::Standings(parsed.rows), parsed.rejected)
        }
        Job::TeamNames => (PanelData::TeamNames(client.team_names(c)?), 0),
        Job::Leaders(metric) => {
            let slug = metric.leaders_slug().unwrap_or("goals");
            let parsed = client.leaders(slug, c)?;
            (PanelData::Leaders(parsed.rows), parsed.rejected)
        }
        Job::Upcoming => {
            let parsed = client.fixtures(&Endpoint::UpcomingFixtures, c)?;
            (PanelData::Upcoming(parsed.rows), parsed.rejected)
        }
        Job::Recents => {
            let parsed = client.all_fixtures(&Endpoint::Recents, c)?;
            (PanelData::Recents(parsed.rows), parsed.rejected)
        }
        Job::TeamUpcoming(team) => {
            let parsed = client.fixtures(&Endpoint::TeamUpcomingFixtures(team), c)?;
            (PanelData::TeamUpcoming(parsed.rows), parsed.rejected)
        }
        Job::TeamResults(team) => {
            let parsed = client.fixtures(&Endpoint::TeamRecents(team), c)?;
            (PanelData::TeamResults(parsed.rows), parsed.rejected)
        }
        Job::TeamSituations(team) => {
            let created = client.situations(&Endpoint::ChancesCreated(team.clone()), c)?;
            let conceded = client.situations(&Endpoint::ChancesConceded(team), c)?;
            (
                PanelData::TeamSituations(merge_situations(&created.rows, &conceded.rows)),
                created.rejected + conceded.rejected,
            )
        }
        Job::TeamFormations(team) => {
            let created = client.formations(&Endpoint::Formations(team.clone()), c)?;
            let conceded = client.formations(&Endpoint::FormationsConceded(team), c)?;
            (
                PanelData::TeamFormations(merge_formations(&created.rows, &conceded.rows)),
                created.rejected + conceded.rejected,
            )
        }
        Job::TeamShots(team) => {
            let parsed = client.shots(&Endpoint::TeamShots(team), c)?;
            (PanelData::TeamShots(parsed.rows), parsed.rejected)
        }
        Job::TeamStyle(team) => (PanelData::TeamStyle(client.style(&Endpoint::TeamStyle(team), c)?), 0),
        Job::Match(match_id) => {
            let info = client.match_info(&match_id, c)?;
            let shots = client.shots(&Endpoint::MatchShots(match_id.clone()), c)?;
            let roster = client.match_roster(&match_id, c)?;
            let rejected = shots.rejected + roster.rejected;
            let center = MatchCenter::build(info, shots.rows, roster.rows);
            (PanelData::Match(Box::new(center)), rejected)
        }
        Job::PlayerStyle(name) => (
            PanelData::PlayerStyle(client.style(&Endpoint::PlayerStyle(name), c)?),
            0,
        ),
        Job::PlayerPool(teams) => {
            let total = teams.len();
            let done = AtomicUsize::new(0);
            let result = fan_out(teams, parallelism, cancel, |team| {
                let res = client.players(team, c);
                report_progress(tx, id, &done, total, team);
                res
            });
            let parsed = gather(result.results, tx, "players")?;
            (PanelData::PlayerPool(parsed.rows), parsed.rejected)
        }
        Job::CompareDetail(teams) => {
            let total = teams.len();
            let done = AtomicUsize::new(0);
            let result = fan_out(teams, parallelism, cancel, |team| {
                let res = team_detail(client, team, cancel);
                report_progress(tx, id, &done, total, team);
                res
            });
            let parsed = gather(
                result
                    .results
                    .into_iter()
                    .map(|(team, res)| {
                        let res = res.map(|detail| Parsed {
                            rows: vec![(team.clone(), detail)],
                            rejected: 0,
                        });
                        (team, res)
                    })
                    .collect(),
                tx,
                "team detail",
            )?;
            let details: HashMap<String, TeamDetail> = parsed.rows.into_iter().collect();
            (PanelData::CompareDetail(details), parsed.rejected)
        }
    };
    Ok(out)
}

fn team_detail(
    client: &ApiClient,
    team: &str,
    cancel: &CancelToken,
) -> Result<TeamDetail, FetchError> {
    let created = client.situations(&Endpoint::ChancesCreated(team.to_string()), Some(cancel))?;
    let conceded = client.situations(&Endpoint::ChancesConceded(team.to_string()), Some(cancel))?;
    Ok(TeamDetail {
        situations: merge_situations(&created.rows, &conceded.rows),
    })
}

fn report_progress(
    tx: &Sender<Delta>,
    id: &RequestId,
    done: &AtomicUsize,
    total: usize,
    team: &str,
) {
    let current = done.fetch_add(1, Ordering::SeqCst) + 1;
    let _ = tx.send(Delta::Progress {
        request: id.clone(),
        current,
        total,
        message: team.to_string(),
    });
}

/// Flattens a fan-out into one row set. Single-team failures are logged and skipped;
/// the whole job fails only when cancelled or when nothing succeeded.
fn gather<T>(
    results: Vec<(String, Result<Parsed<T>, FetchError>)>,
    tx: &Sender<Delta>,
    what: &str,
) -> Result<Parsed<T>, FetchError> {
    let mut out = Parsed::default();
    let mut first_error = None;
    let mut successes = 0usize;
    for (team, res) in results {
        match res {
            Ok(parsed) => {
                successes += 1;
                out.rows.extend(parsed.rows);
                out.rejected += parsed.rejected;
            }
            Err(FetchError::Aborted) => return Err(FetchError::Aborted),
            Err(err) => {
                let _ = tx.send(Delta::Log(format!("[WARN] {what} for {team}: {err}")));
                first_error.get_or_insert(err);
            }
        }
    }
    match first_error {
        Some(err) if successes == 0 => Err(err),
        _ => Ok(out),
    }
}
