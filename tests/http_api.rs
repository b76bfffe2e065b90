use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use chrono::{Days, NaiveDate};

use epl_terminal::api::{ApiClient, CancelToken, Endpoint, FetchError};
use epl_terminal::config::AppConfig;
use epl_terminal::provider::run_request;
use epl_terminal::schema::parse_fixtures_json;
use epl_terminal::standings::weekly_positions;
use epl_terminal::state::{AppState, Job, Loadable, apply_delta};

const TOKEN: &str = "secret-token";

/// Serves `count` connections on a local port. `respond` gets the request head and
/// returns the status and body; the heads are handed back when the thread joins.
fn serve(
    count: usize,
    respond: impl Fn(&str) -> (u16, String) + Send + 'static,
) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind local port");
    let base = format!("http://{}", listener.local_addr().expect("local addr"));
    let handle = thread::spawn(move || {
        let mut heads = Vec::new();
        for _ in 0..count {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
            let mut head = String::new();
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).expect("read request") == 0 || line == "\r\n" {
                    break;
                }
                head.push_str(&line);
            }
            let (status, body) = respond(&head);
            let reply = format!(
                "HTTP/1.1 {status} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(reply.as_bytes()).expect("write response");
            stream.flush().expect("flush");
            heads.push(head);
        }
        heads
    });
    (base, handle)
}

fn client_for(base: &str) -> (AppConfig, ApiClient) {
    let base = base.to_string();
    let config = AppConfig::from_lookup(move |key| match key {
        "EPL_API_BASE" => Some(base.clone()),
        "EPL_API_TOKEN" => Some(TOKEN.to_string()),
        _ => None,
    });
    let client = ApiClient::new(&config).expect("client");
    (config, client)
}

fn header<'a>(head: &'a str, name: &str) -> Option<&'a str> {
    head.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim().eq_ignore_ascii_case(name).then(|| value.trim())
    })
}

#[test]
fn error_status_keeps_code_and_body() {
    let (base, server) = serve(1, |_| (404, r#"{"error":"unknown team"}"#.to_string()));
    let (_, client) = client_for(&base);

    let err = client
        .fetch_text(&Endpoint::TeamShots("Nowhere FC".to_string()), None)
        .unwrap_err();
    assert_eq!(
        err,
        FetchError::Http {
            status: 404,
            body: r#"{"error":"unknown team"}"#.to_string(),
        }
    );
    assert!(!err.is_aborted());

    let heads = server.join().expect("server thread");
    assert!(heads[0].starts_with("GET /shots/Nowhere%20FC "));
    assert_eq!(header(&heads[0], "x-api-token"), Some(TOKEN));
}

#[test]
fn cancel_during_flight_resolves_to_aborted() {
    let cancel = CancelToken::new();
    let remote = cancel.clone();
    let (base, server) = serve(1, move |_| {
        remote.cancel();
        (200, "[]".to_string())
    });
    let (_, client) = client_for(&base);

    let err = client
        .fetch_text(&Endpoint::Standings, Some(&cancel))
        .unwrap_err();
    assert_eq!(err, FetchError::Aborted);
    server.join().expect("server thread");
}

fn season_json(rounds: u64) -> String {
    let kickoff = NaiveDate::from_ymd_opt(2025, 8, 16).expect("date");
    let mut rows = Vec::new();
    for round in 0..rounds {
        let r = round % 19;
        let date = kickoff
            .checked_add_days(Days::new(7 * round))
            .expect("date in range")
            .format("%Y-%m-%d 15:00:00");
        let mut pairs = vec![(19, r)];
        pairs.extend((1..10).map(|i| ((r + i) % 19, (r + 19 - i) % 19)));
        for (i, (home, away)) in pairs.into_iter().enumerate() {
            rows.push(format!(
                r#"{{"id": {}, "home_team": "Team {home:02}", "away_team": "Team {away:02}", "datetime": "{date}", "isResult": true, "home_goals": {}, "away_goals": {}}}"#,
                round * 10 + i as u64 + 1,
                (home + round) % 3,
                (away + 2 * round) % 2
            ));
        }
    }
    // Newest first, the order the results route uses.
    rows.reverse();
    format!("[{}]", rows.join(","))
}

fn query_value(head: &str, key: &str) -> Option<usize> {
    let target = head.split_whitespace().nth(1)?;
    let (_, query) = target.split_once('?')?;
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix(key)?.strip_prefix('='))
        .and_then(|v| v.parse().ok())
}

#[test]
fn results_are_paged_so_the_trend_starts_at_round_one() {
    let season = season_json(22);
    let all: Vec<serde_json::Value> = serde_json::from_str(&season).expect("season json");
    assert_eq!(all.len(), 220);

    let pages = all.clone();
    let (base, server) = serve(2, move |head| {
        let limit = query_value(head, "limit").unwrap_or(200);
        let offset = query_value(head, "offset").unwrap_or(0);
        let page: Vec<_> = pages.iter().skip(offset).take(limit).cloned().collect();
        (200, serde_json::Value::Array(page).to_string())
    });
    let (config, client) = client_for(&base);

    let mut state = AppState::new(&config, Instant::now());
    let request = state.begin_request(Job::Recents);
    let (tx, rx) = mpsc::channel();
    run_request(&client, 2, request, &tx);
    apply_delta(&mut state, rx.try_recv().expect("one delta"));

    let heads = server.join().expect("server thread");
    let offsets: Vec<Option<usize>> = heads.iter().map(|h| query_value(h, "offset")).collect();
    assert_eq!(offsets, vec![Some(0), Some(200)]);

    match &state.recents {
        Loadable::Ready(rows) => assert_eq!(rows.len(), 220),
        other => panic!("recents not loaded: {other:?}"),
    }
    let expected = weekly_positions(&parse_fixtures_json(&season).expect("parse").rows);
    assert_eq!(state.weekly, expected);
    assert_eq!(state.weekly.len(), 20);
    assert!(state.weekly.iter().all(|s| s.positions.len() == 22));
}
