use std::cell::Cell;
use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{
    Axis, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph, Row, Table, Wrap,
};

use epl_terminal::api::ApiClient;
use epl_terminal::carousel::{Carousel, CarouselPhase};
use epl_terminal::compare::build_scatter;
use epl_terminal::config::AppConfig;
use epl_terminal::dates::{format_date, format_day_month, format_kickoff, format_time};
use epl_terminal::heatmap::{HalfConvention, HeatmapGrid, INTENSITY_CEILING};
use epl_terminal::match_center::{roster_by_side, stat_lines};
use epl_terminal::model::{Fixture, PositionBucket, TeamSide};
use epl_terminal::persist;
use epl_terminal::players::{PlayerMetric, next_bucket, percentile_profile};
use epl_terminal::provider::spawn_provider;
use epl_terminal::situations::mirrored_series;
use epl_terminal::standings::form_guide;
use epl_terminal::state::{
    AppState, CARD_STEP, Delta, FORM_LENGTH, Loadable, ProviderCommand, Screen, TeamFocus,
    Theme, apply_delta,
};

struct Palette {
    fg: Color,
    muted: Color,
    accent: Color,
    good: Color,
    bad: Color,
    selected_bg: Color,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => Palette {
            fg: Color::White,
            muted: Color::DarkGray,
            accent: Color::Cyan,
            good: Color::Green,
            bad: Color::Red,
            selected_bg: Color::DarkGray,
        },
        Theme::Light => Palette {
            fg: Color::Black,
            muted: Color::Gray,
            accent: Color::Blue,
            good: Color::Rgb(0, 120, 0),
            bad: Color::Rgb(170, 0, 0),
            selected_bg: Color::Rgb(210, 210, 210),
        },
    }
}

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    upcoming_strip: Cell<Rect>,
    recents_strip: Cell<Rect>,
}

impl App {
    fn new(config: &AppConfig, cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        let mut state = AppState::new(config, Instant::now());
        persist::load_into_state(&mut state);
        Self {
            state,
            should_quit: false,
            cmd_tx,
            upcoming_strip: Cell::new(Rect::default()),
            recents_strip: Cell::new(Rect::default()),
        }
    }

    /// Sends a fetch for every idle panel on screen.
    fn dispatch_wanted(&mut self) {
        let jobs = self.state.wanted_jobs();
        if jobs.is_empty() {
            return;
        }
        let Some(tx) = self.cmd_tx.clone() else {
            return;
        };
        for job in jobs {
            let request = self.state.begin_request(job);
            let panel = request.id.panel;
            if tx.send(ProviderCommand::Fetch(request)).is_err() {
                self.state
                    .push_log(format!("[WARN] {} request failed to send", panel.label()));
                self.state.reset_panel(panel);
                self.cmd_tx = None;
                return;
            }
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.player_search_active {
            self.on_search_key(key);
            return;
        }
        if self.state.team_picker.is_some() {
            self.on_picker_key(key);
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Tab => self.state.next_screen(),
            KeyCode::BackTab => self.state.prev_screen(),
            KeyCode::Char('1') => self.state.set_screen(Screen::League),
            KeyCode::Char('2') => self.state.set_screen(Screen::Team),
            KeyCode::Char('3') => self.state.set_screen(Screen::Match),
            KeyCode::Char('4') => self.state.set_screen(Screen::Players),
            KeyCode::Char('5') => self.state.set_screen(Screen::Compare),
            KeyCode::Char('t') => {
                self.state.theme = self.state.theme.toggle();
                persist::save_from_state(&self.state);
            }
            KeyCode::Char('r') => self.state.refresh_screen(),
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            _ => self.on_screen_key(key),
        }
    }

    fn on_screen_key(&mut self, key: KeyEvent) {
        let now = Instant::now();
        match self.state.screen {
            Screen::League => match key.code {
                KeyCode::Enter => {
                    if let Some(team) = self.state.selected_standing().map(|t| t.record.name.clone())
                    {
                        self.choose_team(&team);
                        self.state.set_screen(Screen::Team);
                    }
                }
                KeyCode::Char('m') => self.state.cycle_leaders_metric(),
                KeyCode::Char('p') => self.state.toggle_carousels(now),
                KeyCode::Char('[') => self.state.recents_carousel.scroll_by(-1),
                KeyCode::Char(']') => self.state.recents_carousel.scroll_by(1),
                KeyCode::Char('o') => {
                    let id = self
                        .state
                        .recents
                        .ready()
                        .and_then(|list| first_visible(&self.state.recents_carousel, list))
                        .map(|f| f.id.clone());
                    if let Some(id) = id {
                        self.state.open_match(&id);
                    }
                }
                _ => {}
            },
            Screen::Team => match key.code {
                KeyCode::Char('/') | KeyCode::Char('T') => self.state.team_picker = Some(0),
                KeyCode::Char('f') => self.state.team_focus = self.state.team_focus.next(),
                KeyCode::Char('x') => self.state.split_metric = self.state.split_metric.next(),
                KeyCode::Char('c') => self.state.toggle_heatmap_convention(),
                KeyCode::Enter => {
                    let id = self
                        .state
                        .team_results
                        .ready()
                        .and_then(|list| list.get(self.state.team_results_selected))
                        .map(|f| f.id.clone());
                    if let Some(id) = id {
                        self.state.open_match(&id);
                    }
                }
                _ => {}
            },
            Screen::Match => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('b')) {
                    self.state.close_match();
                }
            }
            Screen::Players => match key.code {
                KeyCode::Char('/') => {
                    self.state.player_search_active = true;
                    self.state.player_detail_open = false;
                }
                KeyCode::Char('g') => {
                    self.state.player_filter.bucket = next_bucket(self.state.player_filter.bucket);
                    self.state.player_selected = 0;
                }
                KeyCode::Char('m') => self.state.player_metric = self.state.player_metric.next(),
                KeyCode::Char('M') => self.state.player_metric = self.state.player_metric.prev(),
                KeyCode::Char('n') => {
                    self.state.player_filter.min_minutes =
                        if self.state.player_filter.min_minutes > 0.0 {
                            0.0
                        } else {
                            self.state.min_minutes
                        };
                    self.state.clamp_selection();
                }
                KeyCode::Enter => self.state.open_player_detail(),
                KeyCode::Esc | KeyCode::Char('b') => self.state.close_player_detail(),
                _ => {}
            },
            Screen::Compare => match key.code {
                KeyCode::Char('x') => {
                    let (x, y) = (self.state.compare_x.next(), self.state.compare_y);
                    self.state.set_compare_metrics(x, y);
                }
                KeyCode::Char('y') => {
                    let (x, y) = (self.state.compare_x, self.state.compare_y.next());
                    self.state.set_compare_metrics(x, y);
                }
                _ => {}
            },
        }
    }

    fn on_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => self.state.player_search_active = false,
            KeyCode::Backspace => {
                self.state.player_filter.search.pop();
                self.state.player_selected = 0;
            }
            KeyCode::Char(c) => {
                self.state.player_filter.search.push(c);
                self.state.player_selected = 0;
            }
            _ => {}
        }
    }

    fn on_picker_key(&mut self, key: KeyEvent) {
        let names: Vec<String> = self.state.team_names.ready().cloned().unwrap_or_default();
        let Some(current) = self.state.team_picker else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.state.team_picker = None,
            KeyCode::Char('j') | KeyCode::Down => {
                if current + 1 < names.len() {
                    self.state.team_picker = Some(current + 1);
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.state.team_picker = Some(current.saturating_sub(1));
            }
            KeyCode::Enter => {
                self.state.team_picker = None;
                if let Some(team) = names.get(current) {
                    self.choose_team(team);
                }
            }
            _ => {}
        }
    }

    fn choose_team(&mut self, team: &str) {
        self.state.select_team(team);
        persist::save_from_state(&self.state);
    }

    fn on_mouse(&mut self, mouse: MouseEvent) {
        if self.state.screen != Screen::League {
            return;
        }
        let now = Instant::now();
        let hit = |rect: Rect| {
            mouse.column >= rect.x
                && mouse.column < rect.x + rect.width
                && mouse.row >= rect.y
                && mouse.row < rect.y + rect.height
        };
        let over_upcoming = hit(self.upcoming_strip.get());
        let over_recents = hit(self.recents_strip.get());
        match mouse.kind {
            MouseEventKind::Moved => {
                hover_or_leave(&mut self.state.upcoming_carousel, over_upcoming, now);
                hover_or_leave(&mut self.state.recents_carousel, over_recents, now);
            }
            MouseEventKind::ScrollDown | MouseEventKind::ScrollRight => {
                if over_upcoming {
                    self.state.upcoming_carousel.scroll_by(1);
                } else if over_recents {
                    self.state.recents_carousel.scroll_by(1);
                }
            }
            MouseEventKind::ScrollUp | MouseEventKind::ScrollLeft => {
                if over_upcoming {
                    self.state.upcoming_carousel.scroll_by(-1);
                } else if over_recents {
                    self.state.recents_carousel.scroll_by(-1);
                }
            }
            _ => {}
        }
    }
}

fn hover_or_leave(carousel: &mut Carousel, over: bool, now: Instant) {
    if over && !carousel.is_hovered() {
        carousel.hover(now);
    } else if !over && carousel.is_hovered() {
        carousel.leave(now);
    }
}

fn first_visible<'a>(carousel: &Carousel, list: &'a [Fixture]) -> Option<&'a Fixture> {
    carousel.visible(1).first().and_then(|idx| list.get(*idx))
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = AppConfig::from_env();
    let client = ApiClient::new(&config)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let provider = spawn_provider(client, config.fetch_parallelism, tx, cmd_rx);

    let mut app = App::new(&config, Some(cmd_tx.clone()));
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    persist::save_from_state(&app.state);
    let _ = cmd_tx.send(ProviderCommand::Shutdown);
    drop(app);
    let _ = provider.join();

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }
        app.dispatch_wanted();
        app.state.tick(Instant::now());

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.on_key(key),
                Event::Mouse(mouse) => app.on_mouse(mouse),
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let pal = palette(app.state.theme);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(frame.size());

    frame.render_widget(
        Paragraph::new(header_line(&app.state, &pal)).block(Block::default().borders(Borders::BOTTOM)),
        chunks[0],
    );

    match app.state.screen {
        Screen::League => render_league(frame, chunks[1], app, &pal),
        Screen::Team => render_team(frame, chunks[1], &app.state, &pal),
        Screen::Match => render_match(frame, chunks[1], &app.state, &pal),
        Screen::Players => render_players(frame, chunks[1], &app.state, &pal),
        Screen::Compare => render_compare(frame, chunks[1], &app.state, &pal),
    }

    let console = Paragraph::new(console_text(&app.state))
        .style(Style::default().fg(pal.muted))
        .block(Block::default().borders(Borders::TOP).title("Console"));
    frame.render_widget(console, chunks[2]);

    frame.render_widget(
        Paragraph::new(footer_text(&app.state)).style(Style::default().fg(pal.muted)),
        chunks[3],
    );

    if app.state.team_picker.is_some() {
        render_team_picker(frame, frame.size(), &app.state, &pal);
    }
    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_line(state: &AppState, pal: &Palette) -> Line<'static> {
    let mut spans = vec![Span::styled(
        " EPL TERMINAL ",
        Style::default().fg(pal.accent).add_modifier(Modifier::BOLD),
    )];
    for (idx, screen) in Screen::ALL.iter().enumerate() {
        let style = if *screen == state.screen {
            Style::default().fg(pal.fg).add_modifier(Modifier::REVERSED)
        } else {
            Style::default().fg(pal.muted)
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(format!("{} {}", idx + 1, screen.title()), style));
    }
    if let Some(team) = &state.selected_team {
        spans.push(Span::styled(format!("  | {team}"), Style::default().fg(pal.fg)));
    }
    Line::from(spans)
}

fn footer_text(state: &AppState) -> String {
    let keys = match state.screen {
        Screen::League => "Enter Team | m Leaders stat | p Pause | [ ] Scroll | o Open result",
        Screen::Team => "/ Pick team | f Focus | x Metric | c Direction | Enter Match",
        Screen::Match => "b/Esc Back",
        Screen::Players => "/ Search | g Position | m/M Metric | n Min mins | Enter Detail",
        Screen::Compare => "x X-axis | y Y-axis",
    };
    format!(" {keys} | Tab Screen | r Refresh | t Theme | ? Help | q Quit")
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(2)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

/// Placeholder text for panels that have nothing to draw yet.
fn status_paragraph<T>(
    loadable: &Loadable<T>,
    what: &str,
    pal: &Palette,
) -> Option<Paragraph<'static>> {
    match loadable {
        Loadable::Ready(_) => None,
        Loadable::Idle => Some(
            Paragraph::new(format!("No {what} yet")).style(Style::default().fg(pal.muted)),
        ),
        Loadable::Loading => Some(
            Paragraph::new(format!("Loading {what}...")).style(Style::default().fg(pal.muted)),
        ),
        Loadable::Failed(msg) => Some(
            Paragraph::new(format!("Could not load {what}: {msg}"))
                .style(Style::default().fg(pal.bad))
                .wrap(Wrap { trim: true }),
        ),
    }
}

fn panel_block(title: String, focused: bool, pal: &Palette) -> Block<'static> {
    let style = if focused {
        Style::default().fg(pal.accent)
    } else {
        Style::default().fg(pal.muted)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(title)
}

fn render_loadable<T>(
    frame: &mut Frame,
    area: Rect,
    block: Block<'static>,
    loadable: &Loadable<T>,
    what: &str,
    pal: &Palette,
) -> Option<Rect> {
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if let Some(status) = status_paragraph(loadable, what, pal) {
        frame.render_widget(status, inner);
        return None;
    }
    Some(inner)
}

fn short_name(name: &str) -> String {
    let words: Vec<&str> = name.split_whitespace().collect();
    let raw: String = match words.as_slice() {
        [] => String::new(),
        [one] => one.chars().take(3).collect(),
        [first, .., last] => first
            .chars()
            .take(1)
            .chain(last.chars().take(2))
            .collect(),
    };
    raw.to_uppercase()
}

fn render_league(frame: &mut Frame, area: Rect, app: &App, pal: &Palette) {
    let state = &app.state;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Min(5),
        ])
        .split(area);

    app.upcoming_strip.set(rows[0]);
    app.recents_strip.set(rows[1]);
    render_strip(
        frame,
        rows[0],
        "Upcoming",
        &state.upcoming,
        &state.upcoming_carousel,
        state.utc_offset_hours,
        pal,
    );
    render_strip(
        frame,
        rows[1],
        "Results",
        &state.recents,
        &state.recents_carousel,
        state.utc_offset_hours,
        pal,
    );

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(rows[2]);
    render_standings(frame, cols[0], state, pal);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(cols[1]);
    render_leaders(frame, side[0], state, pal);
    render_position_trend(frame, side[1], state, pal);
}

fn render_strip(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    fixtures: &Loadable<Vec<Fixture>>,
    carousel: &Carousel,
    offset_hours: i32,
    pal: &Palette,
) {
    let paused = carousel.phase() == CarouselPhase::Paused;
    let title = if paused {
        format!("{title} (paused)")
    } else {
        title.to_string()
    };
    let block = panel_block(title, false, pal);
    let Some(inner) = render_loadable(frame, area, block, fixtures, "fixtures", pal) else {
        return;
    };
    let Some(list) = fixtures.ready() else {
        return;
    };
    if list.is_empty() {
        frame.render_widget(
            Paragraph::new("Nothing scheduled").style(Style::default().fg(pal.muted)),
            inner,
        );
        return;
    }

    let card_width = CARD_STEP as u16;
    let count = (inner.width / card_width).max(1) as usize;
    for (slot, idx) in carousel.visible(count).into_iter().enumerate() {
        let Some(fixture) = list.get(idx) else {
            continue;
        };
        let rect = Rect {
            x: inner.x + slot as u16 * card_width,
            y: inner.y,
            width: card_width.min(inner.width.saturating_sub(slot as u16 * card_width)),
            height: inner.height,
        };
        let top = if fixture.is_result {
            format!(
                "{} {}-{} {}",
                short_name(&fixture.home),
                fixture.home_goals,
                fixture.away_goals,
                short_name(&fixture.away)
            )
        } else {
            format!("{} v {}", short_name(&fixture.home), short_name(&fixture.away))
        };
        let bottom = if fixture.is_result {
            format!(
                "{} xG {:.1}-{:.1}",
                format_day_month(&fixture.kickoff, offset_hours),
                fixture.home_xg,
                fixture.away_xg
            )
        } else {
            format!(
                "{} {}",
                format_day_month(&fixture.kickoff, offset_hours),
                format_time(&fixture.kickoff, offset_hours)
            )
        };
        let card = Paragraph::new(vec![
            Line::styled(top, Style::default().fg(pal.fg).add_modifier(Modifier::BOLD)),
            Line::styled(bottom, Style::default().fg(pal.muted)),
        ]);
        frame.render_widget(card, rect);
    }
}

fn render_standings(frame: &mut Frame, area: Rect, state: &AppState, pal: &Palette) {
    let block = panel_block("Table".to_string(), true, pal);
    let Some(inner) = render_loadable(frame, area, block, &state.standings, "standings", pal)
    else {
        return;
    };
    let Some(table) = state.standings.ready() else {
        return;
    };

    let visible = inner.height.saturating_sub(1) as usize;
    let (start, end) = visible_range(state.standings_selected, table.len(), visible);
    let rows: Vec<Row> = table[start..end]
        .iter()
        .enumerate()
        .map(|(offset, ranked)| {
            let r = &ranked.record;
            let style = if start + offset == state.standings_selected {
                Style::default().fg(pal.fg).bg(pal.selected_bg)
            } else {
                Style::default().fg(pal.fg)
            };
            Row::new(vec![
                ranked.rank.to_string(),
                r.name.clone(),
                r.matches.to_string(),
                r.wins.to_string(),
                r.draws.to_string(),
                r.losses.to_string(),
                format!("{:+}", r.goal_difference()),
                r.points.to_string(),
                format!("{:.1}", r.xg),
                format!("{:.1}", r.xga),
                format!("{:+.1}", r.points as f64 - r.xpts),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(3),
        Constraint::Min(14),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(4),
        Constraint::Length(4),
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Length(6),
    ];
    let header = Row::new(vec![
        "#", "Team", "M", "W", "D", "L", "GD", "Pts", "xG", "xGA", "Pts-xP",
    ])
    .style(Style::default().fg(pal.accent));
    frame.render_widget(Table::new(rows, widths).header(header), inner);
}

fn render_leaders(frame: &mut Frame, area: Rect, state: &AppState, pal: &Palette) {
    let title = format!("Leaders: {}", state.leaders_metric.label());
    let block = panel_block(title, false, pal);
    let Some(inner) = render_loadable(frame, area, block, &state.leaders, "leaders", pal) else {
        return;
    };
    let Some(rows) = state.leaders.ready() else {
        return;
    };
    let lines: Vec<Line> = rows
        .iter()
        .take(inner.height as usize)
        .enumerate()
        .map(|(idx, p)| {
            let value = epl_terminal::players::metric_value(p, state.leaders_metric);
            Line::from(vec![
                Span::styled(format!("{:>2}. ", idx + 1), Style::default().fg(pal.muted)),
                Span::styled(format!("{:<22}", p.name), Style::default().fg(pal.fg)),
                Span::styled(format!("{:<5}", short_name(&p.team)), Style::default().fg(pal.muted)),
                Span::styled(format!("{value:>6.1}"), Style::default().fg(pal.accent)),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_position_trend(frame: &mut Frame, area: Rect, state: &AppState, pal: &Palette) {
    let team = state.selected_standing().map(|t| t.record.name.clone());
    let title = match &team {
        Some(name) => format!("Position by round: {name}"),
        None => "Position by round".to_string(),
    };
    let block = panel_block(title, false, pal);
    let Some(inner) = render_loadable(frame, area, block, &state.recents, "results", pal) else {
        return;
    };
    let series = team
        .as_deref()
        .and_then(|name| state.weekly.iter().find(|s| s.team == name));
    let Some(series) = series.filter(|s| !s.positions.is_empty()) else {
        frame.render_widget(
            Paragraph::new("Not enough results").style(Style::default().fg(pal.muted)),
            inner,
        );
        return;
    };

    let teams = state.weekly.len().max(1) as f64;
    let points: Vec<(f64, f64)> = series
        .positions
        .iter()
        .enumerate()
        .map(|(round, pos)| ((round + 1) as f64, teams + 1.0 - *pos as f64))
        .collect();
    let last = series.positions.last().copied().unwrap_or(0);
    let datasets = vec![
        Dataset::default()
            .name(format!("now {last}"))
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(pal.accent))
            .data(&points),
    ];
    let rounds = series.positions.len() as f64;
    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .bounds([1.0, rounds.max(2.0)])
                .style(Style::default().fg(pal.muted)),
        )
        .y_axis(
            Axis::default()
                .bounds([1.0, teams])
                .labels(vec![
                    Span::raw(format!("{}", teams as u32)),
                    Span::raw("1"),
                ])
                .style(Style::default().fg(pal.muted)),
        );
    frame.render_widget(chart, inner);
}

fn render_team(frame: &mut Frame, area: Rect, state: &AppState, pal: &Palette) {
    let Some(team) = state.selected_team.as_deref() else {
        frame.render_widget(
            Paragraph::new("No team selected. Press / to pick one.")
                .style(Style::default().fg(pal.muted)),
            area,
        );
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(5)])
        .split(area);
    frame.render_widget(
        Paragraph::new(team_summary(state, team, pal)),
        rows[0],
    );

    let halves = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(halves[0]);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(halves[1]);

    render_team_fixtures(frame, top[0], state, team, pal);
    render_situations(frame, top[1], state, pal);
    render_heatmap(frame, bottom[0], state, pal);
    render_team_style(frame, bottom[1], state, pal);
}

fn team_summary(state: &AppState, team: &str, pal: &Palette) -> Vec<Line<'static>> {
    let record = state
        .standings
        .ready()
        .and_then(|table| table.iter().find(|t| t.record.name == team));
    let headline = match record {
        Some(ranked) => {
            let r = &ranked.record;
            format!(
                "{team}  #{}  {} pts  W{} D{} L{}  GF {} GA {}  xG {:.1} xGA {:.1}  PPDA {:.1}",
                ranked.rank,
                r.points,
                r.wins,
                r.draws,
                r.losses,
                r.goals_for,
                r.goals_against,
                r.xg,
                r.xga,
                r.ppda
            )
        }
        None => team.to_string(),
    };

    let mut form_spans = vec![Span::styled("Form ", Style::default().fg(pal.muted))];
    if let Some(results) = state.team_results.ready() {
        for entry in form_guide(team, results, FORM_LENGTH) {
            let color = match entry.outcome {
                epl_terminal::standings::Outcome::Win => pal.good,
                epl_terminal::standings::Outcome::Draw => pal.muted,
                epl_terminal::standings::Outcome::Loss => pal.bad,
            };
            form_spans.push(Span::styled(
                format!("{} ", entry.outcome.letter()),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ));
        }
    }

    vec![
        Line::styled(headline, Style::default().fg(pal.fg).add_modifier(Modifier::BOLD)),
        Line::from(form_spans),
    ]
}

fn render_team_fixtures(frame: &mut Frame, area: Rect, state: &AppState, team: &str, pal: &Palette) {
    let focused = state.team_focus == TeamFocus::Overview;
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let block = panel_block("Results".to_string(), focused, pal);
    if let Some(inner) = render_loadable(frame, cols[0], block, &state.team_results, "results", pal)
        && let Some(results) = state.team_results.ready()
    {
        let visible = inner.height as usize;
        let (start, end) = visible_range(state.team_results_selected, results.len(), visible);
        let lines: Vec<Line> = results[start..end]
            .iter()
            .enumerate()
            .map(|(offset, f)| {
                let home = f.home == team;
                let opponent = if home { &f.away } else { &f.home };
                let (gf, ga) = if home {
                    (f.home_goals, f.away_goals)
                } else {
                    (f.away_goals, f.home_goals)
                };
                let color = match gf.cmp(&ga) {
                    std::cmp::Ordering::Greater => pal.good,
                    std::cmp::Ordering::Less => pal.bad,
                    std::cmp::Ordering::Equal => pal.muted,
                };
                let mut style = Style::default().fg(color);
                if start + offset == state.team_results_selected {
                    style = style.bg(pal.selected_bg);
                }
                Line::styled(
                    format!(
                        "{} {} {}-{} {}",
                        format_day_month(&f.kickoff, state.utc_offset_hours),
                        if home { "v" } else { "@" },
                        gf,
                        ga,
                        short_name(opponent)
                    ),
                    style,
                )
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    let block = panel_block("Next".to_string(), focused, pal);
    if let Some(inner) =
        render_loadable(frame, cols[1], block, &state.team_upcoming, "fixtures", pal)
        && let Some(upcoming) = state.team_upcoming.ready()
    {
        let lines: Vec<Line> = upcoming
            .iter()
            .take(inner.height as usize)
            .map(|f| {
                let home = f.home == team;
                let opponent = if home { &f.away } else { &f.home };
                Line::styled(
                    format!(
                        "{} {} {}",
                        format_kickoff(&f.kickoff, state.utc_offset_hours),
                        if home { "v" } else { "@" },
                        short_name(opponent)
                    ),
                    Style::default().fg(pal.fg),
                )
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

fn render_situations(frame: &mut Frame, area: Rect, state: &AppState, pal: &Palette) {
    let focused = state.team_focus == TeamFocus::Situations;
    let title = format!("Situations: {} for / against", state.split_metric.label());
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let block = panel_block(title, focused, pal);
    if let Some(inner) =
        render_loadable(frame, rows[0], block, &state.team_situations, "situations", pal)
        && let Some(splits) = state.team_situations.ready()
    {
        let bars = mirrored_series(splits, state.split_metric);
        let peak = bars
            .iter()
            .map(|b| b.for_value.max(-b.against_value))
            .fold(0.0f64, f64::max);
        let half = (inner.width.saturating_sub(14) / 2).max(1) as f64;
        let lines: Vec<Line> = bars
            .iter()
            .take(inner.height as usize)
            .map(|bar| {
                let scale = |v: f64| {
                    if peak <= 0.0 {
                        0
                    } else {
                        ((v.abs() / peak) * half).round() as usize
                    }
                };
                let against = scale(bar.against_value);
                let for_len = scale(bar.for_value);
                Line::from(vec![
                    Span::styled(format!("{:<11}", bar.label), Style::default().fg(pal.fg)),
                    Span::raw(" ".repeat(half as usize - against.min(half as usize))),
                    Span::styled("█".repeat(against), Style::default().fg(pal.bad)),
                    Span::styled("│", Style::default().fg(pal.muted)),
                    Span::styled("█".repeat(for_len), Style::default().fg(pal.good)),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    let block = panel_block("Formations".to_string(), focused, pal);
    if let Some(inner) =
        render_loadable(frame, rows[1], block, &state.team_formations, "formations", pal)
        && let Some(formations) = state.team_formations.ready()
    {
        let table_rows: Vec<Row> = formations
            .iter()
            .map(|f| {
                Row::new(vec![
                    f.formation.clone(),
                    format!("{:.0}", f.minutes),
                    format!("{:.1}", f.for_side.xg),
                    format!("{:.1}", f.against.xg),
                    format!("{:.0}-{:.0}", f.for_side.goals, f.against.goals),
                ])
            })
            .collect();
        let widths = [
            Constraint::Length(10),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(7),
        ];
        let header = Row::new(vec!["Shape", "Mins", "xG", "xGA", "Goals"])
            .style(Style::default().fg(pal.accent));
        frame.render_widget(Table::new(table_rows, widths).header(header), inner);
    }
}

fn render_heatmap(frame: &mut Frame, area: Rect, state: &AppState, pal: &Palette) {
    let focused = state.team_focus == TeamFocus::Heatmap;
    let direction = match state.heatmap_convention {
        HalfConvention::Attacked => "goal left",
        HalfConvention::Defended => "goal right",
    };
    let block = panel_block(format!("Shot map xG ({direction})"), focused, pal);
    let Some(inner) = render_loadable(frame, area, block, &state.team_shots, "shots", pal) else {
        return;
    };
    let Some(grid) = state.heatmap.as_ref().filter(|g| !g.is_empty()) else {
        frame.render_widget(
            Paragraph::new("No shots recorded").style(Style::default().fg(pal.muted)),
            inner,
        );
        return;
    };
    frame.render_widget(Paragraph::new(heatmap_lines(grid, inner, pal)), inner);
}

fn heatmap_lines(grid: &HeatmapGrid, area: Rect, pal: &Palette) -> Vec<Line<'static>> {
    const SHADES: [&str; 5] = [" ", "░", "▒", "▓", "█"];
    let (w, h) = (area.width.max(1) as usize, area.height.max(1) as usize);
    (0..h)
        .map(|r| {
            let spans: Vec<Span> = (0..w)
                .map(|c| {
                    let col = c * grid.cols / w;
                    let row = r * grid.rows / h;
                    let intensity = grid.intensity(col, row);
                    let level = if intensity <= 0.0 {
                        0
                    } else {
                        1 + ((intensity / INTENSITY_CEILING) * 3.0).round().min(3.0) as usize
                    };
                    let color = if level >= 3 { pal.bad } else { pal.accent };
                    Span::styled(SHADES[level], Style::default().fg(color))
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

fn render_team_style(frame: &mut Frame, area: Rect, state: &AppState, pal: &Palette) {
    let focused = state.team_focus == TeamFocus::Style;
    let block = panel_block("Style".to_string(), focused, pal);
    let Some(inner) = render_loadable(frame, area, block, &state.team_style, "style", pal) else {
        return;
    };
    let Some(style) = state.team_style.ready() else {
        return;
    };
    frame.render_widget(style_paragraph(style, inner, pal), inner);
}

fn style_paragraph(
    style: &epl_terminal::model::StyleMetrics,
    area: Rect,
    pal: &Palette,
) -> Paragraph<'static> {
    if style.values.is_empty() {
        return Paragraph::new("No style data").style(Style::default().fg(pal.muted));
    }
    let lines: Vec<Line> = style
        .values
        .iter()
        .take(area.height as usize * 2)
        .map(|(name, value)| {
            Line::from(vec![
                Span::styled(format!("{name:<28}"), Style::default().fg(pal.muted)),
                Span::styled(format!("{value:>9.2}"), Style::default().fg(pal.fg)),
            ])
        })
        .collect();
    Paragraph::new(lines)
}

fn render_match(frame: &mut Frame, area: Rect, state: &AppState, pal: &Palette) {
    if state.match_id.is_none() {
        frame.render_widget(
            Paragraph::new("Open a result from the League or Team screen.")
                .style(Style::default().fg(pal.muted)),
            area,
        );
        return;
    }
    let block = panel_block("Match center".to_string(), true, pal);
    let Some(inner) = render_loadable(frame, area, block, &state.match_center, "match", pal) else {
        return;
    };
    let Some(center) = state.match_center.ready() else {
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Percentage(45),
            Constraint::Min(4),
        ])
        .split(inner);

    let (home_goals, away_goals) = center.score();
    let mut header = vec![Line::styled(
        format!(
            "{} {} - {} {}",
            center.team(TeamSide::Home),
            home_goals,
            away_goals,
            center.team(TeamSide::Away)
        ),
        Style::default().fg(pal.fg).add_modifier(Modifier::BOLD),
    )];
    if let Some(info) = &center.info {
        header.push(Line::styled(
            format!(
                "{}  forecast H {:.0}% D {:.0}% A {:.0}%",
                format_date(&info.date, state.utc_offset_hours),
                info.home_win_prob * 100.0,
                info.draw_prob * 100.0,
                info.away_win_prob * 100.0
            ),
            Style::default().fg(pal.muted),
        ));
    }
    frame.render_widget(Paragraph::new(header), rows[0]);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(rows[1]);

    let mut lines: Vec<Line> = Vec::new();
    if let Some(info) = &center.info {
        for stat in stat_lines(info) {
            lines.push(Line::from(format!(
                "{:>6}  {:<10} {:<6}",
                stat.home, stat.name, stat.away
            )));
        }
        lines.push(Line::raw(""));
    }
    for goal in &center.goals {
        let side = match goal.side {
            TeamSide::Home => "H",
            TeamSide::Away => "A",
        };
        let tag = if goal.own_goal { " (og)" } else { "" };
        lines.push(Line::styled(
            format!("{:>3}' {side} {}{tag}", goal.minute, goal.scorer),
            Style::default().fg(pal.good),
        ));
    }
    frame.render_widget(Paragraph::new(lines), middle[0]);

    let home: Vec<(f64, f64)> = center
        .timeline
        .iter()
        .map(|p| (p.minute as f64, p.home))
        .collect();
    let away: Vec<(f64, f64)> = center
        .timeline
        .iter()
        .map(|p| (p.minute as f64, p.away))
        .collect();
    let last = center.timeline.last().copied();
    let max_xg = last.map_or(1.0, |p| p.home.max(p.away)).max(1.0);
    let max_minute = last.map_or(90.0, |p| (p.minute as f64).max(90.0));
    let chart = Chart::new(vec![
        Dataset::default()
            .name(short_name(center.team(TeamSide::Home)))
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(pal.accent))
            .data(&home),
        Dataset::default()
            .name(short_name(center.team(TeamSide::Away)))
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(pal.bad))
            .data(&away),
    ])
    .block(Block::default().title("Cumulative xG"))
    .x_axis(
        Axis::default()
            .bounds([0.0, max_minute])
            .labels(vec![Span::raw("0'"), Span::raw(format!("{max_minute:.0}'"))])
            .style(Style::default().fg(pal.muted)),
    )
    .y_axis(
        Axis::default()
            .bounds([0.0, max_xg])
            .labels(vec![Span::raw("0"), Span::raw(format!("{max_xg:.1}"))])
            .style(Style::default().fg(pal.muted)),
    );
    frame.render_widget(chart, middle[1]);

    let (home_roster, away_roster) = roster_by_side(&center.roster);
    let sides = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[2]);
    for (side_area, roster) in [(sides[0], home_roster), (sides[1], away_roster)] {
        let table_rows: Vec<Row> = roster
            .iter()
            .map(|p| {
                Row::new(vec![
                    p.position.clone(),
                    p.player.clone(),
                    p.minutes.to_string(),
                    p.goals.to_string(),
                    p.assists.to_string(),
                    format!("{:.2}", p.xg),
                    format!("{:.2}", p.xa),
                ])
            })
            .collect();
        let widths = [
            Constraint::Length(4),
            Constraint::Min(14),
            Constraint::Length(4),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(5),
            Constraint::Length(5),
        ];
        let header = Row::new(vec!["Pos", "Player", "Min", "G", "A", "xG", "xA"])
            .style(Style::default().fg(pal.accent));
        frame.render_widget(Table::new(table_rows, widths).header(header), side_area);
    }
}

fn render_players(frame: &mut Frame, area: Rect, state: &AppState, pal: &Palette) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(if state.player_detail_open {
            [Constraint::Percentage(55), Constraint::Percentage(45)]
        } else {
            [Constraint::Percentage(100), Constraint::Percentage(0)]
        })
        .split(area);

    let bucket = state
        .player_filter
        .bucket
        .map(PositionBucket::short)
        .unwrap_or("All");
    let search = if state.player_search_active {
        format!(" search: {}_", state.player_filter.search)
    } else if state.player_filter.search.is_empty() {
        String::new()
    } else {
        format!(" search: {}", state.player_filter.search)
    };
    let title = format!(
        "Players [{bucket}] by {}{}{search}",
        state.player_metric.label(),
        if state.player_filter.min_minutes > 0.0 {
            format!(" ({}+ mins)", state.player_filter.min_minutes)
        } else {
            String::new()
        }
    );
    let block = panel_block(title, true, pal);
    let Some(inner) = render_loadable(frame, cols[0], block, &state.player_pool, "players", pal)
    else {
        if let Some(progress) = &state.player_pool_progress {
            let text = format!(
                "Loading squads {}/{} ({})",
                progress.current, progress.total, progress.message
            );
            let rect = Rect {
                y: cols[0].y + 2,
                height: 1,
                ..cols[0]
            };
            frame.render_widget(
                Paragraph::new(text).style(Style::default().fg(pal.muted)),
                rect,
            );
        }
        return;
    };

    let rows = state.explorer_rows();
    let visible = inner.height.saturating_sub(1) as usize;
    let (start, end) = visible_range(state.player_selected, rows.len(), visible);
    let table_rows: Vec<Row> = rows[start..end]
        .iter()
        .enumerate()
        .map(|(offset, p)| {
            let style = if start + offset == state.player_selected {
                Style::default().fg(pal.fg).bg(pal.selected_bg)
            } else {
                Style::default().fg(pal.fg)
            };
            Row::new(vec![
                p.name.clone(),
                short_name(&p.team),
                p.bucket().map(PositionBucket::short).unwrap_or("-").to_string(),
                format!("{:.0}", p.minutes),
                format!(
                    "{:.2}",
                    epl_terminal::players::metric_value(p, state.player_metric)
                ),
            ])
            .style(style)
        })
        .collect();
    let widths = [
        Constraint::Min(18),
        Constraint::Length(5),
        Constraint::Length(3),
        Constraint::Length(6),
        Constraint::Length(8),
    ];
    let header = Row::new(vec!["Player", "Team", "Pos", "Mins", "Value"])
        .style(Style::default().fg(pal.accent));
    frame.render_widget(Table::new(table_rows, widths).header(header), inner);

    if state.player_detail_open {
        render_player_detail(frame, cols[1], state, pal);
    }
}

fn render_player_detail(frame: &mut Frame, area: Rect, state: &AppState, pal: &Palette) {
    let Some(player) = state.selected_player() else {
        return;
    };
    let Some(pool) = state.player_pool.ready() else {
        return;
    };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(13), Constraint::Min(3)])
        .split(area);

    let profile = percentile_profile(player, pool, &PlayerMetric::PROFILE, state.min_minutes);
    let peers = match profile.peers {
        epl_terminal::players::PeerGroup::Position(bucket) => bucket.short().to_string(),
        epl_terminal::players::PeerGroup::League => "league".to_string(),
    };
    let block = panel_block(
        format!("{} vs {} peers ({})", player.name, peers, profile.peer_count),
        true,
        pal,
    );
    let inner = block.inner(rows[0]);
    frame.render_widget(block, rows[0]);
    let bar_width = inner.width.saturating_sub(26) as f64;
    let lines: Vec<Line> = profile
        .entries
        .iter()
        .map(|entry| {
            let filled = (entry.percentile * bar_width).round() as usize;
            let color = if entry.percentile >= 0.8 {
                pal.good
            } else if entry.percentile <= 0.2 {
                pal.bad
            } else {
                pal.accent
            };
            Line::from(vec![
                Span::styled(
                    format!("{:<13}", entry.metric.label()),
                    Style::default().fg(pal.muted),
                ),
                Span::styled(format!("{:>6.2} ", entry.value), Style::default().fg(pal.fg)),
                Span::styled("█".repeat(filled), Style::default().fg(color)),
                Span::styled(
                    format!(" {:.0}", entry.percentile * 100.0),
                    Style::default().fg(pal.fg),
                ),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);

    let block = panel_block("Style".to_string(), false, pal);
    if let Some(inner) = render_loadable(frame, rows[1], block, &state.player_style, "style", pal)
        && let Some(style) = state.player_style.ready()
    {
        frame.render_widget(style_paragraph(style, inner, pal), inner);
    }
}

fn render_compare(frame: &mut Frame, area: Rect, state: &AppState, pal: &Palette) {
    let title = format!(
        "{} (x) vs {} (y)",
        state.compare_x.label(),
        state.compare_y.label()
    );
    let block = panel_block(title, true, pal);
    let Some(inner) = render_loadable(frame, area, block, &state.standings, "standings", pal)
    else {
        return;
    };
    let Some(table) = state.standings.ready() else {
        return;
    };

    let needs_detail = state.compare_x.needs_detail() || state.compare_y.needs_detail();
    if needs_detail && let Some(status) = status_paragraph(&state.compare_detail, "team detail", pal)
    {
        let status = match &state.compare_progress {
            Some(p) if state.compare_detail.is_loading() => Paragraph::new(format!(
                "Loading team detail {}/{} ({})",
                p.current, p.total, p.message
            ))
            .style(Style::default().fg(pal.muted)),
            _ => status,
        };
        frame.render_widget(status, inner);
        return;
    }

    let records: Vec<_> = table.iter().map(|t| t.record.clone()).collect();
    let empty = std::collections::HashMap::new();
    let details = state.compare_detail.ready().unwrap_or(&empty);
    let scatter = build_scatter(&records, details, state.compare_x, state.compare_y);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(5)])
        .split(inner);
    frame.render_widget(
        Paragraph::new(format!(
            "r = {:.2}   trend y = {:.3}x {:+.3}   n = {}",
            scatter.correlation,
            scatter.trend.slope,
            scatter.trend.intercept,
            scatter.points.len()
        ))
        .style(Style::default().fg(pal.fg)),
        rows[0],
    );

    let (x_lo, x_hi) = scatter.x_bounds();
    let (y_lo, y_hi) = scatter.y_bounds();
    let points: Vec<(f64, f64)> = scatter.points.iter().map(|p| (p.x, p.y)).collect();
    let trend: Vec<(f64, f64)> = (0..=40)
        .map(|i| {
            let x = x_lo + (x_hi - x_lo) * i as f64 / 40.0;
            (x, scatter.trend.predict(x))
        })
        .filter(|(_, y)| *y >= y_lo && *y <= y_hi)
        .collect();
    let chart = Chart::new(vec![
        Dataset::default()
            .name("teams")
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(pal.accent))
            .data(&points),
        Dataset::default()
            .name("trend")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(pal.muted))
            .data(&trend),
    ])
    .x_axis(
        Axis::default()
            .title(state.compare_x.label())
            .bounds([x_lo, x_hi])
            .labels(vec![
                Span::raw(format!("{x_lo:.2}")),
                Span::raw(format!("{x_hi:.2}")),
            ])
            .style(Style::default().fg(pal.muted)),
    )
    .y_axis(
        Axis::default()
            .title(state.compare_y.label())
            .bounds([y_lo, y_hi])
            .labels(vec![
                Span::raw(format!("{y_lo:.2}")),
                Span::raw(format!("{y_hi:.2}")),
            ])
            .style(Style::default().fg(pal.muted)),
    );
    frame.render_widget(chart, rows[1]);
}

fn render_team_picker(frame: &mut Frame, area: Rect, state: &AppState, pal: &Palette) {
    let popup = centered_rect(40, 70, area);
    frame.render_widget(Clear, popup);
    let block = panel_block("Pick team".to_string(), true, pal);
    let Some(inner) = render_loadable(frame, popup, block, &state.team_names, "teams", pal) else {
        return;
    };
    let Some(names) = state.team_names.ready() else {
        return;
    };
    let selected = state.team_picker.unwrap_or(0);
    let (start, end) = visible_range(selected, names.len(), inner.height as usize);
    let lines: Vec<Line> = names[start..end]
        .iter()
        .enumerate()
        .map(|(offset, name)| {
            let style = if start + offset == selected {
                Style::default().fg(pal.fg).bg(pal.selected_bg)
            } else {
                Style::default().fg(pal.fg)
            };
            Line::styled(name.clone(), style)
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "EPL Terminal - Help",
        "",
        "Global:",
        "  1-5 / Tab    Switch screen",
        "  j/k or ↑/↓   Move selection",
        "  r            Refresh panels on this screen",
        "  t            Toggle theme",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "League:",
        "  Enter        Open selected team",
        "  m            Cycle leaders stat",
        "  p            Pause/resume fixture strips",
        "  [ / ]        Scroll results strip",
        "  o            Open first visible result",
        "",
        "Team:",
        "  /            Pick team",
        "  f x c        Focus, situation metric, shot direction",
        "  Enter        Open selected result",
        "",
        "Players:",
        "  /            Search by name or team",
        "  g m n        Position, metric, minutes filter",
        "  Enter / Esc  Open / close percentile profile",
        "",
        "Compare:",
        "  x / y        Cycle axis metrics",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
