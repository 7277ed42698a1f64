use std::io;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono_tz::Tz;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::calendar::{CalendarDay, CalendarEvent};
use crate::datefmt;
use crate::feed::PanelView;
use crate::session::{Feed, Session, SessionEvent};
use crate::source::{CalendarSource, TransitSource, WeatherSource};
use crate::transit::{DepartureBoard, DepartureSelection, LineColor, Upcoming};
use crate::weather::{SwitchableWeather, WeatherSnapshot};

const MISSING: &str = "--";

const INPUT_POLL: Duration = Duration::from_millis(250);

pub struct App<T, L, C> {
    session: Session<T, SwitchableWeather<L>, C>,
    weather: Arc<SwitchableWeather<L>>,
    timezone: Tz,
    towards: String,
    should_quit: bool,
}

impl<T, L, C> App<T, L, C>
where
    T: TransitSource,
    L: WeatherSource,
    C: CalendarSource,
{
    /// `weather` must be the same source the session polls.
    pub fn new(
        session: Session<T, SwitchableWeather<L>, C>,
        weather: Arc<SwitchableWeather<L>>,
        timezone: Tz,
        towards: impl Into<String>,
    ) -> Self {
        Self {
            session,
            weather,
            timezone,
            towards: towards.into(),
            should_quit: false,
        }
    }

    pub fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            self.handle_key(key);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('r') => self.session.refresh(Feed::Departures),
            KeyCode::Char('k') => self.session.refresh(Feed::Calendar),
            KeyCode::Char('w') => {
                if let Some(scenario) = self.weather.cycle() {
                    debug!(code = scenario.code, "next weather scenario");
                    self.session.refresh(Feed::Weather);
                }
            }
            KeyCode::Char('l') => {
                if !self.weather.is_live() {
                    info!("switching to live weather");
                    self.weather.go_live();
                    self.session.refresh(Feed::Weather);
                }
            }
            _ => {}
        }
    }
}

enum Wake {
    Input(Option<io::Result<Event>>),
    Session(Option<SessionEvent>),
}

/// Forward terminal events until the receiving side goes away.
fn read_input(tx: mpsc::UnboundedSender<io::Result<Event>>) {
    while !tx.is_closed() {
        let event = match event::poll(INPUT_POLL) {
            Ok(false) => continue,
            Ok(true) => event::read(),
            Err(e) => Err(e),
        };
        let failed = event.is_err();
        if tx.send(event).is_err() || failed {
            return;
        }
    }
}

pub async fn run_app<B, T, L, C>(terminal: &mut Terminal<B>, app: &mut App<T, L, C>) -> io::Result<()>
where
    B: Backend,
    T: TransitSource,
    L: WeatherSource,
    C: CalendarSource,
{
    let (tx, mut input) = mpsc::unbounded_channel();
    let reader = tokio::task::spawn_blocking(move || read_input(tx));

    app.session.activate();
    let result = loop {
        if let Err(e) = terminal.draw(|f| ui(f, app)) {
            break Err(e);
        }
        if app.should_quit {
            break Ok(());
        }

        let wake = tokio::select! {
            event = input.recv() => Wake::Input(event),
            event = app.session.next() => Wake::Session(event),
        };
        match wake {
            Wake::Input(Some(Ok(event))) => app.handle_event(event),
            Wake::Input(Some(Err(e))) => break Err(e),
            Wake::Input(None) | Wake::Session(None) => break Ok(()),
            Wake::Session(Some(_)) => {}
        }
    };

    app.session.deactivate();
    drop(input);
    let _ = reader.await;
    result
}

fn panel(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(Color::Yellow),
        ))
        .title_alignment(Alignment::Left)
        .border_style(Style::default().fg(Color::Cyan))
        .border_type(BorderType::Rounded)
}

fn status_line(text: impl Into<String>, color: Color) -> Paragraph<'static> {
    Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(" {}", text.into()),
            Style::default().fg(color),
        )),
    ])
    .wrap(Wrap { trim: false })
}

fn weather_lines<'a>(weather: &'a WeatherSnapshot, date: String) -> Vec<Line<'a>> {
    let theme = weather.theme();
    let temp = weather
        .temp
        .map(|t| format!("{}°", t.round() as i64))
        .unwrap_or_else(|| MISSING.to_string());
    let humidity = weather
        .humidity
        .map(|h| format!("{}% luftfuktighet", h.round() as i64))
        .unwrap_or_else(|| MISSING.to_string());

    vec![
        Line::from(vec![
            Span::raw(format!(" {} ", theme.icon.glyph(weather.is_day))),
            Span::styled(temp, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::raw(weather.label),
        ]),
        Line::from(format!(" {humidity}  ·  {date}")),
    ]
}

fn display_weather<T, L, C>(f: &mut Frame, area: Rect, app: &App<T, L, C>)
where
    T: TransitSource,
    L: WeatherSource,
    C: CalendarSource,
{
    let mut block = panel("Väder");
    if let Some(scenario) = app.weather.scenario() {
        block = block.title_bottom(Line::from(Span::styled(
            format!(" Dev · {} ", scenario.label),
            Style::default().fg(Color::Magenta),
        )));
    }

    let widget = match app.session.weather().view() {
        PanelView::Loading => status_line("Hämtar väder…", Color::Gray),
        PanelView::Failed(message) => status_line(format!("Väder: {message}"), Color::Red),
        PanelView::Ready(weather) => {
            let theme = weather.theme();
            let today = app.session.now().with_timezone(&app.timezone).date_naive();
            let fg = if theme.light { Color::Black } else { Color::White };
            let mut style = Style::default().fg(fg);
            if let Ok(bg) = Color::from_str(theme.top_color) {
                style = style.bg(bg);
            }
            Paragraph::new(weather_lines(weather, datefmt::short_day(today))).style(style)
        }
    };
    f.render_widget(widget.block(block), area);
}

fn line_color(upcoming: &Upcoming<'_>) -> Color {
    match upcoming.line_color() {
        Some(LineColor::Blue) => Color::Blue,
        Some(LineColor::Red) => Color::Red,
        Some(LineColor::Green) => Color::Green,
        None => Color::Gray,
    }
}

fn delay_label(upcoming: &Upcoming<'_>) -> String {
    match upcoming.delay_minutes() {
        0 => String::new(),
        n => format!("+{n}"),
    }
}

fn headline<'a>(next: &Upcoming<'a>, tz: &Tz) -> Vec<Line<'a>> {
    let departure = next.departure;
    let mut when = vec![
        Span::raw(" "),
        Span::styled(
            departure.line.as_str(),
            Style::default()
                .fg(line_color(next))
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" {} ", departure.destination)),
        Span::styled(
            datefmt::clock(departure.effective(), tz),
            Style::default().fg(Color::Green),
        ),
    ];
    let delay = delay_label(next);
    if !delay.is_empty() {
        when.push(Span::styled(format!(" {delay}"), Style::default().fg(Color::Red)));
    }

    vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(" {}", next.leave_by().label()),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(when),
        Line::from(format!(" Tåget går {}", next.countdown_label())),
    ]
}

fn display_departures<T, L, C>(f: &mut Frame, area: Rect, app: &App<T, L, C>)
where
    T: TransitSource,
    L: WeatherSource,
    C: CalendarSource,
{
    let block = panel(&format!("Nästa mot {}", app.towards));
    let board: &DepartureBoard = match app.session.departures().view_while_refreshing() {
        PanelView::Loading => {
            f.render_widget(status_line("Hämtar avgångar…", Color::Gray).block(block), area);
            return;
        }
        PanelView::Failed(message) => {
            let text = format!("Avgångar: {message}");
            f.render_widget(status_line(text, Color::Red).block(block), area);
            return;
        }
        PanelView::Ready(board) => board,
    };

    let selection: DepartureSelection<'_> = app.session.selection();
    let Some(next) = selection.next() else {
        let text = format!("Ingen tunnelbana mot {} just nu.", app.towards);
        f.render_widget(status_line(text, Color::Gray).block(block), area);
        return;
    };

    let inner = block.inner(area);
    f.render_widget(block, area);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Length(selection.visible.len() as u16 + 1),
            Constraint::Min(0),
        ])
        .split(inner);

    f.render_widget(Paragraph::new(headline(next, &app.timezone)), chunks[0]);

    let rows = selection.visible.iter().map(|upcoming| {
        let departure = upcoming.departure;
        Row::new(vec![
            Cell::from(format!(" {}", departure.line)).style(
                Style::default()
                    .fg(line_color(upcoming))
                    .add_modifier(Modifier::BOLD),
            ),
            Cell::from(departure.destination.as_str()),
            Cell::from(datefmt::clock(departure.effective(), &app.timezone))
                .style(Style::default().fg(Color::Green)),
            Cell::from(delay_label(upcoming)).style(Style::default().fg(Color::Red)),
            Cell::from(upcoming.countdown_label()),
        ])
    });
    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Min(12),
            Constraint::Length(6),
            Constraint::Length(4),
            Constraint::Length(7),
        ],
    )
    .header(
        Row::new(vec![" Linje", "Destination", "Tid", "", "Om"])
            .style(Style::default().add_modifier(Modifier::DIM)),
    );
    f.render_widget(table, chunks[1]);

    let deviations: Vec<Line> = board
        .deviations
        .iter()
        .map(|d| {
            Line::from(Span::styled(
                format!(" ⚠ {}", d.message),
                Style::default().fg(Color::Yellow),
            ))
        })
        .collect();
    f.render_widget(
        Paragraph::new(deviations).wrap(Wrap { trim: true }),
        chunks[2],
    );
}

fn event_time(event: &CalendarEvent, tz: &Tz) -> String {
    if event.all_day {
        "Hela dagen".to_string()
    } else if event.start == event.end {
        datefmt::clock(event.start, tz)
    } else {
        format!(
            "{} – {}",
            datefmt::clock(event.start, tz),
            datefmt::clock(event.end, tz)
        )
    }
}

fn calendar_lines<'a>(day: &'a CalendarDay, tz: &Tz) -> Vec<Line<'a>> {
    let Some(label) = &day.date_label else {
        return vec![Line::from(""), Line::from(" Inga kommande händelser")];
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(" {label}"),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
    ];
    for event in &day.events {
        lines.push(Line::from(vec![
            Span::styled(
                format!(" {:13} ", event_time(event, tz)),
                Style::default().fg(Color::Green),
            ),
            Span::raw(event.summary.as_str()),
        ]));
    }
    lines
}

fn display_calendar<T, L, C>(f: &mut Frame, area: Rect, app: &App<T, L, C>)
where
    T: TransitSource,
    L: WeatherSource,
    C: CalendarSource,
{
    let Some(state) = app.session.calendar() else {
        return;
    };
    let widget = match state.view() {
        PanelView::Loading => status_line("Hämtar kalender…", Color::Gray),
        PanelView::Failed(message) => status_line(message, Color::Red),
        PanelView::Ready(day) => {
            Paragraph::new(calendar_lines(day, &app.timezone)).wrap(Wrap { trim: false })
        }
    };
    f.render_widget(widget.block(panel("Kalender")), area);
}

fn footer<T, L, C>(app: &App<T, L, C>) -> Paragraph<'static>
where
    T: TransitSource,
    L: WeatherSource,
    C: CalendarSource,
{
    let mut keys = vec![("q", "avsluta"), ("r", "avgångar")];
    if app.session.calendar().is_some() {
        keys.push(("k", "kalender"));
    }
    if !app.weather.is_live() {
        keys.push(("w", "nästa väder"));
        keys.push(("l", "live-väder"));
    }

    let mut spans = vec![Span::raw(" ")];
    for (key, action) in keys {
        spans.push(Span::styled(key, Style::default().fg(Color::Cyan)));
        spans.push(Span::raw(format!(" {action}  ")));
    }
    Paragraph::new(Line::from(spans))
}

pub fn ui<T, L, C>(f: &mut Frame, app: &App<T, L, C>)
where
    T: TransitSource,
    L: WeatherSource,
    C: CalendarSource,
{
    let vert_layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(5),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    display_weather(f, vert_layout[0], app);

    if app.session.calendar().is_some() {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(vert_layout[1]);
        display_departures(f, chunks[0], app);
        display_calendar(f, chunks[1], app);
    } else {
        display_departures(f, vert_layout[1], app);
    }

    f.render_widget(footer(app), vert_layout[2]);
}
