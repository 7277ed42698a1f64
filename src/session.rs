//! The dashboard session: owns every feed's state and the timers that poll
//! them.
//!
//! Lifecycle is construct → [`Session::activate`] → drive with
//! [`Session::next`] → [`Session::deactivate`]. Fetches run as spawned tasks
//! and report back over a channel; all state changes happen on the caller's
//! task inside `next`, so there is no shared mutable state to lock.

use std::future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::calendar::CalendarDay;
use crate::error::FeedError;
use crate::feed::{FeedSlot, FeedState, Ticket, Trigger};
use crate::source::{CalendarSource, TransitSource, WeatherSource};
use crate::transit::{resolve_station, DepartureBoard, DepartureSelection, SiteId};
use crate::weather::WeatherSnapshot;

pub const DEPARTURES_INTERVAL: Duration = Duration::from_secs(45);
pub const WEATHER_INTERVAL: Duration = Duration::from_secs(5 * 60);
pub const CALENDAR_INTERVAL: Duration = Duration::from_secs(5 * 60);
/// Refreshes relative labels only; never fetches.
pub const COUNTDOWN_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    Departures,
    Weather,
    Calendar,
}

/// Progress of the one-shot station lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteState {
    Pending,
    Resolved(SiteId),
    /// Departures stay blocked for the rest of the session.
    Failed,
}

/// What a call to [`Session::next`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    SiteResolved(SiteId),
    SiteFailed,
    /// A fetch was started.
    Polled(Feed),
    /// A fetch result was written to the feed's state.
    Applied(Feed),
    /// A fetch result arrived after a newer one had been issued.
    Superseded(Feed),
    Countdown,
}

enum Update {
    Site(Result<SiteId, FeedError>),
    Departures(Ticket, Result<DepartureBoard, FeedError>),
    Weather(Ticket, Result<WeatherSnapshot, FeedError>),
    Calendar(Ticket, Result<CalendarDay, FeedError>),
}

enum Wake {
    Update(Option<Update>),
    Poll(Feed),
    Countdown,
}

struct Timers {
    departures: Option<Interval>,
    weather: Interval,
    calendar: Option<Interval>,
    countdown: Interval,
}

fn timer(period: Duration) -> Interval {
    let mut timer = interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    timer
}

async fn tick(timer: &mut Option<Interval>) {
    match timer {
        Some(t) => {
            t.tick().await;
        }
        None => future::pending().await,
    }
}

pub struct Session<T, W, C> {
    transit: Arc<T>,
    weather_source: Arc<W>,
    calendar_source: Option<Arc<C>>,
    station: String,

    site: SiteState,
    departures: FeedSlot<DepartureBoard>,
    weather: FeedSlot<WeatherSnapshot>,
    calendar: FeedSlot<CalendarDay>,
    now: DateTime<Utc>,

    tx: mpsc::UnboundedSender<Update>,
    rx: mpsc::UnboundedReceiver<Update>,
    /// `Some` while active.
    timers: Option<Timers>,
    stopped: bool,
}

impl<T, W, C> Session<T, W, C>
where
    T: TransitSource,
    W: WeatherSource,
    C: CalendarSource,
{
    pub fn new(
        transit: Arc<T>,
        weather: Arc<W>,
        calendar: Option<Arc<C>>,
        station: impl Into<String>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let calendar_slot = if calendar.is_some() {
            FeedSlot::pending()
        } else {
            FeedSlot::default()
        };
        Self {
            transit,
            weather_source: weather,
            calendar_source: calendar,
            station: station.into(),
            site: SiteState::Pending,
            departures: FeedSlot::pending(),
            weather: FeedSlot::pending(),
            calendar: calendar_slot,
            now: Utc::now(),
            tx,
            rx,
            timers: None,
            stopped: false,
        }
    }

    /// Start the timers and the station lookup. Only the first call counts.
    pub fn activate(&mut self) {
        if self.timers.is_some() || self.stopped {
            return;
        }
        info!(station = %self.station, calendar = self.calendar_source.is_some(), "activating session");

        self.timers = Some(Timers {
            departures: None,
            weather: timer(WEATHER_INTERVAL),
            calendar: self.calendar_source.as_ref().map(|_| timer(CALENDAR_INTERVAL)),
            countdown: timer(COUNTDOWN_INTERVAL),
        });

        let transit = Arc::clone(&self.transit);
        let station = self.station.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = resolve_station(&*transit, &station).await;
            let _ = tx.send(Update::Site(result));
        });
    }

    /// Stop every timer. Fetches still in flight finish, but their results
    /// are thrown away.
    pub fn deactivate(&mut self) {
        if self.timers.take().is_some() {
            info!("deactivating session");
        }
        self.stopped = true;
        self.rx.close();
    }

    pub fn is_active(&self) -> bool {
        self.timers.is_some()
    }

    /// Wait for the next timer or fetch result and apply it.
    ///
    /// Returns `None` once the session is no longer active.
    pub async fn next(&mut self) -> Option<SessionEvent> {
        let wake = {
            let timers = self.timers.as_mut()?;
            tokio::select! {
                update = self.rx.recv() => Wake::Update(update),
                _ = tick(&mut timers.departures) => Wake::Poll(Feed::Departures),
                _ = timers.weather.tick() => Wake::Poll(Feed::Weather),
                _ = tick(&mut timers.calendar) => Wake::Poll(Feed::Calendar),
                _ = timers.countdown.tick() => Wake::Countdown,
            }
        };

        match wake {
            Wake::Update(Some(update)) => Some(self.apply(update)),
            Wake::Update(None) => {
                self.timers = None;
                None
            }
            Wake::Poll(feed) => {
                self.fetch(feed, Trigger::Poll);
                Some(SessionEvent::Polled(feed))
            }
            Wake::Countdown => {
                self.now = Utc::now();
                Some(SessionEvent::Countdown)
            }
        }
    }

    /// User-initiated refresh. Existing data stays until the result lands.
    pub fn refresh(&mut self, feed: Feed) {
        if self.is_active() {
            self.fetch(feed, Trigger::Manual);
        }
    }

    fn fetch(&mut self, feed: Feed, trigger: Trigger) {
        let tx = self.tx.clone();
        match feed {
            Feed::Departures => {
                let SiteState::Resolved(site) = self.site else {
                    return;
                };
                let ticket = self.departures.begin(trigger);
                let source = Arc::clone(&self.transit);
                debug!(%site, ?trigger, "fetching departures");
                tokio::spawn(async move {
                    let result = source.departures(site).await;
                    let _ = tx.send(Update::Departures(ticket, result));
                });
            }
            Feed::Weather => {
                let ticket = self.weather.begin(trigger);
                let source = Arc::clone(&self.weather_source);
                debug!(?trigger, "fetching weather");
                tokio::spawn(async move {
                    let result = source.current().await;
                    let _ = tx.send(Update::Weather(ticket, result));
                });
            }
            Feed::Calendar => {
                let Some(source) = self.calendar_source.clone() else {
                    return;
                };
                let ticket = self.calendar.begin(trigger);
                debug!(?trigger, "fetching calendar");
                tokio::spawn(async move {
                    let result = source.upcoming_day().await;
                    let _ = tx.send(Update::Calendar(ticket, result));
                });
            }
        }
    }

    fn apply(&mut self, update: Update) -> SessionEvent {
        match update {
            Update::Site(Ok(site)) => {
                info!(%site, station = %self.station, "station resolved");
                self.site = SiteState::Resolved(site);
                if let Some(timers) = self.timers.as_mut() {
                    timers.departures = Some(timer(DEPARTURES_INTERVAL));
                }
                SessionEvent::SiteResolved(site)
            }
            Update::Site(Err(e)) => {
                warn!(station = %self.station, error = %e, "station lookup failed, departures disabled");
                self.site = SiteState::Failed;
                self.departures.fail(e.to_string());
                SessionEvent::SiteFailed
            }
            Update::Departures(ticket, result) => {
                // New departures are ranked against the current time, not the last tick.
                self.now = Utc::now();
                Self::complete(&mut self.departures, Feed::Departures, ticket, result)
            }
            Update::Weather(ticket, result) => {
                Self::complete(&mut self.weather, Feed::Weather, ticket, result)
            }
            Update::Calendar(ticket, result) => {
                Self::complete(&mut self.calendar, Feed::Calendar, ticket, result)
            }
        }
    }

    fn complete<D>(
        slot: &mut FeedSlot<D>,
        feed: Feed,
        ticket: Ticket,
        result: Result<D, FeedError>,
    ) -> SessionEvent {
        if let Err(e) = &result {
            warn!(?feed, error = %e, "fetch failed");
        }
        if slot.complete(ticket, result) {
            SessionEvent::Applied(feed)
        } else {
            debug!(?feed, "dropping superseded result");
            SessionEvent::Superseded(feed)
        }
    }

    pub fn site(&self) -> SiteState {
        self.site
    }

    pub fn departures(&self) -> &FeedState<DepartureBoard> {
        self.departures.state()
    }

    pub fn weather(&self) -> &FeedState<WeatherSnapshot> {
        self.weather.state()
    }

    /// `None` when no calendar is configured.
    pub fn calendar(&self) -> Option<&FeedState<CalendarDay>> {
        self.calendar_source
            .as_ref()
            .map(|_| self.calendar.state())
    }

    /// Time of the last countdown tick.
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Departures ranked against the last countdown tick.
    pub fn selection(&self) -> DepartureSelection<'_> {
        match &self.departures.state().data {
            Some(board) => DepartureSelection::compute(&board.departures, self.now),
            None => DepartureSelection::default(),
        }
    }
}
