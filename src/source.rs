//! The seams between the session and the upstream feeds.
//!
//! Each feed is a stateless fetch; the session owns every piece of state.
//! Test doubles and the canned development weather implement the same traits.

use std::future::Future;

use crate::calendar::CalendarDay;
use crate::error::FeedError;
use crate::transit::{DepartureBoard, Site, SiteId};
use crate::weather::WeatherSnapshot;

pub trait TransitSource: Send + Sync + 'static {
    /// Every known site, in one call.
    fn sites(&self) -> impl Future<Output = Result<Vec<Site>, FeedError>> + Send;

    /// Filtered departures for a resolved site.
    fn departures(
        &self,
        site: SiteId,
    ) -> impl Future<Output = Result<DepartureBoard, FeedError>> + Send;
}

pub trait WeatherSource: Send + Sync + 'static {
    fn current(&self) -> impl Future<Output = Result<WeatherSnapshot, FeedError>> + Send;
}

pub trait CalendarSource: Send + Sync + 'static {
    /// The most relevant day of the feed, relative to now.
    fn upcoming_day(&self) -> impl Future<Output = Result<CalendarDay, FeedError>> + Send;
}
