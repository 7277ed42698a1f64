//! Public-transit departures (SL transport API).
//!
//! The station name is resolved to a site id once at startup; the site's
//! departures are then polled, filtered to one mode and one direction, and
//! ranked on every countdown tick.

mod client;
mod resolve;
mod select;
mod types;

pub use client::{DepartureFilter, TransitClient, TransitConfig, ALLOWED_MODES, DEFAULT_BASE_URL};
pub use resolve::{find_site, resolve_station};
pub use select::{
    minutes_until, DepartureSelection, LeaveBy, LineColor, Upcoming, VISIBLE_DEPARTURES,
    WALK_MINUTES,
};
pub use types::{
    parse_timestamp, Departure, DepartureBoard, Site, SiteId, StopDeviation, TransportMode,
};
