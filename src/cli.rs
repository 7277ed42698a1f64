use clap::builder::{styling::AnsiColor, Styles};
use clap::{Parser, ValueEnum};

const ABOUT: &str = "Departure, weather and calendar board for the terminal";

const LONG_ABOUT: &str = "
Terminal status board showing the next metro departures from one station, current weather and,
optionally, the next day with events from a public iCalendar feed.

The station is looked up by name once at startup (e.g. Duvbo, Solna centrum). Departures are
filtered to the metro and to those heading towards the given destination.

In development mode the transit and calendar requests go through a local relay and the weather
panel starts on a cycle of canned scenarios (press `w` to advance, `l` to go live).
";

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default())
    .usage(AnsiColor::Green.on_default())
    .literal(AnsiColor::Green.on_default())
    .placeholder(AnsiColor::Green.on_default());

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Development,
    Production,
}

#[derive(Parser, Debug)]
#[command(version, styles=STYLES, about=ABOUT, long_about = LONG_ABOUT)]
pub struct Args {
    #[arg(long, default_value = "Duvbo", help = "Station to show departures from")]
    pub station: String,

    #[arg(
        long,
        default_value = "Kungsträdgården",
        help = "Only show departures heading towards this destination"
    )]
    pub towards: String,

    #[arg(
        long,
        env = "CALENDAR_ICAL_URL",
        help = "Public iCalendar URL; leave unset or blank to hide the calendar"
    )]
    pub calendar_url: Option<String>,

    #[arg(long, env = "DASHBOARD_MODE", value_enum, default_value_t = Mode::Production)]
    pub mode: Mode,

    #[arg(
        long,
        env = "DASHBOARD_RELAY_URL",
        default_value = "http://localhost:5173",
        help = "Relay used for transit and calendar requests in development mode"
    )]
    pub relay_url: String,

    #[arg(long, default_value_t = 59.36, allow_negative_numbers = true)]
    pub latitude: f64,

    #[arg(long, default_value_t = 17.95, allow_negative_numbers = true)]
    pub longitude: f64,

    #[arg(long, default_value = "Europe/Stockholm", help = "IANA time zone")]
    pub timezone: String,

    #[arg(long, default_value = "tavla.log", help = "Where to write the log")]
    pub log_file: String,
}
