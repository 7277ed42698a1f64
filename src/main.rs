use std::{
    error::Error,
    fs::OpenOptions,
    io,
    path::Path,
    sync::{Arc, Mutex},
};

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use tavla::app::{run_app, App};
use tavla::calendar::CalendarClient;
use tavla::cli::Args;
use tavla::config::Config;
use tavla::session::Session;
use tavla::transit::TransitClient;
use tavla::weather::{OpenMeteoClient, SwitchableWeather};

/// The terminal belongs to the UI, so logs go to a file.
fn init_tracing(path: &Path) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::from_args(Args::parse())?;
    init_tracing(&config.log_file)?;
    tracing::info!(mode = ?config.mode, station = %config.station, "starting");

    let transit = Arc::new(TransitClient::new(config.transit.clone())?);
    let live = OpenMeteoClient::new(config.weather.clone())?;
    let weather = Arc::new(if config.is_development() {
        SwitchableWeather::canned(live)
    } else {
        SwitchableWeather::live(live)
    });
    let calendar = config
        .calendar_url
        .as_ref()
        .map(|url| CalendarClient::new(url.clone(), config.timezone))
        .transpose()?
        .map(Arc::new);

    let session = Session::new(transit, Arc::clone(&weather), calendar, config.station.clone());
    let mut app = App::new(session, weather, config.timezone, config.towards.clone());

    // setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app).await;

    // restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "terminal loop failed");
        println!("{:?}", err)
    }

    Ok(())
}
