//! `tavla`: a terminal status board for metro departures, weather and the
//! day's calendar.

pub mod app;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod datefmt;
pub mod error;
pub mod feed;
pub mod http;
pub mod session;
pub mod source;
pub mod transit;
pub mod weather;
