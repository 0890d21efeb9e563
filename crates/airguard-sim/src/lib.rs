//! Headless runner for airguard missions.
//!
//! Parses a mission from the command line, gates it through the risk
//! evaluator and plays it back on a frame timer, logging camera pans,
//! weather updates and flight records.

pub mod args;
pub mod backoff;
pub mod config;
pub mod runner;
pub mod view;
pub mod weather_file;
