//! Command line arguments for a mission run.

use airguard_core::{Coordinate, DroneSettings, Scenario, WeightClass};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PointParseError {
    #[error("expected `lat,lon`, got `{0}`")]
    Format(String),

    #[error("invalid number `{0}`")]
    Number(String),

    #[error("coordinate out of range: {lat},{lon}")]
    OutOfRange { lat: f64, lon: f64 },
}

/// Drone weight class
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum WeightArg {
    /// Under 250 g
    Nano,
    /// Over 2 kg
    Micro,
}

impl From<WeightArg> for WeightClass {
    fn from(arg: WeightArg) -> Self {
        match arg {
            WeightArg::Nano => WeightClass::Nano,
            WeightArg::Micro => WeightClass::Micro,
        }
    }
}

/// Flight scenario to play back
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ScenarioArg {
    /// Fly the path exactly
    Standard,
    /// Random lateral jitter along the path
    HighWind,
    /// Drift off course and land at 80% of the path
    EmergencyLanding,
}

impl From<ScenarioArg> for Scenario {
    fn from(arg: ScenarioArg) -> Self {
        match arg {
            ScenarioArg::Standard => Scenario::Standard,
            ScenarioArg::HighWind => Scenario::HighWind,
            ScenarioArg::EmergencyLanding => Scenario::EmergencyLanding,
        }
    }
}

/// Evaluate a drone mission and play it back headless
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Waypoint as `lat,lon`; repeat for each point in order
    #[arg(long = "point", value_parser = parse_point, required = true)]
    pub points: Vec<Coordinate>,

    /// Planned altitude in meters
    #[arg(long, default_value_t = 60.0)]
    pub altitude: f64,

    #[arg(long, value_enum, default_value = "nano")]
    pub weight: WeightArg,

    #[arg(long, value_enum, default_value = "standard")]
    pub scenario: ScenarioArg,

    /// Playback speed multiplier
    #[arg(long, default_value_t = 1.0)]
    pub speed: f64,

    /// Keep the map centred on the drone
    #[arg(long)]
    pub follow: bool,

    /// JSON zone list replacing the built-in zones
    #[arg(long)]
    pub zones: Option<PathBuf>,

    /// JSON weather snapshot file, re-read on every refresh
    #[arg(long)]
    pub weather: Option<PathBuf>,

    /// Write the mission (path and settings) to this file before flying
    #[arg(long)]
    pub save: Option<PathBuf>,
}

impl Args {
    pub fn settings(&self) -> DroneSettings {
        DroneSettings {
            altitude_m: self.altitude,
            weight_class: self.weight.into(),
        }
    }
}

pub fn parse_point(raw: &str) -> Result<Coordinate, PointParseError> {
    let (lat, lon) = raw
        .split_once(',')
        .ok_or_else(|| PointParseError::Format(raw.to_string()))?;
    let number = |s: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|_| PointParseError::Number(s.trim().to_string()))
    };
    let (lat, lon) = (number(lat)?, number(lon)?);
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(PointParseError::OutOfRange { lat, lon });
    }
    Ok(Coordinate::new(lat, lon))
}
