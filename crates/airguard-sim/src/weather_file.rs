//! Weather source backed by a JSON snapshot file.
//!
//! The file is re-read on every fetch so an external process can update it
//! while a mission is running.

use airguard_core::{WeatherError, WeatherSnapshot, WeatherSource};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct FileWeather {
    path: PathBuf,
}

impl FileWeather {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl WeatherSource for FileWeather {
    fn fetch(&mut self) -> Result<WeatherSnapshot, WeatherError> {
        let raw = fs::read_to_string(&self.path).map_err(|e| {
            WeatherError::Unavailable(format!("{}: {}", self.path.display(), e))
        })?;
        let snapshot: WeatherSnapshot =
            serde_json::from_str(&raw).map_err(|e| WeatherError::Malformed(e.to_string()))?;
        if !snapshot.wind_speed_kmh.is_finite() || snapshot.wind_speed_kmh < 0.0 {
            return Err(WeatherError::Malformed(format!(
                "wind speed {} km/h",
                snapshot.wind_speed_kmh
            )));
        }
        Ok(snapshot)
    }
}
