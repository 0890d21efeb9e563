//! Weather snapshots and the feed that keeps the last good one.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::WeatherError;

const COMPASS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// Sky condition reported with a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherCondition {
    Clear,
    Cloudy,
    Rain,
    Storm,
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WeatherCondition::Clear => "Clear",
            WeatherCondition::Cloudy => "Cloudy",
            WeatherCondition::Rain => "Rain",
            WeatherCondition::Storm => "Storm",
        };
        f.write_str(label)
    }
}

/// Point-in-time weather. Never mutated, only replaced wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temp_c: f64,
    pub wind_speed_kmh: f64,
    pub wind_direction: String,
    pub visibility_km: f64,
    pub condition: WeatherCondition,
    pub flyable: bool,
}

impl Default for WeatherSnapshot {
    fn default() -> Self {
        Self {
            temp_c: 24.0,
            wind_speed_kmh: 0.0,
            wind_direction: "N".to_string(),
            visibility_km: 10.0,
            condition: WeatherCondition::Clear,
            flyable: true,
        }
    }
}

/// Anything that can produce a fresh snapshot.
pub trait WeatherSource {
    fn fetch(&mut self) -> Result<WeatherSnapshot, WeatherError>;
}

/// Stand-in generator used when no live feed is configured.
pub struct SimulatedWeather<R: Rng = StdRng> {
    rng: R,
}

impl SimulatedWeather<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: Rng> SimulatedWeather<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn generate(&mut self) -> WeatherSnapshot {
        let wind = self.rng.random_range(0..25u32) as f64;
        let storm = self.rng.random_bool(0.1);
        let temp_c = 24.0 + self.rng.random_range(0..5u32) as f64;
        let wind_direction = COMPASS[self.rng.random_range(0..COMPASS.len())].to_string();

        let condition = if storm {
            WeatherCondition::Storm
        } else if wind > 15.0 {
            WeatherCondition::Cloudy
        } else {
            WeatherCondition::Clear
        };

        WeatherSnapshot {
            temp_c,
            wind_speed_kmh: if storm { 45.0 } else { wind },
            wind_direction,
            visibility_km: if storm { 2.0 } else { 10.0 },
            condition,
            flyable: !storm && wind < 20.0,
        }
    }
}

impl<R: Rng> WeatherSource for SimulatedWeather<R> {
    fn fetch(&mut self) -> Result<WeatherSnapshot, WeatherError> {
        Ok(self.generate())
    }
}

/// Holds the current snapshot and falls back to it when a refresh fails.
#[derive(Debug, Clone)]
pub struct WeatherFeed {
    current: WeatherSnapshot,
    refreshed_at: DateTime<Utc>,
    consecutive_failures: u32,
}

impl WeatherFeed {
    pub fn new(initial: WeatherSnapshot) -> Self {
        Self {
            current: initial,
            refreshed_at: Utc::now(),
            consecutive_failures: 0,
        }
    }

    pub fn current(&self) -> &WeatherSnapshot {
        &self.current
    }

    pub fn refreshed_at(&self) -> DateTime<Utc> {
        self.refreshed_at
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Pull a new snapshot. On failure the previous snapshot stays current
    /// and the error is returned for the caller to schedule a retry.
    pub fn refresh(
        &mut self,
        source: &mut dyn WeatherSource,
    ) -> Result<&WeatherSnapshot, WeatherError> {
        match source.fetch() {
            Ok(snapshot) => {
                tracing::debug!(
                    condition = %snapshot.condition,
                    wind_kmh = snapshot.wind_speed_kmh,
                    flyable = snapshot.flyable,
                    "Weather refreshed"
                );
                self.current = snapshot;
                self.refreshed_at = Utc::now();
                self.consecutive_failures = 0;
                Ok(&self.current)
            }
            Err(e) => {
                self.consecutive_failures += 1;
                tracing::warn!(
                    failures = self.consecutive_failures,
                    "Weather refresh failed, keeping last snapshot: {}",
                    e
                );
                Err(e)
            }
        }
    }
}
