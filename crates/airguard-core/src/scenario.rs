//! Scenario-specific deviation of the simulated drone position.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::Coordinate;

/// Half-width of the high-wind jitter on each axis, in degrees.
pub const WIND_JITTER_DEG: f64 = 0.00015;
/// Progress after which the emergency scenario starts drifting.
pub const EMERGENCY_DRIFT_START: f64 = 0.4;
/// Drift in degrees per unit of progress beyond the drift start.
pub const EMERGENCY_DRIFT_RATE: f64 = 0.002;

/// Simulated flight scenario.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    #[default]
    Standard,
    HighWind,
    EmergencyLanding,
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Scenario::Standard => "standard",
            Scenario::HighWind => "high_wind",
            Scenario::EmergencyLanding => "emergency_landing",
        };
        f.write_str(label)
    }
}

impl std::str::FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Scenario::Standard),
            "high_wind" => Ok(Scenario::HighWind),
            "emergency_landing" => Ok(Scenario::EmergencyLanding),
            other => Err(format!("unknown scenario: {other}")),
        }
    }
}

/// True once an emergency-landing flight has started drifting.
/// Presentation only; it has no effect on the risk score.
pub fn is_emergency(scenario: Scenario, progress: f64) -> bool {
    scenario == Scenario::EmergencyLanding && progress > EMERGENCY_DRIFT_START
}

/// Applies scenario deviation to interpolated positions.
///
/// The random source is injected so high-wind runs can be replayed from a
/// seed; everything else is deterministic.
pub struct Perturber<R: Rng = StdRng> {
    rng: R,
}

impl Perturber<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: Rng> Perturber<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Deviate `base` for the given scenario. Positions are only perturbed
    /// while playback is running.
    pub fn perturb(
        &mut self,
        base: Coordinate,
        progress: f64,
        scenario: Scenario,
        is_playing: bool,
    ) -> Coordinate {
        if !is_playing {
            return base;
        }

        match scenario {
            Scenario::Standard => base,
            Scenario::HighWind => Coordinate {
                lat: base.lat + self.rng.random_range(-WIND_JITTER_DEG..WIND_JITTER_DEG),
                lon: base.lon + self.rng.random_range(-WIND_JITTER_DEG..WIND_JITTER_DEG),
            },
            Scenario::EmergencyLanding => {
                if progress <= EMERGENCY_DRIFT_START {
                    return base;
                }
                let drift = (progress - EMERGENCY_DRIFT_START) * EMERGENCY_DRIFT_RATE;
                Coordinate {
                    lat: base.lat - drift,
                    lon: base.lon + drift,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: Coordinate = Coordinate::new(13.0, 77.6);

    #[test]
    fn standard_is_identity() {
        let mut perturber = Perturber::seeded(3);
        for step in 0..=20 {
            let progress = step as f64 / 20.0;
            assert_eq!(perturber.perturb(BASE, progress, Scenario::Standard, true), BASE);
            assert_eq!(perturber.perturb(BASE, progress, Scenario::Standard, false), BASE);
        }
    }

    #[test]
    fn high_wind_jitter_is_bounded_and_seeded() {
        let mut a = Perturber::seeded(9);
        let mut b = Perturber::seeded(9);
        for _ in 0..200 {
            let p = a.perturb(BASE, 0.5, Scenario::HighWind, true);
            assert!((p.lat - BASE.lat).abs() <= WIND_JITTER_DEG);
            assert!((p.lon - BASE.lon).abs() <= WIND_JITTER_DEG);
            assert_eq!(p, b.perturb(BASE, 0.5, Scenario::HighWind, true));
        }
    }

    #[test]
    fn high_wind_is_still_when_paused() {
        let mut perturber = Perturber::seeded(9);
        assert_eq!(perturber.perturb(BASE, 0.5, Scenario::HighWind, false), BASE);
    }

    #[test]
    fn emergency_drift_is_linear_after_threshold() {
        let mut perturber = Perturber::seeded(0);
        assert_eq!(
            perturber.perturb(BASE, 0.4, Scenario::EmergencyLanding, true),
            BASE
        );

        let p = perturber.perturb(BASE, 0.8, Scenario::EmergencyLanding, true);
        let drift = 0.4 * EMERGENCY_DRIFT_RATE;
        assert!((p.lat - (BASE.lat - drift)).abs() < 1e-12);
        assert!((p.lon - (BASE.lon + drift)).abs() < 1e-12);

        let again = perturber.perturb(BASE, 0.8, Scenario::EmergencyLanding, true);
        assert_eq!(p, again);
    }

    #[test]
    fn emergency_flag_tracks_drift_start() {
        assert!(!is_emergency(Scenario::EmergencyLanding, 0.4));
        assert!(is_emergency(Scenario::EmergencyLanding, 0.41));
        assert!(!is_emergency(Scenario::HighWind, 0.9));
    }

    #[test]
    fn scenario_names_round_trip_through_str() {
        for scenario in [Scenario::Standard, Scenario::HighWind, Scenario::EmergencyLanding] {
            assert_eq!(scenario.to_string().parse::<Scenario>().unwrap(), scenario);
        }
        assert!("crash".parse::<Scenario>().is_err());
    }
}
