//! Risk rules and thresholds for flight plan evaluation.

use serde::{Deserialize, Serialize};

/// Configuration for the risk evaluator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskRules {
    /// Maximum allowed altitude AGL in meters
    pub max_altitude_m: f64,
    /// Path length beyond which the flight counts as BVLOS, in kilometers
    pub bvlos_limit_km: f64,
    /// Floor applied by altitude and BVLOS breaches
    pub regulatory_floor: u8,
    /// Floor applied when the path enters a restricted zone
    pub restricted_floor: u8,
    /// Score forced by critical zones and unflyable weather
    pub critical_score: u8,
    /// Wind speed above which the wind penalty applies, in km/h
    pub high_wind_kmh: f64,
    /// Additive penalty for high wind
    pub high_wind_penalty: u8,
    /// Scores above this ground the aircraft
    pub grounded_above: u8,
}

impl Default for RiskRules {
    fn default() -> Self {
        Self {
            max_altitude_m: 120.0, // DGCA micro/nano ceiling (~400ft)
            bvlos_limit_km: 4.0,
            regulatory_floor: 50,
            restricted_floor: 80,
            critical_score: 100,
            high_wind_kmh: 15.0,
            high_wind_penalty: 20,
            grounded_above: 50,
        }
    }
}
