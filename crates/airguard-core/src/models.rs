//! Core data models for mission planning.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    #[serde(alias = "lng")]
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lon)
    }
}

/// Ordered flight path. Insertion order defines flight direction and
/// waypoint numbering.
pub type Path = Vec<Coordinate>;

/// Airframe weight category declared by the operator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightClass {
    /// Under 250 g
    #[default]
    Nano,
    /// Over 2 kg
    Micro,
}

impl fmt::Display for WeightClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightClass::Nano => write!(f, "Nano (<250g)"),
            WeightClass::Micro => write!(f, "Micro (>2kg)"),
        }
    }
}

/// Operator-supplied drone configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DroneSettings {
    /// Planned altitude above ground level in meters
    pub altitude_m: f64,
    pub weight_class: WeightClass,
}

impl Default for DroneSettings {
    fn default() -> Self {
        Self {
            altitude_m: 60.0,
            weight_class: WeightClass::Nano,
        }
    }
}

/// Partial update to [`DroneSettings`]; unset fields keep their value.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SettingsPatch {
    pub altitude_m: Option<f64>,
    pub weight_class: Option<WeightClass>,
}

impl DroneSettings {
    /// Merge a partial update into these settings.
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(altitude_m) = patch.altitude_m {
            self.altitude_m = altitude_m;
        }
        if let Some(weight_class) = patch.weight_class {
            self.weight_class = weight_class;
        }
    }
}
