//! Static airspace zones.
//!
//! Zones are supplied once at startup and never change for the life of the
//! process; the evaluator iterates them in declaration order.

use serde::{Deserialize, Serialize};

use crate::error::ZoneError;
use crate::geometry;
use crate::models::Coordinate;

/// Classification of an airspace zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneClass {
    /// No-fly zone
    #[serde(alias = "CRITICAL")]
    Critical,
    /// Warning zone, flight allowed at elevated risk
    #[serde(alias = "RESTRICTED")]
    Restricted,
    /// Advisory only, no scoring effect
    #[serde(alias = "CONTROLLED")]
    Controlled,
}

/// A named airspace polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
    #[serde(alias = "type")]
    pub class: ZoneClass,
    /// Polygon vertices; the ring is closed implicitly if the last vertex
    /// does not repeat the first.
    #[serde(alias = "coordinates")]
    pub polygon: Vec<Coordinate>,
}

impl Zone {
    /// Build a square zone of `size_deg` degrees per side around `center`.
    pub fn square(
        id: impl Into<String>,
        name: impl Into<String>,
        class: ZoneClass,
        center: Coordinate,
        size_deg: f64,
    ) -> Self {
        let half = size_deg / 2.0;
        Self {
            id: id.into(),
            name: name.into(),
            class,
            polygon: vec![
                Coordinate::new(center.lat + half, center.lon - half),
                Coordinate::new(center.lat + half, center.lon + half),
                Coordinate::new(center.lat - half, center.lon + half),
                Coordinate::new(center.lat - half, center.lon - half),
            ],
        }
    }
}

/// Built-in zone table for the Bangalore operating area.
pub fn default_zones() -> Vec<Zone> {
    vec![
        Zone::square(
            "z1",
            "Kempegowda Int. Airport (KIA)",
            ZoneClass::Critical,
            Coordinate::new(13.1986, 77.7066),
            0.05,
        ),
        Zone::square(
            "z2",
            "Yelahanka Air Force Station",
            ZoneClass::Restricted,
            Coordinate::new(13.1350, 77.6100),
            0.04,
        ),
        Zone::square(
            "z3",
            "Bangalore City Control Zone",
            ZoneClass::Controlled,
            Coordinate::new(12.9716, 77.5946),
            0.08,
        ),
    ]
}

/// Parse a JSON zone list, rejecting zones whose polygon cannot form a ring.
pub fn parse_zones(json: &str) -> Result<Vec<Zone>, ZoneError> {
    let zones: Vec<Zone> =
        serde_json::from_str(json).map_err(|e| ZoneError::Parse(e.to_string()))?;
    for zone in &zones {
        geometry::close_ring(&zone.polygon).map_err(|source| ZoneError::Invalid {
            id: zone.id.clone(),
            source,
        })?;
    }
    Ok(zones)
}
