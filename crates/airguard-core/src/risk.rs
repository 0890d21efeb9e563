//! Flight risk evaluation.
//!
//! `evaluate` is a pure function of its inputs: identical inputs always give
//! an identical assessment, and nothing here fails outward. Geometry failures
//! on a single zone count as "no contribution" from that zone.

use serde::{Deserialize, Serialize};

use crate::geometry;
use crate::models::{Coordinate, DroneSettings};
use crate::rules::RiskRules;
use crate::weather::WeatherSnapshot;
use crate::zones::{Zone, ZoneClass};

const MAX_SCORE: u32 = 100;

/// Derived safety assessment of a flight plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// 0 (safe) to 100 (no-go)
    pub score: u8,
    /// One message per rule breach, in evaluation order
    pub violations: Vec<String>,
}

/// Coarse banding of the score for status displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Cleared,
    Caution,
    Restricted,
}

impl RiskAssessment {
    pub fn level(&self) -> RiskLevel {
        match self.score {
            0 => RiskLevel::Cleared,
            1..=49 => RiskLevel::Caution,
            _ => RiskLevel::Restricted,
        }
    }

    /// Whether simulation start must be refused under the default rules.
    pub fn is_grounded(&self) -> bool {
        self.is_grounded_with_rules(&RiskRules::default())
    }

    pub fn is_grounded_with_rules(&self, rules: &RiskRules) -> bool {
        self.score > rules.grounded_above
    }
}

/// Evaluate a flight plan against the default rules.
pub fn evaluate(
    path: &[Coordinate],
    settings: &DroneSettings,
    zones: &[Zone],
    weather: &WeatherSnapshot,
) -> RiskAssessment {
    evaluate_with_rules(path, settings, zones, weather, &RiskRules::default())
}

/// Evaluate a flight plan using configured rules.
///
/// Rules apply in a fixed order: altitude, BVLOS distance, zones (in list
/// order), then weather. Altitude, distance and restricted zones raise the
/// score to a floor; a critical zone pins it to the ceiling; unflyable
/// weather overrides it; high wind adds a penalty. The result is clamped.
pub fn evaluate_with_rules(
    path: &[Coordinate],
    settings: &DroneSettings,
    zones: &[Zone],
    weather: &WeatherSnapshot,
    rules: &RiskRules,
) -> RiskAssessment {
    // An unset path is always safe, regardless of weather or altitude.
    if path.len() < 2 {
        return RiskAssessment::default();
    }

    let mut score: u32 = 0;
    let mut violations = Vec::new();

    if settings.altitude_m > rules.max_altitude_m {
        score = score.max(rules.regulatory_floor.into());
        violations.push(format!(
            "Altitude violation: {}m > {}m limit",
            settings.altitude_m, rules.max_altitude_m
        ));
    }

    match geometry::path_length_km(path) {
        Ok(length_km) if length_km > rules.bvlos_limit_km => {
            score = score.max(rules.regulatory_floor.into());
            violations.push(format!(
                "BVLOS Risk: Path length {:.2}km > {}km",
                length_km, rules.bvlos_limit_km
            ));
        }
        Ok(_) => {}
        Err(e) => tracing::debug!("Skipping BVLOS check: {}", e),
    }

    for zone in zones {
        if !path_enters_zone(path, zone) {
            continue;
        }
        match zone.class {
            ZoneClass::Critical => {
                score = rules.critical_score.into();
                violations.push(format!("CRITICAL: Enters No-Fly Zone ({})", zone.name));
            }
            ZoneClass::Restricted => {
                score = score.max(rules.restricted_floor.into());
                violations.push(format!("RESTRICTED: Enters Warning Zone ({})", zone.name));
            }
            ZoneClass::Controlled => {}
        }
    }

    if !weather.flyable {
        score = rules.critical_score.into();
        violations.push(format!(
            "WEATHER: unsafe conditions ({}, {}km/h winds)",
            weather.condition, weather.wind_speed_kmh
        ));
    } else if weather.wind_speed_kmh > rules.high_wind_kmh {
        score += u32::from(rules.high_wind_penalty);
        violations.push(format!(
            "WEATHER: High winds ({}km/h)",
            weather.wind_speed_kmh
        ));
    }

    RiskAssessment {
        score: score.min(MAX_SCORE) as u8,
        violations,
    }
}

/// Crossing the boundary, or taking off or landing inside, all count.
fn path_enters_zone(path: &[Coordinate], zone: &Zone) -> bool {
    let (Some(&start), Some(&end)) = (path.first(), path.last()) else {
        return false;
    };

    let checks = [
        geometry::line_intersects_polygon(path, &zone.polygon),
        geometry::point_in_polygon(start, &zone.polygon),
        geometry::point_in_polygon(end, &zone.polygon),
    ];

    let mut entered = false;
    for check in checks {
        match check {
            Ok(hit) => entered |= hit,
            Err(e) => {
                tracing::debug!(zone = %zone.id, "Zone check skipped: {}", e);
            }
        }
    }
    entered
}
