//! Flight records handed to external persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry;
use crate::models::{Coordinate, DroneSettings, WeightClass};
use crate::risk::RiskAssessment;
use crate::rules::RiskRules;

/// Nominal cruise speed used for flight time estimates.
pub const CRUISE_SPEED_KMH: f64 = 30.0;

/// Distance and duration estimate for a path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightStats {
    pub distance_km: f64,
    pub estimated_minutes: u32,
}

impl FlightStats {
    /// Zero for paths too short to fly.
    pub fn for_path(path: &[Coordinate]) -> Self {
        let Ok(distance_km) = geometry::path_length_km(path) else {
            return Self::default();
        };
        let minutes = distance_km / CRUISE_SPEED_KMH * 60.0;
        Self {
            distance_km,
            estimated_minutes: minutes.ceil() as u32,
        }
    }

    pub fn estimated_seconds(&self) -> u32 {
        (self.distance_km / CRUISE_SPEED_KMH * 3600.0).round() as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FlightLogStatus {
    Approved,
    Rejected,
}

/// One simulated flight, recorded when a simulation starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightLog {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub drone_model: WeightClass,
    pub risk_score: u8,
    pub status: FlightLogStatus,
    pub coordinate_count: usize,
    #[serde(default)]
    pub flight_time_secs: Option<u32>,
}

impl FlightLog {
    pub fn record(
        path: &[Coordinate],
        settings: &DroneSettings,
        assessment: &RiskAssessment,
        rules: &RiskRules,
    ) -> Self {
        let status = if assessment.is_grounded_with_rules(rules) {
            FlightLogStatus::Rejected
        } else {
            FlightLogStatus::Approved
        };
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            drone_model: settings.weight_class,
            risk_score: assessment.score,
            status,
            coordinate_count: path.len(),
            flight_time_secs: Some(FlightStats::for_path(path).estimated_seconds()),
        }
    }
}

/// Summary over recent flight logs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlightAnalytics {
    pub total_flights: usize,
    /// Mean risk score, rounded
    pub avg_risk: u8,
    /// Percentage of approved flights, rounded
    pub approval_rate: u8,
    pub total_minutes: u32,
}

impl FlightAnalytics {
    pub fn from_logs(logs: &[FlightLog]) -> Option<Self> {
        if logs.is_empty() {
            return None;
        }
        let total = logs.len() as f64;
        let risk_sum: u32 = logs.iter().map(|l| u32::from(l.risk_score)).sum();
        let approved = logs
            .iter()
            .filter(|l| l.status == FlightLogStatus::Approved)
            .count();
        let seconds: u32 = logs.iter().filter_map(|l| l.flight_time_secs).sum();

        Some(Self {
            total_flights: logs.len(),
            avg_risk: (f64::from(risk_sum) / total).round() as u8,
            approval_rate: (approved as f64 / total * 100.0).round() as u8,
            total_minutes: seconds / 60,
        })
    }
}

/// A named path and settings pair the operator can reload later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedMission {
    pub id: Uuid,
    pub name: String,
    pub path: Vec<Coordinate>,
    pub settings: DroneSettings,
    pub saved_at: DateTime<Utc>,
}

impl SavedMission {
    /// Blank names default to "Mission HH:MM:SS".
    pub fn new(name: Option<&str>, path: Vec<Coordinate>, settings: DroneSettings) -> Self {
        let saved_at = Utc::now();
        let name = match name.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Mission {}", saved_at.format("%H:%M:%S")),
        };
        Self {
            id: Uuid::new_v4(),
            name,
            path,
            settings,
            saved_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(score: u8, status: FlightLogStatus, secs: u32) -> FlightLog {
        FlightLog {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            drone_model: WeightClass::Nano,
            risk_score: score,
            status,
            coordinate_count: 2,
            flight_time_secs: Some(secs),
        }
    }

    #[test]
    fn stats_are_zero_for_short_paths() {
        assert_eq!(FlightStats::for_path(&[]), FlightStats::default());
    }

    #[test]
    fn stats_round_minutes_up() {
        // ~3.1 km at 30 km/h is a little over 6 minutes
        let path = vec![Coordinate::new(13.00, 77.60), Coordinate::new(13.02, 77.62)];
        let stats = FlightStats::for_path(&path);
        assert!((stats.distance_km - 3.1).abs() < 0.05);
        assert_eq!(stats.estimated_minutes, 7);
    }

    #[test]
    fn record_marks_grounded_scores_rejected() {
        let path = vec![Coordinate::new(13.00, 77.60), Coordinate::new(13.02, 77.62)];
        let rules = RiskRules::default();
        let safe = RiskAssessment {
            score: 50,
            violations: vec![],
        };
        let risky = RiskAssessment {
            score: 80,
            violations: vec![],
        };
        let settings = DroneSettings::default();
        assert_eq!(
            FlightLog::record(&path, &settings, &safe, &rules).status,
            FlightLogStatus::Approved
        );
        let rejected = FlightLog::record(&path, &settings, &risky, &rules);
        assert_eq!(rejected.status, FlightLogStatus::Rejected);
        assert_eq!(rejected.coordinate_count, 2);
    }

    #[test]
    fn analytics_summarise_logs() {
        assert!(FlightAnalytics::from_logs(&[]).is_none());
        let logs = vec![
            log(0, FlightLogStatus::Approved, 90),
            log(20, FlightLogStatus::Approved, 60),
            log(80, FlightLogStatus::Rejected, 30),
        ];
        let analytics = FlightAnalytics::from_logs(&logs).unwrap();
        assert_eq!(analytics.total_flights, 3);
        assert_eq!(analytics.avg_risk, 33);
        assert_eq!(analytics.approval_rate, 67);
        assert_eq!(analytics.total_minutes, 3);
    }

    #[test]
    fn blank_mission_name_gets_timestamp_default() {
        let mission = SavedMission::new(Some("  "), vec![], DroneSettings::default());
        assert!(mission.name.starts_with("Mission "));
        let named = SavedMission::new(Some("Survey"), vec![], DroneSettings::default());
        assert_eq!(named.name, "Survey");
    }
}
