pub mod camera;
pub mod error;
pub mod geometry;
pub mod mission;
pub mod models;
pub mod playback;
pub mod records;
pub mod risk;
pub mod rules;
pub mod scenario;
pub mod weather;
pub mod zones;

pub use camera::{FollowCamera, MapView, PanCommand, FOLLOW_PAN_DURATION};
pub use error::{GeometryError, MissionError, PlaybackError, WeatherError, ZoneError};
pub use geometry::{
    close_ring, haversine_distance, line_intersects_polygon, path_length_km, point_at_distance,
    point_in_polygon, waypoint_index_at_distance,
};
pub use mission::{Command, DroneMarker, Event, FrameReport, MissionController};
pub use models::{Coordinate, DroneSettings, Path, SettingsPatch, WeightClass};
pub use playback::{
    Completion, FrameToken, PlaybackClock, PlaybackState, PlaybackStatus, TickOutcome,
};
pub use records::{FlightAnalytics, FlightLog, FlightLogStatus, FlightStats, SavedMission};
pub use risk::{evaluate, evaluate_with_rules, RiskAssessment, RiskLevel};
pub use rules::RiskRules;
pub use scenario::{Perturber, Scenario};
pub use weather::{SimulatedWeather, WeatherCondition, WeatherFeed, WeatherSnapshot, WeatherSource};
pub use zones::{default_zones, parse_zones, Zone, ZoneClass};
