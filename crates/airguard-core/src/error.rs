use thiserror::Error;

/// Failures of the geometry primitives.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("path needs at least 2 points, got {points}")]
    InsufficientPath { points: usize },

    #[error("polygon ring needs at least 3 distinct vertices, got {vertices}")]
    DegenerateRing { vertices: usize },

    #[error("coordinate is not finite")]
    NonFiniteCoordinate,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaybackError {
    #[error("playback speed must be a positive finite multiplier, got {0}")]
    InvalidSpeed(f64),

    #[error("playback is not running")]
    NotPlaying,

    #[error("playback is not paused")]
    NotPaused,

    #[error("playback is already running")]
    AlreadyPlaying,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MissionError {
    #[error("flight path needs at least 2 points, got {points}")]
    InsufficientPath { points: usize },

    #[error("aircraft grounded: risk score {score} exceeds {limit}")]
    Grounded { score: u8, limit: u8 },

    #[error("flight path cannot be edited while playback is running")]
    PathLocked,

    #[error("waypoint {index} out of range (path has {len} points)")]
    WaypointOutOfRange { index: usize, len: usize },

    #[error(transparent)]
    Playback(#[from] PlaybackError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeatherError {
    #[error("weather feed unavailable: {0}")]
    Unavailable(String),

    #[error("malformed weather snapshot: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ZoneError {
    #[error("invalid zone list: {0}")]
    Parse(String),

    #[error("zone {id} is invalid: {source}")]
    Invalid {
        id: String,
        #[source]
        source: GeometryError,
    },
}
