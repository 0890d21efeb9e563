//! Runner configuration from environment.

use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    /// Interval between playback frames
    pub frame_interval: Duration,
    /// Regular weather refresh period
    pub weather_refresh: Duration,
    /// First retry delay after a failed weather refresh
    pub weather_retry_base: Duration,
    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(16),
            weather_refresh: Duration::from_secs(300),
            weather_retry_base: Duration::from_secs(5),
            seed: None,
            log_json: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let positive = |key: &str| {
            lookup(key)
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|&v| v > 0)
        };
        Self {
            frame_interval: positive("AIRGUARD_FRAME_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.frame_interval),
            weather_refresh: positive("AIRGUARD_WEATHER_REFRESH_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.weather_refresh),
            weather_retry_base: positive("AIRGUARD_WEATHER_RETRY_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.weather_retry_base),
            seed: lookup("AIRGUARD_SEED").and_then(|s| s.parse().ok()),
            log_json: lookup("AIRGUARD_LOG_JSON")
                .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
                .unwrap_or(false),
        }
    }
}
