//! Mission run loop.
//!
//! Drives the mission controller from a frame timer and refreshes the
//! weather on an independent timer. Shutdown stops playback before the loop
//! exits so no frame is delivered afterwards.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tokio::time::{interval, sleep, Instant, MissedTickBehavior};

use airguard_core::{
    Command, Completion, Event, MissionController, RiskAssessment, TickOutcome, WeatherFeed,
    WeatherSnapshot, WeatherSource,
};

use crate::backoff::Backoff;
use crate::config::Config;
use crate::view::LogView;

/// Longest wait between retries of a failing weather feed.
const MAX_WEATHER_RETRY: Duration = Duration::from_secs(120);

/// Result of one weather refresh attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Refresh {
    Updated(WeatherSnapshot),
    /// Refresh failed or is backing off; try again after the delay.
    Retry(Duration),
}

/// Weather feed plus retry policy.
pub struct WeatherRefresher {
    feed: WeatherFeed,
    source: Box<dyn WeatherSource>,
    backoff: Backoff,
}

impl WeatherRefresher {
    pub fn new(source: Box<dyn WeatherSource>, retry_base: Duration) -> Self {
        Self {
            feed: WeatherFeed::new(WeatherSnapshot::default()),
            source,
            backoff: Backoff::new(retry_base, MAX_WEATHER_RETRY),
        }
    }

    pub fn current(&self) -> &WeatherSnapshot {
        self.feed.current()
    }

    /// Delay before the next refresh: the pending retry after a failure,
    /// otherwise the regular `period`.
    pub fn next_delay(&self, period: Duration) -> Duration {
        if self.backoff.is_pending() {
            self.backoff.remaining()
        } else {
            period
        }
    }

    pub fn refresh(&mut self) -> Refresh {
        if !self.backoff.is_due() {
            return Refresh::Retry(self.backoff.remaining());
        }
        match self.feed.refresh(self.source.as_mut()) {
            Ok(snapshot) => {
                self.backoff.succeed();
                Refresh::Updated(snapshot.clone())
            }
            Err(_) => {
                let delay = self.backoff.fail();
                tracing::debug!(
                    failures = self.feed.consecutive_failures(),
                    retry_in_ms = delay.as_millis() as u64,
                    "Weather retry scheduled"
                );
                Refresh::Retry(delay)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub frames: u64,
    pub completion: Option<Completion>,
    pub camera_pans: u64,
    pub weather_updates: u32,
    pub final_assessment: RiskAssessment,
}

/// Gate the mission, then play it back until it completes or `shutdown`
/// resolves.
pub async fn run(
    mission: &mut MissionController,
    weather: &mut WeatherRefresher,
    config: &Config,
    shutdown: impl Future<Output = ()>,
) -> Result<RunSummary> {
    let started_at = Utc::now();
    let events = mission
        .apply(Command::Simulate)
        .context("simulation refused")?;
    let mut token = events.iter().rev().find_map(|e| match e {
        Event::PlaybackStarted(token) => Some(*token),
        _ => None,
    });
    events.iter().for_each(log_event);

    let mut view = LogView::new();
    let mut frames = interval(config.frame_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let weather_timer = sleep(weather.next_delay(config.weather_refresh));
    tokio::pin!(weather_timer);
    tokio::pin!(shutdown);

    let origin = Instant::now();
    let mut frame_count = 0u64;
    let mut completion = None;
    let mut weather_updates = 0u32;

    while let Some(current) = token {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Shutdown requested");
                mission.apply(Command::Stop)?.iter().for_each(log_event);
                break;
            }
            _ = &mut weather_timer => {
                let next = match weather.refresh() {
                    Refresh::Updated(snapshot) => {
                        weather_updates += 1;
                        mission
                            .apply(Command::ReplaceWeather(snapshot))?
                            .iter()
                            .for_each(log_event);
                        config.weather_refresh
                    }
                    Refresh::Retry(delay) => delay,
                };
                weather_timer.as_mut().reset(Instant::now() + next);
            }
            now = frames.tick() => {
                let report = mission.on_frame(current, now.duration_since(origin), &mut view);
                frame_count += 1;
                if let Some(marker) = report.marker {
                    tracing::trace!(
                        lat = marker.position.lat,
                        lon = marker.position.lon,
                        emergency = marker.emergency,
                        "Drone"
                    );
                }
                if let TickOutcome::Completed(done) = report.outcome {
                    completion = Some(done);
                    match report.notice() {
                        Some(notice) => tracing::warn!("{}", notice),
                        None => tracing::info!("Flight complete"),
                    }
                }
                token = report.next_frame();
            }
        }
    }

    Ok(RunSummary {
        started_at,
        frames: frame_count,
        completion,
        camera_pans: view.pan_count(),
        weather_updates,
        final_assessment: mission.assessment().clone(),
    })
}

pub fn log_event(event: &Event) {
    match event {
        Event::RiskUpdated(assessment) => {
            tracing::info!(
                score = assessment.score,
                level = ?assessment.level(),
                violations = ?assessment.violations,
                "Risk assessment"
            );
        }
        Event::FlightLogged(log) => match serde_json::to_string(log) {
            Ok(json) => tracing::info!(flight_log = %json, "Flight logged"),
            Err(e) => tracing::warn!("Failed to serialize flight log: {}", e),
        },
        Event::PlaybackStarted(_) => tracing::info!("Playback started"),
        Event::PlaybackPaused => tracing::info!("Playback paused"),
        Event::PlaybackResumed(_) => tracing::info!("Playback resumed"),
        Event::PlaybackStopped => tracing::info!("Playback stopped"),
    }
}
