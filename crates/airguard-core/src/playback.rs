//! Time-stepped playback of a simulated flight.
//!
//! The clock owns its last frame timestamp and current speed, so a frame
//! callback only ever supplies "now". Every scheduled frame is represented
//! by a [`FrameToken`]; stopping or pausing retires the outstanding token, and
//! a retired token can never mutate state again.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::PlaybackError;
use crate::scenario::Scenario;

/// Progress per second at 1x speed (a full path takes 20 s).
pub const BASE_PROGRESS_PER_SEC: f64 = 0.05;
/// Progress at which an emergency-landing flight is cut short.
pub const EMERGENCY_CUTOFF: f64 = 0.8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Observable playback state for renderers and the follow camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub status: PlaybackStatus,
    /// Fraction of the path flown, 0 to 1
    pub progress: f64,
    /// Last waypoint passed, for highlighting
    pub waypoint_index: usize,
    /// Speed multiplier, always positive
    pub speed: f64,
    pub follow_drone: bool,
    pub scenario: Scenario,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            status: PlaybackStatus::Stopped,
            progress: 0.0,
            waypoint_index: 0,
            speed: 1.0,
            follow_drone: false,
            scenario: Scenario::Standard,
        }
    }
}

impl PlaybackState {
    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }
}

/// Handle for the single outstanding frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameToken {
    epoch: u64,
}

/// How a playback run ended on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Completion {
    /// Reached the end of the path; progress rewound to the start
    PathFinished,
    /// Emergency scenario cut the flight short at the cutoff
    EmergencyLanding,
}

impl Completion {
    /// User-facing notification text, if the completion warrants one.
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            Completion::PathFinished => None,
            Completion::EmergencyLanding => Some("SIMULATION ENDED: Emergency Landing Executed."),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Progress moved forward and the next frame is scheduled.
    Advanced { progress: f64, next: FrameToken },
    /// Playback finished during this frame; the clock is stopped.
    Completed(Completion),
    /// The token was retired (stop, pause or restart); nothing changed.
    Cancelled,
}

#[derive(Debug, Clone, Default)]
pub struct PlaybackClock {
    state: PlaybackState,
    last_frame: Option<Duration>,
    epoch: u64,
    pending: Option<FrameToken>,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// Start from the beginning of the path, whatever the current state.
    pub fn start(&mut self) -> FrameToken {
        self.cancel_pending();
        self.state.progress = 0.0;
        self.state.waypoint_index = 0;
        self.state.status = PlaybackStatus::Playing;
        self.last_frame = None;
        self.schedule()
    }

    pub fn pause(&mut self) -> Result<(), PlaybackError> {
        if !self.state.is_playing() {
            return Err(PlaybackError::NotPlaying);
        }
        self.cancel_pending();
        self.state.status = PlaybackStatus::Paused;
        Ok(())
    }

    /// Resume from a pause. Time spent paused is never integrated.
    pub fn resume(&mut self) -> Result<FrameToken, PlaybackError> {
        match self.state.status {
            PlaybackStatus::Paused => {
                self.state.status = PlaybackStatus::Playing;
                self.last_frame = None;
                Ok(self.schedule())
            }
            PlaybackStatus::Playing => Err(PlaybackError::AlreadyPlaying),
            PlaybackStatus::Stopped => Err(PlaybackError::NotPaused),
        }
    }

    /// Stop and rewind. Any scheduled frame is retired immediately.
    pub fn stop(&mut self) {
        self.cancel_pending();
        self.state.status = PlaybackStatus::Stopped;
        self.state.progress = 0.0;
        self.state.waypoint_index = 0;
        self.last_frame = None;
    }

    pub fn set_speed(&mut self, speed: f64) -> Result<(), PlaybackError> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(PlaybackError::InvalidSpeed(speed));
        }
        self.state.speed = speed;
        Ok(())
    }

    pub fn set_follow_drone(&mut self, follow: bool) {
        self.state.follow_drone = follow;
    }

    pub fn set_scenario(&mut self, scenario: Scenario) {
        self.state.scenario = scenario;
    }

    pub fn set_waypoint_index(&mut self, index: usize) {
        self.state.waypoint_index = index;
    }

    /// Stop, then restore speed, follow mode and scenario to their defaults.
    pub fn reset(&mut self) {
        self.stop();
        self.state = PlaybackState::default();
    }

    /// Advance playback for a frame delivered at `now`.
    ///
    /// `now` is any monotonic frame timestamp. The first frame after a start
    /// or resume only records the timestamp.
    pub fn tick(&mut self, token: FrameToken, now: Duration) -> TickOutcome {
        if !self.state.is_playing() || self.pending != Some(token) {
            return TickOutcome::Cancelled;
        }
        self.pending = None;

        let last = self.last_frame.unwrap_or(now);
        let delta_s = now.saturating_sub(last).as_secs_f64();
        self.last_frame = Some(now);

        let rate = BASE_PROGRESS_PER_SEC * self.state.speed;
        let next_progress = self.state.progress + rate * delta_s;

        if self.state.scenario == Scenario::EmergencyLanding && next_progress > EMERGENCY_CUTOFF {
            self.state.progress = EMERGENCY_CUTOFF;
            self.state.status = PlaybackStatus::Stopped;
            self.last_frame = None;
            return TickOutcome::Completed(Completion::EmergencyLanding);
        }

        if next_progress >= 1.0 {
            self.stop();
            return TickOutcome::Completed(Completion::PathFinished);
        }

        self.state.progress = next_progress;
        TickOutcome::Advanced {
            progress: next_progress,
            next: self.schedule(),
        }
    }

    fn schedule(&mut self) -> FrameToken {
        self.epoch += 1;
        let token = FrameToken { epoch: self.epoch };
        self.pending = Some(token);
        token
    }

    fn cancel_pending(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn advanced(outcome: TickOutcome) -> (f64, FrameToken) {
        match outcome {
            TickOutcome::Advanced { progress, next } => (progress, next),
            other => panic!("expected Advanced, got {other:?}"),
        }
    }

    #[test]
    fn first_frame_only_records_timestamp() {
        let mut clock = PlaybackClock::new();
        let token = clock.start();
        let (progress, _) = advanced(clock.tick(token, ms(5_000)));
        assert_eq!(progress, 0.0);
    }

    #[test]
    fn progress_integrates_speed_and_time() {
        let mut clock = PlaybackClock::new();
        clock.set_speed(2.0).unwrap();
        let token = clock.start();
        let (_, token) = advanced(clock.tick(token, ms(1_000)));
        let (progress, _) = advanced(clock.tick(token, ms(2_000)));
        assert!((progress - 0.1).abs() < 1e-12);
    }

    #[test]
    fn speed_change_applies_to_next_frame() {
        let mut clock = PlaybackClock::new();
        let token = clock.start();
        let (_, token) = advanced(clock.tick(token, ms(0)));
        let (_, token) = advanced(clock.tick(token, ms(1_000)));
        clock.set_speed(4.0).unwrap();
        let (progress, _) = advanced(clock.tick(token, ms(2_000)));
        assert!((progress - 0.25).abs() < 1e-12);
    }

    #[test]
    fn reaching_the_end_rewinds_and_stops() {
        let mut clock = PlaybackClock::new();
        let token = clock.start();
        let (_, token) = advanced(clock.tick(token, ms(0)));
        let outcome = clock.tick(token, ms(20_000));
        assert_eq!(outcome, TickOutcome::Completed(Completion::PathFinished));
        assert_eq!(clock.state().status, PlaybackStatus::Stopped);
        assert_eq!(clock.state().progress, 0.0);
    }

    #[test]
    fn emergency_landing_clamps_at_cutoff_in_one_frame() {
        let mut clock = PlaybackClock::new();
        clock.set_scenario(Scenario::EmergencyLanding);
        clock.set_speed(5.0).unwrap();
        let token = clock.start();
        let (_, token) = advanced(clock.tick(token, ms(0)));
        let (progress, token) = advanced(clock.tick(token, ms(3_000)));
        assert!((progress - 0.75).abs() < 1e-12);

        let outcome = clock.tick(token, ms(4_000));
        assert_eq!(outcome, TickOutcome::Completed(Completion::EmergencyLanding));
        assert_eq!(clock.state().progress, EMERGENCY_CUTOFF);
        assert!(!clock.state().is_playing());
    }

    #[test]
    fn emergency_cutoff_wins_over_path_end() {
        let mut clock = PlaybackClock::new();
        clock.set_scenario(Scenario::EmergencyLanding);
        let token = clock.start();
        let (_, token) = advanced(clock.tick(token, ms(0)));
        let outcome = clock.tick(token, ms(60_000));
        assert_eq!(outcome, TickOutcome::Completed(Completion::EmergencyLanding));
        assert_eq!(clock.state().progress, EMERGENCY_CUTOFF);
    }

    #[test]
    fn pause_excludes_paused_time() {
        let mut clock = PlaybackClock::new();
        let token = clock.start();
        let (_, token) = advanced(clock.tick(token, ms(0)));
        let (_, _) = advanced(clock.tick(token, ms(1_000)));
        clock.pause().unwrap();
        assert_eq!(clock.state().status, PlaybackStatus::Paused);

        let token = clock.resume().unwrap();
        let (progress, token) = advanced(clock.tick(token, ms(60_000)));
        assert!((progress - 0.05).abs() < 1e-12);
        let (progress, _) = advanced(clock.tick(token, ms(61_000)));
        assert!((progress - 0.1).abs() < 1e-12);
    }

    #[test]
    fn stop_retires_pending_frame() {
        let mut clock = PlaybackClock::new();
        let token = clock.start();
        let (_, pending) = advanced(clock.tick(token, ms(0)));
        clock.stop();
        assert_eq!(clock.tick(pending, ms(1_000)), TickOutcome::Cancelled);
        assert_eq!(clock.state().progress, 0.0);
        assert_eq!(clock.state().status, PlaybackStatus::Stopped);
    }

    #[test]
    fn restart_retires_frames_from_previous_run() {
        let mut clock = PlaybackClock::new();
        let old = clock.start();
        let fresh = clock.start();
        assert_eq!(clock.tick(old, ms(0)), TickOutcome::Cancelled);
        advanced(clock.tick(fresh, ms(0)));
    }

    #[test]
    fn consumed_token_cannot_fire_twice() {
        let mut clock = PlaybackClock::new();
        let token = clock.start();
        advanced(clock.tick(token, ms(0)));
        assert_eq!(clock.tick(token, ms(1_000)), TickOutcome::Cancelled);
    }

    #[test]
    fn invalid_transitions_are_refused() {
        let mut clock = PlaybackClock::new();
        assert_eq!(clock.pause(), Err(PlaybackError::NotPlaying));
        assert_eq!(clock.resume(), Err(PlaybackError::NotPaused));
        clock.start();
        assert_eq!(clock.resume(), Err(PlaybackError::AlreadyPlaying));
        assert_eq!(clock.set_speed(0.0), Err(PlaybackError::InvalidSpeed(0.0)));
        assert!(clock.set_speed(f64::NAN).is_err());
    }

    #[test]
    fn reset_restores_defaults() {
        let mut clock = PlaybackClock::new();
        clock.set_speed(3.0).unwrap();
        clock.set_follow_drone(true);
        clock.set_scenario(Scenario::HighWind);
        clock.start();
        clock.reset();
        assert_eq!(clock.state(), &PlaybackState::default());
    }
}
