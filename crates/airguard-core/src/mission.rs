//! Mission controller.
//!
//! Owns the planning state (path, settings, weather, playback) and mutates it
//! only through [`Command`]s, so a session can be replayed exactly from its
//! command log. Risk is recomputed synchronously after every change to an
//! input of the evaluator.

use rand::rngs::StdRng;
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::camera::{FollowCamera, MapView, PanCommand};
use crate::error::MissionError;
use crate::geometry;
use crate::models::{Coordinate, DroneSettings, SettingsPatch};
use crate::playback::{
    Completion, FrameToken, PlaybackClock, PlaybackState, PlaybackStatus, TickOutcome,
};
use crate::records::{FlightAnalytics, FlightLog, FlightStats, SavedMission};
use crate::risk::{self, RiskAssessment};
use crate::rules::RiskRules;
use crate::scenario::{self, Perturber, Scenario};
use crate::weather::WeatherSnapshot;
use crate::zones::Zone;

/// Number of flight logs kept in memory, newest first.
const RECENT_LOG_LIMIT: usize = 10;

/// Operator and system commands accepted by the controller.
#[derive(Debug, Clone)]
pub enum Command {
    AddPoint(Coordinate),
    UpdatePoint { index: usize, point: Coordinate },
    RemoveLastPoint,
    SetPath(Vec<Coordinate>),
    ClearPath,
    LoadMission(SavedMission),
    UpdateSettings(SettingsPatch),
    ReplaceWeather(WeatherSnapshot),
    /// Gate on risk, record a flight log and start playback from the beginning.
    Simulate,
    TogglePlayback,
    Pause,
    Resume,
    Stop,
    SetSpeed(f64),
    SetFollowDrone(bool),
    SetScenario(Scenario),
}

/// Observable effects of a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    RiskUpdated(RiskAssessment),
    FlightLogged(FlightLog),
    /// Playback is running; deliver the token with the next frame.
    PlaybackStarted(FrameToken),
    PlaybackPaused,
    PlaybackResumed(FrameToken),
    PlaybackStopped,
}

/// Simulated drone marker for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DroneMarker {
    pub position: Coordinate,
    /// Emergency presentation (drifting off course)
    pub emergency: bool,
}

/// Everything that happened during one frame, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub outcome: TickOutcome,
    pub marker: Option<DroneMarker>,
    pub pan: Option<PanCommand>,
}

impl FrameReport {
    /// Token for the next frame, if playback continues.
    pub fn next_frame(&self) -> Option<FrameToken> {
        match self.outcome {
            TickOutcome::Advanced { next, .. } => Some(next),
            _ => None,
        }
    }

    /// User-facing notification raised by this frame.
    pub fn notice(&self) -> Option<&'static str> {
        match self.outcome {
            TickOutcome::Completed(completion) => completion.notice(),
            _ => None,
        }
    }
}

pub struct MissionController<R: Rng = StdRng> {
    path: Vec<Coordinate>,
    settings: DroneSettings,
    zones: Arc<[Zone]>,
    weather: WeatherSnapshot,
    rules: RiskRules,
    assessment: RiskAssessment,
    clock: PlaybackClock,
    perturber: Perturber<R>,
    camera: FollowCamera,
    logs: Vec<FlightLog>,
}

impl MissionController<StdRng> {
    /// Controller with a reproducible random source.
    pub fn seeded(zones: Arc<[Zone]>, weather: WeatherSnapshot, seed: u64) -> Self {
        Self::new(zones, weather, Perturber::seeded(seed))
    }
}

impl<R: Rng> MissionController<R> {
    pub fn new(zones: Arc<[Zone]>, weather: WeatherSnapshot, perturber: Perturber<R>) -> Self {
        Self {
            path: Vec::new(),
            settings: DroneSettings::default(),
            zones,
            weather,
            rules: RiskRules::default(),
            assessment: RiskAssessment::default(),
            clock: PlaybackClock::new(),
            perturber,
            camera: FollowCamera::default(),
            logs: Vec::new(),
        }
    }

    pub fn with_rules(mut self, rules: RiskRules) -> Self {
        self.rules = rules;
        self.recalculate_risk();
        self
    }

    pub fn path(&self) -> &[Coordinate] {
        &self.path
    }

    pub fn settings(&self) -> &DroneSettings {
        &self.settings
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn weather(&self) -> &WeatherSnapshot {
        &self.weather
    }

    pub fn assessment(&self) -> &RiskAssessment {
        &self.assessment
    }

    pub fn playback(&self) -> &PlaybackState {
        self.clock.state()
    }

    pub fn flight_logs(&self) -> &[FlightLog] {
        &self.logs
    }

    pub fn analytics(&self) -> Option<FlightAnalytics> {
        FlightAnalytics::from_logs(&self.logs)
    }

    pub fn stats(&self) -> FlightStats {
        FlightStats::for_path(&self.path)
    }

    pub fn is_grounded(&self) -> bool {
        self.assessment.is_grounded_with_rules(&self.rules)
    }

    /// Capture the current path and settings for external storage.
    pub fn snapshot_mission(&self, name: Option<&str>) -> SavedMission {
        SavedMission::new(name, self.path.clone(), self.settings)
    }

    /// Unperturbed marker position at the current progress.
    pub fn resting_marker(&self) -> Option<DroneMarker> {
        let state = self.clock.state();
        Some(DroneMarker {
            position: self.position_at(state.progress)?,
            emergency: scenario::is_emergency(state.scenario, state.progress),
        })
    }

    pub fn apply(&mut self, command: Command) -> Result<Vec<Event>, MissionError> {
        tracing::debug!(?command, "Applying command");
        match command {
            Command::AddPoint(point) => {
                self.ensure_editable()?;
                self.path.push(point);
                Ok(vec![self.recalculate_risk()])
            }
            Command::UpdatePoint { index, point } => {
                self.ensure_editable()?;
                let len = self.path.len();
                let slot = self
                    .path
                    .get_mut(index)
                    .ok_or(MissionError::WaypointOutOfRange { index, len })?;
                *slot = point;
                Ok(vec![self.recalculate_risk()])
            }
            Command::RemoveLastPoint => {
                self.ensure_editable()?;
                self.path.pop();
                Ok(vec![self.recalculate_risk()])
            }
            Command::SetPath(path) => {
                self.path = path;
                let mut events = self.stop_playback();
                events.push(self.recalculate_risk());
                Ok(events)
            }
            Command::ClearPath => {
                self.path.clear();
                let mut events = self.stop_playback();
                self.clock.reset();
                events.push(self.recalculate_risk());
                Ok(events)
            }
            Command::LoadMission(mission) => {
                tracing::info!(
                    mission = %mission.name,
                    points = mission.path.len(),
                    "Loading mission"
                );
                self.path = mission.path;
                self.settings = mission.settings;
                let mut events = self.stop_playback();
                self.clock.reset();
                events.push(self.recalculate_risk());
                Ok(events)
            }
            Command::UpdateSettings(patch) => {
                self.settings.apply(patch);
                Ok(vec![self.recalculate_risk()])
            }
            Command::ReplaceWeather(snapshot) => {
                self.weather = snapshot;
                Ok(vec![self.recalculate_risk()])
            }
            Command::Simulate => self.simulate(),
            Command::TogglePlayback => match self.clock.state().status {
                PlaybackStatus::Playing => self.apply(Command::Pause),
                PlaybackStatus::Paused => self.apply(Command::Resume),
                PlaybackStatus::Stopped => {
                    self.ensure_flyable()?;
                    let token = self.clock.start();
                    tracing::info!("Playback started");
                    Ok(vec![Event::PlaybackStarted(token)])
                }
            },
            Command::Pause => {
                self.clock.pause()?;
                tracing::info!(progress = self.clock.state().progress, "Playback paused");
                Ok(vec![Event::PlaybackPaused])
            }
            Command::Resume => {
                self.ensure_path()?;
                let token = self.clock.resume()?;
                tracing::info!(progress = self.clock.state().progress, "Playback resumed");
                Ok(vec![Event::PlaybackResumed(token)])
            }
            Command::Stop => Ok(self.stop_playback()),
            Command::SetSpeed(speed) => {
                self.clock.set_speed(speed)?;
                Ok(Vec::new())
            }
            Command::SetFollowDrone(follow) => {
                self.clock.set_follow_drone(follow);
                Ok(Vec::new())
            }
            Command::SetScenario(scenario) => {
                self.clock.set_scenario(scenario);
                Ok(Vec::new())
            }
        }
    }

    /// Advance playback for a frame delivered at `now` and follow the drone
    /// with `view`. Progress, perturbation and camera pan complete before
    /// this returns; schedule the next frame with [`FrameReport::next_frame`].
    pub fn on_frame(
        &mut self,
        token: FrameToken,
        now: Duration,
        view: &mut dyn MapView,
    ) -> FrameReport {
        let outcome = self.clock.tick(token, now);
        match outcome {
            TickOutcome::Cancelled => FrameReport {
                outcome,
                marker: None,
                pan: None,
            },
            TickOutcome::Advanced { progress, .. } => {
                let distance_km = self.distance_at(progress);
                if let Some(index) = distance_km
                    .and_then(|km| geometry::waypoint_index_at_distance(&self.path, km).ok())
                {
                    self.clock.set_waypoint_index(index);
                }

                let state = self.clock.state().clone();
                let marker = self.position_at(progress).map(|base| DroneMarker {
                    position: self.perturber.perturb(base, progress, state.scenario, true),
                    emergency: scenario::is_emergency(state.scenario, progress),
                });
                let pan = marker.and_then(|m| self.camera.update(&state, m.position, view));

                tracing::trace!(progress, waypoint = state.waypoint_index, "Frame");
                FrameReport {
                    outcome,
                    marker,
                    pan,
                }
            }
            TickOutcome::Completed(completion) => {
                match completion {
                    Completion::PathFinished => tracing::info!("Playback reached end of path"),
                    Completion::EmergencyLanding => {
                        tracing::warn!("Simulation ended: emergency landing executed")
                    }
                }
                FrameReport {
                    outcome,
                    marker: self.resting_marker(),
                    pan: None,
                }
            }
        }
    }

    fn simulate(&mut self) -> Result<Vec<Event>, MissionError> {
        self.ensure_flyable()?;

        let mut events = self.stop_playback();
        let log = FlightLog::record(&self.path, &self.settings, &self.assessment, &self.rules);
        self.logs.insert(0, log.clone());
        self.logs.truncate(RECENT_LOG_LIMIT);
        events.push(Event::FlightLogged(log));

        let token = self.clock.start();
        tracing::info!(
            points = self.path.len(),
            score = self.assessment.score,
            scenario = %self.clock.state().scenario,
            "Simulation started"
        );
        events.push(Event::PlaybackStarted(token));
        Ok(events)
    }

    fn stop_playback(&mut self) -> Vec<Event> {
        let was_active = self.clock.state().status != PlaybackStatus::Stopped;
        self.clock.stop();
        if was_active {
            tracing::info!("Playback stopped");
            vec![Event::PlaybackStopped]
        } else {
            Vec::new()
        }
    }

    fn recalculate_risk(&mut self) -> Event {
        self.assessment = risk::evaluate_with_rules(
            &self.path,
            &self.settings,
            &self.zones,
            &self.weather,
            &self.rules,
        );
        tracing::debug!(
            score = self.assessment.score,
            violations = self.assessment.violations.len(),
            "Risk recalculated"
        );
        Event::RiskUpdated(self.assessment.clone())
    }

    fn ensure_editable(&self) -> Result<(), MissionError> {
        if self.clock.state().is_playing() {
            return Err(MissionError::PathLocked);
        }
        Ok(())
    }

    fn ensure_path(&self) -> Result<(), MissionError> {
        if self.path.len() < 2 {
            return Err(MissionError::InsufficientPath {
                points: self.path.len(),
            });
        }
        Ok(())
    }

    fn ensure_flyable(&self) -> Result<(), MissionError> {
        self.ensure_path()?;
        if self.is_grounded() {
            tracing::info!(score = self.assessment.score, "Simulation refused: aircraft grounded");
            return Err(MissionError::Grounded {
                score: self.assessment.score,
                limit: self.rules.grounded_above,
            });
        }
        Ok(())
    }

    fn distance_at(&self, progress: f64) -> Option<f64> {
        geometry::path_length_km(&self.path)
            .ok()
            .map(|total| total * progress)
    }

    fn position_at(&self, progress: f64) -> Option<Coordinate> {
        let distance_km = self.distance_at(progress)?;
        geometry::point_at_distance(&self.path, distance_km).ok()
    }
}
