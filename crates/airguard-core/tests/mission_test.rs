//! Mission controller integration tests.
//!
//! Replays operator sessions as command sequences against the built-in zone
//! table and checks the resulting risk, playback and camera behaviour.

use airguard_core::{
    default_zones, Command, Completion, Coordinate, Event, FrameToken, MapView, MissionController,
    MissionError, PanCommand, PlaybackStatus, Scenario, SettingsPatch, TickOutcome,
    WeatherCondition, WeatherSnapshot, FOLLOW_PAN_DURATION,
};
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct RecordingView {
    pans: Vec<PanCommand>,
}

impl MapView for RecordingView {
    fn pan_to(&mut self, command: PanCommand) {
        self.pans.push(command);
    }
}

fn mission() -> MissionController {
    MissionController::seeded(Arc::from(default_zones()), WeatherSnapshot::default(), 42)
}

/// Short hop south of the city, clear of every built-in zone.
fn open_field_route() -> Vec<Coordinate> {
    vec![Coordinate::new(12.85, 77.45), Coordinate::new(12.86, 77.46)]
}

/// Straight line across the airport square.
fn airport_route() -> Vec<Coordinate> {
    vec![Coordinate::new(13.1986, 77.65), Coordinate::new(13.1986, 77.75)]
}

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn start_token(events: &[Event]) -> FrameToken {
    events
        .iter()
        .find_map(|e| match e {
            Event::PlaybackStarted(token) | Event::PlaybackResumed(token) => Some(*token),
            _ => None,
        })
        .expect("playback should have started")
}

#[test]
fn test_airport_crossing_is_grounded() {
    let mut mission = mission();
    for point in airport_route() {
        mission.apply(Command::AddPoint(point)).unwrap();
    }

    let assessment = mission.assessment();
    assert_eq!(assessment.score, 100);
    assert!(assessment
        .violations
        .contains(&"CRITICAL: Enters No-Fly Zone (Kempegowda Int. Airport (KIA))".to_string()));

    let err = mission.apply(Command::Simulate).unwrap_err();
    assert_eq!(err, MissionError::Grounded { score: 100, limit: 50 });
    assert_eq!(mission.playback().status, PlaybackStatus::Stopped);
    assert!(mission.flight_logs().is_empty());
}

#[test]
fn test_altitude_limit_alone_still_flies() {
    let mut mission = mission();
    mission.apply(Command::SetPath(open_field_route())).unwrap();
    mission
        .apply(Command::UpdateSettings(SettingsPatch {
            altitude_m: Some(150.0),
            weight_class: None,
        }))
        .unwrap();

    let assessment = mission.assessment();
    assert_eq!(assessment.score, 50);
    assert_eq!(
        assessment.violations,
        vec!["Altitude violation: 150m > 120m limit".to_string()]
    );

    // 50 is not above the grounding limit
    let events = mission.apply(Command::Simulate).unwrap();
    assert!(matches!(events.as_slice(), [Event::FlightLogged(_), Event::PlaybackStarted(_)]));
}

#[test]
fn test_weather_replacement_rescores() {
    let mut mission = mission();
    mission.apply(Command::SetPath(open_field_route())).unwrap();
    assert_eq!(mission.assessment().score, 0);

    let storm = WeatherSnapshot {
        wind_speed_kmh: 35.0,
        condition: WeatherCondition::Storm,
        flyable: false,
        ..WeatherSnapshot::default()
    };
    let events = mission.apply(Command::ReplaceWeather(storm)).unwrap();
    assert!(matches!(events.as_slice(), [Event::RiskUpdated(a)] if a.score == 100));
    assert!(mission.is_grounded());
}

#[test]
fn test_stop_retires_pending_frame() {
    let mut mission = mission();
    let mut view = RecordingView::default();
    mission.apply(Command::SetPath(open_field_route())).unwrap();

    let token = start_token(&mission.apply(Command::Simulate).unwrap());
    let first = mission.on_frame(token, ms(0), &mut view);
    let pending = first.next_frame().unwrap();
    let second = mission.on_frame(pending, ms(2_000), &mut view);
    let zombie = second.next_frame().unwrap();

    mission.apply(Command::Stop).unwrap();
    let report = mission.on_frame(zombie, ms(4_000), &mut view);
    assert_eq!(report.outcome, TickOutcome::Cancelled);
    assert_eq!(mission.playback().progress, 0.0);
    assert_eq!(mission.playback().status, PlaybackStatus::Stopped);
}

#[test]
fn test_pause_then_resume_ignores_paused_time() {
    let mut mission = mission();
    let mut view = RecordingView::default();
    mission.apply(Command::SetPath(open_field_route())).unwrap();

    let token = start_token(&mission.apply(Command::Simulate).unwrap());
    let report = mission.on_frame(token, ms(0), &mut view);
    let report = mission.on_frame(report.next_frame().unwrap(), ms(2_000), &mut view);
    let stale = report.next_frame().unwrap();

    mission.apply(Command::TogglePlayback).unwrap();
    assert_eq!(mission.playback().status, PlaybackStatus::Paused);
    assert_eq!(mission.on_frame(stale, ms(3_000), &mut view).outcome, TickOutcome::Cancelled);

    let token = start_token(&mission.apply(Command::TogglePlayback).unwrap());
    let report = mission.on_frame(token, ms(90_000), &mut view);
    assert!(matches!(
        report.outcome,
        TickOutcome::Advanced { progress, .. } if (progress - 0.1).abs() < 1e-9
    ));
}

#[test]
fn test_emergency_landing_ends_at_cutoff() {
    let mut mission = mission();
    let mut view = RecordingView::default();
    mission.apply(Command::SetPath(open_field_route())).unwrap();
    mission.apply(Command::SetScenario(Scenario::EmergencyLanding)).unwrap();
    mission.apply(Command::SetSpeed(4.0)).unwrap();

    let token = start_token(&mission.apply(Command::Simulate).unwrap());
    let report = mission.on_frame(token, ms(0), &mut view);
    let report = mission.on_frame(report.next_frame().unwrap(), ms(3_000), &mut view);
    let marker = report.marker.unwrap();
    assert!(marker.emergency, "drifting past 0.4 progress");

    let report = mission.on_frame(report.next_frame().unwrap(), ms(5_000), &mut view);
    assert_eq!(report.outcome, TickOutcome::Completed(Completion::EmergencyLanding));
    assert_eq!(report.notice(), Some("SIMULATION ENDED: Emergency Landing Executed."));
    assert!(report.next_frame().is_none());
    assert_eq!(mission.playback().progress, 0.8);
    assert!(!mission.playback().is_playing());
}

#[test]
fn test_path_end_rewinds() {
    let mut mission = mission();
    let mut view = RecordingView::default();
    mission.apply(Command::SetPath(open_field_route())).unwrap();

    let token = start_token(&mission.apply(Command::Simulate).unwrap());
    let report = mission.on_frame(token, ms(0), &mut view);
    let report = mission.on_frame(report.next_frame().unwrap(), ms(25_000), &mut view);
    assert_eq!(report.outcome, TickOutcome::Completed(Completion::PathFinished));
    assert_eq!(report.notice(), None);
    assert_eq!(report.marker.map(|m| m.position), Some(open_field_route()[0]));
    assert_eq!(mission.playback().progress, 0.0);
}

#[test]
fn test_follow_camera_tracks_drone() {
    let mut mission = mission();
    let mut view = RecordingView::default();
    mission.apply(Command::SetPath(open_field_route())).unwrap();

    // Not following: the view is left alone
    let token = start_token(&mission.apply(Command::Simulate).unwrap());
    let report = mission.on_frame(token, ms(0), &mut view);
    assert!(report.pan.is_none());
    assert!(view.pans.is_empty());

    mission.apply(Command::SetFollowDrone(true)).unwrap();
    let report = mission.on_frame(report.next_frame().unwrap(), ms(1_000), &mut view);
    let marker = report.marker.unwrap();
    assert_eq!(
        view.pans,
        vec![PanCommand {
            target: marker.position,
            animation: FOLLOW_PAN_DURATION,
        }]
    );
}

#[test]
fn test_load_mission_resets_session() {
    let mut mission = mission();
    mission.apply(Command::SetPath(open_field_route())).unwrap();
    mission.apply(Command::SetSpeed(5.0)).unwrap();
    mission.apply(Command::SetFollowDrone(true)).unwrap();
    mission.apply(Command::Simulate).unwrap();

    let saved = mission.snapshot_mission(Some("Airport run"));
    let mut other = saved.clone();
    other.path = airport_route();

    let events = mission.apply(Command::LoadMission(other)).unwrap();
    assert_eq!(events[0], Event::PlaybackStopped);
    assert_eq!(mission.path(), airport_route().as_slice());
    assert_eq!(mission.playback().speed, 1.0);
    assert!(!mission.playback().follow_drone);
    assert_eq!(mission.assessment().score, 100);

    mission.apply(Command::LoadMission(saved)).unwrap();
    assert_eq!(mission.assessment().score, 0);
}

#[test]
fn test_flight_logs_feed_analytics() {
    let mut mission = mission();
    mission.apply(Command::SetPath(open_field_route())).unwrap();
    mission.apply(Command::Simulate).unwrap();
    mission
        .apply(Command::UpdateSettings(SettingsPatch {
            altitude_m: Some(130.0),
            weight_class: None,
        }))
        .unwrap();
    mission.apply(Command::Stop).unwrap();
    mission.apply(Command::Simulate).unwrap();

    let logs = mission.flight_logs();
    assert_eq!(logs.len(), 2);
    // Newest first
    assert_eq!(logs[0].risk_score, 50);
    assert_eq!(logs[1].risk_score, 0);

    let analytics = mission.analytics().unwrap();
    assert_eq!(analytics.total_flights, 2);
    assert_eq!(analytics.avg_risk, 25);
    assert_eq!(analytics.approval_rate, 100);
}
