//! Follow camera: keeps an external map view centred on the simulated drone.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::models::Coordinate;
use crate::playback::PlaybackState;

/// Short pan so following stays smooth at frame rate.
pub const FOLLOW_PAN_DURATION: Duration = Duration::from_millis(100);

/// Re-center request for the map view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanCommand {
    pub target: Coordinate,
    pub animation: Duration,
}

/// The map renderer the camera drives.
pub trait MapView {
    fn pan_to(&mut self, command: PanCommand);
}

#[derive(Debug, Clone, Copy)]
pub struct FollowCamera {
    animation: Duration,
}

impl Default for FollowCamera {
    fn default() -> Self {
        Self::new(FOLLOW_PAN_DURATION)
    }
}

impl FollowCamera {
    pub fn new(animation: Duration) -> Self {
        Self { animation }
    }

    /// Pan command for this progress update, if following is active.
    /// Stopped or paused playback never pans, so manual panning is left alone.
    pub fn follow(&self, state: &PlaybackState, position: Coordinate) -> Option<PanCommand> {
        if !state.is_playing() || !state.follow_drone {
            return None;
        }
        Some(PanCommand {
            target: position,
            animation: self.animation,
        })
    }

    /// Issue the pan to `view` when following is active. Returns the command sent.
    pub fn update(
        &self,
        state: &PlaybackState,
        position: Coordinate,
        view: &mut dyn MapView,
    ) -> Option<PanCommand> {
        let command = self.follow(state, position)?;
        view.pan_to(command);
        Some(command)
    }
}
