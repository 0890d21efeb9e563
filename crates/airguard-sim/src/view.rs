//! Headless map view: camera pans become log lines.

use airguard_core::{MapView, PanCommand};

#[derive(Debug, Default)]
pub struct LogView {
    pans: u64,
    last: Option<PanCommand>,
}

impl LogView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pan_count(&self) -> u64 {
        self.pans
    }

    pub fn last_pan(&self) -> Option<PanCommand> {
        self.last
    }
}

impl MapView for LogView {
    fn pan_to(&mut self, command: PanCommand) {
        self.pans += 1;
        self.last = Some(command);
        tracing::debug!(
            lat = command.target.lat,
            lon = command.target.lon,
            animation_ms = command.animation.as_millis() as u64,
            "Camera pan"
        );
    }
}
