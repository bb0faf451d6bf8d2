use crate::audio::{FrequencyRange, Peak, Pitch};
use crate::controller::Band;
use crate::errors::MyError;
use crate::lights::Color;
use crate::logging::{debug, trace, warn};

/// What one iteration of the control loop decided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub band: &'static str,
    pub range: FrequencyRange,
    pub peak: Peak,
    pub upper_energy: f32,
    pub power: f32,
    /// the powered color that was sent
    pub color: Color,
}

/// Hooks into the control loop. Given to the controller when it's built and called from the loop's thread.
pub trait ControllerObserver: Send {
    fn frame(&mut self, report: &FrameReport);

    /// a dominance window closed and `winner` carries over
    fn window_rolled(&mut self, winner: &Band);

    /// a single frame failed but the loop keeps going
    fn skipped(&mut self, error: &MyError);
}

/// Sends everything to the `log` macros.
#[derive(Debug, Default)]
pub struct LogObserver;

impl ControllerObserver for LogObserver {
    fn frame(&mut self, report: &FrameReport) {
        let pitch = Pitch::from_frequency(report.peak.frequency_hz);

        trace!(
            "frame {}: {} {} {:.1} Hz ({}) energy {:.3}/{:.3} -> power {:.1} -> {}",
            report.frame,
            report.band,
            report.range,
            report.peak.frequency_hz,
            pitch.map(|x| x.to_string()).unwrap_or_else(|| "-".into()),
            report.peak.energy,
            report.upper_energy,
            report.power,
            report.color,
        );
    }

    fn window_rolled(&mut self, winner: &Band) {
        debug!(
            "dominance window closed. {} ({}) won with {} frames",
            winner.name, winner.range, winner.count
        );
    }

    fn skipped(&mut self, error: &MyError) {
        warn!("skipping: {}", error);
    }
}
