//! The control loop: peaks per band -> dominant band -> brightness -> color -> sink
mod bands;
mod baseline;
mod observer;
mod reactive;

pub use bands::{BASS, Band, DOMINANCE_WINDOW, DominanceTracker, HIGH, INITIAL_RANGE, MID};
pub use baseline::{EnergyBaseline, MIN_ENERGY_SPAN};
pub use observer::{ControllerObserver, FrameReport, LogObserver};
pub use reactive::{ReactiveController, ReactiveLoop};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerStatus {
    Idle,
    Running,
    /// after teardown. nothing works from here
    Stopped,
}
