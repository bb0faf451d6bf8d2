use thiserror::Error;

use crate::controller::ControllerStatus;

/// i don't love one enum for everything, but the controller needs to sort these into "log and keep going" and "give up"
#[derive(Error, Debug)]
pub enum MyError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("no spectrum bins strictly inside {low_hz}..{high_hz} Hz")]
    EmptyRange { low_hz: u32, high_hz: u32 },
    #[error("{low_hz}..{high_hz} Hz is too narrow for {colors} colors")]
    DegenerateRange {
        low_hz: u32,
        high_hz: u32,
        colors: usize,
    },
    #[error("a palette needs at least one color")]
    EmptyPalette,
    #[error("cannot {operation} while {status:?}")]
    Lifecycle {
        operation: &'static str,
        status: ControllerStatus,
    },
    #[error("output sink error: {0}")]
    Sink(#[from] std::io::Error),
}

impl MyError {
    /// a single frame hitting one of these should not stop the control loop
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::EmptyRange { .. } | Self::DegenerateRange { .. })
    }
}

pub type MyResult<T> = Result<T, MyError>;
