//! Where colors go. On the desk this is a serial port to a microcontroller driving the strip.
use smart_leds::RGB8;
use smart_leds::colors::BLACK;

use crate::errors::MyResult;
use crate::logging::debug;

/// what gets sent when the lights should be dark
pub const OFF: RGB8 = BLACK;

/// One-way, unacknowledged color output. Only one writer per sink.
pub trait LightSink: Send {
    /// opening an open sink does nothing
    fn open(&mut self) -> MyResult<()>;

    /// must be safe to call on a closed sink
    fn close(&mut self) -> MyResult<()>;

    fn send(&mut self, color: RGB8) -> MyResult<()>;
}

/// For running without any hardware attached. Everything succeeds.
#[derive(Debug, Default)]
pub struct NullSink;

impl LightSink for NullSink {
    fn open(&mut self) -> MyResult<()> {
        debug!("output disabled. not opening anything");
        Ok(())
    }

    fn close(&mut self) -> MyResult<()> {
        Ok(())
    }

    fn send(&mut self, _color: RGB8) -> MyResult<()> {
        Ok(())
    }
}
