use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use log::info;
use reactive_lights_core::config::ControllerConfig;
use reactive_lights_core::errors::MyResult;
use reactive_lights_core::output::{LightSink, NullSink, OFF};
use serialport::SerialPort;
use smart_leds::RGB8;

pub const BAUD_RATE: u32 = 115_200;
pub const WRITE_TIMEOUT: Duration = Duration::from_millis(50);

/// opening the port resets the board. give it time to boot
pub const SETTLE_TIME: Duration = Duration::from_millis(300);

/// A microcontroller on a serial port that reads 3 raw bytes at a time: red, green, blue.
pub struct SerialSink {
    port_name: String,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialSink {
    pub fn new(port_name: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            port: None,
        }
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn is_open(&self) -> bool {
        self.port.is_some()
    }
}

impl LightSink for SerialSink {
    fn open(&mut self) -> MyResult<()> {
        if self.port.is_some() {
            return Ok(());
        }

        let port = serialport::new(&self.port_name, BAUD_RATE)
            .timeout(WRITE_TIMEOUT)
            .open()
            .map_err(io::Error::from)?;

        thread::sleep(SETTLE_TIME);

        info!("opened {} @ {} baud", self.port_name, BAUD_RATE);

        self.port = Some(port);

        Ok(())
    }

    /// turns the light off on the way out
    fn close(&mut self) -> MyResult<()> {
        let Some(mut port) = self.port.take() else {
            return Ok(());
        };

        port.write_all(&[OFF.r, OFF.g, OFF.b])?;
        port.flush()?;

        info!("closed {}", self.port_name);

        Ok(())
    }

    fn send(&mut self, color: RGB8) -> MyResult<()> {
        let port = self.port.as_mut().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotConnected, "serial port is not open")
        })?;

        port.write_all(&[color.r, color.g, color.b])?;

        Ok(())
    }
}

/// the serial port, or nothing at all if output is turned off
pub fn light_sink(config: &ControllerConfig) -> Box<dyn LightSink> {
    if config.output_enabled {
        Box::new(SerialSink::new(config.output_port.clone()))
    } else {
        Box::new(NullSink)
    }
}
