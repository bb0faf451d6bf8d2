//! Stand-ins for the microphone and the serial port.
use core::f32::consts::PI;
use std::sync::{Arc, Mutex};

use smart_leds::RGB8;

use crate::audio::{AnalyzerConfig, Capture, CaptureDevice, SpectrumProcessor};
use crate::errors::{MyError, MyResult};
use crate::output::LightSink;

/// a sine that lands exactly on `bin`
pub fn sine(chunk: usize, bin: usize, amplitude: f32) -> Vec<f32> {
    (0..chunk)
        .map(|i| amplitude * (2.0 * PI * bin as f32 * i as f32 / chunk as f32).sin())
        .collect()
}

struct FeederState {
    processor: SpectrumProcessor,
    running: bool,
    starts: usize,
    stops: usize,
    /// starting and stopping fail while this is set
    broken: bool,
}

/// The test's end of a [`ManualCapture`]. Frames pushed while the capture is stopped are dropped, just like a real
/// device that isn't delivering.
#[derive(Clone)]
pub struct Feeder(Arc<Mutex<FeederState>>);

impl Feeder {
    pub fn push(&self, frame: &[f32]) -> bool {
        let mut state = self.0.lock().unwrap();

        if state.running {
            state.processor.process_frame(frame);
        }

        state.running
    }

    pub fn starts(&self) -> usize {
        self.0.lock().unwrap().starts
    }

    pub fn stops(&self) -> usize {
        self.0.lock().unwrap().stops
    }

    pub fn break_capture(&self) {
        self.0.lock().unwrap().broken = true;
    }
}

fn unplugged() -> MyError {
    MyError::Configuration("the microphone was unplugged".into())
}

pub struct ManualCapture(Feeder);

impl Capture for ManualCapture {
    fn start(&mut self) -> MyResult<()> {
        let mut state = self.0.0.lock().unwrap();
        if state.broken {
            return Err(unplugged());
        }
        state.running = true;
        state.starts += 1;
        Ok(())
    }

    fn stop(&mut self) -> MyResult<()> {
        let mut state = self.0.0.lock().unwrap();
        if state.broken {
            return Err(unplugged());
        }
        state.running = false;
        state.stops += 1;
        Ok(())
    }
}

#[derive(Default)]
pub struct ManualDevice {
    refuse: bool,
    feeder: Mutex<Option<Feeder>>,
}

impl ManualDevice {
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Default::default()
        }
    }

    /// available once the device has been opened
    pub fn feeder(&self) -> Option<Feeder> {
        self.feeder.lock().unwrap().clone()
    }
}

impl CaptureDevice for ManualDevice {
    type Capture = ManualCapture;

    fn open(
        &self,
        config: &AnalyzerConfig,
        processor: SpectrumProcessor,
    ) -> MyResult<Self::Capture> {
        if self.refuse {
            return Err(MyError::Configuration(format!(
                "device {:?} cannot record at {} Hz",
                config.device_index, config.sample_rate_hz
            )));
        }

        let feeder = Feeder(Arc::new(Mutex::new(FeederState {
            processor,
            running: false,
            starts: 0,
            stops: 0,
            broken: false,
        })));

        *self.feeder.lock().unwrap() = Some(feeder.clone());

        Ok(ManualCapture(feeder))
    }
}

#[derive(Debug, Default)]
pub struct SinkLog {
    pub opens: usize,
    pub closes: usize,
    pub is_open: bool,
    pub sent: Vec<RGB8>,
    /// every send fails while this is set
    pub broken: bool,
}

/// Remembers everything it was asked to do.
#[derive(Clone, Default)]
pub struct RecordingSink(pub Arc<Mutex<SinkLog>>);

impl RecordingSink {
    pub fn sent(&self) -> Vec<RGB8> {
        self.0.lock().unwrap().sent.clone()
    }

    pub fn break_sends(&self) {
        self.0.lock().unwrap().broken = true;
    }
}

impl LightSink for RecordingSink {
    fn open(&mut self) -> MyResult<()> {
        let mut log = self.0.lock().unwrap();
        log.opens += 1;
        log.is_open = true;
        Ok(())
    }

    fn close(&mut self) -> MyResult<()> {
        let mut log = self.0.lock().unwrap();
        log.closes += 1;
        log.is_open = false;
        Ok(())
    }

    fn send(&mut self, color: RGB8) -> MyResult<()> {
        let mut log = self.0.lock().unwrap();

        if log.broken {
            return Err(std::io::Error::other("unplugged").into());
        }

        log.sent.push(color);
        Ok(())
    }
}
