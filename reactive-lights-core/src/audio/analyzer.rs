use std::time::Duration;

use crate::audio::spectrum::{Spectra, SpectrumProcessor, SpectrumReader, spectrum_channel};
use crate::audio::{FrequencyAxis, FrequencyRange};
use crate::errors::{MyError, MyResult};
use crate::logging::{info, warn};
use crate::windows::HanningWindow;

/// What to ask the audio device for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// samples per frame. powers of two keep the fft fast
    pub chunk_size: usize,
    pub channels: u16,
    pub sample_rate_hz: u32,
    /// index into the host's input devices. `None` uses the default input device
    pub device_index: Option<usize>,
}

impl AnalyzerConfig {
    pub fn validate(&self) -> MyResult<()> {
        if self.chunk_size == 0 {
            return Err(MyError::Configuration(
                "chunk size must be positive".into(),
            ));
        }
        if self.channels == 0 {
            return Err(MyError::Configuration(
                "channel count must be positive".into(),
            ));
        }
        if self.sample_rate_hz == 0 {
            return Err(MyError::Configuration(
                "sample rate must be positive".into(),
            ));
        }

        if !self.chunk_size.is_power_of_two() {
            warn!(
                "chunk size {} is not a power of two. the fft will be slower",
                self.chunk_size
            );
        }

        Ok(())
    }

    /// how long one frame of audio lasts
    pub fn cadence(&self) -> Duration {
        Duration::from_secs_f64(self.chunk_size as f64 / self.sample_rate_hz as f64)
    }
}

/// A running (or paused) source of frames. Dropping it releases the device.
pub trait Capture: Send {
    fn start(&mut self) -> MyResult<()>;

    fn stop(&mut self) -> MyResult<()>;
}

/// Something that can open a [`Capture`]. The capture owns the processor and calls
/// [`SpectrumProcessor::process_frame`] once per `chunk_size` mono samples.
pub trait CaptureDevice {
    type Capture: Capture + 'static;

    /// Open the input paused. Fails with `MyError::Configuration` if the device can't do what was asked.
    fn open(
        &self,
        config: &AnalyzerConfig,
        processor: SpectrumProcessor,
    ) -> MyResult<Self::Capture>;
}

/// The loudest increase inside a band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub frequency_hz: f32,
    pub energy: f32,
}

pub struct SpectralAnalyzer {
    config: AnalyzerConfig,
    axis: FrequencyAxis,
    reader: SpectrumReader,
    capture: Box<dyn Capture>,
    capturing: bool,
}

impl SpectralAnalyzer {
    pub fn configure<D: CaptureDevice>(config: AnalyzerConfig, device: &D) -> MyResult<Self> {
        config.validate()?;

        let axis = FrequencyAxis::new(config.chunk_size, config.sample_rate_hz);

        let (processor, reader) = spectrum_channel::<HanningWindow>(config.chunk_size);

        let capture = device.open(&config, processor)?;

        info!(
            "audio input configured: {} samples x {} channels @ {} Hz ({} bins)",
            config.chunk_size,
            config.channels,
            config.sample_rate_hz,
            axis.len()
        );

        Ok(Self {
            config,
            axis,
            reader,
            capture: Box::new(capture),
            capturing: false,
        })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn axis(&self) -> &FrequencyAxis {
        &self.axis
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    pub fn start(&mut self) -> MyResult<()> {
        if self.capturing {
            return Ok(());
        }

        self.capture.start()?;
        self.capturing = true;

        info!("audio stream started");

        Ok(())
    }

    /// stop capturing. the last spectra stay readable
    pub fn stop(&mut self) -> MyResult<()> {
        if !self.capturing {
            return Ok(());
        }

        self.capture.stop()?;
        self.capturing = false;

        info!("audio stream stopped");

        Ok(())
    }

    /// the newest spectra the capture has published
    pub fn spectra(&mut self) -> &Spectra {
        self.reader.latest()
    }

    /// Peak delta for each range, all from the same frame.
    ///
    /// Each range gets its own result so one range that is too narrow doesn't hide the others.
    pub fn peak_deltas(&mut self, ranges: &[FrequencyRange]) -> Vec<MyResult<Peak>> {
        let spectra = self.reader.latest();

        ranges
            .iter()
            .map(|&range| peak_in(&self.axis, &spectra.delta, range))
            .collect()
    }

    /// Like [`Self::peak_deltas`], but any range without bins fails the whole call.
    pub fn peak_delta_in_bands(&mut self, ranges: &[FrequencyRange]) -> MyResult<Vec<Peak>> {
        self.peak_deltas(ranges).into_iter().collect()
    }
}

/// first loudest bin strictly inside `range`
fn peak_in(axis: &FrequencyAxis, values: &[f32], range: FrequencyRange) -> MyResult<Peak> {
    let bins = axis.bins_within(range).ok_or(MyError::EmptyRange {
        low_hz: range.low_hz,
        high_hz: range.high_hz,
    })?;

    let mut best = bins.start;

    for i in bins {
        if values[i] > values[best] {
            best = i;
        }
    }

    Ok(Peak {
        frequency_hz: axis.as_slice()[best],
        energy: values[best],
    })
}
