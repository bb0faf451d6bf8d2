use serde::{Deserialize, Serialize};
use smart_leds::RGB8;

use crate::audio::AnalyzerConfig;
use crate::errors::{MyError, MyResult};
use crate::lights::ColorSpec;

/// Everything the controller needs, as it is stored on disk. Missing fields get their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// serial port of the microcontroller driving the light
    pub output_port: String,
    /// false runs everything without touching the port
    pub output_enabled: bool,
    pub fft_chunk: usize,
    pub audio_rate: u32,
    pub channels: u16,
    /// `None` is the host's default input
    pub device_index: Option<usize>,
    /// starting [low, high] for brightness normalization. high adapts while running
    pub energy_range: [f32; 2],
    /// sweep `reactive_count` hues instead of using `colors`
    pub reactive: bool,
    pub reactive_count: usize,
    pub colors: Vec<[u8; 3]>,
    pub hue_min: f32,
    pub hue_max: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            output_port: "/dev/ttyUSB0".into(),
            output_enabled: true,
            fft_chunk: 1024,
            audio_rate: 44_100,
            channels: 1,
            device_index: None,
            energy_range: [0.0, 50.0],
            reactive: true,
            reactive_count: 3,
            colors: vec![[255, 0, 0]],
            hue_min: 0.0,
            hue_max: 280.0,
        }
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> MyResult<()> {
        self.analyzer_config().validate()?;

        let [low, high] = self.energy_range;

        if !low.is_finite() || !high.is_finite() || low > high {
            return Err(MyError::Configuration(format!(
                "energy range {low}..{high} is not ascending"
            )));
        }

        let empty = if self.reactive {
            self.reactive_count == 0
        } else {
            self.colors.is_empty()
        };

        if empty {
            return Err(MyError::Configuration(
                "a palette needs at least one color".into(),
            ));
        }

        Ok(())
    }

    pub fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            chunk_size: self.fft_chunk,
            channels: self.channels,
            sample_rate_hz: self.audio_rate,
            device_index: self.device_index,
        }
    }

    pub fn color_spec(&self) -> ColorSpec {
        if self.reactive {
            ColorSpec::Sweep {
                count: self.reactive_count,
                hue_min: self.hue_min,
                hue_max: self.hue_max,
            }
        } else {
            ColorSpec::Fixed {
                colors: self
                    .colors
                    .iter()
                    .map(|&[r, g, b]| RGB8::new(r, g, b))
                    .collect(),
            }
        }
    }
}
