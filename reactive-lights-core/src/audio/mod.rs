//! Audio processing
//!
//! Frame -> Window -> FFT -> Energy -> Delta against the previous frame -> Peak per band
pub mod analyzer;
pub mod frequency_axis;
pub mod pitch;
pub mod spectrum;

pub use analyzer::{AnalyzerConfig, Capture, CaptureDevice, Peak, SpectralAnalyzer};
pub use frequency_axis::{FrequencyAxis, FrequencyRange, bin_to_frequency};
pub use pitch::Pitch;
pub use spectrum::{Spectra, SpectrumProcessor, SpectrumReader, spectrum_channel};
