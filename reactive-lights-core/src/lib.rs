//! Turn a live microphone into a single RGB light.
//!
//! Samples -> SpectralAnalyzer -> (energy, delta) spectra -> ReactiveController -> Color -> LightSink
pub mod audio;
pub mod cadence;
pub mod config;
pub mod controller;
pub mod errors;
pub mod lights;
pub mod logging;
pub mod output;
pub mod windows;

#[cfg(test)]
pub(crate) mod testing;

/// Map t in range [a, b] to range [c, d]
pub fn remap(t: f32, a: f32, b: f32, c: f32, d: f32) -> f32 {
    (t - a) * ((d - c) / (b - a)) + c
}
