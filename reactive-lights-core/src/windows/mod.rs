mod flat;
mod hanning;

pub use flat::FlatWindow;
pub use hanning::HanningWindow;

/// A window function applied to a frame before the FFT.
///
/// The frame size is only known once the analyzer is configured, so windows are sized at runtime.
pub trait Window {
    fn window(i: usize, n: usize) -> f32;

    /// precompute the multipliers for a frame of `n` samples
    fn windows(n: usize) -> Vec<f32> {
        (0..n).map(|i| Self::window(i, n)).collect()
    }
}

/// multiply samples by window weights that were computed ahead of time with `Window::windows`
#[inline]
pub fn apply_window(x: &mut [f32], multipliers: &[f32]) {
    debug_assert_eq!(x.len(), multipliers.len());

    for (sample, w) in x.iter_mut().zip(multipliers.iter()) {
        *sample *= w;
    }
}
