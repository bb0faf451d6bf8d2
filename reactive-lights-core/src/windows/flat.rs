use super::Window;

/// no windowing at all. handy when checking raw fft energy
pub struct FlatWindow;

impl Window for FlatWindow {
    fn window(_: usize, _: usize) -> f32 {
        1.0
    }
}
