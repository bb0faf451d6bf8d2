use core::f32::consts::PI;

use super::Window;

/// symmetric hann window. the first and last samples are both zero
pub struct HanningWindow;

impl Window for HanningWindow {
    fn window(i: usize, n: usize) -> f32 {
        if n < 2 {
            return 1.0;
        }

        0.5 - 0.5 * (2.0 * PI * i as f32 / (n - 1) as f32).cos()
    }
}
