//! Colors and the frequency ranges that pick them.
mod color;
mod color_range;

pub use color::Color;
pub use color_range::{ColorPalette, ColorRange, ColorSpec, generate, lookup, partition};
