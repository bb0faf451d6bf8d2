use core::fmt;

use palette::{FromColor, Hsv, Srgb};
use smart_leds::RGB8;

/// A color kept as both RGB (what the strip wants) and HSV (what brightness changes want).
///
/// Both halves are filled in on construction and never change. `with_power` makes a new color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    rgb: RGB8,
    /// degrees in [0, 360)
    hue: f32,
    saturation: f32,
    value: f32,
}

impl Color {
    /// out of range channels are clamped to 0..=255
    pub fn from_rgb(r: i32, g: i32, b: i32) -> Self {
        let rgb = RGB8::new(clamp_channel(r), clamp_channel(g), clamp_channel(b));

        let srgb: Srgb = Srgb::new(rgb.r, rgb.g, rgb.b).into_format();
        let hsv: Hsv = Hsv::from_color(srgb);

        Self {
            rgb,
            hue: hsv.hue.into_positive_degrees() % 360.0,
            saturation: hsv.saturation,
            value: hsv.value,
        }
    }

    /// hue wraps around 360. saturation and value are clamped to [0, 1]
    pub fn from_hsv(hue: f32, saturation: f32, value: f32) -> Self {
        let hue = hue.rem_euclid(360.0);
        let saturation = saturation.clamp(0.0, 1.0);
        let value = value.clamp(0.0, 1.0);

        let hsv: Hsv = Hsv::new(hue, saturation, value);
        let rgb: Srgb = Srgb::from_color(hsv);

        Self {
            rgb: RGB8::new(
                unit_to_channel(rgb.red),
                unit_to_channel(rgb.green),
                unit_to_channel(rgb.blue),
            ),
            hue,
            saturation,
            value,
        }
    }

    /// Same hue and saturation at `percentage` brightness. Keeping `percentage` in [0, 100] is up to the caller.
    pub fn with_power(&self, percentage: f32) -> Self {
        Self::from_hsv(self.hue, self.saturation, percentage / 100.0)
    }

    pub fn rgb(&self) -> RGB8 {
        self.rgb
    }

    /// (hue degrees, saturation, value)
    pub fn hsv(&self) -> (f32, f32, f32) {
        (self.hue, self.saturation, self.value)
    }

    pub fn hue(&self) -> f32 {
        self.hue
    }

    pub fn saturation(&self) -> f32 {
        self.saturation
    }

    pub fn value(&self) -> f32 {
        self.value
    }
}

impl From<RGB8> for Color {
    fn from(rgb: RGB8) -> Self {
        Self::from_rgb(rgb.r.into(), rgb.g.into(), rgb.b.into())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsv<{:.1}, {:.3}, {:.3}>",
            self.hue, self.saturation, self.value
        )
    }
}

fn clamp_channel(x: i32) -> u8 {
    x.clamp(0, 255) as u8
}

fn unit_to_channel(x: f32) -> u8 {
    (x * 255.0).round().clamp(0.0, 255.0) as u8
}
