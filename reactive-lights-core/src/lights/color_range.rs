//! Split a band of frequencies into one slice per color, then find the slice a frequency lands in.
use smart_leds::RGB8;

use super::Color;
use crate::audio::FrequencyRange;
use crate::errors::{MyError, MyResult};
use crate::logging::debug;

/// Where the colors come from.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorSpec {
    /// `count` fully saturated hues from `hue_max` down to `hue_min`
    Sweep {
        count: usize,
        hue_min: f32,
        hue_max: f32,
    },
    /// exactly these colors, in this order
    Fixed { colors: Vec<RGB8> },
}

/// One slice of a band and the color it lights up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorRange {
    pub range: FrequencyRange,
    pub color: Color,
}

pub fn generate(spec: &ColorSpec) -> MyResult<Vec<Color>> {
    let colors: Vec<Color> = match spec {
        ColorSpec::Sweep {
            count,
            hue_min,
            hue_max,
        } => {
            let count = *count;

            if count == 1 {
                vec![Color::from_hsv(*hue_max, 1.0, 1.0)]
            } else {
                let step = (hue_max - hue_min) / (count - 1) as f32;

                // reversed so that the lowest frequencies get the hue_max end
                (0..count)
                    .rev()
                    .map(|i| Color::from_hsv(hue_min + step * i as f32, 1.0, 1.0))
                    .collect()
            }
        }
        ColorSpec::Fixed { colors } => colors.iter().copied().map(Color::from).collect(),
    };

    if colors.is_empty() {
        return Err(MyError::EmptyPalette);
    }

    Ok(colors)
}

/// Equal integer-width slices of `freq_range`, one per color, ascending. The last slice also takes whatever the
/// integer division left over.
pub fn partition(freq_range: FrequencyRange, colors: &[Color]) -> MyResult<Vec<ColorRange>> {
    if colors.is_empty() {
        return Err(MyError::EmptyPalette);
    }

    let n = colors.len() as u32;
    let step = freq_range.width() / n;

    if step == 0 {
        return Err(MyError::DegenerateRange {
            low_hz: freq_range.low_hz,
            high_hz: freq_range.high_hz,
            colors: colors.len(),
        });
    }

    let last = colors.len() - 1;

    let ranges = colors
        .iter()
        .enumerate()
        .map(|(i, &color)| {
            let low_hz = freq_range.low_hz + step * i as u32;
            let high_hz = if i == last {
                freq_range.high_hz
            } else {
                low_hz + step
            };

            ColorRange {
                range: FrequencyRange::new(low_hz, high_hz),
                color,
            }
        })
        .collect();

    Ok(ranges)
}

/// The highest slice whose lower bound is below `frequency_hz`. Anything at or under every lower bound gets the
/// lowest slice. `None` only for an empty slice list.
pub fn lookup(frequency_hz: f32, color_ranges: &[ColorRange]) -> Option<&ColorRange> {
    color_ranges
        .iter()
        .rev()
        .find(|x| (x.range.low_hz as f32) < frequency_hz)
        .or_else(|| color_ranges.first())
}

/// The generated colors plus the partition for whichever band is active. The partition is rebuilt only when the band
/// changes.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    colors: Vec<Color>,
    cached: Option<(FrequencyRange, Vec<ColorRange>)>,
}

impl ColorPalette {
    pub fn new(spec: &ColorSpec) -> MyResult<Self> {
        let colors = generate(spec)?;

        debug!("palette: {:?}", colors);

        Ok(Self {
            colors,
            cached: None,
        })
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn ranges_for(&mut self, freq_range: FrequencyRange) -> MyResult<&[ColorRange]> {
        let stale = !matches!(&self.cached, Some((cached, _)) if *cached == freq_range);

        if stale {
            let ranges = partition(freq_range, &self.colors)?;

            self.cached = Some((freq_range, ranges));
        }

        Ok(self
            .cached
            .as_ref()
            .map(|(_, ranges)| ranges.as_slice())
            .unwrap_or_default())
    }

    /// the unpowered color for `frequency_hz` when `freq_range` is the active band
    pub fn color_for(&mut self, freq_range: FrequencyRange, frequency_hz: f32) -> MyResult<Color> {
        let ranges = self.ranges_for(freq_range)?;

        lookup(frequency_hz, ranges)
            .map(|x| x.color)
            .ok_or(MyError::EmptyPalette)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sweep(count: usize) -> ColorSpec {
        ColorSpec::Sweep {
            count,
            hue_min: 0.0,
            hue_max: 280.0,
        }
    }

    #[test]
    fn test_sweep_is_reversed() {
        let colors = generate(&sweep(3)).unwrap();

        let hues: Vec<f32> = colors.iter().map(|c| c.hue()).collect();

        assert_eq!(hues.len(), 3);
        assert_relative_eq!(hues[0], 280.0);
        assert_relative_eq!(hues[1], 140.0);
        assert_relative_eq!(hues[2], 0.0);

        for c in colors.iter() {
            assert_eq!(c.saturation(), 1.0);
            assert_eq!(c.value(), 1.0);
        }
    }

    #[test]
    fn test_sweep_of_one() {
        let colors = generate(&sweep(1)).unwrap();

        assert_eq!(colors.len(), 1);
        assert_relative_eq!(colors[0].hue(), 280.0);
    }

    #[test]
    fn test_empty_palettes() {
        assert!(matches!(generate(&sweep(0)), Err(MyError::EmptyPalette)));
        assert!(matches!(
            generate(&ColorSpec::Fixed { colors: vec![] }),
            Err(MyError::EmptyPalette)
        ));
        assert!(matches!(
            partition(FrequencyRange::new(0, 100), &[]),
            Err(MyError::EmptyPalette)
        ));
    }

    #[test]
    fn test_fixed_keeps_order() {
        let colors = generate(&ColorSpec::Fixed {
            colors: vec![RGB8::new(255, 0, 0), RGB8::new(0, 0, 255), RGB8::new(9, 9, 9)],
        })
        .unwrap();

        let rgb: Vec<RGB8> = colors.iter().map(|c| c.rgb()).collect();

        assert_eq!(
            rgb,
            vec![RGB8::new(255, 0, 0), RGB8::new(0, 0, 255), RGB8::new(9, 9, 9)]
        );
    }

    #[test]
    fn test_partition_bass() {
        let colors = generate(&sweep(3)).unwrap();

        let ranges = partition(FrequencyRange::new(80, 400), &colors).unwrap();

        let bounds: Vec<(u32, u32)> = ranges
            .iter()
            .map(|x| (x.range.low_hz, x.range.high_hz))
            .collect();

        assert_eq!(bounds, vec![(80, 186), (186, 292), (292, 400)]);

        for (x, c) in ranges.iter().zip(colors.iter()) {
            assert_eq!(x.color, *c);
        }
    }

    #[test]
    fn test_partition_always_covers() {
        let colors = generate(&sweep(7)).unwrap();

        for (low, high) in [(0, 400), (80, 400), (400, 1000), (1000, 1600), (13, 20), (5, 12)] {
            for n in 1..=7 {
                let range = FrequencyRange::new(low, high);
                let ranges = partition(range, &colors[..n]).unwrap();

                assert_eq!(ranges.len(), n);
                assert_eq!(ranges[0].range.low_hz, low);
                assert_eq!(ranges[n - 1].range.high_hz, high);

                for w in ranges.windows(2) {
                    assert!(w[0].range.low_hz < w[1].range.low_hz);
                    assert_eq!(w[0].range.high_hz, w[1].range.low_hz);
                }
            }
        }
    }

    #[test]
    fn test_partition_too_narrow() {
        let colors = generate(&sweep(5)).unwrap();

        assert!(matches!(
            partition(FrequencyRange::new(100, 104), &colors),
            Err(MyError::DegenerateRange {
                low_hz: 100,
                high_hz: 104,
                colors: 5
            })
        ));

        assert!(matches!(
            partition(FrequencyRange::new(400, 80), &colors),
            Err(MyError::DegenerateRange { .. })
        ));
    }

    #[test]
    fn test_lookup() {
        let colors = generate(&sweep(3)).unwrap();
        let ranges = partition(FrequencyRange::new(80, 400), &colors).unwrap();

        let index_of = |f: f32| {
            let found = lookup(f, &ranges).unwrap();
            ranges.iter().position(|x| x == found).unwrap()
        };

        assert_eq!(index_of(200.0), 1);
        assert_eq!(index_of(399.0), 2);
        assert_eq!(index_of(5000.0), 2);

        // ties at a boundary go to the lower slice because the bound must be strictly below
        assert_eq!(index_of(186.0), 0);
        assert_eq!(index_of(186.5), 1);

        // under everything
        assert_eq!(index_of(80.0), 0);
        assert_eq!(index_of(0.0), 0);

        assert!(lookup(100.0, &[]).is_none());
    }

    #[test]
    fn test_lookup_is_idempotent() {
        let colors = generate(&sweep(4)).unwrap();
        let ranges = partition(FrequencyRange::new(400, 1000), &colors).unwrap();

        for f in [0.0, 400.0, 401.0, 549.9, 550.0, 551.0, 999.0, 1200.0] {
            let a = lookup(f, &ranges).unwrap();
            let b = lookup(f, &ranges).unwrap();

            assert!(core::ptr::eq(a, b));
        }
    }

    #[test_log::test]
    fn test_palette_caches_partition() {
        let mut palette = ColorPalette::new(&sweep(3)).unwrap();

        let bass = FrequencyRange::new(80, 400);
        let mid = FrequencyRange::new(400, 1000);

        let first = palette.ranges_for(bass).unwrap().to_vec();
        assert_eq!(palette.ranges_for(bass).unwrap(), first.as_slice());

        let mids = palette.ranges_for(mid).unwrap().to_vec();
        assert_eq!(mids[0].range.low_hz, 400);

        let green = palette.color_for(bass, 258.4).unwrap();
        assert_relative_eq!(green.hue(), 140.0);

        assert!(matches!(
            palette.color_for(FrequencyRange::new(0, 2), 1.0),
            Err(MyError::DegenerateRange { .. })
        ));
    }
}
