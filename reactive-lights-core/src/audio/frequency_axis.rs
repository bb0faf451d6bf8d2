use core::fmt;
use core::ops::Range;

/// A half-open span of frequencies in whole Hz. Bands and color ranges are both described with these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrequencyRange {
    pub low_hz: u32,
    pub high_hz: u32,
}

impl FrequencyRange {
    pub const fn new(low_hz: u32, high_hz: u32) -> Self {
        Self { low_hz, high_hz }
    }

    /// 0 for inverted ranges
    pub fn width(&self) -> u32 {
        self.high_hz.saturating_sub(self.low_hz)
    }
}

impl fmt::Display for FrequencyRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{} Hz", self.low_hz, self.high_hz)
    }
}

/// The frequency of every bin the analyzer produces. `chunk / 2 + 1` entries, ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyAxis(Vec<f32>);

impl FrequencyAxis {
    pub fn new(chunk: usize, sample_rate_hz: u32) -> Self {
        let bins = chunk / 2 + 1;

        let axis = (0..bins)
            .map(|i| bin_to_frequency(i, sample_rate_hz, chunk))
            .collect();

        Self(axis)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn frequency(&self, bin: usize) -> Option<f32> {
        self.0.get(bin).copied()
    }

    /// bins whose frequency is strictly between the range's bounds. `None` if there are none
    pub fn bins_within(&self, range: FrequencyRange) -> Option<Range<usize>> {
        let low = range.low_hz as f32;
        let high = range.high_hz as f32;

        let start = self.0.partition_point(|&f| f <= low);
        let end = self.0.partition_point(|&f| f < high);

        (start < end).then_some(start..end)
    }
}

/// |fftfreq| for the non-negative half of a `chunk` point fft
pub fn bin_to_frequency(bin_index: usize, sample_rate_hz: u32, chunk: usize) -> f32 {
    (bin_index as f64 * sample_rate_hz as f64 / chunk as f64) as f32
}
