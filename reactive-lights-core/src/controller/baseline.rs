use crate::remap;

/// Smallest distance between the bounds used when rescaling. Keeps a collapsed range from dividing by zero.
pub const MIN_ENERGY_SPAN: f32 = 1e-6;

/// A running average of recent peak energy used as the "full brightness" end of the scale.
///
/// The lower bound never moves. Starts (and resets) as one sample of the configured upper bound.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyBaseline {
    lower: f32,
    upper: f32,
    default_upper: f32,
    sum: f64,
    count: u64,
}

impl EnergyBaseline {
    pub fn new(lower: f32, upper: f32) -> Self {
        Self {
            lower,
            upper,
            default_upper: upper,
            sum: upper as f64,
            count: 1,
        }
    }

    pub fn lower(&self) -> f32 {
        self.lower
    }

    pub fn upper(&self) -> f32 {
        self.upper
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// add a sample to the average and move the upper bound
    pub fn observe(&mut self, energy: f32) {
        self.sum += energy as f64;
        self.count += 1;

        self.upper = (self.sum / self.count as f64) as f32;
    }

    /// Brightness in [0, 100] for `energy` against the current bounds.
    pub fn power(&self, energy: f32) -> f32 {
        let span = (self.upper - self.lower).max(MIN_ENERGY_SPAN);

        let scaled = remap(energy, self.lower, self.lower + span, 0.0, 1.0);

        (scaled.tanh() * 100.0).clamp(0.0, 100.0)
    }

    /// Back to a single sample of the configured upper bound. The bound itself keeps its last value until the next
    /// `observe`.
    pub fn reset(&mut self) {
        self.sum = self.default_upper as f64;
        self.count = 1;
    }

    /// Observe `energy`, then compute its power. A power of 0 resets the average.
    pub fn update(&mut self, energy: f32) -> f32 {
        self.observe(energy);

        let power = self.power(energy);

        if power == 0.0 {
            self.reset();
        }

        power
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_starts_as_one_sample() {
        let baseline = EnergyBaseline::new(0.0, 50.0);

        assert_eq!(baseline.sum(), 50.0);
        assert_eq!(baseline.count(), 1);
        assert_eq!(baseline.upper(), 50.0);
    }

    #[test]
    fn test_running_average() {
        let mut baseline = EnergyBaseline::new(0.0, 50.0);

        baseline.observe(10.0);
        assert_relative_eq!(baseline.upper(), 30.0);

        baseline.observe(30.0);
        assert_relative_eq!(baseline.upper(), 30.0);

        baseline.observe(130.0);
        assert_relative_eq!(baseline.upper(), 55.0);
        assert_eq!(baseline.count(), 4);
    }

    #[test]
    fn test_power_at_the_upper_bound() {
        let baseline = EnergyBaseline::new(0.0, 50.0);

        assert_relative_eq!(baseline.power(50.0), 76.159_42, epsilon = 1e-3);
        assert_relative_eq!(baseline.power(0.0), 0.0);
        assert_relative_eq!(baseline.power(25.0), 0.5f32.tanh() * 100.0, epsilon = 1e-4);

        // saturates instead of going past 100
        assert!(baseline.power(1e9) <= 100.0);
        assert!(baseline.power(1e9) > 99.9);
    }

    #[test]
    fn test_power_below_the_lower_bound_is_zero() {
        let baseline = EnergyBaseline::new(5.0, 50.0);

        assert_eq!(baseline.power(1.0), 0.0);
    }

    #[test]
    fn test_collapsed_range() {
        let mut baseline = EnergyBaseline::new(0.0, 0.0);

        baseline.observe(0.0);

        assert_eq!(baseline.upper(), 0.0);
        assert_eq!(baseline.power(0.0), 0.0);

        let p = baseline.power(1.0);
        assert!(p.is_finite());
        assert_relative_eq!(p, 100.0);
    }

    #[test]
    fn test_silence_resets() {
        let mut baseline = EnergyBaseline::new(0.0, 50.0);

        baseline.update(400.0);
        baseline.update(90.0);
        assert_eq!(baseline.count(), 3);

        let power = baseline.update(0.0);

        assert_eq!(power, 0.0);
        assert_eq!(baseline.sum(), 50.0);
        assert_eq!(baseline.count(), 1);

        // the next frame averages against the default again
        baseline.update(10.0);
        assert_relative_eq!(baseline.upper(), 30.0);
    }

    #[test]
    fn test_loud_frames_do_not_reset() {
        let mut baseline = EnergyBaseline::new(0.0, 50.0);

        let power = baseline.update(50.0);

        assert_relative_eq!(power, 76.159_42, epsilon = 1e-3);
        assert_eq!(baseline.count(), 2);
        assert_eq!(baseline.sum(), 100.0);
    }
}
