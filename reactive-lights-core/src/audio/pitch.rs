use core::fmt;

const A4_HZ: f32 = 440.0;

const NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// The equal temperament note nearest to a frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pitch {
    pub name: &'static str,
    pub octave: i32,
}

impl Pitch {
    pub fn from_frequency(hz: f32) -> Option<Self> {
        if !hz.is_finite() || hz <= 0.0 {
            return None;
        }

        let c0 = A4_HZ * 2f32.powf(-4.75);

        let half_steps = (12.0 * (hz / c0).log2()).round() as i32;

        Some(Self {
            name: NAMES[half_steps.rem_euclid(12) as usize],
            octave: half_steps.div_euclid(12),
        })
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.octave)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_notes() {
        assert_eq!(Pitch::from_frequency(440.0).unwrap().to_string(), "A4");
        assert_eq!(Pitch::from_frequency(261.63).unwrap().to_string(), "C4");
        assert_eq!(Pitch::from_frequency(466.16).unwrap().to_string(), "A#4");
        assert_eq!(Pitch::from_frequency(82.41).unwrap().to_string(), "E2");
        // rounds to the nearest half step
        assert_eq!(Pitch::from_frequency(445.0).unwrap().to_string(), "A4");
    }

    #[test]
    fn test_below_c0() {
        let p = Pitch::from_frequency(15.0).unwrap();

        assert_eq!(p.name, "B");
        assert_eq!(p.octave, -1);
    }

    #[test]
    fn test_nonsense() {
        assert_eq!(Pitch::from_frequency(0.0), None);
        assert_eq!(Pitch::from_frequency(-10.0), None);
        assert_eq!(Pitch::from_frequency(f32::NAN), None);
    }
}
