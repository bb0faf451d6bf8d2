//! Which part of the spectrum has been busiest lately.
use std::time::{Duration, Instant};

use crate::audio::{FrequencyRange, Peak};
use crate::errors::MyResult;

pub const BASS: FrequencyRange = FrequencyRange::new(80, 400);
pub const MID: FrequencyRange = FrequencyRange::new(400, 1000);
pub const HIGH: FrequencyRange = FrequencyRange::new(1000, 1600);

/// before any band has been chosen
pub const INITIAL_RANGE: FrequencyRange = FrequencyRange::new(0, 400);

pub const DOMINANCE_WINDOW: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub name: &'static str,
    pub range: FrequencyRange,
    /// frames this band has won during the current window
    pub count: u32,
}

impl Band {
    pub const fn new(name: &'static str, range: FrequencyRange) -> Self {
        Self {
            name,
            range,
            count: 0,
        }
    }
}

/// Vote counting for bass, mid, and high.
///
/// Each frame the band with the biggest peak delta gets a vote. Every window the overall winner is carried into the
/// next window with a single vote so the active band doesn't snap back to bass on the first quiet frame.
///
/// Ties always go to the band declared first.
#[derive(Debug, Clone)]
pub struct DominanceTracker {
    bands: [Band; 3],
    window: Duration,
    window_start: Instant,
}

impl DominanceTracker {
    pub fn new(now: Instant) -> Self {
        Self::with_window(DOMINANCE_WINDOW, now)
    }

    pub fn with_window(window: Duration, now: Instant) -> Self {
        Self {
            bands: [Band::new("bass", BASS), Band::new("mid", MID), Band::new("high", HIGH)],
            window,
            window_start: now,
        }
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    pub fn ranges(&self) -> [FrequencyRange; 3] {
        self.bands.map(|x| x.range)
    }

    /// Credit the band with the loudest peak in this frame. Failed bands can't win.
    ///
    /// A winner with no energy at all gets nothing. Returns the index of the band that got the vote.
    pub fn vote(&mut self, peaks: &[MyResult<Peak>]) -> Option<usize> {
        let mut winner: Option<(usize, f32)> = None;

        for (i, peak) in peaks.iter().enumerate().take(self.bands.len()) {
            let Ok(peak) = peak else {
                continue;
            };

            if winner.is_none_or(|(_, best)| peak.energy > best) {
                winner = Some((i, peak.energy));
            }
        }

        let (i, energy) = winner?;

        if energy > 0.0 {
            self.bands[i].count += 1;
            Some(i)
        } else {
            None
        }
    }

    /// index of the band with the most votes
    pub fn dominant(&self) -> usize {
        let mut best = 0;

        for (i, band) in self.bands.iter().enumerate() {
            if band.count > self.bands[best].count {
                best = i;
            }
        }

        best
    }

    /// Forget every vote and start a new window at `now`.
    pub fn restart(&mut self, now: Instant) {
        for band in self.bands.iter_mut() {
            band.count = 0;
        }

        self.window_start = now;
    }

    /// If the window is over, zero everything and give the window's winner one vote.
    ///
    /// Returns the winner when a window closed.
    pub fn roll_window(&mut self, now: Instant) -> Option<Band> {
        if now.saturating_duration_since(self.window_start) <= self.window {
            return None;
        }

        let winner = self.dominant();
        let closed = self.bands[winner];

        for band in self.bands.iter_mut() {
            band.count = 0;
        }

        self.bands[winner].count = 1;
        self.window_start = now;

        Some(closed)
    }
}
