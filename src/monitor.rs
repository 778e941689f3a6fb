//! Output amplitude monitor.
//!
//! Looks at the most recent window of the final (normalized) output once per
//! UI frame and logs record peaks and near-clipping. Purely diagnostic: it
//! never feeds back into the output gain.

use log::{info, warn};

/// Result of one monitor tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakReport {
    /// Largest absolute deviation from zero in this window.
    pub peak: f32,
    /// Highest peak seen this session (including this window).
    pub record: f32,
    /// This window set a new session record.
    pub new_record: bool,
    /// This window exceeded the near-clip threshold.
    pub near_clip: bool,
}

#[derive(Debug, Clone)]
pub struct AmplitudeMonitor {
    near_clip_threshold: f32,
    max_all_time: f32,
}

impl AmplitudeMonitor {
    pub fn new(near_clip_threshold: f32) -> Self {
        Self {
            near_clip_threshold,
            max_all_time: 0.0,
        }
    }

    /// Inspect one window of output samples.
    pub fn sample(&mut self, window: &[f32]) -> PeakReport {
        let peak = peak_deviation(window);

        let new_record = peak > self.max_all_time;
        if new_record {
            self.max_all_time = peak;
            info!(target: "amplitude", "new record peak = {:.3}", peak);
        }

        let near_clip = peak > self.near_clip_threshold;
        if near_clip {
            warn!(target: "amplitude", "current peak approaching 1.0 -> {:.3}", peak);
        }

        PeakReport {
            peak,
            record: self.max_all_time,
            new_record,
            near_clip,
        }
    }

    pub fn max_all_time(&self) -> f32 {
        self.max_all_time
    }
}

/// Peak absolute deviation from the zero reference.
pub fn peak_deviation(window: &[f32]) -> f32 {
    window.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
}
