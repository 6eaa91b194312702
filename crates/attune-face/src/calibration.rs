//! Per-Session Neutral Baseline
//!
//! Tracks running means of the two baseline-relative quantities (inner-brow
//! spacing and eye aspect ratio) over the first frames of a session, then
//! freezes. Until the first usable face arrives, fixed fallback pivots stand
//! in so the geometry stage always has a baseline to measure against.

use serde::{Deserialize, Serialize};

use crate::geometry::{measure_brow_gap, measure_ear};
use crate::landmarks::LandmarkSet;

/// Baseline tracker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Frames folded into the baseline before it freezes
    pub max_frames: u32,
    /// Pivot for inner-brow spacing before any sample arrives
    pub fallback_brow_gap: f32,
    /// Pivot for eye aspect ratio before any sample arrives
    pub fallback_ear: f32,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            max_frames: 90,
            fallback_brow_gap: 0.42,
            fallback_ear: 0.28,
        }
    }
}

/// Baseline pivots the geometry stage measures against.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CalibrationBaseline {
    /// Inner-brow spacing in inter-ocular units
    pub brow_gap: f32,
    /// Mean eye aspect ratio
    pub ear: f32,
}

/// Running-mean baseline tracker.
#[derive(Debug, Clone)]
pub struct CalibrationTracker {
    config: CalibrationConfig,
    frames: u32,
    brow_gap_mean: f32,
    ear_mean: f32,
    // epsilon forwarded to the measurement helpers
    epsilon: f32,
}

impl CalibrationTracker {
    pub fn new(config: CalibrationConfig, epsilon: f32) -> Self {
        Self {
            config,
            frames: 0,
            brow_gap_mean: 0.0,
            ear_mean: 0.0,
            epsilon,
        }
    }

    /// Fold one frame into the baseline.
    ///
    /// No-op when the face is absent or the tracker is frozen. Each sample
    /// enters as `mean * (1 - 1/n) + sample / n` with `n` counted after the
    /// increment, so the first sample replaces the zero state outright.
    pub fn update(&mut self, landmarks: Option<&LandmarkSet>) {
        let lm = match landmarks {
            Some(lm) if lm.is_usable() => lm,
            _ => return,
        };
        if self.frames >= self.config.max_frames {
            return;
        }

        self.frames += 1;
        let n = self.frames as f32;
        let w = 1.0 / n;
        self.brow_gap_mean =
            self.brow_gap_mean * (1.0 - w) + measure_brow_gap(lm, self.epsilon) * w;
        self.ear_mean = self.ear_mean * (1.0 - w) + measure_ear(lm, self.epsilon) * w;

        if self.frames == self.config.max_frames {
            log::debug!(
                "calibration frozen after {} frames: brow_gap={:.4} ear={:.4}",
                self.frames,
                self.brow_gap_mean,
                self.ear_mean
            );
        }
    }

    /// Current baseline; usable mid-calibration. Fallback pivots until the
    /// first sample lands.
    pub fn baseline(&self) -> CalibrationBaseline {
        if self.frames == 0 {
            CalibrationBaseline {
                brow_gap: self.config.fallback_brow_gap,
                ear: self.config.fallback_ear,
            }
        } else {
            CalibrationBaseline {
                brow_gap: self.brow_gap_mean,
                ear: self.ear_mean,
            }
        }
    }

    #[inline]
    pub fn frames(&self) -> u32 {
        self.frames
    }

    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.frames >= self.config.max_frames
    }

    /// Drop all samples; fallback pivots apply again.
    pub fn reset(&mut self) {
        self.frames = 0;
        self.brow_gap_mean = 0.0;
        self.ear_mean = 0.0;
    }
}
