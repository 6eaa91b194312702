//! Rolling Expression Window
//!
//! Bounded FIFO over per-frame distributions. Fusion consumes the
//! per-category arithmetic mean; until the window reaches its minimum fill
//! the engine skips fusion entirely (warm-up).

use std::collections::VecDeque;

use crate::config::WindowConfig;
use crate::types::{Expression, ExpressionDistribution};

#[derive(Debug, Clone)]
pub struct ExpressionWindow {
    buf: VecDeque<ExpressionDistribution>,
    max_frames: usize,
    min_fill: usize,
}

impl ExpressionWindow {
    pub fn new(config: &WindowConfig) -> Self {
        let min_fill = (config.max_frames as f32 * config.warmup_ratio).floor() as usize;
        Self {
            buf: VecDeque::with_capacity(config.max_frames),
            max_frames: config.max_frames,
            min_fill,
        }
    }

    /// Append a frame, evicting the oldest beyond capacity.
    pub fn push(&mut self, d: ExpressionDistribution) {
        if self.buf.len() == self.max_frames {
            self.buf.pop_front();
        }
        self.buf.push_back(d);
    }

    /// Per-category arithmetic mean over current occupancy.
    /// An empty window averages to all zeros.
    pub fn average(&self) -> ExpressionDistribution {
        let mut avg = ExpressionDistribution::default();
        if self.buf.is_empty() {
            return avg;
        }
        let n = self.buf.len() as f32;
        for d in &self.buf {
            for e in Expression::ALL {
                avg.set(e, avg.get(e) + d.get(e));
            }
        }
        for e in Expression::ALL {
            avg.set(e, avg.get(e) / n);
        }
        avg
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn min_fill(&self) -> usize {
        self.min_fill
    }

    /// Whether fusion may run this cycle.
    #[inline]
    pub fn is_warmed_up(&self) -> bool {
        self.buf.len() >= self.min_fill
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }
}
