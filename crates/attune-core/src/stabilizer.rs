//! Label Stabilizer
//!
//! De-bounces fusion candidates before they become the visible label. A new
//! label must win with sufficient confidence for a full dwell interval, and
//! after each commit a cooldown locks the label in place. Timestamps are
//! microseconds from a monotonic clock.

use crate::config::StabilizerConfig;
use crate::types::{AffectLabel, AffectTransition};

#[derive(Debug, Clone, Copy)]
struct Pending {
    label: AffectLabel,
    since_us: i64,
}

#[derive(Debug, Clone)]
pub struct Stabilizer {
    config: StabilizerConfig,
    current: AffectLabel,
    cooldown_until_us: Option<i64>,
    pending: Option<Pending>,
}

impl Stabilizer {
    pub fn new(config: StabilizerConfig) -> Self {
        Self {
            config,
            current: AffectLabel::default(),
            cooldown_until_us: None,
            pending: None,
        }
    }

    /// Stable label as of the last cycle.
    #[inline]
    pub fn current(&self) -> AffectLabel {
        self.current
    }

    /// Milliseconds left in the post-commit lockout, 0 when idle.
    pub fn cooldown_remaining_ms(&self, now_us: i64) -> u64 {
        match self.cooldown_until_us {
            Some(until) => (until.saturating_sub(now_us)).max(0) as u64 / 1000,
            None => 0,
        }
    }

    /// Feed one fusion candidate. Returns the committed transition when the
    /// dwell interval completes, `None` otherwise.
    pub fn observe(
        &mut self,
        candidate: AffectLabel,
        confidence: f32,
        now_us: i64,
    ) -> Option<AffectTransition> {
        if let Some(until) = self.cooldown_until_us {
            if now_us <= until {
                return None;
            }
        }
        if confidence < self.config.confidence_threshold {
            return None;
        }
        if candidate == self.current {
            // agreement dissolves any half-built challenger
            self.pending = None;
            return None;
        }

        match self.pending {
            Some(p) if p.label == candidate => {
                let dwell_us = (self.config.dwell_ms as i64).saturating_mul(1000);
                if now_us.saturating_sub(p.since_us) >= dwell_us {
                    let transition = AffectTransition {
                        from: self.current,
                        to: candidate,
                        confidence,
                        at_us: now_us,
                    };
                    self.current = candidate;
                    self.cooldown_until_us = Some(
                        now_us.saturating_add((self.config.cooldown_ms as i64).saturating_mul(1000)),
                    );
                    self.pending = None;
                    log::debug!(
                        "label committed: {} -> {} (conf {:.3})",
                        transition.from.as_str(),
                        transition.to.as_str(),
                        confidence
                    );
                    Some(transition)
                } else {
                    None
                }
            }
            _ => {
                log::trace!(
                    "pending candidate {} (conf {:.3})",
                    candidate.as_str(),
                    confidence
                );
                self.pending = Some(Pending {
                    label: candidate,
                    since_us: now_us,
                });
                None
            }
        }
    }

    /// Restore the initial state: default label, no cooldown, no pending.
    pub fn reset(&mut self) {
        self.current = AffectLabel::default();
        self.cooldown_until_us = None;
        self.pending = None;
    }
}
