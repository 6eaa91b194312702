//! Affect Engine
//!
//! Owns the full per-frame pipeline: calibration, geometric feature
//! extraction, the rolling expression window, fusion, and the label
//! stabilizer. One engine instance is one session; `reset` returns it to the
//! just-constructed state without reallocating the configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use attune_face::{extract_features, CalibrationTracker};

use crate::config::AttuneConfig;
use crate::fusion::fuse;
use crate::stabilizer::Stabilizer;
use crate::types::{AffectLabel, AffectTransition, CycleReport, FrameInput, ScoreVector};
use crate::window::ExpressionWindow;

/// Transitions kept for post-session inspection. Oldest entries are dropped
/// once the cap is reached.
const MAX_HISTORY: usize = 64;

/// Raised by an [`AdaptationSink`] that could not act on a transition. The
/// engine logs these and keeps running; a sink failure must never stall the
/// classification loop.
#[derive(Debug, Error)]
#[error("adaptation sink failed: {0}")]
pub struct AdaptationError(pub String);

/// Downstream consumer of committed label changes, e.g. a difficulty
/// adapter or a UI bridge.
pub trait AdaptationSink {
    fn notify(&mut self, transition: &AffectTransition) -> Result<(), AdaptationError>;
}

/// Sink that discards every transition.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl AdaptationSink for NullSink {
    fn notify(&mut self, _transition: &AffectTransition) -> Result<(), AdaptationError> {
        Ok(())
    }
}

/// Counters accumulated over a session, zeroed by [`AffectEngine::reset`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub cycles: u64,
    pub frames_with_expressions: u64,
    pub frames_with_landmarks: u64,
    pub commits: u64,
}

pub struct AffectEngine {
    config: AttuneConfig,
    calibration: CalibrationTracker,
    window: ExpressionWindow,
    stabilizer: Stabilizer,
    sink: Option<Box<dyn AdaptationSink>>,
    history: Vec<AffectTransition>,
    stats: SessionStats,
}

impl AffectEngine {
    pub fn new(config: AttuneConfig) -> Self {
        let calibration =
            CalibrationTracker::new(config.calibration.clone(), config.geometry.epsilon);
        let window = ExpressionWindow::new(&config.window);
        let stabilizer = Stabilizer::new(config.stabilizer.clone());
        Self {
            config,
            calibration,
            window,
            stabilizer,
            sink: None,
            history: Vec::new(),
            stats: SessionStats::default(),
        }
    }

    pub fn with_sink(config: AttuneConfig, sink: Box<dyn AdaptationSink>) -> Self {
        let mut engine = Self::new(config);
        engine.sink = Some(sink);
        engine
    }

    /// Run one classification cycle. `now_us` must come from a monotonic
    /// clock; wall-clock jumps would corrupt dwell and cooldown tracking.
    pub fn process_frame(&mut self, frame: &FrameInput, now_us: i64) -> CycleReport {
        self.stats.cycles += 1;

        self.calibration.update(frame.landmarks.as_ref());
        let geometry = extract_features(
            frame.landmarks.as_ref(),
            &self.calibration.baseline(),
            &self.config.geometry,
        );
        if frame.landmarks.is_some() {
            self.stats.frames_with_landmarks += 1;
        }

        if let Some(expressions) = frame.expressions.as_ref() {
            self.window.push(*expressions);
            self.stats.frames_with_expressions += 1;
        }

        if !self.window.is_warmed_up() {
            // not enough evidence yet: hold the current label, skip fusion
            return CycleReport {
                label: self.stabilizer.current(),
                confidence: 1.0,
                scores: ScoreVector::default(),
                cooldown_remaining_ms: self.stabilizer.cooldown_remaining_ms(now_us),
                geometry,
                warmed_up: false,
                committed: None,
            };
        }

        let averaged = self.window.average();
        let outcome = fuse(&averaged, &geometry, &self.config.fusion);
        let committed = self.stabilizer.observe(
            outcome.candidate.label,
            outcome.candidate.confidence,
            now_us,
        );

        if let Some(transition) = committed {
            self.record_transition(transition);
        }

        CycleReport {
            label: self.stabilizer.current(),
            confidence: outcome.candidate.confidence,
            scores: outcome.scores,
            cooldown_remaining_ms: self.stabilizer.cooldown_remaining_ms(now_us),
            geometry,
            warmed_up: true,
            committed,
        }
    }

    fn record_transition(&mut self, transition: AffectTransition) {
        if self.history.len() >= MAX_HISTORY {
            self.history.remove(0);
        }
        self.history.push(transition);
        self.stats.commits += 1;

        if let Some(sink) = self.sink.as_mut() {
            if let Err(e) = sink.notify(&transition) {
                log::warn!("adaptation sink rejected transition: {}", e);
            }
        }
    }

    /// Return to the just-constructed state. Configuration and the attached
    /// sink survive; calibration, window, stabilizer, history, and counters
    /// do not.
    pub fn reset(&mut self) {
        self.calibration.reset();
        self.window.clear();
        self.stabilizer.reset();
        self.history.clear();
        self.stats = SessionStats::default();
        log::debug!("engine reset to initial state");
    }

    #[inline]
    pub fn current_label(&self) -> AffectLabel {
        self.stabilizer.current()
    }

    pub fn transition_history(&self) -> &[AffectTransition] {
        &self.history
    }

    pub fn session_stats(&self) -> SessionStats {
        self.stats
    }

    pub fn config(&self) -> &AttuneConfig {
        &self.config
    }

    /// Last geometric read is not stored; expose calibration progress for
    /// diagnostics instead.
    pub fn calibration_frames(&self) -> u32 {
        self.calibration.frames()
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibration.is_frozen()
    }
}

impl std::fmt::Debug for AffectEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AffectEngine")
            .field("label", &self.stabilizer.current())
            .field("window_len", &self.window.len())
            .field("calibration_frames", &self.calibration.frames())
            .field("stats", &self.stats)
            .finish()
    }
}
