//! # Attune Core
//!
//! Deterministic affect classification over per-frame facial evidence.
//! A camera adapter feeds [`FrameInput`]s (a 7-category expression
//! distribution plus optional face landmarks); the engine smooths them over
//! a rolling window, fuses them with geometric cues into four affect scores,
//! and de-bounces the winning label through a dwell/cooldown stabilizer.
//!
//! The crate is pure state-machine code: no capture, no rendering, no
//! threads. Embedders own the engine instance, drive it with a monotonic
//! clock, and read [`CycleReport`]s.
//!
//! ```
//! use attune_core::{AffectEngine, AttuneConfig, ExpressionDistribution, FrameInput};
//!
//! let mut engine = AffectEngine::new(AttuneConfig::default());
//! let mut d = ExpressionDistribution::default();
//! d.neutral = 1.0;
//! let frame = FrameInput { expressions: Some(d), landmarks: None };
//! for i in 0..15i64 {
//!     let report = engine.process_frame(&frame, i * 33_000);
//!     if report.warmed_up {
//!         println!("{} ({:.2})", report.label.as_str(), report.confidence);
//!     }
//! }
//! ```

pub mod config;
pub mod engine;
pub mod fusion;
pub mod session;
pub mod stabilizer;
pub mod types;
pub mod window;

#[cfg(test)]
pub mod tests_proptest;
#[cfg(test)]
pub mod tests_scenarios;

// Configuration
pub use config::{
    AttuneConfig, ConfigError, ConfusedWeights, DampingWeights, FocusedWeights, FrustratedWeights,
    FusionConfig, HappyWeights, OverrideWeights, StabilizerConfig, WindowConfig,
};

// Engine and session plumbing
pub use engine::{AdaptationError, AdaptationSink, AffectEngine, NullSink, SessionStats};
pub use session::{Clock, FixedStepClock, FrameSource, MonotonicClock, ReplaySource, SessionDriver};

// Pipeline stages
pub use fusion::{fuse, select, FusionOutcome};
pub use stabilizer::Stabilizer;
pub use window::ExpressionWindow;

// Frame-level data model
pub use types::{
    AffectLabel, AffectTransition, Candidate, CycleReport, Expression, ExpressionDistribution,
    FrameInput, ScoreVector,
};

// Geometry layer, re-exported so embedders need only this crate
pub use attune_face::{
    extract_features, CalibrationBaseline, CalibrationConfig, CalibrationTracker,
    GeometricFeatures, GeometryConfig, LandmarkSet,
};
