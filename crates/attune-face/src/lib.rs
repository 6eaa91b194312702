//! Facial geometry layer: landmark topology, per-frame feature extraction
//! and the per-session neutral baseline those features are measured against.
//!
//! This crate knows nothing about affect labels or windows; it turns one
//! detector frame into four scalar features and keeps the calibration state
//! that makes them comparable across faces.

pub mod calibration;
pub mod geometry;
pub mod landmarks;

pub use calibration::{CalibrationBaseline, CalibrationConfig, CalibrationTracker};
pub use geometry::{extract_features, GeometricFeatures, GeometryConfig};
pub use landmarks::{indices, LandmarkSet, LANDMARK_COUNT};
