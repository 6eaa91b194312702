//! Geometric Feature Extraction
//!
//! Turns a landmark frame into the four scalar features the fusion stage
//! consumes: brow furrow, mouth-corner drop, mouth openness and squint.
//! Furrow and squint are measured against the per-session calibration
//! baseline; corner drop and openness are scale-free ratios of the mouth
//! itself. Without a usable face every feature is 0.

use serde::{Deserialize, Serialize};

use crate::calibration::CalibrationBaseline;
use crate::landmarks::{indices, LandmarkSet};

/// Geometry extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometryConfig {
    /// Denominator guard; added to every division
    pub epsilon: f32,
    /// Weight of brow narrowing (closeness to baseline spacing) in furrow
    pub furrow_closeness_weight: f32,
    /// Weight of vertical brow drop in furrow
    pub furrow_drop_weight: f32,
    /// Fraction of baseline brow spacing that counts as a full furrow
    pub full_furrow_ratio: f32,
    /// Resting brow-to-eye vertical gap, in inter-ocular units
    pub brow_rest_gap: f32,
    /// EAR deficit that maps to a full squint
    pub squint_sensitivity: f32,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            epsilon: 1e-4,
            furrow_closeness_weight: 0.75,
            furrow_drop_weight: 0.25,
            full_furrow_ratio: 0.25,
            brow_rest_gap: 0.18,
            squint_sensitivity: 0.10,
        }
    }
}

/// Per-frame geometric features, nominally in [0, 1]
///
/// `corner_drop` and `mouth_open` are ratios clamped at >= 0 and may
/// marginally exceed 1 on extreme faces; `furrow` and `squint` are clamped
/// to [0, 1]. Default is the no-face value (all zero).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GeometricFeatures {
    pub furrow: f32,
    pub corner_drop: f32,
    pub mouth_open: f32,
    pub squint: f32,
}

#[inline]
fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

/// Inner-brow spacing in inter-ocular units.
pub fn measure_brow_gap(landmarks: &LandmarkSet, epsilon: f32) -> f32 {
    let gap = landmarks.distance(indices::LEFT_BROW_INNER, indices::RIGHT_BROW_INNER);
    gap / (landmarks.inter_ocular() + epsilon)
}

/// Mean vertical distance from each inner brow to the top of the same-side
/// eye, in inter-ocular units.
pub fn measure_brow_eye_gap(landmarks: &LandmarkSet, epsilon: f32) -> f32 {
    let left = (landmarks.point(indices::LEFT_EYE_TOP_1)[1]
        - landmarks.point(indices::LEFT_BROW_INNER)[1])
        .abs();
    let right = (landmarks.point(indices::RIGHT_EYE_TOP_1)[1]
        - landmarks.point(indices::RIGHT_BROW_INNER)[1])
        .abs();
    (left + right) / 2.0 / (landmarks.inter_ocular() + epsilon)
}

fn single_ear(
    landmarks: &LandmarkSet,
    top1: usize,
    top2: usize,
    bottom1: usize,
    bottom2: usize,
    inner: usize,
    outer: usize,
    epsilon: f32,
) -> f32 {
    let v1 = landmarks.distance(top1, bottom1);
    let v2 = landmarks.distance(top2, bottom2);
    let h = landmarks.distance(inner, outer);
    (v1 + v2) / (2.0 * h + epsilon)
}

/// Mean eye aspect ratio over both eyes.
pub fn measure_ear(landmarks: &LandmarkSet, epsilon: f32) -> f32 {
    let left = single_ear(
        landmarks,
        indices::LEFT_EYE_TOP_1,
        indices::LEFT_EYE_TOP_2,
        indices::LEFT_EYE_BOTTOM_1,
        indices::LEFT_EYE_BOTTOM_2,
        indices::LEFT_EYE_INNER,
        indices::LEFT_EYE_OUTER,
        epsilon,
    );
    let right = single_ear(
        landmarks,
        indices::RIGHT_EYE_TOP_1,
        indices::RIGHT_EYE_TOP_2,
        indices::RIGHT_EYE_BOTTOM_1,
        indices::RIGHT_EYE_BOTTOM_2,
        indices::RIGHT_EYE_INNER,
        indices::RIGHT_EYE_OUTER,
        epsilon,
    );
    (left + right) / 2.0
}

/// Extract all geometric features for one frame.
///
/// Absent or undersized landmark sets yield [`GeometricFeatures::default`].
pub fn extract_features(
    landmarks: Option<&LandmarkSet>,
    baseline: &CalibrationBaseline,
    cfg: &GeometryConfig,
) -> GeometricFeatures {
    let lm = match landmarks {
        Some(lm) if lm.is_usable() => lm,
        _ => return GeometricFeatures::default(),
    };

    let eps = cfg.epsilon;

    // Brow furrow: narrowing toward the baseline spacing plus vertical drop.
    let gap = measure_brow_gap(lm, eps);
    let narrowing = clamp01((baseline.brow_gap - gap) / (baseline.brow_gap * cfg.full_furrow_ratio + eps));
    let brow_eye = measure_brow_eye_gap(lm, eps);
    let drop = clamp01((cfg.brow_rest_gap - brow_eye) / (cfg.brow_rest_gap + eps));
    let furrow = clamp01(cfg.furrow_closeness_weight * narrowing + cfg.furrow_drop_weight * drop);

    // Mouth-corner drop below the lip-center midpoint, per corner, in
    // mouth-width units.
    let mouth_width = lm.distance(indices::LEFT_MOUTH_CORNER, indices::RIGHT_MOUTH_CORNER);
    let center_y = (lm.point(indices::UPPER_LIP_CENTER)[1]
        + lm.point(indices::LOWER_LIP_CENTER)[1])
        / 2.0;
    let left_drop = (lm.point(indices::LEFT_MOUTH_CORNER)[1] - center_y).max(0.0);
    let right_drop = (lm.point(indices::RIGHT_MOUTH_CORNER)[1] - center_y).max(0.0);
    let corner_drop = ((left_drop + right_drop) / 2.0 / (mouth_width + eps)).max(0.0);

    let lip_gap = lm.distance(indices::UPPER_LIP_INNER, indices::LOWER_LIP_INNER);
    let mouth_open = (lip_gap / (mouth_width + eps)).max(0.0);

    let ear = measure_ear(lm, eps);
    let squint = clamp01((baseline.ear - ear) / (cfg.squint_sensitivity + eps));

    GeometricFeatures {
        furrow,
        corner_drop,
        mouth_open,
        squint,
    }
}
