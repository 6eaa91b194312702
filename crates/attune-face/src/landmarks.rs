//! MediaPipe Landmark Indices and Point Primitives
//!
//! Names every face-mesh anchor the engine reads so that no literal index
//! appears at a measurement site. Distances are computed in input image
//! coordinates (y grows downward) and normalized by inter-ocular span where
//! a scale-free quantity is needed.

use serde::{Deserialize, Serialize};

/// Number of points in the MediaPipe Face Mesh topology.
pub const LANDMARK_COUNT: usize = 468;

/// MediaPipe Face Mesh 468 landmark indices
pub mod indices {
    // === Eyes ===
    /// Left eye inner corner
    pub const LEFT_EYE_INNER: usize = 133;
    /// Left eye outer corner
    pub const LEFT_EYE_OUTER: usize = 33;
    /// Right eye inner corner
    pub const RIGHT_EYE_INNER: usize = 362;
    /// Right eye outer corner
    pub const RIGHT_EYE_OUTER: usize = 263;

    // Upper/lower lid pairs for the 6-point aspect ratio
    pub const LEFT_EYE_TOP_1: usize = 159;
    pub const LEFT_EYE_TOP_2: usize = 158;
    pub const LEFT_EYE_BOTTOM_1: usize = 145;
    pub const LEFT_EYE_BOTTOM_2: usize = 153;
    pub const RIGHT_EYE_TOP_1: usize = 386;
    pub const RIGHT_EYE_TOP_2: usize = 385;
    pub const RIGHT_EYE_BOTTOM_1: usize = 374;
    pub const RIGHT_EYE_BOTTOM_2: usize = 380;

    // === Eyebrows ===
    /// Left eyebrow inner end
    pub const LEFT_BROW_INNER: usize = 107;
    /// Right eyebrow inner end
    pub const RIGHT_BROW_INNER: usize = 336;

    // === Mouth ===
    /// Left mouth corner
    pub const LEFT_MOUTH_CORNER: usize = 61;
    /// Right mouth corner
    pub const RIGHT_MOUTH_CORNER: usize = 291;
    /// Upper lip outer center
    pub const UPPER_LIP_CENTER: usize = 0;
    /// Lower lip outer center
    pub const LOWER_LIP_CENTER: usize = 17;
    /// Upper lip inner edge (lip-gap measurement)
    pub const UPPER_LIP_INNER: usize = 13;
    /// Lower lip inner edge
    pub const LOWER_LIP_INNER: usize = 14;
}

/// One detector frame worth of face landmarks.
///
/// The engine treats a set with fewer than [`LANDMARK_COUNT`] points the
/// same as an absent face: every derived feature falls back to its neutral
/// default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandmarkSet {
    pub points: Vec<[f32; 2]>,
}

impl LandmarkSet {
    pub fn new(points: Vec<[f32; 2]>) -> Self {
        Self { points }
    }

    /// Whether the set carries the full topology.
    #[inline]
    pub fn is_usable(&self) -> bool {
        self.points.len() >= LANDMARK_COUNT
    }

    /// Point by index, `[0, 0]` when out of bounds.
    #[inline]
    pub fn point(&self, idx: usize) -> [f32; 2] {
        if idx < self.points.len() {
            self.points[idx]
        } else {
            [0.0, 0.0]
        }
    }

    /// Euclidean distance between two anchors.
    pub fn distance(&self, a: usize, b: usize) -> f32 {
        let pa = self.point(a);
        let pb = self.point(b);
        let dx = pb[0] - pa[0];
        let dy = pb[1] - pa[1];
        (dx * dx + dy * dy).sqrt()
    }

    /// Outer-corner eye span, the scale reference for normalized features.
    pub fn inter_ocular(&self) -> f32 {
        self.distance(indices::LEFT_EYE_OUTER, indices::RIGHT_EYE_OUTER)
    }
}
