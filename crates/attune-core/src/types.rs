//! Core affect data model: base expression categories, affect labels and
//! the per-cycle input/output shapes.

use serde::{Deserialize, Serialize};

use attune_face::{GeometricFeatures, LandmarkSet};

/// Base expression categories delivered by the upstream classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expression {
    Neutral = 0,
    Happy = 1,
    Sad = 2,
    Angry = 3,
    Fearful = 4,
    Disgusted = 5,
    Surprised = 6,
}

impl Expression {
    pub const ALL: [Expression; 7] = [
        Expression::Neutral,
        Expression::Happy,
        Expression::Sad,
        Expression::Angry,
        Expression::Fearful,
        Expression::Disgusted,
        Expression::Surprised,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Expression::Neutral => "neutral",
            Expression::Happy => "happy",
            Expression::Sad => "sad",
            Expression::Angry => "angry",
            Expression::Fearful => "fearful",
            Expression::Disgusted => "disgusted",
            Expression::Surprised => "surprised",
        }
    }
}

/// Per-frame mass over the base categories.
///
/// Inputs are taken as delivered: they need not sum to 1, and categories a
/// detector omits decode as 0. Only the fusion stage normalizes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpressionDistribution {
    pub neutral: f32,
    pub happy: f32,
    pub sad: f32,
    pub angry: f32,
    pub fearful: f32,
    pub disgusted: f32,
    pub surprised: f32,
}

impl ExpressionDistribution {
    pub fn get(&self, e: Expression) -> f32 {
        match e {
            Expression::Neutral => self.neutral,
            Expression::Happy => self.happy,
            Expression::Sad => self.sad,
            Expression::Angry => self.angry,
            Expression::Fearful => self.fearful,
            Expression::Disgusted => self.disgusted,
            Expression::Surprised => self.surprised,
        }
    }

    pub fn set(&mut self, e: Expression, v: f32) {
        match e {
            Expression::Neutral => self.neutral = v,
            Expression::Happy => self.happy = v,
            Expression::Sad => self.sad = v,
            Expression::Angry => self.angry = v,
            Expression::Fearful => self.fearful = v,
            Expression::Disgusted => self.disgusted = v,
            Expression::Surprised => self.surprised = v,
        }
    }

    /// Largest category, ties to the earlier entry in [`Expression::ALL`].
    pub fn dominant(&self) -> Expression {
        let mut best = Expression::Neutral;
        for e in Expression::ALL {
            if self.get(e) > self.get(best) {
                best = e;
            }
        }
        best
    }
}

/// Affect labels in fixed priority order (earlier wins ties)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AffectLabel {
    Happy = 0,
    Focused = 1,
    Confused = 2,
    Frustrated = 3,
}

impl Default for AffectLabel {
    fn default() -> Self {
        AffectLabel::Focused
    }
}

impl AffectLabel {
    pub const ALL: [AffectLabel; 4] = [
        AffectLabel::Happy,
        AffectLabel::Focused,
        AffectLabel::Confused,
        AffectLabel::Frustrated,
    ];

    #[inline]
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(idx: usize) -> Option<AffectLabel> {
        Self::ALL.get(idx).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AffectLabel::Happy => "happy",
            AffectLabel::Focused => "focused",
            AffectLabel::Confused => "confused",
            AffectLabel::Frustrated => "frustrated",
        }
    }
}

/// Normalized affect scores, indexed by [`AffectLabel`]
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ScoreVector {
    pub p: [f32; 4],
}

impl ScoreVector {
    #[inline]
    pub fn get(&self, label: AffectLabel) -> f32 {
        self.p[label.index()]
    }

    #[inline]
    pub fn set(&mut self, label: AffectLabel, v: f32) {
        self.p[label.index()] = v;
    }

    pub fn sum(&self) -> f32 {
        self.p.iter().sum()
    }

    pub fn entries(&self) -> [(AffectLabel, f32); 4] {
        [
            (AffectLabel::Happy, self.p[0]),
            (AffectLabel::Focused, self.p[1]),
            (AffectLabel::Confused, self.p[2]),
            (AffectLabel::Frustrated, self.p[3]),
        ]
    }
}

/// Fusion winner before stabilization
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Candidate {
    pub label: AffectLabel,
    pub confidence: f32,
}

/// One detector frame as handed to the engine.
///
/// Either part may be absent independently: expressions without a landmark
/// fit, landmarks without a classifier result, or neither.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameInput {
    #[serde(default)]
    pub expressions: Option<ExpressionDistribution>,
    #[serde(default)]
    pub landmarks: Option<LandmarkSet>,
}

/// A committed label change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffectTransition {
    pub from: AffectLabel,
    pub to: AffectLabel,
    pub confidence: f32,
    pub at_us: i64,
}

/// Per-cycle observability payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    /// Stable label after this cycle
    pub label: AffectLabel,
    /// Fused candidate confidence (1.0 while warming up)
    pub confidence: f32,
    /// Normalized scores (all zero while warming up)
    pub scores: ScoreVector,
    /// Milliseconds left in the commit cooldown
    pub cooldown_remaining_ms: u64,
    /// Raw geometric features of this frame
    pub geometry: GeometricFeatures,
    /// Whether the window had reached its minimum fill
    pub warmed_up: bool,
    /// Transition committed by this cycle, if any
    pub committed: Option<AffectTransition>,
}
