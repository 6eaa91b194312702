//! Evidence Fusion
//!
//! Combines the windowed expression average with the current frame's
//! geometry into a normalized four-label score vector and a winning
//! candidate. Pure function of its inputs; every constant comes from
//! [`FusionConfig`].
//!
//! Steps, in order: dominance damping, confusion priority override,
//! per-label base scores, clamp+normalize, priority selection.

use crate::config::FusionConfig;
use crate::types::{AffectLabel, Candidate, ExpressionDistribution, ScoreVector};
use attune_face::GeometricFeatures;

/// Fusion result for one cycle.
#[derive(Debug, Clone)]
pub struct FusionOutcome {
    pub candidate: Candidate,
    pub scores: ScoreVector,
}

#[inline]
fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

fn all_finite(avg: &ExpressionDistribution, geo: &GeometricFeatures) -> bool {
    [
        avg.neutral,
        avg.happy,
        avg.sad,
        avg.angry,
        avg.fearful,
        avg.disgusted,
        avg.surprised,
        geo.furrow,
        geo.corner_drop,
        geo.mouth_open,
        geo.squint,
    ]
    .iter()
    .all(|v| v.is_finite())
}

/// Fuse windowed expressions with frame geometry.
pub fn fuse(
    avg: &ExpressionDistribution,
    geo: &GeometricFeatures,
    cfg: &FusionConfig,
) -> FusionOutcome {
    // NaN/Infinity guard: a poisoned input yields a zero vector, which the
    // stabilizer ignores (confidence 0).
    if !all_finite(avg, geo) {
        log::warn!("fuse: non-finite input, returning zero scores");
        let scores = ScoreVector::default();
        return FusionOutcome {
            candidate: select(&scores),
            scores,
        };
    }

    // Step 1: damp neutral/happy mass when it dominates the window or the
    // face shows concentration tension.
    let d = &cfg.damping;
    let mut neutral = avg.neutral;
    let mut happy = avg.happy;
    let dominance = neutral + happy;
    let thinking = clamp01(
        d.thinking_furrow_weight * geo.furrow
            + d.thinking_squint_weight * geo.squint
            + d.thinking_corner_weight * geo.corner_drop
            - d.thinking_mouth_relief * geo.mouth_open,
    );
    if dominance > d.high_dominance_threshold
        || geo.furrow > d.furrow_elevated
        || geo.squint > d.squint_elevated
    {
        let damp = 1.0 - thinking * d.strength;
        neutral *= damp;
        happy *= damp;
    }

    // Step 2: strong furrow with a quiet mouth is confusion, regardless of
    // what the windowed categories say.
    let o = &cfg.confusion_override;
    if geo.furrow >= o.furrow_min
        && geo.mouth_open <= o.mouth_open_max
        && geo.corner_drop <= o.corner_drop_max
    {
        let scores = ScoreVector {
            p: o.forced_scores,
        };
        let geom_conf = clamp01(
            o.confidence_furrow_weight * geo.furrow + o.confidence_squint_weight * geo.squint,
        );
        let confidence = geom_conf.max(o.confidence_floor);
        log::trace!(
            "fusion override: furrow={:.3} -> confused ({:.3})",
            geo.furrow,
            confidence
        );
        return FusionOutcome {
            candidate: Candidate {
                label: AffectLabel::Confused,
                confidence,
            },
            scores,
        };
    }

    // Step 3: per-label base scores.
    let f = &cfg.frustrated;
    let frustrated = if geo.corner_drop < f.corner_gate {
        f.pinned_score
    } else {
        f.corner_weight * geo.corner_drop
            + f.anger_weight * avg.angry
            + f.disgust_weight * avg.disgusted
            + f.sadness_weight * avg.sad
            - f.happy_penalty * happy
            - f.furrow_penalty * geo.furrow
    };

    let c = &cfg.confused;
    let confused = (c.furrow_weight * geo.furrow + c.squint_weight * geo.squint
        - c.mouth_penalty * geo.mouth_open)
        .max(c.furrow_floor * geo.furrow);

    let fo = &cfg.focused;
    let tension = clamp01((geo.furrow + geo.squint) * fo.tension_scale);
    let focused = neutral * (1.0 - tension)
        - (avg.surprised + avg.fearful + avg.angry) * fo.distraction_penalty;

    let h = &cfg.happy;
    let happy_score = happy
        - (avg.angry + avg.disgusted + avg.sad) * h.negative_penalty
        - geo.squint * h.squint_penalty
        - geo.furrow * h.furrow_penalty;

    // Step 4: clamp and normalize. All-zero evidence stays all-zero.
    let mut scores = ScoreVector {
        p: [happy_score, focused, confused, frustrated],
    };
    for v in scores.p.iter_mut() {
        *v = v.max(0.0);
    }
    let sum = scores.sum();
    if sum > 0.0 {
        for v in scores.p.iter_mut() {
            *v /= sum;
        }
    }

    FusionOutcome {
        candidate: select(&scores),
        scores,
    }
}

/// Pick the winner in priority order; a later label needs a strictly
/// greater score.
pub fn select(scores: &ScoreVector) -> Candidate {
    let mut best = AffectLabel::ALL[0];
    for label in AffectLabel::ALL {
        if scores.get(label) > scores.get(best) {
            best = label;
        }
    }
    Candidate {
        label: best,
        confidence: scores.get(best),
    }
}
