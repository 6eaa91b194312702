//! End-to-end session scenarios: calm focus, sustained confusion with a
//! single de-bounced commit, frustration via dropped mouth corners, and the
//! lockouts around them. Frames arrive at ~30 fps (33 ms apart).

use crate::config::AttuneConfig;
use crate::engine::AffectEngine;
use crate::types::{AffectLabel, AffectTransition, ExpressionDistribution, FrameInput};
use attune_face::{indices, LandmarkSet, LANDMARK_COUNT};

const FRAME_US: i64 = 33_000;

// Synthetic face matching the default baseline: inter-ocular 100px, brow
// gap 42px, brow-eye gap 18px, EAR 0.28, mouth closed and level.

fn set_ear(points: &mut [[f32; 2]], ear: f32) {
    let half = ear * 30.0 / 2.0;
    let pairs: [(usize, usize, f32); 4] = [
        (indices::LEFT_EYE_TOP_1, indices::LEFT_EYE_BOTTOM_1, 110.0),
        (indices::LEFT_EYE_TOP_2, indices::LEFT_EYE_BOTTOM_2, 120.0),
        (indices::RIGHT_EYE_TOP_1, indices::RIGHT_EYE_BOTTOM_1, 180.0),
        (indices::RIGHT_EYE_TOP_2, indices::RIGHT_EYE_BOTTOM_2, 190.0),
    ];
    for (top, bottom, x) in pairs {
        points[top] = [x, 100.0 - half];
        points[bottom] = [x, 100.0 + half];
    }
}

fn neutral_face() -> LandmarkSet {
    let mut points = vec![[150.0f32, 150.0]; LANDMARK_COUNT];
    points[indices::LEFT_EYE_OUTER] = [100.0, 100.0];
    points[indices::LEFT_EYE_INNER] = [130.0, 100.0];
    points[indices::RIGHT_EYE_INNER] = [170.0, 100.0];
    points[indices::RIGHT_EYE_OUTER] = [200.0, 100.0];
    set_ear(&mut points, 0.28);
    points[indices::LEFT_BROW_INNER] = [129.0, 77.8];
    points[indices::RIGHT_BROW_INNER] = [171.0, 77.8];
    points[indices::LEFT_MOUTH_CORNER] = [130.0, 140.0];
    points[indices::RIGHT_MOUTH_CORNER] = [170.0, 140.0];
    points[indices::UPPER_LIP_CENTER] = [150.0, 135.0];
    points[indices::LOWER_LIP_CENTER] = [150.0, 145.0];
    points[indices::UPPER_LIP_INNER] = [150.0, 140.0];
    points[indices::LOWER_LIP_INNER] = [150.0, 140.0];
    LandmarkSet::new(points)
}

/// Brows narrowed and dropped to the given furrow intensity, mouth slightly
/// tense (open 0.1, corners 0.05 below level).
fn furrowed_face(furrow: f32) -> LandmarkSet {
    let mut face = neutral_face();
    let half = 42.0 * (1.0 - 0.25 * furrow) / 2.0;
    let y = 95.8 - 18.0 * (1.0 - furrow);
    face.points[indices::LEFT_BROW_INNER] = [150.0 - half, y];
    face.points[indices::RIGHT_BROW_INNER] = [150.0 + half, y];
    face.points[indices::UPPER_LIP_INNER] = [150.0, 138.0];
    face.points[indices::LOWER_LIP_INNER] = [150.0, 142.0];
    face.points[indices::LEFT_MOUTH_CORNER] = [130.0, 142.0];
    face.points[indices::RIGHT_MOUTH_CORNER] = [170.0, 142.0];
    face
}

/// Mouth corners dropped half a mouth-width below the lip centers, brows and
/// eyes at rest.
fn dropped_corner_face() -> LandmarkSet {
    let mut face = neutral_face();
    face.points[indices::LEFT_MOUTH_CORNER] = [130.0, 160.0];
    face.points[indices::RIGHT_MOUTH_CORNER] = [170.0, 160.0];
    face
}

fn neutral_expressions() -> ExpressionDistribution {
    let mut d = ExpressionDistribution::default();
    d.neutral = 1.0;
    d
}

fn angry_expressions() -> ExpressionDistribution {
    let mut d = ExpressionDistribution::default();
    d.neutral = 0.25;
    d.angry = 0.6;
    d.disgusted = 0.05;
    d.sad = 0.05;
    d.happy = 0.05;
    d
}

fn happy_expressions() -> ExpressionDistribution {
    let mut d = ExpressionDistribution::default();
    d.happy = 0.95;
    d.neutral = 0.05;
    d
}

fn frame(expressions: ExpressionDistribution, face: &LandmarkSet) -> FrameInput {
    FrameInput {
        expressions: Some(expressions),
        landmarks: Some(face.clone()),
    }
}

/// Drive `n` frames, returning commits observed and the time cursor.
fn drive(
    engine: &mut AffectEngine,
    input: &FrameInput,
    n: usize,
    now_us: &mut i64,
) -> Vec<AffectTransition> {
    let mut commits = Vec::new();
    for _ in 0..n {
        let report = engine.process_frame(input, *now_us);
        *now_us += FRAME_US;
        if let Some(t) = report.committed {
            commits.push(t);
        }
    }
    commits
}

/// Feed enough neutral frames to freeze calibration (default 90) and settle
/// the window. Must produce no transitions.
fn settle_neutral(engine: &mut AffectEngine, now_us: &mut i64) {
    let input = frame(neutral_expressions(), &neutral_face());
    let commits = drive(engine, &input, 100, now_us);
    assert!(commits.is_empty(), "settling on neutral must not commit");
    assert!(engine.is_calibrated());
    assert_eq!(engine.current_label(), AffectLabel::Focused);
}

#[test]
fn test_calm_session_stays_focused_with_high_confidence() {
    // expressions only; a face is not required for the calm path
    let mut engine = AffectEngine::new(AttuneConfig::default());
    let input = FrameInput {
        expressions: Some(neutral_expressions()),
        landmarks: None,
    };
    let mut now = 0i64;

    let mut last = None;
    for _ in 0..15 {
        let report = engine.process_frame(&input, now);
        now += FRAME_US;
        assert!(report.committed.is_none());
        last = Some(report);
    }
    let last = last.unwrap();
    assert!(last.warmed_up);
    assert_eq!(last.label, AffectLabel::Focused);
    assert!(
        last.confidence > 0.9,
        "calm neutral should be near-certain focus, got {}",
        last.confidence
    );
    assert!(engine.transition_history().is_empty());
}

#[test]
fn test_sustained_furrow_commits_confused_exactly_once() {
    let mut engine = AffectEngine::new(AttuneConfig::default());
    let mut now = 0i64;
    settle_neutral(&mut engine, &mut now);

    // strong furrow, mouth nearly closed and level: the override path
    let input = frame(neutral_expressions(), &furrowed_face(0.8));
    let commits = drive(&mut engine, &input, 120, &mut now);

    assert_eq!(commits.len(), 1, "one de-bounced commit expected");
    assert_eq!(commits[0].from, AffectLabel::Focused);
    assert_eq!(commits[0].to, AffectLabel::Confused);
    assert!(
        commits[0].confidence >= 0.78,
        "override confidence floor not honored: {}",
        commits[0].confidence
    );
    assert_eq!(engine.current_label(), AffectLabel::Confused);
    assert_eq!(engine.session_stats().commits, 1);
}

#[test]
fn test_dwell_is_enforced_before_the_commit() {
    let mut engine = AffectEngine::new(AttuneConfig::default());
    let mut now = 0i64;
    settle_neutral(&mut engine, &mut now);

    // 15 furrowed frames span ~495 ms, well short of the 900 ms dwell
    let furrow = frame(neutral_expressions(), &furrowed_face(0.8));
    let commits = drive(&mut engine, &furrow, 15, &mut now);
    assert!(commits.is_empty(), "commit before dwell elapsed");

    // back to neutral: the pending candidate dissolves
    let calm = frame(neutral_expressions(), &neutral_face());
    let commits = drive(&mut engine, &calm, 60, &mut now);
    assert!(commits.is_empty());
    assert_eq!(engine.current_label(), AffectLabel::Focused);
    assert_eq!(engine.session_stats().commits, 0);
}

#[test]
fn test_dropped_corners_with_anger_commit_frustrated() {
    let mut engine = AffectEngine::new(AttuneConfig::default());
    let mut now = 0i64;
    settle_neutral(&mut engine, &mut now);

    let input = frame(angry_expressions(), &dropped_corner_face());
    let commits = drive(&mut engine, &input, 150, &mut now);

    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].to, AffectLabel::Frustrated);
    assert_eq!(engine.current_label(), AffectLabel::Frustrated);

    // steady state: frustration dominates decisively
    let report = engine.process_frame(&input, now);
    assert!(
        report.scores.get(AffectLabel::Frustrated) > 0.8,
        "steady frustration score too low: {}",
        report.scores.get(AffectLabel::Frustrated)
    );
}

#[test]
fn test_furrow_override_outranks_angry_window() {
    let mut engine = AffectEngine::new(AttuneConfig::default());
    let mut now = 0i64;
    settle_neutral(&mut engine, &mut now);

    // anger in the window, but the face shows a concentrated furrow with a
    // calm mouth: confusion wins
    let input = frame(angry_expressions(), &furrowed_face(0.8));
    let commits = drive(&mut engine, &input, 120, &mut now);

    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].to, AffectLabel::Confused);
    assert_eq!(engine.current_label(), AffectLabel::Confused);
}

#[test]
fn test_anger_without_dropped_corners_stays_focused() {
    let mut engine = AffectEngine::new(AttuneConfig::default());
    let mut now = 0i64;
    settle_neutral(&mut engine, &mut now);

    // expressions alone, level mouth: the corner gate pins frustration
    let input = frame(angry_expressions(), &neutral_face());
    let commits = drive(&mut engine, &input, 150, &mut now);

    assert!(commits.is_empty());
    assert_eq!(engine.current_label(), AffectLabel::Focused);
}

#[test]
fn test_cooldown_spaces_consecutive_commits() {
    let mut engine = AffectEngine::new(AttuneConfig::default());
    let mut now = 0i64;
    settle_neutral(&mut engine, &mut now);

    let furrow = frame(neutral_expressions(), &furrowed_face(0.8));
    let first = drive(&mut engine, &furrow, 40, &mut now);
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].to, AffectLabel::Confused);

    // immediately pivot to overt happiness
    let happy = frame(happy_expressions(), &neutral_face());
    let second = drive(&mut engine, &happy, 150, &mut now);
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].to, AffectLabel::Happy);

    let spacing = second[0].at_us - first[0].at_us;
    // cooldown (2000 ms) then a fresh dwell (900 ms)
    assert!(
        spacing >= 2_900_000,
        "commits only {} us apart",
        spacing
    );
}

#[test]
fn test_opening_furrow_becomes_the_baseline() {
    // a session that begins mid-frown: calibration absorbs the pose, so no
    // confusion is manufactured out of the user's resting face
    let mut engine = AffectEngine::new(AttuneConfig::default());
    let input = frame(neutral_expressions(), &furrowed_face(0.8));
    let mut now = 0i64;

    let commits = drive(&mut engine, &input, 200, &mut now);
    assert!(commits.is_empty());
    assert_eq!(engine.current_label(), AffectLabel::Focused);
}

#[test]
fn test_landmark_free_session_classifies_from_expressions_alone() {
    let mut engine = AffectEngine::new(AttuneConfig::default());
    let mut now = 0i64;

    let happy = FrameInput {
        expressions: Some(happy_expressions()),
        landmarks: None,
    };
    let mut commits = Vec::new();
    for _ in 0..100 {
        let report = engine.process_frame(&happy, now);
        now += FRAME_US;
        if let Some(t) = report.committed {
            commits.push(t);
        }
    }
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].to, AffectLabel::Happy);
    assert_eq!(engine.session_stats().frames_with_landmarks, 0);
    assert!(!engine.is_calibrated());
}
