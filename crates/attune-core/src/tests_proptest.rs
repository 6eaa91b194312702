use proptest::prelude::*;

/// Property-based suite for the classification invariants that must hold
/// under arbitrary inputs, not just the curated scenarios.

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AttuneConfig;
    use crate::engine::AffectEngine;
    use crate::fusion::fuse;
    use crate::stabilizer::Stabilizer;
    use crate::types::{AffectLabel, ExpressionDistribution, FrameInput};
    use crate::window::ExpressionWindow;
    use attune_face::{
        indices, CalibrationConfig, CalibrationTracker, GeometricFeatures, LandmarkSet,
        LANDMARK_COUNT,
    };

    fn distribution(v: [f32; 7]) -> ExpressionDistribution {
        ExpressionDistribution {
            neutral: v[0],
            happy: v[1],
            sad: v[2],
            angry: v[3],
            fearful: v[4],
            disgusted: v[5],
            surprised: v[6],
        }
    }

    // =========================================================================
    // Test 1: Fusion output is a clean score vector
    // =========================================================================
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn test_fusion_scores_normalized(
            raw in prop::array::uniform7(0.0f32..2.0f32),
            furrow in 0.0f32..1.5f32,
            corner_drop in 0.0f32..1.5f32,
            mouth_open in 0.0f32..1.5f32,
            squint in 0.0f32..1.5f32,
        ) {
            let geo = GeometricFeatures { furrow, corner_drop, mouth_open, squint };
            let outcome = fuse(&distribution(raw), &geo, &AttuneConfig::default().fusion);

            let sum: f32 = outcome.scores.p.iter().sum();
            for &s in &outcome.scores.p {
                prop_assert!(s.is_finite(), "score not finite: {}", s);
                prop_assert!(s >= 0.0, "negative score: {}", s);
                prop_assert!(s <= 1.0 + 1e-5, "score above one: {}", s);
            }
            prop_assert!(
                (sum - 1.0).abs() < 1e-4 || sum == 0.0,
                "scores sum to {} (expected ~1.0 or 0.0)",
                sum
            );
            prop_assert!(outcome.candidate.confidence.is_finite());
            prop_assert!(outcome.candidate.confidence >= 0.0);
            prop_assert!(outcome.candidate.confidence <= 1.0 + 1e-5);
        }

        #[test]
        fn test_fusion_candidate_is_argmax(
            raw in prop::array::uniform7(0.0f32..1.0f32),
            furrow in 0.0f32..1.0f32,
            corner_drop in 0.0f32..1.0f32,
        ) {
            let geo = GeometricFeatures {
                furrow,
                corner_drop,
                mouth_open: 0.0,
                squint: 0.0,
            };
            let outcome = fuse(&distribution(raw), &geo, &AttuneConfig::default().fusion);

            let winner = outcome.scores.get(outcome.candidate.label);
            for &s in &outcome.scores.p {
                prop_assert!(
                    s <= winner,
                    "label {} is not the maximum ({} > {})",
                    outcome.candidate.label.as_str(),
                    s,
                    winner
                );
            }
        }
    }

    // =========================================================================
    // Test 2: Stabilizer spacing and confidence guarantees
    // =========================================================================
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_stabilizer_commit_contract(
            stream in prop::collection::vec((0usize..4usize, 0.0f32..1.0f32), 1..400),
        ) {
            let config = AttuneConfig::default().stabilizer;
            let threshold = config.confidence_threshold;
            let dwell_us = config.dwell_ms as i64 * 1000;
            let cooldown_us = config.cooldown_ms as i64 * 1000;
            let mut stabilizer = Stabilizer::new(config);

            let mut commits = Vec::new();
            for (i, (idx, conf)) in stream.iter().enumerate() {
                let label = AffectLabel::from_index(*idx).unwrap();
                if let Some(t) = stabilizer.observe(label, *conf, i as i64 * 33_000) {
                    commits.push(t);
                }
            }

            for t in &commits {
                prop_assert!(t.confidence >= threshold, "committed below threshold");
                prop_assert_ne!(t.from, t.to, "self-transition committed");
            }
            for pair in commits.windows(2) {
                prop_assert_eq!(pair[0].to, pair[1].from, "history does not chain");
                prop_assert!(
                    pair[1].at_us - pair[0].at_us >= cooldown_us + dwell_us,
                    "commits {} us apart, need at least {}",
                    pair[1].at_us - pair[0].at_us,
                    cooldown_us + dwell_us
                );
            }
        }
    }

    // =========================================================================
    // Test 3: Rolling window average stays inside the sample envelope
    // =========================================================================
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_window_average_bounded(
            samples in prop::collection::vec(prop::array::uniform7(0.0f32..1.0f32), 1..60),
        ) {
            let config = AttuneConfig::default().window;
            let cap = config.max_frames;
            let mut window = ExpressionWindow::new(&config);
            for s in &samples {
                window.push(distribution(*s));
            }
            prop_assert!(window.len() <= cap);

            // only the last `cap` samples are live
            let live: Vec<_> = samples
                .iter()
                .rev()
                .take(cap)
                .map(|s| distribution(*s))
                .collect();
            let avg = window.average();
            for expr in crate::types::Expression::ALL {
                let values: Vec<f32> = live.iter().map(|d| d.get(expr)).collect();
                let lo = values.iter().cloned().fold(f32::INFINITY, f32::min);
                let hi = values.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
                let a = avg.get(expr);
                prop_assert!(
                    a >= lo - 1e-5 && a <= hi + 1e-5,
                    "average {} outside sample envelope [{}, {}]",
                    a, lo, hi
                );
            }
        }
    }

    // =========================================================================
    // Test 4: Calibration mean tracks the observed faces
    // =========================================================================
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn test_calibration_mean_within_observed_range(
            half_gaps in prop::collection::vec(10.0f32..30.0f32, 1..120),
        ) {
            let mut tracker =
                CalibrationTracker::new(CalibrationConfig::default(), 1e-4);
            for &half in &half_gaps {
                let mut points = vec![[150.0f32, 150.0]; LANDMARK_COUNT];
                points[indices::LEFT_EYE_OUTER] = [100.0, 100.0];
                points[indices::LEFT_EYE_INNER] = [130.0, 100.0];
                points[indices::RIGHT_EYE_INNER] = [170.0, 100.0];
                points[indices::RIGHT_EYE_OUTER] = [200.0, 100.0];
                points[indices::LEFT_BROW_INNER] = [150.0 - half, 80.0];
                points[indices::RIGHT_BROW_INNER] = [150.0 + half, 80.0];
                tracker.update(Some(&LandmarkSet::new(points)));
            }

            // inter-ocular is 100, so each sample reads 2*half/100
            let lo = half_gaps.iter().cloned().fold(f32::INFINITY, f32::min) * 2.0 / 100.0;
            let hi = half_gaps.iter().cloned().fold(f32::NEG_INFINITY, f32::max) * 2.0 / 100.0;
            let baseline = tracker.baseline();
            prop_assert!(
                baseline.brow_gap >= lo - 1e-3 && baseline.brow_gap <= hi + 1e-3,
                "baseline {} outside observed range [{}, {}]",
                baseline.brow_gap, lo, hi
            );
        }
    }

    // =========================================================================
    // Test 5: Engine never yields a broken report
    // =========================================================================
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn test_engine_reports_stay_finite(
            frames in prop::collection::vec(prop::array::uniform7(0.0f32..3.0f32), 1..100),
        ) {
            let mut engine = AffectEngine::new(AttuneConfig::default());
            for (i, raw) in frames.iter().enumerate() {
                let input = FrameInput {
                    expressions: Some(distribution(*raw)),
                    landmarks: None,
                };
                let report = engine.process_frame(&input, i as i64 * 33_000);

                prop_assert!(report.confidence.is_finite());
                let sum: f32 = report.scores.p.iter().sum();
                prop_assert!(
                    sum == 0.0 || (sum - 1.0).abs() < 1e-4,
                    "score mass {} at cycle {}",
                    sum, i
                );
            }
        }
    }
}
