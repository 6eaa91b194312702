//! Synthetic frame generation for the `simulate` subcommand. Each scenario
//! produces the expression stream and face poses a webcam pipeline would
//! emit, with seeded jitter so runs are reproducible.

use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use attune_core::{ExpressionDistribution, FrameInput};
use attune_face::{indices, LandmarkSet, LANDMARK_COUNT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// Relaxed neutral viewing
    Calm,
    /// Calm opening, then a sustained concentrated furrow
    Thinking,
    /// Calm opening, then anger with dropped mouth corners
    Frustrated,
}

impl Scenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Calm => "calm",
            Scenario::Thinking => "thinking",
            Scenario::Frustrated => "frustrated",
        }
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generate a full scenario. Phase scenarios switch after the first third,
/// which with default settings leaves room for calibration to freeze first.
pub fn generate(scenario: Scenario, frames: usize, seed: u64) -> Vec<FrameInput> {
    let mut rng = StdRng::seed_from_u64(seed);
    let switch_at = frames / 3;
    (0..frames)
        .map(|i| match scenario {
            Scenario::Calm => calm_frame(&mut rng),
            Scenario::Thinking if i >= switch_at => thinking_frame(&mut rng),
            Scenario::Frustrated if i >= switch_at => frustrated_frame(&mut rng),
            _ => calm_frame(&mut rng),
        })
        .collect()
}

fn jitter(rng: &mut StdRng, magnitude: f32) -> f32 {
    rng.gen_range(-magnitude..magnitude)
}

fn calm_frame(rng: &mut StdRng) -> FrameInput {
    let mut d = ExpressionDistribution::default();
    d.neutral = 0.85 + jitter(rng, 0.05);
    d.happy = 0.08 + jitter(rng, 0.03);
    d.sad = 0.02 + jitter(rng, 0.01);
    d.surprised = 0.02 + jitter(rng, 0.01);
    FrameInput {
        expressions: Some(d),
        landmarks: Some(neutral_face(rng)),
    }
}

fn thinking_frame(rng: &mut StdRng) -> FrameInput {
    let mut d = ExpressionDistribution::default();
    d.neutral = 0.70 + jitter(rng, 0.05);
    d.angry = 0.10 + jitter(rng, 0.03);
    d.sad = 0.05 + jitter(rng, 0.02);
    d.surprised = 0.05 + jitter(rng, 0.02);
    FrameInput {
        expressions: Some(d),
        landmarks: Some(furrowed_face(rng, 0.75)),
    }
}

fn frustrated_frame(rng: &mut StdRng) -> FrameInput {
    let mut d = ExpressionDistribution::default();
    d.neutral = 0.25 + jitter(rng, 0.05);
    d.angry = 0.55 + jitter(rng, 0.05);
    d.disgusted = 0.08 + jitter(rng, 0.02);
    d.sad = 0.07 + jitter(rng, 0.02);
    FrameInput {
        expressions: Some(d),
        landmarks: Some(dropped_corner_face(rng)),
    }
}

// Canonical synthetic head: inter-ocular 100px, brow gap 42px, brow-eye gap
// 18px, EAR 0.28, mouth 40px wide, closed and level.

fn place(face: &mut [[f32; 2]], rng: &mut StdRng, idx: usize, x: f32, y: f32) {
    face[idx] = [x + jitter(rng, 0.4), y + jitter(rng, 0.4)];
}

fn neutral_face(rng: &mut StdRng) -> LandmarkSet {
    let mut p = vec![[150.0f32, 150.0]; LANDMARK_COUNT];
    place(&mut p, rng, indices::LEFT_EYE_OUTER, 100.0, 100.0);
    place(&mut p, rng, indices::LEFT_EYE_INNER, 130.0, 100.0);
    place(&mut p, rng, indices::RIGHT_EYE_INNER, 170.0, 100.0);
    place(&mut p, rng, indices::RIGHT_EYE_OUTER, 200.0, 100.0);
    place(&mut p, rng, indices::LEFT_EYE_TOP_1, 110.0, 95.8);
    place(&mut p, rng, indices::LEFT_EYE_BOTTOM_1, 110.0, 104.2);
    place(&mut p, rng, indices::LEFT_EYE_TOP_2, 120.0, 95.8);
    place(&mut p, rng, indices::LEFT_EYE_BOTTOM_2, 120.0, 104.2);
    place(&mut p, rng, indices::RIGHT_EYE_TOP_1, 180.0, 95.8);
    place(&mut p, rng, indices::RIGHT_EYE_BOTTOM_1, 180.0, 104.2);
    place(&mut p, rng, indices::RIGHT_EYE_TOP_2, 190.0, 95.8);
    place(&mut p, rng, indices::RIGHT_EYE_BOTTOM_2, 190.0, 104.2);
    place(&mut p, rng, indices::LEFT_BROW_INNER, 129.0, 77.8);
    place(&mut p, rng, indices::RIGHT_BROW_INNER, 171.0, 77.8);
    place(&mut p, rng, indices::LEFT_MOUTH_CORNER, 130.0, 140.0);
    place(&mut p, rng, indices::RIGHT_MOUTH_CORNER, 170.0, 140.0);
    place(&mut p, rng, indices::UPPER_LIP_CENTER, 150.0, 135.0);
    place(&mut p, rng, indices::LOWER_LIP_CENTER, 150.0, 145.0);
    place(&mut p, rng, indices::UPPER_LIP_INNER, 150.0, 139.5);
    place(&mut p, rng, indices::LOWER_LIP_INNER, 150.0, 140.5);
    LandmarkSet::new(p)
}

fn furrowed_face(rng: &mut StdRng, furrow: f32) -> LandmarkSet {
    let mut face = neutral_face(rng);
    let half = 42.0 * (1.0 - 0.25 * furrow) / 2.0;
    let y = 95.8 - 18.0 * (1.0 - furrow);
    place(&mut face.points, rng, indices::LEFT_BROW_INNER, 150.0 - half, y);
    place(&mut face.points, rng, indices::RIGHT_BROW_INNER, 150.0 + half, y);
    face
}

fn dropped_corner_face(rng: &mut StdRng) -> LandmarkSet {
    let mut face = neutral_face(rng);
    place(&mut face.points, rng, indices::LEFT_MOUTH_CORNER, 130.0, 160.0);
    place(&mut face.points, rng, indices::RIGHT_MOUTH_CORNER, 170.0, 160.0);
    face
}
