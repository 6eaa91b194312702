//! Engine configuration: every threshold and weight the pipeline uses, as
//! named fields with defaults, TOML round-trip and `ATTUNE_*` environment
//! overrides. Fusion code never carries a literal constant; it reads them
//! from here.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use attune_face::{CalibrationConfig, GeometryConfig};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

/// Full engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AttuneConfig {
    pub window: WindowConfig,
    pub calibration: CalibrationConfig,
    pub geometry: GeometryConfig,
    pub fusion: FusionConfig,
    pub stabilizer: StabilizerConfig,
}

/// Rolling expression window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Maximum frames retained
    pub max_frames: usize,
    /// Fraction of `max_frames` required before fusion runs
    pub warmup_ratio: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            max_frames: 15,
            warmup_ratio: 0.6,
        }
    }
}

/// Dwell/cooldown stabilizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StabilizerConfig {
    /// Candidates below this confidence are ignored
    pub confidence_threshold: f32,
    /// How long a new label must persist before it commits
    pub dwell_ms: u64,
    /// Lockout after a commit during which no candidate is considered
    pub cooldown_ms: u64,
}

impl Default for StabilizerConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.35,
            dwell_ms: 900,
            cooldown_ms: 2000,
        }
    }
}

/// Fusion stage weights, grouped per step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    pub damping: DampingWeights,
    pub confusion_override: OverrideWeights,
    pub frustrated: FrustratedWeights,
    pub confused: ConfusedWeights,
    pub focused: FocusedWeights,
    pub happy: HappyWeights,
}

/// Step 1: neutral/happy dominance damping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DampingWeights {
    /// neutral + happy mass above which damping engages
    pub high_dominance_threshold: f32,
    /// Furrow level that engages damping on its own
    pub furrow_elevated: f32,
    /// Squint level that engages damping on its own
    pub squint_elevated: f32,
    pub thinking_furrow_weight: f32,
    pub thinking_squint_weight: f32,
    pub thinking_corner_weight: f32,
    /// Mouth openness subtracts from the thinking composite
    pub thinking_mouth_relief: f32,
    /// Fraction of the thinking composite removed from neutral/happy
    pub strength: f32,
}

impl Default for DampingWeights {
    fn default() -> Self {
        Self {
            high_dominance_threshold: 0.60,
            furrow_elevated: 0.25,
            squint_elevated: 0.30,
            thinking_furrow_weight: 0.55,
            thinking_squint_weight: 0.25,
            thinking_corner_weight: 0.30,
            thinking_mouth_relief: 0.35,
            strength: 0.65,
        }
    }
}

/// Step 2: confusion priority override
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverrideWeights {
    /// Furrow at or above this fires the override
    pub furrow_min: f32,
    /// ... provided the mouth stays at most this open
    pub mouth_open_max: f32,
    /// ... and the corners at most this dropped
    pub corner_drop_max: f32,
    /// Forced score distribution, in label priority order
    pub forced_scores: [f32; 4],
    /// Lower bound on the override confidence
    pub confidence_floor: f32,
    pub confidence_furrow_weight: f32,
    pub confidence_squint_weight: f32,
}

impl Default for OverrideWeights {
    fn default() -> Self {
        Self {
            furrow_min: 0.55,
            mouth_open_max: 0.22,
            corner_drop_max: 0.18,
            // happy, focused, confused, frustrated
            forced_scores: [0.04, 0.12, 0.76, 0.08],
            confidence_floor: 0.78,
            confidence_furrow_weight: 0.9,
            confidence_squint_weight: 0.1,
        }
    }
}

/// Step 3 weights: frustrated score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrustratedWeights {
    /// Below this corner drop the score is pinned low
    pub corner_gate: f32,
    /// Pinned value when gated out
    pub pinned_score: f32,
    pub corner_weight: f32,
    pub anger_weight: f32,
    pub disgust_weight: f32,
    pub sadness_weight: f32,
    pub happy_penalty: f32,
    pub furrow_penalty: f32,
}

impl Default for FrustratedWeights {
    fn default() -> Self {
        Self {
            corner_gate: 0.12,
            pinned_score: 0.02,
            corner_weight: 0.9,
            anger_weight: 0.8,
            disgust_weight: 0.6,
            sadness_weight: 0.4,
            happy_penalty: 0.5,
            furrow_penalty: 0.3,
        }
    }
}

/// Step 3 weights: confused score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfusedWeights {
    pub furrow_weight: f32,
    pub squint_weight: f32,
    pub mouth_penalty: f32,
    /// Score never falls below this fraction of the furrow itself
    pub furrow_floor: f32,
}

impl Default for ConfusedWeights {
    fn default() -> Self {
        Self {
            furrow_weight: 0.8,
            squint_weight: 0.4,
            mouth_penalty: 0.3,
            furrow_floor: 0.6,
        }
    }
}

/// Step 3 weights: focused score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusedWeights {
    /// Scales how strongly furrow+squint shrink the damped neutral mass
    pub tension_scale: f32,
    /// Penalty per unit of surprised+fearful+angry mass
    pub distraction_penalty: f32,
}

impl Default for FocusedWeights {
    fn default() -> Self {
        Self {
            tension_scale: 0.5,
            distraction_penalty: 0.3,
        }
    }
}

/// Step 3 weights: happy score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HappyWeights {
    /// Penalty per unit of angry+disgusted+sad mass
    pub negative_penalty: f32,
    pub squint_penalty: f32,
    pub furrow_penalty: f32,
}

impl Default for HappyWeights {
    fn default() -> Self {
        Self {
            negative_penalty: 0.4,
            squint_penalty: 0.2,
            furrow_penalty: 0.3,
        }
    }
}

impl AttuneConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: AttuneConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    /// Variables are prefixed with ATTUNE_, e.g. ATTUNE_STABILIZER_DWELL_MS=1200.
    pub fn from_file_with_env<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from layered sources, later layers taking priority:
    /// built-in defaults, then the default file, then the user file, then
    /// environment variables.
    pub fn load_layered(
        default_path: Option<&Path>,
        user_path: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let mut config = AttuneConfig::default();

        if let Some(path) = default_path {
            if path.exists() {
                config = Self::from_file(path)?;
            }
        }

        if let Some(path) = user_path {
            if path.exists() {
                let user_config = Self::from_file(path)?;
                config = config.merge(user_config);
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// A user layer replaces lower layers wholesale.
    fn merge(self, other: AttuneConfig) -> Self {
        other
    }

    /// Apply ATTUNE_* environment overrides
    pub(crate) fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        use std::env;

        // Window
        if let Ok(val) = env::var("ATTUNE_WINDOW_MAX_FRAMES") {
            self.window.max_frames = val.parse().map_err(|_| {
                ConfigError::Validation("Invalid ATTUNE_WINDOW_MAX_FRAMES".to_string())
            })?;
        }
        if let Ok(val) = env::var("ATTUNE_WINDOW_WARMUP_RATIO") {
            self.window.warmup_ratio = val.parse().map_err(|_| {
                ConfigError::Validation("Invalid ATTUNE_WINDOW_WARMUP_RATIO".to_string())
            })?;
        }

        // Calibration
        if let Ok(val) = env::var("ATTUNE_CALIBRATION_MAX_FRAMES") {
            self.calibration.max_frames = val.parse().map_err(|_| {
                ConfigError::Validation("Invalid ATTUNE_CALIBRATION_MAX_FRAMES".to_string())
            })?;
        }

        // Geometry
        if let Ok(val) = env::var("ATTUNE_GEOMETRY_SQUINT_SENSITIVITY") {
            self.geometry.squint_sensitivity = val.parse().map_err(|_| {
                ConfigError::Validation("Invalid ATTUNE_GEOMETRY_SQUINT_SENSITIVITY".to_string())
            })?;
        }

        // Fusion
        if let Ok(val) = env::var("ATTUNE_FUSION_OVERRIDE_FURROW_MIN") {
            self.fusion.confusion_override.furrow_min = val.parse().map_err(|_| {
                ConfigError::Validation("Invalid ATTUNE_FUSION_OVERRIDE_FURROW_MIN".to_string())
            })?;
        }

        // Stabilizer
        if let Ok(val) = env::var("ATTUNE_STABILIZER_CONFIDENCE_THRESHOLD") {
            self.stabilizer.confidence_threshold = val.parse().map_err(|_| {
                ConfigError::Validation(
                    "Invalid ATTUNE_STABILIZER_CONFIDENCE_THRESHOLD".to_string(),
                )
            })?;
        }
        if let Ok(val) = env::var("ATTUNE_STABILIZER_DWELL_MS") {
            self.stabilizer.dwell_ms = val.parse().map_err(|_| {
                ConfigError::Validation("Invalid ATTUNE_STABILIZER_DWELL_MS".to_string())
            })?;
        }
        if let Ok(val) = env::var("ATTUNE_STABILIZER_COOLDOWN_MS") {
            self.stabilizer.cooldown_ms = val.parse().map_err(|_| {
                ConfigError::Validation("Invalid ATTUNE_STABILIZER_COOLDOWN_MS".to_string())
            })?;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Window
        if self.window.max_frames == 0 {
            return Err(ConfigError::Validation(
                "window.max_frames must be > 0".to_string(),
            ));
        }
        if self.window.warmup_ratio <= 0.0 || self.window.warmup_ratio > 1.0 {
            return Err(ConfigError::Validation(
                "window.warmup_ratio must be in (0, 1]".to_string(),
            ));
        }

        // Calibration
        if self.calibration.max_frames == 0 {
            return Err(ConfigError::Validation(
                "calibration.max_frames must be > 0".to_string(),
            ));
        }
        if self.calibration.fallback_brow_gap <= 0.0 || self.calibration.fallback_ear <= 0.0 {
            return Err(ConfigError::Validation(
                "calibration fallback pivots must be positive".to_string(),
            ));
        }

        // Geometry
        if self.geometry.epsilon <= 0.0 {
            return Err(ConfigError::Validation(
                "geometry.epsilon must be positive".to_string(),
            ));
        }
        if self.geometry.full_furrow_ratio <= 0.0 || self.geometry.full_furrow_ratio > 1.0 {
            return Err(ConfigError::Validation(
                "geometry.full_furrow_ratio must be in (0, 1]".to_string(),
            ));
        }
        if self.geometry.brow_rest_gap <= 0.0 {
            return Err(ConfigError::Validation(
                "geometry.brow_rest_gap must be positive".to_string(),
            ));
        }
        if self.geometry.squint_sensitivity <= 0.0 {
            return Err(ConfigError::Validation(
                "geometry.squint_sensitivity must be positive".to_string(),
            ));
        }

        // Fusion: thresholds in range
        let d = &self.fusion.damping;
        if d.high_dominance_threshold < 0.0 || d.high_dominance_threshold > 2.0 {
            return Err(ConfigError::Validation(
                "fusion.damping.high_dominance_threshold must be in [0, 2]".to_string(),
            ));
        }
        if d.strength < 0.0 || d.strength > 1.0 {
            return Err(ConfigError::Validation(
                "fusion.damping.strength must be in [0, 1]".to_string(),
            ));
        }
        let o = &self.fusion.confusion_override;
        if o.furrow_min < 0.0 || o.furrow_min > 1.0 {
            return Err(ConfigError::Validation(
                "fusion.confusion_override.furrow_min must be in [0, 1]".to_string(),
            ));
        }
        if o.confidence_floor < 0.0 || o.confidence_floor > 1.0 {
            return Err(ConfigError::Validation(
                "fusion.confusion_override.confidence_floor must be in [0, 1]".to_string(),
            ));
        }
        let forced_sum: f32 = o.forced_scores.iter().sum();
        if o.forced_scores.iter().any(|&s| s < 0.0) || (forced_sum - 1.0).abs() > 1e-3 {
            return Err(ConfigError::Validation(
                "fusion.confusion_override.forced_scores must be non-negative and sum to 1"
                    .to_string(),
            ));
        }

        // Fusion: weights non-negative
        let nonneg: [(&str, f32); 18] = [
            ("fusion.damping.thinking_furrow_weight", d.thinking_furrow_weight),
            ("fusion.damping.thinking_squint_weight", d.thinking_squint_weight),
            ("fusion.damping.thinking_corner_weight", d.thinking_corner_weight),
            ("fusion.damping.thinking_mouth_relief", d.thinking_mouth_relief),
            ("fusion.frustrated.corner_gate", self.fusion.frustrated.corner_gate),
            ("fusion.frustrated.pinned_score", self.fusion.frustrated.pinned_score),
            ("fusion.frustrated.corner_weight", self.fusion.frustrated.corner_weight),
            ("fusion.frustrated.anger_weight", self.fusion.frustrated.anger_weight),
            ("fusion.frustrated.disgust_weight", self.fusion.frustrated.disgust_weight),
            ("fusion.frustrated.sadness_weight", self.fusion.frustrated.sadness_weight),
            ("fusion.confused.furrow_weight", self.fusion.confused.furrow_weight),
            ("fusion.confused.squint_weight", self.fusion.confused.squint_weight),
            ("fusion.confused.furrow_floor", self.fusion.confused.furrow_floor),
            ("fusion.focused.tension_scale", self.fusion.focused.tension_scale),
            ("fusion.focused.distraction_penalty", self.fusion.focused.distraction_penalty),
            ("fusion.happy.negative_penalty", self.fusion.happy.negative_penalty),
            ("fusion.happy.squint_penalty", self.fusion.happy.squint_penalty),
            ("fusion.happy.furrow_penalty", self.fusion.happy.furrow_penalty),
        ];
        for (name, v) in nonneg {
            if v < 0.0 {
                return Err(ConfigError::Validation(format!(
                    "{} must be non-negative",
                    name
                )));
            }
        }

        // Stabilizer
        if self.stabilizer.confidence_threshold < 0.0 || self.stabilizer.confidence_threshold > 1.0
        {
            return Err(ConfigError::Validation(
                "stabilizer.confidence_threshold must be in [0, 1]".to_string(),
            ));
        }
        if self.stabilizer.dwell_ms == 0 {
            return Err(ConfigError::Validation(
                "stabilizer.dwell_ms must be > 0".to_string(),
            ));
        }
        if self.stabilizer.cooldown_ms == 0 {
            return Err(ConfigError::Validation(
                "stabilizer.cooldown_ms must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Export configuration to a TOML string
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = self
            .to_toml_string()
            .map_err(|e| ConfigError::Validation(format!("TOML serialization error: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }
}
