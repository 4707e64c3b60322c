//! Pipeline configuration
//!
//! Defaults follow the slower-to-alarm tuning: a permissive distraction signal
//! and a long debounce before the status flips.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{
    DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH, DEFAULT_HISTORY_SIZE, DEFAULT_SAMPLE_INTERVAL_MS,
    FIRST_FRAME_MOTION,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    pub interval_ms: u64,
    pub frame_width: u32,
    pub frame_height: u32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_SAMPLE_INTERVAL_MS,
            frame_width: DEFAULT_FRAME_WIDTH,
            frame_height: DEFAULT_FRAME_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Face centroid offset beyond which the face counts as looking away
    pub off_center_threshold: f64,
    /// Exclusive lower bound of the plausible face luminance band
    pub brightness_min: f64,
    /// Exclusive upper bound of the plausible face luminance band
    pub brightness_max: f64,
    /// Half-size of the central region, as a fraction of min(width, height)
    pub region_fraction: f64,
    /// Pixel stride when sampling the central region
    pub sample_stride: usize,
    /// Pixel stride when diffing consecutive frames
    pub motion_stride: usize,
    pub first_frame_motion: f64,
    /// Landmark yaw beyond which the face counts as turned away
    pub max_yaw: f64,
    /// A detector that finds no face defers to the brightness heuristic
    pub fallback_on_empty_detection: bool,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            off_center_threshold: 0.3,
            brightness_min: 40.0,
            brightness_max: 200.0,
            region_fraction: 0.3,
            sample_stride: 3,
            motion_stride: 4,
            first_frame_motion: FIRST_FRAME_MOTION,
            max_yaw: 20.0,
            fallback_on_empty_detection: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub history_size: usize,
    /// Distracted when the face detection rate is strictly below this
    pub face_rate_threshold: f64,
    /// Distracted when the average motion is strictly above this
    pub motion_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            history_size: DEFAULT_HISTORY_SIZE,
            face_rate_threshold: 0.1,
            motion_threshold: 0.12,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebounceConfig {
    pub distraction_delay_ms: u64,
    pub distracted_confidence: f64,
    pub focused_confidence: f64,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            distraction_delay_ms: 10_000,
            distracted_confidence: 0.3,
            focused_confidence: 0.8,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttentionConfig {
    pub sampler: SamplerConfig,
    pub estimator: EstimatorConfig,
    pub scoring: ScoringConfig,
    pub debounce: DebounceConfig,
}

fn check_unit(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value })
    }
}

impl AttentionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sampler.interval_ms == 0 {
            return Err(ConfigError::Zero("sampler.interval_ms"));
        }
        if self.sampler.frame_width == 0 || self.sampler.frame_height == 0 {
            return Err(ConfigError::Zero("sampler.frame_size"));
        }
        if self.scoring.history_size == 0 {
            return Err(ConfigError::Zero("scoring.history_size"));
        }
        if self.estimator.sample_stride == 0 {
            return Err(ConfigError::Zero("estimator.sample_stride"));
        }
        if self.estimator.motion_stride == 0 {
            return Err(ConfigError::Zero("estimator.motion_stride"));
        }

        check_unit("scoring.face_rate_threshold", self.scoring.face_rate_threshold)?;
        check_unit("scoring.motion_threshold", self.scoring.motion_threshold)?;
        check_unit("estimator.off_center_threshold", self.estimator.off_center_threshold)?;
        check_unit("estimator.region_fraction", self.estimator.region_fraction)?;
        check_unit("estimator.first_frame_motion", self.estimator.first_frame_motion)?;
        check_unit("debounce.distracted_confidence", self.debounce.distracted_confidence)?;
        check_unit("debounce.focused_confidence", self.debounce.focused_confidence)?;

        let (min, max) = (self.estimator.brightness_min, self.estimator.brightness_max);
        if !(0.0..=255.0).contains(&min) {
            return Err(ConfigError::OutOfRange { field: "estimator.brightness_min", value: min });
        }
        if !(0.0..=255.0).contains(&max) {
            return Err(ConfigError::OutOfRange { field: "estimator.brightness_max", value: max });
        }
        if min >= max {
            return Err(ConfigError::EmptyBrightnessBand { min, max });
        }
        if !self.estimator.max_yaw.is_finite() || self.estimator.max_yaw <= 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "estimator.max_yaw",
                value: self.estimator.max_yaw,
            });
        }

        Ok(())
    }
}
