//! Per-frame estimator
//!
//! Turns a frame (plus whatever the platform detector reported for it) into a
//! [`FrameSample`]. The presence strategy is fixed at construction; detector
//! failures and malformed boxes fall back to the brightness heuristic for that
//! frame only.

use serde::{Deserialize, Serialize};

use crate::config::EstimatorConfig;
use crate::error::EstimationError;
use crate::face::{judge_brightness, judge_face, PresenceStrategy};
use crate::frame::Frame;
use crate::motion::MotionTracker;
use crate::sanitize::sanitize_face_box;
use crate::types::{FaceBox, FrameSample, PresenceSource};

/// What the platform detector produced for the current frame
#[derive(Clone, Debug, PartialEq)]
pub enum Detection {
    /// No detector ran (brightness strategy, or the host skipped it)
    NotRun,
    Faces(Vec<FaceBox>),
    Failed(EstimationError),
}

/// Initialization status, surfaced once per session
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimatorStatus {
    pub strategy: PresenceStrategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unsupported_reason: Option<String>,
}

impl EstimatorStatus {
    pub fn native() -> Self {
        Self {
            strategy: PresenceStrategy::NativeDetector,
            unsupported_reason: None,
        }
    }

    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self {
            strategy: PresenceStrategy::BrightnessFallback,
            unsupported_reason: Some(reason.into()),
        }
    }
}

/// Counters for degraded frames
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimatorCounters {
    pub frames: u64,
    pub empty_frames: u64,
    pub detector_failures: u64,
    pub fallbacks: u64,
}

pub struct Estimator {
    config: EstimatorConfig,
    status: EstimatorStatus,
    motion: MotionTracker,
    counters: EstimatorCounters,
    last_error: Option<EstimationError>,
}

impl Estimator {
    pub fn new(config: EstimatorConfig, status: EstimatorStatus) -> Self {
        let motion = MotionTracker::new(config.motion_stride, config.first_frame_motion);
        Self {
            config,
            status,
            motion,
            counters: EstimatorCounters::default(),
            last_error: None,
        }
    }

    pub fn strategy(&self) -> PresenceStrategy {
        self.status.strategy
    }

    pub fn status(&self) -> &EstimatorStatus {
        &self.status
    }

    pub fn counters(&self) -> EstimatorCounters {
        self.counters
    }

    /// Error behind the most recent fallback, if the last frame degraded
    pub fn last_error(&self) -> Option<&EstimationError> {
        self.last_error.as_ref()
    }

    /// Whether the host should run its detector on the next frame
    pub fn wants_detection(&self) -> bool {
        self.status.strategy == PresenceStrategy::NativeDetector
    }

    pub fn estimate(&mut self, frame: &Frame, detection: Detection, timestamp: f64) -> FrameSample {
        self.counters.frames += 1;
        self.last_error = None;

        if frame.is_empty() {
            self.counters.empty_frames += 1;
            return FrameSample::empty(timestamp);
        }

        let motion_level = self.motion.score(frame);

        if self.status.strategy == PresenceStrategy::NativeDetector {
            match self.from_detection(frame, detection) {
                Ok(Some(mut sample)) => {
                    sample.timestamp = timestamp;
                    sample.motion_level = motion_level;
                    return sample;
                }
                Ok(None) => {}
                Err(err) => {
                    self.counters.detector_failures += 1;
                    self.last_error = Some(err);
                }
            }
            self.counters.fallbacks += 1;
        }

        let verdict = judge_brightness(frame, &self.config);
        FrameSample {
            timestamp,
            face_present: verdict.present,
            motion_level,
            offset_x: None,
            offset_y: None,
            head_pose: None,
            brightness: Some(verdict.mean_luma),
            source: PresenceSource::Brightness,
        }
    }

    /// `Ok(None)` means "defer to brightness" without it being an error.
    fn from_detection(
        &self,
        frame: &Frame,
        detection: Detection,
    ) -> Result<Option<FrameSample>, EstimationError> {
        let faces = match detection {
            Detection::NotRun => return Ok(None),
            Detection::Failed(err) => return Err(err),
            Detection::Faces(faces) => faces,
        };

        let Some(first) = faces.first() else {
            if self.config.fallback_on_empty_detection {
                return Ok(None);
            }
            let mut sample = FrameSample::empty(0.0);
            sample.source = PresenceSource::Detector;
            return Ok(Some(sample));
        };

        let face = sanitize_face_box(first)?;
        let verdict = judge_face(&face, frame.width(), frame.height(), &self.config);

        Ok(Some(FrameSample {
            timestamp: 0.0,
            face_present: verdict.present,
            motion_level: 0.0,
            offset_x: Some(verdict.offset_x),
            offset_y: Some(verdict.offset_y),
            head_pose: verdict.head_pose,
            brightness: None,
            source: PresenceSource::Detector,
        }))
    }

    /// Forget the previous frame; counters survive for diagnostics
    pub fn reset(&mut self) {
        self.motion.reset();
        self.last_error = None;
    }
}
