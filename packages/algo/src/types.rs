//! Common Types and Constants
//!
//! Shared data structures used across all attention modules.

use serde::{Deserialize, Serialize};

use crate::error::UnknownStatus;

// ==================== Constants ====================

/// Default working buffer width (pixels)
pub const DEFAULT_FRAME_WIDTH: u32 = 320;

/// Default working buffer height (pixels)
pub const DEFAULT_FRAME_HEIGHT: u32 = 240;

/// Default sampling interval (5 samples per second)
pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 200;

/// Default rolling history capacity
pub const DEFAULT_HISTORY_SIZE: usize = 10;

/// Motion reported for the first frame of a session, when there is nothing to diff against
pub const FIRST_FRAME_MOTION: f64 = 0.1;

/// Bytes per RGBA pixel
pub const RGBA_CHANNELS: usize = 4;

// ==================== Attention Status ====================

/// Externally visible attention verdict
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttentionStatus {
    #[default]
    Focused,
    Distracted,
}

impl AttentionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Focused => "focused",
            Self::Distracted => "distracted",
        }
    }

    pub fn is_distracted(&self) -> bool {
        matches!(self, Self::Distracted)
    }
}

impl std::str::FromStr for AttentionStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "focused" => Ok(Self::Focused),
            "distracted" => Ok(Self::Distracted),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for AttentionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current verdict with the confidence assigned at the last transition
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttentionState {
    pub status: AttentionStatus,
    /// Heuristic strength of the current verdict [0, 1]
    pub confidence: f64,
    /// Epoch milliseconds of the most recent status transition
    pub last_change_at: f64,
}

impl AttentionState {
    pub fn focused(confidence: f64, at: f64) -> Self {
        Self {
            status: AttentionStatus::Focused,
            confidence,
            last_change_at: at,
        }
    }
}

// ==================== Face Detection Types ====================

/// 2D point in frame pixel coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

/// Landmarks used for head pose refinement
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceLandmarks {
    pub left_eye: Point2D,
    pub right_eye: Point2D,
    pub nose: Point2D,
}

/// A face reported by a platform detector, in frame pixel coordinates
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaceBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub landmarks: Option<FaceLandmarks>,
}

impl FaceBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            landmarks: None,
        }
    }

    pub fn with_landmarks(mut self, landmarks: FaceLandmarks) -> Self {
        self.landmarks = Some(landmarks);
        self
    }

    pub fn center(&self) -> Point2D {
        Point2D {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }
}

/// Approximate head orientation derived from landmarks.
///
/// Values are percentages of the face box size, not degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadPose {
    pub yaw: f64,
    pub pitch: f64,
}

/// Which heuristic produced the presence verdict of a sample
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceSource {
    Detector,
    Brightness,
    None,
}

// ==================== Frame Sample ====================

/// One analyzed video frame. Immutable once created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameSample {
    /// Capture time (epoch milliseconds)
    pub timestamp: f64,
    pub face_present: bool,
    /// Normalized frame-to-frame luminance difference [0, 1]
    pub motion_level: f64,
    /// Horizontal face centroid displacement from frame center [0, 1]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_x: Option<f64>,
    /// Vertical face centroid displacement from frame center [0, 1]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_pose: Option<HeadPose>,
    /// Mean luminance of the central region, when the brightness strategy ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,
    pub source: PresenceSource,
}

impl FrameSample {
    /// Sample for a frame that carried no usable pixels
    pub fn empty(timestamp: f64) -> Self {
        Self {
            timestamp,
            face_present: false,
            motion_level: 0.0,
            offset_x: None,
            offset_y: None,
            head_pose: None,
            brightness: None,
            source: PresenceSource::None,
        }
    }

    /// Minimal sample with only presence and motion, mostly for tests and replays
    pub fn basic(timestamp: f64, face_present: bool, motion_level: f64) -> Self {
        Self {
            face_present,
            motion_level,
            ..Self::empty(timestamp)
        }
    }
}

// ==================== Scoring ====================

/// Aggregate over the rolling history
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttentionScore {
    /// Fraction of samples with a face present [0, 1]
    pub face_detection_rate: f64,
    /// Mean motion level across the history [0, 1]
    pub avg_motion: f64,
    pub is_distracted_signal: bool,
    pub sample_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_str() {
        assert_eq!("focused".parse(), Ok(AttentionStatus::Focused));
        assert_eq!("DISTRACTED".parse(), Ok(AttentionStatus::Distracted));
        assert_eq!(
            "pending".parse::<AttentionStatus>(),
            Err(UnknownStatus("pending".to_string()))
        );
        assert!("".parse::<AttentionStatus>().is_err());
    }

    #[test]
    fn test_status_default_is_focused() {
        assert_eq!(AttentionStatus::default(), AttentionStatus::Focused);
        assert!(!AttentionStatus::Focused.is_distracted());
        assert!(AttentionStatus::Distracted.is_distracted());
    }

    #[test]
    fn test_state_serializes_camel_case() {
        let state = AttentionState::focused(0.8, 1000.0);
        let json = serde_json::to_value(state).unwrap();
        assert_eq!(json["status"], "focused");
        assert_eq!(json["lastChangeAt"], 1000.0);
    }

    #[test]
    fn test_face_box_center() {
        let face = FaceBox::new(100.0, 60.0, 120.0, 120.0);
        let c = face.center();
        assert_eq!(c.x, 160.0);
        assert_eq!(c.y, 120.0);
    }

    #[test]
    fn test_empty_sample_skips_optional_fields() {
        let json = serde_json::to_value(FrameSample::empty(5.0)).unwrap();
        assert_eq!(json["facePresent"], false);
        assert_eq!(json["motionLevel"], 0.0);
        assert!(json.get("offsetX").is_none());
        assert_eq!(json["source"], "none");
    }
}
