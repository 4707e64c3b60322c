//! Face presence strategies
//!
//! Two heuristics decide whether a face is plausibly visible and roughly
//! centered:
//!
//! - **Detector**: a platform face detector reports bounding boxes; the first
//!   face counts as present unless its centroid sits far from the frame center
//!   or, when landmarks are available, the head is turned too far.
//! - **Brightness**: mean luminance of a strided central region falls inside a
//!   "lit face" band.

use serde::{Deserialize, Serialize};

use crate::config::EstimatorConfig;
use crate::frame::Frame;
use crate::sanitize::clamp_unit;
use crate::types::{FaceBox, FaceLandmarks, HeadPose};

/// Presence strategy fixed for a session by a one-time capability check
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceStrategy {
    NativeDetector,
    BrightnessFallback,
}

impl PresenceStrategy {
    pub fn from_capability(detector_available: bool) -> Self {
        if detector_available {
            Self::NativeDetector
        } else {
            Self::BrightnessFallback
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NativeDetector => "native_detector",
            Self::BrightnessFallback => "brightness_fallback",
        }
    }
}

/// Verdict of the detector strategy for one face
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectorVerdict {
    pub present: bool,
    pub offset_x: f64,
    pub offset_y: f64,
    pub head_pose: Option<HeadPose>,
}

/// Verdict of the brightness strategy
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrightnessVerdict {
    pub present: bool,
    pub mean_luma: f64,
    pub pixels_sampled: usize,
}

/// Approximate yaw/pitch from eye and nose positions, as a percentage of the
/// face box size. Zero yaw means the nose sits midway between the eyes.
pub fn head_pose(face: &FaceBox, landmarks: &FaceLandmarks) -> HeadPose {
    let eye_center_x = (landmarks.left_eye.x + landmarks.right_eye.x) / 2.0;
    let eye_center_y = (landmarks.left_eye.y + landmarks.right_eye.y) / 2.0;

    HeadPose {
        yaw: (landmarks.nose.x - eye_center_x) / face.width * 100.0,
        pitch: (landmarks.nose.y - eye_center_y) / face.height * 100.0,
    }
}

/// Judge a single detected face against the frame it was found in.
pub fn judge_face(
    face: &FaceBox,
    frame_width: u32,
    frame_height: u32,
    config: &EstimatorConfig,
) -> DetectorVerdict {
    let width = frame_width.max(1) as f64;
    let height = frame_height.max(1) as f64;
    let center = face.center();

    let offset_x = clamp_unit((center.x - width / 2.0).abs() / width);
    let offset_y = clamp_unit((center.y - height / 2.0).abs() / height);

    let off_center =
        offset_x > config.off_center_threshold || offset_y > config.off_center_threshold;

    let pose = face.landmarks.as_ref().map(|lm| head_pose(face, lm));
    let turned_away = pose.map(|p| p.yaw.abs() > config.max_yaw).unwrap_or(false);

    DetectorVerdict {
        present: !off_center && !turned_away,
        offset_x,
        offset_y,
        head_pose: pose,
    }
}

/// Mean luminance over the central region, sampled on a stride.
pub fn judge_brightness(frame: &Frame, config: &EstimatorConfig) -> BrightnessVerdict {
    if frame.is_empty() {
        return BrightnessVerdict {
            present: false,
            mean_luma: 0.0,
            pixels_sampled: 0,
        };
    }

    let width = frame.width() as f64;
    let height = frame.height() as f64;
    let center_x = width / 2.0;
    let center_y = height / 2.0;
    let region = width.min(height) * config.region_fraction;
    let stride = config.sample_stride.max(1) as f64;

    let mut total = 0.0;
    let mut count = 0usize;

    let mut y = center_y - region;
    while y < center_y + region {
        let mut x = center_x - region;
        while x < center_x + region {
            if x >= 0.0 && x < width && y >= 0.0 && y < height {
                total += frame.luma_at(x.floor() as usize, y.floor() as usize);
                count += 1;
            }
            x += stride;
        }
        y += stride;
    }

    let mean_luma = if count > 0 { total / count as f64 } else { 0.0 };
    BrightnessVerdict {
        present: mean_luma > config.brightness_min && mean_luma < config.brightness_max,
        mean_luma,
        pixels_sampled: count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point2D;

    fn config() -> EstimatorConfig {
        EstimatorConfig::default()
    }

    #[test]
    fn test_strategy_from_capability() {
        assert_eq!(PresenceStrategy::from_capability(true), PresenceStrategy::NativeDetector);
        assert_eq!(
            PresenceStrategy::from_capability(false),
            PresenceStrategy::BrightnessFallback
        );
    }

    #[test]
    fn test_centered_face_is_present() {
        let face = FaceBox::new(110.0, 70.0, 100.0, 100.0);
        let verdict = judge_face(&face, 320, 240, &config());
        assert!(verdict.present);
        assert_eq!(verdict.offset_x, 0.0);
        assert_eq!(verdict.offset_y, 0.0);
        assert!(verdict.head_pose.is_none());
    }

    #[test]
    fn test_off_center_face_counts_as_looking_away() {
        // centroid at x = 300, offset = 140 / 320 = 0.4375
        let face = FaceBox::new(260.0, 70.0, 80.0, 100.0);
        let verdict = judge_face(&face, 320, 240, &config());
        assert!(!verdict.present);
        assert!(verdict.offset_x > 0.3);
    }

    #[test]
    fn test_offset_exactly_at_threshold_is_present() {
        // centroid at x = 256, offset = 96 / 320 = 0.3
        let face = FaceBox::new(216.0, 70.0, 80.0, 100.0);
        let verdict = judge_face(&face, 320, 240, &config());
        assert!((verdict.offset_x - 0.3).abs() < 1e-12);
        assert!(verdict.present);
    }

    #[test]
    fn test_turned_head_counts_as_looking_away() {
        let face = FaceBox::new(110.0, 70.0, 100.0, 100.0).with_landmarks(FaceLandmarks {
            left_eye: Point2D { x: 135.0, y: 105.0 },
            right_eye: Point2D { x: 185.0, y: 105.0 },
            nose: Point2D { x: 190.0, y: 135.0 },
        });
        let verdict = judge_face(&face, 320, 240, &config());
        let pose = verdict.head_pose.unwrap();
        assert!((pose.yaw - 30.0).abs() < 1e-9);
        assert!((pose.pitch - 30.0).abs() < 1e-9);
        assert!(!verdict.present);
    }

    #[test]
    fn test_frontal_landmarks_are_present() {
        let face = FaceBox::new(110.0, 70.0, 100.0, 100.0).with_landmarks(FaceLandmarks {
            left_eye: Point2D { x: 135.0, y: 105.0 },
            right_eye: Point2D { x: 185.0, y: 105.0 },
            nose: Point2D { x: 162.0, y: 130.0 },
        });
        let verdict = judge_face(&face, 320, 240, &config());
        assert!(verdict.present);
        assert!((verdict.head_pose.unwrap().yaw - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_brightness_band() {
        assert!(judge_brightness(&Frame::filled(320, 240, 120), &config()).present);
        assert!(!judge_brightness(&Frame::filled(320, 240, 10), &config()).present);
        assert!(!judge_brightness(&Frame::filled(320, 240, 230), &config()).present);
    }

    #[test]
    fn test_brightness_band_is_exclusive() {
        assert!(!judge_brightness(&Frame::filled(320, 240, 40), &config()).present);
        assert!(!judge_brightness(&Frame::filled(320, 240, 200), &config()).present);
        assert!(judge_brightness(&Frame::filled(320, 240, 41), &config()).present);
    }

    #[test]
    fn test_brightness_samples_on_stride() {
        let verdict = judge_brightness(&Frame::filled(320, 240, 100), &config());
        // region half-size 72 px, stride 3 -> 48 x 48 samples
        assert_eq!(verdict.pixels_sampled, 48 * 48);
        assert_eq!(verdict.mean_luma, 100.0);
    }

    #[test]
    fn test_brightness_ignores_border() {
        // Bright border, mid-gray center: only the central region matters
        let (w, h) = (40u32, 40u32);
        let mut data = Vec::new();
        for y in 0..h {
            for x in 0..w {
                let inside = (5..35).contains(&x) && (5..35).contains(&y);
                let v = if inside { 100 } else { 255 };
                data.extend_from_slice(&[v, v, v, 255]);
            }
        }
        let frame = Frame::from_rgba(w, h, data).unwrap();
        let verdict = judge_brightness(&frame, &config());
        assert_eq!(verdict.mean_luma, 100.0);
        assert!(verdict.present);
    }

    #[test]
    fn test_brightness_empty_frame() {
        let verdict = judge_brightness(&Frame::empty(), &config());
        assert!(!verdict.present);
        assert_eq!(verdict.pixels_sampled, 0);
    }
}
