//! Data Sanitization
//!
//! Guards applied to values coming from outside the crate. Non-finite input
//! never reaches the scoring math.

use crate::error::EstimationError;
use crate::types::FaceBox;

/// Whether the slice contains NaN or Inf
pub fn has_invalid_values(arr: &[f64]) -> bool {
    arr.iter().any(|&x| x.is_nan() || x.is_infinite())
}

/// Clamp to [0, 1], mapping non-finite values to 0
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Validate a detector-reported face box.
///
/// Boxes may extend past the frame edges (detectors do that for partially
/// visible faces) but must have finite coordinates and a positive size.
pub fn sanitize_face_box(face: &FaceBox) -> Result<FaceBox, EstimationError> {
    let coords = [face.x, face.y, face.width, face.height];
    if has_invalid_values(&coords) {
        return Err(EstimationError::MalformedDetection(format!(
            "non-finite face box {:?}",
            coords
        )));
    }
    if face.width <= 0.0 || face.height <= 0.0 {
        return Err(EstimationError::MalformedDetection(format!(
            "degenerate face box {}x{}",
            face.width, face.height
        )));
    }

    let mut clean = *face;
    if let Some(lm) = face.landmarks {
        let points = [
            lm.left_eye.x,
            lm.left_eye.y,
            lm.right_eye.x,
            lm.right_eye.y,
            lm.nose.x,
            lm.nose.y,
        ];
        if has_invalid_values(&points) {
            clean.landmarks = None;
        }
    }
    Ok(clean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FaceLandmarks, Point2D};

    #[test]
    fn test_has_invalid_values() {
        assert!(!has_invalid_values(&[0.0, 1.0, -3.5]));
        assert!(has_invalid_values(&[0.0, f64::NAN]));
        assert!(has_invalid_values(&[f64::INFINITY]));
    }

    #[test]
    fn test_clamp_unit() {
        assert_eq!(clamp_unit(-0.5), 0.0);
        assert_eq!(clamp_unit(0.25), 0.25);
        assert_eq!(clamp_unit(4.0), 1.0);
        assert_eq!(clamp_unit(f64::NAN), 0.0);
    }

    #[test]
    fn test_sanitize_rejects_degenerate_box() {
        let face = FaceBox::new(10.0, 10.0, 0.0, 20.0);
        assert!(matches!(
            sanitize_face_box(&face),
            Err(EstimationError::MalformedDetection(_))
        ));
    }

    #[test]
    fn test_sanitize_rejects_nan_box() {
        let face = FaceBox::new(f64::NAN, 10.0, 20.0, 20.0);
        assert!(sanitize_face_box(&face).is_err());
    }

    #[test]
    fn test_sanitize_drops_bad_landmarks_only() {
        let face = FaceBox::new(10.0, 10.0, 50.0, 50.0).with_landmarks(FaceLandmarks {
            left_eye: Point2D { x: 20.0, y: 25.0 },
            right_eye: Point2D { x: f64::NAN, y: 25.0 },
            nose: Point2D { x: 35.0, y: 40.0 },
        });
        let clean = sanitize_face_box(&face).unwrap();
        assert!(clean.landmarks.is_none());
        assert_eq!(clean.width, 50.0);
    }
}
