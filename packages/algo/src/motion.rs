//! Frame-to-frame motion scoring

use crate::frame::{Frame, LumaPlane};
use crate::sanitize::clamp_unit;

/// Keeps the previous frame's luminance and scores each new frame against it.
pub struct MotionTracker {
    stride: usize,
    first_frame_motion: f64,
    previous: Option<LumaPlane>,
}

impl MotionTracker {
    pub fn new(stride: usize, first_frame_motion: f64) -> Self {
        Self {
            stride: stride.max(1),
            first_frame_motion,
            previous: None,
        }
    }

    /// Mean absolute luminance difference on every `stride`-th pixel, normalized to [0, 1].
    ///
    /// The first frame, and any frame whose size differs from the previous one,
    /// reports the neutral default. Empty frames report 0 and leave the
    /// previous frame in place.
    pub fn score(&mut self, frame: &Frame) -> f64 {
        if frame.is_empty() {
            return 0.0;
        }

        let current = frame.to_luma();
        let motion = match self.previous.as_ref() {
            Some(prev) if prev.same_shape(&current) => {
                let mut total: u64 = 0;
                let mut count: u64 = 0;
                for i in (0..current.values.len()).step_by(self.stride) {
                    total += (current.values[i] as i16 - prev.values[i] as i16).unsigned_abs() as u64;
                    count += 1;
                }
                if count == 0 {
                    0.0
                } else {
                    clamp_unit(total as f64 / count as f64 / 255.0)
                }
            }
            _ => self.first_frame_motion,
        };

        self.previous = Some(current);
        motion
    }

    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }

    pub fn reset(&mut self) {
        self.previous = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_is_neutral() {
        let mut tracker = MotionTracker::new(4, 0.1);
        assert_eq!(tracker.score(&Frame::filled(8, 8, 50)), 0.1);
        assert!(tracker.has_previous());
    }

    #[test]
    fn test_static_scene_has_no_motion() {
        let mut tracker = MotionTracker::new(4, 0.1);
        tracker.score(&Frame::filled(8, 8, 50));
        assert_eq!(tracker.score(&Frame::filled(8, 8, 50)), 0.0);
    }

    #[test]
    fn test_full_swing_is_one() {
        let mut tracker = MotionTracker::new(1, 0.1);
        tracker.score(&Frame::filled(4, 4, 0));
        assert!((tracker.score(&Frame::filled(4, 4, 255)) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_partial_change_is_normalized() {
        let mut tracker = MotionTracker::new(4, 0.1);
        tracker.score(&Frame::filled(8, 8, 60));
        let motion = tracker.score(&Frame::filled(8, 8, 111));
        assert!((motion - 51.0 / 255.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_frame_scores_zero_and_keeps_previous() {
        let mut tracker = MotionTracker::new(4, 0.1);
        tracker.score(&Frame::filled(8, 8, 60));
        assert_eq!(tracker.score(&Frame::empty()), 0.0);
        assert_eq!(tracker.score(&Frame::filled(8, 8, 60)), 0.0);
    }

    #[test]
    fn test_resolution_change_restarts() {
        let mut tracker = MotionTracker::new(4, 0.1);
        tracker.score(&Frame::filled(8, 8, 0));
        assert_eq!(tracker.score(&Frame::filled(4, 4, 255)), 0.1);
    }

    #[test]
    fn test_reset_forgets_previous() {
        let mut tracker = MotionTracker::new(4, 0.1);
        tracker.score(&Frame::filled(8, 8, 0));
        tracker.reset();
        assert_eq!(tracker.score(&Frame::filled(8, 8, 255)), 0.1);
    }
}
