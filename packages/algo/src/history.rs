//! Rolling attention history and scoring
//!
//! The history holds the last N samples in arrival order. Scoring is a pure
//! function of its contents.

use std::collections::VecDeque;

use crate::config::ScoringConfig;
use crate::types::{AttentionScore, FrameSample};

#[derive(Clone, Debug)]
pub struct AttentionHistory {
    capacity: usize,
    samples: VecDeque<FrameSample>,
}

impl AttentionHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity + 1),
        }
    }

    /// Append a sample, evicting the oldest ones beyond capacity
    pub fn push(&mut self, sample: FrameSample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &FrameSample> {
        self.samples.iter()
    }

    pub fn latest(&self) -> Option<&FrameSample> {
        self.samples.back()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Fraction of samples with a face present; 0 for an empty history
    pub fn face_detection_rate(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let present = self.samples.iter().filter(|s| s.face_present).count();
        present as f64 / self.samples.len() as f64
    }

    pub fn avg_motion(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().map(|s| s.motion_level).sum::<f64>() / self.samples.len() as f64
    }

    /// Empty history carries no evidence and never signals distraction.
    pub fn score(&self, config: &ScoringConfig) -> AttentionScore {
        if self.samples.is_empty() {
            return AttentionScore::default();
        }

        let face_detection_rate = self.face_detection_rate();
        let avg_motion = self.avg_motion();

        AttentionScore {
            face_detection_rate,
            avg_motion,
            is_distracted_signal: face_detection_rate < config.face_rate_threshold
                || avg_motion > config.motion_threshold,
            sample_count: self.samples.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(history: &mut AttentionHistory, present: &[bool], motion: f64) {
        for (i, &p) in present.iter().enumerate() {
            history.push(FrameSample::basic(i as f64 * 200.0, p, motion));
        }
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = AttentionHistory::new(3);
        for i in 0..5 {
            history.push(FrameSample::basic(i as f64, true, 0.0));
        }
        assert_eq!(history.len(), 3);
        let ts: Vec<f64> = history.iter().map(|s| s.timestamp).collect();
        assert_eq!(ts, vec![2.0, 3.0, 4.0]);
        assert_eq!(history.latest().unwrap().timestamp, 4.0);
    }

    #[test]
    fn test_empty_history_scores_neutral() {
        let history = AttentionHistory::new(10);
        let score = history.score(&ScoringConfig::default());
        assert!(!score.is_distracted_signal);
        assert_eq!(score.sample_count, 0);
    }

    #[test]
    fn test_rate_exactly_at_threshold_is_not_distracted() {
        let mut history = AttentionHistory::new(10);
        let mut present = vec![false; 9];
        present.push(true);
        fill(&mut history, &present, 0.05);

        let score = history.score(&ScoringConfig::default());
        assert!((score.face_detection_rate - 0.1).abs() < 1e-12);
        assert!((score.avg_motion - 0.05).abs() < 1e-12);
        assert!(!score.is_distracted_signal);
    }

    #[test]
    fn test_rate_below_threshold_is_distracted() {
        let mut history = AttentionHistory::new(10);
        fill(&mut history, &[false; 10], 0.0);
        let score = history.score(&ScoringConfig::default());
        assert_eq!(score.face_detection_rate, 0.0);
        assert!(score.is_distracted_signal);
    }

    #[test]
    fn test_motion_alone_triggers_distraction() {
        let mut history = AttentionHistory::new(10);
        fill(&mut history, &[true; 10], 0.13);
        let score = history.score(&ScoringConfig::default());
        assert_eq!(score.face_detection_rate, 1.0);
        assert!(score.is_distracted_signal);
    }

    #[test]
    fn test_motion_exactly_at_threshold_is_not_distracted() {
        let mut history = AttentionHistory::new(10);
        fill(&mut history, &[true; 1], 0.12);
        assert!(!history.score(&ScoringConfig::default()).is_distracted_signal);
    }

    #[test]
    fn test_clear() {
        let mut history = AttentionHistory::new(10);
        fill(&mut history, &[true; 4], 0.0);
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.capacity(), 10);
    }
}
