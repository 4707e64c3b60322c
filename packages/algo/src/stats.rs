//! Session attention statistics
//!
//! Accumulates time spent in each status between transitions.

use serde::{Deserialize, Serialize};

use crate::types::AttentionStatus;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub focused_ms: f64,
    pub distracted_ms: f64,
    pub transitions: u64,
    pub samples: u64,
    /// focused / (focused + distracted) as a percentage; 100 before any time elapses
    pub attention_score: f64,
}

#[derive(Clone, Debug)]
pub struct StatsAccumulator {
    focused_ms: f64,
    distracted_ms: f64,
    transitions: u64,
    samples: u64,
    current: AttentionStatus,
    since: f64,
}

impl StatsAccumulator {
    pub fn new(now: f64) -> Self {
        Self {
            focused_ms: 0.0,
            distracted_ms: 0.0,
            transitions: 0,
            samples: 0,
            current: AttentionStatus::Focused,
            since: now,
        }
    }

    pub fn record_sample(&mut self) {
        self.samples += 1;
    }

    pub fn record_transition(&mut self, status: AttentionStatus, now: f64) {
        if status == self.current {
            return;
        }
        self.close_span(now);
        self.current = status;
        self.transitions += 1;
    }

    /// Totals including the still-open span up to `now`
    pub fn snapshot(&self, now: f64) -> SessionStats {
        let open = (now - self.since).max(0.0);
        let (focused_ms, distracted_ms) = match self.current {
            AttentionStatus::Focused => (self.focused_ms + open, self.distracted_ms),
            AttentionStatus::Distracted => (self.focused_ms, self.distracted_ms + open),
        };
        let total = focused_ms + distracted_ms;
        let attention_score = if total > 0.0 {
            focused_ms / total * 100.0
        } else {
            100.0
        };

        SessionStats {
            focused_ms,
            distracted_ms,
            transitions: self.transitions,
            samples: self.samples,
            attention_score,
        }
    }

    pub fn reset(&mut self, now: f64) {
        *self = Self::new(now);
    }

    fn close_span(&mut self, now: f64) {
        let elapsed = (now - self.since).max(0.0);
        match self.current {
            AttentionStatus::Focused => self.focused_ms += elapsed,
            AttentionStatus::Distracted => self.distracted_ms += elapsed,
        }
        self.since = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_session_scores_full() {
        let stats = StatsAccumulator::new(1000.0).snapshot(1000.0);
        assert_eq!(stats.attention_score, 100.0);
        assert_eq!(stats.transitions, 0);
    }

    #[test]
    fn test_time_split_between_statuses() {
        let mut acc = StatsAccumulator::new(0.0);
        acc.record_transition(AttentionStatus::Distracted, 30_000.0);
        acc.record_transition(AttentionStatus::Focused, 40_000.0);
        let stats = acc.snapshot(40_000.0);
        assert_eq!(stats.focused_ms, 30_000.0);
        assert_eq!(stats.distracted_ms, 10_000.0);
        assert_eq!(stats.transitions, 2);
        assert!((stats.attention_score - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_open_span_is_counted() {
        let mut acc = StatsAccumulator::new(0.0);
        acc.record_transition(AttentionStatus::Distracted, 5_000.0);
        let stats = acc.snapshot(10_000.0);
        assert_eq!(stats.distracted_ms, 5_000.0);
        assert_eq!(stats.attention_score, 50.0);
    }

    #[test]
    fn test_repeated_status_is_not_a_transition() {
        let mut acc = StatsAccumulator::new(0.0);
        acc.record_transition(AttentionStatus::Focused, 100.0);
        assert_eq!(acc.snapshot(100.0).transitions, 0);
    }

    #[test]
    fn test_reset() {
        let mut acc = StatsAccumulator::new(0.0);
        acc.record_sample();
        acc.record_transition(AttentionStatus::Distracted, 1_000.0);
        acc.reset(2_000.0);
        let stats = acc.snapshot(2_000.0);
        assert_eq!(stats, SessionStats { attention_score: 100.0, ..Default::default() });
    }
}
