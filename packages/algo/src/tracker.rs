//! Attention tracker
//!
//! Glues history, scoring, the debounce machine and session statistics into the
//! single piece of per-session state a host drives. The tracker is
//! runtime-agnostic: hosts feed it samples in sequence order and relay the
//! debounce timer themselves.

use crate::config::AttentionConfig;
use crate::debounce::{DebounceMachine, DebouncePhase, DebounceStep};
use crate::history::AttentionHistory;
use crate::stats::{SessionStats, StatsAccumulator};
use crate::types::{AttentionScore, AttentionState, FrameSample};

/// Result of ingesting one sample
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackerOutcome {
    pub score: AttentionScore,
    pub step: DebounceStep,
}

pub struct AttentionTracker {
    config: AttentionConfig,
    history: AttentionHistory,
    machine: DebounceMachine,
    stats: StatsAccumulator,
    warning_visible: bool,
    last_sequence: Option<u64>,
}

impl AttentionTracker {
    pub fn new(config: AttentionConfig, now: f64) -> Self {
        let history = AttentionHistory::new(config.scoring.history_size);
        let machine = DebounceMachine::new(config.debounce.clone(), now);
        Self {
            config,
            history,
            machine,
            stats: StatsAccumulator::new(now),
            warning_visible: false,
            last_sequence: None,
        }
    }

    pub fn config(&self) -> &AttentionConfig {
        &self.config
    }

    /// Append a sample, rescore and step the debounce machine.
    ///
    /// Samples whose sequence number is not newer than the last ingested one
    /// are dropped and return `None`.
    pub fn ingest(&mut self, sample: FrameSample, sequence: u64) -> Option<TrackerOutcome> {
        if self.last_sequence.is_some_and(|last| sequence <= last) {
            return None;
        }
        self.last_sequence = Some(sequence);

        let now = sample.timestamp;
        self.history.push(sample);
        self.stats.record_sample();

        let score = self.history.score(&self.config.scoring);
        let step = self.machine.observe(score.is_distracted_signal, now);
        if let DebounceStep::Changed(state) = step {
            self.apply_transition(state);
        }

        Some(TrackerOutcome { score, step })
    }

    /// Debounce timer callback
    pub fn fire(&mut self, generation: u64, now: f64) -> Option<AttentionState> {
        let state = self.machine.fire(generation, now)?;
        self.apply_transition(state);
        Some(state)
    }

    /// Deadline check for hosts that drive time themselves
    pub fn poll(&mut self, now: f64) -> Option<AttentionState> {
        let state = self.machine.poll(now)?;
        self.apply_transition(state);
        Some(state)
    }

    /// Clear history and statistics and return to focused
    pub fn reset(&mut self, now: f64) -> Option<DebounceStep> {
        let cancelled = self.machine.reset(now);
        self.history.clear();
        self.stats.reset(now);
        self.warning_visible = false;
        self.last_sequence = None;
        cancelled
    }

    /// Hide the warning until the next transition into distracted
    pub fn dismiss_warning(&mut self) {
        self.warning_visible = false;
    }

    pub fn state(&self) -> AttentionState {
        self.machine.state()
    }

    pub fn phase(&self) -> DebouncePhase {
        self.machine.phase()
    }

    pub fn score(&self) -> AttentionScore {
        self.history.score(&self.config.scoring)
    }

    pub fn history(&self) -> &AttentionHistory {
        &self.history
    }

    pub fn stats(&self, now: f64) -> SessionStats {
        self.stats.snapshot(now)
    }

    pub fn warning_visible(&self) -> bool {
        self.warning_visible
    }

    fn apply_transition(&mut self, state: AttentionState) {
        self.stats.record_transition(state.status, state.last_change_at);
        self.warning_visible = state.status.is_distracted();
    }
}
