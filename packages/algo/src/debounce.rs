//! Asymmetric debounce state machine
//!
//! Entering `distracted` waits for a fixed delay after the first distracted
//! signal; returning to `focused` is immediate. The machine never schedules
//! anything itself: it hands back a [`DebounceStep`] telling the host to arm or
//! cancel its one-shot timer, and the host reports the timer firing through
//! [`DebounceMachine::fire`]. Hosts without timers (a page polling once per
//! animation frame) call [`DebounceMachine::poll`] instead.

use serde::{Deserialize, Serialize};

use crate::config::DebounceConfig;
use crate::types::{AttentionState, AttentionStatus};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum DebouncePhase {
    Focused,
    PendingDistracted { generation: u64, armed_at: f64, deadline: f64 },
    Distracted,
}

/// What the host must do after feeding a signal
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DebounceStep {
    Unchanged,
    /// Arm the one-shot timer; report it back with this generation
    Armed { generation: u64, deadline: f64 },
    /// Cancel the timer armed under this generation
    Cancelled { generation: u64 },
    /// Visible status changed
    Changed(AttentionState),
}

pub struct DebounceMachine {
    config: DebounceConfig,
    phase: DebouncePhase,
    state: AttentionState,
    generation: u64,
}

impl DebounceMachine {
    pub fn new(config: DebounceConfig, now: f64) -> Self {
        let state = AttentionState::focused(config.focused_confidence, now);
        Self {
            config,
            phase: DebouncePhase::Focused,
            state,
            generation: 0,
        }
    }

    pub fn state(&self) -> AttentionState {
        self.state
    }

    pub fn phase(&self) -> DebouncePhase {
        self.phase
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.phase, DebouncePhase::PendingDistracted { .. })
    }

    pub fn delay_ms(&self) -> u64 {
        self.config.distraction_delay_ms
    }

    pub fn observe(&mut self, distracted: bool, now: f64) -> DebounceStep {
        match (self.phase, distracted) {
            (DebouncePhase::Focused, true) => {
                self.generation += 1;
                let deadline = now + self.config.distraction_delay_ms as f64;
                self.phase = DebouncePhase::PendingDistracted {
                    generation: self.generation,
                    armed_at: now,
                    deadline,
                };
                DebounceStep::Armed {
                    generation: self.generation,
                    deadline,
                }
            }
            (DebouncePhase::PendingDistracted { generation, .. }, false) => {
                self.phase = DebouncePhase::Focused;
                DebounceStep::Cancelled { generation }
            }
            (DebouncePhase::Distracted, false) => {
                self.phase = DebouncePhase::Focused;
                self.state = AttentionState {
                    status: AttentionStatus::Focused,
                    confidence: self.config.focused_confidence,
                    last_change_at: now,
                };
                DebounceStep::Changed(self.state)
            }
            // Focused + calm, pending + still distracted (timer already armed),
            // distracted + still distracted
            _ => DebounceStep::Unchanged,
        }
    }

    /// Timer callback. Fires unconditionally when the generation is still the
    /// armed one; stale generations (cancelled or reset) are ignored.
    pub fn fire(&mut self, generation: u64, now: f64) -> Option<AttentionState> {
        match self.phase {
            DebouncePhase::PendingDistracted { generation: armed, .. } if armed == generation => {
                self.phase = DebouncePhase::Distracted;
                self.state = AttentionState {
                    status: AttentionStatus::Distracted,
                    confidence: self.config.distracted_confidence,
                    last_change_at: now,
                };
                Some(self.state)
            }
            _ => None,
        }
    }

    /// Fire the pending timer if its deadline has passed
    pub fn poll(&mut self, now: f64) -> Option<AttentionState> {
        match self.phase {
            DebouncePhase::PendingDistracted { generation, deadline, .. } if now >= deadline => {
                self.fire(generation, now)
            }
            _ => None,
        }
    }

    /// Back to focused; any armed generation becomes stale.
    ///
    /// `last_change_at` only moves when the visible status actually flips.
    pub fn reset(&mut self, now: f64) -> Option<DebounceStep> {
        let cancelled = match self.phase {
            DebouncePhase::PendingDistracted { generation, .. } => {
                Some(DebounceStep::Cancelled { generation })
            }
            _ => None,
        };
        self.generation += 1;
        self.phase = DebouncePhase::Focused;

        if self.state.status != AttentionStatus::Focused {
            self.state.last_change_at = now;
        }
        self.state.status = AttentionStatus::Focused;
        self.state.confidence = self.config.focused_confidence;
        cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> DebounceMachine {
        DebounceMachine::new(DebounceConfig::default(), 0.0)
    }

    #[test]
    fn test_initial_state() {
        let m = machine();
        assert_eq!(m.state().status, AttentionStatus::Focused);
        assert_eq!(m.state().confidence, 0.8);
        assert_eq!(m.phase(), DebouncePhase::Focused);
    }

    #[test]
    fn test_distracted_signal_arms_once() {
        let mut m = machine();
        let step = m.observe(true, 1000.0);
        assert_eq!(step, DebounceStep::Armed { generation: 1, deadline: 11_000.0 });
        assert_eq!(m.observe(true, 1200.0), DebounceStep::Unchanged);
        assert_eq!(m.observe(true, 1400.0), DebounceStep::Unchanged);
        assert_eq!(m.state().status, AttentionStatus::Focused);
    }

    #[test]
    fn test_fire_flips_to_distracted() {
        let mut m = machine();
        m.observe(true, 0.0);
        let state = m.fire(1, 10_000.0).unwrap();
        assert_eq!(state.status, AttentionStatus::Distracted);
        assert_eq!(state.confidence, 0.3);
        assert_eq!(state.last_change_at, 10_000.0);
        assert_eq!(m.phase(), DebouncePhase::Distracted);
    }

    #[test]
    fn test_calm_signal_cancels_pending() {
        let mut m = machine();
        m.observe(true, 0.0);
        assert_eq!(m.observe(false, 400.0), DebounceStep::Cancelled { generation: 1 });
        assert_eq!(m.fire(1, 10_000.0), None);
        assert_eq!(m.state().status, AttentionStatus::Focused);
        assert_eq!(m.state().last_change_at, 0.0);
    }

    #[test]
    fn test_rearm_uses_new_generation() {
        let mut m = machine();
        m.observe(true, 0.0);
        m.observe(false, 200.0);
        assert_eq!(
            m.observe(true, 400.0),
            DebounceStep::Armed { generation: 2, deadline: 10_400.0 }
        );
        assert_eq!(m.fire(1, 10_000.0), None);
        assert!(m.fire(2, 10_400.0).is_some());
    }

    #[test]
    fn test_recovery_is_immediate() {
        let mut m = machine();
        m.observe(true, 0.0);
        m.fire(1, 10_000.0);
        match m.observe(false, 10_200.0) {
            DebounceStep::Changed(state) => {
                assert_eq!(state.status, AttentionStatus::Focused);
                assert_eq!(state.confidence, 0.8);
                assert_eq!(state.last_change_at, 10_200.0);
            }
            other => panic!("expected Changed, got {:?}", other),
        }
    }

    #[test]
    fn test_distracted_stays_distracted_while_signal_holds() {
        let mut m = machine();
        m.observe(true, 0.0);
        m.fire(1, 10_000.0);
        assert_eq!(m.observe(true, 10_200.0), DebounceStep::Unchanged);
        assert_eq!(m.state().status, AttentionStatus::Distracted);
    }

    #[test]
    fn test_poll_respects_deadline() {
        let mut m = machine();
        m.observe(true, 0.0);
        assert_eq!(m.poll(9_999.0), None);
        let state = m.poll(10_000.0).unwrap();
        assert_eq!(state.status, AttentionStatus::Distracted);
        assert_eq!(m.poll(20_000.0), None);
    }

    #[test]
    fn test_reset_from_pending_reports_cancel() {
        let mut m = machine();
        m.observe(true, 0.0);
        assert_eq!(m.reset(500.0), Some(DebounceStep::Cancelled { generation: 1 }));
        assert_eq!(m.fire(1, 10_000.0), None);
        assert_eq!(m.state().last_change_at, 0.0);
    }

    #[test]
    fn test_reset_from_distracted() {
        let mut m = machine();
        m.observe(true, 0.0);
        m.fire(1, 10_000.0);
        assert_eq!(m.reset(12_000.0), None);
        let state = m.state();
        assert_eq!(state.status, AttentionStatus::Focused);
        assert_eq!(state.confidence, 0.8);
        assert_eq!(state.last_change_at, 12_000.0);
    }

    #[test]
    fn test_reset_twice_is_idempotent() {
        let mut m = machine();
        m.observe(true, 0.0);
        m.reset(100.0);
        let once = (m.state(), m.phase());
        m.reset(200.0);
        assert_eq!((m.state(), m.phase()), once);
    }
}
