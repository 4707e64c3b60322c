//! Attention pipeline
//!
//! One pipeline per attention session host. While running it owns two tasks:
//! the sampler loop (fixed interval, one estimation in flight, missed ticks
//! skipped) and at most one one-shot debounce timer. All mutable state sits
//! behind a single lock; every deferred callback carries the session
//! generation it was spawned under and is ignored once that generation is
//! stale, so nothing mutates state after `stop()` returns.

use std::sync::{Arc, Weak};
use std::time::Duration;

use attention_algo::{
    AttentionConfig, AttentionScore, AttentionState, AttentionTracker, DebounceStep, Detection,
    Estimator, EstimatorStatus, FrameSample, SessionStats,
};
use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::detector::FaceDetector;
use crate::error::{CaptureError, ConfigError, PipelineError};
use crate::events::{
    AttentionEvent, EstimatorDegradedPayload, EventBus, EventEnvelope, SessionStartedPayload,
    SessionStoppedPayload, StatusChangedPayload,
};
use crate::source::{FrameSource, WorkingBuffer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// A session is already running; the supplied source was dropped
    AlreadyRunning,
}

/// Epoch-millisecond clock anchored on the runtime's monotonic clock
#[derive(Debug, Clone, Copy)]
struct SessionClock {
    origin: Instant,
    epoch_ms: f64,
}

impl SessionClock {
    fn start() -> Self {
        Self {
            origin: Instant::now(),
            epoch_ms: Utc::now().timestamp_millis() as f64,
        }
    }

    fn now_ms(&self) -> f64 {
        self.epoch_ms + self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

struct Core {
    enabled: bool,
    /// Bumped on every start and stop; deferred work from older sessions is ignored
    session: u64,
    session_id: Option<String>,
    clock: SessionClock,
    tracker: AttentionTracker,
    estimator_status: Option<EstimatorStatus>,
    next_sequence: u64,
    sampler: Option<JoinHandle<()>>,
    debounce: Option<(u64, JoinHandle<()>)>,
}

impl Core {
    fn is_current(&self, session: u64) -> bool {
        self.session == session && self.sampler.is_some()
    }

    fn session_id(&self) -> String {
        self.session_id.clone().unwrap_or_default()
    }

    fn cancel_debounce(&mut self) {
        if let Some((_, handle)) = self.debounce.take() {
            handle.abort();
        }
    }

    fn abort_tasks(&mut self) {
        if let Some(handle) = self.sampler.take() {
            handle.abort();
        }
        self.cancel_debounce();
    }
}

struct Inner {
    config: AttentionConfig,
    detector: Arc<dyn FaceDetector>,
    events: Arc<EventBus>,
    state_tx: watch::Sender<AttentionState>,
    core: Mutex<Core>,
}

pub struct AttentionPipeline {
    inner: Arc<Inner>,
}

impl AttentionPipeline {
    pub fn new(config: AttentionConfig, detector: Arc<dyn FaceDetector>) -> Result<Self, ConfigError> {
        Self::with_event_bus(config, detector, Arc::new(EventBus::new()))
    }

    pub fn with_event_bus(
        config: AttentionConfig,
        detector: Arc<dyn FaceDetector>,
        events: Arc<EventBus>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let clock = SessionClock::start();
        let tracker = AttentionTracker::new(config.clone(), clock.now_ms());
        let (state_tx, _) = watch::channel(tracker.state());

        let core = Core {
            enabled: true,
            session: 0,
            session_id: None,
            clock,
            tracker,
            estimator_status: None,
            next_sequence: 0,
            sampler: None,
            debounce: None,
        };

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                detector,
                events,
                state_tx,
                core: Mutex::new(core),
            }),
        })
    }

    /// Begin sampling `source`.
    ///
    /// Returns `Disabled` or `SourceMissing` without touching any state when
    /// detection is off or no source is given. A second call while running
    /// keeps the existing session.
    pub fn start(&self, source: Option<Box<dyn FrameSource>>) -> Result<StartOutcome, PipelineError> {
        let mut core = self.inner.core.lock();
        if !core.enabled {
            debug!("attention detection disabled, start ignored");
            return Err(PipelineError::Disabled);
        }
        let Some(source) = source else {
            debug!("no frame source, start ignored");
            return Err(PipelineError::SourceMissing);
        };
        if core.sampler.is_some() {
            return Ok(StartOutcome::AlreadyRunning);
        }

        core.session += 1;
        core.clock = SessionClock::start();
        let now = core.clock.now_ms();
        core.tracker.reset(now);
        core.next_sequence = 0;
        core.estimator_status = None;

        let session = core.session;
        let session_id = uuid::Uuid::new_v4().to_string();
        core.session_id = Some(session_id.clone());

        let source_name = source.name();
        core.sampler = Some(tokio::spawn(run_sampler(
            Arc::downgrade(&self.inner),
            session,
            core.clock,
            source,
        )));

        self.inner.state_tx.send_replace(core.tracker.state());
        self.inner
            .events
            .publish(AttentionEvent::SessionStarted(SessionStartedPayload {
                session_id: session_id.clone(),
                interval_ms: self.inner.config.sampler.interval_ms,
                timestamp: Utc::now(),
            }));

        info!(
            session_id = %session_id,
            source = source_name,
            interval_ms = self.inner.config.sampler.interval_ms,
            "attention session started"
        );
        Ok(StartOutcome::Started)
    }

    /// Cancel both timers, clear history and return to focused. Idempotent.
    pub fn stop(&self) {
        let mut core = self.inner.core.lock();
        self.inner.teardown(&mut core);
    }

    /// Flip the enabled flag; disabling stops the running session. Returns
    /// the new flag.
    pub fn toggle(&self) -> bool {
        let mut core = self.inner.core.lock();
        let enabled = !core.enabled;
        self.inner.apply_enabled(&mut core, enabled);
        enabled
    }

    pub fn set_enabled(&self, enabled: bool) {
        let mut core = self.inner.core.lock();
        if core.enabled != enabled {
            self.inner.apply_enabled(&mut core, enabled);
        }
    }

    pub fn dismiss_warning(&self) {
        self.inner.core.lock().tracker.dismiss_warning();
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.core.lock().enabled
    }

    pub fn is_running(&self) -> bool {
        self.inner.core.lock().sampler.is_some()
    }

    pub fn state(&self) -> AttentionState {
        self.inner.core.lock().tracker.state()
    }

    pub fn score(&self) -> AttentionScore {
        self.inner.core.lock().tracker.score()
    }

    pub fn history_len(&self) -> usize {
        self.inner.core.lock().tracker.history().len()
    }

    /// Copy of the retained samples, oldest first
    pub fn history(&self) -> Vec<FrameSample> {
        self.inner.core.lock().tracker.history().iter().cloned().collect()
    }

    pub fn warning_visible(&self) -> bool {
        self.inner.core.lock().tracker.warning_visible()
    }

    pub fn stats(&self) -> SessionStats {
        let core = self.inner.core.lock();
        core.tracker.stats(core.clock.now_ms())
    }

    /// Presence strategy chosen for the running session, once the detector
    /// capability check has completed
    pub fn estimator_status(&self) -> Option<EstimatorStatus> {
        self.inner.core.lock().estimator_status.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.inner.events.subscribe_global()
    }

    pub fn watch_state(&self) -> watch::Receiver<AttentionState> {
        self.inner.state_tx.subscribe()
    }

    pub fn events(&self) -> Arc<EventBus> {
        Arc::clone(&self.inner.events)
    }
}

impl Drop for AttentionPipeline {
    fn drop(&mut self) {
        let mut core = self.inner.core.lock();
        core.session += 1;
        core.abort_tasks();
    }
}

impl Inner {
    /// Stop semantics for the session under `core`; the caller holds the lock
    fn teardown(&self, core: &mut Core) {
        let was_running = core.sampler.is_some();

        core.session += 1;
        core.abort_tasks();

        let now = core.clock.now_ms();
        let stats = core.tracker.stats(now);
        core.tracker.reset(now);
        core.next_sequence = 0;
        core.estimator_status = None;
        let session_id = core.session_id.take();

        self.state_tx.send_replace(core.tracker.state());

        if was_running {
            let session_id = session_id.unwrap_or_default();
            info!(
                session_id = %session_id,
                focused_ms = stats.focused_ms,
                distracted_ms = stats.distracted_ms,
                attention_score = stats.attention_score,
                "attention session stopped"
            );
            self.events
                .publish(AttentionEvent::SessionStopped(SessionStoppedPayload {
                    session_id,
                    stats,
                    timestamp: Utc::now(),
                }));
        }
    }

    fn apply_enabled(&self, core: &mut Core, enabled: bool) {
        core.enabled = enabled;
        if !enabled {
            self.teardown(core);
        }
    }

    fn source_closed(&self, session: u64) {
        let mut core = self.core.lock();
        if !core.is_current(session) {
            return;
        }
        warn!(session_id = %core.session_id(), "frame source closed, ending attention session");
        self.teardown(&mut core);
    }

    fn record_status(&self, session: u64, status: &EstimatorStatus) -> bool {
        let mut core = self.core.lock();
        if !core.is_current(session) {
            return false;
        }
        core.estimator_status = Some(status.clone());

        if let Some(reason) = &status.unsupported_reason {
            let session_id = core.session_id();
            warn!(
                session_id = %session_id,
                detector = self.detector.name(),
                strategy = status.strategy.as_str(),
                reason = %reason,
                "face detector unavailable, using brightness fallback for this session"
            );
            self.events
                .publish(AttentionEvent::EstimatorDegraded(EstimatorDegradedPayload {
                    session_id,
                    strategy: status.strategy,
                    reason: reason.clone(),
                    timestamp: Utc::now(),
                }));
        } else {
            debug!(detector = self.detector.name(), "face detector ready");
        }
        true
    }

    fn next_sequence(&self, session: u64) -> Option<u64> {
        let mut core = self.core.lock();
        if !core.is_current(session) {
            return None;
        }
        core.next_sequence += 1;
        Some(core.next_sequence)
    }

    fn apply_sample(self: &Arc<Self>, session: u64, sequence: u64, sample: FrameSample) {
        let mut core = self.core.lock();
        if !core.is_current(session) {
            return;
        }

        let Some(outcome) = core.tracker.ingest(sample, sequence) else {
            debug!(sequence, "out-of-order sample dropped");
            return;
        };

        match outcome.step {
            DebounceStep::Unchanged => {}
            DebounceStep::Armed { generation, .. } => {
                let handle = self.arm_debounce(session, generation);
                if let Some((_, stale)) = core.debounce.replace((generation, handle)) {
                    stale.abort();
                }
                debug!(
                    generation,
                    face_detection_rate = outcome.score.face_detection_rate,
                    avg_motion = outcome.score.avg_motion,
                    "distraction signal, debounce armed"
                );
            }
            DebounceStep::Cancelled { generation } => {
                core.cancel_debounce();
                debug!(generation, "distraction signal cleared, debounce cancelled");
            }
            DebounceStep::Changed(state) => {
                self.announce(&core, state, outcome.score);
            }
        }
    }

    fn arm_debounce(self: &Arc<Self>, session: u64, generation: u64) -> JoinHandle<()> {
        let weak = Arc::downgrade(self);
        let delay = Duration::from_millis(self.config.debounce.distraction_delay_ms);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                inner.fire_debounce(session, generation);
            }
        })
    }

    fn fire_debounce(&self, session: u64, generation: u64) {
        let mut core = self.core.lock();
        if !core.is_current(session) {
            return;
        }
        if !matches!(core.debounce, Some((armed, _)) if armed == generation) {
            return;
        }
        core.debounce = None;

        let now = core.clock.now_ms();
        if let Some(state) = core.tracker.fire(generation, now) {
            let score = core.tracker.score();
            self.announce(&core, state, score);
        }
    }

    fn announce(&self, core: &Core, state: AttentionState, score: AttentionScore) {
        let session_id = core.session_id();
        info!(
            session_id = %session_id,
            status = %state.status,
            confidence = state.confidence,
            "attention status changed"
        );
        self.state_tx.send_replace(state);
        self.events
            .publish(AttentionEvent::StatusChanged(StatusChangedPayload {
                session_id,
                state,
                score,
                timestamp: Utc::now(),
            }));
    }
}

async fn run_sampler(
    inner: Weak<Inner>,
    session: u64,
    clock: SessionClock,
    mut source: Box<dyn FrameSource>,
) {
    let Some((config, detector)) = inner
        .upgrade()
        .map(|i| (i.config.clone(), Arc::clone(&i.detector)))
    else {
        return;
    };

    let status = match detector.initialize().await {
        Ok(()) => EstimatorStatus::native(),
        Err(e) => EstimatorStatus::unsupported(e.to_string()),
    };
    match inner.upgrade() {
        Some(i) if i.record_status(session, &status) => {}
        _ => return,
    }

    let mut estimator = Estimator::new(config.estimator.clone(), status);
    let buffer = WorkingBuffer::new(config.sampler.frame_width, config.sampler.frame_height);

    let mut ticker = interval(Duration::from_millis(config.sampler.interval_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        let Some(sequence) = inner.upgrade().and_then(|i| i.next_sequence(session)) else {
            break;
        };

        match sample_once(source.as_mut(), &buffer, &mut estimator, detector.as_ref(), clock).await {
            Ok(sample) => {
                if let Some(e) = estimator.last_error() {
                    debug!(sequence, error = %e, "detection failed, brightness fallback for this frame");
                }
                match inner.upgrade() {
                    Some(i) => i.apply_sample(session, sequence, sample),
                    None => break,
                }
            }
            Err(PipelineError::Capture(CaptureError::NotReady)) => {
                debug!(sequence, "no decoded frame yet, tick skipped");
            }
            Err(PipelineError::Capture(CaptureError::SourceClosed)) => {
                if let Some(i) = inner.upgrade() {
                    i.source_closed(session);
                }
                break;
            }
            Err(e) => {
                warn!(sequence, error = %e, "sampling tick skipped");
            }
        }
    }
}

async fn sample_once(
    source: &mut dyn FrameSource,
    buffer: &WorkingBuffer,
    estimator: &mut Estimator,
    detector: &dyn FaceDetector,
    clock: SessionClock,
) -> Result<FrameSample, PipelineError> {
    let raw = source.capture().await?;
    let timestamp = clock.now_ms();
    let frame = buffer.load(raw)?;

    let detection = if estimator.wants_detection() && !frame.is_empty() {
        match detector.detect(&frame).await {
            Ok(faces) => Detection::Faces(faces),
            Err(e) => Detection::Failed(e),
        }
    } else {
        Detection::NotRun
    };

    Ok(estimator.estimate(&frame, detection, timestamp))
}
