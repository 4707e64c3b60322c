use attention_algo::{
    AttentionConfig, AttentionTracker, DebounceStep, Detection, EstimationError, Estimator,
    EstimatorStatus, FaceBox, Frame, PresenceStrategy,
};
use wasm_bindgen::prelude::*;

const UNSUPPORTED_REASON: &str = "FaceDetector API unavailable";

/// Result of one `process_frame` call
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameReport {
    /// False when the frame buffer was unusable and the tick was skipped
    pub accepted: bool,
    pub face_present: bool,
    pub motion_level: f64,
    pub face_detection_rate: f64,
    pub avg_motion: f64,
    pub is_distracted_signal: bool,
    /// Visible status flipped during this call
    pub status_changed: bool,
    pub distracted: bool,
    pub confidence: f64,
}

#[wasm_bindgen]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SessionStatsView {
    pub focused_ms: f64,
    pub distracted_ms: f64,
    pub transitions: u32,
    pub samples: u32,
    pub attention_score: f64,
}

/// Attention pipeline for a page that captures frames itself.
///
/// The page calls `process_frame` once per sampling tick (and optionally
/// `poll` from a timer); the debounce deadline is evaluated against the
/// timestamps it passes in.
#[wasm_bindgen]
pub struct AttentionDetector {
    estimator: Estimator,
    tracker: AttentionTracker,
    sequence: u64,
}

#[wasm_bindgen]
impl AttentionDetector {
    /// `config` may be `undefined` or a partial config object; missing fields
    /// take their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(
        config: JsValue,
        detector_available: bool,
        now: Option<f64>,
    ) -> Result<AttentionDetector, JsError> {
        let config: AttentionConfig = if config.is_undefined() || config.is_null() {
            AttentionConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsError::new(&format!("invalid attention config: {e}")))?
        };
        let now = now.unwrap_or_else(js_sys::Date::now);

        Self::with_config(config, detector_available, now).map_err(|e| JsError::new(&e))
    }

    /// `faces` is the detector output for this frame: `undefined` when no
    /// detector ran, otherwise an array of `{x, y, width, height, landmarks?}`.
    #[wasm_bindgen]
    pub fn process_frame(
        &mut self,
        rgba: &[u8],
        width: u32,
        height: u32,
        timestamp: f64,
        faces: JsValue,
    ) -> FrameReport {
        let detection = if faces.is_undefined() || faces.is_null() {
            Detection::NotRun
        } else {
            match serde_wasm_bindgen::from_value::<Vec<FaceBox>>(faces) {
                Ok(faces) => Detection::Faces(faces),
                Err(e) => Detection::Failed(EstimationError::MalformedDetection(e.to_string())),
            }
        };
        self.ingest(rgba, width, height, timestamp, detection)
    }

    /// Same as `process_frame` for a frame where the page's detector threw
    #[wasm_bindgen]
    pub fn report_detection_failure(
        &mut self,
        rgba: &[u8],
        width: u32,
        height: u32,
        timestamp: f64,
        message: String,
    ) -> FrameReport {
        let detection = Detection::Failed(EstimationError::Detector(message));
        self.ingest(rgba, width, height, timestamp, detection)
    }

    /// Apply a due debounce deadline; returns true when the status flipped
    #[wasm_bindgen]
    pub fn poll(&mut self, now: f64) -> bool {
        self.tracker.poll(now).is_some()
    }

    #[wasm_bindgen]
    pub fn wants_detection(&self) -> bool {
        self.estimator.wants_detection()
    }

    #[wasm_bindgen]
    pub fn status(&self) -> String {
        self.tracker.state().status.as_str().to_string()
    }

    #[wasm_bindgen]
    pub fn confidence(&self) -> f64 {
        self.tracker.state().confidence
    }

    #[wasm_bindgen]
    pub fn last_change_at(&self) -> f64 {
        self.tracker.state().last_change_at
    }

    #[wasm_bindgen]
    pub fn is_pending(&self) -> bool {
        matches!(
            self.tracker.phase(),
            attention_algo::DebouncePhase::PendingDistracted { .. }
        )
    }

    #[wasm_bindgen]
    pub fn strategy(&self) -> String {
        self.estimator.strategy().as_str().to_string()
    }

    #[wasm_bindgen]
    pub fn unsupported_reason(&self) -> Option<String> {
        self.estimator.status().unsupported_reason.clone()
    }

    #[wasm_bindgen]
    pub fn warning_visible(&self) -> bool {
        self.tracker.warning_visible()
    }

    #[wasm_bindgen]
    pub fn dismiss_warning(&mut self) {
        self.tracker.dismiss_warning();
    }

    /// `{status, confidence, lastChangeAt}` as a plain JS object
    #[wasm_bindgen]
    pub fn state(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.tracker.state()).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen]
    pub fn stats(&self, now: f64) -> SessionStatsView {
        let stats = self.tracker.stats(now);
        SessionStatsView {
            focused_ms: stats.focused_ms,
            distracted_ms: stats.distracted_ms,
            transitions: stats.transitions as u32,
            samples: stats.samples as u32,
            attention_score: stats.attention_score,
        }
    }

    /// Stop semantics: focused, empty history, nothing pending
    #[wasm_bindgen]
    pub fn reset(&mut self, now: f64) {
        self.tracker.reset(now);
        self.estimator.reset();
        self.sequence = 0;
    }
}

impl AttentionDetector {
    pub fn with_config(
        config: AttentionConfig,
        detector_available: bool,
        now: f64,
    ) -> Result<Self, String> {
        config.validate().map_err(|e| e.to_string())?;

        let status = match PresenceStrategy::from_capability(detector_available) {
            PresenceStrategy::NativeDetector => EstimatorStatus::native(),
            PresenceStrategy::BrightnessFallback => EstimatorStatus::unsupported(UNSUPPORTED_REASON),
        };

        Ok(Self {
            estimator: Estimator::new(config.estimator.clone(), status),
            tracker: AttentionTracker::new(config, now),
            sequence: 0,
        })
    }

    pub fn ingest(
        &mut self,
        rgba: &[u8],
        width: u32,
        height: u32,
        timestamp: f64,
        detection: Detection,
    ) -> FrameReport {
        let mut status_changed = self.tracker.poll(timestamp).is_some();

        let frame = match Frame::from_rgba(width, height, rgba.to_vec()) {
            Ok(frame) => frame,
            Err(_) => return self.report(false, status_changed),
        };

        let sample = self.estimator.estimate(&frame, detection, timestamp);
        let (face_present, motion_level) = (sample.face_present, sample.motion_level);

        self.sequence += 1;
        if let Some(outcome) = self.tracker.ingest(sample, self.sequence) {
            status_changed |= matches!(outcome.step, DebounceStep::Changed(_));
        }

        FrameReport {
            face_present,
            motion_level,
            ..self.report(true, status_changed)
        }
    }

    fn report(&self, accepted: bool, status_changed: bool) -> FrameReport {
        let score = self.tracker.score();
        let state = self.tracker.state();
        FrameReport {
            accepted,
            face_present: false,
            motion_level: 0.0,
            face_detection_rate: score.face_detection_rate,
            avg_motion: score.avg_motion,
            is_distracted_signal: score.is_distracted_signal,
            status_changed,
            distracted: state.status.is_distracted(),
            confidence: state.confidence,
        }
    }
}
