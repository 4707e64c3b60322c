//! Platform face detectors

use std::sync::Arc;

use async_trait::async_trait;
use attention_algo::{EstimationError, FaceBox, Frame};
use parking_lot::Mutex;

/// A face detector provided by the host platform.
///
/// `initialize` runs once at the start of every attention session; an error
/// pins the session to the brightness heuristic.
#[async_trait]
pub trait FaceDetector: Send + Sync {
    fn name(&self) -> &'static str;

    async fn initialize(&self) -> Result<(), EstimationError>;

    /// Faces found in the frame, in frame pixel coordinates
    async fn detect(&self, frame: &Frame) -> Result<Vec<FaceBox>, EstimationError>;
}

/// Platform without a face detection API
pub struct NoDetector;

#[async_trait]
impl FaceDetector for NoDetector {
    fn name(&self) -> &'static str {
        "none"
    }

    async fn initialize(&self) -> Result<(), EstimationError> {
        Err(EstimationError::Detector(
            "face detection is not supported on this platform".to_string(),
        ))
    }

    async fn detect(&self, _frame: &Frame) -> Result<Vec<FaceBox>, EstimationError> {
        Err(EstimationError::Detector("no face detector".to_string()))
    }
}

/// Outcome a [`ScriptedDetector`] reports for every frame
#[derive(Debug, Clone, PartialEq)]
pub enum Script {
    Faces(Vec<FaceBox>),
    Fail(String),
}

/// Detector replaying a host-controlled script; used by the demo binary and tests
#[derive(Clone)]
pub struct ScriptedDetector {
    script: Arc<Mutex<Script>>,
    available: bool,
}

impl ScriptedDetector {
    pub fn new(script: Script) -> Self {
        Self {
            script: Arc::new(Mutex::new(script)),
            available: true,
        }
    }

    /// Detector whose initialization fails
    pub fn unavailable() -> Self {
        Self {
            script: Arc::new(Mutex::new(Script::Faces(Vec::new()))),
            available: false,
        }
    }

    pub fn set(&self, script: Script) {
        *self.script.lock() = script;
    }
}

#[async_trait]
impl FaceDetector for ScriptedDetector {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn initialize(&self) -> Result<(), EstimationError> {
        if self.available {
            Ok(())
        } else {
            Err(EstimationError::Detector("detector failed to load".to_string()))
        }
    }

    async fn detect(&self, _frame: &Frame) -> Result<Vec<FaceBox>, EstimationError> {
        match &*self.script.lock() {
            Script::Faces(faces) => Ok(faces.clone()),
            Script::Fail(reason) => Err(EstimationError::Detector(reason.clone())),
        }
    }
}
