//! # attention-session
//!
//! Tokio host for the attention pipeline: runs the sampling loop against a
//! live frame source, relays the debounce timer, and publishes status changes.

pub mod config;
pub mod detector;
pub mod error;
pub mod events;
pub mod logging;
pub mod pipeline;
pub mod source;

pub use config::{Config, FileLogSettings};
pub use detector::{FaceDetector, NoDetector, Script, ScriptedDetector};
pub use error::{CaptureError, ConfigError, PipelineError};
pub use events::{AttentionEvent, EventBus, EventEnvelope};
pub use pipeline::{AttentionPipeline, StartOutcome};
pub use source::{FrameSource, RawFrame, Scene, SceneHandle, SyntheticSource, WorkingBuffer};
