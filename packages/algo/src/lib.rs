//! # attention-algo - attention detection signal pipeline
//!
//! Pure Rust algorithms behind the "is the learner still looking at the
//! screen" check:
//!
//! - **Estimator** - per-frame face presence (platform detector or brightness
//!   heuristic) and frame-to-frame motion
//! - **History & scoring** - rolling window of samples reduced to a
//!   distraction signal
//! - **Debounce** - asymmetric state machine: slow to alarm, instant to recover
//! - **Tracker** - the above glued into one per-session state with statistics
//!
//! ## Design
//!
//! - **Runtime-free** - no async, no timers, no I/O; hosts own the clock and
//!   relay the debounce timer
//! - **Reusable** - the same code drives the tokio session and the wasm bindings
//! - **Tested** - every module carries unit tests
//!
//! ## Modules
//!
//! - [`frame`] - RGBA frame buffer and luminance plane
//! - [`motion`] - motion scoring against the previous frame
//! - [`face`] - detector and brightness presence heuristics, head pose
//! - [`estimator`] - per-frame estimation with fallback handling
//! - [`history`] - rolling history and scoring
//! - [`debounce`] - distraction debounce state machine
//! - [`stats`] - focused/distracted time accounting
//! - [`tracker`] - per-session attention tracker
//! - [`config`] - tunables and validation
//! - [`sanitize`] - numeric validation of detector output
//! - [`types`] - shared types and constants
//!
//! ## Example
//!
//! ```rust
//! use attention_algo::{
//!     AttentionConfig, AttentionTracker, Detection, Estimator, EstimatorStatus, Frame,
//! };
//!
//! let config = AttentionConfig::default();
//! let mut estimator = Estimator::new(
//!     config.estimator.clone(),
//!     EstimatorStatus::unsupported("no detector"),
//! );
//! let mut tracker = AttentionTracker::new(config, 0.0);
//!
//! let frame = Frame::filled(320, 240, 120);
//! let sample = estimator.estimate(&frame, Detection::NotRun, 200.0);
//! let outcome = tracker.ingest(sample, 1).unwrap();
//! assert!(!outcome.score.is_distracted_signal);
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod config;
pub mod debounce;
pub mod error;
pub mod estimator;
pub mod face;
pub mod frame;
pub mod history;
pub mod motion;
pub mod sanitize;
pub mod stats;
pub mod tracker;
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use types::*;

pub use config::{AttentionConfig, DebounceConfig, EstimatorConfig, SamplerConfig, ScoringConfig};

pub use error::{ConfigError, EstimationError, UnknownStatus};

pub use frame::{Frame, LumaPlane};

pub use face::PresenceStrategy;

pub use estimator::{Detection, Estimator, EstimatorCounters, EstimatorStatus};

pub use history::AttentionHistory;

pub use debounce::{DebounceMachine, DebouncePhase, DebounceStep};

pub use stats::{SessionStats, StatsAccumulator};

pub use tracker::{AttentionTracker, TrackerOutcome};
