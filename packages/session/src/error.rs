use attention_algo::EstimationError;
use thiserror::Error;

/// Frame capture failures. Each one skips a single sampling tick.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("frame source closed")]
    SourceClosed,
    #[error("frame source has no decoded frame yet")]
    NotReady,
    #[error("capture backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no frame source supplied")]
    SourceMissing,
    #[error("attention detection is disabled")]
    Disabled,
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Estimation(#[from] EstimationError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
    #[error(transparent)]
    Invalid(#[from] attention_algo::ConfigError),
}
