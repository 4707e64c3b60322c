//! WebAssembly bindings for the attention pipeline
//!
//! The page owns capture and (optionally) a native face detector; it hands
//! each RGBA frame to [`AttentionDetector::process_frame`] and reads back the
//! debounced status.

mod detector;

pub use detector::*;
