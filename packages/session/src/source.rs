//! Frame sources and the fixed-size working buffer
//!
//! A [`FrameSource`] hands out decoded RGBA frames of whatever size the media
//! track produces; [`WorkingBuffer`] scales them to the estimator's working
//! resolution.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use attention_algo::{EstimationError, Frame};
use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgba};
use parking_lot::Mutex;

use crate::error::{CaptureError, PipelineError};

/// A decoded RGBA frame as delivered by the media track
#[derive(Debug, Clone, PartialEq)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl RawFrame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self { width, height, data }
    }
}

/// Read access to the local outgoing video track
#[async_trait]
pub trait FrameSource: Send {
    fn name(&self) -> &'static str {
        "frame-source"
    }

    async fn capture(&mut self) -> Result<RawFrame, CaptureError>;
}

pub struct WorkingBuffer {
    width: u32,
    height: u32,
}

impl WorkingBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Scale a captured frame into the working resolution.
    ///
    /// Zero-sized captures pass through as an empty frame.
    pub fn load(&self, raw: RawFrame) -> Result<Frame, PipelineError> {
        if raw.width == 0 || raw.height == 0 {
            return Ok(Frame::empty());
        }
        if raw.width == self.width && raw.height == self.height {
            return Ok(Frame::from_rgba(raw.width, raw.height, raw.data)?);
        }

        let (width, height) = (raw.width, raw.height);
        let len = raw.data.len();
        let image: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_raw(width, height, raw.data)
            .ok_or_else(|| {
                EstimationError::InvalidFrame(format!(
                    "{len} bytes do not hold a {width}x{height} RGBA frame"
                ))
            })?;

        let scaled = imageops::resize(&image, self.width, self.height, FilterType::Nearest);
        Ok(Frame::from_rgba(self.width, self.height, scaled.into_raw())?)
    }
}

// ==================== Synthetic source ====================

/// What the synthetic camera is currently looking at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scene {
    /// Lens covered or user gone: uniform dark frame
    Dark,
    /// Evenly lit face-like frame
    Lit,
    /// Lit frame whose brightness swings every capture
    Flicker,
    /// Capture backend errors on every call
    Failing,
    /// Track ended
    Closed,
}

/// Shared control over one or more [`SyntheticSource`]s
#[derive(Debug, Clone)]
pub struct SceneHandle {
    scene: Arc<Mutex<Scene>>,
    captures: Arc<AtomicU64>,
}

impl SceneHandle {
    pub fn new(scene: Scene) -> Self {
        Self {
            scene: Arc::new(Mutex::new(scene)),
            captures: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn set(&self, scene: Scene) {
        *self.scene.lock() = scene;
    }

    pub fn scene(&self) -> Scene {
        *self.scene.lock()
    }

    /// Capture attempts across every source sharing this handle
    pub fn captures(&self) -> u64 {
        self.captures.load(Ordering::SeqCst)
    }
}

/// Generates uniform frames from a [`SceneHandle`]; used by the demo binary and tests
pub struct SyntheticSource {
    handle: SceneHandle,
    width: u32,
    height: u32,
    tick: u64,
}

impl SyntheticSource {
    pub fn new(handle: SceneHandle, width: u32, height: u32) -> Self {
        Self {
            handle,
            width,
            height,
            tick: 0,
        }
    }
}

#[async_trait]
impl FrameSource for SyntheticSource {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    async fn capture(&mut self) -> Result<RawFrame, CaptureError> {
        self.handle.captures.fetch_add(1, Ordering::SeqCst);
        self.tick += 1;

        let gray = match self.handle.scene() {
            Scene::Dark => 10,
            Scene::Lit => 120,
            Scene::Flicker => {
                if self.tick % 2 == 0 {
                    60
                } else {
                    180
                }
            }
            Scene::Failing => return Err(CaptureError::Backend("synthetic failure".into())),
            Scene::Closed => return Err(CaptureError::SourceClosed),
        };

        let frame = Frame::filled(self.width, self.height, gray);
        Ok(RawFrame::new(self.width, self.height, frame.into_rgba()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_size_passes_through() {
        let buffer = WorkingBuffer::new(4, 2);
        let frame = buffer.load(RawFrame::new(4, 2, vec![7; 4 * 2 * 4])).unwrap();
        assert_eq!((frame.width(), frame.height()), (4, 2));
        assert_eq!(frame.luma_at(3, 1), 7.0);
    }

    #[test]
    fn test_larger_capture_is_scaled_down() {
        let buffer = WorkingBuffer::new(320, 240);
        let raw = RawFrame::new(640, 480, Frame::filled(640, 480, 90).into_rgba());
        let frame = buffer.load(raw).unwrap();
        assert_eq!((frame.width(), frame.height()), (320, 240));
        assert_eq!(frame.luma_at(160, 120), 90.0);
    }

    #[test]
    fn test_zero_sized_capture_is_empty() {
        let buffer = WorkingBuffer::new(320, 240);
        let frame = buffer.load(RawFrame::new(0, 480, Vec::new())).unwrap();
        assert!(frame.is_empty());
    }

    #[test]
    fn test_short_buffer_is_invalid() {
        let buffer = WorkingBuffer::new(320, 240);
        let result = buffer.load(RawFrame::new(640, 480, vec![0; 16]));
        assert!(matches!(
            result,
            Err(PipelineError::Estimation(EstimationError::InvalidFrame(_)))
        ));
    }

    #[tokio::test]
    async fn test_synthetic_source_follows_scene() {
        let handle = SceneHandle::new(Scene::Dark);
        let mut source = SyntheticSource::new(handle.clone(), 8, 8);

        let dark = source.capture().await.unwrap();
        assert_eq!(dark.data[0], 10);

        handle.set(Scene::Failing);
        assert!(matches!(source.capture().await, Err(CaptureError::Backend(_))));

        handle.set(Scene::Closed);
        assert!(matches!(source.capture().await, Err(CaptureError::SourceClosed)));
        assert_eq!(handle.captures(), 3);
    }
}
