//! Raster frames
//!
//! A [`Frame`] is a tightly packed RGBA buffer, the layout a canvas
//! `getImageData` call or a decoded video track hands over. Luminance is the
//! plain channel mean `(r + g + b) / 3`, which is what every heuristic in this
//! crate is tuned against.

use crate::error::EstimationError;
use crate::types::RGBA_CHANNELS;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Frame {
    /// Wrap an RGBA buffer, checking that its length matches the dimensions
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, EstimationError> {
        let Some(expected) = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(RGBA_CHANNELS))
        else {
            return Err(EstimationError::InvalidFrame(format!(
                "{}x{} RGBA does not fit in memory",
                width, height
            )));
        };
        if data.len() != expected {
            return Err(EstimationError::InvalidFrame(format!(
                "expected {} bytes for {}x{} RGBA, got {}",
                expected,
                width,
                height,
                data.len()
            )));
        }
        Ok(Self { width, height, data })
    }

    /// Uniform frame where every pixel has the given gray level
    pub fn filled(width: u32, height: u32, gray: u8) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * RGBA_CHANNELS);
        for _ in 0..pixels {
            data.extend_from_slice(&[gray, gray, gray, 255]);
        }
        Self { width, height, data }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_rgba(&self) -> &[u8] {
        &self.data
    }

    pub fn into_rgba(self) -> Vec<u8> {
        self.data
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.pixel_count() == 0
    }

    /// Luminance of the pixel at (x, y); caller guarantees bounds
    #[inline]
    pub fn luma_at(&self, x: usize, y: usize) -> f64 {
        let i = (y * self.width as usize + x) * RGBA_CHANNELS;
        (self.data[i] as f64 + self.data[i + 1] as f64 + self.data[i + 2] as f64) / 3.0
    }

    /// Per-pixel luminance plane
    pub fn to_luma(&self) -> LumaPlane {
        let values = self
            .data
            .chunks_exact(RGBA_CHANNELS)
            .map(|px| ((px[0] as u16 + px[1] as u16 + px[2] as u16) / 3) as u8)
            .collect();
        LumaPlane {
            width: self.width,
            height: self.height,
            values,
        }
    }
}

/// Single-channel 8-bit luminance, kept between ticks for motion scoring
#[derive(Clone, Debug, PartialEq)]
pub struct LumaPlane {
    pub width: u32,
    pub height: u32,
    pub values: Vec<u8>,
}

impl LumaPlane {
    pub fn same_shape(&self, other: &LumaPlane) -> bool {
        self.width == other.width && self.height == other.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba_checks_length() {
        assert!(Frame::from_rgba(2, 2, vec![0; 16]).is_ok());
        let err = Frame::from_rgba(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(err, EstimationError::InvalidFrame(_)));
    }

    #[test]
    fn test_from_rgba_rejects_overflowing_dimensions() {
        let err = Frame::from_rgba(u32::MAX, u32::MAX, Vec::new()).unwrap_err();
        assert!(matches!(err, EstimationError::InvalidFrame(_)));
        let err = Frame::from_rgba(1 << 31, 1 << 31, Vec::new()).unwrap_err();
        assert!(matches!(err, EstimationError::InvalidFrame(_)));
    }

    #[test]
    fn test_zero_size_frame_is_empty() {
        let frame = Frame::from_rgba(0, 240, Vec::new()).unwrap();
        assert!(frame.is_empty());
        assert!(Frame::empty().is_empty());
    }

    #[test]
    fn test_luma_is_channel_mean() {
        let frame = Frame::from_rgba(1, 1, vec![30, 60, 90, 255]).unwrap();
        assert_eq!(frame.luma_at(0, 0), 60.0);
        assert_eq!(frame.to_luma().values, vec![60]);
    }

    #[test]
    fn test_filled_frame() {
        let frame = Frame::filled(4, 3, 120);
        assert_eq!(frame.as_rgba().len(), 4 * 3 * 4);
        assert!(frame.to_luma().values.iter().all(|&v| v == 120));
    }
}
