use alloc::format;

use crate::error::TgaError;

/// Resource limits applied while decoding.
///
/// All fields default to `None` (no limit). The batch driver shares one
/// `Limits` value across every file it converts.
#[derive(Clone, Debug, Default)]
pub struct Limits {
    pub max_width: Option<u64>,
    pub max_height: Option<u64>,
    /// Maximum pixel count (width * height).
    pub max_pixels: Option<u64>,
    /// Maximum size of the canonical RGBA8 buffer.
    pub max_memory_bytes: Option<u64>,
    /// Maximum size of an input file accepted for decoding.
    pub max_input_bytes: Option<u64>,
}

impl Limits {
    /// Reject inputs larger than `max_input_bytes`.
    pub(crate) fn check_input(&self, len: usize) -> Result<(), TgaError> {
        match self.max_input_bytes {
            Some(max) if len as u64 > max => Err(TgaError::LimitExceeded(format!(
                "input of {len} bytes exceeds limit {max}"
            ))),
            _ => Ok(()),
        }
    }

    /// Check header dimensions and the RGBA8 allocation they imply.
    pub(crate) fn check_image(&self, width: u32, height: u32) -> Result<(), TgaError> {
        let (w, h) = (u64::from(width), u64::from(height));
        if let Some(max_w) = self.max_width.filter(|&m| w > m) {
            return Err(TgaError::LimitExceeded(format!(
                "width {width} exceeds limit {max_w}"
            )));
        }
        if let Some(max_h) = self.max_height.filter(|&m| h > m) {
            return Err(TgaError::LimitExceeded(format!(
                "height {height} exceeds limit {max_h}"
            )));
        }
        let pixels = w * h;
        if let Some(max_px) = self.max_pixels.filter(|&m| pixels > m) {
            return Err(TgaError::LimitExceeded(format!(
                "pixel count {pixels} exceeds limit {max_px}"
            )));
        }
        let bytes = pixels * 4;
        if let Some(max_mem) = self.max_memory_bytes.filter(|&m| bytes > m) {
            return Err(TgaError::LimitExceeded(format!(
                "allocation {bytes} bytes exceeds memory limit {max_mem}"
            )));
        }
        Ok(())
    }
}
