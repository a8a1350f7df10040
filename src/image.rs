use alloc::vec::Vec;

#[cfg(feature = "rgb")]
use rgb::AsPixels as _;

use crate::error::TgaError;
use crate::pixel::{OPAQUE, Rgba};
use crate::tga::{ColorMapSpec, ImageType};
use crate::variant::{ColorModel, Compression};

/// How the decoded file was stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceFormat {
    pub image_type: ImageType,
    pub pixel_depth: u8,
    /// Alpha bits declared in the descriptor.
    pub alpha_bits: u8,
    /// Color map spec, if the file carried one.
    pub color_map: Option<ColorMapSpec>,
    /// Whether the file stored rows top-to-bottom.
    pub top_to_bottom: bool,
    /// Whether the file stored pixels right-to-left.
    pub right_to_left: bool,
}

impl SourceFormat {
    /// Format attributed to images built from raw RGBA8 pixels.
    pub const RGBA32: SourceFormat = SourceFormat {
        image_type: ImageType::TrueColor,
        pixel_depth: 32,
        alpha_bits: 8,
        color_map: None,
        top_to_bottom: true,
        right_to_left: false,
    };

    pub fn color_model(&self) -> Option<ColorModel> {
        self.image_type.color_model()
    }

    pub fn compression(&self) -> Compression {
        self.image_type.compression()
    }
}

/// Palette and index stream kept from a color-mapped source whose color map
/// fits in 8-bit indices. Lets a color-mapped to color-mapped conversion
/// keep the original palette order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SourcePalette {
    pub colors: Vec<Rgba>,
    /// Row-major, top-left origin, one index per pixel.
    pub indices: Vec<u8>,
}

/// Decoded image at full precision: RGBA8, row 0 at the top, column 0 at the
/// left, whatever the source file's origin corner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalImage {
    pub width: u32,
    pub height: u32,
    /// X/Y origin header fields, carried through to the encoded output.
    pub x_origin: u16,
    pub y_origin: u16,
    pixels: Vec<u8>,
    source: SourceFormat,
    pub(crate) source_palette: Option<SourcePalette>,
}

impl CanonicalImage {
    /// Build an image from RGBA8 pixels (row-major, top row first).
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, TgaError> {
        let needed = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or(TgaError::DimensionsTooLarge { width, height })?;
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(TgaError::DimensionsTooLarge { width, height });
        }
        if pixels.len() != needed {
            return Err(TgaError::TruncatedData);
        }
        Ok(Self::new(width, height, pixels, SourceFormat::RGBA32))
    }

    pub(crate) fn new(width: u32, height: u32, pixels: Vec<u8>, source: SourceFormat) -> Self {
        Self {
            width,
            height,
            x_origin: 0,
            y_origin: 0,
            pixels,
            source,
            source_palette: None,
        }
    }

    /// Image carrying no pixel data (TGA image type 0).
    pub(crate) fn empty(source: SourceFormat) -> Self {
        Self::new(0, 0, Vec::new(), source)
    }

    /// RGBA8 pixel bytes, row-major, top row first.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Take ownership of the RGBA8 pixel bytes.
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Description of the file this image was decoded from.
    pub fn source(&self) -> &SourceFormat {
        &self.source
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixel_count(&self) -> usize {
        self.pixels.len() / 4
    }

    /// Pixel at (x, y), or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let off = (y as usize * self.width as usize + x as usize) * 4;
        let p = self.pixels.get(off..off + 4)?;
        Some([p[0], p[1], p[2], p[3]])
    }

    /// Iterate over pixels in row-major order.
    pub fn iter_pixels(&self) -> impl Iterator<Item = Rgba> + '_ {
        self.pixels
            .chunks_exact(4)
            .map(|p| [p[0], p[1], p[2], p[3]])
    }

    /// Whether any pixel is not fully opaque.
    pub fn has_alpha(&self) -> bool {
        self.pixels.chunks_exact(4).any(|p| p[3] != OPAQUE)
    }

    /// Reinterpret pixel data as typed RGBA pixels.
    #[cfg(feature = "rgb")]
    pub fn as_pixels(&self) -> &[rgb::RGBA8] {
        self.pixels.as_pixels()
    }

    /// Zero-copy 2D view of the pixels.
    #[cfg(feature = "imgref")]
    pub fn as_imgref(&self) -> imgref::ImgRef<'_, rgb::RGBA8> {
        imgref::ImgRef::new(
            self.as_pixels(),
            self.width as usize,
            self.height as usize,
        )
    }

    /// Copy the pixels into an owned 2D buffer.
    #[cfg(feature = "imgref")]
    pub fn to_imgvec(&self) -> imgref::ImgVec<rgb::RGBA8> {
        imgref::ImgVec::new(
            self.as_pixels().to_vec(),
            self.width as usize,
            self.height as usize,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn from_rgba_checks_length() {
        assert!(CanonicalImage::from_rgba(2, 1, vec![0; 8]).is_ok());
        assert!(matches!(
            CanonicalImage::from_rgba(2, 1, vec![0; 7]),
            Err(TgaError::TruncatedData)
        ));
        assert!(matches!(
            CanonicalImage::from_rgba(70_000, 1, vec![0; 280_000]),
            Err(TgaError::DimensionsTooLarge { .. })
        ));
    }

    #[test]
    fn pixel_access() {
        let img =
            CanonicalImage::from_rgba(2, 2, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16])
                .unwrap();
        assert_eq!(img.pixel(1, 0), Some([5, 6, 7, 8]));
        assert_eq!(img.pixel(0, 1), Some([9, 10, 11, 12]));
        assert_eq!(img.pixel(2, 0), None);
        assert!(img.has_alpha());
        assert_eq!(img.iter_pixels().count(), 4);
    }
}
