//! Truevision TGA on-disk format: the 18-byte header, pixel decoding and
//! encoding, and RLE packets.
//!
//! Header layout (all multi-byte fields little-endian):
//!
//! | offset | size | field                         |
//! |--------|------|-------------------------------|
//! | 0      | 1    | id length                     |
//! | 1      | 1    | color map type (0 or 1)       |
//! | 2      | 1    | image type                    |
//! | 3      | 2    | color map first entry index   |
//! | 5      | 2    | color map length              |
//! | 7      | 1    | color map entry depth         |
//! | 8      | 2    | x origin                      |
//! | 10     | 2    | y origin                      |
//! | 12     | 2    | width                         |
//! | 14     | 2    | height                        |
//! | 16     | 1    | pixel depth                   |
//! | 17     | 1    | image descriptor              |

pub(crate) mod decode;
pub(crate) mod encode;
pub(crate) mod rle;

use alloc::format;
use alloc::vec::Vec;

use crate::error::TgaError;
use crate::pixel::le16;
use crate::variant::{ColorModel, Compression};

/// Descriptor bits 0–3: alpha (attribute) bits per pixel.
const DESC_ALPHA_MASK: u8 = 0x0F;
/// Descriptor bit 4: pixels run right-to-left.
const DESC_RIGHT_TO_LEFT: u8 = 0x10;
/// Descriptor bit 5: rows run top-to-bottom.
const DESC_TOP_TO_BOTTOM: u8 = 0x20;

/// Image type field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageType {
    /// 0: no image data.
    NoImage,
    /// 1: uncompressed color-mapped.
    ColorMapped,
    /// 2: uncompressed true-color.
    TrueColor,
    /// 3: uncompressed black-and-white.
    BlackAndWhite,
    /// 9: run-length encoded color-mapped.
    ColorMappedRle,
    /// 10: run-length encoded true-color.
    TrueColorRle,
    /// 11: run-length encoded black-and-white.
    BlackAndWhiteRle,
}

impl ImageType {
    pub fn from_u8(v: u8) -> Option<Self> {
        Some(match v {
            0 => Self::NoImage,
            1 => Self::ColorMapped,
            2 => Self::TrueColor,
            3 => Self::BlackAndWhite,
            9 => Self::ColorMappedRle,
            10 => Self::TrueColorRle,
            11 => Self::BlackAndWhiteRle,
            _ => return None,
        })
    }

    pub fn to_u8(self) -> u8 {
        match self {
            Self::NoImage => 0,
            Self::ColorMapped => 1,
            Self::TrueColor => 2,
            Self::BlackAndWhite => 3,
            Self::ColorMappedRle => 9,
            Self::TrueColorRle => 10,
            Self::BlackAndWhiteRle => 11,
        }
    }

    pub(crate) fn from_parts(model: ColorModel, compression: Compression) -> Self {
        match (model, compression) {
            (ColorModel::ColorMapped, Compression::None) => Self::ColorMapped,
            (ColorModel::TrueColor, Compression::None) => Self::TrueColor,
            (ColorModel::BlackAndWhite, Compression::None) => Self::BlackAndWhite,
            (ColorModel::ColorMapped, Compression::Rle) => Self::ColorMappedRle,
            (ColorModel::TrueColor, Compression::Rle) => Self::TrueColorRle,
            (ColorModel::BlackAndWhite, Compression::Rle) => Self::BlackAndWhiteRle,
        }
    }

    /// Color model, or `None` for [`ImageType::NoImage`].
    pub fn color_model(self) -> Option<ColorModel> {
        match self {
            Self::NoImage => None,
            Self::ColorMapped | Self::ColorMappedRle => Some(ColorModel::ColorMapped),
            Self::TrueColor | Self::TrueColorRle => Some(ColorModel::TrueColor),
            Self::BlackAndWhite | Self::BlackAndWhiteRle => Some(ColorModel::BlackAndWhite),
        }
    }

    pub fn compression(self) -> Compression {
        match self {
            Self::ColorMappedRle | Self::TrueColorRle | Self::BlackAndWhiteRle => Compression::Rle,
            _ => Compression::None,
        }
    }
}

/// Color map specification (header bytes 3–7).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ColorMapSpec {
    /// Index of the first stored entry.
    pub first_entry: u16,
    /// Number of stored entries.
    pub length: u16,
    /// Bits per stored entry: 15, 16, 24 or 32.
    pub entry_bits: u8,
}

impl ColorMapSpec {
    pub fn entry_bytes(&self) -> usize {
        (usize::from(self.entry_bits) + 7) / 8
    }
}

/// Parsed TGA header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TgaHeader {
    pub id_length: u8,
    pub has_color_map: bool,
    pub image_type: ImageType,
    pub color_map: ColorMapSpec,
    pub x_origin: u16,
    pub y_origin: u16,
    pub width: u16,
    pub height: u16,
    pub pixel_depth: u8,
    pub descriptor: u8,
}

impl TgaHeader {
    /// Size of the fixed header in bytes.
    pub const SIZE: usize = 18;

    /// Parse and validate the fixed header.
    pub fn parse(data: &[u8]) -> Result<Self, TgaError> {
        let Some(b) = data.get(..Self::SIZE) else {
            return Err(TgaError::MalformedHeader(format!(
                "need {} header bytes, got {}",
                Self::SIZE,
                data.len()
            )));
        };

        let has_color_map = match b[1] {
            0 => false,
            1 => true,
            other => {
                return Err(TgaError::MalformedHeader(format!(
                    "color map type {other} (expected 0 or 1)"
                )));
            }
        };
        let image_type = ImageType::from_u8(b[2])
            .ok_or_else(|| TgaError::MalformedHeader(format!("unknown image type {}", b[2])))?;

        let header = Self {
            id_length: b[0],
            has_color_map,
            image_type,
            color_map: ColorMapSpec {
                first_entry: le16(&b[3..]),
                length: le16(&b[5..]),
                entry_bits: b[7],
            },
            x_origin: le16(&b[8..]),
            y_origin: le16(&b[10..]),
            width: le16(&b[12..]),
            height: le16(&b[14..]),
            pixel_depth: b[16],
            descriptor: b[17],
        };
        header.validate()?;
        Ok(header)
    }

    fn validate(&self) -> Result<(), TgaError> {
        if self.has_color_map && !matches!(self.color_map.entry_bits, 15 | 16 | 24 | 32) {
            return Err(TgaError::MalformedHeader(format!(
                "color map entry depth {} (expected 15, 16, 24 or 32)",
                self.color_map.entry_bits
            )));
        }

        let Some(model) = self.image_type.color_model() else {
            return Ok(());
        };

        if self.width == 0 || self.height == 0 {
            return Err(TgaError::MalformedHeader(format!(
                "zero-sized image {}x{}",
                self.width, self.height
            )));
        }

        let depth_ok = match model {
            ColorModel::ColorMapped => matches!(self.pixel_depth, 8 | 16),
            ColorModel::TrueColor => matches!(self.pixel_depth, 15 | 16 | 24 | 32),
            ColorModel::BlackAndWhite => matches!(self.pixel_depth, 8 | 16),
        };
        if !depth_ok {
            return Err(TgaError::MalformedHeader(format!(
                "pixel depth {} invalid for {:?} image",
                self.pixel_depth, model
            )));
        }

        if model == ColorModel::ColorMapped && !self.has_color_map {
            return Err(TgaError::MalformedHeader(
                "color-mapped image without a color map".into(),
            ));
        }
        Ok(())
    }

    /// Alpha (attribute) bits per pixel from the descriptor.
    pub fn alpha_bits(&self) -> u8 {
        self.descriptor & DESC_ALPHA_MASK
    }

    /// Whether the first stored row is the top of the image.
    pub fn top_to_bottom(&self) -> bool {
        self.descriptor & DESC_TOP_TO_BOTTOM != 0
    }

    /// Whether each stored row runs from right to left.
    pub fn right_to_left(&self) -> bool {
        self.descriptor & DESC_RIGHT_TO_LEFT != 0
    }

    /// Bytes per stored pixel sample.
    pub fn bytes_per_pixel(&self) -> usize {
        (usize::from(self.pixel_depth) + 7) / 8
    }

    /// Byte offset of the color map (after header and id field).
    pub(crate) fn color_map_offset(&self) -> usize {
        Self::SIZE + usize::from(self.id_length)
    }

    /// Byte size of the stored color map.
    pub(crate) fn color_map_size(&self) -> usize {
        if self.has_color_map {
            usize::from(self.color_map.length) * self.color_map.entry_bytes()
        } else {
            0
        }
    }

    /// Append the 18 header bytes to `out`.
    pub(crate) fn write(&self, out: &mut Vec<u8>) {
        out.push(self.id_length);
        out.push(u8::from(self.has_color_map));
        out.push(self.image_type.to_u8());
        out.extend_from_slice(&self.color_map.first_entry.to_le_bytes());
        out.extend_from_slice(&self.color_map.length.to_le_bytes());
        out.push(self.color_map.entry_bits);
        out.extend_from_slice(&self.x_origin.to_le_bytes());
        out.extend_from_slice(&self.y_origin.to_le_bytes());
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        out.push(self.pixel_depth);
        out.push(self.descriptor);
    }

    /// Descriptor byte for bottom-left origin with `alpha_bits` attribute bits.
    pub(crate) fn bottom_left_descriptor(alpha_bits: u8) -> u8 {
        alpha_bits & DESC_ALPHA_MASK
    }
}
