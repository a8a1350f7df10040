//! Target selection: the ten conversion modes and the concrete on-disk
//! variant each one resolves to.

use crate::error::TgaError;
use crate::tga::ImageType;

/// Color model of a TGA image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorModel {
    /// Pixels are indices into a color map.
    ColorMapped,
    /// Pixels carry their own B, G, R(, A) channels.
    TrueColor,
    /// Pixels carry an intensity (and optionally alpha).
    BlackAndWhite,
}

/// Pixel data compression.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Compression {
    None,
    Rle,
}

/// True-color sample width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrueColorDepth {
    /// 5-5-5, attribute bit always 0.
    Bits15,
    /// 5-5-5-1, attribute bit carries alpha.
    Bits16,
    /// 5-5-5 in a 16-bit sample, no alpha bits declared, attribute bit 0.
    Bits16NoAlpha,
    /// B, G, R.
    Bits24,
    /// B, G, R, A.
    Bits32,
}

impl TrueColorDepth {
    pub fn bits(self) -> u8 {
        match self {
            Self::Bits15 => 15,
            Self::Bits16 | Self::Bits16NoAlpha => 16,
            Self::Bits24 => 24,
            Self::Bits32 => 32,
        }
    }

    /// Alpha bits declared in the descriptor byte.
    pub fn alpha_bits(self) -> u8 {
        match self {
            Self::Bits15 | Self::Bits16NoAlpha | Self::Bits24 => 0,
            Self::Bits16 => 1,
            Self::Bits32 => 8,
        }
    }
}

/// Black-and-white sample width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GrayDepth {
    /// Intensity only.
    Bits8,
    /// Intensity followed by an alpha byte.
    Bits16,
}

/// A fully resolved output variant: color model plus sample depth.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageVariant {
    /// 8-bit indices into a palette of `entry_bits` (24 or 32) colors.
    ColorMapped { entry_bits: u8 },
    TrueColor(TrueColorDepth),
    BlackAndWhite(GrayDepth),
}

impl ImageVariant {
    pub fn color_model(self) -> ColorModel {
        match self {
            Self::ColorMapped { .. } => ColorModel::ColorMapped,
            Self::TrueColor(_) => ColorModel::TrueColor,
            Self::BlackAndWhite(_) => ColorModel::BlackAndWhite,
        }
    }

    /// Pixel depth field written to the header.
    pub fn pixel_depth(self) -> u8 {
        match self {
            Self::ColorMapped { .. } => 8,
            Self::TrueColor(d) => d.bits(),
            Self::BlackAndWhite(GrayDepth::Bits8) => 8,
            Self::BlackAndWhite(GrayDepth::Bits16) => 16,
        }
    }

    /// Bytes per stored pixel sample.
    pub fn bytes_per_pixel(self) -> usize {
        (usize::from(self.pixel_depth()) + 7) / 8
    }

    /// Alpha bits declared in the descriptor byte.
    pub fn alpha_bits(self) -> u8 {
        match self {
            Self::ColorMapped { entry_bits: 32 } => 8,
            Self::ColorMapped { .. } => 0,
            Self::TrueColor(d) => d.alpha_bits(),
            Self::BlackAndWhite(GrayDepth::Bits8) => 0,
            Self::BlackAndWhite(GrayDepth::Bits16) => 8,
        }
    }

    pub fn image_type(self, compression: Compression) -> ImageType {
        ImageType::from_parts(self.color_model(), compression)
    }
}

/// The ten conversion targets, numbered as on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetMode {
    /// 0: uncompressed, 8-bit color-mapped.
    ColorMapped,
    /// 1: uncompressed, 24-bit or 32-bit true-color.
    TrueColor,
    /// 2: uncompressed, 15-bit or 16-bit true-color.
    HighColor,
    /// 3: uncompressed, 16-bit black-and-white.
    Gray16,
    /// 4: uncompressed, 8-bit black-and-white.
    Gray8,
    /// 5: run-length encoded, 8-bit color-mapped.
    ColorMappedRle,
    /// 6: run-length encoded, 24-bit or 32-bit true-color.
    TrueColorRle,
    /// 7: run-length encoded, 15-bit or 16-bit true-color.
    HighColorRle,
    /// 8: run-length encoded, 16-bit black-and-white.
    Gray16Rle,
    /// 9: run-length encoded, 8-bit black-and-white.
    Gray8Rle,
}

impl TargetMode {
    pub const ALL: [TargetMode; 10] = [
        Self::ColorMapped,
        Self::TrueColor,
        Self::HighColor,
        Self::Gray16,
        Self::Gray8,
        Self::ColorMappedRle,
        Self::TrueColorRle,
        Self::HighColorRle,
        Self::Gray16Rle,
        Self::Gray8Rle,
    ];

    /// Map a selector 0–9 to its mode.
    pub fn from_code(code: u8) -> Result<Self, TgaError> {
        Self::ALL
            .get(usize::from(code))
            .copied()
            .ok_or(TgaError::UnsupportedConversion(code))
    }

    pub fn code(self) -> u8 {
        match self {
            Self::ColorMapped => 0,
            Self::TrueColor => 1,
            Self::HighColor => 2,
            Self::Gray16 => 3,
            Self::Gray8 => 4,
            Self::ColorMappedRle => 5,
            Self::TrueColorRle => 6,
            Self::HighColorRle => 7,
            Self::Gray16Rle => 8,
            Self::Gray8Rle => 9,
        }
    }

    pub fn compression(self) -> Compression {
        if self.code() >= 5 {
            Compression::Rle
        } else {
            Compression::None
        }
    }

    pub fn color_model(self) -> ColorModel {
        match self {
            Self::ColorMapped | Self::ColorMappedRle => ColorModel::ColorMapped,
            Self::TrueColor | Self::TrueColorRle | Self::HighColor | Self::HighColorRle => {
                ColorModel::TrueColor
            }
            Self::Gray16 | Self::Gray16Rle | Self::Gray8 | Self::Gray8Rle => {
                ColorModel::BlackAndWhite
            }
        }
    }

    /// One-line description, as printed in the command-line usage text.
    pub fn description(self) -> &'static str {
        match self {
            Self::ColorMapped => "Uncompressed, 8-bit color-mapped image.",
            Self::TrueColor => "Uncompressed, 24-bit or 32-bit true-color image.",
            Self::HighColor => "Uncompressed, 15-bit or 16-bit true-color image.",
            Self::Gray16 => "Uncompressed, 16-bit black-and-white image.",
            Self::Gray8 => "Uncompressed, 8-bit black-and-white image.",
            Self::ColorMappedRle => "Run-length encoded, 8-bit color-mapped image.",
            Self::TrueColorRle => "Run-length encoded, 24-bit or 32-bit true-color image.",
            Self::HighColorRle => "Run-length encoded, 15-bit or 16-bit true-color image.",
            Self::Gray16Rle => "Run-length encoded, 16-bit black-and-white image.",
            Self::Gray8Rle => "Run-length encoded, 8-bit black-and-white image.",
        }
    }
}

impl TryFrom<u8> for TargetMode {
    type Error = TgaError;

    fn try_from(code: u8) -> Result<Self, TgaError> {
        TargetMode::from_code(code)
    }
}

impl core::fmt::Display for TargetMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} - {}", self.code(), self.description())
    }
}
