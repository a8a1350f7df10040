//! Palette/depth conversion from a [`CanonicalImage`] to the samples of a
//! concrete [`ImageVariant`].
//!
//! Depth choices inside a mode pair (24/32, 15/16) keep the source depth
//! when the source already uses one of the pair (a 16-bit source also keeps
//! its alpha-bit declaration); otherwise the deeper one is
//! picked only if some pixel is not fully opaque. Channel reduction is
//! truncation. Grayscale intensity uses BT.601 weights (see
//! [`crate::pixel`]), so gray sources convert back unchanged.

use alloc::vec::Vec;

use crate::error::TgaError;
use crate::image::CanonicalImage;
use crate::palette::Palette;
use crate::pixel::{Rgba, luma, pack_16};
use crate::variant::{
    ColorModel, Compression, GrayDepth, ImageVariant, TargetMode, TrueColorDepth,
};

/// Alpha at or above this sets the 16-bit attribute bit.
const ATTRIBUTE_THRESHOLD: u8 = 0x80;

/// Canonical pixels packed for one output variant, ready to encode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvertedImage {
    pub width: u32,
    pub height: u32,
    pub x_origin: u16,
    pub y_origin: u16,
    pub variant: ImageVariant,
    pub compression: Compression,
    palette: Vec<Rgba>,
    samples: Vec<u8>,
    quantized: bool,
}

impl ConvertedImage {
    /// Palette entries (empty unless color-mapped).
    pub fn palette(&self) -> &[Rgba] {
        &self.palette
    }

    /// Packed samples, row-major, top row first.
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Whether colors were merged to fit a 256-entry palette.
    pub fn is_quantized(&self) -> bool {
        self.quantized
    }
}

/// Convert `image` for the target `mode` (a [`TargetMode`] or its 0–9 code).
///
/// Fails only with [`TgaError::UnsupportedConversion`] for a code outside
/// 0–9.
pub fn convert<M>(image: &CanonicalImage, mode: M) -> Result<ConvertedImage, TgaError>
where
    M: TryInto<TargetMode>,
    TgaError: From<<M as TryInto<TargetMode>>::Error>,
{
    let mode = mode.try_into()?;
    let (variant, palette, samples, quantized) = match mode.color_model() {
        ColorModel::ColorMapped => to_color_mapped(image),
        ColorModel::TrueColor => {
            let depth = true_color_depth(image, mode);
            let samples = pack_true_color(image, depth);
            (ImageVariant::TrueColor(depth), Vec::new(), samples, false)
        }
        ColorModel::BlackAndWhite => {
            let depth = match mode {
                TargetMode::Gray16 | TargetMode::Gray16Rle => GrayDepth::Bits16,
                _ => GrayDepth::Bits8,
            };
            let samples = pack_gray(image, depth);
            (ImageVariant::BlackAndWhite(depth), Vec::new(), samples, false)
        }
    };

    Ok(ConvertedImage {
        width: image.width,
        height: image.height,
        x_origin: image.x_origin,
        y_origin: image.y_origin,
        variant,
        compression: mode.compression(),
        palette,
        samples,
        quantized,
    })
}

fn to_color_mapped(image: &CanonicalImage) -> (ImageVariant, Vec<Rgba>, Vec<u8>, bool) {
    let palette = match &image.source_palette {
        Some(kept) => Palette::from_parts(kept.colors.clone(), kept.indices.clone()),
        None => Palette::build(image.pixels()),
    };
    let entry_bits = if palette.has_alpha() { 32 } else { 24 };
    let quantized = palette.is_quantized();
    let (colors, indices) = palette.into_parts();
    (ImageVariant::ColorMapped { entry_bits }, colors, indices, quantized)
}

fn true_color_depth(image: &CanonicalImage, mode: TargetMode) -> TrueColorDepth {
    let source = image.source();
    let source_depth = (source.color_model() == Some(ColorModel::TrueColor))
        .then_some(source.pixel_depth);
    let high = matches!(mode, TargetMode::HighColor | TargetMode::HighColorRle);
    match (high, source_depth) {
        (false, Some(24)) => TrueColorDepth::Bits24,
        (false, Some(32)) => TrueColorDepth::Bits32,
        (true, Some(15)) => TrueColorDepth::Bits15,
        (true, Some(16)) if source.alpha_bits > 0 => TrueColorDepth::Bits16,
        (true, Some(16)) => TrueColorDepth::Bits16NoAlpha,
        (false, _) if image.has_alpha() => TrueColorDepth::Bits32,
        (false, _) => TrueColorDepth::Bits24,
        (true, _) if image.has_alpha() => TrueColorDepth::Bits16,
        (true, _) => TrueColorDepth::Bits15,
    }
}

fn pack_true_color(image: &CanonicalImage, depth: TrueColorDepth) -> Vec<u8> {
    let bpp = ImageVariant::TrueColor(depth).bytes_per_pixel();
    let mut out = Vec::with_capacity(image.pixel_count() * bpp);
    for [r, g, b, a] in image.iter_pixels() {
        match depth {
            TrueColorDepth::Bits32 => out.extend_from_slice(&[b, g, r, a]),
            TrueColorDepth::Bits24 => out.extend_from_slice(&[b, g, r]),
            TrueColorDepth::Bits16 => {
                let word = pack_16([r, g, b, a], a >= ATTRIBUTE_THRESHOLD);
                out.extend_from_slice(&word.to_le_bytes());
            }
            TrueColorDepth::Bits15 | TrueColorDepth::Bits16NoAlpha => {
                out.extend_from_slice(&pack_16([r, g, b, a], false).to_le_bytes());
            }
        }
    }
    out
}

fn pack_gray(image: &CanonicalImage, depth: GrayDepth) -> Vec<u8> {
    match depth {
        GrayDepth::Bits8 => image.iter_pixels().map(luma).collect(),
        GrayDepth::Bits16 => image
            .iter_pixels()
            .flat_map(|px| [luma(px), px[3]])
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(w: u32, h: u32, px: &[Rgba]) -> CanonicalImage {
        CanonicalImage::from_rgba(w, h, px.iter().flatten().copied().collect()).unwrap()
    }

    #[test]
    fn invalid_code_rejected() {
        let img = image(1, 1, &[[1, 2, 3, 255]]);
        assert!(matches!(
            convert(&img, 10u8),
            Err(TgaError::UnsupportedConversion(10))
        ));
        assert!(convert(&img, 9u8).is_ok());
    }

    #[test]
    fn every_mode_succeeds() {
        let img = image(2, 1, &[[1, 2, 3, 4], [200, 100, 50, 255]]);
        for mode in TargetMode::ALL {
            let out = convert(&img, mode).unwrap();
            assert_eq!(out.compression, mode.compression());
            assert_eq!(out.variant.color_model(), mode.color_model());
            assert_eq!(out.samples().len(), 2 * out.variant.bytes_per_pixel());
        }
    }

    #[test]
    fn true_color_depth_follows_alpha() {
        let opaque = image(1, 1, &[[1, 2, 3, 255]]);
        let out = convert(&opaque, TargetMode::TrueColor).unwrap();
        // from_rgba images are attributed a 32-bit source.
        assert_eq!(out.variant, ImageVariant::TrueColor(TrueColorDepth::Bits32));
        let out = convert(&opaque, TargetMode::HighColor).unwrap();
        assert_eq!(out.variant, ImageVariant::TrueColor(TrueColorDepth::Bits15));

        let translucent = image(1, 1, &[[1, 2, 3, 4]]);
        let out = convert(&translucent, TargetMode::HighColorRle).unwrap();
        assert_eq!(out.variant, ImageVariant::TrueColor(TrueColorDepth::Bits16));
        assert_eq!(out.samples(), &[0x00, 0x00]);
    }

    #[test]
    fn sixteen_bit_source_keeps_alpha_declaration() {
        let file = |descriptor: u8| {
            let mut b = alloc::vec![0u8, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 1, 0, 16];
            b.push(descriptor);
            b.extend_from_slice(&0x7C00u16.to_le_bytes());
            b
        };
        let plain = crate::decode(&file(0), enough::Unstoppable).unwrap();
        let out = convert(&plain, TargetMode::HighColor).unwrap();
        assert_eq!(out.variant, ImageVariant::TrueColor(TrueColorDepth::Bits16NoAlpha));
        assert_eq!(out.variant.alpha_bits(), 0);
        assert_eq!(out.samples(), &[0x00, 0x7C]);

        let with_alpha = crate::decode(&file(1), enough::Unstoppable).unwrap();
        let out = convert(&with_alpha, TargetMode::HighColor).unwrap();
        assert_eq!(out.variant, ImageVariant::TrueColor(TrueColorDepth::Bits16));
        // Attribute clear means transparent.
        assert_eq!(out.samples(), &[0x00, 0x7C]);
    }

    #[test]
    fn sixteen_bit_truncates() {
        let img = image(1, 1, &[[0xFF, 0x87, 0x0F, 0x00]]);
        let out = convert(&img, TargetMode::HighColor).unwrap();
        let word = u16::from_le_bytes([out.samples()[0], out.samples()[1]]);
        assert_eq!(word, (31 << 10) | (16 << 5) | 1);
    }

    #[test]
    fn gray_modes() {
        let img = image(1, 1, &[[255, 0, 0, 10]]);
        let g8 = convert(&img, TargetMode::Gray8).unwrap();
        assert_eq!(g8.samples(), &[76]);
        let g16 = convert(&img, TargetMode::Gray16).unwrap();
        assert_eq!(g16.samples(), &[76, 10]);
    }

    #[test]
    fn color_mapped_entry_depth() {
        let opaque = image(2, 1, &[[255, 0, 0, 255], [255, 0, 0, 255]]);
        let out = convert(&opaque, TargetMode::ColorMappedRle).unwrap();
        assert_eq!(out.variant, ImageVariant::ColorMapped { entry_bits: 24 });
        assert_eq!(out.palette(), &[[255, 0, 0, 255]]);
        assert_eq!(out.samples(), &[0, 0]);

        let translucent = image(1, 1, &[[1, 1, 1, 1]]);
        let out = convert(&translucent, TargetMode::ColorMapped).unwrap();
        assert_eq!(out.variant, ImageVariant::ColorMapped { entry_bits: 32 });
    }

    #[test]
    fn too_many_colors_quantized() {
        let px: Vec<Rgba> = (0..300u32).map(|i| [i as u8, (i >> 8) as u8, 0, 255]).collect();
        let img = image(300, 1, &px);
        let out = convert(&img, TargetMode::ColorMapped).unwrap();
        assert!(out.is_quantized());
        assert!(out.palette().len() <= 256);
        assert_eq!(out.samples().len(), 300);
        assert_eq!((out.width, out.height), (300, 1));
    }
}
