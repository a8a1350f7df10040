//! TGA encoder: header, optional palette, plain or RLE pixel rows.
//!
//! Output always has an empty id field, bottom-left origin, and no
//! extension area or footer.

use alloc::vec::Vec;

use enough::Stop;

use super::{ColorMapSpec, ImageType, TgaHeader, rle};
use crate::convert::ConvertedImage;
use crate::error::TgaError;
use crate::variant::{Compression, ImageVariant};

/// Encode a converted image to TGA bytes.
pub(crate) fn encode_tga(image: &ConvertedImage, stop: &dyn Stop) -> Result<Vec<u8>, TgaError> {
    if image.is_empty() {
        return Ok(encode_no_image(image));
    }

    let too_large = |_| TgaError::DimensionsTooLarge {
        width: image.width,
        height: image.height,
    };
    let width = u16::try_from(image.width).map_err(too_large)?;
    let height = u16::try_from(image.height).map_err(too_large)?;

    let variant = image.variant;
    let bpp = variant.bytes_per_pixel();
    let w = usize::from(width);
    let h = usize::from(height);
    let expected = w * h * bpp;
    if image.samples().len() != expected {
        return Err(TgaError::MalformedStream(alloc::format!(
            "{} sample bytes for a {}x{} image at {} bytes per pixel",
            image.samples().len(),
            width,
            height,
            bpp
        )));
    }

    let color_map = match variant {
        ImageVariant::ColorMapped { entry_bits } => {
            let length = u16::try_from(image.palette().len()).map_err(|_| {
                TgaError::MalformedStream("palette exceeds 65535 entries".into())
            })?;
            Some(ColorMapSpec {
                first_entry: 0,
                length,
                entry_bits,
            })
        }
        _ => None,
    };

    let header = TgaHeader {
        id_length: 0,
        has_color_map: color_map.is_some(),
        image_type: variant.image_type(image.compression),
        color_map: color_map.unwrap_or_default(),
        x_origin: image.x_origin,
        y_origin: image.y_origin,
        width,
        height,
        pixel_depth: variant.pixel_depth(),
        descriptor: TgaHeader::bottom_left_descriptor(variant.alpha_bits()),
    };

    let palette_bytes = color_map.map_or(0, |c| c.entry_bytes() * image.palette().len());
    let mut out = Vec::with_capacity(TgaHeader::SIZE + palette_bytes + expected);
    header.write(&mut out);
    stop.check()?;

    if let Some(spec) = color_map {
        for &[r, g, b, a] in image.palette() {
            if spec.entry_bits == 32 {
                out.extend_from_slice(&[b, g, r, a]);
            } else {
                out.extend_from_slice(&[b, g, r]);
            }
        }
    }

    // Canonical rows are top-first; bottom-left output stores the last row first.
    for (i, row) in image.samples().chunks_exact(w * bpp).rev().enumerate() {
        if i % 16 == 0 {
            stop.check()?;
        }
        match image.compression {
            Compression::None => out.extend_from_slice(row),
            Compression::Rle => rle::encode_rle_row(row, bpp, &mut out),
        }
    }

    Ok(out)
}

fn encode_no_image(image: &ConvertedImage) -> Vec<u8> {
    let header = TgaHeader {
        id_length: 0,
        has_color_map: false,
        image_type: ImageType::NoImage,
        color_map: ColorMapSpec::default(),
        x_origin: image.x_origin,
        y_origin: image.y_origin,
        width: 0,
        height: 0,
        pixel_depth: 0,
        descriptor: 0,
    };
    let mut out = Vec::with_capacity(TgaHeader::SIZE);
    header.write(&mut out);
    out
}
