//! TGA decoder: header, color map, plain or RLE pixel data, to canonical
//! top-left RGBA8.

use alloc::borrow::Cow;
use alloc::vec;
use alloc::vec::Vec;

use enough::Stop;

use super::{TgaHeader, rle};
use crate::error::TgaError;
use crate::image::{CanonicalImage, SourceFormat, SourcePalette};
use crate::limits::Limits;
use crate::pixel::{OPAQUE, Rgba, le16, unpack_16};
use crate::variant::{ColorModel, Compression};

/// Largest color map whose entries still fit 8-bit indices.
const MAX_KEPT_PALETTE: usize = 256;

pub(crate) fn source_format(header: &TgaHeader) -> SourceFormat {
    SourceFormat {
        image_type: header.image_type,
        pixel_depth: header.pixel_depth,
        alpha_bits: header.alpha_bits(),
        color_map: header.has_color_map.then_some(header.color_map),
        top_to_bottom: header.top_to_bottom(),
        right_to_left: header.right_to_left(),
    }
}

/// Decode a complete TGA file.
pub(crate) fn decode_tga(
    data: &[u8],
    limits: Option<&Limits>,
    stop: &dyn Stop,
) -> Result<CanonicalImage, TgaError> {
    if let Some(limits) = limits {
        limits.check_input(data.len())?;
    }
    let header = TgaHeader::parse(data)?;
    let source = source_format(&header);

    let Some(model) = header.image_type.color_model() else {
        return Ok(CanonicalImage::empty(source));
    };

    let width = u32::from(header.width);
    let height = u32::from(header.height);
    if let Some(limits) = limits {
        limits.check_image(width, height)?;
    }
    stop.check()?;

    // The id field is skipped without interpretation.
    let map_start = header.color_map_offset();
    let map_end = map_start + header.color_map_size();
    let map_bytes = data.get(map_start..map_end).ok_or(TgaError::TruncatedData)?;
    let palette = if model == ColorModel::ColorMapped {
        read_color_map(map_bytes, &header)
    } else {
        Vec::new()
    };

    let w = usize::from(header.width);
    let h = usize::from(header.height);
    let pixel_count = w * h;
    let bpp = header.bytes_per_pixel();
    let pixel_data = &data[map_end..];

    let samples: Cow<'_, [u8]> = match header.image_type.compression() {
        Compression::None => {
            let len = pixel_count
                .checked_mul(bpp)
                .ok_or(TgaError::DimensionsTooLarge { width, height })?;
            Cow::Borrowed(pixel_data.get(..len).ok_or(TgaError::TruncatedData)?)
        }
        Compression::Rle => {
            let (samples, _) = rle::decode_rle(pixel_data, bpp, pixel_count, w, stop)?;
            Cow::Owned(samples)
        }
    };

    let layout = RowLayout {
        width: w,
        height: h,
        top_to_bottom: header.top_to_bottom(),
        right_to_left: header.right_to_left(),
    };
    let mut pixels = vec![0u8; pixel_count * 4];

    let mut image = match model {
        ColorModel::ColorMapped => {
            let first_entry = u32::from(header.color_map.first_entry);
            let keep = palette.len() <= MAX_KEPT_PALETTE;
            let mut indices = if keep { vec![0u8; pixel_count] } else { Vec::new() };
            for (stored_row, row) in samples.chunks_exact(w * bpp).enumerate() {
                if stored_row % 16 == 0 {
                    stop.check()?;
                }
                for (stored_col, s) in row.chunks_exact(bpp).enumerate() {
                    let index = if bpp == 1 {
                        u32::from(s[0])
                    } else {
                        u32::from(le16(s))
                    };
                    let entry = index
                        .checked_sub(first_entry)
                        .filter(|&e| (e as usize) < palette.len())
                        .ok_or(TgaError::PaletteIndexOutOfRange {
                            index,
                            len: palette.len() as u32,
                        })? as usize;
                    let dst = layout.dest(stored_row, stored_col);
                    pixels[dst * 4..dst * 4 + 4].copy_from_slice(&palette[entry]);
                    if keep {
                        indices[dst] = entry as u8;
                    }
                }
            }
            let mut image = CanonicalImage::new(width, height, pixels, source);
            if keep {
                image.source_palette = Some(SourcePalette {
                    colors: palette,
                    indices,
                });
            }
            image
        }
        ColorModel::TrueColor | ColorModel::BlackAndWhite => {
            let unpack = sample_unpacker(&header, model);
            for (stored_row, row) in samples.chunks_exact(w * bpp).enumerate() {
                if stored_row % 16 == 0 {
                    stop.check()?;
                }
                for (stored_col, s) in row.chunks_exact(bpp).enumerate() {
                    let dst = layout.dest(stored_row, stored_col);
                    pixels[dst * 4..dst * 4 + 4].copy_from_slice(&unpack(s));
                }
            }
            CanonicalImage::new(width, height, pixels, source)
        }
    };

    image.x_origin = header.x_origin;
    image.y_origin = header.y_origin;
    Ok(image)
}

/// Maps stored (row, column) to the top-left canonical pixel index.
struct RowLayout {
    width: usize,
    height: usize,
    top_to_bottom: bool,
    right_to_left: bool,
}

impl RowLayout {
    #[inline]
    fn dest(&self, stored_row: usize, stored_col: usize) -> usize {
        let y = if self.top_to_bottom {
            stored_row
        } else {
            self.height - 1 - stored_row
        };
        let x = if self.right_to_left {
            self.width - 1 - stored_col
        } else {
            stored_col
        };
        y * self.width + x
    }
}

/// Expand stored color map entries to RGBA8.
fn read_color_map(map: &[u8], header: &TgaHeader) -> Vec<Rgba> {
    let entry_bytes = header.color_map.entry_bytes();
    let attribute_alpha = header.color_map.entry_bits == 16 && header.alpha_bits() > 0;
    map.chunks_exact(entry_bytes)
        .map(|e| match header.color_map.entry_bits {
            15 | 16 => unpack_16(le16(e), attribute_alpha),
            24 => [e[2], e[1], e[0], OPAQUE],
            _ => [e[2], e[1], e[0], e[3]],
        })
        .collect()
}

/// Pick the sample-to-RGBA conversion for a true-color or grayscale image.
fn sample_unpacker(header: &TgaHeader, model: ColorModel) -> fn(&[u8]) -> Rgba {
    match (model, header.pixel_depth) {
        (ColorModel::TrueColor, 15) => |s| unpack_16(le16(s), false),
        (ColorModel::TrueColor, 16) if header.alpha_bits() > 0 => |s| unpack_16(le16(s), true),
        (ColorModel::TrueColor, 16) => |s| unpack_16(le16(s), false),
        (ColorModel::TrueColor, 24) => |s| [s[2], s[1], s[0], OPAQUE],
        (ColorModel::TrueColor, _) => |s| [s[2], s[1], s[0], s[3]],
        (_, 16) => |s| [s[0], s[0], s[0], s[1]],
        _ => |s| [s[0], s[0], s[0], OPAQUE],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enough::Unstoppable;

    fn header(image_type: u8, w: u16, h: u16, depth: u8, descriptor: u8) -> Vec<u8> {
        let mut b = vec![0u8; TgaHeader::SIZE];
        b[2] = image_type;
        b[12..14].copy_from_slice(&w.to_le_bytes());
        b[14..16].copy_from_slice(&h.to_le_bytes());
        b[16] = depth;
        b[17] = descriptor;
        b
    }

    #[test]
    fn bottom_left_rows_are_flipped() {
        let mut data = header(3, 1, 3, 8, 0);
        data.extend_from_slice(&[10, 20, 30]);
        let img = decode_tga(&data, None, &Unstoppable).unwrap();
        assert_eq!(img.pixel(0, 0), Some([30, 30, 30, 255]));
        assert_eq!(img.pixel(0, 2), Some([10, 10, 10, 255]));
    }

    #[test]
    fn right_to_left_columns_are_flipped() {
        let mut data = header(3, 3, 1, 8, 0x30);
        data.extend_from_slice(&[1, 2, 3]);
        let img = decode_tga(&data, None, &Unstoppable).unwrap();
        assert_eq!(img.pixels(), &[3, 3, 3, 255, 2, 2, 2, 255, 1, 1, 1, 255]);
    }

    #[test]
    fn id_field_is_skipped() {
        let mut data = header(2, 1, 1, 24, 0x20);
        data[0] = 4;
        data.extend_from_slice(b"abcd");
        data.extend_from_slice(&[1, 2, 3]);
        let img = decode_tga(&data, None, &Unstoppable).unwrap();
        assert_eq!(img.pixels(), &[3, 2, 1, 255]);
    }

    #[test]
    fn sixteen_bit_alpha_follows_descriptor() {
        // Attribute bit clear, red = 31.
        let word = (31u16 << 10).to_le_bytes();
        let mut opaque = header(2, 1, 1, 16, 0x20);
        opaque.extend_from_slice(&word);
        let img = decode_tga(&opaque, None, &Unstoppable).unwrap();
        assert_eq!(img.pixels(), &[255, 0, 0, 255]);

        let mut with_alpha = header(2, 1, 1, 16, 0x21);
        with_alpha.extend_from_slice(&word);
        let img = decode_tga(&with_alpha, None, &Unstoppable).unwrap();
        assert_eq!(img.pixels(), &[255, 0, 0, 0]);
    }

    #[test]
    fn gray16_carries_alpha() {
        let mut data = header(3, 2, 1, 16, 0x28);
        data.extend_from_slice(&[100, 50, 200, 255]);
        let img = decode_tga(&data, None, &Unstoppable).unwrap();
        assert_eq!(img.pixels(), &[100, 100, 100, 50, 200, 200, 200, 255]);
    }

    #[test]
    fn color_map_with_first_entry_offset() {
        let mut data = header(1, 2, 1, 8, 0x20);
        data[1] = 1;
        data[3] = 10; // first entry
        data[5] = 2; // length
        data[7] = 24;
        data.extend_from_slice(&[0, 0, 255, 255, 0, 0]); // red, blue (BGR)
        data.extend_from_slice(&[11, 10]);
        let img = decode_tga(&data, None, &Unstoppable).unwrap();
        assert_eq!(img.pixels(), &[0, 0, 255, 255, 255, 0, 0, 255]);
        let kept = img.source_palette.as_ref().unwrap();
        assert_eq!(kept.indices, vec![1, 0]);
    }

    #[test]
    fn palette_index_out_of_range() {
        let mut data = header(1, 1, 1, 8, 0);
        data[1] = 1;
        data[5] = 1;
        data[7] = 32;
        data.extend_from_slice(&[1, 2, 3, 4]);
        data.push(1);
        assert!(matches!(
            decode_tga(&data, None, &Unstoppable),
            Err(TgaError::PaletteIndexOutOfRange { index: 1, len: 1 })
        ));
    }

    #[test]
    fn truncated_pixels() {
        let mut data = header(2, 2, 2, 24, 0);
        data.extend_from_slice(&[0; 11]);
        assert!(matches!(
            decode_tga(&data, None, &Unstoppable),
            Err(TgaError::TruncatedData)
        ));
    }

    #[test]
    fn truncated_color_map() {
        let mut data = header(1, 1, 1, 8, 0);
        data[1] = 1;
        data[5] = 4;
        data[7] = 24;
        data.extend_from_slice(&[0; 5]);
        assert!(matches!(
            decode_tga(&data, None, &Unstoppable),
            Err(TgaError::TruncatedData)
        ));
    }

    #[test]
    fn rle_true_color() {
        let mut data = header(10, 3, 1, 24, 0x20);
        data.extend_from_slice(&[0x81, 1, 2, 3, 0x00, 4, 5, 6]);
        let img = decode_tga(&data, None, &Unstoppable).unwrap();
        assert_eq!(
            img.pixels(),
            &[3, 2, 1, 255, 3, 2, 1, 255, 6, 5, 4, 255]
        );
    }

    #[test]
    fn no_image_data_is_empty() {
        let data = header(0, 0, 0, 0, 0);
        let img = decode_tga(&data, None, &Unstoppable).unwrap();
        assert!(img.is_empty());
        assert_eq!((img.width, img.height), (0, 0));
    }

    #[test]
    fn limits_checked_before_allocation() {
        let data = header(2, 1000, 1000, 24, 0);
        let limits = Limits {
            max_pixels: Some(10),
            ..Default::default()
        };
        assert!(matches!(
            decode_tga(&data, Some(&limits), &Unstoppable),
            Err(TgaError::LimitExceeded(_))
        ));
    }
}
