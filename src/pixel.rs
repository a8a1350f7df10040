//! Per-pixel channel packing shared by the decoder, converter and encoder.
//!
//! Canonical pixels are `[r, g, b, a]` at 8 bits per channel. TGA stores
//! true-color samples little-endian in B, G, R(, A) order and 15/16-bit
//! samples as `ARRRRRGG GGGBBBBB`.

/// One canonical pixel: R, G, B, A at 8 bits each.
pub type Rgba = [u8; 4];

pub(crate) const OPAQUE: u8 = 0xFF;

/// Expand a 5-bit channel to 8 bits by replicating its top bits.
///
/// Truncating the result back to 5 bits recovers the input exactly.
#[inline]
pub(crate) fn expand5(v: u16) -> u8 {
    let v = (v & 0x1F) as u8;
    (v << 3) | (v >> 2)
}

/// Unpack a 15/16-bit sample. `attribute_alpha` selects whether the top bit
/// carries alpha; when it doesn't, the pixel is opaque.
#[inline]
pub(crate) fn unpack_16(word: u16, attribute_alpha: bool) -> Rgba {
    let a = if attribute_alpha && word & 0x8000 == 0 {
        0
    } else {
        OPAQUE
    };
    [expand5(word >> 10), expand5(word >> 5), expand5(word), a]
}

/// Pack to 5-5-5 by truncation, optionally setting the attribute bit.
#[inline]
pub(crate) fn pack_16(px: Rgba, attribute: bool) -> u16 {
    let r = u16::from(px[0] >> 3);
    let g = u16::from(px[1] >> 3);
    let b = u16::from(px[2] >> 3);
    let mut word = (r << 10) | (g << 5) | b;
    if attribute {
        word |= 0x8000;
    }
    word
}

/// Intensity of an RGB triple (ITU-R BT.601 weights, rounded).
///
/// Exact for gray input: `luma(v, v, v) == v`.
#[inline]
pub(crate) fn luma(px: Rgba) -> u8 {
    let r = u32::from(px[0]);
    let g = u32::from(px[1]);
    let b = u32::from(px[2]);
    ((r * 299 + g * 587 + b * 114 + 500) / 1000) as u8
}

/// Read a little-endian 16-bit value from the first two bytes of `s`.
#[inline]
pub(crate) fn le16(s: &[u8]) -> u16 {
    u16::from_le_bytes([s[0], s[1]])
}
