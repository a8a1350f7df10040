//! Palette construction for color-mapped output.
//!
//! Up to 256 distinct colors map losslessly, in first-seen order. Past that,
//! colors are bucketed by the top 3-3-2 bits of R, G, B (at most 256
//! buckets); each occupied bucket becomes one palette entry holding the
//! rounded mean of its members, again in first-seen order. Both paths use
//! ordered maps only, so identical input gives identical palettes.
//!
//! Buckets ignore alpha but the mean includes it: opaque and transparent
//! pixels sharing a bucket merge into one partly transparent entry, which
//! makes the palette (and the written color map) 32-bit.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::pixel::{OPAQUE, Rgba};

/// Most entries addressable by an 8-bit index.
pub const MAX_COLORS: usize = 256;

/// A palette plus one index per pixel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgba>,
    indices: Vec<u8>,
    quantized: bool,
}

impl Palette {
    /// Build a palette for RGBA8 `pixels`.
    pub fn build(pixels: &[u8]) -> Self {
        exact(pixels).unwrap_or_else(|| quantize(pixels))
    }

    pub(crate) fn from_parts(colors: Vec<Rgba>, indices: Vec<u8>) -> Self {
        Self {
            colors,
            indices,
            quantized: false,
        }
    }

    pub fn colors(&self) -> &[Rgba] {
        &self.colors
    }

    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Whether colors were merged to fit 256 entries.
    pub fn is_quantized(&self) -> bool {
        self.quantized
    }

    /// Whether any entry is not fully opaque.
    pub fn has_alpha(&self) -> bool {
        self.colors.iter().any(|c| c[3] != OPAQUE)
    }

    pub(crate) fn into_parts(self) -> (Vec<Rgba>, Vec<u8>) {
        (self.colors, self.indices)
    }
}

/// Lossless palette, or `None` once a 257th distinct color shows up.
fn exact(pixels: &[u8]) -> Option<Palette> {
    let mut lookup: BTreeMap<Rgba, u8> = BTreeMap::new();
    let mut colors = Vec::new();
    let mut indices = Vec::with_capacity(pixels.len() / 4);

    for p in pixels.chunks_exact(4) {
        let color = [p[0], p[1], p[2], p[3]];
        let index = match lookup.get(&color) {
            Some(&i) => i,
            None => {
                if colors.len() == MAX_COLORS {
                    return None;
                }
                let i = colors.len() as u8;
                colors.push(color);
                lookup.insert(color, i);
                i
            }
        };
        indices.push(index);
    }

    Some(Palette {
        colors,
        indices,
        quantized: false,
    })
}

/// 3 bits red, 3 bits green, 2 bits blue.
#[inline]
fn bucket(color: Rgba) -> u8 {
    (color[0] & 0xE0) | ((color[1] & 0xE0) >> 3) | (color[2] >> 6)
}

#[derive(Default)]
struct Accumulator {
    sum: [u64; 4],
    count: u64,
}

fn quantize(pixels: &[u8]) -> Palette {
    let mut slots: BTreeMap<u8, u8> = BTreeMap::new();
    let mut acc: Vec<Accumulator> = Vec::new();
    let mut indices = Vec::with_capacity(pixels.len() / 4);

    for p in pixels.chunks_exact(4) {
        let color = [p[0], p[1], p[2], p[3]];
        let slot = *slots.entry(bucket(color)).or_insert_with(|| {
            acc.push(Accumulator::default());
            (acc.len() - 1) as u8
        });
        let a = &mut acc[usize::from(slot)];
        for (s, &c) in a.sum.iter_mut().zip(color.iter()) {
            *s += u64::from(c);
        }
        a.count += 1;
        indices.push(slot);
    }

    let colors = acc
        .iter()
        .map(|a| a.sum.map(|s| ((s + a.count / 2) / a.count) as u8))
        .collect();

    Palette {
        colors,
        indices,
        quantized: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn rgba(colors: &[Rgba]) -> Vec<u8> {
        colors.iter().flatten().copied().collect()
    }

    /// `n` distinct opaque colors, spread over all channels.
    fn distinct(n: usize) -> Vec<u8> {
        (0..n)
            .flat_map(|i| [(i % 256) as u8, (i / 256) as u8, (i * 7 % 256) as u8, 255])
            .collect()
    }

    #[test]
    fn first_seen_order() {
        let px = rgba(&[[9, 9, 9, 255], [1, 1, 1, 255], [9, 9, 9, 255], [5, 5, 5, 0]]);
        let pal = Palette::build(&px);
        assert_eq!(pal.colors(), &[[9, 9, 9, 255], [1, 1, 1, 255], [5, 5, 5, 0]]);
        assert_eq!(pal.indices(), &[0, 1, 0, 2]);
        assert!(!pal.is_quantized());
        assert!(pal.has_alpha());
    }

    #[test]
    fn exactly_256_is_lossless() {
        let px = distinct(256);
        let pal = Palette::build(&px);
        assert_eq!(pal.len(), 256);
        assert!(!pal.is_quantized());
        for (i, &idx) in pal.indices().iter().enumerate() {
            assert_eq!(&pal.colors()[usize::from(idx)][..], &px[i * 4..i * 4 + 4]);
        }
    }

    #[test]
    fn over_256_is_quantized() {
        let px = distinct(257);
        let pal = Palette::build(&px);
        assert!(pal.is_quantized());
        assert!(pal.len() <= MAX_COLORS);
        assert_eq!(pal.indices().len(), 257);
        assert!(pal.indices().iter().all(|&i| usize::from(i) < pal.len()));
    }

    #[test]
    fn quantization_is_deterministic() {
        let px: Vec<u8> = (0..4096u32)
            .flat_map(|i| {
                let v = i.wrapping_mul(2_654_435_761);
                [v as u8, (v >> 8) as u8, (v >> 16) as u8, 255]
            })
            .collect();
        let a = Palette::build(&px);
        let b = Palette::build(&px);
        assert!(a.is_quantized());
        assert_eq!(a, b);
    }

    #[test]
    fn bucket_mean_is_rounded() {
        // Both colors land in bucket 0; 300 filler colors force quantizing.
        let mut colors = vec![[0u8, 0, 0, 255], [3, 2, 1, 255]];
        for i in 0..300u32 {
            colors.push([64 + (i % 190) as u8, 64 + (i / 190) as u8, 64, 255]);
        }
        let pal = Palette::build(&rgba(&colors));
        assert!(pal.is_quantized());
        assert_eq!(pal.colors()[0], [2, 1, 1, 255]);
        assert_eq!(pal.indices()[0], pal.indices()[1]);
    }

    #[test]
    fn quantized_bucket_averages_alpha() {
        // 300 distinct opaque colors plus one transparent pixel that lands in
        // the bucket of the first color.
        let mut px: Vec<u8> = (0..300u32)
            .flat_map(|i| [(i % 256) as u8, (i / 256) as u8 * 40, 0, 255])
            .collect();
        px.extend_from_slice(&[1, 0, 0, 0]);
        let palette = Palette::build(&px);
        assert!(palette.is_quantized());
        assert!(palette.has_alpha());
        let last = usize::from(*palette.indices().last().unwrap());
        let merged = palette.colors()[last];
        assert!(merged[3] > 0 && merged[3] < 255);
    }
}
