//! # zentga
//!
//! Truevision TGA decoder, converter and encoder.
//!
//! Any valid TGA file decodes to a [`CanonicalImage`]: RGBA8, top-left
//! origin, whatever the file's color model, depth, compression or origin
//! corner. [`convert`] turns that into one of the ten target variants and
//! [`encode`] writes the exact on-disk bytes.
//!
//! ## Target modes
//!
//! | code | variant |
//! |------|---------|
//! | 0 | uncompressed, 8-bit color-mapped |
//! | 1 | uncompressed, 24/32-bit true-color |
//! | 2 | uncompressed, 15/16-bit true-color |
//! | 3 | uncompressed, 16-bit black-and-white |
//! | 4 | uncompressed, 8-bit black-and-white |
//! | 5–9 | run-length encoded versions of 0–4 |
//!
//! ## Conversion policy
//!
//! - Color-mapped output keeps up to 256 distinct colors exactly, in
//!   first-seen order. More colors are merged by 3-3-2 RGB buckets, each
//!   bucket's mean becoming one entry. Deterministic for identical input.
//! - Depth reduction truncates channels (8 → 5 bits).
//! - Grayscale intensity uses BT.601 weights; alpha survives only at 16 bits.
//! - Output has no id field, bottom-left origin, and RLE packets that never
//!   cross a row.
//!
//! ## Non-Goals
//!
//! - Streaming decode
//! - Extension/developer areas (ignored on decode, never written)
//! - Resizing or filtering
//!
//! ## Usage
//!
//! ```no_run
//! use zentga::{TargetMode, Unstoppable};
//!
//! let data: &[u8] = &[]; // your TGA bytes
//!
//! let image = zentga::decode(data, Unstoppable)?;
//! println!("{}x{} from {:?}", image.width, image.height, image.source().image_type);
//!
//! let converted = zentga::convert(&image, TargetMode::ColorMappedRle)?;
//! let bytes = zentga::encode(&converted, Unstoppable)?;
//!
//! // Or in one step, with the numeric mode selector:
//! let same = zentga::transcode(data, 5, Unstoppable)?;
//! assert_eq!(bytes, same);
//! # Ok::<(), zentga::TgaError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod convert;
mod error;
mod image;
mod limits;
mod palette;
mod pixel;
mod tga;
mod variant;

#[cfg(feature = "batch")]
pub mod batch;

use alloc::vec::Vec;

// Re-exports
pub use convert::{ConvertedImage, convert};
pub use enough::{Stop, Unstoppable};
pub use error::TgaError;
pub use image::{CanonicalImage, SourceFormat};
pub use limits::Limits;
pub use palette::{MAX_COLORS, Palette};
pub use pixel::Rgba;
pub use tga::{ColorMapSpec, ImageType, TgaHeader};
pub use variant::{ColorModel, Compression, GrayDepth, ImageVariant, TargetMode, TrueColorDepth};

/// Decode a TGA file to canonical RGBA8.
pub fn decode(data: &[u8], stop: impl Stop) -> Result<CanonicalImage, TgaError> {
    tga::decode::decode_tga(data, None, &stop)
}

/// Decode a TGA file, rejecting images that exceed `limits`.
pub fn decode_with_limits(
    data: &[u8],
    limits: &Limits,
    stop: impl Stop,
) -> Result<CanonicalImage, TgaError> {
    tga::decode::decode_tga(data, Some(limits), &stop)
}

/// Parse and validate the header without decoding pixels.
pub fn probe(data: &[u8]) -> Result<TgaHeader, TgaError> {
    TgaHeader::parse(data)
}

/// Encode a converted image to TGA bytes.
pub fn encode(image: &ConvertedImage, stop: impl Stop) -> Result<Vec<u8>, TgaError> {
    tga::encode::encode_tga(image, &stop)
}

/// Decode, convert to mode `mode_code` (0–9) and re-encode.
///
/// The mode is validated before any decoding work.
pub fn transcode(data: &[u8], mode_code: u8, stop: impl Stop) -> Result<Vec<u8>, TgaError> {
    let mode = TargetMode::from_code(mode_code)?;
    let image = tga::decode::decode_tga(data, None, &stop)?;
    let converted = convert(&image, mode)?;
    tga::encode::encode_tga(&converted, &stop)
}
