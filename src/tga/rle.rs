//! TGA run-length packets.
//!
//! Each packet starts with a header byte. Bit 7 set: a repeat packet, one
//! sample repeated `(h & 0x7F) + 1` times. Bit 7 clear: a raw packet of
//! `(h & 0x7F) + 1` literal samples. Samples are whole pixels.

use alloc::format;
use alloc::vec::Vec;
use enough::Stop;

use crate::error::TgaError;

/// Most pixels one packet can describe.
pub(crate) const MAX_PACKET: usize = 128;

const REPEAT_FLAG: u8 = 0x80;

/// Expand RLE packets from `data` into exactly `pixel_count` samples of
/// `bpp` bytes. Packets may span rows. Returns the samples and the number of
/// input bytes consumed.
pub(crate) fn decode_rle(
    data: &[u8],
    bpp: usize,
    pixel_count: usize,
    row_len: usize,
    stop: &dyn Stop,
) -> Result<(Vec<u8>, usize), TgaError> {
    let total = pixel_count
        .checked_mul(bpp)
        .ok_or_else(|| TgaError::MalformedStream("pixel buffer size overflows".into()))?;
    // Each packet takes at least a header byte plus one sample and yields at
    // most MAX_PACKET pixels.
    let max_from_input = (data.len() / (1 + bpp)).saturating_mul(MAX_PACKET);
    if max_from_input < pixel_count {
        return Err(TgaError::TruncatedData);
    }
    let mut out = Vec::with_capacity(total);
    let mut pos = 0usize;
    let check_every = row_len.max(1).saturating_mul(16);
    let mut next_check = 0usize;

    while out.len() < total {
        let produced = out.len() / bpp;
        if produced >= next_check {
            stop.check()?;
            next_check = produced.saturating_add(check_every);
        }

        let header = *data.get(pos).ok_or(TgaError::TruncatedData)?;
        pos += 1;
        let count = usize::from(header & 0x7F) + 1;
        let remaining = pixel_count - produced;
        if count > remaining {
            return Err(TgaError::MalformedStream(format!(
                "packet of {count} pixels at byte {} overruns image by {}",
                pos - 1,
                count - remaining
            )));
        }

        if header & REPEAT_FLAG != 0 {
            let sample = data.get(pos..pos + bpp).ok_or(TgaError::TruncatedData)?;
            pos += bpp;
            for _ in 0..count {
                out.extend_from_slice(sample);
            }
        } else {
            let len = count * bpp;
            let samples = data.get(pos..pos + len).ok_or(TgaError::TruncatedData)?;
            pos += len;
            out.extend_from_slice(samples);
        }
    }

    Ok((out, pos))
}

/// Append RLE packets for one row of `bpp`-byte samples to `out`.
///
/// Greedy single pass: two or more equal neighbours become a repeat packet,
/// anything else is batched into a raw packet that stops right before the
/// next run. Both packet kinds are capped at [`MAX_PACKET`] pixels.
pub(crate) fn encode_rle_row(row: &[u8], bpp: usize, out: &mut Vec<u8>) {
    let n = row.len() / bpp;
    let px = move |i: usize| &row[i * bpp..(i + 1) * bpp];

    let mut i = 0;
    while i < n {
        let mut run = 1;
        while i + run < n && run < MAX_PACKET && px(i + run) == px(i) {
            run += 1;
        }

        if run >= 2 {
            out.push(REPEAT_FLAG | (run - 1) as u8);
            out.extend_from_slice(px(i));
            i += run;
            continue;
        }

        let start = i;
        while i < n && i - start < MAX_PACKET {
            if i + 1 < n && px(i) == px(i + 1) {
                break;
            }
            i += 1;
        }
        out.push((i - start - 1) as u8);
        out.extend_from_slice(&row[start * bpp..i * bpp]);
    }
}
