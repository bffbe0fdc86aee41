//! PackBits scanline decompression.
//!
//! Each control byte is read as a signed 8-bit value:
//! - `0..=127`: copy the next `n + 1` bytes literally
//! - `-127..=-1`: repeat the next byte `-n + 1` times
//! - `-128`: no-op

use alloc::format;

use crate::error::PsdError;

/// Decode one compressed scanline from `src` into `dst`.
///
/// All of `src` is consumed. Returns the number of bytes written, which may
/// be less than `dst.len()`. Runs that would write past `dst` or read past
/// `src` are rejected.
pub(crate) fn decode_line(src: &[u8], dst: &mut [u8]) -> Result<usize, PsdError> {
    let capacity = dst.len();
    let mut pos = 0;
    let mut out = 0;

    while pos < src.len() {
        let control = src[pos] as i8;
        pos += 1;

        match control {
            -128 => {}
            0..=127 => {
                let count = control as usize + 1;
                let literal = src.get(pos..pos + count).ok_or_else(|| {
                    PsdError::CorruptData(format!(
                        "PackBits literal run of {count} bytes exceeds compressed line"
                    ))
                })?;
                let target = dst
                    .get_mut(out..out + count)
                    .ok_or_else(|| overrun(out + count, capacity))?;
                target.copy_from_slice(literal);
                pos += count;
                out += count;
            }
            -127..=-1 => {
                let count = usize::from(control.unsigned_abs()) + 1;
                let value = *src.get(pos).ok_or_else(|| {
                    PsdError::CorruptData("PackBits replicate run is missing its value byte".into())
                })?;
                let target = dst
                    .get_mut(out..out + count)
                    .ok_or_else(|| overrun(out + count, capacity))?;
                target.fill(value);
                pos += 1;
                out += count;
            }
        }
    }

    Ok(out)
}

fn overrun(needed: usize, capacity: usize) -> PsdError {
    PsdError::CorruptData(format!(
        "PackBits scanline decodes to at least {needed} bytes, expected at most {capacity}"
    ))
}
