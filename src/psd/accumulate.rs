//! Chunk-boundary tolerant byte collection.
//!
//! Every fixed-size field of the stream is gathered through [`accumulate`],
//! so a field split across any number of `feed` calls is reassembled
//! without the caller noticing.

use alloc::vec::Vec;

use log::debug;

use crate::error::PsdError;

/// Copy up to `target - *filled` bytes from `input` into `dst[*filled..]`,
/// advancing `input` and `filled`. Returns true once `target` bytes are held.
///
/// `dst` must be at least `target` bytes long.
pub(crate) fn accumulate(
    dst: &mut [u8],
    filled: &mut usize,
    input: &mut &[u8],
    target: usize,
) -> bool {
    debug_assert!(dst.len() >= target);
    debug_assert!(*filled <= target);

    let take = (target - *filled).min(input.len());
    let (head, rest) = input.split_at(take);
    dst[*filled..*filled + take].copy_from_slice(head);
    *filled += take;
    *input = rest;
    *filled == target
}

/// The session's reusable accumulation buffer.
#[derive(Debug, Default)]
pub(crate) struct Accumulator {
    buf: Vec<u8>,
    filled: usize,
}

impl Accumulator {
    /// Grow the buffer so it can hold `target` bytes.
    pub(crate) fn ensure(&mut self, target: usize) -> Result<(), PsdError> {
        if self.buf.len() < target {
            let extra = target - self.buf.len();
            self.buf
                .try_reserve_exact(extra)
                .map_err(|_| PsdError::AllocationFailure(target))?;
            self.buf.resize(target, 0);
        }
        Ok(())
    }

    /// Collect bytes toward `target`. The buffer must already be [`ensure`]d.
    ///
    /// [`ensure`]: Self::ensure
    pub(crate) fn fill(&mut self, input: &mut &[u8], target: usize) -> bool {
        accumulate(&mut self.buf, &mut self.filled, input, target)
    }

    /// The bytes gathered so far.
    pub(crate) fn bytes(&self) -> &[u8] {
        &self.buf[..self.filled]
    }

    pub(crate) fn reset(&mut self) {
        self.filled = 0;
    }

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.buf.len()
    }
}

/// Skips a block made of a 4-byte big-endian length followed by that many
/// payload bytes.
#[derive(Debug, Default)]
pub(crate) struct BlockSkipper {
    prefix: [u8; 4],
    prefix_filled: usize,
    /// Payload bytes still to discard, known once the prefix is complete.
    remaining: Option<u32>,
}

impl BlockSkipper {
    /// Consume as much of the block as `input` holds. Returns true once the
    /// prefix and the whole payload have been consumed; the skipper is then
    /// ready for the next block.
    pub(crate) fn skip(&mut self, input: &mut &[u8]) -> bool {
        let remaining = match self.remaining {
            Some(remaining) => remaining,
            None => {
                if !accumulate(&mut self.prefix, &mut self.prefix_filled, input, 4) {
                    return false;
                }
                let len = u32::from_be_bytes(self.prefix);
                debug!("skipping block of {len} bytes");
                len
            }
        };

        let available = u32::try_from(input.len()).unwrap_or(u32::MAX);
        let take = remaining.min(available);
        *input = &input[take as usize..];

        if take == remaining {
            *self = Self::default();
            true
        } else {
            self.remaining = Some(remaining - take);
            false
        }
    }
}
