//! Photoshop PSD format internals.
//!
//! Only the merged composite image is read. The color mode data, image
//! resources and layer/mask blocks are skipped without interpretation.
//!
//! Credits: header handling and color mode naming follow
//! [zune-psd](https://github.com/etemesi254/zune-image) by Caleb Etemesi
//! (MIT/Apache-2.0/Zlib licensed).

pub(crate) mod accumulate;
pub(crate) mod compose;
pub mod header;
pub(crate) mod packbits;
mod session;

pub use header::{BitDepth, ColorMode, ColorModel, Compression, Header};
pub use session::{LoadObserver, Phase, PsdDecoder};

use crate::decode::DecodeOutput;
use crate::error::PsdError;
use crate::limits::Limits;
use enough::Stop;

/// Decode a complete PSD held in memory.
pub(crate) fn decode(
    data: &[u8],
    limits: Option<&Limits>,
    row_alignment: usize,
    stop: &dyn Stop,
) -> Result<DecodeOutput, PsdError> {
    let mut decoder = PsdDecoder::new().with_row_alignment(row_alignment);
    if let Some(limits) = limits {
        decoder = decoder.with_limits(limits.clone());
    }
    decoder.feed_with_stop(data, stop)?;
    decoder.finish()
}
