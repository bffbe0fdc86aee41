use alloc::string::String;
use enough::StopReason;

use crate::psd::header::ColorMode;

/// Errors from PSD decoding.
///
/// Every error returned by [`crate::PsdDecoder::feed`] is permanent: the
/// session refuses further input afterwards.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PsdError {
    #[error("not a PSD file: expected signature \"8BPS\", found {0:?}")]
    InvalidSignature([u8; 4]),

    #[error("unsupported PSD version {0}, only version 1 is supported")]
    UnsupportedVersion(u16),

    #[error("unsupported color mode {0:?}, supported modes are Grayscale, RGB, CMYK and Duotone")]
    UnsupportedColorMode(ColorMode),

    #[error("unsupported bit depth {0}, supported depths are 8 and 16")]
    UnsupportedBitDepth(u16),

    #[error("unsupported compression type {0}, known types are 0 (raw) and 1 (RLE)")]
    UnsupportedCompression(u16),

    #[error("unsupported channel count {channels} for color mode {mode:?}")]
    UnsupportedChannelCount { channels: u16, mode: ColorMode },

    #[error("image has a zero dimension: {width}x{height} with {channels} channels")]
    ZeroDimensions { width: u32, height: u32, channels: u16 },

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("corrupt image data: {0}")]
    CorruptData(String),

    #[error("load aborted by host during size negotiation")]
    HostAborted,

    #[error("PSD stream ended before all image data was read")]
    Incomplete,

    #[error("failed to allocate {0} bytes")]
    AllocationFailure(usize),

    #[error("decoder already failed and cannot accept more data")]
    Poisoned,

    #[error("operation cancelled")]
    Cancelled(StopReason),
}

impl PsdError {
    /// Whether the stream describes something this decoder does not handle
    /// (color mode, depth, compression, channel layout, signature or version).
    pub fn is_format_unsupported(&self) -> bool {
        matches!(
            self,
            PsdError::InvalidSignature(_)
                | PsdError::UnsupportedVersion(_)
                | PsdError::UnsupportedColorMode(_)
                | PsdError::UnsupportedBitDepth(_)
                | PsdError::UnsupportedCompression(_)
                | PsdError::UnsupportedChannelCount { .. }
                | PsdError::ZeroDimensions { .. }
        )
    }
}

impl From<StopReason> for PsdError {
    fn from(r: StopReason) -> Self {
        PsdError::Cancelled(r)
    }
}
