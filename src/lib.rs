//! # zenpsd
//!
//! Incremental Adobe Photoshop (PSD) decoder producing 8-bit RGB pixels.
//!
//! ## Streaming
//!
//! [`PsdDecoder`] accepts the file in chunks of any size, from single bytes
//! to the whole file, and produces identical output regardless of where
//! the chunk boundaries fall. Host callbacks ([`LoadObserver`]) are told
//! the image size before allocation (and may veto the load), when the
//! output canvas exists, and when its pixels are ready.
//!
//! ## Supported Images
//!
//! - Color modes: Grayscale, Duotone (rendered as grayscale), RGB, CMYK
//! - 8 and 16 bits per channel (16-bit samples are truncated to 8 bits)
//! - Raw and PackBits (RLE) compressed image data
//!
//! Extra channels such as alpha are read but not composed.
//!
//! ## Non-Goals
//!
//! - Layers, masks and image resources (only the merged image is read)
//! - Indexed, Lab, Bitmap and Multichannel modes
//! - Color management (CMYK conversion is a naive formula)
//! - Encoding
//!
//! ## Usage
//!
//! ```no_run
//! use zenpsd::{ImageInfo, PsdDecoder, Unstoppable};
//!
//! let data: &[u8] = &[]; // your PSD bytes
//!
//! // Probe without decoding
//! let info = ImageInfo::from_bytes(data)?;
//! println!("{}x{} {:?}", info.width, info.height, info.color_model);
//!
//! // Decode in one call
//! let decoded = zenpsd::decode(data, Unstoppable)?;
//! assert_eq!(decoded.pixels().len(), info.width as usize * info.height as usize * 3);
//!
//! // Or feed it piece by piece as it arrives
//! let mut decoder = PsdDecoder::new();
//! for chunk in data.chunks(4096) {
//!     decoder.feed(chunk)?;
//! }
//! let decoded = decoder.finish()?;
//! # Ok::<(), zenpsd::PsdError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod canvas;
mod decode;
mod error;
mod info;
mod limits;

pub mod psd;

// Re-exports
pub use canvas::Canvas;
pub use decode::{DecodeOutput, DecodeRequest};
pub use enough::{Stop, Unstoppable};
pub use error::PsdError;
pub use info::ImageInfo;
pub use limits::Limits;
pub use psd::{BitDepth, ColorMode, ColorModel, LoadObserver, Phase, PsdDecoder};

/// Decode a complete PSD held in memory.
pub fn decode(data: &[u8], stop: impl Stop) -> Result<DecodeOutput, PsdError> {
    DecodeRequest::new(data).decode(stop)
}

/// Decode a complete PSD held in memory, rejecting images over `limits`.
pub fn decode_with_limits(
    data: &[u8],
    limits: &Limits,
    stop: impl Stop,
) -> Result<DecodeOutput, PsdError> {
    DecodeRequest::new(data).with_limits(limits).decode(stop)
}
