use crate::error::PsdError;
use crate::psd::header::{BitDepth, ColorModel, HEADER_SIZE, Header};

/// Validated image properties from the PSD header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    /// Channels stored in the file, including alpha and spot channels.
    pub channels: u16,
    pub depth: BitDepth,
    pub color_model: ColorModel,
}

impl ImageInfo {
    /// Probe the header without decoding.
    ///
    /// Fails with [`PsdError::Incomplete`] when `data` is shorter than the
    /// 26-byte header, or with the same error decoding would report for an
    /// unsupported image.
    pub fn from_bytes(data: &[u8]) -> Result<Self, PsdError> {
        let raw: &[u8; HEADER_SIZE] = data
            .get(..HEADER_SIZE)
            .and_then(|head| head.try_into().ok())
            .ok_or(PsdError::Incomplete)?;
        Header::parse(raw).validate()
    }

    /// Bytes in one channel's scanline.
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.depth.bytes()
    }

    /// Bytes in one whole channel plane.
    pub fn plane_bytes(&self) -> Option<usize> {
        self.row_bytes().checked_mul(self.height as usize)
    }
}
