//! Fixed 26-byte PSD file header.

use crate::error::PsdError;
use crate::info::ImageInfo;

/// File signature, `8BPS`.
pub const SIGNATURE: [u8; 4] = *b"8BPS";

/// Size of the fixed file header in bytes.
pub const HEADER_SIZE: usize = 26;

/// Largest width or height a version 1 PSD may declare.
pub const MAX_DIMENSION: u32 = 30_000;

/// Largest channel count a PSD may declare.
pub const MAX_CHANNELS: u16 = 56;

/// Color mode field of the header, as declared in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorMode {
    Bitmap,
    Grayscale,
    Indexed,
    Rgb,
    Cmyk,
    Multichannel,
    Duotone,
    Lab,
    /// A value outside the documented set.
    Unknown(u16),
}

impl ColorMode {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => Self::Bitmap,
            1 => Self::Grayscale,
            2 => Self::Indexed,
            3 => Self::Rgb,
            4 => Self::Cmyk,
            7 => Self::Multichannel,
            8 => Self::Duotone,
            9 => Self::Lab,
            other => Self::Unknown(other),
        }
    }

    pub fn to_u16(self) -> u16 {
        match self {
            Self::Bitmap => 0,
            Self::Grayscale => 1,
            Self::Indexed => 2,
            Self::Rgb => 3,
            Self::Cmyk => 4,
            Self::Multichannel => 7,
            Self::Duotone => 8,
            Self::Lab => 9,
            Self::Unknown(other) => other,
        }
    }

    /// The decodable color model for this mode, if any.
    pub fn model(self) -> Option<ColorModel> {
        match self {
            Self::Grayscale => Some(ColorModel::Grayscale),
            Self::Rgb => Some(ColorModel::Rgb),
            Self::Cmyk => Some(ColorModel::Cmyk),
            Self::Duotone => Some(ColorModel::Duotone),
            _ => None,
        }
    }
}

/// Color modes this decoder can compose into RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorModel {
    Grayscale,
    Rgb,
    Cmyk,
    /// Rendered from the first channel like grayscale; the duotone curves
    /// live in the color mode data block, which is skipped.
    Duotone,
}

impl ColorModel {
    /// Channels that must be present for composition.
    pub fn min_channels(self) -> u16 {
        match self {
            Self::Grayscale | Self::Duotone => 1,
            Self::Rgb => 3,
            Self::Cmyk => 4,
        }
    }

    pub fn mode(self) -> ColorMode {
        match self {
            Self::Grayscale => ColorMode::Grayscale,
            Self::Rgb => ColorMode::Rgb,
            Self::Cmyk => ColorMode::Cmyk,
            Self::Duotone => ColorMode::Duotone,
        }
    }
}

/// Bits per channel sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitDepth {
    Eight,
    Sixteen,
}

impl BitDepth {
    pub fn from_u16(bits: u16) -> Option<Self> {
        match bits {
            8 => Some(Self::Eight),
            16 => Some(Self::Sixteen),
            _ => None,
        }
    }

    /// Bytes per stored sample.
    pub fn bytes(self) -> usize {
        match self {
            Self::Eight => 1,
            Self::Sixteen => 2,
        }
    }
}

/// Channel data compression method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compression {
    Raw,
    /// PackBits run-length encoding with a per-scanline length table.
    Rle,
}

impl Compression {
    pub fn from_u16(value: u16) -> Result<Self, PsdError> {
        match value {
            0 => Ok(Self::Raw),
            1 => Ok(Self::Rle),
            other => Err(PsdError::UnsupportedCompression(other)),
        }
    }
}

/// The PSD file header exactly as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub signature: [u8; 4],
    pub version: u16,
    pub channels: u16,
    pub height: u32,
    pub width: u32,
    pub depth: u16,
    pub color_mode: ColorMode,
}

fn be_u16(buf: &[u8; HEADER_SIZE], at: usize) -> u16 {
    u16::from_be_bytes([buf[at], buf[at + 1]])
}

fn be_u32(buf: &[u8; HEADER_SIZE], at: usize) -> u32 {
    u32::from_be_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

impl Header {
    /// Deserialize the header. Bytes 6..12 are reserved and ignored.
    pub fn parse(buf: &[u8; HEADER_SIZE]) -> Self {
        Self {
            signature: [buf[0], buf[1], buf[2], buf[3]],
            version: be_u16(buf, 4),
            channels: be_u16(buf, 12),
            height: be_u32(buf, 14),
            width: be_u32(buf, 18),
            depth: be_u16(buf, 22),
            color_mode: ColorMode::from_u16(be_u16(buf, 24)),
        }
    }

    /// Check that this decoder can handle the image described by the header.
    pub fn validate(&self) -> Result<ImageInfo, PsdError> {
        if self.signature != SIGNATURE {
            return Err(PsdError::InvalidSignature(self.signature));
        }
        if self.version != 1 {
            return Err(PsdError::UnsupportedVersion(self.version));
        }
        let model = self
            .color_mode
            .model()
            .ok_or(PsdError::UnsupportedColorMode(self.color_mode))?;
        let depth =
            BitDepth::from_u16(self.depth).ok_or(PsdError::UnsupportedBitDepth(self.depth))?;

        if self.width == 0 || self.height == 0 || self.channels == 0 {
            return Err(PsdError::ZeroDimensions {
                width: self.width,
                height: self.height,
                channels: self.channels,
            });
        }
        if self.channels > MAX_CHANNELS || self.channels < model.min_channels() {
            return Err(PsdError::UnsupportedChannelCount {
                channels: self.channels,
                mode: self.color_mode,
            });
        }
        if self.width > MAX_DIMENSION || self.height > MAX_DIMENSION {
            return Err(PsdError::DimensionsTooLarge {
                width: self.width,
                height: self.height,
            });
        }

        Ok(ImageInfo {
            width: self.width,
            height: self.height,
            channels: self.channels,
            depth,
            color_model: model,
        })
    }
}
