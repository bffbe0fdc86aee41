#[cfg(feature = "rgb")]
use rgb::AsPixels as _;

use enough::Stop;

use crate::canvas::Canvas;
use crate::error::PsdError;
use crate::info::ImageInfo;
use crate::limits::Limits;

/// Decoded image: the composed RGB canvas plus header information.
#[derive(Clone, Debug)]
pub struct DecodeOutput {
    canvas: Canvas,
    pub width: u32,
    pub height: u32,
    pub info: ImageInfo,
}

impl DecodeOutput {
    pub(crate) fn new(canvas: Canvas, info: ImageInfo) -> Self {
        Self {
            width: canvas.width(),
            height: canvas.height(),
            canvas,
            info,
        }
    }

    /// Access the pixel data, including any row padding.
    pub fn pixels(&self) -> &[u8] {
        self.canvas.as_bytes()
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn into_canvas(self) -> Canvas {
        self.canvas
    }

    /// Reinterpret pixel data as a typed RGB slice.
    ///
    /// Returns `None` when rows are padded (see
    /// [`DecodeRequest::with_row_alignment`]).
    #[cfg(feature = "rgb")]
    pub fn as_pixels(&self) -> Option<&[rgb::RGB8]> {
        if !self.canvas.is_packed() {
            return None;
        }
        Some(self.pixels().as_pixels())
    }

    /// Convert to an [`imgref::ImgVec`] of RGB pixels, dropping row padding.
    #[cfg(feature = "imgref")]
    pub fn to_imgvec(&self) -> imgref::ImgVec<rgb::RGB8> {
        let packed = self.canvas.to_packed();
        imgref::ImgVec::new(
            packed.as_pixels().to_vec(),
            self.width as usize,
            self.height as usize,
        )
    }
}

/// One-shot decode of a PSD held in memory.
///
/// ```no_run
/// use zenpsd::{DecodeRequest, Limits, Unstoppable};
///
/// let data: &[u8] = &[]; // your PSD bytes
/// let limits = Limits { max_pixels: Some(100_000_000), ..Limits::default() };
/// let decoded = DecodeRequest::new(data)
///     .with_limits(&limits)
///     .decode(Unstoppable)?;
/// println!("{}x{}", decoded.width, decoded.height);
/// # Ok::<(), zenpsd::PsdError>(())
/// ```
#[derive(Clone, Debug)]
pub struct DecodeRequest<'a> {
    data: &'a [u8],
    limits: Option<&'a Limits>,
    row_alignment: usize,
}

impl<'a> DecodeRequest<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            limits: None,
            row_alignment: 1,
        }
    }

    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Pad output rows to a multiple of `alignment` bytes.
    pub fn with_row_alignment(mut self, alignment: usize) -> Self {
        self.row_alignment = alignment;
        self
    }

    pub fn decode(self, stop: impl Stop) -> Result<DecodeOutput, PsdError> {
        crate::psd::decode(self.data, self.limits, self.row_alignment, &stop)
    }
}
