use alloc::format;

use crate::error::PsdError;
use crate::info::ImageInfo;

/// Resource limits applied once the PSD header is known.
///
/// All fields default to `None` (no limit). Limits are checked before any
/// channel plane or output buffer is allocated.
#[derive(Clone, Debug, Default)]
pub struct Limits {
    pub max_width: Option<u64>,
    pub max_height: Option<u64>,
    /// Maximum pixel count (width * height).
    pub max_pixels: Option<u64>,
    /// Maximum bytes held by one decode session: channel planes, the RLE
    /// line-length table, the scanline scratch buffer and the output canvas.
    pub max_memory_bytes: Option<u64>,
}

impl Limits {
    /// Reject an image whose declared geometry is over the limits.
    pub(crate) fn check_image(&self, info: &ImageInfo) -> Result<(), PsdError> {
        let pixels = u64::from(info.width) * u64::from(info.height);
        over_limit("width", u64::from(info.width), self.max_width)?;
        over_limit("height", u64::from(info.height), self.max_height)?;
        over_limit("pixel count", pixels, self.max_pixels)
    }

    /// Size the buffers decoding `info` into a canvas with `stride` byte rows
    /// needs, and check the total against `max_memory_bytes`.
    pub(crate) fn check_allocation(
        &self,
        info: &ImageInfo,
        stride: usize,
    ) -> Result<usize, PsdError> {
        let total = SessionBuffers::new(info, stride)
            .total()
            .ok_or(PsdError::DimensionsTooLarge {
                width: info.width,
                height: info.height,
            })?;
        over_limit("decode buffers (bytes)", total as u64, self.max_memory_bytes)?;
        Ok(total)
    }
}

/// Byte sizes of everything a session allocates for one image.
struct SessionBuffers {
    planes: Option<usize>,
    line_table: usize,
    scratch: usize,
    canvas: Option<usize>,
}

impl SessionBuffers {
    fn new(info: &ImageInfo, stride: usize) -> Self {
        let channels = usize::from(info.channels);
        let height = info.height as usize;
        Self {
            planes: info.plane_bytes().and_then(|plane| plane.checked_mul(channels)),
            // one big-endian u16 per scanline of every channel
            line_table: 2 * channels * height,
            scratch: info.row_bytes(),
            canvas: stride.checked_mul(height),
        }
    }

    fn total(&self) -> Option<usize> {
        self.planes?
            .checked_add(self.line_table)?
            .checked_add(self.scratch)?
            .checked_add(self.canvas?)
    }
}

fn over_limit(what: &str, value: u64, limit: Option<u64>) -> Result<(), PsdError> {
    match limit {
        Some(max) if value > max => Err(PsdError::LimitExceeded(format!(
            "{what} {value} exceeds limit {max}"
        ))),
        _ => Ok(()),
    }
}
