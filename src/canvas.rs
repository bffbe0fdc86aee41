use alloc::vec::Vec;

use crate::error::PsdError;

/// Interleaved 8-bit RGB output buffer.
///
/// Rows are `stride` bytes apart; only the first `3 * width` bytes of each
/// row hold pixels, the rest is alignment padding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canvas {
    data: Vec<u8>,
    width: u32,
    height: u32,
    stride: usize,
}

impl Canvas {
    /// Bytes per output pixel.
    pub const BYTES_PER_PIXEL: usize = 3;

    /// Zero-filled canvas with rows padded to a multiple of `row_alignment`.
    pub(crate) fn new(width: u32, height: u32, row_alignment: usize) -> Result<Self, PsdError> {
        let stride = Self::stride_for(width, row_alignment)
            .ok_or(PsdError::DimensionsTooLarge { width, height })?;
        let len = stride
            .checked_mul(height as usize)
            .ok_or(PsdError::DimensionsTooLarge { width, height })?;

        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| PsdError::AllocationFailure(len))?;
        data.resize(len, 0);

        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Row stride for `width` pixels rounded up to `row_alignment` bytes.
    pub(crate) fn stride_for(width: u32, row_alignment: usize) -> Option<usize> {
        let packed = (width as usize).checked_mul(Self::BYTES_PER_PIXEL)?;
        let align = row_alignment.max(1);
        packed.checked_next_multiple_of(align)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Distance in bytes between the starts of consecutive rows.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Whether rows follow each other without padding.
    pub fn is_packed(&self) -> bool {
        self.stride == self.width as usize * Self::BYTES_PER_PIXEL
    }

    /// The whole buffer including row padding.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Pixel bytes of row `y`, without padding.
    ///
    /// # Panics
    /// If `y >= height`.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        &self.data[start..start + self.width as usize * Self::BYTES_PER_PIXEL]
    }

    /// Iterate over the pixel bytes of every row, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        let row_bytes = self.width as usize * Self::BYTES_PER_PIXEL;
        self.data
            .chunks_exact(self.stride)
            .map(move |row| &row[..row_bytes])
    }

    pub(crate) fn rows_mut(&mut self) -> impl Iterator<Item = &mut [u8]> + '_ {
        let row_bytes = self.width as usize * Self::BYTES_PER_PIXEL;
        self.data
            .chunks_exact_mut(self.stride)
            .map(move |row| &mut row[..row_bytes])
    }

    /// Copy the pixels into a tightly packed `width * height * 3` buffer.
    pub fn to_packed(&self) -> Vec<u8> {
        if self.is_packed() {
            return self.data.clone();
        }
        let packed_row = self.width as usize * Self::BYTES_PER_PIXEL;
        let mut out = Vec::with_capacity(packed_row * self.height as usize);
        for row in self.rows() {
            out.extend_from_slice(row);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_rounds_up_to_alignment() {
        assert_eq!(Canvas::stride_for(3, 1), Some(9));
        assert_eq!(Canvas::stride_for(3, 4), Some(12));
        assert_eq!(Canvas::stride_for(4, 4), Some(12));
        assert_eq!(Canvas::stride_for(5, 0), Some(15));
    }

    #[test]
    fn padded_rows_are_trimmed() {
        let mut canvas = Canvas::new(1, 2, 4).unwrap();
        assert_eq!(canvas.stride(), 4);
        assert!(!canvas.is_packed());
        for (y, row) in canvas.rows_mut().enumerate() {
            row.fill(y as u8 + 1);
        }
        assert_eq!(canvas.as_bytes(), &[1, 1, 1, 0, 2, 2, 2, 0]);
        assert_eq!(canvas.row(1), &[2, 2, 2]);
        assert_eq!(canvas.to_packed(), &[1, 1, 1, 2, 2, 2]);
    }
}
