//! Interleaving of finished channel planes into the RGB canvas.

use alloc::vec::Vec;

use enough::Stop;

use crate::canvas::Canvas;
use crate::error::PsdError;
use crate::psd::header::{BitDepth, ColorModel};

/// Channel planes borrowed per color model.
///
/// Planes hold `width * height` samples of `depth.bytes()` bytes each, big
/// endian, so the first byte of a sample is its most significant byte.
pub(crate) enum Composition<'a> {
    Rgb {
        red: &'a [u8],
        green: &'a [u8],
        blue: &'a [u8],
    },
    Gray {
        luma: &'a [u8],
    },
    Cmyk {
        cyan: &'a [u8],
        magenta: &'a [u8],
        yellow: &'a [u8],
        black: &'a [u8],
    },
}

impl<'a> Composition<'a> {
    /// Pick the planes `model` composes from. Extra planes (alpha, spot
    /// colors) are ignored. `None` when too few planes are present.
    pub(crate) fn new(model: ColorModel, planes: &'a [Vec<u8>]) -> Option<Self> {
        match (model, planes) {
            (ColorModel::Rgb, [red, green, blue, ..]) => Some(Self::Rgb { red, green, blue }),
            (ColorModel::Grayscale | ColorModel::Duotone, [luma, ..]) => Some(Self::Gray { luma }),
            (ColorModel::Cmyk, [cyan, magenta, yellow, black, ..]) => Some(Self::Cmyk {
                cyan,
                magenta,
                yellow,
                black,
            }),
            _ => None,
        }
    }

    /// Write every row of the image into `canvas`.
    pub(crate) fn render(
        &self,
        canvas: &mut Canvas,
        depth: BitDepth,
        stop: &dyn Stop,
    ) -> Result<(), PsdError> {
        let step = depth.bytes();
        let plane_row = canvas.width() as usize * step;

        for (row, out) in canvas.rows_mut().enumerate() {
            if row % 16 == 0 {
                stop.check()?;
            }
            let span = row * plane_row..(row + 1) * plane_row;
            let pixels = out.chunks_exact_mut(Canvas::BYTES_PER_PIXEL);

            match self {
                Self::Rgb { red, green, blue } => {
                    let samples = red[span.clone()]
                        .iter()
                        .step_by(step)
                        .zip(green[span.clone()].iter().step_by(step))
                        .zip(blue[span].iter().step_by(step));
                    for (px, ((&r, &g), &b)) in pixels.zip(samples) {
                        px.copy_from_slice(&[r, g, b]);
                    }
                }
                Self::Gray { luma } => {
                    for (px, &l) in pixels.zip(luma[span].iter().step_by(step)) {
                        px.fill(l);
                    }
                }
                Self::Cmyk {
                    cyan,
                    magenta,
                    yellow,
                    black,
                } => {
                    let samples = cyan[span.clone()]
                        .iter()
                        .step_by(step)
                        .zip(magenta[span.clone()].iter().step_by(step))
                        .zip(yellow[span.clone()].iter().step_by(step))
                        .zip(black[span].iter().step_by(step));
                    for (px, (((&c, &m), &y), &k)) in pixels.zip(samples) {
                        px.copy_from_slice(&cmyk_to_rgb(c, m, y, k));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Naive CMYK to RGB without color management.
///
/// PSD stores CMYK inverted (255 means no ink). Colors are visibly off
/// compared to an ICC based conversion.
pub(crate) fn cmyk_to_rgb(c: u8, m: u8, y: u8, k: u8) -> [u8; 3] {
    let ink = |v: u8| 1.0 - f64::from(v) / 255.0;
    let k = ink(k);
    let channel = |v: u8| ((1.0 - (ink(v) * (1.0 - k) + k)) * 255.0) as u8;
    [channel(c), channel(m), channel(y)]
}
