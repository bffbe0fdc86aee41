//! Incremental PSD decoding.
//!
//! A [`PsdDecoder`] accepts the file in chunks of any size, down to single
//! bytes. Running out of input is never an error: the decoder keeps its
//! position and resumes on the next [`feed`](PsdDecoder::feed).

use alloc::vec::Vec;

use enough::{Stop, Unstoppable};
use log::{debug, trace, warn};

use super::accumulate::{Accumulator, BlockSkipper};
use super::compose::Composition;
use super::header::{Compression, HEADER_SIZE, Header};
use super::packbits;
use crate::canvas::Canvas;
use crate::decode::DecodeOutput;
use crate::error::PsdError;
use crate::info::ImageInfo;
use crate::limits::Limits;

/// Host callbacks invoked as a load progresses.
///
/// Any state the host needs during the load lives in the implementing value.
pub trait LoadObserver {
    /// Offered the dimensions declared by the header, before any image
    /// buffer is allocated. Returning zero for either dimension aborts the
    /// load with [`PsdError::HostAborted`].
    ///
    /// Scaling is not supported, so other adjusted sizes are ignored.
    fn negotiate_size(&mut self, width: u32, height: u32) -> (u32, u32) {
        (width, height)
    }

    /// Called once after all buffers are allocated. The canvas is still blank.
    fn geometry_ready(&mut self, canvas: &Canvas) {
        let _ = canvas;
    }

    /// Called after rows `y..y + rows` of the canvas have received pixels.
    fn area_updated(&mut self, canvas: &Canvas, y: u32, rows: u32) {
        let _ = (canvas, y, rows);
    }
}

impl LoadObserver for () {}

impl<T: LoadObserver + ?Sized> LoadObserver for &mut T {
    fn negotiate_size(&mut self, width: u32, height: u32) -> (u32, u32) {
        (**self).negotiate_size(width, height)
    }

    fn geometry_ready(&mut self, canvas: &Canvas) {
        (**self).geometry_ready(canvas)
    }

    fn area_updated(&mut self, canvas: &Canvas, y: u32, rows: u32) {
        (**self).area_updated(canvas, y, rows)
    }
}

/// Position of the decoder in the file. Phases only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Header,
    ColorModeData,
    ImageResources,
    LayerAndMask,
    Compression,
    /// Per-scanline compressed lengths (RLE only).
    LineLengths,
    ChannelData,
    Done,
    /// A permanent error occurred; all buffers have been released.
    Failed,
}

enum Session {
    AwaitingHeader,
    Decoding(Image),
    Failed,
}

/// Everything that exists only once the header is known.
struct Image {
    info: ImageInfo,
    phase: Phase,
    compression: Compression,
    /// One plane per channel, `row_bytes * height` bytes each.
    planes: Vec<Vec<u8>>,
    /// `channels * height` entries once [`Phase::LineLengths`] completes.
    line_lengths: Vec<u16>,
    channel: usize,
    row: usize,
    offset: usize,
    canvas: Canvas,
    finalized: bool,
}

fn allocate_zeroed(len: usize) -> Result<Vec<u8>, PsdError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| PsdError::AllocationFailure(len))?;
    buf.resize(len, 0);
    Ok(buf)
}

impl Image {
    fn allocate(
        info: ImageInfo,
        row_alignment: usize,
        limits: Option<&Limits>,
    ) -> Result<Self, PsdError> {
        let too_large = || PsdError::DimensionsTooLarge {
            width: info.width,
            height: info.height,
        };
        let channels = usize::from(info.channels);
        let height = info.height as usize;
        let plane_bytes = info.plane_bytes().ok_or_else(too_large)?;
        let stride = Canvas::stride_for(info.width, row_alignment).ok_or_else(too_large)?;
        let unlimited = Limits::default();
        let total = limits
            .unwrap_or(&unlimited)
            .check_allocation(&info, stride)?;
        debug!("allocating {total} bytes for {channels} channel planes and canvas");

        let mut planes = Vec::new();
        planes
            .try_reserve_exact(channels)
            .map_err(|_| {
                PsdError::AllocationFailure(channels * core::mem::size_of::<Vec<u8>>())
            })?;
        for _ in 0..channels {
            planes.push(allocate_zeroed(plane_bytes)?);
        }

        let mut line_lengths = Vec::new();
        line_lengths
            .try_reserve_exact(channels * height)
            .map_err(|_| PsdError::AllocationFailure(2 * channels * height))?;

        Ok(Self {
            info,
            phase: Phase::ColorModeData,
            compression: Compression::Raw,
            planes,
            line_lengths,
            channel: 0,
            row: 0,
            offset: 0,
            canvas: Canvas::new(info.width, info.height, row_alignment)?,
            finalized: false,
        })
    }

    /// Run the current phase against `input`. Returns false when more input
    /// is needed or decoding is complete.
    fn step(
        &mut self,
        acc: &mut Accumulator,
        skipper: &mut BlockSkipper,
        input: &mut &[u8],
        stop: &dyn Stop,
    ) -> Result<bool, PsdError> {
        match self.phase {
            Phase::ColorModeData | Phase::ImageResources | Phase::LayerAndMask => {
                if !skipper.skip(input) {
                    return Ok(false);
                }
                self.phase = match self.phase {
                    Phase::ColorModeData => Phase::ImageResources,
                    Phase::ImageResources => Phase::LayerAndMask,
                    _ => Phase::Compression,
                };
                trace!("entering {:?}", self.phase);
            }
            Phase::Compression => {
                acc.ensure(2)?;
                if !acc.fill(input, 2) {
                    return Ok(false);
                }
                let raw = u16::from_be_bytes([acc.bytes()[0], acc.bytes()[1]]);
                acc.reset();
                self.compression = Compression::from_u16(raw)?;
                trace!("compression {:?}", self.compression);
                self.phase = match self.compression {
                    Compression::Rle => Phase::LineLengths,
                    Compression::Raw => Phase::ChannelData,
                };
            }
            Phase::LineLengths => {
                let entries = usize::from(self.info.channels) * self.info.height as usize;
                acc.ensure(2)?;
                while self.line_lengths.len() < entries {
                    if !acc.fill(input, 2) {
                        return Ok(false);
                    }
                    let pair = acc.bytes();
                    self.line_lengths.push(u16::from_be_bytes([pair[0], pair[1]]));
                    acc.reset();
                }
                let longest = self.line_lengths.iter().copied().max().unwrap_or(0);
                trace!("read {} line lengths, longest {longest}", self.line_lengths.len());
                acc.ensure(usize::from(longest))?;
                self.phase = Phase::ChannelData;
            }
            Phase::ChannelData => return self.read_row(acc, input, stop),
            Phase::Header | Phase::Done | Phase::Failed => {
                *input = &[];
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn read_row(
        &mut self,
        acc: &mut Accumulator,
        input: &mut &[u8],
        stop: &dyn Stop,
    ) -> Result<bool, PsdError> {
        let height = self.info.height as usize;
        let row_bytes = self.info.row_bytes();
        let target = match self.compression {
            Compression::Raw => row_bytes,
            Compression::Rle => usize::from(self.line_lengths[self.channel * height + self.row]),
        };

        if acc.bytes().is_empty() && self.row % 16 == 0 {
            stop.check()?;
        }
        acc.ensure(target)?;
        if !acc.fill(input, target) {
            return Ok(false);
        }

        let dst = &mut self.planes[self.channel][self.offset..self.offset + row_bytes];
        match self.compression {
            Compression::Raw => dst.copy_from_slice(acc.bytes()),
            Compression::Rle => {
                let written = packbits::decode_line(acc.bytes(), dst)?;
                if written < row_bytes {
                    warn!(
                        "channel {} row {} decoded to {written} of {row_bytes} bytes",
                        self.channel, self.row
                    );
                }
            }
        }
        acc.reset();

        self.offset += row_bytes;
        self.row += 1;
        if self.row == height {
            trace!("channel {} complete", self.channel);
            self.row = 0;
            self.offset = 0;
            self.channel += 1;
            if self.channel == usize::from(self.info.channels) {
                self.phase = Phase::Done;
            }
        }
        Ok(true)
    }

    fn compose(&mut self, stop: &dyn Stop) -> Result<(), PsdError> {
        match Composition::new(self.info.color_model, &self.planes) {
            Some(composition) => composition.render(&mut self.canvas, self.info.depth, stop)?,
            None => warn!("{:?} image has too few channels to compose", self.info.color_model),
        }
        self.finalized = true;
        Ok(())
    }
}

/// Incremental PSD decoder producing an RGB [`Canvas`].
///
/// ```
/// use zenpsd::PsdDecoder;
///
/// # fn run(chunks: &[&[u8]]) -> Result<(), zenpsd::PsdError> {
/// let mut decoder = PsdDecoder::new();
/// for chunk in chunks {
///     decoder.feed(chunk)?;
/// }
/// let output = decoder.finish()?;
/// println!("{}x{}", output.width, output.height);
/// # Ok(())
/// # }
/// ```
pub struct PsdDecoder<O: LoadObserver = ()> {
    observer: O,
    limits: Option<Limits>,
    row_alignment: usize,
    session: Session,
    acc: Accumulator,
    skipper: BlockSkipper,
}

impl PsdDecoder<()> {
    /// Decoder without host callbacks.
    pub fn new() -> Self {
        Self::begin(())
    }
}

impl Default for PsdDecoder<()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: LoadObserver> PsdDecoder<O> {
    /// Start a load that reports to `observer`.
    pub fn begin(observer: O) -> Self {
        Self {
            observer,
            limits: None,
            row_alignment: 1,
            session: Session::AwaitingHeader,
            acc: Accumulator::default(),
            skipper: BlockSkipper::default(),
        }
    }

    /// Reject images exceeding `limits` before allocating their buffers.
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Pad canvas rows to a multiple of `alignment` bytes. Defaults to 1.
    pub fn with_row_alignment(mut self, alignment: usize) -> Self {
        self.row_alignment = alignment.max(1);
        self
    }

    pub fn phase(&self) -> Phase {
        match &self.session {
            Session::AwaitingHeader => Phase::Header,
            Session::Decoding(image) => image.phase,
            Session::Failed => Phase::Failed,
        }
    }

    /// Image properties, once the header has been accepted.
    pub fn info(&self) -> Option<ImageInfo> {
        match &self.session {
            Session::Decoding(image) => Some(image.info),
            _ => None,
        }
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Consume the next chunk of the file.
    pub fn feed(&mut self, data: &[u8]) -> Result<(), PsdError> {
        self.feed_with_stop(data, &Unstoppable)
    }

    /// Consume the next chunk of the file, checking `stop` between scanlines.
    ///
    /// Errors are permanent: the session releases its buffers and every
    /// later call returns [`PsdError::Poisoned`]. Input after the last
    /// scanline is ignored.
    pub fn feed_with_stop(&mut self, data: &[u8], stop: &dyn Stop) -> Result<(), PsdError> {
        let result = self.advance(data, stop);
        if let Err(err) = &result {
            if !matches!(err, PsdError::Poisoned) {
                debug!("decode failed: {err}");
            }
            self.session = Session::Failed;
        }
        result
    }

    /// End the load. Returns the composed image, or
    /// [`PsdError::Incomplete`] if the stream stopped early or failed.
    pub fn finish(self) -> Result<DecodeOutput, PsdError> {
        match self.session {
            Session::Decoding(image) if image.finalized => {
                Ok(DecodeOutput::new(image.canvas, image.info))
            }
            _ => Err(PsdError::Incomplete),
        }
    }

    fn advance(&mut self, mut input: &[u8], stop: &dyn Stop) -> Result<(), PsdError> {
        loop {
            let progressed = match self.session {
                Session::Failed => return Err(PsdError::Poisoned),
                Session::AwaitingHeader => self.read_header(&mut input)?,
                Session::Decoding(ref mut image) => {
                    image.step(&mut self.acc, &mut self.skipper, &mut input, stop)?
                }
            };
            if !progressed {
                break;
            }
        }

        if let Session::Decoding(image) = &mut self.session {
            if image.phase == Phase::Done && !image.finalized {
                trace!("all channels read, composing");
                image.compose(stop)?;
                self.observer.area_updated(&image.canvas, 0, image.info.height);
            }
        }
        Ok(())
    }

    fn read_header(&mut self, input: &mut &[u8]) -> Result<bool, PsdError> {
        self.acc.ensure(HEADER_SIZE)?;
        if !self.acc.fill(input, HEADER_SIZE) {
            return Ok(false);
        }
        let mut raw = [0u8; HEADER_SIZE];
        raw.copy_from_slice(self.acc.bytes());
        self.acc.reset();

        let header = Header::parse(&raw);
        trace!(
            "header: {}x{}, {} channels, depth {}, mode {:?}",
            header.width, header.height, header.channels, header.depth, header.color_mode
        );
        let info = header.validate()?;
        if let Some(limits) = &self.limits {
            limits.check_image(&info)?;
        }

        let (width, height) = self.observer.negotiate_size(info.width, info.height);
        if width == 0 || height == 0 {
            return Err(PsdError::HostAborted);
        }
        if (width, height) != (info.width, info.height) {
            warn!(
                "ignoring requested size {width}x{height}, decoding at {}x{}",
                info.width, info.height
            );
        }

        let image = Image::allocate(info, self.row_alignment, self.limits.as_ref())?;
        self.acc.ensure(info.row_bytes())?;
        self.observer.geometry_ready(&image.canvas);
        self.session = Session::Decoding(image);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn header(channels: u16, height: u32, width: u32, depth: u16, mode: u16) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"8BPS");
        out.extend_from_slice(&1u16.to_be_bytes());
        out.extend_from_slice(&[0; 6]);
        out.extend_from_slice(&channels.to_be_bytes());
        out.extend_from_slice(&height.to_be_bytes());
        out.extend_from_slice(&width.to_be_bytes());
        out.extend_from_slice(&depth.to_be_bytes());
        out.extend_from_slice(&mode.to_be_bytes());
        out
    }

    fn empty_blocks() -> [u8; 12] {
        [0; 12]
    }

    #[test]
    fn phases_advance_in_order() {
        let mut decoder = PsdDecoder::new();
        assert_eq!(decoder.phase(), Phase::Header);

        decoder.feed(&header(1, 1, 2, 8, 1)).unwrap();
        assert_eq!(decoder.phase(), Phase::ColorModeData);
        assert_eq!(decoder.info().unwrap().width, 2);

        decoder.feed(&[0, 0, 0, 0]).unwrap();
        assert_eq!(decoder.phase(), Phase::ImageResources);
        decoder.feed(&[0, 0, 0, 1, 0xFF]).unwrap();
        assert_eq!(decoder.phase(), Phase::LayerAndMask);
        decoder.feed(&[0, 0, 0, 0]).unwrap();
        assert_eq!(decoder.phase(), Phase::Compression);
        decoder.feed(&[0, 1]).unwrap();
        assert_eq!(decoder.phase(), Phase::LineLengths);
        decoder.feed(&[0, 2]).unwrap();
        assert_eq!(decoder.phase(), Phase::ChannelData);
        decoder.feed(&[0xFF, 0x33]).unwrap();
        assert_eq!(decoder.phase(), Phase::Done);

        // trailing bytes are ignored
        decoder.feed(&[1, 2, 3]).unwrap();
        let out = decoder.finish().unwrap();
        assert_eq!(out.canvas().row(0), &[0x33; 6]);
    }

    #[test]
    fn split_integer_fields_resume() {
        let mut stream = header(1, 1, 1, 8, 1);
        stream.extend_from_slice(&[0, 0, 0, 3, 9, 9, 9]);
        stream.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 0]);
        stream.extend_from_slice(&[0, 0, 0x42]);

        let mut decoder = PsdDecoder::new();
        for byte in &stream {
            decoder.feed(core::slice::from_ref(byte)).unwrap();
        }
        assert_eq!(decoder.phase(), Phase::Done);
        assert_eq!(decoder.finish().unwrap().canvas().row(0), &[0x42; 3]);
    }

    #[test]
    fn unknown_compression_fails_permanently() {
        let mut stream = header(1, 1, 1, 8, 1);
        stream.extend_from_slice(&empty_blocks());
        stream.extend_from_slice(&[0, 2]);

        let mut decoder = PsdDecoder::new();
        assert!(matches!(
            decoder.feed(&stream),
            Err(PsdError::UnsupportedCompression(2))
        ));
        assert_eq!(decoder.phase(), Phase::Failed);
        assert!(matches!(decoder.feed(&[0]), Err(PsdError::Poisoned)));
        assert!(matches!(decoder.finish(), Err(PsdError::Incomplete)));
    }

    #[test]
    fn zero_length_rle_rows_complete_without_input() {
        let mut stream = header(1, 2, 1, 8, 1);
        stream.extend_from_slice(&empty_blocks());
        stream.extend_from_slice(&[0, 1]);
        stream.extend_from_slice(&[0, 2, 0, 0]);
        stream.extend_from_slice(&[0x00, 0x10]);

        let mut decoder = PsdDecoder::new();
        decoder.feed(&stream).unwrap();
        assert_eq!(decoder.phase(), Phase::Done);
        let out = decoder.finish().unwrap();
        assert_eq!(out.canvas().as_bytes(), &[0x10, 0x10, 0x10, 0, 0, 0]);
    }

    #[test]
    fn rle_overrun_is_corrupt_data() {
        let mut stream = header(1, 1, 2, 8, 1);
        stream.extend_from_slice(&empty_blocks());
        stream.extend_from_slice(&[0, 1, 0, 2]);
        // replicate run of 4 into a 2-byte scanline
        stream.extend_from_slice(&[0xFD, 0x01]);

        let mut decoder = PsdDecoder::new();
        assert!(matches!(decoder.feed(&stream), Err(PsdError::CorruptData(_))));
    }

    #[test]
    fn line_length_table_is_read_without_staging() {
        let height = 1000u32;
        let mut stream = header(1, height, 1, 8, 1);
        stream.extend_from_slice(&empty_blocks());
        stream.extend_from_slice(&[0, 1]);
        for _ in 0..height {
            stream.extend_from_slice(&[0, 2]);
        }

        let mut decoder = PsdDecoder::new();
        for chunk in stream.chunks(333) {
            decoder.feed(chunk).unwrap();
        }
        assert_eq!(decoder.phase(), Phase::ChannelData);
        // the 2000-byte table never passes through the scratch buffer
        assert_eq!(decoder.acc.capacity(), HEADER_SIZE);

        for _ in 0..height {
            decoder.feed(&[0x00, 0x5A]).unwrap();
        }
        let out = decoder.finish().unwrap();
        assert_eq!(out.canvas().row(height - 1), &[0x5A; 3]);
    }

    #[test]
    fn memory_limit_rejects_before_allocation() {
        let limits = Limits {
            max_memory_bytes: Some(64),
            ..Limits::default()
        };
        let mut decoder = PsdDecoder::new().with_limits(limits);
        assert!(matches!(
            decoder.feed(&header(3, 10, 10, 8, 3)),
            Err(PsdError::LimitExceeded(_))
        ));
        assert!(decoder.info().is_none());
    }

    #[test]
    fn cancelled_feed_fails() {
        let mut stream = header(1, 1, 1, 8, 1);
        stream.extend_from_slice(&empty_blocks());
        stream.extend_from_slice(&[0, 0, 7]);

        struct Cancelled;
        impl Stop for Cancelled {
            fn check(&self) -> Result<(), enough::StopReason> {
                Err(enough::StopReason::Cancelled)
            }
        }

        let mut decoder = PsdDecoder::new();
        let err = decoder.feed_with_stop(&stream, &Cancelled).unwrap_err();
        assert!(matches!(err, PsdError::Cancelled(_)));
        assert_eq!(decoder.phase(), Phase::Failed);
    }

    #[test]
    fn padded_canvas_rows() {
        let mut stream = header(3, 2, 1, 8, 3);
        stream.extend_from_slice(&empty_blocks());
        stream.extend_from_slice(&[0, 0]);
        stream.extend_from_slice(&[1, 2, 3, 4, 5, 6]);

        let mut decoder = PsdDecoder::new().with_row_alignment(4);
        decoder.feed(&stream).unwrap();
        let out = decoder.finish().unwrap();
        assert_eq!(out.canvas().stride(), 4);
        assert_eq!(out.canvas().as_bytes(), &vec![1, 3, 5, 0, 2, 4, 6, 0][..]);
    }
}
