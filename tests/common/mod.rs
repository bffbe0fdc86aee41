//! Synthetic PSD streams for tests.

#![allow(dead_code)]

/// Reference PackBits encoder.
pub fn packbits(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < data.len() {
        let mut run = 1;
        while i + run < data.len() && data[i + run] == data[i] && run < 128 {
            run += 1;
        }
        if run >= 2 {
            out.push((1 - run as i16) as i8 as u8);
            out.push(data[i]);
            i += run;
            continue;
        }
        let start = i;
        i += 1;
        while i < data.len() && i - start < 128 && !(i + 1 < data.len() && data[i + 1] == data[i]) {
            i += 1;
        }
        out.push((i - start - 1) as u8);
        out.extend_from_slice(&data[start..i]);
    }
    out
}

/// Builds a minimal PSD file around per-channel planes.
pub struct PsdBuilder {
    pub width: u32,
    pub height: u32,
    pub depth: u16,
    pub mode: u16,
    pub planes: Vec<Vec<u8>>,
    pub rle: bool,
    pub color_mode_data: Vec<u8>,
    pub resources: Vec<u8>,
    pub layers: Vec<u8>,
}

pub const GRAYSCALE: u16 = 1;
pub const INDEXED: u16 = 2;
pub const RGB: u16 = 3;
pub const CMYK: u16 = 4;
pub const DUOTONE: u16 = 8;
pub const LAB: u16 = 9;

impl PsdBuilder {
    pub fn new(width: u32, height: u32, depth: u16, mode: u16, planes: Vec<Vec<u8>>) -> Self {
        Self {
            width,
            height,
            depth,
            mode,
            planes,
            rle: false,
            color_mode_data: Vec::new(),
            resources: Vec::new(),
            layers: Vec::new(),
        }
    }

    pub fn rle(mut self) -> Self {
        self.rle = true;
        self
    }

    /// Give the three skipped blocks some payload.
    pub fn with_blocks(mut self) -> Self {
        self.color_mode_data = vec![0xC0; 7];
        self.resources = (0..100u8).collect();
        self.layers = vec![0x1A; 33];
        self
    }

    pub fn header(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"8BPS");
        out.extend_from_slice(&1u16.to_be_bytes());
        out.extend_from_slice(&[0; 6]);
        out.extend_from_slice(&(self.planes.len() as u16).to_be_bytes());
        out.extend_from_slice(&self.height.to_be_bytes());
        out.extend_from_slice(&self.width.to_be_bytes());
        out.extend_from_slice(&self.depth.to_be_bytes());
        out.extend_from_slice(&self.mode.to_be_bytes());
        out
    }

    /// Header followed by the three length-prefixed blocks.
    pub fn prelude(&self) -> Vec<u8> {
        let mut out = self.header();
        for block in [&self.color_mode_data, &self.resources, &self.layers] {
            out.extend_from_slice(&(block.len() as u32).to_be_bytes());
            out.extend_from_slice(block);
        }
        out
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = self.prelude();
        let row_bytes = self.width as usize * usize::from(self.depth / 8);

        if !self.rle {
            out.extend_from_slice(&0u16.to_be_bytes());
            for plane in &self.planes {
                out.extend_from_slice(plane);
            }
            return out;
        }

        out.extend_from_slice(&1u16.to_be_bytes());
        let lines: Vec<Vec<u8>> = self
            .planes
            .iter()
            .flat_map(|plane| plane.chunks(row_bytes).map(packbits))
            .collect();
        for line in &lines {
            out.extend_from_slice(&(line.len() as u16).to_be_bytes());
        }
        for line in &lines {
            out.extend_from_slice(line);
        }
        out
    }
}

/// Deterministic pseudo-random plane content.
pub fn noise(len: usize, seed: u32) -> Vec<u8> {
    let mut state = seed | 1;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state as u8
        })
        .collect()
}

/// Plane content with long runs, so PackBits produces replicate runs.
pub fn stripes(len: usize, period: usize) -> Vec<u8> {
    (0..len).map(|i| ((i / period) * 37) as u8).collect()
}
