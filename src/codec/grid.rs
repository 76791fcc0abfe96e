use crate::foundation::core::FrameSize;
use crate::foundation::error::{DeltaGridError, DeltaGridResult};

/// Decoded frame pixels: straight RGBA8, row-major, tightly packed.
///
/// One instance is reused across a run as the single-owner scratch buffer that a
/// [`crate::FrameSource`] fills and the downsampler reads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawFrame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 4` bytes.
    pub data: Vec<u8>,
}

impl RawFrame {
    /// Wrap an existing buffer, checking its length against the dimensions.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> DeltaGridResult<Self> {
        let expected = FrameSize { width, height }.rgba8_len();
        if data.len() != expected {
            return Err(DeltaGridError::decode(format!(
                "raw frame buffer has {} bytes, expected {expected} for {width}x{height} rgba8",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Zero-filled frame of `size`.
    pub fn blank(size: FrameSize) -> Self {
        Self {
            width: size.width,
            height: size.height,
            data: vec![0u8; size.rgba8_len()],
        }
    }

    /// Frame of `size` where every pixel is `rgba`.
    pub fn filled(size: FrameSize, rgba: [u8; 4]) -> Self {
        let mut frame = Self::blank(size);
        for px in frame.data.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
        frame
    }

    /// Frame dimensions.
    pub fn size(&self) -> FrameSize {
        FrameSize {
            width: self.width,
            height: self.height,
        }
    }

    /// Resize the buffer in place for `size`, reusing the allocation when possible.
    pub fn reshape(&mut self, size: FrameSize) {
        self.width = size.width;
        self.height = size.height;
        self.data.resize(size.rgba8_len(), 0);
    }

    /// Overwrite the pixel at (`x`, `y`).
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{} frame",
            self.width,
            self.height
        );
        let off = (y as usize * self.width as usize + x as usize) * 4;
        self.data[off..off + 4].copy_from_slice(&rgba);
    }
}

/// One quantized grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GridCell {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
}

impl GridCell {
    /// Build a cell from its three channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Averaged, quantized cells of one frame in row-major block order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    /// Cells per row.
    pub width: u32,
    /// Rows.
    pub height: u32,
    /// `width * height` cells, block row outer, block column inner.
    pub cells: Vec<GridCell>,
}

impl Grid {
    /// All-black grid.
    pub fn zeroed(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![GridCell::default(); width as usize * height as usize],
        }
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// `true` for a 0x0 grid.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Flat `r,g,b,r,g,b,...` list in cell order.
    pub fn to_rgb_values(&self) -> Vec<u32> {
        let mut out = Vec::with_capacity(self.cells.len() * 3);
        for c in &self.cells {
            out.extend([u32::from(c.r), u32::from(c.g), u32::from(c.b)]);
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/codec/grid.rs"]
mod tests;
