use rayon::prelude::*;

use crate::codec::grid::{Grid, GridCell, RawFrame};
use crate::codec::quantize::quantize;
use crate::foundation::error::{DeltaGridError, DeltaGridResult};

/// Reduces a [`RawFrame`] to a [`Grid`] by averaging `block x block` tiles and quantizing each
/// channel.
#[derive(Clone, Copy, Debug)]
pub struct BlockDownsampler {
    block: u32,
    quant_step: u32,
    parallel: bool,
}

impl BlockDownsampler {
    /// Create a sequential downsampler.
    pub fn new(block: u32, quant_step: u32) -> DeltaGridResult<Self> {
        if block == 0 {
            return Err(DeltaGridError::validation("block must be >= 1"));
        }
        if quant_step == 0 {
            return Err(DeltaGridError::validation("quantStep must be >= 1"));
        }
        Ok(Self {
            block,
            quant_step,
            parallel: false,
        })
    }

    /// Spread tile rows across the rayon pool. Output is identical either way.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Tile edge length.
    pub fn block(&self) -> u32 {
        self.block
    }

    /// Average and quantize `frame`.
    ///
    /// Fails with [`DeltaGridError::DimensionMismatch`] when the frame does not tile exactly;
    /// partial tiles are never read or dropped.
    pub fn downsample(&self, frame: &RawFrame) -> DeltaGridResult<Grid> {
        let block = self.block;
        if frame.width == 0
            || frame.height == 0
            || !frame.width.is_multiple_of(block)
            || !frame.height.is_multiple_of(block)
        {
            return Err(DeltaGridError::dimension_mismatch(
                frame.width,
                frame.height,
                block,
            ));
        }
        if frame.data.len() != frame.size().rgba8_len() {
            return Err(DeltaGridError::decode(format!(
                "raw frame buffer has {} bytes, expected {}",
                frame.data.len(),
                frame.size().rgba8_len()
            )));
        }

        let mut grid = Grid::zeroed(frame.width / block, frame.height / block);
        let row_len = grid.width as usize;
        if self.parallel {
            grid.cells
                .par_chunks_mut(row_len)
                .enumerate()
                .for_each(|(gy, row)| self.fill_tile_row(frame, gy, row));
        } else {
            for (gy, row) in grid.cells.chunks_mut(row_len).enumerate() {
                self.fill_tile_row(frame, gy, row);
            }
        }
        Ok(grid)
    }

    fn fill_tile_row(&self, frame: &RawFrame, gy: usize, row: &mut [GridCell]) {
        let block = self.block as usize;
        let stride = frame.width as usize * 4;
        let count = (block * block) as u64;
        let y0 = gy * block;

        for (gx, cell) in row.iter_mut().enumerate() {
            let x0 = gx * block;
            let mut sum = [0u64; 3];
            for y in y0..y0 + block {
                let start = y * stride + x0 * 4;
                for px in frame.data[start..start + block * 4].chunks_exact(4) {
                    sum[0] += u64::from(px[0]);
                    sum[1] += u64::from(px[1]);
                    sum[2] += u64::from(px[2]);
                }
            }
            *cell = GridCell::new(
                quantize(round_half_up(sum[0], count), self.quant_step),
                quantize(round_half_up(sum[1], count), self.quant_step),
                quantize(round_half_up(sum[2], count), self.quant_step),
            );
        }
    }
}

/// `sum / count` rounded to nearest, ties upward. The mean of u8 samples always fits in u8.
fn round_half_up(sum: u64, count: u64) -> u8 {
    ((sum + count / 2) / count).min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/codec/downsample.rs"]
mod tests;
