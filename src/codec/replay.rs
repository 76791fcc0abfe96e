use crate::codec::delta::EncodedFrame;
use crate::codec::grid::{Grid, GridCell};
use crate::foundation::error::{DeltaGridError, DeltaGridResult};

/// Reconstructs grids from an encoded frame sequence, starting from an all-black grid.
///
/// This mirrors what the downstream interpreter does with the module and is the inverse of
/// [`crate::codec::delta::DeltaEncoder`].
#[derive(Clone, Debug)]
pub struct GridReplay {
    grid: Grid,
}

impl GridReplay {
    /// Start from an all-black `width x height` grid.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            grid: Grid::zeroed(width, height),
        }
    }

    /// Current reconstructed grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Apply one flat frame list. `keyframe` selects the `r,g,b` layout over `index,r,g,b`.
    pub fn apply_values(&mut self, keyframe: bool, values: &[u32]) -> DeltaGridResult<&Grid> {
        if keyframe {
            if values.len() != self.grid.len() * 3 {
                return Err(DeltaGridError::serialization(format!(
                    "keyframe has {} values, expected {}",
                    values.len(),
                    self.grid.len() * 3
                )));
            }
            for (cell, rgb) in self.grid.cells.iter_mut().zip(values.chunks_exact(3)) {
                *cell = to_cell(rgb)?;
            }
            return Ok(&self.grid);
        }

        if !values.len().is_multiple_of(4) {
            return Err(DeltaGridError::serialization(format!(
                "delta frame length {} is not a multiple of 4",
                values.len()
            )));
        }
        let mut last = 0u32;
        for change in values.chunks_exact(4) {
            let idx = change[0];
            if idx == 0 || idx as usize > self.grid.len() {
                return Err(DeltaGridError::serialization(format!(
                    "delta cell index {idx} outside 1..={}",
                    self.grid.len()
                )));
            }
            if idx <= last {
                return Err(DeltaGridError::serialization(format!(
                    "delta cell index {idx} does not ascend (previous {last})"
                )));
            }
            last = idx;
            self.grid.cells[idx as usize - 1] = to_cell(&change[1..])?;
        }
        Ok(&self.grid)
    }

    /// Apply an [`EncodedFrame`].
    pub fn apply(&mut self, frame: &EncodedFrame) -> DeltaGridResult<&Grid> {
        self.apply_values(frame.is_keyframe(), frame.values())
    }
}

fn to_cell(rgb: &[u32]) -> DeltaGridResult<GridCell> {
    let ch = |v: u32| {
        u8::try_from(v)
            .map_err(|_| DeltaGridError::serialization(format!("channel value {v} exceeds 255")))
    };
    Ok(GridCell::new(ch(rgb[0])?, ch(rgb[1])?, ch(rgb[2])?))
}

#[cfg(test)]
#[path = "../../tests/unit/codec/replay.rs"]
mod tests;
