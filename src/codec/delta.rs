use crate::codec::grid::Grid;

/// One encoded frame as the flat integer list written into the module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EncodedFrame {
    /// Full grid: `r,g,b` per cell, `3 * grid_size` values.
    Keyframe(Vec<u32>),
    /// Changed cells only: `index,r,g,b` per cell with 1-based, ascending indices.
    Delta(Vec<u32>),
}

impl EncodedFrame {
    /// The flat list as serialized.
    pub fn values(&self) -> &[u32] {
        match self {
            EncodedFrame::Keyframe(v) | EncodedFrame::Delta(v) => v,
        }
    }

    /// `true` for [`EncodedFrame::Keyframe`].
    pub fn is_keyframe(&self) -> bool {
        matches!(self, EncodedFrame::Keyframe(_))
    }

    /// Number of cells this frame writes.
    pub fn cells_written(&self) -> usize {
        match self {
            EncodedFrame::Keyframe(v) => v.len() / 3,
            EncodedFrame::Delta(v) => v.len() / 4,
        }
    }
}

#[derive(Debug, Default)]
enum EncoderState {
    #[default]
    AwaitingFirstFrame,
    HasPrevious(Grid),
}

/// Temporal change detector.
///
/// The first grid becomes a keyframe; each later grid becomes the list of cells whose color
/// differs from the grid before it. Only the most recent grid is retained.
#[derive(Debug, Default)]
pub struct DeltaEncoder {
    state: EncoderState,
}

impl DeltaEncoder {
    /// Encoder awaiting its first frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` once a keyframe has been emitted.
    pub fn has_previous(&self) -> bool {
        matches!(self.state, EncoderState::HasPrevious(_))
    }

    /// Encode `grid` against the previous one and keep it as the new reference.
    ///
    /// Grids within one run always share dimensions. Should a later grid be larger anyway,
    /// cells past the end of the previous grid count as changed.
    pub fn encode(&mut self, grid: Grid) -> EncodedFrame {
        let out = match &self.state {
            EncoderState::AwaitingFirstFrame => EncodedFrame::Keyframe(grid.to_rgb_values()),
            EncoderState::HasPrevious(prev) => {
                let mut changes = Vec::new();
                for (p, cell) in grid.cells.iter().enumerate() {
                    if prev.cells.get(p) != Some(cell) {
                        changes.extend([
                            (p + 1) as u32,
                            u32::from(cell.r),
                            u32::from(cell.g),
                            u32::from(cell.b),
                        ]);
                    }
                }
                EncodedFrame::Delta(changes)
            }
        };
        self.state = EncoderState::HasPrevious(grid);
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/codec/delta.rs"]
mod tests;
