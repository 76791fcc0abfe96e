use crate::foundation::error::{DeltaGridError, DeltaGridResult};

/// Absolute 0-based frame index in sampling order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Integer sampling rate in frames per second.
///
/// The downstream interpreter only understands integral rates, so this is not a rational.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Fps(u32);

impl Fps {
    /// Create a validated FPS value.
    pub fn new(fps: u32) -> DeltaGridResult<Self> {
        if fps == 0 {
            return Err(DeltaGridError::validation("fps must be > 0"));
        }
        Ok(Self(fps))
    }

    /// Raw frames-per-second value.
    pub fn get(self) -> u32 {
        self.0
    }

    /// Timestamp in seconds at which frame `idx` is sampled.
    pub fn frame_time_secs(self, idx: FrameIndex) -> f64 {
        (idx.0 as f64) / f64::from(self.0)
    }

    /// Convert seconds to frame count using floor semantics.
    ///
    /// Products within `1e-9` below an integer count as that integer, so `n / fps` seconds
    /// always maps back to `n` frames.
    pub fn secs_to_frames_floor(self, secs: f64) -> u64 {
        (secs * f64::from(self.0) + 1e-9).floor().max(0.0) as u64
    }
}

/// Pixel dimensions of a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameSize {
    /// Number of bytes in a tightly packed RGBA8 buffer of this size.
    pub fn rgba8_len(self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
