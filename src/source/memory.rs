use crate::codec::grid::RawFrame;
use crate::foundation::error::DeltaGridResult;
use crate::source::{FrameFetch, FrameRequest, FrameSource};

/// Frames held in memory, served by index.
///
/// Frames are delivered as stored; the pipeline rejects any whose size differs from the
/// request.
#[derive(Clone, Debug)]
pub struct MemoryFrameSource {
    frames: Vec<RawFrame>,
    duration_sec: f64,
}

impl MemoryFrameSource {
    /// Serve `frames`, reporting `duration_sec` as the source duration.
    pub fn new(frames: Vec<RawFrame>, duration_sec: f64) -> Self {
        Self {
            frames,
            duration_sec,
        }
    }

    /// Serve `frames` as if sampled at `fps`, so the duration covers exactly these frames.
    pub fn at_fps(frames: Vec<RawFrame>, fps: u32) -> Self {
        let duration_sec = frames.len() as f64 / f64::from(fps.max(1));
        Self::new(frames, duration_sec)
    }
}

impl FrameSource for MemoryFrameSource {
    fn duration_sec(&self) -> f64 {
        self.duration_sec
    }

    fn next_frame(
        &mut self,
        req: FrameRequest,
        out: &mut RawFrame,
    ) -> DeltaGridResult<FrameFetch> {
        let Some(frame) = self.frames.get(req.index.0 as usize) else {
            return Ok(FrameFetch::Exhausted);
        };
        out.width = frame.width;
        out.height = frame.height;
        out.data.clear();
        out.data.extend_from_slice(&frame.data);
        Ok(FrameFetch::Ready)
    }
}
