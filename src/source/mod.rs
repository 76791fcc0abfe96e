//! Frame Source capability and its adapters.
//!
//! The codec never decodes video itself. A [`FrameSource`] fills the run's single scratch
//! [`RawFrame`] on request; each environment (ffmpeg subprocess, extracted stills, in-memory
//! buffers) provides its own adapter.

mod ffmpeg;
mod image_seq;
mod memory;

pub use ffmpeg::{FfmpegFrameSource, VideoProbe, is_ffmpeg_on_path, probe_video};
pub use image_seq::ImageSequenceSource;
pub use memory::MemoryFrameSource;

use crate::codec::grid::RawFrame;
use crate::foundation::core::{Fps, FrameIndex, FrameSize};
use crate::foundation::error::DeltaGridResult;

/// What a run will ask of its source, announced once before the first frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SourcePlan {
    /// Sampling rate.
    pub fps: Fps,
    /// Exact size every delivered frame must have.
    pub size: FrameSize,
    /// Seconds of source that will be sampled.
    pub duration_sec: f64,
    /// Frames that will be requested.
    pub frames: u64,
}

/// One frame request. Requests arrive with strictly ascending `index`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameRequest {
    /// 0-based sample index.
    pub index: FrameIndex,
    /// Sample timestamp, `index / fps`.
    pub time_sec: f64,
    /// Exact size the frame must be delivered at.
    pub size: FrameSize,
}

/// Outcome of [`FrameSource::next_frame`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameFetch {
    /// The scratch frame now holds the requested pixels.
    Ready,
    /// The source has no more frames.
    Exhausted,
}

/// Supplier of decoded RGBA8 frames.
pub trait FrameSource {
    /// Source duration in seconds. May be zero or non-finite; the pipeline validates it.
    fn duration_sec(&self) -> f64;

    /// Called once before any frame is requested.
    fn begin(&mut self, _plan: &SourcePlan) -> DeltaGridResult<()> {
        Ok(())
    }

    /// Fill `out` with the requested frame at `req.size`.
    fn next_frame(&mut self, req: FrameRequest, out: &mut RawFrame)
    -> DeltaGridResult<FrameFetch>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn duration_sec(&self) -> f64 {
        (**self).duration_sec()
    }

    fn begin(&mut self, plan: &SourcePlan) -> DeltaGridResult<()> {
        (**self).begin(plan)
    }

    fn next_frame(
        &mut self,
        req: FrameRequest,
        out: &mut RawFrame,
    ) -> DeltaGridResult<FrameFetch> {
        (**self).next_frame(req, out)
    }
}
