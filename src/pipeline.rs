use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::codec::delta::{DeltaEncoder, EncodedFrame};
use crate::codec::downsample::BlockDownsampler;
use crate::codec::grid::RawFrame;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{DeltaGridError, DeltaGridResult};
use crate::job::ConversionJob;
use crate::module::{ModuleHeader, to_module_string};
use crate::progress::{EtaThrottle, ProgressEvent, ProgressSink};
use crate::source::{FrameFetch, FrameRequest, FrameSource, SourcePlan};

/// Pacing and telemetry knobs. None of these affect the encoded output.
#[derive(Clone, Debug)]
pub struct ConvertOpts {
    /// Yield the thread after this many frames; `0` disables.
    pub yield_every: u32,
    /// Emit an `info` progress line after this many frames; `0` disables.
    pub log_every: u32,
    /// Minimum spacing between ETA refreshes.
    pub eta_interval: Duration,
    /// Frames completed before the first ETA is published.
    pub eta_warmup_frames: u64,
    /// Average tile rows on the rayon pool.
    pub parallel_tiles: bool,
}

impl Default for ConvertOpts {
    fn default() -> Self {
        Self {
            yield_every: 5,
            log_every: 25,
            eta_interval: Duration::from_millis(450),
            eta_warmup_frames: 5,
            parallel_tiles: false,
        }
    }
}

/// Shared cancellation flag checked at every frame boundary.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// `true` once [`CancelToken::cancel`] was called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Counters for a finished run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConvertStats {
    /// Frames the job asked for.
    pub frames_planned: u64,
    /// Frames actually encoded; lower than planned when the source ran out early.
    pub frames_done: u64,
    /// Cells written by delta frames.
    pub cells_changed: u64,
    /// Wall time of the frame loop.
    pub elapsed: Duration,
}

/// Complete, in-memory result of a run.
#[derive(Clone, Debug)]
pub struct Conversion {
    /// Module header.
    pub header: ModuleHeader,
    /// Encoded frames in temporal order; the first is always a keyframe.
    pub frames: Vec<EncodedFrame>,
    /// Run counters.
    pub stats: ConvertStats,
}

impl Conversion {
    /// Serialize to module text.
    pub fn to_module_string(&self) -> DeltaGridResult<String> {
        to_module_string(self.header, &self.frames)
    }
}

/// Run `job` over `source`.
///
/// Each frame is fetched, averaged, quantized and diffed before the next is requested. Any
/// error aborts the run and discards every frame encoded so far.
#[tracing::instrument(
    skip_all,
    fields(fps = job.fps, block = job.block, quant_step = job.quant_step)
)]
pub fn convert(
    job: &ConversionJob,
    source: &mut dyn FrameSource,
    progress: &mut dyn ProgressSink,
    cancel: &CancelToken,
    opts: &ConvertOpts,
) -> DeltaGridResult<Conversion> {
    job.validate()?;
    let fps = job.fps()?;
    let duration_sec = job.capped_duration(source.duration_sec())?;
    let planned = job.planned_frames(source.duration_sec())?;
    let size = job.effective_size();
    let downsampler =
        BlockDownsampler::new(job.block, job.quant_step)?.with_parallel(opts.parallel_tiles);
    let header = ModuleHeader {
        width: job.grid_width(),
        height: job.grid_height(),
        fps: fps.get(),
    };

    let plan = SourcePlan {
        fps,
        size,
        duration_sec,
        frames: planned,
    };
    source.begin(&plan)?;

    tracing::info!(
        width = size.width,
        height = size.height,
        grid_width = header.width,
        grid_height = header.height,
        duration_sec = plan.duration_sec,
        frames = planned,
        "starting conversion"
    );
    progress.emit(ProgressEvent::Started { total: planned });

    let mut scratch = RawFrame::blank(size);
    let mut encoder = DeltaEncoder::new();
    let mut frames = Vec::with_capacity(planned.min(4096) as usize);
    let mut throttle = EtaThrottle::new(opts.eta_interval, opts.eta_warmup_frames);
    let mut stats = ConvertStats {
        frames_planned: planned,
        ..ConvertStats::default()
    };
    let started = Instant::now();

    for i in 0..planned {
        if cancel.is_cancelled() {
            tracing::info!(frame = i, "conversion cancelled");
            return Err(DeltaGridError::Cancelled);
        }

        let index = FrameIndex(i);
        let req = FrameRequest {
            index,
            time_sec: fps.frame_time_secs(index),
            size,
        };
        match source.next_frame(req, &mut scratch)? {
            FrameFetch::Ready => {}
            FrameFetch::Exhausted if i == 0 => return Err(DeltaGridError::NoFramesExtracted),
            FrameFetch::Exhausted => {
                tracing::warn!(done = i, planned, "frame source ended early");
                break;
            }
        }
        if scratch.size() != size {
            return Err(DeltaGridError::decode(format!(
                "source delivered {}x{} for frame {i}, expected {}x{}",
                scratch.width, scratch.height, size.width, size.height
            )));
        }

        let grid = downsampler.downsample(&scratch)?;
        let encoded = encoder.encode(grid);
        if !encoded.is_keyframe() {
            stats.cells_changed += encoded.cells_written() as u64;
        }
        tracing::debug!(frame = i, cells = encoded.cells_written(), "encoded frame");
        frames.push(encoded);

        let done = i + 1;
        stats.frames_done = done;
        progress.emit(ProgressEvent::Frame(throttle.snapshot(
            done,
            planned,
            started.elapsed(),
        )));
        if opts.log_every > 0 && i % u64::from(opts.log_every) == 0 {
            tracing::info!("progress: {done}/{planned}");
        }
        if opts.yield_every > 0 && done % u64::from(opts.yield_every) == 0 {
            std::thread::yield_now();
        }
    }

    stats.elapsed = started.elapsed();
    progress.emit(ProgressEvent::Finished {
        frames: stats.frames_done,
    });
    tracing::info!(
        frames = stats.frames_done,
        cells_changed = stats.cells_changed,
        elapsed_ms = stats.elapsed.as_millis() as u64,
        "conversion finished"
    );

    Ok(Conversion {
        header,
        frames,
        stats,
    })
}

/// [`convert`] and serialize in one step.
pub fn convert_to_module(
    job: &ConversionJob,
    source: &mut dyn FrameSource,
    progress: &mut dyn ProgressSink,
    cancel: &CancelToken,
    opts: &ConvertOpts,
) -> DeltaGridResult<String> {
    convert(job, source, progress, cancel, opts)?.to_module_string()
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
