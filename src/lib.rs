//! deltagrid turns a decoded video into a compact pixel-grid module for a downstream playback
//! interpreter.
//!
//! Each sampled frame is averaged over `block x block` tiles, quantized per channel and
//! compared with the previous frame. The first frame is written whole, later frames only list
//! the cells that changed:
//!
//! - Describe the run with a [`ConversionJob`] (or a [`Preset`])
//! - Supply frames through a [`FrameSource`]
//! - Call [`convert`] and serialize the [`Conversion`] with [`Conversion::to_module_string`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub mod codec;
/// Run configuration and presets.
pub mod job;
pub mod module;
/// Persisting serialized modules.
pub mod output;
/// Frame loop orchestration.
pub mod pipeline;
/// Throughput and ETA reporting.
pub mod progress;
pub mod source;

pub use crate::foundation::core::{Fps, FrameIndex, FrameSize};
pub use crate::foundation::error::{DeltaGridError, DeltaGridResult};

pub use crate::codec::delta::{DeltaEncoder, EncodedFrame};
pub use crate::codec::downsample::BlockDownsampler;
pub use crate::codec::grid::{Grid, GridCell, RawFrame};
pub use crate::codec::quantize::quantize;
pub use crate::codec::replay::GridReplay;
pub use crate::job::{ConversionJob, PlaybackLoad, Preset};
pub use crate::module::{ModuleHeader, VideoModule, parse_module, to_module_string};
pub use crate::output::{DEFAULT_OUTPUT_NAME, write_module_file};
pub use crate::pipeline::{
    CancelToken, Conversion, ConvertOpts, ConvertStats, convert, convert_to_module,
};
pub use crate::progress::{
    ChannelProgress, NullProgress, ProgressEstimator, ProgressEvent, ProgressSink,
    ProgressSnapshot, format_eta,
};
pub use crate::source::{
    FfmpegFrameSource, FrameFetch, FrameRequest, FrameSource, ImageSequenceSource,
    MemoryFrameSource, SourcePlan,
};
