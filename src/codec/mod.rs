//! The frame-to-delta codec: block averaging, quantization and temporal change detection.
//!
//! Every stage here is deterministic and free of IO. Frames enter as [`RawFrame`] scratch
//! buffers owned by the caller and leave as [`EncodedFrame`] integer lists ready for
//! [`crate::module`] serialization.

/// Keyframe/delta state machine.
pub mod delta;
/// Tile averaging.
pub mod downsample;
/// Frame and grid buffers.
pub mod grid;
/// Per-channel quantization.
pub mod quantize;
/// Grid reconstruction from encoded frames.
pub mod replay;
