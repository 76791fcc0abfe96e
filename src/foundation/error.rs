/// Convenience result type used across deltagrid.
pub type DeltaGridResult<T> = Result<T, DeltaGridError>;

/// Error taxonomy for a conversion run.
///
/// Every variant except [`DeltaGridError::Other`] is terminal for the job that produced it; no
/// partial output is ever serialized after one of these is returned.
#[derive(thiserror::Error, Debug)]
pub enum DeltaGridError {
    /// Invalid user-provided configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// The frame source could not produce a requested frame.
    #[error("decode error: {0}")]
    Decode(String),

    /// The source yielded no frames for a positive duration.
    #[error("no frames extracted")]
    NoFramesExtracted,

    /// Source duration is zero, negative or non-finite.
    #[error("invalid duration: {0}")]
    InvalidDuration(f64),

    /// Working dimensions are not an exact multiple of the block size.
    #[error("dimension mismatch: {width}x{height} is not tileable by block {block}")]
    DimensionMismatch {
        /// Offending width in pixels.
        width: u32,
        /// Offending height in pixels.
        height: u32,
        /// Block edge length in pixels.
        block: u32,
    },

    /// Formatting or parsing of the module text failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Persisting the serialized module failed.
    #[error("output write error: {0}")]
    OutputWrite(String),

    /// The run was cancelled at a frame boundary.
    #[error("conversion cancelled")]
    Cancelled,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DeltaGridError {
    /// Build a [`DeltaGridError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`DeltaGridError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`DeltaGridError::Serialization`] value.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Build a [`DeltaGridError::OutputWrite`] value.
    pub fn output_write(msg: impl Into<String>) -> Self {
        Self::OutputWrite(msg.into())
    }

    /// Build a [`DeltaGridError::DimensionMismatch`] value.
    pub fn dimension_mismatch(width: u32, height: u32, block: u32) -> Self {
        Self::DimensionMismatch {
            width,
            height,
            block,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
