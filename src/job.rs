use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::{Fps, FrameSize};
use crate::foundation::error::{DeltaGridError, DeltaGridResult};

/// Immutable configuration of one conversion run.
///
/// Field names follow the camelCase spelling used by job files (`quantStep`, `maxSeconds`).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConversionJob {
    /// Sampling rate for frame extraction.
    pub fps: u32,
    /// Requested working width before block truncation.
    pub width: u32,
    /// Requested working height before block truncation.
    pub height: u32,
    /// Edge length of one averaged tile.
    pub block: u32,
    /// Channel quantization step.
    pub quant_step: u32,
    /// Hard cap on the source duration processed.
    pub max_seconds: f64,
}

impl Default for ConversionJob {
    fn default() -> Self {
        Preset::Balanced.job()
    }
}

impl ConversionJob {
    /// Check ranges and tileability. Called before any frame is requested.
    pub fn validate(&self) -> DeltaGridResult<()> {
        Fps::new(self.fps)?;
        if self.width == 0 || self.height == 0 {
            return Err(DeltaGridError::validation("width/height must be non-zero"));
        }
        if self.block == 0 {
            return Err(DeltaGridError::validation("block must be >= 1"));
        }
        if self.quant_step == 0 {
            return Err(DeltaGridError::validation("quantStep must be >= 1"));
        }
        if !self.max_seconds.is_finite() || self.max_seconds <= 0.0 {
            return Err(DeltaGridError::validation(
                "maxSeconds must be finite and > 0",
            ));
        }
        let size = self.effective_size();
        if size.width == 0 || size.height == 0 {
            return Err(DeltaGridError::dimension_mismatch(
                self.width,
                self.height,
                self.block,
            ));
        }
        Ok(())
    }

    /// Validated sampling rate.
    pub fn fps(&self) -> DeltaGridResult<Fps> {
        Fps::new(self.fps)
    }

    /// Working resolution truncated down to whole blocks.
    pub fn effective_size(&self) -> FrameSize {
        let block = self.block.max(1);
        FrameSize {
            width: (self.width / block) * block,
            height: (self.height / block) * block,
        }
    }

    /// Grid columns, derived from the effective width.
    pub fn grid_width(&self) -> u32 {
        self.effective_size().width / self.block.max(1)
    }

    /// Grid rows, derived from the effective height.
    pub fn grid_height(&self) -> u32 {
        self.effective_size().height / self.block.max(1)
    }

    /// Number of cells per frame.
    pub fn grid_size(&self) -> usize {
        self.grid_width() as usize * self.grid_height() as usize
    }

    /// Planned number of frames for a source of `source_duration_sec`.
    ///
    /// The source duration must be finite and positive; it is then capped at `max_seconds`. At
    /// least one frame is always planned.
    pub fn planned_frames(&self, source_duration_sec: f64) -> DeltaGridResult<u64> {
        let duration = self.capped_duration(source_duration_sec)?;
        Ok(self.fps()?.secs_to_frames_floor(duration).max(1))
    }

    /// Seconds of a source of `source_duration_sec` that this job converts.
    pub fn capped_duration(&self, source_duration_sec: f64) -> DeltaGridResult<f64> {
        if !source_duration_sec.is_finite() || source_duration_sec <= 0.0 {
            return Err(DeltaGridError::InvalidDuration(source_duration_sec));
        }
        Ok(source_duration_sec.min(self.max_seconds))
    }

    /// Rough playback cost of this grid for the downstream interpreter.
    pub fn playback_load(&self) -> PlaybackLoad {
        PlaybackLoad::classify(self.grid_size() as u64 * u64::from(self.fps))
    }

    /// Load a job from a JSON file.
    pub fn from_json_file(path: &Path) -> DeltaGridResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read job file '{}'", path.display()))?;
        let job: Self = serde_json::from_slice(&bytes)
            .map_err(|e| DeltaGridError::validation(format!("job json parse failed: {e}")))?;
        job.validate()?;
        Ok(job)
    }
}

/// Named quality/cost trade-offs.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Coarse and cheap.
    Fast,
    /// Default trade-off.
    Balanced,
    /// Finer grid and colors.
    High,
    /// Finest grid; heavy playback.
    Ultra,
}

impl Preset {
    /// All presets, lightest first.
    pub const ALL: [Preset; 4] = [Preset::Fast, Preset::Balanced, Preset::High, Preset::Ultra];

    /// Job settings for this preset.
    pub fn job(self) -> ConversionJob {
        let (fps, max_seconds, width, height, block, quant_step) = match self {
            Preset::Fast => (10, 20.0, 256, 144, 8, 16),
            Preset::Balanced => (15, 30.0, 256, 144, 4, 8),
            Preset::High => (15, 30.0, 384, 216, 4, 4),
            Preset::Ultra => (15, 30.0, 512, 288, 2, 4),
        };
        ConversionJob {
            fps,
            width,
            height,
            block,
            quant_step,
            max_seconds,
        }
    }

    /// Lowercase name as accepted on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Preset::Fast => "fast",
            Preset::Balanced => "balanced",
            Preset::High => "high",
            Preset::Ultra => "ultra",
        }
    }
}

/// Playback cost class derived from cells updated per second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum PlaybackLoad {
    /// Up to 50k cells per second.
    Light,
    /// Up to 120k cells per second.
    Medium,
    /// Anything above.
    Heavy,
}

impl PlaybackLoad {
    /// Classify a `grid_size * fps` score.
    pub fn classify(cells_per_sec: u64) -> Self {
        match cells_per_sec {
            0..=50_000 => PlaybackLoad::Light,
            50_001..=120_000 => PlaybackLoad::Medium,
            _ => PlaybackLoad::Heavy,
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            PlaybackLoad::Light => "Light",
            PlaybackLoad::Medium => "Medium",
            PlaybackLoad::Heavy => "Heavy",
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/job.rs"]
mod tests;
