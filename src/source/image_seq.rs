use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::imageops::FilterType;

use crate::codec::grid::RawFrame;
use crate::foundation::error::{DeltaGridError, DeltaGridResult};
use crate::source::{FrameFetch, FrameRequest, FrameSource};

const STILL_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Directory of already-extracted stills, one per sample, ordered by file name.
///
/// Stills whose size differs from the request are scaled with a triangle filter.
#[derive(Clone, Debug)]
pub struct ImageSequenceSource {
    files: Vec<PathBuf>,
    fps: u32,
}

impl ImageSequenceSource {
    /// List the stills in `dir`. The sequence is taken to be sampled at `fps`.
    pub fn open(dir: &Path, fps: u32) -> DeltaGridResult<Self> {
        if fps == 0 {
            return Err(DeltaGridError::validation("fps must be > 0"));
        }
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("read frame directory '{}'", dir.display()))?;
        let mut files = Vec::new();
        for entry in entries {
            let path = entry
                .with_context(|| format!("list frame directory '{}'", dir.display()))?
                .path();
            let is_still = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| STILL_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
            if path.is_file() && is_still {
                files.push(path);
            }
        }
        files.sort();
        tracing::debug!(dir = %dir.display(), count = files.len(), "listed still frames");
        Ok(Self { files, fps })
    }

    /// Number of stills found.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// `true` when the directory held no stills.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FrameSource for ImageSequenceSource {
    fn duration_sec(&self) -> f64 {
        self.files.len() as f64 / f64::from(self.fps)
    }

    fn next_frame(
        &mut self,
        req: FrameRequest,
        out: &mut RawFrame,
    ) -> DeltaGridResult<FrameFetch> {
        let Some(path) = self.files.get(req.index.0 as usize) else {
            return Ok(FrameFetch::Exhausted);
        };
        let img = image::open(path)
            .map_err(|e| DeltaGridError::decode(format!("decode '{}': {e}", path.display())))?
            .to_rgba8();
        let img = if img.dimensions() == (req.size.width, req.size.height) {
            img
        } else {
            image::imageops::resize(&img, req.size.width, req.size.height, FilterType::Triangle)
        };

        out.reshape(req.size);
        out.data.copy_from_slice(img.as_raw());
        Ok(FrameFetch::Ready)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/image_seq.rs"]
mod tests;
