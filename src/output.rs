use std::path::Path;

use crate::foundation::error::{DeltaGridError, DeltaGridResult};

/// File name the playback setup expects for the data module.
pub const DEFAULT_OUTPUT_NAME: &str = "VideoDelta.lua";

/// Persist module `text` at `path`, creating parent directories.
///
/// Refuses to replace an existing file unless `overwrite` is set. Failures are reported as
/// [`DeltaGridError::OutputWrite`] and never retried.
pub fn write_module_file(path: &Path, text: &str, overwrite: bool) -> DeltaGridResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            DeltaGridError::output_write(format!(
                "failed to create output directory '{}': {e}",
                parent.display()
            ))
        })?;
    }
    if !overwrite && path.exists() {
        return Err(DeltaGridError::output_write(format!(
            "output file '{}' already exists",
            path.display()
        )));
    }
    std::fs::write(path, text).map_err(|e| {
        DeltaGridError::output_write(format!("failed to write '{}': {e}", path.display()))
    })?;
    tracing::info!(path = %path.display(), bytes = text.len(), "wrote module");
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/output.rs"]
mod tests;
