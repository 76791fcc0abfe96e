use std::path::{Path, PathBuf};

use crate::codec::grid::RawFrame;
use crate::foundation::error::{DeltaGridError, DeltaGridResult};
use crate::source::{FrameFetch, FrameRequest, FrameSource, SourcePlan};

/// Stream facts reported by `ffprobe`.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoProbe {
    /// Probed file.
    pub source_path: PathBuf,
    /// Native width in pixels.
    pub width: u32,
    /// Native height in pixels.
    pub height: u32,
    /// Container duration in seconds; `NaN` when ffprobe reports none.
    pub duration_sec: f64,
}

/// Return `true` when an `ffmpeg` binary runs from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    std::process::Command::new("ffmpeg")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Video source decoded by the system `ffmpeg`, sampled and scaled by ffmpeg's own filters.
///
/// Frames stream sequentially from one child process started in [`FrameSource::begin`], so
/// requests must arrive in order without gaps.
pub struct FfmpegFrameSource {
    probe: VideoProbe,
    stream: Option<imp::DecodeStream>,
    next_index: u64,
}

impl std::fmt::Debug for FfmpegFrameSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FfmpegFrameSource")
            .field("probe", &self.probe)
            .field("started", &self.stream.is_some())
            .field("next_index", &self.next_index)
            .finish()
    }
}

impl FfmpegFrameSource {
    /// Probe `path` and prepare to decode it.
    pub fn open(path: impl AsRef<Path>) -> DeltaGridResult<Self> {
        let probe = probe_video(path.as_ref())?;
        tracing::info!(
            path = %probe.source_path.display(),
            width = probe.width,
            height = probe.height,
            duration_sec = probe.duration_sec,
            "probed video"
        );
        Ok(Self {
            probe,
            stream: None,
            next_index: 0,
        })
    }

    /// Probe result for the opened file.
    pub fn probe(&self) -> &VideoProbe {
        &self.probe
    }
}

impl FrameSource for FfmpegFrameSource {
    fn duration_sec(&self) -> f64 {
        self.probe.duration_sec
    }

    fn begin(&mut self, plan: &SourcePlan) -> DeltaGridResult<()> {
        self.stream = Some(imp::DecodeStream::spawn(&self.probe.source_path, plan)?);
        self.next_index = 0;
        Ok(())
    }

    fn next_frame(
        &mut self,
        req: FrameRequest,
        out: &mut RawFrame,
    ) -> DeltaGridResult<FrameFetch> {
        if req.index.0 != self.next_index {
            return Err(DeltaGridError::decode(format!(
                "ffmpeg source expects frame {}, got request for {}",
                self.next_index, req.index.0
            )));
        }
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| DeltaGridError::decode("ffmpeg source not started"))?;
        let fetched = stream.read_frame(req.size, out)?;
        if fetched == FrameFetch::Ready {
            self.next_index += 1;
        }
        Ok(fetched)
    }
}

/// Run `ffprobe` on `path`.
pub fn probe_video(path: &Path) -> DeltaGridResult<VideoProbe> {
    imp::probe_video(path)
}

#[cfg(feature = "media-ffmpeg")]
mod imp {
    use std::io::Read as _;
    use std::path::Path;
    use std::process::{Child, ChildStdout, Command, Stdio};
    use std::thread::JoinHandle;

    use super::VideoProbe;
    use crate::codec::grid::RawFrame;
    use crate::foundation::core::FrameSize;
    use crate::foundation::error::{DeltaGridError, DeltaGridResult};
    use crate::source::{FrameFetch, SourcePlan};

    pub(super) fn probe_video(source_path: &Path) -> DeltaGridResult<VideoProbe> {
        #[derive(serde::Deserialize)]
        struct ProbeStream {
            codec_type: Option<String>,
            width: Option<u32>,
            height: Option<u32>,
        }
        #[derive(serde::Deserialize)]
        struct ProbeFormat {
            duration: Option<String>,
        }
        #[derive(serde::Deserialize)]
        struct ProbeOut {
            streams: Vec<ProbeStream>,
            format: Option<ProbeFormat>,
        }

        let out = Command::new("ffprobe")
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_streams",
                "-show_format",
            ])
            .arg(source_path)
            .output()
            .map_err(|e| DeltaGridError::decode(format!("failed to run ffprobe: {e}")))?;
        if !out.status.success() {
            return Err(DeltaGridError::decode(format!(
                "ffprobe failed for '{}': {}",
                source_path.display(),
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }

        let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
            .map_err(|e| DeltaGridError::decode(format!("ffprobe json parse failed: {e}")))?;
        let video_stream = parsed
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .ok_or_else(|| DeltaGridError::decode("no video stream found"))?;
        let width = video_stream
            .width
            .ok_or_else(|| DeltaGridError::decode("missing video width from ffprobe"))?;
        let height = video_stream
            .height
            .ok_or_else(|| DeltaGridError::decode("missing video height from ffprobe"))?;
        let duration_sec = parsed
            .format
            .as_ref()
            .and_then(|f| f.duration.as_ref())
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(f64::NAN);

        Ok(VideoProbe {
            source_path: source_path.to_path_buf(),
            width,
            height,
            duration_sec,
        })
    }

    pub(super) struct DecodeStream {
        child: Child,
        stdout: ChildStdout,
        stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
        finished: bool,
    }

    impl DecodeStream {
        pub(super) fn spawn(path: &Path, plan: &SourcePlan) -> DeltaGridResult<Self> {
            let duration = format!("{:.6}", plan.duration_sec);
            let filter = format!(
                "fps={},scale={}:{}",
                plan.fps.get(),
                plan.size.width,
                plan.size.height
            );
            let frames = plan.frames.to_string();

            let mut cmd = Command::new("ffmpeg");
            cmd.stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped());
            cmd.args(["-v", "error", "-i"])
                .arg(path)
                .args(["-t", duration.as_str(), "-vf", filter.as_str()])
                .args(["-frames:v", frames.as_str(), "-an"])
                .args(["-f", "rawvideo", "-pix_fmt", "rgba", "pipe:1"]);

            let mut child = cmd.spawn().map_err(|e| {
                DeltaGridError::decode(format!(
                    "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
                ))
            })?;
            let stdout = child
                .stdout
                .take()
                .ok_or_else(|| DeltaGridError::decode("failed to open ffmpeg stdout (unexpected)"))?;
            let mut stderr = child
                .stderr
                .take()
                .ok_or_else(|| DeltaGridError::decode("failed to open ffmpeg stderr (unexpected)"))?;
            let stderr_drain = std::thread::spawn(move || {
                let mut stderr_bytes = Vec::new();
                stderr.read_to_end(&mut stderr_bytes)?;
                Ok(stderr_bytes)
            });

            tracing::debug!(path = %path.display(), ?plan, "spawned ffmpeg decoder");
            Ok(Self {
                child,
                stdout,
                stderr_drain: Some(stderr_drain),
                finished: false,
            })
        }

        pub(super) fn read_frame(
            &mut self,
            size: FrameSize,
            out: &mut RawFrame,
        ) -> DeltaGridResult<FrameFetch> {
            if self.finished {
                return Ok(FrameFetch::Exhausted);
            }
            out.reshape(size);

            let mut filled = 0usize;
            while filled < out.data.len() {
                match self.stdout.read(&mut out.data[filled..]) {
                    Ok(0) => break,
                    Ok(n) => filled += n,
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                    Err(e) => {
                        return Err(DeltaGridError::decode(format!(
                            "failed to read frame from ffmpeg stdout: {e}"
                        )));
                    }
                }
            }

            if filled == out.data.len() {
                return Ok(FrameFetch::Ready);
            }
            self.finish()?;
            if filled != 0 {
                return Err(DeltaGridError::decode(format!(
                    "ffmpeg stream ended mid-frame: got {filled} of {} bytes",
                    out.data.len()
                )));
            }
            Ok(FrameFetch::Exhausted)
        }

        fn finish(&mut self) -> DeltaGridResult<()> {
            self.finished = true;
            let status = self.child.wait().map_err(|e| {
                DeltaGridError::decode(format!("failed to wait for ffmpeg to finish: {e}"))
            })?;
            let stderr_bytes = match self.stderr_drain.take() {
                Some(handle) => handle
                    .join()
                    .map_err(|_| DeltaGridError::decode("ffmpeg stderr drain thread panicked"))?
                    .map_err(|e| DeltaGridError::decode(format!("ffmpeg stderr read failed: {e}")))?,
                None => Vec::new(),
            };
            if !status.success() {
                return Err(DeltaGridError::decode(format!(
                    "ffmpeg exited with status {status}: {}",
                    String::from_utf8_lossy(&stderr_bytes).trim()
                )));
            }
            Ok(())
        }
    }

    impl Drop for DecodeStream {
        fn drop(&mut self) {
            if !self.finished {
                let _ = self.child.kill();
                let _ = self.child.wait();
            }
        }
    }
}

#[cfg(not(feature = "media-ffmpeg"))]
mod imp {
    use std::path::Path;

    use super::VideoProbe;
    use crate::codec::grid::RawFrame;
    use crate::foundation::core::FrameSize;
    use crate::foundation::error::{DeltaGridError, DeltaGridResult};
    use crate::source::{FrameFetch, SourcePlan};

    fn disabled() -> DeltaGridError {
        DeltaGridError::decode("video decoding requires the 'media-ffmpeg' feature")
    }

    pub(super) fn probe_video(_source_path: &Path) -> DeltaGridResult<VideoProbe> {
        Err(disabled())
    }

    pub(super) struct DecodeStream;

    impl DecodeStream {
        pub(super) fn spawn(_path: &Path, _plan: &SourcePlan) -> DeltaGridResult<Self> {
            Err(disabled())
        }

        pub(super) fn read_frame(
            &mut self,
            _size: FrameSize,
            _out: &mut RawFrame,
        ) -> DeltaGridResult<FrameFetch> {
            Err(disabled())
        }
    }
}
