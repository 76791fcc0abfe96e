use std::sync::mpsc::Sender;
use std::time::Duration;

/// Floor applied to elapsed time and speed so early ticks never divide by zero.
pub const ESTIMATE_EPSILON: f64 = 0.01;

/// Throughput and remaining-time estimate after a completed frame.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ProgressSnapshot {
    /// Frames completed.
    pub done: u64,
    /// Frames planned.
    pub total: u64,
    /// Frames per wall-clock second so far.
    pub speed_fps: f64,
    /// Estimated seconds remaining; `None` while the estimate is still warming up.
    pub eta_secs: Option<f64>,
}

impl ProgressSnapshot {
    /// Completion in whole percent, rounded to nearest.
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.done as f64 / self.total as f64) * 100.0).round() as u32
    }
}

/// Pure estimator over `(done, total, elapsed)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProgressEstimator;

impl ProgressEstimator {
    /// Estimate speed and ETA.
    pub fn estimate(done: u64, total: u64, elapsed: Duration) -> ProgressSnapshot {
        let speed = done as f64 / elapsed.as_secs_f64().max(ESTIMATE_EPSILON);
        let remaining = total.saturating_sub(done) as f64;
        ProgressSnapshot {
            done,
            total,
            speed_fps: speed,
            eta_secs: Some(remaining / speed.max(ESTIMATE_EPSILON)),
        }
    }
}

/// Events published while a conversion runs.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub enum ProgressEvent {
    /// Frame loop is about to start.
    Started {
        /// Frames planned.
        total: u64,
    },
    /// A frame finished.
    Frame(ProgressSnapshot),
    /// All frames are encoded and the module is about to be built.
    Finished {
        /// Frames encoded.
        frames: u64,
    },
}

/// Receiver of progress events. Fire-and-forget: sinks cannot slow down or fail a run.
pub trait ProgressSink {
    /// Deliver one event.
    fn emit(&mut self, event: ProgressEvent);
}

/// Sink that drops everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn emit(&mut self, _event: ProgressEvent) {}
}

/// Sink forwarding into an mpsc channel, decoupling the run from whoever renders progress.
#[derive(Clone, Debug)]
pub struct ChannelProgress(pub Sender<ProgressEvent>);

impl ProgressSink for ChannelProgress {
    fn emit(&mut self, event: ProgressEvent) {
        // A hung-up receiver just stops listening.
        let _ = self.0.send(event);
    }
}

impl<F: FnMut(ProgressEvent)> ProgressSink for F {
    fn emit(&mut self, event: ProgressEvent) {
        self(event)
    }
}

/// Rate limiter for ETA recomputation.
///
/// ETA stays `None` for the first `warmup_frames` and is refreshed at most once per
/// `interval`; between refreshes the last value is repeated. The final frame always refreshes.
#[derive(Clone, Debug)]
pub struct EtaThrottle {
    interval: Duration,
    warmup_frames: u64,
    last_update: Option<Duration>,
    last_eta: Option<f64>,
}

impl EtaThrottle {
    /// Create a throttle.
    pub fn new(interval: Duration, warmup_frames: u64) -> Self {
        Self {
            interval,
            warmup_frames,
            last_update: None,
            last_eta: None,
        }
    }

    /// Snapshot to publish after `done` of `total` frames at `elapsed`.
    pub fn snapshot(&mut self, done: u64, total: u64, elapsed: Duration) -> ProgressSnapshot {
        let mut snap = ProgressEstimator::estimate(done, total, elapsed);
        let is_last = done >= total;
        let due = match self.last_update {
            None => true,
            Some(at) => elapsed.saturating_sub(at) >= self.interval,
        };
        if is_last || (done > self.warmup_frames && due) {
            self.last_update = Some(elapsed);
            self.last_eta = snap.eta_secs;
        }
        snap.eta_secs = self.last_eta;
        snap
    }
}

/// Render seconds as `MM:SS`, or `--:--` when unknown.
pub fn format_eta(secs: Option<f64>) -> String {
    match secs {
        Some(s) if s.is_finite() && s >= 0.0 => {
            let s = s.floor() as u64;
            format!("{:02}:{:02}", s / 60, s % 60)
        }
        _ => "--:--".to_string(),
    }
}

#[cfg(test)]
#[path = "../tests/unit/progress.rs"]
mod tests;
