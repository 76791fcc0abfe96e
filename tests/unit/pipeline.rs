use super::*;
use crate::foundation::core::FrameSize;
use crate::progress::NullProgress;
use crate::source::MemoryFrameSource;

fn job(fps: u32, max_seconds: f64) -> ConversionJob {
    ConversionJob {
        fps,
        width: 8,
        height: 8,
        block: 4,
        quant_step: 8,
        max_seconds,
    }
}

fn gray(v: u8) -> RawFrame {
    RawFrame::filled(
        FrameSize {
            width: 8,
            height: 8,
        },
        [v, v, v, 255],
    )
}

fn run(
    job: &ConversionJob,
    source: &mut dyn FrameSource,
    cancel: &CancelToken,
) -> DeltaGridResult<Conversion> {
    convert(job, source, &mut NullProgress, cancel, &ConvertOpts::default())
}

struct FailingSource {
    fail_at: u64,
}

impl FrameSource for FailingSource {
    fn duration_sec(&self) -> f64 {
        10.0
    }

    fn next_frame(
        &mut self,
        req: FrameRequest,
        out: &mut RawFrame,
    ) -> DeltaGridResult<FrameFetch> {
        if req.index.0 == self.fail_at {
            return Err(DeltaGridError::decode("corrupt packet"));
        }
        *out = gray(10);
        Ok(FrameFetch::Ready)
    }
}

#[test]
fn frames_follow_source_order() {
    let mut src = MemoryFrameSource::at_fps(vec![gray(10), gray(10), gray(20)], 10);
    let conv = run(&job(10, 30.0), &mut src, &CancelToken::new()).unwrap();
    assert_eq!(conv.header.width, 2);
    assert_eq!(conv.header.height, 2);
    assert_eq!(conv.header.fps, 10);
    assert_eq!(
        conv.frames,
        vec![
            EncodedFrame::Keyframe(vec![8; 12]),
            EncodedFrame::Delta(vec![]),
            EncodedFrame::Delta(vec![1, 16, 16, 16, 2, 16, 16, 16, 3, 16, 16, 16, 4, 16, 16, 16]),
        ]
    );
    assert_eq!(conv.stats.frames_planned, 3);
    assert_eq!(conv.stats.frames_done, 3);
    assert_eq!(conv.stats.cells_changed, 4);
}

#[test]
fn max_seconds_caps_the_frame_count() {
    let frames: Vec<RawFrame> = (0..20).map(|_| gray(0)).collect();
    let mut src = MemoryFrameSource::at_fps(frames, 10);
    let conv = run(&job(10, 0.5), &mut src, &CancelToken::new()).unwrap();
    assert_eq!(conv.frames.len(), 5);
}

#[test]
fn early_end_of_stream_keeps_frames_so_far() {
    let mut src = MemoryFrameSource::new(vec![gray(0), gray(0)], 1.0);
    let conv = run(&job(10, 30.0), &mut src, &CancelToken::new()).unwrap();
    assert_eq!(conv.stats.frames_planned, 10);
    assert_eq!(conv.stats.frames_done, 2);
    assert_eq!(conv.frames.len(), 2);
}

#[test]
fn empty_source_reports_no_frames() {
    let mut src = MemoryFrameSource::new(vec![], 1.0);
    assert!(matches!(
        run(&job(10, 30.0), &mut src, &CancelToken::new()),
        Err(DeltaGridError::NoFramesExtracted)
    ));
}

#[test]
fn bad_duration_fails_before_any_frame() {
    for d in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let mut src = MemoryFrameSource::new(vec![gray(0)], d);
        assert!(
            matches!(
                run(&job(10, 30.0), &mut src, &CancelToken::new()),
                Err(DeltaGridError::InvalidDuration(_))
            ),
            "{d}"
        );
    }
}

#[test]
fn unbounded_source_is_rejected() {
    let mut src = MemoryFrameSource::new((0..50).map(|_| gray(0)).collect(), f64::INFINITY);
    assert!(matches!(
        run(&job(10, 2.0), &mut src, &CancelToken::new()),
        Err(DeltaGridError::InvalidDuration(_))
    ));
}

#[test]
fn long_source_is_capped_by_max_seconds() {
    let mut src = MemoryFrameSource::new((0..50).map(|_| gray(0)).collect(), 5.0);
    let conv = run(&job(10, 2.0), &mut src, &CancelToken::new()).unwrap();
    assert_eq!(conv.frames.len(), 20);
}

#[test]
fn decode_errors_abort_the_run() {
    let mut src = FailingSource { fail_at: 3 };
    assert!(matches!(
        run(&job(10, 1.0), &mut src, &CancelToken::new()),
        Err(DeltaGridError::Decode(_))
    ));
}

#[test]
fn wrongly_sized_frames_are_rejected() {
    let odd = RawFrame::filled(
        FrameSize {
            width: 12,
            height: 8,
        },
        [0, 0, 0, 255],
    );
    let mut src = MemoryFrameSource::at_fps(vec![odd], 10);
    assert!(matches!(
        run(&job(10, 30.0), &mut src, &CancelToken::new()),
        Err(DeltaGridError::Decode(_))
    ));
}

#[test]
fn untileable_job_fails_before_fetching() {
    let mut src = FailingSource { fail_at: 0 };
    let j = ConversionJob {
        width: 2,
        ..job(10, 1.0)
    };
    assert!(matches!(
        run(&j, &mut src, &CancelToken::new()),
        Err(DeltaGridError::DimensionMismatch { .. })
    ));
}

#[test]
fn cancelled_token_aborts_at_frame_boundary() {
    let cancel = CancelToken::new();
    let trigger = cancel.clone();
    let mut seen = 0u64;
    let mut on_progress = |e: ProgressEvent| {
        if let ProgressEvent::Frame(s) = e {
            seen = s.done;
            if s.done == 2 {
                trigger.cancel();
            }
        }
    };
    let mut src = MemoryFrameSource::at_fps((0..10).map(|_| gray(0)).collect(), 10);
    let res = convert(
        &job(10, 30.0),
        &mut src,
        &mut on_progress,
        &cancel,
        &ConvertOpts::default(),
    );
    assert!(matches!(res, Err(DeltaGridError::Cancelled)));
    assert_eq!(seen, 2);
}

#[test]
fn progress_events_bracket_the_run() {
    let mut events = Vec::new();
    let mut sink = |e: ProgressEvent| events.push(e);
    let mut src = MemoryFrameSource::at_fps(vec![gray(0), gray(9), gray(200)], 10);
    convert(
        &job(10, 30.0),
        &mut src,
        &mut sink,
        &CancelToken::new(),
        &ConvertOpts::default(),
    )
    .unwrap();

    assert_eq!(events.first(), Some(&ProgressEvent::Started { total: 3 }));
    assert_eq!(events.last(), Some(&ProgressEvent::Finished { frames: 3 }));
    let done: Vec<u64> = events
        .iter()
        .filter_map(|e| match e {
            ProgressEvent::Frame(s) => Some(s.done),
            _ => None,
        })
        .collect();
    assert_eq!(done, vec![1, 2, 3]);
}

#[test]
fn wide_quant_step_produces_zero_keyframe() {
    let job = ConversionJob {
        quant_step: 256,
        ..job(10, 1.0)
    };
    let mut src = MemoryFrameSource::new(vec![gray(250), gray(250)], 0.2);
    let conv = run(&job, &mut src, &CancelToken::new()).unwrap();
    assert_eq!(conv.frames[0], EncodedFrame::Keyframe(vec![0; 12]));
    assert_eq!(conv.frames[1], EncodedFrame::Delta(vec![]));
}
