use super::*;

#[test]
fn fps_rejects_zero() {
    assert!(Fps::new(0).is_err());
    assert_eq!(Fps::new(15).unwrap().get(), 15);
}

#[test]
fn frame_times_step_by_one_over_fps() {
    let fps = Fps::new(10).unwrap();
    assert_eq!(fps.frame_time_secs(FrameIndex(0)), 0.0);
    assert!((fps.frame_time_secs(FrameIndex(3)) - 0.3).abs() < 1e-12);
}

#[test]
fn secs_to_frames_floors_and_clamps() {
    let fps = Fps::new(15).unwrap();
    assert_eq!(fps.secs_to_frames_floor(2.99), 44);
    assert_eq!(fps.secs_to_frames_floor(-1.0), 0);
}

#[test]
fn secs_to_frames_survives_division_roundoff() {
    for fps in [7u32, 10, 15, 24, 49] {
        let f = Fps::new(fps).unwrap();
        for n in 0..500u64 {
            assert_eq!(f.secs_to_frames_floor(n as f64 / f64::from(fps)), n);
        }
    }
}

#[test]
fn rgba8_len_is_four_bytes_per_pixel() {
    let size = FrameSize {
        width: 8,
        height: 4,
    };
    assert_eq!(size.rgba8_len(), 128);
}
