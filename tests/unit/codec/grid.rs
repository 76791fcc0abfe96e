use super::*;

fn size(width: u32, height: u32) -> FrameSize {
    FrameSize { width, height }
}

#[test]
fn set_pixel_writes_rgba_in_row_major_order() {
    let mut frame = RawFrame::blank(size(3, 2));
    frame.set_pixel(2, 1, [1, 2, 3, 4]);
    assert_eq!(&frame.data[20..24], &[1, 2, 3, 4]);
    assert!(frame.data[..20].iter().all(|b| *b == 0));
}

#[test]
#[should_panic(expected = "outside 3x2 frame")]
fn set_pixel_past_row_end_panics() {
    // (3, 0) would otherwise alias (0, 1).
    let mut frame = RawFrame::blank(size(3, 2));
    frame.set_pixel(3, 0, [9, 9, 9, 9]);
}

#[test]
fn new_rejects_mismatched_buffer() {
    assert!(matches!(
        RawFrame::new(2, 2, vec![0; 15]),
        Err(DeltaGridError::Decode(_))
    ));
}
