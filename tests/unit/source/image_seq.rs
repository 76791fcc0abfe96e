use super::*;
use crate::foundation::core::{FrameIndex, FrameSize};

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "deltagrid_image_seq_{tag}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn request(index: u64, width: u32, height: u32) -> FrameRequest {
    FrameRequest {
        index: FrameIndex(index),
        time_sec: index as f64 / 10.0,
        size: FrameSize { width, height },
    }
}

#[test]
fn stills_are_served_in_name_order() {
    let dir = temp_dir("order");
    for (name, v) in [("frame_00002.png", 200u8), ("frame_00001.png", 100u8)] {
        image::RgbaImage::from_pixel(4, 4, image::Rgba([v, v, v, 255]))
            .save(dir.join(name))
            .unwrap();
    }
    std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

    let mut src = ImageSequenceSource::open(&dir, 10).unwrap();
    assert_eq!(src.len(), 2);
    assert!((src.duration_sec() - 0.2).abs() < 1e-12);

    let mut frame = RawFrame::blank(FrameSize {
        width: 1,
        height: 1,
    });
    assert_eq!(
        src.next_frame(request(0, 4, 4), &mut frame).unwrap(),
        FrameFetch::Ready
    );
    assert_eq!(&frame.data[..4], &[100, 100, 100, 255]);
    src.next_frame(request(1, 4, 4), &mut frame).unwrap();
    assert_eq!(&frame.data[..4], &[200, 200, 200, 255]);
    assert_eq!(
        src.next_frame(request(2, 4, 4), &mut frame).unwrap(),
        FrameFetch::Exhausted
    );

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn stills_are_scaled_to_the_request() {
    let dir = temp_dir("scale");
    image::RgbaImage::from_pixel(16, 8, image::Rgba([30, 60, 90, 255]))
        .save(dir.join("a.png"))
        .unwrap();

    let mut src = ImageSequenceSource::open(&dir, 10).unwrap();
    let mut frame = RawFrame::blank(FrameSize {
        width: 1,
        height: 1,
    });
    src.next_frame(request(0, 8, 4), &mut frame).unwrap();
    assert_eq!(frame.width, 8);
    assert_eq!(frame.height, 4);
    assert_eq!(frame.data.len(), 8 * 4 * 4);
    assert_eq!(&frame.data[..4], &[30, 60, 90, 255]);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn corrupt_still_is_a_decode_error() {
    let dir = temp_dir("corrupt");
    std::fs::write(dir.join("a.png"), b"not a png").unwrap();
    let mut src = ImageSequenceSource::open(&dir, 10).unwrap();
    let mut frame = RawFrame::blank(FrameSize {
        width: 4,
        height: 4,
    });
    assert!(matches!(
        src.next_frame(request(0, 4, 4), &mut frame),
        Err(DeltaGridError::Decode(_))
    ));
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn missing_directory_fails_to_open() {
    let dir = std::env::temp_dir().join("deltagrid_image_seq_does_not_exist");
    assert!(ImageSequenceSource::open(&dir, 10).is_err());
}
