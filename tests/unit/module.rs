use super::*;

fn header() -> ModuleHeader {
    ModuleHeader {
        width: 2,
        height: 2,
        fps: 15,
    }
}

#[test]
fn layout_is_byte_exact() {
    let frames = vec![
        EncodedFrame::Keyframe(vec![8; 12]),
        EncodedFrame::Delta(vec![]),
        EncodedFrame::Delta(vec![3, 16, 16, 16]),
    ];
    let text = to_module_string(header(), &frames).unwrap();
    assert_eq!(
        text,
        "return {\n  Width = 2,\n  Height = 2,\n  FPS = 15,\n  Frames = {\n    \
         {8,8,8,8,8,8,8,8,8,8,8,8},\n    {},\n    {3,16,16,16},\n  }\n}\n"
    );
}

#[test]
fn large_indices_have_no_separators() {
    let frames = vec![EncodedFrame::Delta(vec![12345, 0, 8, 248])];
    let text = to_module_string(header(), &frames).unwrap();
    assert!(text.contains("    {12345,0,8,248},\n"));
}

#[test]
fn parse_reads_back_written_text() {
    let frames = vec![
        EncodedFrame::Keyframe(vec![0, 8, 16, 24, 32, 40, 48, 56, 64, 72, 80, 88]),
        EncodedFrame::Delta(vec![4, 255, 0, 0]),
        EncodedFrame::Delta(vec![]),
    ];
    let text = to_module_string(header(), &frames).unwrap();
    let module = parse_module(&text).unwrap();
    assert_eq!(module.header, header());
    assert_eq!(module.encoded_frames(), frames);
    assert_eq!(module.changed_cells(), 1);

    let grids = module.replay().unwrap();
    assert_eq!(grids.len(), 3);
    assert_eq!(grids[1].cells[3], crate::codec::grid::GridCell::new(255, 0, 0));
    assert_eq!(grids[2], grids[1]);
}

#[test]
fn parse_tolerates_whitespace_and_missing_trailing_commas() {
    let module = parse_module("return{Width=1,Height=1,FPS=10,Frames={{1,2,3},{ }}}").unwrap();
    assert_eq!(module.frames, vec![vec![1, 2, 3], vec![]]);
}

#[test]
fn parse_rejects_malformed_text() {
    for bad in [
        "",
        "return { Width = 1, Height = 1, FPS = 10, Frames = { {1,2,} } }",
        "return { Width = -1, Height = 1, FPS = 10, Frames = { } }",
        "return { Height = 1, Width = 1, FPS = 10, Frames = { } }",
        "return { Width = 1, Height = 1, FPS = 10, Frames = { } } extra",
    ] {
        assert!(
            matches!(parse_module(bad), Err(DeltaGridError::Serialization(_))),
            "{bad:?}"
        );
    }
}
