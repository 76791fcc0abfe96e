use super::*;

#[test]
fn bounds_hold_for_common_steps() {
    for step in [2u32, 4, 8, 16, 32] {
        for v in 0..=255u8 {
            let q = quantize(v, step);
            assert!(q <= v, "v={v} step={step}");
            assert!(u32::from(q) + step > u32::from(v), "v={v} step={step}");
            assert_eq!(u32::from(q) % step, 0);
        }
    }
}

#[test]
fn monotonic_non_decreasing() {
    for step in [1u32, 3, 8, 255, 256] {
        let mut last = 0u8;
        for v in 0..=255u8 {
            let q = quantize(v, step);
            assert!(q >= last);
            last = q;
        }
    }
}

#[test]
fn step_one_is_identity() {
    for v in 0..=255u8 {
        assert_eq!(quantize(v, 1), v);
    }
}

#[test]
fn known_values() {
    assert_eq!(quantize(10, 8), 8);
    assert_eq!(quantize(16, 8), 16);
    assert_eq!(quantize(255, 16), 240);
    assert_eq!(quantize(254, 255), 0);
    assert_eq!(quantize(255, 255), 255);
}

#[test]
fn steps_wider_than_a_channel_zero_everything() {
    for step in [256u32, 1000, u32::MAX] {
        for v in [0u8, 1, 128, 255] {
            assert_eq!(quantize(v, step), 0, "v={v} step={step}");
        }
    }
}
