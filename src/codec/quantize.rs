/// Round `v` down to the nearest multiple of `step`.
///
/// `step` must be non-zero; [`crate::ConversionJob::validate`] guarantees this for job-driven
/// runs. The result satisfies `quantize(v, s) <= v < quantize(v, s) + s`, so any step above
/// 255 maps every value to 0.
#[inline]
pub fn quantize(v: u8, step: u32) -> u8 {
    debug_assert!(step != 0, "quantization step must be non-zero");
    // Never exceeds `v`, so the narrowing is lossless.
    ((u32::from(v) / step) * step) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/codec/quantize.rs"]
mod tests;
