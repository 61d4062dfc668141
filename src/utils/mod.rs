//! Utility building blocks shared by the processors.

pub mod delay_line;

/// Copies two channels into one complex buffer, left in the real part and
/// right in the imaginary part.
#[inline]
pub fn interleave(left: &[f32], right: &[f32], out: &mut [crate::fft::Complex32]) {
    for ((bin, l), r) in out.iter_mut().zip(left).zip(right) {
        bin.re = *l;
        bin.im = *r;
    }
}
