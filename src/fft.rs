//! Fixed-length complex FFT with owned scratch space.

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

pub type Complex32 = Complex<f32>;

/// Forward and inverse transforms of one length. Plans and scratch are
/// created up front; `forward` and `inverse` run in place without allocating.
///
/// The inverse is not normalised, a round trip scales by `len()`.
pub struct FftEngine {
    len: usize,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    scratch: Box<[Complex32]>,
}

impl FftEngine {
    pub fn new(len: usize) -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(len);
        let inverse = planner.plan_fft_inverse(len);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());

        Self {
            len,
            forward,
            inverse,
            scratch: vec![Complex32::default(); scratch_len].into_boxed_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn forward(&mut self, buffer: &mut [Complex32]) {
        debug_assert_eq!(buffer.len(), self.len);
        self.forward.process_with_scratch(buffer, &mut self.scratch);
    }

    #[inline]
    pub fn inverse(&mut self, buffer: &mut [Complex32]) {
        debug_assert_eq!(buffer.len(), self.len);
        self.inverse.process_with_scratch(buffer, &mut self.scratch);
    }
}

impl core::fmt::Debug for FftEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FftEngine").field("len", &self.len).finish()
    }
}
