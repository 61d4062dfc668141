#![doc = include_str!("../README.md")]
#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod amp;
pub mod block;
pub mod cabsim;
pub mod control;
pub mod error;
pub mod fft;
pub mod metering;
pub mod pipeline;
pub mod sync;
pub mod utils;

pub use error::Error;

/// Number of samples per channel in one audio block.
pub const BLOCK_SIZE: usize = 128;

/// Transform length of the convolution engine. Twice the block length so that
/// circular convolution of zero-padded blocks equals linear convolution.
pub const FFT_LENGTH: usize = 2 * BLOCK_SIZE;

/// Number of slots in the impulse response registry.
pub const MAX_IR_SLOTS: usize = 11;

/// Default upper bound on convolution partitions (8192 taps).
pub const DEFAULT_MAX_PARTITIONS: usize = 8192 / BLOCK_SIZE;

/// Capacity of the model bank. External model indices run from 1 to this
/// value, 0 selects bypass.
pub const MAX_MODELS: usize = 16;

/// Number of recurrent units in the amp model.
pub const GRU_HIDDEN_SIZE: usize = 9;

/// Weights per input of the recurrent layer (update, reset and candidate gates).
pub const GRU_GATES: usize = 3 * GRU_HIDDEN_SIZE;

/// Sample rate assumed when none is configured.
pub const DEFAULT_SAMPLE_RATE_HZ: f32 = 44100.0;

/// Sample rate context for DSP calculations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleRate {
    /// Sample rate in Hz
    pub sample_rate_hz: f32,
    /// Reciprocal of sample rate (1.0 / sample_rate_hz) for fast multiplication
    pub inv_sr: f32,
}

impl SampleRate {
    /// Create a new sample rate context.
    pub fn new(sample_rate_hz: f32) -> Self {
        Self {
            sample_rate_hz,
            inv_sr: 1.0 / sample_rate_hz,
        }
    }

    /// Duration of `samples` samples in milliseconds.
    #[inline]
    pub fn samples_to_ms(&self, samples: usize) -> f32 {
        samples as f32 * self.inv_sr * 1000.0
    }

    /// Nearest whole number of samples for `ms` milliseconds.
    #[inline]
    pub fn ms_to_samples(&self, ms: f32) -> usize {
        (ms.max(0.0) * 0.001 * self.sample_rate_hz + 0.5) as usize
    }

    /// Duration of one block of `BLOCK_SIZE` samples in microseconds.
    #[inline]
    pub fn block_period_us(&self) -> f32 {
        BLOCK_SIZE as f32 * self.inv_sr * 1_000_000.0
    }
}

impl Default for SampleRate {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE_HZ)
    }
}
