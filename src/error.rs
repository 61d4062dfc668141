//! Errors raised while ingesting impulse responses and model weights.
//!
//! None of these cross the realtime boundary: they are returned by the
//! constructors and `try_` registration calls used at startup.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum Error {
    #[error("impulse response data has {len} words, the header alone needs 2")]
    IrTooShort { len: usize },

    #[error("impulse response declares no taps")]
    EmptyIr,

    #[error("impulse response declares {declared} taps but only {available} are present")]
    IrLengthMismatch { declared: usize, available: usize },

    #[error("impulse response gain {0} is not finite")]
    InvalidGain(f32),

    #[error("expected {expected} model weights, got {actual}")]
    WeightCount { expected: usize, actual: usize },

    #[error("slot {slot} is out of range (max {max})")]
    SlotOutOfRange { slot: usize, max: usize },

    #[error("model bank is full")]
    BankFull,
}
