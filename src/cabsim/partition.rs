//! Frequency-domain filter partitions and the rotating input history index.

use alloc::boxed::Box;
use alloc::vec;

use super::ir::ImpulseResponse;
use crate::fft::{Complex32, FftEngine};
use crate::{BLOCK_SIZE, FFT_LENGTH};

/// Number of partitions needed for `tap_count` taps, clamped to
/// `1..=max_partitions`. Responses longer than the limit are truncated.
pub fn partition_count(tap_count: usize, max_partitions: usize) -> usize {
    let partitions = tap_count.div_ceil(BLOCK_SIZE);

    partitions.clamp(1, max_partitions.max(1))
}

/// Index arithmetic for a ring of `len` slots.
///
/// Invariant: `0 <= cursor < len`, and slot `cursor` is where the newest
/// block is stored before `advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionRing {
    cursor: usize,
    len: usize,
}

impl Default for PartitionRing {
    fn default() -> Self {
        Self::new(1)
    }
}

impl PartitionRing {
    pub fn new(len: usize) -> Self {
        Self {
            cursor: 0,
            len: len.max(1),
        }
    }

    pub fn reset(&mut self, len: usize) {
        *self = Self::new(len);
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of slots, at least 1.
    #[inline]
    pub fn size(&self) -> usize {
        self.len
    }

    /// Slot written `age` blocks before the one at the cursor.
    #[inline]
    pub fn back(&self, age: usize) -> usize {
        debug_assert!(age < self.len);

        if age <= self.cursor {
            self.cursor - age
        } else {
            self.cursor + self.len - age
        }
    }

    #[inline]
    pub fn advance(&mut self) {
        self.cursor += 1;

        if self.cursor == self.len {
            self.cursor = 0;
        }
    }
}

/// Transformed impulse response partitions, one `FFT_LENGTH` bin set per
/// `BLOCK_SIZE` taps.
#[derive(Debug, Clone)]
pub struct FilterMasks {
    bins: Box<[Complex32]>,
    partitions: usize,
    capacity: usize,
}

impl FilterMasks {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);

        Self {
            bins: vec![Complex32::default(); capacity * FFT_LENGTH].into_boxed_slice(),
            partitions: 0,
            capacity,
        }
    }

    /// Partitions currently built.
    #[inline]
    pub fn partitions(&self) -> usize {
        self.partitions
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn partition(&self, index: usize) -> &[Complex32] {
        &self.bins[index * FFT_LENGTH..(index + 1) * FFT_LENGTH]
    }

    /// Rebuilds the masks from `ir`, using at most `capacity` partitions.
    ///
    /// Each partition holds `BLOCK_SIZE` taps in the first half of a zero
    /// padded transform. The IR gain and the `1 / FFT_LENGTH` normalisation of
    /// the inverse transform are folded into the taps here.
    pub fn build(&mut self, ir: &ImpulseResponse, fft: &mut FftEngine) -> usize {
        let taps = ir.taps();
        let count = partition_count(taps.len(), self.capacity);
        let scale = ir.gain() / FFT_LENGTH as f32;

        for (index, mask) in self
            .bins
            .chunks_exact_mut(FFT_LENGTH)
            .take(count)
            .enumerate()
        {
            mask.fill(Complex32::default());

            let start = index * BLOCK_SIZE;
            let end = (start + BLOCK_SIZE).min(taps.len());

            for (bin, tap) in mask.iter_mut().zip(&taps[start..end]) {
                bin.re = tap * scale;
            }

            fft.forward(mask);
        }

        self.partitions = count;

        count
    }

    pub fn clear(&mut self) {
        self.partitions = 0;
    }
}
