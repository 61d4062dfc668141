//! Test signals and reference computations

#![allow(dead_code)]

use ampsim_dsp::block::Block;
use ampsim_dsp::BLOCK_SIZE;

const LCG_MUL: u32 = 1_664_525;
const LCG_ADD: u32 = 1_013_904_223;

/// Deterministic noise in range -1.0..1.0
#[derive(Debug, Clone)]
pub struct Noise {
    state: u32,
}

impl Noise {
    pub fn new(seed: u32) -> Self {
        Self { state: seed.max(1) }
    }

    pub fn next(&mut self) -> f32 {
        self.state = self.state.wrapping_mul(LCG_MUL).wrapping_add(LCG_ADD);
        (self.state >> 8) as f32 / (1u32 << 23) as f32 - 1.0
    }

    pub fn block(&mut self) -> Block {
        let mut block = [0.0; BLOCK_SIZE];
        block.iter_mut().for_each(|s| *s = self.next());
        block
    }

    pub fn vec(&mut self, len: usize) -> Vec<f32> {
        (0..len).map(|_| self.next()).collect()
    }
}

/// Sine block starting at absolute sample `offset`.
pub fn sine_block(frequency: f32, sample_rate: f32, offset: usize) -> Block {
    let mut block = [0.0; BLOCK_SIZE];

    for (n, sample) in block.iter_mut().enumerate() {
        let t = (offset + n) as f32 / sample_rate;
        *sample = (2.0 * std::f32::consts::PI * frequency * t).sin();
    }

    block
}

/// Decaying pluck, roughly what a guitar pickup delivers.
pub fn pluck_block(frequency: f32, sample_rate: f32, offset: usize) -> Block {
    let mut block = sine_block(frequency, sample_rate, offset);

    for (n, sample) in block.iter_mut().enumerate() {
        let t = (offset + n) as f32 / sample_rate;
        *sample *= 0.5 * (-3.0 * t).exp();
    }

    block
}

/// Builds a leaked impulse response table `[len, gain, taps...]`.
pub fn ir_table(gain: f32, taps: &[f32]) -> &'static [f32] {
    let mut data = Vec::with_capacity(taps.len() + 2);
    data.push(taps.len() as f32);
    data.push(gain);
    data.extend_from_slice(taps);

    Box::leak(data.into_boxed_slice())
}

/// Direct-form linear convolution, truncated to the input length.
pub fn convolve(input: &[f32], taps: &[f32], gain: f32) -> Vec<f32> {
    (0..input.len())
        .map(|n| {
            let past = input[..=n].iter().rev();
            past.zip(taps).map(|(x, h)| h * gain * x).sum()
        })
        .collect()
}

/// Max absolute difference of two sequences.
pub fn max_error(a: &[f32], b: &[f32]) -> f32 {
    let errors = a.iter().zip(b).map(|(x, y)| (x - y).abs());

    errors.fold(0.0, f32::max)
}
