//! Double-tracking effect: the right channel runs a few milliseconds late so
//! the two cabinet outputs no longer cancel into mono.

use crate::block::Block;
use crate::utils::delay_line::DelayLine;
use crate::SampleRate;

/// Longest supported doubler delay in samples.
pub const MAX_DOUBLER_DELAY: usize = 4096;

pub const DEFAULT_DOUBLER_DELAY_MS: f32 = 20.0;

#[derive(Debug)]
pub struct Doubler {
    line: DelayLine<MAX_DOUBLER_DELAY>,
}

impl Default for Doubler {
    fn default() -> Self {
        Self::new()
    }
}

impl Doubler {
    pub fn new() -> Self {
        let mut doubler = Self {
            line: DelayLine::new(),
        };
        doubler.init(SampleRate::default(), DEFAULT_DOUBLER_DELAY_MS);

        doubler
    }

    pub fn init(&mut self, sample_rate: SampleRate, delay_ms: f32) {
        self.line.reset();
        self.line.set_delay(sample_rate.ms_to_samples(delay_ms));
    }

    pub fn reset(&mut self) {
        self.line.reset();
    }

    pub fn delay_samples(&self) -> usize {
        self.line.delay()
    }

    /// Feeds `right` through the delay. The line keeps running while
    /// disabled so that switching on does not replay stale audio.
    #[inline]
    pub fn process(&mut self, enabled: bool, right: &mut Block) {
        for sample in right.iter_mut() {
            let delayed = self.line.process(*sample);

            if enabled {
                *sample = delayed;
            }
        }
    }
}
