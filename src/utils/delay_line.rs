//! Fixed-capacity sample delay line.

// Based on MIT-licensed code (c) 2014 by Olivier Gillet (ol.gillet@gmail.com)

#[derive(Debug)]
pub struct DelayLine<const MAX_DELAY: usize> {
    write_ptr: usize,
    delay: usize,
    line: [f32; MAX_DELAY],
}

impl<const MAX_DELAY: usize> Default for DelayLine<MAX_DELAY> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const MAX_DELAY: usize> DelayLine<MAX_DELAY> {
    pub fn new() -> Self {
        Self {
            write_ptr: 0,
            delay: 1,
            line: [0.0; MAX_DELAY],
        }
    }

    pub fn reset(&mut self) {
        self.line.fill(0.0);
        self.write_ptr = 0;
    }

    pub fn max_delay(&self) -> usize {
        MAX_DELAY
    }

    /// Sets the delay in samples, clamped to `1..=MAX_DELAY`.
    #[inline]
    pub fn set_delay(&mut self, delay: usize) {
        self.delay = delay.clamp(1, MAX_DELAY);
    }

    pub fn delay(&self) -> usize {
        self.delay
    }

    /// Reads the sample written `delay` writes ago.
    #[inline]
    pub fn read(&self) -> f32 {
        self.line[(self.write_ptr + self.delay) % MAX_DELAY]
    }

    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.line[self.write_ptr] = sample;
        self.write_ptr = (self.write_ptr + MAX_DELAY - 1) % MAX_DELAY;
    }

    /// Pushes `sample` and returns the one delayed by the configured amount.
    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        let delayed = self.read();
        self.write(sample);

        delayed
    }
}
