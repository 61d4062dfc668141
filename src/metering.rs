//! Processor usage of the audio callback as a share of the block period.
//!
//! The audio side records elapsed time per block; the status path reads the
//! current and maximum percentages from the control context.

use core::sync::atomic::Ordering;

use atomic_float::AtomicF32;

/// Microsecond time source of the platform.
pub trait Clock {
    fn now_us(&self) -> u64;
}

/// Clock for hosts without a timer. Every measurement reads zero.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullClock;

impl Clock for NullClock {
    fn now_us(&self) -> u64 {
        0
    }
}

#[derive(Debug)]
pub struct ProcessorUsage {
    period_us: f32,
    current: AtomicF32,
    max: AtomicF32,
}

impl ProcessorUsage {
    pub fn new(period_us: f32) -> Self {
        Self {
            period_us: period_us.max(f32::MIN_POSITIVE),
            current: AtomicF32::new(0.0),
            max: AtomicF32::new(0.0),
        }
    }

    /// Records the time one block took.
    #[inline]
    pub fn record(&self, elapsed_us: u64) {
        let percent = elapsed_us as f32 / self.period_us * 100.0;

        self.current.store(percent, Ordering::Relaxed);

        if percent > self.max.load(Ordering::Relaxed) {
            self.max.store(percent, Ordering::Relaxed);
        }
    }

    /// Load of the last recorded block in percent.
    pub fn current(&self) -> f32 {
        self.current.load(Ordering::Relaxed)
    }

    /// Highest load since the last [`max_reset`](Self::max_reset), in percent.
    pub fn max(&self) -> f32 {
        self.max.load(Ordering::Relaxed)
    }

    pub fn max_reset(&self) {
        self.max.store(0.0, Ordering::Relaxed);
    }

    pub fn period_us(&self) -> f32 {
        self.period_us
    }
}
