//! Cabinet simulation by uniformly partitioned convolution.
//!
//! The impulse response is cut into `BLOCK_SIZE` tap partitions, each
//! transformed once when the response is loaded. Every block, the previous
//! and current input blocks are transformed together, stored in a history
//! ring, and multiplied against the partitions:
//!
//! `Y = Σ_j history[cursor - j] · mask[j]`
//!
//! The last `BLOCK_SIZE` samples of the inverse transform of `Y` are the
//! linearly convolved output, with no added latency. Left and right travel as
//! the real and imaginary part of the same transform.
//!
//! [`Convolver`] runs in the audio callback. [`ConvolverHandle`] is its
//! control side: it owns the registry, builds new filter masks off the audio
//! path and publishes them through an [`Exchange`].

pub mod doubler;
pub mod ir;
pub mod partition;

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec;
use core::sync::atomic::{AtomicBool, Ordering};

use log::{info, warn};

use self::doubler::{Doubler, DEFAULT_DOUBLER_DELAY_MS};
use self::ir::{ImpulseResponse, IrRegistry};
use self::partition::{FilterMasks, PartitionRing};
use crate::block::Block;
use crate::error::Error;
use crate::fft::{Complex32, FftEngine};
use crate::pipeline::Stage;
use crate::sync::Exchange;
use crate::utils::interleave;
use crate::{SampleRate, BLOCK_SIZE, DEFAULT_MAX_PARTITIONS, FFT_LENGTH, MAX_IR_SLOTS};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvolverConfig {
    pub sample_rate: SampleRate,

    /// Upper bound on partitions. Longer impulse responses are truncated to
    /// `max_partitions * BLOCK_SIZE` taps.
    pub max_partitions: usize,

    pub doubler_delay_ms: f32,
}

impl Default for ConvolverConfig {
    fn default() -> Self {
        Self {
            sample_rate: SampleRate::default(),
            max_partitions: DEFAULT_MAX_PARTITIONS,
            doubler_delay_ms: DEFAULT_DOUBLER_DELAY_MS,
        }
    }
}

/// Filter masks plus whether they are in use. Unloaded means bypass.
#[derive(Debug)]
struct MaskSet {
    loaded: bool,
    masks: FilterMasks,
}

impl MaskSet {
    fn new(capacity: usize) -> Self {
        Self {
            loaded: false,
            masks: FilterMasks::new(capacity),
        }
    }
}

#[derive(Debug)]
struct Shared {
    masks: Exchange<MaskSet>,
    doubler: AtomicBool,
}

/// Audio side of the cabinet simulator.
#[derive(Debug)]
pub struct Convolver {
    shared: Arc<Shared>,
    live: MaskSet,
    fft: FftEngine,

    fft_in: Box<[Complex32]>,
    accum: Box<[Complex32]>,
    history: Box<[Complex32]>,
    ring: PartitionRing,

    last_left: Block,
    last_right: Block,
    first_block: bool,

    doubler: Doubler,
}

impl Convolver {
    /// Creates the audio-side convolver and its control handle. Starts
    /// unloaded, passing audio through untouched.
    pub fn new(config: ConvolverConfig) -> (Self, ConvolverHandle) {
        let capacity = config.max_partitions.max(1);
        let shared = Arc::new(Shared {
            masks: Exchange::new(MaskSet::new(capacity)),
            doubler: AtomicBool::new(false),
        });

        let mut doubler = Doubler::new();
        doubler.init(config.sample_rate, config.doubler_delay_ms);

        let convolver = Self {
            shared: shared.clone(),
            live: MaskSet::new(capacity),
            fft: FftEngine::new(FFT_LENGTH),
            fft_in: vec![Complex32::default(); FFT_LENGTH].into_boxed_slice(),
            accum: vec![Complex32::default(); FFT_LENGTH].into_boxed_slice(),
            history: vec![Complex32::default(); capacity * FFT_LENGTH].into_boxed_slice(),
            ring: PartitionRing::new(1),
            last_left: [0.0; BLOCK_SIZE],
            last_right: [0.0; BLOCK_SIZE],
            first_block: true,
            doubler,
        };

        let handle = ConvolverHandle {
            shared,
            registry: IrRegistry::new(),
            fft: FftEngine::new(FFT_LENGTH),
            config: ConvolverConfig {
                max_partitions: capacity,
                ..config
            },
            current_slot: None,
            loaded: false,
            partitions: 0,
        };

        (convolver, handle)
    }

    /// Whether the audio side is currently convolving.
    pub fn is_loaded(&self) -> bool {
        self.live.loaded
    }

    /// Partitions in use by the audio side.
    pub fn partitions(&self) -> usize {
        if self.live.loaded {
            self.live.masks.partitions()
        } else {
            0
        }
    }

    /// Processes one stereo block in place.
    pub fn process(&mut self, left: &mut Block, right: &mut Block) {
        if self.shared.masks.try_take(&mut self.live) {
            self.restart();
        }

        if !self.live.loaded {
            return;
        }

        let doubler = self.shared.doubler.load(Ordering::Relaxed);
        self.doubler.process(doubler, right);

        let (previous, current) = self.fft_in.split_at_mut(BLOCK_SIZE);

        if self.first_block {
            previous.fill(Complex32::default());
            self.first_block = false;
        } else {
            interleave(&self.last_left, &self.last_right, previous);
        }

        interleave(&left[..], &right[..], current);
        self.last_left.copy_from_slice(&left[..]);
        self.last_right.copy_from_slice(&right[..]);

        self.fft.forward(&mut self.fft_in);

        let slot = self.ring.cursor();
        self.history[slot * FFT_LENGTH..(slot + 1) * FFT_LENGTH].copy_from_slice(&self.fft_in);

        self.accum.fill(Complex32::default());

        for index in 0..self.ring.size() {
            let slot = self.ring.back(index);
            let spectrum = &self.history[slot * FFT_LENGTH..(slot + 1) * FFT_LENGTH];
            let mask = self.live.masks.partition(index);

            for ((acc, x), h) in self.accum.iter_mut().zip(spectrum).zip(mask) {
                *acc += x * h;
            }
        }

        self.ring.advance();
        self.fft.inverse(&mut self.accum);

        for ((l, r), bin) in left
            .iter_mut()
            .zip(right.iter_mut())
            .zip(&self.accum[BLOCK_SIZE..])
        {
            *l = bin.re;
            *r = bin.im;
        }
    }

    /// Clears all input history after a new mask set was taken over.
    fn restart(&mut self) {
        let partitions = self.live.masks.partitions();

        self.history[..partitions.max(1) * FFT_LENGTH].fill(Complex32::default());
        self.ring.reset(partitions);
        self.last_left.fill(0.0);
        self.last_right.fill(0.0);
        self.first_block = true;
        self.doubler.reset();
    }
}

impl Stage for Convolver {
    fn process(&mut self, left: &mut Block, right: &mut Block) {
        Convolver::process(self, left, right);
    }
}

/// Control side of the cabinet simulator. Not for use in the audio callback:
/// `load` runs one transform per partition.
#[derive(Debug)]
pub struct ConvolverHandle {
    shared: Arc<Shared>,
    registry: IrRegistry,
    fft: FftEngine,
    config: ConvolverConfig,
    current_slot: Option<usize>,
    loaded: bool,
    partitions: usize,
}

impl ConvolverHandle {
    pub fn register(&mut self, ir: ImpulseResponse, slot: usize) {
        self.registry.register(ir, slot);
    }

    pub fn try_register(&mut self, ir: ImpulseResponse, slot: usize) -> Result<(), Error> {
        self.registry.try_register(ir, slot)
    }

    pub fn registry(&self) -> &IrRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ConvolverConfig {
        &self.config
    }

    /// Selects the impulse response in `slot`.
    ///
    /// Out-of-range slots and the slot already selected are ignored. An empty
    /// slot switches to bypass. Otherwise the filter masks are rebuilt and
    /// handed to the audio side, which restarts with a cleared history at the
    /// start of its next block.
    pub fn load(&mut self, slot: usize) {
        if slot >= MAX_IR_SLOTS {
            warn!("IR slot {slot} out of range, ignored");
            return;
        }

        if self.current_slot == Some(slot) {
            return;
        }

        self.current_slot = Some(slot);

        let Some(ir) = self.registry.get(slot) else {
            self.shared.masks.publish(|set| {
                set.loaded = false;
                set.masks.clear();
            });
            self.loaded = false;
            self.partitions = 0;
            info!("IR slot {slot} empty, cabinet bypassed");
            return;
        };

        let fft = &mut self.fft;
        let partitions = self.shared.masks.publish(|set| {
            let partitions = set.masks.build(&ir, fft);
            set.loaded = true;
            partitions
        });

        if partitions * BLOCK_SIZE < ir.tap_count() {
            warn!(
                "IR slot {slot}: {} taps truncated to {}",
                ir.tap_count(),
                partitions * BLOCK_SIZE
            );
        }

        self.loaded = true;
        self.partitions = partitions;
        info!("IR slot {slot} loaded, {partitions} partitions");
    }

    /// Slot selected by the last accepted `load`, `None` before the first one.
    pub fn current_slot(&self) -> Option<usize> {
        self.current_slot
    }

    /// Whether the last accepted `load` selected a non-empty slot.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Partitions built by the last load, 0 in bypass.
    pub fn partitions(&self) -> usize {
        self.partitions
    }

    /// Declared length of the selected impulse response, 0 when none.
    pub fn loaded_length_ms(&self) -> f32 {
        self.current_slot
            .and_then(|slot| self.registry.get(slot))
            .map_or(0.0, |ir| ir.length_ms(self.config.sample_rate))
    }

    pub fn set_doubler(&self, enabled: bool) {
        self.shared.doubler.store(enabled, Ordering::Relaxed);
    }

    /// Flips the doubler and returns its new state.
    pub fn toggle_doubler(&self) -> bool {
        !self.shared.doubler.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn doubler(&self) -> bool {
        self.shared.doubler.load(Ordering::Relaxed)
    }
}
