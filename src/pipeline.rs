//! The block contract shared by every effect stage, and a sequential chain of
//! stages run once per block period.
//!
//! A stage receives a left and a right block, processes them in place and
//! transmits them downstream. If only one of the two blocks arrived, that
//! block is released and the stage skips the period, so a half stereo pair is
//! never processed.

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::block::{Block, BlockHandle, BlockPool};
use crate::metering::{Clock, ProcessorUsage};
use crate::SampleRate;

/// A realtime effect stage working on one stereo block at a time.
///
/// Implementations must not allocate, block or take locks the control side
/// may hold, and must finish within one block period.
pub trait Stage {
    fn process(&mut self, left: &mut Block, right: &mut Block);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Left,
    Right,
}

/// Input of a stage: at most one pending block per channel.
#[derive(Debug, Default)]
pub struct Port {
    left: Option<BlockHandle>,
    right: Option<BlockHandle>,
}

impl Port {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands `handle` to this port. A block still waiting on the same channel
    /// was never consumed and goes back to the pool.
    pub fn deliver<const N: usize>(
        &mut self,
        channel: Channel,
        handle: BlockHandle,
        pool: &mut BlockPool<N>,
    ) {
        let slot = match channel {
            Channel::Left => &mut self.left,
            Channel::Right => &mut self.right,
        };

        if let Some(stale) = slot.replace(handle) {
            pool.release(stale);
        }
    }

    /// Takes the stereo pair, or releases a lone block and returns `None`.
    pub fn receive<const N: usize>(
        &mut self,
        pool: &mut BlockPool<N>,
    ) -> Option<(BlockHandle, BlockHandle)> {
        match (self.left.take(), self.right.take()) {
            (Some(left), Some(right)) => Some((left, right)),
            (left, right) => {
                if let Some(left) = left {
                    pool.release(left);
                }
                if let Some(right) = right {
                    pool.release(right);
                }
                None
            }
        }
    }

    /// Passes a processed pair on to `next`.
    pub fn transmit<const N: usize>(
        next: &mut Port,
        pair: (BlockHandle, BlockHandle),
        pool: &mut BlockPool<N>,
    ) {
        next.deliver(Channel::Left, pair.0, pool);
        next.deliver(Channel::Right, pair.1, pool);
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Returns anything still pending to the pool.
    pub fn drain<const N: usize>(&mut self, pool: &mut BlockPool<N>) {
        if let Some(left) = self.left.take() {
            pool.release(left);
        }
        if let Some(right) = self.right.take() {
            pool.release(right);
        }
    }
}

struct ChainStage {
    stage: Box<dyn Stage + Send>,
    input: Port,
    usage: Arc<ProcessorUsage>,
}

/// Stages run in insertion order, each consuming what the previous one
/// transmitted. Blocks come from an internal pool of `N` blocks.
pub struct Chain<const N: usize> {
    pool: BlockPool<N>,
    stages: Vec<ChainStage>,
    output: Port,
    usage: Arc<ProcessorUsage>,
    period_us: f32,
}

impl<const N: usize> Chain<N> {
    pub fn new(sample_rate: SampleRate) -> Self {
        let period_us = sample_rate.block_period_us();

        Self {
            pool: BlockPool::new(),
            stages: Vec::new(),
            output: Port::new(),
            usage: Arc::new(ProcessorUsage::new(period_us)),
            period_us,
        }
    }

    /// Appends a stage and returns its usage meter.
    pub fn push(&mut self, stage: impl Stage + Send + 'static) -> Arc<ProcessorUsage> {
        let usage = Arc::new(ProcessorUsage::new(self.period_us));

        self.stages.push(ChainStage {
            stage: Box::new(stage),
            input: Port::new(),
            usage: usage.clone(),
        });

        usage
    }

    /// Usage meter of the whole chain.
    pub fn usage(&self) -> Arc<ProcessorUsage> {
        self.usage.clone()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn pool(&self) -> &BlockPool<N> {
        &self.pool
    }

    /// Runs one block period. A missing input channel, or a pool running dry,
    /// makes every stage skip the period; the outputs are then left untouched
    /// and `false` is returned.
    pub fn run(
        &mut self,
        input: (Option<&Block>, Option<&Block>),
        output: (&mut Block, &mut Block),
        clock: &impl Clock,
    ) -> bool {
        let start = clock.now_us();
        let pool = &mut self.pool;
        let first = match self.stages.first_mut() {
            Some(first) => &mut first.input,
            None => &mut self.output,
        };

        for (channel, samples) in [(Channel::Left, input.0), (Channel::Right, input.1)] {
            let Some(samples) = samples else {
                continue;
            };
            let Some(handle) = pool.acquire() else {
                continue;
            };

            pool.get_mut(&handle).copy_from_slice(samples);
            first.deliver(channel, handle, pool);
        }

        for index in 0..self.stages.len() {
            let (head, rest) = self.stages[index..].split_at_mut(1);
            let current = &mut head[0];
            let next = match rest.first_mut() {
                Some(next) => &mut next.input,
                None => &mut self.output,
            };

            let Some(pair) = current.input.receive(pool) else {
                continue;
            };

            let stage_start = clock.now_us();
            let (left, right) = pool.pair_mut(&pair.0, &pair.1);
            current.stage.process(left, right);
            let elapsed = clock.now_us().saturating_sub(stage_start);
            current.usage.record(elapsed);

            Port::transmit(next, pair, pool);
        }

        let produced = match self.output.receive(pool) {
            Some((left, right)) => {
                output.0.copy_from_slice(pool.get(&left));
                output.1.copy_from_slice(pool.get(&right));
                pool.release(left);
                pool.release(right);
                true
            }
            None => false,
        };

        self.usage.record(clock.now_us().saturating_sub(start));

        produced
    }
}

impl<const N: usize> core::fmt::Debug for Chain<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Chain")
            .field("stages", &self.stages.len())
            .field("free_blocks", &self.pool.available())
            .finish()
    }
}
