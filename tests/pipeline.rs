//! Tests for the block pipeline and metering

use std::cell::Cell;

use approx::assert_abs_diff_eq;

use ampsim_dsp::amp::bank::ModelBank;
use ampsim_dsp::amp::AmpModel;
use ampsim_dsp::block::{Block, BlockPool};
use ampsim_dsp::cabsim::{Convolver, ConvolverConfig};
use ampsim_dsp::metering::{Clock, NullClock, ProcessorUsage};
use ampsim_dsp::pipeline::{Chain, Channel, Port, Stage};
use ampsim_dsp::{SampleRate, BLOCK_SIZE};

struct Gain(f32);

impl Stage for Gain {
    fn process(&mut self, left: &mut Block, right: &mut Block) {
        left.iter_mut().for_each(|s| *s *= self.0);
        right.iter_mut().for_each(|s| *s *= self.0);
    }
}

/// Advances by `step` microseconds on every reading.
struct StepClock {
    now: Cell<u64>,
    step: u64,
}

impl Clock for StepClock {
    fn now_us(&self) -> u64 {
        let now = self.now.get();
        self.now.set(now + self.step);
        now
    }
}

#[test]
fn pool_hands_out_each_block_once() {
    let mut pool = BlockPool::<2>::new();
    assert_eq!(pool.capacity(), 2);

    let a = pool.acquire().unwrap();
    let b = pool.acquire().unwrap();
    assert_ne!(a.index(), b.index());
    assert!(pool.acquire().is_none());
    assert_eq!(pool.available(), 0);

    pool.get_mut(&a).fill(1.0);
    pool.get_mut(&b).fill(2.0);

    let (left, right) = pool.pair_mut(&b, &a);
    assert_eq!(left[0], 2.0);
    assert_eq!(right[0], 1.0);

    pool.release(a);
    assert_eq!(pool.available(), 1);
    pool.release(b);
    assert_eq!(pool.available(), 2);
}

#[test]
fn port_releases_lone_blocks() {
    let mut pool = BlockPool::<4>::new();
    let mut port = Port::new();

    let left = pool.acquire().unwrap();
    port.deliver(Channel::Left, left, &mut pool);
    assert!(!port.is_empty());

    assert!(port.receive(&mut pool).is_none());
    assert!(port.is_empty());
    assert_eq!(pool.available(), 4);
}

#[test]
fn port_replaces_unconsumed_block() {
    let mut pool = BlockPool::<4>::new();
    let mut port = Port::new();

    for _ in 0..3 {
        let handle = pool.acquire().unwrap();
        port.deliver(Channel::Right, handle, &mut pool);
    }
    assert_eq!(pool.available(), 3);

    let left = pool.acquire().unwrap();
    port.deliver(Channel::Left, left, &mut pool);
    let pair = port.receive(&mut pool).unwrap();

    let mut next = Port::new();
    Port::transmit(&mut next, pair, &mut pool);
    assert!(port.is_empty());

    next.drain(&mut pool);
    assert_eq!(pool.available(), 4);
}

#[test]
fn chain_runs_stages_in_order() {
    let mut chain = Chain::<4>::new(SampleRate::default());
    chain.push(Gain(2.0));
    chain.push(Gain(0.25));
    assert_eq!(chain.len(), 2);

    let mut left = [0.0; BLOCK_SIZE];
    let mut right = [0.0; BLOCK_SIZE];
    let produced = chain.run(
        (Some(&[1.0; BLOCK_SIZE]), Some(&[-4.0; BLOCK_SIZE])),
        (&mut left, &mut right),
        &NullClock,
    );

    assert!(produced);
    assert_eq!(left, [0.5; BLOCK_SIZE]);
    assert_eq!(right, [-2.0; BLOCK_SIZE]);
    assert_eq!(chain.pool().available(), 4);
}

#[test]
fn chain_skips_period_on_missing_channel() {
    let mut chain = Chain::<4>::new(SampleRate::default());
    chain.push(Gain(2.0));

    let mut left = [7.0; BLOCK_SIZE];
    let mut right = [7.0; BLOCK_SIZE];
    let produced = chain.run(
        (Some(&[1.0; BLOCK_SIZE]), None),
        (&mut left, &mut right),
        &NullClock,
    );

    assert!(!produced);
    assert_eq!(left, [7.0; BLOCK_SIZE]);
    assert_eq!(chain.pool().available(), 4);
}

#[test]
fn chain_skips_period_when_pool_runs_dry() {
    let mut chain = Chain::<1>::new(SampleRate::default());
    chain.push(Gain(2.0));

    let mut left = [0.0; BLOCK_SIZE];
    let mut right = [0.0; BLOCK_SIZE];
    let produced = chain.run(
        (Some(&[1.0; BLOCK_SIZE]), Some(&[1.0; BLOCK_SIZE])),
        (&mut left, &mut right),
        &NullClock,
    );

    assert!(!produced);
    assert_eq!(chain.pool().available(), 1);
}

#[test]
fn empty_chain_passes_through() {
    let mut chain = Chain::<2>::new(SampleRate::default());
    assert!(chain.is_empty());

    let mut left = [0.0; BLOCK_SIZE];
    let mut right = [0.0; BLOCK_SIZE];

    assert!(chain.run(
        (Some(&[0.5; BLOCK_SIZE]), Some(&[0.25; BLOCK_SIZE])),
        (&mut left, &mut right),
        &NullClock,
    ));
    assert_eq!(left, [0.5; BLOCK_SIZE]);
    assert_eq!(right, [0.25; BLOCK_SIZE]);
}

#[test]
fn bypassed_amp_and_cabinet_are_transparent() {
    let (amp, _amp_control) = AmpModel::new(ModelBank::with_clean());
    let (cabsim, _cab_control) = Convolver::new(ConvolverConfig::default());

    let mut chain = Chain::<4>::new(SampleRate::default());
    chain.push(amp);
    chain.push(cabsim);

    let mut input_left = [0.0; BLOCK_SIZE];
    let mut input_right = [0.0; BLOCK_SIZE];
    for n in 0..BLOCK_SIZE {
        input_left[n] = (n as f32 * 0.1).sin();
        input_right[n] = (n as f32 * 0.07).cos();
    }

    let mut left = [0.0; BLOCK_SIZE];
    let mut right = [0.0; BLOCK_SIZE];
    for _ in 0..3 {
        assert!(chain.run(
            (Some(&input_left), Some(&input_right)),
            (&mut left, &mut right),
            &NullClock,
        ));
        assert_eq!(left, input_left);
        assert_eq!(right, input_right);
    }
}

#[test]
fn usage_is_measured_against_block_period() {
    let sample_rate = SampleRate::default();
    let period_us = sample_rate.block_period_us();
    assert_abs_diff_eq!(period_us, 2902.494, epsilon = 0.01);

    let mut chain = Chain::<4>::new(sample_rate);
    let stage_usage = chain.push(Gain(1.0));
    let clock = StepClock {
        now: Cell::new(0),
        step: 100,
    };

    let mut left = [0.0; BLOCK_SIZE];
    let mut right = [0.0; BLOCK_SIZE];
    chain.run(
        (Some(&[0.0; BLOCK_SIZE]), Some(&[0.0; BLOCK_SIZE])),
        (&mut left, &mut right),
        &clock,
    );

    let stage_expected = 100.0 / period_us * 100.0;
    let chain_expected = 300.0 / period_us * 100.0;
    assert_abs_diff_eq!(stage_usage.current(), stage_expected, epsilon = 1e-3);
    assert_abs_diff_eq!(chain.usage().current(), chain_expected, epsilon = 1e-3);
}

#[test]
fn usage_keeps_maximum_until_reset() {
    let usage = ProcessorUsage::new(1000.0);

    usage.record(500);
    usage.record(100);
    assert_abs_diff_eq!(usage.current(), 10.0);
    assert_abs_diff_eq!(usage.max(), 50.0);

    usage.max_reset();
    assert_eq!(usage.max(), 0.0);
    usage.record(200);
    assert_abs_diff_eq!(usage.max(), 20.0);
    assert_eq!(usage.period_us(), 1000.0);
}
