//! Offline pedal render driven by MIDI control messages.
//!
//! Runs the amp model and cabinet simulator as a block chain, with a control
//! thread sending MIDI the way a footswitch board would. The result is written
//! to `out/pedal.wav`.

use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use hound::{SampleFormat, WavSpec, WavWriter};
use simple_logger::SimpleLogger;

use ampsim_dsp::amp::bank::{ModelBank, ModelParameters, FLAT_WEIGHT_COUNT};
use ampsim_dsp::amp::AmpModel;
use ampsim_dsp::cabsim::ir::ImpulseResponse;
use ampsim_dsp::cabsim::{Convolver, ConvolverConfig};
use ampsim_dsp::control::ControlSurface;
use ampsim_dsp::metering::Clock;
use ampsim_dsp::pipeline::Chain;
use ampsim_dsp::{SampleRate, BLOCK_SIZE, DEFAULT_SAMPLE_RATE_HZ};

const BLOCKS: usize = 1500;

struct WallClock(Instant);

impl Clock for WallClock {
    fn now_us(&self) -> u64 {
        self.0.elapsed().as_micros() as u64
    }
}

fn main() {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Debug)
        .init()
        .unwrap();

    let mut bank = ModelBank::with_clean();
    bank.register(crunch());

    let (amp, amp_control) = AmpModel::new(bank);
    let (cabsim, mut cab_control) = Convolver::new(ConvolverConfig::default());
    cab_control.register(ImpulseResponse::from_raw(cabinet()).unwrap(), 0);

    let mut surface = ControlSurface::new(amp_control, cab_control);

    let mut chain = Chain::<4>::new(SampleRate::default());
    let amp_usage = chain.push(amp);
    let cab_usage = chain.push(cabsim);
    let usage = chain.usage();

    let (midi_tx, midi_rx) = mpsc::channel::<Vec<u8>>();

    let control = thread::spawn(move || {
        for message in midi_rx {
            if let Some(command) = surface.handle_midi(&message) {
                log::info!("{command:?}: {:?}", surface.status());
            }
        }

        surface
    });

    // Note 41 selects the crunch model, note 6 the cabinet in slot 0, note 30
    // toggles the doubler, CC 85 sets the input gain.
    let schedule: [(usize, &[u8]); 5] = [
        (0, &[0xB0, 85, 100]),
        (200, &[0x90, 41, 127]),
        (500, &[0x90, 6, 127]),
        (900, &[0x90, 30, 127]),
        (1200, &[0x90, 40, 127]),
    ];

    let clock = WallClock(Instant::now());
    let sample_rate = DEFAULT_SAMPLE_RATE_HZ;
    let mut left = Vec::with_capacity(BLOCKS * BLOCK_SIZE);
    let mut right = Vec::with_capacity(BLOCKS * BLOCK_SIZE);

    for block in 0..BLOCKS {
        for (_, message) in schedule.iter().filter(|(at, _)| *at == block) {
            midi_tx.send(message.to_vec()).unwrap();
            thread::sleep(Duration::from_millis(2));
        }

        let mut input = [0.0; BLOCK_SIZE];
        for (n, sample) in input.iter_mut().enumerate() {
            let t = ((block % 100) * BLOCK_SIZE + n) as f32 / sample_rate;
            *sample = 0.6 * (-4.0 * t).exp() * (2.0 * std::f32::consts::PI * 82.41 * t).sin();
        }

        let mut out_left = [0.0; BLOCK_SIZE];
        let mut out_right = [0.0; BLOCK_SIZE];
        chain.run(
            (Some(&input), Some(&input)),
            (&mut out_left, &mut out_right),
            &clock,
        );

        left.extend_from_slice(&out_left);
        right.extend_from_slice(&out_right);
    }

    drop(midi_tx);
    let surface = control.join().unwrap();

    log::info!("final status: {:?}", surface.status());
    log::info!(
        "usage: chain {:.1}% (max {:.1}%), amp max {:.1}%, cabinet max {:.1}%",
        usage.current(),
        usage.max(),
        amp_usage.max(),
        cab_usage.max()
    );

    std::fs::create_dir_all("out").unwrap();

    let spec = WavSpec {
        channels: 2,
        sample_rate: sample_rate as u32,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create("out/pedal.wav", spec).unwrap();

    for (l, r) in left.iter().zip(&right) {
        writer.write_sample(*l).unwrap();
        writer.write_sample(*r).unwrap();
    }

    writer.finalize().unwrap();
}

/// Small random network, enough to color the tone.
fn crunch() -> ModelParameters {
    let mut state = 0x1234_5678u32;
    let weights: Vec<f32> = (0..FLAT_WEIGHT_COUNT)
        .map(|_| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            ((state >> 8) as f32 / (1u32 << 23) as f32 - 1.0) * 0.6
        })
        .collect();

    ModelParameters::from_flat("Crunch", 1, &weights, 0.7).unwrap()
}

/// Decaying noise burst standing in for a measured cabinet.
fn cabinet() -> &'static [f32] {
    const TAPS: usize = 2048;

    let mut state = 0x0badu32;
    let mut data = Vec::with_capacity(TAPS + 2);
    data.push(TAPS as f32);
    data.push(0.25);

    for n in 0..TAPS {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let noise = (state >> 8) as f32 / (1u32 << 23) as f32 - 1.0;
        data.push(noise * (-(n as f32) / 300.0).exp());
    }

    Box::leak(data.into_boxed_slice())
}
