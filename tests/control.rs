//! Tests for the control surface


use approx::assert_abs_diff_eq;

use ampsim_dsp::amp::bank::ModelBank;
use ampsim_dsp::amp::AmpModel;
use ampsim_dsp::cabsim::ir::ImpulseResponse;
use ampsim_dsp::cabsim::{Convolver, ConvolverConfig};
use ampsim_dsp::control::{Command, ControlSurface};
use ampsim_dsp::BLOCK_SIZE;

static SHORT_IR: [f32; 4] = [2.0, 1.0, 1.0, 0.0];

fn surface() -> (AmpModel, Convolver, ControlSurface) {
    let (amp, amp_control) = AmpModel::new(ModelBank::with_clean());
    let (cabsim, mut cab_control) = Convolver::new(ConvolverConfig::default());
    cab_control.register(ImpulseResponse::from_raw(&SHORT_IR).unwrap(), 2);

    (amp, cabsim, ControlSurface::new(amp_control, cab_control))
}

#[test]
fn maps_midi_notes_and_controllers() {
    assert_eq!(
        Command::from_midi(&[0x90, 6, 100]),
        Some(Command::LoadIr(0))
    );
    assert_eq!(
        Command::from_midi(&[0x93, 16, 1]),
        Some(Command::LoadIr(10))
    );
    assert_eq!(
        Command::from_midi(&[0x90, 30, 64]),
        Some(Command::ToggleDoubler)
    );
    assert_eq!(
        Command::from_midi(&[0x90, 40, 64]),
        Some(Command::ChangeModel(0))
    );
    assert_eq!(
        Command::from_midi(&[0x90, 48, 64]),
        Some(Command::ChangeModel(8))
    );
    assert_eq!(
        Command::from_midi(&[0xB0, 85, 127]),
        Some(Command::SetInputGain(1.0))
    );
}

#[test]
fn ignores_unmapped_midi() {
    assert_eq!(Command::from_midi(&[0x90, 6, 0]), None);
    assert_eq!(Command::from_midi(&[0x80, 6, 64]), None);
    assert_eq!(Command::from_midi(&[0x90, 20, 64]), None);
    assert_eq!(Command::from_midi(&[0xB0, 7, 64]), None);
    assert_eq!(Command::from_midi(&[0x90, 6]), None);
    assert_eq!(Command::from_midi(&[]), None);
}

#[test]
fn status_follows_applied_commands() {
    logger::init();

    let (mut amp, mut cabsim, mut surface) = surface();

    let status = surface.status();
    assert_eq!(status.model, 0);
    assert_eq!(status.ir_slot, None);
    assert!(!status.doubler);

    surface.handle_midi(&[0x90, 41, 100]);
    surface.handle_midi(&[0x90, 8, 100]);
    surface.handle_midi(&[0xB0, 85, 64]);
    surface.handle_midi(&[0x90, 30, 100]);

    let status = surface.status();
    assert_eq!(status.model, 1);
    assert_eq!(status.model_name, Some("Clean"));
    assert_abs_diff_eq!(status.input_gain, 64.0 / 127.0);
    assert_eq!(status.ir_slot, Some(2));
    assert!(status.ir_loaded);
    assert!(status.doubler);

    let mut left = [0.0; BLOCK_SIZE];
    let mut right = [0.0; BLOCK_SIZE];
    amp.process(&mut left, &mut right);
    cabsim.process(&mut left, &mut right);
    assert!(!amp.is_bypassed());
    assert!(cabsim.is_loaded());

    surface.apply(Command::SetDoubler(false));
    surface.apply(Command::ChangeModel(0));
    assert!(!surface.status().doubler);
    assert!(surface.amp().is_bypassed());
}
