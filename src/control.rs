//! Control surface: commands coming from MIDI or the serial console, applied
//! to the control handles of the amp model and the cabinet simulator.
//!
//! Everything here runs in the control context, never in the audio callback.

use log::info;

use crate::amp::AmpModelHandle;
use crate::cabsim::ConvolverHandle;

/// First note selecting an impulse response slot.
pub const NOTE_IR_FIRST: u8 = 6;
pub const NOTE_IR_LAST: u8 = 16;
pub const NOTE_DOUBLER_TOGGLE: u8 = 30;
/// Note selecting bypass; the following notes select models 1 and up.
pub const NOTE_MODEL_FIRST: u8 = 40;
pub const NOTE_MODEL_LAST: u8 = 48;
pub const CC_INPUT_GAIN: u8 = 85;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    LoadIr(usize),
    ChangeModel(usize),
    SetInputGain(f32),
    SetDoubler(bool),
    ToggleDoubler,
}

impl Command {
    /// Maps a raw MIDI message to a command. Unmapped or malformed messages
    /// yield `None`.
    pub fn from_midi(message: &[u8]) -> Option<Self> {
        let (&status, data) = message.split_first()?;
        let &[number, value, ..] = data else {
            return None;
        };

        match status & 0xF0 {
            0x90 if value != 0 => match number {
                NOTE_IR_FIRST..=NOTE_IR_LAST => {
                    Some(Self::LoadIr((number - NOTE_IR_FIRST) as usize))
                }
                NOTE_DOUBLER_TOGGLE => Some(Self::ToggleDoubler),
                NOTE_MODEL_FIRST..=NOTE_MODEL_LAST => {
                    Some(Self::ChangeModel((number - NOTE_MODEL_FIRST) as usize))
                }
                _ => None,
            },
            0xB0 if number == CC_INPUT_GAIN => {
                Some(Self::SetInputGain((value & 0x7F) as f32 / 127.0))
            }
            _ => None,
        }
    }
}

/// Snapshot for the status display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Status {
    pub model: usize,
    pub model_name: Option<&'static str>,
    pub input_gain: f32,
    pub ir_slot: Option<usize>,
    pub ir_loaded: bool,
    pub ir_length_ms: f32,
    pub doubler: bool,
}

#[derive(Debug)]
pub struct ControlSurface {
    amp: AmpModelHandle,
    cabsim: ConvolverHandle,
}

impl ControlSurface {
    pub fn new(amp: AmpModelHandle, cabsim: ConvolverHandle) -> Self {
        Self { amp, cabsim }
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::LoadIr(slot) => self.cabsim.load(slot),
            Command::ChangeModel(index) => self.amp.change_model(index),
            Command::SetInputGain(gain) => self.amp.set_input_gain(gain),
            Command::SetDoubler(enabled) => {
                self.cabsim.set_doubler(enabled);
                info!("doubler {}", if enabled { "on" } else { "off" });
            }
            Command::ToggleDoubler => {
                let enabled = self.cabsim.toggle_doubler();
                info!("doubler {}", if enabled { "on" } else { "off" });
            }
        }
    }

    /// Decodes and applies a MIDI message. Returns the command applied.
    pub fn handle_midi(&mut self, message: &[u8]) -> Option<Command> {
        let command = Command::from_midi(message)?;
        self.apply(command);

        Some(command)
    }

    pub fn status(&self) -> Status {
        Status {
            model: self.amp.current_model(),
            model_name: self.amp.current_params().map(|params| params.name),
            input_gain: self.amp.input_gain(),
            ir_slot: self.cabsim.current_slot(),
            ir_loaded: self.cabsim.is_loaded(),
            ir_length_ms: self.cabsim.loaded_length_ms(),
            doubler: self.cabsim.doubler(),
        }
    }

    pub fn amp(&self) -> &AmpModelHandle {
        &self.amp
    }

    pub fn amp_mut(&mut self) -> &mut AmpModelHandle {
        &mut self.amp
    }

    pub fn cabsim(&self) -> &ConvolverHandle {
        &self.cabsim
    }

    pub fn cabsim_mut(&mut self) -> &mut ConvolverHandle {
        &mut self.cabsim
    }
}
