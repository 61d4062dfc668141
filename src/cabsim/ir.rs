//! Impulse response data and the slot registry the convolver loads from.
//!
//! Impulse responses are compiled-in tables laid out as
//! `[tap_count, gain, tap_0, tap_1, ...]`.

use log::{debug, warn};

use crate::error::Error;
use crate::{SampleRate, MAX_IR_SLOTS};

/// Words in front of the taps: declared tap count and gain.
pub const HEADER_LEN: usize = 2;

/// Validated view of one impulse response table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpulseResponse {
    data: &'static [f32],
    tap_count: usize,
}

impl ImpulseResponse {
    pub fn from_raw(data: &'static [f32]) -> Result<Self, Error> {
        if data.len() < HEADER_LEN {
            return Err(Error::IrTooShort { len: data.len() });
        }

        let declared = data[0];
        let available = data.len() - HEADER_LEN;

        if !declared.is_finite() || declared < 1.0 {
            return Err(Error::EmptyIr);
        }

        let tap_count = declared as usize;

        if tap_count > available {
            return Err(Error::IrLengthMismatch {
                declared: tap_count,
                available,
            });
        }

        if !data[1].is_finite() {
            return Err(Error::InvalidGain(data[1]));
        }

        Ok(Self { data, tap_count })
    }

    /// Number of taps declared in the header.
    pub fn tap_count(&self) -> usize {
        self.tap_count
    }

    pub fn gain(&self) -> f32 {
        self.data[1]
    }

    pub fn taps(&self) -> &'static [f32] {
        &self.data[HEADER_LEN..HEADER_LEN + self.tap_count]
    }

    pub fn length_ms(&self, sample_rate: SampleRate) -> f32 {
        sample_rate.samples_to_ms(self.tap_count)
    }
}

/// Fixed table of impulse responses by slot. An empty slot means bypass.
#[derive(Debug, Default, Clone)]
pub struct IrRegistry {
    slots: [Option<ImpulseResponse>; MAX_IR_SLOTS],
}

impl IrRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts `ir` into `slot`, replacing what was there. Out-of-range slots are
    /// ignored.
    pub fn register(&mut self, ir: ImpulseResponse, slot: usize) {
        if let Err(err) = self.try_register(ir, slot) {
            warn!("IR not registered: {err}");
        }
    }

    pub fn try_register(&mut self, ir: ImpulseResponse, slot: usize) -> Result<(), Error> {
        let entry = self.slots.get_mut(slot).ok_or(Error::SlotOutOfRange {
            slot,
            max: MAX_IR_SLOTS - 1,
        })?;

        debug!(
            "IR slot {slot}: {} taps, gain {}",
            ir.tap_count(),
            ir.gain()
        );
        *entry = Some(ir);

        Ok(())
    }

    /// Empties `slot` so that loading it selects bypass.
    pub fn clear(&mut self, slot: usize) {
        if let Some(entry) = self.slots.get_mut(slot) {
            *entry = None;
        }
    }

    pub fn get(&self, slot: usize) -> Option<ImpulseResponse> {
        self.slots.get(slot).copied().flatten()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn slot_count(&self) -> usize {
        MAX_IR_SLOTS
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}
