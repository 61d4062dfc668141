//! Neural amp model: one GRU layer and one dense layer run per sample.
//!
//! Per sample, the two input channels are mixed to mono and scaled by the
//! input gain. The mono sample goes through the network, the mono sample is
//! added back to the network output, and the sum is scaled by the model's
//! level adjustment. The result is written to both channels.
//!
//! [`AmpModel`] runs in the audio callback and owns the hidden state.
//! [`AmpModelHandle`] is the control side: it owns the [`ModelBank`] and
//! publishes a copy of the selected weights, which the audio side swaps in
//! at the start of its next block, resetting the hidden state.

pub mod bank;
pub mod dense;
pub mod gru;

use alloc::sync::Arc;
use core::sync::atomic::Ordering;

use atomic_float::AtomicF32;
use log::{info, warn};

use self::bank::{ModelBank, ModelParameters, CLEAN};
use self::gru::GruLayer;
use crate::block::Block;
use crate::pipeline::Stage;
use crate::sync::Exchange;

#[derive(Debug, Clone)]
struct LiveModel {
    active: bool,
    params: ModelParameters,
}

#[derive(Debug)]
struct Shared {
    model: Exchange<LiveModel>,
    input_gain: AtomicF32,
}

/// Audio side of the amp model.
#[derive(Debug)]
pub struct AmpModel {
    shared: Arc<Shared>,
    live: LiveModel,
    gru: GruLayer,
}

impl AmpModel {
    /// Creates the audio-side model and its control handle. Starts bypassed
    /// with an input gain of 1.
    pub fn new(bank: ModelBank) -> (Self, AmpModelHandle) {
        let bypass = LiveModel {
            active: false,
            params: CLEAN,
        };
        let shared = Arc::new(Shared {
            model: Exchange::new(bypass.clone()),
            input_gain: AtomicF32::new(1.0),
        });

        let model = Self {
            shared: shared.clone(),
            live: bypass,
            gru: GruLayer::new(),
        };

        let handle = AmpModelHandle {
            shared,
            bank,
            current: 0,
        };

        (model, handle)
    }

    pub fn is_bypassed(&self) -> bool {
        !self.live.active
    }

    /// Name of the model the audio side is running, `None` in bypass.
    pub fn model_name(&self) -> Option<&'static str> {
        self.live.active.then_some(self.live.params.name)
    }

    /// Processes one stereo block in place.
    pub fn process(&mut self, left: &mut Block, right: &mut Block) {
        if self.shared.model.try_take(&mut self.live) {
            self.gru.reset();
        }

        if !self.live.active {
            return;
        }

        let input_gain = self.shared.input_gain.load(Ordering::Relaxed);
        let params = &self.live.params;

        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let x = (*l + *r) * 0.5 * input_gain;
            let hidden = self.gru.forward(&params.gru, x);
            let y = (params.dense.forward(hidden) + x) * params.level_adjust;

            *l = y;
            *r = y;
        }
    }
}

impl Stage for AmpModel {
    fn process(&mut self, left: &mut Block, right: &mut Block) {
        AmpModel::process(self, left, right);
    }
}

/// Control side of the amp model.
#[derive(Debug)]
pub struct AmpModelHandle {
    shared: Arc<Shared>,
    bank: ModelBank,
    current: usize,
}

impl AmpModelHandle {
    /// Selects model `index` from the bank, 0 for bypass. Indices past the
    /// end of the bank are ignored. Selecting a model, including the current
    /// one, clears the hidden state.
    pub fn change_model(&mut self, index: usize) {
        if index == 0 {
            self.shared.model.publish(|live| live.active = false);
            self.current = 0;
            info!("amp bypassed");
            return;
        }

        let Some(params) = self.bank.get(index) else {
            warn!(
                "model {index} not in bank ({} models), ignored",
                self.bank.len()
            );
            return;
        };

        self.shared.model.publish(|live| {
            live.params.clone_from(params);
            live.active = true;
        });
        self.current = index;
        info!("amp model {index}: {} v{}", params.name, params.version);
    }

    /// Index selected by the last accepted `change_model`, 0 for bypass.
    pub fn current_model(&self) -> usize {
        self.current
    }

    pub fn is_bypassed(&self) -> bool {
        self.current == 0
    }

    /// Sets the input gain, clamped to `0.0..=1.0`. NaN is ignored.
    pub fn set_input_gain(&self, gain: f32) {
        if gain.is_nan() {
            warn!("NaN input gain ignored");
            return;
        }

        self.shared
            .input_gain
            .store(gain.clamp(0.0, 1.0), Ordering::Relaxed);
    }

    pub fn input_gain(&self) -> f32 {
        self.shared.input_gain.load(Ordering::Relaxed)
    }

    pub fn bank(&self) -> &ModelBank {
        &self.bank
    }

    /// Bank access for registering models at startup. Models already
    /// selected keep running from their published copy.
    pub fn bank_mut(&mut self) -> &mut ModelBank {
        &mut self.bank
    }

    pub fn current_params(&self) -> Option<&ModelParameters> {
        self.bank.get(self.current)
    }
}
