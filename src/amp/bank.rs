//! Model weights and the table of models the amp can switch between.

use log::warn;

use super::dense::DenseWeights;
use super::gru::GruWeights;
use crate::error::Error;
use crate::{GRU_GATES, GRU_HIDDEN_SIZE, MAX_MODELS};

/// Number of values in a flat weight dump, see [`ModelParameters::from_flat`].
pub const FLAT_WEIGHT_COUNT: usize =
    GRU_GATES + GRU_HIDDEN_SIZE * GRU_GATES + 2 * GRU_GATES + GRU_HIDDEN_SIZE + 1;

/// One trained amp model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParameters {
    pub name: &'static str,
    pub version: u32,
    pub gru: GruWeights,
    pub dense: DenseWeights,

    /// Output gain applied after the dry signal is added back, matching the
    /// model's loudness to the bypassed signal.
    pub level_adjust: f32,
}

impl ModelParameters {
    /// Model with all weights zero. Its output is the dry input times
    /// `level_adjust`.
    pub const fn zeroed(name: &'static str, version: u32, level_adjust: f32) -> Self {
        Self {
            name,
            version,
            gru: GruWeights::ZERO,
            dense: DenseWeights::ZERO,
            level_adjust,
        }
    }

    /// Builds a model from a flat dump laid out as: input weights
    /// (`GRU_GATES`), recurrent weights row by row (`GRU_HIDDEN_SIZE` rows of
    /// `GRU_GATES`), input bias and recurrent bias (`GRU_GATES` each), dense
    /// weights (`GRU_HIDDEN_SIZE`), dense bias.
    pub fn from_flat(
        name: &'static str,
        version: u32,
        weights: &[f32],
        level_adjust: f32,
    ) -> Result<Self, Error> {
        if weights.len() != FLAT_WEIGHT_COUNT {
            return Err(Error::WeightCount {
                expected: FLAT_WEIGHT_COUNT,
                actual: weights.len(),
            });
        }

        let mut params = Self::zeroed(name, version, level_adjust);
        let (input, rest) = weights.split_at(GRU_GATES);
        let (recurrent, rest) = rest.split_at(GRU_HIDDEN_SIZE * GRU_GATES);
        let (bias, rest) = rest.split_at(2 * GRU_GATES);
        let (dense, dense_bias) = rest.split_at(GRU_HIDDEN_SIZE);

        params.gru.input.copy_from_slice(input);

        for (row, values) in params
            .gru
            .recurrent
            .iter_mut()
            .zip(recurrent.chunks_exact(GRU_GATES))
        {
            row.copy_from_slice(values);
        }

        for (row, values) in params.gru.bias.iter_mut().zip(bias.chunks_exact(GRU_GATES)) {
            row.copy_from_slice(values);
        }

        params.dense.weights.copy_from_slice(dense);
        params.dense.bias = dense_bias[0];

        Ok(params)
    }
}

/// Pass-through model at unity level.
pub const CLEAN: ModelParameters = ModelParameters::zeroed("Clean", 1, 1.0);

/// Models addressed by 1-based index; 0 is reserved for bypass.
#[derive(Debug, Clone)]
pub struct ModelBank {
    models: [Option<ModelParameters>; MAX_MODELS],
    len: usize,
}

impl Default for ModelBank {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelBank {
    pub fn new() -> Self {
        Self {
            models: core::array::from_fn(|_| None),
            len: 0,
        }
    }

    /// Bank holding only the [`CLEAN`] model at index 1.
    pub fn with_clean() -> Self {
        let mut bank = Self::new();
        bank.register(CLEAN);

        bank
    }

    pub fn from_models(models: impl IntoIterator<Item = ModelParameters>) -> Self {
        let mut bank = Self::new();

        for model in models {
            bank.register(model);
        }

        bank
    }

    /// Appends a model. Ignored when the bank is full.
    pub fn register(&mut self, model: ModelParameters) {
        if let Err(err) = self.try_register(model) {
            warn!("model not registered: {err}");
        }
    }

    /// Appends a model and returns its index.
    pub fn try_register(&mut self, model: ModelParameters) -> Result<usize, Error> {
        let entry = self.models.get_mut(self.len).ok_or(Error::BankFull)?;
        *entry = Some(model);
        self.len += 1;

        Ok(self.len)
    }

    /// Model at 1-based `index`.
    pub fn get(&self, index: usize) -> Option<&ModelParameters> {
        let slot = index.checked_sub(1)?;

        self.models.get(slot)?.as_ref()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelParameters> {
        self.models.iter().flatten()
    }
}
