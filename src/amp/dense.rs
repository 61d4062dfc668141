//! Fully connected output layer.

use crate::GRU_HIDDEN_SIZE;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct DenseWeights {
    pub weights: [f32; GRU_HIDDEN_SIZE],
    pub bias: f32,
}

impl DenseWeights {
    pub const ZERO: Self = Self {
        weights: [0.0; GRU_HIDDEN_SIZE],
        bias: 0.0,
    };

    #[inline]
    pub fn forward(&self, hidden: &[f32; GRU_HIDDEN_SIZE]) -> f32 {
        self.weights
            .iter()
            .zip(hidden)
            .fold(self.bias, |acc, (w, h)| acc + w * h)
    }
}
