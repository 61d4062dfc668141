//! Gated recurrent unit layer with a single input.

#[allow(unused_imports)]
use num_traits::float::Float;

use crate::{GRU_GATES, GRU_HIDDEN_SIZE};

const H: usize = GRU_HIDDEN_SIZE;

/// Weights of the recurrent layer. Gate blocks are ordered update (`z`),
/// reset (`r`), candidate (`c`), each `GRU_HIDDEN_SIZE` wide.
#[derive(Debug, Clone, PartialEq)]
pub struct GruWeights {
    /// Input to gate weights.
    pub input: [f32; GRU_GATES],

    /// Hidden unit `k` to gate weights, `recurrent[k][gate]`.
    pub recurrent: [[f32; GRU_GATES]; GRU_HIDDEN_SIZE],

    /// `bias[0]` is added on the input path, `bias[1]` on the recurrent path.
    pub bias: [[f32; GRU_GATES]; 2],
}

impl GruWeights {
    pub const ZERO: Self = Self {
        input: [0.0; GRU_GATES],
        recurrent: [[0.0; GRU_GATES]; GRU_HIDDEN_SIZE],
        bias: [[0.0; GRU_GATES]; 2],
    };
}

impl Default for GruWeights {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Hidden state of the recurrent layer.
#[derive(Debug, Default, Clone)]
pub struct GruLayer {
    state: [f32; H],
}

impl GruLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.state = [0.0; H];
    }

    pub fn state(&self) -> &[f32; H] {
        &self.state
    }

    /// Advances the layer by one sample and returns the new hidden state.
    #[inline]
    pub fn forward(&mut self, weights: &GruWeights, x: f32) -> &[f32; H] {
        let h = self.state;
        let mut z = [0.0; H];
        let mut r = [0.0; H];
        let mut u_c = [0.0; H];

        for i in 0..H {
            let mut z_sum = weights.input[i] * x + weights.bias[0][i] + weights.bias[1][i];
            let mut r_sum =
                weights.input[H + i] * x + weights.bias[0][H + i] + weights.bias[1][H + i];
            let mut c_sum = weights.bias[1][2 * H + i];

            for (row, h_k) in weights.recurrent.iter().zip(h.iter()) {
                z_sum += row[i] * h_k;
                r_sum += row[H + i] * h_k;
                c_sum += row[2 * H + i] * h_k;
            }

            z[i] = sigmoid(z_sum);
            r[i] = sigmoid(r_sum);
            u_c[i] = c_sum;
        }

        for i in 0..H {
            let w_c = weights.input[2 * H + i] * x + weights.bias[0][2 * H + i];
            let c = (w_c + r[i] * u_c[i]).tanh();
            self.state[i] = (1.0 - z[i]) * c + z[i] * h[i];
        }

        &self.state
    }
}

#[inline]
fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
