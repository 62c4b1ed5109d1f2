//! Deterministic MLP policy with periodic output squashing.
//!
//! The policy output is bounded with the periodic sine squashing function
//! `s(x) = (9 sin x + sin 3x) / 8` rather than tanh: it saturates to ±1
//! smoothly but stays periodic, which keeps gradients alive when the
//! pre-activation drifts far from zero during long-horizon optimization.

use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::tensor::activation::relu;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::utils::sin_squash_tensor;

/// Configuration for [`MlpPolicy`].
#[derive(Clone, Debug)]
pub struct MlpPolicyConfig {
    /// Input (observation) dimension.
    pub input_size: usize,
    /// Action dimension.
    pub action_size: usize,
    /// Hidden layer widths.
    pub hidden: Vec<usize>,
    /// Action magnitude bound; outputs land in `±max_action`.
    pub max_action: f32,
}

impl MlpPolicyConfig {
    /// Create a config with the default two hidden layers of 64 units.
    pub fn new(input_size: usize, action_size: usize, max_action: f32) -> Self {
        Self {
            input_size,
            action_size,
            hidden: vec![64, 64],
            max_action,
        }
    }

    /// Set the hidden layer widths.
    pub fn with_hidden(mut self, hidden: Vec<usize>) -> Self {
        self.hidden = hidden;
        self
    }

    /// Initialize the policy on the given device.
    pub fn init<B: Backend>(&self, device: &B::Device) -> MlpPolicy<B> {
        let mut layers = Vec::with_capacity(self.hidden.len());
        let mut width = self.input_size;
        for &next in &self.hidden {
            layers.push(LinearConfig::new(width, next).init(device));
            width = next;
        }

        MlpPolicy {
            layers,
            head: LinearConfig::new(width, self.action_size).init(device),
            max_action: self.max_action,
        }
    }
}

/// Deterministic MLP policy with bounded outputs.
#[derive(Module, Debug)]
pub struct MlpPolicy<B: Backend> {
    layers: Vec<Linear<B>>,
    head: Linear<B>,
    #[module(skip)]
    max_action: f32,
}

impl<B: Backend> MlpPolicy<B> {
    /// Compute actions for a batch of observations `[batch, input]`.
    pub fn forward(&self, observations: Tensor<B, 2>) -> Tensor<B, 2> {
        let mut x = observations;
        for layer in &self.layers {
            x = relu(layer.forward(x));
        }
        sin_squash_tensor(self.head.forward(x)).mul_scalar(self.max_action)
    }

    /// The configured action bound.
    pub fn max_action(&self) -> f32 {
        self.max_action
    }
}
