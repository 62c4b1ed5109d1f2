//! Probabilistic dynamics model: an MLP with Gaussian output heads.
//!
//! [`GaussianMlp`] maps `[state-encoding, action]` inputs to a diagonal
//! Gaussian over the prediction target (typically the state change). Hidden
//! layers carry dropout, so on an autodiff backend repeated forward passes
//! resample the dropout masks and yield different predictions per pass
//! (MC-dropout); running the model through `valid()` gives the
//! deterministic mean path.

use burn::module::Module;
use burn::nn::{Dropout, DropoutConfig, Linear, LinearConfig};
use burn::tensor::activation::relu;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use super::gaussian::GaussianDensity;

/// A model producing a predictive density over its outputs.
pub trait DensityModel<B: Backend>: Module<B> {
    /// Input size expected by [`forward`](DensityModel::forward).
    fn input_size(&self) -> usize;

    /// Output size of the predictive density.
    fn output_size(&self) -> usize;

    /// Predictive density for a batch of inputs `[batch, input]`.
    fn forward(&self, input: Tensor<B, 2>) -> GaussianDensity<B>;

    /// Regularization term added to the training loss (scaled by the
    /// implementation; divided by the dataset size in the fit loop).
    fn regularization(&self) -> Tensor<B, 1>;
}

/// Configuration for [`GaussianMlp`].
#[derive(Clone, Debug)]
pub struct GaussianMlpConfig {
    /// Input dimension.
    pub input_size: usize,
    /// Output dimension.
    pub output_size: usize,
    /// Hidden layer widths.
    pub hidden: Vec<usize>,
    /// Dropout probability on hidden activations.
    pub dropout: f64,
    /// Squared-weight penalty scale.
    pub weight_decay: f32,
}

impl GaussianMlpConfig {
    /// Create a config with the default two hidden layers of 200 units.
    pub fn new(input_size: usize, output_size: usize) -> Self {
        Self {
            input_size,
            output_size,
            hidden: vec![200, 200],
            dropout: 0.1,
            weight_decay: 1e-4,
        }
    }

    /// Set the hidden layer widths.
    pub fn with_hidden(mut self, hidden: Vec<usize>) -> Self {
        self.hidden = hidden;
        self
    }

    /// Set the dropout probability.
    pub fn with_dropout(mut self, dropout: f64) -> Self {
        self.dropout = dropout;
        self
    }

    /// Set the squared-weight penalty scale.
    pub fn with_weight_decay(mut self, weight_decay: f32) -> Self {
        self.weight_decay = weight_decay;
        self
    }

    /// Initialize the model on the given device.
    pub fn init<B: Backend>(&self, device: &B::Device) -> GaussianMlp<B> {
        let mut layers = Vec::with_capacity(self.hidden.len());
        let mut width = self.input_size;
        for &next in &self.hidden {
            layers.push(LinearConfig::new(width, next).init(device));
            width = next;
        }

        GaussianMlp {
            layers,
            dropout: DropoutConfig::new(self.dropout).init(),
            mean_head: LinearConfig::new(width, self.output_size).init(device),
            log_std_head: LinearConfig::new(width, self.output_size).init(device),
            input_size: self.input_size,
            output_size: self.output_size,
            weight_decay: self.weight_decay,
        }
    }
}

/// MLP with twin mean / log-std heads and MC-dropout hidden layers.
#[derive(Module, Debug)]
pub struct GaussianMlp<B: Backend> {
    layers: Vec<Linear<B>>,
    dropout: Dropout,
    mean_head: Linear<B>,
    log_std_head: Linear<B>,
    #[module(skip)]
    input_size: usize,
    #[module(skip)]
    output_size: usize,
    #[module(skip)]
    weight_decay: f32,
}

impl<B: Backend> DensityModel<B> for GaussianMlp<B> {
    fn input_size(&self) -> usize {
        self.input_size
    }

    fn output_size(&self) -> usize {
        self.output_size
    }

    fn forward(&self, input: Tensor<B, 2>) -> GaussianDensity<B> {
        let mut x = input;
        for layer in &self.layers {
            x = relu(layer.forward(x));
            x = self.dropout.forward(x);
        }

        GaussianDensity::new(
            self.mean_head.forward(x.clone()),
            self.log_std_head.forward(x),
        )
    }

    fn regularization(&self) -> Tensor<B, 1> {
        let mut total = self.mean_head.weight.val().powf_scalar(2.0).sum();
        total = total + self.log_std_head.weight.val().powf_scalar(2.0).sum();
        for layer in &self.layers {
            total = total + layer.weight.val().powf_scalar(2.0).sum();
        }
        total.mul_scalar(self.weight_decay)
    }
}
