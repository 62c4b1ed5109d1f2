//! Diagonal Gaussian predictive densities.
//!
//! Probabilistic dynamics models output a mean and a log standard deviation
//! per output dimension. The log-std is clamped before use so that log
//! probabilities stay finite even for badly initialized or diverging
//! models.

use burn::tensor::backend::Backend;
use burn::tensor::{Distribution, Tensor};

// Constants for numerical stability
pub(crate) const LOG_STD_MIN: f32 = -20.0;
pub(crate) const LOG_STD_MAX: f32 = 2.0;

/// A batch of diagonal Gaussian densities.
#[derive(Debug, Clone)]
pub struct GaussianDensity<B: Backend> {
    /// Mean per output dimension: `[batch, out]`.
    pub mean: Tensor<B, 2>,
    /// Log standard deviation per output dimension: `[batch, out]`.
    pub log_std: Tensor<B, 2>,
}

impl<B: Backend> GaussianDensity<B> {
    /// Create a density from mean and log-std tensors.
    pub fn new(mean: Tensor<B, 2>, log_std: Tensor<B, 2>) -> Self {
        Self { mean, log_std }
    }

    /// Log probability of `targets` under the density.
    ///
    /// Returns `[batch]` log probabilities, summed over output dimensions.
    pub fn log_prob(&self, targets: Tensor<B, 2>) -> Tensor<B, 1> {
        let batch = self.mean.dims()[0];

        let log_std = self.log_std.clone().clamp(LOG_STD_MIN, LOG_STD_MAX);
        let std = log_std.clone().exp();

        let normalized = (targets - self.mean.clone()) / std;

        // log N(x; μ, σ) = -0.5 ((x - μ)/σ)² - log σ - 0.5 log 2π
        let log_2pi = (2.0 * std::f32::consts::PI).ln();
        let per_dim: Tensor<B, 2> =
            -0.5 * normalized.powf_scalar(2.0) - log_std - 0.5 * log_2pi;

        per_dim.sum_dim(1).reshape([batch])
    }

    /// Sample with the reparameterization trick: `mean + std · ε`.
    pub fn sample(&self) -> Tensor<B, 2> {
        let device = self.mean.device();
        let dims = self.mean.dims();

        let std = self.log_std.clone().clamp(LOG_STD_MIN, LOG_STD_MAX).exp();
        let noise: Tensor<B, 2> =
            Tensor::random([dims[0], dims[1]], Distribution::Normal(0.0, 1.0), &device);

        self.mean.clone() + std * noise
    }

    /// Analytical entropy per batch element: `[batch]`.
    ///
    /// `H = 0.5 D (1 + log 2π) + Σ log σ` for `D` output dimensions.
    pub fn entropy(&self) -> Tensor<B, 1> {
        let batch = self.mean.dims()[0];
        let out_dim = self.mean.dims()[1] as f32;

        let log_2pi = (2.0 * std::f32::consts::PI).ln();
        let constant = 0.5 * out_dim * (1.0 + log_2pi);

        let log_std = self.log_std.clone().clamp(LOG_STD_MIN, LOG_STD_MAX);
        let sum_log_std: Tensor<B, 1> = log_std.sum_dim(1).reshape([batch]);

        sum_log_std.add_scalar(constant)
    }
}
