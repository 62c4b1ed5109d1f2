//! Generic supervised fit loop for probabilistic models.
//!
//! Trains any [`DensityModel`] on an [`ExperienceDataset`] by stochastic
//! gradient descent on the negative data log-likelihood plus the model's
//! regularization term scaled by the dataset size:
//!
//! ```text
//! loss = -E[log p(y | x)] + regularization / N
//! ```
//!
//! Minibatches cycle through a seeded shuffled permutation of the dataset,
//! reshuffled whenever it is exhausted.

use burn::module::AutodiffModule;
use burn::optim::{GradientsParams, Optimizer};
use burn::tensor::backend::AutodiffBackend;

use swingup_core::{Result, SwingupError};

use crate::dataset::ExperienceDataset;
use crate::logging::{FitLogger, FitSnapshot};
use crate::model::gaussian_mlp::DensityModel;
use crate::schedule::LrSchedule;

/// Configuration for the fit loop.
#[derive(Debug, Clone)]
pub struct FitConfig {
    /// Number of optimizer iterations.
    pub iterations: usize,
    /// Minibatch size (clamped to the dataset size).
    pub batch_size: usize,
    /// Shuffling seed.
    pub seed: u64,
    /// Iterations between logger snapshots.
    pub log_interval: usize,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            iterations: 10_000,
            batch_size: 100,
            seed: 0,
            log_interval: 500,
        }
    }
}

impl FitConfig {
    /// Create the default fit configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of iterations.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the minibatch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the shuffling seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the logging interval.
    pub fn with_log_interval(mut self, log_interval: usize) -> Self {
        self.log_interval = log_interval;
        self
    }
}

/// Fit a probabilistic model to a dataset.
///
/// The optimizer is passed in by the caller (Adam is the usual choice);
/// the learning rate comes from `schedule` at every iteration.
///
/// Returns the trained model.
pub fn fit_model<B, M, O, S, L>(
    mut model: M,
    dataset: &ExperienceDataset,
    config: &FitConfig,
    mut optimizer: O,
    schedule: &S,
    logger: &mut L,
) -> Result<M>
where
    B: AutodiffBackend,
    M: DensityModel<B> + AutodiffModule<B>,
    O: Optimizer<M, B>,
    S: LrSchedule + ?Sized,
    L: FitLogger + ?Sized,
    B::Device: Default,
{
    if dataset.is_empty() {
        return Err(SwingupError::InvalidConfig {
            param: "dataset".to_string(),
            message: "cannot fit on an empty dataset".to_string(),
        });
    }
    if dataset.input_size() != model.input_size() {
        return Err(SwingupError::DimensionMismatch {
            expected: model.input_size(),
            actual: dataset.input_size(),
        });
    }
    if dataset.target_size() != model.output_size() {
        return Err(SwingupError::DimensionMismatch {
            expected: model.output_size(),
            actual: dataset.target_size(),
        });
    }

    let n = dataset.len();
    let batch_size = config.batch_size.clamp(1, n);
    let device = B::Device::default();

    let mut epoch = 0u64;
    let mut order = dataset.shuffled_indices(config.seed);
    let mut cursor = 0usize;

    for iteration in 0..config.iterations {
        if cursor + batch_size > n {
            epoch += 1;
            order = dataset.shuffled_indices(config.seed.wrapping_add(epoch));
            cursor = 0;
        }
        let indices = &order[cursor..cursor + batch_size];
        cursor += batch_size;

        let (x, y) = dataset.batch::<B>(indices, &device);

        let density = model.forward(x);
        let log_likelihood = density.log_prob(y).mean();
        let regularization = model.regularization().div_scalar(n as f32);
        let loss = regularization.clone() - log_likelihood.clone();

        let ll_value = log_likelihood.into_data().as_slice::<f32>().unwrap()[0];
        let reg_value = regularization.into_data().as_slice::<f32>().unwrap()[0];

        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &model);

        let lr = schedule.lr(iteration);
        model = optimizer.step(lr, model, grads);

        if iteration % config.log_interval == 0 || iteration + 1 == config.iterations {
            logger.log(&FitSnapshot {
                iteration,
                log_likelihood: ll_value,
                regularization: reg_value,
                loss: reg_value - ll_value,
                learning_rate: lr,
            });
        }
    }
    logger.flush();

    Ok(model)
}
