//! # Swingup MBRL - Model-Based RL Research Utilities
//!
//! Generic building blocks for model-based reinforcement-learning
//! experiments around the swing-up environments:
//!
//! - **Probabilistic dynamics models**: [`GaussianMlp`] with MC-dropout and
//!   diagonal Gaussian predictive densities
//! - **Supervised fitting**: [`fit_model`], a stochastic-gradient loop
//!   minimizing `-logL + reg/N` with pluggable optimizers, schedules and
//!   loggers
//! - **Experience**: [`ExperienceDataset`] with CSV persistence
//! - **Autodiff tools**: [`jacobian`] / [`batch_jacobian`], Polyak
//!   [`soft_update`]
//! - **Rollouts & plotting**: particle [`rollout`] through one-step models,
//!   PNG trajectory figures
//! - **Session plumbing**: [`Checkpointer`] with warn-and-continue
//!   [`resume_session`], console/CSV fit loggers, a thread-safe
//!   [`ProgressBar`] for rayon fan-outs
//!
//! # Example
//!
//! ```rust,ignore
//! use swingup_mbrl::{fit_model, ExperienceDataset, FitConfig, GaussianMlpConfig};
//! use swingup_mbrl::{ConstantLr, ConsoleLogger};
//! use burn::backend::{Autodiff, NdArray};
//! use burn::optim::AdamConfig;
//!
//! type B = Autodiff<NdArray<f32>>;
//!
//! let device = Default::default();
//! let model = GaussianMlpConfig::new(6, 4).init::<B>(&device);
//! let trained = fit_model(
//!     model,
//!     &dataset,
//!     &FitConfig::new().with_iterations(5_000),
//!     AdamConfig::new().init(),
//!     &ConstantLr::new(1e-3),
//!     &mut ConsoleLogger::new(500),
//! )?;
//! ```

pub mod checkpoint;
pub mod dataset;
pub mod jacobian;
pub mod logging;
pub mod model;
pub mod plotting;
pub mod progress;
pub mod rollout;
pub mod schedule;
pub mod target;
pub mod training;
pub mod utils;

pub use checkpoint::{
    resume_session, CheckpointError, CheckpointInfo, Checkpointer, CheckpointerConfig,
    ResumeReport, EXPERIENCE_FILE,
};
pub use dataset::ExperienceDataset;
pub use jacobian::{batch_jacobian, jacobian};
pub use logging::{ConsoleLogger, CsvLogger, FitLogger, FitSnapshot, NullLogger};
pub use model::{
    DensityModel, GaussianDensity, GaussianMlp, GaussianMlpConfig, MlpPolicy, MlpPolicyConfig,
};
pub use plotting::{plot_mean_std, plot_rollout, plot_samples, plot_trajectories};
pub use progress::{parallel_progress, ProgressBar};
pub use rollout::{rollout, RolloutTrajectories, TrajectoryBatch};
pub use schedule::{linear_ramp, ConstantLr, LinearDecay, LrSchedule};
pub use target::{hard_copy, soft_update};
pub use training::{fit_model, FitConfig};
pub use utils::{parse_index_list, sin_squash, sin_squash_tensor, tile};
