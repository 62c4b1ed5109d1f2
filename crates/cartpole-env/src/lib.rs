//! Cart-Pole Swing-Up Environment
//!
//! A simulated cart-pole control environment for model-based RL research.
//! Unlike the balance-only benchmark, the pole starts hanging down and the
//! task is to swing it up and hold it upright with a continuous force on
//! the cart.
//!
//! # Features
//!
//! - **Injected dynamics**: the environment is composed from a
//!   [`DynamicsModel`], so learned or perturbed physics drop in without
//!   touching the stepping loop
//! - **Injected reward**: any [`RewardFunction`]; the default
//!   [`TipCostReward`] is a normalized quadratic tip cost through a
//!   negative exponential, differentiable through the (sin, cos) encoding
//! - **Angle-encoded observations**: angular dimensions are reported as
//!   (sin, cos) pairs to avoid the wrap-around discontinuity
//! - **Measurement noise**: seeded Gaussian noise on observations
//! - **Snapshot rendering**: track/cart/pole frames with a fading pose
//!   trail, as buffers or PNG files
//!
//! # Example
//!
//! ```rust,ignore
//! use cartpole_env::SwingupCartpole;
//! use swingup_core::Env;
//!
//! let mut env = SwingupCartpole::with_defaults()?;
//! let mut obs = env.reset(42);
//!
//! for _ in 0..200 {
//!     let outcome = env.step(&[1.0]);
//!     obs = outcome.observation;
//!     if outcome.done() {
//!         break;
//!     }
//! }
//! ```

pub mod angles;
pub mod config;
pub mod dynamics;
pub mod env;
pub mod noise;
pub mod render;
pub mod reward;

// Comprehensive test suite
#[cfg(test)]
mod tests;

pub use config::CartpoleConfig;
pub use dynamics::{rk4_step, CartpoleDynamics, DynamicsModel, ACTION_SIZE, ANGLE_DIMS, STATE_SIZE};
pub use env::{Cartpole, CartpoleLog, SwingupCartpole};
pub use noise::MeasurementNoise;
pub use render::{CartpoleRenderer, Frame, RenderConfig};
pub use reward::{RewardFunction, TipCostReward};
