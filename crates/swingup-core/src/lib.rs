//! Swingup Core - Contracts for simulated control environments.
//!
//! This crate provides the shared abstractions used across the swingup
//! workspace:
//!
//! - [`Env`] - Trait for single-instance simulated environments
//! - [`StepOutcome`] - Result of stepping an environment
//! - [`LogData`] - Trait for mergeable episode statistics
//! - [`SwingupError`] / [`Result`] - Shared error handling

pub mod env;
pub mod error;

pub use env::{Env, LogData, StepOutcome};
pub use error::{Result, SwingupError};
