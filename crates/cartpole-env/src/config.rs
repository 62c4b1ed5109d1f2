//! Configuration for the cart-pole environment.

use std::f32::consts::PI;

use crate::dynamics::STATE_SIZE;

/// Configuration for [`Cartpole`](crate::env::Cartpole) using builder pattern.
///
/// # Example
/// ```ignore
/// let config = CartpoleConfig::new()
///     .with_dt(0.05)
///     .with_max_steps(400)
///     .with_measurement_noise([0.01; 4]);
/// ```
#[derive(Clone, Debug)]
pub struct CartpoleConfig {
    /// Control interval in seconds.
    pub dt: f32,
    /// RK4 substeps per control interval.
    pub substeps: usize,
    /// Mean of the initial state distribution.
    pub init_state: [f32; STATE_SIZE],
    /// Standard deviation of the initial state distribution.
    pub init_std: f32,
    /// Measurement noise standard deviation per state dimension.
    pub measurement_noise: [f32; STATE_SIZE],
    /// Cart position limits `[low, high]` (m); leaving them terminates.
    pub x_limits: [f32; 2],
    /// Unwrapped pole angle limits `[low, high]` (rad); leaving them terminates.
    pub angle_limits: [f32; 2],
    /// Episode horizon; reaching it truncates.
    pub max_steps: u32,
    /// Action magnitude limit (N); actions are clamped to `±action_limit`.
    pub action_limit: f32,
}

impl Default for CartpoleConfig {
    fn default() -> Self {
        Self {
            dt: 0.1,
            substeps: 2,
            init_state: [0.0; STATE_SIZE],
            init_std: 0.1,
            measurement_noise: [0.01; STATE_SIZE],
            x_limits: [-3.5, 3.5],
            angle_limits: [-4.0 * PI, 4.0 * PI],
            max_steps: 200,
            action_limit: 10.0,
        }
    }
}

impl CartpoleConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the control interval.
    pub fn with_dt(mut self, dt: f32) -> Self {
        self.dt = dt;
        self
    }

    /// Set the number of RK4 substeps per control interval.
    pub fn with_substeps(mut self, substeps: usize) -> Self {
        self.substeps = substeps;
        self
    }

    /// Set the mean of the initial state distribution.
    pub fn with_init_state(mut self, init_state: [f32; STATE_SIZE]) -> Self {
        self.init_state = init_state;
        self
    }

    /// Set the standard deviation of the initial state distribution.
    pub fn with_init_std(mut self, init_std: f32) -> Self {
        self.init_std = init_std;
        self
    }

    /// Set the measurement noise standard deviations.
    pub fn with_measurement_noise(mut self, std: [f32; STATE_SIZE]) -> Self {
        self.measurement_noise = std;
        self
    }

    /// Set the cart position limits.
    pub fn with_x_limits(mut self, limits: [f32; 2]) -> Self {
        self.x_limits = limits;
        self
    }

    /// Set the unwrapped angle limits.
    pub fn with_angle_limits(mut self, limits: [f32; 2]) -> Self {
        self.angle_limits = limits;
        self
    }

    /// Set the episode horizon.
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Set the action magnitude limit.
    pub fn with_action_limit(mut self, limit: f32) -> Self {
        self.action_limit = limit;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> swingup_core::Result<()> {
        if !(self.dt > 0.0) {
            return Err(swingup_core::SwingupError::InvalidConfig {
                param: "dt".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.substeps == 0 {
            return Err(swingup_core::SwingupError::InvalidConfig {
                param: "substeps".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.max_steps == 0 {
            return Err(swingup_core::SwingupError::InvalidConfig {
                param: "max_steps".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.x_limits[0] >= self.x_limits[1] {
            return Err(swingup_core::SwingupError::InvalidConfig {
                param: "x_limits".to_string(),
                message: "low must be below high".to_string(),
            });
        }
        if self.angle_limits[0] >= self.angle_limits[1] {
            return Err(swingup_core::SwingupError::InvalidConfig {
                param: "angle_limits".to_string(),
                message: "low must be below high".to_string(),
            });
        }
        Ok(())
    }
}
