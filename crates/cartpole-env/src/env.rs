//! The cart-pole swing-up environment.
//!
//! [`Cartpole`] composes an injected [`DynamicsModel`] and
//! [`RewardFunction`] behind the standard reset/step contract. Unlike the
//! balance-only cart-pole, the pole starts hanging down and the task is to
//! swing it up with a continuous force on the cart.
//!
//! Observations are the measured state (true state plus Gaussian
//! measurement noise) with the pole angle encoded as a (sin, cos) pair,
//! giving 5 dimensions. The true, unwrapped state stays internal and is
//! readable through [`Cartpole::state`] for rendering and data collection.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

use swingup_core::{Env, LogData, StepOutcome};

use crate::angles;
use crate::config::CartpoleConfig;
use crate::dynamics::{rk4_step, CartpoleDynamics, DynamicsModel, ANGLE_DIMS, STATE_SIZE};
use crate::noise::MeasurementNoise;
use crate::render::{CartpoleRenderer, Frame, RenderConfig};
use crate::reward::{RewardFunction, TipCostReward};

/// Log data for cart-pole episode tracking.
#[derive(Clone, Debug, Default)]
pub struct CartpoleLog {
    /// Total reward accumulated across completed episodes.
    pub total_reward: f32,
    /// Number of completed episodes.
    pub episode_count: u32,
    /// Total steps across completed episodes.
    pub total_steps: u32,
}

impl LogData for CartpoleLog {
    fn merge(&mut self, other: &Self) {
        self.total_reward += other.total_reward;
        self.episode_count += other.episode_count;
        self.total_steps += other.total_steps;
    }

    fn clear(&mut self) {
        self.total_reward = 0.0;
        self.episode_count = 0;
        self.total_steps = 0;
    }

    fn episode_count(&self) -> f32 {
        self.episode_count as f32
    }
}

/// Cart-pole swing-up environment with injected dynamics and reward.
pub struct Cartpole<D: DynamicsModel, R: RewardFunction> {
    config: CartpoleConfig,
    dynamics: D,
    reward: R,
    state: [f32; STATE_SIZE],
    tick: u32,
    episode_reward: f32,
    rng: Xoshiro256StarStar,
    noise: MeasurementNoise,
    log: CartpoleLog,
    renderer: Option<CartpoleRenderer>,
}

/// The default swing-up environment: analytic physics + tip-cost reward.
pub type SwingupCartpole = Cartpole<CartpoleDynamics, TipCostReward>;

impl SwingupCartpole {
    /// Create the standard swing-up task: default physics and the tip-cost
    /// reward sharing the same pole length.
    pub fn with_defaults() -> swingup_core::Result<Self> {
        let dynamics = CartpoleDynamics::new();
        let reward = TipCostReward::new(dynamics.pole_length);
        Cartpole::new(CartpoleConfig::default(), dynamics, reward)
    }
}

impl<D: DynamicsModel, R: RewardFunction> Cartpole<D, R> {
    /// Create a new environment from a configuration, dynamics model and
    /// reward function.
    pub fn new(config: CartpoleConfig, dynamics: D, reward: R) -> swingup_core::Result<Self> {
        config.validate()?;
        if dynamics.state_size() != STATE_SIZE {
            return Err(swingup_core::SwingupError::DimensionMismatch {
                expected: STATE_SIZE,
                actual: dynamics.state_size(),
            });
        }

        let noise = MeasurementNoise::new(config.measurement_noise.to_vec(), 0);
        Ok(Self {
            config,
            dynamics,
            reward,
            state: [0.0; STATE_SIZE],
            tick: 0,
            episode_reward: 0.0,
            rng: Xoshiro256StarStar::seed_from_u64(0),
            noise,
            log: CartpoleLog::default(),
            renderer: None,
        })
    }

    /// The environment configuration.
    pub fn config(&self) -> &CartpoleConfig {
        &self.config
    }

    /// The injected dynamics model.
    pub fn dynamics(&self) -> &D {
        &self.dynamics
    }

    /// The injected reward function.
    pub fn reward_fn(&self) -> &R {
        &self.reward
    }

    /// The true (noiseless, unwrapped) state `[x, dx, theta, dtheta]`.
    pub fn state(&self) -> [f32; STATE_SIZE] {
        self.state
    }

    /// Steps taken in the current episode.
    pub fn tick(&self) -> u32 {
        self.tick
    }

    /// Get aggregated log data.
    pub fn get_log(&self) -> CartpoleLog {
        self.log.clone()
    }

    /// Clear log data.
    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Measured, angle-encoded observation of the current state.
    fn observe(&mut self) -> Vec<f32> {
        let mut measured = self.state;
        self.noise.apply(&mut measured);
        angles::to_complex(&measured, &ANGLE_DIMS)
    }

    fn standard_normal(&mut self) -> f32 {
        let u1: f32 = self.rng.gen::<f32>().max(1e-10);
        let u2: f32 = self.rng.gen();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos()
    }

    /// Render the current pose into an RGB frame.
    ///
    /// The renderer is created lazily on first use, sized from the dynamics
    /// parameters, and keeps a fading trail of recent poses.
    pub fn render(&mut self) -> swingup_core::Result<Frame> {
        let renderer = self
            .renderer
            .get_or_insert_with(|| CartpoleRenderer::new(RenderConfig::default()));
        renderer.draw(self.state[0], self.state[2])
    }

    /// Render the current pose straight to a PNG file.
    pub fn render_to_png(&mut self, path: impl AsRef<std::path::Path>) -> swingup_core::Result<()> {
        let renderer = self
            .renderer
            .get_or_insert_with(|| CartpoleRenderer::new(RenderConfig::default()));
        renderer.draw_to_png(self.state[0], self.state[2], path)
    }
}

impl<D: DynamicsModel, R: RewardFunction> Env for Cartpole<D, R> {
    fn observation_size(&self) -> usize {
        angles::encoded_size(STATE_SIZE, ANGLE_DIMS.len())
    }

    fn action_size(&self) -> usize {
        self.dynamics.action_size()
    }

    fn reset(&mut self, seed: u64) -> Vec<f32> {
        self.rng = Xoshiro256StarStar::seed_from_u64(seed);
        // Decorrelate the measurement stream from the init draw.
        self.noise.reseed(seed.wrapping_add(0x9E37_79B9_7F4A_7C15));

        for i in 0..STATE_SIZE {
            let n = self.standard_normal();
            self.state[i] = self.config.init_state[i] + self.config.init_std * n;
        }
        self.tick = 0;
        self.episode_reward = 0.0;

        if let Some(renderer) = self.renderer.as_mut() {
            renderer.clear_trail();
        }

        self.observe()
    }

    fn step(&mut self, action: &[f32]) -> StepOutcome {
        debug_assert_eq!(action.len(), self.action_size(), "action size mismatch");

        let u = action[0].clamp(-self.config.action_limit, self.config.action_limit);
        let clamped = [u];

        let h = self.config.dt / self.config.substeps as f32;
        for _ in 0..self.config.substeps {
            rk4_step(&self.dynamics, &mut self.state, &clamped, h);
        }
        self.tick += 1;

        let reward = self.reward.compute(&self.state, &clamped);
        self.episode_reward += reward;

        let x = self.state[0];
        let theta = self.state[2];
        let terminated = x < self.config.x_limits[0]
            || x > self.config.x_limits[1]
            || theta < self.config.angle_limits[0]
            || theta > self.config.angle_limits[1];
        let truncated = self.tick >= self.config.max_steps;

        if terminated || truncated {
            self.log.total_reward += self.episode_reward;
            self.log.episode_count += 1;
            self.log.total_steps += self.tick;
        }

        StepOutcome {
            observation: self.observe(),
            reward,
            terminated,
            truncated,
        }
    }
}
