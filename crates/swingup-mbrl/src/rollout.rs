//! Particle rollouts through one-step models.
//!
//! Propagates a batch of particles through a one-step transition function
//! under a policy, recording the visited states, applied actions and
//! collected rewards as flat [`TrajectoryBatch`] storage.
//!
//! The transition function is a plain closure `(states, actions) ->
//! (next_states, rewards)`, so the same rollout drives a learned
//! probabilistic model (sampling a next state per particle), the analytic
//! simulator, or anything in between.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// Flat `[samples × steps × dim]` trajectory storage.
///
/// Rows are appended one step at a time; each pushed step carries one row
/// of `dim` values per sample.
#[derive(Debug, Clone)]
pub struct TrajectoryBatch {
    samples: usize,
    dim: usize,
    data: Vec<f32>,
}

impl TrajectoryBatch {
    /// Create empty storage for `samples` trajectories of width `dim`.
    pub fn new(samples: usize, dim: usize) -> Self {
        Self {
            samples,
            dim,
            data: Vec::new(),
        }
    }

    /// Number of trajectories.
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Values per (sample, step).
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of recorded steps.
    pub fn steps(&self) -> usize {
        if self.samples * self.dim == 0 {
            0
        } else {
            self.data.len() / (self.samples * self.dim)
        }
    }

    /// Append one step of data, laid out `[samples × dim]`.
    pub fn push_step(&mut self, step_data: &[f32]) {
        debug_assert_eq!(step_data.len(), self.samples * self.dim);
        self.data.extend_from_slice(step_data);
    }

    /// Value at `(sample, step, dim)`.
    pub fn get(&self, sample: usize, step: usize, dim: usize) -> f32 {
        debug_assert!(sample < self.samples && dim < self.dim);
        self.data[(step * self.samples + sample) * self.dim + dim]
    }

    /// Per-dimension mean over samples at one step.
    pub fn mean_at(&self, step: usize) -> Vec<f32> {
        let mut mean = vec![0.0f32; self.dim];
        for s in 0..self.samples {
            for d in 0..self.dim {
                mean[d] += self.get(s, step, d);
            }
        }
        for m in &mut mean {
            *m /= self.samples as f32;
        }
        mean
    }

    /// Per-dimension standard deviation over samples at one step.
    pub fn std_at(&self, step: usize) -> Vec<f32> {
        let mean = self.mean_at(step);
        let mut var = vec![0.0f32; self.dim];
        for s in 0..self.samples {
            for d in 0..self.dim {
                let delta = self.get(s, step, d) - mean[d];
                var[d] += delta * delta;
            }
        }
        var.iter()
            .map(|v| (v / self.samples as f32).sqrt())
            .collect()
    }
}

/// States, actions and rewards recorded by a rollout.
#[derive(Debug, Clone)]
pub struct RolloutTrajectories {
    /// Visited states, `horizon + 1` steps (includes the initial states).
    pub states: TrajectoryBatch,
    /// Applied actions, `horizon` steps.
    pub actions: TrajectoryBatch,
    /// Collected rewards, `horizon` steps, width 1.
    pub rewards: TrajectoryBatch,
}

fn tensor_rows<B: Backend>(t: &Tensor<B, 2>) -> Vec<f32> {
    t.clone().into_data().as_slice::<f32>().unwrap().to_vec()
}

/// Roll a batch of particles forward through a one-step model.
///
/// - `x0`: initial particle states `[particles, state_dim]`
/// - `step_fn`: `(states, actions) -> (next_states, rewards[particles, 1])`
/// - `policy_fn`: `states -> actions`
/// - `horizon`: number of steps to take
pub fn rollout<B, F, P>(
    x0: Tensor<B, 2>,
    mut step_fn: F,
    mut policy_fn: P,
    horizon: usize,
) -> RolloutTrajectories
where
    B: Backend,
    F: FnMut(Tensor<B, 2>, Tensor<B, 2>) -> (Tensor<B, 2>, Tensor<B, 2>),
    P: FnMut(Tensor<B, 2>) -> Tensor<B, 2>,
{
    let [particles, state_dim] = x0.dims();

    let mut states = TrajectoryBatch::new(particles, state_dim);
    states.push_step(&tensor_rows(&x0));

    let mut actions_batch: Option<TrajectoryBatch> = None;
    let mut rewards = TrajectoryBatch::new(particles, 1);

    let mut current = x0;
    for _ in 0..horizon {
        let actions = policy_fn(current.clone());
        let action_dim = actions.dims()[1];
        let batch = actions_batch.get_or_insert_with(|| TrajectoryBatch::new(particles, action_dim));
        batch.push_step(&tensor_rows(&actions));

        let (next, reward) = step_fn(current, actions);
        debug_assert_eq!(reward.dims(), [particles, 1]);

        rewards.push_step(&tensor_rows(&reward));
        states.push_step(&tensor_rows(&next));
        current = next;
    }

    RolloutTrajectories {
        states,
        actions: actions_batch.unwrap_or_else(|| TrajectoryBatch::new(particles, 0)),
        rewards,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_trajectory_batch_layout() {
        let mut batch = TrajectoryBatch::new(2, 3);
        batch.push_step(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        batch.push_step(&[10.0, 20.0, 30.0, 40.0, 50.0, 60.0]);

        assert_eq!(batch.steps(), 2);
        assert_eq!(batch.get(0, 0, 1), 2.0);
        assert_eq!(batch.get(1, 0, 0), 4.0);
        assert_eq!(batch.get(1, 1, 2), 60.0);
    }

    #[test]
    fn test_mean_and_std() {
        let mut batch = TrajectoryBatch::new(2, 1);
        batch.push_step(&[1.0, 3.0]);

        let mean = batch.mean_at(0);
        assert!((mean[0] - 2.0).abs() < 1e-6);

        let std = batch.std_at(0);
        assert!((std[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_rollout_shapes() {
        let device = Default::default();
        let x0: Tensor<TestBackend, 2> = Tensor::zeros([4, 3], &device);

        let trajs = rollout(
            x0,
            |states, _actions| {
                let n = states.dims()[0];
                let device = states.device();
                (states.add_scalar(1.0), Tensor::ones([n, 1], &device))
            },
            |states| {
                let n = states.dims()[0];
                Tensor::zeros([n, 2], &states.device())
            },
            5,
        );

        assert_eq!(trajs.states.steps(), 6);
        assert_eq!(trajs.states.samples(), 4);
        assert_eq!(trajs.states.dim(), 3);
        assert_eq!(trajs.actions.steps(), 5);
        assert_eq!(trajs.actions.dim(), 2);
        assert_eq!(trajs.rewards.steps(), 5);
        assert_eq!(trajs.rewards.dim(), 1);
    }

    #[test]
    fn test_rollout_records_deterministic_sequence() {
        let device = Default::default();
        let x0 = Tensor::<TestBackend, 1>::from_floats([1.0, 2.0], &device).reshape([2, 1]);

        // x' = 2x, reward = x (pre-step), policy = -x.
        let trajs = rollout(
            x0,
            |states, _actions| (states.clone().mul_scalar(2.0), states),
            |states| states.neg(),
            3,
        );

        // States: 1, 2, 4, 8 for the first particle.
        for (step, expected) in [1.0f32, 2.0, 4.0, 8.0].iter().enumerate() {
            assert!((trajs.states.get(0, step, 0) - expected).abs() < 1e-6);
        }
        // Second particle doubles from 2.
        assert!((trajs.states.get(1, 3, 0) - 16.0).abs() < 1e-6);

        // Actions mirror the pre-step states, negated.
        assert!((trajs.actions.get(0, 1, 0) + 2.0).abs() < 1e-6);

        // Rewards echo the pre-step states here.
        assert!((trajs.rewards.get(0, 2, 0) - 4.0).abs() < 1e-6);
    }
}
