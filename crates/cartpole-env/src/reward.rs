//! Reward shaping for the swing-up task.
//!
//! The reward is a hand-designed saturating cost: the normalized distance
//! between the pole tip and the target tip location enters a quadratic form,
//! and the negative cost is passed through an exponential. This keeps the
//! reward bounded in (0, 1] and smooth across the angle wrap-around, because
//! all angle-dependent terms are computed through the (sin, cos) encoding.
//!
//! Two evaluation paths are provided, mirroring how the stepping loop and
//! the model-based rollouts consume rewards:
//! - [`RewardFunction::compute`] - scalar path used when stepping the
//!   simulator
//! - [`RewardFunction::forward`] - batched tensor path that stays inside
//!   the autodiff graph, used when optimizing through learned dynamics

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use std::f32::consts::PI;

use crate::angles;
use crate::dynamics::{ANGLE_DIMS, STATE_SIZE};

/// Reward function over (state, action) pairs.
///
/// `state` may be given either raw (`[x, dx, theta, dtheta]`) or already
/// angle-encoded (5 dims); implementations detect the layout from the width.
pub trait RewardFunction: Send + Sync {
    /// Scalar reward for a single (state, action) pair.
    fn compute(&self, state: &[f32], action: &[f32]) -> f32;

    /// Batched differentiable reward.
    ///
    /// `states` is `[batch, 4]` (raw) or `[batch, 5]` (angle-encoded),
    /// `actions` is `[batch, 1]`. Returns `[batch, 1]` rewards.
    fn forward<B: Backend>(&self, states: Tensor<B, 2>, actions: Tensor<B, 2>) -> Tensor<B, 2>;
}

/// Quadratic pole-tip cost through a negative exponential.
///
/// The tip of the pole sits at `(x + lp·sinθ, −lp·cosθ)`; the distance to
/// the target tip is normalized by `2·lp` so the hanging rest state is at
/// distance 1 from the upright target. With state weight matrix `Q` and
/// action weight `R`:
///
/// ```text
/// cost   = ½ (δᵀ Q δ + u R u)
/// reward = exp(−cost)
/// ```
#[derive(Clone, Debug)]
pub struct TipCostReward {
    /// Pole length used for the tip geometry.
    pub pole_length: f32,
    /// Target state `[x, dx, theta, dtheta]` (default upright at the origin).
    pub target: [f32; STATE_SIZE],
    /// 2×2 weight on the normalized tip offset.
    pub q: [[f32; 2]; 2],
    /// Weight on the squared action.
    pub r: f32,
}

impl Default for TipCostReward {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl TipCostReward {
    /// Create the standard swing-up reward for a pole of the given length.
    pub fn new(pole_length: f32) -> Self {
        Self {
            pole_length,
            target: [0.0, 0.0, PI, 0.0],
            q: [[16.0, 0.0], [0.0, 16.0]],
            r: 1e-4,
        }
    }

    /// Set the target state.
    pub fn with_target(mut self, target: [f32; STATE_SIZE]) -> Self {
        self.target = target;
        self
    }

    /// Set the state weight matrix.
    pub fn with_state_weight(mut self, q: [[f32; 2]; 2]) -> Self {
        self.q = q;
        self
    }

    /// Set the action weight.
    pub fn with_action_weight(mut self, r: f32) -> Self {
        self.r = r;
        self
    }

    /// Tip position `(x + lp·sinθ, −lp·cosθ)` from an angle-encoded state.
    #[inline]
    fn tip_from_encoded(&self, encoded: &[f32]) -> (f32, f32) {
        // Encoded layout: [x, dx, dtheta, sin(theta), cos(theta)].
        (
            encoded[0] + self.pole_length * encoded[3],
            -self.pole_length * encoded[4],
        )
    }

    /// Tip position of the configured target.
    fn target_tip(&self) -> (f32, f32) {
        let encoded = angles::to_complex(&self.target, &ANGLE_DIMS);
        self.tip_from_encoded(&encoded)
    }
}

impl RewardFunction for TipCostReward {
    fn compute(&self, state: &[f32], action: &[f32]) -> f32 {
        let encoded;
        let xa: &[f32] = if state.len() == STATE_SIZE {
            encoded = angles::to_complex(state, &ANGLE_DIMS);
            &encoded
        } else {
            state
        };

        let (tip_x, tip_y) = self.tip_from_encoded(xa);
        let (tgt_x, tgt_y) = self.target_tip();

        let norm = 2.0 * self.pole_length;
        let dx = (tip_x - tgt_x) / norm;
        let dy = (tip_y - tgt_y) / norm;

        let state_cost = self.q[0][0] * dx * dx
            + (self.q[0][1] + self.q[1][0]) * dx * dy
            + self.q[1][1] * dy * dy;

        let u = action[0];
        let action_cost = self.r * u * u;

        (-0.5 * (state_cost + action_cost)).exp()
    }

    fn forward<B: Backend>(&self, states: Tensor<B, 2>, actions: Tensor<B, 2>) -> Tensor<B, 2> {
        let device = states.device();
        let xa = if states.dims()[1] == STATE_SIZE {
            angles::to_complex_tensor(states, &ANGLE_DIMS)
        } else {
            states
        };

        let lp = self.pole_length;
        let (tgt_x, tgt_y) = self.target_tip();

        let tip_x = xa.clone().narrow(1, 0, 1) + xa.clone().narrow(1, 3, 1).mul_scalar(lp);
        let tip_y = xa.narrow(1, 4, 1).mul_scalar(-lp);

        let norm = 2.0 * lp;
        let dx = tip_x.sub_scalar(tgt_x).div_scalar(norm);
        let dy = tip_y.sub_scalar(tgt_y).div_scalar(norm);

        let delta = Tensor::cat(vec![dx, dy], 1);

        let q_flat: Vec<f32> = vec![self.q[0][0], self.q[0][1], self.q[1][0], self.q[1][1]];
        let q = Tensor::<B, 1>::from_floats(q_flat.as_slice(), &device).reshape([2, 2]);

        let state_cost = (delta.clone().matmul(q) * delta).sum_dim(1);
        let action_cost = (actions.clone() * actions).mul_scalar(self.r).sum_dim(1);

        let cost = (state_cost + action_cost).mul_scalar(0.5);
        cost.neg().exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_reward_maximal_at_target() {
        let reward = TipCostReward::new(0.5);
        let upright = reward.compute(&[0.0, 0.0, PI, 0.0], &[0.0]);
        assert!((upright - 1.0).abs() < 1e-5, "upright reward {}", upright);
    }

    #[test]
    fn test_reward_at_hanging_rest() {
        // Normalized tip distance at the hanging rest state is exactly 1,
        // so with Q = 16·I the cost is 8.
        let reward = TipCostReward::new(0.5);
        let hanging = reward.compute(&[0.0, 0.0, 0.0, 0.0], &[0.0]);
        assert!((hanging - (-8.0f32).exp()).abs() < 1e-6, "hanging reward {}", hanging);
    }

    #[test]
    fn test_reward_bounded() {
        let reward = TipCostReward::new(0.5);
        for &theta in &[0.0, 0.5, 1.0, 2.0, PI, -PI, 6.0] {
            for &x in &[-3.0, 0.0, 3.0] {
                let r = reward.compute(&[x, 0.0, theta, 0.0], &[10.0]);
                assert!(r > 0.0 && r <= 1.0, "reward {} out of (0, 1]", r);
            }
        }
    }

    #[test]
    fn test_action_cost_reduces_reward() {
        let reward = TipCostReward::new(0.5);
        let idle = reward.compute(&[0.0, 0.0, PI, 0.0], &[0.0]);
        let pushing = reward.compute(&[0.0, 0.0, PI, 0.0], &[10.0]);
        assert!(pushing < idle);
    }

    #[test]
    fn test_smooth_across_wrap() {
        let reward = TipCostReward::new(0.5);
        let below = reward.compute(&[0.0, 0.0, PI - 1e-3, 0.0], &[0.0]);
        let above = reward.compute(&[0.0, 0.0, -PI + 1e-3, 0.0], &[0.0]);
        assert!((below - above).abs() < 1e-4);
    }

    #[test]
    fn test_accepts_encoded_state() {
        let reward = TipCostReward::new(0.5);
        let raw = [0.4, -1.0, 2.0, 0.3];
        let encoded = angles::to_complex(&raw, &ANGLE_DIMS);

        let a = reward.compute(&raw, &[1.5]);
        let b = reward.compute(&encoded, &[1.5]);
        assert!((a - b).abs() < 1e-6);
    }

    #[test]
    fn test_forward_matches_scalar() {
        let device = Default::default();
        let reward = TipCostReward::new(0.5);

        let states = [[0.0f32, 0.0, 0.0, 0.0], [0.4, -1.0, 2.0, 0.3], [0.0, 0.0, PI, 0.0]];
        let actions = [0.0f32, 1.5, -3.0];

        let flat: Vec<f32> = states.iter().flatten().copied().collect();
        let states_t = Tensor::<TestBackend, 1>::from_floats(flat.as_slice(), &device)
            .reshape([3, 4]);
        let actions_t =
            Tensor::<TestBackend, 1>::from_floats(actions.as_slice(), &device).reshape([3, 1]);

        let out = reward.forward(states_t, actions_t);
        assert_eq!(out.dims(), [3, 1]);

        let out_data = out.into_data();
        let out_slice = out_data.as_slice::<f32>().unwrap();
        for i in 0..3 {
            let expected = reward.compute(&states[i], &[actions[i]]);
            assert!(
                (out_slice[i] - expected).abs() < 1e-5,
                "batch {} mismatch: {} vs {}",
                i,
                out_slice[i],
                expected
            );
        }
    }
}
