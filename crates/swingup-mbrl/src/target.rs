//! Polyak averaging between modules.
//!
//! Blends the parameters of an online module into a target copy:
//!
//! ```text
//! θ_target = τ · θ_online + (1 − τ) · θ_target
//! ```
//!
//! Parameters are matched by traversal order, which is deterministic for
//! two modules of the same architecture, so independently initialized
//! copies can be blended without sharing parameter ids.

use std::cell::RefCell;

use burn::module::{Module, ModuleMapper, Param};
use burn::prelude::*;

/// Collects every float parameter of a module, flattened to 1D.
struct ParamCollector<B: Backend> {
    params: Vec<Tensor<B, 1>>,
}

impl<B: Backend> ModuleMapper<B> for ParamCollector<B> {
    fn map_float<const D: usize>(&mut self, param: Param<Tensor<B, D>>) -> Param<Tensor<B, D>> {
        let value = param.val();
        let numel: usize = value.dims().iter().product();
        self.params.push(value.clone().reshape([numel]));
        param
    }
}

/// Rewrites a module's parameters as the Polyak blend with collected ones.
struct PolyakMapper<B: Backend> {
    online: Vec<Tensor<B, 1>>,
    tau: f32,
    cursor: RefCell<usize>,
}

impl<B: Backend> ModuleMapper<B> for PolyakMapper<B> {
    fn map_float<const D: usize>(&mut self, param: Param<Tensor<B, D>>) -> Param<Tensor<B, D>> {
        let idx = *self.cursor.borrow();
        *self.cursor.borrow_mut() = idx + 1;

        let target = param.val();
        let shape = target.dims();
        let numel: usize = shape.iter().product();

        match self.online.get(idx) {
            Some(online) => {
                let blended = online.clone().mul_scalar(self.tau)
                    + target.reshape([numel]).mul_scalar(1.0 - self.tau);
                Param::initialized(param.id.clone(), blended.reshape(shape))
            }
            // Architectures diverged; leave the remaining target params alone.
            None => param,
        }
    }
}

/// Polyak-average `online` into `target` with interpolation factor `tau`.
///
/// `tau = 0` returns the target unchanged, `tau = 1` copies the online
/// module.
pub fn soft_update<B, M>(online: &M, target: M, tau: f32) -> M
where
    B: Backend,
    M: Module<B>,
{
    if (tau - 1.0).abs() < 1e-6 {
        return online.clone();
    }
    if tau.abs() < 1e-6 {
        return target;
    }

    let mut collector = ParamCollector { params: Vec::new() };
    let _ = online.clone().map(&mut collector);

    let mut mapper = PolyakMapper {
        online: collector.params,
        tau,
        cursor: RefCell::new(0),
    };
    target.map(&mut mapper)
}

/// Replace the target with a copy of the online module (`tau = 1`).
pub fn hard_copy<B, M>(online: &M) -> M
where
    B: Backend,
    M: Module<B>,
{
    online.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::nn::LinearConfig;

    type TestBackend = NdArray<f32>;

    fn weights(model: &burn::nn::Linear<TestBackend>) -> Vec<f32> {
        model
            .weight
            .val()
            .into_data()
            .as_slice::<f32>()
            .unwrap()
            .to_vec()
    }

    #[test]
    fn test_tau_zero_keeps_target() {
        let device = Default::default();
        let online = LinearConfig::new(4, 4).init::<TestBackend>(&device);
        let target = LinearConfig::new(4, 4).init::<TestBackend>(&device);
        let before = weights(&target);

        let updated = soft_update::<TestBackend, _>(&online, target, 0.0);
        assert_eq!(weights(&updated), before);
    }

    #[test]
    fn test_tau_one_copies_online() {
        let device = Default::default();
        let online = LinearConfig::new(4, 4).init::<TestBackend>(&device);
        let target = LinearConfig::new(4, 4).init::<TestBackend>(&device);

        let updated = soft_update::<TestBackend, _>(&online, target, 1.0);
        assert_eq!(weights(&updated), weights(&online));
    }

    #[test]
    fn test_interpolation() {
        let device = Default::default();
        let online = LinearConfig::new(4, 4).init::<TestBackend>(&device);
        let target = LinearConfig::new(4, 4).init::<TestBackend>(&device);

        let online_w = weights(&online);
        let target_w = weights(&target);

        let tau = 0.25f32;
        let updated = soft_update::<TestBackend, _>(&online, target, tau);
        let updated_w = weights(&updated);

        for i in 0..online_w.len() {
            let expected = tau * online_w[i] + (1.0 - tau) * target_w[i];
            assert!(
                (updated_w[i] - expected).abs() < 1e-5,
                "blend mismatch at {}: {} vs {}",
                i,
                updated_w[i],
                expected
            );
        }
    }

    #[test]
    fn test_bias_blended_too() {
        let device = Default::default();
        let online = LinearConfig::new(3, 2).with_bias(true).init::<TestBackend>(&device);
        let target = LinearConfig::new(3, 2).with_bias(true).init::<TestBackend>(&device);

        let online_b: Vec<f32> = online
            .bias
            .as_ref()
            .unwrap()
            .val()
            .into_data()
            .as_slice::<f32>()
            .unwrap()
            .to_vec();
        let target_b: Vec<f32> = target
            .bias
            .as_ref()
            .unwrap()
            .val()
            .into_data()
            .as_slice::<f32>()
            .unwrap()
            .to_vec();

        let tau = 0.5f32;
        let updated = soft_update::<TestBackend, _>(&online, target, tau);
        let updated_b = updated.bias.as_ref().unwrap().val().into_data();
        let updated_b = updated_b.as_slice::<f32>().unwrap();

        for i in 0..online_b.len() {
            let expected = tau * online_b[i] + (1.0 - tau) * target_b[i];
            assert!((updated_b[i] - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn test_repeated_updates_converge_to_online() {
        let device = Default::default();
        let online = LinearConfig::new(4, 4).init::<TestBackend>(&device);
        let mut target = LinearConfig::new(4, 4).init::<TestBackend>(&device);

        for _ in 0..2000 {
            target = soft_update::<TestBackend, _>(&online, target, 0.01);
        }

        let online_w = weights(&online);
        let target_w = weights(&target);
        for (o, t) in online_w.iter().zip(target_w.iter()) {
            assert!((o - t).abs() < 1e-3, "target should converge: {} vs {}", t, o);
        }
    }

    #[test]
    fn test_hard_copy() {
        let device = Default::default();
        let online = LinearConfig::new(2, 2).init::<TestBackend>(&device);
        let copy = hard_copy::<TestBackend, _>(&online);
        assert_eq!(weights(&copy), weights(&online));
    }
}
