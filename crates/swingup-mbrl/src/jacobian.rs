//! Jacobians of batched functions via autodiff.
//!
//! Both entry points differentiate a batched map `f: [batch, n] -> [batch, m]`
//! at a single input point and return the dense `m × n` jacobian, detached
//! from the autodiff graph.
//!
//! [`jacobian`] runs one backward pass per output dimension. For wide
//! outputs [`batch_jacobian`] is cheaper: it tiles the input to `m`
//! identical rows, evaluates `f` once on the tile, contracts the output
//! with the identity selector and recovers the whole jacobian from a
//! single backward pass - row `i` of the input gradient is then exactly
//! `∂f_i/∂x`.

use burn::tensor::backend::AutodiffBackend;
use burn::tensor::Tensor;

use crate::utils::tile;

/// Jacobian of `f` at `x`, one backward pass per output dimension.
///
/// `x` is a flat input of size `n`; `f` maps `[batch, n]` to `[batch, m]`.
/// Returns the `m × n` jacobian (detached).
pub fn jacobian<B, F>(f: F, x: Tensor<B, 1>) -> Tensor<B, 2>
where
    B: AutodiffBackend,
    F: Fn(Tensor<B, 2>) -> Tensor<B, 2>,
{
    let device = x.device();
    let n = x.dims()[0];
    let x_data = x.into_data();
    let x_slice = x_data.as_slice::<f32>().unwrap();

    let probe = f(Tensor::<B, 1>::from_floats(x_slice, &device).reshape([1, n]));
    let m = probe.dims()[1];

    let mut rows: Vec<f32> = Vec::with_capacity(m * n);
    for i in 0..m {
        let xi = Tensor::<B, 1>::from_floats(x_slice, &device)
            .reshape([1, n])
            .require_grad();
        let y = f(xi.clone());
        let yi = y.slice([0..1, i..i + 1]).sum();

        let grads = yi.backward();
        let grad = xi.grad(&grads).unwrap();
        let grad_data = grad.into_data();
        rows.extend_from_slice(grad_data.as_slice::<f32>().unwrap());
    }

    Tensor::<B, 1>::from_floats(rows.as_slice(), &device).reshape([m, n])
}

/// Jacobian of `f` at `x` from a single backward pass.
///
/// Tiles `x` to `m` rows, so `f` must treat batch rows independently
/// (true for pointwise models and anything built from per-row ops).
pub fn batch_jacobian<B, F>(f: F, x: Tensor<B, 1>) -> Tensor<B, 2>
where
    B: AutodiffBackend,
    F: Fn(Tensor<B, 2>) -> Tensor<B, 2>,
{
    let device = x.device();
    let n = x.dims()[0];

    let row = x.reshape([1, n]);
    let m = f(row.clone()).dims()[1];

    let x_rep = tile(row, m).require_grad();
    let y_rep = f(x_rep.clone());

    // Select y[i, i]: gradient of the sum w.r.t. row i is then ∂f_i/∂x.
    let mut eye = vec![0.0f32; m * m];
    for i in 0..m {
        eye[i * m + i] = 1.0;
    }
    let selector = Tensor::<B, 1>::from_floats(eye.as_slice(), &device).reshape([m, m]);

    let contracted = (y_rep * selector).sum();
    let grads = contracted.backward();
    let grad = x_rep.grad(&grads).unwrap();

    Tensor::<B, 1>::from_floats(grad.into_data().as_slice::<f32>().unwrap(), &device)
        .reshape([m, n])
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};

    type AdBackend = Autodiff<NdArray<f32>>;

    /// f(x) = x · Aᵀ for a fixed 3×2 matrix A; the jacobian is A.
    fn linear_map(x: Tensor<AdBackend, 2>) -> Tensor<AdBackend, 2> {
        let device = x.device();
        // A = [[1, 2], [3, 4], [5, 6]]
        let a_t = Tensor::<AdBackend, 1>::from_floats(
            [1.0, 3.0, 5.0, 2.0, 4.0, 6.0],
            &device,
        )
        .reshape([2, 3]);
        x.matmul(a_t)
    }

    const EXPECTED_A: [[f32; 2]; 3] = [[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];

    fn assert_matches_a(jac: Tensor<AdBackend, 2>) {
        assert_eq!(jac.dims(), [3, 2]);
        let data = jac.into_data();
        let v = data.as_slice::<f32>().unwrap();
        for i in 0..3 {
            for j in 0..2 {
                assert!(
                    (v[i * 2 + j] - EXPECTED_A[i][j]).abs() < 1e-5,
                    "jacobian[{}][{}] = {}, expected {}",
                    i,
                    j,
                    v[i * 2 + j],
                    EXPECTED_A[i][j]
                );
            }
        }
    }

    #[test]
    fn test_jacobian_of_linear_map() {
        let device = Default::default();
        let x = Tensor::<AdBackend, 1>::from_floats([0.5, -1.0], &device);
        assert_matches_a(jacobian(linear_map, x));
    }

    #[test]
    fn test_batch_jacobian_of_linear_map() {
        let device = Default::default();
        let x = Tensor::<AdBackend, 1>::from_floats([0.5, -1.0], &device);
        assert_matches_a(batch_jacobian(linear_map, x));
    }

    #[test]
    fn test_both_agree_on_nonlinear_map() {
        let device = Default::default();
        let x = Tensor::<AdBackend, 1>::from_floats([0.3, 0.7, -0.2], &device);

        let f = |x: Tensor<AdBackend, 2>| x.clone().sin() * x.exp();

        let a = jacobian(f, x.clone()).into_data();
        let b = batch_jacobian(f, x).into_data();

        let a = a.as_slice::<f32>().unwrap();
        let b = b.as_slice::<f32>().unwrap();
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-5, "jacobians disagree: {} vs {}", x, y);
        }
    }

    #[test]
    fn test_jacobian_diagonal_for_pointwise_map() {
        let device = Default::default();
        let x = Tensor::<AdBackend, 1>::from_floats([0.2, 1.0], &device);

        // Pointwise square: jacobian is diag(2x).
        let jac = jacobian(|x: Tensor<AdBackend, 2>| x.clone() * x, x);
        let data = jac.into_data();
        let v = data.as_slice::<f32>().unwrap();

        assert!((v[0] - 0.4).abs() < 1e-5);
        assert!((v[1]).abs() < 1e-6);
        assert!((v[2]).abs() < 1e-6);
        assert!((v[3] - 2.0).abs() < 1e-5);
    }
}
