//! Small numeric utilities shared across the library.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// Periodic squashing function, scalar version.
///
/// `s(x) = (9 sin x + sin 3x) / 8`, bounded to [-1, 1] with unit slope at
/// the origin.
#[inline]
pub fn sin_squash(x: f32) -> f32 {
    (9.0 * x.sin() + (3.0 * x).sin()) / 8.0
}

/// Periodic squashing function over a tensor (stays differentiable).
pub fn sin_squash_tensor<B: Backend, const D: usize>(x: Tensor<B, D>) -> Tensor<B, D> {
    (x.clone().sin().mul_scalar(9.0) + x.mul_scalar(3.0).sin()).div_scalar(8.0)
}

/// Repeat each row of a `[rows, cols]` tensor `n` times consecutively.
///
/// Used to expand a batch of states into per-state particle bundles:
/// `[r0, r1]` with `n = 2` becomes `[r0, r0, r1, r1]`. Stays inside the
/// autodiff graph.
pub fn tile<B: Backend>(tensor: Tensor<B, 2>, n: usize) -> Tensor<B, 2> {
    let [rows, cols] = tensor.dims();
    let expanded: Tensor<B, 3> = tensor.unsqueeze_dim(1);
    let repeated = Tensor::cat(vec![expanded; n], 1);
    repeated.reshape([rows * n, cols])
}

/// Parse a comma-separated index list such as `"0,2,3"`.
///
/// Returns `None` when any element fails to parse.
pub fn parse_index_list(s: &str) -> Option<Vec<usize>> {
    s.split(',').map(|d| d.trim().parse().ok()).collect()
}
