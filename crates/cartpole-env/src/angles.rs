//! Angle-to-complex state encoding.
//!
//! Angular state dimensions wrap around at ±π, which makes raw angles a poor
//! input for function approximators: two nearby physical configurations can
//! be numerically far apart. Encoding each angle as its (sin, cos) pair
//! removes the discontinuity.
//!
//! The encoded layout keeps all non-angle dimensions first, in their
//! original order, followed by a (sin, cos) pair per angle dimension:
//!
//! ```text
//! [x, dx, theta, dtheta]  --dims=[2]-->  [x, dx, dtheta, sin(theta), cos(theta)]
//! ```

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// Encoded size of a state with the given number of angle dimensions.
#[inline]
pub fn encoded_size(state_size: usize, n_angle_dims: usize) -> usize {
    state_size + n_angle_dims
}

/// Encode angle dimensions of a state as (sin, cos) pairs.
///
/// Non-angle dimensions come first in their original order, then one
/// (sin, cos) pair per entry of `angle_dims`, in the order given.
pub fn to_complex(state: &[f32], angle_dims: &[usize]) -> Vec<f32> {
    let mut out = Vec::with_capacity(encoded_size(state.len(), angle_dims.len()));
    for (i, &v) in state.iter().enumerate() {
        if !angle_dims.contains(&i) {
            out.push(v);
        }
    }
    for &d in angle_dims {
        out.push(state[d].sin());
        out.push(state[d].cos());
    }
    out
}

/// Decode an angle-encoded state back to angle representation.
///
/// The inverse of [`to_complex`]: each (sin, cos) pair is collapsed to
/// `atan2(sin, cos)` and reinserted at its original position. Angles come
/// back wrapped to (-π, π], so this only round-trips exactly for states
/// whose angles already lie in that interval.
pub fn to_angle(encoded: &[f32], angle_dims: &[usize], state_size: usize) -> Vec<f32> {
    debug_assert_eq!(encoded.len(), encoded_size(state_size, angle_dims.len()));

    let mut out = vec![0.0f32; state_size];
    let mut cursor = 0;
    for i in 0..state_size {
        if !angle_dims.contains(&i) {
            out[i] = encoded[cursor];
            cursor += 1;
        }
    }
    for &d in angle_dims {
        let sin = encoded[cursor];
        let cos = encoded[cursor + 1];
        out[d] = sin.atan2(cos);
        cursor += 2;
    }
    out
}

/// Batched tensor version of [`to_complex`].
///
/// Operates on `[batch, state_size]` tensors and stays inside the autodiff
/// graph, so downstream costs computed on the encoding remain differentiable
/// with respect to the raw state.
pub fn to_complex_tensor<B: Backend>(states: Tensor<B, 2>, angle_dims: &[usize]) -> Tensor<B, 2> {
    let state_size = states.dims()[1];
    let mut columns: Vec<Tensor<B, 2>> = Vec::with_capacity(state_size + angle_dims.len());

    for i in 0..state_size {
        if !angle_dims.contains(&i) {
            columns.push(states.clone().narrow(1, i, 1));
        }
    }
    for &d in angle_dims {
        let angle = states.clone().narrow(1, d, 1);
        columns.push(angle.clone().sin());
        columns.push(angle.cos());
    }

    Tensor::cat(columns, 1)
}
