//! Trajectory plotting.
//!
//! Renders rollout trajectories to PNG figures with one sub-chart per
//! dimension: every sample as a translucent line ([`plot_samples`]) or the
//! per-step mean with shaded ±kσ bands ([`plot_mean_std`]).
//! [`plot_trajectories`] writes the standard three figures (states,
//! actions, rewards) for a rollout, and [`plot_rollout`] composes the
//! rollout itself with the figures.

use std::path::Path;

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use plotters::prelude::*;

use swingup_core::{Result, SwingupError};

use crate::rollout::{rollout, RolloutTrajectories, TrajectoryBatch};

/// Default series color (steel blue).
const SERIES_COLOR: RGBColor = RGBColor(70, 130, 180);

fn render_err<E: std::fmt::Display>(e: E) -> SwingupError {
    SwingupError::Render(e.to_string())
}

/// Value range of one dimension across all samples and steps, padded.
fn dim_range(batch: &TrajectoryBatch, dim: usize) -> (f32, f32) {
    let mut lo = f32::INFINITY;
    let mut hi = f32::NEG_INFINITY;
    for step in 0..batch.steps() {
        for sample in 0..batch.samples() {
            let v = batch.get(sample, step, dim);
            lo = lo.min(v);
            hi = hi.max(v);
        }
    }
    if !lo.is_finite() || !hi.is_finite() {
        return (-1.0, 1.0);
    }
    let pad = ((hi - lo) * 0.05).max(1e-3);
    (lo - pad, hi + pad)
}

/// Band range covering mean ± `stdevs`·σ for one dimension, padded.
fn band_range(batch: &TrajectoryBatch, dim: usize, stdevs: usize) -> (f32, f32) {
    let mut lo = f32::INFINITY;
    let mut hi = f32::NEG_INFINITY;
    for step in 0..batch.steps() {
        let mean = batch.mean_at(step)[dim];
        let std = batch.std_at(step)[dim];
        lo = lo.min(mean - stdevs as f32 * std);
        hi = hi.max(mean + stdevs as f32 * std);
    }
    if !lo.is_finite() || !hi.is_finite() {
        return (-1.0, 1.0);
    }
    let pad = ((hi - lo) * 0.05).max(1e-3);
    (lo - pad, hi + pad)
}

/// Plot every sample trajectory, one sub-chart per dimension.
pub fn plot_samples(
    batch: &TrajectoryBatch,
    path: impl AsRef<Path>,
    title: &str,
) -> Result<()> {
    if batch.steps() == 0 || batch.dim() == 0 {
        return Err(SwingupError::InvalidConfig {
            param: "batch".to_string(),
            message: "nothing to plot".to_string(),
        });
    }

    let height = 220 * batch.dim() as u32;
    let root = BitMapBackend::new(path.as_ref(), (1280, height)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let areas = root.split_evenly((batch.dim(), 1));

    let alpha = (2.0 / batch.samples() as f64).clamp(0.05, 1.0);
    let steps = batch.steps();

    for (dim, area) in areas.iter().enumerate() {
        let (lo, hi) = dim_range(batch, dim);
        let caption = format!("{} [{}]", title, dim);
        let mut chart = ChartBuilder::on(area)
            .margin(8)
            .caption(caption, ("sans-serif", 16))
            .x_label_area_size(24)
            .y_label_area_size(48)
            .build_cartesian_2d(0f32..(steps - 1).max(1) as f32, lo..hi)
            .map_err(render_err)?;
        chart.configure_mesh().draw().map_err(render_err)?;

        for sample in 0..batch.samples() {
            chart
                .draw_series(LineSeries::new(
                    (0..steps).map(|t| (t as f32, batch.get(sample, t, dim))),
                    SERIES_COLOR.mix(alpha),
                ))
                .map_err(render_err)?;
        }
    }

    root.present().map_err(render_err)
}

/// Plot the per-step mean with shaded ±kσ bands, one sub-chart per dimension.
pub fn plot_mean_std(
    batch: &TrajectoryBatch,
    path: impl AsRef<Path>,
    title: &str,
    stdevs: usize,
) -> Result<()> {
    if batch.steps() == 0 || batch.dim() == 0 {
        return Err(SwingupError::InvalidConfig {
            param: "batch".to_string(),
            message: "nothing to plot".to_string(),
        });
    }

    let height = 220 * batch.dim() as u32;
    let root = BitMapBackend::new(path.as_ref(), (1280, height)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let areas = root.split_evenly((batch.dim(), 1));

    let steps = batch.steps();

    for (dim, area) in areas.iter().enumerate() {
        let (lo, hi) = band_range(batch, dim, stdevs.max(1));
        let caption = format!("{} [{}]", title, dim);
        let mut chart = ChartBuilder::on(area)
            .margin(8)
            .caption(caption, ("sans-serif", 16))
            .x_label_area_size(24)
            .y_label_area_size(48)
            .build_cartesian_2d(0f32..(steps - 1).max(1) as f32, lo..hi)
            .map_err(render_err)?;
        chart.configure_mesh().draw().map_err(render_err)?;

        // Wider bands get fainter, so overlapping σ levels stay readable.
        let mut alpha = 0.4;
        for k in (1..=stdevs.max(1)).rev() {
            alpha *= 0.8;
            let upper = (0..steps).map(|t| {
                let mean = batch.mean_at(t)[dim];
                let std = batch.std_at(t)[dim];
                (t as f32, mean + k as f32 * std)
            });
            let lower = (0..steps).rev().map(|t| {
                let mean = batch.mean_at(t)[dim];
                let std = batch.std_at(t)[dim];
                (t as f32, mean - k as f32 * std)
            });
            let band: Vec<(f32, f32)> = upper.chain(lower).collect();

            chart
                .draw_series(std::iter::once(Polygon::new(
                    band,
                    SERIES_COLOR.mix(alpha),
                )))
                .map_err(render_err)?;
        }

        chart
            .draw_series(LineSeries::new(
                (0..steps).map(|t| (t as f32, batch.mean_at(t)[dim])),
                &SERIES_COLOR,
            ))
            .map_err(render_err)?;
    }

    root.present().map_err(render_err)
}

/// Write the three standard rollout figures into `dir`.
///
/// Produces `states.png`, `actions.png` and `rewards.png`. Sample lines
/// are drawn when `plot_all_samples` is set, mean ± 2σ bands otherwise.
pub fn plot_trajectories(
    trajectories: &RolloutTrajectories,
    dir: impl AsRef<Path>,
    plot_all_samples: bool,
) -> Result<()> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)
        .map_err(|e| SwingupError::Render(format!("create {:?}: {}", dir, e)))?;

    let figures: [(&TrajectoryBatch, &str, &str); 3] = [
        (&trajectories.states, "states.png", "Rolled out states"),
        (&trajectories.actions, "actions.png", "Predicted actions"),
        (&trajectories.rewards, "rewards.png", "Predicted rewards"),
    ];

    for (batch, file, title) in figures {
        if batch.dim() == 0 {
            continue;
        }
        let path = dir.join(file);
        if plot_all_samples {
            plot_samples(batch, &path, title)?;
        } else {
            plot_mean_std(batch, &path, title, 2)?;
        }
    }
    Ok(())
}

/// Roll particles through a one-step model and plot the trajectories.
pub fn plot_rollout<B, F, P>(
    x0: Tensor<B, 2>,
    step_fn: F,
    policy_fn: P,
    horizon: usize,
    dir: impl AsRef<Path>,
) -> Result<RolloutTrajectories>
where
    B: Backend,
    F: FnMut(Tensor<B, 2>, Tensor<B, 2>) -> (Tensor<B, 2>, Tensor<B, 2>),
    P: FnMut(Tensor<B, 2>) -> Tensor<B, 2>,
{
    let trajectories = rollout(x0, step_fn, policy_fn, horizon);
    plot_trajectories(&trajectories, dir, true)?;
    Ok(trajectories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    fn sample_batch(samples: usize, steps: usize, dim: usize) -> TrajectoryBatch {
        let mut batch = TrajectoryBatch::new(samples, dim);
        for t in 0..steps {
            let mut row = Vec::new();
            for s in 0..samples {
                for d in 0..dim {
                    row.push((t as f32 * 0.1) + s as f32 + d as f32 * 0.01);
                }
            }
            batch.push_step(&row);
        }
        batch
    }

    #[test]
    fn test_plot_samples_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("samples.png");

        plot_samples(&sample_batch(5, 20, 3), &path, "States").unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_plot_mean_std_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mean.png");

        plot_mean_std(&sample_batch(8, 15, 2), &path, "States", 2).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_plot_rejects_empty_batch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");

        let batch = TrajectoryBatch::new(3, 2);
        assert!(plot_samples(&batch, &path, "Empty").is_err());
    }

    #[test]
    fn test_plot_rollout_writes_all_figures() {
        let dir = tempfile::tempdir().unwrap();
        let device = Default::default();
        let x0: Tensor<TestBackend, 2> = Tensor::ones([4, 2], &device);

        plot_rollout(
            x0,
            |states, _actions| {
                let n = states.dims()[0];
                let device = states.device();
                (states.mul_scalar(0.9), Tensor::ones([n, 1], &device))
            },
            |states| states.clone().narrow(1, 0, 1).neg(),
            10,
            dir.path(),
        )
        .unwrap();

        for file in ["states.png", "actions.png", "rewards.png"] {
            assert!(dir.path().join(file).exists(), "{} missing", file);
        }
    }
}
