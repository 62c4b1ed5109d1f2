//! Experience dataset for supervised dynamics-model training.
//!
//! Stores `(input, target)` rows in flat arrays. For one-step dynamics
//! learning the input is the (angle-encoded) observation concatenated with
//! the action, and the target is the state change; the dataset itself is
//! agnostic to that convention and just manages rows.
//!
//! Persistence is a plain CSV file (one row per pair, inputs then targets)
//! so collected experience stays human-inspectable.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

use swingup_core::{Result, SwingupError};

/// Flat-layout store of `(input, target)` training pairs.
#[derive(Clone, Debug)]
pub struct ExperienceDataset {
    input_size: usize,
    target_size: usize,
    inputs: Vec<f32>,
    targets: Vec<f32>,
}

impl ExperienceDataset {
    /// Create an empty dataset for the given row sizes.
    pub fn new(input_size: usize, target_size: usize) -> Self {
        Self {
            input_size,
            target_size,
            inputs: Vec::new(),
            targets: Vec::new(),
        }
    }

    /// Input row size.
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Target row size.
    pub fn target_size(&self) -> usize {
        self.target_size
    }

    /// Number of stored pairs.
    pub fn len(&self) -> usize {
        if self.input_size == 0 {
            0
        } else {
            self.inputs.len() / self.input_size
        }
    }

    /// True when no pairs are stored.
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Append one `(input, target)` pair.
    pub fn append(&mut self, input: &[f32], target: &[f32]) {
        debug_assert_eq!(input.len(), self.input_size);
        debug_assert_eq!(target.len(), self.target_size);
        self.inputs.extend_from_slice(input);
        self.targets.extend_from_slice(target);
    }

    /// Append a one-step transition: input is `observation ++ action`.
    pub fn append_transition(&mut self, observation: &[f32], action: &[f32], target: &[f32]) {
        debug_assert_eq!(observation.len() + action.len(), self.input_size);
        debug_assert_eq!(target.len(), self.target_size);
        self.inputs.extend_from_slice(observation);
        self.inputs.extend_from_slice(action);
        self.targets.extend_from_slice(target);
    }

    /// Input row `i`.
    pub fn input(&self, i: usize) -> &[f32] {
        let start = i * self.input_size;
        &self.inputs[start..start + self.input_size]
    }

    /// Target row `i`.
    pub fn target(&self, i: usize) -> &[f32] {
        let start = i * self.target_size;
        &self.targets[start..start + self.target_size]
    }

    /// Deterministically shuffled row indices.
    pub fn shuffled_indices(&self, seed: u64) -> Vec<usize> {
        let mut rng = Xoshiro256StarStar::seed_from_u64(seed);
        let mut indices: Vec<usize> = (0..self.len()).collect();
        indices.shuffle(&mut rng);
        indices
    }

    /// Gather the rows at `indices` into a pair of `[batch, dim]` tensors.
    pub fn batch<B: Backend>(
        &self,
        indices: &[usize],
        device: &B::Device,
    ) -> (Tensor<B, 2>, Tensor<B, 2>) {
        let mut x = Vec::with_capacity(indices.len() * self.input_size);
        let mut y = Vec::with_capacity(indices.len() * self.target_size);
        for &i in indices {
            x.extend_from_slice(self.input(i));
            y.extend_from_slice(self.target(i));
        }

        let inputs = Tensor::<B, 1>::from_floats(x.as_slice(), device)
            .reshape([indices.len(), self.input_size]);
        let targets = Tensor::<B, 1>::from_floats(y.as_slice(), device)
            .reshape([indices.len(), self.target_size]);
        (inputs, targets)
    }

    /// Write the dataset to a CSV file (header + one row per pair).
    pub fn save_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path.as_ref())
            .map_err(|e| SwingupError::Internal(format!("create {:?}: {}", path.as_ref(), e)))?;
        let mut writer = BufWriter::new(file);

        let mut header: Vec<String> = (0..self.input_size).map(|i| format!("x{}", i)).collect();
        header.extend((0..self.target_size).map(|i| format!("y{}", i)));
        writeln!(writer, "{}", header.join(","))
            .map_err(|e| SwingupError::Internal(e.to_string()))?;

        for i in 0..self.len() {
            let row: Vec<String> = self
                .input(i)
                .iter()
                .chain(self.target(i).iter())
                .map(|v| v.to_string())
                .collect();
            writeln!(writer, "{}", row.join(","))
                .map_err(|e| SwingupError::Internal(e.to_string()))?;
        }

        writer
            .flush()
            .map_err(|e| SwingupError::Internal(e.to_string()))
    }

    /// Load a dataset previously written by [`save_csv`](Self::save_csv).
    ///
    /// Row sizes are taken from the receiver; files with a different total
    /// width are rejected.
    pub fn load_csv(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::open(path.as_ref())
            .map_err(|e| SwingupError::Internal(format!("open {:?}: {}", path.as_ref(), e)))?;
        let reader = BufReader::new(file);

        let mut inputs = Vec::new();
        let mut targets = Vec::new();
        let width = self.input_size + self.target_size;

        for (lineno, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| SwingupError::Internal(e.to_string()))?;
            if lineno == 0 || line.trim().is_empty() {
                continue; // header
            }

            let values: std::result::Result<Vec<f32>, _> =
                line.split(',').map(|v| v.trim().parse::<f32>()).collect();
            let values = values.map_err(|e| {
                SwingupError::Internal(format!("line {}: {}", lineno + 1, e))
            })?;

            if values.len() != width {
                return Err(SwingupError::DimensionMismatch {
                    expected: width,
                    actual: values.len(),
                });
            }
            inputs.extend_from_slice(&values[..self.input_size]);
            targets.extend_from_slice(&values[self.input_size..]);
        }

        self.inputs = inputs;
        self.targets = targets;
        Ok(())
    }
}
