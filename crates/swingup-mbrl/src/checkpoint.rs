//! Checkpointing for training sessions.
//!
//! A training session persists up to three components: the dynamics model,
//! the policy (both as burn records) and the collected experience (CSV).
//! [`Checkpointer`] saves numbered snapshots per component, maintains a
//! `latest_<name>.bin` alias and optionally tracks the best snapshot by a
//! metric; [`resume_session`] restores whatever components exist, warning
//! about and skipping the ones that do not, so a partially written or
//! fresh checkpoint directory never aborts a run.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use burn::module::Module;
use burn::record::{BinFileRecorder, FullPrecisionSettings};
use burn::tensor::backend::Backend;

use crate::dataset::ExperienceDataset;

/// File name of the persisted experience dataset.
pub const EXPERIENCE_FILE: &str = "experience.csv";

/// Configuration for the checkpointer.
#[derive(Debug, Clone)]
pub struct CheckpointerConfig {
    /// Directory to store checkpoints.
    pub checkpoint_dir: PathBuf,
    /// Trials between checkpoint saves.
    pub save_interval: usize,
    /// Number of recent checkpoints to keep per component (0 = keep all).
    pub keep_last_n: usize,
    /// Whether to track and save the best snapshot by metric.
    pub save_best: bool,
}

impl Default for CheckpointerConfig {
    fn default() -> Self {
        Self {
            checkpoint_dir: PathBuf::from("./checkpoints"),
            save_interval: 1,
            keep_last_n: 5,
            save_best: true,
        }
    }
}

impl CheckpointerConfig {
    /// Create a config with the specified checkpoint directory.
    pub fn new(checkpoint_dir: impl Into<PathBuf>) -> Self {
        Self {
            checkpoint_dir: checkpoint_dir.into(),
            ..Default::default()
        }
    }

    /// Set the save interval.
    pub fn with_save_interval(mut self, interval: usize) -> Self {
        self.save_interval = interval;
        self
    }

    /// Set the number of checkpoints to keep per component.
    pub fn with_keep_last_n(mut self, n: usize) -> Self {
        self.keep_last_n = n;
        self
    }

    /// Enable or disable best snapshot tracking.
    pub fn with_save_best(mut self, save_best: bool) -> Self {
        self.save_best = save_best;
        self
    }
}

/// Error type for checkpointing operations.
#[derive(Debug)]
pub enum CheckpointError {
    /// IO error during save/load.
    Io(io::Error),
    /// Burn recorder error.
    Recorder(String),
    /// No checkpoints found for the requested component.
    NoCheckpoints,
}

impl std::fmt::Display for CheckpointError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckpointError::Io(e) => write!(f, "IO error: {}", e),
            CheckpointError::Recorder(e) => write!(f, "Recorder error: {}", e),
            CheckpointError::NoCheckpoints => write!(f, "No checkpoints found"),
        }
    }
}

impl std::error::Error for CheckpointError {}

impl From<io::Error> for CheckpointError {
    fn from(e: io::Error) -> Self {
        CheckpointError::Io(e)
    }
}

/// Checkpoint metadata.
#[derive(Debug, Clone)]
pub struct CheckpointInfo {
    /// Component name (`dynamics`, `policy`, ...).
    pub component: String,
    /// Path to the checkpoint file.
    pub path: PathBuf,
    /// Trial at which the checkpoint was saved.
    pub trial: usize,
    /// Optional metric value (e.g. episode return).
    pub metric: Option<f32>,
}

/// Saves and restores training-session components.
pub struct Checkpointer {
    config: CheckpointerConfig,
    best_metric: f32,
    history: Vec<CheckpointInfo>,
}

impl Checkpointer {
    /// Create a new checkpointer, creating the directory if needed.
    pub fn new(config: CheckpointerConfig) -> Result<Self, CheckpointError> {
        fs::create_dir_all(&config.checkpoint_dir)?;
        Ok(Self {
            config,
            best_metric: f32::NEG_INFINITY,
            history: Vec::new(),
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &CheckpointerConfig {
        &self.config
    }

    /// Check if it's time to save at this trial.
    pub fn should_save(&self, trial: usize) -> bool {
        trial > 0 && trial % self.config.save_interval == 0
    }

    /// Current best metric value.
    pub fn best_metric(&self) -> f32 {
        self.best_metric
    }

    fn recorder() -> BinFileRecorder<FullPrecisionSettings> {
        BinFileRecorder::<FullPrecisionSettings>::new()
    }

    fn latest_path(&self, component: &str) -> PathBuf {
        self.config
            .checkpoint_dir
            .join(format!("latest_{}.bin", component))
    }

    /// Save a model component.
    ///
    /// Writes `<component>_<trial>.bin`, refreshes `latest_<component>.bin`
    /// and, when enabled and the metric improves, `best_<component>.bin`.
    pub fn save<B: Backend, M: Module<B>>(
        &mut self,
        component: &str,
        model: &M,
        trial: usize,
        metric: Option<f32>,
    ) -> Result<PathBuf, CheckpointError> {
        let recorder = Self::recorder();

        let filename = format!("{}_{:08}.bin", component, trial);
        let path = self.config.checkpoint_dir.join(&filename);
        model
            .clone()
            .save_file(&path, &recorder)
            .map_err(|e| CheckpointError::Recorder(e.to_string()))?;

        model
            .clone()
            .save_file(self.latest_path(component), &recorder)
            .map_err(|e| CheckpointError::Recorder(e.to_string()))?;

        if self.config.save_best {
            if let Some(m) = metric {
                if m > self.best_metric {
                    self.best_metric = m;
                    let best = self
                        .config
                        .checkpoint_dir
                        .join(format!("best_{}.bin", component));
                    model
                        .clone()
                        .save_file(best, &recorder)
                        .map_err(|e| CheckpointError::Recorder(e.to_string()))?;
                }
            }
        }

        self.history.push(CheckpointInfo {
            component: component.to_string(),
            path: path.clone(),
            trial,
            metric,
        });
        self.cleanup_old(component)?;

        Ok(path)
    }

    /// Save the experience dataset alongside the model components.
    pub fn save_experience(&self, dataset: &ExperienceDataset) -> Result<(), CheckpointError> {
        dataset
            .save_csv(self.config.checkpoint_dir.join(EXPERIENCE_FILE))
            .map_err(|e| CheckpointError::Recorder(e.to_string()))
    }

    /// Load the latest snapshot of a component into a model template.
    pub fn load_latest<B: Backend, M: Module<B>>(
        &self,
        component: &str,
        template: M,
        device: &B::Device,
    ) -> Result<M, CheckpointError> {
        let path = self.latest_path(component);
        if !path.exists() {
            return Err(CheckpointError::NoCheckpoints);
        }
        template
            .load_file(path, &Self::recorder(), device)
            .map_err(|e| CheckpointError::Recorder(e.to_string()))
    }

    /// List all numbered checkpoints of a component, sorted by trial.
    pub fn list_checkpoints(
        &self,
        component: &str,
    ) -> Result<Vec<CheckpointInfo>, CheckpointError> {
        let prefix = format!("{}_", component);
        let mut checkpoints: Vec<CheckpointInfo> = fs::read_dir(&self.config.checkpoint_dir)?
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                let path = e.path();
                let filename = path.file_name()?.to_str()?;
                let trial = filename
                    .strip_prefix(&prefix)?
                    .strip_suffix(".bin")?
                    .parse()
                    .ok()?;
                Some(CheckpointInfo {
                    component: component.to_string(),
                    path,
                    trial,
                    metric: None,
                })
            })
            .collect();

        checkpoints.sort_by_key(|c| c.trial);
        Ok(checkpoints)
    }

    fn cleanup_old(&mut self, component: &str) -> Result<(), CheckpointError> {
        if self.config.keep_last_n == 0 {
            return Ok(());
        }

        let mut kept = 0;
        for i in (0..self.history.len()).rev() {
            if self.history[i].component != component {
                continue;
            }
            kept += 1;
            if kept > self.config.keep_last_n {
                let old = self.history.remove(i);
                let _ = fs::remove_file(&old.path);
            }
        }
        Ok(())
    }
}

/// Which components a [`resume_session`] call managed to restore.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResumeReport {
    /// The dynamics model was restored.
    pub dynamics: bool,
    /// The policy was restored.
    pub policy: bool,
    /// The experience dataset was restored.
    pub experience: bool,
}

/// Restore a training session from a checkpoint directory.
///
/// Each component is attempted independently: a missing or unreadable
/// component prints a warning and leaves the passed-in template/dataset
/// untouched, so resuming from a fresh directory degrades to a cold start.
pub fn resume_session<B, MD, MP>(
    dir: impl AsRef<Path>,
    dynamics: MD,
    policy: MP,
    experience: &mut ExperienceDataset,
    device: &B::Device,
) -> (MD, MP, ResumeReport)
where
    B: Backend,
    MD: Module<B>,
    MP: Module<B>,
{
    let dir = dir.as_ref();
    let mut report = ResumeReport::default();
    let recorder = BinFileRecorder::<FullPrecisionSettings>::new();

    let dynamics = match dynamics
        .clone()
        .load_file(dir.join("latest_dynamics.bin"), &recorder, device)
    {
        Ok(loaded) => {
            report.dynamics = true;
            loaded
        }
        Err(e) => {
            eprintln!(
                "warning: unable to load dynamics model from {}: {}",
                dir.display(),
                e
            );
            dynamics
        }
    };

    let policy = match policy
        .clone()
        .load_file(dir.join("latest_policy.bin"), &recorder, device)
    {
        Ok(loaded) => {
            report.policy = true;
            loaded
        }
        Err(e) => {
            eprintln!(
                "warning: unable to load policy from {}: {}",
                dir.display(),
                e
            );
            policy
        }
    };

    match experience.load_csv(dir.join(EXPERIENCE_FILE)) {
        Ok(()) => report.experience = true,
        Err(e) => eprintln!(
            "warning: unable to load experience from {}: {}",
            dir.display(),
            e
        ),
    }

    (dynamics, policy, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::gaussian_mlp::GaussianMlpConfig;
    use crate::model::policy::MlpPolicyConfig;
    use burn::backend::NdArray;
    use burn::nn::LinearConfig;
    use tempfile::tempdir;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_checkpointer_config() {
        let config = CheckpointerConfig::new("./test_ckpts")
            .with_save_interval(5)
            .with_keep_last_n(3)
            .with_save_best(false);

        assert_eq!(config.checkpoint_dir, PathBuf::from("./test_ckpts"));
        assert_eq!(config.save_interval, 5);
        assert_eq!(config.keep_last_n, 3);
        assert!(!config.save_best);
    }

    #[test]
    fn test_should_save() {
        let dir = tempdir().unwrap();
        let config = CheckpointerConfig::new(dir.path()).with_save_interval(4);
        let checkpointer = Checkpointer::new(config).unwrap();

        assert!(!checkpointer.should_save(0));
        assert!(!checkpointer.should_save(3));
        assert!(checkpointer.should_save(4));
        assert!(checkpointer.should_save(8));
    }

    #[test]
    fn test_save_and_load_latest() {
        let dir = tempdir().unwrap();
        let device = Default::default();
        let mut checkpointer =
            Checkpointer::new(CheckpointerConfig::new(dir.path())).unwrap();

        let model = LinearConfig::new(4, 2).init::<TestBackend>(&device);
        checkpointer
            .save::<TestBackend, _>("dynamics", &model, 1, None)
            .unwrap();

        let template = LinearConfig::new(4, 2).init::<TestBackend>(&device);
        let loaded = checkpointer
            .load_latest::<TestBackend, _>("dynamics", template, &device)
            .unwrap();

        let saved_weight = model.weight.val().into_data();
        let loaded_weight = loaded.weight.val().into_data();
        assert_eq!(
            saved_weight.as_slice::<f32>().unwrap(),
            loaded_weight.as_slice::<f32>().unwrap()
        );
    }

    #[test]
    fn test_keep_last_n_cleanup() {
        let dir = tempdir().unwrap();
        let device = Default::default();
        let config = CheckpointerConfig::new(dir.path()).with_keep_last_n(2);
        let mut checkpointer = Checkpointer::new(config).unwrap();

        let model = LinearConfig::new(2, 2).init::<TestBackend>(&device);
        for trial in 1..=5 {
            checkpointer
                .save::<TestBackend, _>("dynamics", &model, trial, None)
                .unwrap();
        }

        let remaining = checkpointer.list_checkpoints("dynamics").unwrap();
        let trials: Vec<usize> = remaining.iter().map(|c| c.trial).collect();
        assert_eq!(trials, vec![4, 5]);

        // The latest alias must survive cleanup.
        assert!(dir.path().join("latest_dynamics.bin").exists());
    }

    #[test]
    fn test_best_tracking() {
        let dir = tempdir().unwrap();
        let device = Default::default();
        let mut checkpointer =
            Checkpointer::new(CheckpointerConfig::new(dir.path())).unwrap();

        let model = LinearConfig::new(2, 2).init::<TestBackend>(&device);
        checkpointer
            .save::<TestBackend, _>("policy", &model, 1, Some(1.0))
            .unwrap();
        checkpointer
            .save::<TestBackend, _>("policy", &model, 2, Some(3.0))
            .unwrap();
        checkpointer
            .save::<TestBackend, _>("policy", &model, 3, Some(2.0))
            .unwrap();

        assert_eq!(checkpointer.best_metric(), 3.0);
        assert!(dir.path().join("best_policy.bin").exists());
    }

    #[test]
    fn test_resume_from_empty_dir_warns_and_continues() {
        let dir = tempdir().unwrap();
        let device = Default::default();

        let dynamics = GaussianMlpConfig::new(6, 4).init::<TestBackend>(&device);
        let policy = MlpPolicyConfig::new(5, 1, 10.0).init::<TestBackend>(&device);
        let mut experience = ExperienceDataset::new(6, 4);

        let (_dynamics, _policy, report) =
            resume_session::<TestBackend, _, _>(dir.path(), dynamics, policy, &mut experience, &device);

        assert_eq!(report, ResumeReport::default());
        assert!(experience.is_empty());
    }

    #[test]
    fn test_resume_round_trip() {
        let dir = tempdir().unwrap();
        let device = Default::default();
        let mut checkpointer =
            Checkpointer::new(CheckpointerConfig::new(dir.path())).unwrap();

        let dynamics = GaussianMlpConfig::new(6, 4).init::<TestBackend>(&device);
        let policy = MlpPolicyConfig::new(5, 1, 10.0).init::<TestBackend>(&device);
        checkpointer
            .save::<TestBackend, _>("dynamics", &dynamics, 1, None)
            .unwrap();
        checkpointer
            .save::<TestBackend, _>("policy", &policy, 1, None)
            .unwrap();

        let mut experience = ExperienceDataset::new(6, 4);
        experience.append(&[1.0; 6], &[2.0; 4]);
        checkpointer.save_experience(&experience).unwrap();

        let dyn_template = GaussianMlpConfig::new(6, 4).init::<TestBackend>(&device);
        let pol_template = MlpPolicyConfig::new(5, 1, 10.0).init::<TestBackend>(&device);
        let mut restored = ExperienceDataset::new(6, 4);

        let (_d, _p, report) = resume_session::<TestBackend, _, _>(
            dir.path(),
            dyn_template,
            pol_template,
            &mut restored,
            &device,
        );

        assert!(report.dynamics && report.policy && report.experience);
        assert_eq!(restored.len(), 1);
    }
}
