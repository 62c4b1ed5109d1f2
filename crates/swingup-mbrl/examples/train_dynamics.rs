//! End-to-end model learning demo: collect swing-up experience with random
//! actions, fit a probabilistic dynamics model, checkpoint it, and plot a
//! particle rollout through the learned model.
//!
//! ```bash
//! cargo run --release --example train_dynamics
//! ```

use burn::backend::{Autodiff, NdArray};
use burn::module::AutodiffModule;
use burn::optim::AdamConfig;
use burn::tensor::Tensor;

use cartpole_env::{angles, RewardFunction, SwingupCartpole, TipCostReward, ANGLE_DIMS};
use swingup_core::Env;
use swingup_mbrl::{
    fit_model, parallel_progress, plot_rollout, Checkpointer, CheckpointerConfig, ConsoleLogger,
    ConstantLr, DensityModel, ExperienceDataset, FitConfig, GaussianMlpConfig,
};

type B = Autodiff<NdArray<f32>>;
type Inference = NdArray<f32>;

const EPISODES: usize = 40;
const INPUT_SIZE: usize = 6; // 5 encoded state dims + 1 action
const TARGET_SIZE: usize = 4; // raw state change

/// One transition: encoded observation, action, raw state change.
type Transition = (Vec<f32>, f32, [f32; 4]);

fn collect_episode(seed: u64) -> Vec<Transition> {
    let mut env = SwingupCartpole::with_defaults().expect("default env config is valid");
    env.reset(seed);

    let mut rng_state = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15).max(1);
    let mut transitions = Vec::new();

    loop {
        let state = env.state();

        // Cheap xorshift for the random exploration policy.
        rng_state ^= rng_state << 13;
        rng_state ^= rng_state >> 7;
        rng_state ^= rng_state << 17;
        let action = ((rng_state >> 40) as f32 / (1u64 << 24) as f32 * 2.0 - 1.0) * 10.0;

        let outcome = env.step(&[action]);
        let next = env.state();
        let delta = [
            next[0] - state[0],
            next[1] - state[1],
            next[2] - state[2],
            next[3] - state[3],
        ];
        transitions.push((angles::to_complex(&state, &ANGLE_DIMS), action, delta));

        if outcome.done() {
            break;
        }
    }
    transitions
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let device = Default::default();

    // Phase 1: collect random-policy experience in parallel.
    let episodes = parallel_progress(
        "collecting episodes",
        (0..EPISODES as u64).collect(),
        collect_episode,
    );

    let mut dataset = ExperienceDataset::new(INPUT_SIZE, TARGET_SIZE);
    for episode in &episodes {
        for (obs, action, delta) in episode {
            dataset.append_transition(obs, &[*action], delta);
        }
    }
    println!("collected {} transitions", dataset.len());

    // Phase 2: fit the probabilistic dynamics model.
    let model = GaussianMlpConfig::new(INPUT_SIZE, TARGET_SIZE)
        .with_hidden(vec![200, 200])
        .with_dropout(0.1)
        .init::<B>(&device);

    let trained = fit_model(
        model,
        &dataset,
        &FitConfig::new().with_iterations(4_000).with_batch_size(100),
        AdamConfig::new().init::<B, swingup_mbrl::GaussianMlp<B>>(),
        &ConstantLr::new(1e-3),
        &mut ConsoleLogger::new(500),
    )?;

    // Phase 3: checkpoint the session.
    let mut checkpointer = Checkpointer::new(CheckpointerConfig::new("./checkpoints"))?;
    checkpointer.save::<B, _>("dynamics", &trained, 1, None)?;
    checkpointer.save_experience(&dataset)?;
    println!("checkpoint written to ./checkpoints");

    // Phase 4: roll particles through the learned model and plot.
    let inference = trained.valid();
    let reward_fn = TipCostReward::new(0.5);

    let particles = 30;
    let x0: Tensor<Inference, 2> = Tensor::zeros([particles, 4], &device);

    let trajectories = plot_rollout(
        x0,
        |states: Tensor<Inference, 2>, actions: Tensor<Inference, 2>| {
            let encoded = angles::to_complex_tensor(states.clone(), &ANGLE_DIMS);
            let inputs = Tensor::cat(vec![encoded, actions.clone()], 1);
            let delta = inference.forward(inputs).sample();
            let next = states + delta;
            let rewards = reward_fn.forward(next.clone(), actions);
            (next, rewards)
        },
        |states: Tensor<Inference, 2>| {
            // Same energy-pumping heuristic as the environment demo.
            states.narrow(1, 3, 1).neg().clamp(-1.0, 1.0).mul_scalar(10.0)
        },
        40,
        "rollout_plots",
    )?;

    println!(
        "rolled out {} particles for {} steps; figures in ./rollout_plots",
        trajectories.states.samples(),
        trajectories.states.steps() - 1
    );

    Ok(())
}
