//! Run a swing-up episode with a hand-coded energy-pumping controller and
//! dump PNG snapshots of the motion.
//!
//! ```bash
//! cargo run --example swingup_demo
//! ```

use cartpole_env::{Cartpole, CartpoleConfig, CartpoleDynamics, TipCostReward};
use swingup_core::Env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dynamics = CartpoleDynamics::new();
    let reward = TipCostReward::new(dynamics.pole_length);
    let config = CartpoleConfig::new().with_x_limits([-10.0, 10.0]);
    let mut env = Cartpole::new(config, dynamics, reward)?;

    let out_dir = std::path::Path::new("swingup_frames");
    std::fs::create_dir_all(out_dir)?;

    env.reset(42);
    let mut total_reward = 0.0f32;

    println!("{:>6} {:>10} {:>10} {:>10}", "Step", "x", "theta", "Reward");
    for step in 1..=200u32 {
        // Pump energy in phase with the pole velocity.
        let u = if env.state()[3] > 0.0 { -10.0 } else { 10.0 };
        let outcome = env.step(&[u]);
        total_reward += outcome.reward;

        if step % 20 == 0 {
            let state = env.state();
            println!(
                "{:>6} {:>10.3} {:>10.3} {:>10.4}",
                step, state[0], state[2], outcome.reward
            );
            env.render_to_png(out_dir.join(format!("frame_{:04}.png", step)))?;
        }

        if outcome.done() {
            break;
        }
    }

    let log = env.get_log();
    println!(
        "episode reward {:.2} over {} steps ({} episodes completed)",
        total_reward, log.total_steps, log.episode_count
    );
    println!("snapshots written to {}", out_dir.display());

    Ok(())
}
