// Demonstration: play molecular chess with a baseline policy and report metrics.
//
// Run from the repo root:
//   cargo run --example episode_demo -- --policy energy --episodes 20 --max-steps 200
//
// Set RUST_LOG=virochess=debug to see every transition.

use std::env;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;
use virochess::rl::{
    ActorCritic, EnergyAwarePolicy, EnvConfig, EvaluationMetrics, HivEnvironment, UniformPolicy,
};
use virochess::ChessMove;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("virochess=info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let policy_name = arg_value(&args, "--policy").unwrap_or("energy");
    let episodes: usize = arg_value(&args, "--episodes")
        .and_then(|s| s.parse().ok())
        .unwrap_or(20);
    let seed: u64 = arg_value(&args, "--seed")
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    let max_steps: u32 = arg_value(&args, "--max-steps")
        .and_then(|s| s.parse().ok())
        .unwrap_or(EnvConfig::MAX_STEPS);

    let config = EnvConfig {
        max_steps,
        ..EnvConfig::default()
    };
    let mut env = HivEnvironment::new(config.clone(), seed);

    println!("Initial state:");
    env.render();

    // A single scripted move before the evaluation run.
    match env.step_move(ChessMove::QueenDiagonal) {
        Ok(result) => println!(
            "{} -> success={} reward={:.3} done={}\n",
            ChessMove::QueenDiagonal,
            result.info.action_success,
            result.reward,
            result.done
        ),
        Err(e) => eprintln!("scripted move failed: {}", e),
    }

    let mut policy: Box<dyn ActorCritic> = match policy_name {
        "uniform" => Box::new(UniformPolicy::new(env.action_dim())),
        "energy" => Box::new(EnergyAwarePolicy::new(env.rules(), config.atp_conversion)),
        other => {
            eprintln!(
                "Unknown --policy '{}'; expected 'energy' or 'uniform'.",
                other
            );
            std::process::exit(2);
        }
    };

    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));
    match EvaluationMetrics::evaluate(&mut env, policy.as_mut(), episodes, &mut rng) {
        Ok(metrics) => {
            println!("Policy: {}", policy.name());
            println!("{}", metrics);
            println!("Final state of last episode:");
            env.render();
        }
        Err(e) => {
            eprintln!("evaluation failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn arg_value<'a>(args: &'a [String], key: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}
