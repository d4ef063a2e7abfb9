//! Evaluation metrics for policies in the molecular environment.

use std::fmt;

use rand::RngCore;

use super::environment::HivEnvironment;
use super::error::EnvError;
use super::policy::ActorCritic;
use super::types::{StepOutcome, TerminationCause};

/// Aggregated evaluation metrics over multiple episodes.
#[derive(Debug, Clone)]
pub struct EvaluationMetrics {
    /// Mean cumulative reward per episode.
    pub mean_cumulative_reward: f64,
    /// Mean number of steps per episode.
    pub mean_episode_length: f64,
    /// Fraction of all steps whose action succeeded.
    pub success_rate: f64,
    /// Fraction of all steps that could not be paid for.
    pub energy_shortage_rate: f64,
    /// Episodes ended by each [`TerminationCause`], indexed by
    /// [`TerminationCause::index`].
    pub terminations: [usize; 3],
    /// Number of episodes evaluated.
    pub n_episodes: usize,
}

impl EvaluationMetrics {
    /// Runs `policy` for `n_episodes` full episodes, sampling actions with `rng`.
    pub fn evaluate(
        env: &mut HivEnvironment,
        policy: &mut dyn ActorCritic,
        n_episodes: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Self, EnvError> {
        let mut total_reward = 0.0;
        let mut total_steps = 0usize;
        let mut successes = 0usize;
        let mut shortages = 0usize;
        let mut terminations = [0usize; 3];

        for _ in 0..n_episodes {
            env.reset();
            loop {
                let (action, _) = policy.act(&env.observation(), rng);
                let result = env.step_index(action)?;
                total_steps += 1;
                match result.info.outcome() {
                    StepOutcome::Success => successes += 1,
                    StepOutcome::EnergyShortage => shortages += 1,
                    StepOutcome::Failed => {}
                }
                if let Some(cause) = result.info.termination {
                    terminations[cause.index()] += 1;
                }
                if result.done {
                    break;
                }
            }
            total_reward += env.cumulative_reward;
        }

        let episodes = n_episodes.max(1) as f64;
        let steps = total_steps.max(1) as f64;
        Ok(Self {
            mean_cumulative_reward: total_reward / episodes,
            mean_episode_length: total_steps as f64 / episodes,
            success_rate: successes as f64 / steps,
            energy_shortage_rate: shortages as f64 / steps,
            terminations,
            n_episodes,
        })
    }

    pub fn terminations_by(&self, cause: TerminationCause) -> usize {
        self.terminations[cause.index()]
    }
}

impl fmt::Display for EvaluationMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "=== Evaluation Metrics ({} episodes) ===",
            self.n_episodes
        )?;
        writeln!(
            f,
            "  Mean cumulative reward:  {:.3}",
            self.mean_cumulative_reward
        )?;
        writeln!(
            f,
            "  Mean episode length:     {:.1}",
            self.mean_episode_length
        )?;
        writeln!(
            f,
            "  Action success rate:     {:.1}%",
            self.success_rate * 100.0
        )?;
        writeln!(
            f,
            "  Energy shortage rate:    {:.1}%",
            self.energy_shortage_rate * 100.0
        )?;
        for cause in TerminationCause::all() {
            writeln!(
                f,
                "  Ended by {:<36} {}",
                format!("{}:", cause),
                self.terminations_by(cause)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::{EnergyAwarePolicy, EnvConfig, UniformPolicy};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn evaluate_completes() {
        let config = EnvConfig {
            max_steps: 25,
            ..EnvConfig::default()
        };
        let mut env = HivEnvironment::new(config, 42);
        let mut policy = UniformPolicy::new(env.action_dim());
        let mut rng = StdRng::seed_from_u64(1);
        let metrics = EvaluationMetrics::evaluate(&mut env, &mut policy, 4, &mut rng).unwrap();
        assert_eq!(metrics.n_episodes, 4);
        assert_eq!(metrics.terminations.iter().sum::<usize>(), 4);
        assert!(metrics.mean_episode_length <= 25.0);
        assert!((0.0..=1.0).contains(&metrics.success_rate));
    }

    #[test]
    fn heuristic_display_mentions_causes() {
        let config = EnvConfig {
            max_steps: 10,
            ..EnvConfig::default()
        };
        let mut env = HivEnvironment::new(config.clone(), 8);
        let mut policy = EnergyAwarePolicy::new(env.rules(), config.atp_conversion);
        let mut rng = StdRng::seed_from_u64(2);
        let metrics = EvaluationMetrics::evaluate(&mut env, &mut policy, 2, &mut rng).unwrap();
        let text = metrics.to_string();
        assert!(text.contains("2 episodes"));
        assert!(text.contains("step budget exhausted"));
    }
}
