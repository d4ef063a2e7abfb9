//! PPO trainer for [`ResidualPolicyNetwork`].
//!
//! Collects whole episodes with the current network, computes GAE targets and
//! runs several clipped-objective epochs over the full rollout.

use rand::RngCore;
use tch::{nn, nn::OptimizerConfig, Kind, Tensor, TchError};
use tracing::info;

use super::buffer::RolloutBuffer;
use super::rollout::collect_episode;
use crate::rl::environment::HivEnvironment;
use crate::rl::error::EnvError;
use crate::rl::network::ResidualPolicyNetwork;

/// Training hyperparameters.
#[derive(Debug, Clone)]
pub struct PpoConfig {
    /// Discount factor γ.
    pub gamma: f64,
    /// GAE λ parameter.
    pub gae_lambda: f64,
    /// PPO clip parameter ε.
    pub clip_eps: f64,
    /// Entropy bonus coefficient.
    pub entropy_coef: f64,
    /// Value loss coefficient.
    pub value_coef: f64,
    /// Adam learning rate.
    pub learning_rate: f64,
    /// Optimization epochs per update.
    pub n_epochs: u32,
    /// Episodes collected per update.
    pub n_episodes_per_update: u32,
    /// Maximum gradient norm for clipping.
    pub max_grad_norm: f64,
}

impl Default for PpoConfig {
    fn default() -> Self {
        Self {
            gamma: 0.99,
            gae_lambda: 0.95,
            clip_eps: 0.2,
            entropy_coef: 0.01,
            value_coef: 0.5,
            learning_rate: 3e-4,
            n_epochs: 4,
            n_episodes_per_update: 4,
            max_grad_norm: 0.5,
        }
    }
}

/// Losses averaged over the epochs of one update.
#[derive(Debug, Clone, Copy, Default)]
pub struct PpoLosses {
    /// Clipped surrogate loss.
    pub policy: f64,
    /// Mean squared error against the GAE returns.
    pub value: f64,
    /// Mean policy entropy.
    pub entropy: f64,
}

/// PPO trainer for a single [`ResidualPolicyNetwork`].
pub struct PpoTrainer {
    /// Network being trained; also the behaviour policy during collection.
    pub network: ResidualPolicyNetwork,
    /// Training hyperparameters.
    pub config: PpoConfig,
    /// Adam optimizer over the network's variables.
    opt: nn::Optimizer,
}

impl PpoTrainer {
    /// Creates a trainer with an Adam optimizer over `network`.
    ///
    /// # Arguments
    ///
    /// * `network` - Policy/value network to train
    /// * `config` - Training hyperparameters
    ///
    /// # Errors
    ///
    /// Returns the [`TchError`] raised if the optimizer cannot be built.
    pub fn new(network: ResidualPolicyNetwork, config: PpoConfig) -> Result<Self, TchError> {
        let opt = nn::Adam::default().build(network.var_store(), config.learning_rate)?;
        Ok(Self {
            network,
            config,
            opt,
        })
    }

    /// Runs `total_updates` collect/optimize iterations.
    ///
    /// Returns the mean episode reward of each update.
    pub fn train(
        &mut self,
        env: &mut HivEnvironment,
        total_updates: u32,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<f64>, EnvError> {
        let mut history = Vec::with_capacity(total_updates as usize);
        let mut buffer = RolloutBuffer::new();

        for update in 0..total_updates {
            buffer.clear();
            let mut episode_total = 0.0;
            for _ in 0..self.config.n_episodes_per_update {
                episode_total += collect_episode(env, &mut self.network, &mut buffer, rng)?;
            }
            let mean_reward = episode_total / self.config.n_episodes_per_update.max(1) as f64;

            buffer.finish(self.config.gamma, self.config.gae_lambda);
            buffer.normalize_advantages();
            let losses = self.update(&buffer);
            history.push(mean_reward);

            if update % 10 == 0 {
                info!(
                    update,
                    mean_reward,
                    policy_loss = losses.policy,
                    value_loss = losses.value,
                    entropy = losses.entropy,
                    "ppo update"
                );
            }
        }
        Ok(history)
    }

    /// Optimizes the network on a finished buffer.
    pub fn update(&mut self, buffer: &RolloutBuffer) -> PpoLosses {
        let n = buffer.len();
        if n == 0 || buffer.advantages.len() != n {
            return PpoLosses::default();
        }
        let device = self.network.device();
        let dim = buffer.transitions[0].state_vector.len();

        let flat: Vec<f64> = buffer
            .transitions
            .iter()
            .flat_map(|t| t.state_vector.iter().copied())
            .collect();
        let states = Tensor::from_slice(&flat)
            .reshape([n as i64, dim as i64])
            .to_kind(Kind::Float)
            .to_device(device);
        let actions = Tensor::from_slice(
            &buffer
                .transitions
                .iter()
                .map(|t| t.action as i64)
                .collect::<Vec<_>>(),
        )
        .to_kind(Kind::Int64)
        .to_device(device);
        let old_log_probs = Tensor::from_slice(
            &buffer
                .transitions
                .iter()
                .map(|t| t.log_prob)
                .collect::<Vec<_>>(),
        )
        .to_kind(Kind::Float)
        .to_device(device);
        let advantages = Tensor::from_slice(&buffer.advantages)
            .to_kind(Kind::Float)
            .to_device(device);
        let returns = Tensor::from_slice(&buffer.returns)
            .to_kind(Kind::Float)
            .to_device(device);

        let mut totals = PpoLosses::default();
        for _ in 0..self.config.n_epochs {
            let (log_probs, values) = self.network.forward(&states);
            let new_log_probs = log_probs
                .gather(1, &actions.unsqueeze(-1), false)
                .squeeze_dim(-1);
            let ratio = (&new_log_probs - &old_log_probs).exp();

            let surr1 = &ratio * &advantages;
            let surr2 =
                ratio.clamp(1.0 - self.config.clip_eps, 1.0 + self.config.clip_eps) * &advantages;
            let policy_loss = -surr1.min_other(&surr2).mean(Kind::Float);
            let value_loss = (&values - &returns)
                .pow_tensor_scalar(2)
                .mean(Kind::Float);
            let entropy = -(log_probs.exp() * &log_probs)
                .sum_dim_intlist([-1i64].as_slice(), false, Kind::Float)
                .mean(Kind::Float);

            let total = &policy_loss + self.config.value_coef * &value_loss
                - self.config.entropy_coef * &entropy;
            self.opt
                .backward_step_clip_norm(&total, self.config.max_grad_norm);

            totals.policy += f64::try_from(&policy_loss).unwrap_or(0.0);
            totals.value += f64::try_from(&value_loss).unwrap_or(0.0);
            totals.entropy += f64::try_from(&entropy).unwrap_or(0.0);
        }

        let epochs = self.config.n_epochs.max(1) as f64;
        PpoLosses {
            policy: totals.policy / epochs,
            value: totals.value / epochs,
            entropy: totals.entropy / epochs,
        }
    }
}
