//! Training infrastructure: rollout buffer, GAE, episode collection and,
//! with `rl-nn`, the PPO trainer.

pub mod buffer;
pub mod gae;
#[cfg(feature = "rl-nn")]
pub mod ppo;
pub mod rollout;

pub use buffer::{RolloutBuffer, Transition};
pub use gae::compute_gae;
#[cfg(feature = "rl-nn")]
pub use ppo::{PpoConfig, PpoTrainer};
pub use rollout::collect_episode;
