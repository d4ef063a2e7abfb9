//! Reinforcement-learning environment over molecular states.
//!
//! [`HivEnvironment`] applies transition rules to a [`MolecularState`](crate::molecular::MolecularState)
//! and scores each step with [`RewardComputer`]. Policies, rollout collection
//! and evaluation work on the raw observation vector from
//! [`ObservationBuilder`]. Neural policies and PPO training require the
//! `rl-nn` feature flag.

pub mod config;
pub mod environment;
pub mod error;
pub mod metrics;
pub mod observation;
pub mod policy;
pub mod reward;
pub mod training;
pub mod types;

#[cfg(feature = "rl-nn")]
pub mod network;

pub use config::{EnvConfig, RewardConfig, RewardForm};
pub use environment::{HivEnvironment, StepInfo, StepResult};
pub use error::{ConfigError, EnvError};
pub use metrics::EvaluationMetrics;
pub use observation::ObservationBuilder;
pub use policy::{ActorCritic, EnergyAwarePolicy, PolicyOutput, UniformPolicy};
pub use reward::{RewardBreakdown, RewardComputer};
pub use training::{collect_episode, compute_gae, RolloutBuffer, Transition};
pub use types::{StepOutcome, TerminationCause, TransitionMetrics};

#[cfg(feature = "rl-nn")]
pub use network::{NetworkConfig, ResidualPolicyNetwork};
#[cfg(feature = "rl-nn")]
pub use training::{PpoConfig, PpoTrainer};
