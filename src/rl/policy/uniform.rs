//! Uniform policy for testing and baselines.

use super::trait_::{ActorCritic, PolicyOutput};

/// Uniform distribution over all actions with a zero value estimate.
///
/// Used for sanity checks and as a lower-bound baseline.
pub struct UniformPolicy {
    action_dim: usize,
}

impl UniformPolicy {
    /// Creates a new uniform policy.
    ///
    /// # Arguments
    ///
    /// * `action_dim` - Number of actions in the rule table.
    pub fn new(action_dim: usize) -> Self {
        Self { action_dim }
    }
}

impl ActorCritic for UniformPolicy {
    fn evaluate(&mut self, _state_vector: &[f64]) -> PolicyOutput {
        let p = if self.action_dim > 0 {
            1.0 / self.action_dim as f64
        } else {
            0.0
        };
        PolicyOutput {
            probabilities: vec![p; self.action_dim],
            value: 0.0,
        }
    }

    fn name(&self) -> &str {
        "uniform"
    }
}
