//! Rollout storage for on-policy updates.

/// One environment step as seen by the learner.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Encoded state the action was chosen in.
    pub state_vector: Vec<f64>,
    /// Action index into the rule table.
    pub action: usize,
    /// Reward returned by the environment for this step.
    pub reward: f64,
    /// Log-probability of `action` under the behaviour policy.
    pub log_prob: f64,
    /// Value estimate of `state_vector`.
    pub value: f64,
    /// Whether the episode ended on this step.
    pub done: bool,
}

/// Transitions plus the advantages/returns computed from them.
#[derive(Debug, Default)]
pub struct RolloutBuffer {
    /// Stored steps in collection order; episodes are separated by `done`.
    pub transitions: Vec<Transition>,
    /// GAE advantages, filled by [`finish`](Self::finish).
    pub advantages: Vec<f64>,
    /// Discounted return targets, filled by [`finish`](Self::finish).
    pub returns: Vec<f64>,
}

impl RolloutBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one step.
    pub fn push(&mut self, transition: Transition) {
        self.transitions.push(transition);
    }

    /// Drops all transitions and computed targets.
    pub fn clear(&mut self) {
        self.transitions.clear();
        self.advantages.clear();
        self.returns.clear();
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn rewards(&self) -> Vec<f64> {
        self.transitions.iter().map(|t| t.reward).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.transitions.iter().map(|t| t.value).collect()
    }

    pub fn dones(&self) -> Vec<bool> {
        self.transitions.iter().map(|t| t.done).collect()
    }

    /// Runs GAE over the stored transitions and keeps the result.
    pub fn finish(&mut self, gamma: f64, gae_lambda: f64) {
        let (advantages, returns) =
            super::gae::compute_gae(&self.rewards(), &self.values(), &self.dones(), gamma, gae_lambda);
        self.advantages = advantages;
        self.returns = returns;
    }

    /// Rescales advantages to zero mean and unit variance.
    pub fn normalize_advantages(&mut self) {
        let n = self.advantages.len();
        if n == 0 {
            return;
        }
        let mean = self.advantages.iter().sum::<f64>() / n as f64;
        let var = self
            .advantages
            .iter()
            .map(|a| (a - mean) * (a - mean))
            .sum::<f64>()
            / n as f64;
        let std = (var + 1e-8).sqrt();
        self.advantages.iter_mut().for_each(|a| *a = (*a - mean) / std);
    }
}
