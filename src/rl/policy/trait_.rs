//! Actor-critic trait consumed by the environment's training loop.

use rand::{Rng, RngCore};

/// Policy distribution and value estimate for one state.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyOutput {
    /// Probability per action index; sums to 1.
    pub probabilities: Vec<f64>,
    /// Estimated return from this state.
    pub value: f64,
}

/// A policy/value function over raw state vectors.
///
/// Implementations map the fixed-size encoding produced by
/// [`ObservationBuilder`](crate::rl::ObservationBuilder) to a distribution
/// over the rule table's action indices.
pub trait ActorCritic: Send {
    /// Evaluates `state_vector`, returning `(policy, value)`.
    fn evaluate(&mut self, state_vector: &[f64]) -> PolicyOutput;

    /// Returns a human-readable name for this policy.
    fn name(&self) -> &str;

    /// Samples an action, returning `(action_index, log_prob)`.
    fn act(&mut self, state_vector: &[f64], rng: &mut dyn RngCore) -> (usize, f64) {
        let output = self.evaluate(state_vector);
        let index = sample_index(&output.probabilities, rng.gen::<f64>());
        let p = output.probabilities.get(index).copied().unwrap_or(0.0);
        (index, p.max(1e-10).ln())
    }

    /// Picks the most probable action.
    fn act_greedy(&mut self, state_vector: &[f64]) -> usize {
        let output = self.evaluate(state_vector);
        output
            .probabilities
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |best, (i, &p)| {
                if p > best.1 {
                    (i, p)
                } else {
                    best
                }
            })
            .0
    }
}

/// Inverse-CDF lookup of `u ∈ [0, 1)` in `probabilities`.
///
/// Rounding slack at the top end lands on the last action.
pub fn sample_index(probabilities: &[f64], u: f64) -> usize {
    let mut cumulative = 0.0;
    for (i, p) in probabilities.iter().enumerate() {
        cumulative += p;
        if u < cumulative {
            return i;
        }
    }
    probabilities.len().saturating_sub(1)
}
