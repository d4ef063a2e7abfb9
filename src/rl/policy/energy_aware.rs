//! Energy-aware heuristic policy.
//!
//! Scores each action by the success probability it buys per unit of
//! energy, skipping actions the current ATP cannot pay for.

use super::trait_::{ActorCritic, PolicyOutput};
use crate::molecular::{Feature, MolecularState};
use crate::rl::observation::ObservationBuilder;
use crate::rules::{RuleTable, TransitionRule};

/// Greedy baseline that prefers affordable, likely, cheap actions.
///
/// For each action:
/// ```text
/// score(a) = p_adj(a) / (1 + E(a))    if E(a) <= atp
///          = 0                        otherwise
/// ```
/// Probabilities are the normalized scores; when nothing is affordable the
/// distribution is uniform. The value estimate is the best score.
pub struct EnergyAwarePolicy {
    rules: Vec<TransitionRule>,
    atp_conversion: f64,
}

impl EnergyAwarePolicy {
    /// Creates the policy from a snapshot of the rule table.
    ///
    /// # Arguments
    ///
    /// * `rules` - Rules in action-index order
    /// * `atp_conversion` - State energy units per ATP molecule, as in
    ///   [`EnvConfig`](crate::rl::EnvConfig)
    pub fn new(rules: &RuleTable, atp_conversion: f64) -> Self {
        Self {
            rules: rules.iter().cloned().collect(),
            atp_conversion,
        }
    }

    fn scores(&self, state_vector: &[f64]) -> Vec<f64> {
        let atp = ObservationBuilder::feature(state_vector, Feature::AtpLevel);
        let readiness = MolecularState::from_values([
            (Feature::AtpLevel, atp),
            (
                Feature::MembraneFluidity,
                ObservationBuilder::feature(state_vector, Feature::MembraneFluidity),
            ),
        ]);
        self.rules
            .iter()
            .map(|rule| {
                let energy = rule.required_energy(self.atp_conversion);
                if energy > atp {
                    0.0
                } else {
                    rule.adjusted_probability(&readiness) / (1.0 + energy)
                }
            })
            .collect()
    }
}

impl ActorCritic for EnergyAwarePolicy {
    fn evaluate(&mut self, state_vector: &[f64]) -> PolicyOutput {
        let scores = self.scores(state_vector);
        let total: f64 = scores.iter().sum();
        let n = scores.len().max(1) as f64;
        let probabilities = if total > 0.0 {
            scores.iter().map(|s| s / total).collect()
        } else {
            vec![1.0 / n; scores.len()]
        };
        let value = scores.iter().copied().fold(0.0, f64::max);
        PolicyOutput {
            probabilities,
            value,
        }
    }

    fn name(&self) -> &str {
        "energy_aware"
    }
}
