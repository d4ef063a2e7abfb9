//! Reward function for the molecular environment.
//!
//! The enhanced form scores a successful transition as
//! `w_f × fitness + w_e × evasion + w_q × efficiency` and a failed one as the
//! wasted energy `-required_energy`. The legacy form combines sigmoid
//! survival, evasion and detection scores with a resource cost.

use super::config::{RewardConfig, RewardForm};
use super::types::TransitionMetrics;
use crate::molecular::{Feature, MolecularState};

/// Individual terms that make up a reward.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RewardBreakdown {
    pub viral_fitness: f64,
    pub immune_evasion: f64,
    pub energy_efficiency: f64,
    pub survival_probability: f64,
    pub evasion_probability: f64,
    pub detection_probability: f64,
    pub resource_cost: f64,
    pub total: f64,
}

/// Computes rewards for the molecular environment.
pub struct RewardComputer;

impl RewardComputer {
    /// Scores the transition that produced `state`.
    pub fn compute(state: &MolecularState, metrics: &TransitionMetrics, config: &RewardConfig) -> f64 {
        Self::breakdown(state, metrics, config).total
    }

    /// Computes the reward together with its components.
    pub fn breakdown(
        state: &MolecularState,
        metrics: &TransitionMetrics,
        config: &RewardConfig,
    ) -> RewardBreakdown {
        match config.form {
            RewardForm::Enhanced => Self::enhanced(state, metrics, config),
            RewardForm::Legacy => Self::legacy(state, metrics, config),
        }
    }

    fn enhanced(
        state: &MolecularState,
        metrics: &TransitionMetrics,
        config: &RewardConfig,
    ) -> RewardBreakdown {
        if !metrics.outcome.is_success() {
            return RewardBreakdown {
                total: -metrics.required_energy,
                ..RewardBreakdown::default()
            };
        }

        let viral_fitness = Self::viral_fitness(state);
        let immune_evasion = Self::immune_evasion(state);
        let energy_efficiency = Self::energy_efficiency(metrics);
        let total = config.fitness_weight * viral_fitness
            + config.evasion_weight * immune_evasion
            + config.efficiency_weight * energy_efficiency;

        RewardBreakdown {
            viral_fitness,
            immune_evasion,
            energy_efficiency,
            total,
            ..RewardBreakdown::default()
        }
    }

    fn legacy(
        state: &MolecularState,
        metrics: &TransitionMetrics,
        config: &RewardConfig,
    ) -> RewardBreakdown {
        let weighted = |weights: &[(Feature, f64)]| -> f64 {
            weights.iter().map(|(f, w)| w * state.value(*f)).sum()
        };

        let survival_probability = sigmoid(weighted(&config.survival_features));
        let evasion_probability = sigmoid(weighted(&config.evasion_features));
        let detection_probability = if config.detection_features.is_empty() {
            sigmoid(0.0)
        } else {
            let sum: f64 = config
                .detection_features
                .iter()
                .map(|f| state.value(*f))
                .sum();
            sigmoid(sum / config.detection_features.len() as f64)
        };
        let resource_cost = Self::resource_cost(state, metrics);

        let total = config.survival_weight * survival_probability
            + config.legacy_evasion_weight * evasion_probability
            - config.detection_weight * detection_probability
            - config.resource_weight * resource_cost;

        RewardBreakdown {
            survival_probability,
            evasion_probability,
            detection_probability,
            resource_cost,
            total,
            ..RewardBreakdown::default()
        }
    }

    /// `log10(1 + viral_load) × (0.5 + 0.5 × env_protein_state)`
    pub fn viral_fitness(state: &MolecularState) -> f64 {
        let viral_load = state.value(Feature::ViralLoad);
        let env_state = state.value(Feature::EnvProteinState);
        (1.0 + viral_load).log10() * (0.5 + 0.5 * env_state)
    }

    /// `max(0, 1 - (0.6 × antibody_specificity + 0.4 × memory_cell_status))`
    pub fn immune_evasion(state: &MolecularState) -> f64 {
        let antibody = state.value(Feature::AntibodySpecificity);
        let memory = state.value(Feature::MemoryCellStatus);
        (1.0 - (0.6 * antibody + 0.4 * memory)).max(0.0)
    }

    /// Success probability obtained per unit of energy.
    pub fn energy_efficiency(metrics: &TransitionMetrics) -> f64 {
        metrics.adjusted_probability.unwrap_or(0.0) / (1.0 + metrics.required_energy)
    }

    /// Energy requirement relative to the ATP available.
    pub fn resource_cost(state: &MolecularState, metrics: &TransitionMetrics) -> f64 {
        let atp = state.value(Feature::AtpLevel);
        if atp > 0.0 {
            metrics.required_energy / atp
        } else {
            metrics.required_energy
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::types::StepOutcome;

    fn metrics(outcome: StepOutcome) -> TransitionMetrics {
        TransitionMetrics {
            outcome,
            required_energy: 2.5,
            base_probability: 0.83,
            adjusted_probability: Some(0.7),
            membrane_influence: 0.5,
            atp_influence: 5.0,
            energy_shortage: None,
        }
    }

    fn state() -> MolecularState {
        MolecularState::from_values([
            (Feature::ViralLoad, 999.0),
            (Feature::EnvProteinState, 1.0),
            (Feature::AntibodySpecificity, 0.5),
            (Feature::MemoryCellStatus, 0.5),
            (Feature::AtpLevel, 5.0),
        ])
    }

    #[test]
    fn failure_costs_required_energy() {
        let cfg = RewardConfig::default();
        let reward = RewardComputer::compute(&state(), &metrics(StepOutcome::Failed), &cfg);
        assert_eq!(reward, -2.5);
        let reward =
            RewardComputer::compute(&state(), &metrics(StepOutcome::EnergyShortage), &cfg);
        assert_eq!(reward, -2.5);
    }

    #[test]
    fn success_combines_weighted_terms() {
        let cfg = RewardConfig::default();
        let b = RewardComputer::breakdown(&state(), &metrics(StepOutcome::Success), &cfg);
        // log10(1000) * 1.0
        assert!((b.viral_fitness - 3.0).abs() < 1e-12);
        // 1 - (0.3 + 0.2)
        assert!((b.immune_evasion - 0.5).abs() < 1e-12);
        // 0.7 / 3.5
        assert!((b.energy_efficiency - 0.2).abs() < 1e-12);
        assert!((b.total - (1.5 + 0.15 + 0.04)).abs() < 1e-12);
    }

    #[test]
    fn evasion_never_negative() {
        let s = MolecularState::from_values([
            (Feature::AntibodySpecificity, 2.0),
            (Feature::MemoryCellStatus, 2.0),
        ]);
        assert_eq!(RewardComputer::immune_evasion(&s), 0.0);
    }

    #[test]
    fn legacy_ignores_outcome() {
        let cfg = RewardConfig {
            form: RewardForm::Legacy,
            ..RewardConfig::default()
        };
        let ok = RewardComputer::compute(&state(), &metrics(StepOutcome::Success), &cfg);
        let failed = RewardComputer::compute(&state(), &metrics(StepOutcome::Failed), &cfg);
        assert_eq!(ok, failed);
    }

    #[test]
    fn legacy_probabilities_are_bounded() {
        let cfg = RewardConfig {
            form: RewardForm::Legacy,
            ..RewardConfig::default()
        };
        let b = RewardComputer::breakdown(&state(), &metrics(StepOutcome::Success), &cfg);
        for p in [
            b.survival_probability,
            b.evasion_probability,
            b.detection_probability,
        ] {
            assert!((0.0..=1.0).contains(&p));
        }
        assert!((b.resource_cost - 0.5).abs() < 1e-12);
    }
}
