//! Core types shared by the environment, reward computer and learners.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How an attempted action resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum StepOutcome {
    /// Primary and side effects were applied and energy was spent.
    Success,
    /// The success draw missed the adjusted probability.
    Failed,
    /// ATP could not cover the action's energy requirement.
    EnergyShortage,
}

impl StepOutcome {
    pub fn is_success(self) -> bool {
        self == StepOutcome::Success
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::Success => write!(f, "success"),
            StepOutcome::Failed => write!(f, "failed"),
            StepOutcome::EnergyShortage => write!(f, "energy_shortage"),
        }
    }
}

/// Why an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum TerminationCause {
    /// `step_count` reached `max_steps`.
    StepBudget,
    /// ATP fell below its critical threshold.
    AtpDepleted,
    /// CD4 density fell below its critical threshold.
    Cd4Depleted,
}

impl TerminationCause {
    pub fn all() -> [TerminationCause; 3] {
        [
            TerminationCause::StepBudget,
            TerminationCause::AtpDepleted,
            TerminationCause::Cd4Depleted,
        ]
    }

    pub fn index(self) -> usize {
        match self {
            TerminationCause::StepBudget => 0,
            TerminationCause::AtpDepleted => 1,
            TerminationCause::Cd4Depleted => 2,
        }
    }
}

impl fmt::Display for TerminationCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationCause::StepBudget => write!(f, "step budget exhausted"),
            TerminationCause::AtpDepleted => write!(f, "ATP below critical threshold"),
            TerminationCause::Cd4Depleted => write!(f, "CD4 density below critical threshold"),
        }
    }
}

/// Diagnostics of a single transition attempt.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TransitionMetrics {
    pub outcome: StepOutcome,
    /// Energy the action needs, in state units.
    pub required_energy: f64,
    pub base_probability: f64,
    /// Readiness-adjusted probability. Not computed on an energy shortage.
    pub adjusted_probability: Option<f64>,
    /// Membrane fluidity of the pre-transition state.
    pub membrane_influence: f64,
    /// ATP level of the pre-transition state.
    pub atp_influence: f64,
    /// `required_energy - atp` when the action could not be paid for.
    pub energy_shortage: Option<f64>,
}
