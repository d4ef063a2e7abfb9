use thiserror::Error;

/// Errors raised while building a [`RuleTable`](super::RuleTable).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuleTableError {
    #[error("Rule table contains no actions")]
    Empty,

    #[error("Action defined more than once: {0}")]
    DuplicateAction(String),

    #[error("Action {action} has probability {probability} outside [0, 1]")]
    InvalidProbability { action: String, probability: f64 },

    #[error("Action {action} has negative energy cost {energy_cost}")]
    NegativeEnergyCost { action: String, energy_cost: f64 },

    #[error("Failed to parse rule table: {0}")]
    Parse(String),
}
