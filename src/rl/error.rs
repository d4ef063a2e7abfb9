use thiserror::Error;

/// Errors returned by [`HivEnvironment`](super::HivEnvironment) calls.
///
/// A failed action (energy shortage or an unlucky draw) is a normal outcome
/// and is reported through [`StepInfo`](super::StepInfo), not here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnvError {
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Episode already terminated after {step_count} steps; call reset()")]
    EpisodeTerminated { step_count: u32 },
}

/// Errors raised while loading an [`EnvConfig`](super::EnvConfig).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Invalid configuration value for {field}: {value}")]
    InvalidValue { field: &'static str, value: f64 },
}
