//! Configuration for the molecular environment and its reward.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use crate::molecular::Feature;

/// Which reward shape scores a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum RewardForm {
    /// Outcome- and energy-aware: fitness, evasion and efficiency on success,
    /// pure energy cost on failure.
    #[default]
    Enhanced,
    /// Sigmoid survival/evasion/detection scores minus resource cost,
    /// independent of the action's outcome.
    Legacy,
}

/// Reward weights.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct RewardConfig {
    /// Reward shape in use.
    pub form: RewardForm,

    // --- Enhanced form ---
    /// Weight of viral fitness on success.
    pub fitness_weight: f64,
    /// Weight of immune evasion on success.
    pub evasion_weight: f64,
    /// Weight of energy efficiency on success.
    pub efficiency_weight: f64,

    // --- Legacy form ---
    /// Weight of the survival probability.
    pub survival_weight: f64,
    /// Weight of the evasion probability.
    pub legacy_evasion_weight: f64,
    /// Penalty weight of the detection probability.
    pub detection_weight: f64,
    /// Penalty weight of the energy-to-ATP ratio.
    pub resource_weight: f64,
    /// Per-feature weights of the survival score.
    pub survival_features: Vec<(Feature, f64)>,
    /// Per-feature weights of the evasion score.
    pub evasion_features: Vec<(Feature, f64)>,
    /// Features averaged into the detection score.
    pub detection_features: Vec<Feature>,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            form: RewardForm::Enhanced,
            fitness_weight: 0.5,
            evasion_weight: 0.3,
            efficiency_weight: 0.2,
            survival_weight: 1.0,
            legacy_evasion_weight: 1.0,
            detection_weight: 0.8,
            resource_weight: 0.5,
            survival_features: vec![
                (Feature::EnvProteinState, 0.4),
                (Feature::CapsidStability, 0.3),
                (Feature::AtpLevel, 0.3),
            ],
            evasion_features: vec![
                (Feature::AntibodySpecificity, -0.5),
                (Feature::MembraneFluidity, 0.3),
                (Feature::VesicleCount, 0.2),
            ],
            detection_features: vec![
                Feature::AntibodySpecificity,
                Feature::MemoryCellStatus,
                Feature::CytokineLevels,
            ],
        }
    }
}

/// Configuration for [`HivEnvironment`](super::HivEnvironment).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct EnvConfig {
    /// Episode length limit.
    pub max_steps: u32,
    /// State energy units per ATP molecule.
    pub atp_conversion: f64,
    /// Reward shape and weights.
    pub reward: RewardConfig,
}

impl EnvConfig {
    /// One million ATP molecules make one energy unit.
    pub const ATP_CONVERSION: f64 = 1e-6;

    /// Default episode length limit.
    pub const MAX_STEPS: u32 = 1000;

    /// Length of the state vector fed to a policy.
    pub fn observation_dim(&self) -> usize {
        Feature::COUNT
    }

    /// Checks the values the environment divides or counts by.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_steps == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_steps",
                value: 0.0,
            });
        }
        if !(self.atp_conversion.is_finite() && self.atp_conversion > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "atp_conversion",
                value: self.atp_conversion,
            });
        }
        Ok(())
    }

    /// Loads a configuration from JSON; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// * [`ConfigError::Parse`] if the document is not a valid configuration.
    /// * [`ConfigError::InvalidValue`] if it fails [`validate`](Self::validate).
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            max_steps: Self::MAX_STEPS,
            atp_conversion: Self::ATP_CONVERSION,
            reward: RewardConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_contract() {
        let cfg = EnvConfig::default();
        assert_eq!(cfg.max_steps, 1000);
        assert_eq!(cfg.atp_conversion, 1e-6);
        assert_eq!(cfg.reward.form, RewardForm::Enhanced);
        assert_eq!(cfg.observation_dim(), Feature::COUNT);
    }

    #[test]
    fn enhanced_weights_sum_to_one() {
        let r = RewardConfig::default();
        let sum = r.fitness_weight + r.evasion_weight + r.efficiency_weight;
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn default_config_is_valid() {
        assert_eq!(EnvConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_conversion_is_rejected() {
        let cfg = EnvConfig {
            atp_conversion: 0.0,
            ..EnvConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidValue {
                field: "atp_conversion",
                ..
            })
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_errors_use_config_error() {
        assert!(matches!(
            EnvConfig::from_json("{max_steps"),
            Err(ConfigError::Parse(_))
        ));
        assert_eq!(
            EnvConfig::from_json(r#"{"max_steps": 0}"#),
            Err(ConfigError::InvalidValue {
                field: "max_steps",
                value: 0.0,
            })
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = EnvConfig::from_json(r#"{"max_steps": 50, "reward": {"form": "legacy"}}"#)
            .unwrap();
        assert_eq!(cfg.max_steps, 50);
        assert_eq!(cfg.atp_conversion, 1e-6);
        assert_eq!(cfg.reward.form, RewardForm::Legacy);
        assert_eq!(cfg.reward.detection_weight, 0.8);
    }
}
