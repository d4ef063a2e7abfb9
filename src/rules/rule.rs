//! Transition rule records: how a single action mutates the molecular state.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::molecular::{Feature, MolecularState};

/// How much the literature backs a rule's parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Confidence {
    High,
    Medium,
    Low,
    Estimated,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::High => write!(f, "high"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::Low => write!(f, "low"),
            Confidence::Estimated => write!(f, "estimated"),
        }
    }
}

/// How a primary effect's magnitude combines with the current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectMode {
    /// `new = current + magnitude`
    Additive,
    /// `new = current + current * (exp(magnitude) - 1)`
    ExponentialRelative,
}

impl EffectMode {
    /// Population-scale features grow relative to their size; everything
    /// else is shifted additively.
    pub fn for_feature(feature: Feature) -> Self {
        if feature.is_population_scale() {
            EffectMode::ExponentialRelative
        } else {
            EffectMode::Additive
        }
    }

    /// Returns the unclipped value after applying `magnitude` to `current`.
    pub fn apply(self, current: f64, magnitude: f64) -> f64 {
        match self {
            EffectMode::Additive => current + magnitude,
            EffectMode::ExponentialRelative => current + current * magnitude.exp_m1(),
        }
    }
}

/// State-dependent multiplier applied to a side effect's magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum SideEffectScaling {
    #[default]
    None,
    /// `magnitude * (1 + 0.1 * (atp_level - 5))`
    AtpDependent,
}

impl SideEffectScaling {
    /// Default scaling for a side effect on `target`: membrane effects track
    /// the cell's ATP level.
    pub fn for_target(target: Feature) -> Self {
        if target == Feature::MembraneFluidity {
            SideEffectScaling::AtpDependent
        } else {
            SideEffectScaling::None
        }
    }

    pub fn factor(self, state: &MolecularState) -> f64 {
        match self {
            SideEffectScaling::None => 1.0,
            SideEffectScaling::AtpDependent => 1.0 + 0.1 * (state.value(Feature::AtpLevel) - 5.0),
        }
    }
}

/// A secondary, probabilistically triggered mutation.
///
/// When deserialized without an explicit `scaling`, the scaling defaults to
/// [`SideEffectScaling::for_target`], same as [`SideEffect::new`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(from = "RawSideEffect")
)]
pub struct SideEffect {
    pub target: Feature,
    /// Additive change before scaling.
    pub magnitude: f64,
    /// Probability in `[0, 1]` that the effect fires on a successful action.
    pub probability: f64,
    /// Multiplier applied to `magnitude` at the time the effect fires.
    pub scaling: SideEffectScaling,
    /// Biological mechanism behind the effect. Informational.
    pub mechanism: String,
    /// Literature citation. Informational.
    pub source: String,
}

/// Wire shape of [`SideEffect`]; `scaling` is optional.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawSideEffect {
    target: Feature,
    magnitude: f64,
    probability: f64,
    #[serde(default)]
    scaling: Option<SideEffectScaling>,
    #[serde(default)]
    mechanism: String,
    #[serde(default)]
    source: String,
}

#[cfg(feature = "serde")]
impl From<RawSideEffect> for SideEffect {
    fn from(raw: RawSideEffect) -> Self {
        Self {
            target: raw.target,
            magnitude: raw.magnitude,
            probability: raw.probability,
            scaling: raw
                .scaling
                .unwrap_or_else(|| SideEffectScaling::for_target(raw.target)),
            mechanism: raw.mechanism,
            source: raw.source,
        }
    }
}

impl SideEffect {
    /// Creates a side effect with the default scaling for its target.
    pub fn new(target: Feature, magnitude: f64, probability: f64) -> Self {
        Self {
            target,
            magnitude,
            probability,
            scaling: SideEffectScaling::for_target(target),
            mechanism: String::new(),
            source: String::new(),
        }
    }

    pub fn with_mechanism(mut self, mechanism: &str, source: &str) -> Self {
        self.mechanism = mechanism.to_string();
        self.source = source.to_string();
        self
    }

    /// Magnitude after state-dependent scaling.
    pub fn scaled_magnitude(&self, state: &MolecularState) -> f64 {
        self.magnitude * self.scaling.factor(state)
    }
}

/// Fixed specification of how one action mutates state.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TransitionRule {
    /// Action identifier the rule is keyed by (e.g. `"queen_diagonal"`).
    pub action: String,
    /// Name of the molecular process the action models.
    #[cfg_attr(feature = "serde", serde(default))]
    pub molecular_action: String,
    pub target: Feature,
    pub magnitude: f64,
    /// Base success probability before readiness adjustment.
    pub probability: f64,
    /// Duration of the process in seconds. Informational.
    pub time_scale: f64,
    /// Cost in ATP molecules.
    pub energy_cost: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub side_effects: Vec<SideEffect>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub source: String,
    pub confidence: Confidence,
}

impl TransitionRule {
    /// Energy in state units needed to attempt the action.
    pub fn required_energy(&self, atp_conversion: f64) -> f64 {
        self.energy_cost * atp_conversion
    }

    pub fn effect_mode(&self) -> EffectMode {
        EffectMode::for_feature(self.target)
    }

    /// Base probability scaled by membrane and ATP readiness of `state`.
    ///
    /// Each factor lies in `[0.5, 1]` over the feature's nominal scale, so a
    /// depleted cell at most halves the odds per factor.
    pub fn adjusted_probability(&self, state: &MolecularState) -> f64 {
        let membrane = state.value(Feature::MembraneFluidity);
        let atp = state.value(Feature::AtpLevel);
        self.probability * (0.5 + 0.5 * membrane) * (0.5 + 0.5 * (atp / 10.0))
    }

    /// Applies the primary effect to `state`, clipped to range. Returns the
    /// stored value.
    pub fn apply_primary(&self, state: &mut MolecularState) -> f64 {
        let current = state.value(self.target);
        let next = self.effect_mode().apply(current, self.magnitude);
        state.set_clamped(self.target, next)
    }
}
