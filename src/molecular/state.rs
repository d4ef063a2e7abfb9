//! Molecular state: a value for each catalogued feature.

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use rand_distr::{Distribution, Normal};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::feature::Feature;

/// A single constraint breach reported by [`MolecularState::validate`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintViolation {
    OutOfRange {
        feature: Feature,
        value: f64,
        min: f64,
        max: f64,
    },
    BelowCritical {
        feature: Feature,
        value: f64,
        threshold: f64,
    },
}

impl ConstraintViolation {
    pub fn feature(&self) -> Feature {
        match self {
            ConstraintViolation::OutOfRange { feature, .. }
            | ConstraintViolation::BelowCritical { feature, .. } => *feature,
        }
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintViolation::OutOfRange {
                feature,
                value,
                min,
                max,
            } => write!(
                f,
                "{}: {} outside range [{}, {}]",
                feature.key(),
                value,
                min,
                max
            ),
            ConstraintViolation::BelowCritical {
                feature,
                value,
                threshold,
            } => write!(
                f,
                "{}: {} below critical threshold {}",
                feature.key(),
                value,
                threshold
            ),
        }
    }
}

/// Outcome of validating a state against the feature registry.
///
/// Validation is advisory: it never blocks a transition, it only reports.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateValidation {
    pub violations: Vec<ConstraintViolation>,
}

impl StateValidation {
    /// True when no range or critical-threshold violation was found.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Human-readable messages, one per violation.
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(|v| v.to_string()).collect()
    }

    pub fn has_range_violation(&self) -> bool {
        self.violations
            .iter()
            .any(|v| matches!(v, ConstraintViolation::OutOfRange { .. }))
    }
}

/// Mapping from [`Feature`] to its current numeric value.
///
/// Transitions never mutate a state in place: the environment clones the
/// current state and mutates the clone.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MolecularState {
    features: BTreeMap<Feature, f64>,
}

impl MolecularState {
    /// Creates a state with no feature values set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Samples a biologically plausible state.
    ///
    /// Ranged features draw from `N(midpoint, width / 6)` clipped to the range;
    /// unconstrained features draw uniformly from `[0, 1)`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut features = BTreeMap::new();
        for feature in Feature::ALL {
            let value = match feature.spec() {
                Some(spec) => {
                    let drawn = match Normal::new(spec.midpoint(), spec.width() / 6.0) {
                        Ok(normal) => normal.sample(rng),
                        Err(_) => spec.midpoint(),
                    };
                    spec.clamp(drawn)
                }
                None => rng.gen::<f64>(),
            };
            features.insert(feature, value);
        }
        Self { features }
    }

    /// Builds a state from explicit values, stored as given (no clipping).
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = (Feature, f64)>,
    {
        Self {
            features: values.into_iter().collect(),
        }
    }

    pub fn get(&self, feature: Feature) -> Option<f64> {
        self.features.get(&feature).copied()
    }

    /// Value of `feature`, or `0.0` when it is not set.
    pub fn value(&self, feature: Feature) -> f64 {
        self.get(feature).unwrap_or(0.0)
    }

    /// Stores `value` verbatim.
    pub fn set(&mut self, feature: Feature, value: f64) {
        self.features.insert(feature, value);
    }

    /// Stores `value` clipped to the feature's range and returns what was stored.
    pub fn set_clamped(&mut self, feature: Feature, value: f64) -> f64 {
        let clipped = feature.clamp(value);
        self.features.insert(feature, clipped);
        clipped
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Iterates `(feature, value)` pairs in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        self.features.iter().map(|(f, v)| (*f, *v))
    }

    /// Checks every set feature against its registered range and critical
    /// threshold, collecting all violations.
    pub fn validate(&self) -> StateValidation {
        let mut violations = Vec::new();
        for (feature, value) in self.iter() {
            let Some(spec) = feature.spec() else {
                continue;
            };
            let (min, max) = spec.range;
            if value < min || value > max {
                violations.push(ConstraintViolation::OutOfRange {
                    feature,
                    value,
                    min,
                    max,
                });
            }
            if let Some(threshold) = spec.critical_threshold {
                if value < threshold {
                    violations.push(ConstraintViolation::BelowCritical {
                        feature,
                        value,
                        threshold,
                    });
                }
            }
        }
        StateValidation { violations }
    }

    /// Shorthand for `self.validate().is_valid()`.
    pub fn is_valid(&self) -> bool {
        self.validate().is_valid()
    }
}

impl fmt::Display for MolecularState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (feature, value) in self.iter() {
            writeln!(f, "{}: {:.3}", feature.name(), value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn random_state_covers_every_feature() {
        let mut rng = StdRng::seed_from_u64(1);
        let state = MolecularState::random(&mut rng);
        assert_eq!(state.len(), Feature::COUNT);
    }

    #[test]
    fn random_state_is_deterministic_per_seed() {
        let a = MolecularState::random(&mut StdRng::seed_from_u64(9));
        let b = MolecularState::random(&mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn random_values_within_ranges() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..10_000 {
            let state = MolecularState::random(&mut rng);
            for (feature, value) in state.iter() {
                match feature.range() {
                    Some((min, max)) => assert!(value >= min && value <= max),
                    None => assert!((0.0..1.0).contains(&value)),
                }
            }
            assert!(!state.validate().has_range_violation());
        }
    }

    #[test]
    fn validate_reports_every_violation() {
        let state = MolecularState::from_values([
            (Feature::AtpLevel, 0.5),
            (Feature::Cd4Density, 150.0),
            (Feature::MembraneFluidity, 0.5),
        ]);
        let validation = state.validate();
        assert!(!validation.is_valid());
        assert_eq!(
            validation.messages(),
            vec![
                "cd4_receptor_density: 150 below critical threshold 200".to_string(),
                "atp_concentration: 0.5 outside range [1, 10]".to_string(),
                "atp_concentration: 0.5 below critical threshold 2".to_string(),
            ]
        );
    }

    #[test]
    fn validate_ignores_unconstrained_features() {
        let state = MolecularState::from_values([(Feature::DrugResistance, 7.0)]);
        assert!(state.is_valid());
    }

    #[test]
    fn clone_shares_nothing() {
        let mut original = MolecularState::from_values([(Feature::AtpLevel, 5.0)]);
        let copy = original.clone();
        original.set(Feature::AtpLevel, 3.0);
        assert_eq!(copy.value(Feature::AtpLevel), 5.0);
    }

    #[test]
    fn set_clamped_clips_to_range() {
        let mut state = MolecularState::empty();
        assert_eq!(state.set_clamped(Feature::ViralLoad, 2e6), 1e6);
        assert_eq!(state.set_clamped(Feature::RnaIntegrity, -0.2), -0.2);
    }

    #[test]
    fn missing_feature_reads_as_zero() {
        let state = MolecularState::empty();
        assert_eq!(state.get(Feature::AtpLevel), None);
        assert_eq!(state.value(Feature::AtpLevel), 0.0);
    }

    #[test]
    fn display_lists_features() {
        let state = MolecularState::from_values([(Feature::AtpLevel, 5.0)]);
        assert_eq!(state.to_string(), "ATP_LEVEL: 5.000\n");
    }
}
