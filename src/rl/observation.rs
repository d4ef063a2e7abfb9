//! State-vector encoding for policies.

use crate::molecular::{Feature, MolecularState};

/// Builds policy input vectors from molecular states.
pub struct ObservationBuilder;

impl ObservationBuilder {
    /// Raw feature values in [`Feature::ALL`] order.
    ///
    /// Features missing from the state encode as `0.0`, so the vector always
    /// has [`Feature::COUNT`] entries.
    pub fn build(state: &MolecularState) -> Vec<f64> {
        Feature::ALL.iter().map(|f| state.value(*f)).collect()
    }

    /// Like [`build`](Self::build) but ranged features are rescaled to
    /// `[0, 1]`. Viral load spans four orders of magnitude and is encoded on a
    /// log scale.
    pub fn build_normalized(state: &MolecularState) -> Vec<f64> {
        Feature::ALL
            .iter()
            .map(|f| Self::normalize(*f, state.value(*f)))
            .collect()
    }

    fn normalize(feature: Feature, value: f64) -> f64 {
        let Some((min, max)) = feature.range() else {
            return value;
        };
        if feature == Feature::ViralLoad {
            let lo = min.max(1.0).log10();
            let hi = max.log10();
            return (value.max(1.0).log10() - lo) / (hi - lo);
        }
        (value - min) / (max - min)
    }

    /// Reads a feature back out of a raw observation vector.
    pub fn feature(observation: &[f64], feature: Feature) -> f64 {
        observation.get(feature.index()).copied().unwrap_or(0.0)
    }
}
