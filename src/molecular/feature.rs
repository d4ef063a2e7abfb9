//! Fixed catalogue of molecular features and their biological constraints.
//!
//! Every dimension of the simulated cell/virus/immune state is a [`Feature`].
//! A handful of features carry a [`FeatureSpec`] with a valid range and
//! optional thresholds; the rest are unconstrained and live on a normalized
//! `[0, 1]` scale.

use std::fmt;

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Biological compartment a feature belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureGroup {
    TCell,
    Viral,
    Immune,
}

impl fmt::Display for FeatureGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureGroup::TCell => write!(f, "t-cell"),
            FeatureGroup::Viral => write!(f, "viral"),
            FeatureGroup::Immune => write!(f, "immune"),
        }
    }
}

/// A named scalar dimension of the molecular state.
///
/// The declaration order is the stable enumeration order used when a state is
/// flattened into a vector (see [`Feature::ALL`] and [`Feature::index`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "String", into = "String")
)]
pub enum Feature {
    Cd4Density,
    MembraneFluidity,
    CoreceptorStatus,
    VesicleCount,
    AtpLevel,
    TCellActivation,
    EnvProteinState,
    RnaIntegrity,
    ReverseTranscriptase,
    CapsidStability,
    ViralLoad,
    ReplicationRate,
    DrugResistance,
    AntibodySpecificity,
    MemoryCellStatus,
    CytokineLevels,
    InterferonResponse,
    NkCellActivity,
}

/// Range and threshold metadata for a constrained feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureSpec {
    /// Inclusive valid range `(min, max)`.
    pub range: (f64, f64),
    pub description: &'static str,
    /// Floor below which the episode is no longer viable.
    pub critical_threshold: Option<f64>,
    /// Band reported for documentation only.
    pub optimal_range: Option<(f64, f64)>,
    pub detection_threshold: Option<f64>,
    pub effective_threshold: Option<f64>,
}

impl FeatureSpec {
    const fn ranged(min: f64, max: f64, description: &'static str) -> Self {
        Self {
            range: (min, max),
            description,
            critical_threshold: None,
            optimal_range: None,
            detection_threshold: None,
            effective_threshold: None,
        }
    }

    /// Clamps `value` into this spec's range.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.range.0, self.range.1)
    }

    /// Midpoint of the valid range.
    pub fn midpoint(&self) -> f64 {
        (self.range.0 + self.range.1) / 2.0
    }

    /// Width of the valid range.
    pub fn width(&self) -> f64 {
        self.range.1 - self.range.0
    }
}

const CD4_SPEC: FeatureSpec = FeatureSpec {
    critical_threshold: Some(200.0),
    ..FeatureSpec::ranged(100.0, 1000.0, "Normal T-cell surface density range")
};

const MEMBRANE_SPEC: FeatureSpec = FeatureSpec {
    optimal_range: Some((0.4, 0.6)),
    ..FeatureSpec::ranged(0.1, 1.0, "Normalized fluidity scale")
};

const ATP_SPEC: FeatureSpec = FeatureSpec {
    critical_threshold: Some(2.0),
    ..FeatureSpec::ranged(1.0, 10.0, "Cellular ATP concentration")
};

const VIRAL_LOAD_SPEC: FeatureSpec = FeatureSpec {
    detection_threshold: Some(40.0),
    ..FeatureSpec::ranged(40.0, 1e6, "Clinical viral load range")
};

const INTERFERON_SPEC: FeatureSpec = FeatureSpec {
    effective_threshold: Some(100.0),
    ..FeatureSpec::ranged(0.0, 1000.0, "Interferon activity level")
};

impl Feature {
    /// Number of features in the catalogue.
    pub const COUNT: usize = 18;

    /// All features in stable enumeration order.
    pub const ALL: [Feature; Feature::COUNT] = [
        Feature::Cd4Density,
        Feature::MembraneFluidity,
        Feature::CoreceptorStatus,
        Feature::VesicleCount,
        Feature::AtpLevel,
        Feature::TCellActivation,
        Feature::EnvProteinState,
        Feature::RnaIntegrity,
        Feature::ReverseTranscriptase,
        Feature::CapsidStability,
        Feature::ViralLoad,
        Feature::ReplicationRate,
        Feature::DrugResistance,
        Feature::AntibodySpecificity,
        Feature::MemoryCellStatus,
        Feature::CytokineLevels,
        Feature::InterferonResponse,
        Feature::NkCellActivity,
    ];

    /// Position of this feature in [`Feature::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Stable string key of this feature.
    pub fn key(self) -> &'static str {
        match self {
            Feature::Cd4Density => "cd4_receptor_density",
            Feature::MembraneFluidity => "membrane_fluidity",
            Feature::CoreceptorStatus => "coreceptor_status",
            Feature::VesicleCount => "vesicle_count",
            Feature::AtpLevel => "atp_concentration",
            Feature::TCellActivation => "t_cell_activation_level",
            Feature::EnvProteinState => "env_protein_conformation",
            Feature::RnaIntegrity => "viral_rna_integrity",
            Feature::ReverseTranscriptase => "rt_activity",
            Feature::CapsidStability => "capsid_stability",
            Feature::ViralLoad => "viral_load",
            Feature::ReplicationRate => "replication_rate",
            Feature::DrugResistance => "drug_resistance_mutations",
            Feature::AntibodySpecificity => "antibody_binding_sites",
            Feature::MemoryCellStatus => "immune_memory_state",
            Feature::CytokineLevels => "cytokine_concentration",
            Feature::InterferonResponse => "interferon_levels",
            Feature::NkCellActivity => "natural_killer_activity",
        }
    }

    /// Upper-case identifier, as printed by state renderings.
    pub fn name(self) -> &'static str {
        match self {
            Feature::Cd4Density => "CD4_DENSITY",
            Feature::MembraneFluidity => "MEMBRANE_FLUIDITY",
            Feature::CoreceptorStatus => "CORECEPTOR_STATUS",
            Feature::VesicleCount => "VESICLE_COUNT",
            Feature::AtpLevel => "ATP_LEVEL",
            Feature::TCellActivation => "T_CELL_ACTIVATION",
            Feature::EnvProteinState => "ENV_PROTEIN_STATE",
            Feature::RnaIntegrity => "RNA_INTEGRITY",
            Feature::ReverseTranscriptase => "REVERSE_TRANSCRIPTASE",
            Feature::CapsidStability => "CAPSID_STABILITY",
            Feature::ViralLoad => "VIRAL_LOAD",
            Feature::ReplicationRate => "REPLICATION_RATE",
            Feature::DrugResistance => "DRUG_RESISTANCE",
            Feature::AntibodySpecificity => "ANTIBODY_SPECIFICITY",
            Feature::MemoryCellStatus => "MEMORY_CELL_STATUS",
            Feature::CytokineLevels => "CYTOKINE_LEVELS",
            Feature::InterferonResponse => "INTERFERON_RESPONSE",
            Feature::NkCellActivity => "NK_CELL_ACTIVITY",
        }
    }

    /// Resolves a stable key (see [`Feature::key`]) back to its feature.
    pub fn from_key(key: &str) -> Option<Feature> {
        Feature::ALL.into_iter().find(|f| f.key() == key)
    }

    pub fn group(self) -> FeatureGroup {
        match self {
            Feature::Cd4Density
            | Feature::MembraneFluidity
            | Feature::CoreceptorStatus
            | Feature::VesicleCount
            | Feature::AtpLevel
            | Feature::TCellActivation => FeatureGroup::TCell,
            Feature::EnvProteinState
            | Feature::RnaIntegrity
            | Feature::ReverseTranscriptase
            | Feature::CapsidStability
            | Feature::ViralLoad
            | Feature::ReplicationRate
            | Feature::DrugResistance => FeatureGroup::Viral,
            Feature::AntibodySpecificity
            | Feature::MemoryCellStatus
            | Feature::CytokineLevels
            | Feature::InterferonResponse
            | Feature::NkCellActivity => FeatureGroup::Immune,
        }
    }

    /// Measurement unit of the feature.
    pub fn unit(self) -> &'static str {
        match self {
            Feature::Cd4Density => "receptors/um^2",
            Feature::AtpLevel => "mM",
            Feature::ViralLoad => "copies/mL",
            Feature::InterferonResponse => "IU/mL",
            Feature::CytokineLevels => "pg/mL",
            Feature::VesicleCount => "vesicles/cell",
            Feature::ReplicationRate => "virions/day",
            Feature::CoreceptorStatus => "ratio",
            _ => "fraction",
        }
    }

    /// Constraint metadata, or `None` for unconstrained features.
    pub fn spec(self) -> Option<&'static FeatureSpec> {
        match self {
            Feature::Cd4Density => Some(&CD4_SPEC),
            Feature::MembraneFluidity => Some(&MEMBRANE_SPEC),
            Feature::AtpLevel => Some(&ATP_SPEC),
            Feature::ViralLoad => Some(&VIRAL_LOAD_SPEC),
            Feature::InterferonResponse => Some(&INTERFERON_SPEC),
            _ => None,
        }
    }

    /// Valid `(min, max)` range; `None` means unconstrained.
    pub fn range(self) -> Option<(f64, f64)> {
        self.spec().map(|s| s.range)
    }

    /// Episode-ending floor, if the feature has one.
    pub fn critical_threshold(self) -> Option<f64> {
        self.spec().and_then(|s| s.critical_threshold)
    }

    /// Clips `value` to the registered range; unconstrained features pass through.
    pub fn clamp(self, value: f64) -> f64 {
        match self.spec() {
            Some(spec) => spec.clamp(value),
            None => value,
        }
    }

    /// Features whose effects are applied multiplicatively, since they count
    /// populations rather than fractions.
    pub fn is_population_scale(self) -> bool {
        matches!(self, Feature::ViralLoad | Feature::Cd4Density)
    }

    /// Multi-line human-readable description including constraints.
    pub fn describe(self) -> String {
        let mut out = format!("{} ({}, {})", self.key(), self.group(), self.unit());
        if let Some(spec) = self.spec() {
            out.push_str(&format!("\nRange: [{}, {}]", spec.range.0, spec.range.1));
            out.push_str(&format!("\nDescription: {}", spec.description));
            if let Some(t) = spec.critical_threshold {
                out.push_str(&format!("\nCritical threshold: {}", t));
            }
            if let Some((lo, hi)) = spec.optimal_range {
                out.push_str(&format!("\nOptimal range: [{}, {}]", lo, hi));
            }
            if let Some(t) = spec.detection_threshold {
                out.push_str(&format!("\nDetection threshold: {}", t));
            }
            if let Some(t) = spec.effective_threshold {
                out.push_str(&format!("\nEffective threshold: {}", t));
            }
        }
        out
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A feature key that is not part of the catalogue.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown molecular feature key: {0}")]
pub struct UnknownFeature(pub String);

impl TryFrom<String> for Feature {
    type Error = UnknownFeature;

    fn try_from(key: String) -> Result<Self, Self::Error> {
        Feature::from_key(&key).ok_or(UnknownFeature(key))
    }
}

impl From<Feature> for String {
    fn from(feature: Feature) -> Self {
        feature.key().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_in_index_order() {
        for (i, f) in Feature::ALL.iter().enumerate() {
            assert_eq!(f.index(), i);
        }
    }

    #[test]
    fn keys_round_trip() {
        for f in Feature::ALL {
            assert_eq!(Feature::from_key(f.key()), Some(f));
        }
        assert_eq!(Feature::from_key("rook_density"), None);
    }

    #[test]
    fn registered_ranges() {
        assert_eq!(Feature::Cd4Density.range(), Some((100.0, 1000.0)));
        assert_eq!(Feature::MembraneFluidity.range(), Some((0.1, 1.0)));
        assert_eq!(Feature::AtpLevel.range(), Some((1.0, 10.0)));
        assert_eq!(Feature::ViralLoad.range(), Some((40.0, 1e6)));
        assert_eq!(Feature::InterferonResponse.range(), Some((0.0, 1000.0)));
        assert_eq!(Feature::DrugResistance.range(), None);
    }

    #[test]
    fn critical_thresholds() {
        assert_eq!(Feature::Cd4Density.critical_threshold(), Some(200.0));
        assert_eq!(Feature::AtpLevel.critical_threshold(), Some(2.0));
        assert_eq!(Feature::ViralLoad.critical_threshold(), None);
        assert_eq!(Feature::NkCellActivity.critical_threshold(), None);
    }

    #[test]
    fn clamp_only_touches_ranged_features() {
        assert_eq!(Feature::AtpLevel.clamp(12.0), 10.0);
        assert_eq!(Feature::AtpLevel.clamp(0.5), 1.0);
        assert_eq!(Feature::DrugResistance.clamp(3.0), 3.0);
    }

    #[test]
    fn describe_mentions_thresholds() {
        let d = Feature::AtpLevel.describe();
        assert!(d.contains("Range: [1, 10]"));
        assert!(d.contains("Critical threshold: 2"));
        let d = Feature::MembraneFluidity.describe();
        assert!(d.contains("Optimal range: [0.4, 0.6]"));
    }

    #[test]
    fn groups_partition_catalogue() {
        let tcell = Feature::ALL
            .iter()
            .filter(|f| f.group() == FeatureGroup::TCell)
            .count();
        let viral = Feature::ALL
            .iter()
            .filter(|f| f.group() == FeatureGroup::Viral)
            .count();
        let immune = Feature::ALL
            .iter()
            .filter(|f| f.group() == FeatureGroup::Immune)
            .count();
        assert_eq!((tcell, viral, immune), (6, 7, 5));
    }

    #[test]
    fn unknown_feature_error_display() {
        let err = Feature::try_from("nope".to_string()).unwrap_err();
        assert_eq!(err.to_string(), "Unknown molecular feature key: nope");
    }
}
