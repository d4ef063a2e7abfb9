//! Molecular feature registry and state representation.

pub mod feature;
pub mod state;

pub use feature::{Feature, FeatureGroup, FeatureSpec, UnknownFeature};
pub use state::{ConstraintViolation, MolecularState, StateValidation};
