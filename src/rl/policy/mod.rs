//! Actor-critic interface and baseline policies.

pub mod energy_aware;
pub mod trait_;
pub mod uniform;

pub use energy_aware::EnergyAwarePolicy;
pub use trait_::{ActorCritic, PolicyOutput};
pub use uniform::UniformPolicy;
