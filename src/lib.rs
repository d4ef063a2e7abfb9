//! virochess - molecular "chess" between HIV and the immune system
//!
//! A reinforcement-learning sandbox in which an agent picks named molecular
//! actions (chess-style moves) that mutate an 18-feature biological state
//! under a fixed table of transition rules, paying for each move in ATP.

pub mod molecular;
pub mod rl;
pub mod rules;

pub use molecular::{Feature, MolecularState};
pub use rl::{EnvConfig, EnvError, HivEnvironment, RewardComputer, StepResult};
pub use rules::{ChessMove, RuleTable, TransitionRule};
