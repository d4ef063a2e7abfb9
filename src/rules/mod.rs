//! Transition rules: the fixed effect of each action on the molecular state.

pub mod chess;
pub mod error;
pub mod rule;
pub mod table;

pub use chess::ChessMove;
pub use error::RuleTableError;
pub use rule::{Confidence, EffectMode, SideEffect, SideEffectScaling, TransitionRule};
pub use table::RuleTable;
