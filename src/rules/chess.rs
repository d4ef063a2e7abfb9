//! Chess-move vocabulary for the molecular actions.

use std::fmt;

/// A chess move type standing in for a molecular process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChessMove {
    /// Long-range, high-energy surface protein rearrangement.
    QueenDiagonal,
    /// Membrane fusion.
    BishopMove,
    /// Protein conformation change.
    KnightJump,
}

impl ChessMove {
    pub fn all() -> [ChessMove; 3] {
        [
            ChessMove::QueenDiagonal,
            ChessMove::BishopMove,
            ChessMove::KnightJump,
        ]
    }

    /// Action identifier used as the rule-table key.
    pub fn action_id(&self) -> &'static str {
        match self {
            ChessMove::QueenDiagonal => "queen_diagonal",
            ChessMove::BishopMove => "bishop_move",
            ChessMove::KnightJump => "knight_jump",
        }
    }

    pub fn molecular_action(&self) -> &'static str {
        match self {
            ChessMove::QueenDiagonal => "surface_protein_rearrangement",
            ChessMove::BishopMove => "membrane_fusion",
            ChessMove::KnightJump => "protein_conformation_change",
        }
    }

    pub fn from_action_id(id: &str) -> Option<ChessMove> {
        ChessMove::all().into_iter().find(|m| m.action_id() == id)
    }
}

impl fmt::Display for ChessMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.action_id())
    }
}
