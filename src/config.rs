use serde::{Deserialize, Serialize};

/// Which draw rules a [`crate::Game`] adjudicates on its own. Checkmate and stalemate are always
/// detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GameConfig {
    /// Half-moves without a pawn move or capture before the game is drawn.
    pub fifty_move_limit: u16,
    pub threefold_repetition: bool,
    pub insufficient_material: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fifty_move_limit: 100,
            threefold_repetition: true,
            insufficient_material: true,
        }
    }
}
