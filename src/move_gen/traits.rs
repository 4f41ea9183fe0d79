use crate::position::{Board, GameState, Move, Side};

pub trait GenerateMoves {
    fn gen_moves(&self, board: &Board, state: &GameState) -> Vec<Move>;
    fn is_in_check(&self, board: &Board, side: Side) -> bool;
}
