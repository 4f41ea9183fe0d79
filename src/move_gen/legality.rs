use log::trace;

use crate::position::{Board, GameState, Move, PieceKind, Side};
use crate::square::Square;

use super::attacks::is_attacked;

/// Keeps the moves that don't leave the mover's king attacked, in their original order.
///
/// Each candidate is played out on its own copy of the board. Castling additionally needs the
/// king's start, transit and destination squares to be safe before the move is tried.
pub fn filter_legal(moves: Vec<Move>, board: &Board, state: &GameState) -> Vec<Move> {
    let side = state.to_move;
    moves
        .into_iter()
        .filter(|mve| is_legal(mve, board, side))
        .collect()
}

pub fn is_legal(mve: &Move, board: &Board, side: Side) -> bool {
    let opp_side = side.opposite_side();

    if let Some(king_path) = castling_path(mve, board) {
        if let Some(sq) = king_path.into_iter().find(|&sq| is_attacked(sq, opp_side, board)) {
            trace!("{} rejected: castling across attacked {}", mve, sq);
            return false;
        }
    }

    let mut simulated = board.clone();
    simulated.make_move(mve);

    match simulated.king_square(side) {
        Some(king_square) if is_attacked(king_square, opp_side, &simulated) => {
            trace!("{} rejected: leaves king on {} attacked", mve, king_square);
            false
        }
        _ => true,
    }
}

// Every square the king stands on while castling, start and destination included.
fn castling_path(mve: &Move, board: &Board) -> Option<Vec<Square>> {
    let is_king = board.get(mve.src).is_some_and(|piece| piece.kind == PieceKind::King);
    if !is_king || mve.src.file().abs_diff(mve.dest.file()) != 2 {
        return None;
    }

    let rank = mve.src.rank();
    let (low, high) = if mve.src.file() < mve.dest.file() {
        (mve.src.file(), mve.dest.file())
    } else {
        (mve.dest.file(), mve.src.file())
    };

    Some(
        (low..=high)
            .filter_map(|file| Square::from_file_rank(file, rank))
            .collect(),
    )
}
