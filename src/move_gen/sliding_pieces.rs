use crate::position::{Board, GameState, Move, Piece, PieceKind};
use crate::square::{Offset, Square};

use super::assert_generator_kind;

pub(crate) const ORTHOGONAL: [Offset; 4] = [
    Offset::new(0, 1),
    Offset::new(0, -1),
    Offset::new(1, 0),
    Offset::new(-1, 0),
];

pub(crate) const DIAGONAL: [Offset; 4] = [
    Offset::new(1, 1),
    Offset::new(1, -1),
    Offset::new(-1, 1),
    Offset::new(-1, -1),
];

pub(crate) const ALL_DIRECTIONS: [Offset; 8] = [
    ORTHOGONAL[0],
    ORTHOGONAL[1],
    ORTHOGONAL[2],
    ORTHOGONAL[3],
    DIAGONAL[0],
    DIAGONAL[1],
    DIAGONAL[2],
    DIAGONAL[3],
];

/// Walks each direction from `from` until the edge of the board. A friendly piece ends the ray
/// before its square, an opposing piece ends it on its square as a capture.
pub fn gen_sliding_moves(piece: Piece, from: Square, board: &Board, directions: &[Offset]) -> Vec<Move> {
    let mut moves = Vec::with_capacity(27);

    for &dir in directions {
        let mut curr = from;
        while let Some(dest) = curr.offset(dir) {
            match board.get(dest) {
                None => moves.push(Move::new(from, dest)),
                Some(blocker) => {
                    if blocker.side != piece.side {
                        moves.push(Move::new(from, dest).capture());
                    }
                    break;
                }
            }
            curr = dest;
        }
    }

    moves
}

pub fn gen_bishop_moves(piece: Piece, from: Square, board: &Board, _state: &GameState) -> Vec<Move> {
    assert_generator_kind(piece, from, board, PieceKind::Bishop);
    gen_sliding_moves(piece, from, board, &DIAGONAL)
}

pub fn gen_rook_moves(piece: Piece, from: Square, board: &Board, _state: &GameState) -> Vec<Move> {
    assert_generator_kind(piece, from, board, PieceKind::Rook);
    gen_sliding_moves(piece, from, board, &ORTHOGONAL)
}

pub fn gen_queen_moves(piece: Piece, from: Square, board: &Board, _state: &GameState) -> Vec<Move> {
    assert_generator_kind(piece, from, board, PieceKind::Queen);
    gen_sliding_moves(piece, from, board, &ALL_DIRECTIONS)
}
