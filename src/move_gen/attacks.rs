use crate::position::{Board, Piece, PieceKind, Side};
use crate::square::{Offset, Square};

use super::leaping_pieces::{KING_OFFSETS, KNIGHT_OFFSETS, PAWN_CAPTURE_FILES};
use super::sliding_pieces::{DIAGONAL, ORTHOGONAL};

/// True iff some piece of `by` attacks `square`. Pawns attack only diagonally forward; sliders
/// see up to and including the first occupied square on each ray.
pub fn is_attacked(square: Square, by: Side, board: &Board) -> bool {
    board
        .pieces()
        .filter(|(_, piece)| piece.side == by)
        .any(|(from, piece)| attacks_square(piece, from, square, board))
}

fn attacks_square(piece: Piece, from: Square, target: Square, board: &Board) -> bool {
    match piece.kind {
        PieceKind::Pawn => PAWN_CAPTURE_FILES.iter().any(|&file_dir| {
            from.offset(Offset::new(file_dir, piece.side.pawn_direction())) == Some(target)
        }),
        PieceKind::Knight => KNIGHT_OFFSETS.iter().any(|&o| from.offset(o) == Some(target)),
        PieceKind::King => KING_OFFSETS.iter().any(|&o| from.offset(o) == Some(target)),
        PieceKind::Bishop => ray_reaches(from, target, board, &DIAGONAL),
        PieceKind::Rook => ray_reaches(from, target, board, &ORTHOGONAL),
        PieceKind::Queen => {
            ray_reaches(from, target, board, &DIAGONAL) || ray_reaches(from, target, board, &ORTHOGONAL)
        }
    }
}

fn ray_reaches(from: Square, target: Square, board: &Board, directions: &[Offset]) -> bool {
    for &dir in directions {
        let mut curr = from;
        while let Some(next) = curr.offset(dir) {
            if next == target {
                return true;
            }
            if !board.is_empty(next) {
                break;
            }
            curr = next;
        }
    }
    false
}
