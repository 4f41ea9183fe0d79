use crate::position::{Board, CastleSide, GameState, Move, Piece, PieceKind};
use crate::square::{Offset, Square};

use super::assert_generator_kind;

pub(crate) const KNIGHT_OFFSETS: [Offset; 8] = [
    Offset::new(1, 2),
    Offset::new(2, 1),
    Offset::new(2, -1),
    Offset::new(1, -2),
    Offset::new(-1, -2),
    Offset::new(-2, -1),
    Offset::new(-2, 1),
    Offset::new(-1, 2),
];

pub(crate) const KING_OFFSETS: [Offset; 8] = [
    Offset::new(0, 1),
    Offset::new(1, 1),
    Offset::new(1, 0),
    Offset::new(1, -1),
    Offset::new(0, -1),
    Offset::new(-1, -1),
    Offset::new(-1, 0),
    Offset::new(-1, 1),
];

/// Files a pawn captures towards.
pub(crate) const PAWN_CAPTURE_FILES: [i8; 2] = [-1, 1];

pub fn gen_pawn_moves(piece: Piece, from: Square, board: &Board, state: &GameState) -> Vec<Move> {
    assert_generator_kind(piece, from, board, PieceKind::Pawn);

    let side = piece.side;
    let dir = side.pawn_direction();
    let start_rank = (side.back_rank() as i8 + dir) as u8;
    let promotion_rank = side.opposite_side().back_rank();

    let mut moves = Vec::with_capacity(12);

    if let Some(single) = from.offset(Offset::new(0, dir)).filter(|&sq| board.is_empty(sq)) {
        push_pawn_move(&mut moves, Move::new(from, single), promotion_rank);

        if from.rank() == start_rank {
            if let Some(double) = from.offset(Offset::new(0, 2 * dir)).filter(|&sq| board.is_empty(sq)) {
                moves.push(Move::new(from, double));
            }
        }
    }

    for file_dir in PAWN_CAPTURE_FILES {
        let Some(dest) = from.offset(Offset::new(file_dir, dir)) else {
            continue;
        };
        match board.get(dest) {
            Some(target) if target.side != side => {
                push_pawn_move(&mut moves, Move::new(from, dest).capture(), promotion_rank);
            }
            None if state.en_passant_target == Some(dest) => {
                // The pawn being taken sits beside us, on the file we're moving to.
                let passed_pawn = Square::from_file_rank(dest.file(), from.rank())
                    .and_then(|sq| board.get(sq));
                if passed_pawn == Some(Piece::new(PieceKind::Pawn, side.opposite_side())) {
                    moves.push(Move::new(from, dest).en_passant());
                }
            }
            _ => (),
        }
    }

    moves
}

// A move onto the last rank becomes one move per promotion kind.
fn push_pawn_move(moves: &mut Vec<Move>, mve: Move, promotion_rank: u8) {
    if mve.dest.rank() != promotion_rank {
        moves.push(mve);
        return;
    }
    for kind in PieceKind::PROMOTIONS {
        moves.push(Move {
            promotion: Some(kind),
            ..mve
        });
    }
}

pub fn gen_knight_moves(piece: Piece, from: Square, board: &Board, _state: &GameState) -> Vec<Move> {
    assert_generator_kind(piece, from, board, PieceKind::Knight);
    gen_offset_moves(piece, from, board, &KNIGHT_OFFSETS)
}

/// Steps to the adjacent squares, plus castling when the right is held, the rook is home and
/// nothing stands between king and rook. Whether the king passes through check is left to the
/// legality filter.
pub fn gen_king_moves(piece: Piece, from: Square, board: &Board, state: &GameState) -> Vec<Move> {
    assert_generator_kind(piece, from, board, PieceKind::King);

    let mut moves = gen_offset_moves(piece, from, board, &KING_OFFSETS);

    let side = piece.side;
    let back_rank = side.back_rank();
    if Square::from_file_rank(4, back_rank) != Some(from) {
        return moves;
    }

    for castle_side in [CastleSide::KingSide, CastleSide::QueenSide] {
        if !state.castling_rights.get(side, castle_side) {
            continue;
        }

        let rook_file = castle_side.rook_src_file();
        let rook_home = Square::from_file_rank(rook_file, back_rank).and_then(|sq| board.get(sq));
        if rook_home != Some(Piece::new(PieceKind::Rook, side)) {
            continue;
        }

        let (low, high) = if rook_file < from.file() {
            (rook_file, from.file())
        } else {
            (from.file(), rook_file)
        };
        let path_clear = (low + 1..high)
            .filter_map(|file| Square::from_file_rank(file, back_rank))
            .all(|sq| board.is_empty(sq));
        if !path_clear {
            continue;
        }

        if let Some(dest) = Square::from_file_rank(castle_side.king_dest_file(), back_rank) {
            moves.push(Move::new(from, dest).castle(castle_side));
        }
    }

    moves
}

fn gen_offset_moves(piece: Piece, from: Square, board: &Board, offsets: &[Offset]) -> Vec<Move> {
    offsets
        .iter()
        .filter_map(|&offset| from.offset(offset))
        .filter_map(|dest| match board.get(dest) {
            None => Some(Move::new(from, dest)),
            Some(target) if target.side != piece.side => Some(Move::new(from, dest).capture()),
            Some(_) => None,
        })
        .collect()
}
