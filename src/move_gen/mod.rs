pub mod attacks;
pub mod leaping_pieces;
pub mod legality;
pub mod sliding_pieces;
mod traits;

use crate::position::{Board, GameState, Move, Piece, PieceKind, Side};
use crate::square::Square;

use self::leaping_pieces::{gen_king_moves, gen_knight_moves, gen_pawn_moves};
use self::sliding_pieces::{gen_bishop_moves, gen_queen_moves, gen_rook_moves};
pub use self::traits::GenerateMoves;

type PieceMoveGen = fn(Piece, Square, &Board, &GameState) -> Vec<Move>;

// Indexed by `PieceKind::index`.
const PIECE_MOVE_GENS: [PieceMoveGen; 6] = [
    gen_pawn_moves,
    gen_knight_moves,
    gen_bishop_moves,
    gen_rook_moves,
    gen_queen_moves,
    gen_king_moves,
];

/// Pseudo-legal moves of the piece standing on `from`.
pub fn gen_piece_moves(piece: Piece, from: Square, board: &Board, state: &GameState) -> Vec<Move> {
    PIECE_MOVE_GENS[piece.kind.index()](piece, from, board, state)
}

/// Pseudo-legal moves of every piece belonging to the side to move, in board-scan order
/// (a1..h8). May leave the mover's king in check.
pub fn gen_pseudo_legal_moves(board: &Board, state: &GameState) -> Vec<Move> {
    let side = state.to_move;
    let mut moves = Vec::with_capacity(64);

    for (from, piece) in board.piece_locs(side) {
        moves.extend(gen_piece_moves(piece, from, board, state));
    }

    moves
}

pub fn gen_legal_moves(board: &Board, state: &GameState) -> Vec<Move> {
    legality::filter_legal(gen_pseudo_legal_moves(board, state), board, state)
}

/// Whether `side`'s king is attacked. A side without a king is never in check.
pub fn is_in_check(board: &Board, side: Side) -> bool {
    board
        .king_square(side)
        .is_some_and(|king_square| attacks::is_attacked(king_square, side.opposite_side(), board))
}

pub(crate) fn assert_generator_kind(piece: Piece, from: Square, board: &Board, kind: PieceKind) {
    assert_eq!(
        piece.kind, kind,
        "piece type: want {}, got {}",
        kind, piece.kind
    );
    debug_assert_eq!(
        board.get(from),
        Some(piece),
        "{} is not on {}\n{:?}",
        piece,
        from,
        board
    );
}

#[derive(Clone, Copy)]
pub struct MailboxMoveGen;

impl GenerateMoves for MailboxMoveGen {
    fn gen_moves(&self, board: &Board, state: &GameState) -> Vec<Move> {
        gen_legal_moves(board, state)
    }

    fn is_in_check(&self, board: &Board, side: Side) -> bool {
        is_in_check(board, side)
    }
}

pub static MOVE_GEN: MailboxMoveGen = MailboxMoveGen {};
