use serde::{Deserialize, Serialize};

use crate::position::{Board, CastleSide, Move, PieceKind, Side};
use crate::square::Square;
use crate::square::Square::*;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Deserialize, Serialize)]
pub struct CastlingRights {
    pub white_king_side: bool,
    pub white_queen_side: bool,
    pub black_king_side: bool,
    pub black_queen_side: bool,
}

impl CastlingRights {
    pub fn start() -> Self {
        Self::new(true, true, true, true)
    }

    pub fn none() -> Self {
        Self::new(false, false, false, false)
    }

    pub const fn new(
        white_king_side: bool,
        white_queen_side: bool,
        black_king_side: bool,
        black_queen_side: bool,
    ) -> Self {
        Self {
            white_king_side,
            white_queen_side,
            black_king_side,
            black_queen_side,
        }
    }

    pub fn get(&self, side: Side, castle_side: CastleSide) -> bool {
        match (side, castle_side) {
            (Side::White, CastleSide::KingSide) => self.white_king_side,
            (Side::White, CastleSide::QueenSide) => self.white_queen_side,
            (Side::Black, CastleSide::KingSide) => self.black_king_side,
            (Side::Black, CastleSide::QueenSide) => self.black_queen_side,
        }
    }

    /// Copy with one right revoked.
    pub fn without(mut self, side: Side, castle_side: CastleSide) -> Self {
        match (side, castle_side) {
            (Side::White, CastleSide::KingSide) => self.white_king_side = false,
            (Side::White, CastleSide::QueenSide) => self.white_queen_side = false,
            (Side::Black, CastleSide::KingSide) => self.black_king_side = false,
            (Side::Black, CastleSide::QueenSide) => self.black_queen_side = false,
        }
        self
    }

    /// Revokes every right tied to `square` being vacated or landed on. Touching a king's home
    /// square revokes both of that side's rights, touching a rook's home square revokes the one.
    fn touched(self, square: Square) -> Self {
        match square {
            E1 => self
                .without(Side::White, CastleSide::KingSide)
                .without(Side::White, CastleSide::QueenSide),
            E8 => self
                .without(Side::Black, CastleSide::KingSide)
                .without(Side::Black, CastleSide::QueenSide),
            H1 => self.without(Side::White, CastleSide::KingSide),
            A1 => self.without(Side::White, CastleSide::QueenSide),
            H8 => self.without(Side::Black, CastleSide::KingSide),
            A8 => self.without(Side::Black, CastleSide::QueenSide),
            _ => self,
        }
    }
}

/// Everything about a position that isn't piece placement. Never mutated in place: each move
/// produces a fresh value via [`GameState::next`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct GameState {
    pub to_move: Side,
    pub castling_rights: CastlingRights,
    pub en_passant_target: Option<Square>,
    pub half_move_clock: u16,
    pub full_move_number: u16,
}

impl GameState {
    pub fn start() -> Self {
        Self {
            to_move: Side::White,
            castling_rights: CastlingRights::start(),
            en_passant_target: None,
            half_move_clock: 0,
            full_move_number: 1,
        }
    }

    /// State after `mve` is played. `board` is the position *before* the move.
    pub fn next(&self, board: &Board, mve: &Move) -> GameState {
        let moved = board.get(mve.src).map(|piece| piece.kind);
        let is_pawn_move = moved == Some(PieceKind::Pawn);
        let is_capture = !board.is_empty(mve.dest)
            || (is_pawn_move && mve.src.file() != mve.dest.file());

        let en_passant_target = if is_pawn_move && mve.src.rank().abs_diff(mve.dest.rank()) == 2 {
            Square::from_file_rank(mve.src.file(), (mve.src.rank() + mve.dest.rank()) / 2)
        } else {
            None
        };

        let half_move_clock = if is_pawn_move || is_capture {
            0
        } else {
            self.half_move_clock.saturating_add(1)
        };

        let full_move_number = if self.to_move == Side::Black {
            self.full_move_number.saturating_add(1)
        } else {
            self.full_move_number
        };

        GameState {
            to_move: self.to_move.opposite_side(),
            castling_rights: self.castling_rights.touched(mve.src).touched(mve.dest),
            en_passant_target,
            half_move_clock,
            full_move_number,
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        GameState::start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Piece;
    use test_case::test_case;

    #[test]
    fn test_state_start() {
        let state = GameState::start();

        assert!(state.castling_rights.white_king_side);
        assert!(state.castling_rights.white_queen_side);
        assert!(state.castling_rights.black_king_side);
        assert!(state.castling_rights.black_queen_side);

        assert_eq!(state.half_move_clock, 0);
        assert_eq!(state.full_move_number, 1);
        assert_eq!(state.en_passant_target, None);
        assert_eq!(state.to_move, Side::White);
    }

    #[test]
    fn test_next_double_push_sets_en_passant() {
        let board = Board::start();
        let state = GameState::start();

        let next = state.next(&board, &Move::new(E2, E4));

        assert_eq!(next.en_passant_target, Some(E3));
        assert_eq!(next.to_move, Side::Black);
        assert_eq!(next.half_move_clock, 0);
        assert_eq!(next.full_move_number, 1);
        // The old value is untouched.
        assert_eq!(state, GameState::start());
    }

    #[test]
    fn test_next_clears_en_passant_and_counts() {
        let board = Board::start();
        let state = GameState {
            to_move: Side::Black,
            en_passant_target: Some(E3),
            half_move_clock: 4,
            ..GameState::start()
        };

        let next = state.next(&board, &Move::new(G8, F6));

        assert_eq!(next.en_passant_target, None);
        assert_eq!(next.half_move_clock, 5);
        assert_eq!(next.full_move_number, 2);
    }

    #[test_case(E1, F1, CastlingRights::new(false, false, true, true) ; "king moves")]
    #[test_case(H1, H4, CastlingRights::new(false, true, true, true) ; "king side rook moves")]
    #[test_case(A1, A4, CastlingRights::new(true, false, true, true) ; "queen side rook moves")]
    #[test_case(B7, H8, CastlingRights::new(true, true, false, true) ; "rook captured at home")]
    fn test_next_revokes_castling(src: Square, dest: Square, want: CastlingRights) {
        let mut board = Board::empty();
        board.set(E1, Piece::new(PieceKind::King, Side::White));
        board.set(A1, Piece::new(PieceKind::Rook, Side::White));
        board.set(H1, Piece::new(PieceKind::Rook, Side::White));
        board.set(B7, Piece::new(PieceKind::Bishop, Side::White));
        board.set(E8, Piece::new(PieceKind::King, Side::Black));
        board.set(H8, Piece::new(PieceKind::Rook, Side::Black));

        let next = GameState::start().next(&board, &Move::new(src, dest));

        assert_eq!(next.castling_rights, want);
    }

    #[test]
    fn test_next_capture_resets_clock() {
        let mut board = Board::empty();
        board.set(D1, Piece::new(PieceKind::Queen, Side::White));
        board.set(D7, Piece::new(PieceKind::Knight, Side::Black));
        let state = GameState {
            half_move_clock: 17,
            ..GameState::start()
        };

        let next = state.next(&board, &Move::new(D1, D7));

        assert_eq!(next.half_move_clock, 0);
    }
}
