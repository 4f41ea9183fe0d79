use std::fmt;

use arrayvec::ArrayVec;

use crate::position::{CastleSide, Move, Piece, PieceKind, Side};
use crate::square::Square;

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// 64-slot mailbox indexed by `Square`. Cloning is a plain copy, which the legality filter relies
/// on to try moves without touching the real board.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Board {
    squares: [Option<Piece>; 64],
}

impl Board {
    pub fn empty() -> Self {
        Self {
            squares: [None; 64],
        }
    }

    pub fn start() -> Self {
        let mut board = Board::empty();
        for (file, &kind) in BACK_RANK.iter().enumerate() {
            let file = file as u8;
            for side in [Side::White, Side::Black] {
                let back_rank = side.back_rank();
                let pawn_rank = (back_rank as i8 + side.pawn_direction()) as u8;
                if let Some(sq) = Square::from_file_rank(file, back_rank) {
                    board.set(sq, Piece::new(kind, side));
                }
                if let Some(sq) = Square::from_file_rank(file, pawn_rank) {
                    board.set(sq, Piece::new(PieceKind::Pawn, side));
                }
            }
        }
        board
    }

    pub fn get(&self, square: Square) -> Option<Piece> {
        self.squares[square.index()]
    }

    pub fn set(&mut self, square: Square, piece: Piece) {
        self.squares[square.index()] = Some(piece);
    }

    pub fn remove(&mut self, square: Square) -> Option<Piece> {
        self.squares[square.index()].take()
    }

    pub fn is_empty(&self, square: Square) -> bool {
        self.squares[square.index()].is_none()
    }

    /// Occupied squares in a1..h8 order.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.squares
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| Some((Square::from_index(idx)?, (*slot)?)))
    }

    pub fn piece_locs(&self, side: Side) -> ArrayVec<(Square, Piece), 64> {
        self.pieces().filter(|(_, piece)| piece.side == side).collect()
    }

    pub fn king_square(&self, side: Side) -> Option<Square> {
        self.pieces()
            .find(|(_, piece)| piece.kind == PieceKind::King && piece.side == side)
            .map(|(sq, _)| sq)
    }

    /// Moves pieces for `mve` and returns whatever was captured. Every side effect is derived from
    /// the board itself: a pawn stepping diagonally onto an empty square takes en passant, a king
    /// travelling two files castles and brings its rook along, and a move carrying a promotion
    /// puts the promoted piece down in place of the pawn.
    ///
    /// Legality is the caller's business.
    pub fn make_move(&mut self, mve: &Move) -> Option<Piece> {
        let Some(piece) = self.remove(mve.src) else {
            debug_assert!(false, "no piece at {}\n{:?}", mve.src, self);
            return None;
        };

        let mut captured = self.remove(mve.dest);

        if piece.kind == PieceKind::Pawn && captured.is_none() && mve.src.file() != mve.dest.file()
        {
            if let Some(ep_pawn_sq) = Square::from_file_rank(mve.dest.file(), mve.src.rank()) {
                captured = self.remove(ep_pawn_sq);
            }
        }

        if piece.kind == PieceKind::King && mve.src.file().abs_diff(mve.dest.file()) == 2 {
            let castle_side = if mve.dest.file() > mve.src.file() {
                CastleSide::KingSide
            } else {
                CastleSide::QueenSide
            };
            let rank = mve.src.rank();
            let rook_src = Square::from_file_rank(castle_side.rook_src_file(), rank);
            let rook_dest = Square::from_file_rank(castle_side.rook_dest_file(), rank);
            if let (Some(rook_src), Some(rook_dest)) = (rook_src, rook_dest) {
                if let Some(rook) = self.remove(rook_src) {
                    self.set(rook_dest, rook);
                }
            }
        }

        let placed = match mve.promotion {
            Some(kind) if piece.kind == PieceKind::Pawn => Piece::new(kind, piece.side),
            _ => piece,
        };
        self.set(mve.dest, placed);

        captured
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::start()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut board_str = String::with_capacity(64 + 7);
        Square::list_white_perspective()
            .enumerate()
            .for_each(|(idx, square)| {
                let ch = self.get(square).map_or('.', Piece::to_char);
                board_str.push(ch);
                if (idx + 1) % 8 == 0 && idx != 63 {
                    board_str.push('\n');
                }
            });
        write!(f, "{}", board_str)
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
