use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::Display;
#[cfg(test)]
use strum_macros::EnumIter;

use crate::square::{FormatError, Square};

pub mod board;
pub mod fen;
pub mod state;
pub mod zobrist_hash;

pub use board::Board;
pub use fen::FenParseError;
pub use state::{CastlingRights, GameState};
pub use zobrist_hash::ZobristHash;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Display, Hash, Deserialize, Serialize)]
#[cfg_attr(test, derive(EnumIter))]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn opposite_side(self) -> Side {
        if self == Side::White {
            Side::Black
        } else {
            Side::White
        }
    }

    /// Rank the side's pieces start on (0 for white, 7 for black).
    pub(crate) const fn back_rank(self) -> u8 {
        match self {
            Side::White => 0,
            Side::Black => 7,
        }
    }

    /// Rank delta of a pawn push.
    pub(crate) const fn pawn_direction(self) -> i8 {
        match self {
            Side::White => 1,
            Side::Black => -1,
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Display, Hash, Deserialize, Serialize)]
#[cfg_attr(test, derive(EnumIter))]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Kinds a pawn may promote to, in the order promotion moves are generated.
    pub const PROMOTIONS: [PieceKind; 4] = [
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
    ];

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl From<PieceKind> for char {
    fn from(kind: PieceKind) -> char {
        match kind {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }
}

impl TryFrom<char> for PieceKind {
    type Error = char;

    /// Lowercase piece letter to kind; the rejected char is handed back.
    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            'p' => Ok(PieceKind::Pawn),
            'n' => Ok(PieceKind::Knight),
            'b' => Ok(PieceKind::Bishop),
            'r' => Ok(PieceKind::Rook),
            'q' => Ok(PieceKind::Queen),
            'k' => Ok(PieceKind::King),
            _ => Err(value),
        }
    }
}

/// A piece is only its kind and colour; two white knights are interchangeable.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Deserialize, Serialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub side: Side,
}

impl Piece {
    pub const fn new(kind: PieceKind, side: Side) -> Self {
        Self { kind, side }
    }

    /// FEN letter: uppercase for white, lowercase for black.
    pub fn to_char(self) -> char {
        let ch: char = self.kind.into();
        match self.side {
            Side::White => ch.to_ascii_uppercase(),
            Side::Black => ch,
        }
    }

    pub fn from_char(ch: char) -> Option<Self> {
        let kind = PieceKind::try_from(ch.to_ascii_lowercase()).ok()?;
        let side = if ch.is_ascii_uppercase() {
            Side::White
        } else {
            Side::Black
        };
        Some(Piece::new(kind, side))
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Deserialize, Serialize)]
pub enum CastleSide {
    KingSide,
    QueenSide,
}

impl CastleSide {
    /// File the king lands on.
    pub(crate) const fn king_dest_file(self) -> u8 {
        match self {
            CastleSide::KingSide => 6,
            CastleSide::QueenSide => 2,
        }
    }

    /// Starting file of the rook involved.
    pub(crate) const fn rook_src_file(self) -> u8 {
        match self {
            CastleSide::KingSide => 7,
            CastleSide::QueenSide => 0,
        }
    }

    /// File the rook lands on.
    pub(crate) const fn rook_dest_file(self) -> u8 {
        match self {
            CastleSide::KingSide => 5,
            CastleSide::QueenSide => 3,
        }
    }
}

/// Facts about a move derived by the generator. They are not part of a move's identity.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash, Deserialize, Serialize)]
pub struct MoveFlags {
    pub capture: bool,
    pub en_passant: bool,
    pub castle: Option<CastleSide>,
}

/// A move from `src` to `dest`. Equality and hashing only look at `src`, `dest` and
/// `promotion`, so a move parsed from text matches its generated counterpart.
#[derive(Clone, Copy, Deserialize, Serialize)]
pub struct Move {
    pub src: Square,
    pub dest: Square,
    pub promotion: Option<PieceKind>,
    pub flags: MoveFlags,
}

impl Move {
    pub fn new(src: Square, dest: Square) -> Move {
        Self {
            src,
            dest,
            promotion: None,
            flags: MoveFlags::default(),
        }
    }

    pub fn with_promotion(src: Square, dest: Square, promotion: PieceKind) -> Self {
        Self {
            src,
            dest,
            promotion: Some(promotion),
            flags: MoveFlags::default(),
        }
    }

    pub(crate) fn capture(mut self) -> Self {
        self.flags.capture = true;
        self
    }

    pub(crate) fn en_passant(mut self) -> Self {
        self.flags.capture = true;
        self.flags.en_passant = true;
        self
    }

    pub(crate) fn castle(mut self, castle_side: CastleSide) -> Self {
        self.flags.castle = Some(castle_side);
        self
    }

    pub fn is_capture(&self) -> bool {
        self.flags.capture
    }

    pub fn is_en_passant(&self) -> bool {
        self.flags.en_passant
    }

    pub fn castle_side(&self) -> Option<CastleSide> {
        self.flags.castle
    }

    /// Parses long algebraic notation as spoken by UCI engines: `e2e4`, `e7e8q`.
    pub fn from_uci(s: &str) -> Result<Move, FormatError> {
        if !s.is_ascii() || (s.len() != 4 && s.len() != 5) {
            return Err(FormatError::MoveLength(s.to_string()));
        }
        let src: Square = s[0..2].parse()?;
        let dest: Square = s[2..4].parse()?;

        match s.chars().nth(4) {
            None => Ok(Move::new(src, dest)),
            Some(ch) => match PieceKind::try_from(ch.to_ascii_lowercase()) {
                Ok(kind) if PieceKind::PROMOTIONS.contains(&kind) => {
                    Ok(Move::with_promotion(src, dest, kind))
                }
                _ => Err(FormatError::MovePromotion(s.to_string())),
            },
        }
    }
}

impl FromStr for Move {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Move::from_uci(s)
    }
}

impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        self.src == other.src && self.dest == other.dest && self.promotion == other.promotion
    }
}

impl Eq for Move {}

impl Hash for Move {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.src.hash(state);
        self.dest.hash(state);
        self.promotion.hash(state);
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.src, self.dest)?;
        if let Some(promotion) = self.promotion {
            write!(f, " ({})", promotion)?;
        }
        Ok(())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(promotion) = self.promotion {
            let promotion_ch: char = promotion.into();
            write!(f, "{}{}{}", self.src, self.dest, promotion_ch)
        } else {
            write!(f, "{}{}", self.src, self.dest)
        }
    }
}
