use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
#[cfg(test)]
use strum_macros::EnumIter;
use strum_macros::FromRepr;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("square: want 2 chars got {0:?}")]
    SquareLength(String),

    #[error("square: file must be in a..=h, got {0:?}")]
    SquareFile(String),

    #[error("square: rank must be in 1..=8, got {0:?}")]
    SquareRank(String),

    #[error("move: want 4 or 5 chars got {0:?}")]
    MoveLength(String),

    #[error("move: promotion must be one of q, r, b, n, got {0:?}")]
    MovePromotion(String),
}

#[allow(dead_code)]
#[rustfmt::skip]
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, FromRepr, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[cfg_attr(test, derive(EnumIter))]
pub enum Square {
    A1, B1, C1, D1, E1, F1, G1, H1,
    A2, B2, C2, D2, E2, F2, G2, H2,
    A3, B3, C3, D3, E3, F3, G3, H3,
    A4, B4, C4, D4, E4, F4, G4, H4,
    A5, B5, C5, D5, E5, F5, G5, H5,
    A6, B6, C6, D6, E6, F6, G6, H6,
    A7, B7, C7, D7, E7, F7, G7, H7,
    A8, B8, C8, D8, E8, F8, G8, H8,
}

impl Square {
    /// File index, 0 for the a-file through 7 for the h-file.
    pub const fn file(self) -> u8 {
        self as u8 % 8
    }

    /// Rank index, 0 for the first rank through 7 for the eighth.
    pub const fn rank(self) -> u8 {
        self as u8 / 8
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_file_rank(file: u8, rank: u8) -> Option<Square> {
        if file > 7 || rank > 7 {
            return None;
        }
        Square::from_repr(rank * 8 + file)
    }

    pub(crate) fn from_index(idx: usize) -> Option<Square> {
        u8::try_from(idx).ok().and_then(Square::from_repr)
    }

    /// Returns the square reached by stepping `offset` from `self`, or `None` if it falls off the
    /// board. Files never wrap: h4 + (1, 0) is off-board, not a5.
    pub fn offset(self, offset: Offset) -> Option<Square> {
        let file = self.file() as i8 + offset.file;
        let rank = self.rank() as i8 + offset.rank;
        if !(0..8).contains(&file) || !(0..8).contains(&rank) {
            return None;
        }
        Square::from_file_rank(file as u8, rank as u8)
    }

    /// a1 is dark, h1 is light.
    pub const fn is_light(self) -> bool {
        (self.file() + self.rank()) % 2 == 1
    }

    pub fn file_char(self) -> char {
        (b'a' + self.file()) as char
    }

    pub fn rank_char(self) -> char {
        (b'1' + self.rank()) as char
    }

    /// All squares in the order a board is printed for white: a8..h8, a7..h7, ..., a1..h1.
    pub fn list_white_perspective() -> impl Iterator<Item = Square> {
        (0..8u8)
            .rev()
            .flat_map(|rank| (0..8u8).filter_map(move |file| Square::from_file_rank(file, rank)))
    }
}

impl FromStr for Square {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(FormatError::SquareLength(s.to_string()));
        }
        let file = match bytes[0] {
            b'a'..=b'h' => bytes[0] - b'a',
            _ => return Err(FormatError::SquareFile(s.to_string())),
        };
        let rank = match bytes[1] {
            b'1'..=b'8' => bytes[1] - b'1',
            _ => return Err(FormatError::SquareRank(s.to_string())),
        };
        Square::from_file_rank(file, rank).ok_or_else(|| FormatError::SquareLength(s.to_string()))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

/// A (file, rank) step used to walk from one square to candidate squares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Offset {
    pub file: i8,
    pub rank: i8,
}

impl Offset {
    pub const fn new(file: i8, rank: i8) -> Self {
        Self { file, rank }
    }
}
