use crate::position::{Board, CastlingRights, GameState, Piece, PieceKind, Side};
use crate::square::Square;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FenParseError {
    #[error("invalid FEN: num fields: want 6 got {0}")]
    NumFields(usize),

    #[error("invalid FEN: num ranks: want 8 got {0}")]
    NumRanks(usize),

    #[error("invalid FEN: rank {0} does not describe exactly 8 squares: {1}")]
    RankLength(usize, String),

    #[error("invalid FEN piece char: got {0:?} in {1}")]
    PieceChar(char, String),

    #[error("invalid FEN: side to move: want 'w'|'b' got {0}")]
    SideToMove(String),

    #[error("invalid FEN: castling rights: got {0}, err at idx {1}")]
    CastlingRights(String, usize),

    #[error("invalid FEN: invalid en passant square: got {0}")]
    EnPassantTarget(String),

    #[error("invalid FEN: want exactly one {side} king, got {count}")]
    KingCount { side: Side, count: usize },

    #[error("invalid FEN: halfmove clock: want a non-negative number got {0}")]
    HalfMoveClock(String),

    #[error("invalid FEN: full move number: want a number >= 1 got {0}")]
    FullMoveNumber(String),
}

/// Parses a six-field FEN record. Nothing is returned unless every field is valid and each side
/// has exactly one king.
pub fn parse(fen: &str) -> Result<(Board, GameState), FenParseError> {
    let fields = fen.split(' ').collect::<Vec<&str>>();

    if fields.len() != 6 {
        Err(FenParseError::NumFields(fields.len()))?
    }

    let board = board_from_fen(fields[0])?;

    let to_move = match fields[1] {
        "w" => Side::White,
        "b" => Side::Black,
        _ => Err(FenParseError::SideToMove(String::from(fields[1])))?,
    };

    let castling_rights = castling_rights_from_fen(fields[2])?;
    let en_passant_target = en_passant_target_from_fen(fields[3])?;

    let half_move_clock = clock_from_fen(fields[4])
        .ok_or_else(|| FenParseError::HalfMoveClock(fields[4].to_string()))?;

    let full_move_number = clock_from_fen(fields[5])
        .filter(|&n| n >= 1)
        .ok_or_else(|| FenParseError::FullMoveNumber(fields[5].to_string()))?;

    let state = GameState {
        to_move,
        castling_rights,
        en_passant_target,
        half_move_clock,
        full_move_number,
    };

    Ok((board, state))
}

// Plain decimal only: no sign and no leading zeros, so the field serializes back unchanged.
fn clock_from_fen(field: &str) -> Option<u16> {
    let canonical = !field.is_empty()
        && field.bytes().all(|b| b.is_ascii_digit())
        && (field == "0" || !field.starts_with('0'));
    if !canonical {
        return None;
    }
    field.parse().ok()
}

pub fn serialize(board: &Board, state: &GameState) -> String {
    let mut pieces = String::with_capacity(64 + 7);
    let mut curr_empty_count = 0;

    for (idx, sq) in Square::list_white_perspective().enumerate() {
        if let Some(piece) = board.get(sq) {
            if curr_empty_count != 0 {
                pieces += &curr_empty_count.to_string();
                curr_empty_count = 0;
            }
            pieces.push(piece.to_char());
        } else {
            curr_empty_count += 1;
        }
        if (idx + 1) % 8 == 0 {
            if curr_empty_count != 0 {
                pieces += &curr_empty_count.to_string();
                curr_empty_count = 0;
            }
            if idx != 63 {
                pieces.push('/');
            }
        }
    }

    let side_to_move_char = if state.to_move == Side::White {
        'w'
    } else {
        'b'
    };

    let mut castling_rights = String::with_capacity(4);

    if state.castling_rights.white_king_side {
        castling_rights += "K";
    }
    if state.castling_rights.white_queen_side {
        castling_rights += "Q";
    }
    if state.castling_rights.black_king_side {
        castling_rights += "k";
    }
    if state.castling_rights.black_queen_side {
        castling_rights += "q";
    }

    if castling_rights.is_empty() {
        castling_rights += "-";
    }

    let en_passant = state
        .en_passant_target
        .map_or_else(|| "-".to_string(), |sq| sq.to_string());

    format!(
        "{} {} {} {} {} {}",
        pieces,
        side_to_move_char,
        castling_rights,
        en_passant,
        state.half_move_clock,
        state.full_move_number
    )
}

// Letters must come in KQkq order, each at most once, so that serializing gives back the input.
fn castling_rights_from_fen(castling_rights_str: &str) -> Result<CastlingRights, FenParseError> {
    if castling_rights_str == "-" {
        return Ok(CastlingRights::none());
    }
    if castling_rights_str.is_empty() {
        return Err(FenParseError::CastlingRights(String::new(), 0));
    }

    const ORDER: [char; 4] = ['K', 'Q', 'k', 'q'];
    let mut seen = [false; 4];
    let mut last_idx = None;

    for (idx, ch) in castling_rights_str.chars().enumerate() {
        let order_idx = ORDER
            .iter()
            .position(|&c| c == ch)
            .ok_or_else(|| FenParseError::CastlingRights(castling_rights_str.to_string(), idx))?;

        if last_idx.is_some_and(|last| order_idx <= last) {
            return Err(FenParseError::CastlingRights(
                castling_rights_str.to_string(),
                idx,
            ));
        }
        seen[order_idx] = true;
        last_idx = Some(order_idx);
    }

    Ok(CastlingRights::new(seen[0], seen[1], seen[2], seen[3]))
}

// Only a square on the third or sixth rank can be passed over by a double push.
fn en_passant_target_from_fen(
    en_passant_target_str: &str,
) -> Result<Option<Square>, FenParseError> {
    if en_passant_target_str == "-" {
        return Ok(None);
    }

    let square = en_passant_target_str
        .parse::<Square>()
        .map_err(|_| FenParseError::EnPassantTarget(en_passant_target_str.to_string()))?;

    if square.rank() != 2 && square.rank() != 5 {
        return Err(FenParseError::EnPassantTarget(
            en_passant_target_str.to_string(),
        ));
    }

    Ok(Some(square))
}

fn board_from_fen(pieces_str: &str) -> Result<Board, FenParseError> {
    let ranks = pieces_str.split('/').collect::<Vec<&str>>();
    if ranks.len() != 8 {
        return Err(FenParseError::NumRanks(ranks.len()));
    }

    let mut board = Board::empty();

    // FEN lists the eighth rank first.
    for (rank_idx, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - rank_idx as u8;
        let mut file: u8 = 0;
        // Two digits in a row ("44") would be accepted by a plain sum, but never serialize back.
        let mut prev_was_digit = false;

        for ch in rank_str.chars() {
            if let Some(digit) = ch.to_digit(10) {
                if !(1..=8).contains(&digit) || prev_was_digit {
                    return Err(FenParseError::RankLength(rank_idx + 1, rank_str.to_string()));
                }
                file += digit as u8;
                prev_was_digit = true;
            } else if let Some(piece) = Piece::from_char(ch) {
                let square = Square::from_file_rank(file, rank).ok_or_else(|| {
                    FenParseError::RankLength(rank_idx + 1, rank_str.to_string())
                })?;
                board.set(square, piece);
                file += 1;
                prev_was_digit = false;
            } else {
                return Err(FenParseError::PieceChar(ch, pieces_str.to_string()));
            }

            if file > 8 {
                return Err(FenParseError::RankLength(rank_idx + 1, rank_str.to_string()));
            }
        }

        if file != 8 {
            return Err(FenParseError::RankLength(rank_idx + 1, rank_str.to_string()));
        }
    }

    for side in [Side::White, Side::Black] {
        let count = board
            .pieces()
            .filter(|(_, piece)| *piece == Piece::new(PieceKind::King, side))
            .count();
        if count != 1 {
            return Err(FenParseError::KingCount { side, count });
        }
    }

    Ok(board)
}
