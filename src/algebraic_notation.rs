use crate::move_gen::GenerateMoves;
use crate::position::{Board, CastleSide, GameState, Move, PieceKind};
use crate::square::Square;

use winnow::combinator::{alt, opt, preceded, terminated};
use winnow::token::{one_of, take_while};
use winnow::Parser;
use winnow::Result as WinnowResult;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AlgebraicNotationError {
    #[error("no piece at move src {0}")]
    NoPieceAtSrc(String),

    #[error("illegal move {0}")]
    IllegalMove(String),

    #[error("empty move text")]
    Empty,

    #[error("malformed move text {0:?}")]
    Malformed(String),

    #[error("no legal move matches {0:?}")]
    NoMatch(String),

    #[error("{0:?} matches more than one legal move")]
    Ambiguous(String),
}

/// Standard algebraic notation for a legal `mve`: `Nbd7`, `exd6`, `e8=Q`, `O-O-O`, `Qh4#`.
pub fn move_to_algebraic_notation(
    board: &Board,
    state: &GameState,
    mve: Move,
    move_gen: impl GenerateMoves,
) -> Result<String, AlgebraicNotationError> {
    let src_piece = board
        .get(mve.src)
        .filter(|piece| piece.side == state.to_move)
        .ok_or(AlgebraicNotationError::NoPieceAtSrc(mve.src.to_string()))?;

    let legal_moves = move_gen.gen_moves(board, state);
    let mve = legal_moves
        .iter()
        .find(|&&legal| legal == mve)
        .copied()
        .ok_or(AlgebraicNotationError::IllegalMove(mve.to_string()))?;

    let mut res = String::with_capacity(7);

    match mve.castle_side() {
        Some(CastleSide::KingSide) => res.push_str("O-O"),
        Some(CastleSide::QueenSide) => res.push_str("O-O-O"),
        None => {
            if src_piece.kind == PieceKind::Pawn {
                if mve.is_capture() {
                    res.push(mve.src.file_char());
                }
            } else {
                res.push(src_piece.to_char().to_ascii_uppercase());

                let others: Vec<Square> = legal_moves
                    .iter()
                    .filter(|other| other.dest == mve.dest && other.src != mve.src)
                    .filter(|other| board.get(other.src).map(|p| p.kind) == Some(src_piece.kind))
                    .map(|other| other.src)
                    .collect();

                if !others.is_empty() {
                    if others.iter().all(|sq| sq.file() != mve.src.file()) {
                        res.push(mve.src.file_char());
                    } else if others.iter().all(|sq| sq.rank() != mve.src.rank()) {
                        res.push(mve.src.rank_char());
                    } else {
                        res.push(mve.src.file_char());
                        res.push(mve.src.rank_char());
                    }
                }
            }

            if mve.is_capture() {
                res.push('x');
            }
            res.push_str(&mve.dest.to_string());

            if let Some(promotion) = mve.promotion {
                let promotion_ch: char = promotion.into();
                res.push('=');
                res.push(promotion_ch.to_ascii_uppercase());
            }
        }
    }

    let next_state = state.next(board, &mve);
    let mut next_board = board.clone();
    next_board.make_move(&mve);

    if move_gen.is_in_check(&next_board, next_state.to_move) {
        if move_gen.gen_moves(&next_board, &next_state).is_empty() {
            res.push('#');
        } else {
            res.push('+');
        }
    }

    Ok(res)
}

/// Resolves `san` against the legal moves of the position. Check and annotation suffixes are
/// ignored, castling may be written with zeros and the `=` before a promotion piece is optional.
pub fn algebraic_notation_to_move(
    board: &Board,
    state: &GameState,
    san: &str,
    move_gen: impl GenerateMoves,
) -> Result<Move, AlgebraicNotationError> {
    let no_match = || AlgebraicNotationError::NoMatch(san.to_string());

    let text = san.trim();
    if text.chars().all(|ch| SUFFIXES.contains(&ch)) {
        return Err(AlgebraicNotationError::Empty);
    }
    let parsed = parse_san
        .parse(text)
        .map_err(|_| AlgebraicNotationError::Malformed(san.to_string()))?;

    let legal_moves = move_gen.gen_moves(board, state);

    let (kind, src_file, src_rank, dest, promotion) = match parsed {
        SanMove::Castle(castle_side) => {
            return legal_moves
                .into_iter()
                .find(|mve| mve.castle_side() == Some(castle_side))
                .ok_or_else(no_match);
        }
        SanMove::Normal {
            kind,
            src_file,
            src_rank,
            dest,
            promotion,
        } => (kind, src_file, src_rank, dest, promotion),
    };

    let candidates: Vec<Move> = legal_moves
        .into_iter()
        .filter(|mve| mve.dest == dest && mve.promotion == promotion)
        .filter(|mve| board.get(mve.src).is_some_and(|piece| piece.kind == kind))
        .filter(|mve| src_file.map_or(true, |file| mve.src.file() == file))
        .filter(|mve| src_rank.map_or(true, |rank| mve.src.rank() == rank))
        .collect();

    match candidates.as_slice() {
        [] => Err(no_match()),
        [mve] => Ok(*mve),
        _ => Err(AlgebraicNotationError::Ambiguous(san.to_string())),
    }
}

const SUFFIXES: [char; 4] = ['+', '#', '!', '?'];

/// A SAN token before it is matched against the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SanMove {
    Castle(CastleSide),
    Normal {
        kind: PieceKind,
        src_file: Option<u8>,
        src_rank: Option<u8>,
        dest: Square,
        promotion: Option<PieceKind>,
    },
}

// ======================================================
// Winnow Parsing functions
// ======================================================

fn parse_san(input: &mut &str) -> WinnowResult<SanMove> {
    terminated(
        alt((
            parse_castle.map(SanMove::Castle),
            (opt(parse_piece_letter), parse_target, opt(parse_promotion)).map(
                |(kind, (src_file, src_rank, dest), promotion)| SanMove::Normal {
                    kind: kind.unwrap_or(PieceKind::Pawn),
                    src_file,
                    src_rank,
                    dest,
                    promotion,
                },
            ),
        )),
        take_while(0.., SUFFIXES),
    )
    .parse_next(input)
}

fn parse_castle(input: &mut &str) -> WinnowResult<CastleSide> {
    // queen side must go before king side because they share a prefix
    alt((
        alt(("O-O-O", "0-0-0")).value(CastleSide::QueenSide),
        alt(("O-O", "0-0")).value(CastleSide::KingSide),
    ))
    .parse_next(input)
}

// SAN piece letters are always uppercase; lowercase letters are files.
fn parse_piece_letter(input: &mut &str) -> WinnowResult<PieceKind> {
    alt((
        'N'.value(PieceKind::Knight),
        'B'.value(PieceKind::Bishop),
        'R'.value(PieceKind::Rook),
        'Q'.value(PieceKind::Queen),
        'K'.value(PieceKind::King),
    ))
    .parse_next(input)
}

fn parse_promotion(input: &mut &str) -> WinnowResult<PieceKind> {
    preceded(opt('='), parse_piece_letter)
        .verify(|kind: &PieceKind| *kind != PieceKind::King)
        .parse_next(input)
}

/// Optional source file and rank, then the destination. The fullest form is tried first so a
/// lone file or rank is never mistaken for half of the destination.
fn parse_target(input: &mut &str) -> WinnowResult<(Option<u8>, Option<u8>, Square)> {
    alt((
        (parse_file, parse_rank, parse_capture, parse_square)
            .map(|(file, rank, _, dest)| (Some(file), Some(rank), dest)),
        (parse_file, parse_capture, parse_square).map(|(file, _, dest)| (Some(file), None, dest)),
        (parse_rank, parse_capture, parse_square).map(|(rank, _, dest)| (None, Some(rank), dest)),
        (parse_capture, parse_square).map(|(_, dest)| (None, None, dest)),
    ))
    .parse_next(input)
}

fn parse_capture(input: &mut &str) -> WinnowResult<Option<char>> {
    opt(one_of(['x', '-'])).parse_next(input)
}

fn parse_file(input: &mut &str) -> WinnowResult<u8> {
    one_of('a'..='h')
        .map(|ch: char| ch as u8 - b'a')
        .parse_next(input)
}

fn parse_rank(input: &mut &str) -> WinnowResult<u8> {
    one_of('1'..='8')
        .map(|ch: char| ch as u8 - b'1')
        .parse_next(input)
}

fn parse_square(input: &mut &str) -> WinnowResult<Square> {
    (parse_file, parse_rank)
        .verify_map(|(file, rank)| Square::from_file_rank(file, rank))
        .parse_next(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;
    use testresult::TestResult;

    use crate::move_gen::MOVE_GEN;
    use crate::position::fen;
    use crate::square::Square::*;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    const KIWIPETE_BLACK: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R b KQkq - 0 1";
    const FOOLS_MATE: &str = "rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq g3 0 2";

    #[test_case(KIWIPETE, Move::new(C3, B5), "Nb5" ; "no capture non pawn")]
    #[test_case(KIWIPETE, Move::new(B2, B3), "b3" ; "no capture pawn")]
    #[test_case(KIWIPETE, Move::new(E5, G6), "Nxg6" ; "capture non pawn")]
    #[test_case(KIWIPETE, Move::new(D5, E6), "dxe6" ; "capture pawn")]
    #[test_case(KIWIPETE, Move::new(E1, G1), "O-O" ; "castle king side white")]
    #[test_case(KIWIPETE, Move::new(E1, C1), "O-O-O" ; "castle queen side white")]
    #[test_case(KIWIPETE_BLACK, Move::new(E8, G8), "O-O" ; "castle king side black")]
    #[test_case(KIWIPETE_BLACK, Move::new(E8, C8), "O-O-O" ; "castle queen side black")]
    #[test_case("8/8/8/8/k2Pp3/8/8/7K b - d3 0 1", Move::new(E4, D3), "exd3" ; "en passant")]
    #[test_case(fen::START_FEN, Move::new(D2, D4), "d4" ; "pawn double push")]
    #[test_case("8/8/3P4/8/k7/8/4p2K/8 b - - 0 3", Move::with_promotion(E2, E1, PieceKind::Queen), "e1=Q" ; "promotion")]
    #[test_case("r3k3/1P6/8/8/8/8/8/4K3 w - - 0 1", Move::with_promotion(B7, A8, PieceKind::Knight), "bxa8=N" ; "capture promotion")]
    #[test_case("3R3R/8/8/8/8/8/8/K1k5 w - - 0 1", Move::new(D8, F8), "Rdf8" ; "ambiguous rank")]
    #[test_case("7R/8/8/8/7R/8/8/K1k5 w - - 0 1", Move::new(H4, H6), "R4h6" ; "ambiguous file")]
    #[test_case("5Q1Q/8/7Q/8/8/8/8/K2k4 w - - 0 1", Move::new(F8, F6), "Qff6" ; "three queens file unique")]
    #[test_case("5Q1Q/8/7Q/8/8/8/8/K2k4 w - - 0 1", Move::new(H8, F6), "Qh8f6" ; "three queens both")]
    #[test_case("5Q1Q/8/7Q/8/8/8/8/K2k4 w - - 0 1", Move::new(H6, F6), "Q6f6" ; "three queens rank unique")]
    #[test_case("4k3/8/8/8/8/8/8/R3K3 w - - 0 1", Move::new(A1, A8), "Ra8+" ; "check")]
    #[test_case(FOOLS_MATE, Move::new(D8, H4), "Qh4#" ; "checkmate")]
    fn test_move_to_algebraic_notation(fen_str: &str, mve: Move, want: &str) -> TestResult {
        let (board, state) = fen::parse(fen_str)?;
        let got = move_to_algebraic_notation(&board, &state, mve, MOVE_GEN)?;

        assert_eq!(got, want);
        Ok(())
    }

    #[test]
    fn test_move_to_algebraic_notation_errors() -> TestResult {
        let (board, state) = fen::parse(fen::START_FEN)?;

        assert_eq!(
            move_to_algebraic_notation(&board, &state, Move::new(E4, E5), MOVE_GEN),
            Err(AlgebraicNotationError::NoPieceAtSrc("e4".to_string()))
        );
        assert_eq!(
            move_to_algebraic_notation(&board, &state, Move::new(E7, E5), MOVE_GEN),
            Err(AlgebraicNotationError::NoPieceAtSrc("e7".to_string()))
        );
        assert_eq!(
            move_to_algebraic_notation(&board, &state, Move::new(E2, E5), MOVE_GEN),
            Err(AlgebraicNotationError::IllegalMove("e2e5".to_string()))
        );
        Ok(())
    }

    #[test_case(fen::START_FEN, "e4", Move::new(E2, E4) ; "pawn push")]
    #[test_case(fen::START_FEN, "Nf3", Move::new(G1, F3) ; "knight")]
    #[test_case(fen::START_FEN, "Nf3!?", Move::new(G1, F3) ; "annotated")]
    #[test_case(KIWIPETE, "O-O", Move::new(E1, G1) ; "castle letters")]
    #[test_case(KIWIPETE, "0-0-0", Move::new(E1, C1) ; "castle zeros")]
    #[test_case(KIWIPETE, "dxe6", Move::new(D5, E6) ; "pawn capture")]
    #[test_case(KIWIPETE, "Bxa6", Move::new(E2, A6) ; "bishop capture")]
    #[test_case("8/8/8/8/k2Pp3/8/8/7K b - d3 0 1", "exd3", Move::new(E4, D3) ; "en passant")]
    #[test_case("8/8/3P4/8/k7/8/4p2K/8 b - - 0 3", "e1=Q", Move::with_promotion(E2, E1, PieceKind::Queen) ; "promotion with equals")]
    #[test_case("8/8/3P4/8/k7/8/4p2K/8 b - - 0 3", "e1N", Move::with_promotion(E2, E1, PieceKind::Knight) ; "promotion without equals")]
    #[test_case("3R3R/8/8/8/8/8/8/K1k5 w - - 0 1", "Rdf8", Move::new(D8, F8) ; "file disambiguation")]
    #[test_case("7R/8/8/8/7R/8/8/K1k5 w - - 0 1", "R4h6", Move::new(H4, H6) ; "rank disambiguation")]
    #[test_case("5Q1Q/8/7Q/8/8/8/8/K2k4 w - - 0 1", "Qh8f6", Move::new(H8, F6) ; "square disambiguation")]
    #[test_case(FOOLS_MATE, "Qh4#", Move::new(D8, H4) ; "mate suffix")]
    fn test_algebraic_notation_to_move(fen_str: &str, san: &str, want: Move) -> TestResult {
        let (board, state) = fen::parse(fen_str)?;
        let got = algebraic_notation_to_move(&board, &state, san, MOVE_GEN)?;

        assert_eq!(got, want);
        Ok(())
    }

    #[test]
    fn test_algebraic_notation_to_move_keeps_flags() -> TestResult {
        let (board, state) = fen::parse(KIWIPETE)?;
        let got = algebraic_notation_to_move(&board, &state, "O-O", MOVE_GEN)?;
        assert_eq!(got.castle_side(), Some(CastleSide::KingSide));
        Ok(())
    }

    #[test_case(fen::START_FEN, "" ; "empty")]
    #[test_case(fen::START_FEN, "+" ; "only suffix")]
    fn test_algebraic_notation_to_move_empty(fen_str: &str, san: &str) -> TestResult {
        let (board, state) = fen::parse(fen_str)?;
        assert_eq!(
            algebraic_notation_to_move(&board, &state, san, MOVE_GEN),
            Err(AlgebraicNotationError::Empty)
        );
        Ok(())
    }

    #[test_case(fen::START_FEN, "Zf3" ; "unknown piece")]
    #[test_case(fen::START_FEN, "Nz9" ; "bad square")]
    #[test_case(fen::START_FEN, "e8=K" ; "king promotion")]
    #[test_case(fen::START_FEN, "Nb1c3d" ; "too long")]
    fn test_algebraic_notation_to_move_malformed(fen_str: &str, san: &str) -> TestResult {
        let (board, state) = fen::parse(fen_str)?;
        assert!(matches!(
            algebraic_notation_to_move(&board, &state, san, MOVE_GEN),
            Err(AlgebraicNotationError::Malformed(_))
        ));
        Ok(())
    }

    #[test_case(fen::START_FEN, "Nf5" ; "unreachable")]
    #[test_case(fen::START_FEN, "O-O" ; "castle blocked")]
    #[test_case("8/8/3P4/8/k7/8/4p2K/8 b - - 0 3", "e1" ; "promotion missing")]
    fn test_algebraic_notation_to_move_no_match(fen_str: &str, san: &str) -> TestResult {
        let (board, state) = fen::parse(fen_str)?;
        assert!(matches!(
            algebraic_notation_to_move(&board, &state, san, MOVE_GEN),
            Err(AlgebraicNotationError::NoMatch(_))
        ));
        Ok(())
    }

    #[test_case("3R3R/8/8/8/8/8/8/K1k5 w - - 0 1", "Rf8" ; "two rooks")]
    #[test_case("5Q1Q/8/7Q/8/8/8/8/K2k4 w - - 0 1", "Qhf6" ; "file not enough")]
    fn test_algebraic_notation_to_move_ambiguous(fen_str: &str, san: &str) -> TestResult {
        let (board, state) = fen::parse(fen_str)?;
        assert!(matches!(
            algebraic_notation_to_move(&board, &state, san, MOVE_GEN),
            Err(AlgebraicNotationError::Ambiguous(_))
        ));
        Ok(())
    }

    #[test_case("Nf3", SanMove::Normal { kind: PieceKind::Knight, src_file: None, src_rank: None, dest: F3, promotion: None } ; "piece")]
    #[test_case("exd6", SanMove::Normal { kind: PieceKind::Pawn, src_file: Some(4), src_rank: None, dest: D6, promotion: None } ; "pawn capture")]
    #[test_case("Qh8xf6+", SanMove::Normal { kind: PieceKind::Queen, src_file: Some(7), src_rank: Some(7), dest: F6, promotion: None } ; "square source")]
    #[test_case("R1a3", SanMove::Normal { kind: PieceKind::Rook, src_file: None, src_rank: Some(0), dest: A3, promotion: None } ; "rank source")]
    #[test_case("e2-e4", SanMove::Normal { kind: PieceKind::Pawn, src_file: Some(4), src_rank: Some(1), dest: E4, promotion: None } ; "long form")]
    #[test_case("bxa8=N#", SanMove::Normal { kind: PieceKind::Pawn, src_file: Some(1), src_rank: None, dest: A8, promotion: Some(PieceKind::Knight) } ; "promotion")]
    #[test_case("O-O-O!?", SanMove::Castle(CastleSide::QueenSide) ; "long castle")]
    #[test_case("0-0", SanMove::Castle(CastleSide::KingSide) ; "short castle zeros")]
    fn test_parse_san(inp: &str, want: SanMove) {
        assert_eq!(parse_san.parse(inp).ok(), Some(want));
    }

    #[test_case("Nd" ; "missing rank")]
    #[test_case("e8=K" ; "king promotion")]
    #[test_case("O-O-" ; "dangling castle")]
    #[test_case("Nf3 e5" ; "two moves")]
    fn test_parse_san_rejects(inp: &str) {
        assert!(parse_san.parse(inp).is_err());
    }

    #[test]
    fn test_every_legal_move_round_trips() -> TestResult {
        let (board, state) = fen::parse(KIWIPETE)?;
        for mve in MOVE_GEN.gen_moves(&board, &state) {
            let san = move_to_algebraic_notation(&board, &state, mve, MOVE_GEN)?;
            assert_eq!(algebraic_notation_to_move(&board, &state, &san, MOVE_GEN)?, mve, "{}", san);
        }
        Ok(())
    }
}
