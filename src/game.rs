use std::fmt;

use arrayvec::ArrayVec;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::algebraic_notation::{algebraic_notation_to_move, AlgebraicNotationError};
use crate::config::GameConfig;
use crate::move_gen::{gen_legal_moves, is_in_check, MOVE_GEN};
use crate::position::{fen, Board, FenParseError, GameState, Move, Piece, PieceKind, Side, ZobristHash};
use crate::square::{FormatError, Square};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum DrawReason {
    FiftyMoveRule,
    InsufficientMaterial,
    ThreefoldRepetition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum GameStatus {
    Ongoing,
    Checkmate { winner: Side },
    Stalemate,
    Draw(DrawReason),
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        self != GameStatus::Ongoing
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Ongoing => write!(f, "ongoing"),
            GameStatus::Checkmate { winner } => write!(f, "checkmate, {} wins", winner),
            GameStatus::Stalemate => write!(f, "stalemate"),
            GameStatus::Draw(DrawReason::FiftyMoveRule) => write!(f, "draw by the fifty-move rule"),
            GameStatus::Draw(DrawReason::InsufficientMaterial) => {
                write!(f, "draw by insufficient material")
            }
            GameStatus::Draw(DrawReason::ThreefoldRepetition) => {
                write!(f, "draw by threefold repetition")
            }
        }
    }
}

/// Outcome as a front end reports it. Stalemate and every draw reason collapse to `Draw`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum GameResult {
    Win(Side),
    Draw,
    Ongoing,
}

impl From<GameStatus> for GameResult {
    fn from(status: GameStatus) -> Self {
        match status {
            GameStatus::Ongoing => GameResult::Ongoing,
            GameStatus::Checkmate { winner } => GameResult::Win(winner),
            GameStatus::Stalemate | GameStatus::Draw(_) => GameResult::Draw,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("game is already over: {0}")]
    GameOver(GameStatus),

    #[error("suggested move {mv} is not legal in {fen}")]
    SuggestedMoveRejected { mv: Move, fen: String },

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Notation(#[from] AlgebraicNotationError),
}

/// One game from a starting position to its end. Owns the board, the non-placement state and the
/// positions seen since the last pawn move or capture.
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    state: GameState,
    config: GameConfig,
    history: Vec<ZobristHash>,
    status: GameStatus,
}

impl Game {
    pub fn new() -> Self {
        Game::with_config(GameConfig::default())
    }

    pub fn with_config(config: GameConfig) -> Self {
        Game::from_position(Board::start(), GameState::start(), config)
    }

    pub fn from_fen(fen_str: &str) -> Result<Self, FenParseError> {
        Game::from_fen_with_config(fen_str, GameConfig::default())
    }

    pub fn from_fen_with_config(fen_str: &str, config: GameConfig) -> Result<Self, FenParseError> {
        let (board, state) = fen::parse(fen_str)?;
        Ok(Game::from_position(board, state, config))
    }

    fn from_position(board: Board, state: GameState, config: GameConfig) -> Self {
        let mut game = Game {
            history: vec![ZobristHash::calculate(&board, &state)],
            board,
            state,
            config,
            status: GameStatus::Ongoing,
        };
        game.status = game.evaluate_status();
        if game.status.is_terminal() {
            debug!("game starts finished: {}", game.status);
        }
        game
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn current_player(&self) -> Side {
        self.state.to_move
    }

    /// Legal moves for the side to move. Depends only on the board and state, so it is still
    /// answered once the game has ended.
    pub fn legal_moves(&self) -> Vec<Move> {
        gen_legal_moves(&self.board, &self.state)
    }

    /// Plays `mve` if it is one of [`Game::legal_moves`]. Returns false, leaving the game
    /// untouched, for an illegal move or once the game is over.
    pub fn apply_move(&mut self, mve: Move) -> bool {
        if self.status.is_terminal() {
            debug!("{} ignored: game is over ({})", mve, self.status);
            return false;
        }

        // The generated move carries the flags the text-parsed one lacks.
        match self.legal_moves().into_iter().find(|&legal| legal == mve) {
            Some(legal) => {
                self.play(legal);
                true
            }
            None => {
                debug!("{} is not legal in {}", mve, self.fen());
                false
            }
        }
    }

    /// Like [`Game::apply_move`], for moves handed over by a collaborator (engine, network peer)
    /// that should always be legal. A rejection is reported as an error instead of a bool.
    pub fn apply_suggested_move(&mut self, mve: Move) -> Result<(), GameError> {
        if self.status.is_terminal() {
            return Err(GameError::GameOver(self.status));
        }
        if !self.apply_move(mve) {
            let fen = self.warn_rejected(mve);
            return Err(GameError::SuggestedMoveRejected { mv: mve, fen });
        }
        Ok(())
    }

    pub fn apply_uci(&mut self, uci: &str) -> Result<Move, GameError> {
        if self.status.is_terminal() {
            return Err(GameError::GameOver(self.status));
        }
        let mve = Move::from_uci(uci).inspect_err(|_| {
            self.warn_rejected(uci);
        })?;
        self.apply_suggested_move(mve)?;
        Ok(mve)
    }

    pub fn apply_san(&mut self, san: &str) -> Result<Move, GameError> {
        if self.status.is_terminal() {
            return Err(GameError::GameOver(self.status));
        }
        let mve = algebraic_notation_to_move(&self.board, &self.state, san, MOVE_GEN)
            .inspect_err(|_| {
                self.warn_rejected(san);
            })?;
        self.apply_suggested_move(mve)?;
        Ok(mve)
    }

    // Collaborator moves are expected to be legal, so a rejection is worth a warning.
    fn warn_rejected(&self, mve: impl fmt::Display) -> String {
        let fen = self.fen();
        warn!("rejected suggested move {} in {}", mve, fen);
        fen
    }

    pub fn is_game_over(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn result(&self) -> GameResult {
        self.status.into()
    }

    pub fn fen(&self) -> String {
        fen::serialize(&self.board, &self.state)
    }

    pub fn is_in_check(&self) -> bool {
        is_in_check(&self.board, self.state.to_move)
    }

    /// How many times the current position has occurred since the last irreversible move.
    pub fn repetition_count(&self) -> usize {
        let current = ZobristHash::calculate(&self.board, &self.state);
        self.history.iter().filter(|&&hash| hash == current).count()
    }

    fn play(&mut self, mve: Move) {
        let next_state = self.state.next(&self.board, &mve);
        self.board.make_move(&mve);
        self.state = next_state;

        // No earlier position can recur once a pawn has moved or material has left the board.
        if self.state.half_move_clock == 0 {
            self.history.clear();
        }
        self.history
            .push(ZobristHash::calculate(&self.board, &self.state));

        self.status = self.evaluate_status();
        debug!("played {} -> {}", mve, self.fen());
        if self.status.is_terminal() {
            debug!("game over: {}", self.status);
        }
    }

    fn evaluate_status(&self) -> GameStatus {
        let side = self.state.to_move;

        if gen_legal_moves(&self.board, &self.state).is_empty() {
            return if is_in_check(&self.board, side) {
                GameStatus::Checkmate {
                    winner: side.opposite_side(),
                }
            } else {
                GameStatus::Stalemate
            };
        }

        if self.state.half_move_clock >= self.config.fifty_move_limit {
            GameStatus::Draw(DrawReason::FiftyMoveRule)
        } else if self.config.insufficient_material && is_insufficient_material(&self.board) {
            GameStatus::Draw(DrawReason::InsufficientMaterial)
        } else if self.config.threefold_repetition && self.repetition_count() >= 3 {
            GameStatus::Draw(DrawReason::ThreefoldRepetition)
        } else {
            GameStatus::Ongoing
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Game::new()
    }
}

/// Neither side can ever mate: bare kings, a lone minor piece, or one bishop each standing on the
/// same square colour.
pub fn is_insufficient_material(board: &Board) -> bool {
    let others: ArrayVec<(Square, Piece), 64> = board
        .pieces()
        .filter(|(_, piece)| piece.kind != PieceKind::King)
        .collect();

    match others.as_slice() {
        [] => true,
        [(_, piece)] => matches!(piece.kind, PieceKind::Bishop | PieceKind::Knight),
        [(sq_a, a), (sq_b, b)] => {
            a.kind == PieceKind::Bishop
                && b.kind == PieceKind::Bishop
                && a.side != b.side
                && sq_a.is_light() == sq_b.is_light()
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::square::Square::*;
    use test_case::test_case;
    use testresult::TestResult;

    fn play_uci(game: &mut Game, moves: &[&str]) -> TestResult {
        for uci in moves {
            game.apply_uci(uci)?;
        }
        Ok(())
    }

    #[test]
    fn test_new_game() {
        let game = Game::new();
        assert_eq!(game.current_player(), Side::White);
        assert_eq!(game.legal_moves().len(), 20);
        assert_eq!(game.status(), GameStatus::Ongoing);
        assert_eq!(game.result(), GameResult::Ongoing);
        assert_eq!(game.fen(), fen::START_FEN);
        assert!(!game.is_in_check());
    }

    #[test]
    fn test_fools_mate() -> TestResult {
        let mut game = Game::new();
        play_uci(&mut game, &["f2f3", "e7e5", "g2g4", "d8h4"])?;

        assert!(game.is_game_over());
        assert!(game.is_in_check());
        assert_eq!(game.status(), GameStatus::Checkmate { winner: Side::Black });
        assert_eq!(game.result(), GameResult::Win(Side::Black));
        assert!(game.legal_moves().is_empty());
        Ok(())
    }

    #[test]
    fn test_stalemate() -> TestResult {
        let mut game = Game::from_fen("7k/8/5Q2/8/8/8/8/6K1 w - - 0 1")?;
        assert!(game.apply_move(Move::new(F6, F7)));

        assert_eq!(game.status(), GameStatus::Stalemate);
        assert_eq!(game.result(), GameResult::Draw);
        assert!(!game.is_in_check());
        Ok(())
    }

    #[test]
    fn test_illegal_move_leaves_game_untouched() -> TestResult {
        let mut game = Game::from_fen("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1")?;
        let before = game.clone();

        // Pinned knight, wrong-side piece, empty square.
        assert!(!game.apply_move(Move::new(E2, C3)));
        assert!(!game.apply_move(Move::new(G8, G7)));
        assert!(!game.apply_move(Move::new(A1, A2)));

        assert_eq!(game.board(), before.board());
        assert_eq!(game.state(), before.state());
        assert_eq!(game.fen(), before.fen());
        Ok(())
    }

    #[test]
    fn test_suggested_move_rejected() -> TestResult {
        let mut game = Game::new();
        let err = game.apply_suggested_move(Move::new(E2, E5));
        assert!(matches!(err, Err(GameError::SuggestedMoveRejected { .. })));
        assert_eq!(game.fen(), fen::START_FEN);
        Ok(())
    }

    #[test]
    fn test_move_after_game_over() -> TestResult {
        let mut game = Game::from_fen("r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4")?;
        assert_eq!(game.status(), GameStatus::Checkmate { winner: Side::White });

        assert!(!game.apply_move(Move::new(E8, F7)));
        assert!(matches!(
            game.apply_uci("e8f7"),
            Err(GameError::GameOver(GameStatus::Checkmate { .. }))
        ));
        Ok(())
    }

    #[test]
    fn test_apply_uci_bad_text() {
        let mut game = Game::new();
        assert!(matches!(game.apply_uci("e2"), Err(GameError::Format(_))));
    }

    #[test]
    fn test_apply_san() -> TestResult {
        let mut game = Game::new();
        for san in ["e4", "e5", "Nf3", "Nc6", "Bb5", "a6", "O-O"] {
            game.apply_san(san)?;
        }
        assert_eq!(
            game.fen(),
            "r1bqkbnr/1ppp1ppp/p1n5/1B2p3/4P3/5N2/PPPP1PPP/RNBQ1RK1 b kq - 1 4"
        );
        assert!(matches!(game.apply_san("Qd5"), Err(GameError::Notation(_))));
        Ok(())
    }

    #[test_case("Nf5", AlgebraicNotationError::NoMatch("Nf5".to_string()) ; "unreachable square")]
    #[test_case("Ze4", AlgebraicNotationError::Malformed("Ze4".to_string()) ; "unknown piece letter")]
    #[test_case("O-O", AlgebraicNotationError::NoMatch("O-O".to_string()) ; "castling through pieces")]
    fn test_apply_san_rejected_leaves_game(san: &str, want: AlgebraicNotationError) {
        let mut game = Game::new();
        let got = game.apply_san(san);
        assert!(matches!(got, Err(GameError::Notation(ref err)) if *err == want), "{:?}", got);
        assert_eq!(game.fen(), fen::START_FEN);
        assert_eq!(game.repetition_count(), 1);
        assert_eq!(game.status(), GameStatus::Ongoing);
    }

    #[test]
    fn test_promotion_needs_piece() -> TestResult {
        let mut game = Game::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1")?;
        assert!(!game.apply_move(Move::new(A7, A8)));
        assert!(game.apply_move(Move::with_promotion(A7, A8, PieceKind::Knight)));
        assert_eq!(
            game.board().get(A8),
            Some(Piece::new(PieceKind::Knight, Side::White))
        );
        Ok(())
    }

    #[test]
    fn test_fifty_move_rule() -> TestResult {
        let mut game = Game::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 99 80")?;
        assert_eq!(game.status(), GameStatus::Ongoing);

        assert!(game.apply_move(Move::new(A1, A2)));
        assert_eq!(game.state().half_move_clock, 100);
        assert_eq!(game.status(), GameStatus::Draw(DrawReason::FiftyMoveRule));
        Ok(())
    }

    #[test]
    fn test_fifty_move_limit_configurable() -> TestResult {
        let config = GameConfig {
            fifty_move_limit: 150,
            ..GameConfig::default()
        };
        let mut game = Game::from_fen_with_config("4k3/8/8/8/8/8/8/R3K3 w - - 99 80", config)?;
        assert!(game.apply_move(Move::new(A1, A2)));
        assert_eq!(game.status(), GameStatus::Ongoing);
        Ok(())
    }

    #[test]
    fn test_checkmate_beats_fifty_move_rule() -> TestResult {
        let mut game = Game::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 99 80")?;
        assert!(game.apply_move(Move::new(A1, A8)));
        assert_eq!(game.status(), GameStatus::Checkmate { winner: Side::White });
        Ok(())
    }

    #[test_case("4k3/8/8/8/8/8/8/4K3 w - - 0 1", true ; "bare kings")]
    #[test_case("4k3/8/8/8/8/8/8/4KB2 w - - 0 1", true ; "lone bishop")]
    #[test_case("4k3/8/8/8/8/8/8/1n2K3 w - - 0 1", true ; "lone knight")]
    #[test_case("2b1k3/8/8/8/8/8/8/4KB2 w - - 0 1", true ; "bishops same colour")]
    #[test_case("3bk3/8/8/8/8/8/8/4KB2 w - - 0 1", false ; "bishops opposite colour")]
    #[test_case("4k3/8/8/8/8/8/8/3BKB2 w - - 0 1", false ; "two bishops one side")]
    #[test_case("4k3/8/8/8/8/8/8/2N1KN2 w - - 0 1", false ; "two knights")]
    #[test_case("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1", false ; "pawn")]
    #[test_case("4k3/8/8/8/8/8/8/4K2R w - - 0 1", false ; "rook")]
    fn test_insufficient_material(fen_str: &str, want: bool) -> TestResult {
        let (board, _) = fen::parse(fen_str)?;
        assert_eq!(is_insufficient_material(&board), want);

        let game = Game::from_fen(fen_str)?;
        let want_status = if want {
            GameStatus::Draw(DrawReason::InsufficientMaterial)
        } else {
            GameStatus::Ongoing
        };
        assert_eq!(game.status(), want_status);
        Ok(())
    }

    #[test]
    fn test_capture_into_insufficient_material() -> TestResult {
        let mut game = Game::from_fen("4k3/8/8/8/8/8/4r3/4K3 w - - 0 1")?;
        assert!(game.apply_move(Move::new(E1, E2)));
        assert_eq!(game.status(), GameStatus::Draw(DrawReason::InsufficientMaterial));
        Ok(())
    }

    #[test]
    fn test_insufficient_material_disabled() -> TestResult {
        let config = GameConfig {
            insufficient_material: false,
            ..GameConfig::default()
        };
        let game = Game::from_fen_with_config("4k3/8/8/8/8/8/8/4K3 w - - 0 1", config)?;
        assert_eq!(game.status(), GameStatus::Ongoing);
        Ok(())
    }

    const KNIGHT_SHUFFLE: [&str; 4] = ["g1f3", "g8f6", "f3g1", "f6g8"];

    #[test]
    fn test_threefold_repetition() -> TestResult {
        let mut game = Game::new();

        play_uci(&mut game, &KNIGHT_SHUFFLE)?;
        assert_eq!(game.repetition_count(), 2);
        assert_eq!(game.status(), GameStatus::Ongoing);

        play_uci(&mut game, &KNIGHT_SHUFFLE)?;
        assert_eq!(game.repetition_count(), 3);
        assert_eq!(game.status(), GameStatus::Draw(DrawReason::ThreefoldRepetition));
        assert_eq!(game.result(), GameResult::Draw);
        Ok(())
    }

    #[test]
    fn test_repetition_reset_by_pawn_move() -> TestResult {
        let mut game = Game::new();

        play_uci(&mut game, &KNIGHT_SHUFFLE)?;
        play_uci(&mut game, &["e2e3", "e7e6"])?;
        play_uci(&mut game, &KNIGHT_SHUFFLE)?;

        assert_eq!(game.repetition_count(), 2);
        assert_eq!(game.status(), GameStatus::Ongoing);
        Ok(())
    }

    #[test]
    fn test_threefold_repetition_disabled() -> TestResult {
        let config = GameConfig {
            threefold_repetition: false,
            ..GameConfig::default()
        };
        let mut game = Game::with_config(config);
        play_uci(&mut game, &KNIGHT_SHUFFLE)?;
        play_uci(&mut game, &KNIGHT_SHUFFLE)?;

        assert_eq!(game.repetition_count(), 3);
        assert_eq!(game.status(), GameStatus::Ongoing);
        Ok(())
    }

    #[test]
    fn test_castling_rights_change_position() -> TestResult {
        // King steps out and back: same placement, but the rights are gone so nothing repeats.
        let mut game = Game::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 0 1")?;
        play_uci(&mut game, &["e1f1", "e8d8", "f1e1", "d8e8"])?;

        assert_eq!(game.fen(), "4k3/8/8/8/8/8/8/4K2R w - - 4 3");
        assert_eq!(game.repetition_count(), 1);
        Ok(())
    }

    #[test]
    fn test_starts_in_stalemate() -> TestResult {
        let game = Game::from_fen("7k/5Q2/8/8/8/8/8/6K1 b - - 0 1")?;
        assert_eq!(game.status(), GameStatus::Stalemate);
        assert!(game.is_game_over());
        Ok(())
    }

    #[test]
    fn test_status_display() {
        assert_eq!(
            GameStatus::Checkmate { winner: Side::White }.to_string(),
            "checkmate, White wins"
        );
        assert_eq!(
            GameStatus::Draw(DrawReason::ThreefoldRepetition).to_string(),
            "draw by threefold repetition"
        );
    }
}
