pub mod algebraic_notation;
pub mod config;
pub mod game;
pub mod move_gen;
pub mod perft;
pub mod pgn;
pub mod position;
pub mod square;

pub use config::GameConfig;
pub use game::{DrawReason, Game, GameError, GameResult, GameStatus};
pub use position::{Board, CastleSide, GameState, Move, Piece, PieceKind, Side};
pub use square::Square;
