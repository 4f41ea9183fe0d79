
use crate::position::{Board, GameState, Side};

const RNG_SEED: u64 = 123456789;

/// Standard Xorshift
const fn xorshift(mut x: u64) -> u64 {
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 5;
    x
}

struct ZobristRandomHashes {
    pieces: [u64; 64 * 12],
    black_to_move: u64,
    castling_rights: [u64; 4],
    en_passant_file: [u64; 8],
}

impl ZobristRandomHashes {
    const fn init() -> Self {
        let mut rng = RNG_SEED;

        let mut pieces = [0; 64 * 12];
        let mut i = 0;
        while i < (64 * 12) {
            rng = xorshift(rng);
            pieces[i] = rng;
            i += 1;
        }

        rng = xorshift(rng);
        let black_to_move = rng;

        let mut castling_rights = [0; 4];
        let mut i = 0;
        while i < 4 {
            rng = xorshift(rng);
            castling_rights[i] = rng;
            i += 1;
        }

        let mut en_passant_file = [0; 8];
        let mut i = 0;
        while i < 8 {
            rng = xorshift(rng);
            en_passant_file[i] = rng;
            i += 1;
        }

        Self {
            pieces,
            black_to_move,
            castling_rights,
            en_passant_file,
        }
    }
}

const ZOBRIST_RANDOM_HASHES: ZobristRandomHashes = ZobristRandomHashes::init();

/// Key identifying a position for repetition purposes: placement, side to move, castling rights
/// and en passant file. Clocks are deliberately left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ZobristHash(u64);

impl ZobristHash {
    pub fn calculate(board: &Board, state: &GameState) -> Self {
        let mut hash = 0;

        for (square, piece) in board.pieces() {
            let piece_idx = piece.side.index() * 6 + piece.kind.index();
            hash ^= ZOBRIST_RANDOM_HASHES.pieces[piece_idx * 64 + square.index()];
        }

        if state.to_move == Side::Black {
            hash ^= ZOBRIST_RANDOM_HASHES.black_to_move;
        }

        let rights = [
            state.castling_rights.white_king_side,
            state.castling_rights.white_queen_side,
            state.castling_rights.black_king_side,
            state.castling_rights.black_queen_side,
        ];
        for (idx, right) in rights.into_iter().enumerate() {
            if right {
                hash ^= ZOBRIST_RANDOM_HASHES.castling_rights[idx];
            }
        }

        if let Some(ep_target) = state.en_passant_target {
            hash ^= ZOBRIST_RANDOM_HASHES.en_passant_file[ep_target.file() as usize];
        }

        ZobristHash(hash)
    }
}
