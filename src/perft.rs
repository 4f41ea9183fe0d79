use std::collections::HashMap;
use std::fmt::Display;

use crate::move_gen::{gen_legal_moves, is_in_check};
use crate::position::{Board, GameState, Move};

/// Counts the leaf positions `depth` plies below the given one, split by the first move
/// ("divide"). Depth 0 is the position itself.
pub fn perft(board: &Board, state: &GameState, depth: usize) -> (HashMap<Move, usize>, usize) {
    if depth == 0 {
        return (HashMap::new(), 1);
    }

    let mut divide = HashMap::new();
    let mut tot = 0;

    for mve in gen_legal_moves(board, state) {
        let (next_board, next_state) = play(board, state, &mve);
        let count = count_leaves(&next_board, &next_state, depth - 1);
        divide.insert(mve, count);
        tot += count;
    }

    (divide, tot)
}

fn count_leaves(board: &Board, state: &GameState, depth: usize) -> usize {
    if depth == 0 {
        return 1;
    }

    let moves = gen_legal_moves(board, state);
    if depth == 1 {
        return moves.len();
    }

    moves
        .iter()
        .map(|mve| {
            let (next_board, next_state) = play(board, state, mve);
            count_leaves(&next_board, &next_state, depth - 1)
        })
        .sum()
}

fn play(board: &Board, state: &GameState, mve: &Move) -> (Board, GameState) {
    let next_state = state.next(board, mve);
    let mut next_board = board.clone();
    next_board.make_move(mve);
    (next_board, next_state)
}

/// Breakdown of the moves played at one ply, in the usual perft table columns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PerftDepthResult {
    pub tot: u64,
    pub captures: u64,
    pub en_passants: u64,
    pub castles: u64,
    pub promotions: u64,
    pub checks: u64,
    pub checkmates: u64,
}

impl PerftDepthResult {
    pub fn new(
        tot: u64,
        captures: u64,
        en_passants: u64,
        castles: u64,
        promotions: u64,
        checks: u64,
        checkmates: u64,
    ) -> Self {
        PerftDepthResult {
            tot,
            captures,
            en_passants,
            castles,
            promotions,
            checks,
            checkmates,
        }
    }
}

impl Display for PerftDepthResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:>12} {:>10} {:>8} {:>8} {:>8} {:>8} {:>8}",
            self.tot,
            self.captures,
            self.en_passants,
            self.castles,
            self.promotions,
            self.checks,
            self.checkmates
        )
    }
}

/// Per-ply statistics; entry `i` describes the moves played at ply `i + 1`.
pub fn perft_stats(board: &Board, state: &GameState, depth: usize) -> Vec<PerftDepthResult> {
    let mut depth_results = vec![PerftDepthResult::default(); depth];
    perft_stats_helper(&mut depth_results, board, state, 0);
    depth_results
}

fn perft_stats_helper(
    depth_results: &mut [PerftDepthResult],
    board: &Board,
    state: &GameState,
    curr_depth: usize,
) {
    if curr_depth == depth_results.len() {
        return;
    }

    for mve in gen_legal_moves(board, state) {
        let (next_board, next_state) = play(board, state, &mve);

        let curr_res = &mut depth_results[curr_depth];
        curr_res.tot += 1;
        if mve.is_capture() {
            curr_res.captures += 1;
        }
        if mve.is_en_passant() {
            curr_res.en_passants += 1;
        }
        if mve.castle_side().is_some() {
            curr_res.castles += 1;
        }
        if mve.promotion.is_some() {
            curr_res.promotions += 1;
        }
        if is_in_check(&next_board, next_state.to_move) {
            curr_res.checks += 1;
            if gen_legal_moves(&next_board, &next_state).is_empty() {
                curr_res.checkmates += 1;
            }
        }

        perft_stats_helper(depth_results, &next_board, &next_state, curr_depth + 1);
    }
}
