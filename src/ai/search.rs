use rand::RngCore;
use rand::seq::SliceRandom;
use tracing::{debug, trace};
use web_time::Instant;

use crate::ai::eval::Evaluator;
use crate::board::Board;
use crate::rules::{apply_move, flipped_count, legal_moves};
use crate::types::{Player, Position};

const MIN_SCORE: i32 = i32::MIN;
const MAX_SCORE: i32 = i32::MAX;

/// Picks a move for the side to move. `None` means that side has no legal
/// move and must pass.
pub trait MoveSelector: Send + Sync {
    fn select_move(&self, board: &Board, player: Player, rng: &mut dyn RngCore)
    -> Option<Position>;
}

/// Legal moves paired with how many stones each flips, in row-major order.
fn moves_with_flips(board: &Board, player: Player) -> Vec<(Position, u32)> {
    legal_moves(board, player)
        .into_iter()
        .map(|mv| (mv, flipped_count(board, mv, player)))
        .collect()
}

/// Chooses at random among the `pool` moves that flip the fewest stones.
#[derive(Debug, Clone, Copy)]
pub struct WeakestSelector {
    pub pool: usize,
}

impl MoveSelector for WeakestSelector {
    fn select_move(
        &self,
        board: &Board,
        player: Player,
        rng: &mut dyn RngCore,
    ) -> Option<Position> {
        let mut moves = moves_with_flips(board, player);
        moves.sort_by_key(|&(_, flips)| flips);
        moves.truncate(self.pool.max(1));
        moves.choose(rng).map(|&(mv, _)| mv)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSelector;

impl MoveSelector for RandomSelector {
    fn select_move(
        &self,
        board: &Board,
        player: Player,
        rng: &mut dyn RngCore,
    ) -> Option<Position> {
        legal_moves(board, player).choose(rng).copied()
    }
}

/// Takes the move that flips the most stones; the first one found wins ties.
#[derive(Debug, Default, Clone, Copy)]
pub struct GreedySelector;

impl MoveSelector for GreedySelector {
    fn select_move(
        &self,
        board: &Board,
        player: Player,
        _rng: &mut dyn RngCore,
    ) -> Option<Position> {
        moves_with_flips(board, player)
            .into_iter()
            .fold(None, |best: Option<(Position, u32)>, (mv, flips)| match best {
                Some((_, best_flips)) if best_flips >= flips => best,
                _ => Some((mv, flips)),
            })
            .map(|(mv, _)| mv)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AlphaBetaSelector {
    pub evaluator: Evaluator,
    pub depth: u8,
}

impl MoveSelector for AlphaBetaSelector {
    fn select_move(
        &self,
        board: &Board,
        player: Player,
        _rng: &mut dyn RngCore,
    ) -> Option<Position> {
        Searcher::new(self.evaluator, self.depth)
            .search(board, player)
            .map(|outcome| outcome.best_move)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOutcome {
    pub best_move: Position,
    /// Minimax value of `best_move` from the searching player's view.
    pub score: i32,
    pub nodes: u64,
}

/// Depth-limited minimax with alpha-beta pruning.
///
/// Leaves are scored from the root player's point of view: that player
/// maximizes, the opponent minimizes. A side without legal moves is a leaf,
/// whatever depth remains.
pub struct Searcher {
    evaluator: Evaluator,
    max_depth: u8,
    nodes: u64,
}

impl Searcher {
    pub fn new(evaluator: Evaluator, max_depth: u8) -> Self {
        Self {
            evaluator,
            max_depth: max_depth.max(1),
            nodes: 0,
        }
    }

    /// Searches the best move for `player`. Returns `None` when `player` has
    /// no legal move. `board` is only read; every line is explored on copies.
    pub fn search(&mut self, board: &Board, player: Player) -> Option<SearchOutcome> {
        let start_time = Instant::now();
        self.nodes = 0;

        let moves = legal_moves(board, player);
        let mut best: Option<(Position, i32)> = None;
        let mut alpha = MIN_SCORE;

        for mv in moves {
            let next = apply_move(board, mv, player);
            let score = self.alphabeta(
                &next,
                player.opponent(),
                player,
                self.max_depth - 1,
                alpha,
                MAX_SCORE,
            );
            trace!(%mv, score, "root candidate");

            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((mv, score));
            }
            alpha = alpha.max(score);
        }

        let (best_move, score) = best?;
        debug!(
            %best_move,
            score,
            nodes = self.nodes,
            depth = self.max_depth,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "alpha-beta search finished"
        );

        Some(SearchOutcome {
            best_move,
            score,
            nodes: self.nodes,
        })
    }

    fn alphabeta(
        &mut self,
        board: &Board,
        to_move: Player,
        root: Player,
        depth: u8,
        mut alpha: i32,
        mut beta: i32,
    ) -> i32 {
        self.nodes += 1;

        if depth == 0 {
            return self.evaluator.evaluate(board, root);
        }
        let moves = legal_moves(board, to_move);
        if moves.is_empty() {
            return self.evaluator.evaluate(board, root);
        }

        if to_move == root {
            let mut best = MIN_SCORE;
            for mv in moves {
                let next = apply_move(board, mv, to_move);
                let score = self.alphabeta(&next, to_move.opponent(), root, depth - 1, alpha, beta);
                best = best.max(score);
                alpha = alpha.max(best);
                if beta <= alpha {
                    break;
                }
            }
            best
        } else {
            let mut best = MAX_SCORE;
            for mv in moves {
                let next = apply_move(board, mv, to_move);
                let score = self.alphabeta(&next, to_move.opponent(), root, depth - 1, alpha, beta);
                best = best.min(score);
                beta = beta.min(best);
                if beta <= alpha {
                    break;
                }
            }
            best
        }
    }
}
