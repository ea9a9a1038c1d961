pub mod eval;
pub mod search;

use rand::RngCore;

use crate::board::Board;
use crate::config::EngineConfig;
use crate::types::{Difficulty, Player, Position};

use self::search::{
    AlphaBetaSelector, GreedySelector, MoveSelector, RandomSelector, WeakestSelector,
};

/// Builds the move picker for a difficulty tier from the current config.
pub fn selector_for(difficulty: Difficulty, config: &EngineConfig) -> Box<dyn MoveSelector> {
    match difficulty {
        Difficulty::Beginner => Box::new(WeakestSelector {
            pool: config.weakest_pool,
        }),
        Difficulty::Random => Box::new(RandomSelector),
        Difficulty::Intermediate => Box::new(GreedySelector),
        Difficulty::Advanced => Box::new(AlphaBetaSelector {
            evaluator: config.advanced_evaluator(),
            depth: config.advanced_depth,
        }),
    }
}

/// Picks the computer's move, or `None` when `player` has to pass.
pub fn choose_move(
    board: &Board,
    player: Player,
    difficulty: Difficulty,
    config: &EngineConfig,
    rng: &mut dyn RngCore,
) -> Option<Position> {
    selector_for(difficulty, config).select_move(board, player, rng)
}
