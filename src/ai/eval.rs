use serde::Deserialize;

use crate::board::{Board, bit, in_bounds, positions};
use crate::rules::{DIRECTIONS, legal_move_mask};
use crate::types::{BOARD_SIZE, Player, Position};

const CORNERS: [Position; 4] = [
    Position { row: 0, col: 0 },
    Position { row: 0, col: 7 },
    Position { row: 7, col: 0 },
    Position { row: 7, col: 7 },
];

/// Feature weights of the positional evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EvalWeights {
    pub stone: i32,
    pub corner: i32,
    pub stable: i32,
    pub mobility: i32,
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            stone: 1,
            corner: 50,
            stable: 10,
            mobility: 5,
        }
    }
}

/// Static evaluation of a position. Scores are from the given player's
/// point of view and zero-sum between the two colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluator {
    /// Own stones minus opponent stones.
    StoneDifferential,
    /// Weighted stones, corners, stable stones and mobility.
    Positional(EvalWeights),
}

impl Evaluator {
    pub fn evaluate(&self, board: &Board, player: Player) -> i32 {
        match self {
            Self::StoneDifferential => stone_differential(board, player),
            Self::Positional(weights) => positional(board, player, weights),
        }
    }
}

fn positional(board: &Board, player: Player, weights: &EvalWeights) -> i32 {
    stone_differential(board, player) * weights.stone
        + corner_differential(board, player) * weights.corner
        + stable_differential(board, player) * weights.stable
        + mobility_differential(board, player) * weights.mobility
}

fn differential(player: Player, count: impl Fn(Player) -> i32) -> i32 {
    count(player) - count(player.opponent())
}

fn stone_differential(board: &Board, player: Player) -> i32 {
    differential(player, |side| board.count_of(side) as i32)
}

fn corner_differential(board: &Board, player: Player) -> i32 {
    let corners = CORNERS.iter().fold(0u64, |acc, &pos| acc | bit(pos));
    differential(player, |side| (board.stones(side) & corners).count_ones() as i32)
}

fn stable_differential(board: &Board, player: Player) -> i32 {
    differential(player, |side| {
        positions(board.stones(side))
            .filter(|&pos| is_stable(board, pos))
            .count() as i32
    })
}

fn mobility_differential(board: &Board, player: Player) -> i32 {
    differential(player, |side| legal_move_mask(board, side).count_ones() as i32)
}

/// Conservative stability test: a corner, or a square whose eight neighbors
/// are all either off the board or occupied. Edge runs are not analysed.
pub fn is_stable(board: &Board, pos: Position) -> bool {
    if CORNERS.contains(&pos) {
        return true;
    }
    let occupied = board.occupied();
    DIRECTIONS.iter().all(|&(dr, dc)| {
        let r = pos.row as i32 + dr;
        let c = pos.col as i32 + dc;
        !in_bounds(r, c) || (occupied & (1u64 << (r as usize * BOARD_SIZE + c as usize))) != 0
    })
}
