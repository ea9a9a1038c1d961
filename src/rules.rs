use crate::board::{Board, bit, in_bounds, positions};
use crate::types::{BOARD_SIZE, Cell, Player, Position};

/// The eight scan directions as `(d_row, d_col)`, in scan order.
pub const DIRECTIONS: [(i32, i32); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

/// Opponent stones bracketed along one direction, or 0 when that ray does
/// not end in a `player` stone after at least one opponent stone.
fn ray_flips(board: &Board, pos: Position, player: Player, (dr, dc): (i32, i32)) -> u64 {
    let me = board.stones(player);
    let opp = board.stones(player.opponent());

    let mut r = pos.row as i32 + dr;
    let mut c = pos.col as i32 + dc;
    let mut line = 0u64;

    while in_bounds(r, c) {
        let square = 1u64 << (r as usize * BOARD_SIZE + c as usize);
        if (opp & square) != 0 {
            line |= square;
        } else if (me & square) != 0 {
            return line;
        } else {
            return 0;
        }
        r += dr;
        c += dc;
    }

    0
}

/// Mask of every stone a move at `pos` would flip. Zero for occupied squares
/// and for moves that bracket nothing.
pub fn flips(board: &Board, pos: Position, player: Player) -> u64 {
    if !board.is_empty_at(pos) {
        return 0;
    }
    DIRECTIONS
        .iter()
        .fold(0u64, |acc, &dir| acc | ray_flips(board, pos, player, dir))
}

pub fn is_legal_move(board: &Board, pos: Position, player: Player) -> bool {
    board.is_empty_at(pos)
        && DIRECTIONS
            .iter()
            .any(|&dir| ray_flips(board, pos, player, dir) != 0)
}

/// Number of opponent stones a move at `pos` would flip, without touching
/// the board.
pub fn flipped_count(board: &Board, pos: Position, player: Player) -> u32 {
    flips(board, pos, player).count_ones()
}

/// Places a stone and flips captured stones in place.
/// Returns flipped bit mask. Returns 0 and leaves the board untouched when the
/// move is illegal.
pub fn place(board: &mut Board, pos: Position, player: Player) -> u64 {
    let flipped = flips(board, pos, player);
    if flipped != 0 {
        board.put(pos, flipped, player);
    }
    flipped
}

/// Returns the board after `player` moves at `pos`.
///
/// Caller contract: the move is legal (see [`is_legal_move`]).
pub fn apply_move(board: &Board, pos: Position, player: Player) -> Board {
    debug_assert!(
        is_legal_move(board, pos, player),
        "apply_move called with illegal move {pos}"
    );
    let mut next = *board;
    place(&mut next, pos, player);
    next
}

/// Returns legal move mask for the given side.
pub fn legal_move_mask(board: &Board, player: Player) -> u64 {
    (0..BOARD_SIZE * BOARD_SIZE)
        .map(Position::from_index)
        .filter(|&pos| is_legal_move(board, pos, player))
        .fold(0u64, |acc, pos| acc | bit(pos))
}

/// Legal moves for `player` in row-major order.
pub fn legal_moves(board: &Board, player: Player) -> Vec<Position> {
    positions(legal_move_mask(board, player)).collect()
}

pub fn has_any_legal_move(board: &Board, player: Player) -> bool {
    (0..BOARD_SIZE * BOARD_SIZE)
        .map(Position::from_index)
        .any(|pos| is_legal_move(board, pos, player))
}

/// `true` when neither side can move.
pub fn is_terminal(board: &Board) -> bool {
    !has_any_legal_move(board, Player::Black) && !has_any_legal_move(board, Player::White)
}

/// The color owning `pos`, if any.
pub fn owner(board: &Board, pos: Position) -> Option<Player> {
    match board.cell(pos) {
        Cell::Stone(player) => Some(player),
        Cell::Empty => None,
    }
}
