use crate::types::{BOARD_SIZE, Cell, NUM_SQUARES, Player, Position};

/// Othello board state represented by two bitboards.
///
/// Bit `row * 8 + col` is set in `black` or `white` when that color occupies
/// the square; a square is never set in both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    black: u64,
    white: u64,
}

impl Board {
    /// Creates a board with no stones on it.
    pub const fn empty() -> Self {
        Self { black: 0, white: 0 }
    }

    /// Creates the standard opening position:
    /// white at (3,3) and (4,4), black at (3,4) and (4,3).
    pub fn new() -> Self {
        Self {
            black: bit(Position::new(3, 4)) | bit(Position::new(4, 3)),
            white: bit(Position::new(3, 3)) | bit(Position::new(4, 4)),
        }
    }

    pub fn from_bitboards(black: u64, white: u64) -> Self {
        debug_assert_eq!(black & white, 0, "a square cannot hold two stones");
        Self { black, white }
    }

    pub fn cell(&self, pos: Position) -> Cell {
        let square = bit(pos);
        if (self.black & square) != 0 {
            Cell::Stone(Player::Black)
        } else if (self.white & square) != 0 {
            Cell::Stone(Player::White)
        } else {
            Cell::Empty
        }
    }

    pub fn is_empty_at(&self, pos: Position) -> bool {
        (self.occupied() & bit(pos)) == 0
    }

    /// Bitboard of the given color's stones.
    pub fn stones(&self, player: Player) -> u64 {
        match player {
            Player::Black => self.black,
            Player::White => self.white,
        }
    }

    pub fn occupied(&self) -> u64 {
        self.black | self.white
    }

    /// Returns `(black_count, white_count)`.
    pub fn count(&self) -> (u8, u8) {
        (self.black.count_ones() as u8, self.white.count_ones() as u8)
    }

    pub fn count_of(&self, player: Player) -> u8 {
        self.stones(player).count_ones() as u8
    }

    /// Returns the number of empty squares.
    pub fn empty_count(&self) -> u8 {
        let (black_count, white_count) = self.count();
        NUM_SQUARES as u8 - black_count - white_count
    }

    /// Converts board to `[u8; 64]` where 0=empty, 1=black, 2=white.
    pub fn to_array(&self) -> [u8; NUM_SQUARES] {
        let mut board = [0u8; NUM_SQUARES];
        for (index, cell) in board.iter_mut().enumerate() {
            *cell = self.cell(Position::from_index(index)).code();
        }
        board
    }

    /// Drops a `player` stone on `pos` and turns every square in `flips` to
    /// `player`. Rule checking is the caller's job.
    pub(crate) fn put(&mut self, pos: Position, flips: u64, player: Player) {
        debug_assert!(self.is_empty_at(pos), "cannot place on an occupied square");
        let gained = bit(pos) | flips;
        match player {
            Player::Black => {
                self.black |= gained;
                self.white &= !gained;
            }
            Player::White => {
                self.white |= gained;
                self.black &= !gained;
            }
        }
    }

    /// Parses an 8-line diagram: `B` black, `W` white, anything else empty.
    #[cfg(test)]
    pub(crate) fn from_rows(rows: [&str; BOARD_SIZE]) -> Self {
        let mut board = Self::empty();
        for (row, line) in rows.iter().enumerate() {
            for (col, ch) in line.chars().take(BOARD_SIZE).enumerate() {
                let square = bit(Position::new(row as u8, col as u8));
                match ch {
                    'B' => board.black |= square,
                    'W' => board.white |= square,
                    _ => {}
                }
            }
        }
        board
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn bit(pos: Position) -> u64 {
    1u64 << pos.index()
}

/// Iterates the squares set in `mask` in row-major order.
pub(crate) fn positions(mask: u64) -> impl Iterator<Item = Position> {
    let mut bits = mask;
    std::iter::from_fn(move || {
        if bits == 0 {
            return None;
        }
        let index = bits.trailing_zeros() as usize;
        bits &= bits - 1;
        Some(Position::from_index(index))
    })
}

pub(crate) fn in_bounds(row: i32, col: i32) -> bool {
    (0..BOARD_SIZE as i32).contains(&row) && (0..BOARD_SIZE as i32).contains(&col)
}
