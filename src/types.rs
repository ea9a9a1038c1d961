use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

pub const BOARD_SIZE: usize = 8;
pub const NUM_SQUARES: usize = BOARD_SIZE * BOARD_SIZE;

/// Wire code for an empty cell in [`GameState::board`].
pub const CELL_EMPTY: u8 = 0;
pub const PLAYER_BLACK: u8 = 1;
pub const PLAYER_WHITE: u8 = 2;

/// One of the two sides. Black always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    Black,
    White,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Self::Black => Self::White,
            Self::White => Self::Black,
        }
    }

    /// Wire code used by the browser page (1 = black, 2 = white).
    pub fn code(self) -> u8 {
        match self {
            Self::Black => PLAYER_BLACK,
            Self::White => PLAYER_WHITE,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Black => "Black",
            Self::White => "White",
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Player {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "black" => Ok(Self::Black),
            "white" => Ok(Self::White),
            _ => Err(GameError::UnknownColor(s.to_string())),
        }
    }
}

/// Content of a single board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Stone(Player),
}

impl Cell {
    pub fn code(self) -> u8 {
        match self {
            Self::Empty => CELL_EMPTY,
            Self::Stone(player) => player.code(),
        }
    }
}

/// A board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    /// Builds a coordinate that callers already know is on the board.
    pub const fn new(row: u8, col: u8) -> Self {
        debug_assert!((row as usize) < BOARD_SIZE && (col as usize) < BOARD_SIZE);
        Self { row, col }
    }

    /// Validates raw input coming from outside the core.
    pub fn try_new(row: u8, col: u8) -> Result<Self, GameError> {
        if (row as usize) >= BOARD_SIZE || (col as usize) >= BOARD_SIZE {
            return Err(GameError::OutOfRange { row, col });
        }
        Ok(Self { row, col })
    }

    pub fn from_index(index: usize) -> Self {
        debug_assert!(index < NUM_SQUARES);
        Self {
            row: (index / BOARD_SIZE) as u8,
            col: (index % BOARD_SIZE) as u8,
        }
    }

    /// Row-major square index (0..=63).
    pub fn index(self) -> usize {
        self.row as usize * BOARD_SIZE + self.col as usize
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Strength tiers offered by the difficulty selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Random pick among the few moves that flip the fewest stones.
    #[default]
    Beginner,
    /// Uniform random legal move.
    Random,
    /// Move flipping the most stones right now.
    Intermediate,
    /// Depth-limited alpha-beta search.
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Beginner,
        Difficulty::Random,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Random => "random",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl FromStr for Difficulty {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GameError::UnknownDifficulty(s.to_string()))
    }
}

/// A short beep the page plays as stone feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SoundCue {
    pub frequency_hz: u32,
    pub duration_ms: u32,
}

impl SoundCue {
    pub const PLACE: Self = Self {
        frequency_hz: 800,
        duration_ms: 100,
    };
    pub const FLIP: Self = Self {
        frequency_hz: 400,
        duration_ms: 200,
    };
}

/// Public game state returned from WASM APIs and handed to the render callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameState {
    /// Row-major cells: 0 = empty, 1 = black, 2 = white.
    pub board: Vec<u8>,
    pub current_player: u8,
    pub human_player: u8,
    pub difficulty: Difficulty,
    pub black_count: u8,
    pub white_count: u8,
    pub is_game_over: bool,
    /// Contract:
    /// - `true` when the side that was due to move had to pass.
    /// - `false` after a normal move or a reset.
    pub is_pass: bool,
    /// Contract:
    /// - Normal move: list of flipped positions (0..=63), kept when that
    ///   move forces the opponent to pass.
    /// - Reset or a pass with no move before it: empty list.
    pub flipped: Vec<u8>,
    pub last_move: Option<Position>,
    /// `true` while the host should schedule a computer turn.
    pub awaiting_computer: bool,
    pub message: String,
    /// Beeps produced by the last action; empty when sound is off.
    pub sounds: Vec<SoundCue>,
}

/// Final result after game over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameResult {
    /// 0 on a draw, otherwise the winner's player code.
    pub winner: u8,
    pub black_count: u8,
    pub white_count: u8,
}

impl GameResult {
    pub fn from_counts(black_count: u8, white_count: u8) -> Self {
        let winner = if black_count > white_count {
            PLAYER_BLACK
        } else if white_count > black_count {
            PLAYER_WHITE
        } else {
            CELL_EMPTY
        };
        Self {
            winner,
            black_count,
            white_count,
        }
    }

    pub fn winner(&self) -> Option<Player> {
        match self.winner {
            PLAYER_BLACK => Some(Player::Black),
            PLAYER_WHITE => Some(Player::White),
            _ => None,
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Game over! Black: {} White: {} - ",
            self.black_count, self.white_count
        )?;
        match self.winner() {
            Some(player) => write!(f, "{player} wins"),
            None => f.write_str("Draw"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_parses_selector_values() {
        assert_eq!("beginner".parse::<Difficulty>().unwrap(), Difficulty::Beginner);
        assert_eq!("Advanced".parse::<Difficulty>().unwrap(), Difficulty::Advanced);
        assert!(matches!(
            "grandmaster".parse::<Difficulty>(),
            Err(GameError::UnknownDifficulty(_))
        ));
    }

    #[test]
    fn position_rejects_out_of_range_input() {
        assert_eq!(Position::try_new(7, 7).unwrap().index(), 63);
        assert!(matches!(
            Position::try_new(8, 0),
            Err(GameError::OutOfRange { row: 8, col: 0 })
        ));
    }

    #[test]
    fn result_message_names_winner_or_draw() {
        assert_eq!(
            GameResult::from_counts(40, 24).to_string(),
            "Game over! Black: 40 White: 24 - Black wins"
        );
        assert_eq!(
            GameResult::from_counts(32, 32).to_string(),
            "Game over! Black: 32 White: 32 - Draw"
        );
        assert_eq!(GameResult::from_counts(10, 54).winner(), Some(Player::White));
    }
}
