pub mod ai;
pub mod api;
pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod rules;
pub mod types;

pub use board::Board;
pub use config::EngineConfig;
pub use error::GameError;
pub use game::{GameSession, Phase, SessionObserver};
pub use types::{Difficulty, GameResult, GameState, Player, Position};
