use thiserror::Error;

/// Integration errors raised at the boundary between the page and the core.
///
/// Illegal moves are not errors: the session ignores them.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("row/col out of range: ({row}, {col})")]
    OutOfRange { row: u8, col: u8 },

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),

    #[error("unknown player color: {0}")]
    UnknownColor(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("failed to decode config: {0}")]
    Config(String),

    #[error("game session is unavailable")]
    SessionUnavailable,
}
