use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Unknown difficulty")]
    UnknownDifficulty,
    #[error("Card id is not part of the current deck")]
    InvalidCard,
    #[error("Symbol pool is smaller than the requested pair count")]
    InsufficientSymbols,
    #[error("Grid size must hold exactly two cards per pair")]
    InvalidConfig,
    #[error("Deck does not contain every symbol exactly twice")]
    InvalidDeck,
}

pub type Result<T> = core::result::Result<T, GameError>;

/// Failures of the best-score persistence layer, never fatal to a round.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage is not available")]
    Unavailable,
    #[error("Stored score is not a valid number")]
    Corrupt,
}
