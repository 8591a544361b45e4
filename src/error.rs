//! Error types shared across the crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Deck not found: {0}")]
    DeckNotFound(String),

    #[error("Card not found: {0}")]
    CardNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Decks have not been loaded; refusing to overwrite stored data")]
    NotLoaded,

    #[error("Could not find local data directory")]
    DataDirNotFound,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a quiz cannot be started.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizError {
    #[error("Not enough cards: add cards to this deck before taking a quiz")]
    InsufficientCards,
}
