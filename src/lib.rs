pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod models;

pub use error::{Error, QuizError, Result};
pub use models::{Card, Deck, DeckStore, QuizSession, Score};
