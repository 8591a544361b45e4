pub mod card;
pub mod deck;
pub mod deck_store;
pub mod id;
pub mod quiz_session;

pub use card::Card;
pub use deck::Deck;
pub use deck_store::{DEFAULT_STORAGE_KEY, DeckStore, normalize_input};
pub use quiz_session::{QuizPhase, QuizSession, Score};
