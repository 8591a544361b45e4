//! Self-graded quiz over a deck's cards.
//! Handles shuffling, progression through the cards and scoring.

use super::{Card, DeckStore};
use crate::database::KeyValueStore;
use crate::error::QuizError;
use rand::Rng;
use rand::seq::SliceRandom;

/// Final result of a finished quiz.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
    /// `correct / total` as a whole percentage, rounded half up.
    pub percentage: u32,
}

impl Score {
    fn new(correct: usize, total: usize) -> Self {
        // round(100 * correct / total) without going through floats
        let percentage = (200 * correct + total) / (2 * total);
        Self {
            correct,
            total,
            percentage: percentage as u32,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizPhase {
    /// Showing the question of the current card
    Question,
    /// Current card has been flipped to its answer
    Answer,
    Finished,
}

/// One pass over a fixed working order of cards.
/// The order is settled when the session starts and reused by `restart`.
#[derive(Clone, Debug)]
pub struct QuizSession {
    cards: Vec<Card>,
    position: usize,
    correct_count: usize,
    is_revealed: bool,
}

impl QuizSession {
    /// Starts a quiz over `cards`, shuffling them first when asked.
    /// Refuses to start without any cards.
    pub fn start<R: Rng + ?Sized>(
        mut cards: Vec<Card>,
        shuffle: bool,
        rng: &mut R,
    ) -> Result<Self, QuizError> {
        if cards.is_empty() {
            return Err(QuizError::InsufficientCards);
        }

        // Fisher-Yates: walks from the last index down, swapping with 0..=i
        if shuffle {
            cards.shuffle(rng);
        }
        log::debug!("Starting quiz over {} cards (shuffle: {shuffle})", cards.len());

        Ok(Self {
            cards,
            position: 0,
            correct_count: 0,
            is_revealed: false,
        })
    }

    /// Starts a quiz over a stored deck. A missing deck is treated like an
    /// empty one.
    pub fn for_deck<S, G, R>(
        store: &DeckStore<S, G>,
        deck_id: &str,
        shuffle: bool,
        rng: &mut R,
    ) -> Result<Self, QuizError>
    where
        S: KeyValueStore,
        G: Rng,
        R: Rng + ?Sized,
    {
        let cards = store
            .find_by_id(deck_id)
            .map(|deck| deck.cards.clone())
            .unwrap_or_default();
        Self::start(cards, shuffle, rng)
    }

    /// The working order of this session.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn current_card(&self) -> Option<&Card> {
        self.cards.get(self.position)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    pub fn total_count(&self) -> usize {
        self.cards.len()
    }

    pub fn is_revealed(&self) -> bool {
        self.is_revealed
    }

    pub fn toggle_reveal(&mut self) {
        if !self.is_finished() {
            self.is_revealed = !self.is_revealed;
        }
    }

    pub fn reveal(&mut self) {
        if !self.is_finished() {
            self.is_revealed = true;
        }
    }

    /// Records the user's own verdict on the current card and moves on.
    pub fn answer(&mut self, is_correct: bool) {
        if self.is_finished() {
            log::debug!("Answer ignored, quiz already finished");
            return;
        }

        if is_correct {
            self.correct_count += 1;
        }
        self.is_revealed = false;
        self.position += 1;
    }

    pub fn is_finished(&self) -> bool {
        self.position >= self.cards.len()
    }

    pub fn phase(&self) -> QuizPhase {
        if self.is_finished() {
            QuizPhase::Finished
        } else if self.is_revealed {
            QuizPhase::Answer
        } else {
            QuizPhase::Question
        }
    }

    /// (1-based number of the current card, total cards), while in progress.
    pub fn progress(&self) -> Option<(usize, usize)> {
        if self.is_finished() {
            None
        } else {
            Some((self.position + 1, self.cards.len()))
        }
    }

    pub fn score(&self) -> Option<Score> {
        if self.is_finished() {
            Some(Score::new(self.correct_count, self.cards.len()))
        } else {
            None
        }
    }

    /// Goes back to the first card, keeping the same working order.
    pub fn restart(&mut self) {
        self.position = 0;
        self.correct_count = 0;
        self.is_revealed = false;
    }
}
