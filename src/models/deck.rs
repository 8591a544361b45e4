//! Deck is a titled set of cards
use super::Card;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub cards: Vec<Card>,
}

impl Deck {
    pub fn new(id: String, title: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into(),
            created_at,
            cards: Vec::new(),
        }
    }

    pub fn find_card(&self, card_id: &str) -> Option<&Card> {
        self.cards.iter().find(|card| card.id == card_id)
    }

    /// "1 card", "3 cards", as shown next to the deck title.
    pub fn card_count_label(&self) -> String {
        match self.cards.len() {
            1 => "1 card".to_string(),
            n => format!("{} cards", n),
        }
    }
}
