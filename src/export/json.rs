//! JSON import/export module for flashcard decks.
//! Provides functionality to save and load Deck structures to/from JSON files.

use crate::error::Result;
use crate::models::Deck;
use std::fs;
use std::path::Path;

/// Exports a deck to a JSON file at the specified path.
/// Returns an error if file creation or writing fails.
pub fn export_json_to_path(deck: &Deck, path: impl AsRef<Path>) -> Result<()> {
    let json_string = serde_json::to_string_pretty(deck)?;
    fs::write(path.as_ref(), json_string)?;
    log::debug!("Deck '{}' exported to {:?}", deck.title, path.as_ref());
    Ok(())
}

/// Imports a deck from a JSON file.
/// Returns an error if the file doesn't exist or contains invalid JSON.
pub fn import_json(path: impl AsRef<Path>) -> Result<Deck> {
    let contents = fs::read_to_string(path.as_ref())?;

    // Deserialize JSON string into Deck structure
    let deck: Deck = serde_json::from_str(&contents)?;

    log::debug!("Deck '{}' imported from {:?}", deck.title, path.as_ref());
    Ok(deck)
}
