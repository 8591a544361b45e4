//! Container for all available decks
//!
//! The store owns the authoritative deck collection. Every mutation updates the
//! in-memory collection first and then writes the whole collection back to the
//! key-value backend as one JSON array. A failed write is logged and remembered
//! as unsaved changes rather than returned to the caller; `flush` retries it.

use super::id::generate_id;
use super::{Card, Deck};
use crate::database::KeyValueStore;
use crate::error::{Error, Result};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const DEFAULT_STORAGE_KEY: &str = "flashcards.decks";

type Subscriber = Box<dyn FnMut(&[Deck])>;

pub struct DeckStore<S, R = StdRng> {
    backend: S,
    rng: R,
    storage_key: String,
    decks: Vec<Deck>,
    loaded: bool,
    unsaved: bool,
    subscribers: Vec<Subscriber>,
}

impl<S: KeyValueStore> DeckStore<S, StdRng> {
    pub fn new(backend: S) -> Self {
        Self::with_rng(backend, StdRng::from_entropy())
    }
}

impl<S: KeyValueStore, R: Rng> DeckStore<S, R> {
    /// Creates an empty, not yet loaded store drawing ids from `rng`.
    pub fn with_rng(backend: S, rng: R) -> Self {
        Self {
            backend,
            rng,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            decks: Vec::new(),
            loaded: false,
            unsaved: false,
            subscribers: Vec::new(),
        }
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Restores the collection from the backend.
    ///
    /// Missing or malformed data results in an empty collection. A failed read
    /// is returned and leaves the store unloaded, so nothing is written over
    /// the stored decks.
    pub fn load(&mut self) -> Result<()> {
        let raw = self.backend.get(&self.storage_key)?;
        self.decks = match raw {
            Some(raw) => match serde_json::from_str::<Vec<Deck>>(&raw) {
                Ok(decks) => decks,
                Err(e) => {
                    log::warn!("Stored decks are malformed, starting empty: {e}");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        self.loaded = true;
        self.unsaved = false;
        log::debug!("Loaded {} decks", self.decks.len());
        self.notify();
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// All decks, most recently created first.
    pub fn decks(&self) -> &[Deck] {
        &self.decks
    }

    pub fn find_by_id(&self, deck_id: &str) -> Option<&Deck> {
        self.decks.iter().find(|deck| deck.id == deck_id)
    }

    pub fn create_deck(&mut self, title: &str) -> Deck {
        let now = Utc::now();
        let deck = Deck::new(generate_id(now, &mut self.rng), title, now);
        log::debug!("Creating deck {} ({:?})", deck.id, deck.title);

        self.decks.insert(0, deck.clone());
        self.persist();
        deck
    }

    /// Appends a card to the deck. Returns the updated deck, or `None` when no
    /// deck has that id.
    pub fn add_card(&mut self, deck_id: &str, question: &str, answer: &str) -> Option<Deck> {
        let card_id = generate_id(Utc::now(), &mut self.rng);
        let deck = self.decks.iter_mut().find(|deck| deck.id == deck_id)?;

        deck.cards.push(Card::new(card_id, question, answer));
        let updated = deck.clone();
        log::debug!("Added card to deck {deck_id}, now {}", updated.card_count_label());

        self.persist();
        Some(updated)
    }

    pub fn delete_deck(&mut self, deck_id: &str) {
        let before = self.decks.len();
        self.decks.retain(|deck| deck.id != deck_id);

        if self.decks.len() != before {
            log::debug!("Deleted deck {deck_id}");
            self.persist();
        }
    }

    pub fn delete_card(&mut self, deck_id: &str, card_id: &str) {
        let Some(deck) = self.decks.iter_mut().find(|deck| deck.id == deck_id) else {
            return;
        };

        let before = deck.cards.len();
        deck.cards.retain(|card| card.id != card_id);

        if deck.cards.len() != before {
            log::debug!("Deleted card {card_id} from deck {deck_id}");
            self.persist();
        }
    }

    /// Stores a deck that came from outside the store, such as an imported
    /// file. The deck and its cards get fresh ids so they cannot collide with
    /// existing ones.
    pub fn import_deck(&mut self, mut deck: Deck) -> Deck {
        let now = Utc::now();
        deck.id = generate_id(now, &mut self.rng);
        for card in &mut deck.cards {
            card.id = generate_id(now, &mut self.rng);
        }
        log::debug!("Importing deck {:?} with {} cards", deck.title, deck.cards.len());

        self.decks.insert(0, deck.clone());
        self.persist();
        deck
    }

    /// Registers a callback run with the full collection after `load` and
    /// after every mutation that changed something.
    pub fn subscribe(&mut self, callback: impl FnMut(&[Deck]) + 'static) {
        self.subscribers.push(Box::new(callback));
    }

    /// True when the last write to the backend failed and nothing has been
    /// written successfully since.
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    /// Writes the whole collection now, surfacing any backend error.
    pub fn flush(&mut self) -> Result<()> {
        self.write_all()
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    fn persist(&mut self) {
        if let Err(e) = self.write_all() {
            log::warn!("Failed to save decks, keeping changes in memory: {e}");
        }
        self.notify();
    }

    fn write_all(&mut self) -> Result<()> {
        if !self.loaded {
            self.unsaved = true;
            return Err(Error::NotLoaded);
        }
        let json = serde_json::to_string(&self.decks)?;
        // Flagged before the write so a failure leaves it set.
        self.unsaved = true;
        self.backend.set(&self.storage_key, &json)?;
        self.unsaved = false;
        Ok(())
    }

    fn notify(&mut self) {
        for subscriber in self.subscribers.iter_mut() {
            subscriber(&self.decks);
        }
    }
}

/// Trims user input, rejecting blank strings.
pub fn normalize_input(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use std::cell::RefCell;
    use std::collections::BTreeSet;
    use std::rc::Rc;

    fn new_store() -> DeckStore<MemoryStore, StdRng> {
        let mut store = DeckStore::with_rng(MemoryStore::new(), StdRng::seed_from_u64(1));
        store.load().unwrap();
        store
    }

    /// Every deck id and (deck id, card id) pair in the collection.
    fn ids(decks: &[Deck]) -> BTreeSet<(String, Option<String>)> {
        let mut ids = BTreeSet::new();
        for deck in decks {
            ids.insert((deck.id.clone(), None));
            for card in &deck.cards {
                ids.insert((deck.id.clone(), Some(card.id.clone())));
            }
        }
        ids
    }

    fn reload(store: &DeckStore<MemoryStore, StdRng>) -> Vec<Deck> {
        let mut reloaded =
            DeckStore::with_rng(store.backend().clone(), StdRng::seed_from_u64(99));
        reloaded.load().unwrap();
        reloaded.decks().to_vec()
    }

    /// Backend whose reads and writes can be switched off.
    struct FlakyStore {
        inner: MemoryStore,
        failing: bool,
        failing_reads: bool,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            if self.failing_reads {
                return Err(Error::Io(std::io::Error::other("database is locked")));
            }
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<()> {
            if self.failing {
                return Err(Error::Io(std::io::Error::other("disk full")));
            }
            self.inner.set(key, value)
        }
    }

    #[test]
    fn test_load_without_data_is_empty() {
        let mut store = DeckStore::with_rng(MemoryStore::new(), StdRng::seed_from_u64(1));
        assert!(!store.is_loaded());

        store.load().unwrap();
        assert!(store.is_loaded());
        assert!(store.decks().is_empty());
    }

    #[test]
    fn test_load_malformed_json_is_empty() {
        let backend = MemoryStore::with_entry(DEFAULT_STORAGE_KEY, "{ this is not valid json }");
        let mut store = DeckStore::with_rng(backend, StdRng::seed_from_u64(1));
        store.load().unwrap();

        assert!(store.decks().is_empty());
    }

    #[test]
    fn test_load_non_array_is_empty() {
        let backend = MemoryStore::with_entry(DEFAULT_STORAGE_KEY, r#"{"id":"1","title":"x"}"#);
        let mut store = DeckStore::with_rng(backend, StdRng::seed_from_u64(1));
        store.load().unwrap();

        assert!(store.decks().is_empty());
    }

    #[test]
    fn test_load_reads_stored_collection() {
        let json = r#"[{"id":"1-a","title":"Biology","createdAt":"2024-05-01T12:00:00Z",
            "cards":[{"id":"2-b","question":"q","answer":"a"}]}]"#;
        let backend = MemoryStore::with_entry(DEFAULT_STORAGE_KEY, json);
        let mut store = DeckStore::with_rng(backend, StdRng::seed_from_u64(1));
        store.load().unwrap();

        let deck = store.find_by_id("1-a").unwrap();
        assert_eq!(deck.title, "Biology");
        assert_eq!(deck.find_card("2-b").unwrap().answer, "a");
    }

    #[test]
    fn test_custom_storage_key() {
        let mut store = DeckStore::with_rng(MemoryStore::new(), StdRng::seed_from_u64(1))
            .with_storage_key("other.key");
        store.load().unwrap();
        store.create_deck("Chemistry");

        assert!(store.backend().get("other.key").unwrap().is_some());
        assert!(store.backend().get(DEFAULT_STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_create_deck_newest_first() {
        let mut store = new_store();
        let first = store.create_deck("First");
        let second = store.create_deck("Second");
        let third = store.create_deck("Third");

        let order: Vec<&str> = store.decks().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(order, vec![third.id.as_str(), second.id.as_str(), first.id.as_str()]);
        assert!(third.cards.is_empty());
    }

    #[test]
    fn test_add_card_appends_in_order() {
        let mut store = new_store();
        let deck = store.create_deck("Biology");

        store.add_card(&deck.id, "Q1", "A1").unwrap();
        let updated = store.add_card(&deck.id, "Q2", "A2").unwrap();

        let questions: Vec<&str> = updated.cards.iter().map(|c| c.question.as_str()).collect();
        assert_eq!(questions, vec!["Q1", "Q2"]);
        assert_eq!(store.find_by_id(&deck.id), Some(&updated));
        assert_ne!(updated.cards[0].id, updated.cards[1].id);
    }

    #[test]
    fn test_add_card_missing_deck_is_noop() {
        let mut store = new_store();
        store.create_deck("Biology");
        let before = store.decks().to_vec();
        let stored_before = store.backend().get(DEFAULT_STORAGE_KEY).unwrap();

        assert!(store.add_card("missing", "q", "a").is_none());
        assert_eq!(store.decks(), before.as_slice());
        assert_eq!(store.backend().get(DEFAULT_STORAGE_KEY).unwrap(), stored_before);
    }

    #[test]
    fn test_delete_missing_ids_are_noops() {
        let mut store = new_store();
        let deck = store.create_deck("Biology");
        store.add_card(&deck.id, "q", "a");
        let before = store.decks().to_vec();

        store.delete_deck("missing");
        store.delete_card("missing", "also-missing");
        store.delete_card(&deck.id, "also-missing");

        assert_eq!(store.decks(), before.as_slice());
    }

    #[test]
    fn test_delete_deck_removes_cards() {
        let mut store = new_store();
        let keep = store.create_deck("Keep");
        let doomed = store.create_deck("Doomed");
        store.add_card(&doomed.id, "q", "a");

        store.delete_deck(&doomed.id);

        assert!(store.find_by_id(&doomed.id).is_none());
        assert!(store.find_by_id(&keep.id).is_some());
        assert_eq!(ids(&reload(&store)), ids(store.decks()));
    }

    #[test]
    fn test_delete_card_preserves_others() {
        let mut store = new_store();
        let deck = store.create_deck("Biology");
        store.add_card(&deck.id, "Q1", "A1");
        store.add_card(&deck.id, "Q2", "A2");
        let deck = store.add_card(&deck.id, "Q3", "A3").unwrap();

        store.delete_card(&deck.id, &deck.cards[1].id);

        let questions: Vec<String> = store
            .find_by_id(&deck.id)
            .unwrap()
            .cards
            .iter()
            .map(|c| c.question.clone())
            .collect();
        assert_eq!(questions, vec!["Q1", "Q3"]);
    }

    #[test]
    fn test_round_trip_after_mixed_operations() {
        let mut store = new_store();
        let mut rng = StdRng::seed_from_u64(2024);

        for step in 0..200 {
            let decks = store.decks().to_vec();
            match rng.gen_range(0..5) {
                0 => {
                    store.create_deck(&format!("Deck {step}"));
                }
                1 | 2 if !decks.is_empty() => {
                    let deck = &decks[rng.gen_range(0..decks.len())];
                    store.add_card(&deck.id, &format!("Q{step}"), &format!("A{step}"));
                }
                3 if !decks.is_empty() => {
                    let deck = &decks[rng.gen_range(0..decks.len())];
                    if !deck.cards.is_empty() {
                        let card = &deck.cards[rng.gen_range(0..deck.cards.len())];
                        store.delete_card(&deck.id, &card.id);
                    }
                }
                4 if !decks.is_empty() && rng.gen_bool(0.3) => {
                    let deck = &decks[rng.gen_range(0..decks.len())];
                    store.delete_deck(&deck.id);
                }
                _ => {
                    store.delete_deck("missing");
                }
            }

            let reloaded = reload(&store);
            assert_eq!(ids(&reloaded), ids(store.decks()));
        }

        assert_eq!(reload(&store), store.decks().to_vec());
    }

    #[test]
    fn test_import_deck_assigns_fresh_ids() {
        let mut store = new_store();
        let existing = store.create_deck("Existing");
        let existing = store.add_card(&existing.id, "q", "a").unwrap();

        // Same ids as a deck already in the store
        let imported = store.import_deck(existing.clone());

        assert_ne!(imported.id, existing.id);
        assert_ne!(imported.cards[0].id, existing.cards[0].id);
        assert_eq!(imported.cards[0].question, "q");
        assert_eq!(store.decks()[0].id, imported.id);
        assert_eq!(store.decks().len(), 2);
    }

    #[test]
    fn test_subscribers_see_changes() {
        let mut store = DeckStore::with_rng(MemoryStore::new(), StdRng::seed_from_u64(1));
        let seen: Rc<RefCell<Vec<usize>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        store.subscribe(move |decks| sink.borrow_mut().push(decks.len()));

        store.load().unwrap();
        let deck = store.create_deck("Biology");
        store.add_card(&deck.id, "q", "a");
        store.delete_deck("missing");
        store.delete_deck(&deck.id);

        assert_eq!(*seen.borrow(), vec![0, 1, 1, 0]);
    }

    #[test]
    fn test_failed_write_keeps_memory_and_flags_unsaved() {
        let backend = FlakyStore {
            inner: MemoryStore::new(),
            failing: false,
            failing_reads: false,
        };
        let mut store = DeckStore::with_rng(backend, StdRng::seed_from_u64(1));
        store.load().unwrap();
        store.create_deck("Saved");

        store.backend_mut().failing = true;
        let unsaved = store.create_deck("Unsaved");

        assert!(store.has_unsaved_changes());
        assert_eq!(store.decks()[0].id, unsaved.id);
        assert!(store.flush().is_err());

        store.backend_mut().failing = false;
        store.flush().unwrap();
        assert!(!store.has_unsaved_changes());

        let raw = store.backend().get(DEFAULT_STORAGE_KEY).unwrap().unwrap();
        let persisted: Vec<Deck> = serde_json::from_str(&raw).unwrap();
        assert_eq!(persisted, store.decks().to_vec());
    }

    #[test]
    fn test_read_error_keeps_stored_decks() {
        let mut seeded = new_store();
        for title in ["A", "B", "C"] {
            seeded.create_deck(title);
        }
        let backend = FlakyStore {
            inner: seeded.backend().clone(),
            failing: false,
            failing_reads: true,
        };

        let mut store = DeckStore::with_rng(backend, StdRng::seed_from_u64(2));
        assert!(store.load().is_err());
        assert!(!store.is_loaded());

        store.create_deck("New");
        assert!(store.has_unsaved_changes());
        assert!(matches!(store.flush(), Err(Error::NotLoaded)));

        store.backend_mut().failing_reads = false;
        let raw = store.backend().get(DEFAULT_STORAGE_KEY).unwrap().unwrap();
        let persisted: Vec<Deck> = serde_json::from_str(&raw).unwrap();
        let titles: Vec<&str> = persisted.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["C", "B", "A"]);

        // Once a load succeeds the store behaves normally again
        store.load().unwrap();
        store.create_deck("New");
        assert!(!store.has_unsaved_changes());
        assert_eq!(store.decks().len(), 4);
    }

    #[test]
    fn test_normalize_input() {
        assert_eq!(normalize_input("  Biology basics \n"), Some("Biology basics".to_string()));
        assert_eq!(normalize_input("   "), None);
        assert_eq!(normalize_input(""), None);
    }
}
