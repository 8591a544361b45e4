//! Identifier generation for decks and cards.
//!
//! An id is the current time in milliseconds followed by eight random base-36
//! characters, e.g. `1717171717171-k3j9x0ab`. The random source is passed in so
//! that tests can use a seeded generator.

use chrono::{DateTime, Utc};
use rand::Rng;

const SUFFIX_LEN: usize = 8;
const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub fn generate_id<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> String {
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("{}-{}", now.timestamp_millis(), suffix)
}
