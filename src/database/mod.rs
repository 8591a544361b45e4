pub mod db;
pub mod kv;

pub use db::SqliteStore;
pub use kv::{KeyValueStore, MemoryStore};
