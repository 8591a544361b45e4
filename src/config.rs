//! Where the deck collection lives on disk and under which key.

use crate::error::{Error, Result};
use crate::models::DEFAULT_STORAGE_KEY;
use std::fs;
use std::path::PathBuf;

const APP_DIR: &str = "flashcards";
const DATABASE_FILE: &str = "flashcards.sqlite3";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub database_path: PathBuf,
    pub storage_key: String,
}

impl Config {
    /// Uses `database_path` when given, otherwise the per-user data directory.
    pub fn resolve(database_path: Option<PathBuf>) -> Result<Self> {
        let database_path = match database_path {
            Some(path) => path,
            None => Self::default_database_path()?,
        };

        Ok(Self {
            database_path,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        })
    }

    /// `<local data dir>/flashcards/flashcards.sqlite3`
    pub fn default_database_path() -> Result<PathBuf> {
        dirs::data_local_dir()
            .map(|dir| dir.join(APP_DIR).join(DATABASE_FILE))
            .ok_or(Error::DataDirNotFound)
    }

    /// Creates the directory holding the database file if it is missing.
    pub fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}
