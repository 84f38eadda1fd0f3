use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::{String, ToString};

use crate::*;

const BEST_SCORE_PREFIX: &str = "memory-best-";

/// Storage key of the best score for `difficulty`.
pub fn best_score_key(difficulty: &str) -> String {
    format!("{BEST_SCORE_PREFIX}{difficulty}")
}

/// Persistence of the fewest flip attempts per difficulty. Implementors provide the raw
/// access; failures there degrade to "no best score".
pub trait ScoreStore {
    /// Reads the value stored under `key`, `Ok(None)` when nothing was stored.
    fn load(&self, key: &str) -> core::result::Result<Option<u32>, StorageError>;

    fn store(&mut self, key: &str, flip_attempts: u32) -> core::result::Result<(), StorageError>;

    fn get_best(&self, difficulty: &str) -> Option<u32> {
        match self.load(&best_score_key(difficulty)) {
            Ok(best) => best,
            Err(err) => {
                log::warn!("Ignoring best score for {}: {}", difficulty, err);
                None
            }
        }
    }

    /// Stores `flip_attempts` if it beats the current best, returns whether it did.
    fn record_if_better(&mut self, difficulty: &str, flip_attempts: u32) -> bool {
        if self
            .get_best(difficulty)
            .is_some_and(|best| best <= flip_attempts)
        {
            return false;
        }

        match self.store(&best_score_key(difficulty), flip_attempts) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("Could not save best score for {}: {}", difficulty, err);
                false
            }
        }
    }
}

/// Score store kept in memory, values are held as text like a browser storage would.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryScoreStore {
    entries: BTreeMap<String, String>,
    read_only: bool,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store refusing every write.
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    pub fn insert_raw(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl ScoreStore for MemoryScoreStore {
    fn load(&self, key: &str) -> core::result::Result<Option<u32>, StorageError> {
        self.entries
            .get(key)
            .map(|raw| raw.trim().parse().map_err(|_| StorageError::Corrupt))
            .transpose()
    }

    fn store(&mut self, key: &str, flip_attempts: u32) -> core::result::Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::Unavailable);
        }
        self.entries.insert(key.into(), flip_attempts.to_string());
        Ok(())
    }
}
