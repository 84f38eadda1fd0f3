use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// Key selected when nothing else was requested.
pub const DEFAULT_DIFFICULTY: &str = "normal";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyConfig {
    pub rows: u8,
    pub cols: u8,
    pub pair_count: u8,
    pub time_budget_secs: u32,
}

impl DifficultyConfig {
    pub const EASY: Self = Self::new_unchecked(3, 4, 6, 30);
    pub const NORMAL: Self = Self::new_unchecked(4, 4, 8, 45);
    pub const HARD: Self = Self::new_unchecked(5, 4, 10, 60);

    pub const fn new_unchecked(rows: u8, cols: u8, pair_count: u8, time_budget_secs: u32) -> Self {
        Self {
            rows,
            cols,
            pair_count,
            time_budget_secs,
        }
    }

    pub fn new(rows: u8, cols: u8, pair_count: u8, time_budget_secs: u32) -> Result<Self> {
        let config = Self::new_unchecked(rows, cols, pair_count, time_budget_secs);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let positive =
            self.rows > 0 && self.cols > 0 && self.pair_count > 0 && self.time_budget_secs > 0;
        if positive && self.total_cards() == 2 * usize::from(self.pair_count) {
            Ok(())
        } else {
            Err(GameError::InvalidConfig)
        }
    }

    pub const fn total_cards(&self) -> usize {
        self.rows as usize * self.cols as usize
    }
}

/// Ordered table of the difficulties offered to the player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultyCatalog {
    entries: Vec<(String, DifficultyConfig)>,
}

impl DifficultyCatalog {
    pub const fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds `key`, replacing any config already registered under it.
    pub fn with_entry(mut self, key: impl Into<String>, config: DifficultyConfig) -> Result<Self> {
        config.validate()?;
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = config,
            None => self.entries.push((key, config)),
        }
        Ok(self)
    }

    pub fn get_config(&self, key: &str) -> Result<DifficultyConfig> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|&(_, config)| config)
            .ok_or(GameError::UnknownDifficulty)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl Default for DifficultyCatalog {
    fn default() -> Self {
        use alloc::borrow::ToOwned;

        Self {
            entries: alloc::vec![
                ("easy".to_owned(), DifficultyConfig::EASY),
                ("normal".to_owned(), DifficultyConfig::NORMAL),
                ("hard".to_owned(), DifficultyConfig::HARD),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_has_three_valid_entries_in_order() {
        let catalog = DifficultyCatalog::default();

        let keys: Vec<_> = catalog.keys().collect();
        assert_eq!(keys, ["easy", "normal", "hard"]);

        for key in keys {
            let config = catalog.get_config(key).unwrap();
            assert_eq!(config.validate(), Ok(()));
            assert_eq!(config.total_cards(), 2 * usize::from(config.pair_count));
        }
        assert!(catalog.contains(DEFAULT_DIFFICULTY));
    }

    #[test]
    fn easy_matches_documented_values() {
        let easy = DifficultyCatalog::default().get_config("easy").unwrap();

        assert_eq!((easy.rows, easy.cols), (3, 4));
        assert_eq!(easy.pair_count, 6);
        assert_eq!(easy.time_budget_secs, 30);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let catalog = DifficultyCatalog::default();

        assert_eq!(
            catalog.get_config("nightmare"),
            Err(GameError::UnknownDifficulty)
        );
    }

    #[test]
    fn config_must_hold_two_cards_per_pair() {
        assert_eq!(
            DifficultyConfig::new(3, 3, 4, 20),
            Err(GameError::InvalidConfig)
        );
        assert_eq!(
            DifficultyConfig::new(2, 2, 2, 0),
            Err(GameError::InvalidConfig)
        );
        assert!(DifficultyConfig::new(6, 4, 12, 90).is_ok());
    }

    #[test]
    fn with_entry_extends_and_replaces() {
        let tiny = DifficultyConfig::new(1, 2, 1, 5).unwrap();
        let catalog = DifficultyCatalog::default()
            .with_entry("tiny", tiny)
            .unwrap()
            .with_entry("easy", DifficultyConfig::HARD)
            .unwrap();

        assert_eq!(catalog.get_config("tiny"), Ok(tiny));
        assert_eq!(catalog.get_config("easy"), Ok(DifficultyConfig::HARD));
        assert_eq!(catalog.keys().count(), 4);
        assert!(
            DifficultyCatalog::empty()
                .with_entry("bad", DifficultyConfig::new_unchecked(1, 3, 1, 5))
                .is_err()
        );
    }
}
