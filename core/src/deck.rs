use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Position of a card within the deck of the current round.
pub type CardId = usize;

/// Symbols drawn from, in order, when building a deck.
pub const DEFAULT_SYMBOLS: &[&str] = &[
    "🍎", "🍌", "🍇", "🍒", "🍋", "🍉", "🍍", "🥝", "🍓", "🍑", "🥥", "🥑", "🍆", "🌽", "🥕",
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub symbol: String,
    pub is_flipped: bool,
    pub is_matched: bool,
}

impl Card {
    pub const fn is_face_up(&self) -> bool {
        self.is_flipped || self.is_matched
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Card>,
    rows: u8,
    cols: u8,
}

impl Deck {
    /// Lays `symbols` out in order, checking that they fill the grid of `config` with pairs.
    pub fn from_symbols(config: DifficultyConfig, symbols: Vec<String>) -> Result<Self> {
        config.validate()?;
        if symbols.len() != config.total_cards() {
            return Err(GameError::InvalidDeck);
        }

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for symbol in &symbols {
            let count = counts.entry(symbol.as_str()).or_default();
            *count += 1;
            if *count > 2 {
                return Err(GameError::InvalidDeck);
            }
        }
        if counts.values().any(|&count| count != 2) {
            return Err(GameError::InvalidDeck);
        }

        let cards = symbols
            .into_iter()
            .enumerate()
            .map(|(id, symbol)| Card {
                id,
                symbol,
                is_flipped: false,
                is_matched: false,
            })
            .collect();

        Ok(Self {
            cards,
            rows: config.rows,
            cols: config.cols,
        })
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn pair_count(&self) -> usize {
        self.cards.len() / 2
    }

    pub fn size(&self) -> (u8, u8) {
        (self.rows, self.cols)
    }

    pub fn get(&self, id: CardId) -> Option<&Card> {
        self.cards.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: CardId) -> Option<&mut Card> {
        self.cards.get_mut(id)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Ids of the cards sharing `id`'s symbol, the card itself included.
    pub fn pair_of(&self, id: CardId) -> Option<[CardId; 2]> {
        let symbol = &self.get(id)?.symbol;
        let mut ids = self
            .cards
            .iter()
            .filter(|card| card.symbol == *symbol)
            .map(|card| card.id);
        Some([ids.next()?, ids.next()?])
    }

    /// Card ids laid out row-major in a `(rows, cols)` grid.
    pub fn grid(&self) -> Array2<CardId> {
        let cols = usize::from(self.cols);
        Array2::from_shape_fn((self.rows.into(), cols), |(row, col)| row * cols + col)
    }
}

impl Index<CardId> for Deck {
    type Output = Card;

    fn index(&self, id: CardId) -> &Self::Output {
        &self.cards[id]
    }
}

pub trait DeckBuilder {
    fn build(self, config: DifficultyConfig, symbol_pool: &[&str]) -> Result<Deck>;
}

/// Takes the first `pair_count` symbols of the pool, doubles them and shuffles the result uniformly.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomDeckBuilder {
    seed: u64,
}

impl RandomDeckBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl DeckBuilder for RandomDeckBuilder {
    fn build(self, config: DifficultyConfig, symbol_pool: &[&str]) -> Result<Deck> {
        use rand::prelude::*;

        config.validate()?;
        let pair_count = usize::from(config.pair_count);
        if symbol_pool.len() < pair_count {
            log::error!(
                "Symbol pool too small, requested {} pairs but only {} symbols available",
                pair_count,
                symbol_pool.len()
            );
            return Err(GameError::InsufficientSymbols);
        }

        let mut symbols: Vec<String> = symbol_pool[..pair_count]
            .iter()
            .flat_map(|&symbol| [symbol, symbol])
            .map(String::from)
            .collect();

        let mut rng = SmallRng::seed_from_u64(self.seed);
        symbols.shuffle(&mut rng);

        Deck::from_symbols(config, symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::borrow::ToOwned;
    use alloc::vec;

    fn symbol_counts(deck: &Deck) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for card in deck.cards() {
            *counts.entry(card.symbol.clone()).or_default() += 1;
        }
        counts
    }

    #[test]
    fn every_catalog_config_builds_a_paired_deck() {
        let catalog = DifficultyCatalog::default();

        for key in catalog.keys() {
            let config = catalog.get_config(key).unwrap();
            let deck = RandomDeckBuilder::new(7)
                .build(config, DEFAULT_SYMBOLS)
                .unwrap();

            assert_eq!(deck.len(), 2 * usize::from(config.pair_count));
            let counts = symbol_counts(&deck);
            assert_eq!(counts.len(), usize::from(config.pair_count));
            assert!(counts.values().all(|&count| count == 2));
        }
    }

    #[test]
    fn selects_the_first_symbols_of_the_pool() {
        let deck = RandomDeckBuilder::new(1)
            .build(DifficultyConfig::EASY, DEFAULT_SYMBOLS)
            .unwrap();

        let counts = symbol_counts(&deck);
        for symbol in &DEFAULT_SYMBOLS[..6] {
            assert_eq!(counts.get(*symbol), Some(&2));
        }
        assert!(!counts.contains_key("🥕"));
    }

    #[test]
    fn same_seed_gives_same_order() {
        let a = RandomDeckBuilder::new(99)
            .build(DifficultyConfig::HARD, DEFAULT_SYMBOLS)
            .unwrap();
        let b = RandomDeckBuilder::new(99)
            .build(DifficultyConfig::HARD, DEFAULT_SYMBOLS)
            .unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn shuffle_reaches_every_position() {
        // the first symbol should be able to land anywhere over enough seeds
        let mut seen = [false; 12];
        for seed in 0..500 {
            let deck = RandomDeckBuilder::new(seed)
                .build(DifficultyConfig::EASY, DEFAULT_SYMBOLS)
                .unwrap();
            for card in deck.cards() {
                if card.symbol == DEFAULT_SYMBOLS[0] {
                    seen[card.id] = true;
                }
            }
        }
        assert!(seen.iter().all(|&hit| hit));
    }

    #[test]
    fn small_pool_is_rejected() {
        let result = RandomDeckBuilder::new(0).build(DifficultyConfig::NORMAL, &["a", "b", "c"]);

        assert_eq!(result, Err(GameError::InsufficientSymbols));
    }

    #[test]
    fn from_symbols_checks_pairs_and_size() {
        let config = DifficultyConfig::new(1, 4, 2, 10).unwrap();
        let owned = |symbols: &[&str]| symbols.iter().map(|&s| s.to_owned()).collect::<Vec<_>>();

        assert!(Deck::from_symbols(config, owned(&["a", "b", "b", "a"])).is_ok());
        assert_eq!(
            Deck::from_symbols(config, owned(&["a", "a", "a", "b"])),
            Err(GameError::InvalidDeck)
        );
        assert_eq!(
            Deck::from_symbols(config, owned(&["a", "a"])),
            Err(GameError::InvalidDeck)
        );
    }

    #[test]
    fn from_symbols_rejects_one_symbol_filling_a_large_board() {
        let config = DifficultyConfig::new(15, 34, 255, 10).unwrap();

        assert_eq!(
            Deck::from_symbols(config, vec![String::from("a"); 510]),
            Err(GameError::InvalidDeck)
        );
    }

    #[test]
    fn grid_is_row_major() {
        let config = DifficultyConfig::new(2, 3, 3, 10).unwrap();
        let symbols = vec!["x", "y", "z", "z", "y", "x"]
            .into_iter()
            .map(String::from)
            .collect();
        let deck = Deck::from_symbols(config, symbols).unwrap();

        let grid = deck.grid();
        assert_eq!(grid.dim(), (2, 3));
        assert_eq!(grid[[1, 0]], 3);
        assert_eq!(deck.pair_of(0), Some([0, 5]));
        assert_eq!(deck[4].symbol, "y");
    }
}
