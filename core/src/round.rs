use alloc::string::String;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Generation token of a round, every continuation scheduled for a round carries it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoundId(u64);

impl RoundId {
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Setup,
    Peeking,
    Active,
    Won,
    Lost,
}

impl Phase {
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlipOutcome {
    NoChange,
    Selected,
    Matched([CardId; 2]),
    Won([CardId; 2]),
    Mismatched([CardId; 2]),
}

impl FlipOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }

    /// The two cards compared by this flip, if it completed a selection.
    pub const fn pair(self) -> Option<[CardId; 2]> {
        match self {
            Self::Matched(pair) | Self::Won(pair) | Self::Mismatched(pair) => Some(pair),
            Self::NoChange | Self::Selected => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    NoChange,
    Ticked(u32),
    Expired,
}

/// State of the single live round, replaced wholesale when a new round starts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundState {
    id: RoundId,
    difficulty: String,
    config: DifficultyConfig,
    deck: Deck,
    selection: SmallVec<[CardId; 2]>,
    matched_pairs: u8,
    flip_attempts: u32,
    time_remaining: u32,
    board_locked: bool,
    phase: Phase,
}

impl RoundState {
    pub fn new(id: RoundId, difficulty: impl Into<String>, config: DifficultyConfig, deck: Deck) -> Self {
        Self {
            id,
            difficulty: difficulty.into(),
            config,
            deck,
            selection: SmallVec::new(),
            matched_pairs: 0,
            flip_attempts: 0,
            time_remaining: config.time_budget_secs,
            board_locked: true,
            phase: Phase::Setup,
        }
    }

    pub fn id(&self) -> RoundId {
        self.id
    }

    pub fn difficulty(&self) -> &str {
        &self.difficulty
    }

    pub fn config(&self) -> DifficultyConfig {
        self.config
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn selection(&self) -> &[CardId] {
        &self.selection
    }

    pub fn matched_pairs(&self) -> u8 {
        self.matched_pairs
    }

    pub fn flip_attempts(&self) -> u32 {
        self.flip_attempts
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn is_board_locked(&self) -> bool {
        self.board_locked
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn begin_peek(&mut self) -> bool {
        if self.phase != Phase::Setup {
            return false;
        }
        self.phase = Phase::Peeking;
        self.board_locked = true;
        true
    }

    pub fn end_peek(&mut self) -> bool {
        if self.phase != Phase::Peeking {
            return false;
        }
        self.phase = Phase::Active;
        self.board_locked = false;
        true
    }

    pub fn flip(&mut self, id: CardId) -> Result<FlipOutcome> {
        let card = self.deck.get(id).ok_or(GameError::InvalidCard)?;

        if self.board_locked
            || !self.phase.is_active()
            || card.is_face_up()
            || self.selection.contains(&id)
            || self.selection.len() >= 2
        {
            return Ok(FlipOutcome::NoChange);
        }

        if let Some(card) = self.deck.get_mut(id) {
            card.is_flipped = true;
        }
        self.selection.push(id);

        if self.selection.len() < 2 {
            return Ok(FlipOutcome::Selected);
        }

        self.flip_attempts = self.flip_attempts.saturating_add(1);
        Ok(self.evaluate_match())
    }

    /// Compares the two pending cards, locking the board when they differ.
    fn evaluate_match(&mut self) -> FlipOutcome {
        let pair = [self.selection[0], self.selection[1]];

        if self.deck[pair[0]].symbol != self.deck[pair[1]].symbol {
            self.board_locked = true;
            return FlipOutcome::Mismatched(pair);
        }

        for id in pair {
            if let Some(card) = self.deck.get_mut(id) {
                card.is_matched = true;
            }
        }
        self.selection.clear();
        self.matched_pairs += 1;

        if self.matched_pairs == self.config.pair_count {
            self.finish(Phase::Won);
            FlipOutcome::Won(pair)
        } else {
            FlipOutcome::Matched(pair)
        }
    }

    /// Turns a mismatched pair face-down again and unlocks the board.
    pub fn resolve_mismatch(&mut self) -> Option<[CardId; 2]> {
        if !self.phase.is_active() || self.selection.len() != 2 {
            return None;
        }

        let pair = [self.selection[0], self.selection[1]];
        for id in pair {
            if let Some(card) = self.deck.get_mut(id) {
                card.is_flipped = false;
            }
        }
        self.selection.clear();
        self.board_locked = false;
        Some(pair)
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.phase.is_active() {
            return TickOutcome::NoChange;
        }

        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining == 0 {
            self.finish(Phase::Lost);
            TickOutcome::Expired
        } else {
            TickOutcome::Ticked(self.time_remaining)
        }
    }

    fn finish(&mut self, phase: Phase) {
        if self.phase.is_finished() {
            return;
        }
        self.phase = phase;
        self.board_locked = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    // a b c / c b a
    fn small_round() -> RoundState {
        let config = DifficultyConfig::new(2, 3, 3, 5).unwrap();
        let symbols: Vec<String> = ["a", "b", "c", "c", "b", "a"]
            .into_iter()
            .map(String::from)
            .collect();
        let deck = Deck::from_symbols(config, symbols).unwrap();
        let mut round = RoundState::new(RoundId::default().next(), "test", config, deck);
        round.begin_peek();
        round
    }

    fn active_round() -> RoundState {
        let mut round = small_round();
        assert!(round.end_peek());
        round
    }

    #[test]
    fn flips_are_ignored_while_peeking() {
        let mut round = small_round();

        assert_eq!(round.phase(), Phase::Peeking);
        assert_eq!(round.flip(0), Ok(FlipOutcome::NoChange));
        assert!(round.selection().is_empty());
    }

    #[test]
    fn unknown_card_is_an_error() {
        let mut round = active_round();

        assert_eq!(round.flip(6), Err(GameError::InvalidCard));
    }

    #[test]
    fn repeated_click_on_pending_card_is_ignored() {
        let mut round = active_round();

        assert_eq!(round.flip(1), Ok(FlipOutcome::Selected));
        assert_eq!(round.flip(1), Ok(FlipOutcome::NoChange));
        assert_eq!(round.selection(), &[1]);
        assert_eq!(round.flip_attempts(), 0);
    }

    #[test]
    fn match_counts_pair_and_keeps_board_unlocked() {
        let mut round = active_round();

        round.flip(1).unwrap();
        assert_eq!(round.flip(4), Ok(FlipOutcome::Matched([1, 4])));

        assert_eq!(round.matched_pairs(), 1);
        assert_eq!(round.flip_attempts(), 1);
        assert!(!round.is_board_locked());
        assert!(round.selection().is_empty());
        assert!(round.deck()[1].is_matched && round.deck()[4].is_matched);
    }

    #[test]
    fn mismatch_locks_until_resolved() {
        let mut round = active_round();

        round.flip(0).unwrap();
        assert_eq!(round.flip(1), Ok(FlipOutcome::Mismatched([0, 1])));
        assert!(round.is_board_locked());

        // third card is ignored while the pair is pending
        assert_eq!(round.flip(2), Ok(FlipOutcome::NoChange));
        assert!(!round.deck()[2].is_flipped);

        assert_eq!(round.resolve_mismatch(), Some([0, 1]));
        assert!(!round.is_board_locked());
        assert!(round.selection().is_empty());
        for id in [0, 1] {
            assert!(!round.deck()[id].is_flipped);
            assert!(!round.deck()[id].is_matched);
        }
        assert_eq!(round.resolve_mismatch(), None);
    }

    #[test]
    fn matching_every_pair_wins_once() {
        let mut round = active_round();

        round.flip(0).unwrap();
        assert_eq!(round.flip(5), Ok(FlipOutcome::Matched([0, 5])));
        round.flip(1).unwrap();
        assert_eq!(round.flip(4), Ok(FlipOutcome::Matched([1, 4])));
        round.flip(2).unwrap();
        assert_eq!(round.flip(3), Ok(FlipOutcome::Won([2, 3])));

        assert_eq!(round.phase(), Phase::Won);
        assert_eq!(round.flip_attempts(), 3);
        assert!(round.is_board_locked());
        assert_eq!(round.flip(0), Ok(FlipOutcome::NoChange));
        assert_eq!(round.tick(), TickOutcome::NoChange);
    }

    #[test]
    fn countdown_expires_into_lost() {
        let mut round = active_round();

        for remaining in (1..5).rev() {
            assert_eq!(round.tick(), TickOutcome::Ticked(remaining));
        }
        assert_eq!(round.tick(), TickOutcome::Expired);
        assert_eq!(round.phase(), Phase::Lost);
        assert_eq!(round.time_remaining(), 0);

        assert_eq!(round.tick(), TickOutcome::NoChange);
        assert_eq!(round.flip(0), Ok(FlipOutcome::NoChange));
        assert_eq!(round.time_remaining(), 0);
    }

    #[test]
    fn pending_mismatch_stays_put_after_loss() {
        let mut round = active_round();

        round.flip(0).unwrap();
        round.flip(1).unwrap();
        while round.tick() != TickOutcome::Expired {}

        assert_eq!(round.phase(), Phase::Lost);
        assert_eq!(round.resolve_mismatch(), None);
        assert!(round.is_board_locked());
        assert_eq!(round.selection(), &[0, 1]);
    }

    #[test]
    fn snapshot_serializes() {
        let mut round = active_round();
        round.flip(0).unwrap();

        let json = serde_json::to_string(&round).unwrap();
        let restored: RoundState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, round);
    }
}
