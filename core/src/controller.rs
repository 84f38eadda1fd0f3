use alloc::string::String;
use core::time::Duration;
use rand::prelude::*;

use crate::*;

/// How long the whole deck is shown face-up before play starts.
pub const PEEK_DELAY: Duration = Duration::from_secs(2);

/// How long a mismatched pair stays visible.
pub const MISMATCH_DELAY: Duration = Duration::from_secs(1);

/// Remaining seconds at and below which the countdown is shown as urgent.
pub const LOW_TIME_THRESHOLD: u32 = 10;

/// Owns the live round and turns player input, ticks and fired tasks into host commands.
pub struct RoundController<H, S> {
    catalog: DifficultyCatalog,
    symbol_pool: &'static [&'static str],
    host: H,
    scores: S,
    rng: SmallRng,
    difficulty: String,
    last_round: RoundId,
    round: Option<RoundState>,
}

impl<H: Host, S: ScoreStore> RoundController<H, S> {
    pub fn new(host: H, scores: S, seed: u64) -> Self {
        Self {
            catalog: DifficultyCatalog::default(),
            symbol_pool: DEFAULT_SYMBOLS,
            host,
            scores,
            rng: SmallRng::seed_from_u64(seed),
            difficulty: DEFAULT_DIFFICULTY.into(),
            last_round: RoundId::default(),
            round: None,
        }
    }

    pub fn with_catalog(mut self, catalog: DifficultyCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_symbol_pool(mut self, symbol_pool: &'static [&'static str]) -> Self {
        self.symbol_pool = symbol_pool;
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn catalog(&self) -> &DifficultyCatalog {
        &self.catalog
    }

    pub fn round(&self) -> Option<&RoundState> {
        self.round.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.round.as_ref().map_or(Phase::Setup, RoundState::phase)
    }

    /// Key of the selected difficulty, used by [`Self::restart`].
    pub fn difficulty(&self) -> &str {
        &self.difficulty
    }

    pub fn best_score(&self) -> Option<u32> {
        self.scores.get_best(&self.difficulty)
    }

    pub fn is_low_time(&self) -> bool {
        self.round.as_ref().is_some_and(|round| {
            !round.phase().is_finished() && round.time_remaining() <= LOW_TIME_THRESHOLD
        })
    }

    /// Discards the current round and deals a new one for `key`.
    pub fn enter_round(&mut self, key: &str) -> Result<()> {
        let config = self.catalog.get_config(key)?;
        let seed = self.rng.random::<u64>();
        let deck = RandomDeckBuilder::new(seed).build(config, self.symbol_pool)?;

        self.cancel_pending();

        let id = self.last_round.next();
        self.last_round = id;
        self.difficulty = key.into();

        let mut round = RoundState::new(id, key, config, deck);
        round.begin_peek();
        log::debug!(
            "round {} on {}: {} cards, {}s, seed {}",
            id.get(),
            key,
            round.deck().len(),
            config.time_budget_secs,
            seed
        );

        let best = self.scores.get_best(key);
        self.host.hide_modals();
        self.host.update_counters(0, round.time_remaining(), best);
        self.host.render_deck(round.deck(), true);
        self.host.schedule(
            ScheduledTask {
                round: id,
                kind: TaskKind::EndPeek,
            },
            PEEK_DELAY,
        );

        self.round = Some(round);
        Ok(())
    }

    pub fn restart(&mut self) -> Result<()> {
        let key = self.difficulty.clone();
        self.enter_round(&key)
    }

    /// Starts a round on `key`. The live round is kept when the key is unknown.
    pub fn change_difficulty(&mut self, key: &str) -> Result<()> {
        self.catalog.get_config(key)?;
        self.enter_round(key)
    }

    pub fn flip(&mut self, card: CardId) -> Result<()> {
        let Self {
            host,
            scores,
            round,
            ..
        } = self;
        let round = round.as_mut().ok_or(GameError::InvalidCard)?;

        let outcome = round.flip(card)?;
        if !outcome.has_update() {
            log::trace!("flip on card {} ignored", card);
            return Ok(());
        }

        host.play_sound(Sound::Flip);
        host.render_card(&round.deck()[card]);

        let Some(pair) = outcome.pair() else {
            return Ok(());
        };
        host.update_counters(
            round.flip_attempts(),
            round.time_remaining(),
            scores.get_best(round.difficulty()),
        );

        match outcome {
            FlipOutcome::Matched(_) | FlipOutcome::Won(_) => {
                for id in pair {
                    host.render_card(&round.deck()[id]);
                }
                host.play_sound(Sound::Match);
            }
            FlipOutcome::Mismatched(_) => {
                host.play_sound(Sound::Wrong);
                host.schedule(
                    ScheduledTask {
                        round: round.id(),
                        kind: TaskKind::ResolveMismatch,
                    },
                    MISMATCH_DELAY,
                );
            }
            FlipOutcome::NoChange | FlipOutcome::Selected => {}
        }

        if matches!(outcome, FlipOutcome::Won(_)) {
            self.on_won();
        }
        Ok(())
    }

    /// Applies a task handed to [`Scheduler::schedule`] once its delay elapsed.
    pub fn fire(&mut self, task: ScheduledTask) {
        let Self { host, round, .. } = self;
        let Some(round) = round.as_mut().filter(|round| round.id() == task.round) else {
            log::trace!("stale {:?} for round {} dropped", task.kind, task.round.get());
            return;
        };

        match task.kind {
            TaskKind::EndPeek => {
                if round.end_peek() {
                    log::debug!("round {} active", round.id().get());
                    host.render_deck(round.deck(), false);
                    host.start(round.id(), TICK_INTERVAL);
                }
            }
            TaskKind::ResolveMismatch => {
                if let Some(pair) = round.resolve_mismatch() {
                    for id in pair {
                        host.render_card(&round.deck()[id]);
                    }
                }
            }
        }
    }

    /// One countdown step for `round_id`, ticks of any other round are ignored.
    pub fn tick(&mut self, round_id: RoundId) {
        let Self {
            host,
            scores,
            round,
            ..
        } = self;
        let Some(round) = round.as_mut().filter(|round| round.id() == round_id) else {
            log::trace!("stale tick for round {} dropped", round_id.get());
            return;
        };

        match round.tick() {
            TickOutcome::NoChange => {}
            TickOutcome::Ticked(time_remaining) => {
                host.update_counters(
                    round.flip_attempts(),
                    time_remaining,
                    scores.get_best(round.difficulty()),
                );
            }
            TickOutcome::Expired => {
                host.update_counters(
                    round.flip_attempts(),
                    0,
                    scores.get_best(round.difficulty()),
                );
                self.on_lost();
            }
        }
    }

    fn on_won(&mut self) {
        let Self {
            host,
            scores,
            round,
            ..
        } = self;
        let Some(round) = round.as_ref() else {
            return;
        };

        host.stop();
        host.play_sound(Sound::Win);
        host.render_celebration();

        let new_record = scores.record_if_better(round.difficulty(), round.flip_attempts());
        let best = scores.get_best(round.difficulty());
        log::info!(
            "round {} won with {} flips and {}s left{}",
            round.id().get(),
            round.flip_attempts(),
            round.time_remaining(),
            if new_record { ", new best" } else { "" }
        );

        host.update_counters(round.flip_attempts(), round.time_remaining(), best);
        host.show_modal(Modal::Victory(VictorySummary {
            time_remaining: round.time_remaining(),
            flip_attempts: round.flip_attempts(),
            best,
            new_record,
        }));
    }

    fn on_lost(&mut self) {
        if let Some(round) = &self.round {
            log::info!(
                "round {} lost with {} of {} pairs",
                round.id().get(),
                round.matched_pairs(),
                round.config().pair_count
            );
        }

        self.host.stop();
        self.host.play_sound(Sound::Lose);
        self.host.show_modal(Modal::GameOver);
    }

    fn cancel_pending(&mut self) {
        self.host.cancel_all();
        self.host.stop();
    }
}
