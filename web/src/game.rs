use crate::audio::SoundBoard;
use crate::scores::LocalScoreStore;
use crate::utils::*;
use gloo::timers::callback::{Interval, Timeout};
use memoria_core as game;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use yew::html::Scope;
use yew::prelude::*;

/// How long confetti stays on screen.
const CELEBRATION_MS: u32 = 5_000;
const CONFETTI_PIECES: usize = 50;

#[derive(Copy, Clone, Debug, PartialEq)]
enum CardFace {
    Hidden,
    Peek,
    Flipped,
    Matched,
}

impl CardFace {
    fn of(card: &game::Card, peeking: bool) -> Self {
        if card.is_matched {
            Self::Matched
        } else if card.is_flipped {
            Self::Flipped
        } else if peeking {
            Self::Peek
        } else {
            Self::Hidden
        }
    }

    fn shows_symbol(self) -> bool {
        !matches!(self, Self::Hidden)
    }
}

#[derive(Clone, Debug, PartialEq)]
struct CardSlot {
    symbol: String,
    face: CardFace,
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct ConfettiPiece {
    left_vw: f64,
    duration_secs: f64,
    hue: f64,
}

/// Scatters `count` confetti pieces using `random` values in `[0, 1)`.
fn scatter_confetti(count: usize, mut random: impl FnMut() -> f64) -> Vec<ConfettiPiece> {
    (0..count)
        .map(|_| ConfettiPiece {
            left_vw: random() * 100.,
            duration_secs: random() * 3. + 2.,
            hue: random() * 360.,
        })
        .collect()
}

/// Everything the page shows, written only through the round controller's presenter calls.
#[derive(Clone, Debug, Default, PartialEq)]
struct BoardView {
    slots: Vec<CardSlot>,
    grid: Array2<game::CardId>,
    flip_attempts: u32,
    time_remaining: u32,
    best: Option<u32>,
    modal: Option<game::Modal>,
    confetti: Vec<ConfettiPiece>,
}

impl BoardView {
    fn show_deck(&mut self, deck: &game::Deck, peeking: bool) {
        self.grid = deck.grid();
        self.slots = deck
            .cards()
            .iter()
            .map(|card| CardSlot {
                symbol: card.symbol.clone(),
                face: CardFace::of(card, peeking),
            })
            .collect();
    }

    fn show_card(&mut self, card: &game::Card) {
        match self.slots.get_mut(card.id) {
            Some(slot) => slot.face = CardFace::of(card, false),
            None => log::warn!("render for unknown card {}", card.id),
        }
    }

    fn set_counters(&mut self, flip_attempts: u32, time_remaining: u32, best: Option<u32>) {
        self.flip_attempts = flip_attempts;
        self.time_remaining = time_remaining;
        self.best = best;
    }
}

/// One outstanding timer per task kind, keyed by the task it will fire.
#[derive(Debug)]
struct PendingTasks<T> {
    end_peek: Option<(game::ScheduledTask, T)>,
    resolve_mismatch: Option<(game::ScheduledTask, T)>,
}

impl<T> Default for PendingTasks<T> {
    fn default() -> Self {
        Self {
            end_peek: None,
            resolve_mismatch: None,
        }
    }
}

impl<T> PendingTasks<T> {
    fn slot(&mut self, kind: game::TaskKind) -> &mut Option<(game::ScheduledTask, T)> {
        match kind {
            game::TaskKind::EndPeek => &mut self.end_peek,
            game::TaskKind::ResolveMismatch => &mut self.resolve_mismatch,
        }
    }

    /// Replaces any timer of the same kind.
    fn insert(&mut self, task: game::ScheduledTask, timer: T) {
        *self.slot(task.kind) = Some((task, timer));
    }

    /// Forgets the timer of a task that has fired, unless a newer task took its slot.
    fn finish(&mut self, task: game::ScheduledTask) -> Option<T> {
        let slot = self.slot(task.kind);
        if slot.as_ref().is_some_and(|(pending, _)| *pending == task) {
            slot.take().map(|(_, timer)| timer)
        } else {
            None
        }
    }

    fn clear(&mut self) {
        self.end_peek = None;
        self.resolve_mismatch = None;
    }

    fn len(&self) -> usize {
        usize::from(self.end_peek.is_some()) + usize::from(self.resolve_mismatch.is_some())
    }
}

fn millis(duration: Duration) -> u32 {
    duration.as_millis().try_into().unwrap_or(u32::MAX)
}

/// Browser side of the round controller: view state, sound and gloo timers.
struct WebHost {
    link: Scope<GameView>,
    view: BoardView,
    sounds: SoundBoard,
    pending: PendingTasks<Timeout>,
    countdown: Option<Interval>,
    celebration: Option<Timeout>,
}

impl WebHost {
    fn new(link: Scope<GameView>) -> Self {
        Self {
            link,
            view: BoardView::default(),
            sounds: SoundBoard::default(),
            pending: PendingTasks::default(),
            countdown: None,
            celebration: None,
        }
    }

    fn end_celebration(&mut self) {
        self.celebration = None;
        self.view.confetti.clear();
    }
}

impl game::Presenter for WebHost {
    fn render_deck(&mut self, deck: &game::Deck, peeking: bool) {
        self.view.show_deck(deck, peeking);
    }

    fn render_card(&mut self, card: &game::Card) {
        self.view.show_card(card);
    }

    fn update_counters(&mut self, flip_attempts: u32, time_remaining: u32, best: Option<u32>) {
        self.view.set_counters(flip_attempts, time_remaining, best);
    }

    fn play_sound(&mut self, sound: game::Sound) {
        self.sounds.play(sound);
    }

    fn show_modal(&mut self, modal: game::Modal) {
        self.view.modal = Some(modal);
    }

    fn hide_modals(&mut self) {
        self.view.modal = None;
        self.end_celebration();
    }

    fn render_celebration(&mut self) {
        self.view.confetti = scatter_confetti(CONFETTI_PIECES, js_sys::Math::random);
        let link = self.link.clone();
        self.celebration = Some(Timeout::new(CELEBRATION_MS, move || {
            link.send_message(Msg::EndCelebration)
        }));
    }
}

impl game::Scheduler for WebHost {
    fn schedule(&mut self, task: game::ScheduledTask, delay: Duration) {
        let link = self.link.clone();
        let timer = Timeout::new(millis(delay), move || link.send_message(Msg::Fire(task)));
        self.pending.insert(task, timer);
    }

    fn cancel_all(&mut self) {
        // dropping a gloo timeout clears it
        self.pending.clear();
    }
}

impl game::TimerService for WebHost {
    fn start(&mut self, round: game::RoundId, interval: Duration) {
        let link = self.link.clone();
        self.countdown = Some(Interval::new(millis(interval), move || {
            link.send_message(Msg::Tick(round))
        }));
    }

    fn stop(&mut self) {
        self.countdown = None;
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct Preferences {
    pub difficulty: Option<String>,
}

impl StorageKey for Preferences {
    const KEY: &'static str = "memoria:preferences";
}

/// Picks the first usable difficulty among the requested and the remembered one.
fn initial_difficulty(
    catalog: &game::DifficultyCatalog,
    requested: Option<&str>,
    remembered: Option<&str>,
) -> String {
    requested
        .into_iter()
        .chain(remembered)
        .find(|key| {
            let known = catalog.contains(key);
            if !known {
                log::warn!("ignoring unknown difficulty {:?}", key);
            }
            known
        })
        .unwrap_or(game::DEFAULT_DIFFICULTY)
        .to_string()
}

fn difficulty_label(key: &str) -> String {
    let mut chars = key.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect::<String>())
        .unwrap_or_default()
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Msg {
    FlipCard(game::CardId),
    SelectDifficulty(String),
    Restart,
    Fire(game::ScheduledTask),
    Tick(game::RoundId),
    EndCelebration,
}

#[derive(Properties, Clone, PartialEq)]
struct CardProps {
    id: game::CardId,
    symbol: String,
    face: CardFace,
    callback: Callback<game::CardId>,
}

#[function_component(CardView)]
fn card_component(props: &CardProps) -> Html {
    use CardFace::*;

    let CardProps {
        id,
        symbol,
        face,
        callback,
    } = props.clone();

    let class = classes!(
        "card",
        match face {
            Hidden => classes!(),
            Peek | Flipped => classes!("flip"),
            Matched => classes!("flip", "matched"),
        }
    );
    let content = if face.shows_symbol() {
        symbol
    } else {
        String::new()
    };
    let onclick = Callback::from(move |_: MouseEvent| {
        log::trace!("card {} clicked", id);
        callback.emit(id);
    });

    html! {
        <td {class} {onclick}>
            <div class="front"/>
            <div class="back">{content}</div>
        </td>
    }
}

#[derive(Properties, Clone, PartialEq)]
pub(crate) struct GameProps {
    #[prop_or_default]
    pub seed: Option<u64>,
    #[prop_or_default]
    pub difficulty: Option<String>,
}

pub(crate) struct GameView {
    controller: game::RoundController<WebHost, LocalScoreStore>,
}

impl GameView {
    fn view_modal(&self, ctx: &Context<Self>) -> Html {
        let Some(modal) = self.controller.host().view.modal else {
            return html! {};
        };
        let onclick = ctx.link().callback(|_| Msg::Restart);

        match modal {
            game::Modal::Victory(summary) => html! {
                <Overlay class={classes!("victory")}>
                    <h2>{"You won!"}</h2>
                    <p>{format!("Time left: {}s", summary.time_remaining)}</p>
                    <p>{format!("Flips: {}", summary.flip_attempts)}</p>
                    <p>
                        {format!("Best: {}", summary.best.map_or("-".to_string(), |best| best.to_string()))}
                        {summary.new_record.then_some(html! { <strong>{" New record!"}</strong> })}
                    </p>
                    <button {onclick}>{"Play again"}</button>
                </Overlay>
            },
            game::Modal::GameOver => html! {
                <Overlay class={classes!("game-over")}>
                    <h2>{"Time's up!"}</h2>
                    <button {onclick}>{"Try again"}</button>
                </Overlay>
            },
        }
    }

    fn view_confetti(&self) -> Html {
        html! {
            <>
            {
                for self.controller.host().view.confetti.iter().map(|piece| {
                let style = format!(
                    "left: {:.1}vw; animation-duration: {:.2}s; background: hsl({:.0}, 100%, 50%)",
                    piece.left_vw, piece.duration_secs, piece.hue
                );
                html! { <div class="confetti" {style}/> }
                })
            }
            </>
        }
    }
}

impl Component for GameView {
    type Message = Msg;
    type Properties = GameProps;

    fn create(ctx: &Context<Self>) -> Self {
        let props = ctx.props();
        let seed = props.seed.unwrap_or_else(js_random_seed);
        log::debug!("deck seed: {}", seed);

        let host = WebHost::new(ctx.link().clone());
        let mut controller = game::RoundController::new(host, LocalScoreStore::new(), seed);

        let preferences: Preferences = LocalOrDefault::local_or_default();
        let key = initial_difficulty(
            controller.catalog(),
            props.difficulty.as_deref(),
            preferences.difficulty.as_deref(),
        );
        if let Err(err) = controller.enter_round(&key) {
            log::error!("could not start a round on {}: {}", key, err);
        }

        Self { controller }
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        use Msg::*;

        match msg {
            FlipCard(id) => {
                self.controller.host_mut().sounds.wake();
                if let Err(err) = self.controller.flip(id) {
                    log::error!("flip on card {} failed: {}", id, err);
                }
            }
            SelectDifficulty(key) => {
                self.controller.host_mut().sounds.wake();
                log::debug!("difficulty selected: {}", key);
                match self.controller.change_difficulty(&key) {
                    Ok(()) => Preferences {
                        difficulty: Some(key),
                    }
                    .local_save(),
                    Err(err) => log::error!("could not switch to {}: {}", key, err),
                }
            }
            Restart => {
                self.controller.host_mut().sounds.wake();
                if let Err(err) = self.controller.restart() {
                    log::error!("restart failed: {}", err);
                }
            }
            Fire(task) => {
                self.controller.host_mut().pending.finish(task);
                log::trace!("{} timers pending", self.controller.host().pending.len());
                self.controller.fire(task);
            }
            Tick(round) => self.controller.tick(round),
            EndCelebration => self.controller.host_mut().end_celebration(),
        }

        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let view = &self.controller.host().view;
        let selected = self.controller.difficulty();
        let card_callback = ctx.link().callback(Msg::FlipCard);
        let cb_restart = ctx.link().callback(|_| Msg::Restart);
        let timer_class = classes!("timer", self.controller.is_low_time().then_some("low"));
        let best = view.best.map_or("-".to_string(), |best| best.to_string());

        html! {
            <div class="memoria">
                <nav class="btn-group">
                    {
                        for self.controller.catalog().keys().map(|key| {
                            let class = classes!((key == selected).then_some("active-mode"));
                            let label = difficulty_label(key);
                            let key = key.to_string();
                            let onclick = ctx.link().callback(move |_| Msg::SelectDifficulty(key.clone()));
                            html! { <button {class} {onclick}>{label}</button> }
                        })
                    }
                </nav>
                <header class="stats">
                    <span class={timer_class}>{format!("{}s", view.time_remaining)}</span>
                    <span class="flips">{view.flip_attempts}</span>
                    <span class="best">{best}</span>
                    <button class="refresh" onclick={cb_restart}>{"↻"}</button>
                </header>
                <table class="board">
                    {
                        for view.grid.rows().into_iter().map(|row| html! {
                            <tr>
                                {
                                    for row.iter().filter_map(|&id| view.slots.get(id).map(|slot| (id, slot))).map(|(id, slot)| html! {
                                        <CardView
                                            {id}
                                            symbol={slot.symbol.clone()}
                                            face={slot.face}
                                            callback={card_callback.clone()}
                                        />
                                    })
                                }
                            </tr>
                        })
                    }
                </table>
                {self.view_modal(ctx)}
                {self.view_confetti()}
            </div>
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck() -> game::Deck {
        let config = game::DifficultyConfig::new(2, 2, 2, 10).unwrap();
        let symbols = ["🍎", "🍌", "🍌", "🍎"].map(String::from).to_vec();
        game::Deck::from_symbols(config, symbols).unwrap()
    }

    #[test]
    fn peeking_deck_shows_every_symbol() {
        let mut view = BoardView::default();

        view.show_deck(&deck(), true);

        assert_eq!(view.grid.dim(), (2, 2));
        assert!(view.slots.iter().all(|slot| slot.face == CardFace::Peek));
        assert_eq!(view.slots[2].symbol, "🍌");
    }

    #[test]
    fn card_faces_follow_card_state() {
        let mut view = BoardView::default();
        let deck = deck();
        view.show_deck(&deck, false);
        assert!(view.slots.iter().all(|slot| !slot.face.shows_symbol()));

        let mut card = deck[1].clone();
        card.is_flipped = true;
        view.show_card(&card);
        assert_eq!(view.slots[1].face, CardFace::Flipped);

        card.is_matched = true;
        view.show_card(&card);
        assert_eq!(view.slots[1].face, CardFace::Matched);

        card.is_flipped = false;
        card.is_matched = false;
        view.show_card(&card);
        assert_eq!(view.slots[1].face, CardFace::Hidden);
    }

    #[test]
    fn confetti_stays_in_bounds() {
        let mut value = 0.0;
        let pieces = scatter_confetti(CONFETTI_PIECES, || {
            value = (value + 0.37) % 1.0;
            value
        });

        assert_eq!(pieces.len(), 50);
        for piece in pieces {
            assert!((0.0..100.0).contains(&piece.left_vw));
            assert!((2.0..5.0).contains(&piece.duration_secs));
            assert!((0.0..360.0).contains(&piece.hue));
        }
    }

    #[test]
    fn initial_difficulty_prefers_request_then_memory() {
        let catalog = game::DifficultyCatalog::default();

        assert_eq!(initial_difficulty(&catalog, Some("hard"), Some("easy")), "hard");
        assert_eq!(initial_difficulty(&catalog, Some("bogus"), Some("easy")), "easy");
        assert_eq!(initial_difficulty(&catalog, None, Some("bogus")), "normal");
        assert_eq!(initial_difficulty(&catalog, None, None), "normal");
    }

    #[test]
    fn labels_are_capitalized() {
        assert_eq!(difficulty_label("normal"), "Normal");
        assert_eq!(difficulty_label(""), "");
    }

    #[test]
    fn preferences_use_game_namespace() {
        assert_eq!(<Preferences as StorageKey>::KEY, "memoria:preferences");
    }

    #[test]
    fn pending_tasks_keep_one_timer_per_kind() {
        use game::{RoundId, ScheduledTask, TaskKind};

        let round = RoundId::default().next();
        let peek = ScheduledTask {
            round,
            kind: TaskKind::EndPeek,
        };
        let mismatch = ScheduledTask {
            round,
            kind: TaskKind::ResolveMismatch,
        };
        let mut pending = PendingTasks::default();

        pending.insert(peek, 1);
        pending.insert(mismatch, 2);
        pending.insert(mismatch, 3);
        assert_eq!(pending.len(), 2);

        assert_eq!(pending.finish(mismatch), Some(3));
        assert_eq!(pending.finish(mismatch), None);
        assert_eq!(pending.len(), 1);

        pending.clear();
        assert_eq!(pending.len(), 0);
    }

    #[test]
    fn stale_fire_leaves_newer_timer_alone() {
        use game::{RoundId, ScheduledTask, TaskKind};

        let old = ScheduledTask {
            round: RoundId::default().next(),
            kind: TaskKind::EndPeek,
        };
        let new = ScheduledTask {
            round: old.round.next(),
            kind: TaskKind::EndPeek,
        };
        let mut pending = PendingTasks::default();
        pending.insert(new, "new");

        assert_eq!(pending.finish(old), None);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending.finish(new), Some("new"));
    }

    #[test]
    fn durations_convert_to_timer_millis() {
        assert_eq!(millis(game::PEEK_DELAY), 2_000);
        assert_eq!(millis(game::MISMATCH_DELAY), 1_000);
        assert_eq!(millis(Duration::from_secs(u64::MAX)), u32::MAX);
    }
}
