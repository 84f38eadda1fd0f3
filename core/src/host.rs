use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sound {
    Flip,
    Match,
    Wrong,
    Win,
    Lose,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VictorySummary {
    pub time_remaining: u32,
    pub flip_attempts: u32,
    pub best: Option<u32>,
    pub new_record: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modal {
    Victory(VictorySummary),
    GameOver,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskKind {
    /// Turns the deck face-down and starts the countdown.
    EndPeek,
    /// Turns a mismatched pair face-down again.
    ResolveMismatch,
}

/// Delayed continuation, only honored while its round is still the live one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub round: RoundId,
    pub kind: TaskKind,
}

/// Everything the player sees and hears.
pub trait Presenter {
    fn render_deck(&mut self, deck: &Deck, peeking: bool);
    fn render_card(&mut self, card: &Card);
    fn update_counters(&mut self, flip_attempts: u32, time_remaining: u32, best: Option<u32>);
    /// Must never fail, sound is optional.
    fn play_sound(&mut self, sound: Sound);
    fn show_modal(&mut self, modal: Modal);
    fn hide_modals(&mut self);
    fn render_celebration(&mut self);
}

/// One-shot delayed tasks. Fired tasks go back into [`RoundController::fire`].
pub trait Scheduler {
    fn schedule(&mut self, task: ScheduledTask, delay: Duration);
    /// Drops every task that has not fired yet.
    fn cancel_all(&mut self);
}

pub trait Host: Presenter + Scheduler + TimerService {}

impl<T: Presenter + Scheduler + TimerService> Host for T {}
