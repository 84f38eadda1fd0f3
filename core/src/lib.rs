//! Round logic of a memory matching game: deal a paired deck, let the player peek, then flip
//! two cards at a time against a countdown until every pair is found or time runs out.
//!
//! The crate never touches a screen or a clock. A [`RoundController`] talks to the outside
//! through the [`Host`] traits and is driven back by [`RoundController::fire`] and
//! [`RoundController::tick`].
#![no_std]

extern crate alloc;

pub use controller::*;
pub use deck::*;
pub use difficulty::*;
pub use error::*;
pub use host::*;
pub use round::*;
pub use score::*;
pub use timer::*;

mod controller;
mod deck;
mod difficulty;
mod error;
mod host;
mod round;
mod score;
mod timer;
