use core::time::Duration;

use crate::*;

/// Cadence of countdown ticks.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Repeating countdown driver. Every tick must be routed back into
/// [`RoundController::tick`] with the round it was started for.
pub trait TimerService {
    /// Starts ticking for `round`, replacing any run already in progress.
    fn start(&mut self, round: RoundId, interval: Duration);

    /// Stops the current run, if any.
    fn stop(&mut self);
}

/// Timer without a clock of its own, the owner decides when ticks happen.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ManualTimer {
    running: Option<(RoundId, Duration)>,
    runs_started: u32,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Round the next tick belongs to.
    pub fn running_round(&self) -> Option<RoundId> {
        self.running.map(|(round, _)| round)
    }

    pub fn interval(&self) -> Option<Duration> {
        self.running.map(|(_, interval)| interval)
    }

    pub fn runs_started(&self) -> u32 {
        self.runs_started
    }
}

impl TimerService for ManualTimer {
    fn start(&mut self, round: RoundId, interval: Duration) {
        if let Some((previous, _)) = self.running.replace((round, interval)) {
            log::trace!("timer for {:?} replaced by {:?}", previous, round);
        }
        self.runs_started += 1;
    }

    fn stop(&mut self) {
        self.running = None;
    }
}
