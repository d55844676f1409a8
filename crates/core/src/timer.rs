//! Two-phase countdown driving a single round.
//!
//! One timer per round covers both the answering window and the reveal window
//! that follows it, so the switch between them happens inside one call and
//! there is never a moment where both windows are counting.

use serde::{Deserialize, Serialize};

/// Phase the round timer is currently counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    Answering,
    Revealing,
    Stopped,
}

/// What a single tick did to the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// The timer is stopped; nothing changed.
    Idle,
    /// Answering countdown moved; seconds remaining.
    Answering(u32),
    /// The answering countdown just reached zero.
    AnsweringExpired,
    /// Reveal countdown moved; seconds remaining.
    Revealing(u32),
    /// The reveal countdown just reached zero and the timer stopped.
    RevealExpired,
}

/// Countdown for one round. Both counters only ever go down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTimer {
    answering_total: u32,
    reveal_total: u32,
    answering_left: u32,
    reveal_left: u32,
    phase: TimerPhase,
}

impl RoundTimer {
    /// Starts a fresh timer in the answering phase.
    #[must_use]
    pub fn start(answering_secs: u32, reveal_secs: u32) -> Self {
        Self {
            answering_total: answering_secs,
            reveal_total: reveal_secs,
            answering_left: answering_secs,
            reveal_left: reveal_secs,
            phase: TimerPhase::Answering,
        }
    }

    #[must_use]
    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    #[must_use]
    pub fn answering_seconds_left(&self) -> u32 {
        self.answering_left
    }

    #[must_use]
    pub fn reveal_seconds_left(&self) -> u32 {
        self.reveal_left
    }

    /// Seconds left in whichever phase is running; zero once stopped.
    #[must_use]
    pub fn seconds_left(&self) -> u32 {
        match self.phase {
            TimerPhase::Answering => self.answering_left,
            TimerPhase::Revealing => self.reveal_left,
            TimerPhase::Stopped => 0,
        }
    }

    /// Answering time consumed so far, capped at the answering duration.
    #[must_use]
    pub fn answering_elapsed(&self) -> u32 {
        self.answering_total.saturating_sub(self.answering_left)
    }

    /// Advances one second in the current phase.
    pub fn tick(&mut self) -> TimerEvent {
        match self.phase {
            TimerPhase::Answering => {
                if self.answering_left == 0 {
                    return TimerEvent::AnsweringExpired;
                }
                self.answering_left -= 1;
                if self.answering_left == 0 {
                    TimerEvent::AnsweringExpired
                } else {
                    TimerEvent::Answering(self.answering_left)
                }
            }
            TimerPhase::Revealing => {
                self.reveal_left = self.reveal_left.saturating_sub(1);
                if self.reveal_left == 0 {
                    self.phase = TimerPhase::Stopped;
                    TimerEvent::RevealExpired
                } else {
                    TimerEvent::Revealing(self.reveal_left)
                }
            }
            TimerPhase::Stopped => TimerEvent::Idle,
        }
    }

    /// Freezes the answering countdown and starts the reveal window.
    ///
    /// Returns false if the timer is not in the answering phase.
    pub fn begin_reveal(&mut self) -> bool {
        if self.phase != TimerPhase::Answering {
            return false;
        }
        self.reveal_left = self.reveal_total;
        self.phase = TimerPhase::Revealing;
        true
    }

    /// Stops the timer; further ticks are ignored.
    pub fn stop(&mut self) {
        self.phase = TimerPhase::Stopped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answering_counts_down_then_expires() {
        let mut timer = RoundTimer::start(3, 2);
        assert_eq!(timer.phase(), TimerPhase::Answering);
        assert_eq!(timer.tick(), TimerEvent::Answering(2));
        assert_eq!(timer.tick(), TimerEvent::Answering(1));
        assert_eq!(timer.tick(), TimerEvent::AnsweringExpired);
        assert_eq!(timer.answering_seconds_left(), 0);
        assert_eq!(timer.answering_elapsed(), 3);
        // Still answering until the owner switches phases.
        assert_eq!(timer.phase(), TimerPhase::Answering);
        assert_eq!(timer.tick(), TimerEvent::AnsweringExpired);
        assert_eq!(timer.answering_elapsed(), 3);
    }

    #[test]
    fn reveal_freezes_answering_and_stops_at_zero() {
        let mut timer = RoundTimer::start(10, 2);
        timer.tick();
        timer.tick();
        assert!(timer.begin_reveal());
        assert_eq!(timer.answering_elapsed(), 2);
        assert_eq!(timer.seconds_left(), 2);

        assert_eq!(timer.tick(), TimerEvent::Revealing(1));
        assert_eq!(timer.tick(), TimerEvent::RevealExpired);
        assert_eq!(timer.phase(), TimerPhase::Stopped);
        assert_eq!(timer.tick(), TimerEvent::Idle);
        assert_eq!(timer.answering_seconds_left(), 8);
    }

    #[test]
    fn begin_reveal_only_from_answering() {
        let mut timer = RoundTimer::start(5, 1);
        assert!(timer.begin_reveal());
        assert!(!timer.begin_reveal());
        timer.stop();
        assert!(!timer.begin_reveal());
        assert_eq!(timer.seconds_left(), 0);
    }

    #[test]
    fn stopped_timer_ignores_ticks() {
        let mut timer = RoundTimer::start(5, 5);
        timer.stop();
        assert_eq!(timer.tick(), TimerEvent::Idle);
        assert_eq!(timer.answering_seconds_left(), 5);
    }
}
