use std::cell::RefCell;
use std::rc::Rc;

use quiz_core::SessionSummary;
use quiz_core::model::RoundResult;

use super::round::RoundPhase;

/// Render-facing state change of the active round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundUpdate {
    pub index: usize,
    pub phase: RoundPhase,
    pub seconds_left: u32,
}

/// Callbacks a host registers to follow a session.
///
/// Every method defaults to a no-op so hosts implement only what they render.
pub trait SessionObserver {
    /// Round entered, phase switched, or a countdown moved.
    fn on_round_changed(&mut self, _update: RoundUpdate) {}

    /// A round was graded or timed out. Called once per round.
    fn on_round_concluded(&mut self, _result: &RoundResult) {}

    /// The last round finished. Called once per session, never after a cancel.
    fn on_session_completed(&mut self, _results: &[RoundResult], _summary: &SessionSummary) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}

/// Lets a host keep a handle on its observer while the session owns a clone.
impl<T: SessionObserver> SessionObserver for Rc<RefCell<T>> {
    fn on_round_changed(&mut self, update: RoundUpdate) {
        self.borrow_mut().on_round_changed(update);
    }

    fn on_round_concluded(&mut self, result: &RoundResult) {
        self.borrow_mut().on_round_concluded(result);
    }

    fn on_session_completed(&mut self, results: &[RoundResult], summary: &SessionSummary) {
        self.borrow_mut().on_session_completed(results, summary);
    }
}
