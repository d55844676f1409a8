//! One-shot latch for round transitions.
//!
//! A round can be concluded by a learner submission or by the answering
//! countdown running out, and both can land in the same scheduling turn. Each
//! transition goes through a `TransitionGuard` so only the first caller runs.

/// State of a [`TransitionGuard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Latch {
    #[default]
    Armed,
    Fired,
}

/// Runs an action at most once until [`reset`](TransitionGuard::reset).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionGuard {
    latch: Latch,
}

impl TransitionGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `action` if the latch is still armed and returns its output.
    ///
    /// Later calls return `None` without running anything.
    pub fn fire<R>(&mut self, action: impl FnOnce() -> R) -> Option<R> {
        match self.latch {
            Latch::Armed => {
                self.latch = Latch::Fired;
                Some(action())
            }
            Latch::Fired => None,
        }
    }

    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.latch == Latch::Fired
    }

    /// Re-arms the latch for the next round.
    pub fn reset(&mut self) {
        self.latch = Latch::Armed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once() {
        let mut guard = TransitionGuard::new();
        let mut runs = 0;

        assert_eq!(guard.fire(|| { runs += 1; "first" }), Some("first"));
        assert_eq!(guard.fire(|| { runs += 1; "second" }), None);
        assert_eq!(runs, 1);
        assert!(guard.has_fired());
    }

    #[test]
    fn reset_rearms() {
        let mut guard = TransitionGuard::new();
        guard.fire(|| ());
        guard.reset();
        assert!(!guard.has_fired());
        assert_eq!(guard.fire(|| 7), Some(7));
    }
}
