use quiz_core::Clock;
use quiz_core::model::{Exercise, SessionSettings};

use super::observer::SessionObserver;
use super::service::SessionService;
use crate::error::SessionError;

/// Orchestrates session start and retry for a lesson player.
///
/// Holds the settings and clock every playthrough shares. Each start or retry
/// hands back a brand-new `SessionService`; nothing carries over except the
/// exercise list and the observer.
#[derive(Debug, Clone, Copy)]
pub struct SessionLoopService {
    settings: SessionSettings,
    clock: Clock,
}

impl SessionLoopService {
    #[must_use]
    pub fn new(settings: SessionSettings, clock: Clock) -> Self {
        Self { settings, clock }
    }

    #[must_use]
    pub fn with_shuffle_rounds(mut self, shuffle: bool) -> Self {
        self.settings = self.settings.with_shuffle_rounds(shuffle);
        self
    }

    #[must_use]
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Start a new session over `exercises`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NothingToPlay` if no exercise is multiple-choice.
    pub fn start_session(
        &self,
        exercises: impl IntoIterator<Item = Exercise>,
    ) -> Result<SessionService, SessionError> {
        let mut session = SessionService::new(self.settings, self.clock);
        session.start(exercises)?;
        Ok(session)
    }

    /// Start a new session that reports to `observer`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NothingToPlay` if no exercise is multiple-choice.
    pub fn start_session_with_observer(
        &self,
        exercises: impl IntoIterator<Item = Exercise>,
        observer: impl SessionObserver + 'static,
    ) -> Result<SessionService, SessionError> {
        let mut session = SessionService::new(self.settings, self.clock).with_observer(observer);
        session.start(exercises)?;
        Ok(session)
    }

    /// Discard `previous` and play the same rounds again with a fresh id,
    /// fresh timers and empty results. The observer moves to the new session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NothingToPlay` if `previous` never had any rounds.
    pub fn retry(&self, mut previous: SessionService) -> Result<SessionService, SessionError> {
        previous.cancel();
        let rounds = previous.rounds().to_vec();
        let previous_id = previous.id();
        let observer = previous.into_observer();

        let mut session =
            SessionService::new(self.settings, self.clock).with_boxed_observer(observer);
        session.start(rounds)?;
        tracing::info!(previous = %previous_id, session = %session.id(), "session retried");
        Ok(session)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Choice, ExerciseId};
    use quiz_core::time::fixed_clock;

    use crate::sessions::SessionStatus;

    fn exercises() -> Vec<Exercise> {
        (1..=2)
            .map(|id| {
                Exercise::multiple_choice(
                    ExerciseId::new(id),
                    "pick A",
                    &[Choice::correct("A"), Choice::incorrect("B")],
                )
            })
            .collect()
    }

    #[test]
    fn retry_starts_fresh_over_same_rounds() {
        let loop_svc = SessionLoopService::new(SessionSettings::default(), fixed_clock());
        let mut first = loop_svc.start_session(exercises()).unwrap();
        first.submit_answer([0]).unwrap();
        let first_id = first.id();

        let second = loop_svc.retry(first).unwrap();
        assert_ne!(second.id(), first_id);
        assert_eq!(second.status(), SessionStatus::InProgress);
        assert_eq!(second.rounds().len(), 2);
        assert!(second.results().is_empty());
        assert_eq!(second.current_index(), Some(0));
    }

    #[test]
    fn retry_of_unstarted_session_reports_nothing_to_play() {
        let loop_svc = SessionLoopService::new(SessionSettings::default(), fixed_clock());
        let idle = SessionService::new(SessionSettings::default(), fixed_clock());
        assert_eq!(loop_svc.retry(idle).unwrap_err(), SessionError::NothingToPlay);
    }

    #[test]
    fn shuffle_flag_flows_into_settings() {
        let loop_svc =
            SessionLoopService::new(SessionSettings::default(), fixed_clock()).with_shuffle_rounds(true);
        assert!(loop_svc.settings().shuffle_rounds());
    }
}
