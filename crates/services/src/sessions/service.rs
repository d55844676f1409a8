use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use std::fmt;
use tracing::{debug, info};

use quiz_core::grading::correct_indices;
use quiz_core::model::{Exercise, RoundResult, SessionId, SessionSettings, gradable_exercises};
use quiz_core::{Clock, ResultAggregator, SessionSummary, TimerEvent};

use super::observer::{NoopObserver, RoundUpdate, SessionObserver};
use super::progress::SessionProgress;
use super::round::{Round, RoundPhase};
use super::view::{RoundSnapshot, SessionReport};
use crate::error::SessionError;

//
// ─── STATUS / OUTCOMES ─────────────────────────────────────────────────────────
//

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    NotStarted,
    InProgress,
    Completed,
    /// Aborted by the host; terminal, produces no completion.
    Cancelled,
}

/// What a tick did to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Session not running; nothing changed.
    Idle,
    /// Tick was scheduled for a round that is no longer current.
    Stale,
    /// A countdown moved.
    Counting {
        index: usize,
        phase: RoundPhase,
        seconds_left: u32,
    },
    /// The answering window closed without a submission.
    TimedOut(RoundResult),
    /// The reveal window closed and the next round began.
    Advanced { index: usize },
    /// The reveal window of the last round closed.
    Completed(SessionSummary),
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Timed multiple-choice session.
///
/// Rounds run strictly one after another: answering (fixed countdown), then a
/// reveal window, then the next round. The host drives time by calling
/// [`tick`](Self::tick) once per second and forwards learner answers through
/// [`submit_answer`](Self::submit_answer). Both calls are synchronous; when
/// they race inside one scheduling turn, whichever call the host makes first
/// concludes the round and the other becomes a no-op.
pub struct SessionService {
    id: SessionId,
    settings: SessionSettings,
    clock: Clock,
    status: SessionStatus,
    rounds: Vec<Exercise>,
    current: Option<Round>,
    aggregator: ResultAggregator,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    observer: Box<dyn SessionObserver>,
}

impl SessionService {
    /// Creates an idle session. Nothing runs until [`start`](Self::start).
    #[must_use]
    pub fn new(settings: SessionSettings, clock: Clock) -> Self {
        Self {
            id: SessionId::generate(),
            settings,
            clock,
            status: SessionStatus::NotStarted,
            rounds: Vec::new(),
            current: None,
            aggregator: ResultAggregator::default(),
            started_at: None,
            completed_at: None,
            observer: Box::new(NoopObserver),
        }
    }

    #[must_use]
    pub fn with_observer(mut self, observer: impl SessionObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub(crate) fn with_boxed_observer(mut self, observer: Box<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub(crate) fn into_observer(self) -> Box<dyn SessionObserver> {
        self.observer
    }

    // ── lifecycle ────────────────────────────────────────────────────────────

    /// Filters `exercises` to multiple-choice and begins round 0.
    ///
    /// Returns the number of rounds.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NothingToPlay` if no exercise is gradable; the
    /// session stays `NotStarted`. Returns a wrong-state error if the session
    /// was already started, completed or cancelled.
    pub fn start(
        &mut self,
        exercises: impl IntoIterator<Item = Exercise>,
    ) -> Result<usize, SessionError> {
        match self.status {
            SessionStatus::NotStarted => {}
            SessionStatus::InProgress => return Err(SessionError::AlreadyStarted),
            SessionStatus::Completed => return Err(SessionError::Completed),
            SessionStatus::Cancelled => return Err(SessionError::Cancelled),
        }

        let mut rounds = gradable_exercises(exercises);
        if rounds.is_empty() {
            info!(session = %self.id, "nothing to play: no multiple-choice exercises");
            return Err(SessionError::NothingToPlay);
        }
        if self.settings.shuffle_rounds() {
            rounds.shuffle(&mut rand::rng());
        }

        self.aggregator = ResultAggregator::new(rounds.len());
        self.rounds = rounds;
        self.status = SessionStatus::InProgress;
        self.started_at = Some(self.clock.now());
        info!(
            session = %self.id,
            rounds = self.rounds.len(),
            answering_secs = self.settings.answering_secs(),
            reveal_secs = self.settings.reveal_secs(),
            "session started"
        );

        self.enter_round(0);
        Ok(self.rounds.len())
    }

    /// Submits the learner's selection for the current round.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotAnswering` if the round already concluded,
    /// or a wrong-state error when no round is running. Results are untouched.
    pub fn submit_answer(
        &mut self,
        selected: impl IntoIterator<Item = usize>,
    ) -> Result<RoundResult, SessionError> {
        self.ensure_running()?;
        let Some(round) = self.current.as_mut() else {
            return Err(SessionError::NotStarted);
        };

        let index = round.index();
        let Some(result) = round.conclude(Some(selected.into_iter().collect())) else {
            debug!(session = %self.id, index, "ignoring answer outside the answering window");
            return Err(SessionError::NotAnswering { index });
        };

        debug!(
            session = %self.id,
            index,
            correct = result.is_correct,
            seconds_spent = result.seconds_spent,
            "answer submitted"
        );
        self.record(&result);
        Ok(result)
    }

    /// Advances session time by one second.
    pub fn tick(&mut self) -> TickOutcome {
        if self.status != SessionStatus::InProgress {
            return TickOutcome::Idle;
        }
        let Some(round) = self.current.as_mut() else {
            return TickOutcome::Idle;
        };
        let index = round.index();
        let event = round.tick();

        self.aggregator.add_elapsed(1);
        self.clock.advance_secs(1);

        match event {
            TimerEvent::Answering(seconds_left) => self.counting(index, RoundPhase::Answering, seconds_left),
            TimerEvent::Revealing(seconds_left) => self.counting(index, RoundPhase::Revealing, seconds_left),
            TimerEvent::AnsweringExpired => self.time_out(index),
            TimerEvent::RevealExpired | TimerEvent::Idle => self.advance(),
        }
    }

    /// Tick scheduled for a specific round; ignored unless that round is
    /// still current.
    pub fn tick_round(&mut self, index: usize) -> TickOutcome {
        match self.current.as_ref().map(Round::index) {
            Some(current) if current == index => self.tick(),
            current => {
                debug!(session = %self.id, index, ?current, "dropping stale tick");
                TickOutcome::Stale
            }
        }
    }

    /// Aborts the session. The round on screen records no result and no
    /// completion is emitted. Returns false if the session already ended.
    pub fn cancel(&mut self) -> bool {
        match self.status {
            SessionStatus::NotStarted | SessionStatus::InProgress => {
                if let Some(mut round) = self.current.take() {
                    round.abort();
                }
                self.status = SessionStatus::Cancelled;
                info!(
                    session = %self.id,
                    concluded = self.aggregator.results().len(),
                    "session cancelled"
                );
                true
            }
            SessionStatus::Completed | SessionStatus::Cancelled => false,
        }
    }

    // ── accessors ────────────────────────────────────────────────────────────

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status == SessionStatus::Completed
    }

    /// Gradable exercises in play order.
    #[must_use]
    pub fn rounds(&self) -> &[Exercise] {
        &self.rounds
    }

    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.current.as_ref().map(Round::index)
    }

    #[must_use]
    pub fn current_phase(&self) -> Option<RoundPhase> {
        self.current.as_ref().map(Round::phase)
    }

    #[must_use]
    pub fn results(&self) -> &[RoundResult] {
        self.aggregator.results()
    }

    #[must_use]
    pub fn total_seconds_elapsed(&self) -> u32 {
        self.aggregator.total_seconds_elapsed()
    }

    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        self.aggregator.summary()
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.rounds.len();
        let concluded = self.aggregator.results().len();
        SessionProgress {
            total,
            concluded,
            remaining: total.saturating_sub(concluded),
            current: self.current_index(),
            is_complete: self.is_complete(),
        }
    }

    /// View of the round on screen, if any.
    #[must_use]
    pub fn snapshot(&self) -> Option<RoundSnapshot> {
        let round = self.current.as_ref()?;
        let phase = round.phase();
        Some(RoundSnapshot {
            index: round.index(),
            total: self.rounds.len(),
            exercise_id: round.exercise().id.clone(),
            question: round.exercise().question.clone(),
            choices: round.choices().iter().map(|c| c.text.clone()).collect(),
            modality: round.modality(),
            phase,
            seconds_left: round.seconds_left(),
            playable: !round.choices().is_empty(),
            result: round.result().cloned(),
            correct_answers: (phase == RoundPhase::Revealing)
                .then(|| correct_indices(round.choices())),
        })
    }

    /// Full report once the session completed.
    #[must_use]
    pub fn report(&self) -> Option<SessionReport> {
        if !self.is_complete() {
            return None;
        }
        Some(SessionReport {
            session_id: self.id,
            started_at: self.started_at?,
            completed_at: self.completed_at?,
            results: self.aggregator.results().to_vec(),
            summary: self.aggregator.summary(),
            average_seconds_spent: self.aggregator.average_seconds_spent(),
        })
    }

    // ── internals ────────────────────────────────────────────────────────────

    fn ensure_running(&self) -> Result<(), SessionError> {
        match self.status {
            SessionStatus::InProgress => Ok(()),
            SessionStatus::NotStarted => Err(SessionError::NotStarted),
            SessionStatus::Completed => Err(SessionError::Completed),
            SessionStatus::Cancelled => Err(SessionError::Cancelled),
        }
    }

    fn enter_round(&mut self, index: usize) {
        let Some(exercise) = self.rounds.get(index).cloned() else {
            return;
        };
        let round = Round::begin(exercise, index, &self.settings);
        let update = RoundUpdate {
            index,
            phase: round.phase(),
            seconds_left: round.seconds_left(),
        };
        self.current = Some(round);
        debug!(session = %self.id, index, "round started");
        self.observer.on_round_changed(update);
    }

    fn counting(&mut self, index: usize, phase: RoundPhase, seconds_left: u32) -> TickOutcome {
        self.observer.on_round_changed(RoundUpdate {
            index,
            phase,
            seconds_left,
        });
        TickOutcome::Counting {
            index,
            phase,
            seconds_left,
        }
    }

    fn time_out(&mut self, index: usize) -> TickOutcome {
        let Some(result) = self.current.as_mut().and_then(|round| round.conclude(None)) else {
            return TickOutcome::Idle;
        };
        debug!(session = %self.id, index, "answering window expired");
        self.record(&result);
        TickOutcome::TimedOut(result)
    }

    /// Appends a concluded round and tells the host the reveal window opened.
    fn record(&mut self, result: &RoundResult) {
        let recorded = self.aggregator.record(result.clone());
        debug_assert!(
            recorded,
            "round {} concluded after every slot was filled",
            result.exercise_id
        );
        self.observer.on_round_concluded(result);
        if let Some(round) = self.current.as_ref() {
            self.observer.on_round_changed(RoundUpdate {
                index: round.index(),
                phase: round.phase(),
                seconds_left: round.seconds_left(),
            });
        }
    }

    fn advance(&mut self) -> TickOutcome {
        let Some(round) = self.current.as_mut() else {
            return TickOutcome::Idle;
        };
        if !round.claim_advance() {
            return TickOutcome::Idle;
        }

        let next = round.index() + 1;
        if next < self.rounds.len() {
            self.enter_round(next);
            TickOutcome::Advanced { index: next }
        } else {
            self.complete()
        }
    }

    fn complete(&mut self) -> TickOutcome {
        self.current = None;
        self.status = SessionStatus::Completed;
        self.completed_at = Some(self.clock.now());

        let summary = self.aggregator.summary();
        info!(
            session = %self.id,
            correct = summary.correct_count,
            total = summary.total_count,
            percentage = summary.percentage,
            seconds = summary.total_seconds_elapsed,
            tier = summary.tier.label(),
            "session completed"
        );
        self.observer
            .on_session_completed(self.aggregator.results(), &summary);
        TickOutcome::Completed(summary)
    }
}

impl fmt::Debug for SessionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionService")
            .field("id", &self.id)
            .field("status", &self.status)
            .field("rounds_len", &self.rounds.len())
            .field("current", &self.current_index())
            .field("results_len", &self.aggregator.results().len())
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
