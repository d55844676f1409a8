use serde::{Deserialize, Serialize};

use quiz_core::grading::{Grade, Modality, grade};
use quiz_core::model::{Choice, Exercise, RoundResult, Selection, SessionSettings};
use quiz_core::{RoundTimer, TimerEvent, TimerPhase, TransitionGuard};

/// Sub-state of the active round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    Answering,
    Revealing,
}

//
// ─── ROUND ─────────────────────────────────────────────────────────────────────
//

/// Live state of the question currently on screen.
///
/// Created when the session moves onto a question and dropped when the next
/// one begins, so the latches below never carry over between rounds.
#[derive(Debug)]
pub(crate) struct Round {
    exercise: Exercise,
    index: usize,
    choices: Vec<Choice>,
    modality: Modality,
    timer: RoundTimer,
    result: Option<RoundResult>,
    conclude: TransitionGuard,
    advance: TransitionGuard,
}

impl Round {
    pub(crate) fn begin(exercise: Exercise, index: usize, settings: &SessionSettings) -> Self {
        let choices = exercise.choices();
        if choices.is_empty() {
            tracing::warn!(
                exercise = %exercise.id,
                index,
                "question has no playable choices"
            );
        }
        let modality = Modality::of(&choices);

        Self {
            exercise,
            index,
            choices,
            modality,
            timer: RoundTimer::start(settings.answering_secs(), settings.reveal_secs()),
            result: None,
            conclude: TransitionGuard::new(),
            advance: TransitionGuard::new(),
        }
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn exercise(&self) -> &Exercise {
        &self.exercise
    }

    pub(crate) fn choices(&self) -> &[Choice] {
        &self.choices
    }

    pub(crate) fn modality(&self) -> Modality {
        self.modality
    }

    pub(crate) fn result(&self) -> Option<&RoundResult> {
        self.result.as_ref()
    }

    pub(crate) fn phase(&self) -> RoundPhase {
        match self.timer.phase() {
            TimerPhase::Answering => RoundPhase::Answering,
            TimerPhase::Revealing | TimerPhase::Stopped => RoundPhase::Revealing,
        }
    }

    pub(crate) fn seconds_left(&self) -> u32 {
        self.timer.seconds_left()
    }

    pub(crate) fn tick(&mut self) -> TimerEvent {
        self.timer.tick()
    }

    /// Concludes the round once; `None` means the answering window ran out.
    ///
    /// Returns the recorded result on the first call only. The answering
    /// countdown freezes and the reveal window starts in the same step.
    pub(crate) fn conclude(&mut self, selection: Option<Selection>) -> Option<RoundResult> {
        if self.phase() != RoundPhase::Answering {
            return None;
        }

        let result = self.conclude.fire(|| {
            let seconds_spent = self.timer.answering_elapsed();
            match selection {
                Some(selected) => {
                    let Grade { is_correct, .. } = grade(&self.choices, &selected);
                    RoundResult::submitted(
                        self.exercise.id.clone(),
                        is_correct,
                        selected,
                        seconds_spent,
                    )
                }
                None => RoundResult::timed_out(self.exercise.id.clone(), seconds_spent),
            }
        })?;

        self.timer.begin_reveal();
        self.result = Some(result.clone());
        Some(result)
    }

    /// Claims the right to move past this round. True exactly once, and only
    /// after the round has a recorded result.
    pub(crate) fn claim_advance(&mut self) -> bool {
        if self.result.is_none() {
            return false;
        }
        self.advance.fire(|| ()).is_some()
    }

    /// Stops the countdown without recording anything.
    pub(crate) fn abort(&mut self) {
        self.timer.stop();
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::ExerciseId;

    fn round() -> Round {
        let exercise = Exercise::multiple_choice(
            ExerciseId::new(1),
            "pick B",
            &[Choice::incorrect("A"), Choice::correct("B")],
        );
        let settings = SessionSettings::new(3, 2, false).unwrap();
        Round::begin(exercise, 0, &settings)
    }

    #[test]
    fn conclude_runs_once() {
        let mut round = round();
        round.tick();

        let first = round.conclude(Some(Selection::from([1]))).unwrap();
        assert!(first.is_correct);
        assert_eq!(first.seconds_spent, 1);
        assert_eq!(round.phase(), RoundPhase::Revealing);

        assert!(round.conclude(Some(Selection::from([0]))).is_none());
        assert!(round.conclude(None).is_none());
        assert_eq!(round.result(), Some(&first));
    }

    #[test]
    fn timeout_conclusion_has_no_selection() {
        let mut round = round();
        for _ in 0..3 {
            round.tick();
        }
        let result = round.conclude(None).unwrap();
        assert!(!result.is_correct);
        assert!(result.selected_answers.is_empty());
        assert_eq!(result.seconds_spent, 3);
    }

    #[test]
    fn advance_requires_a_result_and_fires_once() {
        let mut round = round();
        assert!(!round.claim_advance());
        round.conclude(None);
        assert!(round.claim_advance());
        assert!(!round.claim_advance());
    }

    #[test]
    fn abort_stops_the_timer() {
        let mut round = round();
        round.abort();
        assert_eq!(round.tick(), TimerEvent::Idle);
        assert!(round.conclude(None).is_none());
    }
}
