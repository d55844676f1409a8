use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::ids::ExerciseId;

/// Set of choice indices a learner picked. Ordering carries no meaning.
pub type Selection = BTreeSet<usize>;

/// How a round came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conclusion {
    /// The learner submitted before the answering window closed.
    Submitted,
    /// The answering window closed with no submission.
    TimedOut,
}

/// Immutable record of one concluded round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundResult {
    pub exercise_id: ExerciseId,
    pub is_correct: bool,
    pub selected_answers: Selection,
    pub seconds_spent: u32,
    pub conclusion: Conclusion,
}

impl RoundResult {
    #[must_use]
    pub fn submitted(
        exercise_id: ExerciseId,
        is_correct: bool,
        selected_answers: Selection,
        seconds_spent: u32,
    ) -> Self {
        Self {
            exercise_id,
            is_correct,
            selected_answers,
            seconds_spent,
            conclusion: Conclusion::Submitted,
        }
    }

    /// Timeout penalty: never correct, never carries a selection.
    #[must_use]
    pub fn timed_out(exercise_id: ExerciseId, seconds_spent: u32) -> Self {
        Self {
            exercise_id,
            is_correct: false,
            selected_answers: Selection::new(),
            seconds_spent,
            conclusion: Conclusion::TimedOut,
        }
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        self.conclusion == Conclusion::TimedOut
    }
}
