use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quiz_core::grading::Modality;
use quiz_core::model::{ExerciseId, RoundResult, Selection, SessionId};
use quiz_core::time::format_elapsed;
use quiz_core::SessionSummary;

use super::round::RoundPhase;

/// Presentation-agnostic view of the round on screen.
///
/// Correct answers are only exposed once the round is revealing, so a host
/// cannot accidentally render them during the answering window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSnapshot {
    pub index: usize,
    pub total: usize,
    pub exercise_id: ExerciseId,
    pub question: String,
    pub choices: Vec<String>,
    pub modality: Modality,
    pub phase: RoundPhase,
    pub seconds_left: u32,
    /// False when the choice payload could not be parsed.
    pub playable: bool,
    pub result: Option<RoundResult>,
    pub correct_answers: Option<Selection>,
}

/// Completed playthrough, shaped for the host to persist or display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub session_id: SessionId,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub results: Vec<RoundResult>,
    pub summary: SessionSummary,
    pub average_seconds_spent: f64,
}

impl SessionReport {
    /// Total session time as `m:ss`.
    #[must_use]
    pub fn elapsed_label(&self) -> String {
        format_elapsed(self.summary.total_seconds_elapsed)
    }
}
