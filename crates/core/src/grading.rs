//! Correctness evaluation for multiple-choice questions.
//!
//! Grading is all-or-nothing: a multi-answer question only counts when the
//! selection matches the correct set exactly.

use serde::{Deserialize, Serialize};

use crate::model::{Choice, Selection};

/// Whether a question expects one answer or several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    Single,
    Multi,
}

impl Modality {
    /// `Multi` iff more than one choice is flagged correct.
    ///
    /// A question with no correct choice is reported as `Single`; it can never
    /// be answered correctly.
    #[must_use]
    pub fn of(choices: &[Choice]) -> Self {
        if choices.iter().filter(|c| c.is_correct).count() > 1 {
            Modality::Multi
        } else {
            Modality::Single
        }
    }
}

/// Output of [`grade`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grade {
    pub is_correct: bool,
    pub modality: Modality,
}

/// Grades a selection against a question's choices.
///
/// - Single-answer: exactly one index selected and it points at the correct
///   choice.
/// - Multi-answer: the selected set equals the set of correct indices.
///
/// Indices outside `choices` never match, so an empty choice list grades every
/// selection as incorrect.
#[must_use]
pub fn grade(choices: &[Choice], selected: &Selection) -> Grade {
    let modality = Modality::of(choices);
    let is_correct = match modality {
        Modality::Single => {
            selected.len() == 1
                && selected
                    .first()
                    .and_then(|&idx| choices.get(idx))
                    .is_some_and(|choice| choice.is_correct)
        }
        Modality::Multi => correct_indices(choices) == *selected,
    };

    Grade {
        is_correct,
        modality,
    }
}

/// Indices of every choice flagged correct.
#[must_use]
pub fn correct_indices(choices: &[Choice]) -> Selection {
    choices
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_correct)
        .map(|(idx, _)| idx)
        .collect()
}
