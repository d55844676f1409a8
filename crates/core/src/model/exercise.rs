use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::model::choice::{Choice, parse_choices};
use crate::model::ids::ExerciseId;

//
// ─── EXERCISE KIND ────────────────────────────────────────────────────────────
//

/// Exercise type as reported by the backend.
///
/// Only `MultipleChoice` takes part in a timed session. Unknown kinds are kept
/// as `Other` so a lesson containing a newer exercise type still loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExerciseKind {
    MultipleChoice,
    Coding,
    OpenEnded,
    #[serde(other)]
    Other,
}

impl ExerciseKind {
    /// Returns true when the session engine knows how to grade this kind.
    #[must_use]
    pub fn is_gradable(self) -> bool {
        matches!(self, ExerciseKind::MultipleChoice)
    }
}

//
// ─── EXERCISE ─────────────────────────────────────────────────────────────────
//

/// An exercise attached to a lesson, immutable for the duration of a session.
///
/// `choices` holds the raw payload exactly as supplied; it is parsed lazily
/// through [`Exercise::choices`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: ExerciseId,
    #[serde(rename = "type")]
    pub kind: ExerciseKind,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub choices: Value,
}

impl Exercise {
    #[must_use]
    pub fn new(id: ExerciseId, kind: ExerciseKind, question: impl Into<String>, choices: Value) -> Self {
        Self {
            id,
            kind,
            question: question.into(),
            choices,
        }
    }

    /// Builds a multiple-choice exercise whose payload is encoded the same way
    /// the backend stores it (a JSON document inside a string).
    #[must_use]
    pub fn multiple_choice(id: ExerciseId, question: impl Into<String>, choices: &[Choice]) -> Self {
        let encoded = json!({ "choices": choices }).to_string();
        Self::new(id, ExerciseKind::MultipleChoice, question, Value::String(encoded))
    }

    #[must_use]
    pub fn is_gradable(&self) -> bool {
        self.kind.is_gradable()
    }

    /// Parsed answer options; empty when the payload is malformed.
    #[must_use]
    pub fn choices(&self) -> Vec<Choice> {
        parse_choices(&self.choices)
    }
}

/// Keeps only the exercises a timed session can grade, preserving order.
#[must_use]
pub fn gradable_exercises(exercises: impl IntoIterator<Item = Exercise>) -> Vec<Exercise> {
    exercises
        .into_iter()
        .filter(Exercise::is_gradable)
        .collect()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_backend_shape() {
        let raw = r#"{
            "id": 12,
            "type": "MULTIPLE_CHOICE",
            "question": "2 + 2?",
            "choices": "{\"choices\":[{\"text\":\"4\",\"isCorrect\":true},{\"text\":\"5\",\"isCorrect\":false}]}"
        }"#;
        let exercise: Exercise = serde_json::from_str(raw).unwrap();

        assert_eq!(exercise.id, ExerciseId::new(12));
        assert_eq!(exercise.kind, ExerciseKind::MultipleChoice);
        assert_eq!(
            exercise.choices(),
            vec![Choice::correct("4"), Choice::incorrect("5")]
        );
    }

    #[test]
    fn deserializes_string_id() {
        let raw = r#"{
            "id": "3f2a-uuid",
            "type": "MULTIPLE_CHOICE",
            "question": "Pick one",
            "choices": { "choices": [{ "text": "A", "isCorrect": true }] }
        }"#;
        let exercise: Exercise = serde_json::from_str(raw).unwrap();

        assert_eq!(exercise.id, ExerciseId::named("3f2a-uuid"));
        assert!(exercise.is_gradable());
        assert_eq!(exercise.choices(), vec![Choice::correct("A")]);
    }

    #[test]
    fn unknown_kind_maps_to_other() {
        let raw = r#"{ "id": 1, "type": "DRAG_AND_DROP", "question": "?" }"#;
        let exercise: Exercise = serde_json::from_str(raw).unwrap();
        assert_eq!(exercise.kind, ExerciseKind::Other);
        assert!(!exercise.is_gradable());
        assert!(exercise.choices().is_empty());
    }

    #[test]
    fn multiple_choice_builder_round_trips_through_parser() {
        let choices = vec![Choice::correct("yes"), Choice::incorrect("no")];
        let exercise = Exercise::multiple_choice(ExerciseId::new(3), "Ready?", &choices);
        assert!(matches!(exercise.choices, Value::String(_)));
        assert_eq!(exercise.choices(), choices);
    }

    #[test]
    fn filters_to_multiple_choice_in_order() {
        let coding = |id| Exercise::new(ExerciseId::new(id), ExerciseKind::Coding, "code", Value::Null);
        let mc = Exercise::multiple_choice(ExerciseId::new(2), "pick", &[Choice::correct("a")]);

        let filtered = gradable_exercises(vec![coding(1), mc.clone(), coding(3)]);
        assert_eq!(filtered, vec![mc]);
    }
}
