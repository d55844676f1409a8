use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Reasons a choice payload could not be turned into a list of choices.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChoiceParseError {
    #[error("choice payload is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("choice payload must be a JSON object")]
    NotAnObject,

    #[error("choice payload has no `choices` array")]
    MissingChoices,

    #[error("choice at index {index} is malformed: {reason}")]
    MalformedChoice { index: usize, reason: String },
}

//
// ─── CHOICE ───────────────────────────────────────────────────────────────────
//

/// A single answer option of a multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub text: String,
    #[serde(rename = "isCorrect")]
    pub is_correct: bool,
}

impl Choice {
    #[must_use]
    pub fn new(text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            text: text.into(),
            is_correct,
        }
    }

    #[must_use]
    pub fn correct(text: impl Into<String>) -> Self {
        Self::new(text, true)
    }

    #[must_use]
    pub fn incorrect(text: impl Into<String>) -> Self {
        Self::new(text, false)
    }
}

//
// ─── PARSER ───────────────────────────────────────────────────────────────────
//

/// Parses a `{"choices": [{"text": .., "isCorrect": ..}, ..]}` payload.
///
/// The payload may be a JSON document encoded as a string (the shape the
/// backend stores) or an already-decoded JSON object. Every entry must carry a
/// string `text` and a boolean `isCorrect`; one bad entry rejects the whole
/// payload.
///
/// # Errors
///
/// Returns `ChoiceParseError` describing the first problem found.
pub fn try_parse_choices(payload: &Value) -> Result<Vec<Choice>, ChoiceParseError> {
    match payload {
        Value::String(encoded) => {
            let decoded: Value = serde_json::from_str(encoded)
                .map_err(|err| ChoiceParseError::InvalidJson(err.to_string()))?;
            choices_from_object(&decoded)
        }
        other => choices_from_object(other),
    }
}

/// Lenient variant of [`try_parse_choices`]: any malformed payload becomes an
/// empty list, which makes the question unplayable rather than failing the
/// session.
#[must_use]
pub fn parse_choices(payload: &Value) -> Vec<Choice> {
    match try_parse_choices(payload) {
        Ok(choices) => choices,
        Err(err) => {
            tracing::warn!(error = %err, "discarding malformed choice payload");
            Vec::new()
        }
    }
}

fn choices_from_object(value: &Value) -> Result<Vec<Choice>, ChoiceParseError> {
    let Value::Object(map) = value else {
        return Err(ChoiceParseError::NotAnObject);
    };
    let Some(Value::Array(entries)) = map.get("choices") else {
        return Err(ChoiceParseError::MissingChoices);
    };

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            Choice::deserialize(entry).map_err(|err| ChoiceParseError::MalformedChoice {
                index,
                reason: err.to_string(),
            })
        })
        .collect()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
