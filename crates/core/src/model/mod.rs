mod choice;
mod exercise;
mod ids;
mod result;
mod settings;

pub use choice::{Choice, ChoiceParseError, parse_choices, try_parse_choices};
pub use exercise::{Exercise, ExerciseKind, gradable_exercises};
pub use ids::{ExerciseId, SessionId};
pub use result::{Conclusion, RoundResult, Selection};
pub use settings::{DEFAULT_ANSWERING_SECS, DEFAULT_REVEAL_SECS, SessionSettings, SettingsError};
