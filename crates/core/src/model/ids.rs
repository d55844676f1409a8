use serde::de::{self, Unexpected, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// Identifier of an exercise as assigned by the backend.
///
/// Opaque to the session: backends hand out either numbers or strings (often
/// UUIDs), and the id is written back out in the shape it arrived in.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExerciseId(IdRepr);

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum IdRepr {
    Number(u64),
    Text(String),
}

impl ExerciseId {
    /// Creates a numeric `ExerciseId`.
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(IdRepr::Number(id))
    }

    /// Creates a string `ExerciseId`, e.g. a UUID.
    #[must_use]
    pub fn named(id: impl Into<String>) -> Self {
        Self(IdRepr::Text(id.into()))
    }

    /// The numeric value, if the backend sent a number.
    #[must_use]
    pub fn as_number(&self) -> Option<u64> {
        match self.0 {
            IdRepr::Number(n) => Some(n),
            IdRepr::Text(_) => None,
        }
    }
}

impl From<u64> for ExerciseId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<&str> for ExerciseId {
    fn from(id: &str) -> Self {
        Self::named(id)
    }
}

impl From<String> for ExerciseId {
    fn from(id: String) -> Self {
        Self::named(id)
    }
}

impl Serialize for ExerciseId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.0 {
            IdRepr::Number(n) => serializer.serialize_u64(*n),
            IdRepr::Text(s) => serializer.serialize_str(s),
        }
    }
}

struct ExerciseIdVisitor;

impl Visitor<'_> for ExerciseIdVisitor {
    type Value = ExerciseId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or non-negative integer exercise id")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(ExerciseId::new(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        u64::try_from(v)
            .map(ExerciseId::new)
            .map_err(|_| E::invalid_value(Unexpected::Signed(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(ExerciseId::named(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(ExerciseId::named(v))
    }
}

impl<'de> Deserialize<'de> for ExerciseId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ExerciseIdVisitor)
    }
}

/// Identifier of a single playthrough.
///
/// A fresh id is minted every time a session is started or retried, so log
/// lines from two playthroughs of the same lesson never mix.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Mints a random session id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Debug for ExerciseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExerciseId({self})")
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for ExerciseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            IdRepr::Number(n) => write!(f, "{n}"),
            IdRepr::Text(s) => f.write_str(s),
        }
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exercise_id_display() {
        assert_eq!(ExerciseId::new(42).to_string(), "42");
        assert_eq!(ExerciseId::named("3f2a-uuid").to_string(), "3f2a-uuid");
    }

    #[test]
    fn exercise_id_accepts_numbers_and_strings() {
        let numeric: ExerciseId = serde_json::from_str("7").unwrap();
        assert_eq!(numeric, ExerciseId::new(7));
        assert_eq!(numeric.as_number(), Some(7));

        let text: ExerciseId = serde_json::from_str(r#""3f2a-uuid""#).unwrap();
        assert_eq!(text, ExerciseId::named("3f2a-uuid"));
        assert_eq!(text.as_number(), None);

        // "7" and 7 are different ids.
        assert_ne!(ExerciseId::named("7"), ExerciseId::new(7));
    }

    #[test]
    fn exercise_id_keeps_its_shape_when_serialized() {
        assert_eq!(serde_json::to_string(&ExerciseId::new(7)).unwrap(), "7");
        assert_eq!(
            serde_json::to_string(&ExerciseId::named("abc")).unwrap(),
            r#""abc""#
        );
    }

    #[test]
    fn exercise_id_rejects_negative_and_non_scalar_values() {
        assert!(serde_json::from_str::<ExerciseId>("-1").is_err());
        assert!(serde_json::from_str::<ExerciseId>("1.5").is_err());
        assert!(serde_json::from_str::<ExerciseId>("null").is_err());
        let err = serde_json::from_str::<ExerciseId>("[1]").unwrap_err();
        assert!(err.to_string().contains("exercise id"));
    }

    #[test]
    fn session_ids_are_unique() {
        let a = SessionId::generate();
        let b = SessionId::generate();
        assert_ne!(a, b);
        assert_eq!(format!("{a:?}"), format!("SessionId({a})"));
    }
}
