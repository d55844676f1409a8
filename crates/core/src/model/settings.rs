use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("answering seconds must be between 1 and 600, got {0}")]
    InvalidAnsweringSeconds(u32),

    #[error("reveal seconds must be between 1 and 60, got {0}")]
    InvalidRevealSeconds(u32),
}

//
// ─── SETTINGS ──────────────────────────────────────────────────────────────────
//

pub const DEFAULT_ANSWERING_SECS: u32 = 10;
pub const DEFAULT_REVEAL_SECS: u32 = 5;

/// Timing and ordering knobs for a timed exercise session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSessionSettings")]
pub struct SessionSettings {
    answering_secs: u32,
    reveal_secs: u32,
    shuffle_rounds: bool,
}

impl Default for SessionSettings {
    /// 10 seconds to answer, 5 seconds of reveal, rounds in lesson order.
    fn default() -> Self {
        Self {
            answering_secs: DEFAULT_ANSWERING_SECS,
            reveal_secs: DEFAULT_REVEAL_SECS,
            shuffle_rounds: false,
        }
    }
}

impl SessionSettings {
    /// Creates custom session settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if either duration is outside its bounds.
    pub fn new(
        answering_secs: u32,
        reveal_secs: u32,
        shuffle_rounds: bool,
    ) -> Result<Self, SettingsError> {
        if !(1..=600).contains(&answering_secs) {
            return Err(SettingsError::InvalidAnsweringSeconds(answering_secs));
        }
        if !(1..=60).contains(&reveal_secs) {
            return Err(SettingsError::InvalidRevealSeconds(reveal_secs));
        }

        Ok(Self {
            answering_secs,
            reveal_secs,
            shuffle_rounds,
        })
    }

    #[must_use]
    pub fn answering_secs(&self) -> u32 {
        self.answering_secs
    }

    #[must_use]
    pub fn reveal_secs(&self) -> u32 {
        self.reveal_secs
    }

    #[must_use]
    pub fn shuffle_rounds(&self) -> bool {
        self.shuffle_rounds
    }

    #[must_use]
    pub fn with_shuffle_rounds(mut self, shuffle: bool) -> Self {
        self.shuffle_rounds = shuffle;
        self
    }
}

#[derive(Deserialize)]
struct RawSessionSettings {
    #[serde(default = "default_answering")]
    answering_secs: u32,
    #[serde(default = "default_reveal")]
    reveal_secs: u32,
    #[serde(default)]
    shuffle_rounds: bool,
}

fn default_answering() -> u32 {
    DEFAULT_ANSWERING_SECS
}

fn default_reveal() -> u32 {
    DEFAULT_REVEAL_SECS
}

impl TryFrom<RawSessionSettings> for SessionSettings {
    type Error = SettingsError;

    fn try_from(raw: RawSessionSettings) -> Result<Self, Self::Error> {
        Self::new(raw.answering_secs, raw.reveal_secs, raw.shuffle_rounds)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
