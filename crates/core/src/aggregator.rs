//! Score aggregation for a timed exercise session.

use serde::{Deserialize, Serialize};

use crate::model::RoundResult;

//
// ─── FEEDBACK TIER ─────────────────────────────────────────────────────────────
//

/// Coarse feedback bucket derived from the accuracy percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackTier {
    Retry,
    NeedsImprovement,
    Good,
    Excellent,
}

impl FeedbackTier {
    /// >= 90 excellent, >= 70 good, >= 50 needs improvement, else retry.
    #[must_use]
    pub fn from_percentage(percentage: u32) -> Self {
        match percentage {
            90.. => FeedbackTier::Excellent,
            70..=89 => FeedbackTier::Good,
            50..=69 => FeedbackTier::NeedsImprovement,
            _ => FeedbackTier::Retry,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            FeedbackTier::Excellent => "excellent",
            FeedbackTier::Good => "good",
            FeedbackTier::NeedsImprovement => "needs improvement",
            FeedbackTier::Retry => "retry",
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            FeedbackTier::Excellent => "Outstanding! You nailed this lesson.",
            FeedbackTier::Good => "Nice work, just a few slips.",
            FeedbackTier::NeedsImprovement => "Getting there. Review the lesson and try again.",
            FeedbackTier::Retry => "Let's rewatch the lesson and give it another go.",
        }
    }
}

//
// ─── SUMMARY ───────────────────────────────────────────────────────────────────
//

/// Session-level score derived from the recorded results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub correct_count: usize,
    pub total_count: usize,
    pub percentage: u32,
    pub total_seconds_elapsed: u32,
    pub tier: FeedbackTier,
}

/// `round(100 * correct / total)` with halves rounded up; zero when empty.
#[must_use]
pub fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let correct = correct.min(total) as u64;
    let total = total as u64;
    let rounded = (200 * correct + total) / (2 * total);
    u32::try_from(rounded).unwrap_or(100)
}

//
// ─── AGGREGATOR ────────────────────────────────────────────────────────────────
//

/// Append-only collection of round results plus the session clock.
///
/// `total_count` is fixed when the session starts; results can never exceed it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultAggregator {
    total_count: usize,
    results: Vec<RoundResult>,
    correct_count: usize,
    total_seconds_elapsed: u32,
}

impl ResultAggregator {
    #[must_use]
    pub fn new(total_count: usize) -> Self {
        Self {
            total_count,
            results: Vec::with_capacity(total_count),
            correct_count: 0,
            total_seconds_elapsed: 0,
        }
    }

    /// Appends a result. Returns false and records nothing once full.
    #[must_use = "a refused record means a round concluded twice"]
    pub fn record(&mut self, result: RoundResult) -> bool {
        if self.is_full() {
            tracing::warn!(
                total = self.total_count,
                "dropping result recorded past the last round"
            );
            return false;
        }
        if result.is_correct {
            self.correct_count += 1;
        }
        self.results.push(result);
        true
    }

    /// Adds elapsed session time (answering and reveal alike).
    pub fn add_elapsed(&mut self, secs: u32) {
        self.total_seconds_elapsed = self.total_seconds_elapsed.saturating_add(secs);
    }

    #[must_use]
    pub fn results(&self) -> &[RoundResult] {
        &self.results
    }

    #[must_use]
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    #[must_use]
    pub fn total_seconds_elapsed(&self) -> u32 {
        self.total_seconds_elapsed
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.results.len() >= self.total_count
    }

    /// Mean answering time across recorded rounds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average_seconds_spent(&self) -> f64 {
        if self.results.is_empty() {
            return 0.0;
        }
        let sum: u64 = self.results.iter().map(|r| u64::from(r.seconds_spent)).sum();
        sum as f64 / self.results.len() as f64
    }

    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        let percentage = percentage(self.correct_count, self.total_count);
        SessionSummary {
            correct_count: self.correct_count,
            total_count: self.total_count,
            percentage,
            total_seconds_elapsed: self.total_seconds_elapsed,
            tier: FeedbackTier::from_percentage(percentage),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
