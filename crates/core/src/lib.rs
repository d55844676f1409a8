#![forbid(unsafe_code)]

pub mod aggregator;
pub mod grading;
pub mod guard;
pub mod model;
pub mod time;
pub mod timer;

pub use aggregator::{FeedbackTier, ResultAggregator, SessionSummary};
pub use grading::{Grade, Modality, grade};
pub use guard::TransitionGuard;
pub use time::Clock;
pub use timer::{RoundTimer, TimerEvent, TimerPhase};
