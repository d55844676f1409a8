mod observer;
mod progress;
mod round;
mod service;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use observer::{NoopObserver, RoundUpdate, SessionObserver};
pub use progress::SessionProgress;
pub use round::RoundPhase;
pub use service::{SessionService, SessionStatus, TickOutcome};
pub use view::{RoundSnapshot, SessionReport};
pub use workflow::SessionLoopService;
