//! Fixed-interval status polling with a single in-flight request.
//!
//! [`StatusPoller`] mirrors the daemon state into a [`PollState`] record.
//! Ticks that land while a request is outstanding are dropped, and failed
//! requests leave the last known state in place.

mod core;
mod source;
mod state;


pub use self::core::{PollOutcome, PollerConfig, StatusPoller};
pub use source::StatusSource;
pub use state::{PollState, AWAITING_STATUS};
