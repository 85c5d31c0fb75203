#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Account state model and action-eligibility rules for the gamebot agent.

pub mod action;
pub mod backoff;
pub mod error;
pub mod state;
pub mod time;
pub mod wire;

mod util;

pub use action::ActionKind;
pub use backoff::{default_retry_delays, RetrySchedule};
pub use error::BotError;
pub use state::{fuel_cooldown, AccountState, TaskState};
pub use time::{parse_instant, Clock, SystemClock};
pub use util::new_ulid;
