//! Live status shared between the supervisor and whatever displays it.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use gamebot_core::{AccountState, BotError};
use tokio::sync::watch;

use crate::supervisor::SupervisorState;

#[derive(Debug, Clone)]
pub struct Status {
    pub phase: SupervisorState,
    pub message: String,
    pub last_error: Option<String>,
    /// Time left before the next retry, while recovering.
    pub retry_in: Option<Duration>,
    pub account: Option<AccountState>,
}

impl Default for Status {
    fn default() -> Self {
        Self {
            phase: SupervisorState::Idle,
            message: "Waiting...".to_string(),
            last_error: None,
            retry_in: None,
            account: None,
        }
    }
}

fn fmt_time(t: Option<DateTime<Utc>>) -> String {
    t.map(|t| t.format("%H:%M:%S %d.%m.%Y").to_string())
        .unwrap_or_else(|| "no data".to_string())
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(a) = &self.account {
            writeln!(f, "Balance:                 {:.2}", a.balance)?;
            writeln!(
                f,
                "Shield:                  {} ({})",
                a.shield,
                if a.shield_active { "Active" } else { "Not Active" }
            )?;
            writeln!(f, "Last claim:              {}", fmt_time(a.last_claimed_at))?;
            writeln!(f, "Next daily:              {}", fmt_time(a.daily_next_at))?;
            writeln!(f, "Last refueling:          {}", fmt_time(a.fuel_last_at))?;
            writeln!(f, "Shield immunity up to:   {}", fmt_time(a.shield_immunity_at))?;
            writeln!(f, "Shield is active until:  {}", fmt_time(a.shield_ended_at))?;
            writeln!(f, "Spin after:              {}", fmt_time(a.spin_after_at))?;
            writeln!(f)?;
        }
        write!(f, "Status [{:?}]: {}", self.phase, self.message)
    }
}

/// Single-writer status board backed by a watch channel.
pub struct StatusBoard {
    tx: watch::Sender<Status>,
}

impl StatusBoard {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Status::default());
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<Status> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> Status {
        self.tx.borrow().clone()
    }

    pub fn set_phase(&self, phase: SupervisorState) {
        self.tx.send_if_modified(|s| {
            let changed = s.phase != phase;
            s.phase = phase;
            changed
        });
    }

    pub fn set_message(&self, message: impl Into<String>) {
        let message = message.into();
        self.tx.send_modify(|s| {
            s.message = message;
            s.retry_in = None;
        });
    }

    pub fn set_account(&self, account: &AccountState) {
        self.tx.send_modify(|s| s.account = Some(account.clone()));
    }

    /// Record a whole-cycle failure and the time left before the retry.
    pub fn set_retry(&self, error: &BotError, retry_in: Duration) {
        self.tx.send_modify(|s| {
            s.message = format!(
                "Error: {error}. Try after {} seconds...",
                retry_in.as_secs()
            );
            s.last_error = Some(error.to_string());
            s.retry_in = Some(retry_in);
        });
    }

    pub fn set_error(&self, error: &BotError, message: impl Into<String>) {
        let message = message.into();
        self.tx.send_modify(|s| {
            s.message = message;
            s.last_error = Some(error.to_string());
            s.retry_in = None;
        });
    }
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_countdown_is_visible_to_subscribers() {
        let board = StatusBoard::new();
        let mut rx = board.subscribe();
        let err = BotError::remote("fetch_account", "connection reset");
        board.set_retry(&err, Duration::from_secs(10));

        assert!(rx.has_changed().unwrap());
        let s = rx.borrow_and_update().clone();
        assert_eq!(s.retry_in, Some(Duration::from_secs(10)));
        assert_eq!(
            s.message,
            "Error: remote call fetch_account failed: connection reset. Try after 10 seconds..."
        );
        assert_eq!(s.last_error.as_deref(), Some("remote call fetch_account failed: connection reset"));

        board.set_message("Waiting for next cycle...");
        let s = board.snapshot();
        assert_eq!(s.retry_in, None);
        assert!(s.last_error.is_some());
    }

    #[test]
    fn renders_without_account() {
        let s = Status::default();
        assert_eq!(s.to_string(), "Status [Idle]: Waiting...");
    }
}
