//! Error taxonomy shared by the state model and the agent.

use std::time::Duration;

use thiserror::Error;

/// Failures the scheduler distinguishes between.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BotError {
    /// A required snapshot field is missing or has the wrong type.
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),

    /// Transport failure, non-success status or undecodable body.
    #[error("remote call {operation} failed: {message}")]
    RemoteCallFailed {
        /// Remote operation name, e.g. `fetch_account`.
        operation: &'static str,
        /// Human readable cause.
        message: String,
    },

    /// The service reports a maintenance window.
    #[error("service is under maintenance")]
    MaintenanceActive,
}

impl BotError {
    /// Shorthand for a [`BotError::MalformedSnapshot`].
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedSnapshot(msg.into())
    }

    /// Shorthand for a [`BotError::RemoteCallFailed`].
    pub fn remote(operation: &'static str, message: impl ToString) -> Self {
        Self::RemoteCallFailed {
            operation,
            message: message.to_string(),
        }
    }

    /// Call-level timeout, reported as a remote failure.
    pub fn timed_out(operation: &'static str, after: Duration) -> Self {
        Self::remote(operation, format!("no response after {}s", after.as_secs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_a_remote_failure() {
        let err = BotError::timed_out("buy_fuel", Duration::from_secs(30));
        assert_eq!(
            err.to_string(),
            "remote call buy_fuel failed: no response after 30s"
        );
        assert!(matches!(err, BotError::RemoteCallFailed { operation: "buy_fuel", .. }));
    }
}
