//! Run-loop supervisor: fetch state, run due actions, recover from failures.
//!
//! States: `Idle -> Initializing -> Running <-> ErrorRecovery -> Stopped`.
//! Only whole-cycle failures (snapshot fetch or parse) enter recovery; a
//! failing action is logged and the cycle moves on to the next one.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use gamebot_core::{
    new_ulid, AccountState, ActionKind, BotError, Clock, RetrySchedule, SystemClock, TaskState,
};
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::{sleep, timeout};
use tracing::Instrument;

use crate::client::{perform, GameApi};
use crate::config::AgentConfig;
use crate::status::{Status, StatusBoard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SupervisorState {
    Idle,
    Initializing,
    Running,
    ErrorRecovery,
    Stopped,
}

/// Why the supervisor reached `Stopped`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The initial account fetch failed.
    InitFailed(BotError),
    /// The service reported maintenance at startup.
    Maintenance,
    /// Whole-cycle failures outlasted the retry schedule.
    RetriesExhausted(BotError),
    /// The configured number of cycles completed.
    CycleLimit,
}

/// Final outcome handed back to the process entry point.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub final_state: SupervisorState,
    pub reason: StopReason,
    pub cycles_completed: u64,
    pub status: Status,
}

/// What one cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub completed: Vec<ActionKind>,
    pub failed: Vec<(ActionKind, BotError)>,
    /// The snapshot reported maintenance; no action was attempted.
    pub skipped_for_maintenance: bool,
}

pub struct Supervisor<C> {
    client: C,
    config: AgentConfig,
    clock: Arc<dyn Clock>,
    status: StatusBoard,
    state: SupervisorState,
    cycles_completed: u64,
}

/// Bound a remote call by `limit`; expiry counts as a remote failure.
async fn call_with_timeout<T>(
    limit: Duration,
    operation: &'static str,
    fut: impl Future<Output = Result<T, BotError>>,
) -> Result<T, BotError> {
    match timeout(limit, fut).await {
        Ok(res) => res,
        Err(_) => Err(BotError::timed_out(operation, limit)),
    }
}

impl<C: GameApi> Supervisor<C> {
    pub fn new(client: C, config: AgentConfig) -> Self {
        Self {
            client,
            config,
            clock: Arc::new(SystemClock),
            status: StatusBoard::new(),
            state: SupervisorState::Idle,
            cycles_completed: 0,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<Status> {
        self.status.subscribe()
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    /// Run until a terminal condition. Never panics on remote failures.
    pub async fn run(mut self) -> RunReport {
        tracing::info!("supervisor starting");
        if let Err(reason) = self.initialize().await {
            return self.stop(reason);
        }

        let mut retries = RetrySchedule::new(self.config.retry_delays.clone());
        loop {
            self.transition(SupervisorState::Running);

            let cycle_id = new_ulid();
            let span = tracing::info_span!("cycle", cycle_id = %cycle_id);
            match self.run_cycle().instrument(span).await {
                Ok(report) => {
                    retries.reset();
                    self.cycles_completed += 1;
                    tracing::info!(
                        %cycle_id,
                        cycle = self.cycles_completed,
                        completed = report.completed.len(),
                        failed = report.failed.len(),
                        "cycle finished"
                    );

                    if self
                        .config
                        .max_cycles
                        .is_some_and(|max| self.cycles_completed >= max)
                    {
                        return self.stop(StopReason::CycleLimit);
                    }
                    self.status.set_message("Waiting for next cycle...");
                    sleep(self.config.cycle_interval).await;
                }
                Err(err) => {
                    self.transition(SupervisorState::ErrorRecovery);
                    tracing::error!(%cycle_id, error = %err, "cycle failed");
                    match retries.next_delay() {
                        Some(delay) => {
                            tracing::info!(
                                attempt = retries.attempts(),
                                delay_secs = delay.as_secs(),
                                "retrying after backoff"
                            );
                            self.countdown(&err, delay).await;
                        }
                        None => return self.stop(StopReason::RetriesExhausted(err)),
                    }
                }
            }
        }
    }

    async fn initialize(&mut self) -> Result<(), StopReason> {
        self.transition(SupervisorState::Initializing);
        self.status.set_message("Connecting...");

        let limit = self.config.call_timeout;
        let snapshot = call_with_timeout(limit, "fetch_account", self.client.fetch_account())
            .await
            .map_err(StopReason::InitFailed)?;
        if snapshot.tech_work.unwrap_or(false) {
            return Err(StopReason::Maintenance);
        }
        let account = AccountState::from_account(&snapshot, TaskState::default())
            .map_err(StopReason::InitFailed)?;
        self.status.set_account(&account);
        Ok(())
    }

    /// One pass: fetch, evaluate in priority order, execute what is due.
    ///
    /// Errors returned from here are whole-cycle failures. Action failures
    /// are folded into the report instead.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, BotError> {
        let limit = self.config.call_timeout;
        let account = call_with_timeout(limit, "fetch_account", self.client.fetch_account()).await?;
        let tasks = call_with_timeout(limit, "fetch_tasks", self.client.fetch_tasks()).await?;
        let mut state = AccountState::parse(&account, &tasks)?;
        self.status.set_account(&state);

        let mut report = CycleReport::default();
        if state.tech_work_active {
            tracing::warn!("service reports maintenance; skipping actions this cycle");
            self.status.set_message("Maintenance in progress, no actions taken");
            report.skipped_for_maintenance = true;
            return Ok(report);
        }

        let now = self.clock.now();
        tracing::debug!(due = ?state.due_actions(now), "rules evaluated");

        // Predicates are checked lazily so each one sees the state returned
        // by the actions before it.
        for action in ActionKind::PRIORITY {
            if !action.is_due(&state, now) {
                continue;
            }

            self.status.set_message(format!("Getting {}...", action.label()));
            tracing::info!(%action, "action due");

            let result = call_with_timeout(limit, action.operation(), perform(&self.client, action)).await;
            match result {
                Ok(response) => {
                    match response.account {
                        Some(snapshot) => match AccountState::from_account(&snapshot, state.task.clone()) {
                            Ok(next) => {
                                state = next;
                                self.status.set_account(&state);
                            }
                            Err(e) => {
                                tracing::warn!(%action, error = %e, "ignoring unreadable account in action response");
                            }
                        },
                        None => tracing::debug!(%action, "action response carried no account"),
                    }
                    self.status
                        .set_message(format!("Completed successfully: {}.", action.label()));
                    tracing::info!(%action, balance = %state.balance, "action completed");
                    report.completed.push(action);
                    sleep(self.config.action_delay).await;
                }
                Err(e) => {
                    tracing::warn!(%action, error = %e, "action failed");
                    self.status.set_error(
                        &e,
                        format!("Error while executing {}: {e}", action.label()),
                    );
                    report.failed.push((action, e));
                }
            }
        }

        Ok(report)
    }

    async fn countdown(&self, err: &BotError, delay: Duration) {
        let step = Duration::from_secs(1);
        let mut remaining = delay;
        while !remaining.is_zero() {
            self.status.set_retry(err, remaining);
            let tick = remaining.min(step);
            sleep(tick).await;
            remaining -= tick;
        }
        self.status.set_message("Retrying...");
    }

    fn transition(&mut self, next: SupervisorState) {
        if self.state != next {
            tracing::info!(target: "gamebot::status", from = ?self.state, to = ?next, "state change");
            self.state = next;
            self.status.set_phase(next);
        }
    }

    fn stop(mut self, reason: StopReason) -> RunReport {
        self.transition(SupervisorState::Stopped);
        match &reason {
            StopReason::InitFailed(e) => {
                tracing::error!(error = %e, "initialization failed; stopping");
                self.status.set_error(e, format!("Initialization failed: {e}"));
            }
            StopReason::Maintenance => {
                tracing::warn!("service is under maintenance; stopping");
                self.status.set_message("Technical works in progress. Stopped.");
            }
            StopReason::RetriesExhausted(e) => {
                tracing::error!(error = %e, "maximum number of attempts reached; stopping");
                self.status
                    .set_error(e, "Maximum number of attempts reached. Stopped.");
            }
            StopReason::CycleLimit => {
                tracing::info!(cycles = self.cycles_completed, "cycle limit reached; stopping");
                self.status.set_message("Cycle limit reached. Stopped.");
            }
        }

        RunReport {
            final_state: self.state,
            reason,
            cycles_completed: self.cycles_completed,
            status: self.status.snapshot(),
        }
    }
}
