//! Typed account state and the per-action eligibility predicates.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::action::ActionKind;
use crate::error::BotError;
use crate::time::parse_optional_instant;
use crate::wire::{AccountSnapshot, TaskSnapshot};

/// Refuel cooldown per fuel level, in minutes. Sorted by level.
const FUEL_COOLDOWN_MINUTES: [(i64, i64); 5] = [(1, 30), (2, 60), (3, 90), (4, 120), (5, 150)];

/// Shield is only bought above this balance.
const SHIELD_MIN_BALANCE: Decimal = dec!(15);
/// Shield immunity is only bought above this balance.
const SHIELD_IMMUNITY_MIN_BALANCE: Decimal = dec!(8);

/// Cooldown before fuel can be bought again at `level`.
///
/// Unknown levels (including a missing one) get the longest cooldown.
pub fn fuel_cooldown(level: Option<i64>) -> Duration {
    let longest = FUEL_COOLDOWN_MINUTES[FUEL_COOLDOWN_MINUTES.len() - 1].1;
    let minutes = level
        .and_then(|lvl| {
            FUEL_COOLDOWN_MINUTES
                .binary_search_by_key(&lvl, |&(l, _)| l)
                .ok()
        })
        .map_or(longest, |idx| FUEL_COOLDOWN_MINUTES[idx].1);
    Duration::minutes(minutes)
}

/// Completion state of the click task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskState {
    /// A completion record exists.
    pub completed: bool,
    /// When the latest completion happened, if reported.
    pub completed_at: Option<DateTime<Utc>>,
}

impl TaskState {
    /// Derive from the task listing. An empty listing means "never completed".
    pub fn parse(snapshot: &TaskSnapshot) -> Result<Self, BotError> {
        match snapshot.latest() {
            None => Ok(Self::default()),
            Some(record) => Ok(Self {
                completed: true,
                completed_at: parse_optional_instant(
                    "listCompleted.locale_time",
                    record.locale_time.as_deref(),
                )?,
            }),
        }
    }

    /// Whether the click task can be done at `now`.
    pub fn is_ready(&self, now: DateTime<Utc>) -> bool {
        if self.completed {
            return false;
        }
        match self.completed_at {
            None => true,
            Some(at) => now > at + Duration::hours(1),
        }
    }
}

/// Snapshot of the account as the server last reported it.
///
/// Never patched field by field: a new value is built from every server
/// response and replaces the old one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountState {
    /// Coin balance, never negative.
    pub balance: Decimal,
    /// Shield level.
    pub shield: i64,
    /// Fuel level; `None` when the server omits it.
    pub fuel_level: Option<i64>,
    /// A shield is currently up.
    pub shield_active: bool,
    /// The service is in a maintenance window.
    pub tech_work_active: bool,
    /// Last reward claim.
    pub last_claimed_at: Option<DateTime<Utc>>,
    /// Daily reward unlock time.
    pub daily_next_at: Option<DateTime<Utc>>,
    /// Last fuel purchase.
    pub fuel_last_at: Option<DateTime<Utc>>,
    /// When the last shield ended.
    pub shield_ended_at: Option<DateTime<Utc>>,
    /// Last shield immunity purchase.
    pub shield_immunity_at: Option<DateTime<Utc>>,
    /// Roulette unlock time.
    pub spin_after_at: Option<DateTime<Utc>>,
    /// Click task state from the same cycle.
    pub task: TaskState,
}

impl AccountState {
    /// Build the state for a cycle from the account and task snapshots.
    pub fn parse(account: &AccountSnapshot, tasks: &TaskSnapshot) -> Result<Self, BotError> {
        Self::from_account(account, TaskState::parse(tasks)?)
    }

    /// Build a state from an account snapshot, keeping an already known task state.
    pub fn from_account(account: &AccountSnapshot, task: TaskState) -> Result<Self, BotError> {
        let balance = account
            .balance
            .as_ref()
            .ok_or_else(|| BotError::malformed("balance is missing"))?
            .to_decimal("balance")?;
        if balance.is_sign_negative() {
            return Err(BotError::malformed(format!("balance: {balance} is negative")));
        }
        let shield = account
            .shield
            .as_ref()
            .ok_or_else(|| BotError::malformed("shield is missing"))?
            .to_i64("shield")?;
        let fuel_level = account
            .fuel
            .as_ref()
            .map(|f| f.to_i64("fuel"))
            .transpose()?;

        Ok(Self {
            balance,
            shield,
            fuel_level,
            shield_active: account.shield_active.unwrap_or(false),
            tech_work_active: account.tech_work.unwrap_or(false),
            last_claimed_at: parse_optional_instant("claimed_last", account.claimed_last.as_deref())?,
            daily_next_at: parse_optional_instant("daily_next_at", account.daily_next_at.as_deref())?,
            fuel_last_at: parse_optional_instant(
                "fuel_free_after_at",
                account.fuel_free_after_at.as_deref(),
            )?,
            shield_ended_at: parse_optional_instant(
                "shield_free_after_at",
                account.shield_free_after_at.as_deref(),
            )?,
            shield_immunity_at: parse_optional_instant(
                "shield_immunity_at",
                account.shield_immunity_at.as_deref(),
            )?,
            spin_after_at: parse_optional_instant("spin_after_at", account.spin_after_at.as_deref())?,
            task,
        })
    }

    /// Daily reward: due from one hour after its unlock time, inclusive.
    pub fn should_claim_daily(&self, now: DateTime<Utc>) -> bool {
        match self.daily_next_at {
            None => true,
            Some(next) => now >= next + Duration::hours(1),
        }
    }

    /// Balance claim: 75 minutes after the last one.
    pub fn should_claim(&self, now: DateTime<Utc>) -> bool {
        match self.last_claimed_at {
            None => true,
            Some(last) => now > last + Duration::hours(1) + Duration::minutes(15),
        }
    }

    /// Fuel: after the cooldown for the current level.
    pub fn should_get_fuel(&self, now: DateTime<Utc>) -> bool {
        match self.fuel_last_at {
            None => true,
            Some(last) => now > last + fuel_cooldown(self.fuel_level),
        }
    }

    /// Shield: no shield up and balance above 15.
    ///
    /// Time-independent: only the shield flag and the balance matter.
    pub fn should_get_shield(&self, _now: DateTime<Utc>) -> bool {
        match self.shield_ended_at {
            None => true,
            Some(_) => !self.shield_active && self.balance > SHIELD_MIN_BALANCE,
        }
    }

    /// Shield immunity: 90 minutes after the last one with balance above 8.
    pub fn should_get_shield_immunity(&self, now: DateTime<Utc>) -> bool {
        match self.shield_immunity_at {
            None => true,
            Some(at) => {
                now > at + Duration::hours(1) + Duration::minutes(30)
                    && self.balance > SHIELD_IMMUNITY_MIN_BALANCE
            }
        }
    }

    /// Click task: see [`TaskState::is_ready`].
    pub fn should_get_onclick_task(&self, now: DateTime<Utc>) -> bool {
        self.task.is_ready(now)
    }

    /// Roulette: one hour after its unlock time.
    pub fn should_get_roulette(&self, now: DateTime<Utc>) -> bool {
        match self.spin_after_at {
            None => true,
            Some(after) => now > after + Duration::hours(1),
        }
    }

    /// Every action due at `now`, in priority order.
    pub fn due_actions(&self, now: DateTime<Utc>) -> Vec<ActionKind> {
        ActionKind::PRIORITY
            .into_iter()
            .filter(|kind| kind.is_due(self, now))
            .collect()
    }
}
