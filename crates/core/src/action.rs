//! Action catalog and evaluation order.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::AccountState;

/// The fixed catalog of actions the agent can take on the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Claim the daily reward.
    DailyReward,
    /// Collect the accumulated balance.
    ClaimReward,
    /// Buy fuel with coins.
    Fuel,
    /// Buy a shield with coins.
    Shield,
    /// Buy shield immunity with coins.
    ShieldImmunity,
    /// Complete the sponsor click task.
    ClickTask,
    /// Spin the free roulette.
    Roulette,
}

impl ActionKind {
    /// Evaluation order. Income actions come before spending ones so that
    /// balance-gated rules see the freshest balance.
    pub const PRIORITY: [ActionKind; 7] = [
        ActionKind::DailyReward,
        ActionKind::ClaimReward,
        ActionKind::Fuel,
        ActionKind::Shield,
        ActionKind::ShieldImmunity,
        ActionKind::ClickTask,
        ActionKind::Roulette,
    ];

    /// Whether this action is due for `state` at `now`.
    pub fn is_due(self, state: &AccountState, now: DateTime<Utc>) -> bool {
        match self {
            ActionKind::DailyReward => state.should_claim_daily(now),
            ActionKind::ClaimReward => state.should_claim(now),
            ActionKind::Fuel => state.should_get_fuel(now),
            ActionKind::Shield => state.should_get_shield(now),
            ActionKind::ShieldImmunity => state.should_get_shield_immunity(now),
            ActionKind::ClickTask => state.should_get_onclick_task(now),
            ActionKind::Roulette => state.should_get_roulette(now),
        }
    }

    /// Name of the remote operation backing this action.
    pub fn operation(self) -> &'static str {
        match self {
            ActionKind::DailyReward => "claim_daily",
            ActionKind::ClaimReward => "claim_reward",
            ActionKind::Fuel => "buy_fuel",
            ActionKind::Shield => "buy_shield",
            ActionKind::ShieldImmunity => "buy_shield_immunity",
            ActionKind::ClickTask => "complete_click_task",
            ActionKind::Roulette => "spin_roulette",
        }
    }

    /// Label for status lines.
    pub fn label(self) -> &'static str {
        match self {
            ActionKind::DailyReward => "daily reward",
            ActionKind::ClaimReward => "balance",
            ActionKind::Fuel => "fuel",
            ActionKind::Shield => "shield",
            ActionKind::ShieldImmunity => "shield immunity",
            ActionKind::ClickTask => "task",
            ActionKind::Roulette => "roulette",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.operation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn priority_lists_every_action_once() {
        let unique: HashSet<_> = ActionKind::PRIORITY.iter().collect();
        assert_eq!(unique.len(), ActionKind::PRIORITY.len());
        let ops: HashSet<_> = ActionKind::PRIORITY.iter().map(|a| a.operation()).collect();
        assert_eq!(ops.len(), ActionKind::PRIORITY.len());
    }

    #[test]
    fn income_comes_before_spending() {
        let pos = |k| ActionKind::PRIORITY.iter().position(|a| *a == k).unwrap();
        assert!(pos(ActionKind::ClaimReward) < pos(ActionKind::Shield));
        assert!(pos(ActionKind::DailyReward) < pos(ActionKind::ShieldImmunity));
    }
}
