use std::sync::Arc;

use async_trait::async_trait;
use gamebot_core::wire::{AccountSnapshot, ActionResponse, TaskSnapshot};
use gamebot_core::{ActionKind, BotError};

/// Remote operations the supervisor relies on.
///
/// Implementations report every transport or status problem as
/// [`BotError::RemoteCallFailed`].
#[async_trait]
pub trait GameApi: Send + Sync {
    async fn fetch_account(&self) -> Result<AccountSnapshot, BotError>;
    async fn fetch_tasks(&self) -> Result<TaskSnapshot, BotError>;

    async fn claim_reward(&self) -> Result<ActionResponse, BotError>;
    async fn claim_daily(&self) -> Result<ActionResponse, BotError>;
    async fn buy_fuel(&self) -> Result<ActionResponse, BotError>;
    async fn buy_shield(&self) -> Result<ActionResponse, BotError>;
    async fn buy_shield_immunity(&self) -> Result<ActionResponse, BotError>;
    async fn complete_click_task(&self) -> Result<ActionResponse, BotError>;
    async fn spin_roulette(&self) -> Result<ActionResponse, BotError>;
}

#[async_trait]
impl<T: GameApi + ?Sized> GameApi for Arc<T> {
    async fn fetch_account(&self) -> Result<AccountSnapshot, BotError> {
        (**self).fetch_account().await
    }
    async fn fetch_tasks(&self) -> Result<TaskSnapshot, BotError> {
        (**self).fetch_tasks().await
    }
    async fn claim_reward(&self) -> Result<ActionResponse, BotError> {
        (**self).claim_reward().await
    }
    async fn claim_daily(&self) -> Result<ActionResponse, BotError> {
        (**self).claim_daily().await
    }
    async fn buy_fuel(&self) -> Result<ActionResponse, BotError> {
        (**self).buy_fuel().await
    }
    async fn buy_shield(&self) -> Result<ActionResponse, BotError> {
        (**self).buy_shield().await
    }
    async fn buy_shield_immunity(&self) -> Result<ActionResponse, BotError> {
        (**self).buy_shield_immunity().await
    }
    async fn complete_click_task(&self) -> Result<ActionResponse, BotError> {
        (**self).complete_click_task().await
    }
    async fn spin_roulette(&self) -> Result<ActionResponse, BotError> {
        (**self).spin_roulette().await
    }
}

/// Invoke the remote operation backing `action`.
pub async fn perform<C>(client: &C, action: ActionKind) -> Result<ActionResponse, BotError>
where
    C: GameApi + ?Sized,
{
    match action {
        ActionKind::DailyReward => client.claim_daily().await,
        ActionKind::ClaimReward => client.claim_reward().await,
        ActionKind::Fuel => client.buy_fuel().await,
        ActionKind::Shield => client.buy_shield().await,
        ActionKind::ShieldImmunity => client.buy_shield_immunity().await,
        ActionKind::ClickTask => client.complete_click_task().await,
        ActionKind::Roulette => client.spin_roulette().await,
    }
}
