//! JSON shapes served by the game API.
//!
//! Every field is optional and accepts any JSON type: numbers may come
//! quoted, flags may be `0`/`1`. Type errors surface as
//! [`BotError::MalformedSnapshot`] from [`crate::AccountState`], not from serde.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::BotError;

/// A JSON number that some endpoints send quoted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    /// Plain JSON number.
    Number(serde_json::Number),
    /// Number encoded as a string, e.g. `"12.50"`.
    Text(String),
    /// Anything else the server sent; never converts.
    Other(Value),
}

impl Numeric {
    /// Exact decimal value.
    pub fn to_decimal(&self, field: &str) -> Result<Decimal, BotError> {
        let raw = match self {
            Numeric::Number(n) => n.to_string(),
            Numeric::Text(s) => s.trim().to_string(),
            Numeric::Other(v) => {
                return Err(BotError::malformed(format!("{field}: {v} is not a number")))
            }
        };
        Decimal::from_str(&raw)
            .or_else(|_| Decimal::from_scientific(&raw))
            .map_err(|_| BotError::malformed(format!("{field}: {raw:?} is not a number")))
    }

    /// Integral value. Fractional input is rejected.
    pub fn to_i64(&self, field: &str) -> Result<i64, BotError> {
        let value = self.to_decimal(field)?;
        if !value.fract().is_zero() {
            return Err(BotError::malformed(format!("{field}: {value} is not an integer")));
        }
        i64::try_from(value)
            .map_err(|_| BotError::malformed(format!("{field}: {value} is out of range")))
    }
}

impl From<i64> for Numeric {
    fn from(v: i64) -> Self {
        Numeric::Number(v.into())
    }
}

/// Truthiness of a loosely typed flag: `true`, `1`, `"1"` and `"true"` are set,
/// `null` is absent.
fn lenient_flag<'de, D>(de: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(de)?;
    Ok(value.and_then(|v| match v {
        Value::Null => None,
        Value::Bool(b) => Some(b),
        Value::Number(n) => Some(n.as_f64().is_some_and(|f| f != 0.0)),
        Value::String(s) => {
            let s = s.trim();
            Some(!(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false")))
        }
        Value::Array(a) => Some(!a.is_empty()),
        Value::Object(o) => Some(!o.is_empty()),
    }))
}

/// Timestamps arrive as strings; any other non-null value is kept as its JSON
/// text so that timestamp parsing rejects it.
fn lenient_text<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(de)?;
    Ok(value.and_then(|v| match v {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }))
}

/// Raw account object (`user` in API responses).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    /// Coin balance.
    #[serde(default)]
    pub balance: Option<Numeric>,
    /// Shield level.
    #[serde(default)]
    pub shield: Option<Numeric>,
    /// Fuel level, keys the purchase cooldown.
    #[serde(default)]
    pub fuel: Option<Numeric>,
    /// A shield is currently up.
    #[serde(default, deserialize_with = "lenient_flag")]
    pub shield_active: Option<bool>,
    /// The service is under maintenance.
    #[serde(default, deserialize_with = "lenient_flag")]
    pub tech_work: Option<bool>,
    /// Last reward claim.
    #[serde(default, deserialize_with = "lenient_text")]
    pub claimed_last: Option<String>,
    /// When the next daily reward unlocks.
    #[serde(default, deserialize_with = "lenient_text")]
    pub daily_next_at: Option<String>,
    /// Last fuel purchase.
    #[serde(default, deserialize_with = "lenient_text")]
    pub fuel_free_after_at: Option<String>,
    /// Last shield purchase.
    #[serde(default, deserialize_with = "lenient_text")]
    pub shield_free_after_at: Option<String>,
    /// Last shield immunity purchase.
    #[serde(default, deserialize_with = "lenient_text")]
    pub shield_immunity_at: Option<String>,
    /// When the next free roulette spin unlocks.
    #[serde(default, deserialize_with = "lenient_text")]
    pub spin_after_at: Option<String>,
}

/// Envelope the account endpoint and most action endpoints answer with.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserEnvelope {
    /// The account, absent on some error answers.
    #[serde(default)]
    pub user: Option<AccountSnapshot>,
}

impl UserEnvelope {
    /// The embedded account, or `MalformedSnapshot` when the server left it out.
    pub fn into_account(self) -> Result<AccountSnapshot, BotError> {
        self.user
            .ok_or_else(|| BotError::malformed("response has no user object"))
    }
}

/// One completed-task record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletedTask {
    /// Completion time.
    #[serde(default, deserialize_with = "lenient_text")]
    pub locale_time: Option<String>,
}

fn null_as_empty<'de, D>(de: D) -> Result<Vec<CompletedTask>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<CompletedTask>>::deserialize(de)?.unwrap_or_default())
}

/// Task listing. The most recent completion comes first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    /// Completed tasks; `null` reads as empty.
    #[serde(rename = "listCompleted", default, deserialize_with = "null_as_empty")]
    pub list_completed: Vec<CompletedTask>,
}

impl TaskSnapshot {
    /// Most recent completion, if any.
    pub fn latest(&self) -> Option<&CompletedTask> {
        self.list_completed.first()
    }
}

/// Result of an action call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionResponse {
    /// Fresh account state, when the endpoint embeds one.
    pub account: Option<AccountSnapshot>,
}
