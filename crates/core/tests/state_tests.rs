//! Eligibility rules of the account state model.

use chrono::{DateTime, Duration, TimeZone, Utc};
use gamebot_core::wire::{AccountSnapshot, TaskSnapshot};
use gamebot_core::{fuel_cooldown, AccountState, ActionKind, BotError, TaskState};
use rust_decimal_macros::dec;
use serde_json::{json, Value};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

fn iso(t: DateTime<Utc>) -> String {
    t.to_rfc3339()
}

fn account(extra: Value) -> AccountSnapshot {
    let mut base = json!({ "balance": 20, "shield": 0 });
    if let (Some(obj), Some(more)) = (base.as_object_mut(), extra.as_object()) {
        for (k, v) in more {
            obj.insert(k.clone(), v.clone());
        }
    }
    serde_json::from_value(base).unwrap()
}

fn state(extra: Value) -> AccountState {
    AccountState::parse(&account(extra), &TaskSnapshot::default()).unwrap()
}

#[test]
fn test_everything_due_when_never_done() {
    let s = state(json!({}));
    let t = now();
    assert!(s.should_claim_daily(t));
    assert!(s.should_claim(t));
    assert!(s.should_get_fuel(t));
    assert!(s.should_get_shield(t));
    assert!(s.should_get_shield_immunity(t));
    assert!(s.should_get_onclick_task(t));
    assert!(s.should_get_roulette(t));
    assert_eq!(s.due_actions(t), ActionKind::PRIORITY.to_vec());
}

#[test]
fn test_absent_wins_even_with_empty_balance() {
    let s = state(json!({ "balance": 0 }));
    assert!(s.should_get_shield(now()));
    assert!(s.should_get_shield_immunity(now()));
}

#[test]
fn test_daily_boundary_is_inclusive() {
    let next = now() - Duration::hours(1);
    let s = state(json!({ "daily_next_at": iso(next) }));
    assert!(s.should_claim_daily(now()));
    assert!(!s.should_claim_daily(now() - Duration::seconds(1)));
}

#[test]
fn test_claim_boundary_is_strict() {
    let last = now() - Duration::minutes(75);
    let s = state(json!({ "claimed_last": iso(last) }));
    assert!(!s.should_claim(now()));
    assert!(s.should_claim(now() + Duration::seconds(1)));
}

#[test]
fn test_claim_scenarios() {
    let s = state(json!({ "claimed_last": iso(now() - Duration::hours(2)) }));
    assert!(s.should_claim(now()));
    let s = state(json!({ "claimed_last": iso(now() - Duration::minutes(30)) }));
    assert!(!s.should_claim(now()));
}

#[test]
fn test_fuel_boundary_follows_level() {
    for level in 1..=5 {
        let cooldown = fuel_cooldown(Some(level));
        let s = state(json!({ "fuel": level, "fuel_free_after_at": iso(now() - cooldown) }));
        assert!(!s.should_get_fuel(now()), "level {level} at boundary");
        assert!(s.should_get_fuel(now() + Duration::seconds(1)), "level {level} past boundary");
    }
}

#[test]
fn test_fuel_cooldown_grows_with_level() {
    let cooldowns: Vec<_> = (1..=5).map(|l| fuel_cooldown(Some(l))).collect();
    assert!(cooldowns.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(fuel_cooldown(Some(42)), Duration::minutes(150));
}

#[test]
fn test_unknown_fuel_level_is_conservative() {
    let last = now() - Duration::minutes(100);
    // Level 3 (90 min) would be due; an unknown level waits the full 150 min.
    assert!(state(json!({ "fuel": 3, "fuel_free_after_at": iso(last) })).should_get_fuel(now()));
    assert!(!state(json!({ "fuel": 8, "fuel_free_after_at": iso(last) })).should_get_fuel(now()));
    assert!(!state(json!({ "fuel_free_after_at": iso(last) })).should_get_fuel(now()));
}

#[test]
fn test_shield_needs_inactive_shield_and_balance() {
    let ended = iso(now() - Duration::days(1));
    assert!(state(json!({ "shield_free_after_at": ended, "balance": 16 })).should_get_shield(now()));
    assert!(!state(json!({ "shield_free_after_at": ended, "balance": 15 })).should_get_shield(now()));
    assert!(!state(json!({ "shield_free_after_at": ended, "balance": 3 })).should_get_shield(now()));
    assert!(!state(json!({
        "shield_free_after_at": ended,
        "balance": 100,
        "shield_active": true
    }))
    .should_get_shield(now()));
}

#[test]
fn test_shield_immunity_boundary_and_balance() {
    let at = now() - Duration::minutes(90);
    let s = state(json!({ "shield_immunity_at": iso(at), "balance": 9 }));
    assert!(!s.should_get_shield_immunity(now()));
    assert!(s.should_get_shield_immunity(now() + Duration::seconds(1)));

    let poor = state(json!({ "shield_immunity_at": iso(at), "balance": "8" }));
    assert!(!poor.should_get_shield_immunity(now() + Duration::hours(5)));
}

#[test]
fn test_roulette_boundary_is_strict() {
    let after = now() - Duration::hours(1);
    let s = state(json!({ "spin_after_at": iso(after) }));
    assert!(!s.should_get_roulette(now()));
    assert!(s.should_get_roulette(now() + Duration::seconds(1)));
}

#[test]
fn test_completed_task_is_never_ready() {
    let tasks: TaskSnapshot = serde_json::from_value(json!({
        "listCompleted": [
            { "locale_time": "2020-01-01 00:00:00" },
            { "locale_time": "2019-01-01 00:00:00" }
        ]
    }))
    .unwrap();
    let s = AccountState::parse(&account(json!({})), &tasks).unwrap();
    assert!(s.task.completed);
    assert!(!s.should_get_onclick_task(now()));
    assert!(!s.should_get_onclick_task(now() + Duration::days(365)));
}

#[test]
fn test_task_cooldown_applies_when_not_completed() {
    let done_at = now() - Duration::hours(1);
    let task = TaskState {
        completed: false,
        completed_at: Some(done_at),
    };
    assert!(!task.is_ready(now()));
    assert!(task.is_ready(now() + Duration::seconds(1)));
    assert!(TaskState::default().is_ready(now()));
}

#[test]
fn test_parse_rejects_missing_or_bad_required_fields() {
    let tasks = TaskSnapshot::default();
    let no_balance: AccountSnapshot = serde_json::from_value(json!({ "shield": 1 })).unwrap();
    assert!(matches!(
        AccountState::parse(&no_balance, &tasks),
        Err(BotError::MalformedSnapshot(_))
    ));

    let bad_balance: AccountSnapshot =
        serde_json::from_value(json!({ "balance": "lots", "shield": 1 })).unwrap();
    assert!(matches!(
        AccountState::parse(&bad_balance, &tasks),
        Err(BotError::MalformedSnapshot(_))
    ));

    let no_shield: AccountSnapshot = serde_json::from_value(json!({ "balance": 1 })).unwrap();
    assert!(AccountState::parse(&no_shield, &tasks).is_err());

    let bad_time = account(json!({ "daily_next_at": "tomorrow-ish" }));
    assert!(AccountState::parse(&bad_time, &tasks).is_err());
}

#[test]
fn test_wrong_json_types_are_malformed_not_fatal() {
    let tasks = TaskSnapshot::default();
    for bad in [
        json!({ "balance": true, "shield": 0 }),
        json!({ "balance": 20, "shield": [1] }),
        json!({ "balance": 20, "shield": 0, "spin_after_at": 1700000000 }),
    ] {
        let snapshot: AccountSnapshot = serde_json::from_value(bad).unwrap();
        assert!(matches!(
            AccountState::parse(&snapshot, &tasks),
            Err(BotError::MalformedSnapshot(_))
        ));
    }

    let s = state(json!({ "shield_active": 1, "tech_work": 0 }));
    assert!(s.shield_active);
    assert!(!s.tech_work_active);

    let null_list: TaskSnapshot = serde_json::from_value(json!({ "listCompleted": null })).unwrap();
    let s = AccountState::parse(&account(json!({})), &null_list).unwrap();
    assert_eq!(s.task, TaskState::default());
}

#[test]
fn test_parse_reads_all_fields() {
    let s = state(json!({
        "balance": "31.75",
        "shield": 2,
        "fuel": 4,
        "shield_active": true,
        "tech_work": false,
        "claimed_last": "2025-03-01T10:00:00Z",
        "daily_next_at": null,
        "spin_after_at": ""
    }));
    assert_eq!(s.balance, dec!(31.75));
    assert_eq!(s.shield, 2);
    assert_eq!(s.fuel_level, Some(4));
    assert!(s.shield_active);
    assert!(!s.tech_work_active);
    assert_eq!(s.last_claimed_at, Some(Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap()));
    assert_eq!(s.daily_next_at, None);
    assert_eq!(s.spin_after_at, None);
}

#[test]
fn test_predicates_are_repeatable() {
    let s = state(json!({
        "claimed_last": iso(now() - Duration::minutes(80)),
        "shield_free_after_at": iso(now()),
        "spin_after_at": iso(now() - Duration::minutes(10)),
    }));
    let first = s.due_actions(now());
    let copy = s.clone();
    assert_eq!(first, s.due_actions(now()));
    assert_eq!(s, copy);
}
