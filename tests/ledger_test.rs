//! Debit and reversal walks against an in-memory store.

mod common;

use chrono::{Duration, Utc};

use common::{days, user, MemoryLedger};
use uplin_api::domain::{CreateConsultation, CreditKind};
use uplin_api::errors::AppError;
use uplin_api::services::ledger::{
    debit_credits, debit_hours, lifecycle, reverse_credits, reverse_hours, Refund,
};

struct Wallet {
    store: MemoryLedger,
    refunded: i32,
    old_plan: i32,
    plan: i32,
    small_extra: i32,
    big_extra: i32,
    expired_extra: i32,
}

/// User 1: refunded 5, a superseded plan bucket of 50, the current plan bucket of 10,
/// additional buckets of 3 and 8, and an expired additional bucket of 100.
fn wallet() -> Wallet {
    let store = MemoryLedger::new();
    let refunded = store.add_bucket(1, CreditKind::Refunded, 5, None);
    let old_plan = store.add_bucket(1, CreditKind::Plan, 50, days(10));
    let plan = store.add_bucket(1, CreditKind::Plan, 10, days(20));
    let small_extra = store.add_bucket(1, CreditKind::Additional, 3, None);
    let big_extra = store.add_bucket(1, CreditKind::Additional, 8, None);
    let expired_extra = store.add_bucket(1, CreditKind::Additional, 100, days(-1));
    Wallet {
        store,
        refunded,
        old_plan,
        plan,
        small_extra,
        big_extra,
        expired_extra,
    }
}

#[tokio::test]
async fn debit_draws_refunded_then_plan_then_largest_additional() {
    let w = wallet();
    let before = w.store.total_credits(1);

    let steps = debit_credits(&w.store, 1, 20).await.unwrap();

    let taken: Vec<(i32, i32)> = steps.iter().map(|s| (s.bucket_id, s.taken)).collect();
    assert_eq!(taken, vec![(w.refunded, 5), (w.plan, 10), (w.big_extra, 5)]);

    assert_eq!(w.store.quantity(w.refunded), 0);
    assert_eq!(w.store.quantity(w.plan), 0);
    assert_eq!(w.store.quantity(w.big_extra), 3);
    assert_eq!(w.store.quantity(w.small_extra), 3);
    assert_eq!(w.store.total_credits(1), before - 20);
}

#[tokio::test]
async fn superseded_and_expired_buckets_are_never_touched() {
    let w = wallet();

    debit_credits(&w.store, 1, 26).await.unwrap();

    assert_eq!(w.store.quantity(w.old_plan), 50);
    assert_eq!(w.store.quantity(w.expired_extra), 100);
}

#[tokio::test]
async fn insufficient_balance_writes_nothing() {
    let w = wallet();

    let result = debit_credits(&w.store, 1, 27).await;

    assert!(matches!(
        result,
        Err(AppError::InsufficientCredit {
            requested: 27,
            available: 26
        })
    ));
    assert_eq!(w.store.writes(), 0);
    assert_eq!(w.store.quantity(w.refunded), 5);
}

#[tokio::test]
async fn non_positive_debit_is_a_validation_error() {
    let w = wallet();
    assert!(matches!(
        debit_credits(&w.store, 1, 0).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn concurrent_change_mid_walk_fails_the_walk() {
    let store = MemoryLedger::new();
    let refunded = store.add_bucket(3, CreditKind::Refunded, 2, None);
    let extra = store.add_bucket(3, CreditKind::Additional, 10, None);
    store.mark_stale(extra);

    let result = debit_credits(&store, 3, 5).await;

    assert!(matches!(result, Err(AppError::LedgerWrite(_))));
    // The first step landed; the surrounding transaction is what undoes it.
    assert_eq!(store.writes(), 1);
    assert_eq!(store.quantity(refunded), 0);
    assert_eq!(store.quantity(extra), 10);
}

#[tokio::test]
async fn refund_returns_to_the_charged_bucket_while_usable() {
    let w = wallet();
    debit_credits(&w.store, 1, 20).await.unwrap();

    let refund = reverse_credits(&w.store, 1, Some(w.plan), 4).await.unwrap();

    assert_eq!(
        refund,
        Refund::Existing {
            bucket_id: w.plan,
            kind: CreditKind::Plan,
            quantity: 4
        }
    );
    assert_eq!(w.store.quantity(w.plan), 4);
}

#[tokio::test]
async fn refund_falls_back_when_the_charged_bucket_expired() {
    let w = wallet();

    let refund = reverse_credits(&w.store, 1, Some(w.expired_extra), 7)
        .await
        .unwrap();

    assert!(matches!(refund, Refund::Existing { bucket_id, .. } if bucket_id == w.refunded));
    assert_eq!(w.store.quantity(w.refunded), 12);
    assert_eq!(w.store.quantity(w.expired_extra), 100);
}

#[tokio::test]
async fn refund_falls_back_to_plan_before_additional() {
    let store = MemoryLedger::new();
    let extra = store.add_bucket(4, CreditKind::Additional, 1, None);
    let plan = store.add_bucket(4, CreditKind::Plan, 0, days(5));

    reverse_credits(&store, 4, None, 3).await.unwrap();

    assert_eq!(store.quantity(plan), 3);
    assert_eq!(store.quantity(extra), 1);
}

#[tokio::test]
async fn refund_opens_a_refunded_bucket_when_nothing_is_usable() {
    let store = MemoryLedger::new();
    let expired = store.add_bucket(2, CreditKind::Plan, 9, days(-3));

    let refund = reverse_credits(&store, 2, Some(expired), 6).await.unwrap();

    let bucket = match refund {
        Refund::Created(bucket) => bucket,
        other => panic!("expected a new bucket, got {:?}", other),
    };
    assert_eq!(bucket.kind, CreditKind::Refunded);
    assert_eq!(bucket.quantity, 6);
    assert_eq!(bucket.expires_at, None);
    assert_eq!(store.total_credits(2), 15);
}

#[tokio::test]
async fn debit_then_refund_conserves_the_balance() {
    let w = wallet();
    let before = w.store.total_credits(1);

    debit_credits(&w.store, 1, 12).await.unwrap();
    reverse_credits(&w.store, 1, Some(w.plan), 12).await.unwrap();

    assert_eq!(w.store.total_credits(1), before);
}

#[tokio::test]
async fn hours_can_be_spent_down_to_zero_but_not_below() {
    let store = MemoryLedger::new();
    let pool = store.add_pool(1, 10, 3, Utc::now() + Duration::days(20));

    let drained = debit_hours(&store, pool, 3).await.unwrap();
    assert_eq!(drained.remaining_hours, 0);

    let result = debit_hours(&store, pool, 1).await;
    assert!(matches!(
        result,
        Err(AppError::InsufficientHours {
            requested: 1,
            remaining: 0
        })
    ));
    assert_eq!(store.remaining_hours(pool), 0);
}

#[tokio::test]
async fn hour_reversal_is_not_capped_by_the_total() {
    let store = MemoryLedger::new();
    let pool = store.add_pool(1, 2, 2, Utc::now() + Duration::days(20));

    let restored = reverse_hours(&store, pool, 1).await.unwrap();

    assert_eq!(restored.remaining_hours, 3);
    assert_eq!(store.remaining_hours(pool), 3);
}

#[tokio::test]
async fn missing_pools_differ_between_debit_and_reversal() {
    let store = MemoryLedger::new();

    assert!(matches!(
        debit_hours(&store, 77, 1).await,
        Err(AppError::NotFound)
    ));
    assert!(matches!(
        reverse_hours(&store, 77, 1).await,
        Err(AppError::LedgerWrite(_))
    ));
}

#[tokio::test]
async fn hour_reversal_past_the_integer_range_fails_without_writing() {
    let store = MemoryLedger::new();
    let pool = store.add_pool(1, i32::MAX, 5, Utc::now() + Duration::days(20));
    let consultation = lifecycle::create_consultation(
        &store,
        user(1),
        CreateConsultation {
            pool_id: pool,
            hours: 3,
            comments: None,
        },
        Utc::now(),
    )
    .await
    .unwrap();
    store.set_remaining_hours(pool, i32::MAX);
    let writes = store.writes();

    let result = lifecycle::delete_consultation(&store, user(1), consultation.id).await;

    assert!(matches!(result, Err(AppError::LedgerWrite(_))));
    assert_eq!(store.remaining_hours(pool), i32::MAX);
    assert_eq!(store.writes(), writes);
}
