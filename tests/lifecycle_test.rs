//! Search and consultation lifecycles over the in-memory store.

mod common;

use chrono::{Duration, Utc};

use common::{admin, days, user, MemoryLedger};
use uplin_api::domain::{
    ConsultationPatch, CreateConsultation, CreateSearch, CreditKind, RequestState, SearchPatch,
};
use uplin_api::errors::AppError;
use uplin_api::services::ledger::lifecycle;

fn finalize(credits: i32) -> SearchPatch {
    SearchPatch {
        state: Some(RequestState::Finalized),
        credits_used: Some(credits),
        ..Default::default()
    }
}

fn search_for(bucket_id: i32) -> CreateSearch {
    CreateSearch {
        info: "Backend developer, Córdoba".into(),
        bucket_id,
    }
}

#[tokio::test]
async fn finalized_search_debits_and_deleting_it_refunds() {
    let store = MemoryLedger::new();
    let plan = store.add_bucket(1, CreditKind::Plan, 10, days(30));
    let extra = store.add_bucket(1, CreditKind::Additional, 5, None);

    let search = lifecycle::create_search(&store, user(1), search_for(plan))
        .await
        .unwrap();
    assert_eq!(search.state, RequestState::Pending);
    assert_eq!(search.user_id, 1);

    let finalized = lifecycle::update_search(&store, search.id, finalize(12))
        .await
        .unwrap();
    assert_eq!(finalized.state, RequestState::Finalized);
    assert_eq!(finalized.credits_used, Some(12));
    assert_eq!(store.quantity(plan), 0);
    assert_eq!(store.quantity(extra), 3);

    let eliminated = lifecycle::delete_search(&store, user(1), search.id)
        .await
        .unwrap();
    assert_eq!(eliminated.state, RequestState::Eliminated);
    // Everything goes back to the bucket the search was charged to.
    assert_eq!(store.quantity(plan), 12);
    assert_eq!(store.total_credits(1), 15);
}

#[tokio::test]
async fn pending_search_deletes_without_touching_balances() {
    let store = MemoryLedger::new();
    let plan = store.add_bucket(1, CreditKind::Plan, 10, days(30));
    let search = lifecycle::create_search(&store, user(1), search_for(plan))
        .await
        .unwrap();

    lifecycle::delete_search(&store, user(1), search.id)
        .await
        .unwrap();

    assert_eq!(store.writes(), 0);
    assert_eq!(store.quantity(plan), 10);
}

#[tokio::test]
async fn searches_are_opened_on_own_buckets_unless_admin() {
    let store = MemoryLedger::new();
    let bucket = store.add_bucket(1, CreditKind::Plan, 10, days(30));

    let result = lifecycle::create_search(&store, user(2), search_for(bucket)).await;
    assert!(matches!(result, Err(AppError::Forbidden)));

    let search = lifecycle::create_search(&store, admin(), search_for(bucket))
        .await
        .unwrap();
    assert_eq!(search.user_id, 1);

    let missing = lifecycle::create_search(&store, user(1), search_for(404)).await;
    assert!(matches!(missing, Err(AppError::NotFound)));
}

#[tokio::test]
async fn finalizing_needs_credits_and_leaves_balances_alone_on_shortfall() {
    let store = MemoryLedger::new();
    let plan = store.add_bucket(1, CreditKind::Plan, 4, days(30));
    let search = lifecycle::create_search(&store, user(1), search_for(plan))
        .await
        .unwrap();

    let without_credits = SearchPatch {
        state: Some(RequestState::Finalized),
        ..Default::default()
    };
    assert!(matches!(
        lifecycle::update_search(&store, search.id, without_credits).await,
        Err(AppError::Validation(_))
    ));

    assert!(matches!(
        lifecycle::update_search(&store, search.id, finalize(5)).await,
        Err(AppError::InsufficientCredit { .. })
    ));
    assert_eq!(store.quantity(plan), 4);
}

#[tokio::test]
async fn finalized_and_eliminated_searches_reject_changes() {
    let store = MemoryLedger::new();
    let plan = store.add_bucket(1, CreditKind::Plan, 10, days(30));
    let search = lifecycle::create_search(&store, user(1), search_for(plan))
        .await
        .unwrap();
    lifecycle::update_search(&store, search.id, finalize(2))
        .await
        .unwrap();

    let edit = SearchPatch {
        notes: Some("Shortlist sent".into()),
        ..Default::default()
    };
    assert!(matches!(
        lifecycle::update_search(&store, search.id, edit.clone()).await,
        Err(AppError::InvalidStateTransition(_))
    ));

    lifecycle::delete_search(&store, user(1), search.id)
        .await
        .unwrap();
    assert!(matches!(
        lifecycle::delete_search(&store, user(1), search.id).await,
        Err(AppError::InvalidStateTransition(_))
    ));
    assert!(matches!(
        lifecycle::update_search(&store, search.id, edit).await,
        Err(AppError::InvalidStateTransition(_))
    ));
    // Refunded exactly once.
    assert_eq!(store.quantity(plan), 10);
}

#[tokio::test]
async fn eliminating_through_update_is_rejected() {
    let store = MemoryLedger::new();
    let plan = store.add_bucket(1, CreditKind::Plan, 10, days(30));
    let search = lifecycle::create_search(&store, user(1), search_for(plan))
        .await
        .unwrap();

    let patch = SearchPatch {
        state: Some(RequestState::Eliminated),
        ..Default::default()
    };
    assert!(matches!(
        lifecycle::update_search(&store, search.id, patch).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn consultation_hours_are_taken_at_creation_and_returned_on_delete() {
    let store = MemoryLedger::new();
    let pool = store.add_pool(1, 10, 10, Utc::now() + Duration::days(20));

    let consultation = lifecycle::create_consultation(
        &store,
        user(1),
        CreateConsultation {
            pool_id: pool,
            hours: 4,
            comments: Some("Payroll review".into()),
        },
        Utc::now(),
    )
    .await
    .unwrap();
    assert_eq!(consultation.state, RequestState::Pending);
    assert_eq!(store.remaining_hours(pool), 6);

    let finalized = lifecycle::update_consultation(
        &store,
        consultation.id,
        ConsultationPatch {
            state: Some(RequestState::Finalized),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(finalized.state, RequestState::Finalized);
    assert_eq!(store.remaining_hours(pool), 6);

    lifecycle::delete_consultation(&store, user(1), consultation.id)
        .await
        .unwrap();
    assert_eq!(store.remaining_hours(pool), 10);
}

#[tokio::test]
async fn consultation_is_not_recorded_when_hours_fall_short() {
    let store = MemoryLedger::new();
    let pool = store.add_pool(1, 10, 2, Utc::now() + Duration::days(20));

    let result = lifecycle::create_consultation(
        &store,
        user(1),
        CreateConsultation {
            pool_id: pool,
            hours: 3,
            comments: None,
        },
        Utc::now(),
    )
    .await;

    assert!(matches!(
        result,
        Err(AppError::InsufficientHours {
            requested: 3,
            remaining: 2
        })
    ));
    assert_eq!(store.consultation_count(), 0);
    assert_eq!(store.remaining_hours(pool), 2);
}

#[tokio::test]
async fn expired_or_foreign_pools_are_rejected() {
    let store = MemoryLedger::new();
    let expired = store.add_pool(1, 10, 10, Utc::now() - Duration::days(1));
    let active = store.add_pool(1, 10, 10, Utc::now() + Duration::days(1));

    let request = |pool_id| CreateConsultation {
        pool_id,
        hours: 1,
        comments: None,
    };

    assert!(matches!(
        lifecycle::create_consultation(&store, user(1), request(expired), Utc::now()).await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        lifecycle::create_consultation(&store, user(2), request(active), Utc::now()).await,
        Err(AppError::Forbidden)
    ));
    assert_eq!(store.remaining_hours(active), 10);
}

#[tokio::test]
async fn only_the_owner_or_an_admin_deletes_a_consultation() {
    let store = MemoryLedger::new();
    let pool = store.add_pool(1, 5, 5, Utc::now() + Duration::days(10));
    let consultation = lifecycle::create_consultation(
        &store,
        user(1),
        CreateConsultation {
            pool_id: pool,
            hours: 2,
            comments: None,
        },
        Utc::now(),
    )
    .await
    .unwrap();

    assert!(matches!(
        lifecycle::delete_consultation(&store, user(2), consultation.id).await,
        Err(AppError::Forbidden)
    ));
    assert_eq!(store.remaining_hours(pool), 3);

    lifecycle::delete_consultation(&store, admin(), consultation.id)
        .await
        .unwrap();
    assert_eq!(store.remaining_hours(pool), 5);
}
