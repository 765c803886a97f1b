//! State transitions of searches and consultations, with the balance movements they imply.
//!
//! Each function expects a store scoped to a single transaction so that the state change and
//! the debit or reversal commit together.

use chrono::{DateTime, Utc};

use super::reconciler::{apply_hour_debit, debit_credits, reverse_credits, reverse_hours};
use super::store::{LedgerStore, UsageStore};
use crate::domain::{
    Actor, Consultation, ConsultationPatch, CreateConsultation, CreateSearch, NewConsultation,
    NewSearch, RequestState, Search, SearchPatch,
};
use crate::errors::{AppError, AppResult};

/// Open a pending search against one of the caller's buckets. Nothing is debited yet.
pub async fn create_search<S>(store: &S, actor: Actor, input: CreateSearch) -> AppResult<Search>
where
    S: LedgerStore + UsageStore + ?Sized,
{
    let bucket = store
        .find_bucket(input.bucket_id)
        .await?
        .ok_or(AppError::NotFound)?;
    actor.ensure_owns(bucket.user_id)?;

    let search = store
        .insert_search(NewSearch {
            info: input.info,
            bucket_id: bucket.id,
            user_id: bucket.user_id,
        })
        .await?;

    tracing::info!(search_id = search.id, bucket_id = bucket.id, "Search created");
    Ok(search)
}

/// Edit a pending search. Finalizing debits `credits_used` across the owner's buckets.
pub async fn update_search<S>(store: &S, id: i32, patch: SearchPatch) -> AppResult<Search>
where
    S: LedgerStore + UsageStore + ?Sized,
{
    if patch.is_empty() {
        return Err(AppError::validation("No fields to update"));
    }

    let mut search = store.find_search(id).await?.ok_or(AppError::NotFound)?;
    search.state.ensure_editable()?;
    let debit = patch.finalization()?;

    if let Some(info) = patch.info {
        search.info = info;
    }
    if let Some(notes) = patch.notes {
        search.notes = Some(notes);
    }

    if let Some(amount) = debit {
        debit_credits(store, search.user_id, amount).await?;
        search.state = RequestState::Finalized;
        search.credits_used = Some(amount);
    }

    let saved = store.save_search(&search).await?;
    tracing::info!(search_id = id, state = %saved.state, "Search updated");
    Ok(saved)
}

/// Eliminate a search, giving back its credits if it was finalized.
pub async fn delete_search<S>(store: &S, actor: Actor, id: i32) -> AppResult<Search>
where
    S: LedgerStore + UsageStore + ?Sized,
{
    let mut search = store.find_search(id).await?.ok_or(AppError::NotFound)?;
    actor.ensure_owns(search.user_id)?;
    search.state.ensure_deletable()?;

    if let Some(amount) = search.refundable_credits() {
        reverse_credits(store, search.user_id, search.bucket_id, amount).await?;
    }

    search.state = RequestState::Eliminated;
    let saved = store.save_search(&search).await?;
    tracing::info!(search_id = id, "Search eliminated");
    Ok(saved)
}

/// Open a consultation and debit its hours from the pool in the same step.
pub async fn create_consultation<S>(
    store: &S,
    actor: Actor,
    input: CreateConsultation,
    now: DateTime<Utc>,
) -> AppResult<Consultation>
where
    S: LedgerStore + UsageStore + ?Sized,
{
    let pool = store
        .find_pool(input.pool_id)
        .await?
        .ok_or(AppError::NotFound)?;
    actor.ensure_owns(pool.user_id)?;
    if pool.is_expired(now) {
        return Err(AppError::validation("The hour pool has expired"));
    }

    let user_id = pool.user_id;
    let pool = apply_hour_debit(store, pool, input.hours).await?;

    let consultation = store
        .insert_consultation(NewConsultation {
            hours: input.hours,
            comments: input.comments,
            pool_id: pool.id,
            user_id,
        })
        .await?;

    tracing::info!(
        consultation_id = consultation.id,
        pool_id = pool.id,
        hours = input.hours,
        "Consultation created"
    );
    Ok(consultation)
}

/// Edit a pending consultation. Finalizing moves no hours; they were taken at creation.
pub async fn update_consultation<S>(
    store: &S,
    id: i32,
    patch: ConsultationPatch,
) -> AppResult<Consultation>
where
    S: LedgerStore + UsageStore + ?Sized,
{
    if patch.is_empty() {
        return Err(AppError::validation("No fields to update"));
    }

    let mut consultation = store
        .find_consultation(id)
        .await?
        .ok_or(AppError::NotFound)?;
    consultation.state.ensure_editable()?;
    let finalizes = patch.finalizes()?;

    if let Some(comments) = patch.comments {
        consultation.comments = Some(comments);
    }
    if let Some(notes) = patch.notes {
        consultation.notes = Some(notes);
    }
    if finalizes {
        consultation.state = RequestState::Finalized;
    }

    let saved = store.save_consultation(&consultation).await?;
    tracing::info!(consultation_id = id, state = %saved.state, "Consultation updated");
    Ok(saved)
}

/// Eliminate a consultation and return its hours to the pool.
pub async fn delete_consultation<S>(store: &S, actor: Actor, id: i32) -> AppResult<Consultation>
where
    S: LedgerStore + UsageStore + ?Sized,
{
    let mut consultation = store
        .find_consultation(id)
        .await?
        .ok_or(AppError::NotFound)?;
    actor.ensure_owns(consultation.user_id)?;
    consultation.state.ensure_deletable()?;

    if let Some(hours) = consultation.refundable_hours() {
        reverse_hours(store, consultation.pool_id, hours).await?;
    }

    consultation.state = RequestState::Eliminated;
    let saved = store.save_consultation(&consultation).await?;
    tracing::info!(consultation_id = id, "Consultation eliminated");
    Ok(saved)
}
