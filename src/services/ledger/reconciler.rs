//! Debit and reversal walks over a [`LedgerStore`].
//!
//! Every function here assumes the store is scoped to one transaction. A write that does
//! not apply surfaces as [`AppError::LedgerWrite`], and the caller's transaction rolls the
//! whole walk back.

use super::store::LedgerStore;
use crate::domain::{ledger, BucketDebit, CreditBucket, CreditKind, HourPool, NewCreditBucket};
use crate::errors::{AppError, AppResult};

/// Where reversed credits went.
#[derive(Debug, Clone, PartialEq)]
pub enum Refund {
    /// Added onto a bucket that still exists
    Existing {
        bucket_id: i32,
        kind: CreditKind,
        quantity: i32,
    },
    /// No usable bucket was left, so a refunded bucket was opened
    Created(CreditBucket),
}

/// Take `amount` credits from the user's usable buckets by priority.
///
/// Availability is checked before anything is written; on [`AppError::InsufficientCredit`]
/// no bucket is touched.
pub async fn debit_credits<S>(store: &S, user_id: i32, amount: i32) -> AppResult<Vec<BucketDebit>>
where
    S: LedgerStore + ?Sized,
{
    let buckets = store.list_usable_buckets(user_id).await?;
    let steps = ledger::plan_debit(&buckets, amount)?;

    for step in &steps {
        let applied = store
            .update_bucket_quantity(step.bucket_id, step.before, step.after())
            .await
            .map_err(|e| AppError::ledger_write("credit debit", e))?;
        if !applied {
            return Err(AppError::LedgerWrite(format!(
                "bucket {} changed while debiting",
                step.bucket_id
            )));
        }
        tracing::debug!(
            bucket_id = step.bucket_id,
            kind = %step.kind,
            before = step.before,
            after = step.after(),
            "Bucket debited"
        );
    }

    tracing::info!(user_id, amount, buckets = steps.len(), "Credits debited");
    Ok(steps)
}

/// Give `amount` credits back to the user.
///
/// The bucket the request was charged to is preferred while it is still usable, then the
/// first refunded, plan or additional bucket. With none left a new refunded bucket without
/// expiry is created. Exactly one bucket is written.
pub async fn reverse_credits<S>(
    store: &S,
    user_id: i32,
    source_bucket_id: Option<i32>,
    amount: i32,
) -> AppResult<Refund>
where
    S: LedgerStore + ?Sized,
{
    if amount <= 0 {
        return Err(AppError::validation("Credits to reverse must be positive"));
    }

    let buckets = store.list_usable_buckets(user_id).await?;

    let Some(target) = ledger::refund_target(&buckets, source_bucket_id) else {
        let created = store
            .create_bucket(NewCreditBucket::refund(user_id, amount))
            .await
            .map_err(|e| AppError::ledger_write("credit reversal", e))?;
        tracing::info!(
            user_id,
            amount,
            bucket_id = created.id,
            "No usable bucket left, opened a refunded bucket"
        );
        return Ok(Refund::Created(created));
    };

    if Some(target.id) != source_bucket_id {
        tracing::info!(
            user_id,
            source_bucket_id,
            fallback_bucket_id = target.id,
            kind = %target.kind,
            "Original bucket unusable, refunding to fallback"
        );
    }

    let quantity = target
        .quantity
        .checked_add(amount)
        .ok_or_else(|| AppError::LedgerWrite(format!("bucket {} would overflow", target.id)))?;

    let applied = store
        .update_bucket_quantity(target.id, target.quantity, quantity)
        .await
        .map_err(|e| AppError::ledger_write("credit reversal", e))?;
    if !applied {
        return Err(AppError::LedgerWrite(format!(
            "bucket {} changed while refunding",
            target.id
        )));
    }

    tracing::info!(user_id, amount, bucket_id = target.id, "Credits reversed");
    Ok(Refund::Existing {
        bucket_id: target.id,
        kind: target.kind,
        quantity,
    })
}

/// Take `hours` from the pool. Fails with [`AppError::InsufficientHours`] without writing
/// when the pool cannot cover them.
pub async fn debit_hours<S>(store: &S, pool_id: i32, hours: i32) -> AppResult<HourPool>
where
    S: LedgerStore + ?Sized,
{
    let pool = store.find_pool(pool_id).await?.ok_or(AppError::NotFound)?;
    apply_hour_debit(store, pool, hours).await
}

/// Debit a pool already read (and locked) by the caller.
pub(super) async fn apply_hour_debit<S>(store: &S, pool: HourPool, hours: i32) -> AppResult<HourPool>
where
    S: LedgerStore + ?Sized,
{
    let remaining = pool.debited(hours)?;
    write_pool(store, &pool, remaining, "hour debit").await?;

    tracing::info!(pool_id = pool.id, hours, remaining, "Hours debited");
    Ok(HourPool {
        remaining_hours: remaining,
        ..pool
    })
}

/// Give `hours` back to the pool. The pool must still exist.
pub async fn reverse_hours<S>(store: &S, pool_id: i32, hours: i32) -> AppResult<HourPool>
where
    S: LedgerStore + ?Sized,
{
    if hours <= 0 {
        return Err(AppError::validation("Hours to reverse must be positive"));
    }

    let pool = store
        .find_pool(pool_id)
        .await
        .map_err(|e| AppError::ledger_write("hour reversal", e))?
        .ok_or_else(|| AppError::LedgerWrite(format!("hour pool {} no longer exists", pool_id)))?;

    let remaining = pool.credited(hours)?;
    if remaining > pool.total_hours {
        tracing::warn!(
            pool_id,
            remaining,
            total = pool.total_hours,
            "Reversal leaves more hours than the pool total"
        );
    }

    write_pool(store, &pool, remaining, "hour reversal").await?;

    tracing::info!(pool_id, hours, remaining, "Hours reversed");
    Ok(HourPool {
        remaining_hours: remaining,
        ..pool
    })
}

async fn write_pool<S>(store: &S, pool: &HourPool, remaining: i32, context: &str) -> AppResult<()>
where
    S: LedgerStore + ?Sized,
{
    let applied = store
        .update_pool_remaining(pool.id, pool.remaining_hours, remaining)
        .await
        .map_err(|e| AppError::ledger_write(context, e))?;
    if !applied {
        return Err(AppError::LedgerWrite(format!(
            "hour pool {} changed during {}",
            pool.id, context
        )));
    }
    Ok(())
}
