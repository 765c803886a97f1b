//! Pure ledger rules: which buckets are usable, how a debit is spread across them and
//! where a refund lands. Persistence lives in `services::ledger`; nothing here touches I/O.

use chrono::{DateTime, Utc};

use crate::errors::{AppError, AppResult};

use super::credit::{CreditBucket, CreditKind};

/// Buckets that count toward a user's balance at `now`.
///
/// Expired buckets are dropped and only the most recently created `plan` bucket survives.
/// The relative order of the input is preserved.
pub fn usable_buckets(buckets: Vec<CreditBucket>, now: DateTime<Utc>) -> Vec<CreditBucket> {
    let live: Vec<CreditBucket> = buckets.into_iter().filter(|b| !b.is_expired(now)).collect();

    let current_plan = live
        .iter()
        .filter(|b| b.kind == CreditKind::Plan)
        .max_by_key(|b| (b.created_at, b.id))
        .map(|b| b.id);

    live.into_iter()
        .filter(|b| b.kind != CreditKind::Plan || Some(b.id) == current_plan)
        .collect()
}

/// Non-empty buckets in the order they are drawn from: refunded, then plan, then additional.
/// Refunded and additional groups go largest first; ties keep the input order.
pub fn debit_order(buckets: &[CreditBucket]) -> Vec<&CreditBucket> {
    let group = |kind: CreditKind| {
        let mut picked: Vec<&CreditBucket> = buckets
            .iter()
            .filter(|b| b.kind == kind && b.quantity > 0)
            .collect();
        if kind != CreditKind::Plan {
            picked.sort_by(|a, b| b.quantity.cmp(&a.quantity));
        }
        picked
    };

    let mut ordered = group(CreditKind::Refunded);
    ordered.extend(group(CreditKind::Plan));
    ordered.extend(group(CreditKind::Additional));
    ordered
}

/// Amount taken from a single bucket by a debit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketDebit {
    pub bucket_id: i32,
    pub kind: CreditKind,
    /// Quantity read before the debit
    pub before: i32,
    pub taken: i32,
}

impl BucketDebit {
    pub fn after(&self) -> i32 {
        self.before - self.taken
    }
}

/// Spread `amount` over `buckets` by priority.
///
/// Fails with [`AppError::InsufficientCredit`] when the buckets cannot cover the amount;
/// in that case no step is produced, so callers write nothing.
pub fn plan_debit(buckets: &[CreditBucket], amount: i32) -> AppResult<Vec<BucketDebit>> {
    if amount <= 0 {
        return Err(AppError::validation("Credits to debit must be positive"));
    }

    let ordered = debit_order(buckets);
    let available: i64 = ordered.iter().map(|b| i64::from(b.quantity)).sum();
    if available < i64::from(amount) {
        return Err(AppError::InsufficientCredit {
            requested: amount,
            available: i32::try_from(available).unwrap_or(i32::MAX),
        });
    }

    let mut remaining = amount;
    let mut steps = Vec::new();
    for bucket in ordered {
        if remaining == 0 {
            break;
        }
        let taken = bucket.quantity.min(remaining);
        steps.push(BucketDebit {
            bucket_id: bucket.id,
            kind: bucket.kind,
            before: bucket.quantity,
            taken,
        });
        remaining -= taken;
    }

    Ok(steps)
}

/// Bucket that receives a refund, if any qualifies.
///
/// The bucket the request was charged to wins when it is still usable; otherwise the first
/// refunded, plan or additional bucket (in that order). `None` means a new refunded bucket
/// has to be created.
pub fn refund_target(
    buckets: &[CreditBucket],
    source_bucket_id: Option<i32>,
) -> Option<&CreditBucket> {
    if let Some(source) = source_bucket_id.and_then(|id| buckets.iter().find(|b| b.id == id)) {
        return Some(source);
    }

    [CreditKind::Refunded, CreditKind::Plan, CreditKind::Additional]
        .into_iter()
        .find_map(|kind| buckets.iter().find(|b| b.kind == kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn bucket(id: i32, kind: CreditKind, quantity: i32) -> CreditBucket {
        CreditBucket {
            id,
            user_id: 1,
            kind,
            quantity,
            expires_at: None,
            created_at: Utc::now(),
        }
    }

    fn total(buckets: &[CreditBucket]) -> i32 {
        buckets.iter().map(|b| b.quantity).sum()
    }

    fn apply(buckets: &mut [CreditBucket], steps: &[BucketDebit]) {
        for step in steps {
            let b = buckets.iter_mut().find(|b| b.id == step.bucket_id).unwrap();
            assert_eq!(b.quantity, step.before);
            b.quantity = step.after();
        }
    }

    #[test]
    fn debit_spills_from_refunded_into_plan() {
        let mut buckets = vec![
            bucket(1, CreditKind::Refunded, 3),
            bucket(2, CreditKind::Plan, 5),
            bucket(3, CreditKind::Additional, 10),
        ];
        let steps = plan_debit(&buckets, 6).unwrap();
        apply(&mut buckets, &steps);

        assert_eq!(
            buckets.iter().map(|b| b.quantity).collect::<Vec<_>>(),
            vec![0, 2, 10]
        );
        assert_eq!(steps.len(), 2);
    }

    #[test]
    fn insufficient_balance_produces_no_steps() {
        let buckets = vec![
            bucket(1, CreditKind::Plan, 5),
            bucket(2, CreditKind::Additional, 3),
        ];
        let err = plan_debit(&buckets, 10).unwrap_err();
        assert!(matches!(
            err,
            AppError::InsufficientCredit {
                requested: 10,
                available: 8
            }
        ));
    }

    #[test]
    fn debit_takes_exactly_the_amount() {
        let mut buckets = vec![
            bucket(1, CreditKind::Additional, 4),
            bucket(2, CreditKind::Refunded, 2),
            bucket(3, CreditKind::Additional, 9),
            bucket(4, CreditKind::Plan, 1),
        ];
        let before = total(&buckets);
        let steps = plan_debit(&buckets, 7).unwrap();
        apply(&mut buckets, &steps);

        assert_eq!(before - total(&buckets), 7);
        // refunded 2, plan 1, then the larger additional bucket
        let order: Vec<i32> = steps.iter().map(|s| s.bucket_id).collect();
        assert_eq!(order, vec![2, 4, 3]);
    }

    #[test]
    fn equal_quantities_keep_storage_order() {
        let buckets = vec![
            bucket(10, CreditKind::Refunded, 2),
            bucket(11, CreditKind::Refunded, 2),
        ];
        let ordered: Vec<i32> = debit_order(&buckets).iter().map(|b| b.id).collect();
        assert_eq!(ordered, vec![10, 11]);
    }

    #[test]
    fn empty_buckets_are_skipped() {
        let buckets = vec![
            bucket(1, CreditKind::Refunded, 0),
            bucket(2, CreditKind::Plan, 3),
        ];
        let steps = plan_debit(&buckets, 3).unwrap();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].bucket_id, 2);
    }

    #[test]
    fn only_newest_plan_bucket_is_usable() {
        let now = Utc::now();
        let mut old_plan = bucket(1, CreditKind::Plan, 20);
        old_plan.created_at = now - Duration::days(40);
        let mut new_plan = bucket(2, CreditKind::Plan, 30);
        new_plan.created_at = now - Duration::days(5);
        let extra = bucket(3, CreditKind::Additional, 4);

        let usable = usable_buckets(vec![old_plan, new_plan, extra], now);
        let ids: Vec<i32> = usable.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn expired_buckets_are_not_usable() {
        let now = Utc::now();
        let mut expired = bucket(1, CreditKind::Plan, 10);
        expired.expires_at = Some(now - Duration::hours(1));
        let mut older_live_plan = bucket(2, CreditKind::Plan, 5);
        older_live_plan.created_at = now - Duration::days(60);
        older_live_plan.expires_at = Some(now + Duration::days(1));

        let usable = usable_buckets(vec![expired, older_live_plan], now);
        assert_eq!(usable.len(), 1);
        assert_eq!(usable[0].id, 2);
    }

    #[test]
    fn refund_prefers_source_bucket() {
        let buckets = vec![
            bucket(1, CreditKind::Refunded, 0),
            bucket(2, CreditKind::Additional, 1),
        ];
        assert_eq!(refund_target(&buckets, Some(2)).map(|b| b.id), Some(2));
    }

    #[test]
    fn refund_falls_back_by_kind() {
        let plan_and_extra = vec![
            bucket(2, CreditKind::Additional, 1),
            bucket(3, CreditKind::Plan, 0),
        ];
        assert_eq!(
            refund_target(&plan_and_extra, Some(99)).map(|b| b.id),
            Some(3)
        );

        let with_refunded = vec![
            bucket(2, CreditKind::Additional, 1),
            bucket(3, CreditKind::Plan, 0),
            bucket(4, CreditKind::Refunded, 0),
        ];
        assert_eq!(refund_target(&with_refunded, None).map(|b| b.id), Some(4));

        let only_extra = vec![bucket(5, CreditKind::Additional, 0)];
        assert_eq!(refund_target(&only_extra, Some(1)).map(|b| b.id), Some(5));

        assert!(refund_target(&[], Some(1)).is_none());
    }

    #[test]
    fn debit_then_refund_to_source_conserves_total() {
        let mut buckets = vec![
            bucket(1, CreditKind::Plan, 5),
            bucket(2, CreditKind::Additional, 5),
        ];
        let before = total(&buckets);
        let steps = plan_debit(&buckets, 4).unwrap();
        apply(&mut buckets, &steps);

        let target = refund_target(&buckets, Some(1)).unwrap().id;
        buckets.iter_mut().find(|b| b.id == target).unwrap().quantity += 4;
        assert_eq!(total(&buckets), before);
    }
}
