//! Query helpers shared by the repositories.

use sea_orm::{DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, Select, SqlErr};

use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

/// Fetch one page of `select` together with the total row count.
pub(crate) async fn fetch_page<E>(
    select: Select<E>,
    db: &DatabaseConnection,
    params: &PaginationParams,
) -> AppResult<(Vec<E::Model>, u64)>
where
    E: EntityTrait,
    E::Model: Send + Sync,
{
    let paginator = select.paginate(db, params.limit());
    let total = paginator.num_items().await?;
    let models = paginator.fetch_page(params.page_index()).await?;
    Ok((models, total))
}

/// Map unique-constraint violations to a conflict on `entity`.
pub(crate) fn conflict_on_unique(entity: &'static str) -> impl Fn(DbErr) -> AppError {
    move |err| match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::conflict(entity),
        _ => AppError::from(err),
    }
}
