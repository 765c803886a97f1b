//! Credit bucket database entity.

use sea_orm::entity::prelude::*;

use crate::domain::{CreditBucket, CreditKind};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "credit_buckets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    /// `plan`, `adicional` or `devuelto`
    pub kind: String,
    pub quantity: i32,
    pub expires_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for CreditBucket {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let kind: CreditKind = model.kind.parse().map_err(|_| {
            AppError::internal(format!(
                "credit bucket {} has unknown kind '{}'",
                model.id, model.kind
            ))
        })?;

        Ok(CreditBucket {
            id: model.id,
            user_id: model.user_id,
            kind,
            quantity: model.quantity,
            expires_at: model.expires_at,
            created_at: model.created_at,
        })
    }
}
