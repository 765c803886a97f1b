//! Search database entity.

use sea_orm::entity::prelude::*;

use crate::domain::{RequestState, Search};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "searches")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "Text")]
    pub info: String,
    pub credits_used: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub state: String,
    pub bucket_id: Option<i32>,
    pub user_id: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Search {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let state: RequestState = model.state.parse().map_err(|_| {
            AppError::internal(format!(
                "search {} has unknown state '{}'",
                model.id, model.state
            ))
        })?;

        Ok(Search {
            id: model.id,
            info: model.info,
            credits_used: model.credits_used,
            notes: model.notes,
            state,
            bucket_id: model.bucket_id,
            user_id: model.user_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
