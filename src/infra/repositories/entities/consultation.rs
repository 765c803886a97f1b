//! Consultation database entity.

use sea_orm::entity::prelude::*;

use crate::domain::{Consultation, RequestState};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "consultations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub hours: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub comments: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub state: String,
    pub pool_id: i32,
    pub user_id: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Consultation {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let state: RequestState = model.state.parse().map_err(|_| {
            AppError::internal(format!(
                "consultation {} has unknown state '{}'",
                model.id, model.state
            ))
        })?;

        Ok(Consultation {
            id: model.id,
            hours: model.hours,
            comments: model.comments,
            notes: model.notes,
            state,
            pool_id: model.pool_id,
            user_id: model.user_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
