//! Hour pool database entity.

use sea_orm::entity::prelude::*;

use crate::domain::HourPool;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "hour_pools")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub total_hours: i32,
    pub remaining_hours: i32,
    pub expires_at: DateTimeUtc,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for HourPool {
    fn from(model: Model) -> Self {
        HourPool {
            id: model.id,
            user_id: model.user_id,
            total_hours: model.total_hours,
            remaining_hours: model.remaining_hours,
            expires_at: model.expires_at,
            created_at: model.created_at,
        }
    }
}
