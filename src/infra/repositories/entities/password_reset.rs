//! Password reset token database entity.

use sea_orm::entity::prelude::*;

use crate::domain::PasswordReset;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "password_resets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub token: String,
    pub email: String,
    pub expires_at: DateTimeUtc,
    pub user_id: i32,
    pub used: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for PasswordReset {
    fn from(model: Model) -> Self {
        PasswordReset {
            id: model.id,
            token: model.token,
            email: model.email,
            expires_at: model.expires_at,
            user_id: model.user_id,
            used: model.used,
        }
    }
}
