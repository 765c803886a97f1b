//! Plan purchase database entity.

use sea_orm::entity::prelude::*;

use crate::domain::PlanPurchase;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "plan_purchases")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub payment_method: String,
    pub notes: Option<String>,
    pub amount_paid: f64,
    pub plan_id: i32,
    pub user_id: i32,
    pub purchased_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for PlanPurchase {
    fn from(model: Model) -> Self {
        PlanPurchase {
            id: model.id,
            payment_method: model.payment_method,
            notes: model.notes,
            amount_paid: model.amount_paid,
            plan_id: model.plan_id,
            user_id: model.user_id,
            purchased_at: model.purchased_at,
        }
    }
}
