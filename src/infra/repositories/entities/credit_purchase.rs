//! Credit purchase database entity.

use sea_orm::entity::prelude::*;

use crate::domain::CreditPurchase;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "credit_purchases")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub payment_method: String,
    pub cost: f64,
    pub notes: Option<String>,
    pub bucket_id: i32,
    pub purchased_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for CreditPurchase {
    fn from(model: Model) -> Self {
        CreditPurchase {
            id: model.id,
            payment_method: model.payment_method,
            cost: model.cost,
            notes: model.notes,
            bucket_id: model.bucket_id,
            purchased_at: model.purchased_at,
        }
    }
}
