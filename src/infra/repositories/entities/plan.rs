//! Plan database entity.

use sea_orm::entity::prelude::*;

use crate::domain::Plan;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "plans")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub monthly_credits: i32,
    pub credit_months: i32,
    pub consulting_hours: i32,
    pub price: f64,
    pub custom: bool,
    pub active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Plan {
    fn from(model: Model) -> Self {
        Plan {
            id: model.id,
            name: model.name,
            monthly_credits: model.monthly_credits,
            credit_months: model.credit_months,
            consulting_hours: model.consulting_hours,
            price: model.price,
            custom: model.custom,
            active: model.active,
        }
    }
}
