//! Company database entity.

use sea_orm::entity::prelude::*;

use crate::domain::Company;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "companies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub email: String,
    pub trade_name: Option<String>,
    #[sea_orm(unique)]
    pub cuit: String,
    pub vat_condition: Option<String>,
    pub company_type: Option<String>,
    pub main_activity: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub postal_code: Option<String>,
    pub user_id: Option<i32>,
    pub active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Company {
    fn from(model: Model) -> Self {
        Company {
            id: model.id,
            name: model.name,
            email: model.email,
            trade_name: model.trade_name,
            cuit: model.cuit,
            vat_condition: model.vat_condition,
            company_type: model.company_type,
            main_activity: model.main_activity,
            street_address: model.street_address,
            city: model.city,
            province: model.province,
            postal_code: model.postal_code,
            user_id: model.user_id,
            active: model.active,
        }
    }
}
