//! Company persistence.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use super::entities::company::{self, ActiveModel, Entity as CompanyEntity};
use super::query::{conflict_on_unique, fetch_page};
use crate::domain::{Company, CompanyPatch, CreateCompany};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CompanyRepository: Send + Sync {
    /// Find company by ID
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Company>>;

    /// Company linked to the user, if any.
    async fn find_by_user(&self, user_id: i32) -> AppResult<Option<Company>>;

    /// List one page of companies with the total count
    async fn list(&self, params: PaginationParams) -> AppResult<(Vec<Company>, u64)>;

    /// Insert an active company. A duplicate CUIT is a conflict.
    async fn create(&self, input: CreateCompany) -> AppResult<Company>;

    /// Apply a patch. A CUIT taken by another company is a conflict.
    async fn update(&self, id: i32, patch: CompanyPatch) -> AppResult<Company>;

    async fn set_active(&self, id: i32, active: bool) -> AppResult<Company>;

    /// Detach the company from its user.
    async fn unlink(&self, id: i32) -> AppResult<Company>;
}

pub struct CompanyStore {
    db: DatabaseConnection,
}

impl CompanyStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: i32) -> AppResult<company::Model> {
        CompanyEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }
}

#[async_trait]
impl CompanyRepository for CompanyStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Company>> {
        Ok(CompanyEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Company::from))
    }

    async fn find_by_user(&self, user_id: i32) -> AppResult<Option<Company>> {
        Ok(CompanyEntity::find()
            .filter(company::Column::UserId.eq(user_id))
            .order_by_desc(company::Column::Id)
            .one(&self.db)
            .await?
            .map(Company::from))
    }

    async fn list(&self, params: PaginationParams) -> AppResult<(Vec<Company>, u64)> {
        let select = CompanyEntity::find().order_by_asc(company::Column::Id);
        let (models, total) = fetch_page(select, &self.db, &params).await?;
        Ok((models.into_iter().map(Company::from).collect(), total))
    }

    async fn create(&self, input: CreateCompany) -> AppResult<Company> {
        let model = ActiveModel {
            name: Set(input.name),
            email: Set(input.email),
            trade_name: Set(input.trade_name),
            cuit: Set(input.cuit),
            vat_condition: Set(input.vat_condition),
            company_type: Set(input.company_type),
            main_activity: Set(input.main_activity),
            street_address: Set(input.street_address),
            city: Set(input.city),
            province: Set(input.province),
            postal_code: Set(input.postal_code),
            user_id: Set(input.user_id),
            active: Set(true),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(conflict_on_unique("Company"))?;

        Ok(Company::from(model))
    }

    async fn update(&self, id: i32, patch: CompanyPatch) -> AppResult<Company> {
        let mut active: ActiveModel = self.find_model(id).await?.into();

        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(email) = patch.email {
            active.email = Set(email);
        }
        if let Some(cuit) = patch.cuit {
            active.cuit = Set(cuit);
        }
        // Optional text columns
        for (value, column) in [
            (patch.trade_name, &mut active.trade_name),
            (patch.vat_condition, &mut active.vat_condition),
            (patch.company_type, &mut active.company_type),
            (patch.main_activity, &mut active.main_activity),
            (patch.street_address, &mut active.street_address),
            (patch.city, &mut active.city),
            (patch.province, &mut active.province),
            (patch.postal_code, &mut active.postal_code),
        ] {
            if let Some(value) = value {
                *column = Set(Some(value));
            }
        }

        let model = active
            .update(&self.db)
            .await
            .map_err(conflict_on_unique("Company"))?;
        Ok(Company::from(model))
    }

    async fn set_active(&self, id: i32, is_active: bool) -> AppResult<Company> {
        let mut active: ActiveModel = self.find_model(id).await?.into();
        active.active = Set(is_active);
        Ok(Company::from(active.update(&self.db).await?))
    }

    async fn unlink(&self, id: i32) -> AppResult<Company> {
        let mut active: ActiveModel = self.find_model(id).await?.into();
        active.user_id = Set(None);
        Ok(Company::from(active.update(&self.db).await?))
    }
}
