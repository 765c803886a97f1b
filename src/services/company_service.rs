//! Client companies linked to user accounts.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{Company, CompanyPatch, CreateCompany};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

#[async_trait]
pub trait CompanyService: Send + Sync {
    /// Company linked to the caller
    async fn own(&self, user_id: i32) -> AppResult<Company>;

    /// Edit the caller's company. The link itself cannot change here.
    async fn update_own(&self, user_id: i32, patch: CompanyPatch) -> AppResult<Company>;

    /// List companies, one page at a time
    async fn list(&self, params: PaginationParams) -> AppResult<Paginated<Company>>;

    /// Get company by ID
    async fn get(&self, id: i32) -> AppResult<Company>;

    /// Create a company, optionally linked to a user
    ///
    /// # Errors
    /// Returns `Conflict` for a duplicate CUIT and `NotFound` for an unknown user.
    async fn create(&self, input: CreateCompany) -> AppResult<Company>;

    /// Administrative edit
    async fn update(&self, id: i32, patch: CompanyPatch) -> AppResult<Company>;

    /// Enable or disable a company
    async fn set_active(&self, id: i32, active: bool) -> AppResult<Company>;

    /// Detach the company from its user.
    async fn unlink(&self, id: i32) -> AppResult<Company>;
}

pub struct CompanyManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CompanyManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> CompanyService for CompanyManager<U> {
    async fn own(&self, user_id: i32) -> AppResult<Company> {
        self.uow
            .companies()
            .find_by_user(user_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn update_own(&self, user_id: i32, patch: CompanyPatch) -> AppResult<Company> {
        let company = self.own(user_id).await?;
        self.update(company.id, patch).await
    }

    async fn list(&self, params: PaginationParams) -> AppResult<Paginated<Company>> {
        let (companies, total) = self.uow.companies().list(params).await?;
        Ok(Paginated::new(companies, &params, total))
    }

    async fn get(&self, id: i32) -> AppResult<Company> {
        self.uow
            .companies()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn create(&self, input: CreateCompany) -> AppResult<Company> {
        if let Some(user_id) = input.user_id {
            self.uow
                .users()
                .find_by_id(user_id)
                .await?
                .ok_or(AppError::NotFound)?;
        }

        let company = self.uow.companies().create(input).await?;
        tracing::info!(company_id = company.id, cuit = %company.cuit, "Company created");
        Ok(company)
    }

    async fn update(&self, id: i32, patch: CompanyPatch) -> AppResult<Company> {
        if patch.is_empty() {
            return Err(AppError::validation("No fields to update"));
        }
        self.uow.companies().update(id, patch).await
    }

    async fn set_active(&self, id: i32, active: bool) -> AppResult<Company> {
        let company = self.uow.companies().set_active(id, active).await?;
        tracing::info!(company_id = id, active, "Company status changed");
        Ok(company)
    }

    async fn unlink(&self, id: i32) -> AppResult<Company> {
        let company = self.uow.companies().unlink(id).await?;
        tracing::info!(company_id = id, "Company unlinked from its user");
        Ok(company)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::repositories::{MockCompanyRepository, MockUserRepository};
    use crate::services::testing::TestUnitOfWork;

    fn company(id: i32, user_id: Option<i32>) -> Company {
        Company {
            id,
            name: "Acme SA".into(),
            email: "admin@acme.com".into(),
            trade_name: None,
            cuit: "30-12345678-9".into(),
            vat_condition: None,
            company_type: None,
            main_activity: None,
            street_address: None,
            city: None,
            province: None,
            postal_code: None,
            user_id,
            active: true,
        }
    }

    #[tokio::test]
    async fn update_own_targets_the_linked_company() {
        let mut companies = MockCompanyRepository::new();
        companies
            .expect_find_by_user()
            .returning(|user_id| Ok(Some(company(12, Some(user_id)))));
        companies
            .expect_update()
            .withf(|id, patch| *id == 12 && patch.city.as_deref() == Some("Rosario"))
            .times(1)
            .returning(|id, patch| {
                let mut c = company(id, Some(3));
                c.city = patch.city;
                Ok(c)
            });

        let service = CompanyManager::new(Arc::new(TestUnitOfWork::default().with_companies(companies)));
        let updated = service
            .update_own(
                3,
                CompanyPatch {
                    city: Some("Rosario".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.city.as_deref(), Some("Rosario"));
    }

    #[tokio::test]
    async fn create_requires_existing_user() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));

        let service = CompanyManager::new(Arc::new(TestUnitOfWork::default().with_users(users)));
        let result = service
            .create(CreateCompany {
                name: "Acme SA".into(),
                email: "admin@acme.com".into(),
                trade_name: None,
                cuit: "30-12345678-9".into(),
                vat_condition: None,
                company_type: None,
                main_activity: None,
                street_address: None,
                city: None,
                province: None,
                postal_code: None,
                user_id: Some(40),
            })
            .await;

        assert!(matches!(result, Err(AppError::NotFound)));
    }
}
