//! Repository layer - Data access abstraction
//!
//! Each repository is a trait (mockable in tests) plus a `*Store` backed by SeaORM.

pub(crate) mod entities;
mod query;

mod company_repository;
mod credit_repository;
mod hour_pool_repository;
mod password_reset_repository;
mod plan_repository;
mod usage_repository;
mod user_repository;

pub use company_repository::{CompanyRepository, CompanyStore};
pub use credit_repository::{
    CreditPurchaseRepository, CreditPurchaseStore, CreditRepository, CreditStore,
};
pub use hour_pool_repository::{HourPoolRepository, HourPoolStore};
pub use password_reset_repository::{PasswordResetRepository, PasswordResetStore};
pub use plan_repository::{PlanPurchaseRepository, PlanPurchaseStore, PlanRepository, PlanStore};
pub use usage_repository::{
    ConsultationRepository, ConsultationStore, SearchRepository, SearchStore,
};
pub use user_repository::{UserRepository, UserStore};

// Mocks for unit tests and the `test-utils` feature
#[cfg(any(test, feature = "test-utils"))]
pub use company_repository::MockCompanyRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use credit_repository::{MockCreditPurchaseRepository, MockCreditRepository};
#[cfg(any(test, feature = "test-utils"))]
pub use hour_pool_repository::MockHourPoolRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use password_reset_repository::MockPasswordResetRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use plan_repository::{MockPlanPurchaseRepository, MockPlanRepository};
#[cfg(any(test, feature = "test-utils"))]
pub use usage_repository::{MockConsultationRepository, MockSearchRepository};
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
