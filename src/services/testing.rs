//! Test doubles shared by the service unit tests.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::repositories::{
    CompanyRepository, ConsultationRepository, CreditPurchaseRepository, CreditRepository,
    HourPoolRepository, MockCompanyRepository, MockConsultationRepository,
    MockCreditPurchaseRepository, MockCreditRepository, MockHourPoolRepository,
    MockPasswordResetRepository, MockPlanPurchaseRepository, MockPlanRepository,
    MockSearchRepository, MockUserRepository, PasswordResetRepository, PlanPurchaseRepository,
    PlanRepository, SearchRepository, UserRepository,
};
use crate::infra::{TransactionContext, TxFuture, UnitOfWork};
use crate::services::notifier::{MockNotifier, Notifications};

/// Unit of Work over mock repositories. Any repository left at its default panics when
/// called; transactions always fail since they need a real database.
pub(crate) struct TestUnitOfWork {
    users: Arc<MockUserRepository>,
    plans: Arc<MockPlanRepository>,
    plan_purchases: Arc<MockPlanPurchaseRepository>,
    credits: Arc<MockCreditRepository>,
    credit_purchases: Arc<MockCreditPurchaseRepository>,
    hour_pools: Arc<MockHourPoolRepository>,
    searches: Arc<MockSearchRepository>,
    consultations: Arc<MockConsultationRepository>,
    companies: Arc<MockCompanyRepository>,
    password_resets: Arc<MockPasswordResetRepository>,
}

impl Default for TestUnitOfWork {
    fn default() -> Self {
        Self {
            users: Arc::new(MockUserRepository::new()),
            plans: Arc::new(MockPlanRepository::new()),
            plan_purchases: Arc::new(MockPlanPurchaseRepository::new()),
            credits: Arc::new(MockCreditRepository::new()),
            credit_purchases: Arc::new(MockCreditPurchaseRepository::new()),
            hour_pools: Arc::new(MockHourPoolRepository::new()),
            searches: Arc::new(MockSearchRepository::new()),
            consultations: Arc::new(MockConsultationRepository::new()),
            companies: Arc::new(MockCompanyRepository::new()),
            password_resets: Arc::new(MockPasswordResetRepository::new()),
        }
    }
}

impl TestUnitOfWork {
    pub fn with_users(mut self, repo: MockUserRepository) -> Self {
        self.users = Arc::new(repo);
        self
    }

    pub fn with_plans(mut self, repo: MockPlanRepository) -> Self {
        self.plans = Arc::new(repo);
        self
    }

    pub fn with_plan_purchases(mut self, repo: MockPlanPurchaseRepository) -> Self {
        self.plan_purchases = Arc::new(repo);
        self
    }

    pub fn with_credits(mut self, repo: MockCreditRepository) -> Self {
        self.credits = Arc::new(repo);
        self
    }

    pub fn with_hour_pools(mut self, repo: MockHourPoolRepository) -> Self {
        self.hour_pools = Arc::new(repo);
        self
    }

    pub fn with_searches(mut self, repo: MockSearchRepository) -> Self {
        self.searches = Arc::new(repo);
        self
    }

    pub fn with_companies(mut self, repo: MockCompanyRepository) -> Self {
        self.companies = Arc::new(repo);
        self
    }

    pub fn with_password_resets(mut self, repo: MockPasswordResetRepository) -> Self {
        self.password_resets = Arc::new(repo);
        self
    }
}

#[async_trait]
impl UnitOfWork for TestUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn plans(&self) -> Arc<dyn PlanRepository> {
        self.plans.clone()
    }

    fn plan_purchases(&self) -> Arc<dyn PlanPurchaseRepository> {
        self.plan_purchases.clone()
    }

    fn credits(&self) -> Arc<dyn CreditRepository> {
        self.credits.clone()
    }

    fn credit_purchases(&self) -> Arc<dyn CreditPurchaseRepository> {
        self.credit_purchases.clone()
    }

    fn hour_pools(&self) -> Arc<dyn HourPoolRepository> {
        self.hour_pools.clone()
    }

    fn searches(&self) -> Arc<dyn SearchRepository> {
        self.searches.clone()
    }

    fn consultations(&self) -> Arc<dyn ConsultationRepository> {
        self.consultations.clone()
    }

    fn companies(&self) -> Arc<dyn CompanyRepository> {
        self.companies.clone()
    }

    fn password_resets(&self) -> Arc<dyn PasswordResetRepository> {
        self.password_resets.clone()
    }

    async fn transaction<F, T>(&self, _f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        Err(AppError::internal("Transactions are not supported in unit tests"))
    }
}

pub(crate) fn test_config() -> Config {
    Config::with_secret("test-secret-key-that-is-at-least-32-bytes")
}

/// Notifications that accept anything and go nowhere.
pub(crate) fn quiet_notifications() -> Notifications {
    let mut notifier = MockNotifier::new();
    notifier.expect_deliver().returning(|_| Ok(()));
    Notifications::new(Arc::new(notifier), &test_config())
}
