//! Service Container - Centralized service access.
//!
//! Builds every service over one shared Unit of Work and notification channel, and
//! provides small helpers for running independent lookups concurrently.

use std::future::Future;
use std::sync::Arc;

use super::{
    Authenticator, AuthService, CompanyManager, CompanyService, ConsultationManager,
    ConsultationService, CreditManager, CreditService, HourManager, HourService, Notifications,
    Notifier, PlanManager, PlanService, SearchManager, SearchService, UserManager, UserService,
};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::Persistence;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;
    fn users(&self) -> Arc<dyn UserService>;
    fn plans(&self) -> Arc<dyn PlanService>;
    fn credits(&self) -> Arc<dyn CreditService>;
    fn hours(&self) -> Arc<dyn HourService>;
    fn searches(&self) -> Arc<dyn SearchService>;
    fn consultations(&self) -> Arc<dyn ConsultationService>;
    fn companies(&self) -> Arc<dyn CompanyService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth: Arc<dyn AuthService>,
    users: Arc<dyn UserService>,
    plans: Arc<dyn PlanService>,
    credits: Arc<dyn CreditService>,
    hours: Arc<dyn HourService>,
    searches: Arc<dyn SearchService>,
    consultations: Arc<dyn ConsultationService>,
    companies: Arc<dyn CompanyService>,
}

impl Services {
    /// Wire every service over a database connection.
    pub fn from_connection(
        db: sea_orm::DatabaseConnection,
        config: Config,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let uow = Arc::new(Persistence::new(db));
        let notifications = Notifications::new(notifier, &config);

        Self {
            auth: Arc::new(Authenticator::new(
                uow.clone(),
                config,
                notifications.clone(),
            )),
            users: Arc::new(UserManager::new(uow.clone())),
            plans: Arc::new(PlanManager::new(uow.clone())),
            credits: Arc::new(CreditManager::new(uow.clone())),
            hours: Arc::new(HourManager::new(uow.clone())),
            searches: Arc::new(SearchManager::new(uow.clone(), notifications.clone())),
            consultations: Arc::new(ConsultationManager::new(uow.clone(), notifications)),
            companies: Arc::new(CompanyManager::new(uow)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.users.clone()
    }

    fn plans(&self) -> Arc<dyn PlanService> {
        self.plans.clone()
    }

    fn credits(&self) -> Arc<dyn CreditService> {
        self.credits.clone()
    }

    fn hours(&self) -> Arc<dyn HourService> {
        self.hours.clone()
    }

    fn searches(&self) -> Arc<dyn SearchService> {
        self.searches.clone()
    }

    fn consultations(&self) -> Arc<dyn ConsultationService> {
        self.consultations.clone()
    }

    fn companies(&self) -> Arc<dyn CompanyService> {
        self.companies.clone()
    }
}

/// Run independent lookups concurrently; the first error wins.
pub mod parallel {
    use super::*;
    use tokio::try_join;

    pub async fn join4<F1, F2, F3, F4, T1, T2, T3, T4>(
        f1: F1,
        f2: F2,
        f3: F3,
        f4: F4,
    ) -> AppResult<(T1, T2, T3, T4)>
    where
        F1: Future<Output = AppResult<T1>>,
        F2: Future<Output = AppResult<T2>>,
        F3: Future<Output = AppResult<T3>>,
        F4: Future<Output = AppResult<T4>>,
    {
        try_join!(f1, f2, f3, f4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;

    #[tokio::test]
    async fn join4_collects_all_results() {
        let (a, b, c, d) = parallel::join4(
            async { Ok::<_, AppError>(1) },
            async { Ok("two") },
            async { Ok(3.0) },
            async { Ok(Some(4)) },
        )
        .await
        .unwrap();

        assert_eq!((a, b, c, d), (1, "two", 3.0, Some(4)));
    }
}
