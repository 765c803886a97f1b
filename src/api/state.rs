//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Cache, Database};
use crate::services::{
    AuthService, CompanyService, ConsultationService, CreditService, HourService, Notifier,
    PlanService, SearchService, ServiceContainer, Services, UserService,
};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub plan_service: Arc<dyn PlanService>,
    pub credit_service: Arc<dyn CreditService>,
    pub hour_service: Arc<dyn HourService>,
    pub search_service: Arc<dyn SearchService>,
    pub consultation_service: Arc<dyn ConsultationService>,
    pub company_service: Arc<dyn CompanyService>,
    /// Redis cache
    pub cache: Arc<Cache>,
    /// Database connection
    pub database: Arc<Database>,
    /// Cookie flags and CORS origin come from here
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire every service over the database connection.
    pub fn from_config(
        database: Arc<Database>,
        cache: Arc<Cache>,
        config: Config,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let container = Services::from_connection(
            database.get_connection(),
            config.clone(),
            notifier,
        );
        Self::from_container(&container, database, cache, config)
    }

    /// Build the state from any service container (tests inject mocks this way).
    pub fn from_container(
        container: &dyn ServiceContainer,
        database: Arc<Database>,
        cache: Arc<Cache>,
        config: Config,
    ) -> Self {
        Self {
            auth_service: container.auth(),
            user_service: container.users(),
            plan_service: container.plans(),
            credit_service: container.credits(),
            hour_service: container.hours(),
            search_service: container.searches(),
            consultation_service: container.consultations(),
            company_service: container.companies(),
            cache,
            database,
            config: Arc::new(config),
        }
    }
}
