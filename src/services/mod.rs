//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain rules and infrastructure through the Unit of Work. Anything
//! that moves credits or hours goes through `ledger` inside a transaction.

mod auth_service;
mod company_service;
pub mod container;
mod credit_service;
mod hour_service;
pub mod ledger;
pub mod notifier;
mod plan_service;
mod request_service;
mod user_service;

#[cfg(test)]
pub(crate) mod testing;

// Service Container
pub use container::{parallel, ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{AuthService, Authenticator, Claims, Registration, Session};
pub use company_service::{CompanyManager, CompanyService};
pub use credit_service::{CreditManager, CreditPurchaseReceipt, CreditService};
pub use hour_service::{HourManager, HourService};
pub use notifier::{JobQueueNotifier, LogNotifier, Notification, Notifications, Notifier};
pub use plan_service::{PlanAssignment, PlanManager, PlanService};
pub use request_service::{
    ConsultationManager, ConsultationService, SearchManager, SearchService,
};
pub use user_service::{UserManager, UserProfile, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
#[cfg(any(test, feature = "test-utils"))]
pub use notifier::MockNotifier;
