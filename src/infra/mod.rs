//! Infrastructure layer - External systems integration
//!
//! - PostgreSQL through SeaORM: connection, migrations, repositories
//! - Unit of Work for transactions, including the row-locked ledger store
//! - Redis for rate limiting

pub mod cache;
pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use cache::Cache;
pub use db::{Database, Migrator};
pub use repositories::{
    CompanyRepository, ConsultationRepository, CreditPurchaseRepository, CreditRepository,
    HourPoolRepository, PasswordResetRepository, PlanPurchaseRepository, PlanRepository,
    SearchRepository, UserRepository,
};
pub use unit_of_work::{
    Persistence, TransactionContext, TxFuture, TxLedger, TxPasswordResets, TxPurchases, TxUsers,
    UnitOfWork,
};
