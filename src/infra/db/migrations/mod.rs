//! Database migrations.
//!
//! Migration names follow the pattern: m{YYYYMMDD}_{NNNNNN}_{description}

use sea_orm_migration::prelude::*;

mod m20240101_000001_create_accounts;
mod m20240101_000002_create_ledger;
mod m20240101_000003_create_usage;
mod m20240101_000004_create_companies_and_resets;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_accounts::Migration),
            Box::new(m20240101_000002_create_ledger::Migration),
            Box::new(m20240101_000003_create_usage::Migration),
            Box::new(m20240101_000004_create_companies_and_resets::Migration),
        ]
    }
}
