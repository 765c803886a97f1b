//! Background jobs processed by the `jobs work` worker.

mod email_job;

use apalis_sql::postgres::PostgresStorage;
use apalis_sql::sqlx::postgres::PgPoolOptions;

use crate::config::Config;
use crate::errors::{AppError, AppResult};

pub use email_job::{email_job_handler, EmailJob};

/// Open the Postgres-backed email queue, creating its tables if needed.
pub async fn email_storage(config: &Config) -> AppResult<PostgresStorage<EmailJob>> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .map_err(|e| AppError::internal(format!("Failed to connect job storage: {}", e)))?;

    PostgresStorage::setup(&pool)
        .await
        .map_err(|e| AppError::internal(format!("Failed to setup job storage: {}", e)))?;

    Ok(PostgresStorage::new(pool))
}
