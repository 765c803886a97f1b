//! Jobs command - Email queue management.
//!
//! - `work`: drain the email queue
//! - `list`: counts per job status
//! - `clear`: remove failed jobs
//!
//! ```bash
//! uplin-api jobs work
//! uplin-api jobs list
//! ```

use apalis::prelude::*;
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

use crate::cli::args::{JobsAction, JobsArgs};
use crate::config::{Config, JOB_WORKER_EMAIL};
use crate::errors::{AppError, AppResult};
use crate::infra::Database;
use crate::jobs::{email_job_handler, email_storage};

/// Execute the jobs command
pub async fn execute(args: JobsArgs, config: Config) -> AppResult<()> {
    match args.action {
        JobsAction::Work => run_worker(&config).await,
        JobsAction::List => list_jobs(&config).await,
        JobsAction::Clear => clear_failed_jobs(&config).await,
    }
}

/// Consume email jobs until Ctrl+C.
async fn run_worker(config: &Config) -> AppResult<()> {
    tracing::info!("Connecting to job storage...");
    let storage = email_storage(config).await?;

    let worker = WorkerBuilder::new(JOB_WORKER_EMAIL)
        .backend(storage)
        .build_fn(email_job_handler);

    tracing::info!(worker = JOB_WORKER_EMAIL, "Job worker started. Press Ctrl+C to stop.");

    let monitor = Monitor::new().register(worker);

    tokio::select! {
        result = monitor.run() => {
            if let Err(e) = result {
                tracing::error!("Worker error: {}", e);
                return Err(AppError::internal(format!("Worker failed: {}", e)));
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping worker...");
        }
    }

    tracing::info!("Job worker stopped.");
    Ok(())
}

/// Job counts by status; `Pending`, `Running`, `Failed`, `Done`.
#[derive(Debug, Default, PartialEq, Eq)]
struct QueueCounts {
    pending: i64,
    running: i64,
    failed: i64,
    done: i64,
}

impl QueueCounts {
    fn record(&mut self, status: &str, count: i64) {
        match status {
            "Pending" => self.pending = count,
            "Running" => self.running = count,
            "Failed" => self.failed = count,
            "Done" => self.done = count,
            other => tracing::debug!(status = other, count, "Ignoring job status"),
        }
    }
}

async fn queue_initialized(db: &Database) -> AppResult<bool> {
    let row = db
        .connection()
        .query_one(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT EXISTS(SELECT 1 FROM information_schema.schemata WHERE schema_name = 'apalis') as exists",
        ))
        .await?;

    Ok(row
        .and_then(|r| r.try_get::<bool>("", "exists").ok())
        .unwrap_or(false))
}

async fn list_jobs(config: &Config) -> AppResult<()> {
    let db = Database::connect_without_migrations(config).await?;

    if !queue_initialized(&db).await? {
        println!("Job queue not initialized. Run 'jobs work' or 'serve' first.");
        return Ok(());
    }

    let rows = db
        .connection()
        .query_all(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT status::text as status, COUNT(*)::bigint as count FROM apalis.jobs GROUP BY status",
        ))
        .await?;

    let mut counts = QueueCounts::default();
    for row in rows {
        if let (Ok(status), Ok(count)) = (
            row.try_get::<String>("", "status"),
            row.try_get::<i64>("", "count"),
        ) {
            counts.record(&status, count);
        }
    }

    println!("\n=== Email Queue ===");
    println!("Pending:  {}", counts.pending);
    println!("Running:  {}", counts.running);
    println!("Failed:   {}", counts.failed);
    println!("Done:     {}", counts.done);
    println!("===================\n");

    Ok(())
}

async fn clear_failed_jobs(config: &Config) -> AppResult<()> {
    let db = Database::connect_without_migrations(config).await?;

    if !queue_initialized(&db).await? {
        println!("Job queue not initialized. Nothing to clear.");
        return Ok(());
    }

    let result = db
        .connection()
        .execute(Statement::from_string(
            DatabaseBackend::Postgres,
            "DELETE FROM apalis.jobs WHERE status = 'Failed'",
        ))
        .await?;

    tracing::info!(cleared = result.rows_affected(), "Failed jobs cleared");
    println!("Cleared {} failed job(s) from the queue.", result.rows_affected());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_track_known_statuses_only() {
        let mut counts = QueueCounts::default();
        counts.record("Pending", 3);
        counts.record("Failed", 1);
        counts.record("Killed", 9);

        assert_eq!(
            counts,
            QueueCounts {
                pending: 3,
                running: 0,
                failed: 1,
                done: 0,
            }
        );
    }
}
