//! Email background job.
//!
//! Notifications are queued as [`EmailJob`]s and drained by the `jobs work` command.
//! Delivery is not wired to a mail transport; the worker records every message in the log.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Email job payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailJob {
    /// Recipient email address
    pub to: String,
    pub subject: String,
    /// Plain-text body
    pub body: String,
    /// Sender; falls back to EMAIL_FROM when absent
    #[serde(default)]
    pub from: Option<String>,
}

impl EmailJob {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            from: None,
        }
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }
}

/// Email job handler
pub async fn email_job_handler(job: EmailJob) -> Result<(), AppError> {
    if job.to.trim().is_empty() {
        return Err(AppError::validation("Email job has no recipient"));
    }

    tracing::info!(
        to = %job.to,
        from = job.from.as_deref().unwrap_or("-"),
        subject = %job.subject,
        "Email processed"
    );
    tracing::debug!(body = %job.body, "Email body");

    Ok(())
}
