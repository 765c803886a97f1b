//! Outgoing notifications.
//!
//! Services describe what happened with a [`Notification`]; [`Notifications`] turns it into
//! an email and hands it to a [`Notifier`] on a detached task. A failed delivery is logged
//! and never reaches the caller.

use std::sync::Arc;

use apalis::prelude::Storage;
use apalis_sql::postgres::PostgresStorage;
use async_trait::async_trait;

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::jobs::EmailJob;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Delivery channel for composed emails.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, email: EmailJob) -> AppResult<()>;
}

/// Queues emails on the apalis Postgres storage for the job worker.
pub struct JobQueueNotifier {
    storage: PostgresStorage<EmailJob>,
}

impl JobQueueNotifier {
    pub fn new(storage: PostgresStorage<EmailJob>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl Notifier for JobQueueNotifier {
    async fn deliver(&self, email: EmailJob) -> AppResult<()> {
        let mut storage = self.storage.clone();
        storage
            .push(email)
            .await
            .map_err(|e| AppError::internal(format!("Failed to enqueue email: {}", e)))?;
        Ok(())
    }
}

/// Writes emails to the log. Used when the job queue is unavailable.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, email: EmailJob) -> AppResult<()> {
        tracing::info!(to = %email.to, subject = %email.subject, "Email not queued, logged only");
        Ok(())
    }
}

/// Events worth telling someone about.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    UserRegistered {
        name: String,
        email: String,
    },
    PasswordResetRequested {
        name: String,
        email: String,
        link: String,
    },
    SearchCreated {
        search_id: i32,
        user_id: i32,
        info: String,
    },
    SearchFinalized {
        search_id: i32,
        user_id: i32,
        credits_used: i32,
    },
    ConsultationCreated {
        consultation_id: i32,
        user_id: i32,
        hours: i32,
    },
    ConsultationFinalized {
        consultation_id: i32,
        user_id: i32,
    },
}

impl Notification {
    /// Compose the email. Everything but password resets goes to the operator inbox.
    pub fn to_email(&self, operator_inbox: &str) -> EmailJob {
        match self {
            Notification::UserRegistered { name, email } => EmailJob::new(
                operator_inbox,
                "Nuevo usuario registrado",
                format!("{} ({}) created an account.", name, email),
            ),
            Notification::PasswordResetRequested { name, email, link } => EmailJob::new(
                email.as_str(),
                "Restablecer contraseña",
                format!(
                    "Hello {},\n\nUse this link to choose a new password. It expires in one hour.\n\n{}\n\nIf you did not ask for this, ignore this message.",
                    name, link
                ),
            ),
            Notification::SearchCreated {
                search_id,
                user_id,
                info,
            } => EmailJob::new(
                operator_inbox,
                format!("Nueva búsqueda #{}", search_id),
                format!("User {} opened search #{}:\n\n{}", user_id, search_id, info),
            ),
            Notification::SearchFinalized {
                search_id,
                user_id,
                credits_used,
            } => EmailJob::new(
                operator_inbox,
                format!("Búsqueda #{} finalizada", search_id),
                format!(
                    "Search #{} of user {} was finalized using {} credits.",
                    search_id, user_id, credits_used
                ),
            ),
            Notification::ConsultationCreated {
                consultation_id,
                user_id,
                hours,
            } => EmailJob::new(
                operator_inbox,
                format!("Nueva consulta #{}", consultation_id),
                format!(
                    "User {} requested consultation #{} for {} hours.",
                    user_id, consultation_id, hours
                ),
            ),
            Notification::ConsultationFinalized {
                consultation_id,
                user_id,
            } => EmailJob::new(
                operator_inbox,
                format!("Consulta #{} finalizada", consultation_id),
                format!("Consultation #{} of user {} was finalized.", consultation_id, user_id),
            ),
        }
    }
}

/// Fire-and-forget front for a [`Notifier`].
#[derive(Clone)]
pub struct Notifications {
    notifier: Arc<dyn Notifier>,
    sender: String,
    operator_inbox: String,
}

impl Notifications {
    pub fn new(notifier: Arc<dyn Notifier>, config: &Config) -> Self {
        Self {
            notifier,
            sender: config.email_from.clone(),
            operator_inbox: config.notify_email.clone(),
        }
    }

    /// Deliver in the background; the outcome is only logged.
    pub fn emit(&self, notification: Notification) {
        let email = notification
            .to_email(&self.operator_inbox)
            .with_from(self.sender.as_str());
        let notifier = self.notifier.clone();

        tokio::spawn(async move {
            if let Err(e) = notifier.deliver(email).await {
                tracing::warn!(error = %e, ?notification, "Notification failed");
            }
        });
    }
}
