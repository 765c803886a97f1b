//! Usage requests: searches paid with credits and consultations paid with hours.
//!
//! Both share the same lifecycle:
//!
//! ```text
//! Pendiente --finalize--> Finalizado --delete--> Eliminado
//!     |                                              ^
//!     +-------------------delete---------------------+
//! ```
//!
//! `Eliminado` is terminal and a `Finalizado` request can no longer be edited.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::config::{STATE_ELIMINATED, STATE_FINALIZED, STATE_PENDING};
use crate::errors::{AppError, AppResult};

/// Lifecycle state of a usage request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum RequestState {
    #[serde(rename = "Pendiente")]
    Pending,
    #[serde(rename = "Finalizado")]
    Finalized,
    #[serde(rename = "Eliminado")]
    Eliminated,
}

impl RequestState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestState::Pending => STATE_PENDING,
            RequestState::Finalized => STATE_FINALIZED,
            RequestState::Eliminated => STATE_ELIMINATED,
        }
    }

    /// Field edits and finalization are only allowed while pending.
    pub fn ensure_editable(&self) -> AppResult<()> {
        match self {
            RequestState::Pending => Ok(()),
            RequestState::Finalized => Err(AppError::invalid_transition(
                "A finalized request cannot be edited; delete it and create a new one",
            )),
            RequestState::Eliminated => Err(AppError::invalid_transition(
                "The request was eliminated and cannot change anymore",
            )),
        }
    }

    pub fn ensure_deletable(&self) -> AppResult<()> {
        match self {
            RequestState::Eliminated => Err(AppError::invalid_transition(
                "The request was already eliminated",
            )),
            _ => Ok(()),
        }
    }
}

impl std::str::FromStr for RequestState {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        match s {
            STATE_PENDING => Ok(RequestState::Pending),
            STATE_FINALIZED => Ok(RequestState::Finalized),
            STATE_ELIMINATED => Ok(RequestState::Eliminated),
            other => Err(AppError::validation(format!("Unknown request state '{}'", other))),
        }
    }
}

impl std::fmt::Display for RequestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Search request paid with credits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Search {
    #[schema(example = 7)]
    pub id: i32,
    #[schema(example = "Senior backend developer, Rust, remote")]
    pub info: String,
    /// Set when the search is finalized
    pub credits_used: Option<i32>,
    pub notes: Option<String>,
    pub state: RequestState,
    /// Bucket the search was opened against; cleared if that bucket is deleted
    pub bucket_id: Option<i32>,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Search {
    /// Credits to give back when this search is deleted.
    pub fn refundable_credits(&self) -> Option<i32> {
        match (self.state, self.credits_used) {
            (RequestState::Finalized, Some(used)) if used > 0 => Some(used),
            _ => None,
        }
    }
}

/// Data needed to insert a search
#[derive(Debug, Clone, PartialEq)]
pub struct NewSearch {
    pub info: String,
    pub bucket_id: i32,
    pub user_id: i32,
}

/// Search creation request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateSearch {
    #[validate(length(min = 1, message = "Search information is required"))]
    #[schema(example = "Senior backend developer, Rust, remote")]
    pub info: String,
    /// Credit bucket the search is charged to
    #[schema(example = 12)]
    pub bucket_id: i32,
}

/// Administrative edit of a search; setting `state` to `Finalizado` debits `credits_used`.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct SearchPatch {
    #[validate(length(min = 1, message = "Search information cannot be empty"))]
    pub info: Option<String>,
    pub notes: Option<String>,
    pub state: Option<RequestState>,
    #[validate(range(min = 1, message = "Credits used must be positive"))]
    pub credits_used: Option<i32>,
}

impl SearchPatch {
    pub fn is_empty(&self) -> bool {
        self.info.is_none()
            && self.notes.is_none()
            && self.state.is_none()
            && self.credits_used.is_none()
    }

    /// Credits to debit if this patch finalizes the search.
    pub fn finalization(&self) -> AppResult<Option<i32>> {
        match self.state {
            Some(RequestState::Eliminated) => Err(AppError::validation(
                "Use the delete operation to eliminate a request",
            )),
            Some(RequestState::Finalized) => match self.credits_used {
                Some(amount) if amount > 0 => Ok(Some(amount)),
                _ => Err(AppError::validation(
                    "Credits used must be specified when finalizing",
                )),
            },
            _ if self.credits_used.is_some() => Err(AppError::validation(
                "Credits used can only be set when finalizing",
            )),
            _ => Ok(None),
        }
    }
}

/// Consultation request paid with hours, debited when it is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Consultation {
    #[schema(example = 5)]
    pub id: i32,
    #[schema(example = 2)]
    pub hours: i32,
    pub comments: Option<String>,
    pub notes: Option<String>,
    pub state: RequestState,
    pub pool_id: i32,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Consultation {
    /// Hours to give back when this consultation is deleted.
    pub fn refundable_hours(&self) -> Option<i32> {
        match self.state {
            RequestState::Eliminated => None,
            _ if self.hours > 0 => Some(self.hours),
            _ => None,
        }
    }
}

/// Data needed to insert a consultation
#[derive(Debug, Clone, PartialEq)]
pub struct NewConsultation {
    pub hours: i32,
    pub comments: Option<String>,
    pub pool_id: i32,
    pub user_id: i32,
}

/// Consultation creation request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateConsultation {
    #[schema(example = 3)]
    pub pool_id: i32,
    #[validate(range(min = 1, message = "Hours must be positive"))]
    #[schema(example = 2)]
    pub hours: i32,
    pub comments: Option<String>,
}

/// Administrative edit of a consultation. Hours are fixed once debited.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ConsultationPatch {
    pub comments: Option<String>,
    pub notes: Option<String>,
    pub state: Option<RequestState>,
}

impl ConsultationPatch {
    pub fn is_empty(&self) -> bool {
        self.comments.is_none() && self.notes.is_none() && self.state.is_none()
    }

    pub fn finalizes(&self) -> AppResult<bool> {
        match self.state {
            Some(RequestState::Eliminated) => Err(AppError::validation(
                "Use the delete operation to eliminate a request",
            )),
            Some(RequestState::Finalized) => Ok(true),
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search(state: RequestState, credits_used: Option<i32>) -> Search {
        let now = Utc::now();
        Search {
            id: 1,
            info: "info".into(),
            credits_used,
            notes: None,
            state,
            bucket_id: Some(1),
            user_id: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn eliminated_is_terminal() {
        let state = RequestState::Eliminated;
        assert!(matches!(
            state.ensure_editable(),
            Err(AppError::InvalidStateTransition(_))
        ));
        assert!(matches!(
            state.ensure_deletable(),
            Err(AppError::InvalidStateTransition(_))
        ));
    }

    #[test]
    fn finalized_can_be_deleted_but_not_edited() {
        let state = RequestState::Finalized;
        assert!(state.ensure_editable().is_err());
        assert!(state.ensure_deletable().is_ok());
    }

    #[test]
    fn only_finalized_searches_refund() {
        assert_eq!(search(RequestState::Pending, None).refundable_credits(), None);
        assert_eq!(
            search(RequestState::Finalized, Some(4)).refundable_credits(),
            Some(4)
        );
        assert_eq!(
            search(RequestState::Finalized, Some(0)).refundable_credits(),
            None
        );
    }

    #[test]
    fn finalizing_requires_positive_credits() {
        let patch = SearchPatch {
            state: Some(RequestState::Finalized),
            ..Default::default()
        };
        assert!(patch.finalization().is_err());

        let patch = SearchPatch {
            state: Some(RequestState::Finalized),
            credits_used: Some(3),
            ..Default::default()
        };
        assert_eq!(patch.finalization().unwrap(), Some(3));
    }

    #[test]
    fn patch_cannot_eliminate_or_set_credits_alone() {
        let patch = SearchPatch {
            state: Some(RequestState::Eliminated),
            ..Default::default()
        };
        assert!(patch.finalization().is_err());

        let patch = SearchPatch {
            credits_used: Some(2),
            ..Default::default()
        };
        assert!(patch.finalization().is_err());
    }

    #[test]
    fn state_parses_storage_names() {
        assert_eq!(
            "Finalizado".parse::<RequestState>().unwrap(),
            RequestState::Finalized
        );
        assert!("Cerrado".parse::<RequestState>().is_err());
    }
}
