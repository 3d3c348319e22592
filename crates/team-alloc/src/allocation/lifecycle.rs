use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Assignment, RecommendationStatus};
use super::repository::RecommendationRecord;

/// Reviewer verdict on a pending recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    Approve,
    Reject,
}

impl ReviewAction {
    pub fn parse(value: &str) -> Result<Self, TransitionError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            other => Err(TransitionError::InvalidAction(other.to_string())),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ReviewAction::Approve => "approve",
            ReviewAction::Reject => "reject",
        }
    }
}

/// Guarded-transition failures.
#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    #[error("recommendation is already {status}; only pending_review can transition")]
    InvalidState { status: &'static str },
    #[error("unknown review action '{0}'")]
    InvalidAction(String),
}

/// Apply a review verdict to a recommendation. Pure: the caller owns
/// persistence and must commit the returned record and assignment as one
/// atomic unit.
///
/// Only `pending_review` records may transition; a record in a terminal
/// state fails with `InvalidState` and is returned untouched. Approval
/// yields the assignment for the repository to create idempotently;
/// rejection never does.
pub fn apply_review(
    record: &RecommendationRecord,
    action: ReviewAction,
    reviewer_id: Option<u32>,
    feedback: Option<String>,
    now: DateTime<Utc>,
) -> Result<(RecommendationRecord, Option<Assignment>), TransitionError> {
    if record.status.is_terminal() {
        return Err(TransitionError::InvalidState {
            status: record.status.label(),
        });
    }

    let mut updated = record.clone();
    updated.reviewed_by = reviewer_id;
    updated.reviewed_at = Some(now);
    updated.feedback = feedback;

    match action {
        ReviewAction::Approve => {
            updated.status = RecommendationStatus::Approved;
            let assignment = Assignment {
                employee_id: record.employee_id,
                project_id: record.project_id,
            };
            Ok((updated, Some(assignment)))
        }
        ReviewAction::Reject => {
            updated.status = RecommendationStatus::Rejected;
            Ok((updated, None))
        }
    }
}
