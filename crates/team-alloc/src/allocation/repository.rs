use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    Assignment, EmployeeId, ProjectId, RecommendationId, RecommendationStatus, ScoreBreakdown,
};

/// Persisted recommendation: one surviving candidate from one engine run,
/// frozen once it leaves `pending_review`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub id: RecommendationId,
    pub project_id: ProjectId,
    pub employee_id: EmployeeId,
    pub scores: ScoreBreakdown,
    pub compliance_score: f64,
    pub match_score: f64,
    pub final_score: f64,
    pub violations: Vec<String>,
    pub status: RecommendationStatus,
    pub reviewed_by: Option<u32>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub feedback: Option<String>,
    pub annotation: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RecommendationRecord {
    pub fn shortlist_view(&self) -> ShortlistItemView {
        ShortlistItemView {
            id: self.id.clone(),
            employee_id: self.employee_id,
            skill_match: self.scores.skill_match,
            experience_match: self.scores.experience_match,
            availability: self.scores.availability,
            workload: self.scores.workload,
            compliance_score: self.compliance_score,
            // Historical clients read the blended score under this name.
            match_score: self.final_score,
            status: self.status.label(),
            violations: self.violations.clone(),
            matching_skills: self.scores.matching_skills.clone(),
            annotation: self.annotation.clone(),
            created_at: self.created_at,
            reviewed_at: self.reviewed_at,
            reviewed_by: self.reviewed_by,
        }
    }
}

/// Wire shape for one shortlist entry.
#[derive(Debug, Clone, Serialize)]
pub struct ShortlistItemView {
    pub id: RecommendationId,
    pub employee_id: EmployeeId,
    pub skill_match: f64,
    pub experience_match: f64,
    pub availability: f64,
    pub workload: f64,
    pub compliance_score: f64,
    pub match_score: f64,
    pub status: &'static str,
    pub violations: Vec<String>,
    pub matching_skills: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<u32>,
}

/// Filter for shortlist reads. Results are ordered by final score
/// descending regardless of the filter.
#[derive(Debug, Clone)]
pub struct ShortlistQuery {
    pub project_id: ProjectId,
    pub status: Option<RecommendationStatus>,
    pub limit: usize,
    pub offset: usize,
}

/// Storage abstraction so the service can be exercised in isolation.
///
/// `commit_review` is the transactional edge: the stored record must still
/// be `pending_review` when the write lands, and the assignment (when
/// present) is created only if none exists for the (employee, project)
/// pair. Implementations losing that race return `Conflict`.
pub trait RecommendationRepository: Send + Sync {
    fn insert(&self, record: RecommendationRecord)
        -> Result<RecommendationRecord, RepositoryError>;
    fn fetch(&self, id: &RecommendationId)
        -> Result<Option<RecommendationRecord>, RepositoryError>;
    fn list(&self, query: &ShortlistQuery) -> Result<Vec<RecommendationRecord>, RepositoryError>;
    fn commit_review(
        &self,
        updated: RecommendationRecord,
        assignment: Option<Assignment>,
    ) -> Result<RecommendationRecord, RepositoryError>;
    fn assignments(&self, project: ProjectId) -> Result<Vec<Assignment>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists or was reviewed concurrently")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Audit trail for transition attempts and completed runs. Every review
/// call is recorded with a timestamp regardless of outcome.
pub trait AuditLog: Send + Sync {
    fn record(&self, entry: AuditEntry) -> Result<(), AuditError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub at: DateTime<Utc>,
    pub kind: AuditKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditKind {
    RunCompleted {
        project_id: ProjectId,
        persisted: usize,
        notify_email: Option<String>,
    },
    ReviewAttempt {
        recommendation_id: RecommendationId,
        action: String,
        outcome: String,
    },
}

/// Audit sink error.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("audit sink unavailable: {0}")]
    Unavailable(String),
}
