use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::annotate::{Explainer, RequirementExtractor, UpstreamError, FALLBACK_ANNOTATION};
use super::domain::{ProjectId, RecommendationId, RecommendationStatus};
use super::lifecycle::{apply_review, ReviewAction, TransitionError};
use super::policy::{PolicyError, PolicyRegistry};
use super::pool::{sanitize_pool, DirectoryError, WorkforceDirectory};
use super::ranker::rank;
use super::repository::{
    AuditEntry, AuditError, AuditKind, AuditLog, RecommendationRecord, RecommendationRepository,
    RepositoryError, ShortlistQuery,
};
use super::scoring::{ScoringConfig, ScoringEngine};

const DEFAULT_TEAM_SIZE: i64 = 3;

/// Trigger payload for one allocation run.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AllocationRequest {
    #[serde(default)]
    pub team_size_hint: Option<i64>,
    #[serde(default)]
    pub auto_assign: bool,
    #[serde(default)]
    pub notify_email: Option<String>,
}

/// Reviewer verdict payload against one recommendation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReviewRequest {
    pub action: String,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub reviewer_id: Option<u32>,
}

/// Service composing the candidate pool, scorer, policy filter, ranker,
/// recommendation store, and review workflow.
pub struct AllocationService<R, A> {
    repository: Arc<R>,
    audit: Arc<A>,
    directory: Arc<dyn WorkforceDirectory>,
    extractor: Arc<dyn RequirementExtractor>,
    explainer: Arc<dyn Explainer>,
    engine: ScoringEngine,
    shortlist_floor: usize,
}

static RECOMMENDATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_recommendation_id() -> RecommendationId {
    let id = RECOMMENDATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    RecommendationId(format!("rec-{id:06}"))
}

impl<R, A> AllocationService<R, A>
where
    R: RecommendationRepository + 'static,
    A: AuditLog + 'static,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        repository: Arc<R>,
        audit: Arc<A>,
        directory: Arc<dyn WorkforceDirectory>,
        extractor: Arc<dyn RequirementExtractor>,
        explainer: Arc<dyn Explainer>,
        config: ScoringConfig,
        shortlist_floor: usize,
    ) -> Self {
        Self {
            repository,
            audit,
            directory,
            extractor,
            explainer,
            engine: ScoringEngine::new(config),
            shortlist_floor,
        }
    }

    /// Run the full pipeline for one project against a policy snapshot and
    /// persist the surviving candidates as pending recommendations.
    pub fn recommend(
        &self,
        project_id: ProjectId,
        registry: &PolicyRegistry,
        request: AllocationRequest,
    ) -> Result<Vec<RecommendationRecord>, AllocationServiceError> {
        let hint = request.team_size_hint.unwrap_or(DEFAULT_TEAM_SIZE);
        if hint <= 0 {
            return Err(AllocationServiceError::Validation(
                "team_size_hint must be a positive integer".to_string(),
            ));
        }

        let brief = self.directory.project_brief(project_id)?;
        let requirement = self.extractor.extract(&brief)?;
        let pool = sanitize_pool(self.directory.eligible_candidates(project_id)?);

        let floor = self.engine.config().compliance_floor;
        let scored: Vec<_> = pool
            .into_iter()
            .filter_map(|candidate| {
                let scores = self.engine.score(&requirement, &candidate);
                let compliance = registry.evaluate(&candidate);
                if compliance.score < floor {
                    return None;
                }
                Some((candidate, scores, compliance))
            })
            .collect();

        let ranked = rank(&self.engine, scored, hint as usize, self.shortlist_floor);

        let now = Utc::now();
        let mut records: Vec<RecommendationRecord> = ranked
            .into_iter()
            .map(|entry| RecommendationRecord {
                id: next_recommendation_id(),
                project_id,
                employee_id: entry.candidate.employee_id,
                scores: entry.scores,
                compliance_score: entry.compliance.score,
                match_score: entry.match_score,
                final_score: entry.final_score,
                violations: entry.compliance.violations,
                status: RecommendationStatus::PendingReview,
                reviewed_by: None,
                reviewed_at: None,
                feedback: None,
                annotation: None,
                created_at: now,
            })
            .collect();

        // The annotation is optional and non-authoritative; an unreachable
        // explainer degrades to the static fallback, never a failed run.
        let annotation = match self.explainer.explain(&records) {
            Ok(text) => text,
            Err(err) => {
                warn!(project_id = project_id.0, %err, "explanation unavailable, using fallback");
                FALLBACK_ANNOTATION.to_string()
            }
        };
        for record in &mut records {
            record.annotation = Some(annotation.clone());
        }

        let mut stored = Vec::with_capacity(records.len());
        for record in records {
            stored.push(self.repository.insert(record)?);
        }

        self.audit.record(AuditEntry {
            at: Utc::now(),
            kind: AuditKind::RunCompleted {
                project_id,
                persisted: stored.len(),
                notify_email: request.notify_email.clone(),
            },
        })?;

        if request.auto_assign {
            if let Some(top) = stored.first().cloned() {
                let approved = self.review(
                    &top.id,
                    ReviewRequest {
                        action: "approve".to_string(),
                        feedback: Some("auto-assigned by allocation run".to_string()),
                        reviewer_id: None,
                    },
                )?;
                stored[0] = approved;
            }
        }

        Ok(stored)
    }

    /// Apply a reviewer verdict. Every attempt is audited with a timestamp
    /// regardless of outcome; state changes at most once.
    pub fn review(
        &self,
        id: &RecommendationId,
        request: ReviewRequest,
    ) -> Result<RecommendationRecord, AllocationServiceError> {
        let outcome = self.try_review(id, &request);

        let recorded = match &outcome {
            Ok(record) => record.status.label().to_string(),
            Err(err) => err.kind().to_string(),
        };
        self.audit.record(AuditEntry {
            at: Utc::now(),
            kind: AuditKind::ReviewAttempt {
                recommendation_id: id.clone(),
                action: request.action.clone(),
                outcome: recorded,
            },
        })?;

        outcome
    }

    fn try_review(
        &self,
        id: &RecommendationId,
        request: &ReviewRequest,
    ) -> Result<RecommendationRecord, AllocationServiceError> {
        let action = ReviewAction::parse(&request.action)?;

        let record = self
            .repository
            .fetch(id)?
            .ok_or(AllocationServiceError::NotFound)?;

        let (updated, assignment) = apply_review(
            &record,
            action,
            request.reviewer_id,
            request.feedback.clone(),
            Utc::now(),
        )?;

        // One retry on a transient persistence fault, then surface it.
        let committed = match self
            .repository
            .commit_review(updated.clone(), assignment.clone())
        {
            Err(RepositoryError::Unavailable(_)) => {
                self.repository.commit_review(updated, assignment)
            }
            other => other,
        };

        match committed {
            Ok(record) => Ok(record),
            Err(RepositoryError::Conflict) => {
                // Lost the optimistic race: someone else completed the review.
                let status = self
                    .repository
                    .fetch(id)?
                    .map(|current| current.status.label())
                    .unwrap_or("unknown");
                Err(TransitionError::InvalidState { status }.into())
            }
            Err(other) => Err(other.into()),
        }
    }

    pub fn shortlist(
        &self,
        query: &ShortlistQuery,
    ) -> Result<Vec<RecommendationRecord>, AllocationServiceError> {
        Ok(self.repository.list(query)?)
    }

    pub fn get(
        &self,
        id: &RecommendationId,
    ) -> Result<RecommendationRecord, AllocationServiceError> {
        self.repository
            .fetch(id)?
            .ok_or(AllocationServiceError::NotFound)
    }
}

/// Error raised by the allocation service.
#[derive(Debug, thiserror::Error)]
pub enum AllocationServiceError {
    #[error("recommendation not found")]
    NotFound,
    #[error("validation failed: {0}")]
    Validation(String),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Policy(#[from] PolicyError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error(transparent)]
    Audit(#[from] AuditError),
}

impl AllocationServiceError {
    /// Stable machine-readable error kind exposed to clients.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Validation(_) | Self::Policy(_) => "validation",
            Self::Transition(TransitionError::InvalidState { .. }) => "invalid_state",
            Self::Transition(TransitionError::InvalidAction(_)) => "invalid_action",
            Self::Repository(_) | Self::Audit(_) => "persistence",
            Self::Directory(DirectoryError::UnknownProject(_)) => "not_found",
            Self::Directory(DirectoryError::Unavailable(_)) => "persistence",
            Self::Upstream(_) => "upstream_unavailable",
        }
    }
}
