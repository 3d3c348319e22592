//! Team allocation recommendation engine.
//!
//! The pipeline is pure until the final persistence step: a requirement
//! profile and candidate pool flow through the scorer, the policy filter,
//! and the ranker; survivors are persisted as reviewable recommendations,
//! and an approval creates a durable assignment.

pub mod annotate;
pub mod domain;
pub mod lifecycle;
pub mod policy;
pub mod pool;
pub mod ranker;
pub mod repository;
pub mod router;
pub(crate) mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use annotate::{Explainer, RequirementExtractor, UpstreamError, FALLBACK_ANNOTATION};
pub use domain::{
    Assignment, Availability, CandidateProfile, CandidateSkill, EmployeeId,
    ExperienceRequirement, Importance, Proficiency, ProjectId, RecommendationId,
    RecommendationStatus, RequirementProfile, ScoreBreakdown, SkillRequirement,
};
pub use lifecycle::{apply_review, ReviewAction, TransitionError};
pub use policy::{ComplianceOutcome, CompiledPolicy, Policy, PolicyError, PolicyRegistry, PolicyRule};
pub use pool::{sanitize_pool, DirectoryError, WorkforceDirectory};
pub use ranker::{rank, RankedCandidate};
pub use repository::{
    AuditEntry, AuditError, AuditKind, AuditLog, RecommendationRecord,
    RecommendationRepository, RepositoryError, ShortlistItemView, ShortlistQuery,
};
pub use router::{engine_router, EngineState};
pub use scoring::{ScoringConfig, ScoringEngine};
pub use service::{
    AllocationRequest, AllocationService, AllocationServiceError, ReviewRequest,
};
