use super::domain::RequirementProfile;
use super::repository::RecommendationRecord;

/// Annotation attached when the explanation collaborator is unreachable.
pub const FALLBACK_ANNOTATION: &str =
    "Ranked by skill match, experience, availability, and policy compliance.";

/// Faults from the non-deterministic external collaborators.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream collaborator unavailable: {0}")]
    Unavailable(String),
}

/// Derives a structured requirement profile from a free-text project brief.
/// Non-deterministic and external; the deterministic core never depends on
/// its internals.
pub trait RequirementExtractor: Send + Sync {
    fn extract(&self, description: &str) -> Result<RequirementProfile, UpstreamError>;
}

/// Produces an optional, non-authoritative explanation for a shortlist.
/// Failure degrades to `FALLBACK_ANNOTATION`, never to a failed run.
pub trait Explainer: Send + Sync {
    fn explain(&self, shortlist: &[RecommendationRecord]) -> Result<String, UpstreamError>;
}
