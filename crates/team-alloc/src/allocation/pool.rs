use tracing::warn;

use super::domain::{CandidateProfile, ProjectId};

/// Directory faults surfaced while assembling a candidate pool.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("project {0:?} is not known to the directory")]
    UnknownProject(ProjectId),
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

/// Source of eligible employees and project briefs. Implemented over
/// whatever persistence the deployment uses; the engine only sees
/// snapshots.
pub trait WorkforceDirectory: Send + Sync {
    /// Free-text brief handed to the requirement-extraction collaborator.
    fn project_brief(&self, project: ProjectId) -> Result<String, DirectoryError>;

    /// Employees eligible for the project, with skill and availability
    /// records attached.
    fn eligible_candidates(&self, project: ProjectId)
        -> Result<Vec<CandidateProfile>, DirectoryError>;
}

/// Drop malformed candidate records so one bad row never aborts a run.
pub fn sanitize_pool(candidates: Vec<CandidateProfile>) -> Vec<CandidateProfile> {
    candidates
        .into_iter()
        .filter(|candidate| match validate(candidate) {
            Ok(()) => true,
            Err(reason) => {
                warn!(
                    employee_id = candidate.employee_id.0,
                    reason, "skipping malformed candidate record"
                );
                false
            }
        })
        .collect()
}

fn validate(candidate: &CandidateProfile) -> Result<(), &'static str> {
    let availability = &candidate.availability;
    if !availability.current_workload_hours.is_finite()
        || availability.current_workload_hours < 0.0
    {
        return Err("workload hours must be a non-negative number");
    }
    if !availability.max_capacity_hours.is_finite() || availability.max_capacity_hours < 0.0 {
        return Err("capacity hours must be a non-negative number");
    }
    for skill in &candidate.skills {
        if skill.name.trim().is_empty() {
            return Err("skill record has an empty name");
        }
        if !skill.years_of_experience.is_finite() || skill.years_of_experience < 0.0 {
            return Err("skill record has invalid years of experience");
        }
    }
    Ok(())
}
