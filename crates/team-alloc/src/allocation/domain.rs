use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for persisted recommendations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecommendationId(pub String);

impl fmt::Display for RecommendationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EmployeeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProjectId(pub u32);

/// Proficiency levels recognized by the scorer, ordered weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Proficiency {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl Proficiency {
    pub const fn rank(self) -> u8 {
        match self {
            Proficiency::Beginner => 1,
            Proficiency::Intermediate => 2,
            Proficiency::Advanced => 3,
            Proficiency::Expert => 4,
        }
    }
}

/// How much a required skill contributes to the match score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    Low,
    Medium,
    High,
    Critical,
}

impl Importance {
    pub const fn weight(self) -> f64 {
        match self {
            Importance::Low => 0.5,
            Importance::Medium => 1.0,
            Importance::High => 2.0,
            Importance::Critical => 3.0,
        }
    }
}

/// One skill demanded by a project, as derived by the extraction collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRequirement {
    pub name: String,
    pub proficiency: Proficiency,
    pub importance: Importance,
}

/// Years-of-experience expectation attached to a requirement profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExperienceRequirement {
    pub minimum_years: f64,
    pub preferred_years: f64,
}

/// Structured description of what a project needs. Immutable for the
/// duration of one allocation run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RequirementProfile {
    pub skills: Vec<SkillRequirement>,
    pub roles: BTreeSet<String>,
    pub experience: Option<ExperienceRequirement>,
}

/// A skill held by a candidate, with recorded depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSkill {
    pub name: String,
    pub proficiency: Proficiency,
    pub years_of_experience: f64,
}

/// Capacity snapshot for one employee at the start of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Availability {
    pub is_available: bool,
    pub current_projects_count: u32,
    pub current_workload_hours: f64,
    pub max_capacity_hours: f64,
}

impl Availability {
    /// Current workload as a percentage of capacity. Zero capacity reads as zero.
    pub fn utilization_pct(&self) -> f64 {
        if self.max_capacity_hours <= 0.0 {
            return 0.0;
        }
        self.current_workload_hours / self.max_capacity_hours * 100.0
    }
}

/// Read-only employee snapshot considered for allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub employee_id: EmployeeId,
    pub skills: Vec<CandidateSkill>,
    pub availability: Availability,
}

/// Lifecycle state of a persisted recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStatus {
    PendingReview,
    Approved,
    Rejected,
}

impl RecommendationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RecommendationStatus::PendingReview => "pending_review",
            RecommendationStatus::Approved => "approved",
            RecommendationStatus::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, RecommendationStatus::PendingReview)
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending_review" => Some(Self::PendingReview),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// The four independent sub-scores produced by the scorer, each in [0, 100],
/// plus the requirement names the candidate actually matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub skill_match: f64,
    pub experience_match: f64,
    pub availability: f64,
    pub workload: f64,
    pub matching_skills: Vec<String>,
}

/// Durable allocation record created when a recommendation is approved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub employee_id: EmployeeId,
    pub project_id: ProjectId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proficiency_ranks_are_strictly_increasing() {
        assert!(Proficiency::Beginner.rank() < Proficiency::Intermediate.rank());
        assert!(Proficiency::Intermediate.rank() < Proficiency::Advanced.rank());
        assert!(Proficiency::Advanced.rank() < Proficiency::Expert.rank());
    }

    #[test]
    fn utilization_handles_zero_capacity() {
        let availability = Availability {
            is_available: true,
            current_projects_count: 1,
            current_workload_hours: 20.0,
            max_capacity_hours: 0.0,
        };
        assert_eq!(availability.utilization_pct(), 0.0);
    }

    #[test]
    fn status_labels_round_trip() {
        for status in [
            RecommendationStatus::PendingReview,
            RecommendationStatus::Approved,
            RecommendationStatus::Rejected,
        ] {
            assert_eq!(RecommendationStatus::parse(status.label()), Some(status));
        }
        assert_eq!(RecommendationStatus::parse("escalated"), None);
    }
}
