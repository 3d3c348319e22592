mod config;
mod rules;

pub use config::ScoringConfig;

use super::domain::{CandidateProfile, RequirementProfile, ScoreBreakdown};

/// Stateless scorer applying the configured weights to one candidate.
/// Scoring is pure: identical inputs always produce identical output.
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn score(
        &self,
        requirement: &RequirementProfile,
        candidate: &CandidateProfile,
    ) -> ScoreBreakdown {
        let (skill_match, matching_skills) =
            rules::skill_match_score(&requirement.skills, &candidate.skills, &self.config);
        let experience_match = rules::experience_match_score(
            requirement.experience.as_ref(),
            &candidate.skills,
            &self.config,
        );
        let availability = rules::availability_score(&candidate.availability);
        let workload = rules::workload_score(&candidate.availability);

        ScoreBreakdown {
            skill_match,
            experience_match,
            availability,
            workload,
            matching_skills,
        }
    }

    /// Weighted blend of the four sub-scores, before compliance enters.
    pub fn match_score(&self, scores: &ScoreBreakdown) -> f64 {
        self.config.skill_weight * scores.skill_match
            + self.config.experience_weight * scores.experience_match
            + self.config.availability_weight * scores.availability
            + self.config.workload_weight * scores.workload
    }

    /// Final ranking score blending match quality with policy compliance.
    pub fn final_score(&self, match_score: f64, compliance_score: f64) -> f64 {
        self.config.match_weight * match_score + self.config.compliance_weight * compliance_score
    }
}
