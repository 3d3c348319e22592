use serde::{Deserialize, Serialize};

/// Blend weights and floors driving the scorer and ranker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub skill_weight: f64,
    pub experience_weight: f64,
    pub availability_weight: f64,
    pub workload_weight: f64,
    /// Share of the final score contributed by match quality.
    pub match_weight: f64,
    /// Share of the final score contributed by policy compliance.
    pub compliance_weight: f64,
    /// Score returned when a signal carries no information.
    pub neutral_score: f64,
    /// Candidates below this compliance score are excluded outright.
    pub compliance_floor: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            skill_weight: 0.40,
            experience_weight: 0.25,
            availability_weight: 0.20,
            workload_weight: 0.15,
            match_weight: 0.7,
            compliance_weight: 0.3,
            neutral_score: 50.0,
            compliance_floor: 30.0,
        }
    }
}

impl ScoringConfig {
    pub fn with_compliance_floor(mut self, floor: f64) -> Self {
        self.compliance_floor = floor.clamp(0.0, 100.0);
        self
    }
}
