use std::cmp::Ordering;

use super::domain::{CandidateProfile, ScoreBreakdown};
use super::policy::ComplianceOutcome;
use super::scoring::ScoringEngine;

/// One surviving candidate with every signal the ranker blends.
#[derive(Debug, Clone)]
pub struct RankedCandidate {
    pub candidate: CandidateProfile,
    pub scores: ScoreBreakdown,
    pub compliance: ComplianceOutcome,
    pub match_score: f64,
    pub final_score: f64,
}

/// Blend, sort, and truncate the scored pool. Candidates below the
/// compliance floor were already excluded by the caller; this function
/// only orders survivors and cuts the shortlist.
pub fn rank(
    engine: &ScoringEngine,
    scored: Vec<(CandidateProfile, ScoreBreakdown, ComplianceOutcome)>,
    team_size_hint: usize,
    shortlist_floor: usize,
) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = scored
        .into_iter()
        .map(|(candidate, scores, compliance)| {
            let match_score = engine.match_score(&scores);
            let final_score = engine.final_score(match_score, compliance.score);
            RankedCandidate {
                candidate,
                scores,
                compliance,
                match_score,
                final_score,
            }
        })
        .collect();

    // Descending score, ascending employee id on ties, so output order is total.
    ranked.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.candidate.employee_id.cmp(&b.candidate.employee_id))
    });

    ranked.truncate(team_size_hint.max(shortlist_floor));
    ranked
}
