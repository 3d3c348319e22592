use super::super::domain::{
    Availability, CandidateSkill, ExperienceRequirement, SkillRequirement,
};
use super::config::ScoringConfig;

/// Points granted per unit of importance weight for a matched requirement.
const FULL_CREDIT: f64 = 4.0;
const NEAR_CREDIT: f64 = 2.0;
const PARTIAL_CREDIT: f64 = 1.0;

/// A requirement matches a candidate skill when either name contains the
/// other, case-insensitively ("postgres" matches "PostgreSQL").
fn skill_names_match(required: &str, held: &str) -> bool {
    let required = required.trim().to_lowercase();
    let held = held.trim().to_lowercase();
    if required.is_empty() || held.is_empty() {
        return false;
    }
    required.contains(&held) || held.contains(&required)
}

pub(crate) fn skill_match_score(
    required: &[SkillRequirement],
    held: &[CandidateSkill],
    config: &ScoringConfig,
) -> (f64, Vec<String>) {
    if required.is_empty() {
        return (config.neutral_score, Vec::new());
    }

    let mut achieved = 0.0;
    let mut maximum = 0.0;
    let mut matched = Vec::new();

    for requirement in required {
        let weight = requirement.importance.weight();
        maximum += weight * FULL_CREDIT;

        let best = held
            .iter()
            .filter(|skill| skill_names_match(&requirement.name, &skill.name))
            .max_by_key(|skill| skill.proficiency.rank());

        let Some(skill) = best else {
            continue;
        };

        let required_rank = requirement.proficiency.rank();
        let held_rank = skill.proficiency.rank();
        let credit = if held_rank >= required_rank {
            FULL_CREDIT
        } else if held_rank + 1 == required_rank {
            NEAR_CREDIT
        } else {
            PARTIAL_CREDIT
        };

        achieved += weight * credit;
        matched.push(requirement.name.clone());
    }

    (achieved / maximum * 100.0, matched)
}

pub(crate) fn experience_match_score(
    requirement: Option<&ExperienceRequirement>,
    held: &[CandidateSkill],
    config: &ScoringConfig,
) -> f64 {
    let Some(requirement) = requirement else {
        return config.neutral_score;
    };
    if held.is_empty() {
        return config.neutral_score;
    }

    let average = held
        .iter()
        .map(|skill| skill.years_of_experience)
        .sum::<f64>()
        / held.len() as f64;

    if average >= requirement.preferred_years {
        100.0
    } else if average >= requirement.minimum_years {
        70.0
    } else {
        (average / requirement.minimum_years * 50.0).max(30.0)
    }
}

pub(crate) fn availability_score(availability: &Availability) -> f64 {
    let utilization = availability.utilization_pct();
    if !availability.is_available || utilization >= 100.0 {
        return 0.0;
    }
    if utilization >= 80.0 {
        25.0
    } else if utilization >= 60.0 {
        50.0
    } else if utilization >= 40.0 {
        75.0
    } else {
        100.0
    }
}

pub(crate) fn workload_score(availability: &Availability) -> f64 {
    (100.0 - availability.utilization_pct()).clamp(0.0, 100.0)
}
