use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::CandidateProfile;

/// Administrator-authored allocation policy as it crosses the API boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub name: String,
    pub kind: String,
    pub config: BTreeMap<String, serde_json::Value>,
    pub priority: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Validation errors raised while compiling a policy into a predicate.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("unknown policy kind '{0}'")]
    UnknownKind(String),
    #[error("policy '{policy}' is missing config key '{key}'")]
    MissingKey { policy: String, key: String },
    #[error("policy '{policy}' config key '{key}' must be a positive number")]
    InvalidValue { policy: String, key: String },
}

/// Typed constraint compiled from a policy's key-value config. The enum is
/// the extension point for future policy kinds; only the two observed kinds
/// exist today.
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyRule {
    MaxProjectsPerEmployee { max_projects: u32 },
    MaxWorkloadHours { max_hours_per_week: f64 },
}

const MAX_PROJECTS_KIND: &str = "max_projects_per_employee";
const MAX_WORKLOAD_KIND: &str = "max_workload_hours";

const PROJECTS_PENALTY: f64 = 50.0;
const WORKLOAD_PENALTY: f64 = 30.0;

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPolicy {
    pub name: String,
    pub priority: i32,
    pub rule: PolicyRule,
}

impl CompiledPolicy {
    /// Compile an active policy. Inactive policies yield `None`.
    pub fn compile(policy: &Policy) -> Result<Option<Self>, PolicyError> {
        if !policy.is_active {
            return Ok(None);
        }

        let rule = match policy.kind.as_str() {
            MAX_PROJECTS_KIND => PolicyRule::MaxProjectsPerEmployee {
                max_projects: read_u32(policy, "max_projects")?,
            },
            MAX_WORKLOAD_KIND => PolicyRule::MaxWorkloadHours {
                max_hours_per_week: read_f64(policy, "max_hours_per_week")?,
            },
            other => return Err(PolicyError::UnknownKind(other.to_string())),
        };

        Ok(Some(Self {
            name: policy.name.clone(),
            priority: policy.priority,
            rule,
        }))
    }

    /// Violation message for a candidate breaking this rule, if any.
    fn violation(&self, candidate: &CandidateProfile) -> Option<(String, f64)> {
        match &self.rule {
            PolicyRule::MaxProjectsPerEmployee { max_projects } => {
                if candidate.availability.current_projects_count >= *max_projects {
                    Some((
                        format!("Exceeds max projects limit ({max_projects})"),
                        PROJECTS_PENALTY,
                    ))
                } else {
                    None
                }
            }
            PolicyRule::MaxWorkloadHours { max_hours_per_week } => {
                if candidate.availability.current_workload_hours >= *max_hours_per_week {
                    Some((
                        format!("Exceeds max workload ({max_hours_per_week}h/week)"),
                        WORKLOAD_PENALTY,
                    ))
                } else {
                    None
                }
            }
        }
    }
}

fn read_number(policy: &Policy, key: &str) -> Result<f64, PolicyError> {
    let value = policy
        .config
        .get(key)
        .ok_or_else(|| PolicyError::MissingKey {
            policy: policy.name.clone(),
            key: key.to_string(),
        })?;

    value
        .as_f64()
        .filter(|number| number.is_finite() && *number > 0.0)
        .ok_or_else(|| PolicyError::InvalidValue {
            policy: policy.name.clone(),
            key: key.to_string(),
        })
}

fn read_f64(policy: &Policy, key: &str) -> Result<f64, PolicyError> {
    read_number(policy, key)
}

fn read_u32(policy: &Policy, key: &str) -> Result<u32, PolicyError> {
    let number = read_number(policy, key)?;
    if number.fract() != 0.0 || number > u32::MAX as f64 {
        return Err(PolicyError::InvalidValue {
            policy: policy.name.clone(),
            key: key.to_string(),
        });
    }
    Ok(number as u32)
}

/// Outcome of evaluating one candidate against every compiled constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceOutcome {
    pub score: f64,
    pub violations: Vec<String>,
}

/// Explicit snapshot of the active policy set. A registry is compiled once
/// and passed into each allocation run, so runs are reproducible and never
/// observe mid-run policy edits.
#[derive(Debug, Clone, Default)]
pub struct PolicyRegistry {
    entries: Vec<(Policy, CompiledPolicy)>,
}

impl PolicyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile and insert a policy, keeping the set ordered by descending
    /// priority. Inactive policies are accepted but not evaluated.
    pub fn register(&mut self, policy: Policy) -> Result<(), PolicyError> {
        let Some(compiled) = CompiledPolicy::compile(&policy)? else {
            return Ok(());
        };
        self.entries.push((policy, compiled));
        self.entries
            .sort_by(|(a, _), (b, _)| b.priority.cmp(&a.priority));
        Ok(())
    }

    pub fn from_policies(policies: Vec<Policy>) -> Result<Self, PolicyError> {
        let mut registry = Self::new();
        for policy in policies {
            registry.register(policy)?;
        }
        Ok(registry)
    }

    /// Clone the compiled set for one allocation run.
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    pub fn active_policies(&self) -> Vec<Policy> {
        self.entries.iter().map(|(policy, _)| policy.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evaluate every compiled constraint against one candidate. Each
    /// matching policy instance is applied independently, so repeated kinds
    /// accumulate. The score starts at 100 and never drops below 0.
    pub fn evaluate(&self, candidate: &CandidateProfile) -> ComplianceOutcome {
        let mut score = 100.0;
        let mut violations = Vec::new();

        for (_, compiled) in &self.entries {
            if let Some((message, penalty)) = compiled.violation(candidate) {
                violations.push(message);
                score -= penalty;
            }
        }

        ComplianceOutcome {
            score: score.max(0.0),
            violations,
        }
    }
}
