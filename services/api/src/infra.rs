use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use team_alloc::allocation::{
    Assignment, AuditEntry, AuditError, AuditLog, CandidateProfile, DirectoryError, Explainer,
    ExperienceRequirement, Importance, Policy, Proficiency, ProjectId, RecommendationId,
    RecommendationRecord, RecommendationRepository, RecommendationStatus, RepositoryError,
    RequirementExtractor, RequirementProfile, ShortlistQuery, SkillRequirement, UpstreamError,
    WorkforceDirectory,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct StoreInner {
    records: HashMap<RecommendationId, RecommendationRecord>,
    assignments: Vec<Assignment>,
}

/// Recommendation store backed by process memory. Records and assignments
/// live under one lock so `commit_review` behaves like a single
/// transaction.
#[derive(Default, Clone)]
pub(crate) struct InMemoryRecommendationStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl RecommendationRepository for InMemoryRecommendationStore {
    fn insert(
        &self,
        record: RecommendationRecord,
    ) -> Result<RecommendationRecord, RepositoryError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        if inner.records.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        inner.records.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(
        &self,
        id: &RecommendationId,
    ) -> Result<Option<RecommendationRecord>, RepositoryError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner.records.get(id).cloned())
    }

    fn list(&self, query: &ShortlistQuery) -> Result<Vec<RecommendationRecord>, RepositoryError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        let mut matching: Vec<_> = inner
            .records
            .values()
            .filter(|record| record.project_id == query.project_id)
            .filter(|record| query.status.map_or(true, |status| record.status == status))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.final_score
                .partial_cmp(&a.final_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.employee_id.cmp(&b.employee_id))
        });
        Ok(matching
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }

    fn commit_review(
        &self,
        updated: RecommendationRecord,
        assignment: Option<Assignment>,
    ) -> Result<RecommendationRecord, RepositoryError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let stored = inner
            .records
            .get(&updated.id)
            .ok_or(RepositoryError::NotFound)?;
        if stored.status != RecommendationStatus::PendingReview {
            return Err(RepositoryError::Conflict);
        }
        inner.records.insert(updated.id.clone(), updated.clone());
        if let Some(assignment) = assignment {
            if !inner.assignments.contains(&assignment) {
                inner.assignments.push(assignment);
            }
        }
        Ok(updated)
    }

    fn assignments(&self, project: ProjectId) -> Result<Vec<Assignment>, RepositoryError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner
            .assignments
            .iter()
            .filter(|a| a.project_id == project)
            .cloned()
            .collect())
    }
}

/// Audit sink that keeps entries in memory and mirrors each one into the
/// structured log.
#[derive(Default, Clone)]
pub(crate) struct TracingAuditTrail {
    entries: Arc<Mutex<Vec<AuditEntry>>>,
}

impl TracingAuditTrail {
    pub(crate) fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().expect("audit mutex poisoned").clone()
    }
}

impl AuditLog for TracingAuditTrail {
    fn record(&self, entry: AuditEntry) -> Result<(), AuditError> {
        info!(at = %entry.at, event = ?entry.kind, "audit entry recorded");
        self.entries
            .lock()
            .expect("audit mutex poisoned")
            .push(entry);
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ProjectSeed {
    id: u32,
    brief: String,
}

/// Directory serving the seeded demo roster for every seeded project.
pub(crate) struct SeededDirectory {
    projects: HashMap<ProjectId, String>,
    roster: Vec<CandidateProfile>,
}

impl SeededDirectory {
    pub(crate) fn project_ids(&self) -> Vec<ProjectId> {
        let mut ids: Vec<_> = self.projects.keys().copied().collect();
        ids.sort();
        ids
    }
}

impl WorkforceDirectory for SeededDirectory {
    fn project_brief(&self, project: ProjectId) -> Result<String, DirectoryError> {
        self.projects
            .get(&project)
            .cloned()
            .ok_or(DirectoryError::UnknownProject(project))
    }

    fn eligible_candidates(
        &self,
        project: ProjectId,
    ) -> Result<Vec<CandidateProfile>, DirectoryError> {
        if !self.projects.contains_key(&project) {
            return Err(DirectoryError::UnknownProject(project));
        }
        Ok(self.roster.clone())
    }
}

const SEED_PROJECTS: &str = r#"[
    {"id": 101, "brief": "Rebuild the billing pipeline in Rust with PostgreSQL event storage; senior backend experience expected"},
    {"id": 102, "brief": "Stand up a customer analytics dashboard in Python with Kubernetes deployment"}
]"#;

const SEED_ROSTER: &str = r#"[
    {
        "employee_id": 1,
        "skills": [
            {"name": "Rust", "proficiency": "expert", "years_of_experience": 6.0},
            {"name": "PostgreSQL", "proficiency": "advanced", "years_of_experience": 4.0}
        ],
        "availability": {"is_available": true, "current_projects_count": 1, "current_workload_hours": 12.0, "max_capacity_hours": 40.0}
    },
    {
        "employee_id": 2,
        "skills": [
            {"name": "Rust", "proficiency": "advanced", "years_of_experience": 3.0},
            {"name": "Python", "proficiency": "intermediate", "years_of_experience": 2.0}
        ],
        "availability": {"is_available": true, "current_projects_count": 2, "current_workload_hours": 24.0, "max_capacity_hours": 40.0}
    },
    {
        "employee_id": 3,
        "skills": [
            {"name": "Python", "proficiency": "expert", "years_of_experience": 7.0},
            {"name": "Kubernetes", "proficiency": "advanced", "years_of_experience": 4.0}
        ],
        "availability": {"is_available": true, "current_projects_count": 3, "current_workload_hours": 32.0, "max_capacity_hours": 40.0}
    },
    {
        "employee_id": 4,
        "skills": [
            {"name": "PostgreSQL", "proficiency": "intermediate", "years_of_experience": 1.5}
        ],
        "availability": {"is_available": true, "current_projects_count": 4, "current_workload_hours": 38.0, "max_capacity_hours": 40.0}
    },
    {
        "employee_id": 5,
        "skills": [
            {"name": "Rust", "proficiency": "beginner", "years_of_experience": 0.5},
            {"name": "Python", "proficiency": "advanced", "years_of_experience": 3.0}
        ],
        "availability": {"is_available": false, "current_projects_count": 0, "current_workload_hours": 0.0, "max_capacity_hours": 40.0}
    }
]"#;

pub(crate) fn seeded_directory() -> SeededDirectory {
    let projects: Vec<ProjectSeed> =
        serde_json::from_str(SEED_PROJECTS).expect("seed projects are valid JSON");
    let roster: Vec<CandidateProfile> =
        serde_json::from_str(SEED_ROSTER).expect("seed roster is valid JSON");
    SeededDirectory {
        projects: projects
            .into_iter()
            .map(|seed| (ProjectId(seed.id), seed.brief))
            .collect(),
        roster,
    }
}

/// Extractor matching project briefs against a fixed skill catalog. Stands
/// in for the NLP collaborator when the service runs self-contained.
pub(crate) struct KeywordExtractor;

const SKILL_CATALOG: &[(&str, &str)] = &[
    ("rust", "Rust"),
    ("python", "Python"),
    ("postgres", "PostgreSQL"),
    ("kubernetes", "Kubernetes"),
];

impl RequirementExtractor for KeywordExtractor {
    fn extract(&self, description: &str) -> Result<RequirementProfile, UpstreamError> {
        let lowered = description.to_lowercase();
        let mut skills = Vec::new();
        for (keyword, name) in SKILL_CATALOG {
            if lowered.contains(keyword) {
                let importance = if skills.is_empty() {
                    Importance::Critical
                } else {
                    Importance::Medium
                };
                skills.push(SkillRequirement {
                    name: (*name).to_string(),
                    proficiency: Proficiency::Advanced,
                    importance,
                });
            }
        }

        let experience = lowered.contains("senior").then(|| ExperienceRequirement {
            minimum_years: 4.0,
            preferred_years: 6.0,
        });

        Ok(RequirementProfile {
            skills,
            roles: Default::default(),
            experience,
        })
    }
}

/// Explainer producing a deterministic summary of the shortlist head.
pub(crate) struct TemplateExplainer;

impl Explainer for TemplateExplainer {
    fn explain(&self, shortlist: &[RecommendationRecord]) -> Result<String, UpstreamError> {
        let Some(top) = shortlist.first() else {
            return Ok("No candidates cleared the compliance floor.".to_string());
        };
        let skills = if top.scores.matching_skills.is_empty() {
            "general availability".to_string()
        } else {
            top.scores.matching_skills.join(", ")
        };
        Ok(format!(
            "Top candidate matched on {skills} with a blended score of {:.1}.",
            top.final_score
        ))
    }
}

pub(crate) fn default_policies() -> Vec<Policy> {
    vec![
        Policy {
            name: "project-cap".to_string(),
            kind: "max_projects_per_employee".to_string(),
            config: BTreeMap::from([("max_projects".to_string(), json!(3))]),
            priority: 10,
            is_active: true,
        },
        Policy {
            name: "workload-cap".to_string(),
            kind: "max_workload_hours".to_string(),
            config: BTreeMap::from([("max_hours_per_week".to_string(), json!(36.0))]),
            priority: 5,
            is_active: true,
        },
    ]
}
