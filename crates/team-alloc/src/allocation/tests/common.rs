use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::{json, Value};

use crate::allocation::annotate::{Explainer, RequirementExtractor, UpstreamError};
use crate::allocation::domain::{
    Assignment, Availability, CandidateProfile, CandidateSkill, EmployeeId,
    ExperienceRequirement, Importance, Proficiency, ProjectId, RecommendationId,
    RecommendationStatus, RequirementProfile, SkillRequirement,
};
use crate::allocation::policy::{Policy, PolicyRegistry};
use crate::allocation::pool::{DirectoryError, WorkforceDirectory};
use crate::allocation::repository::{
    AuditEntry, AuditError, AuditLog, RecommendationRecord, RecommendationRepository,
    RepositoryError, ShortlistQuery,
};
use crate::allocation::router::{engine_router, EngineState};
use crate::allocation::scoring::ScoringConfig;
use crate::allocation::service::AllocationService;

pub(super) const PROJECT: ProjectId = ProjectId(11);

pub(super) fn requirement() -> RequirementProfile {
    RequirementProfile {
        skills: vec![
            SkillRequirement {
                name: "Python".to_string(),
                proficiency: Proficiency::Advanced,
                importance: Importance::Critical,
            },
            SkillRequirement {
                name: "PostgreSQL".to_string(),
                proficiency: Proficiency::Intermediate,
                importance: Importance::Medium,
            },
        ],
        roles: BTreeSet::from(["backend".to_string()]),
        experience: Some(ExperienceRequirement {
            minimum_years: 2.0,
            preferred_years: 4.0,
        }),
    }
}

pub(super) fn candidate(id: u32, projects: u32, workload: f64) -> CandidateProfile {
    CandidateProfile {
        employee_id: EmployeeId(id),
        skills: vec![
            CandidateSkill {
                name: "Python".to_string(),
                proficiency: Proficiency::Expert,
                years_of_experience: 5.0,
            },
            CandidateSkill {
                name: "postgres".to_string(),
                proficiency: Proficiency::Advanced,
                years_of_experience: 3.0,
            },
        ],
        availability: Availability {
            is_available: true,
            current_projects_count: projects,
            current_workload_hours: workload,
            max_capacity_hours: 40.0,
        },
    }
}

pub(super) fn max_projects_policy(limit: u32) -> Policy {
    Policy {
        name: format!("max-{limit}-projects"),
        kind: "max_projects_per_employee".to_string(),
        config: BTreeMap::from([("max_projects".to_string(), json!(limit))]),
        priority: 10,
        is_active: true,
    }
}

pub(super) fn max_workload_policy(hours: f64) -> Policy {
    Policy {
        name: "workload-cap".to_string(),
        kind: "max_workload_hours".to_string(),
        config: BTreeMap::from([("max_hours_per_week".to_string(), json!(hours))]),
        priority: 5,
        is_active: true,
    }
}

pub(super) fn registry_with(policies: Vec<Policy>) -> PolicyRegistry {
    PolicyRegistry::from_policies(policies).expect("test policies compile")
}

#[derive(Default)]
struct RepositoryInner {
    records: HashMap<RecommendationId, RecommendationRecord>,
    assignments: Vec<Assignment>,
}

/// In-memory store holding recommendations and assignments under one lock,
/// so `commit_review` is atomic the way a database transaction would be.
#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    inner: Arc<Mutex<RepositoryInner>>,
}

impl MemoryRepository {
    pub(super) fn assignments_for(&self, project: ProjectId) -> Vec<Assignment> {
        self.inner
            .lock()
            .expect("repository mutex poisoned")
            .assignments
            .iter()
            .filter(|a| a.project_id == project)
            .cloned()
            .collect()
    }
}

impl RecommendationRepository for MemoryRepository {
    fn insert(
        &self,
        record: RecommendationRecord,
    ) -> Result<RecommendationRecord, RepositoryError> {
        let mut inner = self.inner.lock().expect("repository mutex poisoned");
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
        let inner = self.inner.lock().expect("repository mutex poisoned");
        Ok(inner.records.get(id).cloned())
    }

    fn list(&self, query: &ShortlistQuery) -> Result<Vec<RecommendationRecord>, RepositoryError> {
        let inner = self.inner.lock().expect("repository mutex poisoned");
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
        let mut inner = self.inner.lock().expect("repository mutex poisoned");
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
        Ok(self.assignments_for(project))
    }
}

/// Repository that fails the first commit with a transient fault, then
/// delegates, so retry behavior can be asserted.
#[derive(Clone)]
pub(super) struct FlakyRepository {
    delegate: MemoryRepository,
    remaining_faults: Arc<Mutex<u32>>,
}

impl FlakyRepository {
    pub(super) fn new(delegate: MemoryRepository, faults: u32) -> Self {
        Self {
            delegate,
            remaining_faults: Arc::new(Mutex::new(faults)),
        }
    }
}

impl RecommendationRepository for FlakyRepository {
    fn insert(
        &self,
        record: RecommendationRecord,
    ) -> Result<RecommendationRecord, RepositoryError> {
        self.delegate.insert(record)
    }

    fn fetch(
        &self,
        id: &RecommendationId,
    ) -> Result<Option<RecommendationRecord>, RepositoryError> {
        self.delegate.fetch(id)
    }

    fn list(&self, query: &ShortlistQuery) -> Result<Vec<RecommendationRecord>, RepositoryError> {
        self.delegate.list(query)
    }

    fn commit_review(
        &self,
        updated: RecommendationRecord,
        assignment: Option<Assignment>,
    ) -> Result<RecommendationRecord, RepositoryError> {
        let mut faults = self.remaining_faults.lock().expect("fault mutex poisoned");
        if *faults > 0 {
            *faults -= 1;
            return Err(RepositoryError::Unavailable("storage flapping".to_string()));
        }
        drop(faults);
        self.delegate.commit_review(updated, assignment)
    }

    fn assignments(&self, project: ProjectId) -> Result<Vec<Assignment>, RepositoryError> {
        self.delegate.assignments(project)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryAudit {
    entries: Arc<Mutex<Vec<AuditEntry>>>,
}

impl MemoryAudit {
    pub(super) fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().expect("audit mutex poisoned").clone()
    }
}

impl AuditLog for MemoryAudit {
    fn record(&self, entry: AuditEntry) -> Result<(), AuditError> {
        self.entries
            .lock()
            .expect("audit mutex poisoned")
            .push(entry);
        Ok(())
    }
}

/// Directory serving a fixed brief and pool for one project id.
pub(super) struct StaticDirectory {
    pub(super) project: ProjectId,
    pub(super) candidates: Vec<CandidateProfile>,
}

impl WorkforceDirectory for StaticDirectory {
    fn project_brief(&self, project: ProjectId) -> Result<String, DirectoryError> {
        if project != self.project {
            return Err(DirectoryError::UnknownProject(project));
        }
        Ok("Backend data platform rebuild needing Python and PostgreSQL".to_string())
    }

    fn eligible_candidates(
        &self,
        project: ProjectId,
    ) -> Result<Vec<CandidateProfile>, DirectoryError> {
        if project != self.project {
            return Err(DirectoryError::UnknownProject(project));
        }
        Ok(self.candidates.clone())
    }
}

/// Extractor standing in for the external NLP collaborator.
pub(super) struct FixedExtractor;

impl RequirementExtractor for FixedExtractor {
    fn extract(&self, _description: &str) -> Result<RequirementProfile, UpstreamError> {
        Ok(requirement())
    }
}

pub(super) struct StaticExplainer;

impl Explainer for StaticExplainer {
    fn explain(&self, _shortlist: &[RecommendationRecord]) -> Result<String, UpstreamError> {
        Ok("Candidates ranked by blended skill and capacity signals.".to_string())
    }
}

pub(super) struct OfflineExplainer;

impl Explainer for OfflineExplainer {
    fn explain(&self, _shortlist: &[RecommendationRecord]) -> Result<String, UpstreamError> {
        Err(UpstreamError::Unavailable("model endpoint timed out".to_string()))
    }
}

pub(super) fn build_service(
    candidates: Vec<CandidateProfile>,
) -> (
    AllocationService<MemoryRepository, MemoryAudit>,
    MemoryRepository,
    MemoryAudit,
) {
    let repository = MemoryRepository::default();
    let audit = MemoryAudit::default();
    let service = AllocationService::new(
        Arc::new(repository.clone()),
        Arc::new(audit.clone()),
        Arc::new(StaticDirectory {
            project: PROJECT,
            candidates,
        }),
        Arc::new(FixedExtractor),
        Arc::new(StaticExplainer),
        ScoringConfig::default(),
        5,
    );
    (service, repository, audit)
}

pub(super) fn engine_router_with(
    candidates: Vec<CandidateProfile>,
    policies: Vec<Policy>,
) -> (axum::Router, MemoryRepository) {
    let (service, repository, _audit) = build_service(candidates);
    let state = Arc::new(EngineState {
        service,
        policies: std::sync::RwLock::new(registry_with(policies)),
    });
    (engine_router(state), repository)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
