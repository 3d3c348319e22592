use std::sync::Arc;

use chrono::Utc;
use clap::Args;

use team_alloc::allocation::{
    AllocationRequest, AllocationService, AllocationServiceError, PolicyRegistry, ProjectId,
    RecommendationRepository, ReviewRequest, ScoringConfig,
};
use team_alloc::config::AppConfig;
use team_alloc::error::AppError;

use crate::infra::{
    default_policies, seeded_directory, InMemoryRecommendationStore, KeywordExtractor,
    TemplateExplainer, TracingAuditTrail,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Seeded project to allocate (defaults to the first seeded project)
    #[arg(long)]
    pub(crate) project: Option<u32>,
    /// Requested shortlist size
    #[arg(long)]
    pub(crate) team_size: Option<i64>,
    /// Auto-approve the top recommendation during the run
    #[arg(long)]
    pub(crate) auto_assign: bool,
    /// Print the audit trail at the end of the demo
    #[arg(long)]
    pub(crate) show_audit: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;

    let store = InMemoryRecommendationStore::default();
    let audit = TracingAuditTrail::default();
    let directory = seeded_directory();
    let project = args
        .project
        .map(ProjectId)
        .or_else(|| directory.project_ids().first().copied())
        .ok_or_else(|| {
            AllocationServiceError::Validation("no seeded projects available".to_string())
        })?;

    let service = AllocationService::new(
        Arc::new(store.clone()),
        Arc::new(audit.clone()),
        Arc::new(directory),
        Arc::new(KeywordExtractor),
        Arc::new(TemplateExplainer),
        ScoringConfig::default().with_compliance_floor(config.engine.compliance_floor),
        config.engine.shortlist_floor,
    );
    let registry = PolicyRegistry::from_policies(default_policies())
        .map_err(AllocationServiceError::Policy)?;

    println!(
        "Team allocation demo ({})",
        Utc::now().format("%Y-%m-%d %H:%M UTC")
    );
    println!("Active policies:");
    for policy in registry.active_policies() {
        println!("  - {} ({}, priority {})", policy.name, policy.kind, policy.priority);
    }

    let records = service.recommend(
        project,
        &registry,
        AllocationRequest {
            team_size_hint: args.team_size,
            auto_assign: args.auto_assign,
            notify_email: None,
        },
    )?;

    println!("\nShortlist for project {}:", project.0);
    for record in &records {
        println!(
            "  {} employee {} | match {:.1} | compliance {:.1} | final {:.1} | {}",
            record.id,
            record.employee_id.0,
            record.match_score,
            record.compliance_score,
            record.final_score,
            record.status.label()
        );
        for violation in &record.violations {
            println!("      violation: {violation}");
        }
    }
    if let Some(annotation) = records.first().and_then(|r| r.annotation.as_deref()) {
        println!("  {annotation}");
    }

    if !args.auto_assign {
        if let Some(top) = records.first() {
            let approved = service.review(
                &top.id,
                ReviewRequest {
                    action: "approve".to_string(),
                    feedback: Some("approved during demo run".to_string()),
                    reviewer_id: Some(1),
                },
            )?;
            println!(
                "\nApproved {} -> status {}",
                approved.id,
                approved.status.label()
            );
        }
    }

    let assignments = store
        .assignments(project)
        .map_err(AllocationServiceError::Repository)?;
    println!("\nAssignments:");
    for assignment in &assignments {
        println!(
            "  employee {} -> project {}",
            assignment.employee_id.0, assignment.project_id.0
        );
    }
    if assignments.is_empty() {
        println!("  (none)");
    }

    if args.show_audit {
        let entries = audit.entries();
        println!(
            "\nAudit trail:\n{}",
            serde_json::to_string_pretty(&entries).unwrap_or_else(|_| "[]".to_string())
        );
    }

    Ok(())
}
