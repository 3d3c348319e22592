use std::sync::atomic::Ordering;
use std::sync::{Arc, RwLock};

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use tracing::info;

use team_alloc::allocation::{
    AllocationService, AllocationServiceError, EngineState, PolicyRegistry, ScoringConfig,
};
use team_alloc::config::AppConfig;
use team_alloc::error::AppError;
use team_alloc::telemetry;

use crate::cli::ServeArgs;
use crate::infra::{
    default_policies, seeded_directory, AppState, InMemoryRecommendationStore, KeywordExtractor,
    TemplateExplainer, TracingAuditTrail,
};
use crate::routes::with_engine_routes;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = AllocationService::new(
        Arc::new(InMemoryRecommendationStore::default()),
        Arc::new(TracingAuditTrail::default()),
        Arc::new(seeded_directory()),
        Arc::new(KeywordExtractor),
        Arc::new(TemplateExplainer),
        ScoringConfig::default().with_compliance_floor(config.engine.compliance_floor),
        config.engine.shortlist_floor,
    );
    let policies = PolicyRegistry::from_policies(default_policies())
        .map_err(AllocationServiceError::Policy)?;
    let engine_state = Arc::new(EngineState {
        service,
        policies: RwLock::new(policies),
    });

    let app = with_engine_routes(engine_state)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "team allocation engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}
