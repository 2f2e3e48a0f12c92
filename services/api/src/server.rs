use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryNominationRepository};
use crate::routes::with_nomination_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use nomination_engine::config::AppConfig;
use nomination_engine::error::AppError;
use nomination_engine::telemetry;
use nomination_engine::workflows::nomination::{FactorWeights, NominationService};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

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

    let default_weights = FactorWeights::from(&config.ranking);
    for warning in default_weights.warnings() {
        warn!("default {}", warning.summary());
    }

    let repository = Arc::new(InMemoryNominationRepository::default());
    let nomination_service = Arc::new(NominationService::new(repository, default_weights));

    let app = with_nomination_routes(nomination_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        cost_weight = default_weights.cost_weight,
        development_cost_weight = default_weights.development_cost_weight,
        lead_time_weight = default_weights.lead_time_weight,
        "nomination ranking service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
