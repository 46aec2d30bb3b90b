use crate::cli::ServeArgs;
use crate::infra::{load_statistics, weight_resolver, AppState, OfflineGenerator};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use climate_risk::assessment::{
    AssessmentOrchestrator, GenerationClient, OpenAiGenerationClient, RetryPolicy,
    SectorStatisticsProvider,
};
use climate_risk::config::{AppConfig, ConfigError};
use climate_risk::error::AppError;
use climate_risk::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
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

    let resolver = weight_resolver()?;
    let statistics = Arc::new(load_statistics(
        args.profiles_csv.as_deref(),
        args.scenarios_csv.as_deref(),
    )?);
    let retry = RetryPolicy::from_config(&config.generation);

    if args.offline {
        warn!("serving with the offline generator; scores are synthetic");
        let orchestrator =
            AssessmentOrchestrator::new(Arc::new(OfflineGenerator), statistics, resolver)
                .with_retry_policy(retry);
        return serve(config, orchestrator).await;
    }

    let client = OpenAiGenerationClient::from_config(&config.generation)?;
    if !client.is_configured() {
        return Err(ConfigError::MissingCredential {
            variable: "GENERATION_API_KEY",
        }
        .into());
    }
    info!(model = %config.generation.model, "generation client configured");
    let orchestrator = AssessmentOrchestrator::new(Arc::new(client), statistics, resolver)
        .with_retry_policy(retry);
    serve(config, orchestrator).await
}

async fn serve<G, S>(
    config: AppConfig,
    orchestrator: AssessmentOrchestrator<G, S>,
) -> Result<(), AppError>
where
    G: GenerationClient + 'static,
    S: SectorStatisticsProvider + 'static,
{
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        weight_table_version: orchestrator.resolver().table().version().to_string(),
    };

    let app = with_service_routes(Arc::new(orchestrator))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "climate risk engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}
