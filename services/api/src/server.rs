use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_evaluation_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use resource_eval::config::AppConfig;
use resource_eval::error::AppError;
use resource_eval::evaluations::{
    EvaluationService, EvaluationStore, InMemoryEvaluationStore, JsonFileEvaluationStore,
    SystemClock,
};
use resource_eval::telemetry;
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
    if let Some(path) = args.data_path.take() {
        config.storage.data_path = Some(path);
    }

    telemetry::init(&config.telemetry)?;

    match config.storage.data_path.clone() {
        Some(path) => {
            let store = JsonFileEvaluationStore::open(&path)?;
            info!(path = %path.display(), "evaluations persisted to json document");
            serve(config, Arc::new(store)).await
        }
        None => {
            warn!("APP_DATA_PATH not set; evaluations are kept in memory only");
            serve(config, Arc::new(InMemoryEvaluationStore::new())).await
        }
    }
}

async fn serve<S>(config: AppConfig, store: Arc<S>) -> Result<(), AppError>
where
    S: EvaluationStore + 'static,
{
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = Arc::new(EvaluationService::new(store, Arc::new(SystemClock)));

    let app = with_evaluation_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "resource evaluation service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
