use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryExchangeStore, LogNotifier};
use crate::routes::with_exchange_routes;
use axum::{Extension, Router};
use axum_prometheus::PrometheusMetricLayer;
use secret_santa::config::AppConfig;
use secret_santa::error::AppError;
use secret_santa::exchange::{ExchangeStore, JsonFileStore, SecretSantaService};
use secret_santa::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

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
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let routes = if args.in_memory {
        info!("exchange kept in memory");
        exchange_app(&config, InMemoryExchangeStore::default())
    } else {
        info!(path = %config.storage.data_path.display(), "exchange persisted to json file");
        exchange_app(&config, JsonFileStore::new(config.storage.data_path.clone()))
    };

    let app = routes.layer(Extension(app_state)).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        max_attempts = config.draw.max_attempts,
        "secret santa service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

fn exchange_app<S>(config: &AppConfig, store: S) -> Router
where
    S: ExchangeStore + 'static,
{
    let service = Arc::new(SecretSantaService::new(
        Arc::new(store),
        Arc::new(LogNotifier),
        config.draw.engine(),
        config.notifications.settings(),
    ));
    with_exchange_routes(service)
}
