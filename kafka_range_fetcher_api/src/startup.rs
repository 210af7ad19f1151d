use crate::app_config::AppConfig;
use crate::fetch_api::{fetch_messages, AppState};
use anyhow::Context;
use axum::routing::post;
use axum::Router;
use http::HeaderName;
use kafka_range_fetcher::consumer::{KafkaTopicReaderFactory, TopicReaderFactory};
use tokio::net::TcpListener;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn create_router<F: TopicReaderFactory>(state: AppState<F>) -> Router {
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .route("/kafka/fetch", post(fetch_messages::<F>))
        .with_state(state)
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
}

pub async fn run_until_stopped(config: AppConfig) -> Result<(), anyhow::Error> {
    let address = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("While binding {address}"))?;
    info!("Listening {address}");

    let reader_factory = KafkaTopicReaderFactory::new(config.fetch.metadata_timeout());
    let state = AppState::new(reader_factory, config.fetch);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("While serving http")?;

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down"),
        Err(e) => error!("Error while listening for shutdown signal: {e:?}"),
    }
}
