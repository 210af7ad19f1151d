use crate::app_config::FetchSettings;
use crate::error::ApplicationError;
use crate::fetch_api::{
    dto_fetch_request_to_internal, time_range_response_to_dto, FetchRequestDto, FetchResponseDto,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use kafka_range_fetcher::consumer::TopicReaderFactory;
use kafka_range_fetcher::queries::read_time_range::read_time_range;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub struct AppState<F> {
    pub reader_factory: Arc<F>,
    pub fetch_settings: Arc<FetchSettings>,
}

impl<F> AppState<F> {
    pub fn new(reader_factory: F, fetch_settings: FetchSettings) -> Self {
        Self {
            reader_factory: Arc::new(reader_factory),
            fetch_settings: Arc::new(fetch_settings),
        }
    }
}

impl<F> Clone for AppState<F> {
    fn clone(&self) -> Self {
        Self {
            reader_factory: self.reader_factory.clone(),
            fetch_settings: self.fetch_settings.clone(),
        }
    }
}

#[tracing::instrument(skip_all)]
pub async fn fetch_messages<F: TopicReaderFactory>(
    State(state): State<AppState<F>>,
    payload: Result<Json<FetchRequestDto>, JsonRejection>,
) -> Result<Json<FetchResponseDto>, ApplicationError> {
    let Json(request) =
        payload.map_err(|e| ApplicationError::InvalidArgument(e.body_text()))?;
    debug!("New request: {:?}", request);

    let query = dto_fetch_request_to_internal(request, &state.fetch_settings)?;
    debug!("Mapped request: {:?}", query);

    // Dropping the handler future (client went away) cancels the blocking read.
    let cancellation_token = CancellationToken::new();
    let _guard = cancellation_token.clone().drop_guard();

    let response =
        read_time_range(state.reader_factory.clone(), query, cancellation_token).await?;

    Ok(Json(time_range_response_to_dto(response)))
}
