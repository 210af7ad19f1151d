use crate::fetch_api::{EmptyResultDto, ErrorResponseDto};
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use kafka_range_fetcher::error::FetchError;
use tracing::{debug, error, info, warn};

#[derive(Debug)]
pub enum ApplicationError {
    InvalidArgument(String),
    Fetch(FetchError),
}

impl From<FetchError> for ApplicationError {
    fn from(value: FetchError) -> Self {
        ApplicationError::Fetch(value)
    }
}

impl IntoResponse for ApplicationError {
    fn into_response(self) -> Response {
        match self {
            ApplicationError::InvalidArgument(error) => {
                debug!("Invalid request: {error}");
                error_response(StatusCode::BAD_REQUEST, error)
            }
            ApplicationError::Fetch(e @ FetchError::TopicNotFound(_)) => {
                info!("{e}");
                error_response(StatusCode::NOT_FOUND, e.to_string())
            }
            ApplicationError::Fetch(e @ FetchError::NoMessagesInRange) => {
                info!("{e}");
                let body = EmptyResultDto {
                    message: e.to_string(),
                };
                (StatusCode::NOT_FOUND, Json(body)).into_response()
            }
            ApplicationError::Fetch(e @ FetchError::ConsumeTimeout { .. }) => {
                warn!("{e}");
                error_response(StatusCode::GATEWAY_TIMEOUT, e.to_string())
            }
            ApplicationError::Fetch(e) => {
                error!("{e:?}");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponseDto { error })).into_response()
}
