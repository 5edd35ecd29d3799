use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use dimagram_ingest::IngestError;
use dimagram_publish::PublishError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("request body too large: {0}")]
    PayloadTooLarge(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Publish(PublishError::EmptyQueue | PublishError::EmptyArchive) => StatusCode::CONFLICT,
            Self::Publish(PublishError::DuplicateId { .. }) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Ingest(IngestError::TooLarge { .. }) | Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use dimagram_types::ItemId;

    #[test]
    fn status_mapping() {
        assert_eq!(ServerError::from(PublishError::EmptyQueue).status(), StatusCode::CONFLICT);
        assert_eq!(ServerError::from(PublishError::EmptyArchive).status(), StatusCode::CONFLICT);
        assert_eq!(
            ServerError::from(PublishError::DuplicateId { id: ItemId::from(1) }).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServerError::from(IngestError::TooLarge { limit: 1 }).status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ServerError::PayloadTooLarge("x".into()).status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ServerError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
