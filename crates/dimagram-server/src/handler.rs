use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Json;
use dimagram_ingest::IngestError;
use dimagram_publish::{PublishResult, TransitionReport};
use dimagram_types::AlbumItem;
use futures::TryStreamExt;
use serde::Serialize;
use serde_json::json;
use tokio_util::io::StreamReader;
use tracing::info;

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// Multipart field carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct TransitionResponse {
    pub status: &'static str,
    pub message: String,
    pub item: AlbumItem,
    pub pointer: Option<AlbumItem>,
    /// Advisory failures, e.g. a CDN purge that did not go through.
    pub warnings: Vec<String>,
}

impl TransitionResponse {
    fn new(message: &str, report: TransitionReport) -> Self {
        Self {
            status: "ok",
            message: message.to_string(),
            warnings: report.advisories.into_iter().map(|a| a.message).collect(),
            item: report.item,
            pointer: report.pointer,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn info_handler() -> Json<serde_json::Value> {
    Json(json!({
        "name": "dimagram-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// The Queue, in publish order.
pub async fn album_handler(State(state): State<AppState>) -> ServerResult<Json<Vec<AlbumItem>>> {
    Ok(Json(state.ledger().queue().await?))
}

/// Replace the Queue with the posted document.
pub async fn replace_album_handler(
    State(state): State<AppState>,
    body: Result<Json<Vec<AlbumItem>>, JsonRejection>,
) -> ServerResult<Json<serde_json::Value>> {
    let Json(queue) = body.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    state.ledger().replace_queue(queue).await?;
    Ok(Json(json!({ "status": "ok" })))
}

pub async fn archive_handler(State(state): State<AppState>) -> ServerResult<Json<Vec<AlbumItem>>> {
    Ok(Json(state.ledger().archive().await?))
}

pub async fn publish_handler(State(state): State<AppState>) -> ServerResult<Json<TransitionResponse>> {
    transition("Successfully published", state.publisher.publish().await)
}

pub async fn unpublish_handler(State(state): State<AppState>) -> ServerResult<Json<TransitionResponse>> {
    transition("Successfully unpublished", state.publisher.unpublish().await)
}

fn transition(message: &str, result: PublishResult<TransitionReport>) -> ServerResult<Json<TransitionResponse>> {
    Ok(Json(TransitionResponse::new(message, result?)))
}

/// Ingest the `file` field of a multipart upload. Other fields are ignored.
pub async fn upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ServerResult<Json<UploadResponse>> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let hint = field.file_name().unwrap_or_default().to_string();
        let body = field.map_err(std::io::Error::other);
        let content = state
            .ingestor
            .ingest(StreamReader::new(Box::pin(body)), &hint)
            .await
            .map_err(upload_error)?;
        info!(file = %hint, url = %content.url, "upload stored");
        return Ok(Json(UploadResponse { url: content.url }));
    }
    Err(ServerError::BadRequest(format!("missing multipart field \"{UPLOAD_FIELD}\"")))
}

fn multipart_error(e: MultipartError) -> ServerError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::PayloadTooLarge(e.body_text())
    } else {
        ServerError::BadRequest(e.body_text())
    }
}

/// A field stream that trips the request body limit surfaces as a read error
/// inside ingestion; report it as the multipart failure it is.
fn upload_error(e: IngestError) -> ServerError {
    if let IngestError::LocalIo { source, .. } = &e {
        if let Some(multipart) = source.get_ref().and_then(|inner| inner.downcast_ref::<MultipartError>()) {
            let status = multipart.status();
            if status == StatusCode::PAYLOAD_TOO_LARGE {
                return ServerError::PayloadTooLarge(multipart.body_text());
            }
            if status.is_client_error() {
                return ServerError::BadRequest(multipart.body_text());
            }
        }
    }
    ServerError::Ingest(e)
}
