//! HTTP request handlers

use crate::api::server::AppContext;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use base64::prelude::{Engine, BASE64_STANDARD};
use closet_common::model::{OutfitView, WardrobeView};
use closet_common::Error;
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Deserialize)]
pub struct NewWardrobeRequest {
    pub description: String,
    /// base64-encoded image bytes
    pub main_image: String,
    /// base64-encoded image bytes
    pub label_image: String,
}

#[derive(Debug, Deserialize)]
pub struct NewOutfitRequest {
    pub top_id: Uuid,
    pub bottom_id: Uuid,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct AddedResponse {
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Handler-level error: a status code plus a JSON error body.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn unprocessable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: message.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match &err {
            Error::UserNotFound { .. }
            | Error::ItemNotFound { .. }
            | Error::NoSuchFileOrDirectory { .. }
            | Error::EmptyCloset
            | Error::EmptyOutfits => StatusCode::NOT_FOUND,
            Error::DuplicateFile { .. } => StatusCode::CONFLICT,
            Error::RepositoryUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("request failed: {}", err);
        }
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "closetd".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn add_wardrobe(
    State(ctx): State<AppContext>,
    Path(username): Path<String>,
    Json(req): Json<NewWardrobeRequest>,
) -> Result<Json<AddedResponse>, ApiError> {
    let main_image = BASE64_STANDARD
        .decode(&req.main_image)
        .map_err(|e| ApiError::unprocessable(format!("invalid main_image: {}", e)))?;
    let label_image = BASE64_STANDARD
        .decode(&req.label_image)
        .map_err(|e| ApiError::unprocessable(format!("invalid label_image: {}", e)))?;

    let id = ctx
        .service
        .add_wardrobe(&username, &req.description, &main_image, &label_image)
        .await?;

    Ok(Json(AddedResponse { id }))
}

pub async fn get_all_wardrobe(
    State(ctx): State<AppContext>,
    Path(username): Path<String>,
) -> Result<Json<Vec<WardrobeView>>, ApiError> {
    Ok(Json(ctx.service.get_all_wardrobe(&username).await?))
}

pub async fn get_wardrobe(
    State(ctx): State<AppContext>,
    Path((username, id)): Path<(String, Uuid)>,
) -> Result<Json<WardrobeView>, ApiError> {
    Ok(Json(ctx.service.get_wardrobe(&username, id).await?))
}

pub async fn delete_wardrobe(
    State(ctx): State<AppContext>,
    Path((username, id)): Path<(String, Uuid)>,
) -> Result<StatusCode, ApiError> {
    ctx.service.delete_wardrobe(&username, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Serve raw image bytes through the content repository's handler-based
/// retrieval.
pub async fn get_file(
    State(ctx): State<AppContext>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let mut bytes: Option<Vec<u8>> = None;
    ctx.service
        .get_file(
            &filename,
            Box::new(|path| {
                bytes = Some(std::fs::read(path)?);
                Ok(())
            }),
        )
        .await?;

    let bytes = bytes.unwrap_or_default();
    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        bytes,
    )
        .into_response())
}

pub async fn add_outfit(
    State(ctx): State<AppContext>,
    Path(username): Path<String>,
    Json(req): Json<NewOutfitRequest>,
) -> Result<Json<AddedResponse>, ApiError> {
    let id = ctx
        .service
        .add_outfit(&username, req.top_id, req.bottom_id, &req.description)
        .await?;

    Ok(Json(AddedResponse { id }))
}

pub async fn get_all_outfits(
    State(ctx): State<AppContext>,
    Path(username): Path<String>,
) -> Result<Json<Vec<OutfitView>>, ApiError> {
    Ok(Json(ctx.service.get_all_outfits(&username).await?))
}

pub async fn get_outfit(
    State(ctx): State<AppContext>,
    Path((username, id)): Path<(String, Uuid)>,
) -> Result<Json<OutfitView>, ApiError> {
    Ok(Json(ctx.service.get_outfit(&username, id).await?))
}

pub async fn delete_outfit(
    State(ctx): State<AppContext>,
    Path((username, id)): Path<(String, Uuid)>,
) -> Result<StatusCode, ApiError> {
    ctx.service.delete_outfit(&username, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
