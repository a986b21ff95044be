//! Airplane handlers
//!
//! `image` is ignored on create and update; it only changes through
//! `upload_image`.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};

use crate::extract::ValidJson;
use crate::AppState;
use airport_common::{
    auth::{Admin, AuthContext},
    db::inputs::{AirplaneChanges, AirplaneInput},
    errors::{AppError, Result},
    metrics::record_image_upload,
    projection::{project_all, AirplaneImageView, AirplaneView, Project, ViewShape},
};

/// Multipart field carrying the file
const IMAGE_FIELD: &str = "image";

pub async fn list(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<Vec<AirplaneView>>> {
    let airplanes = state.repo().list_airplanes().await?;
    Ok(Json(project_all(&airplanes, ViewShape::List)))
}

pub async fn retrieve(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<i32>,
) -> Result<Json<AirplaneView>> {
    let airplane = state.repo().airplane(id).await?;
    Ok(Json(airplane.project(ViewShape::Detail)))
}

pub async fn create(
    State(state): State<AppState>,
    _admin: Admin,
    ValidJson(input): ValidJson<AirplaneInput>,
) -> Result<(StatusCode, Json<AirplaneView>)> {
    let airplane = state.repo().create_airplane(input).await?;
    Ok((StatusCode::CREATED, Json(airplane.project(ViewShape::Write))))
}

pub async fn update(
    State(state): State<AppState>,
    _admin: Admin,
    Path(id): Path<i32>,
    ValidJson(input): ValidJson<AirplaneInput>,
) -> Result<Json<AirplaneView>> {
    let airplane = state.repo().update_airplane(id, input.into()).await?;
    Ok(Json(airplane.project(ViewShape::Write)))
}

pub async fn partial_update(
    State(state): State<AppState>,
    _admin: Admin,
    Path(id): Path<i32>,
    ValidJson(changes): ValidJson<AirplaneChanges>,
) -> Result<Json<AirplaneView>> {
    let airplane = state.repo().update_airplane(id, changes).await?;
    Ok(Json(airplane.project(ViewShape::Write)))
}

pub async fn destroy(
    State(state): State<AppState>,
    _admin: Admin,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    state.repo().delete_airplane(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Store an uploaded image and point the airplane at it
pub async fn upload_image(
    State(state): State<AppState>,
    Admin(admin): Admin,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<AirplaneImageView>> {
    let repo = state.repo();
    let airplane = repo.airplane(id).await?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| AppError::InvalidFormat {
        message: e.body_text(),
    })? {
        if field.name() == Some(IMAGE_FIELD) {
            let bytes = field.bytes().await.map_err(|e| AppError::InvalidFormat {
                message: e.body_text(),
            })?;
            upload = Some(bytes);
            break;
        }
    }

    let bytes = upload
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| AppError::MissingField {
            field: IMAGE_FIELD.to_string(),
        })?;

    let limit = state.config.media.max_upload_bytes;
    if bytes.len() > limit {
        return Err(AppError::PayloadTooLarge {
            size: bytes.len(),
            limit,
        });
    }

    let stored = state
        .images
        .save(&airplane.airplane.name, bytes.to_vec())
        .await?;
    let airplane = repo.set_airplane_image(id, stored.url).await?;
    record_image_upload();

    tracing::info!(
        airplane_id = id,
        user_id = admin.user_id,
        image = ?airplane.airplane.image,
        "Airplane image uploaded"
    );

    Ok(Json(AirplaneImageView::from(&airplane)))
}
