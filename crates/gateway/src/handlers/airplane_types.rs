//! Airplane type handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::extract::ValidJson;
use crate::AppState;
use airport_common::{
    auth::{Admin, AuthContext},
    db::inputs::{AirplaneTypeChanges, AirplaneTypeInput},
    errors::Result,
    projection::{project_all, AirplaneTypeView, Project, ViewShape},
};

pub async fn list(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<Vec<AirplaneTypeView>>> {
    let types = state.repo().list_airplane_types().await?;
    Ok(Json(project_all(&types, ViewShape::List)))
}

pub async fn retrieve(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<i32>,
) -> Result<Json<AirplaneTypeView>> {
    let airplane_type = state.repo().airplane_type(id).await?;
    Ok(Json(airplane_type.project(ViewShape::Detail)))
}

pub async fn create(
    State(state): State<AppState>,
    _admin: Admin,
    ValidJson(input): ValidJson<AirplaneTypeInput>,
) -> Result<(StatusCode, Json<AirplaneTypeView>)> {
    let airplane_type = state.repo().create_airplane_type(input).await?;
    Ok((StatusCode::CREATED, Json(airplane_type.project(ViewShape::Write))))
}

pub async fn update(
    State(state): State<AppState>,
    _admin: Admin,
    Path(id): Path<i32>,
    ValidJson(input): ValidJson<AirplaneTypeInput>,
) -> Result<Json<AirplaneTypeView>> {
    let airplane_type = state.repo().update_airplane_type(id, input.into()).await?;
    Ok(Json(airplane_type.project(ViewShape::Write)))
}

pub async fn partial_update(
    State(state): State<AppState>,
    _admin: Admin,
    Path(id): Path<i32>,
    ValidJson(changes): ValidJson<AirplaneTypeChanges>,
) -> Result<Json<AirplaneTypeView>> {
    let airplane_type = state.repo().update_airplane_type(id, changes).await?;
    Ok(Json(airplane_type.project(ViewShape::Write)))
}

pub async fn destroy(
    State(state): State<AppState>,
    _admin: Admin,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    state.repo().delete_airplane_type(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
