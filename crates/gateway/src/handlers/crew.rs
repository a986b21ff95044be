//! Crew member handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::extract::ValidJson;
use crate::AppState;
use airport_common::{
    auth::{Admin, AuthContext},
    db::inputs::{CrewChanges, CrewInput},
    errors::Result,
    projection::{project_all, CrewView, Project, ViewShape},
};

pub async fn list(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<Vec<CrewView>>> {
    let crew = state.repo().list_crew().await?;
    Ok(Json(project_all(&crew, ViewShape::List)))
}

pub async fn retrieve(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<i32>,
) -> Result<Json<CrewView>> {
    let member = state.repo().crew_member(id).await?;
    Ok(Json(member.project(ViewShape::Detail)))
}

pub async fn create(
    State(state): State<AppState>,
    _admin: Admin,
    ValidJson(input): ValidJson<CrewInput>,
) -> Result<(StatusCode, Json<CrewView>)> {
    let member = state.repo().create_crew_member(input).await?;
    Ok((StatusCode::CREATED, Json(member.project(ViewShape::Write))))
}

pub async fn update(
    State(state): State<AppState>,
    _admin: Admin,
    Path(id): Path<i32>,
    ValidJson(input): ValidJson<CrewInput>,
) -> Result<Json<CrewView>> {
    let member = state.repo().update_crew_member(id, input.into()).await?;
    Ok(Json(member.project(ViewShape::Write)))
}

pub async fn partial_update(
    State(state): State<AppState>,
    _admin: Admin,
    Path(id): Path<i32>,
    ValidJson(changes): ValidJson<CrewChanges>,
) -> Result<Json<CrewView>> {
    let member = state.repo().update_crew_member(id, changes).await?;
    Ok(Json(member.project(ViewShape::Write)))
}

pub async fn destroy(
    State(state): State<AppState>,
    _admin: Admin,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    state.repo().delete_crew_member(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
