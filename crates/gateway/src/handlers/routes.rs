//! Route handlers
//!
//! Source and destination may name the same airport.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::extract::ValidJson;
use crate::AppState;
use airport_common::{
    auth::{Admin, AuthContext},
    db::inputs::{RouteChanges, RouteInput},
    errors::Result,
    projection::{project_all, Project, RouteView, ViewShape},
};

pub async fn list(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<Vec<RouteView>>> {
    let routes = state.repo().list_routes().await?;
    Ok(Json(project_all(&routes, ViewShape::List)))
}

pub async fn retrieve(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<i32>,
) -> Result<Json<RouteView>> {
    let route = state.repo().route(id).await?;
    Ok(Json(route.project(ViewShape::Detail)))
}

pub async fn create(
    State(state): State<AppState>,
    _admin: Admin,
    ValidJson(input): ValidJson<RouteInput>,
) -> Result<(StatusCode, Json<RouteView>)> {
    let route = state.repo().create_route(input).await?;
    Ok((StatusCode::CREATED, Json(route.project(ViewShape::Write))))
}

pub async fn update(
    State(state): State<AppState>,
    _admin: Admin,
    Path(id): Path<i32>,
    ValidJson(input): ValidJson<RouteInput>,
) -> Result<Json<RouteView>> {
    let route = state.repo().update_route(id, input.into()).await?;
    Ok(Json(route.project(ViewShape::Write)))
}

pub async fn partial_update(
    State(state): State<AppState>,
    _admin: Admin,
    Path(id): Path<i32>,
    ValidJson(changes): ValidJson<RouteChanges>,
) -> Result<Json<RouteView>> {
    let route = state.repo().update_route(id, changes).await?;
    Ok(Json(route.project(ViewShape::Write)))
}

pub async fn destroy(
    State(state): State<AppState>,
    _admin: Admin,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    state.repo().delete_route(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
