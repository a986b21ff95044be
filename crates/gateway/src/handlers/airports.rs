//! Airport handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::extract::{ApiQuery, ValidJson};
use crate::AppState;
use airport_common::{
    auth::{Admin, AuthContext},
    db::inputs::{AirportChanges, AirportInput},
    db::AirportFilter,
    errors::Result,
    projection::{project_all, AirportView, Project, ViewShape},
};

/// List airports, filtered by `?name=` and `?country=`
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiQuery(filter): ApiQuery<AirportFilter>,
) -> Result<Json<Vec<AirportView>>> {
    let airports = state.repo().list_airports(&filter).await?;
    Ok(Json(project_all(&airports, ViewShape::List)))
}

pub async fn retrieve(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<i32>,
) -> Result<Json<AirportView>> {
    let airport = state.repo().airport(id).await?;
    Ok(Json(airport.project(ViewShape::Detail)))
}

pub async fn create(
    State(state): State<AppState>,
    _admin: Admin,
    ValidJson(input): ValidJson<AirportInput>,
) -> Result<(StatusCode, Json<AirportView>)> {
    let airport = state.repo().create_airport(input).await?;
    Ok((StatusCode::CREATED, Json(airport.project(ViewShape::Write))))
}

pub async fn update(
    State(state): State<AppState>,
    _admin: Admin,
    Path(id): Path<i32>,
    ValidJson(input): ValidJson<AirportInput>,
) -> Result<Json<AirportView>> {
    let airport = state.repo().update_airport(id, input.into()).await?;
    Ok(Json(airport.project(ViewShape::Write)))
}

pub async fn partial_update(
    State(state): State<AppState>,
    _admin: Admin,
    Path(id): Path<i32>,
    ValidJson(changes): ValidJson<AirportChanges>,
) -> Result<Json<AirportView>> {
    let airport = state.repo().update_airport(id, changes).await?;
    Ok(Json(airport.project(ViewShape::Write)))
}

pub async fn destroy(
    State(state): State<AppState>,
    Admin(admin): Admin,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    state.repo().delete_airport(id).await?;

    tracing::info!(airport_id = id, user_id = admin.user_id, "Airport deleted");
    Ok(StatusCode::NO_CONTENT)
}
