//! Country handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::extract::{ApiQuery, ValidJson};
use crate::AppState;
use airport_common::{
    auth::{Admin, AuthContext},
    db::inputs::{CountryChanges, CountryInput},
    errors::Result,
    projection::{project_all, CountryView, Project, ViewShape},
};

#[derive(Debug, Default, Deserialize)]
pub struct CountryQuery {
    /// Case-insensitive name fragment
    pub name: Option<String>,
}

/// List countries
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiQuery(query): ApiQuery<CountryQuery>,
) -> Result<Json<Vec<CountryView>>> {
    let countries = state.repo().list_countries(query.name).await?;
    Ok(Json(project_all(&countries, ViewShape::List)))
}

/// Get a country by ID
pub async fn retrieve(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<i32>,
) -> Result<Json<CountryView>> {
    let country = state.repo().country(id).await?;
    Ok(Json(country.project(ViewShape::Detail)))
}

/// Create a country
pub async fn create(
    State(state): State<AppState>,
    _admin: Admin,
    ValidJson(input): ValidJson<CountryInput>,
) -> Result<(StatusCode, Json<CountryView>)> {
    let country = state.repo().create_country(input).await?;
    Ok((StatusCode::CREATED, Json(country.project(ViewShape::Write))))
}

/// Replace a country
pub async fn update(
    State(state): State<AppState>,
    _admin: Admin,
    Path(id): Path<i32>,
    ValidJson(input): ValidJson<CountryInput>,
) -> Result<Json<CountryView>> {
    let country = state.repo().update_country(id, input.into()).await?;
    Ok(Json(country.project(ViewShape::Write)))
}

/// Change some fields of a country
pub async fn partial_update(
    State(state): State<AppState>,
    _admin: Admin,
    Path(id): Path<i32>,
    ValidJson(changes): ValidJson<CountryChanges>,
) -> Result<Json<CountryView>> {
    let country = state.repo().update_country(id, changes).await?;
    Ok(Json(country.project(ViewShape::Write)))
}

/// Delete a country and everything that hangs off it
pub async fn destroy(
    State(state): State<AppState>,
    Admin(admin): Admin,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    state.repo().delete_country(id).await?;

    tracing::info!(country_id = id, user_id = admin.user_id, "Country deleted");
    Ok(StatusCode::NO_CONTENT)
}
