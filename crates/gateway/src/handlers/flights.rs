//! Flight handlers

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
    db::inputs::{FlightChanges, FlightInput},
    db::FlightFilter,
    errors::{AppError, Result},
    projection::{project_all, FlightView, Project, ViewShape},
    timestamp,
};

/// Raw `?departure=&arrival=` parameters
#[derive(Debug, Default, Deserialize)]
pub struct FlightQuery {
    /// Only flights departing strictly after this instant
    pub departure: Option<String>,

    /// Only flights arriving strictly before this instant
    pub arrival: Option<String>,
}

impl FlightQuery {
    fn into_filter(self) -> Result<FlightFilter> {
        Ok(FlightFilter {
            departure_after: parse_bound("departure", self.departure)?,
            arrival_before: parse_bound("arrival", self.arrival)?,
        })
    }
}

fn parse_bound(
    field: &str,
    value: Option<String>,
) -> Result<Option<timestamp::DateTimeWithTimeZone>> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => timestamp::parse(raw)
            .map(Some)
            .ok_or_else(|| AppError::field(field, format!("Enter a valid date/time: {}", raw))),
    }
}

/// List flights, latest departure first
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiQuery(query): ApiQuery<FlightQuery>,
) -> Result<Json<Vec<FlightView>>> {
    let filter = query.into_filter()?;
    let flights = state.repo().list_flights(&filter).await?;
    Ok(Json(project_all(&flights, ViewShape::List)))
}

/// Flight detail with crew, route, airplane and taken seats
pub async fn retrieve(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<i32>,
) -> Result<Json<FlightView>> {
    let flight = state.repo().flight(id).await?;
    Ok(Json(flight.project(ViewShape::Detail)))
}

pub async fn create(
    State(state): State<AppState>,
    _admin: Admin,
    ValidJson(input): ValidJson<FlightInput>,
) -> Result<(StatusCode, Json<FlightView>)> {
    let flight = state.repo().create_flight(input).await?;
    Ok((StatusCode::CREATED, Json(flight.project(ViewShape::Write))))
}

pub async fn update(
    State(state): State<AppState>,
    _admin: Admin,
    Path(id): Path<i32>,
    ValidJson(input): ValidJson<FlightInput>,
) -> Result<Json<FlightView>> {
    let flight = state.repo().update_flight(id, input.into()).await?;
    Ok(Json(flight.project(ViewShape::Write)))
}

pub async fn partial_update(
    State(state): State<AppState>,
    _admin: Admin,
    Path(id): Path<i32>,
    ValidJson(changes): ValidJson<FlightChanges>,
) -> Result<Json<FlightView>> {
    let flight = state.repo().update_flight(id, changes).await?;
    Ok(Json(flight.project(ViewShape::Write)))
}

pub async fn destroy(
    State(state): State<AppState>,
    Admin(admin): Admin,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    state.repo().delete_flight(id).await?;

    tracing::info!(flight_id = id, user_id = admin.user_id, "Flight deleted");
    Ok(StatusCode::NO_CONTENT)
}
