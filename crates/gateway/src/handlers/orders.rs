//! Order handlers
//!
//! Any authenticated user may order. Non-staff callers only ever see and
//! delete their own orders; staff see everyone's and may filter by `?user=`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::extract::{ApiQuery, ValidJson};
use crate::AppState;
use airport_common::{
    auth::AuthContext,
    booking::place_order,
    db::inputs::OrderInput,
    errors::Result,
    pagination::{Page, PageRequest},
    projection::{project_page, OrderView, Project, ViewShape},
};

#[derive(Debug, Default, Deserialize)]
pub struct OrderQuery {
    /// Owning user filter
    pub user: Option<i32>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

/// Paginated orders, newest first
pub async fn list(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiQuery(query): ApiQuery<OrderQuery>,
) -> Result<Json<Page<OrderView>>> {
    let scope = auth.order_scope(query.user);
    let request = PageRequest {
        page: query.page,
        page_size: query.page_size,
    };

    let page = state.repo().list_orders(scope, &request).await?;
    Ok(Json(project_page(page)))
}

/// Order detail with every ticket's flight nested
pub async fn retrieve(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<i32>,
) -> Result<Json<OrderView>> {
    let owner = auth.order_scope(None).owner;
    let order = state.repo().order(id, owner, true).await?;
    Ok(Json(order.project(ViewShape::Detail)))
}

/// Book every requested ticket for the caller in one transaction
pub async fn create(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidJson(input): ValidJson<OrderInput>,
) -> Result<(StatusCode, Json<OrderView>)> {
    let order = place_order(&state.repo(), auth.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(order.project(ViewShape::Write))))
}

/// Cancel an order, releasing its seats
pub async fn destroy(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    let owner = auth.order_scope(None).owner;
    state.repo().delete_order(id, owner).await?;

    tracing::info!(order_id = id, user_id = auth.user_id, "Order deleted");
    Ok(StatusCode::NO_CONTENT)
}
