//! Staff endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use salon_common::{Staff, StaffId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::{parse_id, present, ApiError, AppState, SearchQuery};
use crate::pagination::Page;

#[derive(Debug, Deserialize)]
pub struct StaffRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct StaffListQuery {
    pub role: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StaffPage {
    pub staff: Vec<Staff>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
}

pub async fn create_staff_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<StaffRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    info!("Creating staff: {} ({})", payload.email, payload.role);

    let staff = state
        .staff
        .create(payload.name, payload.email, payload.role, payload.phone)
        .await?;

    Ok((StatusCode::CREATED, Json(staff)))
}

/// `?role=` returns that role's staff as a bare array; otherwise paged.
pub async fn list_staff_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StaffListQuery>,
) -> Result<Response, ApiError> {
    if let Some(role) = present(&query.role) {
        return Ok(Json(state.staff.list_by_role(role).await?).into_response());
    }

    let page = Page::from_query(query.page.as_deref(), query.limit.as_deref());
    let all = state.staff.list().await?;
    let total = all.len();

    Ok(Json(StaffPage {
        staff: page.slice(all),
        total,
        page: page.page,
        limit: page.limit,
    })
    .into_response())
}

pub async fn get_staff_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Staff>, ApiError> {
    let id: StaffId = parse_id(&id, "staff")?;
    Ok(Json(state.staff.get(id).await?))
}

pub async fn get_staff_by_email_handler(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Result<Json<Staff>, ApiError> {
    Ok(Json(state.staff.get_by_email(&email).await?))
}

pub async fn staff_roles_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let roles = state.staff.roles().await?;
    Ok(Json(serde_json::json!({ "roles": roles })))
}

pub async fn search_staff_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Staff>>, ApiError> {
    Ok(Json(state.staff.search(&query.q, query.limit()).await?))
}

pub async fn count_staff_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let count = state.staff.count().await?;
    Ok(Json(serde_json::json!({ "count": count })))
}

pub async fn update_staff_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<StaffRequest>, JsonRejection>,
) -> Result<Json<Staff>, ApiError> {
    let id: StaffId = parse_id(&id, "staff")?;
    let Json(payload) = payload?;
    info!("Updating staff: {}", id);

    let staff = state
        .staff
        .update(id, payload.name, payload.email, payload.role, payload.phone)
        .await?;
    Ok(Json(staff))
}

pub async fn delete_staff_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: StaffId = parse_id(&id, "staff")?;
    info!("Deleting staff: {}", id);

    state.staff.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
