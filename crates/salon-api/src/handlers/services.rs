//! Salon service catalog endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use salon_common::{SalonService, ServiceId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::{parse_id, present, ApiError, AppState, SearchQuery};
use crate::pagination::Page;

#[derive(Debug, Deserialize)]
pub struct ServiceRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServiceListQuery {
    pub category: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ServicePage {
    pub services: Vec<SalonService>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
}

pub async fn create_service_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ServiceRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    info!("Creating service: {} ({})", payload.name, payload.price);

    let service = state
        .services
        .create(payload.name, payload.description, payload.category, payload.price)
        .await?;

    Ok((StatusCode::CREATED, Json(service)))
}

/// `?category=` returns that category as a bare array; otherwise paged.
pub async fn list_services_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ServiceListQuery>,
) -> Result<Response, ApiError> {
    if let Some(category) = present(&query.category) {
        return Ok(Json(state.services.list_by_category(category).await?).into_response());
    }

    let page = Page::from_query(query.page.as_deref(), query.limit.as_deref());
    let all = state.services.list().await?;
    let total = all.len();

    Ok(Json(ServicePage {
        services: page.slice(all),
        total,
        page: page.page,
        limit: page.limit,
    })
    .into_response())
}

pub async fn get_service_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SalonService>, ApiError> {
    let id: ServiceId = parse_id(&id, "service")?;
    Ok(Json(state.services.get(id).await?))
}

pub async fn service_categories_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let categories = state.services.categories().await?;
    Ok(Json(serde_json::json!({ "categories": categories })))
}

pub async fn search_services_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<SalonService>>, ApiError> {
    Ok(Json(state.services.search(&query.q, query.limit()).await?))
}

pub async fn count_services_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let count = state.services.count().await?;
    Ok(Json(serde_json::json!({ "count": count })))
}

pub async fn update_service_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<ServiceRequest>, JsonRejection>,
) -> Result<Json<SalonService>, ApiError> {
    let id: ServiceId = parse_id(&id, "service")?;
    let Json(payload) = payload?;
    info!("Updating service: {}", id);

    let service = state
        .services
        .update(
            id,
            payload.name,
            payload.description,
            payload.category,
            payload.price,
        )
        .await?;
    Ok(Json(service))
}

pub async fn delete_service_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: ServiceId = parse_id(&id, "service")?;
    info!("Deleting service: {}", id);

    state.services.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
