//! Customer endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use salon_common::{Customer, CustomerId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::{parse_id, present, ApiError, AppState, SearchQuery};
use crate::pagination::Page;

/// Body for create and update
#[derive(Debug, Deserialize)]
pub struct CustomerRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CustomerListQuery {
    pub name: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CustomerPage {
    pub customers: Vec<Customer>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
}

pub async fn create_customer_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CustomerRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    info!("Creating customer: {}", payload.email);

    let customer = state
        .customers
        .create(payload.name, payload.email, payload.phone)
        .await?;

    Ok((StatusCode::CREATED, Json(customer)))
}

/// `?name=` returns the matching customers as a bare array; otherwise paged.
pub async fn list_customers_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CustomerListQuery>,
) -> Result<Response, ApiError> {
    if let Some(name) = present(&query.name) {
        let matches = state.customers.search_by_name(name).await?;
        return Ok(Json(matches).into_response());
    }

    let page = Page::from_query(query.page.as_deref(), query.limit.as_deref());
    let all = state.customers.list().await?;
    let total = all.len();

    Ok(Json(CustomerPage {
        customers: page.slice(all),
        total,
        page: page.page,
        limit: page.limit,
    })
    .into_response())
}

pub async fn get_customer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Customer>, ApiError> {
    let id: CustomerId = parse_id(&id, "customer")?;
    Ok(Json(state.customers.get(id).await?))
}

pub async fn get_customer_by_email_handler(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Result<Json<Customer>, ApiError> {
    Ok(Json(state.customers.get_by_email(&email).await?))
}

pub async fn search_customers_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Customer>>, ApiError> {
    let found = state.customers.search(&query.q, query.limit()).await?;
    Ok(Json(found))
}

pub async fn count_customers_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let count = state.customers.count().await?;
    Ok(Json(serde_json::json!({ "count": count })))
}

pub async fn update_customer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<CustomerRequest>, JsonRejection>,
) -> Result<Json<Customer>, ApiError> {
    let id: CustomerId = parse_id(&id, "customer")?;
    let Json(payload) = payload?;
    info!("Updating customer: {}", id);

    let customer = state
        .customers
        .update(id, payload.name, payload.email, payload.phone)
        .await?;
    Ok(Json(customer))
}

pub async fn delete_customer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: CustomerId = parse_id(&id, "customer")?;
    info!("Deleting customer: {}", id);

    state.customers.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
