//! API request handlers for the Salon API

pub mod appointments;
pub mod customers;
pub mod services;
pub mod staff;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{NaiveDate, NaiveTime, Utc};
use salon_common::Error;
use salon_core::{
    AppointmentService, CustomerDirectory, Repositories, ServiceCatalog, StaffDirectory,
};
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use tracing::error;

use crate::SERVICE_NAME;

/// Shared application state
pub struct AppState {
    pub customers: Arc<CustomerDirectory>,
    pub staff: Arc<StaffDirectory>,
    pub services: Arc<ServiceCatalog>,
    pub appointments: Arc<AppointmentService>,
}

impl AppState {
    /// Wire the directories and the booking core onto one set of stores
    pub fn new(repos: Repositories) -> Self {
        let customers = Arc::new(CustomerDirectory::new(repos.customers));
        let staff = Arc::new(StaffDirectory::new(repos.staff));
        let services = Arc::new(ServiceCatalog::new(repos.services));
        let appointments = Arc::new(AppointmentService::new(
            repos.appointments,
            customers.clone(),
            staff.clone(),
            services.clone(),
        ));

        Self {
            customers,
            staff,
            services,
            appointments,
        }
    }
}

/// API Error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// Mapping for appointment routes, where a missing customer, staff
    /// member or service is a bad reference in the request body.
    pub fn from_booking(err: Error) -> Self {
        match err {
            Error::CustomerNotFound | Error::StaffNotFound | Error::ServiceNotFound => {
                ApiError::bad_request(capitalize(&err.to_string()))
            }
            other => other.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.message
        });

        (self.status, Json(body)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match &err {
            Error::CustomerNotFound
            | Error::StaffNotFound
            | Error::ServiceNotFound
            | Error::AppointmentNotFound => StatusCode::NOT_FOUND,
            Error::ConflictingBooking | Error::AlreadyExists(_) => StatusCode::CONFLICT,
            Error::Storage(inner) => {
                error!("Storage failure: {:#}", inner);
                return ApiError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "Internal server error".to_string(),
                };
            }
            _ => StatusCode::BAD_REQUEST,
        };

        ApiError {
            status,
            message: capitalize(&err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Parse an id from a path or body field, reporting `Invalid {what} ID`.
/// A query value that is set and not blank
pub fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub fn parse_id<T: FromStr>(raw: &str, what: &str) -> Result<T, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid {} ID", what)))
}

/// `YYYY-MM-DD`; an empty string is "no date" and left for the core to reject.
pub fn parse_date(raw: &str) -> Result<Option<NaiveDate>, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| ApiError::bad_request("Invalid date format (YYYY-MM-DD)"))
}

/// `HH:MM` or `HH:MM:SS`; an empty string is "no time".
pub fn parse_time(raw: &str) -> Result<Option<NaiveTime>, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map(Some)
        .map_err(|_| ApiError::bad_request("Invalid time format (HH:MM)"))
}

/// `?q=&limit=` for the search endpoints
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<String>,
}

impl SearchQuery {
    pub fn limit(&self) -> usize {
        self.limit
            .as_deref()
            .and_then(|l| l.trim().parse::<usize>().ok())
            .filter(|l| (1..=crate::pagination::MAX_LIMIT).contains(l))
            .unwrap_or(salon_core::search::DEFAULT_SEARCH_LIMIT)
    }
}

/// Health check endpoint
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now(),
    }))
}

/// Service banner with the endpoint map
pub async fn root_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Salon Booking API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "health": "/health",
            "customers": "/api/v1/customers",
            "services": "/api/v1/services",
            "staff": "/api/v1/staff",
            "appointments": "/api/v1/appointments",
        }
    }))
}
