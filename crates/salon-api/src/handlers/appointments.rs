//! Appointment endpoints
//!
//! Ids, dates and times are parsed here; a malformed value is a 400 before
//! the booking core is reached. A missing customer, staff member or service
//! is reported as 400 as well, since it is a bad reference in the body.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use salon_common::{Appointment, AppointmentId};
use salon_core::{BookingRequest, RescheduleRequest};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::{parse_date, parse_id, parse_time, present, ApiError, AppState};
use crate::pagination::Page;

#[derive(Debug, Deserialize)]
pub struct CreateAppointmentRequest {
    pub customer_id: String,
    pub staff_id: String,
    pub service_id: String,
    #[serde(default)]
    pub appointment_date: String,
    #[serde(default)]
    pub appointment_time: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub customer_id: String,
    pub staff_id: String,
    pub service_id: String,
    #[serde(default)]
    pub appointment_date: String,
    #[serde(default)]
    pub appointment_time: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: String,
}

/// Filters for `GET /appointments`; the first one present wins.
#[derive(Debug, Default, Deserialize)]
pub struct AppointmentListQuery {
    pub customer_id: Option<String>,
    pub staff_id: Option<String>,
    pub date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AppointmentPage {
    pub appointments: Vec<Appointment>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
}

pub async fn create_appointment_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateAppointmentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;

    let request = BookingRequest {
        customer_id: parse_id(&payload.customer_id, "customer")?,
        staff_id: parse_id(&payload.staff_id, "staff")?,
        service_id: parse_id(&payload.service_id, "service")?,
        date: parse_date(&payload.appointment_date)?,
        time: parse_time(&payload.appointment_time)?,
        notes: payload.notes,
    };
    info!(
        "Booking appointment: customer={}, staff={}, service={}",
        request.customer_id, request.staff_id, request.service_id
    );

    let appointment = state
        .appointments
        .book(request)
        .await
        .map_err(ApiError::from_booking)?;

    Ok((StatusCode::CREATED, Json(appointment)))
}

/// Filtered lists come back as a bare array; the unfiltered list is paged.
pub async fn list_appointments_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AppointmentListQuery>,
) -> Result<Response, ApiError> {
    let appointments = &state.appointments;

    let filtered = if let Some(raw) = present(&query.customer_id) {
        Some(appointments.list_by_customer(parse_id(raw, "customer")?).await?)
    } else if let Some(raw) = present(&query.staff_id) {
        Some(appointments.list_by_staff(parse_id(raw, "staff")?).await?)
    } else if let Some(raw) = present(&query.date) {
        let date = parse_date(raw)?.ok_or_else(|| ApiError::bad_request("Invalid date"))?;
        Some(appointments.list_by_date(date).await?)
    } else if present(&query.start_date).is_some() || present(&query.end_date).is_some() {
        let (start, end) = match (present(&query.start_date), present(&query.end_date)) {
            (Some(start), Some(end)) => (parse_date(start)?, parse_date(end)?),
            _ => {
                return Err(ApiError::bad_request(
                    "start_date and end_date must be given together",
                ))
            }
        };
        match (start, end) {
            (Some(start), Some(end)) => Some(appointments.list_by_date_range(start, end).await?),
            _ => return Err(ApiError::bad_request("Invalid date")),
        }
    } else if let Some(raw) = present(&query.status) {
        Some(appointments.list_by_status(raw).await?)
    } else {
        None
    };

    if let Some(rows) = filtered {
        return Ok(Json(rows).into_response());
    }

    let page = Page::from_query(query.page.as_deref(), query.limit.as_deref());
    let all = appointments.list_all().await?;
    let total = all.len();

    Ok(Json(AppointmentPage {
        appointments: page.slice(all),
        total,
        page: page.page,
        limit: page.limit,
    })
    .into_response())
}

pub async fn get_appointment_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Appointment>, ApiError> {
    let id: AppointmentId = parse_id(&id, "appointment")?;
    Ok(Json(state.appointments.get(id).await?))
}

pub async fn update_appointment_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateAppointmentRequest>, JsonRejection>,
) -> Result<Json<Appointment>, ApiError> {
    let id: AppointmentId = parse_id(&id, "appointment")?;
    let Json(payload) = payload?;

    let request = RescheduleRequest {
        customer_id: parse_id(&payload.customer_id, "customer")?,
        staff_id: parse_id(&payload.staff_id, "staff")?,
        service_id: parse_id(&payload.service_id, "service")?,
        date: parse_date(&payload.appointment_date)?,
        time: parse_time(&payload.appointment_time)?,
        status: payload.status,
        notes: payload.notes,
    };
    info!("Updating appointment: {}", id);

    let appointment = state
        .appointments
        .update(id, request)
        .await
        .map_err(ApiError::from_booking)?;
    Ok(Json(appointment))
}

pub async fn update_appointment_status_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<Appointment>, ApiError> {
    let id: AppointmentId = parse_id(&id, "appointment")?;
    let Json(payload) = payload?;
    info!("Updating appointment status: {} -> {}", id, payload.status);

    let appointment = state
        .appointments
        .update_status(id, &payload.status)
        .await?;
    Ok(Json(appointment))
}

pub async fn delete_appointment_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: AppointmentId = parse_id(&id, "appointment")?;
    info!("Deleting appointment: {}", id);

    state.appointments.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
