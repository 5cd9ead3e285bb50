//! Salon Booking API
//!
//! REST surface over the salon booking core: customers, staff, the service
//! catalog and appointments.
//!
//! ## Endpoints
//!
//! All entity routes live under `/api/v1`:
//!
//! - `/customers` (`?name=` or `?page=&limit=`), `/customers/{id}`,
//!   `/customers/email/{email}`, `/customers/search`, `/customers/count`
//! - `/staff` (`?role=` or `?page=&limit=`), `/staff/{id}`, `/staff/email/{email}`,
//!   `/staff/roles`, `/staff/search`, `/staff/count`
//! - `/services` (`?category=` or `?page=&limit=`), `/services/{id}`,
//!   `/services/categories`, `/services/search`, `/services/count`
//! - `/appointments` (filters or `?page=&limit=`), `/appointments/{id}`,
//!   `PATCH /appointments/{id}/status`
//! - `GET /health`, `GET /`

pub mod config;
pub mod handlers;
pub mod pagination;
pub mod storage;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, patch},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::{Config, LogFormat, StorageBackend};
pub use handlers::{ApiError, AppState};

pub const SERVICE_NAME: &str = "salon-api";

/// Build the CORS layer from the configured origin list
pub fn cors_layer(config: &Config) -> Result<CorsLayer> {
    if config.cors_permissive() {
        return Ok(CorsLayer::permissive());
    }

    let origins = config
        .cors_allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin: {}", origin))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .expose_headers([header::CONTENT_LENGTH])
        .allow_credentials(true)
        .max_age(Duration::from_secs(12 * 60 * 60)))
}

/// Create the application router
pub fn create_router(state: AppState, cors: CorsLayer) -> Router {
    let shared_state = Arc::new(state);

    let api = Router::new()
        // Customers
        .route(
            "/customers",
            get(handlers::customers::list_customers_handler)
                .post(handlers::customers::create_customer_handler),
        )
        .route("/customers/search", get(handlers::customers::search_customers_handler))
        .route("/customers/count", get(handlers::customers::count_customers_handler))
        .route(
            "/customers/email/{email}",
            get(handlers::customers::get_customer_by_email_handler),
        )
        .route(
            "/customers/{id}",
            get(handlers::customers::get_customer_handler)
                .put(handlers::customers::update_customer_handler)
                .delete(handlers::customers::delete_customer_handler),
        )
        // Staff
        .route(
            "/staff",
            get(handlers::staff::list_staff_handler).post(handlers::staff::create_staff_handler),
        )
        .route("/staff/roles", get(handlers::staff::staff_roles_handler))
        .route("/staff/search", get(handlers::staff::search_staff_handler))
        .route("/staff/count", get(handlers::staff::count_staff_handler))
        .route(
            "/staff/email/{email}",
            get(handlers::staff::get_staff_by_email_handler),
        )
        .route(
            "/staff/{id}",
            get(handlers::staff::get_staff_handler)
                .put(handlers::staff::update_staff_handler)
                .delete(handlers::staff::delete_staff_handler),
        )
        // Services
        .route(
            "/services",
            get(handlers::services::list_services_handler)
                .post(handlers::services::create_service_handler),
        )
        .route(
            "/services/categories",
            get(handlers::services::service_categories_handler),
        )
        .route("/services/search", get(handlers::services::search_services_handler))
        .route("/services/count", get(handlers::services::count_services_handler))
        .route(
            "/services/{id}",
            get(handlers::services::get_service_handler)
                .put(handlers::services::update_service_handler)
                .delete(handlers::services::delete_service_handler),
        )
        // Appointments
        .route(
            "/appointments",
            get(handlers::appointments::list_appointments_handler)
                .post(handlers::appointments::create_appointment_handler),
        )
        .route(
            "/appointments/{id}",
            get(handlers::appointments::get_appointment_handler)
                .put(handlers::appointments::update_appointment_handler)
                .delete(handlers::appointments::delete_appointment_handler),
        )
        .route(
            "/appointments/{id}/status",
            patch(handlers::appointments::update_appointment_status_handler),
        );

    Router::new()
        .route("/", get(handlers::root_handler))
        .route("/health", get(handlers::health_handler))
        .nest("/api/v1", api)
        .with_state(shared_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
