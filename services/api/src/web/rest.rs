//! services/api/src/web/rest.rs
//!
//! Shared REST payloads, the mapping from core errors to HTTP responses, and the
//! master definition for the OpenAPI specification.

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use salon_core::{Appointment, AppointmentStatus, CoreError, Service, User, UserRole};
use serde::Serialize;
use tracing::error;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::web::{advice, appointments, auth, services};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::me_handler,
        services::list_services_handler,
        services::get_service_handler,
        services::create_service_handler,
        services::update_service_handler,
        services::delete_service_handler,
        services::delete_all_services_handler,
        appointments::list_appointments_handler,
        appointments::create_appointment_handler,
        appointments::update_status_handler,
        advice::advice_handler,
    ),
    components(
        schemas(
            UserBody,
            ServiceBody,
            AppointmentBody,
            auth::RegisterRequest,
            auth::LoginRequest,
            services::CreateServiceRequest,
            services::UpdateServiceRequest,
            appointments::CreateAppointmentRequest,
            appointments::UpdateStatusRequest,
            advice::AdviceRequest,
            advice::AdviceResponse,
        )
    ),
    tags(
        (name = "Salon Booking API", description = "Service catalog, appointment booking and accounts for a single-chair salon.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response Structs
//=========================================================================================

/// A user as returned by the API. Never includes a credential.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserBody {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[schema(value_type = String, example = "CLIENT")]
    pub role: UserRole,
}

impl From<User> for UserBody {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceBody {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub duration_minutes: u32,
    pub image_url: String,
    pub description: Option<String>,
}

impl From<Service> for ServiceBody {
    fn from(service: Service) -> Self {
        Self {
            id: service.id,
            name: service.name,
            price: service.price,
            duration_minutes: service.duration_minutes,
            image_url: service.image_url,
            description: service.description,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentBody {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub service_ids: Vec<Uuid>,
    pub total_price: f64,
    pub total_duration: u32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[schema(value_type = String, example = "CONFIRMED")]
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Appointment> for AppointmentBody {
    fn from(a: Appointment) -> Self {
        Self {
            id: a.id,
            user_id: a.user_id,
            user_name: a.user_name,
            service_ids: a.service_ids,
            total_price: a.total_price,
            total_duration: a.total_duration,
            start_time: a.start_time,
            end_time: a.end_time,
            status: a.status,
            created_at: a.created_at,
        }
    }
}

//=========================================================================================
// Error Mapping
//=========================================================================================

/// Turns a core failure into the status and message shown to the caller.
/// Infrastructure details are logged, not returned.
pub fn reject(err: CoreError) -> (StatusCode, String) {
    match err {
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        CoreError::Auth => (StatusCode::UNAUTHORIZED, CoreError::Auth.to_string()),
        CoreError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        CoreError::Port(e) => {
            error!("Store failure: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal error occurred".to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use salon_core::PortError;

    #[test]
    fn core_errors_map_to_statuses() {
        assert_eq!(
            reject(CoreError::validation("no services selected")),
            (StatusCode::BAD_REQUEST, "no services selected".to_string())
        );
        assert_eq!(
            reject(CoreError::Conflict("time slot unavailable".to_string())).0,
            StatusCode::CONFLICT
        );
        assert_eq!(
            reject(CoreError::Auth),
            (StatusCode::UNAUTHORIZED, "invalid credentials".to_string())
        );
        assert_eq!(
            reject(CoreError::NotFound("gone".to_string())).0,
            StatusCode::NOT_FOUND
        );
        let (status, msg) = reject(CoreError::Port(PortError::Unexpected(
            "connection refused".to_string(),
        )));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!msg.contains("connection refused"));
    }

    #[test]
    fn openapi_document_lists_the_booking_route() {
        let json = ApiDoc::openapi().to_pretty_json().unwrap();
        assert!(json.contains("/appointments/{id}/status"));
        assert!(json.contains("CreateAppointmentRequest"));
    }
}
