//! services/api/src/web/appointments.rs
//!
//! Booking endpoints. Every route here runs behind `require_auth`; the status
//! route is additionally admin-only.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use salon_core::{AppointmentStatus, BookingRequest, User};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::web::rest::{reject, AppointmentBody};
use crate::web::state::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct AppointmentFilter {
    /// Only appointments of this user. Ignored for clients, who always see their own.
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    /// Admins may book on behalf of another user; clients may only name themselves.
    #[serde(default)]
    pub user_id: Option<Uuid>,
    /// Required together with `userId` when an admin books for someone else.
    #[serde(default)]
    pub user_name: Option<String>,
    pub service_ids: Vec<Uuid>,
    pub start_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    #[schema(value_type = String, example = "CANCELLED")]
    pub status: AppointmentStatus,
}

/// GET /appointments - Appointments, latest start first
#[utoipa::path(
    get,
    path = "/appointments",
    params(AppointmentFilter),
    responses(
        (status = 200, description = "Appointments visible to the caller", body = [AppointmentBody]),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn list_appointments_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Query(filter): Query<AppointmentFilter>,
) -> Result<Json<Vec<AppointmentBody>>, (StatusCode, String)> {
    let user_filter = if user.is_admin() {
        filter.user_id
    } else {
        Some(user.id)
    };
    let appointments = state
        .scheduler
        .list_appointments(user_filter)
        .await
        .map_err(reject)?;
    Ok(Json(
        appointments.into_iter().map(AppointmentBody::from).collect(),
    ))
}

/// POST /appointments - Book a time slot
#[utoipa::path(
    post,
    path = "/appointments",
    request_body = CreateAppointmentRequest,
    responses(
        (status = 201, description = "Appointment confirmed", body = AppointmentBody),
        (status = 400, description = "No or unknown services selected"),
        (status = 403, description = "Clients may only book for themselves"),
        (status = 409, description = "Time slot unavailable")
    )
)]
pub async fn create_appointment_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(req): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<AppointmentBody>), (StatusCode, String)> {
    let (user_id, user_name) = booking_owner(&user, req.user_id, req.user_name)?;
    let appointment = state
        .scheduler
        .create_appointment(BookingRequest {
            user_id,
            user_name,
            service_ids: req.service_ids,
            start_time: req.start_time,
        })
        .await
        .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(appointment.into())))
}

/// Decides whose name goes on the booking.
fn booking_owner(
    caller: &User,
    user_id: Option<Uuid>,
    user_name: Option<String>,
) -> Result<(Uuid, String), (StatusCode, String)> {
    match user_id {
        None => Ok((caller.id, caller.name.clone())),
        Some(id) if id == caller.id => Ok((caller.id, caller.name.clone())),
        Some(_) if !caller.is_admin() => Err((
            StatusCode::FORBIDDEN,
            "clients may only book for themselves".to_string(),
        )),
        Some(id) => {
            let name = user_name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .ok_or((
                    StatusCode::BAD_REQUEST,
                    "userName is required when booking for another user".to_string(),
                ))?;
            Ok((id, name))
        }
    }
}

/// PATCH /appointments/{id}/status - Overwrite an appointment's status (admin)
#[utoipa::path(
    patch,
    path = "/appointments/{id}/status",
    params(("id" = Uuid, Path, description = "Appointment id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 204, description = "Status updated"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "No such appointment")
    )
)]
pub async fn update_status_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .scheduler
        .update_status(id, req.status)
        .await
        .map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::test_support::{test_state, user};
    use chrono::TimeZone;
    use salon_core::{NewService, Service, UserRole};

    async fn cut(state: &AppState) -> Service {
        state
            .catalog
            .create(NewService {
                name: "Classic Cut".to_string(),
                price: 50.0,
                duration_minutes: 30,
                image_url: None,
                description: None,
            })
            .await
            .unwrap()
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 5, 14, hour, minute, 0).unwrap()
    }

    fn booking(service: &Service, start: DateTime<Utc>) -> CreateAppointmentRequest {
        CreateAppointmentRequest {
            user_id: None,
            user_name: None,
            service_ids: vec![service.id],
            start_time: start,
        }
    }

    #[tokio::test]
    async fn client_books_under_their_own_name() {
        let state = test_state();
        let cut = cut(&state).await;
        let client = user("Ana", UserRole::Client);

        let (status, Json(body)) = create_appointment_handler(
            State(state.clone()),
            Extension(client.clone()),
            Json(booking(&cut, at(10, 0))),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.user_id, client.id);
        assert_eq!(body.user_name, "Ana");
        assert_eq!(body.end_time, at(10, 30));
        assert_eq!(body.status, AppointmentStatus::Confirmed);
    }

    #[tokio::test]
    async fn overlapping_booking_is_a_conflict() {
        let state = test_state();
        let cut = cut(&state).await;
        let client = user("Ana", UserRole::Client);
        create_appointment_handler(
            State(state.clone()),
            Extension(client.clone()),
            Json(booking(&cut, at(10, 0))),
        )
        .await
        .unwrap();

        let (status, msg) = create_appointment_handler(
            State(state),
            Extension(user("Bruno", UserRole::Client)),
            Json(booking(&cut, at(10, 15))),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(msg, "time slot unavailable");
    }

    #[tokio::test]
    async fn empty_selection_is_a_bad_request() {
        let state = test_state();
        let (status, msg) = create_appointment_handler(
            State(state),
            Extension(user("Ana", UserRole::Client)),
            Json(CreateAppointmentRequest {
                user_id: None,
                user_name: None,
                service_ids: vec![],
                start_time: at(10, 0),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(msg, "no services selected");
    }

    #[tokio::test]
    async fn clients_cannot_book_for_others_but_admins_can() {
        let state = test_state();
        let cut = cut(&state).await;
        let other = Uuid::new_v4();

        let mut for_other = booking(&cut, at(11, 0));
        for_other.user_id = Some(other);
        let (status, _) = create_appointment_handler(
            State(state.clone()),
            Extension(user("Ana", UserRole::Client)),
            Json(for_other),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::FORBIDDEN);

        let mut on_behalf = booking(&cut, at(11, 0));
        on_behalf.user_id = Some(other);
        on_behalf.user_name = Some("Walk-in Carlos".to_string());
        let (_, Json(body)) = create_appointment_handler(
            State(state),
            Extension(user("Boss", UserRole::Admin)),
            Json(on_behalf),
        )
        .await
        .unwrap();
        assert_eq!(body.user_id, other);
        assert_eq!(body.user_name, "Walk-in Carlos");
    }

    #[tokio::test]
    async fn clients_only_see_their_own_appointments() {
        let state = test_state();
        let cut = cut(&state).await;
        let ana = user("Ana", UserRole::Client);
        let bruno = user("Bruno", UserRole::Client);
        for (who, start) in [(&ana, at(9, 0)), (&bruno, at(10, 0)), (&ana, at(11, 0))] {
            create_appointment_handler(
                State(state.clone()),
                Extension(who.clone()),
                Json(booking(&cut, start)),
            )
            .await
            .unwrap();
        }

        let Json(mine) = list_appointments_handler(
            State(state.clone()),
            Extension(ana.clone()),
            Query(AppointmentFilter {
                user_id: Some(bruno.id),
            }),
        )
        .await
        .unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|a| a.user_id == ana.id));
        assert_eq!(mine[0].start_time, at(11, 0));

        let Json(all) = list_appointments_handler(
            State(state),
            Extension(user("Boss", UserRole::Admin)),
            Query(AppointmentFilter::default()),
        )
        .await
        .unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn cancelling_frees_the_slot() {
        let state = test_state();
        let cut = cut(&state).await;
        let ana = user("Ana", UserRole::Client);
        let (_, Json(first)) = create_appointment_handler(
            State(state.clone()),
            Extension(ana.clone()),
            Json(booking(&cut, at(10, 0))),
        )
        .await
        .unwrap();

        let status = update_status_handler(
            State(state.clone()),
            Path(first.id),
            Json(UpdateStatusRequest {
                status: AppointmentStatus::Cancelled,
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        create_appointment_handler(
            State(state),
            Extension(ana),
            Json(booking(&cut, at(10, 0))),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn status_update_of_unknown_appointment_is_not_found() {
        let state = test_state();
        let (status, _) = update_status_handler(
            State(state),
            Path(Uuid::new_v4()),
            Json(UpdateStatusRequest {
                status: AppointmentStatus::Completed,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn status_body_uses_upper_case_values() {
        let req: UpdateStatusRequest = serde_json::from_str(r#"{"status":"CANCELLED"}"#).unwrap();
        assert_eq!(req.status, AppointmentStatus::Cancelled);
        assert!(serde_json::from_str::<UpdateStatusRequest>(r#"{"status":"gone"}"#).is_err());
    }
}
