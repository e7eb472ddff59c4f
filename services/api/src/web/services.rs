//! services/api/src/web/services.rs
//!
//! Catalog endpoints. Reads are public; writes are mounted behind the admin guard.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use salon_core::{NewService, ServicePatch};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::rest::{reject, ServiceBody};
use crate::web::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceRequest {
    pub name: String,
    pub price: f64,
    pub duration_minutes: u32,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceRequest {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub duration_minutes: Option<u32>,
    pub image_url: Option<String>,
    pub description: Option<String>,
}

/// GET /services - The full catalog
#[utoipa::path(
    get,
    path = "/services",
    responses((status = 200, description = "All offered services", body = [ServiceBody]))
)]
pub async fn list_services_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ServiceBody>>, (StatusCode, String)> {
    let services = state.catalog.list().await.map_err(reject)?;
    Ok(Json(services.into_iter().map(ServiceBody::from).collect()))
}

/// GET /services/{id} - One service
#[utoipa::path(
    get,
    path = "/services/{id}",
    params(("id" = Uuid, Path, description = "Service id")),
    responses(
        (status = 200, description = "The service", body = ServiceBody),
        (status = 404, description = "No such service")
    )
)]
pub async fn get_service_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ServiceBody>, (StatusCode, String)> {
    let service = state.catalog.get(id).await.map_err(reject)?;
    Ok(Json(service.into()))
}

/// POST /services - Add a service (admin)
#[utoipa::path(
    post,
    path = "/services",
    request_body = CreateServiceRequest,
    responses(
        (status = 201, description = "Service created", body = ServiceBody),
        (status = 400, description = "Invalid fields"),
        (status = 403, description = "Admins only")
    )
)]
pub async fn create_service_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateServiceRequest>,
) -> Result<(StatusCode, Json<ServiceBody>), (StatusCode, String)> {
    let service = state
        .catalog
        .create(NewService {
            name: req.name,
            price: req.price,
            duration_minutes: req.duration_minutes,
            image_url: req.image_url,
            description: req.description,
        })
        .await
        .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(service.into())))
}

/// PUT /services/{id} - Merge fields into a service (admin)
#[utoipa::path(
    put,
    path = "/services/{id}",
    params(("id" = Uuid, Path, description = "Service id")),
    request_body = UpdateServiceRequest,
    responses(
        (status = 200, description = "Updated service", body = ServiceBody),
        (status = 400, description = "Invalid fields"),
        (status = 404, description = "No such service")
    )
)]
pub async fn update_service_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateServiceRequest>,
) -> Result<Json<ServiceBody>, (StatusCode, String)> {
    let patch = ServicePatch {
        name: req.name,
        price: req.price,
        duration_minutes: req.duration_minutes,
        image_url: req.image_url,
        description: req.description,
    };
    let service = state.catalog.update(id, patch).await.map_err(reject)?;
    Ok(Json(service.into()))
}

/// DELETE /services/{id} - Remove a service (admin)
#[utoipa::path(
    delete,
    path = "/services/{id}",
    params(("id" = Uuid, Path, description = "Service id")),
    responses(
        (status = 204, description = "Service removed"),
        (status = 404, description = "No such service")
    )
)]
pub async fn delete_service_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    state.catalog.delete(id).await.map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /services - Clear the whole catalog (admin)
#[utoipa::path(
    delete,
    path = "/services",
    responses((status = 204, description = "Catalog cleared"))
)]
pub async fn delete_all_services_handler(
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, (StatusCode, String)> {
    state.catalog.delete_all().await.map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}
