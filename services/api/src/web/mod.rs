pub mod advice;
pub mod appointments;
pub mod auth;
pub mod middleware;
pub mod rest;
pub mod services;
pub mod state;

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, patch, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::ApiError;
use state::AppState;

pub use middleware::{require_admin, require_auth};

/// Builds the API router: public, logged-in and admin-only route groups.
pub fn router(app_state: Arc<AppState>) -> Result<Router, ApiError> {
    let origin = app_state
        .config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::Internal(format!("Invalid CORS_ORIGIN: {}", e)))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/register", post(auth::register_handler))
        .route("/login", post(auth::login_handler))
        .route("/logout", post(auth::logout_handler))
        .route("/services", get(services::list_services_handler))
        .route("/services/{id}", get(services::get_service_handler));

    // Logged-in routes
    let protected_routes = Router::new()
        .route("/me", get(auth::me_handler))
        .route(
            "/appointments",
            get(appointments::list_appointments_handler)
                .post(appointments::create_appointment_handler),
        )
        .route("/advice", post(advice::advice_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    // Admin routes; `require_auth` is the outer layer so it runs first.
    let admin_routes = Router::new()
        .route(
            "/services",
            post(services::create_service_handler)
                .delete(services::delete_all_services_handler),
        )
        .route(
            "/services/{id}",
            put(services::update_service_handler).delete(services::delete_service_handler),
        )
        .route(
            "/appointments/{id}/status",
            patch(appointments::update_status_handler),
        )
        .layer(axum_middleware::from_fn(require_admin))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    Ok(Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state))
}
