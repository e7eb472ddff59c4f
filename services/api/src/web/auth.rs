//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for registration, login, logout and the current user.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    Extension, Json,
};
use salon_core::{AuthSession, NewUser, User};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::web::rest::{reject, UserBody};
use crate::web::state::AppState;

const SESSION_COOKIE: &str = "session";

//=========================================================================================
// Request Types
//=========================================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

type CookieResponse = (StatusCode, [(header::HeaderName, String); 1], Json<UserBody>);

//=========================================================================================
// Cookie Helpers
//=========================================================================================

/// Extracts the session token from the `Cookie` header, if any.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())?
        .split(';')
        .find_map(|c| c.trim().strip_prefix("session="))
        .filter(|token| !token.is_empty())
}

fn session_cookie(token: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE, token, max_age_secs
    )
}

fn logged_in(state: &AppState, status: StatusCode, session: AuthSession) -> CookieResponse {
    let max_age = chrono::Duration::days(state.config.session_ttl_days).num_seconds();
    let cookie = session_cookie(&session.token, max_age);
    (
        status,
        [(header::SET_COOKIE, cookie)],
        Json(UserBody::from(session.user)),
    )
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /register - Create a client account and log it in
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created and logged in", body = UserBody),
        (status = 400, description = "Invalid fields or email already registered"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<CookieResponse, (StatusCode, String)> {
    let session = state
        .accounts
        .register(NewUser {
            name: req.name,
            email: req.email,
            phone: req.phone,
            password: req.password,
        })
        .await
        .map_err(reject)?;
    Ok(logged_in(&state, StatusCode::CREATED, session))
}

/// POST /login - Login with an existing account
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = UserBody),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<CookieResponse, (StatusCode, String)> {
    let session = state
        .accounts
        .login(&req.email, &req.password)
        .await
        .map_err(reject)?;
    info!("User {} logged in", session.user.id);
    Ok(logged_in(&state, StatusCode::OK, session))
}

/// POST /logout - Invalidate the current session
#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "No active session")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<(StatusCode, [(header::HeaderName, String); 1]), (StatusCode, String)> {
    let token = session_token(&headers)
        .ok_or((StatusCode::UNAUTHORIZED, "No session found".to_string()))?;

    state.accounts.logout(token).await.map_err(|e| {
        error!("Failed to delete auth session: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to logout".to_string())
    })?;

    Ok((StatusCode::OK, [(header::SET_COOKIE, session_cookie("", 0))]))
}

/// GET /me - The user behind the current session
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Current user", body = UserBody),
        (status = 401, description = "No active session")
    )
)]
pub async fn me_handler(Extension(user): Extension<User>) -> Json<UserBody> {
    Json(UserBody::from(user))
}
