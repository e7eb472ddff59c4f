//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use salon_core::User;
use std::sync::Arc;
use tracing::error;

use crate::web::auth::session_token;
use crate::web::state::AppState;

/// Middleware that resolves the session cookie to the logged-in user.
///
/// If valid, inserts the `User` into request extensions for handlers to use.
/// If invalid, expired or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // 1. Parse session token from the cookie header
    let token = session_token(req.headers())
        .ok_or(StatusCode::UNAUTHORIZED)?
        .to_string();

    // 2. Resolve the session to its user
    let user = state
        .accounts
        .current_user(&token)
        .await
        .map_err(|e| {
            error!("Failed to validate auth session: {:?}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // 3. Insert the user into request extensions
    req.extensions_mut().insert(user);

    // 4. Continue to the handler
    Ok(next.run(req).await)
}

/// Must run inside `require_auth`. Rejects everyone but admins with 403.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, StatusCode> {
    let is_admin = req
        .extensions()
        .get::<User>()
        .map(User::is_admin)
        .ok_or(StatusCode::UNAUTHORIZED)?;
    if !is_admin {
        return Err(StatusCode::FORBIDDEN);
    }
    Ok(next.run(req).await)
}
