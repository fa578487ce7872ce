use axum::{
    body::Body as AxumBody,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::db::services::UserService;
use crate::services::auth_service::decode_token;
use crate::web::models::AuthenticatedUser;
use crate::web::{AppState, error::AppError};

/// Accepts `Bearer <jwt>` and `Token <jwt>`.
fn token_from_header(value: &str) -> Option<&str> {
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("Token "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub async fn auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut req: Request<AxumBody>,
    next: Next,
) -> Result<Response, AppError> {
    // Try to get token from Authorization header first, then fall back to cookie
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(token_from_header)
        .map(|s| s.to_string())
        .or_else(|| jar.get("token").map(|c| c.value().to_string()))
        .ok_or_else(|| {
            debug!(uri = %req.uri(), "Rejected request without credentials.");
            AppError::Unauthorized("Authentication credentials were not provided.".to_string())
        })?;

    let claims = decode_token(&token, &state.config.jwt_secret).map_err(|e| {
        warn!(error = ?e, "JWT decoding error during auth middleware.");
        AppError::InvalidCredentials
    })?;

    let user = UserService::get_user_by_id(&state.db_pool, claims.user_id).await?;
    if !user.is_active {
        return Err(AppError::Unauthorized("User account is disabled.".to_string()));
    }

    let authenticated_user = AuthenticatedUser {
        id: user.id,
        email: user.email,
    };
    req.extensions_mut().insert(authenticated_user);
    Ok(next.run(req).await)
}
