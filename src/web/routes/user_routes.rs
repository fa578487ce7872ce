use axum::{
    Json, Router,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use std::sync::Arc;

use crate::services::auth_service;
use crate::web::extract::AppJson;
use crate::web::models::{LoginRequest, RegisterRequest, UserResponse};
use crate::web::{AppError, AppState};

async fn register_handler(
    State(app_state): State<Arc<AppState>>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = auth_service::register_user(&app_state.db_pool, payload, &app_state.config).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn token_handler(
    State(app_state): State<Arc<AppState>>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Response, AppError> {
    let login_response =
        auth_service::login_user(&app_state.db_pool, payload, &app_state.config).await?;

    let auth_cookie = Cookie::build(("token", login_response.token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(true)
        .build();
    let cookie_value = auth_cookie
        .to_string()
        .parse::<HeaderValue>()
        .map_err(|e| AppError::InternalServerError(format!("Invalid cookie header: {e}")))?;

    let mut response = Json(login_response).into_response();
    response.headers_mut().insert(header::SET_COOKIE, cookie_value);
    Ok(response)
}

/// Registration and token issuance; no authentication required.
pub fn create_public_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/user/create/", post(register_handler))
        .route("/user/token/", post(token_handler))
}

pub fn create_user_router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/user/me/",
        get(auth_service::me)
            .put(auth_service::update_me)
            .patch(auth_service::update_me),
    )
}
