use axum::Extension;
use axum::extract::State;
use axum::Json;
use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::info;

use crate::db::entities::user;
use crate::db::services::{UserError, UserService};
use crate::server::config::ServerConfig;
use crate::web::AppState;
use crate::web::error::AppError;
use crate::web::extract::AppJson;
use crate::web::models::{
    AuthenticatedUser, Claims, LoginRequest, LoginResponse, RegisterRequest, UpdateUserRequest,
    UserResponse,
};

pub const MIN_PASSWORD_LEN: usize = 5;

/// Lowercases the domain part of an email address, leaving the local part
/// as typed.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_owned(),
    }
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidInput(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters."
        )));
    }
    Ok(())
}

fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    hash(password, cost).map_err(|e| AppError::PasswordHashingError(format!("Hashing failed: {e}")))
}

pub async fn register_user(
    pool: &DatabaseConnection,
    req: RegisterRequest,
    config: &ServerConfig,
) -> Result<UserResponse, AppError> {
    let email = normalize_email(&req.email);
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::InvalidInput("A valid email address is required.".to_string()));
    }
    validate_password(&req.password)?;

    let password_hash = hash_password(&req.password, config.bcrypt_cost)?;
    let user = UserService::create_user(pool, email, req.name.trim().to_owned(), password_hash)
        .await?;

    info!(user_id = user.id, "Registered new user.");
    Ok(UserResponse::from(user))
}

pub async fn login_user(
    pool: &DatabaseConnection,
    req: LoginRequest,
    config: &ServerConfig,
) -> Result<LoginResponse, AppError> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(AppError::InvalidInput("Email and password are required.".to_string()));
    }

    let user = UserService::get_user_by_email(pool, &normalize_email(&req.email))
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !user.is_active {
        return Err(AppError::InvalidCredentials);
    }

    let valid_password = verify(&req.password, &user.password_hash)
        .map_err(|e| AppError::InternalServerError(format!("Password verification failed: {e}")))?;

    if !valid_password {
        return Err(AppError::InvalidCredentials);
    }

    create_jwt_for_user(&user, &config.jwt_secret, config.token_ttl_hours)
}

pub fn create_jwt_for_user(
    user: &user::Model,
    jwt_secret: &str,
    ttl_hours: i64,
) -> Result<LoginResponse, AppError> {
    let expiration = (Utc::now() + Duration::hours(ttl_hours)).timestamp() as usize;

    let claims = Claims {
        sub: user.email.clone(),
        user_id: user.id,
        exp: expiration,
    };

    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(jwt_secret.as_ref()))
        .map_err(|e| AppError::TokenCreationError(format!("Failed to sign token: {e}")))?;

    Ok(LoginResponse {
        token,
        user_id: user.id,
        email: user.email.clone(),
    })
}

/// Verifies signature and expiry.
pub fn decode_token(token: &str, jwt_secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

pub async fn me(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<UserResponse>, AppError> {
    let user = UserService::get_user_by_id(&app_state.db_pool, user.id).await?;
    Ok(Json(UserResponse::from(user)))
}

pub async fn update_me(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let password_hash = match payload.password.as_deref() {
        Some(password) => {
            validate_password(password)?;
            Some(hash_password(password, app_state.config.bcrypt_cost)?)
        }
        None => None,
    };
    let name = payload.name.map(|n| n.trim().to_owned());

    let updated =
        UserService::update_user(&app_state.db_pool, user.id, name, password_hash).await?;
    info!(user_id = updated.id, "Updated user profile.");
    Ok(Json(UserResponse::from(updated)))
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::DbErr(e) => AppError::DatabaseError(e.to_string()),
            UserError::NotFound(_) => AppError::Unauthorized("User no longer exists.".to_string()),
            UserError::DuplicateEmail(email) => {
                AppError::UserAlreadyExists(format!("A user with the email '{email}' already exists."))
            }
        }
    }
}
