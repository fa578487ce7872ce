use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbConn, DbErr, EntityTrait, QueryFilter, Set, SqlErr,
};

use crate::db::entities::prelude::User;
use crate::db::entities::user;

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("Database error: {0}")]
    DbErr(#[from] DbErr),
    #[error("User not found: {0}")]
    NotFound(i32),
    #[error("A user with the email '{0}' already exists.")]
    DuplicateEmail(String),
}

pub struct UserService;

impl UserService {
    /// Creates an active user. `password_hash` must already be hashed.
    /// A second user with the same email is rejected by the unique index.
    pub async fn create_user(
        db: &DbConn,
        email: String,
        name: String,
        password_hash: String,
    ) -> Result<user::Model, UserError> {
        let now = Utc::now();
        let new_user = user::ActiveModel {
            email: Set(email.clone()),
            name: Set(name),
            password_hash: Set(password_hash),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        new_user.insert(db).await.map_err(|err| match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => UserError::DuplicateEmail(email),
            _ => UserError::DbErr(err),
        })
    }

    pub async fn get_user_by_id(db: &DbConn, user_id: i32) -> Result<user::Model, UserError> {
        User::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or(UserError::NotFound(user_id))
    }

    pub async fn get_user_by_email(
        db: &DbConn,
        email: &str,
    ) -> Result<Option<user::Model>, UserError> {
        Ok(User::find()
            .filter(user::Column::Email.eq(email))
            .one(db)
            .await?)
    }

    /// Updates the display name and/or password hash.
    pub async fn update_user(
        db: &DbConn,
        user_id: i32,
        name: Option<String>,
        password_hash: Option<String>,
    ) -> Result<user::Model, UserError> {
        let user = Self::get_user_by_id(db, user_id).await?;
        if name.is_none() && password_hash.is_none() {
            return Ok(user);
        }

        let mut active_user: user::ActiveModel = user.into();
        if let Some(name) = name {
            active_user.name = Set(name);
        }
        if let Some(password_hash) = password_hash {
            active_user.password_hash = Set(password_hash);
        }
        active_user.updated_at = Set(Utc::now());

        Ok(active_user.update(db).await?)
    }
}
