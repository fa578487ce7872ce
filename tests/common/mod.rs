//! Shared helpers for the HTTP integration tests.
//!
//! Each test gets its own in-memory SQLite database and drives the real router
//! through `tower::ServiceExt::oneshot`, without binding a socket.

#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use recipe_backend::db::entities::{ingredient, tag, user};
use recipe_backend::db::schema;
use recipe_backend::db::services::{
    IngredientService, NewRecipe, RecipeService, RecipeWithRelations, TagService, UserService,
};
use recipe_backend::server::config::ServerConfig;
use recipe_backend::services::auth_service::create_jwt_for_user;
use recipe_backend::web::create_axum_router;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "testpass123";
/// Lowest cost bcrypt accepts; keeps hashing fast in tests.
pub const TEST_BCRYPT_COST: u32 = 4;

pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
    pub config: Arc<ServerConfig>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
    pub raw_body: Vec<u8>,
}

pub fn test_config() -> ServerConfig {
    ServerConfig {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test-jwt-secret".to_string(),
        listen_addr: "127.0.0.1:0".to_string(),
        log_dir: "logs".to_string(),
        token_ttl_hours: 1,
        max_db_connections: 1,
        bcrypt_cost: TEST_BCRYPT_COST,
    }
}

impl TestApp {
    pub async fn new() -> Self {
        let config = Arc::new(test_config());

        // A single connection keeps every query on the same in-memory database.
        let mut opt = ConnectOptions::new(config.database_url.clone());
        opt.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect(opt).await.expect("connect to in-memory sqlite");
        schema::create_tables(&db).await.expect("create tables");

        let router = create_axum_router(db.clone(), config.clone());
        Self { router, db, config }
    }

    pub async fn create_user(&self, email: &str) -> user::Model {
        let password_hash =
            bcrypt::hash(TEST_PASSWORD, TEST_BCRYPT_COST).expect("hash password");
        UserService::create_user(
            &self.db,
            email.to_string(),
            "Test User".to_string(),
            password_hash,
        )
        .await
        .expect("create user")
    }

    pub fn token_for(&self, user: &user::Model) -> String {
        create_jwt_for_user(user, &self.config.jwt_secret, self.config.token_ttl_hours)
            .expect("sign token")
            .token
    }

    pub async fn create_tag(&self, user: &user::Model, name: &str) -> tag::Model {
        TagService::create_tag(&self.db, user.id, name.to_string())
            .await
            .expect("create tag")
    }

    pub async fn create_ingredient(&self, user: &user::Model, name: &str) -> ingredient::Model {
        IngredientService::create_ingredient(&self.db, user.id, name.to_string())
            .await
            .expect("create ingredient")
    }

    pub async fn create_recipe(
        &self,
        user: &user::Model,
        title: &str,
        time_minutes: i32,
        price_cents: i64,
    ) -> RecipeWithRelations {
        let new_recipe = NewRecipe {
            title: title.to_string(),
            time_minutes,
            price_cents,
            ..Default::default()
        };
        RecipeService::create_recipe(&self.db, user.id, new_recipe)
            .await
            .expect("create recipe")
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&json).expect("serialize body"))
            }
            None => Body::empty(),
        };
        let request = builder.body(body).expect("build request");
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let raw_body = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes()
            .to_vec();
        let body = if raw_body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&raw_body).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            body,
            raw_body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }
}
