use axum::{
    Json, Router,
    extract::{Extension, State},
    http::StatusCode,
    routing::get,
};
use std::sync::Arc;

use crate::db::services::{TagError, TagService};
use crate::web::extract::{AppJson, AppPath, AppQuery};
use crate::web::models::AuthenticatedUser;
use crate::web::models::recipe_models::{
    AssignedOnlyQuery, NamePayload, PartialNamePayload, TagResponse, parse_flag, validate_name,
};
use crate::web::{AppError, AppState};

// --- Route Handlers ---

async fn list_tags(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    AppQuery(query): AppQuery<AssignedOnlyQuery>,
) -> Result<Json<Vec<TagResponse>>, AppError> {
    let assigned_only = parse_flag("assigned_only", query.assigned_only.as_deref())?;
    let tags = TagService::get_tags_by_user(&app_state.db_pool, user.id, assigned_only).await?;
    Ok(Json(tags.into_iter().map(TagResponse::from).collect()))
}

async fn get_tag(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    AppPath(tag_id): AppPath<i32>,
) -> Result<Json<TagResponse>, AppError> {
    let tag = TagService::get_tag_by_id(&app_state.db_pool, tag_id, user.id).await?;
    Ok(Json(tag.into()))
}

async fn replace_tag(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    AppPath(tag_id): AppPath<i32>,
    AppJson(payload): AppJson<NamePayload>,
) -> Result<Json<TagResponse>, AppError> {
    let name = validate_name("name", &payload.name)?;
    let tag = TagService::update_tag(&app_state.db_pool, tag_id, user.id, Some(name)).await?;
    Ok(Json(tag.into()))
}

async fn patch_tag(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    AppPath(tag_id): AppPath<i32>,
    AppJson(payload): AppJson<PartialNamePayload>,
) -> Result<Json<TagResponse>, AppError> {
    let name = payload
        .name
        .map(|name| validate_name("name", &name))
        .transpose()?;
    let tag = TagService::update_tag(&app_state.db_pool, tag_id, user.id, name).await?;
    Ok(Json(tag.into()))
}

async fn delete_tag(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    AppPath(tag_id): AppPath<i32>,
) -> Result<StatusCode, AppError> {
    TagService::delete_tag(&app_state.db_pool, tag_id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Router ---

pub fn create_tags_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/recipe/tags/", get(list_tags))
        .route(
            "/recipe/tags/{tag_id}/",
            get(get_tag).put(replace_tag).patch(patch_tag).delete(delete_tag),
        )
}

impl From<TagError> for AppError {
    fn from(err: TagError) -> Self {
        match err {
            TagError::DbErr(e) => AppError::DatabaseError(e.to_string()),
            TagError::NotFound(id) => AppError::NotFound(format!("Tag with ID {id} not found")),
        }
    }
}
