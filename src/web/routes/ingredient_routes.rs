use axum::{
    Json, Router,
    extract::{Extension, State},
    http::StatusCode,
    routing::get,
};
use std::sync::Arc;

use crate::db::services::{IngredientError, IngredientService};
use crate::web::extract::{AppJson, AppPath, AppQuery};
use crate::web::models::AuthenticatedUser;
use crate::web::models::recipe_models::{
    AssignedOnlyQuery, IngredientResponse, NamePayload, PartialNamePayload, parse_flag,
    validate_name,
};
use crate::web::{AppError, AppState};

async fn list_ingredients(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    AppQuery(query): AppQuery<AssignedOnlyQuery>,
) -> Result<Json<Vec<IngredientResponse>>, AppError> {
    let assigned_only = parse_flag("assigned_only", query.assigned_only.as_deref())?;
    let ingredients =
        IngredientService::get_ingredients_by_user(&app_state.db_pool, user.id, assigned_only)
            .await?;
    Ok(Json(
        ingredients
            .into_iter()
            .map(IngredientResponse::from)
            .collect(),
    ))
}

async fn get_ingredient(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    AppPath(ingredient_id): AppPath<i32>,
) -> Result<Json<IngredientResponse>, AppError> {
    let ingredient =
        IngredientService::get_ingredient_by_id(&app_state.db_pool, ingredient_id, user.id)
            .await?;
    Ok(Json(ingredient.into()))
}

async fn replace_ingredient(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    AppPath(ingredient_id): AppPath<i32>,
    AppJson(payload): AppJson<NamePayload>,
) -> Result<Json<IngredientResponse>, AppError> {
    let name = validate_name("name", &payload.name)?;
    let ingredient = IngredientService::update_ingredient(
        &app_state.db_pool,
        ingredient_id,
        user.id,
        Some(name),
    )
    .await?;
    Ok(Json(ingredient.into()))
}

async fn patch_ingredient(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    AppPath(ingredient_id): AppPath<i32>,
    AppJson(payload): AppJson<PartialNamePayload>,
) -> Result<Json<IngredientResponse>, AppError> {
    let name = payload
        .name
        .map(|name| validate_name("name", &name))
        .transpose()?;
    let ingredient =
        IngredientService::update_ingredient(&app_state.db_pool, ingredient_id, user.id, name)
            .await?;
    Ok(Json(ingredient.into()))
}

async fn delete_ingredient(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    AppPath(ingredient_id): AppPath<i32>,
) -> Result<StatusCode, AppError> {
    IngredientService::delete_ingredient(&app_state.db_pool, ingredient_id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn create_ingredients_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/recipe/ingredients/", get(list_ingredients))
        .route(
            "/recipe/ingredients/{ingredient_id}/",
            get(get_ingredient)
                .put(replace_ingredient)
                .patch(patch_ingredient)
                .delete(delete_ingredient),
        )
}

impl From<IngredientError> for AppError {
    fn from(err: IngredientError) -> Self {
        match err {
            IngredientError::DbErr(e) => AppError::DatabaseError(e.to_string()),
            IngredientError::NotFound(id) => {
                AppError::NotFound(format!("Ingredient with ID {id} not found"))
            }
        }
    }
}
