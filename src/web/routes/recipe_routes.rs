use axum::{
    Json, Router,
    extract::{Extension, State},
    http::StatusCode,
    routing::get,
};
use std::sync::Arc;
use tracing::debug;

use crate::db::services::{RecipeError, RecipeFilter, RecipeService};
use crate::web::extract::{AppJson, AppPath, AppQuery};
use crate::web::models::AuthenticatedUser;
use crate::web::models::recipe_models::{
    CreateRecipeRequest, PatchRecipeRequest, RecipeDetailResponse, RecipeListQuery,
    RecipeResponse, ReplaceRecipeRequest, parse_id_list,
};
use crate::web::{AppError, AppState};

pub fn create_recipes_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/recipe/recipes/", get(list_recipes).post(create_recipe))
        .route(
            "/recipe/recipes/{recipe_id}/",
            get(get_recipe)
                .put(replace_recipe)
                .patch(patch_recipe)
                .delete(delete_recipe),
        )
}

async fn list_recipes(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    AppQuery(query): AppQuery<RecipeListQuery>,
) -> Result<Json<Vec<RecipeResponse>>, AppError> {
    let filter = RecipeFilter {
        tag_ids: parse_id_list("tags", query.tags.as_deref())?,
        ingredient_ids: parse_id_list("ingredients", query.ingredients.as_deref())?,
    };
    debug!(user_id = user.id, ?filter, "Listing recipes.");
    let recipes = RecipeService::get_recipes_by_user(&app_state.db_pool, user.id, &filter).await?;
    Ok(Json(recipes.into_iter().map(RecipeResponse::from).collect()))
}

async fn create_recipe(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    AppJson(payload): AppJson<CreateRecipeRequest>,
) -> Result<(StatusCode, Json<RecipeDetailResponse>), AppError> {
    let new_recipe = payload.into_new_recipe()?;
    let recipe = RecipeService::create_recipe(&app_state.db_pool, user.id, new_recipe).await?;
    Ok((StatusCode::CREATED, Json(recipe.into())))
}

async fn get_recipe(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    AppPath(recipe_id): AppPath<i32>,
) -> Result<Json<RecipeDetailResponse>, AppError> {
    let recipe = RecipeService::get_recipe_by_id(&app_state.db_pool, recipe_id, user.id).await?;
    Ok(Json(recipe.into()))
}

async fn replace_recipe(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    AppPath(recipe_id): AppPath<i32>,
    AppJson(payload): AppJson<ReplaceRecipeRequest>,
) -> Result<Json<RecipeDetailResponse>, AppError> {
    let changes = payload.into_changes()?;
    let recipe =
        RecipeService::update_recipe(&app_state.db_pool, recipe_id, user.id, changes).await?;
    Ok(Json(recipe.into()))
}

async fn patch_recipe(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    AppPath(recipe_id): AppPath<i32>,
    AppJson(payload): AppJson<PatchRecipeRequest>,
) -> Result<Json<RecipeDetailResponse>, AppError> {
    let changes = payload.into_changes()?;
    let recipe =
        RecipeService::update_recipe(&app_state.db_pool, recipe_id, user.id, changes).await?;
    Ok(Json(recipe.into()))
}

async fn delete_recipe(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    AppPath(recipe_id): AppPath<i32>,
) -> Result<StatusCode, AppError> {
    RecipeService::delete_recipe(&app_state.db_pool, recipe_id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Implement the From trait to convert RecipeError to AppError
impl From<RecipeError> for AppError {
    fn from(err: RecipeError) -> Self {
        match err {
            RecipeError::DbErr(e) => AppError::DatabaseError(e.to_string()),
            RecipeError::NotFound(id) => {
                AppError::NotFound(format!("Recipe with ID {id} not found"))
            }
            RecipeError::Tag(e) => e.into(),
            RecipeError::Ingredient(e) => e.into(),
        }
    }
}
