use std::collections::BTreeSet;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbConn, DbErr, EntityTrait, JoinType,
    LoaderTrait, ModelTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
    TransactionTrait,
};
use tracing::{debug, info};

use crate::db::entities::prelude::{Ingredient, Recipe, RecipeIngredient, RecipeTag, Tag};
use crate::db::entities::{ingredient, recipe, recipe_ingredient, recipe_tag, tag};
use crate::db::services::ingredient_service::{IngredientError, IngredientService};
use crate::db::services::tag_service::{TagError, TagService};

#[derive(Debug, thiserror::Error)]
pub enum RecipeError {
    #[error("Database error: {0}")]
    DbErr(#[from] DbErr),
    #[error("Recipe not found: {0}")]
    NotFound(i32),
    #[error(transparent)]
    Tag(#[from] TagError),
    #[error(transparent)]
    Ingredient(#[from] IngredientError),
}

/// A recipe together with its tags and ingredients, each sorted by id.
#[derive(Debug, Clone)]
pub struct RecipeWithRelations {
    pub recipe: recipe::Model,
    pub tags: Vec<tag::Model>,
    pub ingredients: Vec<ingredient::Model>,
}

#[derive(Debug, Clone, Default)]
pub struct NewRecipe {
    pub title: String,
    pub description: String,
    pub time_minutes: i32,
    pub price_cents: i64,
    pub link: String,
    pub tags: Vec<String>,
    pub ingredients: Vec<String>,
}

/// Field-wise changes; `None` keeps the stored value. A `Some` tag or
/// ingredient list replaces the current set.
#[derive(Debug, Clone, Default)]
pub struct RecipeChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub time_minutes: Option<i32>,
    pub price_cents: Option<i64>,
    pub link: Option<String>,
    pub tags: Option<Vec<String>>,
    pub ingredients: Option<Vec<String>>,
}

/// A recipe matches when it carries any of the listed tag ids and any of the
/// listed ingredient ids. Empty lists do not filter.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    pub tag_ids: Vec<i32>,
    pub ingredient_ids: Vec<i32>,
}

pub struct RecipeService;

impl RecipeService {
    pub async fn create_recipe(
        db: &DbConn,
        user_id: i32,
        new_recipe: NewRecipe,
    ) -> Result<RecipeWithRelations, RecipeError> {
        let txn = db.begin().await?;

        let recipe = recipe::ActiveModel {
            user_id: Set(user_id),
            title: Set(new_recipe.title),
            description: Set(new_recipe.description),
            time_minutes: Set(new_recipe.time_minutes),
            price_cents: Set(new_recipe.price_cents),
            link: Set(new_recipe.link),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        Self::replace_tags(&txn, recipe.id, user_id, &new_recipe.tags).await?;
        Self::replace_ingredients(&txn, recipe.id, user_id, &new_recipe.ingredients).await?;
        txn.commit().await?;

        info!(recipe_id = recipe.id, user_id, "Created recipe.");
        Self::with_relations(db, recipe).await
    }

    /// Lists the owner's recipes, newest first, narrowed by `filter`.
    pub async fn get_recipes_by_user(
        db: &DbConn,
        user_id: i32,
        filter: &RecipeFilter,
    ) -> Result<Vec<RecipeWithRelations>, RecipeError> {
        let mut query = Recipe::find().filter(recipe::Column::UserId.eq(user_id));
        let mut joined = false;

        if !filter.tag_ids.is_empty() {
            query = query
                .join(JoinType::InnerJoin, recipe::Relation::RecipeTags.def())
                .filter(recipe_tag::Column::TagId.is_in(filter.tag_ids.iter().copied()));
            joined = true;
        }
        if !filter.ingredient_ids.is_empty() {
            query = query
                .join(JoinType::InnerJoin, recipe::Relation::RecipeIngredients.def())
                .filter(
                    recipe_ingredient::Column::IngredientId
                        .is_in(filter.ingredient_ids.iter().copied()),
                );
            joined = true;
        }
        if joined {
            query = query.distinct();
        }

        let recipes = query.order_by_desc(recipe::Column::Id).all(db).await?;
        debug!(user_id, count = recipes.len(), "Fetched recipes.");

        let tags = recipes.load_many_to_many(Tag, RecipeTag, db).await?;
        let ingredients = recipes
            .load_many_to_many(Ingredient, RecipeIngredient, db)
            .await?;

        Ok(recipes
            .into_iter()
            .zip(tags)
            .zip(ingredients)
            .map(|((recipe, mut tags), mut ingredients)| {
                tags.sort_by_key(|t| t.id);
                ingredients.sort_by_key(|i| i.id);
                RecipeWithRelations {
                    recipe,
                    tags,
                    ingredients,
                }
            })
            .collect())
    }

    pub async fn get_recipe_by_id(
        db: &DbConn,
        recipe_id: i32,
        user_id: i32,
    ) -> Result<RecipeWithRelations, RecipeError> {
        let recipe = Self::find_owned(db, recipe_id, user_id).await?;
        Self::with_relations(db, recipe).await
    }

    pub async fn update_recipe(
        db: &DbConn,
        recipe_id: i32,
        user_id: i32,
        changes: RecipeChanges,
    ) -> Result<RecipeWithRelations, RecipeError> {
        let recipe = Self::find_owned(db, recipe_id, user_id).await?;

        let txn = db.begin().await?;

        let mut active_recipe: recipe::ActiveModel = recipe.clone().into();
        if let Some(title) = changes.title {
            active_recipe.title = Set(title);
        }
        if let Some(description) = changes.description {
            active_recipe.description = Set(description);
        }
        if let Some(time_minutes) = changes.time_minutes {
            active_recipe.time_minutes = Set(time_minutes);
        }
        if let Some(price_cents) = changes.price_cents {
            active_recipe.price_cents = Set(price_cents);
        }
        if let Some(link) = changes.link {
            active_recipe.link = Set(link);
        }
        let recipe = if active_recipe.is_changed() {
            active_recipe.update(&txn).await?
        } else {
            recipe
        };

        if let Some(tags) = changes.tags {
            Self::replace_tags(&txn, recipe.id, user_id, &tags).await?;
        }
        if let Some(ingredients) = changes.ingredients {
            Self::replace_ingredients(&txn, recipe.id, user_id, &ingredients).await?;
        }
        txn.commit().await?;

        info!(recipe_id, user_id, "Updated recipe.");
        Self::with_relations(db, recipe).await
    }

    pub async fn delete_recipe(
        db: &DbConn,
        recipe_id: i32,
        user_id: i32,
    ) -> Result<(), RecipeError> {
        let recipe = Self::find_owned(db, recipe_id, user_id).await?;

        let txn = db.begin().await?;
        RecipeTag::delete_many()
            .filter(recipe_tag::Column::RecipeId.eq(recipe.id))
            .exec(&txn)
            .await?;
        RecipeIngredient::delete_many()
            .filter(recipe_ingredient::Column::RecipeId.eq(recipe.id))
            .exec(&txn)
            .await?;
        recipe.delete(&txn).await?;
        txn.commit().await?;

        info!(recipe_id, user_id, "Deleted recipe.");
        Ok(())
    }

    /// Links an existing tag to an existing recipe. Both must belong to
    /// `user_id`; linking twice is a no-op.
    pub async fn add_tag(
        db: &DbConn,
        recipe_id: i32,
        tag_id: i32,
        user_id: i32,
    ) -> Result<(), RecipeError> {
        let recipe = Self::find_owned(db, recipe_id, user_id).await?;
        let tag = TagService::get_tag_by_id(db, tag_id, user_id).await?;

        let existing = RecipeTag::find_by_id((recipe.id, tag.id)).one(db).await?;
        if existing.is_none() {
            RecipeTag::insert(recipe_tag::ActiveModel {
                recipe_id: Set(recipe.id),
                tag_id: Set(tag.id),
            })
            .exec_without_returning(db)
            .await?;
        }
        Ok(())
    }

    /// Links an existing ingredient to an existing recipe. Both must belong to
    /// `user_id`; linking twice is a no-op.
    pub async fn add_ingredient(
        db: &DbConn,
        recipe_id: i32,
        ingredient_id: i32,
        user_id: i32,
    ) -> Result<(), RecipeError> {
        let recipe = Self::find_owned(db, recipe_id, user_id).await?;
        let ingredient =
            IngredientService::get_ingredient_by_id(db, ingredient_id, user_id).await?;

        let existing = RecipeIngredient::find_by_id((recipe.id, ingredient.id))
            .one(db)
            .await?;
        if existing.is_none() {
            RecipeIngredient::insert(recipe_ingredient::ActiveModel {
                recipe_id: Set(recipe.id),
                ingredient_id: Set(ingredient.id),
            })
            .exec_without_returning(db)
            .await?;
        }
        Ok(())
    }

    async fn find_owned(
        db: &DbConn,
        recipe_id: i32,
        user_id: i32,
    ) -> Result<recipe::Model, RecipeError> {
        Recipe::find_by_id(recipe_id)
            .filter(recipe::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or(RecipeError::NotFound(recipe_id))
    }

    async fn with_relations(
        db: &DbConn,
        recipe: recipe::Model,
    ) -> Result<RecipeWithRelations, RecipeError> {
        let tags = recipe
            .find_related(Tag)
            .order_by_asc(tag::Column::Id)
            .all(db)
            .await?;
        let ingredients = recipe
            .find_related(Ingredient)
            .order_by_asc(ingredient::Column::Id)
            .all(db)
            .await?;
        Ok(RecipeWithRelations {
            recipe,
            tags,
            ingredients,
        })
    }

    async fn replace_tags<C: ConnectionTrait>(
        db: &C,
        recipe_id: i32,
        user_id: i32,
        names: &[String],
    ) -> Result<(), RecipeError> {
        RecipeTag::delete_many()
            .filter(recipe_tag::Column::RecipeId.eq(recipe_id))
            .exec(db)
            .await?;

        let mut tag_ids = BTreeSet::new();
        for name in names {
            let tag = TagService::get_or_create_tag(db, user_id, name).await?;
            tag_ids.insert(tag.id);
        }
        if tag_ids.is_empty() {
            return Ok(());
        }

        RecipeTag::insert_many(tag_ids.into_iter().map(|tag_id| recipe_tag::ActiveModel {
            recipe_id: Set(recipe_id),
            tag_id: Set(tag_id),
        }))
        .exec_without_returning(db)
        .await?;
        Ok(())
    }

    async fn replace_ingredients<C: ConnectionTrait>(
        db: &C,
        recipe_id: i32,
        user_id: i32,
        names: &[String],
    ) -> Result<(), RecipeError> {
        RecipeIngredient::delete_many()
            .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
            .exec(db)
            .await?;

        let mut ingredient_ids = BTreeSet::new();
        for name in names {
            let ingredient =
                IngredientService::get_or_create_ingredient(db, user_id, name).await?;
            ingredient_ids.insert(ingredient.id);
        }
        if ingredient_ids.is_empty() {
            return Ok(());
        }

        RecipeIngredient::insert_many(ingredient_ids.into_iter().map(|ingredient_id| {
            recipe_ingredient::ActiveModel {
                recipe_id: Set(recipe_id),
                ingredient_id: Set(ingredient_id),
            }
        }))
        .exec_without_returning(db)
        .await?;
        Ok(())
    }
}
