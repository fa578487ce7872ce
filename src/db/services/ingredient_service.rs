use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbConn, DbErr, EntityTrait, JoinType,
    ModelTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use tracing::{debug, info};

use crate::db::entities::prelude::{Ingredient, RecipeIngredient};
use crate::db::entities::{ingredient, recipe, recipe_ingredient};

#[derive(Debug, thiserror::Error)]
pub enum IngredientError {
    #[error("Database error: {0}")]
    DbErr(#[from] DbErr),
    #[error("Ingredient not found: {0}")]
    NotFound(i32),
}

pub struct IngredientService;

impl IngredientService {
    /// Creates an ingredient owned by `user_id`.
    pub async fn create_ingredient<C: ConnectionTrait>(
        db: &C,
        user_id: i32,
        name: String,
    ) -> Result<ingredient::Model, IngredientError> {
        let new_ingredient = ingredient::ActiveModel {
            user_id: Set(user_id),
            name: Set(name),
            ..Default::default()
        };
        let ingredient = new_ingredient.insert(db).await?;
        debug!(ingredient_id = ingredient.id, user_id, "Created ingredient.");
        Ok(ingredient)
    }

    /// Returns the owner's ingredient with this exact name, creating it when
    /// missing.
    pub async fn get_or_create_ingredient<C: ConnectionTrait>(
        db: &C,
        user_id: i32,
        name: &str,
    ) -> Result<ingredient::Model, IngredientError> {
        let existing = Ingredient::find()
            .filter(ingredient::Column::UserId.eq(user_id))
            .filter(ingredient::Column::Name.eq(name))
            .order_by_asc(ingredient::Column::Id)
            .one(db)
            .await?;

        match existing {
            Some(ingredient) => Ok(ingredient),
            None => Self::create_ingredient(db, user_id, name.to_owned()).await,
        }
    }

    /// Lists the owner's ingredients, newest first.
    ///
    /// With `assigned_only`, only ingredients linked to at least one of the owner's
    /// recipes are returned. The join fans out once per linking recipe, so the
    /// rows are collapsed with `DISTINCT`.
    pub async fn get_ingredients_by_user(
        db: &DbConn,
        user_id: i32,
        assigned_only: bool,
    ) -> Result<Vec<ingredient::Model>, IngredientError> {
        let mut query = Ingredient::find().filter(ingredient::Column::UserId.eq(user_id));

        if assigned_only {
            query = query
                .join(JoinType::InnerJoin, ingredient::Relation::RecipeIngredients.def())
                .join(JoinType::InnerJoin, recipe_ingredient::Relation::Recipe.def())
                .filter(recipe::Column::UserId.eq(user_id))
                .distinct();
        }

        Ok(query.order_by_desc(ingredient::Column::Id).all(db).await?)
    }

    pub async fn get_ingredient_by_id(
        db: &DbConn,
        ingredient_id: i32,
        user_id: i32,
    ) -> Result<ingredient::Model, IngredientError> {
        Ingredient::find_by_id(ingredient_id)
            .filter(ingredient::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or(IngredientError::NotFound(ingredient_id))
    }

    /// Applies `name` when given; `None` leaves the stored value untouched.
    pub async fn update_ingredient(
        db: &DbConn,
        ingredient_id: i32,
        user_id: i32,
        name: Option<String>,
    ) -> Result<ingredient::Model, IngredientError> {
        let ingredient = Self::get_ingredient_by_id(db, ingredient_id, user_id).await?;

        let Some(name) = name else {
            return Ok(ingredient);
        };

        let mut active_ingredient: ingredient::ActiveModel = ingredient.into();
        active_ingredient.name = Set(name);
        let updated = active_ingredient.update(db).await?;
        info!(ingredient_id, user_id, "Updated ingredient.");
        Ok(updated)
    }

    /// Deletes the ingredient and its recipe links.
    pub async fn delete_ingredient(
        db: &DbConn,
        ingredient_id: i32,
        user_id: i32,
    ) -> Result<(), IngredientError> {
        let ingredient = Self::get_ingredient_by_id(db, ingredient_id, user_id).await?;

        let txn = db.begin().await?;
        RecipeIngredient::delete_many()
            .filter(recipe_ingredient::Column::IngredientId.eq(ingredient.id))
            .exec(&txn)
            .await?;
        ingredient.delete(&txn).await?;
        txn.commit().await?;

        info!(ingredient_id, user_id, "Deleted ingredient.");
        Ok(())
    }
}
