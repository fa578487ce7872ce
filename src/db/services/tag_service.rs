use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbConn, DbErr, EntityTrait, JoinType,
    ModelTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use tracing::{debug, info};

use crate::db::entities::prelude::{RecipeTag, Tag};
use crate::db::entities::{recipe, recipe_tag, tag};

#[derive(Debug, thiserror::Error)]
pub enum TagError {
    #[error("Database error: {0}")]
    DbErr(#[from] DbErr),
    #[error("Tag not found: {0}")]
    NotFound(i32),
}

pub struct TagService;

impl TagService {
    /// Creates a tag owned by `user_id`.
    pub async fn create_tag<C: ConnectionTrait>(
        db: &C,
        user_id: i32,
        name: String,
    ) -> Result<tag::Model, TagError> {
        let new_tag = tag::ActiveModel {
            user_id: Set(user_id),
            name: Set(name),
            ..Default::default()
        };
        let tag = new_tag.insert(db).await?;
        debug!(tag_id = tag.id, user_id, "Created tag.");
        Ok(tag)
    }

    /// Returns the owner's tag with this exact name, creating it when missing.
    /// The lowest id wins if several tags share the name.
    pub async fn get_or_create_tag<C: ConnectionTrait>(
        db: &C,
        user_id: i32,
        name: &str,
    ) -> Result<tag::Model, TagError> {
        let existing = Tag::find()
            .filter(tag::Column::UserId.eq(user_id))
            .filter(tag::Column::Name.eq(name))
            .order_by_asc(tag::Column::Id)
            .one(db)
            .await?;

        match existing {
            Some(tag) => Ok(tag),
            None => Self::create_tag(db, user_id, name.to_owned()).await,
        }
    }

    /// Lists the owner's tags, newest first.
    ///
    /// With `assigned_only`, only tags linked to at least one of the owner's
    /// recipes are returned. The join fans out once per linking recipe, so the
    /// rows are collapsed with `DISTINCT`.
    pub async fn get_tags_by_user(
        db: &DbConn,
        user_id: i32,
        assigned_only: bool,
    ) -> Result<Vec<tag::Model>, TagError> {
        let mut query = Tag::find().filter(tag::Column::UserId.eq(user_id));

        if assigned_only {
            query = query
                .join(JoinType::InnerJoin, tag::Relation::RecipeTags.def())
                .join(JoinType::InnerJoin, recipe_tag::Relation::Recipe.def())
                .filter(recipe::Column::UserId.eq(user_id))
                .distinct();
        }

        Ok(query.order_by_desc(tag::Column::Id).all(db).await?)
    }

    pub async fn get_tag_by_id(
        db: &DbConn,
        tag_id: i32,
        user_id: i32,
    ) -> Result<tag::Model, TagError> {
        Tag::find_by_id(tag_id)
            .filter(tag::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or(TagError::NotFound(tag_id))
    }

    /// Applies `name` when given; `None` leaves the stored value untouched.
    pub async fn update_tag(
        db: &DbConn,
        tag_id: i32,
        user_id: i32,
        name: Option<String>,
    ) -> Result<tag::Model, TagError> {
        let tag = Self::get_tag_by_id(db, tag_id, user_id).await?;

        let Some(name) = name else {
            return Ok(tag);
        };

        let mut active_tag: tag::ActiveModel = tag.into();
        active_tag.name = Set(name);
        let updated = active_tag.update(db).await?;
        info!(tag_id, user_id, "Updated tag.");
        Ok(updated)
    }

    /// Deletes the tag and its recipe links.
    pub async fn delete_tag(db: &DbConn, tag_id: i32, user_id: i32) -> Result<(), TagError> {
        let tag = Self::get_tag_by_id(db, tag_id, user_id).await?;

        let txn = db.begin().await?;
        RecipeTag::delete_many()
            .filter(recipe_tag::Column::TagId.eq(tag.id))
            .exec(&txn)
            .await?;
        tag.delete(&txn).await?;
        txn.commit().await?;

        info!(tag_id, user_id, "Deleted tag.");
        Ok(())
    }
}
