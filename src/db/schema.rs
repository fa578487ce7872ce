//! Table bootstrap.
//!
//! Tables are derived from the SeaORM entity definitions and created with
//! `IF NOT EXISTS`, parents before the tables that reference them.

use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, Schema};
use tracing::{debug, info};

use crate::db::entities::prelude::{Ingredient, Recipe, RecipeIngredient, RecipeTag, Tag, User};

async fn create_table<E: EntityTrait>(
    db: &DatabaseConnection,
    schema: &Schema,
    entity: E,
) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(backend.build(&statement)).await?;
    debug!(table = entity.table_name(), "Ensured table exists.");
    Ok(())
}

pub async fn create_tables(db: &DatabaseConnection) -> Result<(), DbErr> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, User).await?;
    create_table(db, &schema, Tag).await?;
    create_table(db, &schema, Ingredient).await?;
    create_table(db, &schema, Recipe).await?;
    create_table(db, &schema, RecipeTag).await?;
    create_table(db, &schema, RecipeIngredient).await?;

    info!("Database schema is ready.");
    Ok(())
}
