//! The `services` module provides a high-level API for interacting with the database.
//! It encapsulates the query logic and data access patterns, allowing the HTTP
//! handlers to work with domain models without knowing the underlying schema.
//!
//! Every query that touches owned data takes the caller's `user_id` and filters
//! on it, so a record belonging to someone else behaves exactly like a missing one.

pub mod ingredient_service;
pub mod recipe_service;
pub mod tag_service;
pub mod user_service;

pub use ingredient_service::{IngredientError, IngredientService};
pub use recipe_service::{
    NewRecipe, RecipeChanges, RecipeError, RecipeFilter, RecipeService, RecipeWithRelations,
};
pub use tag_service::{TagError, TagService};
pub use user_service::{UserError, UserService};
