//! crates/cookbook_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of a specific database.

use async_trait::async_trait;

use crate::domain::{Comment, NewComment, NewRecipe, Recipe, RecipeSummary, User};
use crate::filter::{Page, RecipeFilter};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Recipes ---
    /// Summaries of the recipes matching `filter`, ordered by creation time then id.
    async fn list_recipes(&self, filter: &RecipeFilter, page: Page)
        -> PortResult<Vec<RecipeSummary>>;

    async fn get_recipe(&self, recipe_id: &str) -> PortResult<Recipe>;

    /// Like `get_recipe`, but a recipe owned by someone else is `NotFound`.
    async fn get_recipe_owned_by(&self, recipe_id: &str, user_id: &str) -> PortResult<Recipe>;

    async fn create_recipe(&self, recipe: NewRecipe) -> PortResult<Recipe>;

    /// Persists every mutable field of `recipe`, including `updated_at`.
    async fn update_recipe(&self, recipe: &Recipe) -> PortResult<()>;

    /// Deletes the recipe only if `user_id` owns it; otherwise `NotFound`.
    async fn delete_recipe(&self, recipe_id: &str, user_id: &str) -> PortResult<()>;

    // --- Comments ---
    async fn list_comments(&self, recipe_id: &str) -> PortResult<Vec<Comment>>;

    async fn create_comment(&self, comment: NewComment) -> PortResult<Comment>;

    /// Deletes the comment only if `user_id` wrote it; otherwise `NotFound`.
    async fn delete_comment(&self, comment_id: &str, user_id: &str) -> PortResult<()>;

    // --- Users (read-only) ---
    async fn get_user(&self, user_id: &str) -> PortResult<User>;

    /// Fetches every known user among `user_ids` in a single lookup.
    async fn get_users_by_ids(&self, user_ids: &[String]) -> PortResult<Vec<User>>;
}
