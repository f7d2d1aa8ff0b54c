//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cookbook_core::domain::{
    Comment, Direction, Ingredient, NewComment, NewRecipe, Recipe, RecipeSummary, User,
};
use cookbook_core::filter::{Page, Predicate, RecipeFilter};
use cookbook_core::ports::{DatabaseService, PortError, PortResult};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

const RECIPE_COLUMNS: &str = "id, user_id, title, description, servings, total_time_in_minutes, \
     ingredients, directions, created_at, updated_at";
const COMMENT_COLUMNS: &str = "id, recipe_id, user_id, text, created_at";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

// Stored inside the `ingredients` JSONB column; the keys match the public API.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IngredientRecord {
    quantity: f64,
    unit_of_measurement: String,
    product: String,
}

#[derive(Serialize, Deserialize)]
struct DirectionRecord {
    description: String,
}

#[derive(FromRow)]
struct RecipeRecord {
    id: String,
    user_id: String,
    title: String,
    description: Option<String>,
    servings: Option<i32>,
    total_time_in_minutes: Option<i32>,
    ingredients: Json<Vec<IngredientRecord>>,
    directions: Json<Vec<DirectionRecord>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl RecipeRecord {
    fn to_domain(self) -> Recipe {
        Recipe {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            description: self.description,
            servings: self.servings,
            total_time_in_minutes: self.total_time_in_minutes,
            ingredients: self
                .ingredients
                .0
                .into_iter()
                .map(|i| Ingredient {
                    quantity: i.quantity,
                    unit_of_measurement: i.unit_of_measurement,
                    product: i.product,
                })
                .collect(),
            directions: self
                .directions
                .0
                .into_iter()
                .map(|d| Direction {
                    description: d.description,
                })
                .collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct RecipeSummaryRecord {
    id: String,
    title: String,
    servings: Option<i32>,
    total_time_in_minutes: Option<i32>,
    updated_at: DateTime<Utc>,
}
impl RecipeSummaryRecord {
    fn to_domain(self) -> RecipeSummary {
        RecipeSummary {
            id: self.id,
            title: self.title,
            servings: self.servings,
            total_time_in_minutes: self.total_time_in_minutes,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct CommentRecord {
    id: String,
    recipe_id: String,
    user_id: String,
    text: String,
    created_at: DateTime<Utc>,
}
impl CommentRecord {
    fn to_domain(self) -> Comment {
        Comment {
            id: self.id,
            recipe_id: self.recipe_id,
            user_id: self.user_id,
            text: self.text,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct UserRecord {
    idmain: String,
    name: String,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.idmain,
            name: self.name,
        }
    }
}

fn ingredient_records(ingredients: &[Ingredient]) -> Json<Vec<IngredientRecord>> {
    Json(
        ingredients
            .iter()
            .map(|i| IngredientRecord {
                quantity: i.quantity,
                unit_of_measurement: i.unit_of_measurement.clone(),
                product: i.product.clone(),
            })
            .collect(),
    )
}

fn direction_records(directions: &[Direction]) -> Json<Vec<DirectionRecord>> {
    Json(
        directions
            .iter()
            .map(|d| DirectionRecord {
                description: d.description.clone(),
            })
            .collect(),
    )
}

/// Wraps `needle` for `LIKE`, escaping the pattern metacharacters it contains.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Appends one SQL condition per predicate, joined with `AND`.
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &RecipeFilter) {
    for (index, predicate) in filter.predicates().iter().enumerate() {
        builder.push(if index == 0 { " WHERE " } else { " AND " });
        match predicate {
            Predicate::TitleContains(needle) => {
                builder.push("title LIKE ").push_bind(like_pattern(needle));
            }
            Predicate::ServingsAtLeast(min) => {
                builder.push("servings >= ").push_bind(*min);
            }
            Predicate::ServingsAtMost(max) => {
                builder.push("servings <= ").push_bind(*max);
            }
            Predicate::TotalTimeAtLeast(min) => {
                builder.push("total_time_in_minutes >= ").push_bind(*min);
            }
            Predicate::TotalTimeAtMost(max) => {
                builder.push("total_time_in_minutes <= ").push_bind(*max);
            }
            Predicate::IngredientContains(needle) => {
                builder
                    .push(
                        "EXISTS (SELECT 1 FROM jsonb_array_elements(ingredients) AS ingredient \
                         WHERE ingredient->>'product' LIKE ",
                    )
                    .push_bind(like_pattern(needle))
                    .push(")");
            }
            Predicate::OwnedBy(user_id) => {
                builder.push("user_id = ").push_bind(user_id.clone());
            }
        }
    }
}

fn not_found_or_unexpected(what: String) -> impl FnOnce(sqlx::Error) -> PortError {
    move |e| match e {
        sqlx::Error::RowNotFound => PortError::NotFound(what),
        _ => PortError::Unexpected(e.to_string()),
    }
}

/// A comment insert that trips the recipe foreign key means the recipe is gone.
fn comment_insert_error(recipe_id: &str, e: sqlx::Error) -> PortError {
    match &e {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            PortError::NotFound(format!("Recipe {} not found", recipe_id))
        }
        _ => PortError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn list_recipes(
        &self,
        filter: &RecipeFilter,
        page: Page,
    ) -> PortResult<Vec<RecipeSummary>> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT id, title, servings, total_time_in_minutes, updated_at FROM recipes",
        );
        push_filter(&mut builder, filter);
        builder
            .push(" ORDER BY created_at ASC, id ASC LIMIT ")
            .push_bind(page.count)
            .push(" OFFSET ")
            .push_bind(page.skip);
        debug!(sql = builder.sql(), "Listing recipes");

        let records = builder
            .build_query_as::<RecipeSummaryRecord>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_recipe(&self, recipe_id: &str) -> PortResult<Recipe> {
        let record = sqlx::query_as::<_, RecipeRecord>(&format!(
            "SELECT {} FROM recipes WHERE id = $1",
            RECIPE_COLUMNS
        ))
        .bind(recipe_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or_unexpected(format!("Recipe {} not found", recipe_id)))?;
        Ok(record.to_domain())
    }

    async fn get_recipe_owned_by(&self, recipe_id: &str, user_id: &str) -> PortResult<Recipe> {
        let record = sqlx::query_as::<_, RecipeRecord>(&format!(
            "SELECT {} FROM recipes WHERE id = $1 AND user_id = $2",
            RECIPE_COLUMNS
        ))
        .bind(recipe_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or_unexpected(format!("Recipe {} not found", recipe_id)))?;
        Ok(record.to_domain())
    }

    async fn create_recipe(&self, recipe: NewRecipe) -> PortResult<Recipe> {
        let record = sqlx::query_as::<_, RecipeRecord>(&format!(
            "INSERT INTO recipes (id, user_id, title, description, servings, total_time_in_minutes, \
             ingredients, directions) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            RECIPE_COLUMNS
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(&recipe.user_id)
        .bind(&recipe.title)
        .bind(&recipe.description)
        .bind(recipe.servings)
        .bind(recipe.total_time_in_minutes)
        .bind(ingredient_records(&recipe.ingredients))
        .bind(direction_records(&recipe.directions))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(record.to_domain())
    }

    async fn update_recipe(&self, recipe: &Recipe) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE recipes SET title = $2, description = $3, servings = $4, \
             total_time_in_minutes = $5, ingredients = $6, directions = $7, updated_at = $8 \
             WHERE id = $1",
        )
        .bind(&recipe.id)
        .bind(&recipe.title)
        .bind(&recipe.description)
        .bind(recipe.servings)
        .bind(recipe.total_time_in_minutes)
        .bind(ingredient_records(&recipe.ingredients))
        .bind(direction_records(&recipe.directions))
        .bind(recipe.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Recipe {} not found", recipe.id)));
        }
        Ok(())
    }

    async fn delete_recipe(&self, recipe_id: &str, user_id: &str) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1 AND user_id = $2")
            .bind(recipe_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Recipe {} not found", recipe_id)));
        }
        Ok(())
    }

    async fn list_comments(&self, recipe_id: &str) -> PortResult<Vec<Comment>> {
        let records = sqlx::query_as::<_, CommentRecord>(&format!(
            "SELECT {} FROM comments WHERE recipe_id = $1 ORDER BY created_at ASC, id ASC",
            COMMENT_COLUMNS
        ))
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn create_comment(&self, comment: NewComment) -> PortResult<Comment> {
        let record = sqlx::query_as::<_, CommentRecord>(&format!(
            "INSERT INTO comments (id, recipe_id, user_id, text) VALUES ($1, $2, $3, $4) RETURNING {}",
            COMMENT_COLUMNS
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(&comment.recipe_id)
        .bind(&comment.user_id)
        .bind(&comment.text)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| comment_insert_error(&comment.recipe_id, e))?;
        Ok(record.to_domain())
    }

    async fn delete_comment(&self, comment_id: &str, user_id: &str) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1 AND user_id = $2")
            .bind(comment_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Comment {} not found", comment_id)));
        }
        Ok(())
    }

    async fn get_user(&self, user_id: &str) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>("SELECT idmain, name FROM users WHERE idmain = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(not_found_or_unexpected("user not found".to_string()))?;
        Ok(record.to_domain())
    }

    async fn get_users_by_ids(&self, user_ids: &[String]) -> PortResult<Vec<User>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let records =
            sqlx::query_as::<_, UserRecord>("SELECT idmain, name FROM users WHERE idmain = ANY($1)")
                .bind(user_ids)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }
}
