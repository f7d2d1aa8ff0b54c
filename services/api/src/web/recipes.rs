//! services/api/src/web/recipes.rs
//!
//! Axum handlers for the `/recipes` resource.

use crate::error::ApiError;
use crate::web::rest::{
    query_items, required_user_id, to_iso8601, DirectionBody, ErrorResponse, IdResponse,
    IngredientBody, UserSummaryBody,
};
use crate::web::extract::ApiJson;
use crate::web::state::AppState;
use axum::{
    extract::{Path, RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use cookbook_core::domain::{NewRecipe, Recipe, RecipePatch, RecipeSummary, UserSummary};
use cookbook_core::filter::{Page, RecipeFilter};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use utoipa::ToSchema;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// A number that clients may also send as a numeric string (`"4"`).
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum LooseNumber {
    Number(f64),
    Text(String),
}

impl LooseNumber {
    /// Converts to a whole, non-negative count. An empty string counts as absent.
    fn to_count(&self, field: &str) -> Result<Option<i32>, ApiError> {
        let value = match self {
            LooseNumber::Number(n) => *n,
            LooseNumber::Text(s) if s.trim().is_empty() => return Ok(None),
            LooseNumber::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| ApiError::bad_request(format!("{} must be a number", field)))?,
        };
        if !value.is_finite() || value.fract() != 0.0 || value < 0.0 || value > f64::from(i32::MAX) {
            return Err(ApiError::bad_request(format!(
                "{} must be a whole, non-negative number",
                field
            )));
        }
        Ok(Some(value as i32))
    }
}

fn count_field(value: Option<&LooseNumber>, field: &str) -> Result<Option<i32>, ApiError> {
    match value {
        Some(number) => number.to_count(field),
        None => Ok(None),
    }
}

/// Body of `POST /recipes` and `PATCH /recipes/{id}`. On update, every
/// absent or `null` field keeps its stored value.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub servings: Option<LooseNumber>,
    pub total_time_in_minutes: Option<LooseNumber>,
    pub ingredients: Option<Vec<IngredientBody>>,
    pub directions: Option<Vec<DirectionBody>>,
}

impl RecipeInput {
    fn into_new_recipe(self, user_id: String) -> Result<NewRecipe, ApiError> {
        let servings = count_field(self.servings.as_ref(), "servings")?;
        let total_time_in_minutes =
            count_field(self.total_time_in_minutes.as_ref(), "totalTimeInMinutes")?;
        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ApiError::bad_request("missing title"))?;
        let ingredients = self
            .ingredients
            .ok_or_else(|| ApiError::bad_request("missing ingredients"))?;
        let directions = self
            .directions
            .ok_or_else(|| ApiError::bad_request("missing directions"))?;

        Ok(NewRecipe {
            user_id,
            title,
            description: self.description,
            servings,
            total_time_in_minutes,
            ingredients: ingredients.into_iter().map(Into::into).collect(),
            directions: directions.into_iter().map(Into::into).collect(),
        })
    }

    fn into_patch(self) -> Result<RecipePatch, ApiError> {
        if matches!(&self.title, Some(title) if title.trim().is_empty()) {
            return Err(ApiError::bad_request("title cannot be empty"));
        }
        Ok(RecipePatch {
            servings: count_field(self.servings.as_ref(), "servings")?,
            total_time_in_minutes: count_field(
                self.total_time_in_minutes.as_ref(),
                "totalTimeInMinutes",
            )?,
            title: self.title,
            description: self.description,
            ingredients: self
                .ingredients
                .map(|list| list.into_iter().map(Into::into).collect()),
            directions: self
                .directions
                .map(|list| list.into_iter().map(Into::into).collect()),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSummaryResponse {
    pub id: String,
    pub title: String,
    pub servings: Option<i32>,
    pub total_time_in_minutes: Option<i32>,
    pub updated_at: String,
}

impl From<RecipeSummary> for RecipeSummaryResponse {
    fn from(summary: RecipeSummary) -> Self {
        Self {
            updated_at: to_iso8601(&summary.updated_at),
            id: summary.id,
            title: summary.title,
            servings: summary.servings,
            total_time_in_minutes: summary.total_time_in_minutes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeResponse {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub servings: Option<i32>,
    pub total_time_in_minutes: Option<i32>,
    pub ingredients: Vec<IngredientBody>,
    pub directions: Vec<DirectionBody>,
    pub created_at: String,
    pub updated_at: String,
    pub user: UserSummaryBody,
}

impl RecipeResponse {
    fn new(recipe: Recipe, user: UserSummary) -> Self {
        Self {
            created_at: to_iso8601(&recipe.created_at),
            updated_at: to_iso8601(&recipe.updated_at),
            id: recipe.id,
            title: recipe.title,
            description: recipe.description,
            servings: recipe.servings,
            total_time_in_minutes: recipe.total_time_in_minutes,
            ingredients: recipe.ingredients.into_iter().map(Into::into).collect(),
            directions: recipe.directions.into_iter().map(Into::into).collect(),
            user: user.into(),
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// List recipes, optionally filtered and paginated.
///
/// All supplied filters must hold. Results are ordered by creation time.
#[utoipa::path(
    get,
    path = "/recipes",
    tag = "recipes",
    params(
        ("title" = Option<String>, Query, description = "Substring of the title."),
        ("servingsFrom" = Option<f64>, Query, description = "Minimum servings (inclusive)."),
        ("servingsTo" = Option<f64>, Query, description = "Maximum servings (inclusive)."),
        ("totalTimeInMinutesFrom" = Option<f64>, Query, description = "Minimum total time (inclusive)."),
        ("totalTimeInMinutesTo" = Option<f64>, Query, description = "Maximum total time (inclusive)."),
        ("ingredients" = Option<String>, Query, description = "Substring of any ingredient's product."),
        ("userId" = Option<String>, Query, description = "Only recipes owned by this user."),
        ("skip" = Option<i64>, Query, description = "Rows to skip (default 0)."),
        ("count" = Option<i64>, Query, description = "Rows to return (default 20).")
    ),
    responses(
        (status = 200, description = "Matching recipes", body = [RecipeSummaryResponse]),
        (status = 400, description = "A numeric parameter is invalid", body = ErrorResponse)
    )
)]
pub async fn list_recipes_handler(
    State(app_state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Result<Json<Vec<RecipeSummaryResponse>>, ApiError> {
    let items = query_items(query);
    let filter = RecipeFilter::from_query(&items)?;
    let page = Page::from_query(&items)?;
    debug!(?filter, ?page, "Listing recipes");

    let recipes = app_state.db.list_recipes(&filter, page).await?;
    Ok(Json(recipes.into_iter().map(Into::into).collect()))
}

/// Fetch one recipe with its owner's `{id, name}`.
#[utoipa::path(
    get,
    path = "/recipes/{id}",
    tag = "recipes",
    params(("id" = String, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "The recipe", body = RecipeResponse),
        (status = 404, description = "Recipe or owner not found", body = ErrorResponse)
    )
)]
pub async fn show_recipe_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<RecipeResponse>, ApiError> {
    let recipe = app_state.db.get_recipe(&id).await?;
    // Unlike comment authors, a recipe's owner has to exist.
    let owner = app_state.db.get_user(&recipe.user_id).await?;
    Ok(Json(RecipeResponse::new(recipe, UserSummary::from(&owner))))
}

/// Create a recipe owned by `userId`.
#[utoipa::path(
    post,
    path = "/recipes",
    tag = "recipes",
    request_body = RecipeInput,
    params(("userId" = String, Query, description = "The owning user.")),
    responses(
        (status = 201, description = "Recipe created", body = IdResponse),
        (status = 400, description = "Missing user id or required field", body = ErrorResponse)
    )
)]
pub async fn create_recipe_handler(
    State(app_state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
    ApiJson(input): ApiJson<RecipeInput>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = required_user_id(&query_items(query))?;
    let new_recipe = input.into_new_recipe(user_id)?;

    let recipe = app_state.db.create_recipe(new_recipe).await?;
    info!(recipe_id = %recipe.id, user_id = %recipe.user_id, "Recipe created");

    Ok((StatusCode::CREATED, Json(IdResponse { id: recipe.id })))
}

/// Partially update a recipe owned by `userId`.
#[utoipa::path(
    patch,
    path = "/recipes/{id}",
    tag = "recipes",
    request_body = RecipeInput,
    params(
        ("id" = String, Path, description = "Recipe id"),
        ("userId" = String, Query, description = "The owning user.")
    ),
    responses(
        (status = 200, description = "Recipe updated", body = IdResponse),
        (status = 400, description = "Missing user id or invalid field", body = ErrorResponse),
        (status = 404, description = "No such recipe owned by this user", body = ErrorResponse)
    )
)]
pub async fn update_recipe_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    RawQuery(query): RawQuery,
    input: Option<ApiJson<RecipeInput>>,
) -> Result<Json<IdResponse>, ApiError> {
    let user_id = required_user_id(&query_items(query))?;
    let mut recipe = app_state.db.get_recipe_owned_by(&id, &user_id).await?;

    // No body at all is the same as `{}`.
    let patch = input
        .map(|ApiJson(input)| input)
        .unwrap_or_default()
        .into_patch()?;
    let unchanged = patch.is_empty();
    recipe.apply_patch(patch, Utc::now());
    app_state.db.update_recipe(&recipe).await?;
    info!(recipe_id = %id, user_id = %user_id, unchanged, "Recipe updated");

    Ok(Json(IdResponse { id }))
}

/// Delete a recipe owned by `userId`.
#[utoipa::path(
    delete,
    path = "/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = String, Path, description = "Recipe id"),
        ("userId" = String, Query, description = "The owning user.")
    ),
    responses(
        (status = 200, description = "Recipe deleted", body = IdResponse),
        (status = 400, description = "Missing user id", body = ErrorResponse),
        (status = 404, description = "No such recipe owned by this user", body = ErrorResponse)
    )
)]
pub async fn destroy_recipe_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Json<IdResponse>, ApiError> {
    let user_id = required_user_id(&query_items(query))?;
    app_state.db.delete_recipe(&id, &user_id).await?;
    info!(recipe_id = %id, user_id = %user_id, "Recipe deleted");

    Ok(Json(IdResponse { id }))
}
