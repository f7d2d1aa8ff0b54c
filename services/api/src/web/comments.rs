//! services/api/src/web/comments.rs
//!
//! Axum handlers for the `/recipes/{id}/comments` resource.

use crate::error::ApiError;
use crate::web::rest::{
    query_items, required_user_id, to_iso8601, ErrorResponse, IdResponse, UserSummaryBody,
};
use crate::web::extract::ApiJson;
use crate::web::state::AppState;
use axum::{
    extract::{Path, RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use cookbook_core::domain::NewComment;
use cookbook_core::embed::{attach_authors, author_ids, CommentWithAuthor};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CommentInput {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub text: String,
    pub created_at: String,
    pub user: UserSummaryBody,
}

impl From<CommentWithAuthor> for CommentResponse {
    fn from(joined: CommentWithAuthor) -> Self {
        Self {
            created_at: to_iso8601(&joined.comment.created_at),
            id: joined.comment.id,
            text: joined.comment.text,
            user: joined.user.into(),
        }
    }
}

/// List the comments of a recipe with each author's `{id, name}`.
///
/// Authors are looked up in a single batch; unknown authors render as `{}`.
#[utoipa::path(
    get,
    path = "/recipes/{id}/comments",
    tag = "comments",
    params(("id" = String, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Comments of the recipe", body = [CommentResponse]),
        (status = 400, description = "Missing recipe id", body = ErrorResponse)
    )
)]
pub async fn list_comments_handler(
    State(app_state): State<Arc<AppState>>,
    Path(recipe_id): Path<String>,
) -> Result<Json<Vec<CommentResponse>>, ApiError> {
    if recipe_id.trim().is_empty() {
        return Err(ApiError::bad_request("missing recipeId"));
    }

    let comments = app_state.db.list_comments(&recipe_id).await?;
    let user_ids = author_ids(&comments);
    debug!(recipe_id = %recipe_id, comments = comments.len(), authors = user_ids.len(), "Listing comments");
    let users = app_state.db.get_users_by_ids(&user_ids).await?;

    Ok(Json(
        attach_authors(comments, &users)
            .into_iter()
            .map(Into::into)
            .collect(),
    ))
}

/// Comment on a recipe as `userId`.
#[utoipa::path(
    post,
    path = "/recipes/{id}/comments",
    tag = "comments",
    request_body = CommentInput,
    params(
        ("id" = String, Path, description = "Recipe id"),
        ("userId" = String, Query, description = "The author.")
    ),
    responses(
        (status = 201, description = "Comment created", body = IdResponse),
        (status = 400, description = "Missing user id or text", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn create_comment_handler(
    State(app_state): State<Arc<AppState>>,
    Path(recipe_id): Path<String>,
    RawQuery(query): RawQuery,
    ApiJson(input): ApiJson<CommentInput>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = required_user_id(&query_items(query))?;
    let text = input
        .text
        .ok_or_else(|| ApiError::bad_request("missing text"))?;

    // The parent has to exist before anything is written.
    app_state.db.get_recipe(&recipe_id).await?;

    let comment = app_state
        .db
        .create_comment(NewComment {
            recipe_id,
            user_id,
            text,
        })
        .await?;
    info!(comment_id = %comment.id, recipe_id = %comment.recipe_id, user_id = %comment.user_id, "Comment created");

    Ok((StatusCode::CREATED, Json(IdResponse { id: comment.id })))
}

/// Delete a comment written by `userId`.
#[utoipa::path(
    delete,
    path = "/recipes/{id}/comments/{comment_id}",
    tag = "comments",
    params(
        ("id" = String, Path, description = "Recipe id"),
        ("comment_id" = String, Path, description = "Comment id"),
        ("userId" = String, Query, description = "The author.")
    ),
    responses(
        (status = 200, description = "Comment deleted", body = IdResponse),
        (status = 400, description = "Missing user id", body = ErrorResponse),
        (status = 404, description = "No such comment by this user", body = ErrorResponse)
    )
)]
pub async fn destroy_comment_handler(
    State(app_state): State<Arc<AppState>>,
    Path((_recipe_id, comment_id)): Path<(String, String)>,
    RawQuery(query): RawQuery,
) -> Result<Json<IdResponse>, ApiError> {
    let user_id = required_user_id(&query_items(query))?;
    app_state.db.delete_comment(&comment_id, &user_id).await?;
    info!(comment_id = %comment_id, user_id = %user_id, "Comment deleted");

    Ok(Json(IdResponse { id: comment_id }))
}
