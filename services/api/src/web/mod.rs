pub mod comments;
pub mod extract;
pub mod recipes;
pub mod rest;
pub mod state;

use crate::web::{rest::ApiDoc, state::AppState};
use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        Method,
    },
    routing::{delete, get},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Builds the complete application: the REST routes plus the Swagger UI.
pub fn router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(app_state.config.cors_allowed_origin.clone())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    let api_router = Router::new()
        .route(
            "/recipes",
            get(recipes::list_recipes_handler).post(recipes::create_recipe_handler),
        )
        .route(
            "/recipes/{id}",
            get(recipes::show_recipe_handler)
                .patch(recipes::update_recipe_handler)
                .delete(recipes::destroy_recipe_handler),
        )
        .route(
            "/recipes/{id}/comments",
            get(comments::list_comments_handler).post(comments::create_comment_handler),
        )
        .route(
            "/recipes/{id}/comments/{comment_id}",
            delete(comments::destroy_comment_handler),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
