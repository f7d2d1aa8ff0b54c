//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification and the payload
//! structs shared by the recipe and comment handlers.

use crate::error::ApiError;
use crate::web::{comments, recipes};
use chrono::{DateTime, SecondsFormat, Utc};
use cookbook_core::domain::{Direction, Ingredient, UserSummary};
use cookbook_core::query::QueryItems;
use serde::{Deserialize, Serialize, Serializer};
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        recipes::list_recipes_handler,
        recipes::show_recipe_handler,
        recipes::create_recipe_handler,
        recipes::update_recipe_handler,
        recipes::destroy_recipe_handler,
        comments::list_comments_handler,
        comments::create_comment_handler,
        comments::destroy_comment_handler,
    ),
    components(
        schemas(
            ErrorResponse,
            IdResponse,
            IngredientBody,
            DirectionBody,
            UserSummaryBody,
            recipes::LooseNumber,
            recipes::RecipeInput,
            recipes::RecipeSummaryResponse,
            recipes::RecipeResponse,
            comments::CommentInput,
            comments::CommentResponse,
        )
    ),
    tags(
        (name = "recipes", description = "Recipes with their ingredients and directions."),
        (name = "comments", description = "Comments left on recipes.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Shared Payload Structs
//=========================================================================================

/// Body of every error response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Returned by every mutating endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IdResponse {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngredientBody {
    #[serde(serialize_with = "serialize_quantity")]
    pub quantity: f64,
    pub unit_of_measurement: String,
    pub product: String,
}

/// Largest integer an `f64` holds exactly (2^53).
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Writes whole quantities as integers, so `1` reads back as `1` and not `1.0`.
fn serialize_quantity<S: Serializer>(quantity: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if quantity.is_finite() && quantity.fract() == 0.0 && quantity.abs() <= MAX_EXACT_INTEGER {
        serializer.serialize_i64(*quantity as i64)
    } else {
        serializer.serialize_f64(*quantity)
    }
}

impl From<IngredientBody> for Ingredient {
    fn from(body: IngredientBody) -> Self {
        Ingredient {
            quantity: body.quantity,
            unit_of_measurement: body.unit_of_measurement,
            product: body.product,
        }
    }
}

impl From<Ingredient> for IngredientBody {
    fn from(ingredient: Ingredient) -> Self {
        IngredientBody {
            quantity: ingredient.quantity,
            unit_of_measurement: ingredient.unit_of_measurement,
            product: ingredient.product,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DirectionBody {
    pub description: String,
}

impl From<DirectionBody> for Direction {
    fn from(body: DirectionBody) -> Self {
        Direction {
            description: body.description,
        }
    }
}

impl From<Direction> for DirectionBody {
    fn from(direction: Direction) -> Self {
        DirectionBody {
            description: direction.description,
        }
    }
}

/// `{id, name}` of a user, or `{}` when the user is unknown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserSummaryBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl From<UserSummary> for UserSummaryBody {
    fn from(summary: UserSummary) -> Self {
        UserSummaryBody {
            id: summary.id,
            name: summary.name,
        }
    }
}

//=========================================================================================
// Helpers
//=========================================================================================

/// Formats a timestamp like `2024-05-01T12:00:00.000Z`.
pub fn to_iso8601(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses the raw query string of a request.
pub fn query_items(raw: Option<String>) -> QueryItems {
    QueryItems::parse(raw.as_deref().unwrap_or_default())
}

/// The acting user, passed as the `userId` query parameter.
pub fn required_user_id(items: &QueryItems) -> Result<String, ApiError> {
    items
        .get_non_empty("userId")
        .map(str::to_string)
        .ok_or_else(|| ApiError::bad_request("missing user id"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_iso8601_has_millis_and_z() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(to_iso8601(&ts), "2024-05-01T12:00:00.000Z");
    }

    #[test]
    fn test_unknown_user_serializes_as_empty_object() {
        let body = UserSummaryBody::from(UserSummary::default());
        assert_eq!(serde_json::to_string(&body).unwrap(), "{}");
    }

    #[test]
    fn test_whole_quantities_serialize_without_fraction() {
        let body = |quantity| IngredientBody {
            quantity,
            unit_of_measurement: "cup".into(),
            product: "rice".into(),
        };
        let whole = serde_json::to_value(body(1.0)).unwrap();
        assert_eq!(whole["quantity"].to_string(), "1");
        let half = serde_json::to_value(body(0.5)).unwrap();
        assert_eq!(half["quantity"].to_string(), "0.5");
        let negative = serde_json::to_value(body(-2.0)).unwrap();
        assert_eq!(negative["quantity"].to_string(), "-2");
    }

    #[test]
    fn test_required_user_id() {
        assert_eq!(
            required_user_id(&QueryItems::parse("userId=u1")).unwrap(),
            "u1"
        );
        assert!(required_user_id(&QueryItems::parse("userId=")).is_err());
        assert!(required_user_id(&QueryItems::default()).is_err());
    }

    #[test]
    fn test_openapi_lists_every_route() {
        let spec = ApiDoc::openapi();
        for path in [
            "/recipes",
            "/recipes/{id}",
            "/recipes/{id}/comments",
            "/recipes/{id}/comments/{comment_id}",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
