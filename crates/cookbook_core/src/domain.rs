//! crates/cookbook_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};

/// A single line of a recipe's ingredient list.
#[derive(Debug, Clone, PartialEq)]
pub struct Ingredient {
    pub quantity: f64,
    pub unit_of_measurement: String,
    pub product: String,
}

/// A single step of a recipe's directions.
#[derive(Debug, Clone, PartialEq)]
pub struct Direction {
    pub description: String,
}

/// A recipe as stored, owned by exactly one user.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub servings: Option<i32>,
    pub total_time_in_minutes: Option<i32>,
    pub ingredients: Vec<Ingredient>,
    pub directions: Vec<Direction>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The projection of a recipe returned by list queries.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeSummary {
    pub id: String,
    pub title: String,
    pub servings: Option<i32>,
    pub total_time_in_minutes: Option<i32>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Recipe> for RecipeSummary {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id.clone(),
            title: recipe.title.clone(),
            servings: recipe.servings,
            total_time_in_minutes: recipe.total_time_in_minutes,
            updated_at: recipe.updated_at,
        }
    }
}

/// Everything needed to insert a recipe. Ids and timestamps are assigned by storage.
#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub servings: Option<i32>,
    pub total_time_in_minutes: Option<i32>,
    pub ingredients: Vec<Ingredient>,
    pub directions: Vec<Direction>,
}

/// A partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct RecipePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub servings: Option<i32>,
    pub total_time_in_minutes: Option<i32>,
    pub ingredients: Option<Vec<Ingredient>>,
    pub directions: Option<Vec<Direction>>,
}

impl RecipePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.servings.is_none()
            && self.total_time_in_minutes.is_none()
            && self.ingredients.is_none()
            && self.directions.is_none()
    }
}

impl Recipe {
    /// Overwrites every field the patch carries and stamps `updated_at`,
    /// even when the patch is empty.
    pub fn apply_patch(&mut self, patch: RecipePatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(servings) = patch.servings {
            self.servings = Some(servings);
        }
        if let Some(total_time_in_minutes) = patch.total_time_in_minutes {
            self.total_time_in_minutes = Some(total_time_in_minutes);
        }
        if let Some(ingredients) = patch.ingredients {
            self.ingredients = ingredients;
        }
        if let Some(directions) = patch.directions {
            self.directions = directions;
        }
        self.updated_at = now;
    }
}

/// A comment left on a recipe. Immutable once written.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: String,
    pub recipe_id: String,
    pub user_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub recipe_id: String,
    pub user_id: String,
    pub text: String,
}

// A user record as exposed by the external user store (`idmain`, `name`).
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
}

/// The `{id, name}` projection embedded next to recipes and comments.
/// Both fields are `None` when the author could not be found.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserSummary {
    pub id: Option<String>,
    pub name: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: Some(user.id.clone()),
            name: Some(user.name.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn sample_recipe() -> Recipe {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        Recipe {
            id: "r1".to_string(),
            user_id: "u1".to_string(),
            title: "Soup".to_string(),
            description: Some("Hot".to_string()),
            servings: Some(4),
            total_time_in_minutes: Some(30),
            ingredients: vec![Ingredient {
                quantity: 1.0,
                unit_of_measurement: "L".to_string(),
                product: "water".to_string(),
            }],
            directions: vec![Direction {
                description: "boil".to_string(),
            }],
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_empty_patch_only_touches_updated_at() {
        let mut recipe = sample_recipe();
        let before = recipe.clone();
        let now = before.updated_at + Duration::minutes(5);

        let patch = RecipePatch::default();
        assert!(patch.is_empty());
        recipe.apply_patch(patch, now);

        assert_eq!(recipe.updated_at, now);
        assert_eq!(
            Recipe {
                updated_at: before.updated_at,
                ..recipe
            },
            before
        );
    }

    #[test]
    fn test_patch_replaces_only_supplied_fields() {
        let mut recipe = sample_recipe();
        let now = recipe.updated_at + Duration::seconds(1);

        recipe.apply_patch(
            RecipePatch {
                title: Some("Stew".to_string()),
                directions: Some(vec![]),
                ..Default::default()
            },
            now,
        );

        assert_eq!(recipe.title, "Stew");
        assert!(recipe.directions.is_empty());
        assert_eq!(recipe.description.as_deref(), Some("Hot"));
        assert_eq!(recipe.servings, Some(4));
        assert_eq!(recipe.ingredients.len(), 1);
    }

    #[test]
    fn test_zero_servings_is_a_real_update() {
        let mut recipe = sample_recipe();
        let now = recipe.updated_at;

        recipe.apply_patch(
            RecipePatch {
                servings: Some(0),
                total_time_in_minutes: Some(0),
                ..Default::default()
            },
            now,
        );

        assert_eq!(recipe.servings, Some(0));
        assert_eq!(recipe.total_time_in_minutes, Some(0));
    }

    #[test]
    fn test_summary_projection() {
        let recipe = sample_recipe();
        let summary = RecipeSummary::from(&recipe);
        assert_eq!(summary.id, "r1");
        assert_eq!(summary.servings, Some(4));
        assert_eq!(summary.updated_at, recipe.updated_at);
    }
}
