//! services/api/src/adapters/memory.rs
//!
//! An in-process implementation of the `DatabaseService` port. Used by the
//! test-suite and selected at runtime with `DATABASE_URL=memory://`.

use async_trait::async_trait;
use chrono::Utc;
use cookbook_core::domain::{Comment, NewComment, NewRecipe, Recipe, RecipeSummary, User};
use cookbook_core::filter::{Page, RecipeFilter};
use cookbook_core::ports::{DatabaseService, PortError, PortResult};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryDb {
    recipes: RwLock<Vec<Recipe>>,
    comments: RwLock<Vec<Comment>>,
    users: RwLock<Vec<User>>,
}

impl InMemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the user table, which this service otherwise only reads.
    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: RwLock::new(users),
            ..Self::default()
        }
    }

    pub async fn comment_count(&self) -> usize {
        self.comments.read().await.len()
    }
}

fn recipe_not_found(recipe_id: &str) -> PortError {
    PortError::NotFound(format!("Recipe {} not found", recipe_id))
}

#[async_trait]
impl DatabaseService for InMemoryDb {
    async fn list_recipes(
        &self,
        filter: &RecipeFilter,
        page: Page,
    ) -> PortResult<Vec<RecipeSummary>> {
        let recipes = self.recipes.read().await;
        let mut matching: Vec<&Recipe> = recipes.iter().filter(|r| filter.matches(r)).collect();
        matching.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        Ok(page
            .slice(matching)
            .into_iter()
            .map(RecipeSummary::from)
            .collect())
    }

    async fn get_recipe(&self, recipe_id: &str) -> PortResult<Recipe> {
        self.recipes
            .read()
            .await
            .iter()
            .find(|r| r.id == recipe_id)
            .cloned()
            .ok_or_else(|| recipe_not_found(recipe_id))
    }

    async fn get_recipe_owned_by(&self, recipe_id: &str, user_id: &str) -> PortResult<Recipe> {
        self.recipes
            .read()
            .await
            .iter()
            .find(|r| r.id == recipe_id && r.user_id == user_id)
            .cloned()
            .ok_or_else(|| recipe_not_found(recipe_id))
    }

    async fn create_recipe(&self, recipe: NewRecipe) -> PortResult<Recipe> {
        let now = Utc::now();
        let stored = Recipe {
            id: Uuid::new_v4().to_string(),
            user_id: recipe.user_id,
            title: recipe.title,
            description: recipe.description,
            servings: recipe.servings,
            total_time_in_minutes: recipe.total_time_in_minutes,
            ingredients: recipe.ingredients,
            directions: recipe.directions,
            created_at: now,
            updated_at: now,
        };
        self.recipes.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn update_recipe(&self, recipe: &Recipe) -> PortResult<()> {
        let mut recipes = self.recipes.write().await;
        let slot = recipes
            .iter_mut()
            .find(|r| r.id == recipe.id)
            .ok_or_else(|| recipe_not_found(&recipe.id))?;
        // Ownership and creation time are not updatable.
        *slot = Recipe {
            user_id: slot.user_id.clone(),
            created_at: slot.created_at,
            ..recipe.clone()
        };
        Ok(())
    }

    async fn delete_recipe(&self, recipe_id: &str, user_id: &str) -> PortResult<()> {
        let mut recipes = self.recipes.write().await;
        let position = recipes
            .iter()
            .position(|r| r.id == recipe_id && r.user_id == user_id)
            .ok_or_else(|| recipe_not_found(recipe_id))?;
        recipes.remove(position);
        drop(recipes);

        self.comments
            .write()
            .await
            .retain(|c| c.recipe_id != recipe_id);
        Ok(())
    }

    async fn list_comments(&self, recipe_id: &str) -> PortResult<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .comments
            .read()
            .await
            .iter()
            .filter(|c| c.recipe_id == recipe_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        Ok(comments)
    }

    async fn create_comment(&self, comment: NewComment) -> PortResult<Comment> {
        if !self
            .recipes
            .read()
            .await
            .iter()
            .any(|r| r.id == comment.recipe_id)
        {
            return Err(recipe_not_found(&comment.recipe_id));
        }

        let stored = Comment {
            id: Uuid::new_v4().to_string(),
            recipe_id: comment.recipe_id,
            user_id: comment.user_id,
            text: comment.text,
            created_at: Utc::now(),
        };
        self.comments.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn delete_comment(&self, comment_id: &str, user_id: &str) -> PortResult<()> {
        let mut comments = self.comments.write().await;
        let position = comments
            .iter()
            .position(|c| c.id == comment_id && c.user_id == user_id)
            .ok_or_else(|| PortError::NotFound(format!("Comment {} not found", comment_id)))?;
        comments.remove(position);
        Ok(())
    }

    async fn get_user(&self, user_id: &str) -> PortResult<User> {
        self.users
            .read()
            .await
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound("user not found".to_string()))
    }

    async fn get_users_by_ids(&self, user_ids: &[String]) -> PortResult<Vec<User>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .filter(|u| user_ids.contains(&u.id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cookbook_core::domain::{Direction, Ingredient};
    use cookbook_core::filter::Predicate;

    fn new_recipe(user_id: &str, title: &str) -> NewRecipe {
        NewRecipe {
            user_id: user_id.to_string(),
            title: title.to_string(),
            description: None,
            servings: Some(2),
            total_time_in_minutes: None,
            ingredients: vec![Ingredient {
                quantity: 1.0,
                unit_of_measurement: "L".to_string(),
                product: "water".to_string(),
            }],
            directions: vec![Direction {
                description: "boil".to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn test_delete_recipe_cascades_to_comments() {
        let db = InMemoryDb::new();
        let recipe = db.create_recipe(new_recipe("u1", "Soup")).await.unwrap();
        db.create_comment(NewComment {
            recipe_id: recipe.id.clone(),
            user_id: "u2".to_string(),
            text: "yum".to_string(),
        })
        .await
        .unwrap();
        assert_eq!(db.comment_count().await, 1);

        db.delete_recipe(&recipe.id, "u1").await.unwrap();
        assert_eq!(db.comment_count().await, 0);
    }

    #[tokio::test]
    async fn test_comment_on_deleted_recipe_is_not_found() {
        let db = InMemoryDb::new();
        let recipe = db.create_recipe(new_recipe("u1", "Soup")).await.unwrap();
        db.delete_recipe(&recipe.id, "u1").await.unwrap();

        let result = db
            .create_comment(NewComment {
                recipe_id: recipe.id.clone(),
                user_id: "u2".to_string(),
                text: "too late".to_string(),
            })
            .await;
        assert!(matches!(result, Err(PortError::NotFound(_))));
        assert_eq!(db.comment_count().await, 0);
    }

    #[tokio::test]
    async fn test_update_keeps_owner_and_created_at() {
        let db = InMemoryDb::new();
        let recipe = db.create_recipe(new_recipe("u1", "Soup")).await.unwrap();

        let mut changed = recipe.clone();
        changed.user_id = "intruder".to_string();
        changed.title = "Stew".to_string();
        db.update_recipe(&changed).await.unwrap();

        let stored = db.get_recipe(&recipe.id).await.unwrap();
        assert_eq!(stored.title, "Stew");
        assert_eq!(stored.user_id, "u1");
        assert_eq!(stored.created_at, recipe.created_at);
    }

    #[tokio::test]
    async fn test_list_applies_filter_then_page() {
        let db = InMemoryDb::new();
        for title in ["Soup 1", "Bread", "Soup 2", "Soup 3"] {
            db.create_recipe(new_recipe("u1", title)).await.unwrap();
        }
        let filter = RecipeFilter::new(vec![Predicate::TitleContains("Soup".to_string())]);

        let page = db
            .list_recipes(&filter, Page { skip: 1, count: 5 })
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
        assert!(page.iter().all(|r| r.title.starts_with("Soup")));
    }

    #[tokio::test]
    async fn test_users_by_ids_ignores_unknown() {
        let db = InMemoryDb::with_users(vec![User {
            id: "u1".to_string(),
            name: "Ada".to_string(),
        }]);
        let users = db
            .get_users_by_ids(&["u1".to_string(), "ghost".to_string()])
            .await
            .unwrap();
        assert_eq!(users.len(), 1);
        assert!(matches!(db.get_user("ghost").await, Err(PortError::NotFound(_))));
    }
}
