//! crates/cookbook_core/src/filter.rs
//!
//! The recipe search predicate and the skip/count window for list queries.
//!
//! A `RecipeFilter` is an AND-combination of `Predicate`s built from the
//! query string. Storage adapters translate each predicate into their own
//! query language; `RecipeFilter::matches` is the reference evaluation used
//! by in-process storage.

use crate::domain::Recipe;
use crate::ports::{PortError, PortResult};
use crate::query::QueryItems;

pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// A single condition a recipe has to satisfy to be listed.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Case-sensitive substring match on the title.
    TitleContains(String),
    ServingsAtLeast(f64),
    ServingsAtMost(f64),
    TotalTimeAtLeast(f64),
    TotalTimeAtMost(f64),
    /// Substring match against the product of any ingredient.
    IngredientContains(String),
    OwnedBy(String),
}

impl Predicate {
    pub fn matches(&self, recipe: &Recipe) -> bool {
        match self {
            Predicate::TitleContains(needle) => recipe.title.contains(needle.as_str()),
            Predicate::ServingsAtLeast(min) => at_least(recipe.servings, *min),
            Predicate::ServingsAtMost(max) => at_most(recipe.servings, *max),
            Predicate::TotalTimeAtLeast(min) => at_least(recipe.total_time_in_minutes, *min),
            Predicate::TotalTimeAtMost(max) => at_most(recipe.total_time_in_minutes, *max),
            Predicate::IngredientContains(needle) => recipe
                .ingredients
                .iter()
                .any(|ingredient| ingredient.product.contains(needle.as_str())),
            Predicate::OwnedBy(user_id) => &recipe.user_id == user_id,
        }
    }
}

// A missing value never satisfies a range bound, the same way NULL compares in SQL.
fn at_least(value: Option<i32>, min: f64) -> bool {
    value.is_some_and(|v| f64::from(v) >= min)
}

fn at_most(value: Option<i32>, max: f64) -> bool {
    value.is_some_and(|v| f64::from(v) <= max)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeFilter {
    predicates: Vec<Predicate>,
}

impl RecipeFilter {
    pub fn new(predicates: Vec<Predicate>) -> Self {
        Self { predicates }
    }

    /// Builds the filter from the list endpoint's query parameters. Empty
    /// parameters are ignored; bounds must be finite numbers.
    pub fn from_query(items: &QueryItems) -> PortResult<Self> {
        let mut predicates = Vec::new();

        if let Some(title) = items.get_non_empty("title") {
            predicates.push(Predicate::TitleContains(title.to_string()));
        }
        if let Some(min) = bound(items, "servingsFrom")? {
            predicates.push(Predicate::ServingsAtLeast(min));
        }
        if let Some(max) = bound(items, "servingsTo")? {
            predicates.push(Predicate::ServingsAtMost(max));
        }
        if let Some(min) = bound(items, "totalTimeInMinutesFrom")? {
            predicates.push(Predicate::TotalTimeAtLeast(min));
        }
        if let Some(max) = bound(items, "totalTimeInMinutesTo")? {
            predicates.push(Predicate::TotalTimeAtMost(max));
        }
        if let Some(product) = items.get_non_empty("ingredients") {
            predicates.push(Predicate::IngredientContains(product.to_string()));
        }
        if let Some(user_id) = items.get_non_empty("userId") {
            predicates.push(Predicate::OwnedBy(user_id.to_string()));
        }

        Ok(Self::new(predicates))
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn matches(&self, recipe: &Recipe) -> bool {
        self.predicates.iter().all(|p| p.matches(recipe))
    }
}

fn bound(items: &QueryItems, key: &str) -> PortResult<Option<f64>> {
    match items.number::<f64>(key)? {
        Some(value) if !value.is_finite() => Err(PortError::BadRequest(format!(
            "'{}' is not a valid number for {}",
            value, key
        ))),
        other => Ok(other),
    }
}

/// The window of a list query: skip `skip` rows, return at most `count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: i64,
    pub count: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            count: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Page {
    pub fn from_query(items: &QueryItems) -> PortResult<Self> {
        let skip = non_negative(items, "skip")?.unwrap_or(0);
        let count = non_negative(items, "count")?.unwrap_or(DEFAULT_PAGE_SIZE);
        Ok(Self { skip, count })
    }

    /// Applies the window to an already ordered sequence.
    pub fn slice<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.skip as usize)
            .take(self.count as usize)
            .collect()
    }
}

fn non_negative(items: &QueryItems, key: &str) -> PortResult<Option<i64>> {
    match items.number::<i64>(key)? {
        Some(value) if value < 0 => Err(PortError::BadRequest(format!(
            "{} must not be negative",
            key
        ))),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Ingredient;
    use chrono::Utc;

    fn recipe(id: &str, title: &str, servings: Option<i32>, products: &[&str]) -> Recipe {
        Recipe {
            id: id.to_string(),
            user_id: "u1".to_string(),
            title: title.to_string(),
            description: None,
            servings,
            total_time_in_minutes: Some(20),
            ingredients: products
                .iter()
                .map(|p| Ingredient {
                    quantity: 1.0,
                    unit_of_measurement: "pc".to_string(),
                    product: p.to_string(),
                })
                .collect(),
            directions: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_no_parameters_builds_no_predicates() {
        let filter = RecipeFilter::from_query(&QueryItems::parse("skip=5&count=2")).unwrap();
        assert!(filter.predicates().is_empty());
        assert!(filter.matches(&recipe("r1", "anything", None, &[])));
    }

    #[test]
    fn test_builds_predicates_in_order() {
        let items = QueryItems::parse(
            "title=Soup&servingsFrom=2&servingsTo=4&totalTimeInMinutesFrom=10\
             &totalTimeInMinutesTo=60&ingredients=onion&userId=u7",
        );
        let filter = RecipeFilter::from_query(&items).unwrap();
        assert_eq!(
            filter.predicates(),
            &[
                Predicate::TitleContains("Soup".to_string()),
                Predicate::ServingsAtLeast(2.0),
                Predicate::ServingsAtMost(4.0),
                Predicate::TotalTimeAtLeast(10.0),
                Predicate::TotalTimeAtMost(60.0),
                Predicate::IngredientContains("onion".to_string()),
                Predicate::OwnedBy("u7".to_string()),
            ]
        );
    }

    #[test]
    fn test_zero_bound_is_kept() {
        let filter = RecipeFilter::from_query(&QueryItems::parse("servingsFrom=0")).unwrap();
        assert_eq!(filter.predicates(), &[Predicate::ServingsAtLeast(0.0)]);
    }

    #[test]
    fn test_invalid_bound_is_rejected() {
        let err = RecipeFilter::from_query(&QueryItems::parse("servingsTo=lots")).unwrap_err();
        assert!(matches!(err, PortError::BadRequest(_)));

        let err = RecipeFilter::from_query(&QueryItems::parse("servingsTo=inf")).unwrap_err();
        assert!(matches!(err, PortError::BadRequest(_)));
    }

    #[test]
    fn test_ranges_are_inclusive_and_skip_missing_values() {
        let filter = RecipeFilter::new(vec![
            Predicate::ServingsAtLeast(2.0),
            Predicate::ServingsAtMost(4.0),
        ]);
        assert!(filter.matches(&recipe("a", "t", Some(2), &[])));
        assert!(filter.matches(&recipe("b", "t", Some(4), &[])));
        assert!(!filter.matches(&recipe("c", "t", Some(5), &[])));
        assert!(!filter.matches(&recipe("d", "t", None, &[])));
    }

    #[test]
    fn test_ingredient_matches_any_product() {
        let predicate = Predicate::IngredientContains("mato".to_string());
        assert!(predicate.matches(&recipe("a", "t", None, &["salt", "tomato"])));
        assert!(!predicate.matches(&recipe("b", "t", None, &["salt"])));
        assert!(!predicate.matches(&recipe("c", "t", None, &[])));
    }

    #[test]
    fn test_conjunction_equals_intersection() {
        let recipes = vec![
            recipe("a", "Tomato Soup", Some(2), &["tomato"]),
            recipe("b", "Tomato Salad", Some(6), &["tomato", "basil"]),
            recipe("c", "Onion Soup", Some(3), &["onion"]),
            recipe("d", "Bread", None, &["flour"]),
        ];
        let predicates = vec![
            Predicate::TitleContains("Soup".to_string()),
            Predicate::ServingsAtMost(4.0),
            Predicate::IngredientContains("tomato".to_string()),
        ];

        let combined: Vec<&str> = recipes
            .iter()
            .filter(|r| RecipeFilter::new(predicates.clone()).matches(r))
            .map(|r| r.id.as_str())
            .collect();
        let intersected: Vec<&str> = recipes
            .iter()
            .filter(|r| predicates.iter().all(|p| RecipeFilter::new(vec![p.clone()]).matches(r)))
            .map(|r| r.id.as_str())
            .collect();

        assert_eq!(combined, intersected);
        assert_eq!(combined, vec!["a"]);
    }

    #[test]
    fn test_page_defaults() {
        assert_eq!(
            Page::from_query(&QueryItems::default()).unwrap(),
            Page {
                skip: 0,
                count: DEFAULT_PAGE_SIZE
            }
        );
    }

    #[test]
    fn test_page_rejects_negative_and_fractional() {
        assert!(Page::from_query(&QueryItems::parse("skip=-1")).is_err());
        assert!(Page::from_query(&QueryItems::parse("count=2.5")).is_err());
    }

    #[test]
    fn test_page_slice() {
        let page = Page { skip: 2, count: 2 };
        assert_eq!(page.slice(1..=5), vec![3, 4]);
        assert_eq!(Page { skip: 4, count: 2 }.slice(1..=5), vec![5]);
        assert!(Page { skip: 9, count: 2 }.slice(1..=5).is_empty());
    }
}
