pub mod domain;
pub mod embed;
pub mod filter;
pub mod ports;
pub mod query;

pub use domain::{
    Comment, Direction, Ingredient, NewComment, NewRecipe, Recipe, RecipePatch, RecipeSummary,
    User, UserSummary,
};
pub use embed::{attach_authors, author_ids, CommentWithAuthor};
pub use filter::{Page, Predicate, RecipeFilter, DEFAULT_PAGE_SIZE};
pub use ports::{DatabaseService, PortError, PortResult};
pub use query::QueryItems;
