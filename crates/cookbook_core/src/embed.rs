//! crates/cookbook_core/src/embed.rs
//!
//! Joins user summaries onto comments in application code. Users live in a
//! separate store, so the authors are fetched in one batch and merged here.

use std::collections::{HashMap, HashSet};

use crate::domain::{Comment, User, UserSummary};

/// A comment together with its embedded author summary.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentWithAuthor {
    pub comment: Comment,
    pub user: UserSummary,
}

/// The distinct author ids of `comments`, in first-seen order.
pub fn author_ids(comments: &[Comment]) -> Vec<String> {
    let mut seen = HashSet::new();
    comments
        .iter()
        .filter(|c| seen.insert(c.user_id.as_str()))
        .map(|c| c.user_id.clone())
        .collect()
}

/// Attaches each comment's author. Unknown authors get an empty summary.
pub fn attach_authors(comments: Vec<Comment>, users: &[User]) -> Vec<CommentWithAuthor> {
    let by_id: HashMap<&str, &User> = users.iter().map(|u| (u.id.as_str(), u)).collect();
    comments
        .into_iter()
        .map(|comment| {
            let user = by_id
                .get(comment.user_id.as_str())
                .map(|u| UserSummary::from(*u))
                .unwrap_or_default();
            CommentWithAuthor { comment, user }
        })
        .collect()
}
