//! Test fixtures
//!
//! Factory functions for posts and pages with sensible defaults.

use std::collections::BTreeSet;

use chrono::{Duration, TimeZone, Utc};

use crate::domain::entities::{AuthorSummary, Pagination, Post, PostId, PostPage, UserId};

/// Create a test post authored by user 1
pub fn test_post(id: i64) -> Post {
    test_post_by(id, 1)
}

/// Create a test post with a specific author
pub fn test_post_by(id: i64, user_id: i64) -> Post {
    let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap() + Duration::minutes(id);
    Post {
        id: PostId(id),
        user_id: UserId(user_id),
        author: Some(AuthorSummary {
            id: UserId(user_id),
            username: format!("user{}", user_id),
            first_name: None,
            last_name: None,
            profile_image: None,
        }),
        title: Some(format!("Post {}", id)),
        content: format!("Content of post {}", id),
        media: None,
        tags: BTreeSet::new(),
        is_published: true,
        is_featured: false,
        likes_count: id as u64,
        comments_count: 0,
        shares_count: 0,
        views_count: 10,
        created_at,
        updated_at: None,
    }
}

pub fn test_posts(ids: &[i64]) -> Vec<Post> {
    ids.iter().map(|id| test_post(*id)).collect()
}

/// A page response holding the given ids
pub fn page_of(ids: &[i64], has_next: bool) -> PostPage {
    PostPage {
        posts: test_posts(ids),
        pagination: Pagination {
            page: 1,
            per_page: ids.len() as u32,
            total: ids.len() as u64,
            pages: 1,
            has_next,
            has_prev: false,
        },
    }
}
