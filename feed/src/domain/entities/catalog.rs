//! Catalog data used to build filter pickers

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub count: u64,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularTag {
    pub tag: String,
    pub count: u64,
    pub slug: String,
}

/// Aggregate counters across all posts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostStats {
    pub total_posts: u64,
    pub featured_posts: u64,
    pub recent_posts: u64,
    pub total_likes: u64,
    pub total_views: u64,
}
