//! Posts API port traits
//!
//! The feed never talks to the network directly. Reads go through
//! `PostQueryService`, writes through `PostMutationService`; the HTTP adapter
//! implements both.

use async_trait::async_trait;

use crate::domain::entities::{Category, PopularTag, PostId, PostListRequest, PostPage, PostStats};
use crate::error::FeedError;

#[async_trait]
pub trait PostQueryService: Send + Sync {
    /// Fetch one page of posts matching the request's query
    async fn list_posts(&self, request: &PostListRequest) -> Result<PostPage, FeedError>;

    /// Categories with post counts
    async fn categories(&self) -> Result<Vec<Category>, FeedError>;

    /// Most used tags
    async fn popular_tags(&self) -> Result<Vec<PopularTag>, FeedError>;

    /// Aggregate post statistics
    async fn stats(&self) -> Result<PostStats, FeedError>;
}

#[async_trait]
pub trait PostMutationService: Send + Sync {
    /// Like a post. Returns the server's like count.
    async fn like(&self, id: PostId) -> Result<u64, FeedError>;

    /// Delete a post owned by the caller
    async fn delete(&self, id: PostId) -> Result<(), FeedError>;
}
